//! WebSocket quiz service.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

use crate::backend::QuizBackend;
use crate::protocol::{ClientMessage, ServerMessage};

/// Bind to `port` on all interfaces and serve quizzes from `backend`.
pub async fn run<B: QuizBackend>(port: u16, backend: B) -> std::io::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Quiz service listening on {}", addr);

    serve(listener, Arc::new(backend)).await;
    Ok(())
}

/// Accept connections on `listener` forever, one task per connection.
pub async fn serve<B: QuizBackend>(listener: TcpListener, backend: Arc<B>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                tokio::spawn(handle_connection(stream, addr, Arc::clone(&backend)));
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

async fn handle_connection<B: QuizBackend>(stream: TcpStream, addr: SocketAddr, backend: Arc<B>) {
    let id = Uuid::new_v4();

    let mut ws = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake with {} failed: {}", addr, e);
            return;
        }
    };
    debug!("Connection {} opened from {}", id, addr);

    while let Some(msg) = ws.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text.to_string(),
            Ok(Message::Close(_)) => break,
            Err(e) => {
                debug!("Connection {} dropped: {}", id, e);
                break;
            }
            _ => continue,
        };

        let client_msg: ClientMessage = match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(e) => {
                warn!("Ignoring malformed message on {}: {}", id, e);
                continue;
            }
        };

        let reply = handle_client_message(id, client_msg, backend.as_ref()).await;
        let json = match serde_json::to_string(&reply) {
            Ok(json) => json,
            Err(e) => {
                error!("Could not encode reply on {}: {}", id, e);
                break;
            }
        };
        if ws.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }

    debug!("Connection {} closed", id);
}

async fn handle_client_message<B: QuizBackend>(id: Uuid, msg: ClientMessage, backend: &B) -> ServerMessage {
    match msg {
        ClientMessage::WakeUp => ServerMessage::Awake {
            message: "Server is awake!".to_string(),
        },
        ClientMessage::GenerateQuiz { mode } => {
            info!("Connection {} requested a {} quiz", id, mode);
            match backend.generate(mode).await {
                Ok(bundle) => ServerMessage::Quiz {
                    image_urls: bundle.images,
                    quiz: bundle.raw_quiz,
                },
                Err(e) => {
                    warn!("Quiz generation for {} failed: {}", id, e);
                    ServerMessage::Error {
                        reason: e.to_string(),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, DeckBackend, RemoteBackend};
    use crate::data::DeckEntry;
    use crate::models::Mode;

    async fn spawn_service(entries: usize) -> String {
        let deck = DeckBackend::new(
            (0..entries)
                .map(|i| DeckEntry {
                    image_url: format!("https://img/{i}.jpg"),
                    description: String::new(),
                    quiz: format!("Q{i} - right - w1 - w2 - w3"),
                })
                .collect(),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, Arc::new(deck)));
        format!("ws://{}", addr)
    }

    #[tokio::test]
    async fn test_generate_round_trip() {
        let url = spawn_service(2).await;
        let backend = RemoteBackend::new(url);

        let bundle = backend.generate(Mode::TwoImage).await.unwrap();
        assert_eq!(bundle.images.len(), 2);
        assert_eq!(bundle.raw_quiz.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_service_errors_are_forwarded() {
        let url = spawn_service(1).await;
        let err = RemoteBackend::new(url)
            .generate(Mode::FourImage)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Service(reason) if reason.contains("enough valid images")));
    }

    #[tokio::test]
    async fn test_wake_up() {
        let url = spawn_service(1).await;
        let greeting = RemoteBackend::new(url).wake_up().await.unwrap();
        assert_eq!(greeting, "Server is awake!");
    }

    #[tokio::test]
    async fn test_silent_service_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _silent = tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        });

        let timeout = std::time::Duration::from_millis(100);
        let err = RemoteBackend::new(format!("ws://{}", addr))
            .with_timeout(timeout)
            .generate(Mode::Basic)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Timeout(t) if t == timeout));
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = RemoteBackend::new(format!("ws://{}", addr))
            .generate(Mode::Basic)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Connection(_)));
    }
}
