use std::future::Future;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use crate::models::{Mode, QuizBundle};
use crate::protocol::{ClientMessage, ServerMessage};

use super::{BackendError, QuizBackend};

/// Default time allowed for one request, generation included.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Quiz service reached over WebSocket. One connection per request.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    url: String,
    timeout: Duration,
}

impl RemoteBackend {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Pings the service; returns its greeting.
    pub async fn wake_up(&self) -> Result<String, BackendError> {
        match self.request(ClientMessage::WakeUp).await? {
            ServerMessage::Awake { message } => Ok(message),
            ServerMessage::Error { reason } => Err(BackendError::Service(reason)),
            ServerMessage::Quiz { .. } => Err(BackendError::UnexpectedReply),
        }
    }

    async fn request(&self, msg: ClientMessage) -> Result<ServerMessage, BackendError> {
        tokio::time::timeout(self.timeout, self.exchange(msg))
            .await
            .map_err(|_| BackendError::Timeout(self.timeout))?
    }

    async fn exchange(&self, msg: ClientMessage) -> Result<ServerMessage, BackendError> {
        let (mut ws, _) = tokio_tungstenite::connect_async(self.url.as_str()).await?;

        let json = serde_json::to_string(&msg)?;
        ws.send(Message::Text(json.into())).await?;

        while let Some(frame) = ws.next().await {
            match frame? {
                Message::Text(text) => {
                    let reply: ServerMessage = serde_json::from_str(text.as_str())?;
                    let _ = ws.close(None).await;
                    return Ok(reply);
                }
                Message::Close(_) => break,
                _ => continue,
            }
        }

        Err(BackendError::Closed)
    }
}

impl QuizBackend for RemoteBackend {
    fn generate(&self, mode: Mode) -> impl Future<Output = Result<QuizBundle, BackendError>> + Send {
        async move {
            log::debug!("Requesting {} quiz from {}", mode, self.url);
            match self.request(ClientMessage::GenerateQuiz { mode }).await? {
                ServerMessage::Quiz { image_urls, quiz } => Ok(QuizBundle {
                    images: image_urls,
                    raw_quiz: quiz,
                }),
                ServerMessage::Error { reason } => Err(BackendError::Service(reason)),
                ServerMessage::Awake { .. } => Err(BackendError::UnexpectedReply),
            }
        }
    }
}
