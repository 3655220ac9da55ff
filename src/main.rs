use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use log::{error, info, warn};

use snapquiz::backend::{DeckBackend, RemoteBackend};
use snapquiz::config::{DEFAULT_ANSWER_SECONDS, DEFAULT_REVEAL_SECONDS, RetryPolicy, Rules};
use snapquiz::models::Mode;
use snapquiz::protocol::DEFAULT_PORT;
use snapquiz::session::JsonFileStore;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    play: PlayArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play the quiz in the terminal (default)
    Play(PlayArgs),
    /// Run the quiz service, answering requests from a deck file
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// JSON deck of images and their quiz text
        #[arg(short, long)]
        deck: PathBuf,
    },
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Game mode to preselect when no session is stored
    #[arg(short, long, value_enum, default_value_t = Mode::Basic)]
    mode: Mode,

    /// WebSocket URL of the quiz service
    #[arg(short, long, conflicts_with = "deck")]
    server: Option<String>,

    /// JSON deck to play from without a service
    #[arg(short, long)]
    deck: Option<PathBuf>,

    /// Where the session snapshot is kept between runs
    #[arg(long, default_value = "snapquiz-session.json")]
    state_file: PathBuf,

    /// Seconds each image is shown
    #[arg(long, default_value_t = DEFAULT_REVEAL_SECONDS)]
    reveal_seconds: u32,

    /// Seconds allowed for answering in timed mode
    #[arg(long, default_value_t = DEFAULT_ANSWER_SECONDS)]
    answer_seconds: u32,

    /// Give up after this many failed fetches (retries forever if unset)
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Delay before the first retry, doubled on each further one
    #[arg(long, default_value_t = 500)]
    retry_delay_ms: u64,
}

impl PlayArgs {
    fn rules(&self) -> Rules {
        Rules {
            reveal_seconds: self.reveal_seconds,
            answer_seconds: self.answer_seconds,
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                base_delay: Duration::from_millis(self.retry_delay_ms),
                ..RetryPolicy::default()
            },
            ..Rules::default()
        }
    }
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Some(Command::Serve { port, deck }) => serve(port, deck).await,
        Some(Command::Play(args)) => play(args).await,
        None => play(cli.play).await,
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn serve(port: u16, deck: PathBuf) -> snapquiz::Result<()> {
    let backend = DeckBackend::from_json(&deck)?;
    info!("Serving {} deck entries from {}", backend.len(), deck.display());
    snapquiz::server::run(port, backend).await?;
    Ok(())
}

async fn play(args: PlayArgs) -> snapquiz::Result<()> {
    let rules = args.rules();
    let store = JsonFileStore::new(&args.state_file);

    match (args.server, args.deck) {
        (Some(url), _) => {
            let backend = RemoteBackend::new(url);
            let waker = backend.clone();
            tokio::spawn(async move {
                match waker.wake_up().await {
                    Ok(greeting) => info!("{}", greeting),
                    Err(e) => warn!("Quiz service not answering yet: {}", e),
                }
            });
            snapquiz::play(store, backend, rules, args.mode).await
        }
        (None, Some(deck)) => {
            let backend = DeckBackend::from_json(&deck)?;
            snapquiz::play(store, backend, rules, args.mode).await
        }
        (None, None) => {
            eprintln!("Either --server <url> or --deck <file> is required.");
            process::exit(2);
        }
    }
}

