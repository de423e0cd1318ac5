use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mediglot_clients::MyMemoryClient;
use mediglot_store::Store;
use mediglot_vocab::MedicalVocabulary;
use mediglot_web::{app, AppState};

/// mediglot - healthcare translation service with medical-term suggestions
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Path to the SQLite database
    #[arg(long)]
    db: Option<PathBuf>,

    /// Path to a vocabulary file (.json array or one term per line);
    /// the embedded term list is used when unset
    #[arg(long)]
    vocab: Option<PathBuf>,

    /// Translation API endpoint
    #[arg(long)]
    mymemory_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    // Resolve configuration: CLI flags > env vars > defaults
    let db_path = args
        .db
        .or_else(|| std::env::var("MEDIGLOT_DB").ok().map(PathBuf::from))
        .unwrap_or_else(default_db_path);
    let vocab_path = args
        .vocab
        .or_else(|| std::env::var("MEDIGLOT_VOCAB").ok().map(PathBuf::from));
    let mymemory_url = args
        .mymemory_url
        .or_else(|| std::env::var("MYMEMORY_URL").ok());

    // A missing or broken vocabulary must not stop the service; it runs
    // with suggestions disabled instead.
    let vocab = match vocab_path {
        Some(ref path) => MedicalVocabulary::load_or_empty(path),
        None => MedicalVocabulary::embedded(),
    };
    tracing::info!(terms = vocab.len(), "medical vocabulary loaded");

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = Store::open(&db_path)?;
    tracing::info!(db = %db_path.display(), "translation store opened");

    let translator = match mymemory_url {
        Some(url) => MyMemoryClient::with_base_url(url),
        None => MyMemoryClient::new(),
    };

    let state = AppState::new(vocab, store, translator);
    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    tracing::info!(addr = %args.bind, "listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("mediglot").join("mediglot.db"))
        .unwrap_or_else(|| PathBuf::from("mediglot.db"))
}
