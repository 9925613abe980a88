//! ShopBot chat server.
//!
//! # Usage
//!
//! ```bash
//! GEMINI_API_KEY=... cargo run -p shopbot-web
//! GEMINI_API_KEY=... cargo run -p shopbot-web -- --model gemini-2.5-pro --port 8080
//! ```
//!
//! ## Sending messages
//!
//! **REST** (`POST /api/chat`):
//! ```json
//! {"message": "show me headphones"}
//! ```
//!
//! **WebSocket** (connect to `/ws`):
//! ```json
//! {"type": "chat", "conversation_id": "...", "message": "add two to my cart"}
//! ```

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use shopbot::prelude::*;
use shopbot_web::store::DEFAULT_CUSTOMER_ID;
use shopbot_web::{ChatService, WebConfig, spawn_web};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// ShopBot shopping assistant server.
#[derive(Parser)]
#[command(about = "Shopping assistant chat server backed by Gemini function calling")]
struct Args {
    /// Gemini model to use.
    #[arg(long, default_value = shopbot::DEFAULT_MODEL)]
    model: String,

    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Port for the server.
    #[arg(long, default_value_t = 3001)]
    port: u16,

    /// Maximum model calls per turn.
    #[arg(long, default_value_t = shopbot::agent::config::DEFAULT_MAX_ROUNDS)]
    max_rounds: u32,

    /// Per-request timeout for Gemini calls, in seconds.
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// Retries for transient Gemini failures (429, 5xx, timeouts).
    #[arg(long, default_value_t = 0)]
    retries: u32,

    /// Customer id new conversations are opened for.
    #[arg(long, default_value = DEFAULT_CUSTOMER_ID)]
    customer_id: String,

    /// Serve static front-end files from this directory.
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    // 1. Gemini client.
    if args.timeout_secs == 0 {
        return Err(ConfigError::Invalid("--timeout-secs must be at least 1".into()).to_string());
    }
    let api_key = api_key_from_env().map_err(|e| e.to_string())?;
    let client_config = ClientConfig::default().with_timeout(Duration::from_secs(args.timeout_secs));
    let client = GeminiClient::with_config(api_key, client_config).map_err(|e| e.to_string())?;

    // 2. Orchestrator settings and tools.
    let config = ChatConfig::default()
        .with_model(&args.model)
        .with_max_rounds(args.max_rounds)
        .with_retries(args.retries);
    let service = ChatService::new(Arc::new(client), ToolRegistry::new(), config)
        .with_customer_id(&args.customer_id);

    // 3. Serve.
    let web_config = WebConfig {
        bind_addr: (args.bind, args.port).into(),
        static_dir: args.static_dir,
        ..Default::default()
    };
    let addr = spawn_web(Arc::new(service), web_config)
        .await
        .map_err(|e| format!("failed to bind: {e}"))?;
    println!("ShopBot: http://{addr} (model {})", args.model);

    tokio::signal::ctrl_c().await.map_err(|e| e.to_string())?;
    println!("\nShutting down.");
    Ok(())
}
