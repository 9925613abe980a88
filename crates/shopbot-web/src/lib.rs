//! HTTP and WebSocket front end for the `shopbot` chat orchestrator.
//!
//! `shopbot-web` keeps conversations in memory and exposes them over a
//! small REST API, while turn progress is streamed to WebSocket clients.
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use shopbot::prelude::*;
//! use shopbot_web::{ChatService, WebConfig, spawn_web};
//!
//! let client = GeminiClient::new(api_key_from_env()?)?;
//! let service = ChatService::new(Arc::new(client), ToolRegistry::new(), ChatConfig::default());
//! let addr = spawn_web(Arc::new(service), WebConfig::default()).await?;
//! println!("ShopBot: http://{addr}");
//! ```
//!
//! # Endpoints
//!
//! | Method | Path | |
//! |---|---|---|
//! | POST | `/api/conversations` | open a conversation (greeting only) |
//! | GET | `/api/conversations/{id}` | history and cart |
//! | POST | `/api/chat` | run one turn |
//! | GET | `/api/health` | liveness |
//! | GET | `/ws` | event stream, `{"type":"chat"}` to start turns |
//!
//! # Architecture
//!
//! ```text
//! ChatOrchestrator ──TurnEvent──▶ WebBroadcastHandler ──WsEvent──▶ WebSocket clients
//!        ▲
//!   ChatService ◀── /api/chat, {"type":"chat"} ──────────────────────────┘
//! ```

mod api;
pub mod broadcast;
mod server;
pub mod store;
mod ws;

pub use api::AppState;
pub use broadcast::{WebBroadcastHandler, WsEvent, WsMessage};
pub use store::{ChatService, ConversationSnapshot, ConversationView, ServiceError, TurnReply};

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for the web server.
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:3001`.
    pub bind_addr: SocketAddr,
    /// Directory of static front-end files served for unmatched paths.
    pub static_dir: Option<PathBuf>,
    /// WebSocket broadcast channel capacity. Default: 256.
    ///
    /// Clients that fall behind by this many events receive a `lagged`
    /// notice and should refetch conversations over REST.
    pub broadcast_capacity: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            static_dir: None,
            broadcast_capacity: 256,
        }
    }
}

/// Spawn the web server on a Tokio task and return the bound address.
///
/// The server runs until the Tokio runtime shuts down.
pub async fn spawn_web(service: Arc<ChatService>, config: WebConfig) -> std::io::Result<SocketAddr> {
    let (broadcast_tx, _) = tokio::sync::broadcast::channel(config.broadcast_capacity.max(1));
    let state = AppState {
        service,
        broadcast_tx,
    };
    let router = server::build_router(state, config.static_dir);
    server::start_server(router, config.bind_addr).await
}
