//! Turn orchestration.
//!
//! - [`orchestrator`]: [`ChatOrchestrator`]: the bounded model/tool loop.
//! - [`config`]: [`ChatConfig`] and its builder methods.
//! - [`events`]: [`TurnEvent`] and the [`EventHandler`] implementations.
//! - [`session`]: [`ShopSession`] and [`Conversation`].

pub mod config;
pub mod events;
pub mod orchestrator;
pub mod session;

pub use config::ChatConfig;
pub use events::{
    CompositeEventHandler, EventHandler, FnEventHandler, LoggingHandler, NoopHandler, TurnEvent,
};
pub use orchestrator::{ChatOrchestrator, TurnOutcome, TurnStatus};
pub use session::{Conversation, ShopSession};
