//! Identifier generation for messages, turns, and carts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn unique_suffix() -> String {
    let ts = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    // The counter keeps ids distinct when the clock does not advance.
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{ts:x}-{count:04x}")
}

/// Generate a unique message ID.
pub fn generate_message_id() -> String {
    format!("msg-{}", unique_suffix())
}

/// Generate a unique ID for one chat turn.
pub fn generate_turn_id() -> String {
    format!("turn-{}", unique_suffix())
}

/// Generate a unique conversation ID.
pub fn generate_conversation_id() -> String {
    format!("conv-{}", unique_suffix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_ids_unique() {
        let a = generate_message_id();
        let b = generate_message_id();
        assert_ne!(a, b);
        assert!(a.starts_with("msg-"));
    }

    #[test]
    fn prefixes_distinguish_kinds() {
        assert!(generate_turn_id().starts_with("turn-"));
        assert!(generate_conversation_id().starts_with("conv-"));
    }
}
