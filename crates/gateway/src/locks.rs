//! One in-flight turn per conversation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Per-conversation async mutexes keyed by WhatsApp id.
///
/// Turns for different conversations never contend. Once more than
/// `max_tracked` ids are known, entries nobody is holding are dropped.
pub struct ConversationLocks {
    max_tracked: usize,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ConversationLocks {
    pub fn new(max_tracked: usize) -> Self {
        Self {
            max_tracked: max_tracked.max(1),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The lock for `conversation_id`, created on first use.
    pub fn lock_for(&self, conversation_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());

        if locks.len() >= self.max_tracked && !locks.contains_key(conversation_id) {
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }

        locks
            .entry(conversation_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    pub fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn same_id_shares_a_lock() {
        let locks = ConversationLocks::new(10);
        let a = locks.lock_for("77011234567");
        let b = locks.lock_for("77011234567");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(locks.tracked(), 1);
    }

    #[test]
    fn idle_locks_are_evicted_at_capacity() {
        let locks = ConversationLocks::new(2);
        let held = locks.lock_for("a");
        drop(locks.lock_for("b"));
        let _c = locks.lock_for("c");

        assert_eq!(locks.tracked(), 2);
        assert!(Arc::ptr_eq(&held, &locks.lock_for("a")));
    }

    #[tokio::test(start_paused = true)]
    async fn turns_for_one_conversation_are_serialized() {
        let locks = Arc::new(ConversationLocks::new(10));
        let first = locks.lock_for("a");
        let guard = first.lock().await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let lock = locks.lock_for("a");
                let _turn = lock.lock().await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        let other = locks.lock_for("b");
        assert!(other.try_lock().is_ok());

        drop(guard);
        waiter.await.unwrap();
    }
}
