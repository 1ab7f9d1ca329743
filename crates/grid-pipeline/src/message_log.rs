//! Bounded chat/terminal history: the last 30 entries of each, the source
//! for the `state` read surface's `recentChat`/`recentTerminal` and for the
//! `latestChatMessageId`/`latestTerminalMessageId` counters `state-lite`
//! exposes.

use std::collections::VecDeque;
use std::sync::Mutex;

use grid_proto::{ChatMessage, TerminalMessage};

const HISTORY_CAP: usize = 30;

#[derive(Debug, Default)]
struct Inner {
    chat: VecDeque<ChatMessage>,
    terminal: VecDeque<TerminalMessage>,
    next_chat_id: u64,
    next_terminal_id: u64,
}

/// Appends-only log of chat and system/terminal broadcasts, capped at the
/// most recent 30 of each.
#[derive(Debug, Default)]
pub struct MessageLog {
    inner: Mutex<Inner>,
}

impl MessageLog {
    /// Builds an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Appends a chat entry, returning its assigned id.
    pub fn push_chat(&self, agent_id: String, agent_name: String, message: String, now_ms: u64) -> u64 {
        let mut inner = self.lock();
        inner.next_chat_id += 1;
        let id = inner.next_chat_id;
        inner.chat.push_back(ChatMessage {
            id,
            agent_id,
            agent_name,
            message,
            created_at: now_ms,
        });
        if inner.chat.len() > HISTORY_CAP {
            inner.chat.pop_front();
        }
        id
    }

    /// Appends a system/terminal entry, returning its assigned id.
    pub fn push_terminal(&self, message: String, now_ms: u64) -> u64 {
        let mut inner = self.lock();
        inner.next_terminal_id += 1;
        let id = inner.next_terminal_id;
        inner.terminal.push_back(TerminalMessage {
            id,
            message,
            created_at: now_ms,
        });
        if inner.terminal.len() > HISTORY_CAP {
            inner.terminal.pop_front();
        }
        id
    }

    /// The most recent chat entries, oldest first.
    pub fn recent_chat(&self) -> Vec<ChatMessage> {
        self.lock().chat.iter().cloned().collect()
    }

    /// The most recent terminal entries, oldest first.
    pub fn recent_terminal(&self) -> Vec<TerminalMessage> {
        self.lock().terminal.iter().cloned().collect()
    }

    /// Id of the most recent chat entry, if any.
    pub fn latest_chat_id(&self) -> Option<u64> {
        self.lock().chat.back().map(|m| m.id)
    }

    /// Id of the most recent terminal entry, if any.
    pub fn latest_terminal_id(&self) -> Option<u64> {
        self.lock().terminal.back().map(|m| m.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_capped_at_thirty_entries() {
        let log = MessageLog::new();
        for i in 0..40 {
            log.push_chat("a1".into(), "Ada".into(), format!("msg {i}"), 0);
        }
        let recent = log.recent_chat();
        assert_eq!(recent.len(), 30);
        assert_eq!(recent[0].message, "msg 10");
        assert_eq!(log.latest_chat_id(), Some(40));
    }

    #[test]
    fn chat_and_terminal_ids_are_independent_sequences() {
        let log = MessageLog::new();
        log.push_chat("a1".into(), "Ada".into(), "hi".into(), 0);
        log.push_terminal("built a box".into(), 0);
        assert_eq!(log.latest_chat_id(), Some(1));
        assert_eq!(log.latest_terminal_id(), Some(1));
    }
}
