//! Multi-conversation front door for a transport.

use crate::config::BotConfig;
use crate::message::{Outbound, ReplyEvent};
use crate::registry::TaskRegistry;
use crate::sequencer::{Conversation, Sequencer};
use crate::state::FlowState;
use bot_core::ConversationId;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Routes replies to per-conversation state machines.
///
/// Every conversation owns its session and cost lists; nothing is shared
/// between conversations. `handle` takes `&self`, so one `Bot` can serve
/// several worker threads.
pub struct Bot {
    sequencer: Sequencer,
    conversations: Mutex<HashMap<ConversationId, Conversation>>,
}

impl Bot {
    pub fn new(config: BotConfig) -> Self {
        let registry = TaskRegistry::builtin(&config);
        Self::with_registry(registry, config)
    }

    pub fn with_registry(registry: TaskRegistry, config: BotConfig) -> Self {
        Self {
            sequencer: Sequencer::new(registry, config),
            conversations: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &BotConfig {
        self.sequencer.config()
    }

    /// Advance the sender's conversation by one reply.
    pub fn handle(&self, event: &ReplyEvent) -> Vec<Outbound> {
        let mut conversations = self
            .conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let convo = conversations.entry(event.conversation).or_insert_with(|| {
            debug!(conversation = %event.conversation, "new conversation");
            self.sequencer.conversation()
        });
        self.sequencer
            .step(convo, &event.content)
            .into_iter()
            .map(|reply| Outbound {
                conversation: event.conversation,
                reply,
            })
            .collect()
    }

    /// Current state; unknown conversations are at the menu.
    pub fn state_of(&self, id: ConversationId) -> FlowState {
        self.inspect(id, Conversation::state)
            .unwrap_or(FlowState::AtMenu)
    }

    /// Run `f` against a conversation's current snapshot.
    pub fn inspect<R>(&self, id: ConversationId, f: impl FnOnce(&Conversation) -> R) -> Option<R> {
        let conversations = self
            .conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        conversations.get(&id).map(f)
    }

    pub fn conversation_count(&self) -> usize {
        self.conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
