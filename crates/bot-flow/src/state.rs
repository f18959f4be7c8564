//! States of the input-collection state machine.

use bot_core::{CostKind, TaskId};

/// Where a conversation is in its task.
///
/// `Terminal` is transient: it is held only while the task's computation
/// runs, after which the conversation returns to `AtMenu`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowState {
    AtMenu,
    AwaitingField { task: TaskId, index: usize },
    AwaitingListEntry { task: TaskId, list: CostKind },
    Terminal { task: TaskId },
}

impl FlowState {
    pub fn task(&self) -> Option<TaskId> {
        match self {
            FlowState::AtMenu => None,
            FlowState::AwaitingField { task, .. }
            | FlowState::AwaitingListEntry { task, .. }
            | FlowState::Terminal { task } => Some(*task),
        }
    }

    /// True while a reply is expected for a field or list entry.
    pub fn is_awaiting(&self) -> bool {
        matches!(
            self,
            FlowState::AwaitingField { .. } | FlowState::AwaitingListEntry { .. }
        )
    }

    /// Returns true if the sequencer may move from `self` to `target`.
    ///
    /// Returning to the menu is always allowed. Otherwise a conversation only
    /// moves forward within the task it started.
    pub fn can_transition_to(&self, target: &FlowState) -> bool {
        use FlowState::*;
        match (self, target) {
            (_, AtMenu) => true,
            (AtMenu, AwaitingField { index, .. }) => *index == 0,
            (AtMenu, AwaitingListEntry { .. }) | (AtMenu, Terminal { .. }) => true,
            (AwaitingField { task: t, index: i }, AwaitingField { task: u, index: j }) => {
                t == u && *j == i + 1
            }
            (AwaitingField { task: t, .. }, AwaitingListEntry { task: u, .. })
            | (AwaitingField { task: t, .. }, Terminal { task: u })
            | (AwaitingListEntry { task: t, .. }, Terminal { task: u }) => t == u,
            (AwaitingListEntry { task: t, list: a }, AwaitingListEntry { task: u, list: b }) => {
                t == u && a != b
            }
            _ => false,
        }
    }
}
