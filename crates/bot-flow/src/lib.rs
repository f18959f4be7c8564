#![deny(warnings)]

//! Conversational input collection for the economics tutor bot.
//!
//! A conversation starts at the menu, walks the selected task's fields and
//! cost lists one reply at a time, and runs the task's computation once
//! everything is collected. "Back" returns to the menu from any point.

pub mod bot;
pub mod compute;
pub mod config;
pub mod menu;
pub mod message;
pub mod registry;
pub mod sequencer;
pub mod state;

pub use bot::Bot;
pub use compute::{ComputeError, TaskOutput};
pub use config::{BotConfig, ConfigError, RoundingPolicy};
pub use message::{Outbound, Reply, ReplyContent, ReplyEvent};
pub use registry::{FieldSpec, ListPhase, TaskDefinition, TaskRegistry};
pub use sequencer::{Conversation, Sequencer};
pub use state::FlowState;
