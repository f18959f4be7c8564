//! The step sequencer: a single dispatch function that advances one
//! conversation per inbound reply.
//!
//! Back-navigation is checked before anything else, so the back token never
//! reaches numeric parsing. Validation failures re-prompt without changing
//! state; computation failures are reported and force a return to the menu.

use crate::compute::ComputeError;
use crate::config::BotConfig;
use crate::menu::{self, back_prompt, menu_reply};
use crate::message::{Reply, ReplyContent};
use crate::registry::{FieldSpec, TaskDefinition, TaskRegistry};
use crate::state::FlowState;
use bot_core::{
    parse_cost_entry, validate, CostKind, ListCapacityExceeded, Session, TaskId,
    ValidationFailure, ValueKind,
};
use tracing::{debug, info, warn};

const NUMERIC_REQUIRED: &str = "Please enter a numeric value.";
const INTEGER_REQUIRED: &str = "Please enter an integer value.";
const MALFORMED_COST: &str =
    "Invalid input. Please enter the data in the format 'cost name, amount'.";
const NEGATIVE_COST: &str = "Please enter a non-negative numeric value for the cost.";

/// State and collected input of one conversation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversation {
    state: FlowState,
    session: Session,
}

impl Conversation {
    pub fn new(max_cost_entries: usize) -> Self {
        Self {
            state: FlowState::AtMenu,
            session: Session::new(max_cost_entries),
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn transition(&mut self, target: FlowState) {
        debug_assert!(
            self.state.can_transition_to(&target),
            "illegal transition {:?} -> {:?}",
            self.state,
            target
        );
        self.state = target;
    }

    fn reset(&mut self) {
        self.transition(FlowState::AtMenu);
        self.session.clear();
    }
}

/// Drives conversations through the tasks of a registry.
#[derive(Clone, Debug)]
pub struct Sequencer {
    registry: TaskRegistry,
    config: BotConfig,
}

impl Sequencer {
    pub fn new(registry: TaskRegistry, config: BotConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// A fresh conversation sized for this sequencer's cost lists.
    pub fn conversation(&self) -> Conversation {
        Conversation::new(self.config.max_cost_entries)
    }

    /// Advance `convo` by one reply and return the messages to send.
    pub fn step(&self, convo: &mut Conversation, content: &ReplyContent) -> Vec<Reply> {
        let text = match content {
            ReplyContent::Text(text) => Some(text.as_str()),
            ReplyContent::NonText => None,
        };
        if text.is_some_and(menu::is_back) {
            return self.back(convo);
        }
        match convo.state {
            FlowState::AtMenu | FlowState::Terminal { .. } => self.at_menu(convo, text),
            FlowState::AwaitingField { task, index } => self.on_field(convo, task, index, text),
            FlowState::AwaitingListEntry { task, list } => {
                self.on_list_entry(convo, task, list, text)
            }
        }
    }

    fn back(&self, convo: &mut Conversation) -> Vec<Reply> {
        if let Some(task) = convo.state.task() {
            info!(
                ?task,
                collected = convo.session.field_count(),
                "back to menu"
            );
        }
        convo.reset();
        vec![menu_reply()]
    }

    fn at_menu(&self, convo: &mut Conversation, text: Option<&str>) -> Vec<Reply> {
        let Some(text) = text else {
            return vec![Reply::prompt(menu::UNSUPPORTED_CONTENT)];
        };
        if menu::is_start_command(text) {
            return vec![Reply::prompt(menu::GREETING), menu_reply()];
        }
        let Some(task) = TaskId::from_menu_label(text).and_then(|id| self.registry.resolve(id))
        else {
            return vec![menu_reply()];
        };
        info!(task = ?task.id, "task selected");
        convo.session.begin(task.id);
        let mut replies = Vec::new();
        if let Some(intro) = task.intro {
            replies.push(back_prompt(intro));
        }
        self.advance(convo, task, 0, &mut replies);
        replies
    }

    fn on_field(
        &self,
        convo: &mut Conversation,
        task: TaskId,
        index: usize,
        text: Option<&str>,
    ) -> Vec<Reply> {
        let Some(def) = self.registry.resolve(task) else {
            return self.back(convo);
        };
        let Some(field) = def.fields.get(index) else {
            return self.back(convo);
        };
        let Some(text) = text else {
            return vec![back_prompt(NUMERIC_REQUIRED)];
        };
        match validate(text, field.kind, field.allow_negative) {
            Ok(value) => {
                debug!(?task, field = field.name, %value, "field accepted");
                convo.session.record(field.name, value);
                let mut replies = Vec::new();
                self.advance(convo, def, index + 1, &mut replies);
                replies
            }
            Err(failure) => {
                debug!(?task, field = field.name, %failure, "field rejected");
                vec![back_prompt(field_failure_message(field, failure))]
            }
        }
    }

    fn on_list_entry(
        &self,
        convo: &mut Conversation,
        task: TaskId,
        list: CostKind,
        text: Option<&str>,
    ) -> Vec<Reply> {
        let Some(def) = self.registry.resolve(task) else {
            return self.back(convo);
        };
        let Some((position, _)) = def.list_phase(list) else {
            return self.back(convo);
        };
        let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
            return vec![back_prompt(NUMERIC_REQUIRED)];
        };
        if menu::is_done(text) {
            let mut replies = Vec::new();
            match def.lists.get(position + 1) {
                Some(next) => {
                    convo.transition(FlowState::AwaitingListEntry {
                        task,
                        list: next.kind,
                    });
                    replies.push(back_prompt(next.prompt.clone()));
                }
                None => self.finish(convo, def, &mut replies),
            }
            return replies;
        }
        let entry = match parse_cost_entry(text) {
            Ok(entry) => entry,
            Err(ValidationFailure::NegativeNotAllowed) => return vec![back_prompt(NEGATIVE_COST)],
            Err(_) => return vec![back_prompt(MALFORMED_COST)],
        };
        let confirmation = format!(
            "Added {} cost: {}, {}. Enter the next one or '{}'.",
            list.adjective(),
            entry.label,
            entry.amount,
            menu::DONE_LABEL
        );
        match convo.session.costs_mut(list).push(entry) {
            Ok(len) => {
                debug!(?task, ?list, len, "cost entry added");
                vec![back_prompt(confirmation)]
            }
            Err(ListCapacityExceeded { max }) => {
                debug!(?task, ?list, max, "cost list full");
                vec![back_prompt(format!(
                    "The maximum number of {} costs ({max}) has been reached. Enter '{}'.",
                    list.adjective(),
                    menu::DONE_LABEL
                ))]
            }
        }
    }

    /// Prompt for field `next`, or move on to the list phases, or compute.
    fn advance(
        &self,
        convo: &mut Conversation,
        def: &TaskDefinition,
        next: usize,
        replies: &mut Vec<Reply>,
    ) {
        if let Some(field) = def.fields.get(next) {
            convo.transition(FlowState::AwaitingField {
                task: def.id,
                index: next,
            });
            replies.push(back_prompt(field.prompt));
        } else if let Some(phase) = def.lists.first() {
            convo.transition(FlowState::AwaitingListEntry {
                task: def.id,
                list: phase.kind,
            });
            replies.push(back_prompt(phase.prompt.clone()));
        } else {
            self.finish(convo, def, replies);
        }
    }

    fn finish(&self, convo: &mut Conversation, def: &TaskDefinition, replies: &mut Vec<Reply>) {
        convo.transition(FlowState::Terminal { task: def.id });
        match (def.compute)(&convo.session, &self.config.rounding) {
            Ok(output) => {
                info!(task = ?def.id, "task completed");
                replies.push(Reply::Result { text: output.text });
                if let Some(chart) = output.chart {
                    replies.push(Reply::Chart { chart });
                }
            }
            Err(err) => {
                log_compute_failure(def.id, &err);
                replies.push(Reply::prompt(format!("Error: {err}")));
            }
        }
        convo.reset();
        replies.push(menu_reply());
    }
}

fn log_compute_failure(task: TaskId, err: &ComputeError) {
    warn!(?task, error = %err, "computation failed, returning to menu");
}

fn field_failure_message(field: &FieldSpec, failure: ValidationFailure) -> String {
    match (failure, field.kind) {
        (ValidationFailure::NegativeNotAllowed, _) => {
            format!("Please enter a non-negative numeric value for {}.", field.subject)
        }
        (_, ValueKind::Integer) => INTEGER_REQUIRED.to_string(),
        (_, ValueKind::Real) => NUMERIC_REQUIRED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ListPhase;
    use proptest::prelude::*;

    fn sequencer() -> Sequencer {
        let cfg = BotConfig::default();
        Sequencer::new(TaskRegistry::builtin(&cfg), cfg)
    }

    fn say(seq: &Sequencer, convo: &mut Conversation, text: &str) -> Vec<Reply> {
        seq.step(convo, &ReplyContent::Text(text.to_string()))
    }

    fn texts(replies: &[Reply]) -> Vec<&str> {
        replies.iter().filter_map(Reply::text).collect()
    }

    #[test]
    fn selecting_a_task_prompts_first_field() {
        let seq = sequencer();
        let mut c = seq.conversation();
        let replies = say(&seq, &mut c, "Find market equilibrium point");
        assert_eq!(
            c.state(),
            FlowState::AwaitingField { task: TaskId::MarketEquilibrium, index: 0 }
        );
        assert_eq!(texts(&replies).last(), Some(&"Enter coefficient A:"));
        assert!(replies.iter().all(|r| r.quick_replies() == [menu::BACK_LABEL]));
    }

    #[test]
    fn invalid_reply_keeps_state() {
        let seq = sequencer();
        let mut c = seq.conversation();
        say(&seq, &mut c, "Find market equilibrium point");
        say(&seq, &mut c, "2");
        let before = c.clone();

        let replies = say(&seq, &mut c, "two");
        assert_eq!(texts(&replies), [NUMERIC_REQUIRED]);
        assert_eq!(c, before);

        let replies = say(&seq, &mut c, "-1");
        assert_eq!(
            texts(&replies),
            ["Please enter a non-negative numeric value for coefficient B."]
        );
        assert_eq!(c, before);

        let replies = seq.step(&mut c, &ReplyContent::NonText);
        assert_eq!(texts(&replies), [NUMERIC_REQUIRED]);
        assert_eq!(c, before);
    }

    #[test]
    fn integer_field_asks_for_integer() {
        let seq = sequencer();
        let mut c = seq.conversation();
        say(&seq, &mut c, "Compute firm profit");
        let replies = say(&seq, &mut c, "12.5");
        assert_eq!(texts(&replies), [INTEGER_REQUIRED]);
        assert_eq!(c.session().field_count(), 0);
    }

    #[test]
    fn division_by_zero_reports_and_returns_to_menu() {
        let seq = sequencer();
        let mut c = seq.conversation();
        say(&seq, &mut c, "Find market equilibrium point");
        for v in ["0", "4", "10"] {
            say(&seq, &mut c, v);
        }
        let replies = say(&seq, &mut c, "0");
        let t = texts(&replies);
        assert!(t[0].starts_with("Error: division by zero"), "{t:?}");
        assert_eq!(t.last(), Some(&menu::MENU_PROMPT));
        assert_eq!(c.state(), FlowState::AtMenu);
        assert!(c.session().is_at_menu());
    }

    #[test]
    fn unknown_text_at_menu_redisplays_menu() {
        let seq = sequencer();
        let mut c = seq.conversation();
        let replies = say(&seq, &mut c, "hello");
        assert_eq!(replies, vec![menu_reply()]);
        let replies = seq.step(&mut c, &ReplyContent::NonText);
        assert_eq!(texts(&replies), [menu::UNSUPPORTED_CONTENT]);
        let replies = say(&seq, &mut c, "/start");
        assert_eq!(texts(&replies), [menu::GREETING, menu::MENU_PROMPT]);
        assert_eq!(c.state(), FlowState::AtMenu);
    }

    #[test]
    fn menu_labels_inside_a_task_are_field_input() {
        let seq = sequencer();
        let mut c = seq.conversation();
        say(&seq, &mut c, "Build aggregate PPF");
        let replies = say(&seq, &mut c, "Compute firm profit");
        assert_eq!(texts(&replies), [NUMERIC_REQUIRED]);
        assert_eq!(c.state().task(), Some(TaskId::AggregatePpf));
    }

    #[test]
    fn list_phase_malformed_and_negative_entries() {
        let seq = sequencer();
        let mut c = seq.conversation();
        for t in ["Compute firm profit", "10", "5"] {
            say(&seq, &mut c, t);
        }
        assert_eq!(
            c.state(),
            FlowState::AwaitingListEntry { task: TaskId::FirmProfit, list: CostKind::Fixed }
        );
        assert_eq!(texts(&say(&seq, &mut c, "rent 100")), [MALFORMED_COST]);
        assert_eq!(texts(&say(&seq, &mut c, "rent, -100")), [NEGATIVE_COST]);
        assert!(seq.step(&mut c, &ReplyContent::NonText)[0].text() == Some(NUMERIC_REQUIRED));
        assert_eq!(texts(&say(&seq, &mut c, "  ")), [NUMERIC_REQUIRED]);
        assert!(c.session().costs(CostKind::Fixed).is_empty());
    }

    #[test]
    fn full_list_still_accepts_done() {
        let cfg = BotConfig {
            max_cost_entries: 1,
            ..BotConfig::default()
        };
        let seq = Sequencer::new(TaskRegistry::builtin(&cfg), cfg);
        let mut c = seq.conversation();
        for t in ["Compute firm profit", "10", "5", "rent, 20"] {
            say(&seq, &mut c, t);
        }
        let replies = say(&seq, &mut c, "lease, 30");
        assert!(texts(&replies)[0].contains("maximum number of fixed costs (1)"));
        assert_eq!(c.session().costs(CostKind::Fixed).len(), 1);

        say(&seq, &mut c, "DONE");
        assert_eq!(
            c.state(),
            FlowState::AwaitingListEntry { task: TaskId::FirmProfit, list: CostKind::Variable }
        );
    }

    #[test]
    fn task_without_fields_goes_straight_to_lists() {
        let cfg = BotConfig::default();
        let registry = TaskRegistry::new(vec![TaskDefinition {
            id: TaskId::FirmProfit,
            intro: None,
            fields: Vec::new(),
            lists: vec![ListPhase { kind: CostKind::Variable, prompt: "costs?".into() }],
            compute: |_, _| Err(ComputeError::MissingField("Q")),
        }]);
        let seq = Sequencer::new(registry, cfg);
        let mut c = seq.conversation();
        assert_eq!(texts(&say(&seq, &mut c, "Compute firm profit")), ["costs?"]);
        let replies = say(&seq, &mut c, "done");
        assert_eq!(texts(&replies)[0], "Error: field `Q` has not been collected");
        assert_eq!(c.state(), FlowState::AtMenu);
    }

    #[test]
    fn unregistered_task_stays_at_menu() {
        let cfg = BotConfig::default();
        let seq = Sequencer::new(TaskRegistry::new(Vec::new()), cfg);
        let mut c = seq.conversation();
        assert_eq!(say(&seq, &mut c, "Compute firm profit"), vec![menu_reply()]);
        assert_eq!(c.state(), FlowState::AtMenu);
    }

    proptest! {
        #[test]
        fn back_from_any_point_clears_session(
            task in 0usize..4,
            steps in proptest::collection::vec(
                prop_oneof!["[0-9]{1,3}", "[a-z]{1,6}, [0-9]{1,3}", Just("done".to_string())],
                0..12,
            ),
            back in prop_oneof![Just("Back"), Just("back"), Just("НАЗАД")],
        ) {
            let seq = sequencer();
            let mut c = seq.conversation();
            say(&seq, &mut c, TaskId::ALL[task].menu_label());
            for s in &steps {
                say(&seq, &mut c, s);
            }
            let replies = say(&seq, &mut c, back);
            prop_assert_eq!(replies, vec![menu_reply()]);
            prop_assert_eq!(c.state(), FlowState::AtMenu);
            prop_assert!(c.session().is_at_menu());
            prop_assert_eq!(c.session().field_count(), 0);
            prop_assert!(c.session().costs(CostKind::Fixed).is_empty());
            prop_assert!(c.session().costs(CostKind::Variable).is_empty());
        }

        #[test]
        fn session_never_holds_rejected_values(inputs in proptest::collection::vec("-?[0-9a-z.]{0,4}", 0..8)) {
            let seq = sequencer();
            let mut c = seq.conversation();
            say(&seq, &mut c, "Compute surplus/deficit volume");
            for raw in &inputs {
                let accepted_before = c.session().field_count();
                say(&seq, &mut c, raw);
                let accepted = validate(raw, ValueKind::Real, false).is_ok();
                if c.state().is_awaiting() {
                    prop_assert_eq!(c.session().field_count(), accepted_before + usize::from(accepted));
                }
            }
        }
    }
}
