//! Task definitions: ordered fields, list phases and the terminal
//! computation of each menu entry.

use crate::compute::{self, ComputeError, TaskOutput};
use crate::config::{BotConfig, RoundingPolicy};
use crate::menu::DONE_LABEL;
use bot_core::{CostKind, Session, TaskId, ValueKind};

/// Runs once every field and list of a task is collected.
pub type Computation = fn(&Session, &RoundingPolicy) -> Result<TaskOutput, ComputeError>;

/// One prompt of a task and the value it expects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    /// Key under which the value is recorded in the session.
    pub name: &'static str,
    pub kind: ValueKind,
    pub prompt: &'static str,
    /// What the field is, as used in "non-negative value for ..." messages.
    pub subject: &'static str,
    pub allow_negative: bool,
}

impl FieldSpec {
    const fn non_negative(
        name: &'static str,
        kind: ValueKind,
        prompt: &'static str,
        subject: &'static str,
    ) -> Self {
        Self {
            name,
            kind,
            prompt,
            subject,
            allow_negative: false,
        }
    }
}

/// A repeating collection of `label, amount` entries ended by the sentinel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListPhase {
    pub kind: CostKind,
    pub prompt: String,
}

#[derive(Clone, Debug)]
pub struct TaskDefinition {
    pub id: TaskId,
    /// Sent before the first prompt.
    pub intro: Option<&'static str>,
    pub fields: Vec<FieldSpec>,
    /// Collected in order after the fields.
    pub lists: Vec<ListPhase>,
    pub compute: Computation,
}

impl TaskDefinition {
    pub fn list_phase(&self, kind: CostKind) -> Option<(usize, &ListPhase)> {
        self.lists
            .iter()
            .enumerate()
            .find(|(_, phase)| phase.kind == kind)
    }
}

const COEFFICIENTS_INTRO: &str = "The variables are coefficients of the demand and supply \
     functions: Qd = A*P - B, Qs = C - D*P.";

fn coefficient_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::non_negative("A", ValueKind::Real, "Enter coefficient A:", "coefficient A"),
        FieldSpec::non_negative("B", ValueKind::Real, "Enter coefficient B:", "coefficient B"),
        FieldSpec::non_negative("C", ValueKind::Real, "Enter coefficient C:", "coefficient C"),
        FieldSpec::non_negative("D", ValueKind::Real, "Enter coefficient D:", "coefficient D"),
    ]
}

fn ppf_task() -> TaskDefinition {
    TaskDefinition {
        id: TaskId::AggregatePpf,
        intro: None,
        fields: vec![
            FieldSpec::non_negative(
                "A1",
                ValueKind::Real,
                "Enter the maximum output of good A for producer 1:",
                "the maximum output of good A for producer 1",
            ),
            FieldSpec::non_negative(
                "B1",
                ValueKind::Real,
                "Enter the maximum output of good B for producer 1:",
                "the maximum output of good B for producer 1",
            ),
            FieldSpec::non_negative(
                "A2",
                ValueKind::Real,
                "Enter the maximum output of good A for producer 2:",
                "the maximum output of good A for producer 2",
            ),
            FieldSpec::non_negative(
                "B2",
                ValueKind::Real,
                "Enter the maximum output of good B for producer 2:",
                "the maximum output of good B for producer 2",
            ),
        ],
        lists: Vec::new(),
        compute: compute::aggregate_ppf,
    }
}

fn equilibrium_task() -> TaskDefinition {
    TaskDefinition {
        id: TaskId::MarketEquilibrium,
        intro: Some(COEFFICIENTS_INTRO),
        fields: coefficient_fields(),
        lists: Vec::new(),
        compute: compute::market_equilibrium,
    }
}

fn surplus_task() -> TaskDefinition {
    let mut fields = coefficient_fields();
    fields.push(FieldSpec::non_negative(
        "E",
        ValueKind::Real,
        "Enter the price level (E):",
        "the price level (E)",
    ));
    TaskDefinition {
        id: TaskId::SurplusDeficit,
        intro: Some(COEFFICIENTS_INTRO),
        fields,
        lists: Vec::new(),
        compute: compute::surplus_deficit,
    }
}

fn profit_task(max_cost_entries: usize) -> TaskDefinition {
    let list_prompt = |number: u8, heading: &str| {
        format!(
            "{number}. {heading}. Enter each as 'cost name, amount' \
             (send '{DONE_LABEL}' to finish, at most {max_cost_entries} costs):"
        )
    };
    TaskDefinition {
        id: TaskId::FirmProfit,
        intro: Some("To compute the firm's profit, enter the following data:"),
        fields: vec![
            FieldSpec::non_negative(
                "Q",
                ValueKind::Integer,
                "1. Production volume in units (Q):",
                "the production volume",
            ),
            FieldSpec::non_negative(
                "P",
                ValueKind::Real,
                "2. Price per unit (P):",
                "the price per unit",
            ),
        ],
        lists: vec![
            ListPhase {
                kind: CostKind::Fixed,
                prompt: list_prompt(3, "Fixed costs (FC)"),
            },
            ListPhase {
                kind: CostKind::Variable,
                prompt: list_prompt(4, "Variable costs per unit (VC)"),
            },
        ],
        compute: compute::firm_profit,
    }
}

/// Maps menu selections to task definitions.
#[derive(Clone, Debug)]
pub struct TaskRegistry {
    tasks: Vec<TaskDefinition>,
}

impl TaskRegistry {
    pub fn new(tasks: Vec<TaskDefinition>) -> Self {
        Self { tasks }
    }

    /// The four menu tasks.
    pub fn builtin(config: &BotConfig) -> Self {
        Self::new(vec![
            ppf_task(),
            equilibrium_task(),
            surplus_task(),
            profit_task(config.max_cost_entries),
        ])
    }

    pub fn resolve(&self, id: TaskId) -> Option<&TaskDefinition> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn tasks(&self) -> &[TaskDefinition] {
        &self.tasks
    }
}
