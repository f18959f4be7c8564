#![deny(warnings)]

//! Core data model for the economics tutor bot.
//!
//! This crate defines the identifiers, validated values and the
//! per-conversation session accumulator shared by the computation and flow
//! crates. It holds no conversation logic of its own.

mod validate;

pub use validate::{parse_cost_entry, validate, ValidationFailure};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identity of one chat conversation, as assigned by the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub i64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The selectable tasks, in menu order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskId {
    /// Aggregate production-possibility frontier of two producers.
    AggregatePpf,
    /// Equilibrium price and quantity of a linear market.
    MarketEquilibrium,
    /// Deficit or surplus volume at a given price level.
    SurplusDeficit,
    /// Firm profit from volume, price and itemised costs.
    FirmProfit,
}

impl TaskId {
    /// All tasks in the order the menu shows them.
    pub const ALL: [TaskId; 4] = [
        TaskId::AggregatePpf,
        TaskId::MarketEquilibrium,
        TaskId::SurplusDeficit,
        TaskId::FirmProfit,
    ];

    /// Button label shown in the menu.
    pub fn menu_label(self) -> &'static str {
        match self {
            TaskId::AggregatePpf => "Build aggregate PPF",
            TaskId::MarketEquilibrium => "Find market equilibrium point",
            TaskId::SurplusDeficit => "Compute surplus/deficit volume",
            TaskId::FirmProfit => "Compute firm profit",
        }
    }

    /// Resolve a menu reply to a task. Case-insensitive; surrounding
    /// whitespace is ignored.
    pub fn from_menu_label(text: &str) -> Option<TaskId> {
        let wanted = text.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|task| task.menu_label().to_lowercase() == wanted)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.menu_label())
    }
}

/// Numeric type a field expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    /// Whole number, e.g. a production volume in units.
    Integer,
    /// Decimal number, e.g. a price or a coefficient.
    Real,
}

/// A validated field value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Integer(i64),
    Real(Decimal),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::Real(_) => ValueKind::Real,
        }
    }

    /// The value as a decimal; integers convert exactly.
    pub fn to_decimal(&self) -> Decimal {
        match self {
            Value::Integer(i) => Decimal::from(*i),
            Value::Real(d) => *d,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Value::Integer(i) => *i < 0,
            Value::Real(d) => *d < Decimal::ZERO,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(d) => write!(f, "{d}"),
        }
    }
}

/// The two cost lists collected by the profit task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CostKind {
    Fixed,
    Variable,
}

impl CostKind {
    /// Adjective used in user-facing messages.
    pub fn adjective(self) -> &'static str {
        match self {
            CostKind::Fixed => "fixed",
            CostKind::Variable => "variable",
        }
    }
}

/// One labelled cost item, e.g. `("rent", 1000)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostEntry {
    pub label: String,
    /// Non-negative amount.
    pub amount: Decimal,
}

/// A cost list already holds its maximum number of entries.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("cost list already holds the maximum of {max} entries")]
pub struct ListCapacityExceeded {
    pub max: usize,
}

/// Bounded accumulator of cost entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CostList {
    entries: Vec<CostEntry>,
    max: usize,
}

impl CostList {
    pub fn new(max: usize) -> Self {
        Self {
            entries: Vec::with_capacity(max),
            max,
        }
    }

    /// Append an entry, returning the new length. A full list is left
    /// unchanged.
    pub fn push(&mut self, entry: CostEntry) -> Result<usize, ListCapacityExceeded> {
        if self.is_full() {
            return Err(ListCapacityExceeded { max: self.max });
        }
        self.entries.push(entry);
        Ok(self.entries.len())
    }

    pub fn entries(&self) -> &[CostEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.max
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Per-conversation accumulator for the task in progress.
///
/// Field values are kept in collection order. A session with no task is at
/// the menu; clearing it drops every field and empties both cost lists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    task: Option<TaskId>,
    fields: Vec<(&'static str, Value)>,
    fixed_costs: CostList,
    variable_costs: CostList,
}

impl Session {
    pub fn new(max_cost_entries: usize) -> Self {
        Self {
            task: None,
            fields: Vec::new(),
            fixed_costs: CostList::new(max_cost_entries),
            variable_costs: CostList::new(max_cost_entries),
        }
    }

    /// Start collecting for `task`, discarding anything gathered before.
    pub fn begin(&mut self, task: TaskId) {
        self.clear();
        self.task = Some(task);
    }

    pub fn task(&self) -> Option<TaskId> {
        self.task
    }

    pub fn is_at_menu(&self) -> bool {
        self.task.is_none()
    }

    /// Append a validated value under `name`.
    pub fn record(&mut self, name: &'static str, value: Value) {
        self.fields.push((name, value));
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    /// Decimal view of a collected field of either kind.
    pub fn decimal(&self, name: &str) -> Option<Decimal> {
        self.field(name).map(Value::to_decimal)
    }

    /// A collected integer field; `None` if absent or real-valued.
    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.field(name) {
            Some(Value::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    /// Collected fields in the order they were recorded.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn costs(&self, kind: CostKind) -> &CostList {
        match kind {
            CostKind::Fixed => &self.fixed_costs,
            CostKind::Variable => &self.variable_costs,
        }
    }

    pub fn costs_mut(&mut self, kind: CostKind) -> &mut CostList {
        match kind {
            CostKind::Fixed => &mut self.fixed_costs,
            CostKind::Variable => &mut self.variable_costs,
        }
    }

    /// Return to the menu with nothing collected.
    pub fn clear(&mut self) {
        self.task = None;
        self.fields.clear();
        self.fixed_costs.clear();
        self.variable_costs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(label: &str, cents: i64) -> CostEntry {
        CostEntry {
            label: label.to_string(),
            amount: Decimal::new(cents, 2),
        }
    }

    #[test]
    fn menu_labels_resolve_case_insensitively() {
        assert_eq!(
            TaskId::from_menu_label("find market equilibrium point"),
            Some(TaskId::MarketEquilibrium)
        );
        assert_eq!(
            TaskId::from_menu_label("  COMPUTE FIRM PROFIT "),
            Some(TaskId::FirmProfit)
        );
        assert_eq!(TaskId::from_menu_label("Compute profit"), None);
    }

    #[test]
    fn menu_order_is_fixed() {
        let labels: Vec<_> = TaskId::ALL.iter().map(|t| t.menu_label()).collect();
        assert_eq!(
            labels,
            [
                "Build aggregate PPF",
                "Find market equilibrium point",
                "Compute surplus/deficit volume",
                "Compute firm profit",
            ]
        );
    }

    #[test]
    fn session_keeps_collection_order() {
        let mut s = Session::new(5);
        s.begin(TaskId::FirmProfit);
        s.record("Q", Value::Integer(100));
        s.record("P", Value::Real(Decimal::new(50, 0)));
        let names: Vec<_> = s.fields().map(|(n, _)| n).collect();
        assert_eq!(names, ["Q", "P"]);
        assert_eq!(s.integer("Q"), Some(100));
        assert_eq!(s.integer("P"), None);
        assert_eq!(s.decimal("Q"), Some(Decimal::new(100, 0)));
    }

    #[test]
    fn begin_discards_previous_task() {
        let mut s = Session::new(2);
        s.begin(TaskId::FirmProfit);
        s.record("Q", Value::Integer(3));
        s.costs_mut(CostKind::Fixed).push(entry("rent", 100)).unwrap();
        s.begin(TaskId::AggregatePpf);
        assert_eq!(s.task(), Some(TaskId::AggregatePpf));
        assert_eq!(s.field_count(), 0);
        assert!(s.costs(CostKind::Fixed).is_empty());
    }

    #[test]
    fn clear_returns_to_menu() {
        let mut s = Session::new(2);
        s.begin(TaskId::FirmProfit);
        s.record("Q", Value::Integer(3));
        s.costs_mut(CostKind::Variable).push(entry("wood", 5)).unwrap();
        s.clear();
        assert!(s.is_at_menu());
        assert_eq!(s.field_count(), 0);
        assert!(s.costs(CostKind::Variable).is_empty());
    }

    #[test]
    fn cost_lists_are_independent() {
        let mut s = Session::new(1);
        s.costs_mut(CostKind::Fixed).push(entry("rent", 1)).unwrap();
        assert!(s.costs(CostKind::Fixed).is_full());
        assert!(s.costs_mut(CostKind::Variable).push(entry("wood", 1)).is_ok());
    }

    proptest! {
        #[test]
        fn full_list_rejects_and_keeps_length(max in 1usize..10, extra in 1usize..5) {
            let mut list = CostList::new(max);
            for i in 0..max {
                prop_assert_eq!(list.push(entry("item", i as i64)).unwrap(), i + 1);
            }
            for _ in 0..extra {
                prop_assert_eq!(list.push(entry("over", 1)), Err(ListCapacityExceeded { max }));
                prop_assert_eq!(list.len(), max);
            }
        }
    }
}
