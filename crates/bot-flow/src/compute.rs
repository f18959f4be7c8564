//! Adapters from a completed session to the econ computations, and the
//! text each task replies with.

use crate::config::RoundingPolicy;
use bot_core::{CostEntry, CostKind, Session};
use bot_econ::{
    equilibrium, imbalance, ppf_frontier, profit, ChartSpec, EconError, LinearMarket,
    MarketSituation, ProducerCapacity,
};
use rust_decimal::Decimal;
use thiserror::Error;

/// Result of a terminal computation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskOutput {
    pub text: String,
    pub chart: Option<ChartSpec>,
}

impl TaskOutput {
    fn text(text: String) -> Self {
        Self { text, chart: None }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComputeError {
    #[error(transparent)]
    Econ(#[from] EconError),
    /// The session lacks a value the computation needs.
    #[error("field `{0}` has not been collected")]
    MissingField(&'static str),
}

fn decimal(session: &Session, name: &'static str) -> Result<Decimal, ComputeError> {
    session.decimal(name).ok_or(ComputeError::MissingField(name))
}

fn linear_market(session: &Session) -> Result<LinearMarket, ComputeError> {
    Ok(LinearMarket {
        a: decimal(session, "A")?,
        b: decimal(session, "B")?,
        c: decimal(session, "C")?,
        d: decimal(session, "D")?,
    })
}

/// Round for display: banker's rounding, trailing zeros dropped, no `-0`.
pub fn display_decimal(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp(dp).normalize();
    if rounded.is_zero() {
        Decimal::ZERO.to_string()
    } else {
        rounded.to_string()
    }
}

pub fn aggregate_ppf(session: &Session, _: &RoundingPolicy) -> Result<TaskOutput, ComputeError> {
    let frontier = ppf_frontier(
        ProducerCapacity {
            max_a: decimal(session, "A1")?,
            max_b: decimal(session, "B1")?,
        },
        ProducerCapacity {
            max_a: decimal(session, "A2")?,
            max_b: decimal(session, "B2")?,
        },
    )?;
    let vertex = |name: &str, x: Decimal, y: Decimal| {
        format!("{name} = ({}, {})", x.normalize(), y.normalize())
    };
    let text = format!(
        "Aggregate PPF vertices:\n{}\n{}\n{}",
        vertex("A", frontier.a.x, frontier.a.y),
        vertex("B", frontier.b.x, frontier.b.y),
        vertex("C", frontier.c.x, frontier.c.y),
    );
    Ok(TaskOutput {
        text,
        chart: Some(frontier.chart()),
    })
}

pub fn market_equilibrium(
    session: &Session,
    rounding: &RoundingPolicy,
) -> Result<TaskOutput, ComputeError> {
    let eq = equilibrium(&linear_market(session)?)?;
    Ok(TaskOutput::text(format!(
        "Market equilibrium:\nPrice (P*): {}\nQuantity (Q*): {}",
        display_decimal(eq.price, rounding.price_dp),
        display_decimal(eq.quantity, rounding.quantity_dp),
    )))
}

pub fn surplus_deficit(
    session: &Session,
    rounding: &RoundingPolicy,
) -> Result<TaskOutput, ComputeError> {
    let gap = imbalance(&linear_market(session)?, decimal(session, "E")?)?;
    let price = gap.price_level.normalize();
    let text = match gap.situation {
        MarketSituation::Equilibrium => format!(
            "At a price level of {price} the market is in equilibrium: \
             there is no deficit or surplus."
        ),
        situation => format!(
            "At a price level of {price} the market is in a state of {}. \
             The {} volume is {} units of the good.",
            situation.describe(),
            situation.describe(),
            display_decimal(gap.magnitude(), rounding.amount_dp),
        ),
    };
    Ok(TaskOutput::text(text))
}

fn sources(entries: &[CostEntry], render: impl Fn(&CostEntry) -> String) -> String {
    if entries.is_empty() {
        return "none".to_string();
    }
    entries.iter().map(render).collect::<Vec<_>>().join(", ")
}

pub fn firm_profit(session: &Session, rounding: &RoundingPolicy) -> Result<TaskOutput, ComputeError> {
    let quantity = session.integer("Q").ok_or(ComputeError::MissingField("Q"))?;
    let unit_price = decimal(session, "P")?;
    let fixed = session.costs(CostKind::Fixed).entries();
    let variable = session.costs(CostKind::Variable).entries();
    let report = profit(quantity, unit_price, fixed, variable)?;
    let dp = rounding.amount_dp;
    let fixed_sources = sources(fixed, |e| format!("{}, {}", e.label, e.amount.normalize()));
    let variable_sources = sources(variable, |e| {
        format!("{} ({} per unit)", e.label, e.amount.normalize())
    });
    Ok(TaskOutput::text(format!(
        "Selling {quantity} units at {} per unit, with variable costs of {} per unit \
         (including: {variable_sources}) and fixed costs of {} \
         (including: {fixed_sources}), the profit is {}.",
        unit_price.normalize(),
        display_decimal(report.total_variable, dp),
        display_decimal(report.total_fixed, dp),
        display_decimal(report.profit, dp),
    )))
}
