#![deny(warnings)]

//! Closed-form economics behind the tutor bot's tasks.
//!
//! This module provides exact decimal computations for:
//! - Equilibrium of a linear market (Qd = A*P - B, Qs = C - D*P)
//! - Deficit/surplus volume at a given price level
//! - Firm profit from volume, unit price and itemised costs
//! - Vertices of the aggregate production-possibility frontier of two producers
//!
//! All arithmetic is checked; overflow is reported instead of panicking.

use bot_core::CostEntry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by the computations.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum EconError {
    /// A + D = 0: the slopes cancel and no unique equilibrium exists.
    #[error("division by zero: the denominator A + D is zero")]
    DivisionByZero,
    /// An intermediate value left the decimal range.
    #[error("numeric overflow: the values are too large")]
    Overflow,
}

/// Linear demand and supply: Qd = A*P - B, Qs = C - D*P.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearMarket {
    pub a: Decimal,
    pub b: Decimal,
    pub c: Decimal,
    pub d: Decimal,
}

impl LinearMarket {
    pub fn demand_at(&self, price: Decimal) -> Result<Decimal, EconError> {
        self.a
            .checked_mul(price)
            .and_then(|v| v.checked_sub(self.b))
            .ok_or(EconError::Overflow)
    }

    pub fn supply_at(&self, price: Decimal) -> Result<Decimal, EconError> {
        self.d
            .checked_mul(price)
            .and_then(|v| self.c.checked_sub(v))
            .ok_or(EconError::Overflow)
    }
}

/// Market-clearing price and quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equilibrium {
    pub price: Decimal,
    pub quantity: Decimal,
}

/// Solve Qd = Qs: P* = (C + B) / (A + D), Q* = A*P* - B.
///
/// Example:
/// let m = LinearMarket { a: 2.into(), b: 4.into(), c: 10.into(), d: 1.into() };
/// let e = equilibrium(&m).unwrap();
/// assert_eq!(e.price.round_dp(2), Decimal::new(467, 2));
pub fn equilibrium(market: &LinearMarket) -> Result<Equilibrium, EconError> {
    let denom = market
        .a
        .checked_add(market.d)
        .ok_or(EconError::Overflow)?;
    if denom.is_zero() {
        return Err(EconError::DivisionByZero);
    }
    let price = market
        .c
        .checked_add(market.b)
        .and_then(|num| num.checked_div(denom))
        .ok_or(EconError::Overflow)?;
    let quantity = market.demand_at(price)?;
    Ok(Equilibrium { price, quantity })
}

/// Which side of the market is short at a given price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketSituation {
    /// Demand exceeds supply.
    Deficit,
    /// Supply exceeds demand.
    Surplus,
    Equilibrium,
}

impl MarketSituation {
    pub fn describe(self) -> &'static str {
        match self {
            MarketSituation::Deficit => "deficit",
            MarketSituation::Surplus => "surplus",
            MarketSituation::Equilibrium => "equilibrium",
        }
    }
}

/// Demand/supply gap at a fixed price level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Imbalance {
    pub price_level: Decimal,
    pub demand: Decimal,
    pub supply: Decimal,
    /// demand - supply
    pub delta: Decimal,
    pub situation: MarketSituation,
}

impl Imbalance {
    /// Size of the deficit or surplus.
    pub fn magnitude(&self) -> Decimal {
        self.delta.abs()
    }
}

/// Deficit (delta > 0), surplus (delta < 0) or equilibrium at `price_level`.
pub fn imbalance(market: &LinearMarket, price_level: Decimal) -> Result<Imbalance, EconError> {
    let demand = market.demand_at(price_level)?;
    let supply = market.supply_at(price_level)?;
    let delta = demand.checked_sub(supply).ok_or(EconError::Overflow)?;
    let situation = if delta > Decimal::ZERO {
        MarketSituation::Deficit
    } else if delta < Decimal::ZERO {
        MarketSituation::Surplus
    } else {
        MarketSituation::Equilibrium
    };
    Ok(Imbalance {
        price_level,
        demand,
        supply,
        delta,
        situation,
    })
}

/// Totals behind a profit figure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitBreakdown {
    pub quantity: i64,
    pub unit_price: Decimal,
    pub total_fixed: Decimal,
    /// Per-unit variable cost.
    pub total_variable: Decimal,
    pub profit: Decimal,
}

/// Profit = Q * (P - total variable) - total fixed.
///
/// Variable costs are per unit of output; fixed costs are paid once.
pub fn profit(
    quantity: i64,
    unit_price: Decimal,
    fixed: &[CostEntry],
    variable: &[CostEntry],
) -> Result<ProfitBreakdown, EconError> {
    let total_fixed = sum_costs(fixed)?;
    let total_variable = sum_costs(variable)?;
    let profit = unit_price
        .checked_sub(total_variable)
        .and_then(|margin| Decimal::from(quantity).checked_mul(margin))
        .and_then(|contribution| contribution.checked_sub(total_fixed))
        .ok_or(EconError::Overflow)?;
    Ok(ProfitBreakdown {
        quantity,
        unit_price,
        total_fixed,
        total_variable,
        profit,
    })
}

fn sum_costs(entries: &[CostEntry]) -> Result<Decimal, EconError> {
    entries.iter().try_fold(Decimal::ZERO, |acc, entry| {
        acc.checked_add(entry.amount).ok_or(EconError::Overflow)
    })
}

/// Maximum output of each good for one producer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerCapacity {
    pub max_a: Decimal,
    pub max_b: Decimal,
}

/// A point in (good A, good B) output space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: Decimal,
    pub y: Decimal,
}

/// Vertices of the aggregate frontier: A on the x axis, the kink B, C on
/// the y axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PpfFrontier {
    pub a: Point,
    pub b: Point,
    pub c: Point,
}

/// Build the aggregate frontier of two producers.
///
/// A = (A1 + A2, 0), B = (max(A1, A2), max(B1, B2)), C = (0, B1 + B2).
pub fn ppf_frontier(
    first: ProducerCapacity,
    second: ProducerCapacity,
) -> Result<PpfFrontier, EconError> {
    let total_a = first
        .max_a
        .checked_add(second.max_a)
        .ok_or(EconError::Overflow)?;
    let total_b = first
        .max_b
        .checked_add(second.max_b)
        .ok_or(EconError::Overflow)?;
    Ok(PpfFrontier {
        a: Point {
            x: total_a,
            y: Decimal::ZERO,
        },
        b: Point {
            x: first.max_a.max(second.max_a),
            y: first.max_b.max(second.max_b),
        },
        c: Point {
            x: Decimal::ZERO,
            y: total_b,
        },
    })
}

/// A labelled vertex of a chart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub x: Decimal,
    pub y: Decimal,
}

/// A straight segment between two labelled vertices.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSegment {
    pub from: String,
    pub to: String,
}

/// Renderer-independent description of a line chart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ChartPoint>,
    pub segments: Vec<ChartSegment>,
}

impl PpfFrontier {
    /// Chart with the three vertices joined as A–B and B–C.
    pub fn chart(&self) -> ChartSpec {
        let point = |label: &str, p: Point| ChartPoint {
            label: label.to_string(),
            x: p.x,
            y: p.y,
        };
        let segment = |from: &str, to: &str| ChartSegment {
            from: from.to_string(),
            to: to.to_string(),
        };
        ChartSpec {
            title: "Aggregate PPF".to_string(),
            x_label: "quantity of good A".to_string(),
            y_label: "quantity of good B".to_string(),
            points: vec![point("A", self.a), point("B", self.b), point("C", self.c)],
            segments: vec![segment("A", "B"), segment("B", "C")],
        }
    }
}
