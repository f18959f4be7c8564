//! Parsing of raw replies into typed values.

use crate::{CostEntry, Value, ValueKind};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// Why a reply was not accepted for the field being collected.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationFailure {
    /// The reply does not parse as the expected numeric type.
    #[error("not a number")]
    NotANumber,
    /// The reply is a negative number and the field requires >= 0.
    #[error("negative value is not allowed")]
    NegativeNotAllowed,
    /// A cost entry lacking the `label, amount` shape or a numeric amount.
    #[error("expected `label, amount`")]
    MalformedPair,
}

/// Parse `raw` as `kind`, rejecting negatives unless `allow_negative`.
///
/// Surrounding whitespace is ignored. Reals accept plain (`12.5`) and
/// scientific (`1.25e1`) notation.
pub fn validate(raw: &str, kind: ValueKind, allow_negative: bool) -> Result<Value, ValidationFailure> {
    let text = raw.trim();
    let value = match kind {
        ValueKind::Integer => Value::Integer(
            text.parse::<i64>()
                .map_err(|_| ValidationFailure::NotANumber)?,
        ),
        ValueKind::Real => Value::Real(parse_decimal(text).ok_or(ValidationFailure::NotANumber)?),
    };
    if !allow_negative && value.is_negative() {
        return Err(ValidationFailure::NegativeNotAllowed);
    }
    Ok(value)
}

/// Parse a `"<label>, <amount>"` cost entry.
///
/// Splits on the first `", "`; everything after it must be a non-negative
/// number.
pub fn parse_cost_entry(raw: &str) -> Result<CostEntry, ValidationFailure> {
    let (label, amount) = raw
        .trim()
        .split_once(", ")
        .ok_or(ValidationFailure::MalformedPair)?;
    let amount = parse_decimal(amount.trim()).ok_or(ValidationFailure::MalformedPair)?;
    if amount < Decimal::ZERO {
        return Err(ValidationFailure::NegativeNotAllowed);
    }
    Ok(CostEntry {
        label: label.trim().to_string(),
        amount,
    })
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .ok()
        .or_else(|| Decimal::from_scientific(text).ok())
}
