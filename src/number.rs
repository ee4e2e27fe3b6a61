// 🔢 Decimal Number Validator
// Turns heterogeneous input into exact fixed-point decimals

use crate::error::{CalcError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::str::FromStr;

/// Fractional digits kept by aggregate statistics
pub const AGGREGATE_SCALE: u32 = 2;

// ============================================================================
// RAW OPERAND
// ============================================================================

/// RawOperand - a value before validation
///
/// Mirrors what can reach an operation from a caller: command-line tokens
/// arrive as `Str`, programmatic callers may pass ints, floats, or values
/// that must be rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOperand {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<RawOperand>),
    Map(Vec<(String, RawOperand)>),
    Null,
}

impl RawOperand {
    /// Runtime type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            RawOperand::Str(_) => "str",
            RawOperand::Int(_) => "int",
            RawOperand::Float(_) => "float",
            RawOperand::Bool(_) => "bool",
            RawOperand::List(_) => "list",
            RawOperand::Map(_) => "map",
            RawOperand::Null => "null",
        }
    }
}

impl fmt::Display for RawOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawOperand::Str(s) => write!(f, "{}", s),
            RawOperand::Int(i) => write!(f, "{}", i),
            RawOperand::Float(x) => write!(f, "{}", x),
            RawOperand::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            RawOperand::List(items) => {
                let parts: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            RawOperand::Map(pairs) => {
                let parts: Vec<String> = pairs.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            RawOperand::Null => write!(f, "None"),
        }
    }
}

impl From<&str> for RawOperand {
    fn from(value: &str) -> Self {
        RawOperand::Str(value.to_string())
    }
}

impl From<String> for RawOperand {
    fn from(value: String) -> Self {
        RawOperand::Str(value)
    }
}

impl From<i64> for RawOperand {
    fn from(value: i64) -> Self {
        RawOperand::Int(value)
    }
}

impl From<i32> for RawOperand {
    fn from(value: i32) -> Self {
        RawOperand::Int(value as i64)
    }
}

impl From<f64> for RawOperand {
    fn from(value: f64) -> Self {
        RawOperand::Float(value)
    }
}

impl From<bool> for RawOperand {
    fn from(value: bool) -> Self {
        RawOperand::Bool(value)
    }
}

impl From<Decimal> for RawOperand {
    fn from(value: Decimal) -> Self {
        RawOperand::Str(value.to_string())
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Convert one operand, naming its position in any error
pub fn validate_number(value: &RawOperand, position: &str) -> Result<Decimal> {
    let reject = |reason: &str| {
        CalcError::type_error(value.to_string(), position, value.type_name(), reason)
    };

    match value {
        RawOperand::Bool(_) => Err(reject("Boolean values are not allowed.")),
        RawOperand::Int(i) => Ok(Decimal::from(*i)),
        RawOperand::Float(x) => {
            if !x.is_finite() {
                return Err(reject("Expected a number."));
            }
            // Shortest round-trip text keeps 1.2 as 1.2 instead of its binary expansion
            parse_decimal(&x.to_string()).ok_or_else(|| reject("Expected a number."))
        }
        RawOperand::Str(s) => parse_decimal(s).ok_or_else(|| reject("Expected a number.")),
        RawOperand::List(_) | RawOperand::Map(_) | RawOperand::Null => {
            Err(reject("Expected a number."))
        }
    }
}

/// Validate exactly two operands for a binary operation
pub fn validate_pair(a: &RawOperand, b: &RawOperand) -> Result<(Decimal, Decimal)> {
    Ok((validate_number(a, "a")?, validate_number(b, "b")?))
}

/// Validate any number of operands for a variadic operation
pub fn validate_all(values: &[RawOperand]) -> Result<Vec<Decimal>> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| validate_number(v, &format!("values[{}]", i)))
        .collect()
}

/// Parse decimal text: plain (`-42.8`) or scientific (`1e3`)
///
/// Text that does not fit in 28 fractional digits is rejected rather than
/// rounded, so `0.00000000000000000000000000000001` never becomes `0`.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = Decimal::from_str_exact(trimmed) {
        return Some(value);
    }

    // from_scientific parses the mantissa with rounding, so check it exactly first
    let (mantissa, _) = trimmed.split_once(['e', 'E'])?;
    Decimal::from_str_exact(mantissa).ok()?;
    Decimal::from_scientific(trimmed).ok()
}

/// Round half-up (away from zero) to exactly `AGGREGATE_SCALE` digits
///
/// `round_dp` never adds digits, so the result is rescaled afterwards:
/// 20 becomes 20.00, 6.6666 becomes 6.67.
pub fn round_aggregate(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(AGGREGATE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(AGGREGATE_SCALE);
    rounded
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_validate_pair_converts_mixed_inputs() {
        assert_eq!(
            validate_pair(&RawOperand::Int(10), &RawOperand::Int(5)).unwrap(),
            (dec("10"), dec("5"))
        );
        assert_eq!(
            validate_pair(&"3.5".into(), &"1.2".into()).unwrap(),
            (dec("3.5"), dec("1.2"))
        );
        assert_eq!(
            validate_pair(&RawOperand::Int(0), &"-42.8".into()).unwrap(),
            (dec("0"), dec("-42.8"))
        );
    }

    #[test]
    fn test_float_keeps_short_representation() {
        let (a, b) = validate_pair(&RawOperand::Float(3.5), &RawOperand::Float(1.2)).unwrap();
        assert_eq!(a + b, dec("4.7"));
    }

    #[test]
    fn test_strings_are_trimmed_and_accept_scientific() {
        assert_eq!(validate_number(&"  7.25 ".into(), "a").unwrap(), dec("7.25"));
        assert_eq!(validate_number(&"1e3".into(), "a").unwrap(), dec("1000"));
    }

    #[test]
    fn test_inputs_beyond_decimal_precision_rejected() {
        let too_precise = vec![
            RawOperand::from("0.00000000000000000000000000000001"),
            RawOperand::from("1.0000000000000000000000000000000000001"),
            RawOperand::from("1.00000000000000000000000000001e0"),
            RawOperand::from("1e-40"),
            RawOperand::Float(1e-40),
        ];

        for value in too_precise {
            let err = validate_number(&value, "b").unwrap_err();
            assert!(
                err.to_string().contains("Expected a number"),
                "{} should be rejected instead of rounded",
                value
            );
        }

        // 28 fractional digits still fit exactly
        let edge = "0.0000000000000000000000000001";
        assert_eq!(validate_number(&edge.into(), "a").unwrap().to_string(), edge);
        assert_eq!(validate_number(&"25e-2".into(), "a").unwrap(), dec("0.25"));
    }

    #[test]
    fn test_boolean_rejected_with_position_and_type() {
        let err = validate_pair(&RawOperand::Bool(true), &RawOperand::Int(5)).unwrap_err();
        match err {
            CalcError::Type { position, type_name, reason, .. } => {
                assert_eq!(position, "a");
                assert_eq!(type_name, "bool");
                assert!(reason.contains("Boolean values are not allowed"));
            }
            other => panic!("expected type error, got {:?}", other),
        }

        let err = validate_pair(&RawOperand::Int(10), &RawOperand::Bool(false)).unwrap_err();
        assert!(matches!(err, CalcError::Type { ref position, .. } if position == "b"));
    }

    #[test]
    fn test_non_numeric_inputs_rejected() {
        let bad = vec![
            RawOperand::from("abc"),
            RawOperand::Null,
            RawOperand::List(vec![]),
            RawOperand::Map(vec![]),
            RawOperand::Float(f64::NAN),
            RawOperand::Float(f64::INFINITY),
            RawOperand::from(""),
        ];

        for value in bad {
            let err = validate_number(&value, "a").unwrap_err();
            assert!(
                err.to_string().contains("Expected a number"),
                "{} should be rejected as non-numeric",
                value
            );
        }
    }

    #[test]
    fn test_validate_all_reports_index() {
        let values = vec![RawOperand::from("1"), RawOperand::from("2"), RawOperand::from("x")];
        let err = validate_all(&values).unwrap_err();
        assert!(matches!(err, CalcError::Type { ref position, .. } if position == "values[2]"));
    }

    #[test]
    fn test_round_aggregate_half_up_two_digits() {
        assert_eq!(round_aggregate(dec("20")).to_string(), "20.00");
        assert_eq!(round_aggregate(dec("6.666666")).to_string(), "6.67");
        assert_eq!(round_aggregate(dec("2.345")).to_string(), "2.35");
        assert_eq!(round_aggregate(dec("-2.345")).to_string(), "-2.35");
    }
}
