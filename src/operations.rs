// 🧮 Operation Framework - arithmetic and statistics over validated decimals
// Closed set of builtins, open to new operations through the Operation trait

use crate::error::{CalcError, Result};
use crate::number::round_aggregate;
use rust_decimal::{Decimal, MathematicalOps};
use std::fmt;

// ============================================================================
// CORE TYPES
// ============================================================================

/// How many operands an operation takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly two operands
    Binary,
    /// One or more operands
    Variadic,
}

impl Arity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arity::Binary => "binary",
            Arity::Variadic => "variadic",
        }
    }
}

/// Operation - the capability every registered implementation must expose
///
/// Operands are already validated decimals. Implementations check their own
/// operand count and return `MalformedInput` when it does not fit.
///
/// New operations implement this trait and register themselves with an
/// `OperationRegistry`; nothing else needs to change.
pub trait Operation: Send + Sync {
    /// Lowercase registry key
    fn name(&self) -> &str;

    fn arity(&self) -> Arity;

    /// One-line summary for help output
    fn description(&self) -> &str {
        ""
    }

    fn execute(&self, operands: &[Decimal]) -> Result<Decimal>;
}

// ============================================================================
// BUILTIN OPERATIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Add,
    Subtract,
    Multiply,
    Divide,
    Mean,
    Median,
    StdDev,
    Variance,
}

impl Builtin {
    pub const ALL: [Builtin; 8] = [
        Builtin::Add,
        Builtin::Subtract,
        Builtin::Multiply,
        Builtin::Divide,
        Builtin::Mean,
        Builtin::Median,
        Builtin::StdDev,
        Builtin::Variance,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Builtin::Add => "add",
            Builtin::Subtract => "subtract",
            Builtin::Multiply => "multiply",
            Builtin::Divide => "divide",
            Builtin::Mean => "mean",
            Builtin::Median => "median",
            Builtin::StdDev => "std_dev",
            Builtin::Variance => "variance",
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            Builtin::Add => "sum of two numbers",
            Builtin::Subtract => "difference of two numbers",
            Builtin::Multiply => "product of two numbers",
            Builtin::Divide => "quotient of two numbers",
            Builtin::Mean => "arithmetic mean",
            Builtin::Median => "middle value",
            Builtin::StdDev => "sample standard deviation",
            Builtin::Variance => "sample variance",
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Operation for Builtin {
    fn name(&self) -> &str {
        self.key()
    }

    fn arity(&self) -> Arity {
        match self {
            Builtin::Add | Builtin::Subtract | Builtin::Multiply | Builtin::Divide => Arity::Binary,
            Builtin::Mean | Builtin::Median | Builtin::StdDev | Builtin::Variance => Arity::Variadic,
        }
    }

    fn description(&self) -> &str {
        self.summary()
    }

    fn execute(&self, operands: &[Decimal]) -> Result<Decimal> {
        match self {
            Builtin::Add => {
                let (a, b) = binary_operands(self, operands)?;
                a.checked_add(b).ok_or_else(|| overflow(self))
            }
            Builtin::Subtract => {
                let (a, b) = binary_operands(self, operands)?;
                a.checked_sub(b).ok_or_else(|| overflow(self))
            }
            Builtin::Multiply => {
                let (a, b) = binary_operands(self, operands)?;
                a.checked_mul(b).ok_or_else(|| overflow(self))
            }
            Builtin::Divide => {
                let (a, b) = binary_operands(self, operands)?;
                if b.is_zero() {
                    return Err(CalcError::DivideByZero);
                }
                a.checked_div(b)
                    .map(|q| q.normalize())
                    .ok_or_else(|| overflow(self))
            }
            Builtin::Mean => mean(operands).map(round_aggregate),
            Builtin::Median => median(operands).map(round_aggregate),
            Builtin::StdDev => {
                if operands.len() < 2 {
                    return Err(CalcError::MalformedInput(
                        "std_dev requires at least two values".to_string(),
                    ));
                }
                let var = sample_variance(operands)?;
                var.sqrt()
                    .map(round_aggregate)
                    .ok_or_else(|| CalcError::Internal(format!("square root of {} failed", var)))
            }
            Builtin::Variance => {
                if operands.len() == 1 {
                    return Ok(round_aggregate(Decimal::ZERO));
                }
                sample_variance(operands).map(round_aggregate)
            }
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn binary_operands(op: &Builtin, operands: &[Decimal]) -> Result<(Decimal, Decimal)> {
    match operands {
        [a, b] => Ok((*a, *b)),
        _ => Err(CalcError::MalformedInput(format!(
            "{} expects exactly 2 operands, got {}",
            op.key(),
            operands.len()
        ))),
    }
}

fn overflow(op: &Builtin) -> CalcError {
    CalcError::Internal(format!("{} overflowed the decimal range", op.key()))
}

fn require_values(operands: &[Decimal]) -> Result<()> {
    if operands.is_empty() {
        return Err(CalcError::MalformedInput(
            "at least one value is required".to_string(),
        ));
    }
    Ok(())
}

fn sum(values: &[Decimal]) -> Result<Decimal> {
    values.iter().try_fold(Decimal::ZERO, |acc, v| {
        acc.checked_add(*v)
            .ok_or_else(|| CalcError::Internal("sum overflowed the decimal range".to_string()))
    })
}

/// Unrounded arithmetic mean
fn mean(values: &[Decimal]) -> Result<Decimal> {
    require_values(values)?;
    let total = sum(values)?;
    Ok(total / Decimal::from(values.len()))
}

fn median(values: &[Decimal]) -> Result<Decimal> {
    require_values(values)?;
    let mut sorted = values.to_vec();
    sorted.sort();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Ok(sorted[mid])
    } else {
        sorted[mid - 1]
            .checked_add(sorted[mid])
            .map(|pair| pair / Decimal::TWO)
            .ok_or_else(|| CalcError::Internal("median overflowed the decimal range".to_string()))
    }
}

/// Sum of squared deviations over n - 1
fn sample_variance(values: &[Decimal]) -> Result<Decimal> {
    if values.len() < 2 {
        return Err(CalcError::MalformedInput(
            "variance requires at least two values".to_string(),
        ));
    }

    let avg = mean(values)?;
    let squares = values.iter().try_fold(Decimal::ZERO, |acc, v| {
        v.checked_sub(avg)
            .and_then(|diff| diff.checked_mul(diff))
            .and_then(|sq| acc.checked_add(sq))
            .ok_or_else(|| CalcError::Internal("variance overflowed the decimal range".to_string()))
    })?;

    Ok(squares / Decimal::from(values.len() - 1))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn decs(values: &[&str]) -> Vec<Decimal> {
        values.iter().map(|v| dec(v)).collect()
    }

    #[test]
    fn test_binary_operations() {
        let cases = [
            (Builtin::Add, "10", "5", "15"),
            (Builtin::Add, "3.5", "1.2", "4.7"),
            (Builtin::Add, "-8", "2", "-6"),
            (Builtin::Add, "100.50", "50.25", "150.75"),
            (Builtin::Subtract, "10", "5", "5"),
            (Builtin::Subtract, "3.5", "1.2", "2.3"),
            (Builtin::Subtract, "-8", "2", "-10"),
            (Builtin::Multiply, "3", "4", "12"),
            (Builtin::Multiply, "1.5", "2", "3.0"),
            (Builtin::Divide, "10", "2", "5"),
            (Builtin::Divide, "15.5", "2.5", "6.2"),
        ];

        for (op, a, b, expected) in cases {
            let result = op.execute(&[dec(a), dec(b)]).unwrap();
            assert_eq!(result, dec(expected), "{} {} {}", op, a, b);
        }
    }

    #[test]
    fn test_divide_by_zero() {
        let err = Builtin::Divide.execute(&decs(&["10", "0"])).unwrap_err();
        assert!(matches!(err, CalcError::DivideByZero));

        let err = Builtin::Divide.execute(&decs(&["10", "0.00"])).unwrap_err();
        assert!(matches!(err, CalcError::DivideByZero));
    }

    #[test]
    fn test_binary_rejects_wrong_operand_count() {
        let err = Builtin::Add.execute(&decs(&["1", "2", "3"])).unwrap_err();
        assert!(matches!(err, CalcError::MalformedInput(_)));

        let err = Builtin::Multiply.execute(&decs(&["1"])).unwrap_err();
        assert!(matches!(err, CalcError::MalformedInput(_)));
    }

    #[test]
    fn test_overflow_is_internal_error() {
        let err = Builtin::Multiply.execute(&[Decimal::MAX, Decimal::TWO]).unwrap_err();
        assert!(matches!(err, CalcError::Internal(_)));
    }

    #[test]
    fn test_mean_rounds_to_two_digits() {
        let result = Builtin::Mean.execute(&decs(&["10", "20", "30"])).unwrap();
        assert_eq!(result.to_string(), "20.00");

        let result = Builtin::Mean.execute(&decs(&["1", "2", "2"])).unwrap();
        assert_eq!(result.to_string(), "1.67");
    }

    #[test]
    fn test_median_odd_and_even() {
        let result = Builtin::Median.execute(&decs(&["3", "1", "2"])).unwrap();
        assert_eq!(result.to_string(), "2.00");

        let result = Builtin::Median.execute(&decs(&["4", "1", "3", "2"])).unwrap();
        assert_eq!(result.to_string(), "2.50");
    }

    #[test]
    fn test_variance_sample() {
        let result = Builtin::Variance.execute(&decs(&["2", "4", "6", "8"])).unwrap();
        assert_eq!(result.to_string(), "6.67");
    }

    #[test]
    fn test_variance_single_value_is_zero() {
        let result = Builtin::Variance.execute(&decs(&["42"])).unwrap();
        assert_eq!(result, Decimal::ZERO);
        assert_eq!(result.to_string(), "0.00");
    }

    #[test]
    fn test_std_dev() {
        let result = Builtin::StdDev.execute(&decs(&["2", "4", "4", "4", "5", "5", "7", "9"])).unwrap();
        assert_eq!(result.to_string(), "2.14");

        let err = Builtin::StdDev.execute(&decs(&["5"])).unwrap_err();
        assert!(matches!(err, CalcError::MalformedInput(_)));
    }

    #[test]
    fn test_aggregates_reject_empty_input() {
        for op in [Builtin::Mean, Builtin::Median, Builtin::StdDev, Builtin::Variance] {
            assert!(op.execute(&[]).is_err(), "{} should reject empty input", op);
        }
    }

    #[test]
    fn test_builtin_metadata() {
        assert_eq!(Builtin::ALL.len(), 8);
        assert_eq!(Builtin::StdDev.name(), "std_dev");
        assert_eq!(Builtin::Divide.arity(), Arity::Binary);
        assert_eq!(Builtin::Median.arity(), Arity::Variadic);
        assert!(!Builtin::Mean.description().is_empty());
    }
}
