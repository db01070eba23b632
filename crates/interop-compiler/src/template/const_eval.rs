//! Integral constant arithmetic.
//!
//! Values are carried as `i128` but every intermediate result must fit the
//! widest guest integer type (64 bits); anything wider is an overflow.

use interop_core::{BinaryOp, UnaryOp};

fn checked(value: Option<i128>, what: &str) -> Result<i128, String> {
    match value {
        Some(v) if i64::try_from(v).is_ok() || u64::try_from(v).is_ok() => Ok(v),
        _ => Err(format!("{what} overflows in constant expression")),
    }
}

pub fn unary(op: UnaryOp, value: i128) -> Result<i128, String> {
    match op {
        UnaryOp::Neg => checked(value.checked_neg(), "negation"),
        UnaryOp::Plus => Ok(value),
        UnaryOp::Not => Ok(i128::from(value == 0)),
        UnaryOp::BitNot => checked(Some(!value), "bitwise not"),
    }
}

pub fn binary(op: BinaryOp, lhs: i128, rhs: i128) -> Result<i128, String> {
    let result = match op {
        BinaryOp::Add => checked(lhs.checked_add(rhs), "addition")?,
        BinaryOp::Sub => checked(lhs.checked_sub(rhs), "subtraction")?,
        BinaryOp::Mul => checked(lhs.checked_mul(rhs), "multiplication")?,
        BinaryOp::Div | BinaryOp::Rem if rhs == 0 => {
            return Err("division by zero in constant expression".to_string());
        }
        BinaryOp::Div => checked(lhs.checked_div(rhs), "division")?,
        BinaryOp::Rem => checked(lhs.checked_rem(rhs), "remainder")?,
        BinaryOp::Eq => i128::from(lhs == rhs),
        BinaryOp::Ne => i128::from(lhs != rhs),
        BinaryOp::Lt => i128::from(lhs < rhs),
        BinaryOp::Le => i128::from(lhs <= rhs),
        BinaryOp::Gt => i128::from(lhs > rhs),
        BinaryOp::Ge => i128::from(lhs >= rhs),
        BinaryOp::And => i128::from(lhs != 0 && rhs != 0),
        BinaryOp::Or => i128::from(lhs != 0 || rhs != 0),
        BinaryOp::BitAnd => lhs & rhs,
        BinaryOp::BitOr => lhs | rhs,
        BinaryOp::BitXor => lhs ^ rhs,
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic() {
        assert_eq!(binary(BinaryOp::Add, 2, 3), Ok(5));
        assert_eq!(binary(BinaryOp::Sub, 2, 3), Ok(-1));
        assert_eq!(binary(BinaryOp::Mul, -4, 3), Ok(-12));
        assert_eq!(binary(BinaryOp::Div, 7, 2), Ok(3));
        assert_eq!(binary(BinaryOp::Rem, -7, 2), Ok(-1));
        assert_eq!(binary(BinaryOp::BitXor, 6, 3), Ok(5));
    }

    #[test]
    fn comparisons_and_logic_yield_bools() {
        assert_eq!(binary(BinaryOp::Lt, 1, 2), Ok(1));
        assert_eq!(binary(BinaryOp::Ge, 1, 2), Ok(0));
        assert_eq!(binary(BinaryOp::And, 5, 0), Ok(0));
        assert_eq!(binary(BinaryOp::Or, 0, -3), Ok(1));
        assert_eq!(unary(UnaryOp::Not, 7), Ok(0));
        assert_eq!(unary(UnaryOp::BitNot, 0), Ok(-1));
    }

    #[test]
    fn division_by_zero() {
        assert!(binary(BinaryOp::Div, 1, 0).is_err());
        assert!(binary(BinaryOp::Rem, 1, 0).is_err());
    }

    #[test]
    fn overflow_past_64_bits() {
        let max = i128::from(i64::MAX);
        assert!(binary(BinaryOp::Mul, max, 4).is_err());
        assert_eq!(binary(BinaryOp::Add, max, 1), Ok(max + 1));
        assert!(unary(UnaryOp::Neg, i128::from(u64::MAX)).is_err());
    }
}
