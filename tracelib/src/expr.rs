use thiserror::Error;

/// Failure to turn an address expression into an address
///
/// The simulator treats evaluation as an opaque fallible step: any failure makes the
/// affected row an error row and leaves the cache state alone
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not evaluate `{expr}`: {reason}")]
pub struct EvalError {
    pub expr: String,
    pub reason: String,
}

// Trace entries are written the way they appear on paper ("2^12 + 7", "2^10 +12"), so
// addresses are accepted as a small arithmetic language over unsigned integers: +, -, *,
// right-associative ^, and parentheses, with arbitrary interior whitespace. All arithmetic
// is checked; anything that leaves u64 is an evaluation failure rather than a wrap
peg::parser!(grammar arithmetic() for str {
    rule number() -> u64
        = n:$(['0'..='9']+) {? n.parse().or(Err("integer literal")) }

    rule atom() -> u64
        = "(" _ e:sum() _ ")" { e }
        / number()

    rule power() -> u64
        = b:atom() _ "^" _ e:power() {?
            u32::try_from(e)
                .ok()
                .and_then(|e| b.checked_pow(e))
                .ok_or("exponent out of range")
        }
        / atom()

    rule product() -> u64
        = x:power() tail:(_ "*" _ y:power() { y })* {?
            tail.into_iter()
                .try_fold(x, |acc, y| acc.checked_mul(y))
                .ok_or("arithmetic overflow")
        }

    rule sum() -> u64
        = x:product() tail:(_ op:$(['+' | '-']) _ y:product() { (op, y) })* {?
            tail.into_iter()
                .try_fold(x, |acc, (op, y)| match op {
                    "+" => acc.checked_add(y),
                    _ => acc.checked_sub(y),
                })
                .ok_or("arithmetic overflow")
        }

    pub rule expression() -> u64
        = _ e:sum() _ { e }

    rule _() = quiet!{[' ' | '\t']*}
});

/// Evaluates an address expression to a concrete address
pub fn evaluate(expr: &str) -> Result<u64, EvalError> {
    arithmetic::expression(expr).map_err(|e| EvalError {
        expr: expr.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::evaluate;

    #[test]
    fn evaluates_plain_integers() {
        assert_eq!(evaluate("0").unwrap(), 0);
        assert_eq!(evaluate("63").unwrap(), 63);
        assert_eq!(evaluate(" 1024 ").unwrap(), 1024);
    }

    #[test]
    fn evaluates_exercise_style_expressions() {
        assert_eq!(evaluate("2^12 + 7").unwrap(), 4103);
        assert_eq!(evaluate("2^10 +7").unwrap(), 1031);
        assert_eq!(evaluate("2^12 + 2^8").unwrap(), 4352);
        assert_eq!(evaluate("2^15 +1").unwrap(), 32769);
    }

    #[test]
    fn exponentiation_binds_tighter_and_to_the_right() {
        assert_eq!(evaluate("2^2^3").unwrap(), 256);
        assert_eq!(evaluate("3*2^4").unwrap(), 48);
        assert_eq!(evaluate("(2+3)*4").unwrap(), 20);
        assert_eq!(evaluate("2^10 - 24").unwrap(), 1000);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(evaluate("").is_err());
        assert!(evaluate("seven").is_err());
        assert!(evaluate("2 +").is_err());
        assert!(evaluate("2^^3").is_err());
        assert!(evaluate("0x1F").is_err());
    }

    #[test]
    fn rejects_values_outside_u64() {
        assert!(evaluate("2^64").is_err());
        assert!(evaluate("1 - 2").is_err());
        assert!(evaluate("2^63 * 3").is_err());
    }

    #[test]
    fn error_carries_the_original_expression() {
        let err = evaluate("2**3").unwrap_err();
        assert_eq!(err.expr, "2**3");
    }
}
