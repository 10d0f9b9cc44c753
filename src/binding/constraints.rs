//! Constraint checks applied after a value has been coerced.

use crate::binding::args::Bound;
use crate::binding::error::ErrorKind;
use crate::binding::spec::Constraints;

/// Every rule the value breaks, in declaration order.
pub fn check(constraints: &Constraints, value: &Bound) -> Vec<ErrorKind> {
    match value {
        Bound::Str(s) => check_str(constraints, s),
        other => other
            .as_f64()
            .map(|n| check_number(constraints, n))
            .unwrap_or_default(),
    }
}

fn check_str(constraints: &Constraints, value: &str) -> Vec<ErrorKind> {
    let mut violations = Vec::new();
    let chars = value.chars().count();

    if let Some(min) = constraints.min_length {
        if chars < min {
            violations.push(ErrorKind::StringTooShort(min));
        }
    }
    if let Some(max) = constraints.max_length {
        if chars > max {
            violations.push(ErrorKind::StringTooLong(max));
        }
    }
    // Pattern and validators only see values within the length bounds.
    if violations.is_empty() {
        if let Some(pattern) = &constraints.pattern {
            if !pattern.is_full_match(value) {
                violations.push(ErrorKind::PatternMismatch(pattern.as_str().to_string()));
            }
        }
    }
    if violations.is_empty() {
        for validator in &constraints.validators {
            if let Err(message) = validator(value) {
                violations.push(ErrorKind::Value(message));
                break;
            }
        }
    }
    violations
}

fn check_number(constraints: &Constraints, value: f64) -> Vec<ErrorKind> {
    let mut violations = Vec::new();
    if let Some(gt) = constraints.gt {
        if value <= gt {
            violations.push(ErrorKind::GreaterThan(gt));
        }
    }
    if let Some(ge) = constraints.ge {
        if value < ge {
            violations.push(ErrorKind::GreaterThanEqual(ge));
        }
    }
    if let Some(lt) = constraints.lt {
        if value >= lt {
            violations.push(ErrorKind::LessThan(lt));
        }
    }
    if let Some(le) = constraints.le {
        if value > le {
            violations.push(ErrorKind::LessThanEqual(le));
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::spec::{Pattern, Validator};

    fn length_and_pattern() -> Constraints {
        Constraints {
            min_length: Some(3),
            max_length: Some(50),
            pattern: Some(Pattern::new("^fixedquery$").unwrap()),
            ..Constraints::default()
        }
    }

    #[test]
    fn test_string_bounds() {
        let c = length_and_pattern();
        assert!(check(&c, &Bound::Str("fixedquery".into())).is_empty());
        assert_eq!(check(&c, &Bound::Str("xx".into())), vec![ErrorKind::StringTooShort(3)]);
        assert_eq!(
            check(&c, &Bound::Str("other".into())),
            vec![ErrorKind::PatternMismatch("^fixedquery$".into())]
        );
        assert_eq!(check(&c, &Bound::Str("x".repeat(51))), vec![ErrorKind::StringTooLong(50)]);
    }

    #[test]
    fn test_length_counts_characters() {
        let c = Constraints {
            max_length: Some(3),
            ..Constraints::default()
        };
        assert!(check(&c, &Bound::Str("äöü".into())).is_empty());
    }

    #[test]
    fn test_numeric_bounds_exclusive_and_inclusive() {
        let c = Constraints {
            gt: Some(1.0),
            le: Some(100.0),
            ..Constraints::default()
        };
        assert_eq!(check(&c, &Bound::Int(1)), vec![ErrorKind::GreaterThan(1.0)]);
        assert!(check(&c, &Bound::Int(2)).is_empty());
        assert!(check(&c, &Bound::Int(100)).is_empty());
        assert_eq!(check(&c, &Bound::Int(101)), vec![ErrorKind::LessThanEqual(100.0)]);
        assert!(check(&c, &Bound::Float(1.5)).is_empty());
        let huge = serde_json::from_str("123456789012345678901234567890").unwrap();
        assert_eq!(check(&c, &Bound::BigInt(huge)), vec![ErrorKind::LessThanEqual(100.0)]);
    }

    #[test]
    fn test_custom_validator_message() {
        fn must_be_upper(value: &str) -> Result<(), String> {
            if value.chars().all(|c| c.is_ascii_uppercase()) {
                Ok(())
            } else {
                Err("shout it".to_string())
            }
        }

        let c = Constraints {
            validators: vec![must_be_upper as Validator],
            ..Constraints::default()
        };
        assert!(check(&c, &Bound::Str("ABC".into())).is_empty());
        assert_eq!(check(&c, &Bound::Str("abc".into())), vec![ErrorKind::Value("shout it".into())]);
    }
}
