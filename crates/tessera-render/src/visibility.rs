//! Visibility evaluation.
//!
//! A component is visible when the principal holds one of its roles (if it
//! declares any) and every condition holds against the current state.
//! Conditions that cannot be evaluated are logged and count as false.

use serde_json::{Map, Value};
use tessera_types::{Component, Condition, Operator, Principal, State};

use crate::error::VisibilityEvaluationError;

/// Evaluate conditions against a state bag. An empty list is always true.
pub fn evaluate_visibility(conditions: &[Condition], state: &State) -> bool {
    evaluate_in(conditions, state.as_map())
}

/// Evaluate conditions against an arbitrary field map.
pub fn evaluate_in(conditions: &[Condition], fields: &Map<String, Value>) -> bool {
    conditions.iter().all(|condition| match evaluate_condition(condition, fields) {
        Ok(result) => result,
        Err(e) => {
            tracing::debug!(
                field = %condition.field,
                operator = %condition.operator,
                error = %e,
                "Visibility condition could not be evaluated, treating as false"
            );
            false
        }
    })
}

/// Evaluate one condition.
pub fn evaluate_condition(
    condition: &Condition,
    fields: &Map<String, Value>,
) -> Result<bool, VisibilityEvaluationError> {
    let actual = fields.get(&condition.field);
    let expected = &condition.value;

    match condition.operator {
        Operator::Eq => Ok(actual.is_some_and(|v| json_eq(v, expected))),
        Operator::Neq => Ok(!actual.is_some_and(|v| json_eq(v, expected))),
        Operator::Gt => compare(condition, actual).map(|o| o.is_some_and(|o| o.is_gt())),
        Operator::Lt => compare(condition, actual).map(|o| o.is_some_and(|o| o.is_lt())),
        Operator::Contains => contains(condition, actual),
        Operator::Exists => Ok(actual.is_some()),
    }
}

/// Whether `component` renders for this state and principal.
pub fn is_component_visible(component: &Component, state: &State, principal: Option<&Principal>) -> bool {
    let roles = component.roles();
    if !roles.is_empty() && !principal.is_some_and(|p| p.has_any_role(roles)) {
        tracing::trace!(component = %component.id, "Hidden by role gate");
        return false;
    }
    evaluate_visibility(component.conditions(), state)
}

/// Equality where numbers compare by value, so `1` equals `1.0`.
pub(crate) fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

fn compare(
    condition: &Condition,
    actual: Option<&Value>,
) -> Result<Option<std::cmp::Ordering>, VisibilityEvaluationError> {
    let non_numeric = || VisibilityEvaluationError::NonNumeric {
        field: condition.field.clone(),
        operator: if condition.operator == Operator::Gt { "gt" } else { "lt" },
    };

    let lhs = actual.and_then(Value::as_f64).ok_or_else(non_numeric)?;
    let rhs = condition.value.as_f64().ok_or_else(non_numeric)?;
    Ok(lhs.partial_cmp(&rhs))
}

fn contains(condition: &Condition, actual: Option<&Value>) -> Result<bool, VisibilityEvaluationError> {
    let unsupported = || VisibilityEvaluationError::UnsupportedOperand {
        field: condition.field.clone(),
    };

    match actual {
        None | Some(Value::Null) => Ok(false),
        Some(Value::String(haystack)) => {
            let needle = match &condition.value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return Err(unsupported()),
            };
            Ok(haystack.contains(&needle))
        }
        Some(Value::Array(items)) => Ok(items.iter().any(|item| json_eq(item, &condition.value))),
        Some(_) => Err(unsupported()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tessera_types::Visibility;

    fn state(value: Value) -> State {
        State::from_value(value)
    }

    fn cond(field: &str, operator: Operator, value: Value) -> Condition {
        Condition::new(field, operator, value)
    }

    #[test]
    fn test_empty_conditions_are_visible() {
        assert!(evaluate_visibility(&[], &State::new()));
        assert!(evaluate_visibility(&[], &state(json!({ "anything": [1, 2] }))));
    }

    #[test]
    fn test_eq_and_neq() {
        let s = state(json!({ "source_type": "upload", "count": 3 }));
        assert!(evaluate_visibility(&[cond("source_type", Operator::Eq, json!("upload"))], &s));
        assert!(!evaluate_visibility(&[cond("source_type", Operator::Neq, json!("upload"))], &s));
        assert!(evaluate_visibility(&[cond("count", Operator::Eq, json!(3.0))], &s));
        assert!(!evaluate_visibility(&[cond("count", Operator::Eq, json!("3"))], &s));
    }

    #[test]
    fn test_missing_field_equals_nothing() {
        let s = State::new();
        assert!(!evaluate_visibility(&[cond("x", Operator::Eq, Value::Null)], &s));
        assert!(evaluate_visibility(&[cond("x", Operator::Neq, json!("upload"))], &s));
    }

    #[test]
    fn test_gt_lt_numeric() {
        let s = state(json!({ "count": 7 }));
        assert!(evaluate_visibility(&[cond("count", Operator::Gt, json!(5))], &s));
        assert!(!evaluate_visibility(&[cond("count", Operator::Lt, json!(5))], &s));
        assert!(!evaluate_visibility(&[cond("count", Operator::Gt, json!(7))], &s));
    }

    #[test]
    fn test_gt_with_non_numeric_field_is_false() {
        let s = state(json!({ "count": "abc" }));
        let condition = cond("count", Operator::Gt, json!(5));
        assert!(!evaluate_visibility(&[condition.clone()], &s));
        assert!(matches!(
            evaluate_condition(&condition, s.as_map()),
            Err(VisibilityEvaluationError::NonNumeric { .. })
        ));
        // a numeric-looking string is still not a number
        let s = state(json!({ "count": "10" }));
        assert!(!evaluate_visibility(&[cond("count", Operator::Gt, json!(5))], &s));
        assert!(!evaluate_visibility(&[cond("count", Operator::Lt, json!(5))], &s));
    }

    #[test]
    fn test_contains() {
        let s = state(json!({ "name": "report.pdf", "tags": ["a", 2], "flag": null, "n": 4 }));
        assert!(evaluate_visibility(&[cond("name", Operator::Contains, json!(".pdf"))], &s));
        assert!(!evaluate_visibility(&[cond("name", Operator::Contains, json!(".csv"))], &s));
        assert!(evaluate_visibility(&[cond("tags", Operator::Contains, json!(2))], &s));
        assert!(!evaluate_visibility(&[cond("tags", Operator::Contains, json!("b"))], &s));
        assert!(!evaluate_visibility(&[cond("flag", Operator::Contains, json!("x"))], &s));
        assert!(!evaluate_visibility(&[cond("n", Operator::Contains, json!(4))], &s));
    }

    #[test]
    fn test_contains_on_missing_field_is_false() {
        assert!(!evaluate_visibility(&[cond("name", Operator::Contains, json!(""))], &State::new()));
    }

    #[test]
    fn test_exists_is_false_only_when_missing() {
        let s = state(json!({ "present": null }));
        assert!(evaluate_visibility(&[cond("present", Operator::Exists, Value::Null)], &s));
        assert!(!evaluate_visibility(&[cond("absent", Operator::Exists, Value::Null)], &s));
    }

    #[test]
    fn test_conditions_are_conjunctive() {
        let s = state(json!({ "a": 1, "b": 2 }));
        let both = [cond("a", Operator::Eq, json!(1)), cond("b", Operator::Eq, json!(2))];
        let one = [cond("a", Operator::Eq, json!(1)), cond("b", Operator::Eq, json!(3))];
        assert!(evaluate_visibility(&both, &s));
        assert!(!evaluate_visibility(&one, &s));
    }

    #[test]
    fn test_role_gate() {
        let mut component = Component::new("admin-panel", tessera_types::ComponentKind::Stats);
        component.visibility = Some(Visibility {
            roles: vec!["admin".to_string()],
            conditions: Vec::new(),
        });
        let s = State::new();

        assert!(!is_component_visible(&component, &s, None));
        assert!(!is_component_visible(&component, &s, Some(&Principal::new("u1").with_role("viewer"))));
        assert!(is_component_visible(&component, &s, Some(&Principal::new("u1").with_role("admin"))));
    }
}
