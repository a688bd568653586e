//! Completion estimation
//!
//! A draft's `progress` is a 0-100 estimate blending the wizard step
//! position (60%) with the ratio of filled leaf fields in the form data
//! (40%). Filling a field at a fixed step never decreases the estimate.

use serde_json::Value;

use crate::models::NavigationState;

const STEP_WEIGHT: f64 = 0.6;
const FIELD_WEIGHT: f64 = 0.4;

/// Estimate completion of a form snapshot, 0-100.
pub fn estimate_progress(form_data: &Value, navigation: &NavigationState) -> u8 {
    let step_ratio = if navigation.total_steps > 1 {
        let current = navigation.current_step.min(navigation.total_steps).max(1);
        f64::from(current - 1) / f64::from(navigation.total_steps - 1)
    } else if navigation.total_steps == 1 {
        1.0
    } else {
        0.0
    };

    let (filled, total) = count_leaf_fields(form_data);
    let field_ratio = if total > 0 {
        filled as f64 / total as f64
    } else {
        0.0
    };

    let blended = (STEP_WEIGHT * step_ratio + FIELD_WEIGHT * field_ratio) * 100.0;
    blended.round().clamp(0.0, 100.0) as u8
}

/// Count (filled, total) leaf fields in a form-data value.
///
/// A leaf is filled when it is a non-empty string, a number, or a boolean.
/// Empty strings, nulls, and empty containers count as unfilled leaves.
fn count_leaf_fields(value: &Value) -> (usize, usize) {
    match value {
        Value::Null => (0, 1),
        Value::Bool(_) | Value::Number(_) => (1, 1),
        Value::String(s) => (usize::from(!s.trim().is_empty()), 1),
        Value::Array(items) => {
            if items.is_empty() {
                (0, 1)
            } else {
                items.iter().map(count_leaf_fields).fold(
                    (0, 0),
                    |(filled, total), (f, t)| (filled + f, total + t),
                )
            }
        }
        Value::Object(map) => {
            if map.is_empty() {
                (0, 1)
            } else {
                map.values().map(count_leaf_fields).fold(
                    (0, 0),
                    |(filled, total), (f, t)| (filled + f, total + t),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nav(current: u32, total: u32) -> NavigationState {
        NavigationState {
            current_step: current,
            total_steps: total,
        }
    }

    #[test]
    fn test_empty_form_first_step_is_zero() {
        assert_eq!(estimate_progress(&json!({}), &nav(1, 9)), 0);
    }

    #[test]
    fn test_full_form_final_step_is_hundred() {
        let data = json!({"generalInfo": {"name": "Orders", "owner": "team-a"}, "retries": 3});
        assert_eq!(estimate_progress(&data, &nav(9, 9)), 100);
    }

    #[test]
    fn test_monotone_in_filled_fields_at_fixed_step() {
        let steps = nav(3, 9);
        let empty = json!({"name": "", "description": "", "endpoint": ""});
        let partial = json!({"name": "Orders", "description": "", "endpoint": ""});
        let full = json!({"name": "Orders", "description": "API", "endpoint": "/v1"});

        let p0 = estimate_progress(&empty, &steps);
        let p1 = estimate_progress(&partial, &steps);
        let p2 = estimate_progress(&full, &steps);
        assert!(p0 <= p1 && p1 <= p2);
    }

    #[test]
    fn test_step_position_advances_progress() {
        let data = json!({"name": "Orders"});
        let early = estimate_progress(&data, &nav(1, 9));
        let late = estimate_progress(&data, &nav(8, 9));
        assert!(late > early);
    }

    #[test]
    fn test_whitespace_only_strings_are_unfilled() {
        let (filled, total) = count_leaf_fields(&json!({"a": "   ", "b": "x"}));
        assert_eq!((filled, total), (1, 2));
    }

    #[test]
    fn test_current_step_clamped_to_total() {
        let data = json!({"name": "Orders"});
        assert_eq!(estimate_progress(&data, &nav(12, 9)), 100);
    }
}
