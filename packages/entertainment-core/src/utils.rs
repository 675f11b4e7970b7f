//! General utilities shared across the crate.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Numeric values closer than this are considered equal.
pub const EPSILON: f64 = 1e-3;

// ─────────────────────────────────────────────────────────────────────────────
// Value Comparison
// ─────────────────────────────────────────────────────────────────────────────

/// Returns whether two state values should be treated as a change.
///
/// - absent vs present: different
/// - strings: different when not equal
/// - numbers: different when further apart than [`EPSILON`]
/// - anything else: structural inequality
#[must_use]
pub fn are_different(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => false,
        (None, Some(_)) | (Some(_), None) => true,
        (Some(Value::String(a)), Some(Value::String(b))) => a != b,
        (Some(a @ Value::Number(_)), Some(b @ Value::Number(_))) => {
            are_divergent(a.as_f64(), b.as_f64())
        }
        (Some(a), Some(b)) => a != b,
    }
}

/// Returns whether two numbers are further apart than [`EPSILON`].
#[must_use]
pub fn are_divergent(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => (a - b).abs() > EPSILON,
        (a, b) => a.is_some() != b.is_some(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Range Mapping
// ─────────────────────────────────────────────────────────────────────────────

/// Scales `value` proportionally from `input` onto `output`.
///
/// Values outside `input` extrapolate linearly. An empty input range maps
/// everything to the start of `output`.
#[must_use]
pub fn map_value_to_range(value: f64, input: (f64, f64), output: (f64, f64)) -> f64 {
    let input_spread = input.1 - input.0;
    if input_spread == 0.0 {
        return output.0;
    }
    let output_spread = output.1 - output.0;
    let scaled = (value - input.0) / input_spread;
    output.0 + scaled * output_spread
}

// ─────────────────────────────────────────────────────────────────────────────
// State Tracking
// ─────────────────────────────────────────────────────────────────────────────

/// Snapshot of an entity's state as published by the registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub state: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

/// A state transition for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChanged {
    pub entity_id: String,
    #[serde(default)]
    pub old_state: Option<EntityState>,
    #[serde(default)]
    pub new_state: Option<EntityState>,
}

type StateCallback = Box<dyn Fn(&str, Option<&Value>, Option<&Value>) + Send + Sync>;

/// Forwards meaningful changes of one entity's state (or one attribute) to a callback.
///
/// Events for other entities, events without a new state, and transitions
/// where [`are_different`] says nothing changed are dropped.
pub struct StateTracker {
    entity_id: String,
    attribute: Option<String>,
    callback: StateCallback,
}

impl StateTracker {
    pub fn new<F>(entity_id: impl Into<String>, attribute: Option<String>, callback: F) -> Self
    where
        F: Fn(&str, Option<&Value>, Option<&Value>) + Send + Sync + 'static,
    {
        Self {
            entity_id: entity_id.into(),
            attribute,
            callback: Box::new(callback),
        }
    }

    /// Processes one event. Returns `true` if the callback ran.
    pub fn handle(&self, event: &StateChanged) -> bool {
        if event.entity_id != self.entity_id {
            return false;
        }
        let Some(new_state) = event.new_state.as_ref() else {
            return false;
        };

        let new_value = self.extract(new_state);
        let old_value = event.old_state.as_ref().and_then(|s| self.extract(s));

        if !are_different(new_value.as_ref(), old_value.as_ref()) {
            return false;
        }

        (self.callback)(&self.entity_id, new_value.as_ref(), old_value.as_ref());
        true
    }

    fn extract(&self, state: &EntityState) -> Option<Value> {
        match &self.attribute {
            None => Some(Value::String(state.state.clone())),
            Some(attr) => state.attributes.get(attr).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn state(state: &str, attributes: Value) -> EntityState {
        EntityState {
            state: state.to_string(),
            attributes: attributes.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn presence_change_is_different() {
        assert!(are_different(None, Some(&json!("on"))));
        assert!(are_different(Some(&json!(1)), None));
        assert!(!are_different(None, None));
    }

    #[test]
    fn strings_differ_only_when_unequal() {
        assert!(!are_different(Some(&json!("playing")), Some(&json!("playing"))));
        assert!(are_different(Some(&json!("playing")), Some(&json!("paused"))));
    }

    #[test]
    fn numbers_within_epsilon_are_equal() {
        assert!(!are_different(Some(&json!(0.5)), Some(&json!(0.5004))));
        assert!(are_different(Some(&json!(0.5)), Some(&json!(0.51))));
        assert!(!are_different(Some(&json!(3)), Some(&json!(3.0))));
    }

    #[test]
    fn mixed_types_compare_structurally() {
        assert!(are_different(Some(&json!(true)), Some(&json!("true"))));
        assert!(!are_different(Some(&json!([1, 2])), Some(&json!([1, 2]))));
    }

    #[test]
    fn map_value_to_range_scales_proportionally() {
        assert_eq!(map_value_to_range(0.5, (0.0, 1.0), (0.0, 255.0)), 127.5);
        assert_eq!(map_value_to_range(50.0, (0.0, 100.0), (10.0, 20.0)), 15.0);
        assert_eq!(map_value_to_range(3.0, (3.0, 3.0), (0.0, 255.0)), 0.0);
    }

    #[test]
    fn tracker_reports_state_changes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let tracker = StateTracker::new("media_player.tv", None, move |id, new, old| {
            assert_eq!(id, "media_player.tv");
            assert_eq!(new, Some(&json!("on")));
            assert_eq!(old, Some(&json!("off")));
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        let event = StateChanged {
            entity_id: "media_player.tv".into(),
            old_state: Some(state("off", json!({}))),
            new_state: Some(state("on", json!({}))),
        };

        assert!(tracker.handle(&event));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn tracker_ignores_unchanged_and_foreign_events() {
        let tracker = StateTracker::new("media_player.tv", Some("volume_level".into()), |_, _, _| {
            panic!("callback should not run");
        });

        let unchanged = StateChanged {
            entity_id: "media_player.tv".into(),
            old_state: Some(state("on", json!({"volume_level": 0.4}))),
            new_state: Some(state("off", json!({"volume_level": 0.4}))),
        };
        let foreign = StateChanged {
            entity_id: "media_player.kitchen".into(),
            old_state: None,
            new_state: Some(state("on", json!({"volume_level": 0.9}))),
        };
        let removed = StateChanged {
            entity_id: "media_player.tv".into(),
            old_state: Some(state("on", json!({"volume_level": 0.4}))),
            new_state: None,
        };

        assert!(!tracker.handle(&unchanged));
        assert!(!tracker.handle(&foreign));
        assert!(!tracker.handle(&removed));
    }

    #[test]
    fn tracker_reports_attribute_appearing() {
        let tracker = StateTracker::new("media_player.tv", Some("source".into()), |_, new, old| {
            assert_eq!(new, Some(&json!("HDMI 1")));
            assert_eq!(old, None);
        });

        let event = StateChanged {
            entity_id: "media_player.tv".into(),
            old_state: Some(state("on", json!({}))),
            new_state: Some(state("on", json!({"source": "HDMI 1"}))),
        };

        assert!(tracker.handle(&event));
    }
}
