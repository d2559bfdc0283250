//! Status conditions shared by every managed resource

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Type of condition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ConditionType {
    /// Whether the cloud resource is usable
    Ready,
    /// Whether the last reconciliation succeeded
    Synced,
}

/// Status: "True", "False", "Unknown"
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

/// Machine-readable reason for a condition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ConditionReason {
    Available,
    Creating,
    Deleting,
    Unavailable,
    ReconcileSuccess,
    ReconcileError,
}

/// Condition for managed resource status
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    #[serde(rename = "type")]
    pub condition_type: ConditionType,

    pub status: ConditionStatus,

    pub reason: ConditionReason,

    /// Human-readable message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the status of this condition changed (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

impl Condition {
    fn new(condition_type: ConditionType, status: ConditionStatus, reason: ConditionReason) -> Self {
        Self {
            condition_type,
            status,
            reason,
            message: None,
            last_transition_time: Some(Utc::now().to_rfc3339()),
        }
    }

    /// The cloud resource exists and is ready for use
    pub fn available() -> Self {
        Self::new(ConditionType::Ready, ConditionStatus::True, ConditionReason::Available)
    }

    /// The cloud resource is being created
    pub fn creating() -> Self {
        Self::new(ConditionType::Ready, ConditionStatus::False, ConditionReason::Creating)
    }

    /// The cloud resource is being deleted
    pub fn deleting() -> Self {
        Self::new(ConditionType::Ready, ConditionStatus::False, ConditionReason::Deleting)
    }

    /// The cloud resource exists but is not usable
    pub fn unavailable() -> Self {
        Self::new(ConditionType::Ready, ConditionStatus::False, ConditionReason::Unavailable)
    }

    pub fn reconcile_success() -> Self {
        Self::new(ConditionType::Synced, ConditionStatus::True, ConditionReason::ReconcileSuccess)
    }

    pub fn reconcile_error(message: impl Into<String>) -> Self {
        let mut condition =
            Self::new(ConditionType::Synced, ConditionStatus::False, ConditionReason::ReconcileError);
        condition.message = Some(message.into());
        condition
    }

    /// Equal apart from the transition time
    pub fn equivalent(&self, other: &Condition) -> bool {
        self.condition_type == other.condition_type
            && self.status == other.status
            && self.reason == other.reason
            && self.message == other.message
    }
}

/// Replace the condition of the same type, keeping the old transition time
/// when nothing but the timestamp would change.
pub fn set_condition(conditions: &mut Vec<Condition>, condition: Condition) {
    match conditions
        .iter_mut()
        .find(|c| c.condition_type == condition.condition_type)
    {
        Some(existing) if existing.equivalent(&condition) => {}
        Some(existing) => *existing = condition,
        None => conditions.push(condition),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_condition_replaces_same_type() {
        let mut conditions = vec![Condition::creating()];
        set_condition(&mut conditions, Condition::available());

        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].reason, ConditionReason::Available);
    }

    #[test]
    fn test_set_condition_keeps_transition_time() {
        let mut first = Condition::available();
        first.last_transition_time = Some("2024-01-01T00:00:00+00:00".to_string());
        let mut conditions = vec![first];

        set_condition(&mut conditions, Condition::available());
        assert_eq!(
            conditions[0].last_transition_time.as_deref(),
            Some("2024-01-01T00:00:00+00:00")
        );
    }

    #[test]
    fn test_set_condition_appends_new_type() {
        let mut conditions = vec![Condition::available()];
        set_condition(&mut conditions, Condition::reconcile_error("boom"));

        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[1].message.as_deref(), Some("boom"));
    }
}
