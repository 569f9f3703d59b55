//! Reconciliation health taxonomy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::condition::{self, Condition, ConditionStatus, find_condition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HealthStatus {
    Ready,
    Reconciling,
    Stalled,
    Failed,
    Suspended,
    Unknown,
}

impl HealthStatus {
    /// Order used when tallying.
    pub const ALL: [HealthStatus; 6] = [
        HealthStatus::Ready,
        HealthStatus::Reconciling,
        HealthStatus::Failed,
        HealthStatus::Stalled,
        HealthStatus::Suspended,
        HealthStatus::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Reconciling => "Reconciling",
            Self::Stalled => "Stalled",
            Self::Failed => "Failed",
            Self::Suspended => "Suspended",
            Self::Unknown => "Unknown",
        }
    }

    pub fn is_unhealthy(self) -> bool {
        matches!(self, Self::Failed | Self::Stalled)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collapses a status-condition set into one health value.
///
/// Precedence, first match wins: suspended, `Stalled=True`,
/// `Reconciling=True`, missing `Ready`, `Ready=True` (stale generation reads
/// as reconciling), `Ready=False`. Everything else is `Unknown`.
pub fn evaluate(
    conditions: &[Condition],
    generation: i64,
    observed_generation: i64,
    suspended: bool,
) -> HealthStatus {
    if suspended {
        return HealthStatus::Suspended;
    }

    if is_true(conditions, condition::STALLED) {
        return HealthStatus::Stalled;
    }

    if is_true(conditions, condition::RECONCILING) {
        return HealthStatus::Reconciling;
    }

    let Some(ready) = find_condition(conditions, condition::READY) else {
        return HealthStatus::Unknown;
    };

    match ready.status {
        ConditionStatus::True if generation != observed_generation => HealthStatus::Reconciling,
        ConditionStatus::True => HealthStatus::Ready,
        ConditionStatus::False => HealthStatus::Failed,
        ConditionStatus::Unknown => HealthStatus::Unknown,
    }
}

fn is_true(conditions: &[Condition], r#type: &str) -> bool {
    find_condition(conditions, r#type)
        .map(|condition| condition.status == ConditionStatus::True)
        .unwrap_or(false)
}
