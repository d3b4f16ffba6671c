//! Shared value types for the approval domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values that participate in gate decisions: the lifecycle status of
//! a request, the wall-clock instants that bound its approval window, and the
//! captured arguments of the suspended call.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of an approval request.
///
/// The only valid transitions are `Pending → Approved` and `Pending → Rejected`.
/// The store does not enforce this; the `gate` crate's `ApprovalService` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    /// Waiting for an operator decision.
    Pending,
    /// An operator allowed the operation to run.
    Approved,
    /// An operator refused the operation.
    Rejected,
}

impl ApprovalStatus {
    /// Returns `true` for `Approved` and `Rejected`, either of which ends the
    /// gate's polling loop.
    pub fn is_terminal(self) -> bool {
        !matches!(self, ApprovalStatus::Pending)
    }

    /// Returns the lowercase wire name (`"pending"`, `"approved"`, `"rejected"`).
    pub fn as_str(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Call arguments
// ---------------------------------------------------------------------------

/// The captured arguments of a gated call.
///
/// An ordered positional list plus a named mapping. The gate stores this verbatim
/// in the approval record for operators to inspect and hands the same value back
/// to the operation once approved; it never interprets the contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallArguments {
    /// Positional arguments, in call order.
    #[serde(default)]
    pub positional: Vec<Value>,

    /// Named arguments.
    #[serde(default)]
    pub named: BTreeMap<String, Value>,
}

impl CallArguments {
    /// Creates an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    #[must_use]
    pub fn with_positional(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a named argument, replacing any previous value under `name`.
    #[must_use]
    pub fn with_named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    /// Returns the named argument `name`, if present.
    pub fn named(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }

    /// Returns `true` if there are no positional and no named arguments.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// Returns `self + duration`, or `None` if the result is not representable.
    pub fn checked_add(self, duration: Duration) -> Option<Self> {
        let delta = chrono::Duration::from_std(duration).ok()?;
        self.0.checked_add_signed(delta).map(Self)
    }

    /// Returns the time elapsed from `earlier` to `self`, or `None` if `earlier`
    /// is later than `self`.
    pub fn duration_since(self, earlier: Timestamp) -> Option<Duration> {
        (self.0 - earlier.0).to_std().ok()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_approved_and_rejected_are_terminal() {
        assert!(!ApprovalStatus::Pending.is_terminal());
        assert!(ApprovalStatus::Approved.is_terminal());
        assert!(ApprovalStatus::Rejected.is_terminal());
    }

    #[test]
    fn status_serialises_lowercase() {
        assert_eq!(
            serde_json::to_value(ApprovalStatus::Approved).unwrap(),
            json!("approved")
        );
        let parsed: ApprovalStatus = serde_json::from_value(json!("rejected")).unwrap();
        assert_eq!(parsed, ApprovalStatus::Rejected);
    }

    #[test]
    fn call_arguments_keep_positional_order() {
        let args = CallArguments::new()
            .with_positional("dify-helm")
            .with_positional(json!({"bump": "minor"}))
            .with_named("dry_run", false);

        assert_eq!(args.positional, vec![json!("dify-helm"), json!({"bump": "minor"})]);
        assert_eq!(args.named("dry_run"), Some(&json!(false)));
        assert!(!args.is_empty());
        assert!(CallArguments::new().is_empty());
    }

    #[test]
    fn call_arguments_deserialise_with_missing_sections() {
        let args: CallArguments = serde_json::from_value(json!({"named": {"tag": "v1"}})).unwrap();
        assert!(args.positional.is_empty());
        assert_eq!(args.named("tag"), Some(&json!("v1")));
    }

    #[test]
    fn timestamp_arithmetic() {
        let start = Timestamp::now();
        let later = start.checked_add(Duration::from_secs(120)).unwrap();
        assert_eq!(later.duration_since(start), Some(Duration::from_secs(120)));
        assert_eq!(start.duration_since(later), None);
        assert!(start.checked_add(Duration::MAX).is_none());
    }
}
