//! The approval gate: suspend a gated operation until an operator decides.
//!
//! ## Protocol
//!
//! For each gated call, while the gate is enabled:
//!
//! 1. A `pending` [`ApprovalRecord`] is created and added to the store.
//! 2. Every `poll_interval` the gate first checks the elapsed time against the
//!    approval window, then re-reads the record:
//!    - window elapsed → the record is deleted, the call fails with
//!      [`ApprovalError::Timeout`]. Timeout wins over an approval observed in
//!      the same iteration.
//!    - record gone → the call fails with [`ApprovalError::Rejected`]
//!      ([`RejectionReason::Withdrawn`]).
//!    - `approved` → the record is deleted and the operation runs once with the
//!      original arguments; its result is returned untouched.
//!    - `rejected` → the record is deleted and the call fails with
//!      [`ApprovalError::Rejected`] ([`RejectionReason::Explicit`]).
//!    - `pending` → sleep and repeat.
//!
//! When the gate is disabled the operation runs immediately and no record is
//! created. The gate never retries an operation.

use std::future::Future;
use std::sync::Arc;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, info_span, warn, Instrument};

use approvals::{
    ApprovalError, ApprovalId, ApprovalRecord, ApprovalStatus, ApprovalStore, CallArguments,
    GateConfig, OperationName, RejectionReason, Timestamp,
};

/// Wraps operations so that they only run after operator approval.
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct ApprovalGate {
    store: Arc<dyn ApprovalStore>,
    config: GateConfig,
}

impl ApprovalGate {
    /// Creates a gate over `store`.
    ///
    /// # Errors
    ///
    /// [`ApprovalError::Configuration`] if `config` fails validation.
    pub fn new(store: Arc<dyn ApprovalStore>, config: GateConfig) -> Result<Self, ApprovalError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Returns a reusable callable that gates every invocation of `op`.
    pub fn wrap<F>(&self, name: OperationName, op: F) -> GatedOperation<F> {
        GatedOperation {
            gate: self.clone(),
            name,
            op,
        }
    }

    /// Gates a single invocation of `op` with `args`.
    ///
    /// Gate failures ([`ApprovalError::Timeout`], [`ApprovalError::Rejected`],
    /// and store failures) are converted into the operation's own error type.
    /// Once the operation runs, whatever it returns is returned as is.
    pub async fn run<F, Fut, T, E>(
        &self,
        operation: &OperationName,
        args: CallArguments,
        op: F,
    ) -> Result<T, E>
    where
        F: FnOnce(CallArguments) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<ApprovalError>,
    {
        if !self.config.enabled {
            debug!(operation = %operation, "approval gate disabled; running operation directly");
            return op(args).await;
        }

        let span = info_span!("approval_gate", operation = %operation);
        self.await_approval(operation, &args).instrument(span).await?;
        op(args).await
    }

    /// Creates the record and polls until it is decided or the window elapses.
    ///
    /// Returns only once the request was approved and its record deleted. If
    /// polling fails on a store error the record is removed on a best-effort
    /// basis, so operators are never left approving a request nobody waits on.
    async fn await_approval(
        &self,
        operation: &OperationName,
        args: &CallArguments,
    ) -> Result<ApprovalId, ApprovalError> {
        let record = ApprovalRecord::pending(
            operation.clone(),
            args.clone(),
            Timestamp::now(),
            self.config.timeout,
        )?;
        let id = record.id();
        let expires_at = record.expires_at();
        self.store.add(record).await?;
        info!(approval_id = %id, %expires_at, "approval requested; waiting for operator decision");

        match self.poll(id, operation).await {
            Err(err) if !err.is_gate_refusal() => {
                if let Err(cleanup) = self.store.delete(id).await {
                    warn!(
                        approval_id = %id,
                        error = %cleanup,
                        "could not remove approval request after store failure"
                    );
                }
                Err(err)
            }
            outcome => outcome,
        }
    }

    async fn poll(
        &self,
        id: ApprovalId,
        operation: &OperationName,
    ) -> Result<ApprovalId, ApprovalError> {
        let started = Instant::now();
        loop {
            if started.elapsed() >= self.config.timeout {
                self.store.delete(id).await?;
                warn!(
                    approval_id = %id,
                    timeout_secs = self.config.timeout.as_secs_f64(),
                    "approval window elapsed without a decision"
                );
                return Err(ApprovalError::Timeout {
                    id,
                    operation: operation.clone(),
                });
            }

            match self.store.get(id).await?.map(|r| r.status()) {
                None => {
                    warn!(approval_id = %id, "approval request disappeared while pending");
                    return Err(ApprovalError::Rejected {
                        id,
                        operation: operation.clone(),
                        reason: RejectionReason::Withdrawn,
                    });
                }
                Some(ApprovalStatus::Approved) => {
                    self.store.delete(id).await?;
                    info!(
                        approval_id = %id,
                        waited_ms = started.elapsed().as_millis() as u64,
                        "approval granted; running operation"
                    );
                    return Ok(id);
                }
                Some(ApprovalStatus::Rejected) => {
                    self.store.delete(id).await?;
                    warn!(approval_id = %id, "approval rejected");
                    return Err(ApprovalError::Rejected {
                        id,
                        operation: operation.clone(),
                        reason: RejectionReason::Explicit,
                    });
                }
                Some(ApprovalStatus::Pending) => {}
            }

            sleep(self.config.poll_interval).await;
        }
    }
}

/// An operation bound to a gate and a name, produced by [`ApprovalGate::wrap`].
pub struct GatedOperation<F> {
    gate: ApprovalGate,
    name: OperationName,
    op: F,
}

impl<F> GatedOperation<F> {
    pub fn name(&self) -> &OperationName {
        &self.name
    }

    /// Invokes the wrapped operation behind the gate.
    pub async fn call<Fut, T, E>(&self, args: CallArguments) -> Result<T, E>
    where
        F: Fn(CallArguments) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<ApprovalError>,
    {
        self.gate.run(&self.name, args, &self.op).await
    }
}
