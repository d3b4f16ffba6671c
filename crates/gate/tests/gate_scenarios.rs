//! End-to-end approval scenarios against the file-backed store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use approvals::{
    ApprovalError, ApprovalId, ApprovalStore, CallArguments, GateConfig, OperationName,
    RejectionReason, StoreSelector,
};
use gate::{ApprovalGate, ApprovalService};
use store::ApprovalStoreBackend;

#[derive(Debug)]
enum WorkflowError {
    Approval(ApprovalError),
}

impl From<ApprovalError> for WorkflowError {
    fn from(err: ApprovalError) -> Self {
        WorkflowError::Approval(err)
    }
}

struct Harness {
    _dir: tempfile::TempDir,
    store: Arc<dyn ApprovalStore>,
    service: ApprovalService,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = ApprovalStoreBackend::open(&StoreSelector::File {
            path: dir.path().join("state").join("approvals.json"),
        })
        .unwrap()
        .into_shared();
        let service = ApprovalService::new(Arc::clone(&store));
        Self {
            _dir: dir,
            store,
            service,
        }
    }

    fn gate(&self, timeout: Duration, poll_interval: Duration) -> ApprovalGate {
        ApprovalGate::new(
            Arc::clone(&self.store),
            GateConfig {
                enabled: true,
                timeout,
                poll_interval,
            },
        )
        .unwrap()
    }

    async fn wait_for_pending(&self) -> ApprovalId {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(r) = self.service.list().await.unwrap().first() {
                    return r.id();
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("no approval request appeared")
    }
}

fn bump_version() -> OperationName {
    OperationName::new("bump_chart_version").unwrap()
}

fn bump_args() -> CallArguments {
    CallArguments::new()
        .with_positional("dify")
        .with_named("part", "minor")
}

async fn bump(calls: Arc<AtomicUsize>, args: CallArguments) -> Result<String, WorkflowError> {
    calls.fetch_add(1, Ordering::SeqCst);
    let chart = args.positional[0].as_str().unwrap_or("?").to_string();
    Ok(format!("{chart} bumped"))
}

#[tokio::test]
async fn scenario_a_no_decision_times_out() {
    let h = Harness::new();
    let gate = h.gate(Duration::from_secs(2), Duration::from_secs(1));
    let calls = Arc::new(AtomicUsize::new(0));

    let started = Instant::now();
    let c = calls.clone();
    let result = gate
        .run(&bump_version(), bump_args(), move |args| bump(c, args))
        .await;
    let elapsed = started.elapsed();

    match result {
        Err(WorkflowError::Approval(ApprovalError::Timeout { operation, .. })) => {
            assert_eq!(operation, bump_version());
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    assert!(elapsed >= Duration::from_secs(2));
    assert!(elapsed < Duration::from_secs(4));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(h.service.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn scenario_b_approval_after_one_poll_runs_operation_once() {
    let h = Harness::new();
    let gate = h.gate(Duration::from_secs(10), Duration::from_millis(100));
    let calls = Arc::new(AtomicUsize::new(0));

    let call = {
        let calls = calls.clone();
        tokio::spawn(async move {
            gate.run(&bump_version(), bump_args(), move |args| bump(calls, args))
                .await
        })
    };

    let id = h.wait_for_pending().await;
    tokio::time::sleep(Duration::from_millis(150)).await;
    h.service.approve(id).await.unwrap();

    let out = call.await.unwrap().unwrap();
    assert_eq!(out, "dify bumped");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(h.store.get(id).await.unwrap().is_none());
}

#[tokio::test]
async fn scenario_c_rejection_never_runs_operation() {
    let h = Harness::new();
    let gate = h.gate(Duration::from_secs(10), Duration::from_millis(50));
    let calls = Arc::new(AtomicUsize::new(0));

    let call = {
        let calls = calls.clone();
        tokio::spawn(async move {
            gate.run(&bump_version(), bump_args(), move |args| bump(calls, args))
                .await
        })
    };

    let id = h.wait_for_pending().await;
    h.service.reject(id).await.unwrap();

    match call.await.unwrap() {
        Err(WorkflowError::Approval(ApprovalError::Rejected {
            id: rejected,
            reason,
            ..
        })) => {
            assert_eq!(rejected, id);
            assert_eq!(reason, RejectionReason::Explicit);
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(h.service.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn scenario_d_disabled_gate_bypasses_store() {
    let h = Harness::new();
    let gate = ApprovalGate::new(Arc::clone(&h.store), GateConfig::disabled()).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let c = calls.clone();
    let out = gate
        .run(&bump_version(), bump_args(), move |args| bump(c, args))
        .await
        .unwrap();

    assert_eq!(out, "dify bumped");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(h.service.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn approving_one_of_two_concurrent_calls_leaves_the_other_pending() {
    let h = Harness::new();
    let gate = h.gate(Duration::from_secs(10), Duration::from_millis(20));
    let bump_op = Arc::new(gate.wrap(bump_version(), |args: CallArguments| async move {
        Ok::<_, WorkflowError>(args.named("part").cloned())
    }));

    let spawn_call = |part: &'static str| {
        let op = Arc::clone(&bump_op);
        tokio::spawn(async move { op.call(CallArguments::new().with_named("part", part)).await })
    };
    let major = spawn_call("major");
    let patch = spawn_call("patch");

    let records = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let records = h.service.list().await.unwrap();
            if records.len() == 2 {
                return records;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    assert_ne!(records[0].id(), records[1].id());

    let major_id = records
        .iter()
        .find(|r| r.arguments().named("part") == Some(&serde_json::json!("major")))
        .unwrap()
        .id();
    let patch_id = records.iter().find(|r| r.id() != major_id).unwrap().id();

    h.service.approve(major_id).await.unwrap();
    let out = major.await.unwrap().unwrap();
    assert_eq!(out, Some(serde_json::json!("major")));

    let still_waiting = h.service.get(patch_id).await.unwrap();
    assert_eq!(still_waiting.status(), approvals::ApprovalStatus::Pending);

    h.service.delete(patch_id).await.unwrap();
    match patch.await.unwrap() {
        Err(WorkflowError::Approval(ApprovalError::Rejected { reason, .. })) => {
            assert_eq!(reason, RejectionReason::Withdrawn)
        }
        other => panic!("expected withdrawn rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn management_actions_on_unknown_ids_fail_with_not_found() {
    let h = Harness::new();
    let missing = ApprovalId::new_random();

    assert!(matches!(
        h.service.approve(missing).await,
        Err(ApprovalError::NotFound { .. })
    ));
    assert!(matches!(
        h.service.reject(missing).await,
        Err(ApprovalError::NotFound { .. })
    ));
    assert!(matches!(
        h.service.get(missing).await,
        Err(ApprovalError::NotFound { .. })
    ));
    h.service.delete(missing).await.unwrap();
}
