//! Status transitions, authorization and classification correction

use maint_core::{
    IssueStatus, IssueStore, LifecycleError, MaintError, NewIssue, Transition, TransitionPolicy,
};
use maint_test_utils::{
    admin_actor, contractor_actor, desk_with_memory_store, desk_with_policy, resident_actor,
    sample_reporter, upload_ok, Desk, PLUMBER_EMAIL,
};
use maint_triage::{Category, Priority, Triage};
use proptest::prelude::*;

async fn plumbing_issue(desk: &Desk) -> maint_core::Issue {
    desk.reporting
        .report_issue(sample_reporter(), upload_ok(), "leaking pipe")
        .await
        .unwrap()
        .issue
}

fn lifecycle_error(err: &MaintError) -> Option<&LifecycleError> {
    match err.root() {
        MaintError::Lifecycle(e) => Some(e),
        _ => None,
    }
}

#[tokio::test]
async fn assigned_contractor_moves_issue_forward() {
    let desk = desk_with_memory_store();
    let issue = plumbing_issue(&desk).await;
    assert_eq!(issue.assigned_contractor.as_str(), PLUMBER_EMAIL);

    let change = desk
        .reporting
        .update_status(&contractor_actor(PLUMBER_EMAIL), issue.id, IssueStatus::Assigned)
        .await
        .unwrap();

    assert_eq!(
        change.transition,
        Transition::Move {
            from: IssueStatus::Open,
            to: IssueStatus::Assigned
        }
    );
    assert_eq!(change.issue.status, IssueStatus::Assigned);
    assert_eq!(change.issue.created_at, issue.created_at);
    assert!(change.issue.updated_at >= issue.updated_at);
}

#[tokio::test]
async fn other_contractor_is_forbidden() {
    let desk = desk_with_memory_store();
    let issue = plumbing_issue(&desk).await;

    let err = desk
        .reporting
        .update_status(
            &contractor_actor("plumber2@resolve360.com"),
            issue.id,
            IssueStatus::Resolved,
        )
        .await
        .unwrap_err();

    assert_eq!(err.operation(), Some("update status"));
    assert!(matches!(
        lifecycle_error(&err),
        Some(LifecycleError::Forbidden { .. })
    ));
    let stored = desk.store.get_issue(issue.id).await.unwrap().unwrap();
    assert_eq!(stored.status, IssueStatus::Open);
}

#[tokio::test]
async fn residents_never_transition() {
    let desk = desk_with_memory_store();
    let issue = plumbing_issue(&desk).await;

    let err = desk
        .reporting
        .update_status(&resident_actor(), issue.id, IssueStatus::Resolved)
        .await
        .unwrap_err();
    assert!(matches!(
        lifecycle_error(&err),
        Some(LifecycleError::Forbidden { .. })
    ));
}

#[tokio::test]
async fn permissive_policy_allows_reopening() {
    let desk = desk_with_memory_store();
    let issue = plumbing_issue(&desk).await;
    let admin = admin_actor();

    desk.reporting
        .update_status(&admin, issue.id, IssueStatus::Resolved)
        .await
        .unwrap();
    let reopened = desk
        .reporting
        .update_status(&admin, issue.id, IssueStatus::Open)
        .await
        .unwrap();
    assert_eq!(reopened.issue.status, IssueStatus::Open);
}

#[tokio::test]
async fn monotonic_policy_rejects_backward_moves() {
    let desk = desk_with_policy(TransitionPolicy::Monotonic);
    let issue = plumbing_issue(&desk).await;
    let admin = admin_actor();

    desk.reporting
        .update_status(&admin, issue.id, IssueStatus::Resolved)
        .await
        .unwrap();
    let err = desk
        .reporting
        .update_status(&admin, issue.id, IssueStatus::Assigned)
        .await
        .unwrap_err();

    assert_eq!(
        lifecycle_error(&err),
        Some(&LifecycleError::IllegalTransition {
            from: IssueStatus::Resolved,
            to: IssueStatus::Assigned
        })
    );
}

#[tokio::test]
async fn same_status_request_writes_nothing() {
    let desk = desk_with_memory_store();
    let issue = plumbing_issue(&desk).await;

    let change = desk
        .reporting
        .update_status(&admin_actor(), issue.id, IssueStatus::Open)
        .await
        .unwrap();

    assert_eq!(change.transition, Transition::Unchanged(IssueStatus::Open));
    assert_eq!(change.issue.updated_at, issue.updated_at);
    let stored = desk.store.get_issue(issue.id).await.unwrap().unwrap();
    assert_eq!(stored.updated_at, issue.updated_at);
}

#[tokio::test]
async fn unknown_issue_is_not_found() {
    let desk = desk_with_memory_store();
    let missing = maint_core::IssueId::new();

    let err = desk
        .reporting
        .update_status(&admin_actor(), missing, IssueStatus::Resolved)
        .await
        .unwrap_err();
    assert_eq!(
        lifecycle_error(&err),
        Some(&LifecycleError::IssueNotFound(missing))
    );
}

#[tokio::test]
async fn admin_correction_rederives_priority_and_contractor() {
    let desk = desk_with_memory_store();
    let issue = plumbing_issue(&desk).await;

    let corrected = desk
        .reporting
        .correct_category(&admin_actor(), issue.id, Category::Electrical)
        .await
        .unwrap();

    assert_eq!(corrected.category, Category::Electrical);
    assert_eq!(corrected.priority, Priority::Critical);
    assert_eq!(corrected.assigned_contractor.as_str(), "electrician1@resolve360.com");
    assert_eq!(corrected.confidence, 1.0);
    assert_eq!(corrected.status, issue.status);
    assert_eq!(corrected.created_at, issue.created_at);
}

#[tokio::test]
async fn only_admins_correct_categories() {
    let desk = desk_with_memory_store();
    let issue = plumbing_issue(&desk).await;

    let err = desk
        .reporting
        .correct_category(&contractor_actor(PLUMBER_EMAIL), issue.id, Category::Civil)
        .await
        .unwrap_err();

    assert_eq!(err.operation(), Some("correct category"));
    let stored = desk.store.get_issue(issue.id).await.unwrap().unwrap();
    assert_eq!(stored.category, Category::Plumbing);
}

fn status() -> impl Strategy<Value = IssueStatus> {
    prop::sample::select(IssueStatus::ALL.to_vec())
}

proptest! {
    #[test]
    fn creation_always_yields_open(requested in status(), text in "[a-z ]{0,40}") {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let issue = runtime.block_on(async {
            let desk = desk_with_memory_store();
            let draft = NewIssue::from_triage(
                sample_reporter(),
                &upload_ok(),
                &text,
                Triage::default().triage(&text),
            )
            .with_requested_status(requested);
            desk.store.create_issue(draft).await.unwrap()
        });
        prop_assert_eq!(issue.status, IssueStatus::Open);
    }
}
