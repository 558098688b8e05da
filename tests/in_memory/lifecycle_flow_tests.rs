//! End-to-end status journeys through the lifecycle service.

use crate::in_memory::helpers::{TicketHarness, harness, open_request};
use chrono::TimeDelta;
use mockable::Clock;
use rstest::rstest;
use triage::ticket::{
    domain::{ProfileId, TicketDomainError, TicketId, TicketStatus},
    services::{OpenTicketRequest, TicketLifecycleError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn open_ticket_starts_waiting_with_trimmed_fields(harness: TicketHarness) {
    let customer = ProfileId::new();
    let request = OpenTicketRequest::new(
        "  Printer offline  ",
        "\tThe office printer rejects every job.\n",
        customer,
    )
    .with_estimated_time("  2 days  ");

    let ticket = harness
        .service
        .open_ticket(request)
        .await
        .expect("open should succeed");

    assert_eq!(ticket.status(), TicketStatus::Waiting);
    assert_eq!(ticket.summary(), "Printer offline");
    assert_eq!(
        ticket.problem_description(),
        "The office printer rejects every job."
    );
    assert_eq!(ticket.estimated_time(), Some("2 days"));
    assert_eq!(ticket.created_by(), customer);
    assert!(ticket.assigned_to().is_none());
    assert_eq!(ticket.created_at(), harness.clock.utc());
    assert_eq!(ticket.updated_at(), ticket.created_at());

    let stored = harness
        .service
        .find_ticket(ticket.id())
        .await
        .expect("lookup should succeed");
    assert_eq!(stored, Some(ticket));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn open_ticket_rejects_blank_summary(harness: TicketHarness) {
    let request = OpenTicketRequest::new("   ", "The printer is broken.", ProfileId::new());

    let result = harness.service.open_ticket(request).await;

    assert!(matches!(
        result,
        Err(TicketLifecycleError::Domain(
            TicketDomainError::EmptySummary
        ))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn confirmation_journey_reaches_completed(harness: TicketHarness) {
    let engineer = ProfileId::new();
    let opened = harness
        .service
        .open_ticket(open_request())
        .await
        .expect("open should succeed");

    harness.clock.advance(TimeDelta::minutes(1));
    let claimed = harness
        .service
        .claim(opened.id(), engineer)
        .await
        .expect("claim should succeed");
    assert_eq!(claimed.status(), TicketStatus::InProgress);
    assert_eq!(claimed.assigned_to(), Some(engineer));
    assert_eq!(claimed.claimed_at(), Some(harness.clock.utc()));

    harness.clock.advance(TimeDelta::minutes(1));
    let fixed = harness
        .service
        .mark_as_fixed(opened.id())
        .await
        .expect("mark as fixed should succeed");
    assert_eq!(fixed.status(), TicketStatus::AwaitingConfirmation);
    assert_eq!(fixed.marked_as_fixed_at(), Some(harness.clock.utc()));
    assert_eq!(
        fixed.auto_complete_timeout_at(),
        Some(harness.clock.utc() + TimeDelta::seconds(300))
    );

    harness.clock.advance(TimeDelta::minutes(1));
    let completed = harness
        .service
        .confirm_resolved(opened.id())
        .await
        .expect("confirmation should succeed");
    assert_eq!(completed.status(), TicketStatus::Completed);
    assert_eq!(completed.resolved_at(), Some(harness.clock.utc()));
    assert!(completed.auto_complete_timeout_at().is_none());
    assert_eq!(completed.assigned_to(), Some(engineer));

    let stored = harness
        .service
        .find_ticket(opened.id())
        .await
        .expect("lookup should succeed");
    assert_eq!(stored, Some(completed));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn each_transition_advances_the_update_timestamp(harness: TicketHarness) {
    let opened = harness
        .service
        .open_ticket(open_request())
        .await
        .expect("open should succeed");
    let mut previous = opened.updated_at();

    harness.clock.advance(TimeDelta::seconds(30));
    let claimed = harness
        .service
        .claim(opened.id(), ProfileId::new())
        .await
        .expect("claim should succeed");
    assert!(claimed.updated_at() > previous);
    previous = claimed.updated_at();

    harness.clock.advance(TimeDelta::seconds(30));
    let fixed = harness
        .service
        .mark_as_fixed(opened.id())
        .await
        .expect("mark as fixed should succeed");
    assert!(fixed.updated_at() > previous);
    previous = fixed.updated_at();

    harness.clock.advance(TimeDelta::seconds(30));
    let completed = harness
        .service
        .confirm_resolved(opened.id())
        .await
        .expect("confirmation should succeed");
    assert!(completed.updated_at() > previous);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_fix_returns_ticket_to_the_assignee(harness: TicketHarness) {
    let engineer = ProfileId::new();
    let opened = harness
        .service
        .open_ticket(open_request())
        .await
        .expect("open should succeed");
    harness
        .service
        .claim(opened.id(), engineer)
        .await
        .expect("claim should succeed");
    harness
        .service
        .mark_as_fixed(opened.id())
        .await
        .expect("mark as fixed should succeed");

    let rejected = harness
        .service
        .mark_still_broken(opened.id())
        .await
        .expect("rejection should succeed");

    assert_eq!(rejected.status(), TicketStatus::InProgress);
    assert_eq!(rejected.assigned_to(), Some(engineer));
    assert!(rejected.marked_as_fixed_at().is_none());
    assert!(rejected.auto_complete_timeout_at().is_none());

    // The fix/reject loop may repeat until the customer confirms.
    harness
        .service
        .mark_as_fixed(opened.id())
        .await
        .expect("second fix should succeed");
    let completed = harness
        .service
        .confirm_resolved(opened.id())
        .await
        .expect("confirmation should succeed");
    assert_eq!(completed.status(), TicketStatus::Completed);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn abandoned_ticket_rejoins_the_waiting_queue(harness: TicketHarness) {
    let first_engineer = ProfileId::new();
    let second_engineer = ProfileId::new();
    let opened = harness
        .service
        .open_ticket(open_request())
        .await
        .expect("open should succeed");
    harness
        .service
        .claim(opened.id(), first_engineer)
        .await
        .expect("claim should succeed");

    let abandoned = harness
        .service
        .abandon(opened.id())
        .await
        .expect("abandon should succeed");
    assert_eq!(abandoned.status(), TicketStatus::Waiting);
    assert!(abandoned.assigned_to().is_none());
    assert!(abandoned.claimed_at().is_none());

    let reclaimed = harness
        .service
        .claim(opened.id(), second_engineer)
        .await
        .expect("reclaim should succeed");
    assert_eq!(reclaimed.assigned_to(), Some(second_engineer));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn confirmation_before_any_fix_is_rejected(harness: TicketHarness) {
    let opened = harness
        .service
        .open_ticket(open_request())
        .await
        .expect("open should succeed");
    harness
        .service
        .claim(opened.id(), ProfileId::new())
        .await
        .expect("claim should succeed");

    let result = harness.service.confirm_resolved(opened.id()).await;

    assert!(matches!(
        result,
        Err(TicketLifecycleError::Domain(
            TicketDomainError::InvalidTransition {
                from: TicketStatus::InProgress,
                to: TicketStatus::Completed,
                ..
            }
        ))
    ));
    let stored = harness
        .service
        .find_ticket(opened.id())
        .await
        .expect("lookup should succeed")
        .expect("ticket should exist");
    assert_eq!(stored.status(), TicketStatus::InProgress);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_ticket_admits_no_further_transitions(
    harness: TicketHarness,
) -> Result<(), eyre::Report> {
    let opened = harness
        .service
        .open_ticket(open_request())
        .await
        .expect("open should succeed");
    harness
        .service
        .claim(opened.id(), ProfileId::new())
        .await
        .expect("claim should succeed");
    harness
        .service
        .mark_as_fixed(opened.id())
        .await
        .expect("mark as fixed should succeed");
    harness
        .service
        .confirm_resolved(opened.id())
        .await
        .expect("confirmation should succeed");

    let claim = harness.service.claim(opened.id(), ProfileId::new()).await;
    let reject = harness.service.mark_still_broken(opened.id()).await;
    let abandon = harness.service.abandon(opened.id()).await;

    for (name, result) in [("claim", claim), ("reject", reject), ("abandon", abandon)] {
        eyre::ensure!(
            matches!(
                result,
                Err(TicketLifecycleError::Domain(
                    TicketDomainError::InvalidTransition { .. }
                ))
            ),
            "{name} must be rejected on a completed ticket"
        );
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transitions_on_a_missing_ticket_report_not_found(harness: TicketHarness) {
    let unknown = TicketId::new();

    let result = harness.service.claim(unknown, ProfileId::new()).await;

    assert!(matches!(
        result,
        Err(TicketLifecycleError::NotFound(id)) if id == unknown
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn find_ticket_returns_none_for_an_unknown_id(harness: TicketHarness) {
    let found = harness
        .service
        .find_ticket(TicketId::new())
        .await
        .expect("lookup should succeed");
    assert!(found.is_none());
}
