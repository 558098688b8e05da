//! Confirmation deadlines and the auto-complete sweep.

use crate::in_memory::helpers::{
    TicketHarness, awaiting_confirmation_ticket, harness, open_request,
};
use chrono::TimeDelta;
use rstest::rstest;
use triage::ticket::{
    domain::{ProfileId, TicketDomainError, TicketStatus},
    services::TicketLifecycleError,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn auto_complete_before_the_deadline_is_rejected(harness: TicketHarness) {
    let (ticket, _) = awaiting_confirmation_ticket(&harness).await;
    harness.clock.advance(TimeDelta::seconds(299));

    let result = harness.service.auto_complete(ticket.id()).await;

    assert!(matches!(
        result,
        Err(TicketLifecycleError::Domain(
            TicketDomainError::InvalidTransition {
                from: TicketStatus::AwaitingConfirmation,
                to: TicketStatus::AutoCompleted,
                ..
            }
        ))
    ));
    let stored = harness
        .service
        .find_ticket(ticket.id())
        .await
        .expect("lookup should succeed")
        .expect("ticket should exist");
    assert_eq!(stored.status(), TicketStatus::AwaitingConfirmation);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn auto_complete_at_the_deadline_closes_the_ticket(harness: TicketHarness) {
    let (ticket, engineer) = awaiting_confirmation_ticket(&harness).await;
    harness.clock.advance(TimeDelta::seconds(300));

    let closed = harness
        .service
        .auto_complete(ticket.id())
        .await
        .expect("auto-complete should succeed at the deadline");

    assert_eq!(closed.status(), TicketStatus::AutoCompleted);
    assert_eq!(closed.resolved_at(), ticket.auto_complete_timeout_at());
    assert!(closed.auto_complete_timeout_at().is_none());
    assert_eq!(closed.assigned_to(), Some(engineer));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sweep_completes_only_tickets_whose_window_lapsed(harness: TicketHarness) {
    let (early, _) = awaiting_confirmation_ticket(&harness).await;
    harness.clock.advance(TimeDelta::minutes(2));
    let (late, _) = awaiting_confirmation_ticket(&harness).await;

    // Three minutes later the first window has lapsed, the second has not.
    harness.clock.advance(TimeDelta::minutes(3));
    let first_pass = harness
        .service
        .sweep_auto_complete()
        .await
        .expect("sweep should succeed");

    assert_eq!(first_pass.len(), 1);
    assert_eq!(first_pass[0].id(), early.id());
    assert_eq!(first_pass[0].status(), TicketStatus::AutoCompleted);
    let late_stored = harness
        .service
        .find_ticket(late.id())
        .await
        .expect("lookup should succeed")
        .expect("ticket should exist");
    assert_eq!(late_stored.status(), TicketStatus::AwaitingConfirmation);

    harness.clock.advance(TimeDelta::minutes(2));
    let second_pass = harness
        .service
        .sweep_auto_complete()
        .await
        .expect("sweep should succeed");
    assert_eq!(second_pass.len(), 1);
    assert_eq!(second_pass[0].id(), late.id());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_second_sweeper_finds_nothing_left(harness: TicketHarness) {
    let sibling = harness.sibling_service();
    let (ticket, _) = awaiting_confirmation_ticket(&harness).await;
    harness.clock.advance(TimeDelta::seconds(301));

    let first_sweep = harness
        .service
        .sweep_auto_complete()
        .await
        .expect("first sweep should succeed");
    let second_sweep = sibling
        .sweep_auto_complete()
        .await
        .expect("second sweep should succeed");

    assert_eq!(first_sweep.len(), 1);
    assert_eq!(first_sweep[0].id(), ticket.id());
    assert!(second_sweep.is_empty(), "the ticket must be swept only once");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sweep_leaves_customer_confirmed_tickets_alone(harness: TicketHarness) {
    let (ticket, _) = awaiting_confirmation_ticket(&harness).await;
    let confirmed = harness
        .service
        .confirm_resolved(ticket.id())
        .await
        .expect("confirmation should succeed");
    harness.clock.advance(TimeDelta::seconds(600));

    let swept = harness
        .service
        .sweep_auto_complete()
        .await
        .expect("sweep should succeed");

    assert!(swept.is_empty());
    let stored = harness
        .service
        .find_ticket(ticket.id())
        .await
        .expect("lookup should succeed")
        .expect("ticket should exist");
    assert_eq!(stored.status(), TicketStatus::Completed);
    assert_eq!(stored.resolved_at(), confirmed.resolved_at());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn confirmation_still_wins_inside_the_window(harness: TicketHarness) {
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
    harness.clock.advance(TimeDelta::seconds(299));

    let completed = harness
        .service
        .confirm_resolved(opened.id())
        .await
        .expect("confirmation inside the window should succeed");

    assert_eq!(completed.status(), TicketStatus::Completed);
}
