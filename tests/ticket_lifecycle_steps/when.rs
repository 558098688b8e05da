//! When steps for ticket lifecycle BDD scenarios.

use super::world::{TicketWorld, run_async};
use chrono::TimeDelta;
use eyre::WrapErr;
use rstest_bdd_macros::when;
use triage::ticket::domain::ProfileId;

#[when("the customer confirms the fix")]
fn customer_confirms_fix(world: &mut TicketWorld) -> Result<(), eyre::Report> {
    let ticket_id = world
        .ticket_id
        .ok_or_else(|| eyre::eyre!("no ticket opened in scenario world"))?;
    run_async(world.service.confirm_resolved(ticket_id)).wrap_err("confirm resolution")?;
    Ok(())
}

#[when("the customer reports the problem persists")]
fn customer_reports_problem_persists(world: &mut TicketWorld) -> Result<(), eyre::Report> {
    let ticket_id = world
        .ticket_id
        .ok_or_else(|| eyre::eyre!("no ticket opened in scenario world"))?;
    run_async(world.service.mark_still_broken(ticket_id)).wrap_err("reject the fix")?;
    Ok(())
}

#[when("the engineer abandons the ticket")]
fn engineer_abandons_ticket(world: &mut TicketWorld) -> Result<(), eyre::Report> {
    let ticket_id = world
        .ticket_id
        .ok_or_else(|| eyre::eyre!("no ticket opened in scenario world"))?;
    run_async(world.service.abandon(ticket_id)).wrap_err("abandon ticket")?;
    Ok(())
}

#[when("the confirmation window lapses without a customer response")]
fn confirmation_window_lapses(world: &mut TicketWorld) -> Result<(), eyre::Report> {
    world.clock.advance(TimeDelta::seconds(301));
    run_async(world.service.sweep_auto_complete()).wrap_err("sweep lapsed tickets")?;
    Ok(())
}

#[when("a second engineer attempts to claim the ticket")]
fn second_engineer_attempts_claim(world: &mut TicketWorld) -> Result<(), eyre::Report> {
    let ticket_id = world
        .ticket_id
        .ok_or_else(|| eyre::eyre!("no ticket opened in scenario world"))?;
    let result = run_async(world.service.claim(ticket_id, ProfileId::new()));
    world.last_claim_result = Some(result);
    Ok(())
}
