//! Given steps for ticket lifecycle BDD scenarios.

use super::world::{TicketWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use triage::ticket::services::OpenTicketRequest;

#[given(r#"a customer opened a ticket about "{summary}""#)]
fn customer_opened_ticket(world: &mut TicketWorld, summary: String) -> Result<(), eyre::Report> {
    let request = OpenTicketRequest::new(
        summary,
        "The office printer rejects every print job.",
        world.customer,
    );
    let ticket =
        run_async(world.service.open_ticket(request)).wrap_err("open ticket for scenario")?;
    world.ticket_id = Some(ticket.id());
    Ok(())
}

#[given("an engineer claimed the ticket")]
fn engineer_claimed_ticket(world: &mut TicketWorld) -> Result<(), eyre::Report> {
    let ticket_id = world
        .ticket_id
        .ok_or_else(|| eyre::eyre!("no ticket opened in scenario world"))?;
    run_async(world.service.claim(ticket_id, world.engineer))
        .wrap_err("claim ticket for scenario")?;
    Ok(())
}

#[given("the engineer marked the ticket as fixed")]
fn engineer_marked_fixed(world: &mut TicketWorld) -> Result<(), eyre::Report> {
    let ticket_id = world
        .ticket_id
        .ok_or_else(|| eyre::eyre!("no ticket opened in scenario world"))?;
    run_async(world.service.mark_as_fixed(ticket_id)).wrap_err("mark ticket fixed for scenario")?;
    Ok(())
}
