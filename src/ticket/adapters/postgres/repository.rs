//! `PostgreSQL` repository implementation for ticket lifecycle storage.

use super::{
    models::{NewTicketRow, TicketChangeset, TicketRow},
    schema::tickets,
};
use crate::ticket::{
    domain::{PersistedTicketData, ProfileId, Ticket, TicketId, TicketStatus},
    ports::{TicketRepository, TicketRepositoryError, TicketRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by ticket adapters.
pub type TicketPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed ticket repository.
///
/// The status-guarded update relies on the database's row-level atomicity:
/// the `UPDATE .. WHERE id = .. AND status = ..` statement either persists
/// the transition or matches nothing, so concurrent writers racing on the
/// same ticket resolve to exactly one winner without advisory locking.
#[derive(Debug, Clone)]
pub struct PostgresTicketRepository {
    pool: TicketPgPool,
}

impl PostgresTicketRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TicketPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TicketRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TicketRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TicketRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TicketRepositoryError::persistence)?
    }
}

#[async_trait]
impl TicketRepository for PostgresTicketRepository {
    async fn create(&self, ticket: &Ticket) -> TicketRepositoryResult<()> {
        let ticket_id = ticket.id();
        let new_row = to_new_row(ticket);

        self.run_blocking(move |connection| {
            diesel::insert_into(tickets::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TicketRepositoryError::DuplicateTicket(ticket_id)
                    }
                    _ => TicketRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TicketId) -> TicketRepositoryResult<Option<Ticket>> {
        self.run_blocking(move |connection| {
            let row = tickets::table
                .filter(tickets::id.eq(id.into_inner()))
                .select(TicketRow::as_select())
                .first::<TicketRow>(connection)
                .optional()
                .map_err(TicketRepositoryError::persistence)?;
            row.map(row_to_ticket).transpose()
        })
        .await
    }

    async fn list_by_status(
        &self,
        statuses: &[TicketStatus],
    ) -> TicketRepositoryResult<Vec<Ticket>> {
        let status_keys: Vec<&'static str> =
            statuses.iter().copied().map(TicketStatus::as_str).collect();

        self.run_blocking(move |connection| {
            let rows = tickets::table
                .filter(tickets::status.eq_any(status_keys))
                .order(tickets::created_at.asc())
                .select(TicketRow::as_select())
                .load::<TicketRow>(connection)
                .map_err(TicketRepositoryError::persistence)?;
            rows.into_iter().map(row_to_ticket).collect()
        })
        .await
    }

    async fn list_by_creator(&self, creator: ProfileId) -> TicketRepositoryResult<Vec<Ticket>> {
        self.run_blocking(move |connection| {
            let rows = tickets::table
                .filter(tickets::created_by.eq(creator.into_inner()))
                .order(tickets::created_at.asc())
                .select(TicketRow::as_select())
                .load::<TicketRow>(connection)
                .map_err(TicketRepositoryError::persistence)?;
            rows.into_iter().map(row_to_ticket).collect()
        })
        .await
    }

    async fn list_by_assignee(&self, assignee: ProfileId) -> TicketRepositoryResult<Vec<Ticket>> {
        self.run_blocking(move |connection| {
            let rows = tickets::table
                .filter(tickets::assigned_to.eq(assignee.into_inner()))
                .order(tickets::created_at.asc())
                .select(TicketRow::as_select())
                .load::<TicketRow>(connection)
                .map_err(TicketRepositoryError::persistence)?;
            rows.into_iter().map(row_to_ticket).collect()
        })
        .await
    }

    async fn update_transition(
        &self,
        expected_status: TicketStatus,
        ticket: &Ticket,
    ) -> TicketRepositoryResult<()> {
        let ticket_id = ticket.id();
        let changeset = to_changeset(ticket);

        self.run_blocking(move |connection| {
            let updated = diesel::update(
                tickets::table.filter(
                    tickets::id
                        .eq(ticket_id.into_inner())
                        .and(tickets::status.eq(expected_status.as_str())),
                ),
            )
            .set(&changeset)
            .execute(connection)
            .map_err(TicketRepositoryError::persistence)?;

            if updated == 1 {
                return Ok(());
            }

            // The guarded write matched nothing; read the row back to tell
            // a missing ticket from a lost race.
            let Some(stored) = tickets::table
                .filter(tickets::id.eq(ticket_id.into_inner()))
                .select(TicketRow::as_select())
                .first::<TicketRow>(connection)
                .optional()
                .map_err(TicketRepositoryError::persistence)?
            else {
                return Err(TicketRepositoryError::NotFound(ticket_id));
            };
            let actual = TicketStatus::try_from(stored.status.as_str())
                .map_err(TicketRepositoryError::persistence)?;
            Err(TicketRepositoryError::StatusConflict {
                ticket_id,
                expected: expected_status,
                actual,
            })
        })
        .await
    }

    async fn clear(&self) -> TicketRepositoryResult<()> {
        self.run_blocking(move |connection| {
            diesel::delete(tickets::table)
                .execute(connection)
                .map_err(TicketRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }
}

pub(crate) fn to_new_row(ticket: &Ticket) -> NewTicketRow {
    NewTicketRow {
        id: ticket.id().into_inner(),
        status: ticket.status().as_str().to_owned(),
        summary: ticket.summary().to_owned(),
        problem_description: ticket.problem_description().to_owned(),
        estimated_time: ticket.estimated_time().map(str::to_owned),
        created_by: ticket.created_by().into_inner(),
        assigned_to: ticket.assigned_to().map(ProfileId::into_inner),
        created_at: ticket.created_at(),
        claimed_at: ticket.claimed_at(),
        marked_as_fixed_at: ticket.marked_as_fixed_at(),
        resolved_at: ticket.resolved_at(),
        auto_complete_timeout_at: ticket.auto_complete_timeout_at(),
        updated_at: ticket.updated_at(),
    }
}

pub(crate) fn to_changeset(ticket: &Ticket) -> TicketChangeset {
    TicketChangeset {
        status: ticket.status().as_str().to_owned(),
        assigned_to: ticket.assigned_to().map(ProfileId::into_inner),
        claimed_at: ticket.claimed_at(),
        marked_as_fixed_at: ticket.marked_as_fixed_at(),
        resolved_at: ticket.resolved_at(),
        auto_complete_timeout_at: ticket.auto_complete_timeout_at(),
        updated_at: ticket.updated_at(),
    }
}

pub(crate) fn row_to_ticket(row: TicketRow) -> TicketRepositoryResult<Ticket> {
    let TicketRow {
        id,
        status: persisted_status,
        summary,
        problem_description,
        estimated_time,
        created_by,
        assigned_to,
        created_at,
        claimed_at,
        marked_as_fixed_at,
        resolved_at,
        auto_complete_timeout_at,
        updated_at,
    } = row;

    let status = TicketStatus::try_from(persisted_status.as_str())
        .map_err(TicketRepositoryError::persistence)?;

    let data = PersistedTicketData {
        id: TicketId::from_uuid(id),
        status,
        summary,
        problem_description,
        estimated_time,
        created_by: ProfileId::from_uuid(created_by),
        assigned_to: assigned_to.map(ProfileId::from_uuid),
        created_at,
        claimed_at,
        marked_as_fixed_at,
        resolved_at,
        auto_complete_timeout_at,
        updated_at,
    };
    Ok(Ticket::from_persisted(data))
}
