//! Diesel schema for ticket lifecycle persistence.

diesel::table! {
    /// Support ticket records.
    tickets (id) {
        /// Ticket identifier.
        id -> Uuid,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// One-line summary shown in list views.
        #[max_length = 255]
        summary -> Varchar,
        /// Customer's free-form problem description.
        problem_description -> Text,
        /// Customer's free-form time estimate.
        #[max_length = 255]
        estimated_time -> Nullable<Varchar>,
        /// Profile that opened the ticket.
        created_by -> Uuid,
        /// Profile currently assigned, if any.
        assigned_to -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Claim timestamp, if claimed.
        claimed_at -> Nullable<Timestamptz>,
        /// Mark-as-fixed timestamp, if pending confirmation.
        marked_as_fixed_at -> Nullable<Timestamptz>,
        /// Terminal resolution timestamp, if resolved.
        resolved_at -> Nullable<Timestamptz>,
        /// Auto-complete deadline, if armed.
        auto_complete_timeout_at -> Nullable<Timestamptz>,
        /// Latest lifecycle timestamp.
        updated_at -> Timestamptz,
    }
}
