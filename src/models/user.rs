use serde::Serialize;
use sqlx::FromRow;

/// What the participants endpoint exposes about a user. Accounts and
/// credentials live with the identity provider; the users table only
/// mirrors what the API displays.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ParticipantSummary {
    pub username: String,
    pub email: String,
}
