use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// An event row as stored, with participant ids aggregated in.
/// Returned unexpanded by `my-events` and by update.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub participants: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flat row produced by the organizer-join queries.
#[derive(Debug, Clone, FromRow)]
pub struct EventWithOrganizerRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub organizer_id: Uuid,
    pub organizer_username: String,
    pub participants: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrganizerSummary {
    pub id: Uuid,
    pub username: String,
}

/// An event with its organizer expanded for display.
#[derive(Debug, Clone, Serialize)]
pub struct EventDetails {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub organizer: OrganizerSummary,
    pub participants: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EventWithOrganizerRow> for EventDetails {
    fn from(row: EventWithOrganizerRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            date: row.date,
            location: row.location,
            organizer: OrganizerSummary {
                id: row.organizer_id,
                username: row.organizer_username,
            },
            participants: row.participants,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
