// Query layer over the connection pool, one method per store operation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Event, EventWithOrganizerRow, ParticipantSummary};

/// Writable event fields. Updates replace all of them; a `None` clears
/// the stored value.
#[derive(Debug, Clone)]
pub struct EventData {
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
}

const EVENT_WITH_ORGANIZER_COLUMNS: &str = r#"
    e.id, e.title, e.description, e.date, e.location,
    e.organizer_id, u.username AS organizer_username,
    COALESCE(
        (SELECT array_agg(p.user_id) FROM event_participants p WHERE p.event_id = e.id),
        '{}'::uuid[]
    ) AS participants,
    e.created_at, e.updated_at
"#;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_event(
        &self,
        organizer_id: Uuid,
        data: EventData,
    ) -> sqlx::Result<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO events (organizer_id, title, description, date, location)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(organizer_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.date)
        .bind(&data.location)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Filtered listing with the organizer joined in. NULL parameters
    /// disable the corresponding predicate.
    pub async fn list_events(
        &self,
        q: Option<&str>,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> sqlx::Result<Vec<EventWithOrganizerRow>> {
        let sql = format!(
            r#"
            SELECT {EVENT_WITH_ORGANIZER_COLUMNS}
            FROM events e
            JOIN users u ON u.id = e.organizer_id
            WHERE ($1::text IS NULL
                   OR e.title ILIKE '%' || $1 || '%'
                   OR e.description ILIKE '%' || $1 || '%')
              AND ($2::timestamptz IS NULL OR e.date >= $2)
              AND ($3::timestamptz IS NULL OR e.date <= $3)
            "#
        );

        sqlx::query_as::<_, EventWithOrganizerRow>(&sql)
            .bind(q)
            .bind(range.map(|r| r.0))
            .bind(range.map(|r| r.1))
            .fetch_all(&self.pool)
            .await
    }

    pub async fn get_event(&self, id: Uuid) -> sqlx::Result<Option<EventWithOrganizerRow>> {
        let sql = format!(
            r#"
            SELECT {EVENT_WITH_ORGANIZER_COLUMNS}
            FROM events e
            JOIN users u ON u.id = e.organizer_id
            WHERE e.id = $1
            "#
        );

        sqlx::query_as::<_, EventWithOrganizerRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn event_exists(&self, id: Uuid) -> sqlx::Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM events WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }

    /// Atomic add-if-absent: the composite primary key turns a repeat
    /// join into a no-op instead of a duplicate.
    pub async fn add_participant(&self, event_id: Uuid, user_id: Uuid) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO event_participants (event_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_by_organizer(&self, organizer_id: Uuid) -> sqlx::Result<Vec<Event>> {
        sqlx::query_as::<_, Event>(
            r#"
            SELECT e.id, e.organizer_id, e.title, e.description, e.date, e.location,
                   COALESCE(
                       (SELECT array_agg(p.user_id) FROM event_participants p WHERE p.event_id = e.id),
                       '{}'::uuid[]
                   ) AS participants,
                   e.created_at, e.updated_at
            FROM events e
            WHERE e.organizer_id = $1
            "#,
        )
        .bind(organizer_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Conditional full replace, scoped to the organizer. Zero rows means
    /// the event is absent or owned by someone else; the caller cannot
    /// tell which.
    pub async fn update_event(
        &self,
        id: Uuid,
        organizer_id: Uuid,
        data: EventData,
    ) -> sqlx::Result<Option<Event>> {
        sqlx::query_as::<_, Event>(
            r#"
            WITH updated AS (
                UPDATE events
                SET title = $3, description = $4, date = $5, location = $6,
                    updated_at = now()
                WHERE id = $1 AND organizer_id = $2
                RETURNING id, organizer_id, title, description, date, location,
                          created_at, updated_at
            )
            SELECT e.id, e.organizer_id, e.title, e.description, e.date, e.location,
                   COALESCE(
                       (SELECT array_agg(p.user_id) FROM event_participants p WHERE p.event_id = e.id),
                       '{}'::uuid[]
                   ) AS participants,
                   e.created_at, e.updated_at
            FROM updated e
            "#,
        )
        .bind(id)
        .bind(organizer_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.date)
        .bind(&data.location)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list_participants(
        &self,
        event_id: Uuid,
    ) -> sqlx::Result<Vec<ParticipantSummary>> {
        sqlx::query_as::<_, ParticipantSummary>(
            r#"
            SELECT u.username, u.email
            FROM event_participants p
            JOIN users u ON u.id = p.user_id
            WHERE p.event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
    }
}
