// Event business logic: filter construction, ownership enforcement,
// membership semantics. Handlers stay thin; everything they decide on
// lives here.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use crate::db::{Database, EventData};
use crate::handlers::events::EventInput;
use crate::models::{Event, EventDetails, ParticipantSummary};
use crate::utils::error::AppError;

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (read as
/// midnight UTC), matching what clients actually send.
fn parse_date_param(raw: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    Err(AppError::ValidationError(format!(
        "Invalid date value: '{}'",
        raw
    )))
}

/// Listing filter. Both parts optional; they combine with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    /// Case-insensitive substring match on title or description.
    pub q: Option<String>,
    /// Inclusive date range.
    pub range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl EventFilter {
    /// Build a filter from raw query parameters. A date bound given
    /// without its partner is ignored entirely, not applied one-sided.
    pub fn from_params(
        q: Option<String>,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> Result<Self, AppError> {
        let q = q.filter(|s| !s.trim().is_empty());

        let range = match (start_date.as_deref(), end_date.as_deref()) {
            (Some(start), Some(end)) => {
                Some((parse_date_param(start)?, parse_date_param(end)?))
            }
            _ => None,
        };

        Ok(Self { q, range })
    }
}

pub struct EventService {
    db: Database,
}

impl EventService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, organizer_id: Uuid, input: EventInput) -> Result<Uuid, AppError> {
        let id = self.db.create_event(organizer_id, input.into()).await?;
        Ok(id)
    }

    pub async fn list(&self, filter: EventFilter) -> Result<Vec<EventDetails>, AppError> {
        let rows = self
            .db
            .list_events(filter.q.as_deref(), filter.range)
            .await?;
        Ok(rows.into_iter().map(EventDetails::from).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<EventDetails, AppError> {
        let row = self
            .db
            .get_event(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
        Ok(EventDetails::from(row))
    }

    /// Idempotent membership add. Joining twice is a success both times
    /// and leaves a single membership entry.
    pub async fn participate(&self, event_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        if !self.db.event_exists(event_id).await? {
            return Err(AppError::NotFound("Event not found".to_string()));
        }

        self.db.add_participant(event_id, user_id).await?;
        Ok(())
    }

    pub async fn list_mine(&self, organizer_id: Uuid) -> Result<Vec<Event>, AppError> {
        let events = self.db.list_by_organizer(organizer_id).await?;
        Ok(events)
    }

    /// Organizer-gated full replace. A miss does not reveal whether the
    /// event is absent or owned by someone else.
    pub async fn update(
        &self,
        event_id: Uuid,
        requester_id: Uuid,
        input: EventInput,
    ) -> Result<Event, AppError> {
        self.db
            .update_event(event_id, requester_id, input.into())
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found or unauthorized".to_string()))
    }

    pub async fn participants(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<ParticipantSummary>, AppError> {
        if !self.db.event_exists(event_id).await? {
            return Err(AppError::NotFound("Event not found".to_string()));
        }

        let participants = self.db.list_participants(event_id).await?;
        Ok(participants)
    }
}

impl From<EventInput> for EventData {
    fn from(input: EventInput) -> Self {
        Self {
            title: input.title,
            description: input.description,
            date: input.date,
            location: input.location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_empty_params() {
        let filter = EventFilter::from_params(None, None, None).unwrap();
        assert_eq!(filter, EventFilter::default());
    }

    #[test]
    fn test_filter_keeps_query_text() {
        let filter =
            EventFilter::from_params(Some("meetup".to_string()), None, None).unwrap();
        assert_eq!(filter.q.as_deref(), Some("meetup"));
        assert!(filter.range.is_none());
    }

    #[test]
    fn test_filter_drops_blank_query() {
        let filter = EventFilter::from_params(Some("   ".to_string()), None, None).unwrap();
        assert!(filter.q.is_none());
    }

    #[test]
    fn test_filter_date_range_inclusive_bounds() {
        let filter = EventFilter::from_params(
            None,
            Some("2025-01-01".to_string()),
            Some("2025-01-31".to_string()),
        )
        .unwrap();

        let (start, end) = filter.range.unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_filter_ignores_partial_date_range() {
        // One bound without the other leaves the listing undated.
        let only_start =
            EventFilter::from_params(None, Some("2025-01-01".to_string()), None).unwrap();
        assert!(only_start.range.is_none());

        let only_end =
            EventFilter::from_params(None, None, Some("2025-01-31".to_string())).unwrap();
        assert!(only_end.range.is_none());
    }

    #[test]
    fn test_filter_ignores_unparseable_partial_date() {
        // An unpaired bound is dropped before parsing, so garbage there
        // cannot fail the request.
        let filter =
            EventFilter::from_params(None, Some("not-a-date".to_string()), None).unwrap();
        assert!(filter.range.is_none());
    }

    #[test]
    fn test_filter_rejects_invalid_date_pair() {
        let result = EventFilter::from_params(
            None,
            Some("not-a-date".to_string()),
            Some("2025-01-31".to_string()),
        );
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_filter_combines_query_and_range() {
        let filter = EventFilter::from_params(
            Some("launch".to_string()),
            Some("2025-01-01T09:00:00Z".to_string()),
            Some("2025-01-02T18:00:00Z".to_string()),
        )
        .unwrap();

        assert_eq!(filter.q.as_deref(), Some("launch"));
        assert!(filter.range.is_some());
    }

    #[test]
    fn test_parse_date_param_rfc3339() {
        let parsed = parse_date_param("2025-01-10T12:30:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 10, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_date_param_bare_date() {
        let parsed = parse_date_param("2025-01-10").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_date_param_invalid() {
        assert!(matches!(
            parse_date_param("soon"),
            Err(AppError::ValidationError(_))
        ));
    }
}
