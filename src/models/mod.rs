pub mod event;
pub mod user;

pub use event::{Event, EventDetails, EventWithOrganizerRow, OrganizerSummary};
pub use user::ParticipantSummary;
