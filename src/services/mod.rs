pub mod events;

pub use events::{EventFilter, EventService};
