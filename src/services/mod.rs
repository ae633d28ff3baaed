pub mod action_source;
pub mod incident_tracker;

pub use action_source::ActionSource;
pub use incident_tracker::IncidentTracker;
