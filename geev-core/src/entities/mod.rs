pub mod contribution_events;
pub mod user_identities;

pub use contribution_events::{ContributionEvent, EventKind};
pub use user_identities::UserIdentity;
