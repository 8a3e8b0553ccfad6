//! Typed records exchanged with the REST API.
//!
//! Response records are `Deserialize`; request payloads (`*Input`, `*Update`)
//! are `Serialize`. Both directions derive the other trait as well so the same
//! types can back fakes in tests.

pub mod dashboard;
pub mod event;
pub mod media;
pub mod registration;
pub mod teambuilding;
pub mod user;

pub use dashboard::DashboardStats;
pub use event::{DEFAULT_MAX_PARTICIPANTS, Event, EventAvailability, EventInput};
pub use media::UploadedImage;
pub use registration::{
    EventSummary, Registration, RegistrationInput, RegistrationUpdate, StatusUpdate, UserSummary,
};
pub use teambuilding::{Teambuilding, TeambuildingInput};
pub use user::{ProfileUpdate, UserProfile};
