//! # educollab-shared
//!
//! Types shared by every EduCollab crate: canonical entity identifiers,
//! the closed enumerations of the data model, collection names, the team
//! invite state machine and local validation errors.
//!
//! Nothing in this crate performs I/O.

pub mod constants;
pub mod error;
pub mod invite;
pub mod types;

pub use error::ValidationError;
pub use invite::{InviteError, InviteStatus};
pub use types::*;
