//! Database layer (document store).

pub mod firestore;
pub mod memory;
pub mod store;

pub use store::DocumentStore;

/// Message for a registration whose email is already taken.
pub(crate) const USER_EXISTS: &str = "User already exists";

/// Collection names as constants.
pub mod collections {
    /// Credential records (keyed by email)
    pub const USERS: &str = "users";
    pub const SUPPLIES: &str = "supplies";
    pub const TESTIMONIALS: &str = "testimonial";
    pub const COMMENTS: &str = "comment";
    pub const VOLUNTEERS: &str = "volunteer";
}
