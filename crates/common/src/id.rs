//! ID generation utilities.

use uuid::Uuid;

/// ID generator for entities.
///
/// Every ID is the simple (hyphen-free) form of a UUID: 32 lowercase hex
/// characters.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a time-ordered ID for timeline entities (posts, follows,
    /// reactions).
    ///
    /// UUID v7 is time-ordered, which keeps recency-sorted scans cheap.
    /// Ordering is an implementation convenience only; callers must not
    /// rely on it.
    #[must_use]
    pub fn generate(&self) -> String {
        Uuid::now_v7().simple().to_string()
    }

    /// Generate a random ID for users.
    ///
    /// User IDs use UUID v4 so they carry no creation-time information.
    #[must_use]
    pub fn generate_user_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}
