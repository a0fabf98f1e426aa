//! Shared test utilities for domain testing
//!
//! - `TestDatabase`: in-memory SQLite with the workspace migrations applied (feature: "sqlite")
//! - `TestDataBuilder`: Deterministic test data generation (always available)
//! - `assertions`: Custom assertion helpers (always available)
//!
//! # Usage
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_repository_test() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!
//!     let title = builder.name("task", "main");
//!     let due = builder.due_in_hours(48);
//! }
//! ```

use chrono::{DateTime, Duration, DurationRound, Utc};

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::TestDatabase;

/// Builder for test data with deterministic values
pub struct TestDataBuilder {
    seed: u64,
    now: DateTime<Utc>,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        let now = Utc::now();
        Self {
            seed,
            // Whole seconds, so values survive a round trip through the database
            now: now.duration_trunc(Duration::seconds(1)).unwrap_or(now),
        }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_task");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Generate a unique name for testing
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.name("location", "library"), "test-location-7-library");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// The instant this builder treats as "now"
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// A due date `hours` from [`Self::now`]; negative values lie in the past
    pub fn due_in_hours(&self, hours: i64) -> DateTime<Utc> {
        self.now + Duration::hours(hours)
    }
}

/// Test assertion helpers
pub mod assertions {
    use std::fmt::Debug;

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert that values never decrease
    pub fn assert_ascending<T: PartialOrd + Debug>(values: &[T], context: &str) {
        for pair in values.windows(2) {
            assert!(
                pair[0] <= pair[1],
                "{}: {:?} comes before {:?}",
                context,
                pair[0],
                pair[1]
            );
        }
    }

    /// Assert that values never increase
    pub fn assert_descending<T: PartialOrd + Debug>(values: &[T], context: &str) {
        for pair in values.windows(2) {
            assert!(
                pair[0] >= pair[1],
                "{}: {:?} comes before {:?}",
                context,
                pair[0],
                pair[1]
            );
        }
    }
}
