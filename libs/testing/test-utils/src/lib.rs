//! Shared test utilities for domain and API tests
//!
//! - `TestDatabase`: migrated PostgreSQL container with automatic cleanup (feature: "postgres")
//! - `TestAuth`: signs bearer tokens the auth middleware accepts
//! - `TestDataBuilder`: deterministic test data generation
//! - `assertions`: custom assertion helpers
//!
//! # Usage
//!
//! ```rust,no_run
//! use test_utils::{TestAuth, TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!
//!     let owner_id = builder.user_id();
//!     let token = TestAuth::new().bearer(owner_id);
//! }
//! ```

use axum_helpers::{JwtAuth, JwtConfig};
use uuid::Uuid;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Secret used by every test token; long enough for [`JwtConfig`]
pub const TEST_JWT_SECRET: &str = "test-secret-for-integration-tests-only-0123456789";

/// Token issuer for tests that go through the auth middleware
#[derive(Clone)]
pub struct TestAuth {
    jwt: JwtAuth,
}

impl TestAuth {
    pub fn new() -> Self {
        Self {
            jwt: JwtAuth::new(&JwtConfig::new(TEST_JWT_SECRET)),
        }
    }

    /// The verifier to hand to the middleware under test
    pub fn jwt(&self) -> JwtAuth {
        self.jwt.clone()
    }

    /// `Authorization` header value for `user_id`
    pub fn bearer(&self, user_id: Uuid) -> String {
        let token = self
            .jwt
            .create_access_token(user_id, "user@example.com", "Test User")
            .expect("Failed to sign test token");
        format!("Bearer {}", token)
    }
}

impl Default for TestAuth {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by using seeded data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
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

    /// Deterministic user id for this seed
    pub fn user_id(&self) -> Uuid {
        let bytes = self.seed.to_le_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        uuid_bytes[8..16].copy_from_slice(&bytes);
        Uuid::from_bytes(uuid_bytes)
    }

    /// A second user, distinct from [`Self::user_id`]
    pub fn other_user_id(&self) -> Uuid {
        Self::new(self.seed.wrapping_add(1)).user_id()
    }

    /// Generate a unique name for testing
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.name("task", "main"), "test-task-7-main");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }
}

/// Test assertion helpers
pub mod assertions {
    use uuid::Uuid;

    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected UUID {}, got {}",
            context, expected, actual
        );
    }

    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}
