//! Bearer-token access boundary.
//!
//! `jwt_auth_middleware` verifies the token and stores its [`JwtClaims`] in
//! the request extensions; handlers then take the caller id through the
//! [`AuthUser`] extractor.
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, jwt_auth_middleware};
//! use core_config::FromEnv;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//! let protected = Router::new()
//!     .route("/tasks", get(list_tasks))
//!     .layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//! ```

pub mod config;
pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use extractor::AuthUser;
pub use jwt::{ACCESS_TOKEN_TTL, JwtAuth, JwtClaims};
pub use middleware::jwt_auth_middleware;
