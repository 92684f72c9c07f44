//! Campus Auth — bearer-token verification, the authentication gate, and
//! tenant-scope resolution.
//!
//! The gate is the only place a request becomes a [`campus_core::models::principal::Principal`]:
//! verify the token, re-read the user, reject deactivated accounts and
//! tokens issued before a credential change, then resolve the effective
//! tenant.

pub mod config;
pub mod error;
pub mod gate;
pub mod password;
pub mod service;
pub mod tenant;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use gate::{AuthGate, AuthenticatedRequest};
pub use service::{AuthService, LoginInput, LoginOutput};
pub use tenant::resolve_tenant;
pub use token::AccessTokenClaims;
