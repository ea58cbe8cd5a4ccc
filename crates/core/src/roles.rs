//! Well-known role name constants.
//!
//! These must match the seed data in the initial migration.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CLIENT: &str = "client";
pub const ROLE_PARTNER: &str = "partner";
