//! Row models and DTOs, one module per table group.

pub mod billing_profile;
pub mod negotiation;
pub mod notification;
pub mod payment_stage;
pub mod project;
pub mod session;
pub mod ticket;
pub mod timeline;
pub mod user;
