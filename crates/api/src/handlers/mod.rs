//! HTTP request handlers, grouped by resource.

pub mod admin;
pub mod auth;
pub mod billing;
pub mod negotiation;
pub mod notification;
pub mod payment_stage;
pub mod project;
pub mod ticket;
