//! Atelio event bus and notification infrastructure.
//!
//! Building blocks for the platform-wide notification fan-out:
//!
//! - [`DomainEvent`] — the closed set of domain events, each variant
//!   carrying its own payload and rendering its own notification and
//!   email content.
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`delivery`] — SMTP email delivery.

pub mod bus;
pub mod delivery;
pub mod event;

pub use bus::EventBus;
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use event::{Audience, DomainEvent, EmailContent, NotificationContent};
