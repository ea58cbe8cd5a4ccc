//! Notification delivery infrastructure.
//!
//! The [`NotificationFanout`] subscribes to the event bus and delivers each
//! domain event to its audience across three channels: a persisted
//! notification row, a WebSocket push, and an email.

pub mod fanout;

pub use fanout::NotificationFanout;
