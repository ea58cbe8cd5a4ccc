//! External delivery channels for notifications.
//!
//! Currently SMTP email; the WebSocket channel lives with the connection
//! manager in the API crate.

pub mod email;
