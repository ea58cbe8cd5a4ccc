//! Atelio domain core.
//!
//! Pure domain logic shared by the data layer, event system, and API server:
//! status state machines, payment-stage planning, settlement-invoice data,
//! the default project timeline, and the error taxonomy. No I/O lives here.

pub mod error;
pub mod invoice;
pub mod negotiation;
pub mod payments;
pub mod roles;
pub mod status;
pub mod timeline;
pub mod types;
