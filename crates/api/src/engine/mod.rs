//! Business flows that span repositories and the event bus.
//!
//! Contains the payment-stage flows (planning, proof submission, manual
//! verification, settlement documents) and the budget-negotiation flows
//! (propose, accept, reject, counter). Handlers stay thin and delegate
//! here; these functions publish the resulting domain events.

pub mod negotiation;
pub mod payments;
