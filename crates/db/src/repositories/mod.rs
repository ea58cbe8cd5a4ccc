//! Repositories, one per table. Each is a unit struct with associated
//! async functions taking the pool (or a transaction) explicitly.

mod billing_profile_repo;
mod negotiation_repo;
mod notification_repo;
mod payment_stage_repo;
mod project_repo;
mod session_repo;
mod ticket_repo;
mod timeline_repo;
mod user_repo;

pub use billing_profile_repo::BillingProfileRepo;
pub use negotiation_repo::NegotiationRepo;
pub use notification_repo::NotificationRepo;
pub use payment_stage_repo::PaymentStageRepo;
pub use project_repo::ProjectRepo;
pub use session_repo::SessionRepo;
pub use ticket_repo::TicketRepo;
pub use timeline_repo::TimelineRepo;
pub use user_repo::UserRepo;
