//! The closed set of domain events and their rendered content.
//!
//! Every event that fans out to users is a variant here, carrying exactly
//! the payload its templates need. Adding a delivery-worthy event means
//! adding a variant and filling in the three `match` arms below; there is
//! no stringly-typed event name to keep in sync with scattered call sites.

use rust_decimal::Decimal;
use serde::Serialize;

use atelio_core::status::{NotificationKind, ProjectStatus};
use atelio_core::types::DbId;

/// Who a single event is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// One specific user.
    User(DbId),
    /// Every active user with the admin role.
    Admins,
}

/// Durable notification content (the database record).
#[derive(Debug, Clone, Serialize)]
pub struct NotificationContent {
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
}

/// Rendered email content for one event.
#[derive(Debug, Clone)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
}

/// A domain event worth telling somebody about.
#[derive(Debug, Clone, Serialize)]
pub enum DomainEvent {
    ProjectCreated {
        project_id: DbId,
        project_name: String,
        client_id: DbId,
        /// When an admin creates the project on a client's behalf the client
        /// is notified; otherwise the admins are.
        by_admin: bool,
    },
    ProjectUpdated {
        project_id: DbId,
        project_name: String,
        client_id: DbId,
        status: ProjectStatus,
        progress: i32,
    },
    StageAvailable {
        stage_id: DbId,
        project_id: DbId,
        project_name: String,
        stage_name: String,
        amount: Decimal,
        client_id: DbId,
    },
    /// Proof-of-payment landed; goes to the admins for review.
    StageProofSubmitted {
        stage_id: DbId,
        project_name: String,
        stage_name: String,
        amount: Decimal,
        client_id: DbId,
        method: String,
    },
    /// Confirmation copy for the client who submitted the proof.
    StageProofReceipt {
        stage_id: DbId,
        project_name: String,
        stage_name: String,
        client_id: DbId,
    },
    StageApproved {
        stage_id: DbId,
        project_name: String,
        stage_name: String,
        amount: Decimal,
        client_id: DbId,
    },
    StageRejected {
        stage_id: DbId,
        project_name: String,
        stage_name: String,
        client_id: DbId,
        reason: String,
    },
    NegotiationProposed {
        negotiation_id: DbId,
        project_id: DbId,
        project_name: String,
        proposed_price: Decimal,
        client_id: DbId,
        by_client: bool,
    },
    NegotiationAccepted {
        negotiation_id: DbId,
        project_name: String,
        accepted_price: Decimal,
        client_id: DbId,
        by_client: bool,
    },
    NegotiationRejected {
        negotiation_id: DbId,
        project_name: String,
        client_id: DbId,
        by_client: bool,
    },
    NegotiationCountered {
        negotiation_id: DbId,
        new_negotiation_id: DbId,
        project_name: String,
        proposed_price: Decimal,
        client_id: DbId,
        by_client: bool,
    },
    TicketOpened {
        ticket_id: DbId,
        subject: String,
        user_id: DbId,
    },
    TicketReplied {
        ticket_id: DbId,
        subject: String,
        /// The ticket owner.
        user_id: DbId,
        /// Staff replies notify the owner; owner replies notify the admins.
        by_staff: bool,
    },
    /// Ad hoc admin-authored notice to a single user.
    AdminNotice {
        user_id: DbId,
        title: String,
        message: String,
        kind: NotificationKind,
    },
}

impl DomainEvent {
    /// Stable dot-separated event name, used as the WebSocket `event` field.
    pub fn kind_str(&self) -> &'static str {
        match self {
            DomainEvent::ProjectCreated { .. } => "project.created",
            DomainEvent::ProjectUpdated { .. } => "project.updated",
            DomainEvent::StageAvailable { .. } => "stage.available",
            DomainEvent::StageProofSubmitted { .. } => "stage.proof_submitted",
            DomainEvent::StageProofReceipt { .. } => "stage.proof_receipt",
            DomainEvent::StageApproved { .. } => "stage.approved",
            DomainEvent::StageRejected { .. } => "stage.rejected",
            DomainEvent::NegotiationProposed { .. } => "negotiation.proposed",
            DomainEvent::NegotiationAccepted { .. } => "negotiation.accepted",
            DomainEvent::NegotiationRejected { .. } => "negotiation.rejected",
            DomainEvent::NegotiationCountered { .. } => "negotiation.countered",
            DomainEvent::TicketOpened { .. } => "ticket.opened",
            DomainEvent::TicketReplied { .. } => "ticket.replied",
            DomainEvent::AdminNotice { .. } => "notice",
        }
    }

    /// Who receives the notification.
    pub fn audience(&self) -> Audience {
        match self {
            DomainEvent::ProjectCreated {
                client_id, by_admin, ..
            } => {
                if *by_admin {
                    Audience::User(*client_id)
                } else {
                    Audience::Admins
                }
            }
            DomainEvent::ProjectUpdated { client_id, .. } => Audience::User(*client_id),
            DomainEvent::StageAvailable { client_id, .. } => Audience::User(*client_id),
            DomainEvent::StageProofSubmitted { .. } => Audience::Admins,
            DomainEvent::StageProofReceipt { client_id, .. } => Audience::User(*client_id),
            DomainEvent::StageApproved { client_id, .. } => Audience::User(*client_id),
            DomainEvent::StageRejected { client_id, .. } => Audience::User(*client_id),
            DomainEvent::NegotiationProposed {
                client_id, by_client, ..
            }
            | DomainEvent::NegotiationAccepted {
                client_id, by_client, ..
            }
            | DomainEvent::NegotiationRejected {
                client_id, by_client, ..
            }
            | DomainEvent::NegotiationCountered {
                client_id, by_client, ..
            } => {
                // Notify whichever party did not author the action.
                if *by_client {
                    Audience::Admins
                } else {
                    Audience::User(*client_id)
                }
            }
            DomainEvent::TicketOpened { .. } => Audience::Admins,
            DomainEvent::TicketReplied {
                user_id, by_staff, ..
            } => {
                if *by_staff {
                    Audience::User(*user_id)
                } else {
                    Audience::Admins
                }
            }
            DomainEvent::AdminNotice { user_id, .. } => Audience::User(*user_id),
        }
    }

    /// Admin-audience payment flows also send a copy to the fixed system
    /// mailbox. Intentional redundancy, not a bug to fix.
    pub fn copy_system_mailbox(&self) -> bool {
        matches!(
            self,
            DomainEvent::StageProofSubmitted { .. }
                | DomainEvent::TicketOpened { .. }
                | DomainEvent::NegotiationProposed { by_client: true, .. }
        )
    }

    /// Render the durable notification record.
    pub fn notification(&self) -> NotificationContent {
        match self {
            DomainEvent::ProjectCreated { project_name, .. } => NotificationContent {
                title: "New project".into(),
                message: format!("Project \"{project_name}\" has been created"),
                kind: NotificationKind::Info,
            },
            DomainEvent::ProjectUpdated {
                project_name,
                status,
                progress,
                ..
            } => NotificationContent {
                title: "Project updated".into(),
                message: format!(
                    "Project \"{project_name}\" is now {} at {progress}% progress",
                    status.as_str()
                ),
                kind: NotificationKind::Info,
            },
            DomainEvent::StageAvailable {
                project_name,
                stage_name,
                amount,
                ..
            } => NotificationContent {
                title: "Payment available".into(),
                message: format!(
                    "Stage \"{stage_name}\" of \"{project_name}\" is ready for payment ({amount})"
                ),
                kind: NotificationKind::Success,
            },
            DomainEvent::StageProofSubmitted {
                project_name,
                stage_name,
                amount,
                method,
                ..
            } => NotificationContent {
                title: "Payment proof received".into(),
                message: format!(
                    "A {method} payment proof for stage \"{stage_name}\" of \
                     \"{project_name}\" ({amount}) is awaiting verification"
                ),
                kind: NotificationKind::Warning,
            },
            DomainEvent::StageProofReceipt {
                project_name,
                stage_name,
                ..
            } => NotificationContent {
                title: "Proof submitted".into(),
                message: format!(
                    "Your payment proof for stage \"{stage_name}\" of \"{project_name}\" \
                     was received and is being verified"
                ),
                kind: NotificationKind::Info,
            },
            DomainEvent::StageApproved {
                project_name,
                stage_name,
                amount,
                ..
            } => NotificationContent {
                title: "Payment approved".into(),
                message: format!(
                    "Your payment for stage \"{stage_name}\" of \"{project_name}\" \
                     ({amount}) has been verified"
                ),
                kind: NotificationKind::Success,
            },
            DomainEvent::StageRejected {
                project_name,
                stage_name,
                reason,
                ..
            } => NotificationContent {
                title: "Payment rejected".into(),
                // The literal reason text must survive into the record.
                message: format!(
                    "Your payment proof for stage \"{stage_name}\" of \"{project_name}\" \
                     was rejected: {reason}"
                ),
                kind: NotificationKind::Error,
            },
            DomainEvent::NegotiationProposed {
                project_name,
                proposed_price,
                ..
            } => NotificationContent {
                title: "Budget proposal".into(),
                message: format!(
                    "A new price of {proposed_price} has been proposed for \"{project_name}\""
                ),
                kind: NotificationKind::Info,
            },
            DomainEvent::NegotiationAccepted {
                project_name,
                accepted_price,
                ..
            } => NotificationContent {
                title: "Budget accepted".into(),
                message: format!(
                    "The price of {accepted_price} for \"{project_name}\" was accepted; \
                     the project is now in progress"
                ),
                kind: NotificationKind::Success,
            },
            DomainEvent::NegotiationRejected { project_name, .. } => NotificationContent {
                title: "Budget rejected".into(),
                message: format!("The budget proposal for \"{project_name}\" was rejected"),
                kind: NotificationKind::Warning,
            },
            DomainEvent::NegotiationCountered {
                project_name,
                proposed_price,
                ..
            } => NotificationContent {
                title: "Budget counter-offer".into(),
                message: format!(
                    "A counter-offer of {proposed_price} was made for \"{project_name}\""
                ),
                kind: NotificationKind::Info,
            },
            DomainEvent::TicketOpened { subject, .. } => NotificationContent {
                title: "New support ticket".into(),
                message: format!("Ticket opened: {subject}"),
                kind: NotificationKind::Info,
            },
            DomainEvent::TicketReplied {
                subject, by_staff, ..
            } => NotificationContent {
                title: "Ticket reply".into(),
                message: if *by_staff {
                    format!("Support replied to your ticket: {subject}")
                } else {
                    format!("New client reply on ticket: {subject}")
                },
                kind: NotificationKind::Info,
            },
            DomainEvent::AdminNotice {
                title,
                message,
                kind,
                ..
            } => NotificationContent {
                title: title.clone(),
                message: message.clone(),
                kind: *kind,
            },
        }
    }

    /// Render the event-specific email (subject + HTML body).
    pub fn email(&self) -> EmailContent {
        let content = self.notification();
        let subject = format!("[Atelio] {}", content.title);

        let detail = match self {
            DomainEvent::StageAvailable { amount, .. }
            | DomainEvent::StageApproved { amount, .. } => {
                format!("<p>Amount: <strong>{amount}</strong></p>")
            }
            DomainEvent::StageProofSubmitted { amount, method, .. } => format!(
                "<p>Amount: <strong>{amount}</strong></p><p>Method: {method}</p>\
                 <p>Please verify the transfer in the admin panel.</p>"
            ),
            DomainEvent::StageRejected { reason, .. } => {
                format!("<p>Reason: <em>{reason}</em></p><p>You can submit a new proof.</p>")
            }
            DomainEvent::NegotiationProposed { proposed_price, .. }
            | DomainEvent::NegotiationCountered { proposed_price, .. } => {
                format!("<p>Proposed price: <strong>{proposed_price}</strong></p>")
            }
            _ => String::new(),
        };

        let html = format!(
            "<html><body><h2>{}</h2><p>{}</p>{}</body></html>",
            content.title, content.message, detail
        );

        EmailContent { subject, html }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn rejection_message_contains_the_literal_reason() {
        let event = DomainEvent::StageRejected {
            stage_id: 7,
            project_name: "Tienda".into(),
            stage_name: "Anticipo".into(),
            client_id: 3,
            reason: "comprobante ilegible".into(),
        };

        let content = event.notification();
        assert!(content.message.contains("comprobante ilegible"));
        assert_eq!(content.kind, NotificationKind::Error);
        assert!(event.email().html.contains("comprobante ilegible"));
    }

    #[test]
    fn proof_submission_goes_to_admins_with_system_copy() {
        let event = DomainEvent::StageProofSubmitted {
            stage_id: 7,
            project_name: "Tienda".into(),
            stage_name: "Anticipo".into(),
            amount: dec!(500),
            client_id: 3,
            method: "bank_transfer".into(),
        };

        assert_eq!(event.audience(), Audience::Admins);
        assert!(event.copy_system_mailbox());
    }

    #[test]
    fn proof_receipt_goes_to_the_submitting_client() {
        let event = DomainEvent::StageProofReceipt {
            stage_id: 7,
            project_name: "Tienda".into(),
            stage_name: "Anticipo".into(),
            client_id: 3,
        };

        assert_eq!(event.audience(), Audience::User(3));
        assert!(!event.copy_system_mailbox());
    }

    #[test]
    fn negotiation_events_notify_the_non_author() {
        let by_client = DomainEvent::NegotiationProposed {
            negotiation_id: 1,
            project_id: 2,
            project_name: "CRM".into(),
            proposed_price: dec!(900),
            client_id: 3,
            by_client: true,
        };
        assert_eq!(by_client.audience(), Audience::Admins);

        let by_admin = DomainEvent::NegotiationCountered {
            negotiation_id: 1,
            new_negotiation_id: 2,
            project_name: "CRM".into(),
            proposed_price: dec!(950),
            client_id: 3,
            by_client: false,
        };
        assert_eq!(by_admin.audience(), Audience::User(3));
    }

    #[test]
    fn staff_reply_notifies_owner_client_reply_notifies_admins() {
        let staff = DomainEvent::TicketReplied {
            ticket_id: 5,
            subject: "Login issue".into(),
            user_id: 9,
            by_staff: true,
        };
        assert_eq!(staff.audience(), Audience::User(9));

        let client = DomainEvent::TicketReplied {
            ticket_id: 5,
            subject: "Login issue".into(),
            user_id: 9,
            by_staff: false,
        };
        assert_eq!(client.audience(), Audience::Admins);
    }

    #[test]
    fn email_subject_carries_platform_prefix() {
        let event = DomainEvent::TicketOpened {
            ticket_id: 1,
            subject: "Help".into(),
            user_id: 2,
        };
        assert!(event.email().subject.starts_with("[Atelio] "));
    }
}
