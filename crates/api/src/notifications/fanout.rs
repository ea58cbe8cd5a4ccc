//! Event-to-notification fan-out service.
//!
//! [`NotificationFanout`] consumes domain events from the bus and, for each
//! recipient, delivers in a fixed order: database row first, then WebSocket
//! push, then email. A failure in any channel is logged and never stops the
//! remaining channels or recipients, and never propagates back to the HTTP
//! request that published the event.

use std::sync::Arc;

use axum::extract::ws::Message;
use tokio::sync::broadcast;

use atelio_db::models::user::User;
use atelio_db::repositories::{NotificationRepo, UserRepo};
use atelio_db::DbPool;
use atelio_events::{Audience, DomainEvent, EmailDelivery};

use crate::ws::WsManager;

/// Routes domain events to user notifications.
pub struct NotificationFanout {
    pool: DbPool,
    ws_manager: Arc<WsManager>,
    /// `None` when SMTP is not configured; email delivery is then skipped.
    email: Option<EmailDelivery>,
}

impl NotificationFanout {
    /// Create a new fan-out service.
    pub fn new(pool: DbPool, ws_manager: Arc<WsManager>, email: Option<EmailDelivery>) -> Self {
        Self {
            pool,
            ws_manager,
            email,
        }
    }

    /// Run the main delivery loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](atelio_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.deliver(&event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification fan-out lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification fan-out shutting down");
                    break;
                }
            }
        }
    }

    /// Deliver one event to every recipient in its audience.
    async fn deliver(&self, event: &DomainEvent) {
        let recipients = match self.resolve_recipients(event).await {
            Ok(users) => users,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    event = event.kind_str(),
                    "Failed to resolve event audience"
                );
                return;
            }
        };

        for user in &recipients {
            self.deliver_to_user(user, event).await;
        }

        // Admin-facing payment and ticket events also land in the fixed
        // system mailbox so there is a record outside individual inboxes.
        if event.copy_system_mailbox() {
            self.send_system_copy(event).await;
        }
    }

    /// Resolve the audience of an event into user rows.
    async fn resolve_recipients(&self, event: &DomainEvent) -> Result<Vec<User>, sqlx::Error> {
        match event.audience() {
            Audience::User(user_id) => Ok(UserRepo::find_by_id(&self.pool, user_id)
                .await?
                .into_iter()
                .collect()),
            Audience::Admins => UserRepo::list_admins(&self.pool).await,
        }
    }

    /// Deliver one event to one user: DB row, then WS push, then email.
    async fn deliver_to_user(&self, user: &User, event: &DomainEvent) {
        let content = event.notification();

        if let Err(e) = NotificationRepo::create(
            &self.pool,
            user.id,
            &content.title,
            &content.message,
            content.kind.as_str(),
        )
        .await
        {
            tracing::error!(
                error = %e,
                user_id = user.id,
                event = event.kind_str(),
                "Failed to persist notification"
            );
        }

        let msg = serde_json::json!({
            "type": "notification",
            "event": event.kind_str(),
            "title": content.title,
            "message": content.message,
            "kind": content.kind.as_str(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        self.ws_manager
            .push_to_user(user.id, Message::Text(msg.to_string().into()))
            .await;

        if let Some(email) = &self.email {
            let mail = event.email();
            if let Err(e) = email.send(&user.email, &mail.subject, &mail.html).await {
                tracing::error!(
                    error = %e,
                    user_id = user.id,
                    event = event.kind_str(),
                    "Failed to send notification email"
                );
            }
        }
    }

    /// Send a copy of the event email to the configured system mailbox.
    async fn send_system_copy(&self, event: &DomainEvent) {
        let Some(email) = &self.email else { return };
        let Some(mailbox) = email.system_mailbox().map(str::to_owned) else {
            return;
        };

        let mail = event.email();
        if let Err(e) = email.send(&mailbox, &mail.subject, &mail.html).await {
            tracing::error!(
                error = %e,
                event = event.kind_str(),
                "Failed to send system mailbox copy"
            );
        }
    }
}
