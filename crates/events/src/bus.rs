//! The in-process publish/subscribe hub.
//!
//! One `tokio::sync::broadcast` channel carries every [`DomainEvent`];
//! handlers publish fire-and-forget, the notification fan-out subscribes.
//! Shared across the application as `Arc<EventBus>`.

use tokio::sync::broadcast;

use crate::event::DomainEvent;

const DEFAULT_CAPACITY: usize = 1024;

pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Bus with an explicit channel capacity. A subscriber that falls more
    /// than `capacity` events behind sees `RecvError::Lagged` and loses the
    /// overwritten ones.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Hand the event to every current subscriber.
    ///
    /// Delivery is best-effort: with zero subscribers the event just
    /// evaporates, and publishing never blocks or errors.
    pub fn publish(&self, event: DomainEvent) {
        let _ = self.sender.send(event);
    }

    /// A fresh receiver that sees every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket_event() -> DomainEvent {
        DomainEvent::TicketOpened {
            ticket_id: 42,
            subject: "Broken build".into(),
            user_id: 7,
        }
    }

    #[tokio::test]
    async fn a_subscriber_receives_published_events() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(ticket_event());

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind_str(), "ticket.opened");
    }

    #[tokio::test]
    async fn every_subscriber_gets_its_own_copy() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(ticket_event());

        assert_eq!(rx1.recv().await.unwrap().kind_str(), "ticket.opened");
        assert_eq!(rx2.recv().await.unwrap().kind_str(), "ticket.opened");
    }

    #[tokio::test]
    async fn late_subscribers_miss_earlier_events() {
        let bus = EventBus::default();

        // Keep one receiver alive so the publish is not dropped outright.
        let mut early = bus.subscribe();
        bus.publish(ticket_event());

        let mut late = bus.subscribe();
        assert!(early.recv().await.is_ok());
        assert!(matches!(
            late.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn publishing_without_subscribers_is_a_no_op() {
        let bus = EventBus::default();
        bus.publish(ticket_event());
    }
}
