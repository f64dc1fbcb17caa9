use serde::Serialize;
use uuid::Uuid;

/// Domain events emitted by the request lifecycle so notification delivery
/// can be wired up outside this service. Delivery itself is not handled here.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainEvent {
    FriendRequestCreated { request_id: Uuid, from_user_id: Uuid, to_user_id: Uuid },
    FriendRequestAccepted { request_id: Uuid, from_user_id: Uuid, to_user_id: Uuid },
    FriendRequestDeclined { request_id: Uuid, from_user_id: Uuid, to_user_id: Uuid },
    ParticipationRequestCreated { request_id: Uuid, from_user_id: Uuid, event_id: Uuid },
    ParticipationRequestAccepted { request_id: Uuid, from_user_id: Uuid, event_id: Uuid },
    ParticipationRequestDeclined { request_id: Uuid, from_user_id: Uuid, event_id: Uuid },
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, event: DomainEvent);
}

/// Default in-process notifier: structured log line per event.
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, event: DomainEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => log::info!("domain event: {}", payload),
            Err(e) => log::error!("failed to serialize domain event: {}", e),
        }
    }
}
