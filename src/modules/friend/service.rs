use std::sync::Arc;

use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        friend::{
            model::{FriendRequestResponse, FriendResponse},
            repository::FriendRepo,
            schema::FriendRequestEntity,
        },
        notify::{DomainEvent, Notifier},
        request::{is_self_pair, lifecycle, Decision},
        user::repository::UserRepository,
    },
};

#[derive(Clone)]
pub struct FriendService<R, U>
where
    R: FriendRepo,
    U: UserRepository,
{
    friend_repo: Arc<R>,
    user_repo: Arc<U>,
    notifier: Arc<dyn Notifier>,
}

impl<R, U> FriendService<R, U>
where
    R: FriendRepo,
    U: UserRepository,
{
    pub fn with_dependencies(
        friend_repo: Arc<R>,
        user_repo: Arc<U>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        FriendService { friend_repo, user_repo, notifier }
    }

    pub async fn are_already_friends(
        &self,
        user_id: &Uuid,
        other_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        Ok(self.friend_repo.find_friendship(user_id, other_id).await?.is_some())
    }

    pub async fn has_unresolved_request(
        &self,
        user_id: &Uuid,
        other_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        Ok(self.friend_repo.find_pending_between(user_id, other_id).await?.is_some())
    }

    pub async fn get_friends(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        self.friend_repo.find_friends(&user_id).await
    }

    pub async fn get_friend_requests(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let (requests_to, requests_from) = tokio::try_join!(
            self.friend_repo.list_requests_to_user(&user_id),
            self.friend_repo.list_requests_from_user(&user_id),
        )?;

        let mut all = Vec::with_capacity(requests_to.len() + requests_from.len());
        all.extend(requests_to);
        all.extend(requests_from);
        Ok(all)
    }

    pub async fn send_friend_request(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        if is_self_pair(&sender_id, &receiver_id) {
            return Err(error::SystemError::self_reference(
                "Cannot send friend request to yourself",
            ));
        }

        let (sender, receiver) = tokio::try_join!(
            self.user_repo.find_by_id(&sender_id),
            self.user_repo.find_by_id(&receiver_id),
        )?;

        if !sender.map(|u| u.is_active).unwrap_or(false) {
            return Err(error::SystemError::inactive_subject("Sender is not an active user"));
        }
        if !receiver.map(|u| u.is_active).unwrap_or(false) {
            return Err(error::SystemError::inactive_subject("Receiver is not an active user"));
        }

        if self.are_already_friends(&sender_id, &receiver_id).await? {
            return Err(error::SystemError::duplicate_request("Users are already friends"));
        }

        if self.has_unresolved_request(&sender_id, &receiver_id).await? {
            return Err(error::SystemError::duplicate_request(
                "A pending friend request already exists",
            ));
        }

        let request = self
            .friend_repo
            .create_request(&sender_id, &receiver_id)
            .await
            .map_err(|e| e.into_duplicate("A pending friend request already exists"))?;

        self.notifier
            .publish(DomainEvent::FriendRequestCreated {
                request_id: request.id,
                from_user_id: request.from_user_id,
                to_user_id: request.to_user_id,
            })
            .await;

        Ok(request)
    }

    pub async fn respond(
        &self,
        responder_id: Uuid,
        request_id: Uuid,
        decision: Decision,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let request =
            lifecycle::respond(self.friend_repo.as_ref(), request_id, responder_id, decision)
                .await?;

        let event = match decision {
            Decision::Accept => DomainEvent::FriendRequestAccepted {
                request_id: request.id,
                from_user_id: request.from_user_id,
                to_user_id: request.to_user_id,
            },
            Decision::Decline => DomainEvent::FriendRequestDeclined {
                request_id: request.id,
                from_user_id: request.from_user_id,
                to_user_id: request.to_user_id,
            },
        };
        self.notifier.publish(event).await;

        Ok(request)
    }
}
