use std::sync::Arc;

use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        event::{
            model::{CreateEventModel, MemberResponse},
            repository::EventRepo,
            schema::{EventEntity, ParticipationRequestEntity, ParticipationRequestRow},
        },
        notify::{DomainEvent, Notifier},
        request::{lifecycle, Decision},
        user::repository::UserRepository,
    },
};

#[derive(Clone)]
pub struct EventService<R, U>
where
    R: EventRepo,
    U: UserRepository,
{
    event_repo: Arc<R>,
    user_repo: Arc<U>,
    notifier: Arc<dyn Notifier>,
}

impl<R, U> EventService<R, U>
where
    R: EventRepo,
    U: UserRepository,
{
    pub fn with_dependencies(
        event_repo: Arc<R>,
        user_repo: Arc<U>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        EventService { event_repo, user_repo, notifier }
    }

    pub async fn create_event(
        &self,
        organizer_id: Uuid,
        event: CreateEventModel,
    ) -> Result<EventEntity, error::SystemError> {
        if let Some(ends_at) = event.ends_at {
            if ends_at <= event.starts_at {
                return Err(error::SystemError::bad_request("Event must end after it starts"));
            }
        }
        if let (Some(min), Some(max)) = (event.min_count_members, event.max_count_members) {
            if min > max {
                return Err(error::SystemError::bad_request(
                    "Minimum member count cannot exceed the maximum",
                ));
            }
        }

        self.event_repo.create_event(&organizer_id, &event).await
    }

    pub async fn get_event(&self, event_id: Uuid) -> Result<EventEntity, error::SystemError> {
        self.event_repo
            .find_event_by_id(&event_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Event not found"))
    }

    pub async fn list_upcoming(&self) -> Result<Vec<EventEntity>, error::SystemError> {
        self.event_repo.list_upcoming(50).await
    }

    pub async fn get_members(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<MemberResponse>, error::SystemError> {
        self.event_repo.list_members(&event_id).await
    }

    pub async fn request_participation(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<ParticipationRequestEntity, error::SystemError> {
        let event = self
            .event_repo
            .find_event_by_id(&event_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Event not found"))?;

        // the organizer asking to join their own event mirrors a self pair
        if event.organizer_id == user_id {
            return Err(error::SystemError::self_reference(
                "Organizer cannot request to join their own event",
            ));
        }

        let requester = self.user_repo.find_by_id(&user_id).await?;
        if !requester.map(|u| u.is_active).unwrap_or(false) {
            return Err(error::SystemError::inactive_subject("Requester is not an active user"));
        }

        if self.event_repo.is_member(&event_id, &user_id).await? {
            return Err(error::SystemError::duplicate_request(
                "User is already a member of this event",
            ));
        }

        if self.event_repo.find_pending_for(&user_id, &event_id).await?.is_some() {
            return Err(error::SystemError::duplicate_request(
                "A pending participation request already exists",
            ));
        }

        let request = self
            .event_repo
            .create_request(&user_id, &event_id)
            .await
            .map_err(|e| e.into_duplicate("A pending participation request already exists"))?;

        self.notifier
            .publish(DomainEvent::ParticipationRequestCreated {
                request_id: request.id,
                from_user_id: request.from_user_id,
                event_id: request.event_id,
            })
            .await;

        Ok(request)
    }

    pub async fn respond(
        &self,
        responder_id: Uuid,
        request_id: Uuid,
        decision: Decision,
    ) -> Result<ParticipationRequestRow, error::SystemError> {
        let request =
            lifecycle::respond(self.event_repo.as_ref(), request_id, responder_id, decision)
                .await?;

        let event = match decision {
            Decision::Accept => DomainEvent::ParticipationRequestAccepted {
                request_id: request.id,
                from_user_id: request.from_user_id,
                event_id: request.event_id,
            },
            Decision::Decline => DomainEvent::ParticipationRequestDeclined {
                request_id: request.id,
                from_user_id: request.from_user_id,
                event_id: request.event_id,
            },
        };
        self.notifier.publish(event).await;

        Ok(request)
    }

    pub async fn list_my_requests(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ParticipationRequestEntity>, error::SystemError> {
        self.event_repo.list_requests_by_user(&user_id).await
    }

    pub async fn list_event_requests(
        &self,
        organizer_id: Uuid,
        event_id: Uuid,
    ) -> Result<Vec<ParticipationRequestEntity>, error::SystemError> {
        let event = self
            .event_repo
            .find_event_by_id(&event_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Event not found"))?;

        if event.organizer_id != organizer_id {
            return Err(error::SystemError::forbidden(
                "Only the organizer may list requests for this event",
            ));
        }

        self.event_repo.list_pending_for_event(&event_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::modules::event::repository::{EventRepository, ParticipationRepository};
    use crate::modules::request::{lifecycle::RequestFlow, RequestStatus};
    use crate::modules::user::model::{InsertUser, UpdateUser};
    use crate::modules::user::schema::{UserEntity, UserRole};

    fn uuid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn user(id: Uuid, is_active: bool) -> UserEntity {
        UserEntity {
            id,
            email: format!("{}@example.com", id),
            hash_password: String::new(),
            role: UserRole::User,
            first_name: "Test".into(),
            last_name: "User".into(),
            birthday: None,
            sex: None,
            city: None,
            interests: Vec::new(),
            profession: None,
            character: None,
            purpose: None,
            network_nick: None,
            additionally: None,
            is_active,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn event(id: Uuid, organizer_id: Uuid, max_count_members: Option<i32>) -> EventEntity {
        EventEntity {
            id,
            organizer_id,
            name: "Picnic".into(),
            description: "A picnic".into(),
            event_type: None,
            address: None,
            starts_at: chrono::Utc::now() + chrono::Duration::days(1),
            ends_at: None,
            min_count_members: None,
            max_count_members,
            min_age: None,
            max_age: None,
            price: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[derive(Default)]
    struct MemEventRepo {
        events: Mutex<Vec<EventEntity>>,
        requests: Mutex<Vec<ParticipationRequestRow>>,
        members: Mutex<Vec<(Uuid, Uuid)>>,
    }

    #[async_trait::async_trait]
    impl EventRepository for MemEventRepo {
        async fn find_event_by_id(
            &self,
            event_id: &Uuid,
        ) -> Result<Option<EventEntity>, error::SystemError> {
            Ok(self.events.lock().unwrap().iter().find(|e| e.id == *event_id).cloned())
        }

        async fn create_event(
            &self,
            _organizer_id: &Uuid,
            _event: &CreateEventModel,
        ) -> Result<EventEntity, error::SystemError> {
            unimplemented!("not used in these tests")
        }

        async fn list_upcoming(
            &self,
            _limit: i32,
        ) -> Result<Vec<EventEntity>, error::SystemError> {
            Ok(self.events.lock().unwrap().clone())
        }

        async fn list_members(
            &self,
            event_id: &Uuid,
        ) -> Result<Vec<MemberResponse>, error::SystemError> {
            Ok(self
                .members
                .lock()
                .unwrap()
                .iter()
                .filter(|(e, _)| e == event_id)
                .map(|(_, u)| MemberResponse {
                    id: *u,
                    first_name: "Test".into(),
                    last_name: "User".into(),
                })
                .collect())
        }

        async fn is_member(
            &self,
            event_id: &Uuid,
            user_id: &Uuid,
        ) -> Result<bool, error::SystemError> {
            Ok(self.members.lock().unwrap().contains(&(*event_id, *user_id)))
        }
    }

    #[async_trait::async_trait]
    impl ParticipationRepository for MemEventRepo {
        async fn find_pending_for(
            &self,
            user_id: &Uuid,
            event_id: &Uuid,
        ) -> Result<Option<ParticipationRequestEntity>, error::SystemError> {
            Ok(self
                .requests
                .lock()
                .unwrap()
                .iter()
                .find(|r| {
                    r.from_user_id == *user_id
                        && r.event_id == *event_id
                        && r.status == RequestStatus::Pending
                })
                .map(|r| ParticipationRequestEntity {
                    id: r.id,
                    from_user_id: r.from_user_id,
                    event_id: r.event_id,
                    status: r.status,
                    created_at: r.created_at,
                }))
        }

        async fn find_request_by_id(
            &self,
            request_id: &Uuid,
        ) -> Result<Option<ParticipationRequestRow>, error::SystemError> {
            Ok(self.requests.lock().unwrap().iter().find(|r| r.id == *request_id).cloned())
        }

        async fn list_requests_by_user(
            &self,
            user_id: &Uuid,
        ) -> Result<Vec<ParticipationRequestEntity>, error::SystemError> {
            Ok(self
                .requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.from_user_id == *user_id)
                .map(|r| ParticipationRequestEntity {
                    id: r.id,
                    from_user_id: r.from_user_id,
                    event_id: r.event_id,
                    status: r.status,
                    created_at: r.created_at,
                })
                .collect())
        }

        async fn list_pending_for_event(
            &self,
            event_id: &Uuid,
        ) -> Result<Vec<ParticipationRequestEntity>, error::SystemError> {
            Ok(self
                .requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.event_id == *event_id && r.status == RequestStatus::Pending)
                .map(|r| ParticipationRequestEntity {
                    id: r.id,
                    from_user_id: r.from_user_id,
                    event_id: r.event_id,
                    status: r.status,
                    created_at: r.created_at,
                })
                .collect())
        }

        async fn create_request(
            &self,
            user_id: &Uuid,
            event_id: &Uuid,
        ) -> Result<ParticipationRequestEntity, error::SystemError> {
            let organizer_id = self
                .events
                .lock()
                .unwrap()
                .iter()
                .find(|e| e.id == *event_id)
                .map(|e| e.organizer_id)
                .ok_or_else(|| error::SystemError::not_found("Event not found"))?;

            let mut requests = self.requests.lock().unwrap();
            let duplicate = requests.iter().any(|r| {
                r.from_user_id == *user_id
                    && r.event_id == *event_id
                    && r.status == RequestStatus::Pending
            });
            if duplicate {
                return Err(error::SystemError::Conflict(None));
            }

            let row = ParticipationRequestRow {
                id: Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext)),
                from_user_id: *user_id,
                event_id: *event_id,
                status: RequestStatus::Pending,
                created_at: chrono::Utc::now(),
                organizer_id,
            };
            requests.push(row.clone());
            Ok(ParticipationRequestEntity {
                id: row.id,
                from_user_id: row.from_user_id,
                event_id: row.event_id,
                status: row.status,
                created_at: row.created_at,
            })
        }
    }

    #[async_trait::async_trait]
    impl RequestFlow for MemEventRepo {
        type Request = ParticipationRequestRow;

        async fn load(
            &self,
            request_id: &Uuid,
        ) -> Result<Option<ParticipationRequestRow>, error::SystemError> {
            self.find_request_by_id(request_id).await
        }

        fn status(&self, request: &ParticipationRequestRow) -> RequestStatus {
            request.status
        }

        fn authorized_responder(&self, request: &ParticipationRequestRow) -> Uuid {
            request.organizer_id
        }

        async fn accept(
            &self,
            request: &ParticipationRequestRow,
        ) -> Result<Option<ParticipationRequestRow>, error::SystemError> {
            let max = self
                .events
                .lock()
                .unwrap()
                .iter()
                .find(|e| e.id == request.event_id)
                .and_then(|e| e.max_count_members);

            if let Some(max) = max {
                let count = self
                    .members
                    .lock()
                    .unwrap()
                    .iter()
                    .filter(|(e, _)| *e == request.event_id)
                    .count();
                if count >= max as usize {
                    return Err(error::SystemError::bad_request("Event is already at capacity"));
                }
            }

            let mut requests = self.requests.lock().unwrap();
            match requests
                .iter_mut()
                .find(|r| r.id == request.id && r.status == RequestStatus::Pending)
            {
                Some(r) => {
                    r.status = RequestStatus::Accepted;
                    self.members
                        .lock()
                        .unwrap()
                        .push((request.event_id, request.from_user_id));
                    Ok(Some(r.clone()))
                }
                None => Ok(None),
            }
        }

        async fn decline(
            &self,
            request: &ParticipationRequestRow,
        ) -> Result<Option<ParticipationRequestRow>, error::SystemError> {
            let mut requests = self.requests.lock().unwrap();
            match requests
                .iter_mut()
                .find(|r| r.id == request.id && r.status == RequestStatus::Pending)
            {
                Some(r) => {
                    r.status = RequestStatus::Declined;
                    Ok(Some(r.clone()))
                }
                None => Ok(None),
            }
        }
    }

    impl EventRepo for MemEventRepo {}

    struct MemUserRepo {
        users: Mutex<Vec<UserEntity>>,
    }

    #[async_trait::async_trait]
    impl UserRepository for MemUserRepo {
        async fn find_by_id(
            &self,
            id: &Uuid,
        ) -> Result<Option<UserEntity>, error::SystemError> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.id == *id).cloned())
        }

        async fn find_by_email(
            &self,
            _email: &str,
        ) -> Result<Option<UserEntity>, error::SystemError> {
            Ok(None)
        }

        async fn create(&self, _user: &InsertUser) -> Result<Uuid, error::SystemError> {
            unimplemented!("not used in these tests")
        }

        async fn update(
            &self,
            _id: &Uuid,
            _user: &UpdateUser,
        ) -> Result<UserEntity, error::SystemError> {
            unimplemented!("not used in these tests")
        }

        async fn search_users(
            &self,
            _query: &str,
            _limit: i32,
        ) -> Result<Vec<UserEntity>, error::SystemError> {
            Ok(Vec::new())
        }
    }

    struct NullNotifier;

    #[async_trait::async_trait]
    impl crate::modules::notify::Notifier for NullNotifier {
        async fn publish(&self, _event: DomainEvent) {}
    }

    fn service(
        events: Vec<EventEntity>,
        users: Vec<UserEntity>,
    ) -> (EventService<MemEventRepo, MemUserRepo>, Arc<MemEventRepo>) {
        let event_repo =
            Arc::new(MemEventRepo { events: Mutex::new(events), ..Default::default() });
        let user_repo = Arc::new(MemUserRepo { users: Mutex::new(users) });
        let svc = EventService::with_dependencies(
            event_repo.clone(),
            user_repo,
            Arc::new(NullNotifier),
        );
        (svc, event_repo)
    }

    #[tokio::test]
    async fn organizer_cannot_join_own_event() {
        let (organizer, event_id) = (uuid(1), uuid(10));
        let (svc, _) = service(vec![event(event_id, organizer, None)], vec![user(organizer, true)]);

        let err = svc.request_participation(organizer, event_id).await.unwrap_err();
        assert!(matches!(err, error::SystemError::SelfReference(_)));
    }

    #[tokio::test]
    async fn duplicate_pending_request_is_rejected() {
        let (organizer, requester, event_id) = (uuid(1), uuid(2), uuid(10));
        let (svc, _) = service(
            vec![event(event_id, organizer, None)],
            vec![user(organizer, true), user(requester, true)],
        );

        svc.request_participation(requester, event_id).await.unwrap();
        let err = svc.request_participation(requester, event_id).await.unwrap_err();
        assert!(matches!(err, error::SystemError::DuplicateRequest(_)));
    }

    #[tokio::test]
    async fn only_the_organizer_may_respond() {
        let (organizer, requester, event_id) = (uuid(1), uuid(2), uuid(10));
        let (svc, _) = service(
            vec![event(event_id, organizer, None)],
            vec![user(organizer, true), user(requester, true)],
        );

        let request = svc.request_participation(requester, event_id).await.unwrap();

        // the requester accepting their own request is rejected
        let err = svc.respond(requester, request.id, Decision::Accept).await.unwrap_err();
        assert!(matches!(err, error::SystemError::Forbidden(_)));

        svc.respond(organizer, request.id, Decision::Accept).await.unwrap();
        let members = svc.get_members(event_id).await.unwrap();
        assert!(members.iter().any(|m| m.id == requester));
    }

    #[tokio::test]
    async fn respond_returns_the_resolved_request() {
        let (organizer, requester, event_id) = (uuid(1), uuid(2), uuid(10));
        let (svc, _) = service(
            vec![event(event_id, organizer, None)],
            vec![user(organizer, true), user(requester, true)],
        );

        let request = svc.request_participation(requester, event_id).await.unwrap();
        assert_eq!(request.status, RequestStatus::Pending);

        let resolved = svc.respond(organizer, request.id, Decision::Decline).await.unwrap();
        assert_eq!(resolved.status, RequestStatus::Declined);
    }

    #[tokio::test]
    async fn accepted_member_cannot_request_again() {
        let (organizer, requester, event_id) = (uuid(1), uuid(2), uuid(10));
        let (svc, _) = service(
            vec![event(event_id, organizer, None)],
            vec![user(organizer, true), user(requester, true)],
        );

        let request = svc.request_participation(requester, event_id).await.unwrap();
        svc.respond(organizer, request.id, Decision::Accept).await.unwrap();

        let err = svc.request_participation(requester, event_id).await.unwrap_err();
        assert!(matches!(err, error::SystemError::DuplicateRequest(_)));
    }

    #[tokio::test]
    async fn accept_fails_when_event_is_full() {
        let (organizer, first, second, event_id) = (uuid(1), uuid(2), uuid(3), uuid(10));
        let (svc, _) = service(
            vec![event(event_id, organizer, Some(1))],
            vec![user(organizer, true), user(first, true), user(second, true)],
        );

        let r1 = svc.request_participation(first, event_id).await.unwrap();
        let r2 = svc.request_participation(second, event_id).await.unwrap();

        svc.respond(organizer, r1.id, Decision::Accept).await.unwrap();

        let err = svc.respond(organizer, r2.id, Decision::Accept).await.unwrap_err();
        assert!(matches!(err, error::SystemError::BadRequest(_)));

        // the losing request stays pending, so it can still be declined
        svc.respond(organizer, r2.id, Decision::Decline).await.unwrap();
    }

    #[tokio::test]
    async fn second_resolution_is_already_resolved() {
        let (organizer, requester, event_id) = (uuid(1), uuid(2), uuid(10));
        let (svc, _) = service(
            vec![event(event_id, organizer, None)],
            vec![user(organizer, true), user(requester, true)],
        );

        let request = svc.request_participation(requester, event_id).await.unwrap();
        svc.respond(organizer, request.id, Decision::Decline).await.unwrap();

        let err = svc.respond(organizer, request.id, Decision::Accept).await.unwrap_err();
        assert!(matches!(err, error::SystemError::AlreadyResolved(_)));
        assert!(svc.get_members(event_id).await.unwrap().is_empty());
    }
}
