use uuid::Uuid;

use crate::api::error;
use crate::modules::request::{Decision, RequestStatus};

/// Capability interface a request kind must provide so the shared `respond`
/// driver can run its lifecycle. Implemented by the friend-request and
/// participation-request repositories; the accept/decline hooks are expected
/// to be atomic (compare-and-set on Pending, edge materialization in the
/// same transaction).
#[async_trait::async_trait]
pub trait RequestFlow: Send + Sync {
    type Request: Send + Sync;

    async fn load(&self, request_id: &Uuid) -> Result<Option<Self::Request>, error::SystemError>;

    fn status(&self, request: &Self::Request) -> RequestStatus;

    /// The only user allowed to resolve this request (recipient for friend
    /// requests, event organizer for participation requests).
    fn authorized_responder(&self, request: &Self::Request) -> Uuid;

    /// Transition Pending -> Accepted and materialize the downstream edge in
    /// one transaction. Returns the updated request, or None when it was no
    /// longer Pending.
    async fn accept(
        &self,
        request: &Self::Request,
    ) -> Result<Option<Self::Request>, error::SystemError>;

    /// Transition Pending -> Declined. Returns the updated request, or None
    /// when it was no longer Pending.
    async fn decline(
        &self,
        request: &Self::Request,
    ) -> Result<Option<Self::Request>, error::SystemError>;
}

/// Shared respond driver. Check order is fixed: unknown id, then wrong
/// responder, then non-pending state. A lost CAS race surfaces as
/// AlreadyResolved just like an up-front non-pending read.
pub async fn respond<F: RequestFlow>(
    flow: &F,
    request_id: Uuid,
    responder_id: Uuid,
    decision: Decision,
) -> Result<F::Request, error::SystemError> {
    let request = flow
        .load(&request_id)
        .await?
        .ok_or_else(|| error::SystemError::not_found("Request not found"))?;

    if flow.authorized_responder(&request) != responder_id {
        return Err(error::SystemError::forbidden(
            "You are not allowed to respond to this request",
        ));
    }

    if flow.status(&request) != RequestStatus::Pending {
        return Err(error::SystemError::already_resolved("Request is already resolved"));
    }

    let resolved = match decision {
        Decision::Accept => flow.accept(&request).await?,
        Decision::Decline => flow.decline(&request).await?,
    };

    resolved.ok_or_else(|| error::SystemError::already_resolved("Request is already resolved"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    struct FakeRequest {
        id: Uuid,
        responder: Uuid,
        status: RequestStatus,
    }

    struct FakeFlow {
        requests: Mutex<Vec<FakeRequest>>,
        materialized: Mutex<Vec<Uuid>>,
    }

    impl FakeFlow {
        fn with_pending(id: Uuid, responder: Uuid) -> Self {
            FakeFlow {
                requests: Mutex::new(vec![FakeRequest {
                    id,
                    responder,
                    status: RequestStatus::Pending,
                }]),
                materialized: Mutex::new(Vec::new()),
            }
        }

        fn cas(&self, id: &Uuid, to: RequestStatus) -> Option<FakeRequest> {
            let mut requests = self.requests.lock().unwrap();
            match requests
                .iter_mut()
                .find(|r| r.id == *id && r.status == RequestStatus::Pending)
            {
                Some(r) => {
                    r.status = to;
                    Some(r.clone())
                }
                None => None,
            }
        }
    }

    #[async_trait::async_trait]
    impl RequestFlow for FakeFlow {
        type Request = FakeRequest;

        async fn load(
            &self,
            request_id: &Uuid,
        ) -> Result<Option<FakeRequest>, error::SystemError> {
            Ok(self.requests.lock().unwrap().iter().find(|r| r.id == *request_id).cloned())
        }

        fn status(&self, request: &FakeRequest) -> RequestStatus {
            request.status
        }

        fn authorized_responder(&self, request: &FakeRequest) -> Uuid {
            request.responder
        }

        async fn accept(
            &self,
            request: &FakeRequest,
        ) -> Result<Option<FakeRequest>, error::SystemError> {
            let updated = self.cas(&request.id, RequestStatus::Accepted);
            if updated.is_some() {
                self.materialized.lock().unwrap().push(request.id);
            }
            Ok(updated)
        }

        async fn decline(
            &self,
            request: &FakeRequest,
        ) -> Result<Option<FakeRequest>, error::SystemError> {
            Ok(self.cas(&request.id, RequestStatus::Declined))
        }
    }

    fn uuid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[tokio::test]
    async fn unknown_request_is_not_found() {
        let flow = FakeFlow::with_pending(uuid(1), uuid(2));
        let err = respond(&flow, uuid(99), uuid(2), Decision::Accept).await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));
    }

    #[tokio::test]
    async fn wrong_responder_is_forbidden() {
        let flow = FakeFlow::with_pending(uuid(1), uuid(2));
        // the initiator trying to accept their own request
        let err = respond(&flow, uuid(1), uuid(3), Decision::Accept).await.unwrap_err();
        assert!(matches!(err, error::SystemError::Forbidden(_)));
        assert!(flow.materialized.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn accept_transitions_once_and_materializes() {
        let flow = FakeFlow::with_pending(uuid(1), uuid(2));

        respond(&flow, uuid(1), uuid(2), Decision::Accept).await.unwrap();
        assert_eq!(flow.materialized.lock().unwrap().as_slice(), &[uuid(1)]);

        // second resolution is rejected regardless of decision
        let err = respond(&flow, uuid(1), uuid(2), Decision::Accept).await.unwrap_err();
        assert!(matches!(err, error::SystemError::AlreadyResolved(_)));
        let err = respond(&flow, uuid(1), uuid(2), Decision::Decline).await.unwrap_err();
        assert!(matches!(err, error::SystemError::AlreadyResolved(_)));
        assert_eq!(flow.materialized.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn resolved_request_is_returned_with_its_new_status() {
        let flow = FakeFlow::with_pending(uuid(1), uuid(2));
        let accepted = respond(&flow, uuid(1), uuid(2), Decision::Accept).await.unwrap();
        assert_eq!(accepted.status, RequestStatus::Accepted);

        let flow = FakeFlow::with_pending(uuid(1), uuid(2));
        let declined = respond(&flow, uuid(1), uuid(2), Decision::Decline).await.unwrap();
        assert_eq!(declined.status, RequestStatus::Declined);
    }

    #[tokio::test]
    async fn decline_has_no_side_effect() {
        let flow = FakeFlow::with_pending(uuid(1), uuid(2));

        respond(&flow, uuid(1), uuid(2), Decision::Decline).await.unwrap();
        assert!(flow.materialized.lock().unwrap().is_empty());

        let err = respond(&flow, uuid(1), uuid(2), Decision::Accept).await.unwrap_err();
        assert!(matches!(err, error::SystemError::AlreadyResolved(_)));
    }

    #[tokio::test]
    async fn lost_cas_race_reads_as_already_resolved() {
        let flow = FakeFlow::with_pending(uuid(1), uuid(2));
        let request = flow.load(&uuid(1)).await.unwrap().unwrap();

        // another caller resolves between load and transition
        assert!(flow.cas(&request.id, RequestStatus::Declined).is_some());

        let err = respond(&flow, uuid(1), uuid(2), Decision::Accept).await.unwrap_err();
        assert!(matches!(err, error::SystemError::AlreadyResolved(_)));
    }
}
