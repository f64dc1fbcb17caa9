use uuid::Uuid;

use crate::{
    api::error,
    modules::event::{
        model::{CreateEventModel, MemberResponse},
        repository::{EventRepo, EventRepository, ParticipationRepository},
        schema::{EventEntity, ParticipationRequestEntity, ParticipationRequestRow},
    },
    modules::request::{lifecycle::RequestFlow, RequestStatus},
};

#[derive(Clone)]
pub struct EventRepositoryPg {
    pool: sqlx::PgPool,
}

impl EventRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl EventRepository for EventRepositoryPg {
    async fn find_event_by_id(
        &self,
        event_id: &Uuid,
    ) -> Result<Option<EventEntity>, error::SystemError> {
        let event = sqlx::query_as::<_, EventEntity>("SELECT * FROM events WHERE id = $1")
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    async fn create_event(
        &self,
        organizer_id: &Uuid,
        event: &CreateEventModel,
    ) -> Result<EventEntity, error::SystemError> {
        let created = sqlx::query_as::<_, EventEntity>(
            r#"
            INSERT INTO events (
                organizer_id, name, description, event_type, address,
                starts_at, ends_at, min_count_members, max_count_members,
                min_age, max_age, price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(organizer_id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(&event.event_type)
        .bind(&event.address)
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(event.min_count_members)
        .bind(event.max_count_members)
        .bind(event.min_age)
        .bind(event.max_age)
        .bind(event.price)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list_upcoming(&self, limit: i32) -> Result<Vec<EventEntity>, error::SystemError> {
        let events = sqlx::query_as::<_, EventEntity>(
            "SELECT * FROM events WHERE starts_at >= now() ORDER BY starts_at LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn list_members(
        &self,
        event_id: &Uuid,
    ) -> Result<Vec<MemberResponse>, error::SystemError> {
        let members = sqlx::query_as::<_, MemberResponse>(
            r#"
            SELECT u.id, u.first_name, u.last_name
            FROM event_members em
            JOIN users u ON u.id = em.user_id
            WHERE em.event_id = $1
            ORDER BY em.joined_at
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    async fn is_member(
        &self,
        event_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM event_members WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

#[async_trait::async_trait]
impl ParticipationRepository for EventRepositoryPg {
    async fn find_pending_for(
        &self,
        user_id: &Uuid,
        event_id: &Uuid,
    ) -> Result<Option<ParticipationRequestEntity>, error::SystemError> {
        let request = sqlx::query_as::<_, ParticipationRequestEntity>(
            r#"
            SELECT * FROM participation_requests
            WHERE from_user_id = $1 AND event_id = $2 AND status = 'pending'
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_request_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<ParticipationRequestRow>, error::SystemError> {
        let request = sqlx::query_as::<_, ParticipationRequestRow>(
            r#"
            SELECT pr.*, e.organizer_id
            FROM participation_requests pr
            JOIN events e ON e.id = pr.event_id
            WHERE pr.id = $1
            "#,
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn list_requests_by_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<ParticipationRequestEntity>, error::SystemError> {
        let requests = sqlx::query_as::<_, ParticipationRequestEntity>(
            "SELECT * FROM participation_requests WHERE from_user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn list_pending_for_event(
        &self,
        event_id: &Uuid,
    ) -> Result<Vec<ParticipationRequestEntity>, error::SystemError> {
        let requests = sqlx::query_as::<_, ParticipationRequestEntity>(
            r#"
            SELECT * FROM participation_requests
            WHERE event_id = $1 AND status = 'pending'
            ORDER BY created_at
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn create_request(
        &self,
        user_id: &Uuid,
        event_id: &Uuid,
    ) -> Result<ParticipationRequestEntity, error::SystemError> {
        // Partial unique index on pending (from_user_id, event_id) makes a
        // concurrent double-create fail with 23505 for exactly one caller.
        let request = sqlx::query_as::<_, ParticipationRequestEntity>(
            r#"
            INSERT INTO participation_requests (from_user_id, event_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }
}

#[async_trait::async_trait]
impl RequestFlow for EventRepositoryPg {
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
        let mut tx = self.pool.begin().await?;

        // Lock the event row so capacity checks serialize across accepts.
        let event = sqlx::query_as::<_, EventEntity>(
            "SELECT * FROM events WHERE id = $1 FOR UPDATE",
        )
        .bind(request.event_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| error::SystemError::not_found("Event not found"))?;

        if let Some(max) = event.max_count_members {
            let (count,): (i64,) =
                sqlx::query_as("SELECT count(*) FROM event_members WHERE event_id = $1")
                    .bind(request.event_id)
                    .fetch_one(&mut *tx)
                    .await?;

            if count >= max as i64 {
                tx.rollback().await?;
                return Err(error::SystemError::bad_request("Event is already at capacity"));
            }
        }

        let updated = sqlx::query_as::<_, ParticipationRequestEntity>(
            r#"
            UPDATE participation_requests SET status = 'accepted'
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(request.id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(updated) = updated else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query("INSERT INTO event_members (event_id, user_id) VALUES ($1, $2)")
            .bind(request.event_id)
            .bind(request.from_user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(with_organizer(updated, request.organizer_id)))
    }

    async fn decline(
        &self,
        request: &ParticipationRequestRow,
    ) -> Result<Option<ParticipationRequestRow>, error::SystemError> {
        let updated = sqlx::query_as::<_, ParticipationRequestEntity>(
            r#"
            UPDATE participation_requests SET status = 'declined'
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(request.id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated.map(|entity| with_organizer(entity, request.organizer_id)))
    }
}

impl EventRepo for EventRepositoryPg {}

// The organizer never changes while a request is being resolved, so the
// updated entity can be rejoined without a second query.
fn with_organizer(entity: ParticipationRequestEntity, organizer_id: Uuid) -> ParticipationRequestRow {
    ParticipationRequestRow {
        id: entity.id,
        from_user_id: entity.from_user_id,
        event_id: entity.event_id,
        status: entity.status,
        created_at: entity.created_at,
        organizer_id,
    }
}
