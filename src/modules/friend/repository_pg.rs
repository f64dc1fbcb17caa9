use uuid::Uuid;

use crate::{
    api::error,
    modules::friend::{
        model::{FriendRequestResponse, FriendRequestRow, FriendResponse, IdOrInfo},
        repository::{FriendRepo, FriendRequestRepository, FriendshipRepository},
        schema::{FriendRequestEntity, FriendshipEntity},
    },
    modules::request::{canonical_pair, lifecycle::RequestFlow, RequestStatus},
};

#[derive(Clone)]
pub struct FriendRepositoryPg {
    pool: sqlx::PgPool,
}

impl FriendRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FriendshipRepository for FriendRepositoryPg {
    async fn find_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<FriendshipEntity>, error::SystemError> {
        let (user_a, user_b) = canonical_pair(*user_id_a, *user_id_b);

        let friendship = sqlx::query_as::<_, FriendshipEntity>(
            "SELECT * FROM friendships WHERE user_a = $1 AND user_b = $2",
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(friendship)
    }

    async fn find_friends(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let friends = sqlx::query_as::<_, FriendResponse>(
            r#"
        SELECT
            u.id,
            u.first_name,
            u.last_name,
            u.city
        FROM friendships f
        JOIN users u
            ON u.id = CASE
                WHEN f.user_a = $1 THEN f.user_b
                ELSE f.user_a
            END
        WHERE f.user_a = $1
           OR f.user_b = $1
        "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(friends)
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for FriendRepositoryPg {
    async fn find_pending_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE status = 'pending'
              AND (
                   (from_user_id = $1 AND to_user_id = $2)
                OR (from_user_id = $2 AND to_user_id = $1)
              )
            "#,
        )
        .bind(user_id_a)
        .bind(user_id_b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_request_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request =
            sqlx::query_as::<_, FriendRequestEntity>("SELECT * FROM friend_requests WHERE id = $1")
                .bind(request_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(request)
    }

    async fn list_requests_from_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let rows = sqlx::query_as::<_, FriendRequestRow>(
            r#"
            SELECT
                fr.id AS req_id,
                fr.status,
                u.id AS user_id,
                u.first_name,
                u.last_name,
                u.city,
                fr.created_at
            FROM friend_requests fr
            JOIN users u
                ON fr.to_user_id = u.id
            WHERE fr.from_user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| FriendRequestResponse {
                id: r.req_id,
                from: IdOrInfo::Id(*user_id),
                to: IdOrInfo::Info(FriendResponse {
                    id: r.user_id,
                    first_name: r.first_name,
                    last_name: r.last_name,
                    city: r.city,
                }),
                status: r.status,
                created_at: r.created_at,
            })
            .collect())
    }

    async fn list_requests_to_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let rows = sqlx::query_as::<_, FriendRequestRow>(
            r#"
            SELECT
                fr.id AS req_id,
                fr.status,
                u.id AS user_id,
                u.first_name,
                u.last_name,
                u.city,
                fr.created_at
            FROM friend_requests fr
            JOIN users u
                ON fr.from_user_id = u.id
            WHERE fr.to_user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| FriendRequestResponse {
                id: r.req_id,
                from: IdOrInfo::Info(FriendResponse {
                    id: r.user_id,
                    first_name: r.first_name,
                    last_name: r.last_name,
                    city: r.city,
                }),
                to: IdOrInfo::Id(*user_id),
                status: r.status,
                created_at: r.created_at,
            })
            .collect())
    }

    async fn create_request(
        &self,
        sender_id: &Uuid,
        receiver_id: &Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        // The partial unique index on the canonical pending pair turns a
        // create/create race into exactly one success and one 23505.
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            INSERT INTO friend_requests (from_user_id, to_user_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }
}

#[async_trait::async_trait]
impl RequestFlow for FriendRepositoryPg {
    type Request = FriendRequestEntity;

    async fn load(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        self.find_request_by_id(request_id).await
    }

    fn status(&self, request: &FriendRequestEntity) -> RequestStatus {
        request.status
    }

    fn authorized_responder(&self, request: &FriendRequestEntity) -> Uuid {
        request.to_user_id
    }

    async fn accept(
        &self,
        request: &FriendRequestEntity,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        // Compare-and-set: only one concurrent responder wins.
        let updated = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            UPDATE friend_requests SET status = 'accepted'
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

        let (user_a, user_b) = canonical_pair(request.from_user_id, request.to_user_id);

        sqlx::query("INSERT INTO friendships (user_a, user_b) VALUES ($1, $2)")
            .bind(user_a)
            .bind(user_b)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(updated))
    }

    async fn decline(
        &self,
        request: &FriendRequestEntity,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let updated = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            UPDATE friend_requests SET status = 'declined'
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(request.id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }
}

impl FriendRepo for FriendRepositoryPg {}
