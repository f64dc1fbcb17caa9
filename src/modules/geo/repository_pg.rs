use uuid::Uuid;

use crate::{
    api::error,
    modules::geo::{
        distance::Point,
        model::{EventLocationRow, UserLocationRow},
        repository::LocationRepository,
        schema::{EventLocationEntity, UserLocationEntity},
    },
};

#[derive(Clone)]
pub struct LocationRepositoryPg {
    pool: sqlx::PgPool,
}

impl LocationRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl LocationRepository for LocationRepositoryPg {
    async fn upsert_user_location(
        &self,
        user_id: &Uuid,
        position: Point,
    ) -> Result<(), error::SystemError> {
        sqlx::query(
            r#"
            INSERT INTO user_locations (user_id, lat, lon, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (user_id)
            DO UPDATE SET lat = EXCLUDED.lat, lon = EXCLUDED.lon, updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(position.lat())
        .bind(position.lon())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_user_location(
        &self,
        user_id: &Uuid,
    ) -> Result<Option<UserLocationEntity>, error::SystemError> {
        let location = sqlx::query_as::<_, UserLocationEntity>(
            "SELECT * FROM user_locations WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    async fn list_user_locations(
        &self,
        exclude_user_id: &Uuid,
    ) -> Result<Vec<UserLocationRow>, error::SystemError> {
        let locations = sqlx::query_as::<_, UserLocationRow>(
            r#"
            SELECT ul.user_id, u.first_name, u.last_name, ul.lat, ul.lon
            FROM user_locations ul
            JOIN users u ON u.id = ul.user_id
            WHERE ul.user_id <> $1
              AND u.is_active
            "#,
        )
        .bind(exclude_user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }

    async fn upsert_event_location(
        &self,
        event_id: &Uuid,
        position: Point,
    ) -> Result<(), error::SystemError> {
        sqlx::query(
            r#"
            INSERT INTO event_locations (event_id, lat, lon, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (event_id)
            DO UPDATE SET lat = EXCLUDED.lat, lon = EXCLUDED.lon, updated_at = now()
            "#,
        )
        .bind(event_id)
        .bind(position.lat())
        .bind(position.lon())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_event_location(
        &self,
        event_id: &Uuid,
    ) -> Result<Option<EventLocationEntity>, error::SystemError> {
        let location = sqlx::query_as::<_, EventLocationEntity>(
            "SELECT * FROM event_locations WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    async fn list_event_locations(&self) -> Result<Vec<EventLocationRow>, error::SystemError> {
        let locations = sqlx::query_as::<_, EventLocationRow>(
            r#"
            SELECT el.event_id, e.name, el.lat, el.lon
            FROM event_locations el
            JOIN events e ON e.id = el.event_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }
}
