use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{
        model::{InsertUser, UpdateUser},
        repository::UserRepository,
        schema::UserEntity,
    },
};

#[derive(Clone)]
pub struct UserRepositoryPg {
    pool: sqlx::PgPool,
}

impl UserRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn create(&self, user: &InsertUser) -> Result<Uuid, error::SystemError> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO users (email, hash_password, first_name, last_name, birthday)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&user.email)
        .bind(&user.hash_password)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.birthday)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update(
        &self,
        id: &Uuid,
        user: &UpdateUser,
    ) -> Result<UserEntity, error::SystemError> {
        let updated = sqlx::query_as::<_, UserEntity>(
            r#"
            UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                birthday = COALESCE($4, birthday),
                sex = COALESCE($5, sex),
                city = CASE WHEN $6 THEN $7 ELSE city END,
                interests = COALESCE($8, interests),
                profession = CASE WHEN $9 THEN $10 ELSE profession END,
                character = CASE WHEN $11 THEN $12 ELSE character END,
                purpose = CASE WHEN $13 THEN $14 ELSE purpose END,
                network_nick = CASE WHEN $15 THEN $16 ELSE network_nick END,
                additionally = CASE WHEN $17 THEN $18 ELSE additionally END,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.birthday)
        .bind(&user.sex)
        .bind(user.city.is_some())
        .bind(user.city.clone().flatten())
        .bind(&user.interests)
        .bind(user.profession.is_some())
        .bind(user.profession.clone().flatten())
        .bind(user.character.is_some())
        .bind(user.character.clone().flatten())
        .bind(user.purpose.is_some())
        .bind(user.purpose.clone().flatten())
        .bind(user.network_nick.is_some())
        .bind(user.network_nick.clone().flatten())
        .bind(user.additionally.is_some())
        .bind(user.additionally.clone().flatten())
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn search_users(
        &self,
        query: &str,
        limit: i32,
    ) -> Result<Vec<UserEntity>, error::SystemError> {
        let pattern = format!("%{}%", query);
        let users = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT * FROM users
            WHERE is_active
              AND (first_name ILIKE $1 OR last_name ILIKE $1 OR email ILIKE $1)
            ORDER BY last_name, first_name
            LIMIT $2
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
