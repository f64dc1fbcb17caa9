use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::configs::RedisCache;
use crate::ENV;

use crate::modules::user::model::{
    InsertUser, SignInModel, SignUpModel, UpdateUser, UpdateUserModel, UserResponse,
};
use crate::modules::user::repository::UserRepository;
use crate::utils::{hash_password, verify_password, Claims, TypeClaims};

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    cache: Arc<RedisCache>,
}

impl UserService {
    pub fn with_dependencies(repo: Arc<dyn UserRepository>, cache: Arc<RedisCache>) -> Self {
        UserService { repo, cache }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UserResponse, error::SystemError> {
        let key = format!("user:{}", id);
        if let Some(cached_user) = self.cache.get::<UserResponse>(&key).await? {
            return Ok(cached_user);
        }
        let user_entity = self.repo.find_by_id(&id).await?;
        if let Some(entity) = user_entity {
            let response = UserResponse::from(entity);
            self.cache.set(&key, &response, 3600).await?;
            Ok(response)
        } else {
            Err(error::SystemError::not_found("User not found"))
        }
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        user: UpdateUserModel,
    ) -> Result<UserResponse, error::SystemError> {
        let update = UpdateUser {
            first_name: user.first_name,
            last_name: user.last_name,
            birthday: user.birthday,
            sex: user.sex,
            city: user.city,
            interests: user.interests,
            profession: user.profession,
            character: user.character,
            purpose: user.purpose,
            network_nick: user.network_nick,
            additionally: user.additionally,
        };

        let updated = self.repo.update(&id, &update).await?;

        let key = format!("user:{}", id);
        self.cache.delete(&key).await?;
        Ok(UserResponse::from(updated))
    }

    pub async fn search(&self, query: &str) -> Result<Vec<UserResponse>, error::SystemError> {
        let users = self.repo.search_users(query, 20).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn sign_up(&self, user: SignUpModel) -> Result<Uuid, error::SystemError> {
        let hash_password = hash_password(&user.password)?;

        let new_user = InsertUser {
            email: user.email,
            hash_password,
            first_name: user.first_name,
            last_name: user.last_name,
            birthday: user.birthday,
        };

        let user_id = self.repo.create(&new_user).await?;
        info!("New user registered: {}", user_id);
        Ok(user_id)
    }

    pub async fn sign_in(&self, user: SignInModel) -> Result<(String, String), error::SystemError> {
        let user_entity = self
            .repo
            .find_by_email(&user.email)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("Invalid email or password"))?;

        if !user_entity.is_active {
            return Err(error::SystemError::unauthorized("Invalid email or password"));
        }

        let valid = verify_password(&user_entity.hash_password, &user.password)?;
        if !valid {
            return Err(error::SystemError::unauthorized("Invalid email or password"));
        }

        let access_token = Claims::new(&user_entity.id, &user_entity.role, ENV.access_token_expiration)
            .with_type(TypeClaims::AccessToken)
            .encode(ENV.jwt_secret.as_ref())?;

        let jti = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));

        let refresh_token =
            Claims::new(&user_entity.id, &user_entity.role, ENV.refresh_token_expiration)
                .with_jti(jti)
                .with_type(TypeClaims::RefreshToken)
                .encode(ENV.jwt_secret.as_ref())?;

        Ok((access_token, refresh_token))
    }
}
