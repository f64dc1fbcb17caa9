use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::user::schema::{UserEntity, UserSex};
use crate::utils::double_option;

#[derive(Deserialize, Validate)]
pub struct SignUpModel {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
    #[validate(length(min = 2, message = "First name must be at least 2 characters long"))]
    pub first_name: String,
    #[validate(length(min = 2, message = "Last name must be at least 2 characters long"))]
    pub last_name: String,
    pub birthday: Option<chrono::NaiveDate>,
}

#[derive(Deserialize, Validate)]
pub struct SignInModel {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct UpdateUserModel {
    #[validate(length(min = 2, message = "First name must be at least 2 characters long"))]
    pub first_name: Option<String>,
    #[validate(length(min = 2, message = "Last name must be at least 2 characters long"))]
    pub last_name: Option<String>,
    pub birthday: Option<chrono::NaiveDate>,
    pub sex: Option<UserSex>,
    #[serde(default, deserialize_with = "double_option")]
    pub city: Option<Option<String>>,
    pub interests: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub profession: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub character: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub purpose: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub network_nick: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub additionally: Option<Option<String>>,
}

pub struct InsertUser {
    pub email: String,
    pub hash_password: String,
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<chrono::NaiveDate>,
}

pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birthday: Option<chrono::NaiveDate>,
    pub sex: Option<UserSex>,
    pub city: Option<Option<String>>,
    pub interests: Option<Vec<String>>,
    pub profession: Option<Option<String>>,
    pub character: Option<Option<String>>,
    pub purpose: Option<Option<String>>,
    pub network_nick: Option<Option<String>>,
    pub additionally: Option<Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: uuid::Uuid,
    pub first_name: String,
    pub last_name: String,
    pub sex: Option<UserSex>,
    pub age: Option<i32>,
    pub city: Option<String>,
    pub interests: Vec<String>,
    pub profession: Option<String>,
    pub character: Option<String>,
    pub purpose: Option<String>,
    pub network_nick: Option<String>,
    pub additionally: Option<String>,
}

impl From<UserEntity> for UserResponse {
    fn from(user: UserEntity) -> Self {
        let age = user.age();
        UserResponse {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            sex: user.sex,
            age,
            city: user.city,
            interests: user.interests,
            profession: user.profession,
            character: user.character,
            purpose: user.purpose,
            network_nick: user.network_nick,
            additionally: user.additionally,
        }
    }
}

#[derive(Serialize)]
pub struct SignUpResponse {
    pub id: uuid::Uuid,
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub access_token: String,
}
