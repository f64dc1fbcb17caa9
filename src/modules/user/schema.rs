use chrono::Datelike;
use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, PartialEq, Clone, Type, Serialize, Deserialize)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
pub enum UserRole {
    #[sqlx(rename = "ADMIN")]
    Admin,
    #[sqlx(rename = "USER")]
    User,
}

#[derive(Debug, PartialEq, Clone, Type, Serialize, Deserialize)]
#[sqlx(type_name = "user_sex", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserSex {
    Male,
    Female,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    pub hash_password: String,
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<chrono::NaiveDate>,
    pub sex: Option<UserSex>,
    pub city: Option<String>,
    pub interests: Vec<String>,
    pub profession: Option<String>,
    pub character: Option<String>,
    pub purpose: Option<String>,
    pub network_nick: Option<String>,
    pub additionally: Option<String>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl UserEntity {
    /// Whole years since the birthday, when one is set.
    pub fn age(&self) -> Option<i32> {
        let birthday = self.birthday?;
        let today = chrono::Utc::now().date_naive();
        let mut age = today.year() - birthday.year();
        if (today.month(), today.day()) < (birthday.month(), birthday.day()) {
            age -= 1;
        }
        Some(age)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_birthday(birthday: Option<chrono::NaiveDate>) -> UserEntity {
        UserEntity {
            id: Uuid::from_u128(1),
            email: "a@b.c".into(),
            hash_password: String::new(),
            role: UserRole::User,
            first_name: "A".into(),
            last_name: "B".into(),
            birthday,
            sex: None,
            city: None,
            interests: Vec::new(),
            profession: None,
            character: None,
            purpose: None,
            network_nick: None,
            additionally: None,
            is_active: true,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn age_counts_completed_years() {
        let today = chrono::Utc::now().date_naive();
        let born = today.with_year(today.year() - 30).unwrap();
        assert_eq!(user_with_birthday(Some(born)).age(), Some(30));
    }

    #[test]
    fn age_absent_without_birthday() {
        assert_eq!(user_with_birthday(None).age(), None);
    }
}
