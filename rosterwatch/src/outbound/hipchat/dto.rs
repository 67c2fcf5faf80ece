//! Wire DTOs for the chat service's user and message endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::{User, UserId};

#[derive(Debug, Deserialize)]
pub(super) struct UserListDto {
    #[serde(default)]
    pub(super) items: Vec<UserDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserDto {
    pub(super) id: i64,
    #[serde(default)]
    pub(super) mention_name: String,
    #[serde(default)]
    pub(super) name: String,
}

#[derive(Debug, Serialize)]
pub(super) struct MessageRequestDto<'a> {
    pub(super) message: &'a str,
}

impl UserListDto {
    pub(super) fn into_domain_users(self) -> Vec<User> {
        self.items.into_iter().map(UserDto::into_domain_user).collect()
    }
}

impl UserDto {
    fn into_domain_user(self) -> User {
        User::new(UserId::new(self.id), self.mention_name, self.name)
    }
}
