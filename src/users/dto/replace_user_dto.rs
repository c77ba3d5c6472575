use serde::Deserialize;
use validator_derive::Validate;

use crate::shared::role::Role;
use crate::users::lifecycle::UserChanges;

/// Full replacement of the mutable user fields.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceUserDto {
  #[validate(email(message = "Email must be a valid address"))]
  pub email: String,
  pub role_id: Role,
  pub active: bool,
  #[validate(length(
    min = 8,
    message = "Password must have at least 8 characters"
  ))]
  pub password: Option<String>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserDto {
  #[validate(email(message = "Email must be a valid address"))]
  pub email: Option<String>,
  pub role_id: Option<Role>,
  pub active: Option<bool>,
  #[validate(length(
    min = 8,
    message = "Password must have at least 8 characters"
  ))]
  pub password: Option<String>,
}

impl ReplaceUserDto {
  pub fn split(self) -> (UserChanges, Option<String>) {
    let changes = UserChanges {
      email: Some(self.email),
      role: Some(self.role_id),
      active: Some(self.active),
    };
    (changes, self.password)
  }
}

impl UpdateUserDto {
  pub fn split(self) -> (UserChanges, Option<String>) {
    let changes = UserChanges {
      email: self.email,
      role: self.role_id,
      active: self.active,
    };
    (changes, self.password)
  }
}
