use serde::{Deserialize, Serialize};
use validator::Validate as _;
use validator_derive::Validate;

use crate::shared::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserDto {
  #[validate(email(message = "Email must be a valid address"))]
  pub email: String,
  #[validate(length(
    min = 8,
    message = "Password must have at least 8 characters"
  ))]
  pub password: String,
  pub role_id: Role,
  #[serde(default)]
  pub active: bool,
}

/// Body of a bulk creation.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateManyDto {
  #[validate(length(min = 1, message = "bulk must not be empty"), nested)]
  pub bulk: Vec<CreateUserDto>,
}

#[cfg(test)]
mod tests {
  use validator::Validate;

  use super::*;

  #[test]
  fn test_rejects_invalid_fields() {
    let dto: CreateUserDto = serde_json::from_value(serde_json::json!({
      "email": "not-an-email",
      "password": "short",
      "roleId": 2
    }))
    .unwrap();
    let errors = dto.validate().unwrap_err();
    let fields = errors.field_errors();
    assert!(fields.contains_key("email"));
    assert!(fields.contains_key("password"));
    assert!(!dto.active);
  }

  #[test]
  fn test_unknown_role_is_a_deserialization_error() {
    let result = serde_json::from_value::<CreateUserDto>(serde_json::json!({
      "email": "someone@example.com",
      "password": "long enough",
      "roleId": 7
    }));
    assert!(result.is_err());
  }

  #[test]
  fn test_bulk_validates_every_entry() {
    let dto: CreateManyDto = serde_json::from_value(serde_json::json!({
      "bulk": [
        { "email": "someone@example.com", "password": "long enough", "roleId": 2 },
        { "email": "broken", "password": "long enough", "roleId": 3 }
      ]
    }))
    .unwrap();
    assert!(dto.validate().is_err());

    let empty = CreateManyDto { bulk: Vec::new() };
    assert!(empty.validate().is_err());
  }
}
