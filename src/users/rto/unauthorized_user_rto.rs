use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::role::Role;
use crate::users::model::user::User;

/// A user waiting for authorization. Carries neither the password, the
/// token invalidation flag, nor the joined role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UnauthorizedUserRto {
  pub id: String,
  pub email: String,
  pub role_id: Role,
  pub active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<User> for UnauthorizedUserRto {
  fn from(user: User) -> Self {
    Self {
      id: user.id,
      email: user.email,
      role_id: user.role,
      active: user.active,
      created_at: user.created_at,
      updated_at: user.updated_at,
    }
  }
}
