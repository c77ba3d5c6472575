use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::role::{Role, RoleRto};
use crate::users::model::user::User;

/// A user joined with its role, without the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FindUserRto {
  pub id: String,
  pub email: String,
  pub role_id: Role,
  pub role: RoleRto,
  pub active: bool,
  pub expired_token: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deleted_at: Option<DateTime<Utc>>,
}

impl From<User> for FindUserRto {
  fn from(user: User) -> Self {
    Self {
      id: user.id,
      email: user.email,
      role_id: user.role,
      role: RoleRto::from(user.role),
      active: user.active,
      expired_token: user.expired_token,
      created_at: user.created_at,
      updated_at: user.updated_at,
      deleted_at: user.deleted_at,
    }
  }
}
