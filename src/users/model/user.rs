use chrono::{DateTime, Utc};
use nanoid::nanoid;

use crate::shared::role::Role;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
  pub id: String,
  pub email: String,
  pub password_hash: String,
  pub role: Role,
  pub active: bool,
  /// Set when previously issued tokens must stop being accepted.
  pub expired_token: bool,
  /// Carried in every token; tokens with an older version are rejected.
  pub token_version: u32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
  pub fn new(
    email: String,
    password_hash: String,
    role: Role,
    active: bool,
  ) -> Self {
    let now = Utc::now();
    Self {
      id: nanoid!(),
      email,
      password_hash,
      role,
      active,
      expired_token: false,
      token_version: 0,
      created_at: now,
      updated_at: now,
      deleted_at: None,
    }
  }

  pub fn is_deleted(&self) -> bool {
    self.deleted_at.is_some()
  }
}
