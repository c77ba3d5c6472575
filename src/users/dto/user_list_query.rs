use serde::Deserialize;
use validator_derive::Validate;

use crate::shared::pagination::{PageQuery, DEFAULT_LIMIT, DEFAULT_PAGE};
use crate::shared::role::Role;
use crate::users::repository::user_repository::{UserFilter, Visibility};

/// Query string of the get-many operation.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
  #[serde(default = "default_limit")]
  #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
  pub limit: u64,
  #[serde(default = "default_page")]
  #[validate(range(min = 1, message = "page must be at least 1"))]
  pub page: u64,
  pub email: Option<String>,
  pub role_id: Option<Role>,
  pub active: Option<bool>,
}

fn default_limit() -> u64 {
  DEFAULT_LIMIT
}

fn default_page() -> u64 {
  DEFAULT_PAGE
}

impl UserListQuery {
  pub fn page(&self) -> PageQuery {
    PageQuery {
      limit: self.limit,
      page: self.page,
    }
  }

  pub fn filter(&self) -> UserFilter {
    UserFilter {
      visibility: Visibility::ExcludeDeleted,
      email: self.email.clone(),
      role: self.role_id,
      active: self.active,
    }
  }
}
