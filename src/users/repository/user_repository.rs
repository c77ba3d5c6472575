use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::shared::{pagination::PageQuery, role::Role};
use crate::users::model::user::User;

#[derive(Debug, Error)]
pub enum UserRepositoryError {
  #[error("Email already registered: {0}")]
  DuplicateEmail(String),

  #[cfg(feature = "mongodb")]
  #[error("Database error: {0}")]
  Database(#[from] mongodb::error::Error),

  #[error("Mapping error: {0}")]
  Mapping(String),

  #[error("Other error: {0}")]
  Other(String),
}

#[derive(Debug, Clone, Copy)]
pub enum FindOneProperty<'a> {
  Id(&'a str),
  Email(&'a str),
}

/// Which users a query may see with respect to soft deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
  #[default]
  ExcludeDeleted,
  WithDeleted,
  OnlyDeleted,
}

impl Visibility {
  pub fn admits(self, user: &User) -> bool {
    match self {
      Visibility::ExcludeDeleted => !user.is_deleted(),
      Visibility::WithDeleted => true,
      Visibility::OnlyDeleted => user.is_deleted(),
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
  pub visibility: Visibility,
  pub email: Option<String>,
  pub role: Option<Role>,
  pub active: Option<bool>,
}

impl UserFilter {
  pub fn matches(&self, user: &User) -> bool {
    self.visibility.admits(user)
      && self.email.as_ref().map_or(true, |email| &user.email == email)
      && self.role.map_or(true, |role| user.role == role)
      && self.active.map_or(true, |active| user.active == active)
  }
}

pub trait UserRepository {
  async fn find_one(
    &self,
    property: FindOneProperty<'_>,
    visibility: Visibility,
  ) -> Result<Option<User>, UserRepositoryError>;

  /// Matching users in creation order, with the total before paging.
  async fn find_many(
    &self,
    filter: &UserFilter,
    page: Option<&PageQuery>,
  ) -> Result<(Vec<User>, u64), UserRepositoryError>;

  async fn create(&self, user: User) -> Result<(), UserRepositoryError>;

  /// Inserts every user or none of them.
  async fn create_many(
    &self,
    users: Vec<User>,
  ) -> Result<(), UserRepositoryError>;

  /// Replaces the stored record with the same id, provided it is not
  /// deleted and its `updated_at` still equals `read_at`. Returns false
  /// otherwise.
  async fn update(
    &self,
    user: &User,
    read_at: DateTime<Utc>,
  ) -> Result<bool, UserRepositoryError>;

  /// Activates an inactive, non-deleted Employee with a new password hash.
  /// Returns false when the user no longer qualifies.
  async fn activate(
    &self,
    id: &str,
    password_hash: &str,
    now: DateTime<Utc>,
  ) -> Result<bool, UserRepositoryError>;

  /// Returns false if no user has this id, deleted or not.
  async fn soft_delete(
    &self,
    id: &str,
    now: DateTime<Utc>,
  ) -> Result<bool, UserRepositoryError>;

  /// Returns false unless a soft-deleted user with this id was restored.
  async fn restore(
    &self,
    id: &str,
    now: DateTime<Utc>,
  ) -> Result<bool, UserRepositoryError>;
}

// ### In-memory implementation ###

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
  pub users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserRepository {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_users(users: Vec<User>) -> Self {
    Self {
      users: Arc::new(RwLock::new(users)),
    }
  }

  fn read(
    &self,
  ) -> Result<std::sync::RwLockReadGuard<'_, Vec<User>>, UserRepositoryError>
  {
    self.users.read().map_err(|_| poisoned())
  }

  fn write(
    &self,
  ) -> Result<std::sync::RwLockWriteGuard<'_, Vec<User>>, UserRepositoryError>
  {
    self.users.write().map_err(|_| poisoned())
  }

  fn modify<F>(&self, id: &str, f: F) -> Result<bool, UserRepositoryError>
  where
    F: FnOnce(&mut User) -> bool,
  {
    let mut users = self.write()?;
    Ok(users.iter_mut().find(|user| user.id == id).map_or(false, f))
  }
}

fn poisoned() -> UserRepositoryError {
  UserRepositoryError::Other(String::from("user store lock poisoned"))
}

impl UserRepository for InMemoryUserRepository {
  async fn find_one(
    &self,
    property: FindOneProperty<'_>,
    visibility: Visibility,
  ) -> Result<Option<User>, UserRepositoryError> {
    let users = self.read()?;
    Ok(
      users
        .iter()
        .filter(|user| visibility.admits(user))
        .find(|user| match property {
          FindOneProperty::Id(id) => user.id == id,
          FindOneProperty::Email(email) => user.email == email,
        })
        .cloned(),
    )
  }

  async fn find_many(
    &self,
    filter: &UserFilter,
    page: Option<&PageQuery>,
  ) -> Result<(Vec<User>, u64), UserRepositoryError> {
    let users = self.read()?;
    let matching = users.iter().filter(|user| filter.matches(user));
    let total = matching.clone().count() as u64;
    let found = match page {
      Some(page) => matching
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .cloned()
        .collect(),
      None => matching.cloned().collect(),
    };
    Ok((found, total))
  }

  async fn create(&self, user: User) -> Result<(), UserRepositoryError> {
    self.create_many(vec![user]).await
  }

  async fn create_many(
    &self,
    new_users: Vec<User>,
  ) -> Result<(), UserRepositoryError> {
    let mut users = self.write()?;
    for (index, user) in new_users.iter().enumerate() {
      let taken = users.iter().any(|existing| existing.email == user.email)
        || new_users[..index]
          .iter()
          .any(|earlier| earlier.email == user.email);
      if taken {
        return Err(UserRepositoryError::DuplicateEmail(user.email.clone()));
      }
    }
    users.extend(new_users);
    Ok(())
  }

  async fn update(
    &self,
    user: &User,
    read_at: DateTime<Utc>,
  ) -> Result<bool, UserRepositoryError> {
    let mut users = self.write()?;
    if users
      .iter()
      .any(|existing| existing.id != user.id && existing.email == user.email)
    {
      return Err(UserRepositoryError::DuplicateEmail(user.email.clone()));
    }
    let current = users.iter_mut().find(|existing| {
      existing.id == user.id
        && !existing.is_deleted()
        && existing.updated_at == read_at
    });
    Ok(match current {
      Some(existing) => {
        *existing = user.clone();
        true
      }
      None => false,
    })
  }

  async fn activate(
    &self,
    id: &str,
    password_hash: &str,
    now: DateTime<Utc>,
  ) -> Result<bool, UserRepositoryError> {
    self.modify(id, |user| {
      user.authorize(password_hash.to_string(), now).is_ok()
    })
  }

  async fn soft_delete(
    &self,
    id: &str,
    now: DateTime<Utc>,
  ) -> Result<bool, UserRepositoryError> {
    self.modify(id, |user| {
      user.soft_delete(now);
      true
    })
  }

  async fn restore(
    &self,
    id: &str,
    now: DateTime<Utc>,
  ) -> Result<bool, UserRepositoryError> {
    self.modify(id, |user| user.restore(now).is_ok())
  }
}
