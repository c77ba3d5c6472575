//! Legal transitions of a user record.
//!
//! A user is either `Inactive` or `Active`, and either `NotDeleted` or
//! `Deleted`. Soft-delete and restore move between the deletion states,
//! authorization moves an inactive Employee to `Active`, and an Admin keeps
//! its role forever. Stores apply these methods (or equivalent filters) so
//! the rules live in one place.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::shared::http_error::AppError;
use crate::shared::role::Role;
use crate::users::model::user::User;

/// The only role whose users are activated through credential issuance.
pub const AUTHORIZABLE_ROLE: Role = Role::Employee;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
  #[error("User not Found")]
  NotFound,
  #[error("Role Admin can not be modified")]
  AdminRoleImmutable,
}

impl From<LifecycleError> for AppError {
  fn from(error: LifecycleError) -> Self {
    match error {
      LifecycleError::NotFound => AppError::NotFound(error.to_string()),
      LifecycleError::AdminRoleImmutable => {
        AppError::Validation(error.to_string())
      }
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
  Inactive,
  Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
  NotDeleted,
  Deleted,
}

/// Field changes requested by a replace or update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
  pub email: Option<String>,
  pub role: Option<Role>,
  pub active: Option<bool>,
}

impl User {
  pub fn state(&self) -> (Activation, Deletion) {
    let activation = if self.active {
      Activation::Active
    } else {
      Activation::Inactive
    };
    let deletion = if self.is_deleted() {
      Deletion::Deleted
    } else {
      Deletion::NotDeleted
    };
    (activation, deletion)
  }

  /// Marks the user deleted. An existing deletion timestamp is kept.
  pub fn soft_delete(&mut self, now: DateTime<Utc>) {
    if self.deleted_at.is_none() {
      self.deleted_at = Some(now);
      self.updated_at = now;
    }
  }

  pub fn restore(&mut self, now: DateTime<Utc>) -> Result<(), LifecycleError> {
    if self.deleted_at.is_none() {
      return Err(LifecycleError::NotFound);
    }
    self.deleted_at = None;
    self.updated_at = now;
    Ok(())
  }

  /// Returns whether the change invalidated the user's tokens.
  pub fn change_role(&mut self, role: Role) -> Result<bool, LifecycleError> {
    if self.role == role {
      return Ok(false);
    }
    if self.role == Role::Admin {
      return Err(LifecycleError::AdminRoleImmutable);
    }
    self.role = role;
    self.expired_token = true;
    self.token_version = self.token_version.wrapping_add(1);
    Ok(true)
  }

  /// Applies the changes, or none of them when the role change is illegal.
  pub fn apply_changes(
    &mut self,
    changes: UserChanges,
    now: DateTime<Utc>,
  ) -> Result<bool, LifecycleError> {
    let invalidated = match changes.role {
      Some(role) => self.change_role(role)?,
      None => false,
    };
    if let Some(email) = changes.email {
      self.email = email;
    }
    if let Some(active) = changes.active {
      self.active = active;
    }
    self.updated_at = now;
    Ok(invalidated)
  }

  /// An already active user is reported exactly like a missing one.
  pub fn ensure_authorizable(&self) -> Result<(), LifecycleError> {
    match (self.role, self.state()) {
      (AUTHORIZABLE_ROLE, (Activation::Inactive, Deletion::NotDeleted)) => {
        Ok(())
      }
      _ => Err(LifecycleError::NotFound),
    }
  }

  pub fn authorize(
    &mut self,
    password_hash: String,
    now: DateTime<Utc>,
  ) -> Result<(), LifecycleError> {
    self.ensure_authorizable()?;
    self.password_hash = password_hash;
    self.active = true;
    self.updated_at = now;
    Ok(())
  }
}
