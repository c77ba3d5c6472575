//! Startup data: the administrator account and optional fake members.

use fake::{
  faker::internet::en::{Password, SafeEmail},
  Fake,
};
use rand::Rng;
use tracing::info;

use crate::shared::config::Config;
use crate::shared::hash_worker::Hasher;
use crate::shared::http_error::AppError;
use crate::shared::role::Role;
use crate::users::model::user::User;
use crate::users::repository::user_repository::{
  FindOneProperty, UserRepository, Visibility,
};

pub async fn run<UR: UserRepository>(
  repository: &UR,
  hasher: &(dyn Hasher + Send + Sync),
  config: &Config,
) -> Result<(), AppError> {
  if let Some(admin) = &config.admin {
    let existing = repository
      .find_one(FindOneProperty::Email(&admin.email), Visibility::WithDeleted)
      .await?;
    if existing.is_none() {
      let password_hash = hasher.hash_password(&admin.password).await?;
      let user = User::new(admin.email.clone(), password_hash, Role::Admin, true);
      info!(user_id = %user.id, "seeding administrator");
      repository.create(user).await?;
    }
  }

  if config.fake_members > 0 {
    let mut members = Vec::with_capacity(config.fake_members);
    for _ in 0..config.fake_members {
      let role = if rand::rng().random_bool(0.5) {
        Role::Member
      } else {
        Role::Recruiter
      };
      let password: String = Password(12..16).fake();
      let password_hash = hasher.hash_password(&password).await?;
      members.push(User::new(SafeEmail().fake(), password_hash, role, true));
    }
    info!(count = members.len(), "seeding fake members");
    repository.create_many(members).await?;
  }

  Ok(())
}
