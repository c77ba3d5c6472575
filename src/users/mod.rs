pub mod dto;
pub mod lifecycle;
pub mod model;
pub mod repository;
pub mod rto;

use actix_web::{web, HttpResponse};
use chrono::Utc;
use dto::create_user_dto::{CreateManyDto, CreateUserDto};
use dto::replace_user_dto::{ReplaceUserDto, UpdateUserDto};
use dto::user_list_query::UserListQuery;
use lifecycle::{LifecycleError, UserChanges};
use model::user::User;
use repository::user_repository::{
  FindOneProperty, UserFilter, UserRepository, Visibility,
};
use rto::find_user_rto::FindUserRto;
use rto::unauthorized_user_rto::UnauthorizedUserRto;
use tracing::{debug, info};
use validator::Validate;

use crate::auth::identity::{AdminUser, CurrentUser};
use crate::shared::http_error::{AppError, CONCURRENT_CHANGE};
use crate::shared::notifier::dispatch_credentials;
use crate::shared::pagination::{Page, PageQuery};
use crate::shared::rto::{created_rto::CreatedRto, status_rto::StatusRto};
use crate::AppState;

fn user_not_found() -> AppError {
  AppError::NotFound(LifecycleError::NotFound.to_string())
}

fn status_ok() -> HttpResponse {
  HttpResponse::Ok().json(StatusRto::OK)
}

async fn find_user<UR: UserRepository>(
  data: &AppState<UR>,
  id: &str,
  visibility: Visibility,
) -> Result<User, AppError> {
  data
    .user_repository
    .find_one(FindOneProperty::Id(id), visibility)
    .await?
    .ok_or_else(user_not_found)
}

pub async fn get_users<UR: UserRepository>(
  data: web::Data<AppState<UR>>,
  query: web::Query<UserListQuery>,
  _user: CurrentUser,
) -> Result<HttpResponse, AppError> {
  query.validate()?;
  let page = query.page();
  let (users, total) = data
    .user_repository
    .find_many(&query.filter(), Some(&page))
    .await?;
  Ok(
    HttpResponse::Ok()
      .json(Page::new(users, total, &page).map(FindUserRto::from)),
  )
}

pub async fn get_user<UR: UserRepository>(
  data: web::Data<AppState<UR>>,
  path: web::Path<String>,
  _user: CurrentUser,
) -> Result<HttpResponse, AppError> {
  let user = find_user(&data, &path, Visibility::ExcludeDeleted)
    .await
    .map_err(|error| match error {
      AppError::NotFound(_) => {
        AppError::NotFound(String::from("User not found"))
      }
      other => other,
    })?;
  Ok(HttpResponse::Ok().json(FindUserRto::from(user)))
}

pub async fn create_user<UR: UserRepository>(
  data: web::Data<AppState<UR>>,
  dto: web::Json<CreateUserDto>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  dto.validate()?;
  let user = build_user(&data, dto.into_inner()).await?;
  let id = user.id.clone();
  data.user_repository.create(user).await?;

  info!(user_id = %id, "user created");
  Ok(CreatedRto::response(&id))
}

pub async fn create_users<UR: UserRepository>(
  data: web::Data<AppState<UR>>,
  dto: web::Json<CreateManyDto>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  dto.validate()?;
  let mut users = Vec::with_capacity(dto.bulk.len());
  for entry in dto.into_inner().bulk {
    users.push(build_user(&data, entry).await?);
  }
  let created: Vec<CreatedRto> = users
    .iter()
    .map(|user| CreatedRto {
      id: user.id.clone(),
    })
    .collect();
  data.user_repository.create_many(users).await?;

  info!(count = created.len(), "users created in bulk");
  Ok(HttpResponse::Created().json(created))
}

async fn build_user<UR: UserRepository>(
  data: &AppState<UR>,
  dto: CreateUserDto,
) -> Result<User, AppError> {
  let password_hash = data.hasher.hash_password(&dto.password).await?;
  Ok(User::new(dto.email, password_hash, dto.role_id, dto.active))
}

pub async fn replace_user<UR: UserRepository>(
  data: web::Data<AppState<UR>>,
  path: web::Path<String>,
  dto: web::Json<ReplaceUserDto>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  dto.validate()?;
  let (changes, password) = dto.into_inner().split();
  apply_changes(&data, &path, changes, password).await
}

pub async fn update_user<UR: UserRepository>(
  data: web::Data<AppState<UR>>,
  path: web::Path<String>,
  dto: web::Json<UpdateUserDto>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  dto.validate()?;
  let (changes, password) = dto.into_inner().split();
  apply_changes(&data, &path, changes, password).await
}

async fn apply_changes<UR: UserRepository>(
  data: &AppState<UR>,
  id: &str,
  changes: UserChanges,
  password: Option<String>,
) -> Result<HttpResponse, AppError> {
  let mut user = find_user(data, id, Visibility::ExcludeDeleted).await?;
  let read_at = user.updated_at;

  let invalidated = user.apply_changes(changes, Utc::now()).map_err(|error| {
    debug!(user_id = %id, %error, "user change rejected");
    AppError::from(error)
  })?;
  if let Some(password) = password {
    user.password_hash = data.hasher.hash_password(&password).await?;
  }

  // Deleted, activated or otherwise changed since it was read.
  if !data.user_repository.update(&user, read_at).await? {
    debug!(user_id = %id, "user changed while being updated");
    return Err(AppError::Conflict(String::from(CONCURRENT_CHANGE)));
  }

  if invalidated {
    info!(
      user_id = %id,
      role = user.role.name(),
      "role changed, tokens invalidated"
    );
  }
  Ok(status_ok())
}

pub async fn delete_user<UR: UserRepository>(
  data: web::Data<AppState<UR>>,
  path: web::Path<String>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  if !data.user_repository.soft_delete(&path, Utc::now()).await? {
    return Err(user_not_found());
  }
  info!(user_id = %path.as_str(), "user soft-deleted");
  Ok(status_ok())
}

pub async fn restore_user<UR: UserRepository>(
  data: web::Data<AppState<UR>>,
  path: web::Path<String>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let user = find_user(&data, &path, Visibility::OnlyDeleted).await?;
  if !data.user_repository.restore(&user.id, Utc::now()).await? {
    return Err(user_not_found());
  }
  info!(user_id = %user.id, "user restored");
  Ok(status_ok())
}

/// Every soft-deleted user.
pub async fn list_inactive<UR: UserRepository>(
  data: web::Data<AppState<UR>>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let filter = UserFilter {
    visibility: Visibility::OnlyDeleted,
    ..UserFilter::default()
  };
  let (users, _) = data.user_repository.find_many(&filter, None).await?;
  let users: Vec<FindUserRto> =
    users.into_iter().map(FindUserRto::from).collect();
  Ok(HttpResponse::Ok().json(users))
}

/// Users still waiting for authorization, with sensitive fields removed.
pub async fn list_unauthorized<UR: UserRepository>(
  data: web::Data<AppState<UR>>,
  query: web::Query<PageQuery>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  query.validate()?;
  let query = query.into_inner();
  let filter = UserFilter {
    active: Some(false),
    ..UserFilter::default()
  };
  let (users, total) =
    data.user_repository.find_many(&filter, Some(&query)).await?;
  Ok(
    HttpResponse::Ok()
      .json(Page::new(users, total, &query).map(UnauthorizedUserRto::from)),
  )
}

/// Activates an employee and mails a freshly issued password.
pub async fn authorize_user<UR: UserRepository>(
  data: web::Data<AppState<UR>>,
  path: web::Path<String>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let user = find_user(&data, &path, Visibility::ExcludeDeleted).await?;
  user.ensure_authorizable().map_err(|error| {
    debug!(
      user_id = %user.id,
      state = ?user.state(),
      %error,
      "user is not authorizable"
    );
    AppError::from(error)
  })?;

  let password = data.password_generator.generate()?;
  let password_hash = data.hasher.hash_password(&password).await?;

  // Another request may have activated the user in the meantime.
  if !data
    .user_repository
    .activate(&user.id, &password_hash, Utc::now())
    .await?
  {
    return Err(user_not_found());
  }

  info!(user_id = %user.id, "user authorized");
  dispatch_credentials(data.notifier.clone(), user.email, password);
  Ok(status_ok())
}
