use actix_web::{web, HttpResponse};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use chrono::Utc;
use dto::login_dto::LoginDto;
use dto::register_dto::RegisterDto;
use jsonwebtoken::{
  decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use rto::login_rto::LoginRto;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

use crate::shared::http_error::{AppError, CONCURRENT_CHANGE};
use crate::shared::role::Role;
use crate::shared::rto::created_rto::CreatedRto;
use crate::users::lifecycle::AUTHORIZABLE_ROLE;
use crate::users::model::user::User;
use crate::users::repository::user_repository::{
  FindOneProperty, UserRepository, Visibility,
};
use crate::AppState;

pub mod dto;
pub mod identity;
pub mod rto;

const ACCESS_TOKEN_EXPIRY: u64 = 15 * 60; // 15 minutes in seconds
const REFRESH_TOKEN_EXPIRY: u64 = 7 * 24 * 60 * 60; // 7 days in seconds

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
  Access,
  Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
  pub sub: String,
  pub role: Role,
  pub kind: TokenKind,
  /// `User::token_version` at issuance.
  pub ver: u32,
  pub iat: u64,
  pub exp: u64,
}

impl TokenClaims {
  /// Whether the token was issued after the user's last invalidation.
  pub fn accepted_for(&self, user: &User) -> bool {
    !user.expired_token && self.ver == user.token_version
  }
}

pub async fn auth_login<UR: UserRepository>(
  data: web::Data<AppState<UR>>,
  dto: web::Json<LoginDto>,
) -> Result<HttpResponse, AppError> {
  dto.validate()?;

  let Some(mut user) = data
    .user_repository
    .find_one(FindOneProperty::Email(&dto.email), Visibility::ExcludeDeleted)
    .await?
  else {
    return Err(AppError::Unauthorized);
  };

  if !user.active {
    debug!(user_id = %user.id, "login refused for inactive user");
    return Err(AppError::Unauthorized);
  }

  // An empty or malformed hash fails verification like a wrong password.
  let verified = data
    .hasher
    .verify_password(&dto.password, &user.password_hash)
    .await
    .unwrap_or(false);
  if !verified {
    return Err(AppError::Unauthorized);
  }

  if user.expired_token {
    let read_at = user.updated_at;
    user.expired_token = false;
    user.updated_at = Utc::now();
    if !data.user_repository.update(&user, read_at).await? {
      return Err(AppError::Conflict(String::from(CONCURRENT_CHANGE)));
    }
  }

  info!(user_id = %user.id, "user logged in");
  generate_token_response(&data.config.jwt_secret, &user)
}

pub async fn auth_refresh<UR: UserRepository>(
  data: web::Data<AppState<UR>>,
  credentials: BearerAuth,
) -> Result<HttpResponse, AppError> {
  let claims = decode_token(
    &data.config.jwt_secret,
    credentials.token(),
    TokenKind::Refresh,
  )
  .ok_or(AppError::Unauthorized)?;

  let user = data
    .user_repository
    .find_one(FindOneProperty::Id(&claims.sub), Visibility::ExcludeDeleted)
    .await?
    .filter(|user| user.active && claims.accepted_for(user))
    .ok_or(AppError::Unauthorized)?;

  generate_token_response(&data.config.jwt_secret, &user)
}

pub async fn auth_register<UR: UserRepository>(
  data: web::Data<AppState<UR>>,
  dto: web::Json<RegisterDto>,
) -> Result<HttpResponse, AppError> {
  dto.validate()?;

  let user = User::new(
    dto.into_inner().email,
    String::new(),
    AUTHORIZABLE_ROLE,
    false,
  );
  let id = user.id.clone();
  data.user_repository.create(user).await?;

  info!(user_id = %id, "employee registered, awaiting authorization");
  Ok(CreatedRto::response(&id))
}

pub fn decode_token(
  secret: &str,
  token: &str,
  kind: TokenKind,
) -> Option<TokenClaims> {
  decode::<TokenClaims>(
    token,
    &DecodingKey::from_secret(secret.as_bytes()),
    &Validation::new(Algorithm::HS256),
  )
  .ok()
  .map(|data| data.claims)
  .filter(|claims| claims.kind == kind)
}

fn generate_jwt(
  secret: &str,
  claims: &TokenClaims,
) -> Result<String, AppError> {
  encode(
    &Header::new(Algorithm::HS256),
    claims,
    &EncodingKey::from_secret(secret.as_bytes()),
  )
  .map_err(|error| AppError::Internal(format!("token encoding: {error}")))
}

fn generate_token_response(
  secret: &str,
  user: &User,
) -> Result<HttpResponse, AppError> {
  let now = Utc::now().timestamp() as u64;
  let claims = |kind, expiry| TokenClaims {
    sub: user.id.clone(),
    role: user.role,
    kind,
    ver: user.token_version,
    iat: now,
    exp: now + expiry,
  };

  let tokens = LoginRto {
    access_token: generate_jwt(
      secret,
      &claims(TokenKind::Access, ACCESS_TOKEN_EXPIRY),
    )?,
    refresh_token: generate_jwt(
      secret,
      &claims(TokenKind::Refresh, REFRESH_TOKEN_EXPIRY),
    )?,
  };

  Ok(
    HttpResponse::Ok()
      .content_type("application/json")
      .json(tokens),
  )
}
