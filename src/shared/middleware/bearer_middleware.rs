use actix_web::{dev::ServiceRequest, web, HttpMessage};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use tracing::debug;

use crate::auth::{decode_token, identity::CurrentUser, TokenKind};
use crate::shared::http_error::AppError;
use crate::users::repository::user_repository::{
  FindOneProperty, UserRepository, Visibility,
};
use crate::AppState;

/// Accepts access tokens of existing, active users whose tokens have not
/// been invalidated, and attaches a `CurrentUser` to the request.
pub async fn bearer_validator<UR: UserRepository + 'static>(
  req: ServiceRequest,
  credentials: BearerAuth,
) -> Result<ServiceRequest, (actix_web::Error, ServiceRequest)> {
  let Some(data) = req.app_data::<web::Data<AppState<UR>>>().cloned() else {
    let error = AppError::Internal(String::from("application state missing"));
    return Err((error.into(), req));
  };

  let Some(claims) = decode_token(
    &data.config.jwt_secret,
    credentials.token(),
    TokenKind::Access,
  ) else {
    return Err((AppError::Unauthorized.into(), req));
  };

  let user = match data
    .user_repository
    .find_one(FindOneProperty::Id(&claims.sub), Visibility::ExcludeDeleted)
    .await
  {
    Ok(Some(user)) => user,
    Ok(None) => return Err((AppError::Unauthorized.into(), req)),
    Err(error) => return Err((AppError::from(error).into(), req)),
  };

  if !user.active || !claims.accepted_for(&user) {
    debug!(user_id = %user.id, "rejected token of inactive or invalidated user");
    return Err((AppError::Unauthorized.into(), req));
  }

  req.extensions_mut().insert(CurrentUser {
    id: user.id,
    role: user.role,
  });
  Ok(req)
}
