use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};

use crate::shared::{http_error::AppError, role::Role};

/// The user behind a validated bearer token, attached by the bearer
/// middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
  pub id: String,
  pub role: Role,
}

/// A `CurrentUser` holding the Admin role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser(pub CurrentUser);

impl FromRequest for CurrentUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(request: &HttpRequest, _: &mut Payload) -> Self::Future {
    ready(
      request
        .extensions()
        .get::<CurrentUser>()
        .cloned()
        .ok_or(AppError::Unauthorized),
    )
  }
}

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(request: &HttpRequest, _: &mut Payload) -> Self::Future {
    let current = request.extensions().get::<CurrentUser>().cloned();
    ready(match current {
      Some(user) if user.role == Role::Admin => Ok(AdminUser(user)),
      Some(_) => Err(AppError::Forbidden),
      None => Err(AppError::Unauthorized),
    })
  }
}

#[cfg(test)]
mod tests {
  use actix_web::test::TestRequest;

  use super::*;

  #[actix_web::test]
  async fn test_admin_extractor_checks_role() {
    let request = TestRequest::default().to_http_request();
    let result = AdminUser::extract(&request).await;
    assert!(matches!(result, Err(AppError::Unauthorized)));

    request.extensions_mut().insert(CurrentUser {
      id: String::from("member"),
      role: Role::Member,
    });
    let result = AdminUser::extract(&request).await;
    assert!(matches!(result, Err(AppError::Forbidden)));
    assert!(CurrentUser::extract(&request).await.is_ok());

    let request = TestRequest::default().to_http_request();
    request.extensions_mut().insert(CurrentUser {
      id: String::from("admin"),
      role: Role::Admin,
    });
    assert!(AdminUser::extract(&request).await.is_ok());
  }
}
