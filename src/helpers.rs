#[cfg(test)]
pub mod tests {
  use std::sync::Arc;

  use actix_web::{
    body::to_bytes, http::StatusCode, test::TestRequest, web, HttpRequest,
    Responder,
  };
  use serde::de::DeserializeOwned;

  use crate::auth::identity::{AdminUser, CurrentUser};
  use crate::credentials::{PasswordGenerator, PasswordPolicy};
  use crate::shared::config::Config;
  use crate::shared::hash_worker::{HashWorker, Hasher};
  use crate::shared::notifier::tests::{RecordingNotifier, SentCredentials};
  use crate::shared::role::Role;
  use crate::users::model::user::User;
  use crate::users::repository::user_repository::InMemoryUserRepository;
  use crate::AppState;

  pub const TEST_JWT_SECRET: &str = "TEST_JWT_SECRET";
  /// Lowest bcrypt cost, keeps hashing fast in tests.
  pub const TEST_BCRYPT_COST: u32 = 4;

  pub struct TestApp {
    pub state: web::Data<AppState<InMemoryUserRepository>>,
    pub repository: InMemoryUserRepository,
    pub sent: flume::Receiver<SentCredentials>,
  }

  impl TestApp {
    /// The stored record, deleted or not.
    pub fn stored(&self, id: &str) -> User {
      self
        .repository
        .users
        .read()
        .unwrap()
        .iter()
        .find(|user| user.id == id)
        .cloned()
        .expect("user should be stored")
    }
  }

  pub fn test_config() -> Config {
    Config::from_lookup(|name| match name {
      "JWT_SECRET" => Some(TEST_JWT_SECRET.to_string()),
      "BCRYPT_COST" => Some(TEST_BCRYPT_COST.to_string()),
      _ => None,
    })
    .unwrap()
  }

  pub fn test_app(users: Vec<User>) -> TestApp {
    let hasher = HashWorker::with_threads(2, TEST_BCRYPT_COST).unwrap();
    test_app_with_hasher(users, Arc::new(hasher))
  }

  pub fn test_app_with_hasher(
    users: Vec<User>,
    hasher: Arc<dyn Hasher + Send + Sync>,
  ) -> TestApp {
    let repository = InMemoryUserRepository::with_users(users);
    let (notifier, sent) = RecordingNotifier::new();
    let state = web::Data::new(AppState {
      user_repository: repository.clone(),
      config: test_config(),
      hasher,
      notifier: Arc::new(notifier),
      password_generator: PasswordGenerator::new(PasswordPolicy::default(), 1000),
    });
    TestApp {
      state,
      repository,
      sent,
    }
  }

  pub fn hashed(password: &str) -> String {
    bcrypt::hash(password, TEST_BCRYPT_COST).unwrap()
  }

  pub fn admin() -> AdminUser {
    AdminUser(CurrentUser {
      id: String::from("admin"),
      role: Role::Admin,
    })
  }

  pub fn member() -> CurrentUser {
    CurrentUser {
      id: String::from("member"),
      role: Role::Member,
    }
  }

  pub fn http_request() -> HttpRequest {
    TestRequest::default().to_http_request()
  }

  pub async fn parse_http_response<T: DeserializeOwned>(
    responder: impl Responder,
    request: &HttpRequest,
    expected_status: StatusCode,
  ) -> T {
    let response = responder.respond_to(request).map_into_boxed_body();
    assert_eq!(response.status(), expected_status);
    let body = to_bytes(response.into_body()).await.unwrap();
    serde_json::from_slice(&body).unwrap()
  }
}
