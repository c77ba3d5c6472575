mod auth;
mod credentials;
mod helpers;
mod seed;
mod shared;
mod users;

use std::sync::Arc;

use actix_governor::{Governor, GovernorConfig};
use actix_web::{error, middleware::Logger, web, App, HttpServer};
use actix_web_httpauth::middleware::HttpAuthentication;
use auth::{auth_login, auth_refresh, auth_register};
use credentials::{PasswordGenerator, PasswordPolicy};
use shared::{
  check_health,
  config::Config,
  hash_worker::{HashWorker, Hasher},
  http_error::AppError,
  middleware::bearer_middleware::bearer_validator,
  notifier::{LogNotifier, Notifier, SmtpNotifier},
  telemetry,
};
use tracing::{info, warn};
use users::repository::user_repository::UserRepository;
use users::{
  authorize_user, create_user, create_users, delete_user, get_user, get_users,
  list_inactive, list_unauthorized, replace_user, restore_user, update_user,
};

#[cfg(not(feature = "mongodb"))]
type Repository = users::repository::user_repository::InMemoryUserRepository;
#[cfg(feature = "mongodb")]
type Repository = users::repository::mongo_user_repository::MongoUserRepository;

// This struct represents state
pub struct AppState<UR: UserRepository> {
  pub user_repository: UR,
  pub config: Config,
  pub hasher: Arc<dyn Hasher + Send + Sync>,
  pub notifier: Arc<dyn Notifier + Send + Sync>,
  pub password_generator: PasswordGenerator,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  let config = Config::from_env().map_err(std::io::Error::other)?;
  telemetry::init(&config.log_level).map_err(std::io::Error::other)?;

  let hasher: Arc<dyn Hasher + Send + Sync> = Arc::new(
    HashWorker::with_threads(config.hash_threads, config.bcrypt_cost)
      .map_err(std::io::Error::other)?,
  );
  let user_repository = build_repository(&config).await?;
  seed::run(&user_repository, hasher.as_ref(), &config)
    .await
    .map_err(std::io::Error::other)?;

  let notifier: Arc<dyn Notifier + Send + Sync> = match &config.mail {
    Some(mail) => {
      Arc::new(SmtpNotifier::new(mail).map_err(std::io::Error::other)?)
    }
    None => {
      warn!("SMTP is not configured, issued credentials will not be mailed");
      Arc::new(LogNotifier)
    }
  };

  let server_address = config.host.clone();
  let state = web::Data::new(AppState {
    user_repository,
    password_generator: PasswordGenerator::new(
      PasswordPolicy::default(),
      config.password_max_attempts,
    ),
    config,
    hasher,
    notifier,
  });

  info!(address = %server_address, "listening");
  HttpServer::new(move || {
    App::new()
      .wrap(Logger::default())
      .configure(configure::<Repository>(state.clone()))
  })
  .bind(server_address)?
  .run()
  .await
}

#[cfg(not(feature = "mongodb"))]
async fn build_repository(_config: &Config) -> std::io::Result<Repository> {
  Ok(Repository::new())
}

#[cfg(feature = "mongodb")]
async fn build_repository(config: &Config) -> std::io::Result<Repository> {
  let uri = config.database_uri.as_deref().ok_or_else(|| {
    std::io::Error::other("MONGODB_URI is required with the mongodb feature")
  })?;
  Repository::connect(uri, &config.database_name)
    .await
    .map_err(std::io::Error::other)
}

// Function to initialize the App
fn configure<UR: UserRepository + 'static>(
  state: web::Data<AppState<UR>>,
) -> impl FnOnce(&mut web::ServiceConfig) {
  move |config: &mut web::ServiceConfig| {
    // Rate limit: bursts of up to eight requests per IP address, one
    // replenished every 500ms.
    let governor_config = GovernorConfig::default();

    config
      .app_data(state)
      .app_data(web::JsonConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::Validation(err.to_string()))
      }))
      .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::Validation(err.to_string()))
      }))
      .route("/health", web::get().to(check_health))
      .service(
        web::scope("/v1")
          .service(
            web::scope("/auth")
              .wrap(Governor::new(&governor_config))
              .route("login", web::post().to(auth_login::<UR>))
              .route("register", web::post().to(auth_register::<UR>))
              .route("refresh", web::post().to(auth_refresh::<UR>)),
          )
          .service(
            web::scope("/users")
              .wrap(HttpAuthentication::with_fn(bearer_validator::<UR>))
              .route("", web::get().to(get_users::<UR>))
              .route("", web::post().to(create_user::<UR>))
              .route("bulk", web::post().to(create_users::<UR>))
              .route("inactive", web::get().to(list_inactive::<UR>))
              .route("unauthorized", web::get().to(list_unauthorized::<UR>))
              .route("restore/{id}", web::put().to(restore_user::<UR>))
              .route("identify/{id}", web::put().to(authorize_user::<UR>))
              .route("{id}", web::get().to(get_user::<UR>))
              .route("{id}", web::put().to(replace_user::<UR>))
              .route("{id}", web::patch().to(update_user::<UR>))
              .route("{id}", web::delete().to(delete_user::<UR>)),
          ),
      );
  }
}
