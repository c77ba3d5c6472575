use std::{env, fmt, str::FromStr};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("{name} must be a valid number, got '{value}'")]
  InvalidNumber { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
  pub host: String,
  pub jwt_secret: String,
  pub log_level: String,
  pub bcrypt_cost: u32,
  pub hash_threads: u32,
  pub password_max_attempts: usize,
  pub admin: Option<AdminSeed>,
  pub fake_members: usize,
  pub mail: Option<MailConfig>,
  pub database_uri: Option<String>,
  pub database_name: String,
}

/// Credentials of the administrator created at startup.
#[derive(Clone)]
pub struct AdminSeed {
  pub email: String,
  pub password: String,
}

/// SMTP account used to deliver issued credentials.
#[derive(Clone)]
pub struct MailConfig {
  pub host: String,
  pub port: u16,
  pub username: String,
  pub password: String,
  pub from: String,
}

impl fmt::Debug for AdminSeed {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AdminSeed")
      .field("email", &self.email)
      .field("password", &"***")
      .finish()
  }
}

impl fmt::Debug for MailConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MailConfig")
      .field("host", &self.host)
      .field("port", &self.port)
      .field("username", &self.username)
      .field("password", &"***")
      .field("from", &self.from)
      .finish()
  }
}

impl Config {
  pub fn from_env() -> Result<Self, ConfigError> {
    dotenvy::dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok())
  }

  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let var = |name: &str, default: &str| {
      lookup(name).unwrap_or_else(|| default.to_string())
    };

    let admin = match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
      (Some(email), Some(password)) => Some(AdminSeed { email, password }),
      _ => None,
    };

    let mail = match (
      lookup("SMTP_HOST"),
      lookup("SMTP_USERNAME"),
      lookup("SMTP_PASSWORD"),
    ) {
      (Some(host), Some(username), Some(password)) => Some(MailConfig {
        port: parse(&lookup, "SMTP_PORT", 587)?,
        from: lookup("SMTP_FROM").unwrap_or_else(|| username.clone()),
        host,
        username,
        password,
      }),
      _ => None,
    };

    Ok(Self {
      host: var("HOST", "0.0.0.0:3000"),
      jwt_secret: var("JWT_SECRET", "DEV_JWT_SECRET"),
      log_level: var("LOG_LEVEL", "info"),
      bcrypt_cost: parse(&lookup, "BCRYPT_COST", 12)?,
      hash_threads: parse(&lookup, "HASH_THREADS", 4)?,
      password_max_attempts: parse(&lookup, "PASSWORD_MAX_ATTEMPTS", 1000)?,
      admin,
      fake_members: parse(&lookup, "SEED_FAKE_MEMBERS", 0)?,
      mail,
      database_uri: lookup("MONGODB_URI"),
      database_name: var("MONGODB_DATABASE", "career"),
    })
  }
}

fn parse<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
  F: Fn(&str) -> Option<String>,
  T: FromStr,
{
  match lookup(name) {
    None => Ok(default),
    Some(value) => value
      .trim()
      .parse()
      .map_err(|_| ConfigError::InvalidNumber { name, value }),
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
    let vars: HashMap<String, String> = vars
      .iter()
      .map(|(key, value)| (key.to_string(), value.to_string()))
      .collect();
    Config::from_lookup(|name| vars.get(name).cloned())
  }

  #[test]
  fn test_defaults() {
    let config = config_from(&[]).unwrap();
    assert_eq!(config.host, "0.0.0.0:3000");
    assert_eq!(config.bcrypt_cost, 12);
    assert_eq!(config.password_max_attempts, 1000);
    assert!(config.admin.is_none());
    assert!(config.mail.is_none());
  }

  #[test]
  fn test_mail_requires_host_and_credentials() {
    let config = config_from(&[("SMTP_HOST", "smtp.example.com")]).unwrap();
    assert!(config.mail.is_none());

    let config = config_from(&[
      ("SMTP_HOST", "smtp.example.com"),
      ("SMTP_USERNAME", "jobs@example.com"),
      ("SMTP_PASSWORD", "secret"),
      ("SMTP_PORT", "2525"),
    ])
    .unwrap();
    let mail = config.mail.unwrap();
    assert_eq!(mail.port, 2525);
    assert_eq!(mail.from, "jobs@example.com");
    assert!(!format!("{:?}", mail).contains("secret"));
  }

  #[test]
  fn test_invalid_number_is_reported() {
    let error = config_from(&[("BCRYPT_COST", "twelve")]).unwrap_err();
    assert_eq!(
      error.to_string(),
      "BCRYPT_COST must be a valid number, got 'twelve'"
    );
  }
}
