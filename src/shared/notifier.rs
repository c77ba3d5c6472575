use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
  address::AddressError,
  message::{Mailbox, MultiPart},
  transport::smtp::authentication::Credentials,
  AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;
use tracing::{error, info, warn};

use super::config::MailConfig;

const CREDENTIALS_SUBJECT: &str = "Thank you for joining the App CareerNetwork!";

#[derive(Debug, Error)]
pub enum NotifierError {
  #[error("Invalid address: {0}")]
  Address(#[from] AddressError),
  #[error("Message build error: {0}")]
  Message(#[from] lettre::error::Error),
  #[error("SMTP error: {0}")]
  Smtp(#[from] lettre::transport::smtp::Error),
  #[error("SMTP is not configured")]
  NotConfigured,
}

/// Out-of-band delivery of freshly issued credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier {
  async fn send_credentials(
    &self,
    email: &str,
    password: &str,
  ) -> Result<(), NotifierError>;
}

pub struct SmtpNotifier {
  transport: AsyncSmtpTransport<Tokio1Executor>,
  from: Mailbox,
}

impl SmtpNotifier {
  pub fn new(config: &MailConfig) -> Result<Self, NotifierError> {
    let credentials =
      Credentials::new(config.username.clone(), config.password.clone());
    let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
      .port(config.port)
      .credentials(credentials)
      .build();
    Ok(Self {
      transport,
      from: config.from.parse()?,
    })
  }
}

#[async_trait]
impl Notifier for SmtpNotifier {
  async fn send_credentials(
    &self,
    email: &str,
    password: &str,
  ) -> Result<(), NotifierError> {
    let message = Message::builder()
      .from(self.from.clone())
      .to(email.parse()?)
      .subject(CREDENTIALS_SUBJECT)
      .multipart(MultiPart::alternative_plain_html(
        String::from("I am so glad you registered for the CareerNetwork"),
        credentials_html(password),
      ))?;

    self.transport.send(message).await?;
    Ok(())
  }
}

fn credentials_html(password: &str) -> String {
  format!(
    "<b>Here's your password for login as employee</b>\
     <p>Make sure you don't share this email public</p>\
     <b>password: {password}</b><p>Our best</p><b>Twist Team</b>"
  )
}

/// Used when no SMTP account is configured. Every delivery fails, so the
/// dispatcher reports it as an error. Never logs the password.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
  async fn send_credentials(
    &self,
    email: &str,
    _password: &str,
  ) -> Result<(), NotifierError> {
    warn!(%email, "credentials were not delivered");
    Err(NotifierError::NotConfigured)
  }
}

/// Sends the credentials in the background. Failures are logged, never
/// reported to the caller.
pub fn dispatch_credentials(
  notifier: Arc<dyn Notifier + Send + Sync>,
  email: String,
  password: String,
) {
  actix_web::rt::spawn(async move {
    match notifier.send_credentials(&email, &password).await {
      Ok(()) => info!(%email, "credentials email sent"),
      Err(error) => error!(%email, %error, "credentials email failed"),
    }
  });
}

#[cfg(test)]
pub mod tests {
  use super::*;

  #[derive(Debug, Clone, PartialEq, Eq)]
  pub struct SentCredentials {
    pub email: String,
    pub password: String,
  }

  /// Forwards every delivery to a channel the test can await.
  pub struct RecordingNotifier {
    sender: flume::Sender<SentCredentials>,
  }

  impl RecordingNotifier {
    pub fn new() -> (Self, flume::Receiver<SentCredentials>) {
      let (sender, receiver) = flume::unbounded();
      (Self { sender }, receiver)
    }
  }

  #[async_trait]
  impl Notifier for RecordingNotifier {
    async fn send_credentials(
      &self,
      email: &str,
      password: &str,
    ) -> Result<(), NotifierError> {
      let _ = self.sender.send(SentCredentials {
        email: email.to_string(),
        password: password.to_string(),
      });
      Ok(())
    }
  }

  #[actix_web::test]
  async fn test_log_notifier_reports_undelivered_credentials() {
    let result = LogNotifier
      .send_credentials("someone@example.com", "Abc12Def3gh")
      .await;
    assert!(matches!(result, Err(NotifierError::NotConfigured)));
  }

  #[test]
  fn test_credentials_html_contains_password() {
    let html = credentials_html("Abc12Def3gh");
    assert!(html.contains("password: Abc12Def3gh"));
  }

  #[actix_web::test]
  async fn test_dispatch_swallows_delivery_failure() {
    let mut notifier = MockNotifier::new();
    let (done_tx, done_rx) = flume::bounded(1);
    notifier
      .expect_send_credentials()
      .times(1)
      .returning(move |email, _| {
        let _ = done_tx.send(email.to_string());
        Err(NotifierError::Address(
          "not an address".parse::<Mailbox>().unwrap_err(),
        ))
      });

    dispatch_credentials(
      Arc::new(notifier),
      String::from("someone@example.com"),
      String::from("Abc12Def3gh"),
    );

    let email = done_rx.recv_async().await.unwrap();
    assert_eq!(email, "someone@example.com");
  }
}
