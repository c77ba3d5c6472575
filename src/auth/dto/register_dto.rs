use serde::Deserialize;
use validator_derive::Validate;

/// Self-registration of an employee. The password is issued on
/// authorization.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterDto {
  #[validate(email(message = "Email must be a valid address"))]
  pub email: String,
}
