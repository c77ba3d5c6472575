//! Temporary password issuance for newly authorized users.

use rand::{distr::Alphanumeric, Rng};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
  #[error("No password satisfied the policy after {0} attempts")]
  Exhausted(usize),
}

/// Minimum character class counts an issued password must reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
  pub min_length: usize,
  pub max_length: usize,
  pub min_uppercase: usize,
  pub min_lowercase: usize,
  pub min_digits: usize,
}

impl Default for PasswordPolicy {
  fn default() -> Self {
    Self {
      min_length: 8,
      max_length: 12,
      min_uppercase: 3,
      min_lowercase: 3,
      min_digits: 2,
    }
  }
}

impl PasswordPolicy {
  pub fn is_strong_enough(&self, password: &str) -> bool {
    let length = password.chars().count();
    let count = |predicate: fn(&char) -> bool| {
      password.chars().filter(|c| predicate(c)).count()
    };

    (self.min_length..=self.max_length).contains(&length)
      && count(char::is_ascii_uppercase) >= self.min_uppercase
      && count(char::is_ascii_lowercase) >= self.min_lowercase
      && count(char::is_ascii_digit) >= self.min_digits
  }
}

#[derive(Debug, Clone)]
pub struct PasswordGenerator {
  policy: PasswordPolicy,
  max_attempts: usize,
}

impl PasswordGenerator {
  pub fn new(policy: PasswordPolicy, max_attempts: usize) -> Self {
    Self {
      policy,
      max_attempts,
    }
  }

  #[cfg(test)]
  pub fn policy(&self) -> &PasswordPolicy {
    &self.policy
  }

  pub fn generate(&self) -> Result<String, CredentialError> {
    self.generate_with(&mut rand::rng())
  }

  pub fn generate_with<R: Rng>(
    &self,
    rng: &mut R,
  ) -> Result<String, CredentialError> {
    let lengths = self.policy.min_length..=self.policy.max_length;
    self.generate_from(|| {
      let length = rng.random_range(lengths.clone());
      (0..length)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
    })
  }

  fn generate_from<F>(&self, mut candidate: F) -> Result<String, CredentialError>
  where
    F: FnMut() -> String,
  {
    (0..self.max_attempts)
      .map(|_| candidate())
      .find(|password| self.policy.is_strong_enough(password))
      .ok_or(CredentialError::Exhausted(self.max_attempts))
  }
}

impl Default for PasswordGenerator {
  fn default() -> Self {
    Self::new(PasswordPolicy::default(), 1000)
  }
}
