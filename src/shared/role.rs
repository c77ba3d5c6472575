use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role catalog. Users reference a role by its numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Role {
  Admin = 1,
  Member = 2,
  Recruiter = 3,
  Employee = 4,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown role id {0}")]
pub struct UnknownRole(pub u32);

impl Role {
  pub const fn id(self) -> u32 {
    self as u32
  }

  pub const fn name(self) -> &'static str {
    match self {
      Role::Admin => "Admin",
      Role::Member => "Member",
      Role::Recruiter => "Recruiter",
      Role::Employee => "Employee",
    }
  }
}

impl TryFrom<u32> for Role {
  type Error = UnknownRole;

  fn try_from(id: u32) -> Result<Self, Self::Error> {
    match id {
      1 => Ok(Role::Admin),
      2 => Ok(Role::Member),
      3 => Ok(Role::Recruiter),
      4 => Ok(Role::Employee),
      other => Err(UnknownRole(other)),
    }
  }
}

impl From<Role> for u32 {
  fn from(role: Role) -> Self {
    role.id()
  }
}

/// Joined role relation as rendered next to a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleRto {
  pub id: u32,
  pub role: String,
}

impl From<Role> for RoleRto {
  fn from(role: Role) -> Self {
    Self {
      id: role.id(),
      role: role.name().to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_role_ids_round_trip_through_json() {
    let role: Role = serde_json::from_str("4").unwrap();
    assert_eq!(role, Role::Employee);
    assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "1");
  }

  #[test]
  fn test_unknown_role_id_is_rejected() {
    assert_eq!(Role::try_from(9), Err(UnknownRole(9)));
    assert!(serde_json::from_str::<Role>("0").is_err());
  }
}
