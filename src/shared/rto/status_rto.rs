use serde::{Deserialize, Serialize};

/// `{ "status": true }` acknowledgement of a mutation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusRto {
  pub status: bool,
}

impl StatusRto {
  pub const OK: StatusRto = StatusRto { status: true };
}
