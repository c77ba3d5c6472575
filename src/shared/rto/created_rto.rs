use actix_web::{http::header, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedRto {
  pub id: String,
}

impl CreatedRto {
  /// `201 Created` pointing at the new user.
  pub fn response(id: &str) -> HttpResponse {
    HttpResponse::Created()
      .content_type("application/json")
      .append_header((header::LOCATION, format!("/v1/users/{id}")))
      .json(CreatedRto { id: id.to_string() })
  }
}
