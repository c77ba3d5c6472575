use actix_web::{HttpResponse, Responder};
use serde_json::json;

pub mod config;
pub mod hash_worker;
pub mod http_error;
pub mod middleware;
pub mod notifier;
pub mod pagination;
pub mod role;
pub mod rto;
pub mod telemetry;

pub async fn check_health() -> impl Responder {
  HttpResponse::Ok().json(json!({ "status": "ok" }))
}
