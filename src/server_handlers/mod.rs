pub mod catalogue;
pub mod sessions;
pub mod docs;

pub use catalogue::*;
pub use sessions::*;
pub use docs::*;

use actix_web::HttpResponse;
use serde_json::json;

use crate::error::AdvisorError;

/// Traduce un `AdvisorError` a la respuesta JSON `{"error": ...}` correspondiente.
pub fn error_response(err: &AdvisorError) -> HttpResponse {
    match err {
        AdvisorError::UnknownSession(_) => HttpResponse::NotFound().json(json!({"error": err.to_string()})),
        AdvisorError::UnknownMajor(_) | AdvisorError::UnknownSubject(_) => {
            HttpResponse::BadRequest().json(json!({"error": err.to_string()}))
        }
        _ => HttpResponse::InternalServerError().json(json!({"error": err.to_string()})),
    }
}
