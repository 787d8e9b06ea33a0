//! # Scaffolding
//!
//! Imports and response construction for generated Actix handlers.

/// Returns standard imports for Actix handlers.
pub fn handler_imports() -> Vec<String> {
    vec![
        "use actix_web::{web, HttpResponse};".to_string(),
        "use validator::Validate;".to_string(),
    ]
}

/// `200 OK` with a JSON body.
pub fn success_response(payload: &str) -> String {
    format!("HttpResponse::Ok().json({})", payload)
}

/// `400 Bad Request` carrying the error message.
pub fn bad_request(err: &str) -> String {
    format!("HttpResponse::BadRequest().body({}.to_string())", err)
}
