//! # Actix Strategy Module
//!
//! Implementation of `BackendStrategy` for the Actix Web framework.
//! Relies on submodules for extractor types and response scaffolding.

pub mod extractors;
pub mod scaffolding;

use crate::strategies::BackendStrategy;

/// Strategy for generating Actix Web compatible code.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActixStrategy;

impl BackendStrategy for ActixStrategy {
    fn handler_imports(&self) -> Vec<String> {
        scaffolding::handler_imports()
    }

    fn logic_error_type(&self) -> String {
        "actix_web::Error".to_string()
    }

    fn handler_return_type(&self) -> String {
        "HttpResponse".to_string()
    }

    fn request_extractor(&self, method: &str, request_type: &str) -> String {
        extractors::request_extractor(method, request_type)
    }

    fn unwrap_request(&self, var: &str) -> String {
        format!("let {var} = {var}.into_inner();")
    }

    fn validation_failure(&self, err: &str) -> String {
        scaffolding::bad_request(err)
    }

    fn success_response(&self, payload: &str) -> String {
        scaffolding::success_response(payload)
    }

    fn failure_response(&self, err: &str) -> String {
        scaffolding::bad_request(err)
    }
}
