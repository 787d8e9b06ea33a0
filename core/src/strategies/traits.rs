//! # Backend Strategy Trait
//!
//! Defines the interface required to generate handler code for a specific web
//! framework (e.g. Actix, Axum, Poem, etc.).

/// A strategy trait for decoupling framework-specific code generation.
///
/// Implementors define the imports, extractors, response construction and
/// error type used by the generated logic and handler functions.
pub trait BackendStrategy {
    /// Returns the `use` lines a handler file needs for this framework.
    fn handler_imports(&self) -> Vec<String>;

    /// The error type returned by generated logic functions.
    fn logic_error_type(&self) -> String;

    /// Return type of a generated handler.
    fn handler_return_type(&self) -> String;

    /// Generates the extractor type binding the request.
    ///
    /// # Arguments
    ///
    /// * `method` - Upper-cased HTTP method (GET, POST).
    /// * `request_type` - The Rust type of the request (e.g. `types::LoginReq`).
    fn request_extractor(&self, method: &str, request_type: &str) -> String;

    /// Statement converting the extractor named `var` into the plain request value.
    fn unwrap_request(&self, var: &str) -> String;

    /// Response returned when request validation fails on `err`.
    fn validation_failure(&self, err: &str) -> String;

    /// Response carrying `payload` as the success body.
    fn success_response(&self, payload: &str) -> String;

    /// Response returned when the logic function fails with `err`.
    fn failure_response(&self, err: &str) -> String;

    /// Documentation kind of the request parameters.
    fn param_kind(&self, method: &str) -> &'static str {
        if method.eq_ignore_ascii_case("GET") {
            "query"
        } else {
            "body"
        }
    }
}
