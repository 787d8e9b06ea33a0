//! # Extractors
//!
//! Logic for generating Rust type strings that Actix uses to extract the
//! request value (query string or JSON body).

/// Generates the type string for query extraction.
pub fn query_extractor(inner_type: &str) -> String {
    format!("web::Query<{}>", inner_type)
}

/// Generates the type string for JSON body extraction.
pub fn body_extractor(body_type: &str) -> String {
    format!("web::Json<{}>", body_type)
}

/// Picks the extractor for `method`: GET reads the query string, everything
/// else the JSON body.
pub fn request_extractor(method: &str, request_type: &str) -> String {
    if method.eq_ignore_ascii_case("GET") {
        query_extractor(request_type)
    } else {
        body_extractor(request_type)
    }
}
