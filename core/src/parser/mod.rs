//! # Parser Module
//!
//! Handles parsing of Rust source code using the rust-analyzer syntax library.
//! Extracts route annotations from doc comments, binds annotated request and
//! response types, and reads function signatures back into descriptors.

pub mod annotations;
pub mod functions;
pub mod types;

pub use annotations::{extract_doc_comment, parse_annotations, RouteSpec};
pub use functions::GeneratedFunction;
pub use types::{annotated_types, bind_route, classify_types, route_paths, AnnotatedType, TypeBinding};
