#![deny(missing_docs)]

//! # apigen Core
//!
//! Core library of the API scaffolding generator.
//!
//! Reads route annotations from request/response type declarations and
//! merges the matching logic function, handler function and route
//! registration into existing source files. Every merge is idempotent and
//! leaves the rest of the target file byte-for-byte intact.

/// Shared error types.
pub mod error;

/// Strict parsing and syntax tree helpers.
pub mod syntax;

/// Source file access and module naming.
pub mod source;

/// Annotation, type and signature extraction.
pub mod parser;

/// Logic and handler synthesis.
pub mod codegen;

/// Code patching utilities.
pub mod patcher;

/// Routing group resolution.
pub mod route_groups;

/// Route Registration Logic.
pub mod route_generator;

/// Run configuration.
pub mod config;

/// The per-route generation pipeline.
pub mod pipeline;

/// Strategy Pattern Interfaces.
pub mod strategies;

pub use codegen::{synthesize_handler, synthesize_logic, Fragment};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use parser::{bind_route, parse_annotations, GeneratedFunction, RouteSpec, TypeBinding};
pub use patcher::{add_import, merge_declarations, merge_into_file, MergeOutcome};
pub use pipeline::{run, RouteReport};
pub use route_generator::{register_route, RegistrationOutcome, RouterPatch};
pub use route_groups::{build_route_tree, RouteGroupTree, RouterDialect};
pub use strategies::{ActixStrategy, BackendStrategy};
