//! # Route Annotations
//!
//! Extraction of the route tag micro-language from doc comments:
//!
//! ```text
//! /// @handler login
//! /// @router /login [post]
//! /// @group user
//! /// @auth false
//! /// @summary Login
//! ```

use heck::ToUpperCamelCase;
use ra_ap_syntax::{SyntaxKind, SyntaxNode};

/// Route metadata extracted from one doc comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    /// Handler base name in UpperCamelCase (e.g. `Login`).
    pub handler_name: String,
    /// Route path (e.g. `/login`). Empty when the comment is not an API annotation.
    pub path: String,
    /// Upper-cased HTTP method (e.g. `POST`).
    pub method: String,
    /// Whether the route requires authentication.
    pub auth: bool,
    /// Logical routing group the registration belongs to.
    pub group: String,
    /// One-word summary for the generated docs.
    pub summary: String,
}

impl Default for RouteSpec {
    fn default() -> Self {
        Self {
            handler_name: String::new(),
            path: String::new(),
            method: String::new(),
            auth: true,
            group: String::new(),
            summary: String::new(),
        }
    }
}

impl RouteSpec {
    /// Whether the comment this spec came from declares an API route.
    pub fn is_api(&self) -> bool {
        !self.path.is_empty()
    }
}

/// Parses the annotation markers out of doc-comment text.
///
/// Never fails: unknown tokens are ignored and missing markers leave their
/// fields at the default.
///
/// # Examples
/// ```
/// use apigen_core::parser::parse_annotations;
///
/// let spec = parse_annotations("@handler login\n@router /login [post]\n@group user");
/// assert_eq!(spec.handler_name, "Login");
/// assert_eq!(spec.method, "POST");
/// assert!(spec.auth);
/// ```
pub fn parse_annotations(comment: &str) -> RouteSpec {
    let tokens: Vec<&str> = comment.split_whitespace().collect();
    let value = |i: usize| tokens.get(i).filter(|t| !t.starts_with('@')).copied();

    let mut spec = RouteSpec::default();
    for (i, token) in tokens.iter().enumerate() {
        match token.to_lowercase().as_str() {
            "@handler" => {
                if let Some(name) = value(i + 1) {
                    spec.handler_name = name.to_upper_camel_case();
                }
            }
            "@router" => {
                if let Some(path) = value(i + 1) {
                    spec.path = path.to_string();
                    if let Some(method) = value(i + 2) {
                        spec.method = method
                            .trim_matches(|c: char| c == '[' || c == ']')
                            .to_uppercase();
                    }
                }
            }
            "@auth" => {
                if value(i + 1) == Some("false") {
                    spec.auth = false;
                }
            }
            "@group" => {
                if let Some(group) = value(i + 1) {
                    spec.group = group.to_string();
                }
            }
            "@summary" => {
                if let Some(summary) = value(i + 1) {
                    spec.summary = summary.to_string();
                }
            }
            _ => {}
        }
    }

    spec
}

/// Helper to extract `///` comments from a syntax node's trivia children.
pub fn extract_doc_comment(node: &SyntaxNode) -> Option<String> {
    let mut lines = Vec::new();

    for child in node.children_with_tokens() {
        if child.kind() == SyntaxKind::COMMENT {
            let text = child.to_string();
            if let Some(content) = text.strip_prefix("///") {
                lines.push(content.strip_prefix(' ').unwrap_or(content).to_string());
            }
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n").trim().to_string())
    }
}
