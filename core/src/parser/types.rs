//! # Type Binding
//!
//! Locates the request/response types annotated with a route path in a
//! type-declaration file.

use crate::error::{AppError, AppResult};
use crate::parser::annotations::{extract_doc_comment, parse_annotations, RouteSpec};
use crate::syntax::parse_source;
use ra_ap_syntax::ast::{self, HasModuleItem, HasName};
use ra_ap_syntax::AstNode;

/// Request/response types resolved for one route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeBinding {
    /// Qualified request type (e.g. `types::LoginReq`).
    pub request_type: String,
    /// Qualified response type (e.g. `types::LoginResp`).
    pub response_type: String,
    /// Module the types live in (e.g. `types`).
    pub module: String,
}

/// A type declaration carrying a route annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedType {
    /// Type name, prefixed with its inline module path (`inner::PingResp`).
    pub name: String,
    /// The route metadata of its doc comment.
    pub spec: RouteSpec,
}

/// Lists every struct/enum whose doc comment declares a route, in source
/// order. Types in inline modules are included under their module path;
/// types local to function bodies are not nameable and are ignored.
pub fn annotated_types(source: &str) -> AppResult<Vec<AnnotatedType>> {
    let file = parse_source(source, "type declarations")?;
    let mut found = Vec::new();
    collect_types(file.items(), "", &mut found);
    Ok(found)
}

fn collect_types(items: impl Iterator<Item = ast::Item>, prefix: &str, out: &mut Vec<AnnotatedType>) {
    for item in items {
        if let ast::Item::Module(m) = &item {
            if let (Some(name), Some(list)) = (m.name(), m.item_list()) {
                let nested = format!("{}{}::", prefix, name.text());
                collect_types(list.items(), &nested, out);
            }
            continue;
        }

        let Some(name) = type_name(&item) else {
            continue;
        };
        let Some(doc) = extract_doc_comment(item.syntax()) else {
            continue;
        };
        let spec = parse_annotations(&doc);
        if spec.is_api() {
            out.push(AnnotatedType {
                name: format!("{}{}", prefix, name),
                spec,
            });
        }
    }
}

fn type_name(item: &ast::Item) -> Option<String> {
    let name = match item {
        ast::Item::Struct(s) => s.name(),
        ast::Item::Enum(e) => e.name(),
        _ => None,
    };
    name.map(|n| n.text().to_string())
}

/// Distinct annotated route paths, in declaration order.
pub fn route_paths(source: &str) -> AppResult<Vec<String>> {
    let mut paths: Vec<String> = Vec::new();
    for ty in annotated_types(source)? {
        if !paths.contains(&ty.spec.path) {
            paths.push(ty.spec.path);
        }
    }
    Ok(paths)
}

/// Classifies candidate names by suffix: `...Req` is the request,
/// `...Resp` the response. The first match of each category wins.
///
/// # Examples
/// ```
/// use apigen_core::parser::classify_types;
///
/// let names = vec!["LoginReq".to_string(), "LoginResp".to_string()];
/// let binding = classify_types("types", &names);
/// assert_eq!(binding.request_type, "types::LoginReq");
/// assert_eq!(binding.response_type, "types::LoginResp");
/// ```
pub fn classify_types(module: &str, names: &[String]) -> TypeBinding {
    let mut binding = TypeBinding {
        module: module.to_string(),
        ..TypeBinding::default()
    };

    for name in names {
        if name.ends_with("Req") {
            if binding.request_type.is_empty() {
                binding.request_type = format!("{}::{}", module, name);
            }
        } else if name.ends_with("Resp") && binding.response_type.is_empty() {
            binding.response_type = format!("{}::{}", module, name);
        }
    }

    binding
}

/// Binds `path` to its annotated types.
///
/// Returns the binding together with the route metadata: the first matching
/// declaration that names a handler, or the first match otherwise.
pub fn bind_route(source: &str, module: &str, path: &str) -> AppResult<(TypeBinding, RouteSpec)> {
    let matches: Vec<AnnotatedType> = annotated_types(source)?
        .into_iter()
        .filter(|t| t.spec.path == path)
        .collect();

    let spec = matches
        .iter()
        .find(|t| !t.spec.handler_name.is_empty())
        .or_else(|| matches.first())
        .map(|t| t.spec.clone())
        .ok_or_else(|| AppError::NotFound(format!("No type annotated with '@router {}'", path)))?;

    if spec.handler_name.is_empty() {
        return Err(AppError::General(format!(
            "Route '{}' has no @handler annotation",
            path
        )));
    }

    if spec.method.is_empty() {
        return Err(AppError::General(format!(
            "Route '{}' has no HTTP method in its @router annotation",
            path
        )));
    }

    let names: Vec<String> = matches.into_iter().map(|t| t.name).collect();
    let binding = classify_types(module, &names);

    if binding.request_type.is_empty() {
        return Err(AppError::General(format!(
            "Route '{}' has no '...Req' type among {:?}",
            path, names
        )));
    }
    if binding.response_type.is_empty() {
        return Err(AppError::General(format!(
            "Route '{}' has no '...Resp' type among {:?}",
            path, names
        )));
    }

    Ok((binding, spec))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPES: &str = r#"
use serde::{Deserialize, Serialize};

/// @group user
/// @handler login
/// @router /login [post]
#[derive(Debug, Deserialize)]
pub struct LoginReq {
    pub name: String,
}

/// @router /login [post]
#[derive(Debug, Serialize)]
pub struct LoginResp {
    pub user: String,
}

/// @group user
/// @auth false
/// @handler register
/// @router /register [get]
pub struct RegisterReq {
    pub name: String,
}

/// @router /register [get]
pub enum RegisterResp {
    Created,
}

/// Not an API type.
pub struct Helper;
"#;

    #[test]
    fn test_classification() {
        let names = vec!["LoginReq".to_string(), "LoginResp".to_string()];
        let b = classify_types("types", &names);
        assert_eq!(b.request_type, "types::LoginReq");
        assert_eq!(b.response_type, "types::LoginResp");
        assert_eq!(b.module, "types");
    }

    #[test]
    fn test_classification_first_match_wins() {
        let names = vec![
            "AReq".to_string(),
            "BReq".to_string(),
            "BResp".to_string(),
            "AResp".to_string(),
        ];
        let b = classify_types("m", &names);
        assert_eq!(b.request_type, "m::AReq");
        assert_eq!(b.response_type, "m::BResp");
    }

    #[test]
    fn test_bind_route() {
        let (binding, spec) = bind_route(TYPES, "types", "/login").unwrap();
        assert_eq!(binding.request_type, "types::LoginReq");
        assert_eq!(binding.response_type, "types::LoginResp");
        assert_eq!(spec.handler_name, "Login");
        assert_eq!(spec.group, "user");
        assert!(spec.auth);
    }

    #[test]
    fn test_bind_route_with_enum_response() {
        let (binding, spec) = bind_route(TYPES, "types", "/register").unwrap();
        assert_eq!(binding.response_type, "types::RegisterResp");
        assert_eq!(spec.method, "GET");
        assert!(!spec.auth);
    }

    #[test]
    fn test_unknown_route() {
        let err = bind_route(TYPES, "types", "/missing").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_route_without_response_type() {
        let code = "/// @handler ping\n/// @router /ping [get]\npub struct PingReq;";
        let err = bind_route(code, "types", "/ping").unwrap_err();
        assert!(err.to_string().contains("'...Resp'"));
    }

    #[test]
    fn test_route_without_method() {
        let code = "/// @handler ping\n/// @router /ping\npub struct PingReq;\n/// @router /ping\npub struct PingResp;";
        let err = bind_route(code, "types", "/ping").unwrap_err();
        assert!(err.to_string().contains("no HTTP method"));
    }

    #[test]
    fn test_inline_module_types_are_qualified() {
        let code = r#"
/// @handler ping
/// @router /ping [get]
pub struct PingReq;

pub mod inner {
    /// @router /ping [get]
    pub struct PingResp;
}

fn helper() {
    /// @router /ping [get]
    struct LocalResp;
}
"#;
        let names: Vec<String> = annotated_types(code)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["PingReq", "inner::PingResp"]);

        let (binding, _) = bind_route(code, "types", "/ping").unwrap();
        assert_eq!(binding.request_type, "types::PingReq");
        assert_eq!(binding.response_type, "types::inner::PingResp");
    }

    #[test]
    fn test_route_paths_in_order() {
        assert_eq!(route_paths(TYPES).unwrap(), vec!["/login", "/register"]);
    }
}
