//! # Route Generator
//!
//! Wires generated handlers into a router entry function such as:
//!
//! ```text
//! pub fn user_router(rg: &mut RouterGroup) {
//!     let user = rg.group("user");
//!     {
//!         user.post("/login", handlers::login_handler);
//!     }
//! }
//! ```
//!
//! A registration is added once, on the variable of the route's group, and
//! nothing else in the file is touched.

use crate::error::{AppError, AppResult};
use crate::parser::RouteSpec;
use crate::patcher::add_import;
use crate::route_groups::{build_route_tree, GroupResolution, RouteGroupTree, RouterDialect};
use crate::source::{read_source, write_source};
use crate::syntax::{
    bare_block, find_fn, ident_expr, indent_of, parse_source, path_expr_text, statements,
    string_literal, StatementKind,
};
use ra_ap_syntax::ast::{self, HasArgList, HasName};
use ra_ap_syntax::{AstNode, SyntaxNode};
use std::path::Path;

/// One route registration call: `<variable>.<method>("<path>", <handler>);`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRegistration {
    /// Group variable the route is registered on.
    pub variable: String,
    /// Lower-case HTTP method, used as the router method name.
    pub method: String,
    /// Route path literal.
    pub path: String,
    /// Qualified handler path (`handlers::login_handler`).
    pub handler: String,
}

impl RouteRegistration {
    /// Registration of `spec` on `variable`.
    pub fn new(variable: &str, spec: &RouteSpec, handler: &str) -> Self {
        Self {
            variable: variable.to_string(),
            method: spec.method.to_lowercase(),
            path: spec.path.clone(),
            handler: handler.to_string(),
        }
    }

    /// Source text of the registration statement.
    pub fn statement(&self) -> String {
        format!(
            "{}.{}(\"{}\", {});",
            self.variable, self.method, self.path, self.handler
        )
    }

    /// Whether `call` registers exactly this route.
    fn matches(&self, call: &ast::MethodCallExpr) -> bool {
        let method_ok = call.name_ref().is_some_and(|n| n.text() == self.method.as_str());
        let receiver_ok = call
            .receiver()
            .and_then(|r| ident_expr(&r))
            .is_some_and(|r| r == self.variable);
        if !method_ok || !receiver_ok {
            return false;
        }

        let Some(args) = call.arg_list() else {
            return false;
        };
        let args: Vec<ast::Expr> = args.args().collect();
        match args.as_slice() {
            [path, handler] => {
                string_literal(path).as_deref() == Some(self.path.as_str())
                    && path_expr_text(handler).as_deref() == Some(self.handler.as_str())
            }
            _ => false,
        }
    }
}

/// What happened to a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The statement was inserted.
    Inserted {
        /// The inserted statement.
        statement: String,
    },
    /// An identical registration already exists.
    AlreadyPresent,
}

/// Result of patching a router source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterPatch {
    /// The patched source text.
    pub source: String,
    /// Whether the registration was added.
    pub outcome: RegistrationOutcome,
    /// Group the route was registered on.
    pub resolution: GroupResolution,
}

/// Registers the route described by `spec` inside the function `entry`.
///
/// The registration goes on the variable of `spec.group` (falling back to the
/// entry function's root router):
///
/// - for a group created by `let g = parent.group(..);`: inside the bare block
///   directly following that `let`, otherwise right after the `let`;
/// - for the root: at the end of the function body, before a tail expression
///   that yields a value. In `main` it goes before the final statement.
///
/// # Arguments
///
/// * `source` - Existing source code of the router file.
/// * `entry` - Name of the router entry function.
/// * `spec` - Route metadata (path, method, group).
/// * `handler` - Qualified handler path (e.g. `handlers::login_handler`).
/// * `dialect` - Router API conventions.
pub fn register_route(
    source: &str,
    entry: &str,
    spec: &RouteSpec,
    handler: &str,
    dialect: &RouterDialect,
) -> AppResult<RouterPatch> {
    patch_router(source, "router file", entry, spec, handler, dialect)
}

fn patch_router(
    source: &str,
    origin: &str,
    entry: &str,
    spec: &RouteSpec,
    handler: &str,
    dialect: &RouterDialect,
) -> AppResult<RouterPatch> {
    let file = parse_source(source, origin)?;
    let func = find_fn(&file, entry)
        .ok_or_else(|| AppError::NotFound(format!("Could not find '{}' function", entry)))?;
    let body = func
        .body()
        .and_then(|b| b.stmt_list())
        .ok_or_else(|| AppError::General(format!("Function '{}' has no body", entry)))?;

    let tree = build_route_tree(&func, dialect)?;
    let resolution = tree.resolve(&spec.group);
    let registration = RouteRegistration::new(&resolution.variable, spec, handler);

    if contains_registration(&body, &registration) {
        tracing::info!(
            "Route '{}' is already registered in '{}'",
            registration.statement(),
            entry
        );
        return Ok(RouterPatch {
            source: source.to_string(),
            outcome: RegistrationOutcome::AlreadyPresent,
            resolution,
        });
    }

    let statement = registration.statement();
    let (insert_pos, patch) = match tree.node(resolution.node).origin {
        Some(range) if resolution.node != RouteGroupTree::ROOT => {
            let let_node = body
                .syntax()
                .descendants()
                .find(|n| n.text_range() == range)
                .ok_or_else(|| {
                    AppError::NotFound(format!("Declaration of '{}' not found", resolution.variable))
                })?;
            after_group_let(source, &let_node, &statement)?
        }
        _ => {
            let is_main = func.name().is_some_and(|n| n.text() == "main");
            at_root(source, &body, &statement, is_main)
        }
    };

    let mut new_source = source.to_string();
    new_source.insert_str(insert_pos, &patch);

    tracing::info!("Registered '{}' in '{}'", statement, entry);
    Ok(RouterPatch {
        source: new_source,
        outcome: RegistrationOutcome::Inserted { statement },
        resolution,
    })
}

/// Registers a route in the router file at `path` and merges `imports` into
/// it. The file is only written when its content changed.
pub fn register_route_in_file(
    path: &Path,
    entry: &str,
    spec: &RouteSpec,
    handler: &str,
    imports: &[String],
    dialect: &RouterDialect,
) -> AppResult<RouterPatch> {
    let original = read_source(path)?;
    let origin = path.display().to_string();
    let mut patch = patch_router(&original, &origin, entry, spec, handler, dialect)?;

    for import in imports {
        patch.source = add_import(&patch.source, import)?;
    }

    if patch.source != original {
        write_source(path, &patch.source)?;
    }
    Ok(patch)
}

/// Recursive search over the statements of `list` and its nested blocks.
fn contains_registration(list: &ast::StmtList, registration: &RouteRegistration) -> bool {
    statements(list).iter().any(|stmt| match &stmt.kind {
        StatementKind::Expr(ast::Expr::MethodCallExpr(call)) => registration.matches(call),
        StatementKind::Expr(expr) => {
            bare_block(expr).is_some_and(|inner| contains_registration(&inner, registration))
        }
        _ => false,
    })
}

/// Insertion for a group created by `let_node`.
fn after_group_let(source: &str, let_node: &SyntaxNode, statement: &str) -> AppResult<(usize, String)> {
    let list = let_node
        .parent()
        .and_then(ast::StmtList::cast)
        .ok_or_else(|| AppError::General("Group declaration is not inside a block".into()))?;
    let stmts = statements(&list);
    let next = stmts
        .iter()
        .position(|s| &s.node == let_node)
        .and_then(|i| stmts.get(i + 1));

    if let Some(StatementKind::Expr(expr)) = next.map(|s| &s.kind) {
        if let Some(block) = bare_block(expr) {
            return Ok(append_to_list(source, &block, statement));
        }
    }

    let pos = usize::from(let_node.text_range().end());
    Ok((pos, format!("\n{}{}", indent_of(let_node), statement)))
}

/// Insertion on the root variable.
fn at_root(source: &str, body: &ast::StmtList, statement: &str, is_main: bool) -> (usize, String) {
    if is_main {
        let stmts = statements(body);
        if let Some(last) = stmts.last() {
            if !matches!(last.kind, StatementKind::Let(_)) {
                let pos = usize::from(last.node.text_range().start());
                return (pos, format!("{}\n{}", statement, indent_of(&last.node)));
            }
        }
    }
    append_to_list(source, body, statement)
}

/// Appends `statement` as the last statement of `list`. A tail expression
/// that yields a value (`rg`) stays last; a trailing group block such as
/// `{ user.get(..); }` is a plain statement and the call goes after it.
fn append_to_list(source: &str, list: &ast::StmtList, statement: &str) -> (usize, String) {
    if let Some(tail) = list.tail_expr() {
        if is_unit_block(&tail) {
            let pos = usize::from(tail.syntax().text_range().end());
            return (pos, format!("\n{}{}", indent_of(tail.syntax()), statement));
        }
        let pos = usize::from(tail.syntax().text_range().start());
        return (pos, format!("{}\n{}", statement, indent_of(tail.syntax())));
    }

    if let Some(last) = list.statements().last() {
        let pos = usize::from(last.syntax().text_range().end());
        return (pos, format!("\n{}{}", indent_of(last.syntax()), statement));
    }

    // Empty block.
    let open = list
        .l_curly_token()
        .map(|t| usize::from(t.text_range().end()))
        .unwrap_or_else(|| usize::from(list.syntax().text_range().start()));
    let close = list
        .r_curly_token()
        .map(|t| usize::from(t.text_range().start()))
        .unwrap_or(open);
    let multiline = source.get(open..close).is_some_and(|s| s.contains('\n'));

    let closing_indent = line_indent(source, if multiline { close } else { open });
    let inner_indent = format!("{}    ", closing_indent);
    if multiline {
        (open, format!("\n{}{}", inner_indent, statement))
    } else {
        (open, format!("\n{}{}\n{}", inner_indent, statement, closing_indent))
    }
}

/// A bare block without a tail expression of its own.
fn is_unit_block(expr: &ast::Expr) -> bool {
    bare_block(expr).is_some_and(|inner| inner.tail_expr().is_none())
}

/// Leading whitespace of the line containing `offset`.
fn line_indent(source: &str, offset: usize) -> String {
    let prefix = source.get(..offset).unwrap_or(source);
    let line_start = prefix.rfind('\n').map(|i| i + 1).unwrap_or(0);
    source[line_start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spec(path: &str, method: &str, group: &str) -> RouteSpec {
        RouteSpec {
            handler_name: "Login".into(),
            path: path.into(),
            method: method.into(),
            group: group.into(),
            ..RouteSpec::default()
        }
    }

    fn register(source: &str, entry: &str, spec: &RouteSpec, handler: &str) -> RouterPatch {
        register_route(source, entry, spec, handler, &RouterDialect::default()).unwrap()
    }

    #[test]
    fn test_statement_text() {
        let reg = RouteRegistration::new("user", &spec("/login", "POST", "user"), "handlers::login_handler");
        assert_eq!(reg.statement(), "user.post(\"/login\", handlers::login_handler);");
    }

    #[test]
    fn test_insert_into_group_block() {
        let source = r#"use crate::handlers;

// Routes for users.
pub fn user_router(rg: &mut RouterGroup) {
    let user = rg.group("user");
    {
        // existing
        user.get("/register", handlers::register_handler);
    }
}
"#;
        let patch = register(source, "user_router", &spec("/login", "POST", "user"), "handlers::login_handler");

        let expected = r#"use crate::handlers;

// Routes for users.
pub fn user_router(rg: &mut RouterGroup) {
    let user = rg.group("user");
    {
        // existing
        user.get("/register", handlers::register_handler);
        user.post("/login", handlers::login_handler);
    }
}
"#;
        assert_eq!(patch.source, expected);
        assert_eq!(patch.resolution.path, "/user");
        assert!(matches!(patch.outcome, RegistrationOutcome::Inserted { .. }));
    }

    #[test]
    fn test_duplicate_is_not_added() {
        let source = r#"pub fn user_router(rg: &mut RouterGroup) {
    let user = rg.group("user");
    {
        user.post( "/login",  handlers::login_handler );
    }
}
"#;
        let patch = register(source, "user_router", &spec("/login", "POST", "user"), "handlers::login_handler");
        assert_eq!(patch.source, source);
        assert_eq!(patch.outcome, RegistrationOutcome::AlreadyPresent);
    }

    #[test]
    fn test_same_path_other_method_is_added() {
        let source = "pub fn r(rg: &mut RouterGroup) {\n    rg.get(\"/login\", handlers::login_handler);\n}\n";
        let patch = register(source, "r", &spec("/login", "POST", ""), "handlers::login_handler");
        assert_eq!(
            patch.source,
            "pub fn r(rg: &mut RouterGroup) {\n    rg.get(\"/login\", handlers::login_handler);\n    rg.post(\"/login\", handlers::login_handler);\n}\n"
        );
    }

    #[test]
    fn test_flat_group_inserts_after_let() {
        let source = r#"pub fn user_router(rg: &mut RouterGroup) {
    let admin = rg.group("admin");
    rg.get("/health", handlers::health_handler);
}
"#;
        let patch = register(source, "user_router", &spec("/stats", "GET", "admin"), "handlers::stats_handler");
        let expected = r#"pub fn user_router(rg: &mut RouterGroup) {
    let admin = rg.group("admin");
    admin.get("/stats", handlers::stats_handler);
    rg.get("/health", handlers::health_handler);
}
"#;
        assert_eq!(patch.source, expected);
    }

    #[test]
    fn test_nested_group_in_block() {
        let source = r#"pub fn user_router(rg: &mut RouterGroup) {
    let user = rg.group("user");
    {
        let admin = user.group("admin");
        {
            admin.get("/a", handlers::a_handler);
        }
    }
}
"#;
        let patch = register(source, "user_router", &spec("/stats", "GET", "admin"), "handlers::stats_handler");
        assert!(patch.source.contains(
            "            admin.get(\"/a\", handlers::a_handler);\n            admin.get(\"/stats\", handlers::stats_handler);\n"
        ));
        assert_eq!(patch.resolution.path, "/user/admin");
    }

    #[test]
    fn test_unknown_group_falls_back_to_root() {
        let source = r#"pub fn user_router(rg: &mut RouterGroup) {
    let user = rg.group("user");
    user.get("/register", handlers::register_handler);
}
"#;
        let patch = register(source, "user_router", &spec("/login", "POST", "admin"), "handlers::login_handler");
        assert!(patch.resolution.fell_back);
        assert_eq!(
            patch.source,
            r#"pub fn user_router(rg: &mut RouterGroup) {
    let user = rg.group("user");
    user.get("/register", handlers::register_handler);
    rg.post("/login", handlers::login_handler);
}
"#
        );
    }

    #[test]
    fn test_main_inserts_before_final_statement() {
        let source = r#"fn main() {
    let app = Router::new();
    app.get("/a", handlers::a_handler);
    app.run();
}
"#;
        let patch = register(source, "main", &spec("/login", "POST", ""), "handlers::login_handler");
        assert_eq!(
            patch.source,
            r#"fn main() {
    let app = Router::new();
    app.get("/a", handlers::a_handler);
    app.post("/login", handlers::login_handler);
    app.run();
}
"#
        );
    }

    #[test]
    fn test_root_insert_before_tail_expression() {
        let source = "pub fn routes(rg: Router) -> Router {\n    rg.get(\"/a\", handlers::a_handler);\n    rg\n}\n";
        let patch = register(source, "routes", &spec("/login", "POST", ""), "handlers::login_handler");
        assert_eq!(
            patch.source,
            "pub fn routes(rg: Router) -> Router {\n    rg.get(\"/a\", handlers::a_handler);\n    rg.post(\"/login\", handlers::login_handler);\n    rg\n}\n"
        );
    }

    #[test]
    fn test_root_route_after_trailing_group_block() {
        let source = r#"pub fn user_router(rg: &mut RouterGroup) {
    let user = rg.group("user");
    {
        user.get("/register", handlers::register_handler);
    }
}
"#;
        let patch = register(source, "user_router", &spec("/health", "GET", ""), "handlers::health_handler");
        let expected = r#"pub fn user_router(rg: &mut RouterGroup) {
    let user = rg.group("user");
    {
        user.get("/register", handlers::register_handler);
    }
    rg.get("/health", handlers::health_handler);
}
"#;
        assert_eq!(patch.source, expected);

        let patch = register(&patch.source, "user_router", &spec("/login", "POST", "user"), "handlers::login_handler");
        let expected = r#"pub fn user_router(rg: &mut RouterGroup) {
    let user = rg.group("user");
    {
        user.get("/register", handlers::register_handler);
        user.post("/login", handlers::login_handler);
    }
    rg.get("/health", handlers::health_handler);
}
"#;
        assert_eq!(patch.source, expected);
    }

    #[test]
    fn test_group_route_into_trailing_block() {
        let source = "pub fn user_router(rg: &mut RouterGroup) {\n    let user = rg.group(\"user\");\n    {\n        user.get(\"/register\", handlers::register_handler);\n    }\n}\n";
        let patch = register(source, "user_router", &spec("/login", "POST", "user"), "handlers::login_handler");
        assert_eq!(
            patch.source,
            "pub fn user_router(rg: &mut RouterGroup) {\n    let user = rg.group(\"user\");\n    {\n        user.get(\"/register\", handlers::register_handler);\n        user.post(\"/login\", handlers::login_handler);\n    }\n}\n"
        );
    }

    #[test]
    fn test_empty_entry_function() {
        let source = "pub fn routes(rg: &mut RouterGroup) {\n}\n";
        let patch = register(source, "routes", &spec("/login", "POST", ""), "handlers::login_handler");
        assert_eq!(
            patch.source,
            "pub fn routes(rg: &mut RouterGroup) {\n    rg.post(\"/login\", handlers::login_handler);\n}\n"
        );

        let inline = "pub fn routes(rg: &mut RouterGroup) {}\n";
        let patch = register(inline, "routes", &spec("/login", "POST", ""), "handlers::login_handler");
        assert_eq!(
            patch.source,
            "pub fn routes(rg: &mut RouterGroup) {\n    rg.post(\"/login\", handlers::login_handler);\n}\n"
        );
    }

    #[test]
    fn test_duplicate_search_is_scoped_to_entry() {
        let source = r#"pub fn other(rg: &mut RouterGroup) {
    rg.post("/login", handlers::login_handler);
}

pub fn routes(rg: &mut RouterGroup) {
    rg.get("/a", handlers::a_handler);
}
"#;
        let patch = register(source, "routes", &spec("/login", "POST", ""), "handlers::login_handler");
        assert!(matches!(patch.outcome, RegistrationOutcome::Inserted { .. }));
        assert_eq!(patch.source.matches("rg.post(\"/login\"").count(), 2);
    }

    #[test]
    fn test_missing_entry_function() {
        let err = register_route(
            "fn other() {}",
            "routes",
            &spec("/login", "POST", ""),
            "handlers::login_handler",
            &RouterDialect::default(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Not Found: Could not find 'routes' function");
    }

    #[test]
    fn test_register_in_file_merges_imports() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.rs");
        std::fs::write(&path, "pub fn routes(rg: &mut RouterGroup) {\n}\n").unwrap();

        let imports = vec!["use crate::handlers;".to_string()];
        let run = || {
            register_route_in_file(
                &path,
                "routes",
                &spec("/login", "POST", ""),
                "handlers::login_handler",
                &imports,
                &RouterDialect::default(),
            )
            .unwrap()
        };

        run();
        let first = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            first,
            "use crate::handlers;\n\npub fn routes(rg: &mut RouterGroup) {\n    rg.post(\"/login\", handlers::login_handler);\n}\n"
        );

        assert_eq!(run().outcome, RegistrationOutcome::AlreadyPresent);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }
}
