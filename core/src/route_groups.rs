//! # Route Groups
//!
//! Models the routing-group variables of a router entry function as a tree:
//!
//! ```text
//! pub fn user_router(rg: &mut RouterGroup) {   // root: rg
//!     let user = rg.group("user");             // child of rg
//!     {
//!         let admin = user.group("admin");     // child of user
//!     }
//! }
//! ```
//!
//! Nodes live in an arena and refer to each other by index.

use crate::error::{AppError, AppResult};
use crate::syntax::{
    bare_block, find_fn, ident_expr, parse_source, pat_name, path_expr_text, statements,
    string_literal, Statement, StatementKind,
};
use ra_ap_syntax::ast::{self, HasArgList, HasName};
use ra_ap_syntax::TextRange;
use serde::Deserialize;

/// Router API conventions of the routing file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouterDialect {
    /// Method creating a sub-group (`rg.group("user")`).
    pub group_method: String,
    /// Calls creating a root router inside the entry function.
    pub root_constructors: Vec<String>,
}

impl Default for RouterDialect {
    fn default() -> Self {
        Self {
            group_method: "group".into(),
            root_constructors: vec!["Router::new".into(), "Router::default".into()],
        }
    }
}

/// Index of a node in a [`RouteGroupTree`].
pub type NodeId = usize;

/// One routing-group variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGroupNode {
    /// Variable bound to the group.
    pub variable: String,
    /// Path segment passed to the group method. Empty for the root.
    pub segment: String,
    /// Parent group, `None` for the root.
    pub parent: Option<NodeId>,
    /// Child groups in source order.
    pub children: Vec<NodeId>,
    /// Range of the `let` statement creating the variable. `None` for the root.
    pub origin: Option<TextRange>,
}

/// Where a requested group name resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupResolution {
    /// Resolved node.
    pub node: NodeId,
    /// Its variable name.
    pub variable: String,
    /// Full group path (`/user/admin`), empty for the root.
    pub path: String,
    /// Whether the requested group was missing and the root was used instead.
    pub fell_back: bool,
}

/// Arena tree of the groups declared in one entry function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGroupTree {
    nodes: Vec<RouteGroupNode>,
}

impl RouteGroupTree {
    /// Id of the root node.
    pub const ROOT: NodeId = 0;

    fn with_root(variable: String) -> Self {
        Self {
            nodes: vec![RouteGroupNode {
                variable,
                segment: String::new(),
                parent: None,
                children: Vec::new(),
                origin: None,
            }],
        }
    }

    /// The root node.
    pub fn root(&self) -> &RouteGroupNode {
        &self.nodes[Self::ROOT]
    }

    /// Node by id.
    pub fn node(&self, id: NodeId) -> &RouteGroupNode {
        &self.nodes[id]
    }

    /// All nodes, in creation order.
    pub fn nodes(&self) -> &[RouteGroupNode] {
        &self.nodes
    }

    fn push(&mut self, parent: NodeId, variable: String, segment: String, origin: TextRange) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(RouteGroupNode {
            variable,
            segment,
            parent: Some(parent),
            children: Vec::new(),
            origin: Some(origin),
        });
        self.nodes[parent].children.push(id);
        id
    }

    /// Depth-first (pre-order) search for a group by segment. Leading and
    /// trailing `/` are ignored on both sides.
    pub fn find(&self, segment: &str) -> Option<NodeId> {
        let wanted = segment.trim_matches('/');
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.parent.is_some() && node.segment.trim_matches('/') == wanted {
                return Some(id);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// Full path of a node: root-to-node segments joined with `/`.
    pub fn path_to(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(i) = current {
            let segment = self.nodes[i].segment.trim_matches('/');
            if !segment.is_empty() {
                segments.push(segment);
            }
            current = self.nodes[i].parent;
        }
        segments
            .iter()
            .rev()
            .map(|s| format!("/{}", s))
            .collect()
    }

    /// Resolves a group name to a variable, falling back to the root when the
    /// group is not declared. An empty name is the root.
    pub fn resolve(&self, group: &str) -> GroupResolution {
        let (node, fell_back) = if group.trim_matches('/').is_empty() {
            (Self::ROOT, false)
        } else {
            match self.find(group) {
                Some(id) => (id, false),
                None => {
                    tracing::warn!(
                        "Route group '{}' not found, registering on root variable '{}'",
                        group,
                        self.root().variable
                    );
                    (Self::ROOT, true)
                }
            }
        };

        GroupResolution {
            node,
            variable: self.nodes[node].variable.clone(),
            path: self.path_to(node),
            fell_back,
        }
    }

    /// Human-readable outline, one group per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_node(Self::ROOT, 0, &mut out);
        out
    }

    fn render_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let path = self.path_to(id);
        out.push_str(&format!(
            "{}{} {}\n",
            "  ".repeat(depth),
            self.nodes[id].variable,
            if path.is_empty() { "/" } else { path.as_str() }
        ));
        for &child in &self.nodes[id].children {
            self.render_node(child, depth + 1, out);
        }
    }
}

/// Builds the group tree of `func`.
pub fn build_route_tree(func: &ast::Fn, dialect: &RouterDialect) -> AppResult<RouteGroupTree> {
    let fn_name = func
        .name()
        .map(|n| n.text().to_string())
        .unwrap_or_default();
    let body = func
        .body()
        .and_then(|b| b.stmt_list())
        .ok_or_else(|| AppError::NotFound(format!("Function '{}' has no body", fn_name)))?;
    let stmts = statements(&body);

    let root = root_variable(func, &stmts, dialect).ok_or_else(|| {
        AppError::NotFound(format!(
            "Could not find a router variable in '{}': expected a router parameter or a `let` bound to one of {:?}",
            fn_name, dialect.root_constructors
        ))
    })?;

    let mut tree = RouteGroupTree::with_root(root);
    scan(&mut tree, &stmts, RouteGroupTree::ROOT, dialect);
    tracing::debug!("Route group tree of '{}':\n{}", fn_name, tree.render());
    Ok(tree)
}

/// Parses `source` and builds the group tree of its function `entry`.
pub fn build_route_tree_from_source(
    source: &str,
    entry: &str,
    dialect: &RouterDialect,
) -> AppResult<RouteGroupTree> {
    let file = parse_source(source, "router file")?;
    let func = find_fn(&file, entry)
        .ok_or_else(|| AppError::NotFound(format!("Could not find '{}' function", entry)))?;
    build_route_tree(&func, dialect)
}

fn root_variable(func: &ast::Fn, stmts: &[Statement], dialect: &RouterDialect) -> Option<String> {
    let param = func
        .param_list()
        .and_then(|list| list.params().next())
        .and_then(|p| p.pat())
        .and_then(|pat| pat_name(&pat));
    if param.is_some() {
        return param;
    }

    stmts.iter().find_map(|stmt| {
        let StatementKind::Let(l) = &stmt.kind else {
            return None;
        };
        let ast::Expr::CallExpr(call) = l.initializer()? else {
            return None;
        };
        let callee = path_expr_text(&call.expr()?)?;
        if dialect.root_constructors.contains(&callee) {
            pat_name(&l.pat()?)
        } else {
            None
        }
    })
}

/// Records child groups of `parent` declared in `stmts`. Scanning for a
/// child continues over the statements after its `let`, and bare blocks are
/// entered with the current parent.
fn scan(tree: &mut RouteGroupTree, stmts: &[Statement], parent: NodeId, dialect: &RouterDialect) {
    for (i, stmt) in stmts.iter().enumerate() {
        match &stmt.kind {
            StatementKind::Let(l) => {
                let receiver = tree.node(parent).variable.clone();
                if let Some((variable, segment)) = group_binding(l, &receiver, dialect) {
                    let child = tree.push(parent, variable, segment, stmt.node.text_range());
                    scan(tree, &stmts[i + 1..], child, dialect);
                }
            }
            StatementKind::Expr(e) => {
                if let Some(list) = bare_block(e) {
                    scan(tree, &statements(&list), parent, dialect);
                }
            }
            StatementKind::Other => {}
        }
    }
}

/// Matches `let <var> = <receiver>.<group_method>("<segment>");`.
fn group_binding(
    stmt: &ast::LetStmt,
    receiver: &str,
    dialect: &RouterDialect,
) -> Option<(String, String)> {
    let variable = pat_name(&stmt.pat()?)?;
    let ast::Expr::MethodCallExpr(call) = stmt.initializer()? else {
        return None;
    };
    if call.name_ref()?.text() != dialect.group_method.as_str() {
        return None;
    }
    if ident_expr(&call.receiver()?)? != receiver {
        return None;
    }
    let segment = string_literal(&call.arg_list()?.args().next()?)?;
    Some((variable, segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ROUTER: &str = r#"
pub fn user_router(rg: &mut RouterGroup) {
    let user = rg.group("/user");
    {
        user.post("/login", handlers::login_handler);
        let admin = user.group("admin");
        admin.get("/stats", handlers::stats_handler);
    }
    let public = rg.group("public");
    let docs = public.group("docs");
    let other = unrelated.group("nope");
}
"#;

    fn tree() -> RouteGroupTree {
        build_route_tree_from_source(ROUTER, "user_router", &RouterDialect::default()).unwrap()
    }

    #[test]
    fn test_tree_structure() {
        let tree = tree();
        let vars: Vec<&str> = tree.nodes().iter().map(|n| n.variable.as_str()).collect();
        assert_eq!(vars, vec!["rg", "user", "admin", "public", "docs"]);

        let admin = tree.find("admin").unwrap();
        assert_eq!(tree.node(admin).parent, tree.find("user"));
        assert!(tree.node(admin).origin.is_some());
        assert!(tree.root().origin.is_none());
    }

    #[test]
    fn test_paths() {
        let tree = tree();
        assert_eq!(tree.path_to(RouteGroupTree::ROOT), "");
        assert_eq!(tree.path_to(tree.find("admin").unwrap()), "/user/admin");
        assert_eq!(tree.path_to(tree.find("docs").unwrap()), "/public/docs");
    }

    #[test]
    fn test_segment_match_ignores_slashes() {
        let tree = tree();
        assert_eq!(tree.find("user"), tree.find("/user/"));
        assert!(tree.find("user").is_some());
    }

    #[test]
    fn test_resolve_and_fallback() {
        let tree = tree();

        let admin = tree.resolve("admin");
        assert_eq!(admin.variable, "admin");
        assert_eq!(admin.path, "/user/admin");
        assert!(!admin.fell_back);

        let root = tree.resolve("");
        assert_eq!(root.variable, "rg");
        assert!(!root.fell_back);

        let missing = tree.resolve("billing");
        assert_eq!(missing.variable, "rg");
        assert_eq!(missing.node, RouteGroupTree::ROOT);
        assert!(missing.fell_back);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_fallback_is_logged() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        let tree = tree();
        tracing::subscriber::with_default(subscriber, || {
            tree.resolve("admin");
            tree.resolve("billing");
        });

        let text = logs.text();
        assert!(text.contains("WARN"), "{}", text);
        assert!(
            text.contains("Route group 'billing' not found, registering on root variable 'rg'"),
            "{}",
            text
        );
        assert_eq!(text.matches("not found").count(), 1);
    }

    #[test]
    fn test_local_root_in_main() {
        let code = "fn main() {\n    let mut app = Router::new();\n    let api = app.group(\"api\");\n    app.run();\n}";
        let tree = build_route_tree_from_source(code, "main", &RouterDialect::default()).unwrap();
        assert_eq!(tree.root().variable, "app");
        assert_eq!(tree.resolve("api").variable, "api");
    }

    #[test]
    fn test_custom_dialect() {
        let dialect = RouterDialect {
            group_method: "scope".into(),
            root_constructors: vec!["App::new".into()],
        };
        let code = "fn build() {\n    let app = App::new();\n    let v1 = app.scope(\"v1\");\n}";
        let tree = build_route_tree_from_source(code, "build", &dialect).unwrap();
        assert_eq!(tree.render(), "app /\n  v1 /v1\n");
    }

    #[test]
    fn test_missing_root_variable() {
        let code = "fn main() {\n    println!(\"no router\");\n}";
        let err = build_route_tree_from_source(code, "main", &RouterDialect::default()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_missing_entry_function() {
        let err = build_route_tree_from_source(ROUTER, "admin_router", &RouterDialect::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Not Found: Could not find 'admin_router' function");
    }
}
