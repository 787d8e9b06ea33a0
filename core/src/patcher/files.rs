use crate::error::{AppError, AppResult};
use crate::patcher::common::compact;
use crate::syntax::parse_source;
use ra_ap_syntax::ast::{HasModuleItem, HasName, HasVisibility};
use ra_ap_syntax::{ast, AstNode, NodeOrToken, SyntaxKind, TextSize};

/// Adds an import to the file, skipping the names it already imports.
///
/// Imports are compared leaf by leaf with whitespace ignored, so
/// `use crate::{logic, types};` is satisfied by `use crate::logic;` plus
/// `use crate::types;`. When only some leaves are missing, one `use` per
/// missing leaf is added instead of the whole statement.
///
/// A new import goes after the last top-level `use`; without one it goes
/// after the file's leading inner attributes and comments (`//!` docs,
/// `#![...]`), or at the very top.
pub fn add_import(source: &str, import_statement: &str) -> AppResult<String> {
    let clean_stmt = import_statement.trim();
    let wanted_use = parse_source(clean_stmt, "import")?
        .items()
        .find_map(|item| match item {
            ast::Item::Use(u) => Some(u),
            _ => None,
        })
        .ok_or_else(|| AppError::General(format!("'{}' is not a use item", clean_stmt)))?;
    let wanted = use_leaves(&wanted_use);

    let file = parse_source(source, "import target")?;

    let mut existing = Vec::new();
    let mut last_use_node: Option<ra_ap_syntax::SyntaxNode> = None;
    for item in file.items() {
        if let ast::Item::Use(u) = item {
            existing.extend(use_leaves(&u));
            last_use_node = Some(u.syntax().clone());
        }
    }

    let missing: Vec<&String> = wanted.iter().filter(|l| !existing.contains(l)).collect();
    if missing.is_empty() {
        return Ok(source.into());
    }

    let statement = if missing.len() == wanted.len() {
        clean_stmt.to_string()
    } else {
        let vis = wanted_use
            .visibility()
            .map(|v| format!("{} ", v.syntax().text()))
            .unwrap_or_default();
        missing
            .iter()
            .map(|leaf| format!("{}use {};", vis, leaf))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let insert_pos;
    let patch;

    if let Some(node) = last_use_node {
        insert_pos = usize::from(node.text_range().end());
        patch = format!("\n{}", statement);
    } else if let Some(end) = file_header_end(&file) {
        insert_pos = usize::from(end);
        patch = format!("\n\n{}", statement);
    } else if source.trim().is_empty() {
        insert_pos = 0;
        patch = format!("{}\n", statement);
    } else {
        insert_pos = 0;
        patch = format!("{}\n\n", statement);
    }

    let mut new_source = source.to_string();
    new_source.insert_str(insert_pos, &patch);
    Ok(new_source)
}

/// Flattens a `use` item into its imported leaf paths:
/// `use a::{b, c::{self, d as e}};` gives `a::b`, `a::c`, `a::c::d as e`.
fn use_leaves(item: &ast::Use) -> Vec<String> {
    let mut leaves = Vec::new();
    if let Some(tree) = item.use_tree() {
        collect_leaves(&tree, "", &mut leaves);
    }
    leaves
}

fn collect_leaves(tree: &ast::UseTree, prefix: &str, out: &mut Vec<String>) {
    let path = tree
        .path()
        .map(|p| compact(&p.syntax().text().to_string()))
        .unwrap_or_default();
    let full = match (prefix.is_empty(), path.as_str()) {
        (_, "self") | (false, "") => prefix.to_string(),
        (true, _) => path.clone(),
        (false, _) => format!("{}::{}", prefix, path),
    };

    if let Some(list) = tree.use_tree_list() {
        for child in list.use_trees() {
            collect_leaves(&child, &full, out);
        }
        return;
    }

    let leaf = if tree.star_token().is_some() {
        if full.is_empty() {
            "*".to_string()
        } else {
            format!("{}::*", full)
        }
    } else if let Some(rename) = tree.rename() {
        let alias = rename
            .name()
            .map(|n| n.text().to_string())
            .unwrap_or_else(|| "_".to_string());
        format!("{} as {}", full, alias)
    } else {
        full
    };

    if !out.contains(&leaf) {
        out.push(leaf);
    }
}

/// End offset of the leading inner attributes and comments, if any.
fn file_header_end(file: &ast::SourceFile) -> Option<TextSize> {
    let mut end = None;
    for element in file.syntax().children_with_tokens() {
        match element {
            NodeOrToken::Token(t) if t.kind() == SyntaxKind::WHITESPACE => {}
            NodeOrToken::Token(t) if t.kind() == SyntaxKind::COMMENT => {
                end = Some(t.text_range().end());
            }
            NodeOrToken::Node(n) if is_inner_attr(&n) => {
                end = Some(n.text_range().end());
            }
            _ => break,
        }
    }
    end
}

fn is_inner_attr(node: &ra_ap_syntax::SyntaxNode) -> bool {
    ast::Attr::cast(node.clone()).is_some_and(|a| a.excl_token().is_some())
}
