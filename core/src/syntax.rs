//! # Syntax Helpers
//!
//! Shared helpers over the rust-analyzer syntax tree: strict parsing,
//! statement enumeration, indentation detection and small expression matchers
//! used by the merge engine.

use crate::error::{AppError, AppResult};
use ra_ap_edition::Edition;
use ra_ap_syntax::ast::{self, HasName};
use ra_ap_syntax::{AstNode, SourceFile, SyntaxKind, SyntaxNode};

/// Parses `text` into a lossless syntax tree, rejecting any syntax error.
///
/// The rust-analyzer parser is error tolerant and always yields a tree; the
/// generator refuses to rewrite anything it could not parse cleanly.
pub fn parse_source(text: &str, origin: &str) -> AppResult<SourceFile> {
    let parse = SourceFile::parse(text, Edition::Edition2021);
    let errors: Vec<String> = parse
        .errors()
        .into_iter()
        .map(|e| {
            let offset: usize = e.range().start().into();
            format!("line {}: {}", line_of(text, offset), e)
        })
        .collect();

    if !errors.is_empty() {
        return Err(AppError::Parse(origin.to_string(), errors.join(", ")));
    }

    Ok(parse.tree())
}

fn line_of(text: &str, offset: usize) -> usize {
    text.get(..offset)
        .map(|prefix| prefix.matches('\n').count() + 1)
        .unwrap_or(1)
}

/// Finds a function (free or associated) by name.
pub fn find_fn(file: &SourceFile, name: &str) -> Option<ast::Fn> {
    file.syntax()
        .descendants()
        .filter_map(ast::Fn::cast)
        .find(|f| f.name().is_some_and(|n| n.text() == name))
}

/// Returns the whitespace that precedes `node` on its own line.
pub fn indent_of(node: &SyntaxNode) -> String {
    node.first_token()
        .and_then(|t| t.prev_token())
        .filter(|t| t.kind() == SyntaxKind::WHITESPACE)
        .and_then(|t| t.text().rsplit_once('\n').map(|(_, last)| last.to_string()))
        .unwrap_or_default()
}

/// One entry of a statement list, the tail expression included.
#[derive(Debug, Clone)]
pub struct Statement {
    /// The whole statement node (including a trailing `;`).
    pub node: SyntaxNode,
    /// Classified content.
    pub kind: StatementKind,
}

/// Classification of a [`Statement`].
#[derive(Debug, Clone)]
pub enum StatementKind {
    /// `let pat = init;`
    Let(ast::LetStmt),
    /// An expression statement or the list's tail expression.
    Expr(ast::Expr),
    /// Items and anything else.
    Other,
}

/// Lists the statements of a block in source order, ending with the tail
/// expression when there is one.
pub fn statements(list: &ast::StmtList) -> Vec<Statement> {
    let mut out: Vec<Statement> = list
        .statements()
        .map(|stmt| {
            let node = stmt.syntax().clone();
            let kind = match stmt {
                ast::Stmt::LetStmt(l) => StatementKind::Let(l),
                ast::Stmt::ExprStmt(e) => match e.expr() {
                    Some(expr) => StatementKind::Expr(expr),
                    None => StatementKind::Other,
                },
                ast::Stmt::Item(_) => StatementKind::Other,
            };
            Statement { node, kind }
        })
        .collect();

    if let Some(tail) = list.tail_expr() {
        out.push(Statement {
            node: tail.syntax().clone(),
            kind: StatementKind::Expr(tail),
        });
    }

    out
}

/// Returns the statement list of a plain `{ ... }` block expression.
///
/// Blocks with modifiers (`async`, `unsafe`, labels, ...) are not scopes the
/// router authoring styles use and are ignored.
pub fn bare_block(expr: &ast::Expr) -> Option<ast::StmtList> {
    match expr {
        ast::Expr::BlockExpr(block) => {
            let first = block.syntax().first_token()?;
            if first.kind() != SyntaxKind::L_CURLY {
                return None;
            }
            block.stmt_list()
        }
        _ => None,
    }
}

/// Returns the binding name of a simple identifier pattern.
pub fn pat_name(pat: &ast::Pat) -> Option<String> {
    match pat {
        ast::Pat::IdentPat(p) => p.name().map(|n| n.text().to_string()),
        _ => None,
    }
}

/// Returns the identifier when `expr` is a single-segment path (`rg`).
pub fn ident_expr(expr: &ast::Expr) -> Option<String> {
    let text = path_expr_text(expr)?;
    let is_ident = !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || c == '_');
    is_ident.then_some(text)
}

/// Returns the whitespace-free text of a path expression (`handlers::login`).
pub fn path_expr_text(expr: &ast::Expr) -> Option<String> {
    match expr {
        ast::Expr::PathExpr(p) => Some(
            p.syntax()
                .text()
                .to_string()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect(),
        ),
        _ => None,
    }
}

/// Returns the (unescaped-as-written) value of a string literal expression.
pub fn string_literal(expr: &ast::Expr) -> Option<String> {
    let ast::Expr::Literal(lit) = expr else {
        return None;
    };
    let token = lit.token();
    if token.kind() != SyntaxKind::STRING {
        return None;
    }
    let text = token.text();
    let unprefixed = text.strip_prefix('r').unwrap_or(text).trim_matches('#');
    unprefixed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .map(str::to_string)
}
