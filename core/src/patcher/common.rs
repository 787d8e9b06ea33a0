use ra_ap_syntax::ast::{self, HasName};
use ra_ap_syntax::AstNode;

/// Name of a named top-level item. `None` for `use`, `impl`, macro calls and
/// other anonymous items.
pub(crate) fn item_name(item: &ast::Item) -> Option<String> {
    let name = match item {
        ast::Item::Fn(i) => i.name(),
        ast::Item::Struct(i) => i.name(),
        ast::Item::Enum(i) => i.name(),
        ast::Item::Union(i) => i.name(),
        ast::Item::Const(i) => i.name(),
        ast::Item::Static(i) => i.name(),
        ast::Item::TypeAlias(i) => i.name(),
        ast::Item::Trait(i) => i.name(),
        ast::Item::Module(i) => i.name(),
        ast::Item::MacroRules(i) => i.name(),
        _ => None,
    };
    name.map(|n| n.text().to_string())
}

/// Text of a node with all whitespace removed, for formatting-insensitive
/// comparison.
pub(crate) fn compact_text(node: &impl AstNode) -> String {
    compact(&node.syntax().text().to_string())
}

pub(crate) fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Appends `block` at the end of `source`, separated by one blank line.
pub(crate) fn append_block(source: &mut String, block: &str) {
    if !source.is_empty() {
        if !source.ends_with('\n') {
            source.push('\n');
        }
        if !source.ends_with("\n\n") {
            source.push('\n');
        }
    }
    source.push_str(block.trim_end());
    source.push('\n');
}
