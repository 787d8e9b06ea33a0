use crate::codegen::Fragment;
use crate::error::AppResult;
use crate::parser::GeneratedFunction;
use crate::patcher::common::{append_block, compact_text, item_name};
use crate::patcher::files::add_import;
use crate::source::{read_source_or_empty, write_source};
use crate::syntax::parse_source;
use ra_ap_syntax::ast::{self, HasModuleItem};
use ra_ap_syntax::AstNode;
use std::path::Path;

/// Result of merging fragments into one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The merged source text.
    pub source: String,
    /// Names of the declarations that were appended.
    pub added: Vec<String>,
    /// Names of the declarations skipped because they already exist.
    pub skipped: Vec<String>,
    /// Descriptors of the fragments' functions as they now exist in the file.
    /// For a skipped function this is the existing declaration, not the
    /// synthesized one.
    pub functions: Vec<GeneratedFunction>,
}

impl MergeOutcome {
    /// Looks up the descriptor of a merged function by name.
    pub fn function(&self, name: &str) -> Option<&GeneratedFunction> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// Merges the items of `fragments` into `source`.
///
/// - `use` items are added unless an equivalent import exists.
/// - Named items are appended unless a top-level item of the same name exists.
/// - Other items are appended unless an identical item exists.
///
/// `origin` names the target in parse errors; `module` is how the target is
/// referenced from other files and qualifies the reported functions.
pub fn merge_declarations(
    source: &str,
    origin: &str,
    module: &str,
    fragments: &[Fragment],
) -> AppResult<MergeOutcome> {
    parse_source(source, origin)?;

    let mut outcome = MergeOutcome {
        source: source.to_string(),
        ..MergeOutcome::default()
    };

    for fragment in fragments {
        let parsed = parse_source(&fragment.source, "generated fragment")?;
        for item in parsed.items() {
            merge_item(&mut outcome, origin, module, &item)?;
        }
    }

    Ok(outcome)
}

fn merge_item(
    outcome: &mut MergeOutcome,
    origin: &str,
    module: &str,
    item: &ast::Item,
) -> AppResult<()> {
    if let ast::Item::Use(u) = item {
        outcome.source = add_import(&outcome.source, &u.syntax().text().to_string())?;
        return Ok(());
    }

    let current = parse_source(&outcome.source, origin)?;
    let text = item.syntax().text().to_string();

    match item_name(item) {
        Some(name) => {
            let existing = current
                .items()
                .find(|i| item_name(i).as_deref() == Some(name.as_str()));

            let described = match existing {
                Some(existing) => {
                    tracing::info!("{} already declares '{}', skipping", origin, name);
                    outcome.skipped.push(name);
                    existing
                }
                None => {
                    append_block(&mut outcome.source, &text);
                    outcome.added.push(name);
                    item.clone()
                }
            };

            if let ast::Item::Fn(f) = described {
                if let Some(function) = GeneratedFunction::from_fn(module, &f) {
                    outcome.functions.push(function);
                }
            }
        }
        None => {
            let wanted = compact_text(item);
            if current.items().any(|i| compact_text(&i) == wanted) {
                tracing::info!("{} already contains an identical item, skipping", origin);
            } else {
                append_block(&mut outcome.source, &text);
            }
        }
    }

    Ok(())
}

/// Merges `fragments` into the file at `path`, creating it when missing.
///
/// The file is only written when the merge changed its content.
pub fn merge_into_file(path: &Path, module: &str, fragments: &[Fragment]) -> AppResult<MergeOutcome> {
    let original = read_source_or_empty(path)?;
    let origin = path.display().to_string();
    let outcome = merge_declarations(&original, &origin, module, fragments)?;

    if outcome.source != original {
        write_source(path, &outcome.source)?;
        for name in &outcome.added {
            tracing::info!("Added '{}' to {}", name, origin);
        }
    } else {
        tracing::debug!("{} is up to date", origin);
    }

    Ok(outcome)
}
