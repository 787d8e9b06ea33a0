//! # Tree Command
//!
//! Prints the route groups declared in the router entry function.

use apigen_core::pipeline::load_route_tree;
use apigen_core::{AppResult, Config};
use colored::Colorize;

/// Prints the route group tree of `config.router.groupFunc`.
pub fn execute(config: &Config) -> AppResult<()> {
    let tree = load_route_tree(config)?;
    println!(
        "{} {}",
        config.router.group_func.bold(),
        format!("({})", config.router.file.display()).dimmed()
    );
    print!("{}", tree.render());
    Ok(())
}
