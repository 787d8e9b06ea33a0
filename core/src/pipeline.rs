//! # Generation Pipeline
//!
//! Runs the fixed step sequence for each configured route path:
//!
//! 1. bind the annotated request/response types,
//! 2. synthesize the logic function and merge it into the logic file,
//! 3. look up the route's group to document its full path,
//! 4. synthesize the handler against the merged logic function and merge it,
//! 5. register the handler in the router entry function.
//!
//! Data flows between steps as return values. The first fatal error aborts
//! the run; every step is idempotent, so re-running after a fix is safe.

use crate::codegen::{synthesize_handler, synthesize_logic};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::parser::{bind_route, route_paths, GeneratedFunction, RouteSpec, TypeBinding};
use crate::patcher::merge_into_file;
use crate::route_generator::{register_route_in_file, RegistrationOutcome};
use crate::route_groups::{build_route_tree_from_source, GroupResolution, RouteGroupTree};
use crate::source::read_source;
use crate::strategies::BackendStrategy;

/// What generating one route did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteReport {
    /// The route path.
    pub path: String,
    /// Route metadata read from the type annotations.
    pub spec: RouteSpec,
    /// Bound request/response types.
    pub binding: TypeBinding,
    /// The logic function as it exists in the logic file.
    pub logic: GeneratedFunction,
    /// The handler function as it exists in the handler file.
    pub handler: GeneratedFunction,
    /// Qualified names of the declarations added in this run.
    pub added: Vec<String>,
    /// Outcome of the route registration.
    pub registration: RegistrationOutcome,
    /// Group the route was registered on.
    pub group: GroupResolution,
}

impl RouteReport {
    /// Whether the run changed anything for this route.
    pub fn changed(&self) -> bool {
        !self.added.is_empty() || matches!(self.registration, RegistrationOutcome::Inserted { .. })
    }
}

/// Generates every route of `config`.
///
/// Without configured `apiPath` entries, every annotated route path of the
/// type file is generated.
pub fn run(config: &Config, strategy: &impl BackendStrategy) -> AppResult<Vec<RouteReport>> {
    let types = read_source(&config.type_file)?;

    let paths = if config.api_path.is_empty() {
        let found = route_paths(&types)?;
        if found.is_empty() {
            return Err(AppError::Config(format!(
                "No apiPath configured and no annotated routes in {}",
                config.type_file.display()
            )));
        }
        found
    } else {
        config.api_path.clone()
    };

    paths
        .iter()
        .map(|path| generate_route(config, &types, path, strategy))
        .collect()
}

/// Generates one route path. `types` is the content of the type file.
pub fn generate_route(
    config: &Config,
    types: &str,
    path: &str,
    strategy: &impl BackendStrategy,
) -> AppResult<RouteReport> {
    tracing::info!("Generating route '{}'", path);

    let (binding, spec) = bind_route(types, &config.type_module_name(), path)?;

    let logic_module = config.logic.module_name();
    let logic_fragment = synthesize_logic(
        &spec,
        &binding,
        &logic_module,
        &config.logic.imports,
        strategy,
    )?;
    let logic_merge = merge_into_file(&config.logic.file, &logic_module, &[logic_fragment.clone()])?;
    let logic = logic_merge
        .function(&logic_fragment.function.name)
        .cloned()
        .unwrap_or(logic_fragment.function);

    let group_path = documented_group_path(config, &spec)?;

    let handler_module = config.handler.module_name();
    let handler_fragment = synthesize_handler(
        &spec,
        &binding,
        &logic,
        &format!("{}/{}", config.basic_path, group_path),
        &handler_module,
        &config.handler.imports,
        strategy,
    )?;
    let handler_merge = merge_into_file(
        &config.handler.file,
        &handler_module,
        &[handler_fragment.clone()],
    )?;
    let handler = handler_merge
        .function(&handler_fragment.function.name)
        .cloned()
        .unwrap_or(handler_fragment.function);

    let patch = register_route_in_file(
        &config.router.file,
        &config.router.group_func,
        &spec,
        &handler.path(),
        &config.router.imports,
        &config.router.dialect,
    )?;

    let added = logic_merge
        .added
        .iter()
        .map(|name| format!("{}::{}", logic_module, name))
        .chain(
            handler_merge
                .added
                .iter()
                .map(|name| format!("{}::{}", handler_module, name)),
        )
        .collect();

    Ok(RouteReport {
        path: path.to_string(),
        spec,
        binding,
        logic,
        handler,
        added,
        registration: patch.outcome,
        group: patch.resolution,
    })
}

/// Full path of the route's group, empty when the group is not declared.
/// The fallback itself is reported when the route is registered.
fn documented_group_path(config: &Config, spec: &RouteSpec) -> AppResult<String> {
    let tree = load_route_tree(config)?;
    Ok(tree
        .find(&spec.group)
        .map(|id| tree.path_to(id))
        .unwrap_or_default())
}

/// Builds the group tree of the configured router entry function.
pub fn load_route_tree(config: &Config) -> AppResult<RouteGroupTree> {
    let source = read_source(&config.router.file)?;
    build_route_tree_from_source(&source, &config.router.group_func, &config.router.dialect)
}
