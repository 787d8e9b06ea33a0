//! # Code Generation
//!
//! Template filling for the per-route logic and handler functions.
//!
//! Every generated fragment is parsed back immediately: a template or
//! substitution error fails here rather than corrupting a target file, and the
//! parse yields the [`GeneratedFunction`] descriptor used by later steps.

use crate::error::{AppError, AppResult};
use crate::parser::{GeneratedFunction, RouteSpec, TypeBinding};
use crate::strategies::BackendStrategy;
use crate::syntax::parse_source;
use heck::ToSnakeCase;
use ra_ap_syntax::ast::{self, HasModuleItem};

/// A synthesized, syntax-checked source fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Source text: imports followed by one function.
    pub source: String,
    /// Descriptor of the generated function.
    pub function: GeneratedFunction,
}

/// Name of the logic function for a route (`Login` -> `login_logic`).
pub fn logic_fn_name(spec: &RouteSpec) -> String {
    format!("{}_logic", spec.handler_name.to_snake_case())
}

/// Name of the handler function for a route (`Login` -> `login_handler`).
pub fn handler_fn_name(spec: &RouteSpec) -> String {
    format!("{}_handler", spec.handler_name.to_snake_case())
}

/// Full route path used in the handler docs: group path joined with the
/// route path.
///
/// # Examples
/// ```
/// use apigen_core::codegen::route_doc_path;
///
/// assert_eq!(route_doc_path("/api/v1/user", "/login"), "/api/v1/user/login");
/// assert_eq!(route_doc_path("", "login"), "/login");
/// assert_eq!(route_doc_path("/api/", "/user/login"), "/api/user/login");
/// ```
pub fn route_doc_path(group_path: &str, path: &str) -> String {
    let joined: String = group_path
        .split('/')
        .chain(path.split('/'))
        .filter(|s| !s.is_empty())
        .map(|s| format!("/{}", s))
        .collect();
    if joined.is_empty() {
        "/".to_string()
    } else {
        joined
    }
}

/// Generates the business-logic skeleton for a route.
///
/// ```text
/// pub async fn login_logic(req: types::LoginReq) -> Result<types::LoginResp, actix_web::Error>
/// ```
pub fn synthesize_logic(
    spec: &RouteSpec,
    binding: &TypeBinding,
    module: &str,
    imports: &[String],
    strategy: &impl BackendStrategy,
) -> AppResult<Fragment> {
    let mut code = import_block(imports);
    code.push_str(&format!(
        "/// Business logic behind `{method} {path}`.\n\
         pub async fn {name}(req: {req}) -> Result<{resp}, {err}> {{\n\
         \x20   // Fill in the business logic and remove this placeholder.\n\
         \x20   let _ = req;\n\
         \x20   todo!()\n\
         }}\n",
        method = spec.method,
        path = spec.path,
        name = logic_fn_name(spec),
        req = binding.request_type,
        resp = binding.response_type,
        err = strategy.logic_error_type(),
    ));

    finish(code, module)
}

/// Generates the request handler for a route, calling into `logic`.
///
/// `group_path` is the resolved routing-group path, used in the `@Router`
/// documentation line.
pub fn synthesize_handler(
    spec: &RouteSpec,
    binding: &TypeBinding,
    logic: &GeneratedFunction,
    group_path: &str,
    module: &str,
    imports: &[String],
    strategy: &impl BackendStrategy,
) -> AppResult<Fragment> {
    let mut all_imports = strategy.handler_imports();
    all_imports.extend(imports.iter().cloned());

    let mut code = import_block(&all_imports);
    code.push_str(&handler_docs(spec, binding, group_path, strategy));
    code.push_str(&format!(
        "pub async fn {name}(req: {extractor}) -> {ret} {{\n\
         \x20   {unwrap}\n\
         \x20   if let Err(err) = req.validate() {{\n\
         \x20       return {invalid};\n\
         \x20   }}\n\
         \n\
         {call}\
         }}\n",
        name = handler_fn_name(spec),
        extractor = strategy.request_extractor(&spec.method, &binding.request_type),
        ret = strategy.handler_return_type(),
        unwrap = strategy.unwrap_request("req"),
        invalid = strategy.validation_failure("err"),
        call = logic_call(logic, strategy),
    ));

    finish(code, module)
}

/// Documentation annotation lines of a handler.
fn handler_docs(
    spec: &RouteSpec,
    binding: &TypeBinding,
    group_path: &str,
    strategy: &impl BackendStrategy,
) -> String {
    let mut docs = String::new();
    if !spec.summary.is_empty() {
        docs.push_str(&format!("/// @Summary {}\n", spec.summary));
    }
    if spec.auth {
        docs.push_str("/// @Security ApiKeyAuth\n");
    }
    docs.push_str(&format!(
        "/// @Param {} {} {} true \"request parameters\"\n",
        spec.handler_name,
        strategy.param_kind(&spec.method),
        binding.request_type
    ));
    docs.push_str(&format!("/// @Success 200 {{object}} {}\n", binding.response_type));
    docs.push_str("/// @Failure 400 {object} String\n");
    docs.push_str(&format!(
        "/// @Router {} [{}]\n",
        route_doc_path(group_path, &spec.path),
        spec.method.to_lowercase()
    ));
    docs
}

/// The call into the logic function: destructures as many outputs as the
/// function declares and reports the first one as the payload.
fn logic_call(logic: &GeneratedFunction, strategy: &impl BackendStrategy) -> String {
    let call = format!(
        "{}(req){}",
        logic.path(),
        if logic.is_async { ".await" } else { "" }
    );

    let (pattern, payload) = match logic.outputs.len() {
        0 => ("()".to_string(), "()"),
        1 => ("resp".to_string(), "resp"),
        n => (format!("(resp{})", ", _".repeat(n - 1)), "resp"),
    };

    if logic.fallible {
        format!(
            "    match {call} {{\n\
             \x20       Ok({pattern}) => {ok},\n\
             \x20       Err(err) => {fail},\n\
             \x20   }}\n",
            ok = strategy.success_response(payload),
            fail = strategy.failure_response("err"),
        )
    } else {
        format!(
            "    let {pattern} = {call};\n\
             \x20   {ok}\n",
            ok = strategy.success_response(payload),
        )
    }
}

fn import_block(imports: &[String]) -> String {
    let mut block = String::new();
    for import in imports {
        block.push_str(import.trim());
        block.push('\n');
    }
    if !block.is_empty() {
        block.push('\n');
    }
    block
}

/// Parses the filled template and extracts the function descriptor.
fn finish(source: String, module: &str) -> AppResult<Fragment> {
    let file = parse_source(&source, "generated fragment")?;
    let function = file
        .items()
        .find_map(|item| match item {
            ast::Item::Fn(f) => GeneratedFunction::from_fn(module, &f),
            _ => None,
        })
        .ok_or_else(|| AppError::General("Generated fragment contains no function".into()))?;

    Ok(Fragment { source, function })
}
