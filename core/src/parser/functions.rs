//! # Function Descriptors
//!
//! Signature information read back from generated (or already existing)
//! functions, used to wire a handler's call into its logic function.

use ra_ap_syntax::ast::{self, HasGenericArgs, HasName};
use ra_ap_syntax::AstNode;

/// Descriptor of a synthesized or located function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFunction {
    /// Module the function is referenced through (e.g. `logic`).
    pub module: String,
    /// Function name (e.g. `login_logic`).
    pub name: String,
    /// Ordered success values: the `Ok` type of a `Result` return, split
    /// when it is a tuple. Empty for `()`.
    pub outputs: Vec<String>,
    /// Whether the function returns a `Result`.
    pub fallible: bool,
    /// Whether calls must be awaited.
    pub is_async: bool,
}

impl GeneratedFunction {
    /// Reads the descriptor of `func` as referenced through `module`.
    pub fn from_fn(module: &str, func: &ast::Fn) -> Option<Self> {
        let name = func.name()?.text().to_string();
        let ret = func.ret_type().and_then(|r| r.ty());

        let (outputs, fallible) = match ret {
            None => (Vec::new(), false),
            Some(ty) => match result_ok_type(&ty) {
                Some(ok) => (split_tuple(&ok), true),
                None => (split_tuple(&ty), false),
            },
        };

        Some(Self {
            module: module.to_string(),
            name,
            outputs,
            fallible,
            is_async: func.async_token().is_some(),
        })
    }

    /// Qualified path used at call sites (`logic::login_logic`).
    pub fn path(&self) -> String {
        format!("{}::{}", self.module, self.name)
    }
}

/// Returns `T` for any `...Result<T, ..>` return type.
fn result_ok_type(ty: &ast::Type) -> Option<ast::Type> {
    let ast::Type::PathType(p) = ty else {
        return None;
    };
    let segment = p.path()?.segment()?;
    if segment.name_ref()?.text() != "Result" {
        return None;
    }
    segment
        .generic_arg_list()?
        .generic_args()
        .find_map(|arg| match arg {
            ast::GenericArg::TypeArg(t) => t.ty(),
            _ => None,
        })
}

fn split_tuple(ty: &ast::Type) -> Vec<String> {
    match ty {
        ast::Type::TupleType(t) => t.fields().map(|f| f.syntax().text().to_string()).collect(),
        other => vec![other.syntax().text().to_string()],
    }
}
