//! Advisory validation of bindings against a parsed template
//!
//! `validate` never raises; it collects every problem into a list so
//! interactive callers can report them in one pass. The strict counterpart is
//! `prepare`, which stops at the first offense and also requires a declared
//! type on every binding it substitutes.

use crate::parser::{NodeId, ParseTree};
use crate::template::binding::{Bindings, VariableType};
use crate::template::extract::extract_variables;

/// Outcome of a validation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Cross-check extracted variables against the binding map
///
/// A missing declared type is accepted here; an unknown declared type is not.
pub fn validate(tree: &ParseTree, bindings: &Bindings) -> Validation {
    let mut errors = Vec::new();

    for variable in extract_variables(tree) {
        match bindings.get(&variable.name) {
            None => errors.push(format!("variable '{}' was not provided", variable.name)),
            Some(binding) => {
                if let Some(declared) = &binding.declared_type {
                    if VariableType::from_name(declared).is_none() {
                        errors.push(format!(
                            "variable '{}' has invalid type: {}",
                            variable.name, declared
                        ));
                    }
                }
            }
        }
    }

    Validation {
        valid: errors.is_empty(),
        errors,
    }
}

/// Node kinds a value of the declared type may legally occupy
fn allowed_kinds(declared_type: &str) -> Option<&'static [&'static str]> {
    let kinds: &[&str] = match declared_type {
        // `sum` covers string concatenation
        "string" => &["string", "sum"],
        "number" => &["number", "sum", "product", "unary"],
        "boolean" => &["boolean", "or_expr", "and_expr", "not_expr", "comparison"],
        "object" => &["path"],
        "time period" | "time value" => &["string", "number"],
        "string array" | "number array" | "boolean array" | "object array" => &["array"],
        _ => return None,
    };
    Some(kinds)
}

/// Check that a node is a syntactically compatible position for a value of
/// the declared type
///
/// Pure lookup; returns false for a missing node, an unknown node kind, or an
/// unknown declared type. Never raises.
pub fn validate_variable_node(tree: &ParseTree, node: Option<NodeId>, declared_type: &str) -> bool {
    let Some(node) = node else {
        return false;
    };
    match allowed_kinds(declared_type) {
        Some(kinds) => kinds.contains(&tree.kind(node)),
        None => false,
    }
}
