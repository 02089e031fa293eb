//! Tree reconstruction with placeholder substitution
//!
//! Output is rebuilt from the parse tree rather than by text replacement:
//! every placeholder node is substituted independently, and everything else is
//! replayed verbatim from the source buffer. Bytes between sibling spans
//! (inline operators, punctuation, unmodeled gaps) are spliced back by offset
//! arithmetic, so structure outside placeholder spans is reproduced exactly,
//! even when the same variable appears twice with different filter chains.

use crate::error::PrepareError;
use crate::grammar::placeholder::PLACEHOLDER_RULE;
use crate::parser::{NodeId, ParseTree};
use crate::template::binding::{Bindings, Value, VariableType};
use crate::template::extract::decode_placeholder;
use crate::template::filters::FilterRegistry;

/// Rebuild the template text, substituting every placeholder
///
/// Fail-fast: the first missing or malformed binding (or unknown filter)
/// aborts with no partial output.
pub fn prepare(
    tree: &ParseTree,
    bindings: &Bindings,
    filters: &FilterRegistry,
) -> Result<String, PrepareError> {
    let mut out = String::with_capacity(tree.source().len());
    rebuild(tree, tree.root(), bindings, filters, &mut out)?;
    Ok(out)
}

fn rebuild(
    tree: &ParseTree,
    node: NodeId,
    bindings: &Bindings,
    filters: &FilterRegistry,
    out: &mut String,
) -> Result<(), PrepareError> {
    if tree.kind(node) == PLACEHOLDER_RULE {
        out.push_str(&compute_replacement(tree, node, bindings, filters)?);
        return Ok(());
    }

    let children = tree.children(node);
    if children.is_empty() {
        out.push_str(tree.text(node));
        return Ok(());
    }

    let source = tree.source();
    let span = tree.span(node);
    let mut cursor = span.start;
    for &child in children {
        let child_span = tree.span(child);
        out.push_str(&source[cursor..child_span.start]);
        rebuild(tree, child, bindings, filters, out)?;
        cursor = child_span.end;
    }
    out.push_str(&source[cursor..span.end]);
    Ok(())
}

/// Compute the literal text substituted for one placeholder occurrence
pub(crate) fn compute_replacement(
    tree: &ParseTree,
    node: NodeId,
    bindings: &Bindings,
    filters: &FilterRegistry,
) -> Result<String, PrepareError> {
    let placeholder = decode_placeholder(tree, node);

    let binding = bindings
        .get(&placeholder.name)
        .ok_or_else(|| PrepareError::MissingBinding {
            name: placeholder.name.clone(),
        })?;
    let declared = binding
        .declared_type
        .as_deref()
        .ok_or_else(|| PrepareError::MissingType {
            name: placeholder.name.clone(),
        })?;
    let variable_type =
        VariableType::from_name(declared).ok_or_else(|| PrepareError::InvalidType {
            name: placeholder.name.clone(),
            declared: declared.to_string(),
        })?;

    if placeholder.filters.is_empty() {
        return Ok(format_typed(&binding.value, variable_type));
    }

    // Filters run left to right; after the chain the result is plain string
    // coercion, with no type-directed quoting on top.
    let mut value = binding.value.clone();
    for invocation in &placeholder.filters {
        let filter = filters
            .get(&invocation.name)
            .ok_or_else(|| PrepareError::UnknownFilter {
                name: invocation.name.clone(),
            })?;
        value = filter(value, &invocation.args).map_err(|e| PrepareError::Filter {
            filter: invocation.name.clone(),
            variable: placeholder.name.clone(),
            message: e.0,
        })?;
    }
    Ok(value.coerce_string())
}

/// Format an unfiltered value according to its declared type
fn format_typed(value: &Value, variable_type: VariableType) -> String {
    match variable_type {
        VariableType::String => quote_string(&value.coerce_string()),
        VariableType::Number | VariableType::Boolean => value.coerce_string(),
        _ => value.coerce_string(),
    }
}

/// Double-quote a string, escaping backslashes before quotes so already
/// escaped backslashes are not escaped twice
fn quote_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}
