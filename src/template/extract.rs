//! Placeholder decoding and variable extraction

use std::collections::HashMap;

use crate::error::Span;
use crate::grammar::placeholder::{FILTER_ARG_RULE, FILTER_CALL_RULE, PLACEHOLDER_RULE};
use crate::parser::{NodeId, ParseTree};
use crate::template::binding::Value;

/// One variable extracted from a parsed template
///
/// `filters` come from the variable's first occurrence only; every occurrence
/// contributes a position. `prepare` evaluates each occurrence's own chain
/// regardless, so this field is reporting, not substitution input.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedVariable {
    pub name: String,
    pub filters: Vec<String>,
    pub positions: Vec<Span>,
}

/// One filter invocation inside a placeholder, with decoded literal arguments
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FilterInvocation {
    pub name: String,
    pub args: Vec<Value>,
}

/// Fully decoded placeholder occurrence
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Placeholder {
    pub name: String,
    pub filters: Vec<FilterInvocation>,
    pub span: Span,
}

/// Decode a placeholder node into its name, filter chain, and span
///
/// The caller guarantees `id` is a placeholder node; the children are then
/// fixed by the grammar (one path, zero or more filter calls).
pub(crate) fn decode_placeholder(tree: &ParseTree, id: NodeId) -> Placeholder {
    let name = tree
        .find_child(id, "path")
        .map(|p| tree.text(p).trim().to_string())
        .unwrap_or_default();

    let filters = tree
        .children_of_kind(id, FILTER_CALL_RULE)
        .map(|call| FilterInvocation {
            name: tree
                .find_child(call, "ident")
                .map(|i| tree.text(i).to_string())
                .unwrap_or_default(),
            args: decode_filter_args(tree, call),
        })
        .collect();

    Placeholder {
        name,
        filters,
        span: tree.span(id),
    }
}

fn decode_filter_args(tree: &ParseTree, call: NodeId) -> Vec<Value> {
    let Some(args) = tree.find_child(call, "filter_args") else {
        return Vec::new();
    };
    tree.children_of_kind(args, FILTER_ARG_RULE)
        .filter_map(|arg| tree.children(arg).first().copied())
        .map(|atom| match tree.kind(atom) {
            "string" => Value::String(unescape_string(tree.text(atom))),
            "number" => Value::Number(tree.text(atom).parse().unwrap_or(f64::NAN)),
            "boolean" => Value::Bool(tree.text(atom) == "true"),
            // Bareword argument, carried as its text
            _ => Value::String(tree.text(atom).to_string()),
        })
        .collect()
}

/// Strip quotes and process backslash escapes of a string atom
pub(crate) fn unescape_string(literal: &str) -> String {
    let inner = &literal[1..literal.len().saturating_sub(1)];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Collect all variables in the tree, grouped by name
///
/// Pre-order traversal, so positions are in left-to-right source order and
/// group order is first-seen order. Returns an empty list when the template
/// has no placeholders.
pub fn extract_variables(tree: &ParseTree) -> Vec<ExtractedVariable> {
    let mut variables: Vec<ExtractedVariable> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for node in tree.preorder() {
        if tree.kind(node) != PLACEHOLDER_RULE {
            continue;
        }
        let placeholder = decode_placeholder(tree, node);
        match by_name.get(&placeholder.name) {
            Some(&i) => variables[i].positions.push(placeholder.span),
            None => {
                by_name.insert(placeholder.name.clone(), variables.len());
                variables.push(ExtractedVariable {
                    name: placeholder.name,
                    filters: placeholder.filters.into_iter().map(|f| f.name).collect(),
                    positions: vec![placeholder.span],
                });
            }
        }
    }

    variables
}
