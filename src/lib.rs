//! rule-template - placeholder substitution for domain rule expressions
//!
//! Parses rule expressions containing `${NAME}` or `${NAME|filter1|filter2}`
//! placeholders, exposes the placeholders for introspection and validation,
//! and rebuilds the rule text with typed values substituted in. Substitution
//! is tree-driven: the template is parsed with a placeholder-extended grammar
//! and the output is reconstructed node by node, so everything outside a
//! placeholder span survives byte for byte.
//!
//! # Example
//!
//! ```rust
//! use rule_template::{Binding, Bindings, TemplateParser};
//!
//! let parser = TemplateParser::new();
//! let template = parser.parse("EventIs(${E}) && ${N} > 10").unwrap();
//!
//! let bindings = Bindings::from([
//!     ("E".to_string(), Binding::string("start")),
//!     ("N".to_string(), Binding::number(42.0)),
//! ]);
//! let resolved = parser.prepare(&template, &bindings).unwrap();
//! assert_eq!(resolved, r#"EventIs("start") && 42 > 10"#);
//! ```

pub mod error;
pub mod grammar;
pub mod parser;
pub mod template;

pub use error::{GrammarError, ParseError, PrepareError};
pub use parser::{NodeId, ParseTree, Parser};
pub use template::{
    extract_variables, validate_variable_node, Binding, Bindings, ExtractedVariable, FilterError,
    FilterRegistry, Validation, Value, VariableType,
};

use thiserror::Error;

use grammar::host;

/// Errors from the end-to-end convenience path
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Error while parsing the template text
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error while substituting bindings
    #[error("prepare error: {0}")]
    Prepare(#[from] PrepareError),
}

/// A successfully parsed template, ready for extraction and substitution
#[derive(Debug, Clone)]
pub struct ParsedTemplate {
    tree: ParseTree,
}

impl ParsedTemplate {
    /// The parsed text (input trimmed of leading/trailing whitespace)
    pub fn text(&self) -> &str {
        self.tree.source()
    }

    pub fn tree(&self) -> &ParseTree {
        &self.tree
    }
}

/// Entry point: parser pair plus the filter registry used for substitution
///
/// Holds one parser over the placeholder-extended grammar and one over the
/// bare host grammar (for re-checking resolved output). Both are bound to
/// process-wide rule sets built on first use, so constructing this is cheap.
#[derive(Debug, Clone)]
pub struct TemplateParser {
    template_parser: Parser,
    host_parser: Parser,
    filters: FilterRegistry,
}

impl Default for TemplateParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateParser {
    pub fn new() -> Self {
        Self {
            template_parser: Parser::new(grammar::composed_set()),
            host_parser: Parser::new(grammar::host_set()),
            filters: FilterRegistry::with_builtins(),
        }
    }

    /// Use a caller-supplied filter registry instead of the builtins
    pub fn with_filters(filters: FilterRegistry) -> Self {
        Self {
            filters,
            ..Self::new()
        }
    }

    /// Parse template text into a tree, placeholders included
    ///
    /// Input is trimmed before parsing; spans in the result index into the
    /// trimmed text.
    pub fn parse(&self, text: &str) -> Result<ParsedTemplate, ParseError> {
        let tree = self.template_parser.parse(text.trim(), host::ENTRY_RULE)?;
        Ok(ParsedTemplate { tree })
    }

    /// All variables in the template, grouped by name in first-seen order
    pub fn extract_variables(&self, template: &ParsedTemplate) -> Vec<ExtractedVariable> {
        template::extract_variables(&template.tree)
    }

    /// Non-throwing pre-check: collect every binding problem as data
    pub fn validate(&self, template: &ParsedTemplate, bindings: &Bindings) -> Validation {
        template::validate(&template.tree, bindings)
    }

    /// Substitute bindings into the template, producing the resolved rule text
    pub fn prepare(
        &self,
        template: &ParsedTemplate,
        bindings: &Bindings,
    ) -> Result<String, PrepareError> {
        template::prepare(&template.tree, bindings, &self.filters)
    }

    /// Re-parse resolved text against the unextended host grammar
    ///
    /// Confirms a `prepare` result is a syntactically valid rule on its own,
    /// with no placeholder productions in play.
    pub fn check_resolved(&self, text: &str) -> Result<(), ParseError> {
        self.host_parser.parse(text.trim(), host::ENTRY_RULE)?;
        Ok(())
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    /// Mutable access for registering custom filters
    ///
    /// Register before sharing the parser across threads; lookups are not
    /// synchronized against concurrent registration.
    pub fn filters_mut(&mut self) -> &mut FilterRegistry {
        &mut self.filters
    }
}

/// Parse and substitute in one step with the builtin filters
pub fn prepare(text: &str, bindings: &Bindings) -> Result<String, TemplateError> {
    let parser = TemplateParser::new();
    let template = parser.parse(text)?;
    Ok(parser.prepare(&template, bindings)?)
}
