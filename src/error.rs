//! Error types for grammar composition, parsing, and substitution

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Errors raised while building or composing a rule set
#[derive(Debug, Error)]
pub enum GrammarError {
    /// A terminal pattern failed to compile
    #[error("invalid pattern in rule '{rule}': {message}")]
    InvalidPattern { rule: String, message: String },

    /// A symbol references a rule that is not in the set
    #[error("reference to undefined rule: {name}")]
    UndefinedRule { name: String },

    /// The same rule name appears twice within one rule list
    #[error("duplicate rule definition: {name}")]
    DuplicateRule { name: String },
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl ParseError {
    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        match self {
            ParseError::Syntax {
                span,
                message,
                expected,
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };

                Report::build(ReportKind::Error, filename, span.start)
                    .with_message(message)
                    .with_label(
                        Label::new((filename, span.clone()))
                            .with_message(format!("{}{}", message, expected_str))
                            .with_color(Color::Red),
                    )
                    .finish()
                    .write((filename, Source::from(source)), &mut buf)
                    .expect("report rendering to a Vec cannot fail");
            }
        }
        String::from_utf8(buf).expect("ariadne output is utf-8")
    }

    /// Span of the failure within the parsed text
    pub fn span(&self) -> Span {
        match self {
            ParseError::Syntax { span, .. } => span.clone(),
        }
    }
}

/// Errors raised by `prepare` while substituting placeholders
///
/// These are fail-fast: the first offending placeholder aborts the whole
/// rebuild, so a template with one bad binding produces no output at all.
#[derive(Debug, Error)]
pub enum PrepareError {
    /// No binding was supplied for a placeholder
    #[error("no binding provided for variable: {name}")]
    MissingBinding { name: String },

    /// The binding exists but carries no declared type
    #[error("binding for variable {name} is missing a declared type")]
    MissingType { name: String },

    /// The declared type is not a member of the variable type set
    #[error("binding for variable {name} has invalid type: {declared}")]
    InvalidType { name: String, declared: String },

    /// A filter named in the template is not registered
    #[error("unknown filter: {name}")]
    UnknownFilter { name: String },

    /// A registered filter rejected the value it was given
    #[error("filter '{filter}' failed for variable {variable}: {message}")]
    Filter {
        filter: String,
        variable: String,
        message: String,
    },
}
