//! Template variables: bindings, filters, extraction, validation, substitution

pub mod binding;
pub mod extract;
pub mod filters;
pub mod prepare;
pub mod validate;

pub use binding::{Binding, Bindings, Value, VariableType};
pub use extract::{extract_variables, ExtractedVariable};
pub use filters::{FilterError, FilterFn, FilterRegistry};
pub use prepare::prepare;
pub use validate::{validate, validate_variable_node, Validation};
