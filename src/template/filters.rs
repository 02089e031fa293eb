//! Filter registry
//!
//! Filters are named pure functions applied to a bound value before it is
//! substituted, chained left to right. The registry is plain shared state with
//! no internal synchronization: register filters during initialization, before
//! handing the parser to concurrent callers. A filter registered after a
//! template was parsed is still honored by `prepare` (lookup is late-bound).

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use super::binding::Value;

/// Failure reported by a filter function
#[derive(Debug, Error)]
#[error("{0}")]
pub struct FilterError(pub String);

/// A registered filter: bound value in, transformed value out
///
/// The argument slice carries literal arguments written in the template, e.g.
/// the fallback in `${NAME|default("n/a")}`.
pub type FilterFn = Arc<dyn Fn(Value, &[Value]) -> Result<Value, FilterError> + Send + Sync>;

/// Mutable name-to-function mapping, prepopulated with the builtin filters
#[derive(Clone)]
pub struct FilterRegistry {
    filters: HashMap<String, FilterFn>,
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.filters.keys().collect();
        names.sort();
        f.debug_struct("FilterRegistry").field("filters", &names).finish()
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl FilterRegistry {
    /// Empty registry, useful for injecting fakes in tests
    pub fn empty() -> Self {
        Self {
            filters: HashMap::new(),
        }
    }

    /// Registry with the builtin filter set
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("string", |v, _| Ok(Value::String(v.coerce_string())));
        registry.register("upper", |v, _| {
            Ok(Value::String(v.coerce_string().to_uppercase()))
        });
        registry.register("lower", |v, _| {
            Ok(Value::String(v.coerce_string().to_lowercase()))
        });
        registry.register("capitalize", |v, _| {
            let s = v.coerce_string();
            let mut chars = s.chars();
            let capitalized = match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => s,
            };
            Ok(Value::String(capitalized))
        });
        registry.register("title", |v, _| {
            let s = v.coerce_string();
            let mut out = String::with_capacity(s.len());
            let mut at_word_start = true;
            for c in s.chars() {
                if at_word_start && c.is_alphabetic() {
                    out.extend(c.to_uppercase());
                } else {
                    out.extend(c.to_lowercase());
                }
                at_word_start = !c.is_alphanumeric();
            }
            Ok(Value::String(out))
        });
        registry.register("trim", |v, _| {
            Ok(Value::String(v.coerce_string().trim().to_string()))
        });
        registry.register("number", |v, _| {
            v.coerce_number().map(Value::Number).ok_or_else(|| {
                FilterError(format!("cannot convert '{}' to a number", v))
            })
        });
        registry.register("boolean", |v, _| match &v {
            Value::Bool(_) => Ok(v),
            Value::Number(n) => Ok(Value::Bool(*n != 0.0)),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(Value::Bool(true)),
                "false" | "0" | "no" | "" => Ok(Value::Bool(false)),
                other => Err(FilterError(format!(
                    "cannot convert '{}' to a boolean",
                    other
                ))),
            },
        });
        registry.register("abs", numeric_filter("abs", f64::abs));
        registry.register("round", numeric_filter("round", f64::round));
        registry.register("floor", numeric_filter("floor", f64::floor));
        registry.register("ceil", numeric_filter("ceil", f64::ceil));
        registry.register("default", |v, args| {
            let is_empty = matches!(&v, Value::String(s) if s.is_empty());
            if is_empty {
                Ok(args.first().cloned().unwrap_or(Value::String(String::new())))
            } else {
                Ok(v)
            }
        });
        registry
    }

    /// Register a filter, replacing any existing one of the same name
    pub fn register<F>(&mut self, name: impl Into<String>, filter: F)
    where
        F: Fn(Value, &[Value]) -> Result<Value, FilterError> + Send + Sync + 'static,
    {
        self.filters.insert(name.into(), Arc::new(filter));
    }

    pub fn get(&self, name: &str) -> Option<&FilterFn> {
        self.filters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(|s| s.as_str())
    }
}

fn numeric_filter(
    name: &'static str,
    op: fn(f64) -> f64,
) -> impl Fn(Value, &[Value]) -> Result<Value, FilterError> {
    move |v, _| {
        v.coerce_number().map(|n| Value::Number(op(n))).ok_or_else(|| {
            FilterError(format!("filter '{}' needs a numeric value, got '{}'", name, v))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(name: &str, value: Value) -> Value {
        apply_args(name, value, &[])
    }

    fn apply_args(name: &str, value: Value, args: &[Value]) -> Value {
        let registry = FilterRegistry::with_builtins();
        let filter = registry.get(name).expect("builtin should exist");
        filter(value, args).expect("filter should succeed")
    }

    #[test]
    fn test_builtins_present() {
        let registry = FilterRegistry::with_builtins();
        for name in [
            "string", "upper", "lower", "capitalize", "title", "trim", "number", "boolean",
            "abs", "round", "floor", "ceil", "default",
        ] {
            assert!(registry.contains(name), "missing builtin {}", name);
        }
    }

    #[test]
    fn test_case_filters() {
        assert_eq!(apply("upper", "hello".into()), Value::from("HELLO"));
        assert_eq!(apply("lower", "HeLLo".into()), Value::from("hello"));
        assert_eq!(apply("capitalize", "hELLO".into()), Value::from("Hello"));
        assert_eq!(
            apply("title", "hello  there world".into()),
            Value::from("Hello  There World")
        );
    }

    #[test]
    fn test_trim_and_string() {
        assert_eq!(apply("trim", "  x  ".into()), Value::from("x"));
        assert_eq!(apply("string", Value::Number(4.0)), Value::from("4"));
    }

    #[test]
    fn test_numeric_filters() {
        assert_eq!(apply("number", "42".into()), Value::Number(42.0));
        assert_eq!(apply("abs", Value::Number(-3.0)), Value::Number(3.0));
        assert_eq!(apply("round", Value::Number(2.6)), Value::Number(3.0));
        assert_eq!(apply("floor", Value::Number(2.6)), Value::Number(2.0));
        assert_eq!(apply("ceil", Value::Number(2.1)), Value::Number(3.0));
    }

    #[test]
    fn test_number_filter_rejects_garbage() {
        let registry = FilterRegistry::with_builtins();
        let filter = registry.get("number").expect("builtin should exist");
        assert!(filter("abc".into(), &[]).is_err());
    }

    #[test]
    fn test_boolean_filter() {
        assert_eq!(apply("boolean", "Yes".into()), Value::Bool(true));
        assert_eq!(apply("boolean", "0".into()), Value::Bool(false));
        assert_eq!(apply("boolean", Value::Number(2.0)), Value::Bool(true));
    }

    #[test]
    fn test_default_filter() {
        assert_eq!(
            apply_args("default", "".into(), &[Value::from("n/a")]),
            Value::from("n/a")
        );
        assert_eq!(
            apply_args("default", "set".into(), &[Value::from("n/a")]),
            Value::from("set")
        );
        // No argument falls back to the empty string
        assert_eq!(apply("default", "".into()), Value::from(""));
    }

    #[test]
    fn test_register_overrides() {
        let mut registry = FilterRegistry::with_builtins();
        registry.register("upper", |_, _| Ok(Value::from("fixed")));
        let filter = registry.get("upper").expect("should exist");
        assert_eq!(filter("x".into(), &[]).unwrap(), Value::from("fixed"));
    }
}
