//! Grammar definitions and composition
//!
//! The host expression grammar and the placeholder extension are both plain
//! rule lists; `compose` merges them. The two default rule sets are built once
//! per process and shared behind `Arc`, which is what makes the cached parser
//! instances cheap to hand out.

pub mod host;
pub mod placeholder;
pub mod rules;

use std::sync::Arc;

use once_cell::sync::Lazy;

pub use rules::{compose, Matcher, Rule, RuleBody, RuleSet, Symbol};

static HOST_SET: Lazy<Arc<RuleSet>> = Lazy::new(|| {
    Arc::new(RuleSet::new(host::host_rules()).expect("builtin host grammar is well-formed"))
});

static COMPOSED_SET: Lazy<Arc<RuleSet>> = Lazy::new(|| {
    let composed = compose(
        &HOST_SET,
        &placeholder::placeholder_rules(),
        host::VALUE_RULE,
        placeholder::PLACEHOLDER_RULE,
    )
    .expect("builtin placeholder extension composes cleanly");
    Arc::new(composed)
});

/// The unextended host grammar, used to re-check resolved output
pub fn host_set() -> Arc<RuleSet> {
    Arc::clone(&HOST_SET)
}

/// Host grammar with the placeholder extension spliced into `value`
pub fn composed_set() -> Arc<RuleSet> {
    Arc::clone(&COMPOSED_SET)
}
