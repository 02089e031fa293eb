//! Grammar rules as data
//!
//! A grammar is an ordered list of named rules. Each rule is either a terminal
//! (matched directly against source text) or an ordered list of alternative
//! symbol sequences interpreted PEG-style: the first alternative that matches
//! wins, and there is no backtracking past a committed alternative.
//!
//! Rule sets are immutable once built. Composing an extension into a host
//! grammar produces a new rule set and leaves the host untouched.

use std::collections::HashMap;

use regex::Regex;

use crate::error::GrammarError;

/// How a terminal consumes source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Exact text
    Literal(String),
    /// Exact text that must not be followed by an identifier character,
    /// so `and` matches in `a and b` but not in `android`
    Keyword(String),
    /// Regular expression, anchored at the current position
    Pattern(String),
}

/// One element of an alternative sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    /// Reference to another rule by name; a match produces a child node
    Rule(String),
    /// Inline terminal; consumes text without producing a node
    Term(Matcher),
    /// Zero or one occurrence
    Opt(Box<Symbol>),
    /// Zero or more occurrences
    Star(Box<Symbol>),
    /// One or more occurrences
    Plus(Box<Symbol>),
    /// Inline sequence, used to quantify multi-symbol units
    Group(Vec<Symbol>),
}

/// Body of a grammar rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleBody {
    Terminal(Matcher),
    /// Ordered alternatives; each alternative is a symbol sequence
    Choice(Vec<Vec<Symbol>>),
}

/// A single named production rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub body: RuleBody,
}

impl Rule {
    pub fn terminal(name: impl Into<String>, matcher: Matcher) -> Self {
        Self {
            name: name.into(),
            body: RuleBody::Terminal(matcher),
        }
    }

    pub fn choice(name: impl Into<String>, alternatives: Vec<Vec<Symbol>>) -> Self {
        Self {
            name: name.into(),
            body: RuleBody::Choice(alternatives),
        }
    }
}

// Short constructors used by the grammar definitions. Grammars written as
// plain data get unreadable fast without these.
pub fn r(name: &str) -> Symbol {
    Symbol::Rule(name.to_string())
}

pub fn lit(text: &str) -> Symbol {
    Symbol::Term(Matcher::Literal(text.to_string()))
}

pub fn kw(text: &str) -> Symbol {
    Symbol::Term(Matcher::Keyword(text.to_string()))
}

pub fn opt(sym: Symbol) -> Symbol {
    Symbol::Opt(Box::new(sym))
}

pub fn star(sym: Symbol) -> Symbol {
    Symbol::Star(Box::new(sym))
}

pub fn group(syms: Vec<Symbol>) -> Symbol {
    Symbol::Group(syms)
}

/// A validated, immutable collection of grammar rules
///
/// Construction checks for duplicate names and dangling rule references and
/// compiles every terminal pattern once, so the parser never touches `Regex`
/// compilation on the hot path.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    index: HashMap<String, usize>,
    patterns: HashMap<String, Regex>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Result<Self, GrammarError> {
        let mut index = HashMap::new();
        for (i, rule) in rules.iter().enumerate() {
            if index.insert(rule.name.clone(), i).is_some() {
                return Err(GrammarError::DuplicateRule {
                    name: rule.name.clone(),
                });
            }
        }

        let mut set = Self {
            rules,
            index,
            patterns: HashMap::new(),
        };
        set.validate_and_compile()?;
        Ok(set)
    }

    fn validate_and_compile(&mut self) -> Result<(), GrammarError> {
        let mut patterns = HashMap::new();
        for rule in &self.rules {
            match &rule.body {
                RuleBody::Terminal(m) => {
                    compile_matcher(&rule.name, m, &mut patterns)?;
                }
                RuleBody::Choice(alts) => {
                    for alt in alts {
                        for sym in alt {
                            check_symbol(&rule.name, sym, &self.index, &mut patterns)?;
                        }
                    }
                }
            }
        }
        self.patterns = patterns;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.index.get(name).map(|&i| &self.rules[i])
    }

    pub fn rule_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn rule_at(&self, index: usize) -> &Rule {
        &self.rules[index]
    }

    pub fn name_at(&self, index: usize) -> &str {
        &self.rules[index].name
    }

    /// Compiled regex for a `Matcher::Pattern`, keyed by pattern text
    pub(crate) fn pattern(&self, text: &str) -> &Regex {
        &self.patterns[text]
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn check_symbol(
    rule: &str,
    sym: &Symbol,
    index: &HashMap<String, usize>,
    patterns: &mut HashMap<String, Regex>,
) -> Result<(), GrammarError> {
    match sym {
        Symbol::Rule(name) => {
            if !index.contains_key(name) {
                return Err(GrammarError::UndefinedRule { name: name.clone() });
            }
        }
        Symbol::Term(m) => compile_matcher(rule, m, patterns)?,
        Symbol::Opt(inner) | Symbol::Star(inner) | Symbol::Plus(inner) => {
            check_symbol(rule, inner, index, patterns)?
        }
        Symbol::Group(syms) => {
            for s in syms {
                check_symbol(rule, s, index, patterns)?;
            }
        }
    }
    Ok(())
}

fn compile_matcher(
    rule: &str,
    matcher: &Matcher,
    patterns: &mut HashMap<String, Regex>,
) -> Result<(), GrammarError> {
    if let Matcher::Pattern(text) = matcher {
        if !patterns.contains_key(text) {
            let anchored = format!(r"\A(?:{})", text);
            let compiled = Regex::new(&anchored).map_err(|e| GrammarError::InvalidPattern {
                rule: rule.to_string(),
                message: e.to_string(),
            })?;
            patterns.insert(text.clone(), compiled);
        }
    }
    Ok(())
}

/// Merge an extension rule list into a host rule set
///
/// Extension rules replace host rules of the same name (so an extension can
/// override shared terminals like whitespace) and are appended otherwise.
/// After merging, `entry` is spliced in as one more alternative of the
/// `insertion_point` rule, which makes the extension reachable everywhere the
/// host accepts that production. A missing or terminal insertion point is not
/// an error: the extension rules are still merged, they are just only
/// reachable through whatever alternatives reference them explicitly.
///
/// The host set is not mutated; the result is a freshly validated set.
pub fn compose(
    host: &RuleSet,
    extension: &[Rule],
    insertion_point: &str,
    entry: &str,
) -> Result<RuleSet, GrammarError> {
    let mut merged: Vec<Rule> = host.rules.clone();

    for ext in extension {
        match merged.iter_mut().find(|r| r.name == ext.name) {
            Some(existing) => *existing = ext.clone(),
            None => merged.push(ext.clone()),
        }
    }

    if let Some(target) = merged.iter_mut().find(|r| r.name == insertion_point) {
        if let RuleBody::Choice(alts) = &mut target.body {
            alts.push(vec![Symbol::Rule(entry.to_string())]);
        }
    }

    RuleSet::new(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_host() -> RuleSet {
        RuleSet::new(vec![
            Rule::choice("value", vec![vec![r("number")]]),
            Rule::terminal("number", Matcher::Pattern(r"\d+".into())),
        ])
        .expect("host should build")
    }

    #[test]
    fn test_duplicate_rule_rejected() {
        let result = RuleSet::new(vec![
            Rule::terminal("a", Matcher::Literal("x".into())),
            Rule::terminal("a", Matcher::Literal("y".into())),
        ]);
        assert!(matches!(result, Err(GrammarError::DuplicateRule { .. })));
    }

    #[test]
    fn test_undefined_reference_rejected() {
        let result = RuleSet::new(vec![Rule::choice("a", vec![vec![r("missing")]])]);
        assert!(matches!(result, Err(GrammarError::UndefinedRule { .. })));
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let result = RuleSet::new(vec![Rule::terminal("a", Matcher::Pattern("[".into()))]);
        assert!(matches!(result, Err(GrammarError::InvalidPattern { .. })));
    }

    #[test]
    fn test_compose_appends_new_rules() {
        let host = tiny_host();
        let ext = vec![Rule::terminal("marker", Matcher::Literal("@".into()))];
        let composed = compose(&host, &ext, "value", "marker").expect("Should compose");

        assert!(composed.get("marker").is_some());
        // The value rule gained the extension alternative
        match &composed.get("value").unwrap().body {
            RuleBody::Choice(alts) => {
                assert_eq!(alts.len(), 2);
                assert_eq!(alts[1], vec![Symbol::Rule("marker".to_string())]);
            }
            _ => panic!("value should be a choice rule"),
        }
    }

    #[test]
    fn test_compose_replaces_by_name() {
        let host = tiny_host();
        let ext = vec![
            Rule::terminal("number", Matcher::Pattern(r"\d+\.\d+".into())),
            Rule::terminal("marker", Matcher::Literal("@".into())),
        ];
        let composed = compose(&host, &ext, "value", "marker").expect("Should compose");

        // Replaced in place, not appended
        assert_eq!(composed.len(), host.len() + 1);
        match &composed.get("number").unwrap().body {
            RuleBody::Terminal(Matcher::Pattern(p)) => assert_eq!(p, r"\d+\.\d+"),
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_compose_missing_insertion_point_degrades() {
        let host = tiny_host();
        let ext = vec![Rule::terminal("marker", Matcher::Literal("@".into()))];
        let composed = compose(&host, &ext, "no_such_rule", "marker").expect("Should compose");

        assert!(composed.get("marker").is_some());
        match &composed.get("value").unwrap().body {
            RuleBody::Choice(alts) => assert_eq!(alts.len(), 1),
            _ => panic!("value should be a choice rule"),
        }
    }

    #[test]
    fn test_compose_does_not_mutate_host() {
        let host = tiny_host();
        let ext = vec![Rule::terminal("marker", Matcher::Literal("@".into()))];
        compose(&host, &ext, "value", "marker").expect("Should compose");

        assert!(host.get("marker").is_none());
        match &host.get("value").unwrap().body {
            RuleBody::Choice(alts) => assert_eq!(alts.len(), 1),
            _ => panic!("value should be a choice rule"),
        }
    }
}
