//! Generic top-down parser over a rule set
//!
//! Interprets grammar rules as data: ordered-choice alternatives, quantified
//! symbols, and three terminal matchers. Failed alternatives roll the node
//! arena back to their entry mark, so only committed matches survive in the
//! finished tree. The furthest failure position and the terminals expected
//! there are tracked for diagnostics, which is what the surfaced `ParseError`
//! reports.

use std::sync::Arc;

use crate::error::ParseError;
use crate::grammar::{Matcher, RuleBody, RuleSet, Symbol};
use crate::parser::tree::{Node, NodeId, ParseTree};

/// Reusable parser bound to one rule set
#[derive(Debug, Clone)]
pub struct Parser {
    rules: Arc<RuleSet>,
}

impl Parser {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &Arc<RuleSet> {
        &self.rules
    }

    /// Parse `text` from the given entry production
    ///
    /// The whole input must be consumed; trailing unmatched text is an error
    /// reported at the furthest position any alternative reached.
    pub fn parse(&self, text: &str, entry: &str) -> Result<ParseTree, ParseError> {
        let entry_index = self.rules.rule_index(entry).ok_or_else(|| ParseError::Syntax {
            span: 0..0,
            message: format!("unknown entry production: {}", entry),
            expected: Vec::new(),
        })?;

        let mut run = Run {
            src: text,
            rules: &self.rules,
            nodes: Vec::new(),
            furthest: 0,
            expected: Vec::new(),
        };

        match run.match_rule(entry_index, 0) {
            Some((root, end)) if end == text.len() => Ok(ParseTree::new(
                text.to_string(),
                Arc::clone(&self.rules),
                run.nodes,
                root,
            )),
            Some((_, end)) => {
                // Matched a prefix; the leftover text is the problem
                let at = run.furthest.max(end);
                run.fail(at, "end of input".to_string());
                Err(run.into_error())
            }
            None => Err(run.into_error()),
        }
    }
}

struct Run<'a> {
    src: &'a str,
    rules: &'a RuleSet,
    nodes: Vec<Node>,
    furthest: usize,
    expected: Vec<String>,
}

impl<'a> Run<'a> {
    fn match_rule(&mut self, index: usize, pos: usize) -> Option<(NodeId, usize)> {
        let rules: &'a RuleSet = self.rules;
        let rule = rules.rule_at(index);
        match &rule.body {
            RuleBody::Terminal(matcher) => {
                let end = self.match_matcher(matcher, pos, Some(&rule.name))?;
                let id = self.push_node(index, pos, end, Vec::new());
                Some((id, end))
            }
            RuleBody::Choice(alternatives) => {
                for alt in alternatives {
                    let mark = self.nodes.len();
                    let mut children = Vec::new();
                    if let Some(end) = self.match_seq(alt, pos, &mut children) {
                        let id = self.push_node(index, pos, end, children);
                        return Some((id, end));
                    }
                    self.nodes.truncate(mark);
                }
                None
            }
        }
    }

    fn match_seq(
        &mut self,
        seq: &[Symbol],
        mut pos: usize,
        children: &mut Vec<NodeId>,
    ) -> Option<usize> {
        for sym in seq {
            pos = self.match_symbol(sym, pos, children)?;
        }
        Some(pos)
    }

    fn match_symbol(
        &mut self,
        sym: &Symbol,
        pos: usize,
        children: &mut Vec<NodeId>,
    ) -> Option<usize> {
        match sym {
            Symbol::Rule(name) => {
                let index = self.rules.rule_index(name)?;
                let (id, end) = self.match_rule(index, pos)?;
                children.push(id);
                Some(end)
            }
            Symbol::Term(matcher) => self.match_matcher(matcher, pos, None),
            Symbol::Opt(inner) => {
                let node_mark = self.nodes.len();
                let child_mark = children.len();
                match self.match_symbol(inner, pos, children) {
                    Some(end) => Some(end),
                    None => {
                        self.nodes.truncate(node_mark);
                        children.truncate(child_mark);
                        Some(pos)
                    }
                }
            }
            Symbol::Star(inner) => Some(self.match_repeated(inner, pos, children)),
            Symbol::Plus(inner) => {
                let end = self.match_symbol(inner, pos, children)?;
                Some(self.match_repeated(inner, end, children))
            }
            Symbol::Group(syms) => {
                let node_mark = self.nodes.len();
                let child_mark = children.len();
                match self.match_seq(syms, pos, children) {
                    Some(end) => Some(end),
                    None => {
                        self.nodes.truncate(node_mark);
                        children.truncate(child_mark);
                        None
                    }
                }
            }
        }
    }

    fn match_repeated(&mut self, inner: &Symbol, pos: usize, children: &mut Vec<NodeId>) -> usize {
        let mut cur = pos;
        loop {
            let node_mark = self.nodes.len();
            let child_mark = children.len();
            match self.match_symbol(inner, cur, children) {
                Some(end) if end > cur => cur = end,
                Some(_) => break, // zero-width match, would loop forever
                None => {
                    self.nodes.truncate(node_mark);
                    children.truncate(child_mark);
                    break;
                }
            }
        }
        cur
    }

    fn match_matcher(
        &mut self,
        matcher: &Matcher,
        pos: usize,
        rule_name: Option<&str>,
    ) -> Option<usize> {
        let rest = &self.src[pos..];
        let len = match matcher {
            Matcher::Literal(text) => {
                if rest.starts_with(text.as_str()) {
                    Some(text.len())
                } else {
                    None
                }
            }
            Matcher::Keyword(text) => {
                let boundary_ok = rest.strip_prefix(text.as_str()).is_some_and(|after| {
                    !after
                        .chars()
                        .next()
                        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
                });
                if boundary_ok {
                    Some(text.len())
                } else {
                    None
                }
            }
            Matcher::Pattern(pattern) => {
                // Pattern is compiled with a \A anchor at rule-set build time
                self.rules.pattern(pattern).find(rest).map(|m| m.end())
            }
        };

        match len {
            Some(len) => Some(pos + len),
            None => {
                let what = match (rule_name, matcher) {
                    (Some(name), _) => name.to_string(),
                    (None, Matcher::Literal(t)) | (None, Matcher::Keyword(t)) => {
                        format!("'{}'", t)
                    }
                    (None, Matcher::Pattern(p)) => p.clone(),
                };
                self.fail(pos, what);
                None
            }
        }
    }

    fn fail(&mut self, pos: usize, what: String) {
        if pos > self.furthest {
            self.furthest = pos;
            self.expected.clear();
        }
        if pos == self.furthest && !self.expected.contains(&what) {
            self.expected.push(what);
        }
    }

    fn push_node(&mut self, rule: usize, start: usize, end: usize, children: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            rule,
            start,
            end,
            children,
        });
        id
    }

    fn into_error(self) -> ParseError {
        let pos = self.furthest;
        let (message, span_end) = match self.src[pos..].chars().next() {
            Some(c) => (format!("unexpected '{}'", c), pos + c.len_utf8()),
            None => ("unexpected end of input".to_string(), pos),
        };
        ParseError::Syntax {
            span: pos..span_end,
            message,
            expected: self.expected,
        }
    }
}
