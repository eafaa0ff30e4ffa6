//! Tokenizer turning one raw WHOIS response into a [`NodeTree`]
//!
//! Tokenization is a single deterministic pass: every line is offered to the
//! grammar's rules top to bottom and the first match decides what happens to
//! it. Lines no rule claims are kept under [`UNPARSED_KEY`], so nothing in the
//! input is silently lost and malformed input never makes tokenization fail.

pub mod grammar;
pub mod node;

use regex::Captures;
use tracing::trace;

pub use grammar::{ Action, Grammar, GrammarBuilder, KeySource, Rule };
pub use node::{ DuplicateMode, NodeTree, NodeValue };

/// Catch-all key for lines no rule matched
pub const UNPARSED_KEY: &str = "unparsed";
/// Diagnostic key set when the server refused to answer because of rate limits
pub const THROTTLED_KEY: &str = "response:throttled";
/// Diagnostic key set when the server answered with an error
pub const ERROR_KEY: &str = "response:error";
/// Diagnostic key set when the response was cut short
pub const INCOMPLETE_KEY: &str = "response:incomplete";
/// Diagnostic key set when the server reported itself unavailable
pub const UNAVAILABLE_KEY: &str = "response:unavailable";

/// Tokenize `raw` with `grammar`. Never fails.
pub fn tokenize(raw: &str, grammar: &Grammar) -> NodeTree {
    let content = raw.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = content.lines().map(str::trim_end).collect();

    let mut tree = NodeTree::new();
    let mut cursor = 0;
    scan(&lines, &mut cursor, grammar, &mut tree, None);
    trace!("Tokenized {} lines into {} nodes", lines.len(), tree.len());
    tree
}

fn scan(lines: &[&str], cursor: &mut usize, grammar: &Grammar, tree: &mut NodeTree, end: Option<&regex::Regex>) {
    while *cursor < lines.len() {
        let line = lines[*cursor];
        *cursor += 1;

        if end.is_some_and(|end| end.is_match(line)) {
            return;
        }

        let Some(rule) = grammar.first_match(line) else {
            if !line.trim().is_empty() {
                tree.insert(UNPARSED_KEY.to_string(), NodeValue::Scalar(line.trim().to_string()), DuplicateMode::Append);
            }
            continue;
        };

        match &rule.action {
            Action::Skip => {}
            Action::Assign { key, mode } => {
                let captures = rule.pattern.captures(line);
                let Some(key) = resolve_key(key, captures.as_ref()) else {
                    continue;
                };
                let value = captured_value(captures.as_ref(), line);
                let mode = grammar.mode_for(&key, *mode);
                tree.insert(key, NodeValue::Scalar(value), mode);
            }
            Action::Block { key, end, body, include_start } => {
                let captures = rule.pattern.captures(line);
                let mut group = NodeTree::new();
                if *include_start {
                    let mut start = 0;
                    scan(&[line], &mut start, body, &mut group, None);
                }
                scan(lines, cursor, body, &mut group, Some(end));

                let key = match key {
                    KeySource::Field { field, fallback } => match group.scalar(field) {
                        Some(value) => Some(value.to_string()),
                        None => Some(unused_key(tree, fallback)),
                    },
                    other => resolve_key(other, captures.as_ref()),
                };
                if let Some(key) = key {
                    let mode = grammar.mode_for(&key, None);
                    tree.insert(key, NodeValue::Group(group), mode);
                }
            }
        }
    }
}

fn resolve_key(source: &KeySource, captures: Option<&Captures>) -> Option<String> {
    match source {
        KeySource::Fixed(key) => Some(key.clone()),
        KeySource::Captured => captures
            .and_then(|caps| caps.name("key"))
            .map(|key| key.as_str().trim().to_string())
            .filter(|key| !key.is_empty()),
        // Only blocks know their own fields
        KeySource::Field { fallback, .. } => Some(fallback.clone()),
    }
}

/// `fallback`, or `fallback#2`, `fallback#3`... so that blocks without an
/// identifying field stay separate
fn unused_key(tree: &NodeTree, fallback: &str) -> String {
    if !tree.contains(fallback) {
        return fallback.to_string();
    }
    (2..)
        .map(|n| format!("{}#{}", fallback, n))
        .find(|key| !tree.contains(key))
        .unwrap_or_else(|| fallback.to_string())
}

fn captured_value(captures: Option<&Captures>, line: &str) -> String {
    captures
        .and_then(|caps| caps.name("value").or_else(|| caps.get(1)))
        .map(|value| value.as_str())
        .unwrap_or(line)
        .trim()
        .to_string()
}
