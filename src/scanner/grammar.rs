//! Declarative line grammars for WHOIS text formats

use std::collections::HashMap;

use regex::Regex;

use super::node::DuplicateMode;

/// Where an assigned node gets its key from
#[derive(Debug, Clone)]
pub enum KeySource {
    /// Always the same key
    Fixed(String),
    /// The `key` capture group of the rule's pattern
    Captured,
    /// A field of the collected block (e.g. `nic-hdl`), `fallback` if absent
    Field { field: String, fallback: String },
}

#[derive(Debug, Clone)]
pub enum Action {
    /// Store the `value` capture (or the first group, or the line) under a key
    Assign { key: KeySource, mode: Option<DuplicateMode> },
    /// Collect lines up to `end` into a nested tree tokenized with `body`
    Block {
        key: KeySource,
        end: Regex,
        body: Box<Grammar>,
        include_start: bool,
    },
    /// Discard the line
    Skip,
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub pattern: Regex,
    pub action: Action,
}

/// Ordered rule list; the first matching rule wins for each line.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    rules: Vec<Rule>,
    field_modes: HashMap<String, DuplicateMode>,
}

impl Grammar {
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::default()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Duplicate handling for `key`: the per-field declaration if there is
    /// one, otherwise the rule's own mode, otherwise append
    pub fn mode_for(&self, key: &str, rule_mode: Option<DuplicateMode>) -> DuplicateMode {
        self.field_modes
            .get(key)
            .copied()
            .or(rule_mode)
            .unwrap_or_default()
    }

    pub fn first_match(&self, line: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.pattern.is_match(line))
    }
}

/// Builds a [`Grammar`] from pattern strings, reporting the first invalid
/// pattern from [`GrammarBuilder::build`].
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    grammar: Grammar,
    error: Option<regex::Error>,
}

impl GrammarBuilder {
    fn compile(&mut self, pattern: &str) -> Option<Regex> {
        match Regex::new(pattern) {
            Ok(regex) => Some(regex),
            Err(e) => {
                self.error.get_or_insert(e);
                None
            }
        }
    }

    fn push(mut self, pattern: &str, action: Action) -> Self {
        if let Some(pattern) = self.compile(pattern) {
            self.grammar.rules.push(Rule { pattern, action });
        }
        self
    }

    /// Lines matching `pattern` are dropped
    pub fn skip(self, pattern: &str) -> Self {
        self.push(pattern, Action::Skip)
    }

    /// `Key: Value` lines; the pattern must capture `key` and `value`
    pub fn key_value(self, pattern: &str) -> Self {
        self.push(pattern, Action::Assign { key: KeySource::Captured, mode: None })
    }

    /// Lines matching `pattern` are stored under `key`
    pub fn line(self, pattern: &str, key: &str) -> Self {
        self.push(pattern, Action::Assign {
            key: KeySource::Fixed(key.to_string()),
            mode: None,
        })
    }

    /// Like [`GrammarBuilder::line`] but with an explicit duplicate mode
    pub fn line_with_mode(self, pattern: &str, key: &str, mode: DuplicateMode) -> Self {
        self.push(pattern, Action::Assign {
            key: KeySource::Fixed(key.to_string()),
            mode: Some(mode),
        })
    }

    /// Multi-line block from a `start` line up to an `end` line (consumed)
    pub fn block(mut self, start: &str, end: &str, key: KeySource, body: Grammar, include_start: bool) -> Self {
        if let Some(end) = self.compile(end) {
            self = self.push(start, Action::Block {
                key,
                end,
                body: Box::new(body),
                include_start,
            });
        }
        self
    }

    /// Declare how repeated occurrences of `key` are handled
    pub fn field_mode(mut self, key: &str, mode: DuplicateMode) -> Self {
        self.grammar.field_modes.insert(key.to_string(), mode);
        self
    }

    pub fn build(self) -> Result<Grammar, regex::Error> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.grammar),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let grammar = Grammar::builder()
            .skip(r"^%")
            .line(r"^% Error:", "response:error")
            .key_value(r"^(?P<key>[^:]+):\s*(?P<value>.*)$")
            .build()
            .expect("grammar");

        assert!(matches!(grammar.first_match("% Error: 1").map(|r| &r.action), Some(Action::Skip)));
        assert!(matches!(grammar.first_match("domain: a.at").map(|r| &r.action), Some(Action::Assign { .. })));
        assert!(grammar.first_match("free text").is_none());
    }

    #[test]
    fn test_field_modes_override_rule_modes() {
        let grammar = Grammar::builder()
            .field_mode("Domain Name", DuplicateMode::KeepFirst)
            .build()
            .expect("grammar");

        assert_eq!(grammar.mode_for("Domain Name", Some(DuplicateMode::Overwrite)), DuplicateMode::KeepFirst);
        assert_eq!(grammar.mode_for("Name Server", Some(DuplicateMode::Overwrite)), DuplicateMode::Overwrite);
        assert_eq!(grammar.mode_for("Name Server", None), DuplicateMode::Append);
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let result = Grammar::builder().skip(r"^(unclosed").line(r"^ok", "ok").build();
        assert!(result.is_err());
    }
}
