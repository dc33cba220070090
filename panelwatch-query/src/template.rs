//! Template variables and legend formatting.
//!
//! Query expressions reference dashboard variables as `$name`; legends
//! reference result labels as `{{label}}` or `{{ label }}`. Both are plain
//! literal substitutions.

use panelwatch_types::LabelSet;
use tracing::debug;

/// Dashboard template variables, substituted into query expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVars {
    vars: Vec<(String, String)>,
}

impl TemplateVars {
    /// Create an empty variable set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `key=value` strings.
    ///
    /// Entries that do not split into exactly one key and one value are skipped.
    pub fn parse<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vars = Self::new();
        for entry in entries {
            let entry = entry.as_ref();
            let parts: Vec<&str> = entry.split('=').collect();
            match parts.as_slice() {
                [key, value] => vars.insert(*key, *value),
                _ => debug!("Skipping malformed template variable: {}", entry),
            }
        }
        vars
    }

    /// Add or replace a variable.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.vars.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.vars.push((key, value)),
        }
    }

    /// Look up a variable.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Check if there are no variables.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Replace every `$key` in `expr` with its value.
    ///
    /// Longer names go first, so `$jobname` is not read as `$job` + `name`.
    pub fn apply(&self, expr: &str) -> String {
        let mut vars: Vec<&(String, String)> = self.vars.iter().collect();
        vars.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));
        vars.into_iter().fold(expr.to_string(), |acc, (key, value)| {
            acc.replace(&format!("${}", key), value)
        })
    }
}

/// Build the legend label for one query result.
///
/// - A non-empty template has its `{{key}}` / `{{ key }}` placeholders filled
///   from `labels`; leftover delimiters are dropped.
/// - Without a template, the label set is rendered as JSON.
/// - Without either, the legend is empty.
pub fn format_legend(template: Option<&str>, labels: &LabelSet) -> String {
    match template.filter(|t| !t.is_empty()) {
        Some(template) => {
            let filled = labels.iter().fold(template.to_string(), |acc, (key, value)| {
                acc.replace(&format!("{{{{{}}}}}", key), value)
                    .replace(&format!("{{{{ {} }}}}", key), value)
            });
            filled
                .replace("{{ ", "")
                .replace("{{", "")
                .replace(" }}", "")
                .replace("}}", "")
        }
        None if labels.is_empty() => String::new(),
        None => serde_json::to_string(labels).unwrap_or_default(),
    }
}
