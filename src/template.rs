//! Macro substitution for late-bound config values
//!
//! Config values may hold `${key}` macros that are only known when the
//! pipeline runs. A [`MacroContext`] supplies those values once, before the
//! sink config is validated.

use crate::error::{Error, Result};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Regex for matching macros: ${key}
static MACRO_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{\s*([a-zA-Z_][a-zA-Z0-9_.\-]*)\s*\}").expect("valid macro regex")
});

/// Values available for macro substitution
#[derive(Debug, Clone, Default)]
pub struct MacroContext {
    values: HashMap<String, String>,
}

impl MacroContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, builder style
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Set a value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Parse a `key=value` pair, as given on the command line
    pub fn parse_pair(pair: &str) -> Result<(String, String)> {
        pair.split_once('=')
            .filter(|(key, _)| !key.trim().is_empty())
            .map(|(key, value)| (key.trim().to_string(), value.to_string()))
            .ok_or_else(|| Error::config(format!("Invalid macro '{pair}', expected key=value")))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MacroContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Substitute every macro in `text`.
///
/// Substituted values are not expanded again. Fails with
/// [`Error::UndefinedVariable`] listing every key the context lacks.
pub fn render(text: &str, ctx: &MacroContext) -> Result<String> {
    let mut missing = Vec::new();

    let rendered = MACRO_REGEX.replace_all(text, |cap: &Captures<'_>| {
        let key = &cap[1];
        match ctx.get(key) {
            Some(value) => value.to_string(),
            None => {
                missing.push(key.to_string());
                String::new()
            }
        }
    });

    if missing.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::undefined_var(missing.join(", ")))
    }
}

/// Check if a string contains macros
pub fn has_macros(s: &str) -> bool {
    MACRO_REGEX.is_match(s)
}

/// Extract all macro keys from a string
pub fn extract_macros(text: &str) -> Vec<String> {
    MACRO_REGEX
        .captures_iter(text)
        .map(|cap| cap[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_substitution() {
        let ctx = MacroContext::new().with("schema", "{}");
        assert_eq!(render("${schema}", &ctx).unwrap(), "{}");
    }

    #[test]
    fn test_multiple_substitutions() {
        let ctx: MacroContext = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(render("${a}-${b}-${a}", &ctx).unwrap(), "1-2-1");
    }

    #[test]
    fn test_whitespace_and_dotted_keys() {
        let ctx = MacroContext::new().with("pipeline.schema", "x");
        assert_eq!(render("${ pipeline.schema }", &ctx).unwrap(), "x");
    }

    #[test]
    fn test_undefined_macro() {
        let ctx = MacroContext::new().with("a", "1");
        let err = render("${a} ${missing} ${other}", &ctx).unwrap_err();
        match err {
            Error::UndefinedVariable { variable } => assert_eq!(variable, "missing, other"),
            other => panic!("Expected UndefinedVariable, got {other:?}"),
        }
    }

    #[test]
    fn test_substituted_values_not_expanded() {
        let ctx = MacroContext::new().with("a", "${b}").with("b", "2");
        assert_eq!(render("${a}", &ctx).unwrap(), "${b}");
    }

    #[test]
    fn test_no_macros() {
        let text = r#"{"fields":[]}"#;
        assert_eq!(render(text, &MacroContext::new()).unwrap(), text);
        assert!(!has_macros(text));
    }

    #[test]
    fn test_has_and_extract_macros() {
        assert!(has_macros("${schema}"));
        assert!(!has_macros("$schema"));
        assert!(!has_macros("{{ schema }}"));
        assert_eq!(extract_macros("${a} and ${ b.c }"), vec!["a", "b.c"]);
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            MacroContext::parse_pair("schema={\"a\":1}").unwrap(),
            ("schema".to_string(), "{\"a\":1}".to_string())
        );
        assert!(MacroContext::parse_pair("novalue").is_err());
        assert!(MacroContext::parse_pair("=x").is_err());
    }
}
