// src/selector.rs

//! Scope selector to CSS selector translation
//!
//! TextMate addresses syntactic contexts with scope selectors such as
//! `source.ruby` or `text.html source.js, source.python`; Pulsar packages use
//! CSS-like selectors (`.source.ruby`, `.text.html .source.js`). The
//! [`ScopeTranslator`] trait is the seam between the two languages so the
//! shipped [`ScopeSelector`] can be swapped or stubbed in tests.

use thiserror::Error;

/// Selector used when a record carries no scope at all
pub const CATCH_ALL_SELECTOR: &str = "*";

/// A scope selector that could not be translated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ScopeParseError {
    pub reason: String,
}

impl ScopeParseError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Translates a scope selector into a CSS-like selector
pub trait ScopeTranslator {
    /// Translate `scope` to an equivalent CSS selector
    fn translate(&self, scope: &str) -> Result<String, ScopeParseError>;
}

/// Translate an optional scope, falling back to the catch-all selector
///
/// Records without a scope (or with a blank one) apply everywhere, which the
/// target format expresses as `*`.
pub fn selector_for_scope(
    translator: &dyn ScopeTranslator,
    scope: Option<&str>,
) -> Result<String, ScopeParseError> {
    match scope {
        Some(scope) if !scope.trim().is_empty() => translator.translate(scope),
        _ => Ok(CATCH_ALL_SELECTOR.to_string()),
    }
}

/// Default scope selector translator
///
/// Covers the selector syntax that appears in published bundles: comma
/// composites, space-separated scope paths, ` - ` subtraction, `L:`/`R:`/`B:`
/// side prefixes, and `*` wildcards. Group and alternation syntax is rejected
/// with a diagnostic rather than mistranslated.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScopeSelector;

impl ScopeTranslator for ScopeSelector {
    fn translate(&self, scope: &str) -> Result<String, ScopeParseError> {
        let mut composites = Vec::new();
        for composite in scope.split(',') {
            composites.push(translate_composite(composite)?);
        }
        Ok(composites.join(", "))
    }
}

/// Translate one comma-separated component of a selector
fn translate_composite(composite: &str) -> Result<String, ScopeParseError> {
    let tokens: Vec<&str> = composite.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(ScopeParseError::new("empty selector component"));
    }

    // At most one ` - ` subtraction per component
    let mut split = tokens.splitn(2, |token| *token == "-");
    let left = split.next().unwrap_or_default();
    let right = split.next();
    if right.is_some_and(|rest| rest.contains(&"-")) {
        return Err(ScopeParseError::new("chained '-' subtraction"));
    }

    let left_css = translate_path(left)?;
    match right {
        None => Ok(left_css),
        Some(rest) => {
            let right_css = translate_path(rest)?;
            Ok(format!("{left_css}:not({right_css})"))
        }
    }
}

/// Translate a space-separated scope path such as `text.html source.js`
fn translate_path(scopes: &[&str]) -> Result<String, ScopeParseError> {
    if scopes.is_empty() {
        return Err(ScopeParseError::new("expected a scope name"));
    }
    let mut parts = Vec::with_capacity(scopes.len());
    for scope in scopes {
        // Side prefixes constrain match position, which has no CSS equivalent
        let scope = scope
            .strip_prefix("L:")
            .or_else(|| scope.strip_prefix("R:"))
            .or_else(|| scope.strip_prefix("B:"))
            .unwrap_or(scope);
        parts.push(translate_scope_name(scope)?);
    }
    Ok(parts.join(" "))
}

/// Translate a single dotted scope name into concatenated class selectors
fn translate_scope_name(scope: &str) -> Result<String, ScopeParseError> {
    if scope == "*" {
        return Ok("*".to_string());
    }
    let mut css = String::new();
    for segment in scope.split('.') {
        if segment.is_empty() {
            return Err(ScopeParseError::new(format!(
                "empty segment in scope \"{scope}\""
            )));
        }
        if !segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+' | '*'))
        {
            return Err(ScopeParseError::new(format!(
                "unsupported character in scope \"{scope}\""
            )));
        }
        css.push('.');
        // '+' is a CSS combinator and must be escaped in class names
        css.push_str(&segment.replace('+', "\\+"));
    }
    Ok(css)
}
