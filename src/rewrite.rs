// src/rewrite.rs

//! Snippet body placeholder rewriting
//!
//! TextMate snippet bodies lean on shell-variable placeholders that have no
//! equivalent in the target snippet syntax. Three global substitutions, in
//! order:
//!
//! 1. `${TM_X:default}` collapses to `default`
//! 2. `${N:${TM_…}}` collapses to the bare tab stop `$N`
//! 3. `\$` unescapes to a literal `$`
//!
//! Rules 1 and 2 must run before rule 3 so dollar signs they introduce are
//! not treated as already-escaped.

use regex::Regex;
use std::sync::LazyLock;

/// `${TM_C_POINTER: *}` and friends: a reserved variable with a default
static VARIABLE_WITH_DEFAULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{TM_[A-Z_]+:([^}]+)\}").unwrap());

/// `${1:${TM_FILENAME/(\w+)*/(?1:$1:NSObject)/}}`: a tab stop wrapping a
/// reserved-variable expression with no default
static WRAPPED_TAB_STOP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\d+):\s*\$\{TM_[^}]+\s*\}\s*\}").unwrap());

static ESCAPED_DOLLAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\\$").unwrap());

/// Rewrite a snippet body into the target placeholder syntax
pub fn rewrite_body(body: &str) -> String {
    let body = VARIABLE_WITH_DEFAULT.replace_all(body, "$1");
    let body = WRAPPED_TAB_STOP.replace_all(&body, "$$$1");
    ESCAPED_DOLLAR.replace_all(&body, "$$").into_owned()
}
