//! String utility functions.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static VARIABLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_\-]*)\}").unwrap());

/// Interpolate `{key}` placeholders found in `inputs`, in a single pass.
///
/// Placeholders without a matching input, and braces that do not form a
/// placeholder (JSON, for instance), are left untouched. Substituted values
/// are never scanned again, so a value containing `{key}` stays literal.
pub fn interpolate_known(input: &str, inputs: &HashMap<String, String>) -> String {
    if inputs.is_empty() || !input.contains('{') {
        return input.to_string();
    }

    VARIABLE_PATTERN
        .replace_all(input, |caps: &Captures| match inputs.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
