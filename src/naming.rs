//! Name conversion between wire identifiers and target-surface identifiers.
//!
//! Canonicalization must be deterministic: model names, parameter variable
//! names, and synthesized names are all derived through these helpers, and
//! the closure calculator relies on the same canonical form everywhere.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Reserved words of the emission target; colliding parameter names get a
/// trailing `_` marker appended.
pub static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "abstract", "any", "as", "boolean", "break", "case", "catch", "class", "const",
        "continue", "debugger", "default", "delete", "do", "else", "enum", "export",
        "extends", "false", "finally", "for", "from", "function", "if", "implements",
        "import", "in", "instanceof", "interface", "let", "new", "null", "number",
        "package", "private", "protected", "public", "return", "static", "string",
        "super", "switch", "symbol", "this", "throw", "true", "try", "type", "typeof",
        "undefined", "var", "void", "while", "with", "yield", "await", "async",
        "constructor",
    ]
    .into_iter()
    .collect()
});

/// Split a name into lowercase words
///
/// Any non-alphanumeric character is a word boundary, acronym runs split
/// before their final capital (`EMultisig` → `e multisig`), and lower-to-upper
/// transitions split camelCase words (`v1Delete` → `v1 delete`).
fn split_words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if i > 0 && !current.is_empty() {
            let prev = chars[i - 1];
            let next = chars.get(i + 1);
            let acronym_split = prev.is_ascii_uppercase()
                && c.is_ascii_uppercase()
                && next.map(|n| n.is_ascii_lowercase()).unwrap_or(false);
            let camel_split =
                (prev.is_ascii_lowercase() || prev.is_ascii_digit()) && c.is_ascii_uppercase();
            if acronym_split || camel_split {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c.to_ascii_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Convert a name to PascalCase
///
/// Used for canonical model names. Delimiters, camelCase boundaries, and
/// acronym runs are all normalized, so `app-call-logs`, `AppCallLogs`, and
/// `app_call_logs` canonicalize identically.
pub fn pascal_case(name: &str) -> String {
    split_words(name)
        .into_iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Convert a name to camelCase
///
/// Used for parameter variable names and canonical field names.
pub fn camel_case(name: &str) -> String {
    let pascal = pascal_case(name);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => pascal,
    }
}

/// Make a variable name safe and unique within one operation
///
/// Reserved words receive a trailing `_`; collisions with already-used names
/// are resolved by appending a numeric suffix starting at 2. Suffixing is
/// always locally recoverable and never an error.
pub fn sanitize_var_name(base: &str, used: &HashSet<String>) -> String {
    let mut base = base.to_string();
    if RESERVED_WORDS.contains(base.as_str()) {
        base.push('_');
    }
    if !used.contains(&base) {
        return base;
    }
    let mut counter = 2;
    loop {
        let candidate = format!("{base}{counter}");
        if !used.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
