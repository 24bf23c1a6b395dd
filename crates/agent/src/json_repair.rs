//! Lenient parsing of model output into JSON

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct RepairError(pub String);

/// Turns a raw model reply into a JSON value
pub trait JsonRepair: Send + Sync {
    fn repair(&self, raw: &str) -> Result<Value, RepairError>;
}

/// Strict parse first, then progressively more forgiving rewrites.
///
/// Handles code fences, prose around the object, smart quotes, trailing
/// commas, single-quoted strings, Python literals and unclosed brackets.
#[derive(Debug, Default, Clone, Copy)]
pub struct LenientJsonRepair;

fn fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```[a-zA-Z]*\s*(.*?)```").expect("valid regex"))
}

impl JsonRepair for LenientJsonRepair {
    fn repair(&self, raw: &str) -> Result<Value, RepairError> {
        let trimmed = raw.trim();
        let first_error = match serde_json::from_str(trimmed) {
            Ok(value) => return Ok(value),
            Err(e) => e.to_string(),
        };
        trace!("◆ strict parse failed: {}", first_error);

        let unfenced = fence()
            .captures(trimmed)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .unwrap_or(trimmed);

        let candidate = extract_object(unfenced).unwrap_or(unfenced);
        if let Ok(value) = serde_json::from_str(candidate) {
            return Ok(value);
        }

        let unquoted = candidate
            .replace(['\u{201c}', '\u{201d}'], "\"")
            .replace(['\u{2018}', '\u{2019}'], "'");
        let rewritten = normalize(&unquoted);
        serde_json::from_str(&rewritten).map_err(|_| RepairError(first_error))
    }
}

/// From the first `{` to its matching `}` (or to the end when unclosed)
fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    let mut escaped = false;

    for (i, ch) in text[start..].char_indices() {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                in_string = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => in_string = Some(ch),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    Some(&text[start..])
}

/// Single-pass rewrite outside of strings: single quotes become double quotes,
/// `True`/`False`/`None` become JSON literals, trailing commas are dropped, and
/// unclosed strings and brackets are closed.
fn normalize(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut stack: Vec<char> = Vec::new();
    let mut in_string: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if let Some(quote) = in_string {
            match ch {
                '\\' if i + 1 < chars.len() => {
                    let next = chars[i + 1];
                    if next == '\'' {
                        out.push('\'');
                    } else {
                        out.push('\\');
                        out.push(next);
                    }
                    i += 2;
                    continue;
                }
                '"' if quote == '\'' => out.push_str("\\\""),
                '\n' => out.push_str("\\n"),
                c if c == quote => {
                    out.push('"');
                    in_string = None;
                }
                c => out.push(c),
            }
            i += 1;
            continue;
        }

        match ch {
            '"' | '\'' => {
                in_string = Some(ch);
                out.push('"');
            }
            '{' => {
                stack.push('}');
                out.push(ch);
            }
            '[' => {
                stack.push(']');
                out.push(ch);
            }
            '}' | ']' => {
                if stack.last() == Some(&ch) {
                    stack.pop();
                }
                out.push(ch);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, Some('}') | Some(']') | None) {
                    out.push(ch);
                }
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                out.push_str(match word.as_str() {
                    "True" => "true",
                    "False" => "false",
                    "None" => "null",
                    other => other,
                });
                continue;
            }
            c => out.push(c),
        }
        i += 1;
    }

    if in_string.is_some() {
        out.push('"');
    }
    while let Some(closer) = stack.pop() {
        out.push(closer);
    }
    out
}
