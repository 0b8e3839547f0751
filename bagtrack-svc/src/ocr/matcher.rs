//! Name and order-type resolution from recognized text lines

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Reported when nothing usable was recognized
pub const UNKNOWN: &str = "UNKNOWN";

/// Order-type labels printed on tags
pub const ORDER_TYPE_LABELS: &[&str] = &["HANG DRY", "WASH & FOLD"];

static ALPHA_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z ]+$").unwrap());

/// What a tag photo resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagReading {
    pub name: String,
    pub order_type: String,
}

impl TagReading {
    pub fn from_lines(lines: &[String], known_names: &[String]) -> Self {
        Self {
            name: resolve_name(lines, known_names),
            order_type: detect_order_type(lines),
        }
    }
}

/// Best known name for the recognized lines
///
/// A known name matches when each of its words (case-insensitive) appears
/// inside at least one line; the first match in `known_names` order wins.
/// Without a match, the first two purely alphabetic lines are title-cased
/// and joined as a guess.
pub fn resolve_name(lines: &[String], known_names: &[String]) -> String {
    let lowered: Vec<String> = lines.iter().map(|l| l.to_lowercase()).collect();

    let matched = known_names.iter().find(|name| {
        let words: Vec<String> = name.split_whitespace().map(str::to_lowercase).collect();
        !words.is_empty()
            && words
                .iter()
                .all(|word| lowered.iter().any(|line| line.contains(word.as_str())))
    });

    if let Some(name) = matched {
        return name.clone();
    }

    let guess: Vec<String> = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| ALPHA_LINE_RE.is_match(l))
        .take(2)
        .map(title_case)
        .collect();

    if guess.is_empty() {
        UNKNOWN.to_string()
    } else {
        guess.join(" ")
    }
}

/// First line that is exactly an order-type label (case-insensitive)
pub fn detect_order_type(lines: &[String]) -> String {
    lines
        .iter()
        .map(|l| l.trim().to_uppercase())
        .find(|l| ORDER_TYPE_LABELS.contains(&l.as_str()))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Uppercase the first letter of each word, lowercase the rest
fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
