//! Rush detection and category classification
//!
//! A date cell may carry the rush marker (`TODAY`) in free text, e.g.
//! `"7/1 TODAY"`. Removing the marker leaves the canonical date. Every row
//! whose canonical date matches a marked row is rush as well, so same-day
//! orders entered without the marker still inherit it.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use super::ImportError;
use crate::models::{Category, OrderRow};

/// Rush marker token, matched case-insensitively as a whole word
pub const RUSH_TOKEN: &str = "TODAY";

static RUSH_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)\b{}\b", RUSH_TOKEN)).unwrap());

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?(?:\d+(?:\.\d*)?|\.\d+)").unwrap());

/// Decoration left behind once the marker is cut out ("7/1 - TODAY", "7/1 (TODAY)")
const DATE_DECORATION: &[char] = &['-', ',', ';', ':', '(', ')', '[', ']', '*', '!'];

/// A date cell split into canonical date and rush marker presence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateCell {
    pub canonical: String,
    pub has_rush_token: bool,
}

pub fn parse_date_cell(raw: &str) -> DateCell {
    let has_rush_token = RUSH_TOKEN_RE.is_match(raw);
    let stripped = RUSH_TOKEN_RE.replace_all(raw, " ");
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    let canonical = collapsed
        .trim_matches(|c: char| c.is_whitespace() || DATE_DECORATION.contains(&c))
        .to_string();

    DateCell {
        canonical,
        has_rush_token,
    }
}

/// Classify the weight/order-type cell
///
/// The first number in the cell, sign included, is the weight in pounds. A
/// positive weight is wash & fold; zero, negative, blank or non-numeric text
/// ("hang dry") is hang dry.
pub fn classify_weight(weight: Option<&str>) -> Category {
    let pounds = weight
        .and_then(|w| NUMBER_RE.find(w))
        .and_then(|m| m.as_str().parse::<f64>().ok());

    match pounds {
        Some(lbs) if lbs > 0.0 => Category::WashAndFold,
        _ => Category::HangDry,
    }
}

/// Handle for rows imported without an identifier
pub fn synthesize_identifier(import_millis: i64, position: usize) -> String {
    format!("AUTO-{}-{}", import_millis, position)
}

/// A source row that passed filtering, before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRow {
    /// 1-based line in the source file, for error messages
    pub source_line: usize,
    pub customer: String,
    pub identifier: Option<String>,
    pub raw_date: String,
    pub weight: Option<String>,
}

/// Classify a filtered batch
///
/// Fails with a schema error when two rows share an identifier.
pub fn classify_rows(
    candidates: Vec<CandidateRow>,
    import_millis: i64,
) -> Result<Vec<OrderRow>, ImportError> {
    let dates: Vec<DateCell> = candidates
        .iter()
        .map(|c| parse_date_cell(&c.raw_date))
        .collect();

    let rush_dates: HashSet<&str> = dates
        .iter()
        .filter(|d| d.has_rush_token)
        .map(|d| d.canonical.as_str())
        .collect();

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut rows = Vec::with_capacity(candidates.len());

    for (position, (candidate, date)) in candidates.into_iter().zip(&dates).enumerate() {
        let identifier = candidate
            .identifier
            .unwrap_or_else(|| synthesize_identifier(import_millis, position));

        if let Some(previous_line) = seen.insert(identifier.clone(), candidate.source_line) {
            return Err(ImportError::Schema(format!(
                "Duplicate identifier '{}' on lines {} and {}",
                identifier, previous_line, candidate.source_line
            )));
        }

        rows.push(OrderRow {
            position: position as i64,
            identifier,
            category: classify_weight(candidate.weight.as_deref()),
            rush: date.has_rush_token || rush_dates.contains(date.canonical.as_str()),
            customer: candidate.customer,
            raw_date: candidate.raw_date,
            weight: candidate.weight,
            scanned: false,
            scan_date: None,
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(line: usize, customer: &str, date: &str, weight: Option<&str>) -> CandidateRow {
        CandidateRow {
            source_line: line,
            customer: customer.to_string(),
            identifier: None,
            raw_date: date.to_string(),
            weight: weight.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_date_cell_strips_token() {
        assert_eq!(
            parse_date_cell("7/1 TODAY"),
            DateCell {
                canonical: "7/1".to_string(),
                has_rush_token: true
            }
        );
        assert_eq!(parse_date_cell("today  7/1").canonical, "7/1");
        assert_eq!(parse_date_cell("7/1 - TODAY").canonical, "7/1");
        assert_eq!(parse_date_cell("7/1 (Today)").canonical, "7/1");
    }

    #[test]
    fn test_parse_date_cell_without_token() {
        let cell = parse_date_cell(" 7/2 ");
        assert_eq!(cell.canonical, "7/2");
        assert!(!cell.has_rush_token);
    }

    #[test]
    fn test_token_must_be_whole_word() {
        assert!(!parse_date_cell("TODAYS 7/1").has_rush_token);
    }

    #[test]
    fn test_classify_weight() {
        assert_eq!(classify_weight(Some("12")), Category::WashAndFold);
        assert_eq!(classify_weight(Some("12.5 lbs.")), Category::WashAndFold);
        assert_eq!(classify_weight(Some(" 8lbs")), Category::WashAndFold);
        assert_eq!(classify_weight(Some("0")), Category::HangDry);
        assert_eq!(classify_weight(Some("0.0 lbs")), Category::HangDry);
        assert_eq!(classify_weight(Some("-5 lbs")), Category::HangDry);
        assert_eq!(classify_weight(Some("-.5")), Category::HangDry);
        assert_eq!(classify_weight(Some("hang dry")), Category::HangDry);
        assert_eq!(classify_weight(Some("")), Category::HangDry);
        assert_eq!(classify_weight(None), Category::HangDry);
    }

    #[test]
    fn test_rush_propagates_to_same_canonical_date() {
        let rows = classify_rows(
            vec![
                candidate(2, "Jane Doe", "7/1 TODAY", Some("10")),
                candidate(3, "John Roe", "7/1", None),
                candidate(4, "Ann Poe", "7/2", Some("4")),
            ],
            1_700_000_000_000,
        )
        .unwrap();

        assert!(rows[0].rush);
        assert!(rows[1].rush);
        assert!(!rows[2].rush);
    }

    #[test]
    fn test_missing_identifiers_are_synthesized_uniquely() {
        let rows = classify_rows(
            vec![
                candidate(2, "Jane Doe", "7/1", None),
                candidate(3, "Jane Doe", "7/1", None),
            ],
            42,
        )
        .unwrap();

        assert_eq!(rows[0].identifier, "AUTO-42-0");
        assert_eq!(rows[1].identifier, "AUTO-42-1");
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let mut first = candidate(2, "Jane Doe", "7/1", None);
        first.identifier = Some("QR-1".to_string());
        let mut second = candidate(5, "John Roe", "7/1", None);
        second.identifier = Some("QR-1".to_string());

        let err = classify_rows(vec![first, second], 0).unwrap_err();
        match err {
            ImportError::Schema(msg) => assert!(msg.contains("lines 2 and 5"), "{}", msg),
            other => panic!("Expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_classification_is_deterministic() {
        let batch = || {
            vec![
                candidate(2, "Jane Doe", "7/1 TODAY", Some("10")),
                candidate(3, "John Roe", "7/1", Some("hang dry")),
            ]
        };
        let first = classify_rows(batch(), 7).unwrap();
        let second = classify_rows(batch(), 7).unwrap();
        assert_eq!(first, second);
    }
}
