//! Column resolution
//!
//! Spreadsheet headers vary between exports ("Customer Name", "customer",
//! "WF (lbs)", ...). Each semantic field declares the header fragments it
//! accepts; resolution runs once per import, never per row.

use super::ImportError;

/// Semantic fields read from the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnField {
    Date,
    Customer,
    Weight,
    Identifier,
}

impl ColumnField {
    fn label(&self) -> &'static str {
        match self {
            ColumnField::Date => "date",
            ColumnField::Customer => "customer",
            ColumnField::Weight => "weight",
            ColumnField::Identifier => "identifier",
        }
    }
}

/// Header fragments accepted for one field
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub field: ColumnField,
    /// Lowercase substrings; a header matching any of them qualifies
    pub patterns: &'static [&'static str],
    pub required: bool,
}

/// Header mapping used for every import
pub const COLUMN_SPECS: &[ColumnSpec] = &[
    ColumnSpec {
        field: ColumnField::Date,
        patterns: &["date"],
        required: true,
    },
    ColumnSpec {
        field: ColumnField::Customer,
        patterns: &["customer"],
        required: true,
    },
    ColumnSpec {
        field: ColumnField::Weight,
        patterns: &["wf", "lbs"],
        required: true,
    },
    ColumnSpec {
        field: ColumnField::Identifier,
        patterns: &["qr"],
        required: false,
    },
];

/// Resolved column indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub customer: usize,
    pub weight: usize,
    pub identifier: Option<usize>,
}

impl ColumnMap {
    /// Resolve every [`COLUMN_SPECS`] entry against `headers`
    ///
    /// The leftmost matching header wins. A header claimed by an earlier
    /// field is not reused for a later one.
    pub fn resolve(headers: &[String]) -> Result<Self, ImportError> {
        let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let mut claimed = vec![false; headers.len()];

        let mut date = None;
        let mut customer = None;
        let mut weight = None;
        let mut identifier = None;

        for spec in COLUMN_SPECS {
            let found = (0..lowered.len()).find(|&index| {
                !claimed[index] && spec.patterns.iter().any(|p| lowered[index].contains(p))
            });

            match found {
                Some(index) => {
                    claimed[index] = true;
                    let slot = match spec.field {
                        ColumnField::Date => &mut date,
                        ColumnField::Customer => &mut customer,
                        ColumnField::Weight => &mut weight,
                        ColumnField::Identifier => &mut identifier,
                    };
                    *slot = Some(index);
                }
                None if spec.required => {
                    return Err(ImportError::Schema(format!(
                        "No {} column (expected a header containing {}); headers: [{}]",
                        spec.field.label(),
                        spec.patterns
                            .iter()
                            .map(|p| format!("\"{}\"", p))
                            .collect::<Vec<_>>()
                            .join(" or "),
                        headers.join(", ")
                    )));
                }
                None => {}
            }
        }

        // Required fields were checked above
        match (date, customer, weight) {
            (Some(date), Some(customer), Some(weight)) => Ok(Self {
                date,
                customer,
                weight,
                identifier,
            }),
            _ => Err(ImportError::Schema("Required column missing".to_string())),
        }
    }
}
