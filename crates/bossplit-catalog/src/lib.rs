//! Boss/item catalog loaded from CSV.
//!
//! The catalog is collaborator-supplied tabular text with a header row and at
//! least the columns `boss_name`, `item_name`, `image_url`. Parsing handles
//! standard CSV quoting (double-quoted fields, doubled quotes as escapes,
//! commas inside quotes), normalizes newlines, and strips a UTF-8 BOM from
//! the first header cell.
//!
//! Fetching the text is the caller's concern; this crate is pure.

#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// One catalog row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub boss: String,
    pub item: String,
    pub image: String,
}

/// Errors from catalog parsing.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog header is missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("catalog text is empty")]
    Empty,
}

const COL_BOSS: &str = "boss_name";
const COL_ITEM: &str = "item_name";
const COL_IMAGE: &str = "image_url";

/// The parsed boss/item catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    records: Vec<CatalogRecord>,
}

impl Catalog {
    /// Parse catalog CSV text.
    ///
    /// Blank lines are skipped and short rows pad with empty fields. A
    /// header missing one of the required columns is an error; a header-only
    /// file parses to an empty catalog.
    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let trimmed = normalized.trim();
        if trimmed.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut lines = trimmed.split('\n');
        let header_line = lines.next().ok_or(CatalogError::Empty)?;
        let mut headers = split_csv_line(header_line);
        if let Some(first) = headers.first_mut() {
            if let Some(stripped) = first.strip_prefix('\u{feff}') {
                *first = stripped.to_string();
            }
        }

        let column = |name: &'static str| -> Result<usize, CatalogError> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(CatalogError::MissingColumn(name))
        };
        let boss_col = column(COL_BOSS)?;
        let item_col = column(COL_ITEM)?;
        let image_col = column(COL_IMAGE)?;

        let mut records = Vec::new();
        for line in lines.filter(|l| !l.trim().is_empty()) {
            let fields = split_csv_line(line);
            let field = |idx: usize| fields.get(idx).cloned().unwrap_or_default();
            records.push(CatalogRecord {
                boss: field(boss_col),
                item: field(item_col),
                image: field(image_col),
            });
        }

        if records.is_empty() {
            warn!("catalog parsed successfully but contains no rows");
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Unique boss names in first-appearance order.
    pub fn boss_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for record in &self.records {
            if !names.contains(&record.boss.as_str()) {
                names.push(&record.boss);
            }
        }
        names
    }

    /// Sellable catalog items for one boss.
    ///
    /// NESO rows are excluded: NESO is carried by the fixed per-boss slots,
    /// never by the catalog.
    pub fn sellable_items(&self, boss: &str) -> Vec<&CatalogRecord> {
        self.records
            .iter()
            .filter(|r| r.boss == boss && !r.item.to_lowercase().contains("neso"))
            .collect()
    }
}

/// Split one CSV line into fields, honoring double-quote quoting.
/// A doubled quote inside a quoted field is a literal quote.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields.into_iter().map(|f| f.trim().to_string()).collect()
}
