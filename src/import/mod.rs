//! Bank statement import: row mappers and the statement reader
//!
//! Each supported bank export (Sparkasse, Volksbank, Moss) has its own
//! column names; the mappers extract date, amount, description, and
//! counterparty into the canonical `TransactionData` shape. Parsing is
//! deliberately lenient — CSV exports are not schema-validated upstream —
//! so unparseable amounts fall back to zero and unparseable dates to "now",
//! each surfaced as a `RowWarning` and a `tracing` warning rather than a
//! hard error.

pub mod date;
pub mod import_id;

use std::collections::HashMap;
use std::io::Read;
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use tracing::warn;

use crate::error::{KassenwartError, KassenwartResult};
use crate::models::{ImportSource, Money};

pub use date::parse_statement_date;
pub use import_id::derive_import_id;

/// Embedded "DATUM dd.mm.yyyy, hh.mm UHR" fragment in Sparkasse purposes
static DATE_TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)DATUM\s+\d{2}\.\d{2}\.\d{4},\s+\d{2}\.\d{2}\s+UHR")
        .unwrap_or_else(|e| panic!("invalid date-time pattern: {}", e))
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").unwrap_or_else(|e| panic!("invalid whitespace pattern: {}", e))
});

/// Canonical shape of a mapped statement row
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionData {
    /// Statement date, epoch milliseconds
    pub date: i64,
    /// Signed amount
    pub amount: Money,
    /// Purpose/description text (cleaned)
    pub description: String,
    /// Counterparty name
    pub counterparty: String,
    /// Originating account, if the export carries one
    pub account_name: String,
    /// Deterministic deduplication id
    pub imported_transaction_id: String,
}

/// A recovered parse failure on a single row
///
/// The row still imports with a safe default; the warning tells the
/// importing user which field was defaulted so a misplaced date or a zero
/// amount is not silent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowWarning {
    /// Date was unparseable; the row was dated "now"
    DateFallback { raw: String },
    /// Amount was unparseable; the row was imported with amount zero
    AmountFallback { raw: String },
}

/// A mapped row together with any parse-fallback warnings
#[derive(Debug, Clone)]
pub struct MappedRow {
    pub data: TransactionData,
    pub warnings: Vec<RowWarning>,
}

/// Map a header-keyed statement row into the canonical transaction shape
pub fn map_row(row: &HashMap<String, String>, source: ImportSource) -> MappedRow {
    match source {
        ImportSource::Sparkasse => map_sparkasse_row(row),
        ImportSource::Volksbank => map_volksbank_row(row),
        ImportSource::Moss => map_moss_row(row),
    }
}

/// Strip the embedded date-time fragment and collapse whitespace
///
/// Cosmetic, but it must stay stable across re-imports: the import id is
/// derived from the raw purpose, and the stored description from the
/// cleaned one.
fn strip_date_time(text: &str) -> String {
    let stripped = DATE_TIME_PATTERN.replace_all(text, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

fn map_sparkasse_row(row: &HashMap<String, String>) -> MappedRow {
    let buchungstag = field(row, "Buchungstag");
    let verwendungszweck = field(row, "Verwendungszweck");
    let buchungstext = field(row, "Buchungstext");

    let purpose = if verwendungszweck.is_empty() {
        buchungstext
    } else {
        verwendungszweck
    };

    let mut warnings = Vec::new();
    let data = TransactionData {
        date: parse_date_or_now(buchungstag, ImportSource::Sparkasse, &mut warnings),
        amount: parse_amount_or_zero(
            field(row, "Betrag"),
            ImportSource::Sparkasse,
            &mut warnings,
        ),
        description: strip_date_time(purpose),
        counterparty: field(row, "Beguenstigter/Zahlungspflichtiger").to_string(),
        account_name: field(row, "Auftragskonto").to_string(),
        imported_transaction_id: derive_import_id(
            buchungstag,
            verwendungszweck,
            ImportSource::Sparkasse,
        ),
    };

    MappedRow { data, warnings }
}

fn map_volksbank_row(row: &HashMap<String, String>) -> MappedRow {
    let buchungstag = field(row, "Buchungstag");
    let verwendungszweck = field(row, "Verwendungszweck");

    let mut warnings = Vec::new();
    let data = TransactionData {
        date: parse_date_or_now(buchungstag, ImportSource::Volksbank, &mut warnings),
        amount: parse_amount_or_zero(
            field(row, "Betrag"),
            ImportSource::Volksbank,
            &mut warnings,
        ),
        description: verwendungszweck.to_string(),
        counterparty: field(row, "Name Zahlungsbeteiligter").to_string(),
        account_name: field(row, "IBAN Auftragskonto").to_string(),
        imported_transaction_id: derive_import_id(
            buchungstag,
            verwendungszweck,
            ImportSource::Volksbank,
        ),
    };

    MappedRow { data, warnings }
}

fn map_moss_row(row: &HashMap<String, String>) -> MappedRow {
    let date = field(row, "Date");
    let description = field(row, "Description");

    let mut warnings = Vec::new();
    let data = TransactionData {
        date: parse_date_or_now(date, ImportSource::Moss, &mut warnings),
        amount: parse_amount_or_zero(field(row, "Amount"), ImportSource::Moss, &mut warnings),
        description: description.to_string(),
        counterparty: field(row, "Merchant").to_string(),
        account_name: field(row, "Account").to_string(),
        imported_transaction_id: derive_import_id(date, description, ImportSource::Moss),
    };

    MappedRow { data, warnings }
}

fn field<'a>(row: &'a HashMap<String, String>, key: &str) -> &'a str {
    row.get(key).map(String::as_str).unwrap_or("")
}

fn parse_date_or_now(raw: &str, source: ImportSource, warnings: &mut Vec<RowWarning>) -> i64 {
    match parse_statement_date(raw) {
        Some(ms) => ms,
        None => {
            warn!(source = source.as_str(), raw, "unparseable statement date, defaulting to now");
            warnings.push(RowWarning::DateFallback {
                raw: raw.to_string(),
            });
            Utc::now().timestamp_millis()
        }
    }
}

fn parse_amount_or_zero(raw: &str, source: ImportSource, warnings: &mut Vec<RowWarning>) -> Money {
    match Money::parse_de(raw) {
        Some(amount) => amount,
        None => {
            warn!(source = source.as_str(), raw, "unparseable amount, defaulting to zero");
            warnings.push(RowWarning::AmountFallback {
                raw: raw.to_string(),
            });
            Money::zero()
        }
    }
}

/// Read a bank statement into header-keyed row maps
///
/// German bank exports are semicolon-delimited; Moss card exports use
/// commas. The reader is flexible about ragged rows since these files are
/// hand-exported.
pub fn read_statement_rows<R: Read>(
    reader: R,
    delimiter: u8,
) -> KassenwartResult<Vec<HashMap<String, String>>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| KassenwartError::Import(format!("Failed to read statement header: {}", e)))?
        .clone();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record
            .map_err(|e| KassenwartError::Import(format!("Failed to read statement row: {}", e)))?;
        let row: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}
