//! Statement import workflow
//!
//! Reads a bank export, maps every row into the canonical transaction
//! shape, and inserts each row through the dedup gate. Running the same
//! file twice inserts nothing the second time; the report says how many
//! rows were new, how many were skipped, and which rows needed a parse
//! fallback.

use std::io::Read;

use tracing::info;

use crate::error::KassenwartResult;
use crate::import::{map_row, read_statement_rows, RowWarning};
use crate::models::{ImportSource, OrganizationId};

use super::transaction::LedgerService;

/// Outcome of one statement import
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Rows newly inserted into the ledger
    pub inserted: usize,
    /// Rows skipped because their import reference already existed
    pub duplicates_skipped: usize,
    /// Parse fallbacks, tagged with the zero-based row index
    pub warnings: Vec<(usize, RowWarning)>,
}

impl ImportReport {
    /// Total rows seen in the statement
    pub fn total_rows(&self) -> usize {
        self.inserted + self.duplicates_skipped
    }
}

/// Imports bank statements into the ledger
pub struct ImportService<'a> {
    ledger: &'a LedgerService<'a>,
}

impl<'a> ImportService<'a> {
    pub fn new(ledger: &'a LedgerService<'a>) -> Self {
        Self { ledger }
    }

    /// The column delimiter each export format uses
    fn delimiter(source: ImportSource) -> u8 {
        match source {
            // German bank exports are semicolon-delimited
            ImportSource::Sparkasse | ImportSource::Volksbank => b';',
            ImportSource::Moss => b',',
        }
    }

    /// Import a whole statement file
    pub fn import_statement<R: Read>(
        &self,
        organization_id: OrganizationId,
        reader: R,
        source: ImportSource,
    ) -> KassenwartResult<ImportReport> {
        let rows = read_statement_rows(reader, Self::delimiter(source))?;

        let mut report = ImportReport::default();
        for (index, row) in rows.iter().enumerate() {
            let mapped = map_row(row, source);
            for warning in mapped.warnings {
                report.warnings.push((index, warning));
            }

            let outcome = self
                .ledger
                .create_imported(organization_id, &mapped.data, source)?;
            if outcome.was_inserted() {
                report.inserted += 1;
            } else {
                report.duplicates_skipped += 1;
            }
        }

        info!(
            source = source.as_str(),
            inserted = report.inserted,
            duplicates = report.duplicates_skipped,
            "statement import finished"
        );
        Ok(report)
    }
}
