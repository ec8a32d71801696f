//! Receipt model and gross/net/tax-rate splitting
//!
//! Receipt amounts are f64 because the net amount is a division result
//! (`net = gross / (1 + rate/100)`) that must reconcile against the gross
//! totals within floating-point tolerance; it is never rounded into cents
//! before aggregation. Ledger amounts stay exact (`Money`); only receipts
//! carry fractional cents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// German VAT rates applicable to reimbursement receipts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TaxRate {
    /// 0% — tax-free
    Zero,
    /// 7% — reduced rate
    Reduced,
    /// 19% — standard rate
    Standard,
}

impl TaxRate {
    /// The rate as a percentage
    pub const fn percent(&self) -> u8 {
        match self {
            TaxRate::Zero => 0,
            TaxRate::Reduced => 7,
            TaxRate::Standard => 19,
        }
    }
}

impl TryFrom<u8> for TaxRate {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TaxRate::Zero),
            7 => Ok(TaxRate::Reduced),
            19 => Ok(TaxRate::Standard),
            other => Err(format!("Unsupported tax rate: {}% (expected 0, 7, or 19)", other)),
        }
    }
}

impl From<TaxRate> for u8 {
    fn from(rate: TaxRate) -> u8 {
        rate.percent()
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Split a gross amount into its net portion for a given tax rate
///
/// `net = gross / (1 + rate/100)`. The tax portion is `gross - net` by
/// construction, so gross always reconciles as net + tax.
pub fn split_gross_amount(gross: f64, rate: TaxRate) -> f64 {
    gross / (1.0 + f64::from(rate.percent()) / 100.0)
}

/// A reimbursement line item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    /// Receipt number as printed on the document
    pub receipt_number: String,

    /// Receipt date as printed on the document (free-form)
    pub receipt_date: String,

    /// Issuing company
    pub company_name: String,

    /// What was purchased
    #[serde(default)]
    pub description: String,

    /// Gross amount including VAT
    pub gross_amount: f64,

    /// VAT rate on this receipt
    pub tax_rate: TaxRate,

    /// Net amount; always `gross / (1 + rate/100)`, recomputed on every
    /// gross or rate change, never stored out of sync
    pub net_amount: f64,
}

impl Receipt {
    /// Create a receipt; the net amount is computed, not supplied
    pub fn new(
        receipt_number: impl Into<String>,
        receipt_date: impl Into<String>,
        company_name: impl Into<String>,
        gross_amount: f64,
        tax_rate: TaxRate,
    ) -> Self {
        Self {
            receipt_number: receipt_number.into(),
            receipt_date: receipt_date.into(),
            company_name: company_name.into(),
            description: String::new(),
            gross_amount,
            tax_rate,
            net_amount: split_gross_amount(gross_amount, tax_rate),
        }
    }

    /// The VAT portion of this receipt
    pub fn tax_amount(&self) -> f64 {
        self.gross_amount - self.net_amount
    }

    /// Change the gross amount, recomputing the net
    pub fn set_gross_amount(&mut self, gross: f64) {
        self.gross_amount = gross;
        self.net_amount = split_gross_amount(gross, self.tax_rate);
    }

    /// Change the tax rate, recomputing the net
    pub fn set_tax_rate(&mut self, rate: TaxRate) {
        self.tax_rate = rate;
        self.net_amount = split_gross_amount(self.gross_amount, rate);
    }
}

/// The four reconciling totals over a reimbursement's receipt set
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReceiptTotals {
    /// Σ net
    pub total_net: f64,
    /// Σ (gross - net) over receipts at 7%
    pub total_tax_reduced: f64,
    /// Σ (gross - net) over receipts at 19%
    pub total_tax_standard: f64,
    /// Σ gross
    pub total_gross: f64,
}

impl ReceiptTotals {
    /// Compute totals over a receipt set
    ///
    /// `total_gross == total_net + total_tax_reduced + total_tax_standard`
    /// for any set using only the supported rates (0% contributes zero tax
    /// by construction).
    pub fn from_receipts(receipts: &[Receipt]) -> Self {
        let mut totals = Self::default();
        for receipt in receipts {
            totals.total_net += receipt.net_amount;
            totals.total_gross += receipt.gross_amount;
            match receipt.tax_rate {
                TaxRate::Reduced => totals.total_tax_reduced += receipt.tax_amount(),
                TaxRate::Standard => totals.total_tax_standard += receipt.tax_amount(),
                TaxRate::Zero => {}
            }
        }
        totals
    }
}
