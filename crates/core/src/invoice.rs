//! Settlement-document ("invoice") data for paid payment stages.
//!
//! The document layout itself is a presentation concern; what is fixed here
//! is the data contract: which fields appear, the derived numbers, and the
//! deterministic numbering/file name. A minimal HTML rendering is provided
//! for the download endpoint.

use chrono::Datelike;
use rust_decimal::Decimal;

use crate::types::{DbId, Timestamp};

/// Company constants for the biller block.
pub const BILLER_NAME: &str = "Atelio Software Studio";
pub const BILLER_TAX_ID: &str = "B-87234519";
pub const BILLER_ADDRESS: &str = "Calle del Taller 14, 28012 Madrid";

/// Legal notice printed in the document footer.
pub const LEGAL_NOTICE: &str = "Payment received by bank transfer. This document \
certifies settlement of the referenced milestone and is issued for accounting \
purposes only; it does not constitute a tax invoice unless required by law.";

/// A party block (biller or billee).
#[derive(Debug, Clone, serde::Serialize)]
pub struct Party {
    pub name: String,
    pub tax_id: Option<String>,
    pub address: Option<String>,
}

/// All data needed to render a settlement document for one paid stage.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InvoiceData {
    /// Deterministic number: `INV-{project_id:04}-{year}-{seq:02}`.
    pub number: String,
    pub issued_at: Timestamp,
    pub biller: Party,
    pub billee: Party,
    pub project_name: String,
    pub stage_name: String,
    /// 1-based rank of the stage among its project's stages ordered by
    /// ascending required progress.
    pub position: usize,
    pub total_stages: usize,
    pub amount: Decimal,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl InvoiceData {
    /// Assemble the document data for one paid stage.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        project_id: DbId,
        project_name: String,
        stage_name: String,
        amount: Decimal,
        position: usize,
        total_stages: usize,
        billee: Party,
        issued_at: Timestamp,
    ) -> Self {
        let number = format!(
            "INV-{:04}-{}-{:02}",
            project_id,
            issued_at.year(),
            position
        );

        Self {
            number,
            issued_at,
            biller: Party {
                name: BILLER_NAME.to_string(),
                tax_id: Some(BILLER_TAX_ID.to_string()),
                address: Some(BILLER_ADDRESS.to_string()),
            },
            billee,
            project_name,
            stage_name,
            position,
            total_stages,
            subtotal: amount,
            tax: Decimal::ZERO,
            total: amount,
            amount,
        }
    }

    /// Download file name: encodes project id, year, and stage sequence.
    pub fn file_name(&self, project_id: DbId) -> String {
        format!(
            "invoice-{}-{}-stage-{}.html",
            project_id,
            self.issued_at.year(),
            self.position
        )
    }

    /// Render the document as a fixed-layout, self-contained HTML page.
    ///
    /// Header block, biller/billee blocks, a single line-item row for the
    /// stage amount, subtotal/tax/total block, and the legal footer.
    pub fn render_html(&self) -> String {
        let billee_tax = self.billee.tax_id.as_deref().unwrap_or("-");
        let billee_addr = self.billee.address.as_deref().unwrap_or("-");

        format!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{number}</title></head>\n\
             <body>\n\
             <h1>Settlement document {number}</h1>\n\
             <p>Issued {date}</p>\n\
             <section><h2>From</h2><p>{biller_name}<br>{biller_tax}<br>{biller_addr}</p></section>\n\
             <section><h2>To</h2><p>{billee_name}<br>{billee_tax}<br>{billee_addr}</p></section>\n\
             <table>\n\
             <tr><th>Description</th><th>Amount</th></tr>\n\
             <tr><td>{project} — {stage} (stage {pos} of {total_stages})</td><td>{amount}</td></tr>\n\
             </table>\n\
             <p>Subtotal: {subtotal}<br>Tax: {tax}<br>Total: {total}</p>\n\
             <footer><small>{legal}</small></footer>\n\
             </body></html>\n",
            number = self.number,
            date = self.issued_at.format("%Y-%m-%d"),
            biller_name = self.biller.name,
            biller_tax = self.biller.tax_id.as_deref().unwrap_or("-"),
            biller_addr = self.biller.address.as_deref().unwrap_or("-"),
            billee_name = self.billee.name,
            billee_tax = billee_tax,
            billee_addr = billee_addr,
            project = self.project_name,
            stage = self.stage_name,
            pos = self.position,
            total_stages = self.total_stages,
            amount = self.amount,
            subtotal = self.subtotal,
            tax = self.tax,
            total = self.total,
            legal = LEGAL_NOTICE,
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    use super::*;

    fn sample() -> InvoiceData {
        InvoiceData::build(
            42,
            "CRM rebuild".into(),
            "Upfront".into(),
            dec!(500.00),
            1,
            2,
            Party {
                name: "Acme GmbH".into(),
                tax_id: Some("DE-123".into()),
                address: None,
            },
            Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn number_encodes_project_year_and_sequence() {
        assert_eq!(sample().number, "INV-0042-2026-01");
    }

    #[test]
    fn file_name_is_deterministic() {
        assert_eq!(sample().file_name(42), "invoice-42-2026-stage-1.html");
    }

    #[test]
    fn totals_carry_zero_tax() {
        let inv = sample();
        assert_eq!(inv.subtotal, dec!(500.00));
        assert_eq!(inv.tax, Decimal::ZERO);
        assert_eq!(inv.total, dec!(500.00));
    }

    #[test]
    fn html_contains_all_blocks() {
        let html = sample().render_html();
        assert!(html.contains("INV-0042-2026-01"));
        assert!(html.contains(BILLER_NAME));
        assert!(html.contains("Acme GmbH"));
        assert!(html.contains("stage 1 of 2"));
        assert!(html.contains(LEGAL_NOTICE));
    }
}
