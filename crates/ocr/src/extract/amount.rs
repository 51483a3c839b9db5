use tallyslip_core::Money;

use super::{first_match, re, Matcher};
use crate::types::{AmountSource, ExtractedAmount, RawText};

// Any "total" substring counts, so OCR-merged words like "TOTAL12.34" or
// "GRANDTOTAL" still label the line. Corrupted spellings ("T0TAL") do not.
re!(re_total_label, r"(?i)total");

// Candidate amount token: optional currency symbol (a sign may follow it),
// then a run of digits with embedded separators. Dashes glued to the front are
// captured apart so a single one reads as a sign and a run as a leader. The
// leading guard keeps a token from starting mid-number or mid-dash-run.
// Validation happens in `Money`.
re!(re_money_token, r"(?:^|[^\d.,-])(?P<dashes>-*)(?P<token>(?:[$€£]\s?-?)?\d[\d,.]*\d)");

/// Amount printed on the first line carrying a "total" label.
pub struct LabeledTotal;

impl Matcher for LabeledTotal {
    type Output = ExtractedAmount;

    fn find(&self, text: &RawText) -> Option<ExtractedAmount> {
        let line = text.text_lines().find(|l| re_total_label().is_match(l))?;
        match amounts_in(line).next() {
            Some(value) => {
                tracing::debug!(%value, line, "labeled total");
                Some(ExtractedAmount { value, source: AmountSource::Labeled })
            }
            None => {
                tracing::debug!(line, "total label without a parseable amount");
                None
            }
        }
    }
}

/// Largest amount anywhere in the text.
pub struct LargestAmount;

impl Matcher for LargestAmount {
    type Output = ExtractedAmount;

    fn find(&self, text: &RawText) -> Option<ExtractedAmount> {
        let value = text.text_lines().flat_map(amounts_in).max()?;
        tracing::debug!(%value, "no labeled total; using largest amount");
        Some(ExtractedAmount { value, source: AmountSource::FallbackMax })
    }
}

const AMOUNT_MATCHERS: &[&dyn Matcher<Output = ExtractedAmount>] = &[&LabeledTotal, &LargestAmount];

/// Locate the transaction total.
///
/// A labeled total wins outright. When there is no labeled line, or the first
/// labeled line has no readable amount, the largest amount on the receipt is
/// used instead.
pub fn extract_amount(text: &RawText) -> Option<ExtractedAmount> {
    first_match(AMOUNT_MATCHERS, text)
}

/// Valid amounts on one line, left to right.
fn amounts_in(line: &str) -> impl Iterator<Item = Money> + '_ {
    re_money_token().captures_iter(line).filter_map(|c| {
        let token = c.name("token")?.as_str();
        let parsed = match c.name("dashes").map_or(0, |d| d.len()) {
            1 => Money::parse_receipt_amount(&format!("-{token}")),
            _ => Money::parse_receipt_amount(token),
        };
        match parsed {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::trace!(token, error = %e, "rejected amount token");
                None
            }
        }
    })
}
