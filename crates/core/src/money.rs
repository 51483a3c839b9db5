use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const CURRENCY_SYMBOLS: [char; 3] = ['$', '€', '£'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountParseError {
    #[error("Not a number: '{0}'")]
    NotANumber(String),
    #[error("Ambiguous decimal grouping: '{0}'")]
    AmbiguousDecimal(String),
    #[error("Expected exactly two fractional digits: '{0}'")]
    FractionDigits(String),
    #[error("Malformed thousands grouping: '{0}'")]
    Grouping(String),
}

/// A monetary amount as printed on a receipt. Serializes as a plain JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Money {
    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    pub fn amount(self) -> Decimal {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Parse an amount token lifted from OCR text, e.g. `$1,234.56`, `-12.00`,
    /// `£ 3.50`.
    ///
    /// Currency symbols and thousands separators are stripped. The token must
    /// carry exactly one decimal point followed by exactly two digits. A leading
    /// minus (before or after the symbol) marks a refund and is kept.
    pub fn parse_receipt_amount(token: &str) -> Result<Self, AmountParseError> {
        let mut negative = false;
        let mut rest = token.trim();
        loop {
            if let Some(r) = rest.strip_prefix('-') {
                negative = true;
                rest = r.trim_start();
            } else if let Some(r) = rest.strip_prefix(&CURRENCY_SYMBOLS[..]) {
                rest = r.trim_start();
            } else {
                break;
            }
        }

        if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.') {
            return Err(AmountParseError::NotANumber(token.to_string()));
        }

        let (int_part, frac_part) = match rest.matches('.').count() {
            1 => rest.split_once('.').ok_or_else(|| AmountParseError::NotANumber(token.to_string()))?,
            0 => return Err(AmountParseError::FractionDigits(token.to_string())),
            _ => return Err(AmountParseError::AmbiguousDecimal(token.to_string())),
        };

        if frac_part.len() != 2 || !frac_part.chars().all(|c| c.is_ascii_digit()) {
            return Err(AmountParseError::FractionDigits(token.to_string()));
        }

        let digits = strip_thousands(int_part)
            .ok_or_else(|| AmountParseError::Grouping(token.to_string()))?;

        let value = Decimal::from_str(&format!("{digits}.{frac_part}"))
            .map_err(|_| AmountParseError::NotANumber(token.to_string()))?;

        Ok(Money(if negative { -value } else { value }))
    }
}

/// `1,234,567` → `1234567`. Groups after the first must be exactly three digits.
fn strip_thousands(int_part: &str) -> Option<String> {
    if int_part.is_empty() {
        return None;
    }
    let mut groups = int_part.split(',');
    let head = groups.next()?;
    let head_ok = !head.is_empty() && head.chars().all(|c| c.is_ascii_digit());
    if !int_part.contains(',') {
        return head_ok.then(|| head.to_string());
    }
    if !head_ok || head.len() > 3 {
        return None;
    }
    let mut out = head.to_string();
    for g in groups {
        if g.len() != 3 || !g.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        out.push_str(g);
    }
    Some(out)
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-${:.2}", self.0.abs())
        } else {
            write!(f, "${:.2}", self.0)
        }
    }
}
