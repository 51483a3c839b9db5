//! Field extraction over raw OCR text.
//!
//! Each field is resolved by an ordered list of [`Matcher`]s; the first one
//! that produces a value wins and the rest are never consulted.

pub mod amount;
pub mod category;
pub mod date;
pub mod pipeline;
pub mod vendor;

use crate::types::RawText;

pub use amount::extract_amount;
pub use category::classify;
pub use date::extract_date;
pub use pipeline::{ExtractError, Extractor};
pub use vendor::extract_vendor;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static regex::Regex {
            static R: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}
pub(crate) use re;

/// One strategy for locating a field in the text.
pub trait Matcher {
    type Output;

    fn find(&self, text: &RawText) -> Option<Self::Output>;
}

/// Run `matchers` in order and return the first hit.
pub fn first_match<T>(matchers: &[&dyn Matcher<Output = T>], text: &RawText) -> Option<T> {
    matchers.iter().find_map(|m| m.find(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<u32>);

    impl Matcher for Fixed {
        type Output = u32;
        fn find(&self, _text: &RawText) -> Option<u32> {
            self.0
        }
    }

    struct Panics;

    impl Matcher for Panics {
        type Output = u32;
        fn find(&self, _text: &RawText) -> Option<u32> {
            panic!("matcher after a hit must not run");
        }
    }

    #[test]
    fn first_hit_short_circuits() {
        let matchers: [&dyn Matcher<Output = u32>; 3] = [&Fixed(None), &Fixed(Some(7)), &Panics];
        assert_eq!(first_match(&matchers, &RawText::default()), Some(7));
    }

    #[test]
    fn no_hit_is_none() {
        let matchers: [&dyn Matcher<Output = u32>; 2] = [&Fixed(None), &Fixed(None)];
        assert_eq!(first_match(&matchers, &RawText::default()), None);
    }
}
