//! Symbol parsing helpers.
//!
//! Venue symbols concatenate base and quote currencies without a
//! separator (e.g. "btcusdt"), so the split is suffix-based against the
//! quote currencies we trade against.

/// Quote currencies recognized as symbol suffixes, longest first.
const QUOTE_CURRENCIES: [&str; 2] = ["usdt", "pax"];

/// Quote currency of a symbol ("btcusdt" → "usdt"), if recognized.
pub fn quote_currency(symbol: &str) -> Option<&'static str> {
    QUOTE_CURRENCIES
        .iter()
        .find(|q| symbol.ends_with(*q))
        .copied()
}

/// Base currency of a symbol ("btcusdt" → "btc"), if the quote suffix is
/// recognized.
pub fn base_currency(symbol: &str) -> Option<&str> {
    let quote = quote_currency(symbol)?;
    let base = symbol.strip_suffix(quote)?;
    if base.is_empty() {
        return None;
    }
    Some(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_currency() {
        assert_eq!(quote_currency("btcusdt"), Some("usdt"));
        assert_eq!(quote_currency("ethpax"), Some("pax"));
        assert_eq!(quote_currency("btceur"), None);
    }

    #[test]
    fn test_base_currency() {
        assert_eq!(base_currency("btcusdt"), Some("btc"));
        assert_eq!(base_currency("ethpax"), Some("eth"));
        assert_eq!(base_currency("btceur"), None);
    }

    #[test]
    fn test_bare_quote_symbol_has_no_base() {
        assert_eq!(base_currency("usdt"), None);
    }
}
