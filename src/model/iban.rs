//! Czech account number normalization.
//!
//! The gateway reports counter-party accounts in the domestic
//! `[prefix-]number` form with a separate bank code. Downstream services
//! want one canonical identifier per account, so everything convertible is
//! rewritten into a Czech IBAN and everything else passes through verbatim.

use once_cell::sync::Lazy;
use regex::Regex;

static CZECH_IBAN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^CZ\d{22}$").expect("valid pattern"));

/// Normalize a counter-party account reference into a Czech IBAN.
///
/// Inputs already in IBAN form pass through untouched. When the record
/// carries no bank code of its own, the statement's `bank_id` stands in.
/// Anything that cannot be converted (foreign formats, fee descriptions,
/// malformed numbers) is returned verbatim so no record is lost to
/// normalization.
pub fn normalize_account_number(number: &str, bank_code: &str, bank_id: &str) -> String {
    if CZECH_IBAN_PATTERN.is_match(number) {
        return number.to_string();
    }
    let code = if bank_code.is_empty() { bank_id } else { bank_code };
    czech_iban(number, code).unwrap_or_else(|| number.to_string())
}

/// Build a Czech IBAN from a domestic account number and bank code.
///
/// The BBAN is the 4-digit bank code followed by the zero-padded 6-digit
/// account prefix and the zero-padded 10-digit account number. Check digits
/// are ISO 7064 mod 97-10 over the BBAN with `CZ00` appended. Returns `None`
/// when any part is not plain digits or exceeds its width.
pub fn czech_iban(number: &str, bank_code: &str) -> Option<String> {
    let (prefix, account) = match number.split_once('-') {
        Some((prefix, account)) => (prefix, account),
        None => ("", number),
    };

    if account.is_empty() || account.len() > 10 || !is_digits(account) {
        return None;
    }
    if prefix.len() > 6 || !is_digits(prefix) {
        return None;
    }
    if bank_code.is_empty() || bank_code.len() > 4 || !is_digits(bank_code) {
        return None;
    }

    let bban = format!("{bank_code:0>4}{prefix:0>6}{account:0>10}");
    let check = 98 - mod97(&format!("{bban}CZ00"));
    Some(format!("CZ{check:02}{bban}"))
}

fn is_digits(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}

/// Iterative mod 97 over an alphanumeric string, letters expanded to their
/// two-digit values (`A` = 10 .. `Z` = 35) as ISO 7064 prescribes.
fn mod97(symbols: &str) -> u32 {
    let mut remainder: u32 = 0;
    for ch in symbols.chars() {
        match ch.to_digit(36) {
            Some(value) if value < 10 => remainder = (remainder * 10 + value) % 97,
            Some(value) => {
                remainder = (remainder * 10 + value / 10) % 97;
                remainder = (remainder * 10 + value % 10) % 97;
            }
            None => {}
        }
    }
    remainder
}

// ============================================================
// Tests
// ============================================================
