// 🔢 IBAN Validator - ISO 7064 MOD97-10
// Shape check + checksum for IBANs, UAE by default
//
// Structure of a UAE IBAN (23 characters):
//   AE | 07 | 033 | 1234567890123456
//   country | check digits | bank code | account identifier

use serde::{Deserialize, Serialize};

// ============================================================================
// IBAN FORMAT
// ============================================================================

/// Country-specific shape of an IBAN.
///
/// The checksum is the same for every country; only the prefix and the
/// total length differ. The BBAN is treated as all-digits, which holds for
/// the UAE and the other Gulf formats this crate cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbanFormat {
    /// ISO 3166-1 alpha-2 prefix (e.g., "AE")
    pub country_code: String,

    /// Total length including country code and check digits
    pub length: usize,

    /// Offset of the bank identifier inside the IBAN
    #[serde(default = "default_bank_code_offset")]
    pub bank_code_offset: usize,

    /// Number of characters in the bank identifier
    #[serde(default = "default_bank_code_len")]
    pub bank_code_len: usize,
}

fn default_bank_code_offset() -> usize {
    4
}

fn default_bank_code_len() -> usize {
    3
}

impl IbanFormat {
    /// United Arab Emirates: AE + 2 check digits + 3-digit bank code + 16-digit account
    pub fn uae() -> Self {
        IbanFormat {
            country_code: "AE".to_string(),
            length: 23,
            bank_code_offset: 4,
            bank_code_len: 3,
        }
    }

    /// Number of digits after the country code
    pub fn digit_count(&self) -> usize {
        self.length.saturating_sub(self.country_code.len())
    }

    /// Length of the account segment that follows the bank code
    pub fn account_len(&self) -> usize {
        self.length
            .saturating_sub(self.bank_code_offset + self.bank_code_len)
    }

    /// True when `normalized` is `<country><digits>` with the exact length
    ///
    /// Expects input that already went through [`normalize`].
    pub fn matches_shape(&self, normalized: &str) -> bool {
        normalized.len() == self.length
            && normalized.starts_with(&self.country_code)
            && normalized[self.country_code.len()..]
                .bytes()
                .all(|b| b.is_ascii_digit())
    }

    /// Full validation: normalize, shape check, then MOD97
    pub fn validate(&self, iban: &str) -> bool {
        let normalized = normalize(iban);

        // Reject before touching the checksum
        if !self.matches_shape(&normalized) {
            return false;
        }

        checksum_remainder(&normalized) == Some(1)
    }

    /// Bank identifier segment of a shape-valid IBAN
    pub fn extract_bank_code(&self, iban: &str) -> Option<String> {
        let normalized = normalize(iban);
        if !self.matches_shape(&normalized) {
            return None;
        }

        let end = self.bank_code_offset + self.bank_code_len;
        normalized
            .get(self.bank_code_offset..end)
            .map(|code| code.to_string())
    }

    /// Build a checksum-valid IBAN from a bank code and account identifier
    ///
    /// The account is left-padded with zeros to the country's account length.
    /// Returns None when the pieces don't fit the format.
    pub fn build(&self, bank_code: &str, account: &str) -> Option<String> {
        if bank_code.len() != self.bank_code_len
            || !bank_code.bytes().all(|b| b.is_ascii_digit())
            || !account.bytes().all(|b| b.is_ascii_digit())
            || account.len() > self.account_len()
        {
            return None;
        }

        let bban = format!(
            "{}{:0>width$}",
            bank_code,
            account,
            width = self.account_len()
        );
        let check = compute_check_digits(&self.country_code, &bban)?;

        Some(format!("{}{}{}", self.country_code, check, bban))
    }
}

impl Default for IbanFormat {
    fn default() -> Self {
        Self::uae()
    }
}

// ============================================================================
// PUBLIC HELPERS
// ============================================================================

/// Strip all whitespace and uppercase
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Validate a UAE IBAN (format + MOD97 checksum)
pub fn is_valid_iban(iban: &str) -> bool {
    IbanFormat::uae().validate(iban)
}

/// Bank code (3 digits after "AE" + check digits) of a UAE IBAN
pub fn extract_bank_code(iban: &str) -> Option<String> {
    IbanFormat::uae().extract_bank_code(iban)
}

/// Check digits that make `<country>??<bban>` pass MOD97
///
/// Standard ISO 13616 procedure: compute with "00", then 98 - remainder.
pub fn compute_check_digits(country_code: &str, bban: &str) -> Option<String> {
    let candidate = format!("{}00{}", country_code, bban);
    let remainder = checksum_remainder(&candidate)?;

    Some(format!("{:02}", 98 - remainder))
}

/// Group an IBAN in blocks of four for display
///
/// Example: "AE070331234567890123456" → "AE07 0331 2345 6789 0123 456"
pub fn format_iban(iban: &str) -> String {
    normalize(iban)
        .chars()
        .collect::<Vec<char>>()
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<String>>()
        .join(" ")
}

// ============================================================================
// MOD97-10
// ============================================================================

/// Digits appended per step; remainder (< 97) + 7 digits stays far below u64::MAX
const CHUNK_DIGITS: usize = 7;

/// Rearrange, expand letters, and reduce modulo 97
///
/// Returns None if the string contains anything but ASCII letters/digits
/// or is too short to hold a country code and check digits.
fn checksum_remainder(normalized: &str) -> Option<u32> {
    if normalized.len() < 5 || !normalized.is_ascii() {
        return None;
    }

    // Move country code + check digits to the end
    let rearranged = format!("{}{}", &normalized[4..], &normalized[..4]);

    // Letters become two digits: A=10 ... Z=35
    let mut digits = String::with_capacity(rearranged.len() * 2);
    for c in rearranged.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else if c.is_ascii_uppercase() {
            digits.push_str(&(c as u32 - 55).to_string());
        } else {
            return None;
        }
    }

    Some(mod97(&digits))
}

/// Incremental modulo over a decimal string of arbitrary length
fn mod97(digits: &str) -> u32 {
    let mut remainder: u64 = 0;

    for chunk in digits.as_bytes().chunks(CHUNK_DIGITS) {
        for &b in chunk {
            remainder = remainder * 10 + u64::from(b - b'0');
        }
        remainder %= 97;
    }

    remainder as u32
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "AE070331234567890123456";

    #[test]
    fn test_known_good_iban() {
        assert!(is_valid_iban(VALID));
    }

    #[test]
    fn test_checksum_invalid() {
        assert!(!is_valid_iban("AE000000000000000000000"));
    }

    #[test]
    fn test_lowercase_and_spaces_accepted() {
        assert!(is_valid_iban("ae07 0331 2345 6789 0123 456"));
        assert!(is_valid_iban("  AE070331234567890123456\n"));
    }

    #[test]
    fn test_length_rejected() {
        // Too short
        assert!(!is_valid_iban("AE07033123456789012345"));
        // Too long
        assert!(!is_valid_iban("AE0703312345678901234567"));
        assert!(!is_valid_iban(""));
        assert!(!is_valid_iban("AE"));
    }

    #[test]
    fn test_non_uae_prefix_rejected() {
        // Valid German IBAN, wrong country for this validator
        assert!(!is_valid_iban("DE89370400440532013000"));
        // Same digits as a valid UAE IBAN under another prefix
        assert!(!is_valid_iban("SA070331234567890123456"));
    }

    #[test]
    fn test_injected_letters_rejected() {
        assert!(!is_valid_iban("AE07033123456789012345X"));
        assert!(!is_valid_iban("AE07O331234567890123456"));
        assert!(!is_valid_iban("AE07-0331234567890123456"));
    }

    #[test]
    fn test_all_zero_account_not_special_cased() {
        // Built with correct check digits: passes purely on arithmetic
        let iban = IbanFormat::uae().build("033", "0").unwrap();
        assert!(iban.ends_with("0000000000000000"));
        assert!(is_valid_iban(&iban));
    }

    #[test]
    fn test_altered_check_digits_fail() {
        // Every other check-digit pair must fail for the same BBAN
        for check in 0..100u32 {
            let candidate = format!("AE{:02}{}", check, &VALID[4..]);
            assert_eq!(is_valid_iban(&candidate), check == 7, "check digits {:02}", check);
        }
    }

    #[test]
    fn test_altered_account_digit_fails() {
        // Single-digit substitutions are always caught by MOD97
        let mut chars: Vec<char> = VALID.chars().collect();
        chars[10] = if chars[10] == '9' { '0' } else { '9' };
        let altered: String = chars.into_iter().collect();
        assert!(!is_valid_iban(&altered));
    }

    #[test]
    fn test_deterministic() {
        for s in [VALID, "AE000000000000000000000", "AE123456789012345678901"] {
            assert_eq!(is_valid_iban(s), is_valid_iban(s));
        }
    }

    #[test]
    fn test_extract_bank_code() {
        assert_eq!(extract_bank_code(VALID), Some("033".to_string()));
        assert_eq!(extract_bank_code("ae07 0331 2345 6789 0123 456"), Some("033".to_string()));
        assert_eq!(extract_bank_code("AE07033"), None);
        assert_eq!(extract_bank_code("1234567890"), None);
    }

    #[test]
    fn test_compute_check_digits() {
        assert_eq!(
            compute_check_digits("AE", "0331234567890123456"),
            Some("07".to_string())
        );
        // Standard example from ISO 13616
        assert_eq!(
            compute_check_digits("GB", "WEST12345698765432"),
            Some("82".to_string())
        );
    }

    #[test]
    fn test_build_iban() {
        let format = IbanFormat::uae();

        assert_eq!(
            format.build("033", "1234567890123456"),
            Some(VALID.to_string())
        );
        assert_eq!(format.build("033", "12345").map(|s| s.len()), Some(23));

        // Wrong bank code width / non-digit / overflow
        assert_eq!(format.build("33", "1"), None);
        assert_eq!(format.build("03A", "1"), None);
        assert_eq!(format.build("033", "12345678901234567"), None);
    }

    #[test]
    fn test_other_country_format() {
        // Saudi Arabia: SA + 2 + 20 digits (digits-only BBAN)
        let sa = IbanFormat {
            country_code: "SA".to_string(),
            length: 24,
            bank_code_offset: 4,
            bank_code_len: 2,
        };

        let iban = sa.build("80", "000000608010167519").unwrap();
        assert_eq!(iban.len(), 24);
        assert!(sa.validate(&iban));
        assert!(!IbanFormat::uae().validate(&iban));
    }

    #[test]
    fn test_format_iban() {
        assert_eq!(format_iban(VALID), "AE07 0331 2345 6789 0123 456");
        assert_eq!(format_iban("ae070331"), "AE07 0331");
    }

    #[test]
    fn test_mod97_chunking_matches_bigint_semantics() {
        // 97 * 10^20 + 1 → remainder 1
        let digits = format!("97{}1", "0".repeat(19));
        assert_eq!(mod97(&digits), 1);
        assert_eq!(mod97("0"), 0);
        assert_eq!(mod97("98"), 1);
    }
}
