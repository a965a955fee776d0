use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_DIGITS: Regex = Regex::new(r"[^0-9]+").unwrap();
}

/// Numbering plan of the country the shop serves.
///
/// Numbers are stored in the canonical `+<country_code><subscriber>` form, so
/// every valid number has exactly `country_code.len() + subscriber_len`
/// digits after the plus sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhonePlan {
    pub country_code: String,
    pub subscriber_len: usize,
}

impl Default for PhonePlan {
    /// Uzbekistan: +998 followed by nine digits.
    fn default() -> Self {
        Self {
            country_code: "998".to_string(),
            subscriber_len: 9,
        }
    }
}

impl PhonePlan {
    pub fn total_digits(&self) -> usize {
        self.country_code.len() + self.subscriber_len
    }

    /// Canonical form of `raw`, or `None` when its digits fit neither the
    /// international (`<cc><subscriber>`) nor the national (`<subscriber>`)
    /// layout.
    ///
    /// Separators, spaces and a leading `+` are ignored. A digit string of
    /// the full international length is only accepted when it starts with
    /// the country code; a string of the national length is always read as
    /// a subscriber number.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let digits = NON_DIGITS.replace_all(raw, "");

        if digits.len() == self.total_digits() && digits.starts_with(&self.country_code) {
            Some(format!("+{}", digits))
        } else if digits.len() == self.subscriber_len {
            Some(format!("+{}{}", self.country_code, digits))
        } else {
            None
        }
    }

    pub fn is_supported(&self, raw: &str) -> bool {
        self.normalize(raw).is_some()
    }

    /// Canonical form when possible, otherwise the trimmed input.
    ///
    /// Used on the verification side: a number that cannot be normalized
    /// never had a code issued, so the lookup simply misses.
    pub fn canonical_or_raw(&self, raw: &str) -> String {
        self.normalize(raw).unwrap_or_else(|| raw.trim().to_string())
    }
}

/// Phone number safe for logs: every digit but the last four is hidden.
pub fn mask_phone(raw: &str) -> String {
    let digits = NON_DIGITS.replace_all(raw, "");
    let shown = digits.len().saturating_sub(4);
    format!("{}{}", "*".repeat(shown), &digits[shown..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_international_forms() {
        let plan = PhonePlan::default();
        assert_eq!(plan.normalize("+998901234567").as_deref(), Some("+998901234567"));
        assert_eq!(plan.normalize("998901234567").as_deref(), Some("+998901234567"));
        assert_eq!(plan.normalize("+998 (90) 123-45-67").as_deref(), Some("+998901234567"));
    }

    #[test]
    fn test_national_form_gets_country_code() {
        let plan = PhonePlan::default();
        assert_eq!(plan.normalize("90 123 45 67").as_deref(), Some("+998901234567"));
    }

    #[test]
    fn test_foreign_number_rejected() {
        let plan = PhonePlan::default();
        assert!(!plan.is_supported("+12025550100"));
        assert_eq!(plan.normalize("+12025550100"), None);
    }

    #[test]
    fn test_wrong_lengths_rejected() {
        let plan = PhonePlan::default();
        assert_eq!(plan.normalize("+99890123456"), None);
        assert_eq!(plan.normalize("+9989012345678"), None);
        assert_eq!(plan.normalize(""), None);
        assert_eq!(plan.normalize("not a phone"), None);
    }

    #[test]
    fn test_full_length_without_country_code_rejected() {
        // Twelve digits that do not start with 998 are not silently re-prefixed.
        assert_eq!(PhonePlan::default().normalize("123456789012"), None);
    }

    #[test]
    fn test_custom_plan() {
        let plan = PhonePlan {
            country_code: "7".to_string(),
            subscriber_len: 10,
        };
        assert_eq!(plan.normalize("+7 912 345 67 89").as_deref(), Some("+79123456789"));
        assert_eq!(plan.normalize("9123456789").as_deref(), Some("+79123456789"));
        assert!(!plan.is_supported("+998901234567"));
    }

    #[test]
    fn test_canonical_or_raw_falls_back_to_trimmed_input() {
        let plan = PhonePlan::default();
        assert_eq!(plan.canonical_or_raw(" 998901234567 "), "+998901234567");
        assert_eq!(plan.canonical_or_raw(" +1202 "), "+1202");
    }

    #[test]
    fn test_mask_phone_keeps_last_four_digits() {
        assert_eq!(mask_phone("+998 (90) 123-45-67"), "********4567");
        assert_eq!(mask_phone("123"), "123");
        assert_eq!(mask_phone(""), "");
    }
}
