//! Dialable phone number derivation.
//!
//! Outbound messaging needs a digits-only number. Users type phone numbers
//! however they like (`(800) 555-1212`, `800.555.1212`, ...), so the stored
//! `phone` stays free-form and the dialable form is derived from it on every
//! write.

/// Derive the dialable form of a free-form phone number.
///
/// Strips every non-digit character. If exactly 10 digits remain, the US
/// country code `1` is prepended; any other length is returned unchanged.
/// Never fails: empty or malformed input yields a short or empty string.
///
/// # Examples
///
/// ```
/// use goria_core::dialable;
///
/// assert_eq!(dialable("8005551212"), "18005551212");
/// assert_eq!(dialable("(800) 555-1212"), "18005551212");
/// assert_eq!(dialable("+1 800 555 1212"), "18005551212");
/// assert_eq!(dialable("555-1212"), "5551212");
/// assert_eq!(dialable(""), "");
/// ```
#[must_use]
pub fn dialable(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 10 {
        format!("1{digits}")
    } else {
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_digits_get_country_code() {
        assert_eq!(dialable("8005551212"), "18005551212");
    }

    #[test]
    fn test_punctuation_is_stripped() {
        assert_eq!(dialable("(800) 555-1212"), "18005551212");
        assert_eq!(dialable("800.555.1212"), "18005551212");
    }

    #[test]
    fn test_eleven_digits_unchanged() {
        assert_eq!(dialable("+1 800 555 1212"), "18005551212");
        assert_eq!(dialable("18005551212"), "18005551212");
    }

    #[test]
    fn test_short_number_unchanged() {
        assert_eq!(dialable("555-1212"), "5551212");
    }

    #[test]
    fn test_empty_and_garbage() {
        assert_eq!(dialable(""), "");
        assert_eq!(dialable("call me"), "");
    }

    #[test]
    fn test_unicode_digits_ignored() {
        // Only ASCII digits count toward the dialable form.
        assert_eq!(dialable("٨٠٠5551212"), "5551212");
    }
}
