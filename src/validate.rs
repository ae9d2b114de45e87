//! Pure form validation for the contact form. No side effects, no I/O.

use std::collections::BTreeMap;

pub const NAME_REQUIRED: &str = "Name is required";
pub const NAME_TOO_SHORT: &str = "Name must be at least 2 characters long";
pub const ADDRESS_REQUIRED: &str = "Address is required";
pub const ADDRESS_TOO_SHORT: &str = "Address must be at least 5 characters long";

const NAME_MIN: usize = 2;
// Held invariant at 5; callers must not assume any other bound.
const ADDRESS_MIN: usize = 5;

/// Check the contact form fields. Returns a field-to-message map that is
/// empty iff the input is acceptable.
pub fn validate_contact(
    name: &str,
    address: &str,
) -> BTreeMap<&'static str, &'static str> {
    let mut errors = BTreeMap::new();
    let name = name.trim();
    let address = address.trim();

    if name.is_empty() {
        errors.insert("name", NAME_REQUIRED);
    } else if name.chars().count() < NAME_MIN {
        errors.insert("name", NAME_TOO_SHORT);
    }

    if address.is_empty() {
        errors.insert("address", ADDRESS_REQUIRED);
    } else if address.chars().count() < ADDRESS_MIN {
        errors.insert("address", ADDRESS_TOO_SHORT);
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_are_both_required() {
        let errors = validate_contact("", "");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("name"), Some(&NAME_REQUIRED));
        assert_eq!(errors.get("address"), Some(&ADDRESS_REQUIRED));
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let errors = validate_contact("   ", "\t\n");
        assert_eq!(errors.get("name"), Some(&NAME_REQUIRED));
        assert_eq!(errors.get("address"), Some(&ADDRESS_REQUIRED));
    }

    #[test]
    fn short_name_is_rejected() {
        let errors = validate_contact("J", "123 Main Street, New York, NY");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("name"), Some(&NAME_TOO_SHORT));
    }

    #[test]
    fn short_address_is_rejected() {
        let errors = validate_contact("John Doe", "NYC");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("address"), Some(&ADDRESS_TOO_SHORT));
    }

    #[test]
    fn bounds_are_trimmed_lengths() {
        // trims to "J", below the 2-char bound
        assert!(validate_contact(" J ", "12345").contains_key("name"));
        // exactly at both bounds after trimming
        assert!(validate_contact(" Jo ", " 12345 ").is_empty());
    }

    #[test]
    fn valid_input_yields_empty_map() {
        let errors =
            validate_contact("John Doe", "123 Main Street, New York, NY 10001");
        assert!(errors.is_empty());
    }
}
