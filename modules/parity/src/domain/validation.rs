//! Normalization and validation of user-supplied fields.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::FieldViolation;

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 50;

#[allow(clippy::expect_used)] // literal pattern, compiles
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("static regex should not panic")
});

/// Trim, check and title-case a personal name (`"jOHN "` becomes `"John"`).
///
/// # Errors
/// Returns a violation for `field` when the name is too short, too long or
/// contains anything but letters.
pub fn normalize_name(field: &str, raw: &str) -> Result<String, FieldViolation> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();

    if len < NAME_MIN_LEN {
        return Err(FieldViolation::new(
            field,
            format!("must be at least {NAME_MIN_LEN} characters long"),
        ));
    }
    if len > NAME_MAX_LEN {
        return Err(FieldViolation::new(
            field,
            format!("must be at most {NAME_MAX_LEN} characters long"),
        ));
    }
    if !trimmed.chars().all(char::is_alphabetic) {
        return Err(FieldViolation::new(field, "must contain only letters"));
    }

    Ok(title_case(trimmed))
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect()
    })
}

/// Trim and lower-case an email address, then check its shape.
///
/// # Errors
/// Returns a violation on the `email` field when the address does not look
/// like `local@domain.tld`.
pub fn normalize_email(raw: &str) -> Result<String, FieldViolation> {
    let email = raw.trim().to_lowercase();
    if EMAIL_RE.is_match(&email) {
        Ok(email)
    } else {
        Err(FieldViolation::new("email", "value is not a valid email address"))
    }
}

/// Name and surname must not be the same word.
///
/// # Errors
/// Returns a violation on the `surname` field when both match ignoring case.
pub fn ensure_distinct(name: &str, surname: &str) -> Result<(), FieldViolation> {
    if name.to_lowercase() == surname.to_lowercase() {
        return Err(FieldViolation::new(
            "surname",
            "Name and surname cannot be the same",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_title_cased() {
        assert_eq!(normalize_name("name", "  jOHN ").unwrap(), "John");
        assert_eq!(normalize_name("name", "doe").unwrap(), "Doe");
        assert_eq!(normalize_name("name", "\u{e9}mile").unwrap(), "\u{c9}mile");
    }

    #[test]
    fn short_names_are_rejected() {
        let err = normalize_name("surname", " a ").unwrap_err();
        assert_eq!(err.field, "surname");
        assert!(err.message.contains("at least 2"));
    }

    #[test]
    fn long_names_are_rejected() {
        let long = "a".repeat(NAME_MAX_LEN + 1);
        assert!(normalize_name("name", &long).is_err());
        assert!(normalize_name("name", &"a".repeat(NAME_MAX_LEN)).is_ok());
    }

    #[test]
    fn names_must_be_letters() {
        for bad in ["John1", "Jo hn", "O'Neil", "Mary-Ann"] {
            assert!(normalize_name("name", bad).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn emails() {
        assert_eq!(
            normalize_email(" John.Doe+tag@Example.COM ").unwrap(),
            "john.doe+tag@example.com"
        );
        for bad in ["", "plain", "a@b", "a@b.c", "@example.com", "a b@example.com"] {
            assert!(normalize_email(bad).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn name_and_surname_must_differ() {
        assert!(ensure_distinct("John", "Doe").is_ok());
        let err = ensure_distinct("John", "JOHN").unwrap_err();
        assert_eq!(err.field, "surname");
    }
}
