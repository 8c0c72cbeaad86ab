//! Email address shape check.

use std::sync::LazyLock;

use regex::Regex;

/// `local@domain.tld`: the local part starts with a word character, dotted
/// segments of word characters on both sides, and an alphabetic TLD of two or
/// more letters.
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_][a-zA-Z0-9_]+(\.[a-zA-Z0-9_]+)*@[a-zA-Z0-9_]+(\.[a-zA-Z0-9_]+)*\.[a-zA-Z]{2,}$")
        .expect("email regex is valid")
});

/// Whether `email` has an acceptable shape.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}
