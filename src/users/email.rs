use lazy_static::lazy_static;
use regex::Regex;

const EMAIL_MAX_LENGTH: usize = 254;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    email.len() <= EMAIL_MAX_LENGTH && EMAIL_RE.is_match(email)
}

/// Lower-cases the domain part of an address. The local part is kept as
/// typed; input without an `@` is returned untouched.
pub fn normalize_email(email: &str) -> String {
    match email.trim().rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}
