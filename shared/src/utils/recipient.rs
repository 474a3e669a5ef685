//! Recipient utilities

use once_cell::sync::Lazy;
use regex::Regex;

// Loose e-mail shape, enough to decide how to mask
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap()
});

/// Normalize a recipient by trimming surrounding whitespace
pub fn normalize_recipient(recipient: &str) -> String {
    recipient.trim().to_string()
}

/// Check if a recipient looks like an e-mail address
pub fn is_email(recipient: &str) -> bool {
    EMAIL_REGEX.is_match(recipient)
}

/// Mask a recipient for logging
///
/// Phone-like recipients keep only the last 4 characters (`***7890`),
/// e-mail recipients keep the first character and the domain (`j***@example.com`).
pub fn mask_recipient(recipient: &str) -> String {
    if is_email(recipient) {
        if let Some((local, domain)) = recipient.split_once('@') {
            let first: String = local.chars().take(1).collect();
            return format!("{}***@{}", first, domain);
        }
    }

    let chars: Vec<char> = recipient.chars().collect();
    if chars.len() <= 4 {
        "****".to_string()
    } else {
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("***{}", tail)
    }
}
