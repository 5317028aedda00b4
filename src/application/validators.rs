use validator::ValidateEmail;

const MAX_NAME_LEN: usize = 100;

/// Validates that the input looks like a valid email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.validate_email()
}

/// Lowercased, trimmed e-mail used as the lookup key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates a person's display name (user or client).
/// Rules:
/// - 1-100 characters after trimming
/// - No control characters
pub fn is_valid_person_name(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty()
        && name.chars().count() <= MAX_NAME_LEN
        && !name.chars().any(|c| c.is_control())
}
