//! Shape checks for registration and password-reset input.

use crate::error::{AuthError, Result};
use crate::model::Registration;

pub fn validate_registration(registration: &Registration) -> Result<()> {
    if registration.name.trim().is_empty() {
        return Err(AuthError::Validation("name must not be empty".to_string()));
    }
    validate_email(&registration.email)?;
    validate_phone(&registration.phone)?;
    validate_password(&registration.password)
}

/// `local@label.label`, no whitespace, last label at least two characters
pub fn validate_email(email: &str) -> Result<()> {
    let invalid = || AuthError::Validation("invalid email format".to_string());

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || local.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    let well_formed = labels.len() >= 2
        && labels
            .iter()
            .all(|l| !l.is_empty() && !l.chars().any(|c| c.is_whitespace() || c == '@' || c == ','))
        && labels.last().is_some_and(|tld| tld.chars().count() >= 2);

    if well_formed { Ok(()) } else { Err(invalid()) }
}

/// Ten digits grouped 3-3-4, optionally preceded by a one or two digit country
/// code with an optional `+`. Groups may be split by a single space or dash.
pub fn validate_phone(phone: &str) -> Result<()> {
    let invalid = || AuthError::Validation("invalid phone format".to_string());

    let (plus, body) = match phone.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, phone),
    };

    let digits = body.chars().filter(char::is_ascii_digit).count();
    let country_code = match digits {
        10 if !plus => false,
        11 | 12 => true,
        _ => return Err(invalid()),
    };

    let mut remaining = digits;
    let mut previous_was_separator = true;
    for c in body.chars() {
        match c {
            '0'..='9' => {
                remaining -= 1;
                previous_was_separator = false;
            }
            ' ' | '-' => {
                let boundary = remaining == 4 || remaining == 7 || (country_code && remaining == 10);
                if previous_was_separator || !boundary {
                    return Err(invalid());
                }
                previous_was_separator = true;
            }
            _ => return Err(invalid()),
        }
    }

    Ok(())
}

/// At least eight characters with an upper-case letter, a lower-case letter and a digit
pub fn validate_password(password: &str) -> Result<()> {
    let long_enough = password.chars().count() >= 8;
    let upper = password.chars().any(|c| c.is_ascii_uppercase());
    let lower = password.chars().any(|c| c.is_ascii_lowercase());
    let digit = password.chars().any(|c| c.is_ascii_digit());

    if long_enough && upper && lower && digit {
        Ok(())
    } else {
        Err(AuthError::Validation("invalid password format".to_string()))
    }
}
