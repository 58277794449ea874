use crate::error::CoreError;

pub(crate) const MIN_NAME_LEN: usize = 2;
pub(crate) const MIN_PHONE_DIGITS: usize = 10;
pub(crate) const MIN_ZIP_LEN: usize = 5;

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::MissingField { field });
    }
    Ok(())
}

pub(crate) fn require_min_len(
    field: &'static str,
    value: &str,
    min: usize,
) -> Result<(), CoreError> {
    require(field, value)?;
    if value.trim().chars().count() < min {
        return Err(CoreError::FieldTooShort { field, min });
    }
    Ok(())
}

pub(crate) fn require_consent(consent: bool) -> Result<(), CoreError> {
    if consent {
        Ok(())
    } else {
        Err(CoreError::ConsentRequired)
    }
}

pub fn validate_email(value: &str) -> Result<(), CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::MissingField { field: "email" });
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(CoreError::InvalidEmail);
    }

    let (local, domain) = trimmed.split_once('@').ok_or(CoreError::InvalidEmail)?;
    if local.is_empty() || domain.contains('@') {
        return Err(CoreError::InvalidEmail);
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(CoreError::InvalidEmail);
    }

    Ok(())
}

pub fn validate_phone(value: &str) -> Result<(), CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::MissingField { field: "phone" });
    }

    let mut digits = 0;
    for (index, ch) in trimmed.chars().enumerate() {
        match ch {
            '0'..='9' => digits += 1,
            '+' if index == 0 => {}
            ' ' | '.' | '-' | '(' | ')' => {}
            _ => return Err(CoreError::InvalidPhone),
        }
    }

    if digits < MIN_PHONE_DIGITS {
        return Err(CoreError::InvalidPhone);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{require_min_len, validate_email, validate_phone};
    use crate::error::CoreError;

    #[test]
    fn email_requires_local_part_and_dotted_domain() {
        assert!(validate_email("jean.dupont@example.fr").is_ok());
        assert_eq!(validate_email("jean@"), Err(CoreError::InvalidEmail));
        assert_eq!(validate_email("@example.fr"), Err(CoreError::InvalidEmail));
        assert_eq!(validate_email("jean@localhost"), Err(CoreError::InvalidEmail));
        assert_eq!(validate_email("jean@exa..fr"), Err(CoreError::InvalidEmail));
        assert_eq!(validate_email("je an@example.fr"), Err(CoreError::InvalidEmail));
    }

    #[test]
    fn phone_counts_digits_and_allows_formatting() {
        assert!(validate_phone("06 12 34 56 78").is_ok());
        assert!(validate_phone("+33 6.12.34.56.78").is_ok());
        assert_eq!(validate_phone("06 12 34"), Err(CoreError::InvalidPhone));
        assert_eq!(validate_phone("06-12-34-56-7x"), Err(CoreError::InvalidPhone));
        assert_eq!(
            validate_phone("  "),
            Err(CoreError::MissingField { field: "phone" })
        );
    }

    #[test]
    fn min_len_counts_characters_not_bytes() {
        assert!(require_min_len("lastName", "Lé", 2).is_ok());
        assert_eq!(
            require_min_len("lastName", " L ", 2),
            Err(CoreError::FieldTooShort {
                field: "lastName",
                min: 2
            })
        );
    }
}
