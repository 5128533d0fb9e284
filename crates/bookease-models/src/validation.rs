use validator::ValidationError;

pub(crate) fn digits_only(value: &str) -> Result<(), ValidationError> {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("digits_only"))
    }
}

pub(crate) fn username_chars(value: &str) -> Result<(), ValidationError> {
    let mut chars = value.chars();
    let starts_ok = chars.next().is_some_and(|c| c.is_ascii_alphanumeric());
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));

    if starts_ok && rest_ok {
        Ok(())
    } else {
        Err(ValidationError::new("username_chars"))
    }
}
