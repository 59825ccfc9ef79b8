use crate::error::AppError;

/// Collects field errors and reports them together as one `BadRequest`.
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: Vec<String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.errors.push(message.into());
        }
        self
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(!value.trim().is_empty(), format!("{field} is required"))
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        self.check(
            value.chars().count() <= max,
            format!("{field} must not exceed {max} characters"),
        )
    }

    pub fn email(&mut self, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            return self.required("Email", value);
        }
        self.check(is_valid_email(value), "Invalid email format")
            .max_len("Email", value, 255)
    }

    pub fn finish(&mut self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            return Ok(());
        }
        Err(AppError::bad_request(std::mem::take(&mut self.errors).join("; ")))
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
}

#[cfg(test)]
mod tests {
    use super::{FieldErrors, normalize_email};
    use crate::error::AppError;

    #[test]
    fn joins_every_failure() {
        let err = FieldErrors::new()
            .required("Name", " ")
            .max_len("Address", &"x".repeat(501), 500)
            .finish()
            .expect_err("validation should fail");

        match err {
            AppError::BadRequest(message) => assert_eq!(
                message,
                "Name is required; Address must not exceed 500 characters"
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn email_rules() {
        assert!(FieldErrors::new().email("tenant@pg.example").finish().is_ok());
        assert!(FieldErrors::new().email("no-at-sign").finish().is_err());
        assert!(FieldErrors::new().email("a@b").finish().is_err());
        assert!(FieldErrors::new().email("").finish().is_err());
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }
}
