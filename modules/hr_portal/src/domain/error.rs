use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Email already registered: '{email}'")]
    EmailAlreadyExists { email: String },

    /// Deliberately does not say which check failed.
    #[error("Invalid credentials or email not verified")]
    InvalidCredentials,

    #[error("Account not found: '{email}'")]
    AccountNotFound { email: String },

    #[error("No email to verify")]
    NoPendingVerification,

    #[error("User email does not exist in accounts: '{email}'")]
    UnknownUserEmail { email: String },

    #[error("Please add at least one item")]
    EmptyRequest,

    #[error("Item {index}: {message}")]
    InvalidItem { index: usize, message: String },

    #[error("Password must be at least {min} characters (got {len})")]
    PasswordTooShort { len: usize, min: usize },

    #[error("Invalid email format: '{email}'")]
    InvalidEmail { email: String },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Cannot delete your own account")]
    CannotDeleteSelf,

    #[error("Please log in to continue")]
    NotAuthenticated,

    #[error("Admin access required")]
    AdminRequired,

    #[error("{operation} not implemented")]
    NotImplemented { operation: String },

    #[error("Cancelled")]
    Cancelled,
}

impl DomainError {
    pub fn email_already_exists(email: impl Into<String>) -> Self {
        Self::EmailAlreadyExists {
            email: email.into(),
        }
    }

    pub fn account_not_found(email: impl Into<String>) -> Self {
        Self::AccountNotFound {
            email: email.into(),
        }
    }

    pub fn unknown_user_email(email: impl Into<String>) -> Self {
        Self::UnknownUserEmail {
            email: email.into(),
        }
    }

    pub fn invalid_item(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidItem {
            index,
            message: message.into(),
        }
    }

    pub fn password_too_short(len: usize, min: usize) -> Self {
        Self::PasswordTooShort { len, min }
    }

    pub fn invalid_email(email: impl Into<String>) -> Self {
        Self::InvalidEmail {
            email: email.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_implemented(operation: impl Into<String>) -> Self {
        Self::NotImplemented {
            operation: operation.into(),
        }
    }

    /// Stable reason code for presentation layers and tests.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmailAlreadyExists { .. } => "email_already_exists",
            Self::InvalidCredentials => "invalid_credentials",
            Self::AccountNotFound { .. } => "account_not_found",
            Self::NoPendingVerification => "no_pending_verification",
            Self::UnknownUserEmail { .. } => "unknown_user_email",
            Self::EmptyRequest => "empty_request",
            Self::InvalidItem { .. } => "invalid_item",
            Self::PasswordTooShort { .. } => "password_too_short",
            Self::InvalidEmail { .. } => "invalid_email",
            Self::Validation { .. } => "validation",
            Self::CannotDeleteSelf => "cannot_delete_self",
            Self::NotAuthenticated => "not_authenticated",
            Self::AdminRequired => "admin_required",
            Self::NotImplemented { .. } => "not_implemented",
            Self::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_and_codes() {
        let e = DomainError::email_already_exists("bob@x.com");
        assert_eq!(e.code(), "email_already_exists");
        assert_eq!(e.to_string(), "Email already registered: 'bob@x.com'");

        let e = DomainError::password_too_short(3, 6);
        assert_eq!(e.code(), "password_too_short");
        assert!(e.to_string().contains("at least 6"));

        assert_eq!(
            DomainError::not_implemented("Edit department").to_string(),
            "Edit department not implemented"
        );
    }
}
