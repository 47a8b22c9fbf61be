use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

/// Error raised when a configured signing secret is not fit for signing tokens.
///
/// Services treat any of these as fatal at startup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SecretError {
    #[error("Signing secret is missing")]
    Missing,

    #[error("Signing secret too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Signing secret is a placeholder value")]
    Placeholder,

    #[error("Signing secret has too little variety: minimum {min} distinct characters, got {actual}")]
    LowEntropy { min: usize, actual: usize },
}

/// HMAC signing secret that passed the strength policy.
///
/// `TokenService` can only be built from this type.
#[derive(Clone)]
pub struct SigningSecret(String);

impl SigningSecret {
    pub const MIN_LENGTH: usize = 32;
    pub const MIN_DISTINCT_CHARS: usize = 8;

    const PLACEHOLDER_FRAGMENTS: [&'static str; 6] = [
        "your-secret",
        "changeme",
        "change-me",
        "change_me",
        "placeholder",
        "default-secret",
    ];

    /// Validate a raw secret.
    ///
    /// # Arguments
    /// * `raw` - Secret as read from configuration
    ///
    /// # Returns
    /// Validated secret
    ///
    /// # Errors
    /// * `Missing` - Secret is empty or whitespace
    /// * `TooShort` - Fewer than 32 characters
    /// * `Placeholder` - Secret is (or contains) a well-known placeholder
    /// * `LowEntropy` - Fewer than 8 distinct characters
    pub fn new(raw: impl Into<String>) -> Result<Self, SecretError> {
        let raw = raw.into();

        if raw.trim().is_empty() {
            return Err(SecretError::Missing);
        }

        let lowered = raw.to_ascii_lowercase();
        if Self::PLACEHOLDER_FRAGMENTS
            .iter()
            .any(|fragment| lowered.contains(fragment))
        {
            return Err(SecretError::Placeholder);
        }

        let length = raw.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(SecretError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }

        let distinct = raw.chars().collect::<HashSet<_>>().len();
        if distinct < Self::MIN_DISTINCT_CHARS {
            return Err(SecretError::LowEntropy {
                min: Self::MIN_DISTINCT_CHARS,
                actual: distinct,
            });
        }

        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret([redacted])")
    }
}
