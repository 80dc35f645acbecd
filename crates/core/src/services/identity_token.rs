//! Signed identity tokens for account request confirmation links.
//!
//! Tokens are HS256 JWTs carrying one claim, `account_request_id`. They do
//! not expire.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use onboard_common::{AppError, AppResult, Config};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct IdentityClaims {
    account_request_id: String,
}

/// Issues and verifies identity tokens with an injected HMAC key.
#[derive(Clone)]
pub struct IdentityTokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl IdentityTokenSigner {
    /// Create a signer from a raw secret.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Create a signer from `security.secret_key_base`.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let secret = config.security.secret_key_base.as_bytes();
        if secret.is_empty() {
            return Err(AppError::Config(
                "security.secret_key_base must not be empty".to_string(),
            ));
        }
        Ok(Self::new(secret))
    }

    /// Sign a token for the given account request ID.
    pub fn issue(&self, account_request_id: &str) -> AppResult<String> {
        let claims = IdentityClaims {
            account_request_id: account_request_id.to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign identity token: {e}")))
    }

    /// Extract the account request ID from a token.
    ///
    /// Malformed tokens, bad signatures and algorithm mismatches all yield `None`.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<String> {
        match decode::<IdentityClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims.account_request_id),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected identity token");
                None
            }
        }
    }
}
