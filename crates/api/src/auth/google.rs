//! Google ID-token verification.
//!
//! Tokens are verified against Google's `tokeninfo` endpoint, which checks
//! the signature and expiry server-side; the audience claim is validated
//! locally against the configured OAuth client id. A rejected credential and
//! an unreachable verifier are distinct failures: the former is the caller's
//! problem, the latter is ours.

use serde::Deserialize;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Failure modes of Google ID-token verification.
#[derive(Debug, thiserror::Error)]
pub enum GoogleAuthError {
    /// Google (or the audience check) rejected the credential.
    #[error("Google credential rejected: {0}")]
    Rejected(String),

    /// The tokeninfo endpoint could not be reached.
    #[error("Google token verification unavailable: {0}")]
    Unavailable(String),
}

/// Claims returned by the tokeninfo endpoint for a valid ID token.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleClaims {
    /// Google's stable subject identifier for the account.
    pub sub: String,
    /// Intended audience -- must match our OAuth client id.
    pub aud: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Verify a Google ID token and return its claims.
pub async fn verify_google_id_token(
    client_id: &str,
    id_token: &str,
) -> Result<GoogleClaims, GoogleAuthError> {
    if id_token.is_empty() {
        return Err(GoogleAuthError::Rejected("empty id_token".to_string()));
    }

    let response = reqwest::Client::new()
        .get(TOKENINFO_URL)
        .query(&[("id_token", id_token)])
        .send()
        .await
        .map_err(|e| GoogleAuthError::Unavailable(e.to_string()))?;

    if !response.status().is_success() {
        return Err(GoogleAuthError::Rejected(format!(
            "tokeninfo returned {}",
            response.status()
        )));
    }

    let claims: GoogleClaims = response
        .json()
        .await
        .map_err(|e| GoogleAuthError::Rejected(format!("malformed tokeninfo response: {e}")))?;

    validate_audience(&claims, client_id)?;
    Ok(claims)
}

/// Check that the token was issued for our OAuth client.
pub fn validate_audience(claims: &GoogleClaims, client_id: &str) -> Result<(), GoogleAuthError> {
    if client_id.is_empty() {
        return Err(GoogleAuthError::Rejected(
            "GOOGLE_CLIENT_ID is not configured".to_string(),
        ));
    }
    if claims.aud != client_id {
        return Err(GoogleAuthError::Rejected(format!(
            "audience mismatch: {}",
            claims.aud
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(aud: &str) -> GoogleClaims {
        GoogleClaims {
            sub: "1234567890".to_string(),
            aud: aud.to_string(),
            email: Some("user@example.com".to_string()),
            name: None,
            picture: None,
        }
    }

    #[test]
    fn matching_audience_passes() {
        assert!(validate_audience(&claims("client-1"), "client-1").is_ok());
    }

    #[test]
    fn mismatched_audience_is_rejected() {
        let err = validate_audience(&claims("someone-else"), "client-1").unwrap_err();
        assert!(matches!(err, GoogleAuthError::Rejected(_)));
    }

    #[test]
    fn unconfigured_client_id_is_rejected() {
        let err = validate_audience(&claims("client-1"), "").unwrap_err();
        assert!(matches!(err, GoogleAuthError::Rejected(_)));
    }
}
