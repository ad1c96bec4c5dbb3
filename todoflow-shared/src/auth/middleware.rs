/// Request authentication
///
/// Resolves the caller's identity from the `Authorization: Bearer <token>`
/// header. The API server runs this once per request in its auth layer and
/// stores the resulting [`AuthContext`] in the request extensions; business
/// logic receives it as an explicit argument.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use todoflow_shared::auth::jwt::{create_token, Claims, TokenType};
/// use todoflow_shared::auth::middleware::authenticate_headers;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let user_id = Uuid::new_v4();
/// let token = create_token(&Claims::new(user_id, TokenType::Access), secret)?;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
///
/// let auth = authenticate_headers(&headers, secret)?;
/// assert_eq!(auth.user_id, user_id);
/// # Ok(())
/// # }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};

/// Authenticated caller identity
///
/// Handlers extract it with Axum's `Extension` extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates auth context for a user
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Error type for identity resolution
///
/// Every variant means the caller is unauthenticated; the variants only
/// differ in what gets logged.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Authorization header present but not `Bearer <token>`
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("Invalid session token: {0}")]
    InvalidToken(#[from] JwtError),
}

/// Resolves the caller from request headers
///
/// # Errors
///
/// Returns an error if:
/// - Authorization header is missing
/// - The header is not a Bearer token
/// - Token validation fails (bad signature, expired, wrong issuer or type)
pub fn authenticate_headers(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Header is not valid ASCII".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_access_token(token, secret)?;

    Ok(AuthContext::new(claims.sub))
}
