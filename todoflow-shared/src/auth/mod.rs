/// Authentication and authorization
///
/// # Modules
///
/// - [`jwt`]: Session token signing and validation (HS256)
/// - [`middleware`]: Resolving the caller's [`middleware::AuthContext`] from request headers
/// - [`authorization`]: The ownership guard run before every todo mutation
///
/// Issuing session tokens (the email one-time-code flow) is the auth
/// provider's job; this crate only verifies them.

pub mod authorization;
pub mod jwt;
pub mod middleware;
