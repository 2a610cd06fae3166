//! Identity extractors.
//!
//! Authentication is delegated to the external identity provider; the
//! layer in front of this service verifies the session and forwards the
//! result in `x-user-id`, `x-user-name`, and `x-user-email` headers.
//! These extractors read those headers in route handlers.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use stg_catalog_core::UserId;

use crate::models::Identity;

const USER_ID_HEADER: &str = "x-user-id";
const USER_NAME_HEADER: &str = "x-user-name";
const USER_EMAIL_HEADER: &str = "x-user-email";

/// Extractor that requires a signed-in identity.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireIdentity(identity): RequireIdentity,
/// ) -> impl IntoResponse {
///     format!("Olá, {}!", identity.display_name())
/// }
/// ```
pub struct RequireIdentity(pub Identity);

/// Rejection returned when no valid identity headers are present.
pub struct IdentityRejection;

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Não autenticado" })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for RequireIdentity
where
    S: Send + Sync,
{
    type Rejection = IdentityRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity_from_headers(&parts.headers)
            .map(Self)
            .ok_or(IdentityRejection)
    }
}

/// Extractor that optionally reads the identity.
///
/// Unlike `RequireIdentity`, this does not reject the request when the
/// headers are absent.
pub struct OptionalIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for OptionalIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(identity_from_headers(&parts.headers)))
    }
}

/// Assemble an identity from the forwarded headers.
///
/// The ID must be a valid UUID; name and email are optional and blank
/// values are dropped.
fn identity_from_headers(headers: &HeaderMap) -> Option<Identity> {
    let id = headers
        .get(USER_ID_HEADER)?
        .to_str()
        .ok()?
        .parse::<UserId>()
        .ok()?;

    Some(Identity {
        id,
        name: header_string(headers, USER_NAME_HEADER),
        email: header_string(headers, USER_EMAIL_HEADER),
    })
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_identity_from_headers() {
        let user_id = uuid::Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_str(&user_id.to_string()).unwrap());
        headers.insert(USER_NAME_HEADER, HeaderValue::from_static("Maria"));
        headers.insert(
            USER_EMAIL_HEADER,
            HeaderValue::from_static("maria@test.com"),
        );

        let identity = identity_from_headers(&headers).unwrap();
        assert_eq!(identity.id.as_uuid(), user_id);
        assert_eq!(identity.name.as_deref(), Some("Maria"));
        assert_eq!(identity.email.as_deref(), Some("maria@test.com"));
    }

    #[test]
    fn test_missing_or_invalid_id_yields_none() {
        assert!(identity_from_headers(&HeaderMap::new()).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert!(identity_from_headers(&headers).is_none());
    }

    #[test]
    fn test_blank_name_and_email_are_dropped() {
        let user_id = uuid::Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_str(&user_id.to_string()).unwrap());
        headers.insert(USER_NAME_HEADER, HeaderValue::from_static("  "));

        let identity = identity_from_headers(&headers).unwrap();
        assert_eq!(identity.name, None);
        assert_eq!(identity.email, None);
    }
}
