//! Token authentication for HTTP handlers.
//!
//! Requests authenticate with an `Authorization: Token <key>` header. The
//! [`AuthenticatedUser`] extractor parses the header and resolves the key via
//! the [`TokenAuthenticator`](crate::domain::ports::TokenAuthenticator) port
//! held in [`HttpState`].

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::error;

use crate::domain::{Error, User};

use super::state::HttpState;

/// Authorisation scheme keyword, matched case-insensitively.
pub const TOKEN_KEYWORD: &str = "Token";

const NOT_PROVIDED: &str = "Authentication credentials were not provided.";
const NO_CREDENTIALS: &str = "Invalid token header. No credentials provided.";
const CONTAINS_SPACES: &str = "Invalid token header. Token string should not contain spaces.";
const INVALID_CHARACTERS: &str =
    "Invalid token header. Token string should not contain invalid characters.";

/// Extract the token key from request headers.
///
/// A missing header or a different scheme is reported as "not provided";
/// malformed `Token` headers get a specific message.
pub(crate) fn token_from_headers(headers: &HeaderMap) -> Result<String, Error> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Err(Error::unauthorized(NOT_PROVIDED));
    };
    let Ok(value) = value.to_str() else {
        return Err(Error::unauthorized(INVALID_CHARACTERS));
    };

    let mut parts = value.split_whitespace();
    match parts.next() {
        Some(scheme) if scheme.eq_ignore_ascii_case(TOKEN_KEYWORD) => {}
        _ => return Err(Error::unauthorized(NOT_PROVIDED)),
    }
    let Some(key) = parts.next() else {
        return Err(Error::unauthorized(NO_CREDENTIALS));
    };
    if parts.next().is_some() {
        return Err(Error::unauthorized(CONTAINS_SPACES));
    }
    Ok(key.to_owned())
}

/// The caller resolved from a valid token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(User);

impl AuthenticatedUser {
    pub fn user(&self) -> &User {
        &self.0
    }

    pub fn into_inner(self) -> User {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let key = token_from_headers(req.headers());
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let key = key?;
            let Some(state) = state else {
                error!("HttpState missing from app data; cannot authenticate");
                return Err(Error::internal("authentication is not configured").into());
            };
            let user = state.authenticator.authenticate(&key).await?;
            Ok(AuthenticatedUser(user))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use actix_web::http::header::HeaderValue;
    use rstest::rstest;

    fn headers_with(value: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = value {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(value).expect("valid header value"),
            );
        }
        headers
    }

    #[rstest]
    #[case(None, NOT_PROVIDED)]
    #[case(Some("Bearer abc"), NOT_PROVIDED)]
    #[case(Some(""), NOT_PROVIDED)]
    #[case(Some("Token"), NO_CREDENTIALS)]
    #[case(Some("Token abc def"), CONTAINS_SPACES)]
    fn malformed_headers_are_rejected(#[case] header: Option<&str>, #[case] message: &str) {
        let err = token_from_headers(&headers_with(header)).expect_err("header must be rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), message);
    }

    #[rstest]
    fn non_ascii_header_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_bytes(b"Token \xff\xfe").expect("opaque bytes are allowed"),
        );
        let err = token_from_headers(&headers).expect_err("header must be rejected");
        assert_eq!(err.message(), INVALID_CHARACTERS);
    }

    #[rstest]
    #[case("Token 9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b")]
    #[case("token 9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b")]
    #[case("Token   9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b  ")]
    fn token_key_is_extracted(#[case] header: &str) {
        let key = token_from_headers(&headers_with(Some(header))).expect("valid header");
        assert_eq!(key, "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b");
    }
}
