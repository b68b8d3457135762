use axum::http::HeaderValue;

use crate::error::AuthError;

pub const HEADER_MISSING: AuthError = AuthError::new(
    "authorization_header_missing",
    "Authorization header is expected.",
);
pub const NOT_BEARER: AuthError = AuthError::new(
    "invalid_header",
    "Authorization header must start with \"Bearer\".",
);
pub const TOKEN_NOT_FOUND: AuthError = AuthError::new("invalid_header", "Token not found.");
pub const NOT_A_BEARER_TOKEN: AuthError = AuthError::new(
    "invalid_header",
    "Authorization header must be bearer token.",
);
pub const UNREADABLE_HEADER: AuthError = AuthError::new(
    "invalid_header",
    "Authorization header must be visible ASCII.",
);

/// Same as [`token_from_header`], starting from the raw header value.
pub fn token_from_header_value(value: Option<&HeaderValue>) -> Result<&str, AuthError> {
    let header = value
        .map(|v| v.to_str().map_err(|_| UNREADABLE_HEADER))
        .transpose()?;
    token_from_header(header)
}

/// Pulls the raw token out of an `Authorization: Bearer <token>` header value.
pub fn token_from_header(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(HEADER_MISSING)?;
    let parts: Vec<&str> = header.split_whitespace().collect();

    match parts.as_slice() {
        [] => Err(HEADER_MISSING),
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => Err(NOT_BEARER),
        [_] => Err(TOKEN_NOT_FOUND),
        [_, token] => Ok(token),
        _ => Err(NOT_A_BEARER_TOKEN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_token() {
        assert_eq!(token_from_header(Some("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        assert_eq!(token_from_header(Some("bearer tok")), Ok("tok"));
        assert_eq!(token_from_header(Some("BEARER tok")), Ok("tok"));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(token_from_header(None), Err(HEADER_MISSING));
    }

    #[test]
    fn test_blank_header_counts_as_missing() {
        assert_eq!(token_from_header(Some("   ")), Err(HEADER_MISSING));
    }

    #[test]
    fn test_wrong_scheme() {
        assert_eq!(token_from_header(Some("Basic dXNlcjpwYXNz")), Err(NOT_BEARER));
    }

    #[test]
    fn test_scheme_without_token() {
        assert_eq!(token_from_header(Some("Bearer")), Err(TOKEN_NOT_FOUND));
    }

    #[test]
    fn test_too_many_parts() {
        assert_eq!(token_from_header(Some("Bearer a b")), Err(NOT_A_BEARER_TOKEN));
    }

    #[test]
    fn test_header_value_with_token() {
        let value = HeaderValue::from_static("Bearer abc.def.ghi");
        assert_eq!(token_from_header_value(Some(&value)), Ok("abc.def.ghi"));
        assert_eq!(token_from_header_value(None), Err(HEADER_MISSING));
    }

    #[test]
    fn test_non_ascii_header_value_is_invalid_not_missing() {
        let value = HeaderValue::from_bytes(b"Bearer caf\xe9").unwrap();
        let err = token_from_header_value(Some(&value)).unwrap_err();
        assert_eq!(err, UNREADABLE_HEADER);
        assert_eq!(err.code, "invalid_header");
    }
}
