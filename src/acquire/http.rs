//! HTTP(S) transport.
//!
//! # Design Notes
//! - Auth materialization is a pure function onto a header map; transports
//!   never branch on the auth scheme beyond this point.
//! - Redirects are followed by the client; the size gate runs on the final
//!   response's `Content-Length` before the body is consumed.
//! - No timeout is imposed here; callers wrap the whole diff in their
//!   runtime's timeout.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{StatusCode, Url};

use crate::acquire::stream::{SizeLimitedRead, SourceRead};
use crate::acquire::{check_declared_size, AcquiredStream, Auth, MAX_TARBALL_SIZE};
use crate::error::{DiffError, Phase};

/// Which upstream produced the response, for error mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Upstream {
    Generic,
    S3,
}

/// Materialize an auth scheme as an `Authorization` header.
pub(crate) fn apply_auth(headers: &mut HeaderMap, auth: &Auth) -> Result<(), DiffError> {
    let value = match auth {
        Auth::None => return Ok(()),
        Auth::Bearer(credential) => {
            if credential.is_empty() {
                return Err(DiffError::new(Phase::Auth, "Missing bearer credential"));
            }
            header_value(&format!("Bearer {credential}"), "bearer")?
        }
        Auth::Basic(credential) => {
            if credential.is_empty() {
                return Err(DiffError::new(Phase::Auth, "Missing basic credential"));
            }
            header_value(&format!("Basic {credential}"), "basic")?
        }
    };
    headers.insert(AUTHORIZATION, value);
    Ok(())
}

fn header_value(raw: &str, scheme: &str) -> Result<HeaderValue, DiffError> {
    // The credential must not leak into the error, so the cause is elided.
    HeaderValue::from_str(raw)
        .map_err(|_| DiffError::new(Phase::Auth, format!("Invalid {scheme} credential")))
}

/// Acquire an archive over plain HTTP(S).
pub(crate) fn acquire_url(source: &str, auth: &Auth) -> Result<AcquiredStream, DiffError> {
    let url = Url::parse(source)
        .map_err(|err| DiffError::with_cause(Phase::Fetch, format!("Invalid URL: {source}"), &err))?;
    let mut headers = HeaderMap::new();
    apply_auth(&mut headers, auth)?;
    fetch(url, headers, Upstream::Generic)
}

/// Issue the GET and wrap the body in size and error-context guards.
pub(crate) fn fetch(
    url: Url,
    headers: HeaderMap,
    upstream: Upstream,
) -> Result<AcquiredStream, DiffError> {
    let client = Client::builder()
        .timeout(None)
        .build()
        .map_err(|err| DiffError::with_cause(Phase::Fetch, "Failed to build HTTP client", &err))?;

    let response = client
        .get(url.clone())
        .headers(headers)
        .send()
        .map_err(|err| {
            DiffError::with_cause(Phase::Fetch, format!("Network error fetching {url}"), &err)
        })?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(DiffError::new(
            Phase::Auth,
            format!("Authentication failed: {} {}", status.as_u16(), reason(status)),
        ));
    }
    if upstream == Upstream::S3 && status == StatusCode::NOT_FOUND {
        return Err(DiffError::new(Phase::Fetch, "S3 object not found"));
    }
    if !status.is_success() {
        return Err(DiffError::new(
            Phase::Fetch,
            format!("HTTP {} {} for {url}", status.as_u16(), reason(status)),
        ));
    }

    let declared = response.content_length();
    if let Some(size) = declared {
        check_declared_size(size)?;
    }
    tracing::debug!(%url, declared_size = ?declared, "response accepted");

    let context = format!("Network error fetching {url}");
    let reader = SizeLimitedRead::new(SourceRead::new(response, context), MAX_TARBALL_SIZE);
    Ok(AcquiredStream {
        reader: Box::new(reader),
        declared_size: declared,
    })
}

fn reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_header(auth: &Auth) -> Result<Option<String>, DiffError> {
        let mut headers = HeaderMap::new();
        apply_auth(&mut headers, auth)?;
        Ok(headers
            .get(AUTHORIZATION)
            .map(|v| v.to_str().unwrap().to_string()))
    }

    #[test]
    fn no_auth_sends_no_header() {
        assert_eq!(auth_header(&Auth::None).unwrap(), None);
    }

    #[test]
    fn bearer_auth_prefixes_the_credential() {
        let header = auth_header(&Auth::Bearer("tok123".into())).unwrap();
        assert_eq!(header.as_deref(), Some("Bearer tok123"));
    }

    #[test]
    fn basic_auth_carries_the_preencoded_credential() {
        let header = auth_header(&Auth::Basic("dXNlcjpwYXNz".into())).unwrap();
        assert_eq!(header.as_deref(), Some("Basic dXNlcjpwYXNz"));
    }

    #[test]
    fn empty_credentials_fail_auth() {
        for auth in [Auth::Bearer(String::new()), Auth::Basic(String::new())] {
            let err = auth_header(&auth).unwrap_err();
            assert_eq!(err.phase(), Phase::Auth);
            assert_eq!(err.status(), 401);
        }
    }

    #[test]
    fn control_characters_in_credentials_fail_without_leaking() {
        let err = auth_header(&Auth::Bearer("bad\nvalue".into())).unwrap_err();
        assert_eq!(err.phase(), Phase::Auth);
        assert!(!err.message().contains("bad"));
    }

    #[test]
    fn invalid_urls_fail_fetch() {
        let err = acquire_url("not a url", &Auth::None).unwrap_err();
        assert_eq!(err.phase(), Phase::Fetch);
        assert!(err.message().contains("Invalid URL"));
    }
}
