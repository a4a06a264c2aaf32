//! S3 transport: URI resolution plus Signature V4 signed GETs.
//!
//! # Design Notes
//! - `s3://bucket/key` resolves to a virtual-hosted URL unless an endpoint
//!   override requests path-style addressing (S3-compatible stores).
//! - An http(s) source is used as-is and still signed, so pre-derived
//!   object URLs keep working.

use chrono::Utc;
use reqwest::Url;

use crate::acquire::http::{self, Upstream};
use crate::acquire::sigv4::{self, SigningParams};
use crate::acquire::AcquiredStream;
use crate::error::{ensure, DiffError, Phase};

const DEFAULT_REGION: &str = "us-east-1";

/// Acquire an S3 object with a signed GET.
pub(crate) fn acquire_s3(
    source: &str,
    access_key_id: &str,
    secret_access_key: &str,
    region: Option<&str>,
    endpoint: Option<&str>,
    session_token: Option<&str>,
) -> Result<AcquiredStream, DiffError> {
    ensure(
        !access_key_id.is_empty(),
        Phase::Auth,
        "Missing S3 access key ID",
    )?;
    ensure(
        !secret_access_key.is_empty(),
        Phase::Auth,
        "Missing S3 secret access key",
    )?;

    let region = region.unwrap_or(DEFAULT_REGION);
    let url_string = if source.starts_with("http://") || source.starts_with("https://") {
        source.to_string()
    } else {
        object_url(source, region, endpoint)?
    };
    let url = Url::parse(&url_string).map_err(|err| {
        DiffError::with_cause(Phase::Fetch, format!("Invalid S3 URL: {url_string}"), &err)
    })?;

    let params = SigningParams {
        access_key_id,
        secret_access_key,
        session_token,
        region,
    };
    let headers = sigv4::sign_get(&url, &params, Utc::now())?;
    http::fetch(url, headers, Upstream::S3)
}

/// Resolve an `s3://bucket/key` URI to an object URL.
fn object_url(source: &str, region: &str, endpoint: Option<&str>) -> Result<String, DiffError> {
    let rest = source.strip_prefix("s3://").ok_or_else(|| {
        DiffError::new(Phase::Fetch, format!("Invalid S3 URI: {source}"))
    })?;
    let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
    ensure(
        !bucket.is_empty(),
        Phase::Fetch,
        format!("S3 URI has an empty bucket: {source}"),
    )?;
    ensure(
        !key.is_empty(),
        Phase::Fetch,
        format!("S3 URI has an empty key: {source}"),
    )?;

    Ok(match endpoint {
        // Path-style for explicit endpoints.
        Some(endpoint) => format!("{}/{bucket}/{key}", endpoint.trim_end_matches('/')),
        None => format!("https://{bucket}.s3.{region}.amazonaws.com/{key}"),
    })
}
