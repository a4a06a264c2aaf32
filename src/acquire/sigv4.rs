//! AWS Signature Version 4 for S3 GET requests.
//!
//! # Algorithm
//! - Build the canonical request (method, encoded path, sorted query,
//!   sorted signed headers, empty-payload hash).
//! - Derive the signing key through the HMAC chain
//!   date → region → service → `aws4_request`.
//! - Emit `Authorization`, `x-amz-date`, `x-amz-content-sha256`, and
//!   `x-amz-security-token` (when a session token is present).
//!
//! # Invariants
//! - Path encoding uses the strict unreserved set with `/` preserved;
//!   query encoding additionally escapes `/`.
//! - Header names are lowercased and sorted in both the canonical header
//!   block and the signed-header list.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Url;
use sha2::{Digest, Sha256};

use crate::error::{DiffError, Phase};

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";

/// Credentials and scope inputs for one signed request.
pub(crate) struct SigningParams<'a> {
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub session_token: Option<&'a str>,
    pub region: &'a str,
}

/// Sign a GET for `url`, returning the headers to attach.
pub(crate) fn sign_get(
    url: &Url,
    params: &SigningParams<'_>,
    now: DateTime<Utc>,
) -> Result<HeaderMap, DiffError> {
    let host = canonical_host(url)?;
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = now.format("%Y%m%d").to_string();
    let payload_hash = hex(&Sha256::digest(b""));

    let mut canonical_headers: Vec<(String, String)> = vec![
        ("host".into(), host),
        ("x-amz-content-sha256".into(), payload_hash.clone()),
        ("x-amz-date".into(), amz_date.clone()),
    ];
    if let Some(token) = params.session_token {
        canonical_headers.push(("x-amz-security-token".into(), token.to_string()));
    }
    canonical_headers.sort();
    let signed_headers = canonical_headers
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let mut canonical_request = String::new();
    canonical_request.push_str("GET\n");
    canonical_request.push_str(&canonical_uri(url.path()));
    canonical_request.push('\n');
    canonical_request.push_str(&canonical_query(url));
    canonical_request.push('\n');
    for (name, value) in &canonical_headers {
        canonical_request.push_str(name);
        canonical_request.push(':');
        canonical_request.push_str(value.trim());
        canonical_request.push('\n');
    }
    canonical_request.push('\n');
    canonical_request.push_str(&signed_headers);
    canonical_request.push('\n');
    canonical_request.push_str(&payload_hash);

    let scope = format!("{date}/{}/{SERVICE}/aws4_request", params.region);
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        hex(&Sha256::digest(canonical_request.as_bytes()))
    );

    let signing_key = derive_signing_key(params.secret_access_key, &date, params.region, SERVICE);
    let signature = hex(&hmac_sha256(&signing_key, string_to_sign.as_bytes()));

    let authorization = format!(
        "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
        params.access_key_id
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("x-amz-date"),
        header_value(&amz_date)?,
    );
    headers.insert(
        HeaderName::from_static("x-amz-content-sha256"),
        header_value(&payload_hash)?,
    );
    if let Some(token) = params.session_token {
        headers.insert(
            HeaderName::from_static("x-amz-security-token"),
            header_value(token)?,
        );
    }
    headers.insert(AUTHORIZATION, header_value(&authorization)?);
    Ok(headers)
}

fn header_value(raw: &str) -> Result<HeaderValue, DiffError> {
    // Credential material must not leak into the error.
    HeaderValue::from_str(raw)
        .map_err(|_| DiffError::new(Phase::Auth, "Invalid characters in S3 credentials"))
}

fn canonical_host(url: &Url) -> Result<String, DiffError> {
    let host = url
        .host_str()
        .ok_or_else(|| DiffError::new(Phase::Fetch, format!("URL has no host: {url}")))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Re-encode a URL path with the strict unreserved set, `/` preserved.
fn canonical_uri(path: &str) -> String {
    let decoded = percent_decode(path.as_bytes());
    uri_encode(&decoded, true)
}

fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            (
                uri_encode(k.as_bytes(), false),
                uri_encode(v.as_bytes(), false),
            )
        })
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn uri_encode(bytes: &[u8], keep_slash: bool) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char)
            }
            b'/' if keep_slash => out.push('/'),
            _ => {
                out.push('%');
                out.push_str(&format!("{b:02X}"));
            }
        }
    }
    out
}

/// Decode `%XX` sequences; malformed sequences pass through unchanged.
fn percent_decode(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] == b'%' {
            if let (Some(hi), Some(lo)) = (
                bytes.get(idx + 1).and_then(|b| hex_digit(*b)),
                bytes.get(idx + 2).and_then(|b| hex_digit(*b)),
            ) {
                out.push(hi << 4 | lo);
                idx += 3;
                continue;
            }
        }
        out.push(bytes[idx]);
        idx += 1;
    }
    out
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn derive_signing_key(secret: &str, date: &str, region: &str, service: &str) -> [u8; 32] {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

/// HMAC-SHA256 (RFC 2104) over the `sha2` digest.
fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    const BLOCK_LEN: usize = 64;
    let mut block = [0u8; BLOCK_LEN];
    if key.len() > BLOCK_LEN {
        block[..32].copy_from_slice(&Sha256::digest(key));
    } else {
        block[..key.len()].copy_from_slice(key);
    }

    let mut ipad = [0x36u8; BLOCK_LEN];
    let mut opad = [0x5cu8; BLOCK_LEN];
    for idx in 0..BLOCK_LEN {
        ipad[idx] ^= block[idx];
        opad[idx] ^= block[idx];
    }

    let inner = Sha256::new()
        .chain_update(ipad)
        .chain_update(data)
        .finalize();
    Sha256::new()
        .chain_update(opad)
        .chain_update(inner)
        .finalize()
        .into()
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
