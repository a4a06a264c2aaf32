//! Source acquisition: resolve a source description to a byte stream.
//!
//! # Scope
//! Four transports (HTTP(S), S3 Signature V4, inline bytes, local file)
//! composed orthogonally with authentication, so transports and auth
//! schemes never multiply implementations. Every transport yields an
//! [`AcquiredStream`] that is consumed exactly once by the decompressor.
//!
//! # Invariants
//! - No stream whose declared size exceeds [`MAX_TARBALL_SIZE`] is ever
//!   body-consumed.
//! - Every returned stream also enforces the cap on actual consumed bytes,
//!   so an upstream that understates its size still fails closed.
//! - Credentials never appear in errors; messages pass through redaction
//!   at construction.

pub mod file;
pub mod http;
pub mod inline;
pub mod s3;
pub(crate) mod sigv4;
pub(crate) mod stream;

use std::io::Read;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DiffError, Phase};

/// Hard per-archive cap on acquired bytes: 20 MiB.
pub const MAX_TARBALL_SIZE: u64 = 20 * 1024 * 1024;

/// Authentication scheme attached to a URL source.
///
/// Schemes are a closed set; an unknown scheme is unrepresentable here and
/// must be rejected by whatever parses external input into this type.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Auth {
    /// No `Authorization` header.
    #[default]
    None,
    /// `Authorization: Bearer <credential>`.
    Bearer(String),
    /// `Authorization: Basic <credential>`, credential pre-encoded as
    /// base64 `user:pass`.
    Basic(String),
}

/// In-memory archive payload: raw bytes or base64 text.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InlineData {
    Bytes(Vec<u8>),
    Base64(String),
}

/// Description of how to obtain one archive.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SourceConfig {
    /// Plain HTTP(S) GET.
    #[serde(rename_all = "camelCase")]
    Url {
        source: String,
        #[serde(default)]
        auth: Auth,
    },
    /// S3 object fetched with a Signature V4 signed GET.
    #[serde(rename_all = "camelCase")]
    S3 {
        /// `s3://bucket/key`, or an http(s) URL used as-is.
        source: String,
        access_key_id: String,
        secret_access_key: String,
        /// Defaults to `us-east-1`.
        #[serde(default)]
        region: Option<String>,
        /// Path-style endpoint override for S3-compatible stores.
        #[serde(default)]
        endpoint: Option<String>,
        #[serde(default)]
        session_token: Option<String>,
    },
    /// Archive bytes supplied directly by the caller.
    #[serde(rename_all = "camelCase")]
    Inline { data: InlineData },
    /// Archive read from the local filesystem.
    #[serde(rename_all = "camelCase")]
    File { path: PathBuf },
}

/// An acquired archive stream plus the source's advertised byte count.
pub struct AcquiredStream {
    /// Consumed at most once by the pipeline.
    pub reader: Box<dyn Read + Send>,
    /// Advertised size when the source declares one.
    pub declared_size: Option<u64>,
}

impl std::fmt::Debug for AcquiredStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquiredStream")
            .field("declared_size", &self.declared_size)
            .finish()
    }
}

/// Resolve a source description to a byte stream.
pub fn acquire(config: &SourceConfig) -> Result<AcquiredStream, DiffError> {
    match config {
        SourceConfig::Url { source, auth } => {
            tracing::debug!(transport = "url", "acquiring archive");
            http::acquire_url(source, auth)
        }
        SourceConfig::S3 {
            source,
            access_key_id,
            secret_access_key,
            region,
            endpoint,
            session_token,
        } => {
            tracing::debug!(transport = "s3", "acquiring archive");
            s3::acquire_s3(
                source,
                access_key_id,
                secret_access_key,
                region.as_deref(),
                endpoint.as_deref(),
                session_token.as_deref(),
            )
        }
        SourceConfig::Inline { data } => {
            tracing::debug!(transport = "inline", "acquiring archive");
            inline::acquire_inline(data)
        }
        SourceConfig::File { path } => {
            tracing::debug!(transport = "file", "acquiring archive");
            file::acquire_file(path)
        }
    }
}

/// Gate an advertised byte count against the archive cap.
pub(crate) fn check_declared_size(declared: u64) -> Result<(), DiffError> {
    if declared > MAX_TARBALL_SIZE {
        return Err(DiffError::new(
            Phase::Size,
            format!("Archive size {declared} bytes exceeds limit of {MAX_TARBALL_SIZE} bytes"),
        ));
    }
    Ok(())
}
