//! Deterministic fingerprint of a retriever's effective configuration.
//!
//! Hosts use the fingerprint to memoize pipeline results keyed by the
//! retriever and its input batch. It is derived from the backend identity
//! captured at construction, never from a live backend call, so it cannot
//! drift while a retriever is alive. No cross-process stability is promised
//! beyond "same inputs, same digest".

use std::fmt;

use crate::backend::BackendIdentity;
use crate::config::RetrieveConfig;

/// Domain separator so digests from other BLAKE3 users cannot collide by accident.
const FINGERPRINT_CONTEXT: &str = "es-retrieve fingerprint v2";

/// Feeds length-prefixed values to a hasher so adjacent fields cannot run together.
struct FingerprintWriter(blake3::Hasher);

impl FingerprintWriter {
    fn len(&mut self, len: usize) -> &mut Self {
        self.0.update(&(len as u64).to_le_bytes());
        self
    }

    fn str(&mut self, value: &str) -> &mut Self {
        self.len(value.len());
        self.0.update(value.as_bytes());
        self
    }

    fn flag(&mut self, value: bool) -> &mut Self {
        self.0.update(&[u8::from(value)]);
        self
    }
}

/// A 256-bit configuration digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(blake3::Hash);

impl Fingerprint {
    /// Derive the fingerprint of `config` served by the backend described by `identity`.
    ///
    /// Covers the endpoint, the captured backend info, `index`, `num_results`,
    /// `verbose`, the searched fields and the extraction map, in that order.
    pub fn derive(identity: &BackendIdentity, config: &RetrieveConfig) -> Self {
        let mut w = FingerprintWriter(blake3::Hasher::new_derive_key(FINGERPRINT_CONTEXT));
        w.str(&identity.endpoint)
            .str(&identity.info.to_string())
            .str(&config.index);
        match config.num_results {
            Some(n) => w.flag(true).len(n),
            None => w.flag(false),
        };
        w.flag(config.verbose).len(config.fields.len());
        for field in &config.fields {
            w.str(field);
        }
        w.len(config.columns.len());
        for (path, column) in config.columns.iter() {
            w.str(path).str(column);
        }
        Self(w.0.finalize())
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// Lowercase hex rendering of the digest.
    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
