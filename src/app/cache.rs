// iislens - app/cache.rs
//
// Last-successful-result cache, owned by the shell and keyed by upload
// identity. Holds the unfiltered aggregate of the most recent batch so a
// re-export (different filter, different format) does not re-parse.
//
// Deliberately an explicit object with explicit invalidation — never
// ambient global state inside the parsing core.

use crate::core::aggregate::AggregateResult;
use std::path::PathBuf;
use std::time::SystemTime;

/// Identity of a batch of input files: path, size, and mtime of each,
/// sorted by path so enumeration order does not affect equality.
///
/// Two batches with equal fingerprints parse to the same result (parsing is
/// deterministic and pure), so a fingerprint match makes the cached result
/// valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFingerprint(Vec<(PathBuf, u64, Option<SystemTime>)>);

impl InputFingerprint {
    /// Fingerprint a set of input files from their current metadata.
    ///
    /// Fails on the first unreadable file: an unreadable input cannot be
    /// proven unchanged, so no cache identity exists for the batch.
    pub fn of(paths: &[PathBuf]) -> std::io::Result<Self> {
        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let meta = std::fs::metadata(path)?;
            entries.push((path.clone(), meta.len(), meta.modified().ok()));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(Self(entries))
    }
}

/// Single-slot cache for the last successful aggregate.
#[derive(Debug, Default)]
pub struct ResultCache {
    entry: Option<(InputFingerprint, AggregateResult)>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached result if `fingerprint` matches the stored one.
    pub fn lookup(&self, fingerprint: &InputFingerprint) -> Option<&AggregateResult> {
        match &self.entry {
            Some((cached_fp, result)) if cached_fp == fingerprint => Some(result),
            _ => None,
        }
    }

    /// Store a result, replacing whatever was cached. Storing under a new
    /// fingerprint IS the invalidation: one upload, one slot.
    pub fn store(&mut self, fingerprint: InputFingerprint, result: AggregateResult) {
        self.entry = Some((fingerprint, result));
    }

    /// Drop the cached result.
    pub fn clear(&mut self) {
        self.entry = None;
    }
}
