//! Content-addressable result cache
//!
//! Maps a request fingerprint to previously generated audio. Two stores are
//! provided: an in-memory map and an on-disk directory keyed by the hex
//! digest. Entries are immutable once written; the first write for a
//! fingerprint wins and later inserts are no-ops.

use crate::types::GeneratedAudio;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Fingerprint width in bytes (Sha256 digest).
pub const FINGERPRINT_LEN: usize = 32;

/// File extension for on-disk cache entries.
const ENTRY_EXT: &str = "pcm";

/// Bytes preceding the sample payload in an on-disk entry:
/// sample rate (u32 LE) followed by sample count (u64 LE).
const ENTRY_HEADER_LEN: usize = 12;

/// Deterministic fingerprint of a synthesis request, used only as a cache
/// key. Equal key material yields an equal fingerprint; collisions are
/// unmitigated, so the cache is a dedup optimization, never an identity
/// guarantee.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Lowercase hex rendering, used as the on-disk file stem.
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(FINGERPRINT_LEN * 2);
        for byte in &self.0 {
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({}..)", &self.to_hex()[..8])
    }
}

/// Fingerprint of the input text alone.
///
/// Speaker id and speed deliberately do not participate here; see
/// [`crate::types::CacheKeyPolicy`].
pub fn fingerprint(text: &str) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    Fingerprint(hasher.finalize().into())
}

/// Voice-aware fingerprint: folds speaker id and speed into the digest.
pub fn fingerprint_with_voice(text: &str, speaker: u32, speed: f32) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update(speaker.to_le_bytes());
    hasher.update(speed.to_le_bytes());
    Fingerprint(hasher.finalize().into())
}

/// Storage-layer failures. Never conflated with a cache miss: a missing
/// entry is `Ok(None)` from lookup, anything else is an error.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("corrupt cache entry at {path}: {reason}")]
    CorruptEntry { path: PathBuf, reason: String },
}

/// Content-addressable store of generated audio.
///
/// Implementations are thread-safe; concurrent lookups for the same
/// fingerprint always observe the same entry once present, and at most one
/// physical write occurs per fingerprint under contention.
pub trait ResultCache: Send + Sync {
    /// Fetch the entry for `key`, if present. Stored data is never modified.
    fn lookup(&self, key: &Fingerprint) -> Result<Option<GeneratedAudio>, CacheError>;

    /// Store `audio` under `key`. A no-op if an entry already exists:
    /// results are deterministic for identical key material, and immutable
    /// entries keep concurrent readers stable.
    fn insert(&self, key: &Fingerprint, audio: &GeneratedAudio) -> Result<(), CacheError>;
}

impl<C: ResultCache + ?Sized> ResultCache for std::sync::Arc<C> {
    fn lookup(&self, key: &Fingerprint) -> Result<Option<GeneratedAudio>, CacheError> {
        (**self).lookup(key)
    }

    fn insert(&self, key: &Fingerprint, audio: &GeneratedAudio) -> Result<(), CacheError> {
        (**self).insert(key, audio)
    }
}

/// Hit/miss counters for a cache store.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

// ─── In-memory store ─────────────────────────────────────────────────

#[derive(Default)]
struct MemoryCacheInner {
    entries: HashMap<Fingerprint, GeneratedAudio>,
    hits: u64,
    misses: u64,
}

/// Unbounded in-process store.
#[derive(Default)]
pub struct MemoryCache {
    inner: Mutex<MemoryCacheInner>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            entries: inner.entries.len(),
            hits: inner.hits,
            misses: inner.misses,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultCache for MemoryCache {
    fn lookup(&self, key: &Fingerprint) -> Result<Option<GeneratedAudio>, CacheError> {
        let mut inner = self.inner.lock();
        match inner.entries.get(key).cloned() {
            Some(audio) => {
                inner.hits += 1;
                Ok(Some(audio))
            }
            None => {
                inner.misses += 1;
                Ok(None)
            }
        }
    }

    fn insert(&self, key: &Fingerprint, audio: &GeneratedAudio) -> Result<(), CacheError> {
        let mut inner = self.inner.lock();
        if inner.entries.contains_key(key) {
            debug!(key = %key.to_hex(), "entry already cached, keeping first write");
            return Ok(());
        }
        inner.entries.insert(*key, audio.clone());
        Ok(())
    }
}

// ─── On-disk store ───────────────────────────────────────────────────

/// Directory-backed store: one file per fingerprint, named by the hex
/// digest, so lookup is a pure function of the fingerprint.
///
/// Payload layout: sample rate (u32 LE), sample count (u64 LE), then raw
/// f32 LE samples.
pub struct DiskCache {
    dir: PathBuf,
    max_bytes: Option<u64>,
    // Single-writer insert policy; lookups go straight to the filesystem.
    write_lock: Mutex<()>,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: Option<u64>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            max_bytes,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &Fingerprint) -> PathBuf {
        self.dir.join(format!("{}.{ENTRY_EXT}", key.to_hex()))
    }

    /// Cache entry files with size and modification time, oldest first.
    fn scan_entries(&self) -> Result<Vec<(PathBuf, u64, std::time::SystemTime)>, CacheError> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXT) {
                continue;
            }
            let meta = entry.metadata()?;
            let modified = meta.modified().unwrap_or(std::time::UNIX_EPOCH);
            entries.push((path, meta.len(), modified));
        }
        entries.sort_by_key(|(_, _, modified)| *modified);
        Ok(entries)
    }

    pub fn entry_count(&self) -> Result<usize, CacheError> {
        Ok(self.scan_entries()?.len())
    }

    pub fn total_bytes(&self) -> Result<u64, CacheError> {
        Ok(self.scan_entries()?.iter().map(|(_, len, _)| len).sum())
    }

    /// Evict oldest-modified entries until `incoming` bytes fit the budget.
    /// Returns false when the entry alone exceeds the budget and should be
    /// skipped rather than stored.
    fn make_room(&self, incoming: u64) -> Result<bool, CacheError> {
        let max = match self.max_bytes {
            Some(max) => max,
            None => return Ok(true),
        };
        if incoming > max {
            warn!(
                incoming,
                max, "cache entry larger than the whole budget, not storing"
            );
            return Ok(false);
        }

        let entries = self.scan_entries()?;
        let mut total: u64 = entries.iter().map(|(_, len, _)| len).sum();
        for (path, len, _) in entries {
            if total + incoming <= max {
                break;
            }
            debug!(path = %path.display(), "evicting cache entry");
            match fs::remove_file(&path) {
                Ok(()) => total -= len,
                // Already gone is fine; eviction is best-effort per entry.
                Err(e) if e.kind() == io::ErrorKind::NotFound => total -= len,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(true)
    }

    fn encode(audio: &GeneratedAudio) -> Vec<u8> {
        let mut buf = Vec::with_capacity(ENTRY_HEADER_LEN + audio.samples.len() * 4);
        buf.extend_from_slice(&audio.sample_rate.to_le_bytes());
        buf.extend_from_slice(&(audio.samples.len() as u64).to_le_bytes());
        for sample in &audio.samples {
            buf.extend_from_slice(&sample.to_le_bytes());
        }
        buf
    }

    fn decode(path: &Path, bytes: &[u8]) -> Result<GeneratedAudio, CacheError> {
        if bytes.len() < ENTRY_HEADER_LEN {
            return Err(CacheError::CorruptEntry {
                path: path.to_path_buf(),
                reason: format!("{} bytes is shorter than the entry header", bytes.len()),
            });
        }
        let sample_rate = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let count = u64::from_le_bytes([
            bytes[4], bytes[5], bytes[6], bytes[7], bytes[8], bytes[9], bytes[10], bytes[11],
        ]);

        let payload = &bytes[ENTRY_HEADER_LEN..];
        if count.checked_mul(4) != Some(payload.len() as u64) {
            return Err(CacheError::CorruptEntry {
                path: path.to_path_buf(),
                reason: format!(
                    "header promises {count} samples but payload holds {} bytes",
                    payload.len()
                ),
            });
        }

        let samples = payload
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(GeneratedAudio::new(samples, sample_rate))
    }
}

impl ResultCache for DiskCache {
    fn lookup(&self, key: &Fingerprint) -> Result<Option<GeneratedAudio>, CacheError> {
        let path = self.entry_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Self::decode(&path, &bytes).map(Some)
    }

    fn insert(&self, key: &Fingerprint, audio: &GeneratedAudio) -> Result<(), CacheError> {
        let _guard = self.write_lock.lock();
        let path = self.entry_path(key);
        if path.exists() {
            debug!(key = %key.to_hex(), "entry already cached, keeping first write");
            return Ok(());
        }

        let bytes = Self::encode(audio);
        if !self.make_room(bytes.len() as u64)? {
            return Ok(());
        }
        fs::write(&path, bytes)?;
        debug!(key = %key.to_hex(), samples = audio.samples.len(), "cached entry to disk");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn audio(samples: &[f32], rate: u32) -> GeneratedAudio {
        GeneratedAudio::new(samples.to_vec(), rate)
    }

    #[test]
    fn fingerprint_is_deterministic() {
        assert_eq!(fingerprint("hello"), fingerprint("hello"));
        assert_ne!(fingerprint("hello"), fingerprint("hullo"));
    }

    #[test]
    fn fingerprint_ignores_voice_fields() {
        assert_eq!(
            fingerprint("hello"),
            fingerprint("hello"),
            "text-only fingerprint must not see speaker or speed"
        );
        assert_ne!(
            fingerprint_with_voice("hello", 0, 1.0),
            fingerprint_with_voice("hello", 1, 1.0)
        );
        assert_ne!(
            fingerprint_with_voice("hello", 0, 1.0),
            fingerprint_with_voice("hello", 0, 2.0)
        );
    }

    #[test]
    fn fingerprint_hex_is_fixed_width() {
        let hex = fingerprint("x").to_hex();
        assert_eq!(hex.len(), FINGERPRINT_LEN * 2);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn memory_lookup_is_read_stable() {
        let cache = MemoryCache::new();
        let key = fingerprint("hello");
        cache.insert(&key, &audio(&[0.1, 0.2], 22_050)).unwrap();

        let first = cache.lookup(&key).unwrap().unwrap();
        let second = cache.lookup(&key).unwrap().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn memory_first_write_wins() {
        let cache = MemoryCache::new();
        let key = fingerprint("hello");
        cache.insert(&key, &audio(&[0.1], 22_050)).unwrap();
        cache.insert(&key, &audio(&[0.9, 0.9], 44_100)).unwrap();

        let stored = cache.lookup(&key).unwrap().unwrap();
        assert_eq!(stored.samples, vec![0.1]);
        assert_eq!(stored.sample_rate, 22_050);
    }

    #[test]
    fn memory_stats_count_hits_and_misses() {
        let cache = MemoryCache::new();
        let key = fingerprint("hello");
        assert!(cache.lookup(&key).unwrap().is_none());
        cache.insert(&key, &audio(&[0.5], 16_000)).unwrap();
        assert!(cache.lookup(&key).unwrap().is_some());

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn memory_concurrent_inserts_keep_one_stable_entry() {
        use std::sync::Arc;
        use std::thread;

        let cache = Arc::new(MemoryCache::new());
        let key = fingerprint("contended");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    cache
                        .insert(&key, &GeneratedAudio::new(vec![i as f32], 16_000))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.stats().entries, 1, "one physical write per key");
        let first = cache.lookup(&key).unwrap().unwrap();
        let second = cache.lookup(&key).unwrap().unwrap();
        assert_eq!(first, second, "entry is stable once written");
    }

    #[test]
    fn disk_round_trips_an_entry() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path(), None).unwrap();
        let key = fingerprint("hello");
        let stored = audio(&[0.1, -0.5, 1.0], 22_050);

        cache.insert(&key, &stored).unwrap();
        let loaded = cache.lookup(&key).unwrap().unwrap();
        assert_eq!(loaded, stored);
    }

    #[test]
    fn disk_absent_entry_is_a_miss_not_an_error() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path(), None).unwrap();
        assert!(cache.lookup(&fingerprint("nothing")).unwrap().is_none());
    }

    #[test]
    fn disk_truncated_entry_is_corrupt_not_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path(), None).unwrap();
        let key = fingerprint("hello");
        cache.insert(&key, &audio(&[0.1, 0.2, 0.3], 22_050)).unwrap();

        // Chop the payload so the header count no longer matches.
        let path = dir.path().join(format!("{}.pcm", key.to_hex()));
        let mut bytes = fs::read(&path).unwrap();
        bytes.truncate(bytes.len() - 4);
        fs::write(&path, bytes).unwrap();

        match cache.lookup(&key) {
            Err(CacheError::CorruptEntry { .. }) => {}
            other => panic!("expected CorruptEntry, got {other:?}"),
        }
    }

    #[test]
    fn disk_first_write_wins() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path(), None).unwrap();
        let key = fingerprint("hello");
        cache.insert(&key, &audio(&[0.1], 22_050)).unwrap();
        cache.insert(&key, &audio(&[0.9, 0.9], 8_000)).unwrap();

        let stored = cache.lookup(&key).unwrap().unwrap();
        assert_eq!(stored.samples, vec![0.1]);
    }

    #[test]
    fn disk_eviction_respects_budget() {
        let dir = TempDir::new().unwrap();
        // Each 10-sample entry takes 12 + 40 = 52 bytes; budget fits two.
        let cache = DiskCache::new(dir.path(), Some(110)).unwrap();
        let entry = audio(&[0.5; 10], 16_000);

        for text in ["a", "b", "c"] {
            cache.insert(&fingerprint(text), &entry).unwrap();
        }

        assert!(cache.total_bytes().unwrap() <= 110);
        assert!(cache.entry_count().unwrap() < 3);
    }

    #[test]
    fn disk_skips_entry_larger_than_budget() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path(), Some(20)).unwrap();
        let key = fingerprint("big");
        cache.insert(&key, &audio(&[0.5; 100], 16_000)).unwrap();

        assert!(cache.lookup(&key).unwrap().is_none());
        assert_eq!(cache.entry_count().unwrap(), 0);
    }

    #[test]
    fn disk_empty_audio_round_trips() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path(), None).unwrap();
        let key = fingerprint("silence");
        cache.insert(&key, &audio(&[], 22_050)).unwrap();

        let loaded = cache.lookup(&key).unwrap().unwrap();
        assert!(loaded.is_empty());
        assert_eq!(loaded.sample_rate, 22_050);
    }
}
