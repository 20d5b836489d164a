//! Pluggable content hashing with streaming file support.
//!
//! # Overview
//!
//! Duplicate detection only needs a digest to compare, never a particular
//! algorithm. [`HashAlgorithm`] is the capability the pipeline depends on:
//! a one-shot [`HashAlgorithm::digest`] and an incremental [`HashState`]
//! (`update` / `finalize`). Three implementations ship with the crate:
//!
//! - [`Xxh64`]: fast non-cryptographic 64-bit hash (default)
//! - [`Blake3`]: cryptographic, 256-bit
//! - [`Sha256`]: cryptographic, 256-bit
//!
//! [`FileHasher`] applies an algorithm to files: a prefix hash over the first
//! [`PREHASH_SIZE`] bytes and a full hash streamed in [`CHUNK_SIZE`] chunks.
//!
//! # Example
//!
//! ```no_run
//! use dupfunnel::scanner::{FileHasher, HashKind};
//! use std::path::Path;
//!
//! let hasher = FileHasher::new(HashKind::Blake3.algorithm());
//! let digest = hasher.full_hash(Path::new("some_file.bin")).unwrap();
//! println!("{}:{}", hasher.algorithm_name(), digest);
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize, Serializer};

use super::HashError;

/// Number of leading bytes hashed by the partial-hash stage.
pub const PREHASH_SIZE: usize = 1024;

/// Read buffer size for full-content hashing.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Output of a hash algorithm.
///
/// The length depends on the algorithm (8 bytes for xxHash64, 32 for the
/// others); digests from different algorithms are never compared.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest(Box<[u8]>);

impl Digest {
    /// Wrap raw digest bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.into())
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hexadecimal representation.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Incremental hashing state.
pub trait HashState: Send {
    /// Feed more bytes into the hash.
    fn update(&mut self, bytes: &[u8]);

    /// Consume the state and produce the digest.
    fn finalize(self: Box<Self>) -> Digest;
}

/// A hash algorithm usable by the duplicate pipeline.
pub trait HashAlgorithm: Send + Sync + fmt::Debug {
    /// Short identifier, e.g. `"xxh64"`.
    fn name(&self) -> &'static str;

    /// Start a new incremental hash.
    fn start(&self) -> Box<dyn HashState>;

    /// Hash a complete buffer in one call.
    fn digest(&self, bytes: &[u8]) -> Digest {
        let mut state = self.start();
        state.update(bytes);
        state.finalize()
    }
}

/// xxHash64 with seed 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct Xxh64;

struct Xxh64State(xxhash_rust::xxh64::Xxh64);

impl HashState for Xxh64State {
    fn update(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    fn finalize(self: Box<Self>) -> Digest {
        Digest::from_bytes(&self.0.digest().to_be_bytes())
    }
}

impl HashAlgorithm for Xxh64 {
    fn name(&self) -> &'static str {
        "xxh64"
    }

    fn start(&self) -> Box<dyn HashState> {
        Box::new(Xxh64State(xxhash_rust::xxh64::Xxh64::new(0)))
    }

    fn digest(&self, bytes: &[u8]) -> Digest {
        Digest::from_bytes(&xxhash_rust::xxh64::xxh64(bytes, 0).to_be_bytes())
    }
}

/// BLAKE3.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3;

struct Blake3State(blake3::Hasher);

impl HashState for Blake3State {
    fn update(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    fn finalize(self: Box<Self>) -> Digest {
        Digest::from_bytes(self.0.finalize().as_bytes())
    }
}

impl HashAlgorithm for Blake3 {
    fn name(&self) -> &'static str {
        "blake3"
    }

    fn start(&self) -> Box<dyn HashState> {
        Box::new(Blake3State(blake3::Hasher::new()))
    }
}

/// SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256;

struct Sha256State(sha2::Sha256);

impl HashState for Sha256State {
    fn update(&mut self, bytes: &[u8]) {
        sha2::Digest::update(&mut self.0, bytes);
    }

    fn finalize(self: Box<Self>) -> Digest {
        let Self(state) = *self;
        Digest::from_bytes(sha2::Digest::finalize(state).as_slice())
    }
}

impl HashAlgorithm for Sha256 {
    fn name(&self) -> &'static str {
        "sha256"
    }

    fn start(&self) -> Box<dyn HashState> {
        Box::new(Sha256State(<sha2::Sha256 as sha2::Digest>::new()))
    }
}

/// Selectable hash algorithm, as named on the command line and in config.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HashKind {
    /// xxHash64 (fast, non-cryptographic)
    #[default]
    Xxh64,
    /// BLAKE3
    Blake3,
    /// SHA-256
    Sha256,
}

impl HashKind {
    /// Instantiate the algorithm.
    #[must_use]
    pub fn algorithm(self) -> Arc<dyn HashAlgorithm> {
        match self {
            Self::Xxh64 => Arc::new(Xxh64),
            Self::Blake3 => Arc::new(Blake3),
            Self::Sha256 => Arc::new(Sha256),
        }
    }
}

impl fmt::Display for HashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xxh64 => write!(f, "xxh64"),
            Self::Blake3 => write!(f, "blake3"),
            Self::Sha256 => write!(f, "sha256"),
        }
    }
}

/// Applies a [`HashAlgorithm`] to files on disk.
#[derive(Debug, Clone)]
pub struct FileHasher {
    algorithm: Arc<dyn HashAlgorithm>,
    prehash_size: usize,
    chunk_size: usize,
}

impl Default for FileHasher {
    fn default() -> Self {
        Self::new(Arc::new(Xxh64))
    }
}

impl FileHasher {
    /// Create a hasher around `algorithm`.
    #[must_use]
    pub fn new(algorithm: Arc<dyn HashAlgorithm>) -> Self {
        Self {
            algorithm,
            prehash_size: PREHASH_SIZE,
            chunk_size: CHUNK_SIZE,
        }
    }

    /// Override the read chunk size used by [`FileHasher::full_hash`].
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Name of the wrapped algorithm.
    #[must_use]
    pub fn algorithm_name(&self) -> &'static str {
        self.algorithm.name()
    }

    /// Number of bytes covered by [`FileHasher::prehash`].
    #[must_use]
    pub fn prehash_size(&self) -> usize {
        self.prehash_size
    }

    /// Hash the first [`PREHASH_SIZE`] bytes of a file.
    ///
    /// Files shorter than the prefix are hashed whole, so for them the
    /// prehash equals the full hash.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn prehash(&self, path: &Path) -> Result<Digest, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut buffer = Vec::with_capacity(self.prehash_size);
        file.take(self.prehash_size as u64)
            .read_to_end(&mut buffer)
            .map_err(|e| HashError::from_io(path, e))?;
        Ok(self.algorithm.digest(&buffer))
    }

    /// Hash the complete content of a file.
    ///
    /// The file is streamed through a fixed buffer, so memory use does not
    /// depend on file size.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn full_hash(&self, path: &Path) -> Result<Digest, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut state = self.algorithm.start();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            let read = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            };
            state.update(&buffer[..read]);
        }

        Ok(state.finalize())
    }
}
