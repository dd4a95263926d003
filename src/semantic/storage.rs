//! On-disk cache of message embeddings.
//!
//! File format: vectors.bin
//!
//! Header (47 bytes):
//! - version: u8 (1)
//! - model_id: [u8; 32] (SHA256 hash of model name)
//! - dimensions: u16 (little-endian)
//! - entry_count: u64 (little-endian)
//! - checksum: u32 (CRC32 of header fields before checksum)
//!
//! Entries (repeated):
//! - path_len: u32 (little-endian)
//! - path: [u8; path_len] (UTF-8 message path)
//! - content_hash: u64 (little-endian)
//! - embedding: [f32; dimensions] (little-endian)

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const FORMAT_VERSION: u8 = 1;

/// version(1) + model_id(32) + dimensions(2) + entry_count(8) + checksum(4)
const HEADER_SIZE: usize = 47;

/// Paths longer than this are treated as corruption.
const MAX_PATH_LEN: u32 = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum VectorCacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Version mismatch: file version {0}, supported version {1}")]
    VersionMismatch(u8, u8),

    #[error("Model mismatch: file uses different model")]
    ModelMismatch,

    #[error("Checksum mismatch: file may be corrupted")]
    ChecksumMismatch,

    #[error("Dimension mismatch: expected {expected}, file has {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// A cached embedding and the hash of the text it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedVector {
    pub content_hash: u64,
    pub embedding: Vec<f32>,
}

/// Embeddings keyed by message path.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VectorCache {
    entries: HashMap<String, CachedVector>,
}

impl VectorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Cached embedding for `path`, only if it was computed from the same content.
    pub fn lookup(&self, path: &str, content_hash: u64) -> Option<&[f32]> {
        self.entries
            .get(path)
            .filter(|cached| cached.content_hash == content_hash)
            .map(|cached| cached.embedding.as_slice())
    }

    pub fn insert(&mut self, path: String, content_hash: u64, embedding: Vec<f32>) {
        self.entries.insert(
            path,
            CachedVector {
                content_hash,
                embedding,
            },
        );
    }

    /// Drop every entry whose path is not in `keep`.
    pub fn retain_paths(&mut self, keep: &[String]) {
        self.entries.retain(|path, _| keep.contains(path));
    }
}

struct Header {
    model_id: [u8; 32],
    dimensions: u16,
    entry_count: u64,
}

/// Reads and writes a [`VectorCache`] at a fixed path.
pub struct VectorStorage {
    path: PathBuf,
}

impl VectorStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(
        &self,
        expected_model_id: &[u8; 32],
        expected_dimensions: usize,
    ) -> Result<VectorCache, VectorCacheError> {
        let mut reader = BufReader::new(File::open(&self.path)?);
        read_cache(&mut reader, expected_model_id, expected_dimensions)
    }

    /// Write the cache via temp file -> fsync -> rename.
    pub fn save(
        &self,
        cache: &VectorCache,
        model_id: &[u8; 32],
        dimensions: usize,
    ) -> Result<(), VectorCacheError> {
        let temp_path = self.path.with_extension("tmp");

        let result = (|| {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            write_cache(&mut writer, cache, model_id, dimensions)?;
            writer.flush()?;
            let file = writer
                .into_inner()
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
            file.sync_all()?;
            Ok::<(), VectorCacheError>(())
        })();

        if let Err(e) = result {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e);
        }

        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

fn compute_checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

fn write_cache<W: Write>(
    writer: &mut W,
    cache: &VectorCache,
    model_id: &[u8; 32],
    dimensions: usize,
) -> Result<(), VectorCacheError> {
    let dims = u16::try_from(dimensions)
        .map_err(|_| VectorCacheError::InvalidFormat(format!("{dimensions} dimensions")))?;

    let mut header = [0u8; HEADER_SIZE];
    header[0] = FORMAT_VERSION;
    header[1..33].copy_from_slice(model_id);
    header[33..35].copy_from_slice(&dims.to_le_bytes());
    header[35..43].copy_from_slice(&(cache.len() as u64).to_le_bytes());
    let checksum = compute_checksum(&header[0..43]);
    header[43..47].copy_from_slice(&checksum.to_le_bytes());
    writer.write_all(&header)?;

    // sorted so identical caches produce identical files
    let mut paths: Vec<&String> = cache.entries.keys().collect();
    paths.sort();

    for path in paths {
        let entry = &cache.entries[path];
        if entry.embedding.len() != dimensions {
            return Err(VectorCacheError::DimensionMismatch {
                expected: dimensions,
                got: entry.embedding.len(),
            });
        }

        writer.write_all(&(path.len() as u32).to_le_bytes())?;
        writer.write_all(path.as_bytes())?;
        writer.write_all(&entry.content_hash.to_le_bytes())?;
        for value in &entry.embedding {
            writer.write_all(&value.to_le_bytes())?;
        }
    }

    Ok(())
}

fn read_header<R: Read>(reader: &mut R) -> Result<Header, VectorCacheError> {
    let mut bytes = [0u8; HEADER_SIZE];
    reader.read_exact(&mut bytes)?;

    let version = bytes[0];
    if version != FORMAT_VERSION {
        return Err(VectorCacheError::VersionMismatch(version, FORMAT_VERSION));
    }

    let stored_checksum = u32::from_le_bytes([bytes[43], bytes[44], bytes[45], bytes[46]]);
    if stored_checksum != compute_checksum(&bytes[0..43]) {
        return Err(VectorCacheError::ChecksumMismatch);
    }

    let mut model_id = [0u8; 32];
    model_id.copy_from_slice(&bytes[1..33]);

    let mut count = [0u8; 8];
    count.copy_from_slice(&bytes[35..43]);

    Ok(Header {
        model_id,
        dimensions: u16::from_le_bytes([bytes[33], bytes[34]]),
        entry_count: u64::from_le_bytes(count),
    })
}

fn read_cache<R: Read>(
    reader: &mut R,
    expected_model_id: &[u8; 32],
    expected_dimensions: usize,
) -> Result<VectorCache, VectorCacheError> {
    let header = read_header(reader)?;

    if header.model_id != *expected_model_id {
        return Err(VectorCacheError::ModelMismatch);
    }
    if header.dimensions as usize != expected_dimensions {
        return Err(VectorCacheError::DimensionMismatch {
            expected: expected_dimensions,
            got: header.dimensions as usize,
        });
    }

    let mut cache = VectorCache::new();

    for _ in 0..header.entry_count {
        let mut len_bytes = [0u8; 4];
        reader.read_exact(&mut len_bytes)?;
        let path_len = u32::from_le_bytes(len_bytes);
        if path_len > MAX_PATH_LEN {
            return Err(VectorCacheError::InvalidFormat(format!(
                "path length {path_len} exceeds {MAX_PATH_LEN}"
            )));
        }

        let mut path_bytes = vec![0u8; path_len as usize];
        reader.read_exact(&mut path_bytes)?;
        let path = String::from_utf8(path_bytes)
            .map_err(|_| VectorCacheError::InvalidFormat("path is not valid UTF-8".to_string()))?;

        let mut hash_bytes = [0u8; 8];
        reader.read_exact(&mut hash_bytes)?;

        let mut embedding = Vec::with_capacity(expected_dimensions);
        for _ in 0..expected_dimensions {
            let mut float_bytes = [0u8; 4];
            reader.read_exact(&mut float_bytes)?;
            embedding.push(f32::from_le_bytes(float_bytes));
        }

        cache.insert(path, u64::from_le_bytes(hash_bytes), embedding);
    }

    Ok(cache)
}
