//! Named-lump resource archive.
//!
//! Recordings ship inside a bundled archive of named lumps. The archive is a
//! flat directory of byte blobs addressed by short case-insensitive names;
//! demo resolution falls back to it after probing the filesystem.
//!
//! # Wire Format
//!
//! ```text
//! offset  size  field
//! 0       4     magic "MPAK"
//! 4       4     lump count (u32 LE)
//! 8       4     directory offset (u32 LE)
//! ...           lump payloads
//! dir     16*n  per lump: offset (u32 LE), size (u32 LE), name (8 bytes,
//!               NUL padded)
//! ```

use std::collections::HashMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes identifying a lump archive.
pub const PACK_MAGIC: [u8; 4] = *b"MPAK";

/// Maximum lump name length on the wire.
pub const LUMP_NAME_LEN: usize = 8;

const PACK_HEADER_LEN: usize = 12;
const DIR_ENTRY_LEN: usize = 16;

// ---------------------------------------------------------------------------
// LumpSource trait
// ---------------------------------------------------------------------------

/// Read access to named lumps. Names compare case-insensitively.
///
/// This is the seam the demo loader and the attract sequencer consume; tests
/// substitute an in-memory implementation.
pub trait LumpSource {
    /// Whether a lump with this name exists.
    fn has_lump(&self, name: &str) -> bool;

    /// Read a lump's bytes, or `None` if no such lump exists.
    fn read_lump(&self, name: &str) -> Option<Vec<u8>>;
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while opening a lump archive.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("archive too short: {len} bytes, header needs {PACK_HEADER_LEN}")]
    TooShort { len: usize },

    #[error("bad archive magic: expected {PACK_MAGIC:?}, got {found:?}")]
    BadMagic { found: [u8; 4] },

    #[error("directory out of bounds: {count} entries at offset {offset}, archive is {len} bytes")]
    TruncatedDirectory {
        count: usize,
        offset: usize,
        len: usize,
    },

    #[error("lump '{name}' extends past the end of the archive")]
    LumpOutOfBounds { name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// ResourcePack
// ---------------------------------------------------------------------------

/// An in-memory lump archive.
///
/// Lump payloads are copied out of the archive at open time; lookups are a
/// map probe on the uppercased name. Duplicate names keep the first
/// directory entry.
#[derive(Debug, Clone)]
pub struct ResourcePack {
    lumps: HashMap<String, Vec<u8>>,
    names: Vec<String>,
}

impl ResourcePack {
    /// Open an archive file from disk.
    pub fn open(path: &Path) -> Result<Self, PackError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Parse an archive from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PackError> {
        if bytes.len() < PACK_HEADER_LEN {
            return Err(PackError::TooShort { len: bytes.len() });
        }
        let magic: [u8; 4] = bytes[0..4].try_into().unwrap_or_default();
        if magic != PACK_MAGIC {
            return Err(PackError::BadMagic { found: magic });
        }
        let count = u32::from_le_bytes(bytes[4..8].try_into().unwrap_or_default()) as usize;
        let dir_offset = u32::from_le_bytes(bytes[8..12].try_into().unwrap_or_default()) as usize;

        let dir_end = dir_offset
            .checked_add(count.saturating_mul(DIR_ENTRY_LEN))
            .unwrap_or(usize::MAX);
        if dir_end > bytes.len() {
            return Err(PackError::TruncatedDirectory {
                count,
                offset: dir_offset,
                len: bytes.len(),
            });
        }

        let mut lumps = HashMap::with_capacity(count);
        let mut names = Vec::with_capacity(count);
        for i in 0..count {
            let at = dir_offset + i * DIR_ENTRY_LEN;
            let offset =
                u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap_or_default()) as usize;
            let size =
                u32::from_le_bytes(bytes[at + 4..at + 8].try_into().unwrap_or_default()) as usize;
            let name = decode_name(&bytes[at + 8..at + 8 + LUMP_NAME_LEN]);

            let end = offset.checked_add(size).unwrap_or(usize::MAX);
            if end > bytes.len() {
                return Err(PackError::LumpOutOfBounds { name });
            }
            if !lumps.contains_key(&name) {
                names.push(name.clone());
                lumps.insert(name, bytes[offset..end].to_vec());
            }
        }

        Ok(Self { lumps, names })
    }

    /// Number of distinct lumps in the archive.
    pub fn lump_count(&self) -> usize {
        self.names.len()
    }

    /// Lump names in directory order.
    pub fn lump_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl LumpSource for ResourcePack {
    fn has_lump(&self, name: &str) -> bool {
        self.lumps.contains_key(&normalize_name(name))
    }

    fn read_lump(&self, name: &str) -> Option<Vec<u8>> {
        self.lumps.get(&normalize_name(name)).cloned()
    }
}

/// Uppercase a lookup name for case-insensitive comparison.
pub(crate) fn normalize_name(name: &str) -> String {
    name.to_ascii_uppercase()
}

fn decode_name(raw: &[u8]) -> String {
    let trimmed: Vec<u8> = raw.iter().copied().take_while(|b| *b != 0).collect();
    normalize_name(&String::from_utf8_lossy(&trimmed))
}

// ===========================================================================
// Tests
// ===========================================================================
