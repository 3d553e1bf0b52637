//! Archive entry metadata.

use zip::CompressionMethod;

/// Metadata of a single archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Entry name, `/` separated and relative.
    pub name: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Stored (compressed) size in bytes.
    pub compressed_size: u64,
    /// Whether the entry is a directory placeholder.
    pub is_dir: bool,
    /// CRC-32 of the uncompressed data.
    pub crc32: u32,
    /// Short name of the compression method.
    pub method: &'static str,
}

impl EntryInfo {
    /// Returns the compression ratio (compressed / uncompressed).
    ///
    /// Empty entries report a ratio of 1.0.
    pub fn ratio(&self) -> f64 {
        if self.size == 0 {
            1.0
        } else {
            self.compressed_size as f64 / self.size as f64
        }
    }
}

/// Returns the short name used for a compression method.
pub(crate) fn method_name(method: CompressionMethod) -> &'static str {
    match method {
        CompressionMethod::Stored => "stored",
        CompressionMethod::Deflated => "deflate",
        _ => "other",
    }
}
