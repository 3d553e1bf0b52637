//! Options for archive operations.
//!
//! Each top-level operation takes an options struct built with chained
//! setters:
//!
//! ```rust
//! use zipcraft::{AddOptions, CompressionLevel, ExtractOptions};
//!
//! let add = AddOptions::new()
//!     .compression(CompressionLevel::Fastest)
//!     .overwrite(true);
//! assert!(add.overwrite);
//!
//! let extract = ExtractOptions::new().overwrite(false);
//! assert!(!extract.overwrite);
//! ```

use glob::Pattern;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::{Error, Result};

/// DEFLATE level used for [`CompressionLevel::Optimal`].
const OPTIMAL_DEFLATE_LEVEL: i64 = 9;
/// DEFLATE level used for [`CompressionLevel::Fastest`].
const FASTEST_DEFLATE_LEVEL: i64 = 1;

/// Compression applied to newly written entries.
///
/// The level only affects entries created by the current operation; entries
/// already stored in an archive keep their original encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// Best compression ratio (DEFLATE level 9).
    #[default]
    Optimal,
    /// Fastest compression (DEFLATE level 1).
    Fastest,
    /// Store entries without compression.
    NoCompression,
}

impl CompressionLevel {
    /// Returns the `zip` file options for this level.
    pub fn file_options(self) -> SimpleFileOptions {
        let options = SimpleFileOptions::default();
        match self {
            Self::Optimal => options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(OPTIMAL_DEFLATE_LEVEL)),
            Self::Fastest => options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(FASTEST_DEFLATE_LEVEL)),
            Self::NoCompression => options.compression_method(CompressionMethod::Stored),
        }
    }

    /// Returns a short human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::Fastest => "fastest",
            Self::NoCompression => "none",
        }
    }
}

/// Compiles glob patterns, reporting the first invalid one.
pub(crate) fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| Error::InvalidPattern {
                pattern: p.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Options for adding filesystem paths to an archive.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Compression for new entries.
    pub compression: CompressionLevel,
    /// Replace entries that already exist instead of skipping them.
    pub overwrite: bool,
    /// Treat source paths literally instead of expanding glob patterns.
    pub literal: bool,
    /// Entry names matching any of these patterns are not added.
    pub exclude: Vec<Pattern>,
}

impl AddOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression level.
    pub fn compression(mut self, level: CompressionLevel) -> Self {
        self.compression = level;
        self
    }

    /// Sets whether existing entries are replaced.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Sets whether source paths are taken literally.
    pub fn literal(mut self, literal: bool) -> Self {
        self.literal = literal;
        self
    }

    /// Sets exclusion patterns matched against entry names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if a pattern cannot be parsed.
    pub fn exclude(mut self, patterns: &[String]) -> Result<Self> {
        self.exclude = compile_patterns(patterns)?;
        Ok(self)
    }

    /// Returns true if the entry name is excluded.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(name))
    }
}

/// Options for creating a new archive.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Options applied while adding the sources.
    pub add: AddOptions,
    /// Update an existing destination archive instead of replacing it.
    pub no_clobber: bool,
}

impl CreateOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression level.
    pub fn compression(mut self, level: CompressionLevel) -> Self {
        self.add.compression = level;
        self
    }

    /// Sets whether entries with clashing names are replaced.
    pub fn force(mut self, force: bool) -> Self {
        self.add.overwrite = force;
        self
    }

    /// Sets whether an existing destination is kept and updated.
    pub fn no_clobber(mut self, no_clobber: bool) -> Self {
        self.no_clobber = no_clobber;
        self
    }

    /// Sets whether source paths are taken literally.
    pub fn literal(mut self, literal: bool) -> Self {
        self.add.literal = literal;
        self
    }

    /// Sets exclusion patterns matched against entry names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if a pattern cannot be parsed.
    pub fn exclude(mut self, patterns: &[String]) -> Result<Self> {
        self.add = self.add.exclude(patterns)?;
        Ok(self)
    }
}

/// Options for extracting entries.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Overwrite existing destination files instead of skipping them.
    pub overwrite: bool,
}

impl ExtractOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether existing files are overwritten.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_compression_is_optimal() {
        assert_eq!(CompressionLevel::default(), CompressionLevel::Optimal);
        assert_eq!(AddOptions::new().compression, CompressionLevel::Optimal);
    }

    #[test]
    fn test_compression_names() {
        assert_eq!(CompressionLevel::Optimal.name(), "optimal");
        assert_eq!(CompressionLevel::Fastest.name(), "fastest");
        assert_eq!(CompressionLevel::NoCompression.name(), "none");
    }

    #[test]
    fn test_create_options_builder() {
        let options = CreateOptions::new()
            .compression(CompressionLevel::NoCompression)
            .force(true)
            .no_clobber(true)
            .literal(true);
        assert_eq!(options.add.compression, CompressionLevel::NoCompression);
        assert!(options.add.overwrite);
        assert!(options.add.literal);
        assert!(options.no_clobber);
    }

    #[test]
    fn test_exclude_patterns() {
        let options = AddOptions::new()
            .exclude(&["*.log".to_string(), "tmp/*".to_string()])
            .unwrap();
        assert!(options.is_excluded("debug.log"));
        assert!(options.is_excluded("tmp/cache.dat"));
        assert!(!options.is_excluded("readme.txt"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = AddOptions::new().exclude(&["[".to_string()]).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }
}
