//! Driver limits and matching options

/// Maximum directory extent loaded into memory (64 MiB)
pub const DEFAULT_MAX_DIR_SIZE: u32 = 64 * 1024 * 1024;

/// Maximum number of extents making up one file
pub const DEFAULT_MAX_EXTENTS: u32 = 65536;

/// Volume descriptors scanned before giving up on finding the PVD
pub const DEFAULT_MAX_DESCRIPTORS: u32 = 256;

/// ISO9660 driver configuration
///
/// The size caps are safety limits against hostile or corrupt media, not
/// format constants.
#[derive(Debug, Clone, Copy)]
pub struct Iso9660Options {
    /// Largest directory extent (root included) the driver will load
    pub max_dir_size: u32,
    /// Largest number of extents a multi-extent file may have
    pub max_extents: u32,
    /// Descriptors scanned from sector 16 while looking for the PVD
    pub max_descriptors: u32,
    /// Match Rock Ridge names case-sensitively
    pub case_sensitive: bool,
}

impl Default for Iso9660Options {
    fn default() -> Self {
        Self {
            max_dir_size: DEFAULT_MAX_DIR_SIZE,
            max_extents: DEFAULT_MAX_EXTENTS,
            max_descriptors: DEFAULT_MAX_DESCRIPTORS,
            case_sensitive: true,
        }
    }
}

impl Iso9660Options {
    /// Set the directory size cap
    pub fn max_dir_size(mut self, bytes: u32) -> Self {
        self.max_dir_size = bytes;
        self
    }

    /// Set the extent count cap
    pub fn max_extents(mut self, count: u32) -> Self {
        self.max_extents = count;
        self
    }

    /// Set the descriptor scan limit
    pub fn max_descriptors(mut self, count: u32) -> Self {
        self.max_descriptors = count;
        self
    }

    /// Enable or disable case-sensitive Rock Ridge matching
    pub fn case_sensitive(mut self, enabled: bool) -> Self {
        self.case_sensitive = enabled;
        self
    }
}
