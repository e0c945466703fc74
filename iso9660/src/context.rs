//! Per-volume contexts and path resolution
//!
//! The first open on a volume mounts it and caches its root directory.
//! Contexts live as long as the registry; there is no eviction.

use crate::directory::{find_entry, record::DirectoryRecord};
use crate::error::{Iso9660Error, Result};
use crate::file::IsoFile;
use crate::options::Iso9660Options;
use crate::types::{VolumeInfo, MAX_COMPONENT_LENGTH};
use crate::utils::sector::sector_to_byte;
use crate::volume::{is_iso9660, load_root, mount};
use alloc::vec::Vec;
use morpheus_volume::{Volume, VolumeCoord};

/// Cached state of one mounted volume
#[derive(Debug)]
pub struct Iso9660Context {
    coord: VolumeCoord,
    info: VolumeInfo,
    root: Vec<u8>,
}

impl Iso9660Context {
    /// Coordinate of the volume this context belongs to
    pub fn coord(&self) -> VolumeCoord {
        self.coord
    }

    /// Decoded Primary Volume Descriptor fields
    pub fn volume_info(&self) -> &VolumeInfo {
        &self.info
    }

    /// Root directory bytes
    pub fn root(&self) -> &[u8] {
        &self.root
    }
}

/// Registry of mounted ISO9660 volumes, keyed by volume coordinate
#[derive(Debug, Default)]
pub struct ContextRegistry {
    options: Iso9660Options,
    contexts: Vec<Iso9660Context>,
}

impl ContextRegistry {
    /// Create an empty registry
    pub fn new(options: Iso9660Options) -> Self {
        Self {
            options,
            contexts: Vec::new(),
        }
    }

    /// Driver options
    pub fn options(&self) -> &Iso9660Options {
        &self.options
    }

    /// Number of cached contexts
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// True when no volume has been mounted yet
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Context for `volume`, mounting it on first use
    pub fn context(&mut self, volume: &mut Volume) -> Result<&Iso9660Context> {
        let coord = volume.coord();
        if let Some(index) = self.contexts.iter().position(|c| c.coord == coord) {
            return Ok(&self.contexts[index]);
        }

        let info = mount(volume, &self.options)?;
        let root = load_root(volume, &info)?;
        self.contexts.push(Iso9660Context { coord, info, root });
        Ok(&self.contexts[self.contexts.len() - 1])
    }

    /// Open `path` on `volume`
    ///
    /// Leading, repeated and trailing slashes are ignored. Every intermediate
    /// component must be a directory. A path ending in a slash opens the
    /// named directory's extent as a file. The root itself is not openable.
    pub fn open(&mut self, volume: &mut Volume, path: &str) -> Result<IsoFile> {
        if !is_iso9660(volume) {
            return Err(Iso9660Error::InvalidSignature);
        }

        let options = self.options;
        let coord = volume.coord();
        let root = self.context(volume)?.root();

        let mut rest = path.as_bytes();
        let mut loaded: Option<Vec<u8>> = None;
        let mut last_dir: Option<(u32, u32)> = None;

        loop {
            while let [b'/', tail @ ..] = rest {
                rest = tail;
            }
            if rest.is_empty() {
                // Only reached after a trailing slash, or for the root
                let (lba, size) = last_dir.ok_or(Iso9660Error::IsDirectory)?;
                return Ok(IsoFile::single(coord, lba, size));
            }

            let end = rest.iter().position(|&b| b == b'/').unwrap_or(rest.len());
            let component = &rest[..end];
            if component.len() > MAX_COMPONENT_LENGTH {
                return Err(Iso9660Error::PathTooLong);
            }
            rest = &rest[end..];

            let dir = loaded.as_deref().unwrap_or(root);
            let offset =
                find_entry(dir, component, options.case_sensitive).ok_or(Iso9660Error::NotFound)?;

            if rest.is_empty() {
                return IsoFile::from_record(coord, dir, offset, options.max_extents);
            }

            let record = DirectoryRecord::parse(&dir[offset..])?;
            if !record.is_directory() {
                return Err(Iso9660Error::NotADirectory);
            }
            let (lba, size) = (record.extent_lba(), record.data_length());
            last_dir = Some((lba, size));

            if size == 0 || size > options.max_dir_size {
                return Err(Iso9660Error::DirectoryTooLarge);
            }
            let mut next = alloc::vec![0u8; size as usize];
            volume.read(&mut next, sector_to_byte(lba))?;
            loaded = Some(next);
        }
    }
}
