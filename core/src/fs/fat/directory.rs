// FAT directory loading and lookup

use super::chain;
use super::context::{FatContext, FatType};
use super::error::{FatError, Result};
use super::filename::{self, LFN_CHARS_PER_ENTRY, LFN_MAX_LEN, SHORT_NAME_LEN};
use crate::config::Limits;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use morpheus_volume::Volume;

pub const DIR_ENTRY_SIZE: usize = 32;

pub const ATTR_VOLUME_LABEL: u8 = 0x08;
pub const ATTR_DIRECTORY: u8 = 0x10;
pub const ATTR_LONG_NAME: u8 = 0x0F;

const END_OF_DIRECTORY: u8 = 0x00;
const DELETED: u8 = 0xE5;
const LFN_FIRST_RECORD: u8 = 0x40;
const LFN_SEQUENCE_MASK: u8 = 0x1F;

/// Where a directory's records are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirLocation {
    /// FAT12/16 root region between the FATs and the data area
    FixedRoot,
    /// Cluster chain starting at the given cluster
    Cluster(u32),
}

/// Short directory entry (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    pub name: [u8; SHORT_NAME_LEN],
    pub attr: u8,
    pub cluster_high: u16,
    pub cluster_low: u16,
    pub file_size: u32,
}

impl DirEntry {
    pub fn parse(record: &[u8]) -> Self {
        let mut name = [0u8; SHORT_NAME_LEN];
        name.copy_from_slice(&record[..SHORT_NAME_LEN]);
        Self {
            name,
            attr: record[11],
            cluster_high: u16::from_le_bytes([record[20], record[21]]),
            cluster_low: u16::from_le_bytes([record[26], record[27]]),
            file_size: u32::from_le_bytes([record[28], record[29], record[30], record[31]]),
        }
    }

    pub fn is_directory(&self) -> bool {
        self.attr & ATTR_DIRECTORY != 0
    }

    /// First data cluster; the high word only exists on FAT32
    pub fn first_cluster(&self, ctx: &FatContext) -> u32 {
        let low = u32::from(self.cluster_low);
        match ctx.fat_type {
            FatType::Fat32 => (u32::from(self.cluster_high) << 16) | low,
            _ => low,
        }
    }

    /// Directory this entry points to; cluster 0 is the root (as in "..")
    pub fn location(&self, ctx: &FatContext) -> DirLocation {
        match self.first_cluster(ctx) {
            0 => ctx.root_directory(),
            cluster => DirLocation::Cluster(cluster),
        }
    }
}

/// Read a whole directory into memory
pub fn load(
    volume: &mut Volume,
    ctx: &FatContext,
    location: DirLocation,
    limits: &Limits,
) -> Result<Vec<u8>> {
    match location {
        DirLocation::FixedRoot => {
            let size = usize::from(ctx.root_entries) * DIR_ENTRY_SIZE;
            if size as u64 > limits.fat_max_dir_size {
                return Err(FatError::DirectoryTooLarge);
            }
            let mut dir = vec![0u8; size];
            let offset = u64::from(ctx.root_start) * u64::from(ctx.bytes_per_sector);
            volume.read(&mut dir, offset)?;
            Ok(dir)
        }
        DirLocation::Cluster(first) => {
            let clusters = chain::cache_cluster_chain(volume, ctx, first, limits.fat_max_chain)?;
            let size = (clusters.len() as u64)
                .checked_mul(ctx.cluster_size())
                .filter(|&size| size <= limits.fat_max_dir_size)
                .ok_or(FatError::DirectoryTooLarge)?;
            let mut dir = vec![0u8; size as usize];
            chain::read_cluster_chain(volume, ctx, &clusters, &mut dir, 0)?;
            Ok(dir)
        }
    }
}

/// Find `name` in a loaded directory by long or short name
///
/// A matching long name selects the short entry right after it. Short
/// names always compare case-insensitively.
pub fn find_entry(dir: &[u8], name: &[u8], case_sensitive: bool) -> Result<DirEntry> {
    let short = filename::to_short_name(name);
    let mut long_name = [b' '; LFN_MAX_LEN];

    for (i, record) in dir.chunks_exact(DIR_ENTRY_SIZE).enumerate() {
        match record[0] {
            END_OF_DIRECTORY => break,
            DELETED => continue,
            _ => {}
        }

        let attr = record[11];
        if attr == ATTR_LONG_NAME {
            let sequence = record[0];
            if sequence & LFN_FIRST_RECORD != 0 {
                long_name.fill(b' ');
            }
            let n = usize::from(sequence & LFN_SEQUENCE_MASK);
            if n == 0 {
                continue;
            }
            let at = (n - 1) * LFN_CHARS_PER_ENTRY;
            if at >= LFN_MAX_LEN {
                continue;
            }
            long_name[at..at + LFN_CHARS_PER_ENTRY].copy_from_slice(&filename::lfn_chars(record));

            if n == 1
                && filename::names_equal(filename::trim_long_name(&long_name), name, case_sensitive)
            {
                let next = dir
                    .get((i + 1) * DIR_ENTRY_SIZE..(i + 2) * DIR_ENTRY_SIZE)
                    .ok_or(FatError::CorruptLongName)?;
                if matches!(next[0], END_OF_DIRECTORY | DELETED) || next[11] == ATTR_LONG_NAME {
                    return Err(FatError::CorruptLongName);
                }
                return Ok(DirEntry::parse(next));
            }
            continue;
        }

        if attr & ATTR_VOLUME_LABEL != 0 {
            continue;
        }
        if short.as_ref().is_some_and(|short| record[..SHORT_NAME_LEN] == short[..]) {
            return Ok(DirEntry::parse(record));
        }
    }

    Err(FatError::NotFound)
}

/// Volume label from a loaded root directory
pub fn find_label(dir: &[u8]) -> Option<String> {
    let record = dir
        .chunks_exact(DIR_ENTRY_SIZE)
        .take_while(|record| record[0] != END_OF_DIRECTORY)
        .find(|record| record[0] != DELETED && record[11] == ATTR_VOLUME_LABEL)?;

    let mut name = &record[..SHORT_NAME_LEN];
    while let [rest @ .., b' '] = name {
        name = rest;
    }
    if name.is_empty() {
        return None;
    }
    Some(name.iter().map(|&c| char::from(c)).collect())
}
