// FAT12/16/32 driver (read-only)

mod chain;
mod context;
mod directory;
mod error;
mod file;
pub mod filename;

pub use context::{FatContext, FatType};
pub use directory::{DirEntry, DirLocation};
pub use error::{FatError, Result};
pub use file::FatFile;

use crate::config::Limits;
use alloc::string::String;
use filename::LFN_MAX_LEN;
use morpheus_volume::Volume;

/// Does `volume` carry a valid FAT boot sector?
pub fn is_fat(volume: &mut Volume) -> bool {
    volume
        .read_array::<{ context::BOOT_SECTOR_SIZE }>(0)
        .ok()
        .is_some_and(|bpb| FatContext::from_boot_sector(&bpb).is_ok())
}

/// Open the file at `path`
///
/// Leading slashes are skipped. Every component followed by a slash must
/// name a directory; the last one must not.
pub fn open(volume: &mut Volume, path: &str, limits: &Limits) -> Result<FatFile> {
    let ctx = FatContext::new(volume, limits)?;
    let mut location = ctx.root_directory();
    let mut rest = path.trim_start_matches('/');

    loop {
        let (component, remainder) = match rest.split_once('/') {
            Some((component, remainder)) => (component, Some(remainder)),
            None => (rest, None),
        };
        if component.len() > LFN_MAX_LEN {
            return Err(FatError::PathTooLong);
        }

        let entry = {
            let dir = directory::load(volume, &ctx, location, limits)?;
            directory::find_entry(&dir, component.as_bytes(), limits.case_sensitive)?
        };

        match remainder {
            Some(remainder) => {
                if !entry.is_directory() {
                    return Err(FatError::NotADirectory);
                }
                location = entry.location(&ctx);
                rest = remainder;
            }
            None => {
                if entry.is_directory() {
                    return Err(FatError::IsADirectory);
                }
                return FatFile::open(volume, ctx, &entry, limits);
            }
        }
    }
}

/// Volume label from the root directory
pub fn get_label(volume: &mut Volume, limits: &Limits) -> Option<String> {
    FatContext::new(volume, limits).ok()?.label
}
