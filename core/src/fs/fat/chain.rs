// Cluster chains: materialising and reading

use super::context::FatContext;
use super::error::{FatError, Result};
use alloc::vec::Vec;
use morpheus_volume::Volume;

/// Follow the chain starting at `first` and return every cluster in it
///
/// The chain ends at the first FAT entry outside the data cluster range.
/// Chains longer than `max_chain` entries (or than the FAT could address)
/// are treated as circular.
pub fn cache_cluster_chain(
    volume: &mut Volume,
    ctx: &FatContext,
    first: u32,
    max_chain: u32,
) -> Result<Vec<u32>> {
    if !ctx.is_data_cluster(first) {
        return Err(FatError::InvalidCluster);
    }

    let max_len = (ctx.fat_type.cluster_limit() - 1).min(max_chain) as usize;
    if max_len == 0 {
        return Err(FatError::ChainTooLong);
    }

    // First pass: length only
    let mut cluster = first;
    let mut len = 1usize;
    loop {
        cluster = ctx.read_fat_entry(volume, cluster)?;
        if !ctx.is_data_cluster(cluster) {
            break;
        }
        len += 1;
        if len > max_len {
            return Err(FatError::ChainTooLong);
        }
    }

    let mut chain = Vec::with_capacity(len);
    let mut cluster = first;
    for _ in 0..len {
        chain.push(cluster);
        cluster = ctx.read_fat_entry(volume, cluster)?;
    }
    Ok(chain)
}

/// Read `buffer.len()` bytes at byte `offset` of the data described by `chain`
///
/// Each volume read covers the contiguous part of one cluster.
pub fn read_cluster_chain(
    volume: &mut Volume,
    ctx: &FatContext,
    chain: &[u32],
    buffer: &mut [u8],
    offset: u64,
) -> Result<()> {
    let cluster_size = ctx.cluster_size();
    let mut progress = 0usize;

    while progress < buffer.len() {
        let position = offset
            .checked_add(progress as u64)
            .ok_or(FatError::ReadOutOfBounds)?;
        let index = position / cluster_size;
        let cluster = usize::try_from(index)
            .ok()
            .and_then(|i| chain.get(i))
            .copied()
            .ok_or(FatError::ReadOutOfBounds)?;

        let in_cluster = position % cluster_size;
        let chunk = ((buffer.len() - progress) as u64).min(cluster_size - in_cluster) as usize;
        let at = ctx
            .cluster_to_offset(cluster)
            .and_then(|base| base.checked_add(in_cluster))
            .ok_or(FatError::InvalidCluster)?;

        volume.read(&mut buffer[progress..progress + chunk], at)?;
        progress += chunk;
    }

    Ok(())
}
