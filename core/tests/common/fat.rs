//! Builds small FAT12/16/32 images in memory
//!
//! Clusters are handed out in declaration order, `stride` apart, so chains
//! can be made non-contiguous. Names that are not already valid upper-case
//! 8.3 names get long name records and a `~N` short alias.

use super::MemoryBlockDevice;
use morpheus_volume::Volume;
use std::collections::HashMap;

const SECTOR: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatKind {
    Fat12,
    Fat16,
    Fat32,
}

impl FatKind {
    fn clusters(self) -> u32 {
        match self {
            Self::Fat12 => 2000,
            Self::Fat16 => 8000,
            Self::Fat32 => 70000,
        }
    }

    fn root_entries(self) -> u16 {
        match self {
            Self::Fat12 => 224,
            Self::Fat16 => 512,
            Self::Fat32 => 0,
        }
    }

    fn reserved(self) -> u16 {
        match self {
            Self::Fat32 => 32,
            _ => 1,
        }
    }

    fn end_of_chain(self) -> u32 {
        match self {
            Self::Fat12 => 0xFFF,
            Self::Fat16 => 0xFFFF,
            Self::Fat32 => 0x0FFF_FFFF,
        }
    }

    /// FAT bytes needed for `entries` entries
    fn fat_bytes(self, entries: u32) -> u32 {
        match self {
            Self::Fat12 => (entries * 3 + 1) / 2,
            Self::Fat16 => entries * 2,
            Self::Fat32 => entries * 4,
        }
    }
}

struct Item {
    name: String,
    parent: usize,
    dir: bool,
    content: Vec<u8>,
    clusters: Vec<u32>,
    short: [u8; 11],
    long: bool,
}

pub struct FatBuilder {
    kind: FatKind,
    sectors_per_cluster: u8,
    stride: u32,
    label: Option<String>,
    items: Vec<Item>,
}

impl FatBuilder {
    pub fn new(kind: FatKind) -> Self {
        let root = Item {
            name: String::new(),
            parent: 0,
            dir: true,
            content: Vec::new(),
            clusters: Vec::new(),
            short: [b' '; 11],
            long: false,
        };
        Self {
            kind,
            sectors_per_cluster: 1,
            stride: 1,
            label: None,
            items: vec![root],
        }
    }

    pub fn sectors_per_cluster(mut self, spc: u8) -> Self {
        self.sectors_per_cluster = spc;
        self
    }

    /// Distance between consecutive allocated clusters
    pub fn stride(mut self, stride: u32) -> Self {
        self.stride = stride;
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn dir(self, path: &str) -> Self {
        self.add(path, true, Vec::new())
    }

    pub fn file(self, path: &str, content: &[u8]) -> Self {
        self.add(path, false, content.to_vec())
    }

    fn add(mut self, path: &str, dir: bool, content: Vec<u8>) -> Self {
        let (parent_path, name) = match path.rsplit_once('/') {
            Some((parent, name)) => (parent, name),
            None => ("", path),
        };
        let parent = self.find(parent_path).expect("parent declared first");
        let siblings = self.items.iter().filter(|i| i.parent == parent && i.long).count();
        let (short, long) = short_name_for(name, siblings + 1);
        self.items.push(Item {
            name: name.to_string(),
            parent,
            dir,
            content,
            clusters: Vec::new(),
            short,
            long,
        });
        self
    }

    fn find(&self, path: &str) -> Option<usize> {
        let mut current = 0;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            current = (1..self.items.len())
                .find(|&i| self.items[i].parent == current && self.items[i].name == part)?;
        }
        Some(current)
    }

    fn path_of(&self, mut index: usize) -> String {
        let mut parts = Vec::new();
        while index != 0 {
            parts.push(self.items[index].name.clone());
            index = self.items[index].parent;
        }
        parts.reverse();
        parts.join("/")
    }

    fn records(&self, dir: usize) -> Vec<[u8; 32]> {
        let mut records = Vec::new();
        if dir == 0 {
            if let Some(label) = &self.label {
                let mut name = [b' '; 11];
                name[..label.len()].copy_from_slice(label.as_bytes());
                records.push(short_record(&name, 0x08, 0, 0));
            }
        } else {
            let own = self.items[dir].clusters[0];
            let parent = self.items[self.items[dir].parent].clusters.first().copied().unwrap_or(0);
            let parent = if self.items[dir].parent == 0 { 0 } else { parent };
            records.push(short_record(b".          ", 0x10, own, 0));
            records.push(short_record(b"..         ", 0x10, parent, 0));
        }

        for (index, item) in self.items.iter().enumerate().skip(1) {
            if item.parent != dir {
                continue;
            }
            if item.long {
                records.extend(long_records(item.name.as_bytes(), &item.short));
            }
            let (attr, size) = if item.dir {
                (0x10, 0)
            } else {
                (0x20, item.content.len() as u32)
            };
            let first = self.items[index].clusters.first().copied().unwrap_or(0);
            records.push(short_record(&item.short, attr, first, size));
        }
        records
    }

    pub fn build(mut self) -> FatImage {
        let kind = self.kind;
        let spc = self.sectors_per_cluster as usize;
        let cluster_size = spc * SECTOR;
        let clusters = kind.clusters();

        let spf = (kind.fat_bytes(clusters + 2) as usize + SECTOR - 1) / SECTOR;
        let root_sectors = kind.root_entries() as usize * 32 / SECTOR;
        let reserved = kind.reserved() as usize;
        let data_start = reserved + 2 * spf + root_sectors;
        let total = data_start + clusters as usize * spc;

        // Allocate clusters: directories need their record counts first
        let mut next = 2u32;
        let stride = self.stride;
        let mut alloc = |count: usize| -> Vec<u32> {
            (0..count)
                .map(|_| {
                    let c = next;
                    next += stride;
                    c
                })
                .collect()
        };
        if kind == FatKind::Fat32 {
            self.items[0].clusters = alloc(1);
        }
        for i in 1..self.items.len() {
            if self.items[i].dir {
                self.items[i].clusters = alloc(1);
            }
        }
        for i in 0..self.items.len() {
            if !self.items[i].dir {
                let n = (self.items[i].content.len() + cluster_size - 1) / cluster_size;
                self.items[i].clusters = alloc(n);
            }
        }
        // Grow directories that overflow one cluster
        for i in 0..self.items.len() {
            if self.items[i].dir && (i != 0 || kind == FatKind::Fat32) {
                let needed = (self.records(i).len() * 32 + cluster_size - 1) / cluster_size;
                let extra = alloc(needed.saturating_sub(1));
                self.items[i].clusters.extend(extra);
            }
        }

        let mut data = vec![0u8; total * SECTOR];

        // Boot sector
        let b = &mut data[..SECTOR];
        b[0..3].copy_from_slice(&[0xEB, 0x3C, 0x90]);
        b[3..11].copy_from_slice(b"MSWIN4.1");
        b[0x0B..0x0D].copy_from_slice(&(SECTOR as u16).to_le_bytes());
        b[0x0D] = self.sectors_per_cluster;
        b[0x0E..0x10].copy_from_slice(&(reserved as u16).to_le_bytes());
        b[0x10] = 2;
        b[0x11..0x13].copy_from_slice(&kind.root_entries().to_le_bytes());
        if total < 0x10000 {
            b[0x13..0x15].copy_from_slice(&(total as u16).to_le_bytes());
        } else {
            b[0x20..0x24].copy_from_slice(&(total as u32).to_le_bytes());
        }
        b[0x15] = 0xF8;
        match kind {
            FatKind::Fat32 => {
                b[0x24..0x28].copy_from_slice(&(spf as u32).to_le_bytes());
                b[0x2C..0x30].copy_from_slice(&self.items[0].clusters[0].to_le_bytes());
                b[0x52..0x5A].copy_from_slice(b"FAT32   ");
            }
            FatKind::Fat16 | FatKind::Fat12 => {
                b[0x16..0x18].copy_from_slice(&(spf as u16).to_le_bytes());
                let id: &[u8; 8] = if kind == FatKind::Fat12 { b"FAT12   " } else { b"FAT16   " };
                b[0x36..0x3E].copy_from_slice(id);
            }
        }
        b[510] = 0x55;
        b[511] = 0xAA;

        let mut image = FatImage {
            data,
            kind,
            fat_offset: reserved * SECTOR,
            fat_size: spf * SECTOR,
            data_offset: data_start * SECTOR,
            cluster_size,
            chains: HashMap::new(),
        };

        image.set_fat_entry(0, 0x0FFF_FFF8 & kind.end_of_chain());
        image.set_fat_entry(1, kind.end_of_chain());
        for i in 0..self.items.len() {
            let chain = self.items[i].clusters.clone();
            for pair in chain.windows(2) {
                image.set_fat_entry(pair[0], pair[1]);
            }
            if let Some(&last) = chain.last() {
                image.set_fat_entry(last, kind.end_of_chain());
            }

            let bytes: Vec<u8> = if self.items[i].dir {
                self.records(i).concat()
            } else {
                self.items[i].content.clone()
            };
            if i == 0 && kind != FatKind::Fat32 {
                let root = (reserved + 2 * spf) * SECTOR;
                assert!(bytes.len() <= root_sectors * SECTOR, "root directory full");
                image.data[root..root + bytes.len()].copy_from_slice(&bytes);
            } else {
                image.write_chain(&chain, &bytes);
            }
            image.chains.insert(self.path_of(i), chain);
        }

        image
    }
}

/// A built FAT image and where things landed in it
pub struct FatImage {
    pub data: Vec<u8>,
    pub kind: FatKind,
    pub fat_offset: usize,
    pub fat_size: usize,
    pub data_offset: usize,
    pub cluster_size: usize,
    chains: HashMap<String, Vec<u32>>,
}

impl FatImage {
    /// Clusters of the file or directory at `path` ("" is the root)
    pub fn chain(&self, path: &str) -> &[u32] {
        &self.chains[path]
    }

    /// Set a FAT entry in both FAT copies
    pub fn set_fat_entry(&mut self, cluster: u32, value: u32) {
        for copy in 0..2 {
            let base = self.fat_offset + copy * self.fat_size;
            let c = cluster as usize;
            match self.kind {
                FatKind::Fat12 => {
                    let off = base + c + c / 2;
                    let v = value & 0xFFF;
                    if c % 2 == 0 {
                        self.data[off] = v as u8;
                        self.data[off + 1] = (self.data[off + 1] & 0xF0) | (v >> 8) as u8;
                    } else {
                        self.data[off] = (self.data[off] & 0x0F) | ((v & 0x0F) << 4) as u8;
                        self.data[off + 1] = (v >> 4) as u8;
                    }
                }
                FatKind::Fat16 => {
                    let off = base + c * 2;
                    self.data[off..off + 2].copy_from_slice(&(value as u16).to_le_bytes());
                }
                FatKind::Fat32 => {
                    let off = base + c * 4;
                    self.data[off..off + 4].copy_from_slice(&value.to_le_bytes());
                }
            }
        }
    }

    fn write_chain(&mut self, chain: &[u32], bytes: &[u8]) {
        for (i, piece) in bytes.chunks(self.cluster_size).enumerate() {
            let off = self.data_offset + (chain[i] as usize - 2) * self.cluster_size;
            self.data[off..off + piece.len()].copy_from_slice(piece);
        }
    }

    pub fn into_device(self) -> MemoryBlockDevice {
        MemoryBlockDevice::new(self.data, SECTOR)
    }

    /// Unpartitioned disk holding only this filesystem
    pub fn into_volume(self, drive: u32) -> Volume {
        self.into_device().into_volume(drive)
    }
}

fn short_record(name: &[u8; 11], attr: u8, cluster: u32, size: u32) -> [u8; 32] {
    let mut r = [0u8; 32];
    r[..11].copy_from_slice(name);
    r[11] = attr;
    r[20..22].copy_from_slice(&((cluster >> 16) as u16).to_le_bytes());
    r[26..28].copy_from_slice(&(cluster as u16).to_le_bytes());
    r[28..32].copy_from_slice(&size.to_le_bytes());
    r
}

/// Short name for `name`, and whether long name records are needed
fn short_name_for(name: &str, alias: usize) -> ([u8; 11], bool) {
    let bytes = name.as_bytes();
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, ext),
        None => (name, ""),
    };
    let fits = stem.len() <= 8
        && ext.len() <= 3
        && !stem.is_empty()
        && bytes.iter().filter(|&&c| c == b'.').count() <= 1
        && !bytes.iter().any(|c| c.is_ascii_lowercase() || *c == b' ' || *c == b'-');

    let mut short = [b' '; 11];
    if fits {
        short[..stem.len()].copy_from_slice(stem.as_bytes());
        short[8..8 + ext.len()].copy_from_slice(ext.as_bytes());
        return (short, false);
    }

    let tail = format!("~{}", alias);
    let base: Vec<u8> = stem
        .bytes()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .take(6.min(8 - tail.len()))
        .collect();
    short[..base.len()].copy_from_slice(&base);
    short[base.len()..base.len() + tail.len()].copy_from_slice(tail.as_bytes());
    for (i, c) in ext.bytes().take(3).enumerate() {
        short[8 + i] = c.to_ascii_uppercase();
    }
    (short, true)
}

fn lfn_checksum(short: &[u8; 11]) -> u8 {
    short
        .iter()
        .fold(0u8, |sum, &c| (sum >> 1 | sum << 7).wrapping_add(c))
}

/// LFN records for `name`, in on-disk order (last fragment first)
fn long_records(name: &[u8], short: &[u8; 11]) -> Vec<[u8; 32]> {
    let count = (name.len() + 12) / 13;
    let checksum = lfn_checksum(short);
    let positions = [1, 3, 5, 7, 9, 14, 16, 18, 20, 22, 24, 28, 30];

    (1..=count)
        .rev()
        .map(|n| {
            let mut r = [0u8; 32];
            r[0] = n as u8 | if n == count { 0x40 } else { 0 };
            r[11] = 0x0F;
            r[13] = checksum;
            for (k, pos) in positions.iter().enumerate() {
                let i = (n - 1) * 13 + k;
                let unit: u16 = match i.cmp(&name.len()) {
                    std::cmp::Ordering::Less => u16::from(name[i]),
                    std::cmp::Ordering::Equal => 0,
                    std::cmp::Ordering::Greater => 0xFFFF,
                };
                r[*pos..*pos + 2].copy_from_slice(&unit.to_le_bytes());
            }
            r
        })
        .collect()
}
