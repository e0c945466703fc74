//! Builds small ISO9660 images in memory
//!
//! Layout: optional boot record descriptors from sector 16, then the PVD and
//! the terminator, then directory extents, then file extents. Records never
//! straddle a sector.

#![allow(dead_code)]

use crate::common::MemoryBlockDevice;

const SECTOR: usize = 2048;

enum Kind {
    File { content: Vec<u8>, parts: usize },
    Dir(usize),
}

struct Entry {
    identifier: Vec<u8>,
    rock_ridge: Option<Vec<u8>>,
    kind: Kind,
}

struct Dir {
    parent: usize,
    entries: Vec<Entry>,
    lba: u32,
    size: u32,
}

/// One directory record to emit
struct Record {
    identifier: Vec<u8>,
    rock_ridge: Option<Vec<u8>>,
    lba: u32,
    size: u32,
    flags: u8,
}

impl Record {
    fn len(&self) -> usize {
        record_len(&self.identifier, self.rock_ridge.as_deref())
    }
}

fn record_len(identifier: &[u8], rock_ridge: Option<&[u8]>) -> usize {
    let pad = usize::from(identifier.len() % 2 == 0);
    33 + identifier.len() + pad + rock_ridge.map_or(0, |n| 5 + n.len())
}

pub struct IsoBuilder {
    volume_id: String,
    boot_records: usize,
    with_pvd: bool,
    dirs: Vec<Dir>,
}

impl IsoBuilder {
    pub fn new() -> Self {
        Self {
            volume_id: String::from("TEST VOLUME"),
            boot_records: 0,
            with_pvd: true,
            dirs: vec![Dir {
                parent: 0,
                entries: Vec::new(),
                lba: 0,
                size: 0,
            }],
        }
    }

    pub fn volume_id(mut self, id: &str) -> Self {
        self.volume_id = id.to_string();
        self
    }

    /// Insert `count` boot record descriptors ahead of the PVD
    pub fn boot_records(mut self, count: usize) -> Self {
        self.boot_records = count;
        self
    }

    /// Emit a terminator where the PVD would be
    pub fn without_pvd(mut self) -> Self {
        self.with_pvd = false;
        self
    }

    /// Add a directory; `path` uses raw identifiers ("BOOT/GRUB")
    pub fn dir(mut self, path: &str) -> Self {
        let (parent, name) = self.parent_of(path);
        let index = self.dirs.len();
        self.dirs.push(Dir {
            parent,
            entries: Vec::new(),
            lba: 0,
            size: 0,
        });
        self.dirs[parent].entries.push(Entry {
            identifier: name.as_bytes().to_vec(),
            rock_ridge: None,
            kind: Kind::Dir(index),
        });
        self
    }

    /// Add a file; the last component is the raw identifier ("README.TXT;1")
    pub fn file(self, path: &str, content: &[u8]) -> Self {
        self.push_file(path, None, content, 1)
    }

    /// Add a file carrying a Rock Ridge `NM` name
    pub fn file_rr(self, path: &str, rock_ridge: &str, content: &[u8]) -> Self {
        self.push_file(path, Some(rock_ridge), content, 1)
    }

    /// Add a file split over `parts` non-contiguous extents
    pub fn multi_extent_file(self, path: &str, content: &[u8], parts: usize) -> Self {
        self.push_file(path, None, content, parts)
    }

    fn push_file(mut self, path: &str, rr: Option<&str>, content: &[u8], parts: usize) -> Self {
        let (parent, name) = self.parent_of(path);
        self.dirs[parent].entries.push(Entry {
            identifier: name.as_bytes().to_vec(),
            rock_ridge: rr.map(|n| n.as_bytes().to_vec()),
            kind: Kind::File {
                content: content.to_vec(),
                parts,
            },
        });
        self
    }

    fn parent_of<'p>(&self, path: &'p str) -> (usize, &'p str) {
        let mut components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
        let name = components.pop().expect("non-empty path");
        let mut dir = 0;
        for component in components {
            dir = self.dirs[dir]
                .entries
                .iter()
                .find_map(|e| match e.kind {
                    Kind::Dir(index) if e.identifier == component.as_bytes() => Some(index),
                    _ => None,
                })
                .expect("parent directory added first");
        }
        (dir, name)
    }

    fn file_parts(content: &[u8], parts: usize) -> Vec<&[u8]> {
        if parts <= 1 {
            return vec![content];
        }
        let per = content.len().div_ceil(parts).div_ceil(SECTOR).max(1) * SECTOR;
        let chunks: Vec<&[u8]> = content.chunks(per).collect();
        assert_eq!(chunks.len(), parts, "content does not split into {} extents", parts);
        chunks
    }

    /// Records of `dir` in on-disk order: ".", "..", then each entry
    fn dir_records(&self, dir: usize, placements: &[Vec<Vec<(u32, u32)>>]) -> Vec<Record> {
        let this = &self.dirs[dir];
        let parent = &self.dirs[this.parent];
        let mut records = vec![
            Record {
                identifier: vec![0],
                rock_ridge: None,
                lba: this.lba,
                size: this.size,
                flags: 0x02,
            },
            Record {
                identifier: vec![1],
                rock_ridge: None,
                lba: parent.lba,
                size: parent.size,
                flags: 0x02,
            },
        ];
        for (i, entry) in this.entries.iter().enumerate() {
            match entry.kind {
                Kind::Dir(index) => records.push(Record {
                    identifier: entry.identifier.clone(),
                    rock_ridge: entry.rock_ridge.clone(),
                    lba: self.dirs[index].lba,
                    size: self.dirs[index].size,
                    flags: 0x02,
                }),
                Kind::File { .. } => {
                    let extents = &placements[dir][i];
                    for (n, &(lba, size)) in extents.iter().enumerate() {
                        records.push(Record {
                            identifier: entry.identifier.clone(),
                            rock_ridge: entry.rock_ridge.clone(),
                            lba,
                            size,
                            flags: if n + 1 < extents.len() { 0x80 } else { 0 },
                        });
                    }
                }
            }
        }
        records
    }

    /// Extent placements with the right counts but no locations yet
    fn placeholder_placements(&self) -> Vec<Vec<Vec<(u32, u32)>>> {
        self.dirs
            .iter()
            .map(|dir| {
                dir.entries
                    .iter()
                    .map(|entry| match &entry.kind {
                        Kind::File { content, parts } => {
                            vec![(0, 0); Self::file_parts(content, *parts).len()]
                        }
                        Kind::Dir(_) => Vec::new(),
                    })
                    .collect()
            })
            .collect()
    }

    /// Sector-aligned size of a directory holding `records`
    fn dir_size(records: &[Record]) -> usize {
        let mut pos = 0;
        for record in records {
            if pos % SECTOR + record.len() > SECTOR {
                pos = (pos / SECTOR + 1) * SECTOR;
            }
            pos += record.len();
        }
        pos.div_ceil(SECTOR).max(1) * SECTOR
    }

    pub fn build(mut self) -> MemoryBlockDevice {
        let descriptors = self.boot_records + 2;
        let mut next_lba = 16 + descriptors as u32;

        // Directory extents
        let placeholder = self.placeholder_placements();
        for dir in 0..self.dirs.len() {
            let size = Self::dir_size(&self.dir_records(dir, &placeholder));
            self.dirs[dir].lba = next_lba;
            self.dirs[dir].size = size as u32;
            next_lba += (size / SECTOR) as u32;
        }

        // File extents, one spare sector between parts of a multi-extent file
        let mut placements: Vec<Vec<Vec<(u32, u32)>>> = Vec::new();
        for dir in &self.dirs {
            let mut per_dir = Vec::new();
            for entry in &dir.entries {
                let mut extents = Vec::new();
                if let Kind::File { content, parts } = &entry.kind {
                    let chunks = Self::file_parts(content, *parts);
                    for chunk in &chunks {
                        extents.push((next_lba, chunk.len() as u32));
                        next_lba += chunk.len().div_ceil(SECTOR) as u32;
                        if chunks.len() > 1 {
                            next_lba += 1;
                        }
                    }
                }
                per_dir.push(extents);
            }
            placements.push(per_dir);
        }

        let mut data = vec![0u8; (next_lba as usize + 1) * SECTOR];

        // Volume descriptors
        for i in 0..self.boot_records {
            Self::write_descriptor(&mut data, 16 + i, 0);
        }
        let pvd = 16 + self.boot_records;
        if self.with_pvd {
            Self::write_descriptor(&mut data, pvd, 1);
            let base = pvd * SECTOR;
            let id = self.volume_id.as_bytes();
            data[base + 40..base + 72].fill(b' ');
            data[base + 40..base + 40 + id.len()].copy_from_slice(id);
            Self::write_both_endian_u32(&mut data[base + 80..], next_lba + 1);
            Self::write_both_endian_u16(&mut data[base + 128..], SECTOR as u16);
            let mut root = base + 156;
            let (lba, size) = (self.dirs[0].lba, self.dirs[0].size);
            Self::write_dir_entry(&mut data, &mut root, lba, size, 0x02, &[0], None);
            Self::write_descriptor(&mut data, pvd + 1, 255);
        } else {
            Self::write_descriptor(&mut data, pvd, 255);
        }

        // Directory contents
        for dir in 0..self.dirs.len() {
            let start = self.dirs[dir].lba as usize * SECTOR;
            let mut pos = start;
            for record in &self.dir_records(dir, &placements) {
                if (pos - start) % SECTOR + record.len() > SECTOR {
                    pos = start + ((pos - start) / SECTOR + 1) * SECTOR;
                }
                Self::write_dir_entry(
                    &mut data,
                    &mut pos,
                    record.lba,
                    record.size,
                    record.flags,
                    &record.identifier,
                    record.rock_ridge.as_deref(),
                );
            }
        }

        // File contents, spare sectors filled with a marker
        for (dir, per_dir) in placements.iter().enumerate() {
            for (i, extents) in per_dir.iter().enumerate() {
                if let Kind::File { content, parts } = &self.dirs[dir].entries[i].kind {
                    let chunks = Self::file_parts(content, *parts);
                    for (chunk, &(lba, _)) in chunks.iter().zip(extents) {
                        let offset = lba as usize * SECTOR;
                        data[offset..offset + chunk.len()].copy_from_slice(chunk);
                        if chunks.len() > 1 {
                            let gap = offset + chunk.len().div_ceil(SECTOR) * SECTOR;
                            data[gap..gap + SECTOR].fill(0xEE);
                        }
                    }
                }
            }
        }

        MemoryBlockDevice::new(data)
    }

    fn write_descriptor(data: &mut [u8], sector: usize, kind: u8) {
        let base = sector * SECTOR;
        data[base] = kind;
        data[base + 1..base + 6].copy_from_slice(b"CD001");
        data[base + 6] = 1;
    }

    fn write_both_endian_u32(dst: &mut [u8], value: u32) {
        dst[0..4].copy_from_slice(&value.to_le_bytes());
        dst[4..8].copy_from_slice(&value.to_be_bytes());
    }

    fn write_both_endian_u16(dst: &mut [u8], value: u16) {
        dst[0..2].copy_from_slice(&value.to_le_bytes());
        dst[2..4].copy_from_slice(&value.to_be_bytes());
    }

    fn write_dir_entry(
        data: &mut [u8],
        offset: &mut usize,
        lba: u32,
        size: u32,
        flags: u8,
        identifier: &[u8],
        rock_ridge: Option<&[u8]>,
    ) {
        let len = record_len(identifier, rock_ridge);
        let start = *offset;
        data[start] = len as u8;
        Self::write_both_endian_u32(&mut data[start + 2..], lba);
        Self::write_both_endian_u32(&mut data[start + 10..], size);
        data[start + 25] = flags;
        Self::write_both_endian_u16(&mut data[start + 28..], 1);
        data[start + 32] = identifier.len() as u8;
        data[start + 33..start + 33 + identifier.len()].copy_from_slice(identifier);

        if let Some(name) = rock_ridge {
            let su = start + 33 + identifier.len() + usize::from(identifier.len() % 2 == 0);
            data[su] = b'N';
            data[su + 1] = b'M';
            data[su + 2] = (5 + name.len()) as u8;
            data[su + 3] = 1;
            data[su + 4] = 0;
            data[su + 5..su + 5 + name.len()].copy_from_slice(name);
        }

        *offset += len;
    }
}
