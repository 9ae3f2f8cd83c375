//! Bit-addressable memory region
//!
//! This module provides the storage behind every variable:
//! - One fixed-capacity region of bits
//! - Bump allocation from a high-water mark (no free list)
//! - Named buckets, several names may share one bucket
//! - Compaction that repacks live buckets from offset 0
//!
//! Freed space below the high-water mark is only reclaimed by compaction,
//! which runs when an allocation would otherwise overflow the region.

use super::encoding::{decode, encode, Encoded};
use super::value::{Value, VarType};
use super::{MemoryError, DEFAULT_CAPACITY_BITS};
use rustc_hash::FxHashMap;

pub type BucketId = usize;

/// Storage location of one live value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub var_type: VarType,
    pub start: usize,
    pub width: usize,
    /// Start of the fraction field for doubles, relative to `start`
    pub split: Option<usize>,
    refs: usize,
}

impl Bucket {
    pub fn end(&self) -> usize {
        self.start + self.width
    }

    /// Number of names sharing this bucket
    pub fn refs(&self) -> usize {
        self.refs
    }
}

/// The memory region
#[derive(Debug, Clone)]
pub struct Ram {
    bits: Vec<bool>,
    high_water: usize,
    buckets: FxHashMap<BucketId, Bucket>,
    names: FxHashMap<String, BucketId>,
    next_id: BucketId,
    compactions: usize,
}

impl Ram {
    pub fn new(capacity: usize) -> Self {
        Ram {
            bits: vec![false; capacity],
            high_water: 0,
            buckets: FxHashMap::default(),
            names: FxHashMap::default(),
            next_id: 0,
            compactions: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Next free bit offset
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Number of compaction passes run so far
    pub fn compactions(&self) -> usize {
        self.compactions
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn bucket(&self, name: &str) -> Option<&Bucket> {
        self.names.get(name).and_then(|id| self.buckets.get(id))
    }

    /// The bits currently held by a bucket
    pub fn bits_of(&self, bucket: &Bucket) -> &[bool] {
        &self.bits[bucket.start..bucket.end()]
    }

    /// Live buckets in start-offset order, each with the names that refer to it
    pub fn live_buckets(&self) -> Vec<(Vec<String>, &Bucket)> {
        let mut grouped: FxHashMap<BucketId, Vec<String>> = FxHashMap::default();
        for (name, id) in &self.names {
            grouped.entry(*id).or_default().push(name.clone());
        }
        let mut live: Vec<(Vec<String>, &Bucket)> = grouped
            .into_iter()
            .filter_map(|(id, mut names)| {
                names.sort();
                self.buckets.get(&id).map(|bucket| (names, bucket))
            })
            .collect();
        live.sort_by_key(|(_, bucket)| bucket.start);
        live
    }

    /// Stores `value` under `name`, allocating on first write.
    ///
    /// Fixed-width values are rewritten in place. A word that shrinks keeps
    /// its start and gives back its tail; a word that grows is moved to the
    /// high-water mark.
    pub fn write(&mut self, name: &str, value: &Value) -> Result<(), MemoryError> {
        let encoded = encode(value)?;
        let width = encoded.bits.len();

        let Some(&id) = self.names.get(name) else {
            let start = self.reserve(width)?;
            let id = self.next_id;
            self.next_id += 1;
            self.buckets.insert(
                id,
                Bucket {
                    var_type: value.var_type(),
                    start,
                    width,
                    split: encoded.split,
                    refs: 1,
                },
            );
            self.names.insert(name.to_string(), id);
            self.store(id, &encoded);
            return Ok(());
        };

        let Some(current) = self.buckets.get(&id).map(|b| (b.start, b.width)) else {
            return Err(MemoryError::UnknownName {
                name: name.to_string(),
            });
        };
        let (start, old_width) = current;

        if width > old_width {
            self.relocate(id, width)?;
        } else if width < old_width && start + old_width == self.high_water {
            self.high_water = start + width;
        }

        if let Some(bucket) = self.buckets.get_mut(&id) {
            bucket.width = width;
            bucket.split = encoded.split;
            bucket.var_type = value.var_type();
        }
        self.store(id, &encoded);
        Ok(())
    }

    /// Moves a bucket to fresh space of `width` bits at the high-water mark.
    fn relocate(&mut self, id: BucketId, width: usize) -> Result<(), MemoryError> {
        let Some(mut bucket) = self.buckets.remove(&id) else {
            return Ok(());
        };
        let saved = self.bits[bucket.start..bucket.end()].to_vec();
        if bucket.end() == self.high_water {
            self.high_water = bucket.start;
        }
        // Detached so compaction doesn't move the old contents back in
        match self.reserve(width) {
            Ok(start) => {
                tracing::debug!(from = bucket.start, to = start, width, "relocating bucket");
                bucket.start = start;
                bucket.width = width;
                self.buckets.insert(id, bucket);
                Ok(())
            }
            Err(err) => {
                // Compaction may have packed over the old range
                let start = self.high_water;
                self.bits[start..start + saved.len()].copy_from_slice(&saved);
                self.high_water += saved.len();
                bucket.start = start;
                self.buckets.insert(id, bucket);
                Err(err)
            }
        }
    }

    fn store(&mut self, id: BucketId, encoded: &Encoded) {
        if let Some(bucket) = self.buckets.get(&id) {
            let start = bucket.start;
            self.bits[start..start + encoded.bits.len()].copy_from_slice(&encoded.bits);
        }
    }

    /// Claims `width` bits at the high-water mark, compacting first if needed.
    fn reserve(&mut self, width: usize) -> Result<usize, MemoryError> {
        if self.high_water + width > self.capacity() {
            self.compact();
            if self.high_water + width > self.capacity() {
                return Err(MemoryError::OutOfMemory {
                    requested: width,
                    capacity: self.capacity(),
                });
            }
        }
        let start = self.high_water;
        self.high_water += width;
        Ok(start)
    }

    /// Binds `alias` to the bucket already named `existing`.
    pub fn alias(&mut self, alias: &str, existing: &str) -> Result<(), MemoryError> {
        let id = *self
            .names
            .get(existing)
            .ok_or_else(|| MemoryError::UnknownName {
                name: existing.to_string(),
            })?;
        if let Some(previous) = self.names.insert(alias.to_string(), id) {
            self.release(previous);
        }
        if let Some(bucket) = self.buckets.get_mut(&id) {
            bucket.refs += 1;
        }
        Ok(())
    }

    pub fn read(&self, name: &str) -> Result<Value, MemoryError> {
        let bucket = self.bucket(name).ok_or_else(|| MemoryError::UnknownName {
            name: name.to_string(),
        })?;
        Ok(decode(bucket.var_type, self.bits_of(bucket), bucket.split))
    }

    /// Removes a name; the bucket is freed with its last name.
    pub fn delete(&mut self, name: &str) -> Result<(), MemoryError> {
        let id = self
            .names
            .remove(name)
            .ok_or_else(|| MemoryError::UnknownName {
                name: name.to_string(),
            })?;
        self.release(id);
        Ok(())
    }

    fn release(&mut self, id: BucketId) {
        let Some(bucket) = self.buckets.get_mut(&id) else {
            return;
        };
        bucket.refs = bucket.refs.saturating_sub(1);
        if bucket.refs > 0 {
            return;
        }
        if let Some(bucket) = self.buckets.remove(&id) {
            if bucket.end() == self.high_water {
                self.high_water = bucket.start;
            }
        }
    }

    /// Repacks every live bucket contiguously from offset 0 in start order.
    pub fn compact(&mut self) {
        let before = self.high_water;
        let mut order: Vec<(usize, BucketId)> =
            self.buckets.iter().map(|(id, b)| (b.start, *id)).collect();
        order.sort_unstable();

        let mut next = 0;
        for (_, id) in order {
            if let Some(bucket) = self.buckets.get_mut(&id) {
                self.bits.copy_within(bucket.start..bucket.end(), next);
                bucket.start = next;
                next += bucket.width;
            }
        }
        self.bits[next..before.max(next)].fill(false);
        self.high_water = next;
        self.compactions += 1;
        tracing::debug!(before, after = next, "compacted memory");
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY_BITS)
    }
}
