//! Transposition table: fixed-capacity, 4-way buckets, per-bucket locks.
//!
//! Stores are best-effort under contention; every probe re-validates the
//! stored key, so a lost or garbled entry degrades to a cache miss.

use cozy_chess::Move;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// How a stored score relates to the search window that produced it.
///
/// `Upper` may only tighten beta, `Lower` only alpha; `Exact` stands on
/// its own. Required for correctness under alpha-beta's partial windows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Clone, Copy, Debug)]
pub struct Entry {
    pub key: u64,
    pub depth: u32,
    pub score: i32,
    pub best: Option<Move>,
    pub bound: Bound,
    pub gen: u32,
}

const WAYS: usize = 4;

#[derive(Default, Clone, Copy)]
struct Slot(Option<Entry>);

#[derive(Default)]
struct Bucket {
    slots: [Slot; WAYS],
}

pub struct Tt {
    buckets: Vec<Mutex<Bucket>>,
    gen: AtomicU32,
}

impl Tt {
    /// Table holding at least `entries` entries, rounded up to whole buckets.
    pub fn with_capacity_entries(entries: usize) -> Self {
        let entries = entries.max(WAYS);
        let buckets = (entries + WAYS - 1) / WAYS;
        let mut v = Vec::with_capacity(buckets);
        v.resize_with(buckets, || Mutex::new(Bucket::default()));
        Self {
            buckets: v,
            gen: AtomicU32::new(0),
        }
    }

    /// Size the table by memory budget, ~64 bytes per entry.
    pub fn with_capacity_mb(mb: usize) -> Self {
        let entries = (mb.saturating_mul(1024) * 1024 / 64).max(WAYS);
        Self::with_capacity_entries(entries)
    }

    pub fn capacity_entries(&self) -> usize {
        self.buckets.len() * WAYS
    }

    /// Drop every entry. Used between independent top-level searches.
    pub fn clear(&self) {
        for b in &self.buckets {
            let mut g = b.lock().unwrap();
            *g = Bucket::default();
        }
    }

    fn bucket_index(&self, key: u64) -> usize {
        let mixed = key ^ (key >> 32);
        (mixed as usize) % self.buckets.len()
    }

    /// Look up an entry. A bucket hit still compares the stored key
    /// against the query key before anything is trusted.
    pub fn probe(&self, key: u64) -> Option<Entry> {
        let idx = self.bucket_index(key);
        let g = self.buckets[idx].lock().unwrap();
        for slot in &g.slots {
            if let Some(e) = slot.0 {
                if e.key == key {
                    return Some(e);
                }
            }
        }
        None
    }

    /// Insert an entry, evicting per the replacement policy on a full
    /// bucket: same key replaced when equal-or-deeper, else an empty
    /// slot, else the shallowest entry with the oldest generation.
    pub fn store(&self, mut e: Entry) {
        let idx = self.bucket_index(e.key);
        let mut g = self.buckets[idx].lock().unwrap();
        e.gen = self.gen.load(Ordering::Relaxed);
        for slot in &mut g.slots {
            if let Some(cur) = slot.0 {
                if cur.key == e.key {
                    if e.depth >= cur.depth || e.gen != cur.gen {
                        slot.0 = Some(e);
                    }
                    return;
                }
            }
        }
        for slot in &mut g.slots {
            if slot.0.is_none() {
                slot.0 = Some(e);
                return;
            }
        }
        let mut victim = 0usize;
        let mut victim_rank = (u32::MAX, u32::MAX);
        for (i, slot) in g.slots.iter().enumerate() {
            if let Some(cur) = slot.0 {
                // Evict lowest depth first, then oldest generation.
                let rank = (cur.depth, cur.gen);
                if rank < victim_rank {
                    victim_rank = rank;
                    victim = i;
                }
            }
        }
        g.slots[victim].0 = Some(e);
    }

    /// Count of occupied slots. Walks the table; test/diagnostic use.
    pub fn len(&self) -> usize {
        let mut count = 0;
        for b in &self.buckets {
            let g = b.lock().unwrap();
            for s in &g.slots {
                if s.0.is_some() {
                    count += 1;
                }
            }
        }
        count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bump_generation(&self) {
        self.gen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn generation(&self) -> u32 {
        self.gen.load(Ordering::Relaxed)
    }
}

impl Default for Tt {
    fn default() -> Self {
        Self::with_capacity_entries(1 << 16)
    }
}
