//! Pooled byte buffers for event encoding
//!
//! Every enabled log call borrows one buffer from a [`BufferPool`] for the
//! lifetime of its event and hands it back when the record has been written.
//! The free list is a bounded `crossbeam-channel` array queue, so `acquire`
//! and `release` never block and never take a lock.
//!
//! # Ownership
//!
//! [`PooledBuffer`] is a move-only handle. It returns its storage to the pool
//! when dropped, and nothing else can hold on to the bytes afterwards: the
//! handler only ever sees a borrowed slice for the duration of the write.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

/// Default number of idle buffers kept in the free list
pub const DEFAULT_POOL_CAPACITY: usize = 256;

/// Default initial capacity of a freshly allocated buffer
pub const DEFAULT_INITIAL_CAPACITY: usize = 512;

/// Buffers that grew beyond this capacity are dropped instead of pooled
pub const DEFAULT_RETAIN_CAPACITY: usize = 64 * 1024;

/// Sizing of a [`BufferPool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum number of idle buffers kept for reuse
    pub capacity: usize,
    /// Capacity reserved when a new buffer has to be allocated
    pub initial_capacity: usize,
    /// Buffers whose capacity exceeds this are discarded on release
    pub retain_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_POOL_CAPACITY,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            retain_capacity: DEFAULT_RETAIN_CAPACITY,
        }
    }
}

/// Lock-free free list of reusable byte buffers
#[derive(Debug)]
pub struct BufferPool {
    free: Sender<Vec<u8>>,
    idle: Receiver<Vec<u8>>,
    initial_capacity: usize,
    retain_capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    discarded: AtomicU64,
}

impl BufferPool {
    pub fn new(config: PoolConfig) -> Self {
        let (free, idle) = bounded(config.capacity.max(1));
        Self {
            free,
            idle,
            initial_capacity: config.initial_capacity,
            retain_capacity: config.retain_capacity.max(config.initial_capacity),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    /// Borrow a cleared buffer, allocating only when the free list is empty
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let buf = match self.idle.try_recv() {
            Ok(buf) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                buf
            }
            Err(_) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Vec::with_capacity(self.initial_capacity)
            }
        };
        PooledBuffer {
            buf,
            pool: self,
        }
    }

    /// Return storage to the free list
    ///
    /// Oversized buffers, and buffers arriving while the free list is full,
    /// are dropped so the pool never retains unbounded memory.
    pub fn release(&self, mut buf: Vec<u8>) {
        if buf.capacity() > self.retain_capacity {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            return;
        }
        buf.clear();
        if self.free.try_send(buf).is_err() {
            self.discarded.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of idle buffers currently pooled
    pub fn idle(&self) -> usize {
        self.idle.len()
    }

    /// Acquisitions served from the free list
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Acquisitions that had to allocate
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Releases that dropped the buffer instead of pooling it
    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

/// Exclusively owned buffer on loan from a [`BufferPool`]
#[derive(Debug)]
pub struct PooledBuffer<'p> {
    buf: Vec<u8>,
    pool: &'p BufferPool,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        // An empty Vec does not allocate.
        self.pool.release(std::mem::take(&mut self.buf));
    }
}
