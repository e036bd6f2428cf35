//! Pooled storage for the precomputed tables of a context.
//!
//! A [MemoryPool] keeps released `u64` buffers keyed by length and hands them
//! out again on the next request of the same size. Pools are shared through
//! [MemoryPoolHandle]s and may be used from any number of threads at once.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, OnceLock, PoisonError,
    },
};

use log::trace;

/// A thread-safe free list of `u64` buffers.
#[derive(Debug, Default)]
pub struct MemoryPool {
    free: Mutex<HashMap<usize, Vec<Vec<u64>>>>,
    alloc_byte_count: AtomicUsize,
}

impl MemoryPool {

    fn new() -> Self {
        trace!("[MemoryPool] creating a new pool");
        Self::default()
    }

    fn allocate(&self, count: usize) -> Vec<u64> {
        let reused = self.free.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&count)
            .and_then(Vec::pop);
        match reused {
            Some(mut buffer) => {
                buffer.fill(0);
                buffer
            }
            None => {
                self.alloc_byte_count.fetch_add(count * std::mem::size_of::<u64>(), Ordering::Relaxed);
                vec![0; count]
            }
        }
    }

    fn release(&self, buffer: Vec<u64>) {
        if buffer.is_empty() {
            return;
        }
        self.free.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(buffer.len())
            .or_default()
            .push(buffer);
    }

    fn free_buffer_count(&self) -> usize {
        self.free.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Vec::len)
            .sum()
    }

}

/// A shared reference to a [MemoryPool].
///
/// The default handle is uninitialized and points to no pool at all; handing
/// one to [crate::EncryptionContext] construction is a programming error and
/// panics. Two handles are equal when they point to the same pool.
#[derive(Clone, Debug, Default)]
pub struct MemoryPoolHandle {
    pool: Option<Arc<MemoryPool>>,
}

impl MemoryPoolHandle {

    /// The process-wide pool.
    pub fn global() -> Self {
        static GLOBAL: OnceLock<Arc<MemoryPool>> = OnceLock::new();
        let pool = GLOBAL.get_or_init(|| Arc::new(MemoryPool::new()));
        Self { pool: Some(pool.clone()) }
    }

    /// The pool owned by the calling thread.
    pub fn thread_local() -> Self {
        thread_local! {
            static LOCAL: Arc<MemoryPool> = Arc::new(MemoryPool::new());
        }
        LOCAL.with(|pool| Self { pool: Some(pool.clone()) })
    }

    /// A fresh pool shared with no other handle.
    pub fn new() -> Self {
        Self { pool: Some(Arc::new(MemoryPool::new())) }
    }

    /// Does this handle point to a pool?
    pub fn is_initialized(&self) -> bool {
        self.pool.is_some()
    }

    fn pool(&self) -> &MemoryPool {
        match &self.pool {
            Some(pool) => pool,
            None => panic!("[Logic error] Memory pool handle is not initialized."),
        }
    }

    /// A zeroed buffer of `count` words.
    ///
    /// # Panics
    /// If the handle is uninitialized.
    pub fn allocate_uint(&self, count: usize) -> Vec<u64> {
        self.pool().allocate(count)
    }

    /// Returns `buffer` to the pool for reuse. Does nothing for an
    /// uninitialized handle.
    pub fn release(&self, buffer: Vec<u64>) {
        if let Some(pool) = &self.pool {
            pool.release(buffer);
        }
    }

    /// Total bytes the pool has ever allocated fresh, not counting reuse.
    pub fn alloc_byte_count(&self) -> usize {
        self.pool.as_ref().map_or(0, |pool| pool.alloc_byte_count.load(Ordering::Relaxed))
    }

    /// Number of released buffers waiting for reuse.
    pub fn free_buffer_count(&self) -> usize {
        self.pool.as_ref().map_or(0, |pool| pool.free_buffer_count())
    }

}

impl PartialEq for MemoryPoolHandle {
    fn eq(&self, other: &Self) -> bool {
        match (&self.pool, &other.pool) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for MemoryPoolHandle {}

/// Which pool a context draws its storage from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MemoryProfile {
    /// The process-wide pool.
    #[default]
    Global,
    /// The pool of the thread that builds the context.
    ThreadLocal,
    /// A new pool for every call to [MemoryProfile::get_pool].
    New,
    /// Always the given pool.
    Fixed(MemoryPoolHandle),
}

impl MemoryProfile {

    /// Resolves the profile to a pool handle.
    pub fn get_pool(&self) -> MemoryPoolHandle {
        match self {
            MemoryProfile::Global => MemoryPoolHandle::global(),
            MemoryProfile::ThreadLocal => MemoryPoolHandle::thread_local(),
            MemoryProfile::New => MemoryPoolHandle::new(),
            MemoryProfile::Fixed(handle) => handle.clone(),
        }
    }

}
