//! # Estatísticas do Buffer Cache

use core::sync::atomic::{AtomicU64, Ordering};

/// Contadores vivos de um `BufferCache` (atualizados sem lock)
#[derive(Debug, Default)]
pub struct BcacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    steals: AtomicU64,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl BcacheCounters {
    pub const fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            steals: AtomicU64::new(0),
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_steal(&self) {
        self.steals.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> BcacheStats {
        BcacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            steals: self.steals.load(Ordering::Relaxed),
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
        }
    }
}

/// Foto dos contadores
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BcacheStats {
    /// Chave já estava em cache
    pub hits: u64,
    /// Slot reciclado (do bucket local ou roubado)
    pub misses: u64,
    /// Misses atendidos por outro bucket
    pub steals: u64,
    /// Leituras de disco
    pub reads: u64,
    /// Escritas de disco
    pub writes: u64,
}

impl BcacheStats {
    pub fn hit_percent(&self) -> u64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0;
        }
        (self.hits * 100) / total
    }
}
