//! # Estatísticas do Alocador de Páginas

use core::sync::atomic::{AtomicU64, Ordering};

/// Contadores vivos de um `PageAllocator` (atualizados sem lock)
#[derive(Debug, Default)]
pub struct KallocCounters {
    allocs: AtomicU64,
    frees: AtomicU64,
    steals: AtomicU64,
    exhausted: AtomicU64,
}

impl KallocCounters {
    pub const fn new() -> Self {
        Self {
            allocs: AtomicU64::new(0),
            frees: AtomicU64::new(0),
            steals: AtomicU64::new(0),
            exhausted: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_alloc(&self) {
        self.allocs.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_free(&self) {
        self.frees.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_steal(&self) {
        self.steals.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> KallocStats {
        KallocStats {
            allocs: self.allocs.load(Ordering::Relaxed),
            frees: self.frees.load(Ordering::Relaxed),
            steals: self.steals.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
        }
    }
}

/// Foto dos contadores
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KallocStats {
    /// Alocações bem sucedidas (locais + roubadas)
    pub allocs: u64,
    /// Páginas devolvidas via free (a semeadura do init não conta)
    pub frees: u64,
    /// Alocações atendidas pela free list de outra CPU
    pub steals: u64,
    /// Alocações que devolveram OOM
    pub exhausted: u64,
}

impl KallocStats {
    /// Percentual de alocações que precisaram roubar
    pub fn steal_percent(&self) -> u64 {
        if self.allocs == 0 {
            return 0;
        }
        (self.steals * 100) / self.allocs
    }
}
