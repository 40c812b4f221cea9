//! Forge Kernel Core Resources.
//!
//! Gerenciadores de recursos de granularidade fixa do Kernel Forge:
//!
//! - `fs::bio`    : buffer cache de blocos de disco, particionado em buckets.
//! - `mm::kalloc` : alocador de páginas físicas (4 KiB) com uma free list por CPU.
//!
//! Ambos seguem o mesmo desenho: um pool finito dividido em shards com lock
//! próprio, e roubo (work stealing) entre shards quando o local se esgota.

#![cfg_attr(not(test), no_std)]

// Arenas de buffers e tabelas por CPU são dimensionadas no boot
extern crate alloc;

// --- Módulos de Baixo Nível (Hardware) ---
pub mod arch; // Identidade da CPU atual e regiões sem migração
pub mod drivers; // Dispositivos de bloco (trait + ramdisk)

// --- Módulos Centrais ---
pub mod core; // Logging
pub mod klib; // Framework de self-test
pub mod mm; // Alocador de páginas por CPU
pub mod sync; // Spinlock e SleepLock

// --- Subsistemas ---
pub mod fs; // Buffer cache

pub use crate::drivers::block::{BlockDevice, BlockError};
pub use crate::fs::bio::{BcacheConfig, BcacheError, BufGuard, BufPin, BufferCache};
pub use crate::mm::kalloc::{AllocFlags, KallocConfig, PageAllocator, PoisonFill};
pub use crate::mm::{MmError, MmResult, PhysAddr};

/// Executa as suites de self-test de todos os subsistemas.
///
/// Chamado no boot quando a feature `self_test` está ativa.
#[cfg(any(test, feature = "self_test"))]
pub fn run_self_tests() -> bool {
    let kalloc = mm::test::run_kalloc_tests();
    let bio = fs::test::run_bio_tests();
    kalloc.ok() && bio.ok()
}
