//! # Synchronization Primitives
//!
//! Primitivas de sincronização para ambiente SMP.
//!
//! ## Hierarquia de Uso
//!
//! ```text
//! Spinlock   → Seções críticas curtas (não pode dormir)
//! SleepLock  → Posse longa, pode atravessar I/O (quem espera cede a CPU)
//! ```
//!
//! ## Regras
//!
//! - **Spinlock**: metadados de buckets e free lists. Nunca segurar durante I/O.
//! - **SleepLock**: conteúdo de um buffer de bloco. Nunca adquirir segurando um Spinlock.
//! - **Ordem de Lock**: dois Spinlocks do mesmo tipo só em ordem crescente de índice.

/// Spinlock (busy-wait, não dorme)
pub mod spinlock;

/// SleepLock (bloqueia cedendo a CPU ao scheduler)
pub mod sleeplock;

pub use sleeplock::{SleepLock, SleepLockGuard};
pub use spinlock::{Spinlock, SpinlockGuard};
