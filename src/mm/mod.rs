//! # Memory Management Subsystem (MM)
//!
//! Gerência de páginas físicas do Forge.
//!
//! ## 🏗️ Arquitetura dos Módulos
//!
//! | Módulo   | Responsabilidade |
//! |----------|------------------|
//! | `kalloc` | Páginas de 4 KiB, uma free list por CPU com roubo entre CPUs. |
//! | `addr`   | `PhysAddr` type-safe. |
//! | `ops`    | `memset`/`memzero` voláteis usados pelo poison. |
//! | `stats`  | Contadores de alloc/free/roubo/OOM. |
//!
//! ## Erros
//!
//! - OOM é **recuperável**: `alloc` devolve `MmError::OutOfMemory` e quem
//!   chamou decide (falhar a syscall, matar o processo...).
//! - `free` de endereço desalinhado ou fora da região é **fatal** (panic);
//!   `try_free` expõe a mesma verificação como `Result`.

pub mod addr;
pub mod config;
pub mod error;
pub mod kalloc;
pub mod ops;
pub mod stats;

#[cfg(any(test, feature = "self_test"))]
pub mod test;

pub use addr::PhysAddr;
pub use config::PAGE_SIZE;
pub use error::{MmError, MmResult};
pub use kalloc::{kalloc, kfree};
