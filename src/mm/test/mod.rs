//! # Testes do Subsistema de Memória
//!
//! - `kalloc_test.rs` - Suite de self-test do alocador de páginas por CPU
//!
//! Também fornece os utilitários compartilhados pelos testes de unidade:
//! `TestArena` (páginas reais para o alocador) e `FakeCpu` (CPU atual
//! controlada pelo teste).

pub mod kalloc_test;

pub use kalloc_test::{run_kalloc_tests, KALLOC_TESTS};

use alloc::alloc::{alloc_zeroed, dealloc, Layout};
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::arch::CpuLocal;
use crate::mm::addr::PhysAddr;
use crate::mm::config::PAGE_SIZE;

/// Região de páginas alinhadas, obtida do heap, para alimentar um alocador
pub struct TestArena {
    base: *mut u8,
    layout: Layout,
}

impl TestArena {
    /// Reserva `pages` páginas contíguas alinhadas a `PAGE_SIZE`
    pub fn new(pages: usize) -> Self {
        let layout = match Layout::from_size_align(pages * PAGE_SIZE, PAGE_SIZE) {
            Ok(layout) => layout,
            Err(_) => panic!("TestArena: layout inválido"),
        };
        // SAFETY: layout com tamanho > 0
        let base = unsafe { alloc_zeroed(layout) };
        if base.is_null() {
            panic!("TestArena: heap esgotado");
        }
        Self { base, layout }
    }

    pub fn start(&self) -> PhysAddr {
        PhysAddr::from_ptr(self.base)
    }

    pub fn end(&self) -> PhysAddr {
        self.start().add(self.layout.size() as u64)
    }

    /// Endereço da página `i`
    pub fn page(&self, i: usize) -> PhysAddr {
        self.start().add((i * PAGE_SIZE) as u64)
    }
}

impl Drop for TestArena {
    fn drop(&mut self) {
        // SAFETY: mesmo layout usado em `new`
        unsafe { dealloc(self.base, self.layout) };
    }
}

/// CPU "atual" escolhida pelo teste
pub struct FakeCpu {
    id: AtomicUsize,
}

impl FakeCpu {
    pub const fn new(id: usize) -> Self {
        Self {
            id: AtomicUsize::new(id),
        }
    }

    pub fn set(&self, id: usize) {
        self.id.store(id, Ordering::Relaxed);
    }
}

impl CpuLocal for FakeCpu {
    fn cpu_id(&self) -> usize {
        self.id.load(Ordering::Relaxed)
    }

    fn push_off(&self) {}

    fn pop_off(&self) {}
}
