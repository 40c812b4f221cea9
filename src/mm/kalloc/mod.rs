//! # KAlloc - Páginas Físicas de 4 KiB
//!
//! Alocador usado por page tables, stacks de kernel, pipes e processos.
//! Só entrega unidades inteiras de `PAGE_SIZE`; não há alocação de tamanho
//! variável aqui.
//!
//! O kernel usa a instância global (`init`, `kalloc`, `kfree`); testes e
//! subsistemas isolados podem criar o próprio `PageAllocator`.

mod freelist;
mod percpu;
mod poison;

pub use percpu::{AllocFlags, KallocConfig, PageAllocator};
pub use poison::PoisonFill;

use crate::arch::CpuLocal;
use crate::mm::addr::PhysAddr;
use crate::mm::error::{MmError, MmResult};
use spin::Once;

/// Tipo da instância global
pub type KernelPageAllocator = PageAllocator<&'static dyn CpuLocal>;

static KMEM: Once<KernelPageAllocator> = Once::new();

/// Inicializa o alocador global com a região `[start, end)`.
///
/// Só a primeira chamada bem sucedida tem efeito; as seguintes devolvem
/// `MmError::InitFailed`.
///
/// # Safety
/// Mesmo contrato de `PageAllocator::init_range`.
pub unsafe fn init(
    cpu: &'static dyn CpuLocal,
    config: KallocConfig,
    start: PhysAddr,
    end: PhysAddr,
) -> MmResult<usize> {
    let mut seeded = None;
    let result = KMEM.try_call_once(|| {
        let mut kmem = PageAllocator::new(cpu, config)?;
        seeded = Some(kmem.init_range(start, end)?);
        Ok::<_, MmError>(kmem)
    });

    match (result, seeded) {
        (Ok(_), Some(pages)) => Ok(pages),
        // Já havia uma instância: nada foi tocado
        (Ok(_), None) => Err(MmError::InitFailed),
        (Err(err), _) => Err(err),
    }
}

/// Instância global, se já inicializada
pub fn allocator() -> Option<&'static KernelPageAllocator> {
    KMEM.get()
}

/// Aloca uma página de 4 KiB do alocador global
pub fn kalloc() -> MmResult<PhysAddr> {
    allocator().ok_or(MmError::NotInitialized)?.alloc()
}

/// Devolve uma página ao alocador global.
///
/// # Safety
/// Mesmo contrato de `PageAllocator::free`.
pub unsafe fn kfree(pa: PhysAddr) {
    match allocator() {
        Some(kmem) => kmem.free(pa),
        None => panic!("kfree: alocador não inicializado"),
    }
}
