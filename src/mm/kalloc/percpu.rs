//! # Alocador de Páginas por CPU
//!
//! Cada CPU tem sua própria free list de páginas de 4 KiB, protegida por um
//! Spinlock próprio. Em SMP isso tira o lock global do caminho quente.
//!
//! ## 🏗️ Fluxo
//!
//! 1. alloc() → pop na lista da CPU atual (região sem migração)
//! 2. Se vazia → solta o lock local e rouba UMA página de outra CPU
//! 3. Todas vazias → `MmError::OutOfMemory` (recuperável, sem bloquear)
//! 4. free() → valida, aplica poison e empilha na lista da CPU atual
//!
//! ## Ordem de Lock
//!
//! Nunca dois locks de free list ao mesmo tempo: o lock local é liberado
//! antes de tocar a lista de outra CPU. Por isso o roubo não tem ciclo.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::ops::Range;
use core::ptr::NonNull;

use bitflags::bitflags;

use super::freelist::FreeList;
use super::poison::PoisonFill;
use crate::arch::CpuLocal;
use crate::mm::addr::PhysAddr;
use crate::mm::config::{
    align_down, align_up, is_aligned, CACHE_LINE_SIZE, MAX_CPUS, NCPU, PAGE_SIZE,
};
use crate::mm::error::{MmError, MmResult};
use crate::mm::ops::memops;
use crate::mm::stats::{KallocCounters, KallocStats};
use crate::sync::Spinlock;

// =============================================================================
// CONFIGURAÇÃO
// =============================================================================

bitflags! {
    /// Flags de alocação
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AllocFlags: u32 {
        /// Entregar a página zerada (ignora o poison de alocação)
        const ZERO = 1 << 0;
    }
}

/// Parâmetros do alocador
#[derive(Debug, Clone, Copy)]
pub struct KallocConfig {
    /// Número de CPUs (uma free list por CPU)
    pub ncpu: usize,
    /// CPU que recebe todas as páginas da região no init
    pub seed_cpu: usize,
    /// Preenchimento em alloc/free
    pub poison: PoisonFill,
}

impl Default for KallocConfig {
    fn default() -> Self {
        Self {
            ncpu: NCPU,
            seed_cpu: 0,
            poison: PoisonFill::default(),
        }
    }
}

impl KallocConfig {
    fn validate(&self) -> MmResult<()> {
        if self.ncpu == 0 || self.ncpu > MAX_CPUS || self.seed_cpu >= self.ncpu {
            return Err(MmError::InvalidParameter);
        }
        Ok(())
    }
}

// =============================================================================
// FREE LIST POR CPU
// =============================================================================

/// Free list de uma CPU
///
/// Alinhado a cache line para evitar false sharing entre CPUs.
#[repr(C, align(64))]
struct Kmem {
    list: Spinlock<FreeList>,
}

// `repr(align)` não aceita constante: amarra o literal acima à config
const _: () = assert!(core::mem::align_of::<Kmem>() == CACHE_LINE_SIZE);

impl Kmem {
    const fn new() -> Self {
        Self {
            list: Spinlock::new(FreeList::new()),
        }
    }
}

// =============================================================================
// ALOCADOR
// =============================================================================

/// Alocador de páginas físicas com uma free list por CPU
pub struct PageAllocator<C: CpuLocal> {
    cpu: C,
    kmems: Box<[Kmem]>,
    seed_cpu: usize,
    poison: PoisonFill,
    /// Região gerenciada (vazia até `init_range`)
    range: Range<usize>,
    counters: KallocCounters,
}

impl<C: CpuLocal> PageAllocator<C> {
    /// Cria o alocador com todas as free lists vazias
    pub fn new(cpu: C, config: KallocConfig) -> MmResult<Self> {
        config.validate()?;

        let mut kmems = Vec::with_capacity(config.ncpu);
        kmems.resize_with(config.ncpu, Kmem::new);

        Ok(Self {
            cpu,
            kmems: kmems.into_boxed_slice(),
            seed_cpu: config.seed_cpu,
            poison: config.poison,
            range: 0..0,
            counters: KallocCounters::new(),
        })
    }

    /// Entrega a região `[start, end)` ao alocador.
    ///
    /// O início é arredondado para cima até a próxima página; páginas
    /// parciais no fim são ignoradas. Todas as páginas vão para a free list
    /// de `seed_cpu`; as outras CPUs só recebem páginas via roubo ou free.
    ///
    /// Retorna quantas páginas foram semeadas.
    ///
    /// # Safety
    /// A região deve ser RAM acessível pelo kernel, sem outro dono, e deve
    /// continuar válida enquanto o alocador existir.
    pub unsafe fn init_range(&mut self, start: PhysAddr, end: PhysAddr) -> MmResult<usize> {
        if !self.range.is_empty() {
            crate::kerror!("(KAlloc) Região já registrada");
            return Err(MmError::InitFailed);
        }

        let first = align_up(start.as_usize(), PAGE_SIZE);
        let last = align_down(end.as_usize(), PAGE_SIZE);
        if start.is_null() || first >= last {
            return Err(MmError::InvalidParameter);
        }

        self.range = first..last;

        let seed = &self.kmems[self.seed_cpu];
        let mut list = seed.list.lock();
        let mut pages = 0usize;
        let mut pa = first;
        while pa + PAGE_SIZE <= last {
            let page = pa as *mut u8;
            self.poison.on_free(page);
            // SAFETY: pa != 0 e está dentro da região entregue pelo chamador
            list.push(NonNull::new_unchecked(page));
            pages += 1;
            pa += PAGE_SIZE;
        }
        drop(list);

        crate::kinfo!("(KAlloc) Região início=", first);
        crate::kinfo!("(KAlloc) Páginas semeadas=", pages);
        Ok(pages)
    }

    // =========================================================================
    // ALLOC
    // =========================================================================

    /// Aloca uma página de 4 KiB
    #[inline]
    pub fn alloc(&self) -> MmResult<PhysAddr> {
        self.alloc_with(AllocFlags::empty())
    }

    /// Aloca uma página zerada
    #[inline]
    pub fn alloc_zeroed(&self) -> MmResult<PhysAddr> {
        self.alloc_with(AllocFlags::ZERO)
    }

    /// Aloca uma página de 4 KiB com flags.
    ///
    /// Primeiro a lista da CPU atual; se vazia, rouba uma página da primeira
    /// outra CPU com lista não vazia. OOM não bloqueia nem tenta de novo.
    pub fn alloc_with(&self, flags: AllocFlags) -> MmResult<PhysAddr> {
        let page = {
            let cpu = self.cpu.no_migrate();
            let me = self.shard_of(cpu.id());

            // Lock local solto ao fim da expressão, antes do roubo
            let local = self.kmems[me].list.lock().pop();
            match local {
                Some(page) => Some(page),
                None => self.steal(me),
            }
        };

        let Some(page) = page else {
            self.counters.record_exhausted();
            crate::kwarn!("(KAlloc) OOM: todas as free lists vazias");
            return Err(MmError::OutOfMemory);
        };

        let ptr = page.as_ptr();
        // SAFETY: a página saiu de uma free list, então agora é só nossa
        unsafe {
            if flags.contains(AllocFlags::ZERO) {
                memops::memzero(ptr, PAGE_SIZE);
            } else {
                self.poison.on_alloc(ptr);
            }
        }

        self.counters.record_alloc();
        Ok(PhysAddr::from_ptr(ptr))
    }

    /// Rouba uma página de outra CPU (nenhum lock de free list seguro na entrada)
    fn steal(&self, me: usize) -> Option<NonNull<u8>> {
        for (id, kmem) in self.kmems.iter().enumerate() {
            if id == me {
                continue;
            }

            let stolen = kmem.list.lock().pop();
            if let Some(page) = stolen {
                self.counters.record_steal();
                crate::ktrace!("(KAlloc) Roubo da CPU=", id);
                return Some(page);
            }
        }
        None
    }

    // =========================================================================
    // FREE
    // =========================================================================

    /// Devolve uma página à free list da CPU atual.
    ///
    /// Endereço desalinhado ou fora da região é erro fatal de uso.
    ///
    /// # Safety
    /// `pa` deve ter vindo de `alloc` deste alocador, e nenhuma referência
    /// à página pode ser usada depois desta chamada.
    pub unsafe fn free(&self, pa: PhysAddr) {
        if let Err(err) = self.try_free(pa) {
            crate::kerror!("(KAlloc) kfree inválido em=", pa.as_u64());
            panic!("kfree: {}", err);
        }
    }

    /// Variante verificada de `free`: uso indevido vira `Err` em vez de panic.
    ///
    /// # Safety
    /// Mesmo contrato de `free`.
    pub unsafe fn try_free(&self, pa: PhysAddr) -> MmResult<()> {
        self.validate(pa)?;

        let page = pa.as_mut_ptr();
        self.poison.on_free(page);

        {
            let cpu = self.cpu.no_migrate();
            let me = self.shard_of(cpu.id());
            // SAFETY: validado acima (alinhado, não nulo, dentro da região)
            self.kmems[me].list.lock().push(NonNull::new_unchecked(page));
        }

        self.counters.record_free();
        Ok(())
    }

    fn validate(&self, pa: PhysAddr) -> MmResult<()> {
        let addr = pa.as_usize();
        if !is_aligned(addr, PAGE_SIZE) {
            return Err(MmError::NotAligned);
        }
        // Sem `addr + PAGE_SIZE`: a última página do espaço daria overflow
        if addr < self.range.start
            || addr >= self.range.end
            || self.range.end - addr < PAGE_SIZE
        {
            return Err(MmError::InvalidAddress);
        }
        Ok(())
    }

    #[inline]
    fn shard_of(&self, cpu: usize) -> usize {
        if cpu >= self.kmems.len() {
            panic!("kalloc: CPU {} fora das {} free lists", cpu, self.kmems.len());
        }
        cpu
    }

    // =========================================================================
    // INTROSPECÇÃO
    // =========================================================================

    /// Número de CPUs (free lists)
    pub fn ncpu(&self) -> usize {
        self.kmems.len()
    }

    /// Região gerenciada
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Páginas livres na lista de uma CPU
    pub fn free_pages_on(&self, cpu: usize) -> usize {
        self.kmems.get(cpu).map_or(0, |k| k.list.lock().len())
    }

    /// Páginas livres somando todas as CPUs (não atômico entre listas)
    pub fn free_pages(&self) -> usize {
        self.kmems.iter().map(|k| k.list.lock().len()).sum()
    }

    /// A lista de `cpu` está vazia?
    pub fn is_empty_on(&self, cpu: usize) -> bool {
        self.kmems.get(cpu).map_or(true, |k| k.list.lock().is_empty())
    }

    pub fn stats(&self) -> KallocStats {
        self.counters.snapshot()
    }

    pub fn poison(&self) -> PoisonFill {
        self.poison
    }
}

// =============================================================================
// TESTES
// =============================================================================
