//! # Configuração do Módulo de Memória
//!
//! Constantes de tamanho, limites SMP e padrões de poison do alocador.

// =============================================================================
// CONSTANTES DE TAMANHO
// =============================================================================

/// Tamanho de uma página (4 KiB)
pub const PAGE_SIZE: usize = 4096;

// =============================================================================
// CONFIGURAÇÃO SMP
// =============================================================================

/// Número máximo de CPUs suportadas
pub const MAX_CPUS: usize = 64;

/// Número padrão de CPUs (free lists) do kalloc
pub const NCPU: usize = 8;

/// Tamanho de linha de cache (para evitar false sharing)
pub const CACHE_LINE_SIZE: usize = 64;

// =============================================================================
// POISON (DEBUG DE MEMÓRIA)
// =============================================================================

/// Byte escrito em páginas liberadas (pega referências penduradas)
pub const FREE_JUNK: u8 = 0x01;

/// Byte escrito em páginas recém-alocadas (pega leitura não inicializada)
pub const ALLOC_JUNK: u8 = 0x05;

/// Poison ligado por padrão?
pub const POISON_BY_DEFAULT: bool = cfg!(any(debug_assertions, feature = "mm_poison"));

// =============================================================================
// FUNÇÕES UTILITÁRIAS
// =============================================================================

/// Alinha valor para cima ao múltiplo de align
#[inline(always)]
pub const fn align_up(val: usize, align: usize) -> usize {
    (val + align - 1) & !(align - 1)
}

/// Alinha valor para baixo ao múltiplo de align
#[inline(always)]
pub const fn align_down(val: usize, align: usize) -> usize {
    val & !(align - 1)
}

/// Verifica se valor está alinhado
#[inline(always)]
pub const fn is_aligned(val: usize, align: usize) -> bool {
    val & (align - 1) == 0
}
