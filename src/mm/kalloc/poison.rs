//! Poison de páginas (debug de use-after-free e leitura não inicializada).

use crate::mm::config::{ALLOC_JUNK, FREE_JUNK, PAGE_SIZE, POISON_BY_DEFAULT};
use crate::mm::ops::memops;

/// Estratégia de preenchimento aplicada em alloc/free
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoisonFill {
    /// Nenhum preenchimento (builds de performance)
    Disabled,
    /// Preenche a página inteira com `alloc` ao alocar e `free` ao liberar
    Enabled { alloc: u8, free: u8 },
}

impl PoisonFill {
    /// Padrões do kernel: 0x05 na alocação, 0x01 na liberação
    pub const fn junk() -> Self {
        Self::Enabled {
            alloc: ALLOC_JUNK,
            free: FREE_JUNK,
        }
    }

    pub const fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled { .. })
    }

    /// # Safety
    /// `page` aponta para uma página inteira que pertence ao chamador.
    #[inline]
    pub(super) unsafe fn on_alloc(&self, page: *mut u8) {
        if let Self::Enabled { alloc, .. } = *self {
            memops::memset(page, alloc, PAGE_SIZE);
        }
    }

    /// # Safety
    /// `page` aponta para uma página inteira que pertence ao chamador.
    #[inline]
    pub(super) unsafe fn on_free(&self, page: *mut u8) {
        if let Self::Enabled { free, .. } = *self {
            memops::memset(page, free, PAGE_SIZE);
        }
    }
}

impl Default for PoisonFill {
    fn default() -> Self {
        if POISON_BY_DEFAULT {
            Self::junk()
        } else {
            Self::Disabled
        }
    }
}
