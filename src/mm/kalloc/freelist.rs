//! Free list intrusiva de páginas.
//!
//! Enquanto livre, a própria página guarda o link para a próxima
//! (`Run` ocupa os primeiros bytes dela). Nenhuma memória extra é usada.

use core::ptr::NonNull;

/// Cabeçalho de uma página livre
pub(super) struct Run {
    next: Option<NonNull<Run>>,
}

/// Pilha LIFO de páginas livres de uma CPU
pub(super) struct FreeList {
    head: Option<NonNull<Run>>,
    len: usize,
}

// SAFETY: As páginas só são tocadas com o Spinlock da CPU dona adquirido
unsafe impl Send for FreeList {}

impl FreeList {
    pub const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    /// Empilha uma página.
    ///
    /// # Safety
    /// `page` deve apontar para uma página inteira, alinhada, que não está em
    /// nenhuma free list e que ninguém mais usa.
    pub unsafe fn push(&mut self, page: NonNull<u8>) {
        let run = page.cast::<Run>();
        run.as_ptr().write(Run { next: self.head });
        self.head = Some(run);
        self.len += 1;
    }

    /// Desempilha a página mais recente
    pub fn pop(&mut self) -> Option<NonNull<u8>> {
        let run = self.head?;
        // SAFETY: `run` veio de `push`, logo é uma página livre com cabeçalho válido
        self.head = unsafe { run.as_ref().next };
        self.len -= 1;
        Some(run.cast::<u8>())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}
