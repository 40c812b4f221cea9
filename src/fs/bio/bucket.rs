//! Buckets do buffer cache
//!
//! Cada bucket é um spinlock sobre a cabeça (MRU) e a cauda (LRU) de uma
//! lista duplamente encadeada. Os elos ficam nos próprios slots da arena
//! (índices, não ponteiros), então mover um buffer entre buckets não aloca.

use super::buf::{BufKey, BufMeta, BufSlot};
use crate::sync::SpinlockGuard;

/// Cabeça de uma lista de recência
#[derive(Debug, Default)]
pub struct BucketList {
    /// Mais recentemente liberado
    pub mru: Option<usize>,
    /// Menos recentemente liberado (primeiro candidato à reciclagem)
    pub lru: Option<usize>,
    pub len: usize,
}

impl BucketList {
    pub const fn new() -> Self {
        Self {
            mru: None,
            lru: None,
            len: 0,
        }
    }
}

/// Um bucket travado.
///
/// Enquanto a view existe o chamador é dono da lista e dos metadados de
/// todo slot cujo `bucket` aponta para ela.
pub struct BucketView<'a> {
    index: usize,
    list: SpinlockGuard<'a, BucketList>,
    slots: &'a [BufSlot],
}

impl<'a> BucketView<'a> {
    pub(super) fn new(
        index: usize,
        list: SpinlockGuard<'a, BucketList>,
        slots: &'a [BufSlot],
    ) -> Self {
        Self { index, list, slots }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len
    }

    pub fn meta(&self, slot: usize) -> &BufMeta {
        debug_assert_eq!(self.slots[slot].bucket(), self.index);
        // SAFETY: o slot pertence a este bucket e o lock está adquirido
        unsafe { &*self.slots[slot].meta.get() }
    }

    pub fn meta_mut(&mut self, slot: usize) -> &mut BufMeta {
        debug_assert_eq!(self.slots[slot].bucket(), self.index);
        // SAFETY: o slot pertence a este bucket, o lock está adquirido e o
        // empréstimo de `self` impede dois &mut vivos
        unsafe { &mut *self.slots[slot].meta.get() }
    }

    /// Procura a chave, do MRU para o LRU
    pub fn lookup(&self, key: BufKey) -> Option<usize> {
        let mut cursor = self.list.mru;
        while let Some(slot) = cursor {
            let meta = self.meta(slot);
            if meta.key == Some(key) {
                return Some(slot);
            }
            cursor = meta.next;
        }
        None
    }

    /// Buffer sem referências mais próximo da cauda
    pub fn lru_unused(&self) -> Option<usize> {
        let mut cursor = self.list.lru;
        while let Some(slot) = cursor {
            let meta = self.meta(slot);
            if meta.refcnt == 0 {
                return Some(slot);
            }
            cursor = meta.prev;
        }
        None
    }

    /// Remove o slot da lista (ele continua marcado como deste bucket)
    pub fn unlink(&mut self, slot: usize) {
        let (prev, next) = {
            let meta = self.meta(slot);
            (meta.prev, meta.next)
        };

        match prev {
            Some(p) => self.meta_mut(p).next = next,
            None => self.list.mru = next,
        }
        match next {
            Some(n) => self.meta_mut(n).prev = prev,
            None => self.list.lru = prev,
        }

        let meta = self.meta_mut(slot);
        meta.prev = None;
        meta.next = None;
        self.list.len -= 1;
    }

    /// Insere o slot na cabeça. O `bucket` do slot já deve apontar para cá.
    pub fn push_mru(&mut self, slot: usize) {
        let old = self.list.mru;
        {
            let meta = self.meta_mut(slot);
            meta.prev = None;
            meta.next = old;
        }

        match old {
            Some(o) => self.meta_mut(o).prev = Some(slot),
            None => self.list.lru = Some(slot),
        }
        self.list.mru = Some(slot);
        self.list.len += 1;
    }

    pub fn move_to_mru(&mut self, slot: usize) {
        if self.list.mru != Some(slot) {
            self.unlink(slot);
            self.push_mru(slot);
        }
    }

    /// Slots do MRU ao LRU (diagnóstico)
    pub fn for_each(&self, mut f: impl FnMut(usize, &BufMeta)) {
        let mut cursor = self.list.mru;
        while let Some(slot) = cursor {
            let meta = self.meta(slot);
            f(slot, meta);
            cursor = meta.next;
        }
    }
}
