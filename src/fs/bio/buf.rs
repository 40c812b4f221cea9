//! Buffers do cache
//!
//! `BufGuard` é a única forma de tocar os dados de um buffer: ele segura o
//! sleep lock do slot e uma referência. Escrever ou liberar sem o lock não
//! compila.

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{BufferCache, BSIZE};
use crate::drivers::block::BlockError;
use crate::sync::{SleepLock, SleepLockGuard};

/// Identidade de um bloco em cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufKey {
    pub dev: u32,
    pub blockno: u32,
}

/// Metadados protegidos pelo lock do bucket onde o slot está
#[derive(Debug, Default)]
pub struct BufMeta {
    /// `None` até o slot ser usado pela primeira vez
    pub key: Option<BufKey>,
    pub refcnt: u32,
    pub prev: Option<usize>,
    pub next: Option<usize>,
}

/// Um slot da arena
pub struct BufSlot {
    pub(super) meta: UnsafeCell<BufMeta>,
    /// Bucket dono. Só muda com os locks do bucket antigo e do novo.
    bucket: AtomicUsize,
    /// Conteúdo corresponde ao disco. Escrito com o sleep lock adquirido.
    valid: AtomicBool,
    pub(super) data: SleepLock<[u8; BSIZE]>,
}

// SAFETY: `meta` só é acessado com o lock do bucket indicado por `bucket`;
// `data` tem o próprio SleepLock.
unsafe impl Sync for BufSlot {}

impl BufSlot {
    pub(super) fn new() -> Self {
        Self {
            meta: UnsafeCell::new(BufMeta::default()),
            bucket: AtomicUsize::new(0),
            valid: AtomicBool::new(false),
            data: SleepLock::new([0u8; BSIZE], "buffer"),
        }
    }

    #[inline]
    pub(super) fn bucket(&self) -> usize {
        self.bucket.load(Ordering::Acquire)
    }

    #[inline]
    pub(super) fn set_bucket(&self, bucket: usize) {
        self.bucket.store(bucket, Ordering::Release);
    }

    #[inline]
    pub(super) fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    #[inline]
    pub(super) fn set_valid(&self, valid: bool) {
        self.valid.store(valid, Ordering::Release);
    }
}

/// Buffer travado: referência + lock exclusivo.
///
/// O drop solta o sleep lock e depois a referência (brelse).
pub struct BufGuard<'a> {
    pub(super) cache: &'a BufferCache,
    pub(super) index: usize,
    pub(super) key: BufKey,
    pub(super) data: Option<SleepLockGuard<'a, [u8; BSIZE]>>,
}

impl<'a> BufGuard<'a> {
    #[inline]
    pub fn dev(&self) -> u32 {
        self.key.dev
    }

    #[inline]
    pub fn blockno(&self) -> u32 {
        self.key.blockno
    }

    /// Índice do slot na arena
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Conteúdo já foi lido do disco
    pub fn is_valid(&self) -> bool {
        self.cache.slots[self.index].is_valid()
    }

    pub fn data(&self) -> &[u8; BSIZE] {
        self
    }

    pub fn data_mut(&mut self) -> &mut [u8; BSIZE] {
        self
    }

    /// Grava o conteúdo no disco (sempre, sem rastreio de sujeira)
    pub fn write(&self) -> Result<(), BlockError> {
        self.cache.write_through(self.key, self)
    }

    /// Solta o lock e a referência (equivale ao drop)
    pub fn release(self) {
        drop(self);
    }

    /// Segura uma referência extra que sobrevive ao guard.
    ///
    /// Enquanto o pin existir o slot não é reciclado.
    pub fn pin(&self) -> BufPin<'a> {
        self.cache.pin_index(self.index);
        BufPin {
            cache: self.cache,
            index: self.index,
            key: self.key,
        }
    }

    pub(super) fn mark_valid(&self) {
        self.cache.slots[self.index].set_valid(true);
    }
}

impl Deref for BufGuard<'_> {
    type Target = [u8; BSIZE];

    fn deref(&self) -> &Self::Target {
        match &self.data {
            Some(data) => &**data,
            // `data` só vira None dentro do drop
            None => unreachable!(),
        }
    }
}

impl DerefMut for BufGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match &mut self.data {
            Some(data) => &mut **data,
            None => unreachable!(),
        }
    }
}

impl Drop for BufGuard<'_> {
    fn drop(&mut self) {
        // Lock exclusivo antes da referência: quando refcnt chega a zero
        // ninguém segura o sleep lock
        drop(self.data.take());
        self.cache.release_index(self.index);
    }
}

/// Referência sem lock (bpin). O drop faz o bunpin.
pub struct BufPin<'a> {
    cache: &'a BufferCache,
    index: usize,
    key: BufKey,
}

impl BufPin<'_> {
    pub fn dev(&self) -> u32 {
        self.key.dev
    }

    pub fn blockno(&self) -> u32 {
        self.key.blockno
    }

    pub fn unpin(self) {
        drop(self);
    }
}

impl Drop for BufPin<'_> {
    fn drop(&mut self) {
        self.cache.unpin_index(self.index);
    }
}
