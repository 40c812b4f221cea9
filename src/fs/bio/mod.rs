//! # BIO - Buffer Cache de Blocos de Disco
//!
//! Pool fixo de `nbuf` buffers de `BSIZE` bytes, cada um guardando uma cópia
//! de um bloco `(dev, blockno)`. Garante que um bloco tenha no máximo uma
//! cópia em memória e que um único contexto por vez a use.
//!
//! ```text
//!   bucket 0          bucket 1                bucket N-1
//!   ┌──────┐          ┌──────┐                ┌──────┐
//!   │ lock │          │ lock │      ...       │ lock │
//!   └──┬───┘          └──┬───┘                └──┬───┘
//!  MRU ▼             MRU ▼                   MRU ▼
//!   [buf]⇄[buf]       [buf]                   [buf]⇄[buf]⇄[buf]
//!            LRU         LRU                               LRU
//! ```
//!
//! O bucket de um bloco é `blockno % nbuckets`. Um miss recicla o buffer
//! sem referências mais próximo do LRU do próprio bucket; se não houver,
//! rouba de outro bucket e move o buffer para o bucket do bloco.
//!
//! ## Protocolo de locks
//!
//! - No máximo dois locks de bucket ao mesmo tempo, sempre em ordem
//!   crescente de índice.
//! - Depois de travar o par (casa, vizinho) o bucket casa é revisado: outro
//!   contexto pode ter carregado a chave ou liberado um buffer no intervalo.
//! - Nenhum spinlock é segurado durante I/O; o sleep lock do buffer sim.

mod bucket;
mod buf;
mod stats;

pub use buf::{BufGuard, BufKey, BufPin};
pub use stats::BcacheStats;

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use spin::Once;

use crate::drivers::block::{BlockDevice, BlockError};
use crate::sync::Spinlock;
use bucket::{BucketList, BucketView};
use buf::BufSlot;
use stats::BcacheCounters;

// =============================================================================
// CONFIGURAÇÃO
// =============================================================================

/// Tamanho de um bloco do sistema de arquivos
pub const BSIZE: usize = 1024;

/// Buffers no pool padrão
pub const NBUF: usize = 30;

/// Buckets padrão (primo, espalha blocos sequenciais)
pub const NBUCKETS: usize = 13;

/// Parâmetros do cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcacheConfig {
    pub nbuf: usize,
    pub nbuckets: usize,
}

impl Default for BcacheConfig {
    fn default() -> Self {
        Self {
            nbuf: NBUF,
            nbuckets: NBUCKETS,
        }
    }
}

impl BcacheConfig {
    pub fn validate(&self) -> Result<(), BcacheError> {
        if self.nbuf == 0 || self.nbuckets == 0 {
            return Err(BcacheError::InvalidConfig);
        }
        Ok(())
    }
}

/// Erros de criação do cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BcacheError {
    /// nbuf ou nbuckets igual a zero
    InvalidConfig,
    /// Bloco do dispositivo não divide `BSIZE`
    UnsupportedBlockSize,
    /// Cache global já existe
    AlreadyInitialized,
}

impl BcacheError {
    pub fn as_str(&self) -> &'static str {
        match self {
            BcacheError::InvalidConfig => "Configuração inválida",
            BcacheError::UnsupportedBlockSize => "Tamanho de bloco não suportado",
            BcacheError::AlreadyInitialized => "Já inicializado",
        }
    }
}

impl fmt::Display for BcacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// BUFFER CACHE
// =============================================================================

pub struct BufferCache {
    slots: Box<[BufSlot]>,
    buckets: Box<[Spinlock<BucketList>]>,
    /// Discos indexados pelo número do dispositivo
    disks: Vec<Arc<dyn BlockDevice>>,
    counters: BcacheCounters,
}

impl BufferCache {
    /// Cria o pool. Todos os buffers começam no bucket 0, sem chave.
    pub fn new(
        config: BcacheConfig,
        disks: Vec<Arc<dyn BlockDevice>>,
    ) -> Result<Self, BcacheError> {
        config.validate()?;
        for disk in &disks {
            let bs = disk.block_size();
            if bs == 0 || bs > BSIZE || BSIZE % bs != 0 {
                crate::kerror!("(BCache) Tamanho de bloco não suportado=", bs);
                return Err(BcacheError::UnsupportedBlockSize);
            }
        }

        let slots: Box<[BufSlot]> = (0..config.nbuf).map(|_| BufSlot::new()).collect();
        let mut buckets: Box<[Spinlock<BucketList>]> = (0..config.nbuckets)
            .map(|_| Spinlock::new(BucketList::new()))
            .collect();

        // Sem concorrência ainda: monta a lista do bucket 0 direto
        let head = buckets[0].get_mut();
        for index in 0..config.nbuf {
            // SAFETY: `slots` ainda não foi compartilhado
            let meta = unsafe { &mut *slots[index].meta.get() };
            meta.prev = index.checked_sub(1);
            meta.next = (index + 1 < config.nbuf).then_some(index + 1);
        }
        head.mru = Some(0);
        head.lru = Some(config.nbuf - 1);
        head.len = config.nbuf;

        crate::kinfo!("(BCache) Buffers=", config.nbuf);
        crate::kinfo!("(BCache) Buckets=", config.nbuckets);

        Ok(Self {
            slots,
            buckets,
            disks,
            counters: BcacheCounters::new(),
        })
    }

    // -------------------------------------------------------------------------
    // Aquisição
    // -------------------------------------------------------------------------

    /// Bucket casa de um bloco
    #[inline]
    pub fn bucket_of(&self, blockno: u32) -> usize {
        blockno as usize % self.buckets.len()
    }

    /// Devolve o buffer do bloco travado, sem ler o disco (bget).
    ///
    /// # Panics
    /// Se todos os buffers estão referenciados.
    pub fn get(&self, dev: u32, blockno: u32) -> BufGuard<'_> {
        let key = BufKey { dev, blockno };
        let home = self.bucket_of(blockno);

        let local = {
            let mut view = self.bucket(home);
            self.claim_in(&mut view, key)
        };
        let index = match local {
            Some(index) => index,
            None => self.claim_from_peers(home, key),
        };

        // Spinlocks já liberados: pode dormir aqui
        let data = self.slots[index].data.lock();
        BufGuard {
            cache: self,
            index,
            key,
            data: Some(data),
        }
    }

    /// Devolve o buffer travado com o conteúdo do disco (bread).
    ///
    /// Só lê o dispositivo se o conteúdo ainda não for válido. Em erro o
    /// buffer é liberado e continua inválido.
    pub fn read(&self, dev: u32, blockno: u32) -> Result<BufGuard<'_>, BlockError> {
        let disk = self.disk(dev)?;
        let mut buf = self.get(dev, blockno);

        if !buf.is_valid() {
            let lba = Self::lba(disk, blockno);
            if let Err(err) = disk.read_blocks(lba, buf.data_mut()) {
                crate::kwarn!("(BCache) Falha de leitura, bloco=", blockno);
                return Err(err);
            }
            self.counters.record_read();
            buf.mark_valid();
        }
        Ok(buf)
    }

    /// Procura hit ou buffer livre num bucket já travado
    fn claim_in(&self, view: &mut BucketView<'_>, key: BufKey) -> Option<usize> {
        if let Some(index) = view.lookup(key) {
            view.meta_mut(index).refcnt += 1;
            self.counters.record_hit();
            return Some(index);
        }

        let index = view.lru_unused()?;
        self.recycle(view, index, key);
        self.counters.record_miss();
        Some(index)
    }

    /// Rouba um buffer livre de outro bucket, na ordem casa+1, casa+2, ...
    fn claim_from_peers(&self, home: usize, key: BufKey) -> usize {
        let n = self.buckets.len();

        for offset in 1..n {
            let peer = (home + offset) % n;
            let (mut home_view, mut peer_view) = self.lock_pair(home, peer);

            // Revalidar: o bucket casa ficou livre entre os locks
            if let Some(index) = self.claim_in(&mut home_view, key) {
                return index;
            }

            if let Some(victim) = peer_view.lru_unused() {
                peer_view.unlink(victim);
                self.slots[victim].set_bucket(home);
                home_view.push_mru(victim);
                self.recycle(&mut home_view, victim, key);

                self.counters.record_miss();
                self.counters.record_steal();
                crate::ktrace!("(BCache) Roubo do bucket=", peer);
                return victim;
            }
        }

        crate::kerror!("(BCache) Sem buffers livres, bloco=", key.blockno);
        panic!("bget: no buffers");
    }

    /// Assume o slot para uma nova chave (refcnt = 1, conteúdo inválido)
    fn recycle(&self, view: &mut BucketView<'_>, index: usize, key: BufKey) {
        let meta = view.meta_mut(index);
        meta.key = Some(key);
        meta.refcnt = 1;
        self.slots[index].set_valid(false);
    }

    fn bucket(&self, index: usize) -> BucketView<'_> {
        BucketView::new(index, self.buckets[index].lock(), &self.slots)
    }

    /// Trava dois buckets distintos em ordem crescente. Devolve (casa, vizinho).
    fn lock_pair(&self, home: usize, peer: usize) -> (BucketView<'_>, BucketView<'_>) {
        debug_assert_ne!(home, peer);
        if home < peer {
            let home_view = self.bucket(home);
            let peer_view = self.bucket(peer);
            (home_view, peer_view)
        } else {
            let peer_view = self.bucket(peer);
            let home_view = self.bucket(home);
            (home_view, peer_view)
        }
    }

    // -------------------------------------------------------------------------
    // Liberação e pin
    // -------------------------------------------------------------------------

    /// brelse: chamado pelo drop do guard, com o sleep lock já solto.
    ///
    /// Um slot referenciado não muda de bucket, então ler `bucket` antes de
    /// travar é seguro.
    fn release_index(&self, index: usize) {
        let mut view = self.bucket(self.slots[index].bucket());
        let meta = view.meta_mut(index);
        if meta.refcnt == 0 {
            crate::kerror!("(BCache) Release com refcnt zero, slot=", index);
            panic!("brelse: refcnt zero");
        }
        meta.refcnt -= 1;
        if meta.refcnt == 0 {
            view.move_to_mru(index);
        }
    }

    fn pin_index(&self, index: usize) {
        let mut view = self.bucket(self.slots[index].bucket());
        view.meta_mut(index).refcnt += 1;
    }

    /// bunpin: só ajusta a contagem, não mexe na recência
    fn unpin_index(&self, index: usize) {
        let mut view = self.bucket(self.slots[index].bucket());
        let meta = view.meta_mut(index);
        if meta.refcnt == 0 {
            crate::kerror!("(BCache) Unpin com refcnt zero, slot=", index);
            panic!("bunpin: refcnt zero");
        }
        meta.refcnt -= 1;
    }

    // -------------------------------------------------------------------------
    // Disco
    // -------------------------------------------------------------------------

    fn disk(&self, dev: u32) -> Result<&dyn BlockDevice, BlockError> {
        self.disks
            .get(dev as usize)
            .map(|disk| disk.as_ref())
            .ok_or(BlockError::NotFound)
    }

    /// Primeiro bloco do dispositivo que compõe `blockno`
    #[inline]
    fn lba(disk: &dyn BlockDevice, blockno: u32) -> u64 {
        blockno as u64 * (BSIZE / disk.block_size()) as u64
    }

    /// bwrite
    fn write_through(&self, key: BufKey, data: &[u8; BSIZE]) -> Result<(), BlockError> {
        let disk = self.disk(key.dev)?;
        disk.write_blocks(Self::lba(disk, key.blockno), data)?;
        self.counters.record_write();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Diagnóstico
    // -------------------------------------------------------------------------

    pub fn nbuf(&self) -> usize {
        self.slots.len()
    }

    pub fn nbuckets(&self) -> usize {
        self.buckets.len()
    }

    pub fn stats(&self) -> BcacheStats {
        self.counters.snapshot()
    }

    /// Buffers ligados ao bucket
    pub fn bucket_len(&self, bucket: usize) -> usize {
        self.bucket(bucket).len()
    }

    /// Contagem de referências do bloco, se estiver em cache
    pub fn refcnt(&self, dev: u32, blockno: u32) -> Option<u32> {
        let view = self.bucket(self.bucket_of(blockno));
        let index = view.lookup(BufKey { dev, blockno })?;
        Some(view.meta(index).refcnt)
    }

    /// Verifica a estrutura inteira: cada buffer em exatamente uma lista,
    /// listas coerentes com `bucket`, chaves no bucket casa e sem repetição.
    pub fn check_invariants(&self) -> bool {
        // Todos os buckets em ordem crescente, como o protocolo exige
        let views: Vec<BucketView<'_>> =
            (0..self.buckets.len()).map(|i| self.bucket(i)).collect();

        let mut seen = alloc::vec![false; self.slots.len()];
        let mut keys: Vec<BufKey> = Vec::new();
        let mut ok = true;

        for view in &views {
            let mut count = 0;
            view.for_each(|slot, meta| {
                count += 1;
                if seen[slot] {
                    crate::kerror!("(BCache) Slot em duas listas=", slot);
                    ok = false;
                }
                seen[slot] = true;
                if let Some(key) = meta.key {
                    if self.bucket_of(key.blockno) != view.index() || keys.contains(&key) {
                        crate::kerror!("(BCache) Chave fora do lugar, bloco=", key.blockno);
                        ok = false;
                    }
                    keys.push(key);
                }
            });
            if count != view.len() {
                crate::kerror!("(BCache) Tamanho inconsistente, bucket=", view.index());
                ok = false;
            }
        }

        ok && seen.iter().all(|&s| s)
    }
}

// =============================================================================
// INSTÂNCIA GLOBAL
// =============================================================================

static BCACHE: Once<BufferCache> = Once::new();

/// Cria o cache global (binit). Só a primeira chamada tem efeito.
pub fn init(
    config: BcacheConfig,
    disks: Vec<Arc<dyn BlockDevice>>,
) -> Result<&'static BufferCache, BcacheError> {
    let mut created = false;
    let cache = BCACHE.try_call_once(|| {
        created = true;
        BufferCache::new(config, disks)
    })?;

    if !created {
        return Err(BcacheError::AlreadyInitialized);
    }
    Ok(cache)
}

/// Cache global, se já inicializado
pub fn cache() -> Option<&'static BufferCache> {
    BCACHE.get()
}

/// bread no cache global. Sem cache, `BlockError::NotFound`.
pub fn bread(dev: u32, blockno: u32) -> Result<BufGuard<'static>, BlockError> {
    cache().ok_or(BlockError::NotFound)?.read(dev, blockno)
}

#[cfg(test)]
mod tests;
