//! # Ramdisk
//!
//! Disco em memória. Usado como disco de boot e pelos testes do buffer
//! cache, que contam leituras/escritas para provar hits de cache.

use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::traits::{BlockDevice, BlockError};
use crate::sync::Spinlock;

pub struct RamDisk {
    block_size: usize,
    total_blocks: u64,
    data: Spinlock<Vec<u8>>,
    read_only: bool,
    /// Injeção de falha: próximas operações devolvem IoError
    failing: AtomicBool,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl RamDisk {
    /// Cria um disco zerado
    pub fn new(block_size: usize, total_blocks: u64) -> Self {
        Self {
            block_size,
            total_blocks,
            data: Spinlock::new(vec![0u8; block_size * total_blocks as usize]),
            read_only: false,
            failing: AtomicBool::new(false),
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    /// Marca o disco como somente leitura
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Liga/desliga a falha de I/O simulada
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    /// Número de `read_block` bem sucedidos
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Número de `write_block` bem sucedidos
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Cópia do conteúdo de um bloco, sem passar pelos contadores
    pub fn peek(&self, lba: u64) -> Option<Vec<u8>> {
        let range = self.byte_range(lba).ok()?;
        Some(self.data.lock()[range].to_vec())
    }

    fn byte_range(&self, lba: u64) -> Result<core::ops::Range<usize>, BlockError> {
        if lba >= self.total_blocks {
            return Err(BlockError::InvalidBlock);
        }
        let start = lba as usize * self.block_size;
        Ok(start..start + self.block_size)
    }

    fn check(&self, lba: u64, len: usize) -> Result<core::ops::Range<usize>, BlockError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(BlockError::IoError);
        }
        if len != self.block_size {
            return Err(BlockError::InvalidBuffer);
        }
        self.byte_range(lba)
    }
}

impl BlockDevice for RamDisk {
    fn read_block(&self, lba: u64, buf: &mut [u8]) -> Result<(), BlockError> {
        let range = self.check(lba, buf.len())?;
        buf.copy_from_slice(&self.data.lock()[range]);
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn write_block(&self, lba: u64, buf: &[u8]) -> Result<(), BlockError> {
        if self.read_only {
            return Err(BlockError::ReadOnly);
        }
        let range = self.check(lba, buf.len())?;
        self.data.lock()[range].copy_from_slice(buf);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn total_blocks(&self) -> u64 {
        self.total_blocks
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }
}
