//! # Camada de Abstração de Dispositivos de Bloco
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              FILESYSTEM                             │
//! └─────────────────────────────────────────────────────┘
//!                          ↓
//! ┌─────────────────────────────────────────────────────┐
//! │              BUFFER CACHE (fs::bio)                 │
//! └─────────────────────────────────────────────────────┘
//!                          ↓
//! ┌─────────────────────────────────────────────────────┐
//! │              BlockDevice Trait                      │
//! │   read_block() write_block() block_size()           │
//! └─────────────────────────────────────────────────────┘
//!                          ↓
//! ┌─────────────────────────────────────────────────────┐
//! │              DRIVERS (Ramdisk, VirtIO, AHCI)        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Todas as operações são síncronas: retornam só quando a transferência
//! terminou.

use core::fmt;

/// Tipos de erro para dispositivos de bloco
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockError {
    /// Dispositivo não encontrado ou não registrado no cache
    NotFound,
    /// Endereço de bloco inválido (fora do intervalo)
    InvalidBlock,
    /// Erro de I/O durante leitura/escrita
    IoError,
    /// Dispositivo somente leitura
    ReadOnly,
    /// Tamanho do buffer incorreto
    InvalidBuffer,
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockError::NotFound => write!(f, "Dispositivo não encontrado"),
            BlockError::InvalidBlock => write!(f, "Endereço de bloco inválido"),
            BlockError::IoError => write!(f, "Erro de I/O"),
            BlockError::ReadOnly => write!(f, "Dispositivo somente leitura"),
            BlockError::InvalidBuffer => write!(f, "Tamanho do buffer inválido"),
        }
    }
}

/// Trait para dispositivos de bloco
///
/// Todos os drivers de dispositivos de bloco devem implementar esta trait.
pub trait BlockDevice: Send + Sync {
    /// Lê um único bloco do dispositivo
    ///
    /// # Argumentos
    /// * `lba` - Endereço Lógico de Bloco (Logical Block Address)
    /// * `buf` - Buffer para armazenar os dados (exatamente block_size bytes)
    fn read_block(&self, lba: u64, buf: &mut [u8]) -> Result<(), BlockError>;

    /// Escreve um único bloco no dispositivo
    fn write_block(&self, lba: u64, buf: &[u8]) -> Result<(), BlockError>;

    /// Retorna o tamanho do bloco em bytes (normalmente 512)
    fn block_size(&self) -> usize;

    /// Retorna o número total de blocos no dispositivo
    fn total_blocks(&self) -> u64;

    /// Verifica se o dispositivo é somente leitura
    fn is_read_only(&self) -> bool {
        false
    }

    /// Lê múltiplos blocos contíguos
    fn read_blocks(&self, start_lba: u64, buf: &mut [u8]) -> Result<(), BlockError> {
        let block_size = self.block_size();
        if block_size == 0 || buf.len() % block_size != 0 {
            return Err(BlockError::InvalidBuffer);
        }

        for (i, chunk) in buf.chunks_exact_mut(block_size).enumerate() {
            self.read_block(start_lba + i as u64, chunk)?;
        }
        Ok(())
    }

    /// Escreve múltiplos blocos contíguos
    fn write_blocks(&self, start_lba: u64, buf: &[u8]) -> Result<(), BlockError> {
        let block_size = self.block_size();
        if block_size == 0 || buf.len() % block_size != 0 {
            return Err(BlockError::InvalidBuffer);
        }

        for (i, chunk) in buf.chunks_exact(block_size).enumerate() {
            self.write_block(start_lba + i as u64, chunk)?;
        }
        Ok(())
    }
}
