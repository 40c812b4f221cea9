//! # Dispositivos de Bloco
//!
//! Camada de abstração entre o buffer cache e os drivers de disco.
//!
//! | Driver      | Status      | Descrição                        |
//! |-------------|-------------|----------------------------------|
//! | Ramdisk     | Funcional   | Disco em memória (boot, testes)  |

pub mod ramdisk;
pub mod traits;

pub use ramdisk::RamDisk;
pub use traits::{BlockDevice, BlockError};
