//! # Drivers
//!
//! Apenas a camada de dispositivos de bloco é usada pelos gerenciadores de
//! recursos: o buffer cache fala com discos através de `BlockDevice`.

pub mod block;
