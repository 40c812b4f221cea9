//! # Sistema de Arquivos
//!
//! Por enquanto só a camada mais baixa: o buffer cache (`bio`), que o log e
//! os inodes usam para ler e gravar blocos.

pub mod bio;

#[cfg(any(test, feature = "self_test"))]
pub mod test;
