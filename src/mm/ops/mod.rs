//! # Operações de Memória de Baixo Nível

pub mod memops;
