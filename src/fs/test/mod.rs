//! # Testes do Sistema de Arquivos
//!
//! - `bio_test.rs` - Suite de self-test do buffer cache


pub use bio_test::{run_bio_tests, BIO_TESTS};
