//! Core Module
//!
//! Serviços centrais independentes de arquitetura usados pelos subsistemas
//! de recursos (bio, kalloc). Hoje: apenas o sistema de logging.

pub mod logging;
