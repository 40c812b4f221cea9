//! # Abstração de CPU (HAL)
//!
//! Ponte entre os gerenciadores de recursos e a CPU em que estão rodando.
//!
//! ## 🎯 Propósito
//! O alocador de páginas precisa saber **em qual CPU** está para escolher a
//! free list local. Essa identidade só é estável dentro de uma região em que
//! a task não pode migrar (interrupções/preempção desabilitadas).
//!
//! ## 🏗️ Arquitetura
//! - `CpuLocal`: trait implementada pela plataforma (APIC ID, `tp`, GS base...).
//! - `NoMigrate`: guard RAII: `push_off` na criação, `pop_off` no drop.
//! - `UniCpu`: implementação trivial para sistemas com uma única CPU.

pub mod cpu;

pub use cpu::{CpuLocal, NoMigrate, UniCpu};
