//! Tipos de Erro do Subsistema de Memória
//!
//! Separa o que é recuperável (OOM, devolvido ao chamador) do que é uso
//! indevido (endereço inválido, configuração inválida).

/// Erros do subsistema de memória
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmError {
    /// Sem memória física disponível (OOM) mesmo após roubar das outras CPUs
    OutOfMemory,
    /// Endereço não alinhado a página
    NotAligned,
    /// Endereço fora da região gerenciada
    InvalidAddress,
    /// Parâmetro inválido (configuração, região vazia)
    InvalidParameter,
    /// Falha na inicialização (ex: região já registrada)
    InitFailed,
    /// Subsistema usado antes de `init`
    NotInitialized,
}

impl MmError {
    /// Retorna descrição legível do erro
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfMemory => "OOM: sem páginas livres em nenhuma CPU",
            Self::NotAligned => "Endereço não alinhado a página",
            Self::InvalidAddress => "Endereço fora da região gerenciada",
            Self::InvalidParameter => "Parâmetro inválido",
            Self::InitFailed => "Falha na inicialização",
            Self::NotInitialized => "Alocador não inicializado",
        }
    }
}

impl core::fmt::Display for MmError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tipo Result específico para operações de memória
pub type MmResult<T> = Result<T, MmError>;
