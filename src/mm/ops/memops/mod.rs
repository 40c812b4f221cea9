//! # Operações de Memória
//!
//! Preenchimento de páginas usado pelo poison do kalloc. Escritas voláteis
//! para que o compilador não elimine o lixo escrito em páginas liberadas.

mod rust_impl;

// =============================================================================
// INTERFACE PÚBLICA
// =============================================================================

/// Zera N bytes a partir de ptr
///
/// # Safety
/// - `ptr` deve ser válido e apontar para memória acessível
/// - `len` bytes a partir de `ptr` devem ser acessíveis
#[inline(always)]
pub unsafe fn memzero(ptr: *mut u8, len: usize) {
    rust_impl::memset_rust(ptr, 0, len);
}

/// Preenche N bytes com valor
///
/// # Safety
/// - `ptr` deve ser válido e apontar para memória acessível
#[inline(always)]
pub unsafe fn memset(ptr: *mut u8, val: u8, len: usize) {
    rust_impl::memset_rust(ptr, val, len);
}

// =============================================================================
// TESTES
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memset_memzero() {
        let mut buf = [0xAAu8; 64];
        unsafe { memset(buf.as_mut_ptr().add(8), 0x05, 16) };
        assert!(buf[..8].iter().all(|&b| b == 0xAA));
        assert!(buf[8..24].iter().all(|&b| b == 0x05));
        assert!(buf[24..].iter().all(|&b| b == 0xAA));

        unsafe { memzero(buf.as_mut_ptr(), buf.len()) };
        assert!(buf.iter().all(|&b| b == 0));
    }
}
