//! Implementação Rust das operações de memória

/// Preenche N bytes com valor usando escritas voláteis
///
/// Escreve em palavras de 64 bits quando o ponteiro está alinhado; o
/// prefixo/sufixo desalinhado vai byte a byte.
#[inline]
pub unsafe fn memset_rust(ptr: *mut u8, val: u8, len: usize) {
    let word = u64::from_ne_bytes([val; 8]);
    let mut i = 0;

    while i < len && (ptr as usize + i) % 8 != 0 {
        ptr.add(i).write_volatile(val);
        i += 1;
    }

    while i + 8 <= len {
        (ptr.add(i) as *mut u64).write_volatile(word);
        i += 8;
    }

    while i < len {
        ptr.add(i).write_volatile(val);
        i += 1;
    }
}
