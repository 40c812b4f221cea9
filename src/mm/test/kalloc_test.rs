//! Self-test do KAlloc (alocador de páginas por CPU)

use super::{FakeCpu, TestArena};
use crate::klib::test_framework::{run_test_suite, SuiteReport, TestCase, TestResult};
use crate::ktest_assert;
use crate::mm::config::PAGE_SIZE;
use crate::mm::error::MmError;
use crate::mm::kalloc::{KallocConfig, PageAllocator, PoisonFill};

/// Testes do KAlloc
pub const KALLOC_TESTS: &[TestCase] = &[
    TestCase::new("kalloc_alignment", test_alignment),
    TestCase::new("kalloc_exhaustion", test_exhaustion),
    TestCase::new("kalloc_steal", test_steal),
];

/// Executa a suite do KAlloc
pub fn run_kalloc_tests() -> SuiteReport {
    run_test_suite("KAlloc", KALLOC_TESTS)
}

fn config(ncpu: usize) -> KallocConfig {
    KallocConfig {
        ncpu,
        seed_cpu: 0,
        poison: PoisonFill::junk(),
    }
}

/// Teste: toda página entregue é alinhada e fica dentro da região
fn test_alignment() -> TestResult {
    let arena = TestArena::new(8);
    let cpu = FakeCpu::new(0);
    let Ok(mut kalloc) = PageAllocator::new(&cpu, config(2)) else {
        return TestResult::Failed;
    };
    // SAFETY: a arena é exclusiva deste teste e vive mais que o alocador
    if unsafe { kalloc.init_range(arena.start(), arena.end()) } != Ok(8) {
        return TestResult::Failed;
    }

    for _ in 0..8 {
        let Ok(pa) = kalloc.alloc() else {
            crate::kerror!("(KAllocTest) OOM antes do esperado");
            return TestResult::Failed;
        };
        ktest_assert!(pa.is_page_aligned(), "(KAllocTest) Página desalinhada");
        ktest_assert!(
            pa >= arena.start() && pa.as_u64() + PAGE_SIZE as u64 <= arena.end().as_u64(),
            "(KAllocTest) Página fora da região"
        );
    }

    TestResult::Passed
}

/// Teste: OOM é devolvido (não bloqueia) e a região volta inteira após os frees
fn test_exhaustion() -> TestResult {
    let arena = TestArena::new(4);
    let cpu = FakeCpu::new(0);
    let Ok(mut kalloc) = PageAllocator::new(&cpu, config(1)) else {
        return TestResult::Failed;
    };
    // SAFETY: idem
    if unsafe { kalloc.init_range(arena.start(), arena.end()) }.is_err() {
        return TestResult::Failed;
    }

    let mut pages = [None; 4];
    for slot in pages.iter_mut() {
        *slot = kalloc.alloc().ok();
    }
    ktest_assert!(pages.iter().all(|p| p.is_some()), "(KAllocTest) OOM precoce");
    ktest_assert!(
        kalloc.alloc() == Err(MmError::OutOfMemory),
        "(KAllocTest) Esperava OOM"
    );

    for pa in pages.iter().flatten() {
        // SAFETY: páginas vieram deste alocador e não são mais usadas
        unsafe { kalloc.free(*pa) };
    }
    ktest_assert!(kalloc.free_pages() == 4, "(KAllocTest) Páginas perdidas");

    TestResult::Passed
}

/// Teste: CPU sem páginas locais rouba de outra, e o free volta para ela
fn test_steal() -> TestResult {
    let arena = TestArena::new(2);
    let cpu = FakeCpu::new(0);
    let Ok(mut kalloc) = PageAllocator::new(&cpu, config(4)) else {
        return TestResult::Failed;
    };
    // SAFETY: idem
    if unsafe { kalloc.init_range(arena.start(), arena.end()) }.is_err() {
        return TestResult::Failed;
    }

    cpu.set(3);
    let Ok(pa) = kalloc.alloc() else {
        return TestResult::Failed;
    };
    ktest_assert!(kalloc.stats().steals == 1, "(KAllocTest) Roubo não contado");
    ktest_assert!(kalloc.free_pages_on(0) == 1, "(KAllocTest) Seed intacto");

    // SAFETY: idem
    unsafe { kalloc.free(pa) };
    ktest_assert!(kalloc.free_pages_on(3) == 1, "(KAllocTest) Free em CPU errada");

    TestResult::Passed
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_kalloc_self_tests_pass() {
        let report = super::run_kalloc_tests();
        assert!(report.ok(), "{:?}", report);
        assert_eq!(report.passed, super::KALLOC_TESTS.len());
    }
}
