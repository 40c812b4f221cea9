//! Identidade da CPU atual e regiões sem migração.

/// Operações por-CPU que a plataforma deve fornecer.
///
/// `push_off`/`pop_off` se aninham: a migração só volta a ser permitida
/// quando o último `pop_off` correspondente acontece.
pub trait CpuLocal: Send + Sync {
    /// ID da CPU atual (0..ncpu). Só é estável entre `push_off` e `pop_off`.
    fn cpu_id(&self) -> usize;

    /// Desabilita migração (interrupções/preempção) para a task atual.
    fn push_off(&self);

    /// Reabilita migração (par de `push_off`).
    fn pop_off(&self);

    /// Abre uma região sem migração e captura o ID da CPU.
    #[inline]
    fn no_migrate(&self) -> NoMigrate<'_, Self>
    where
        Self: Sized,
    {
        NoMigrate::new(self)
    }
}

impl<C: CpuLocal + ?Sized> CpuLocal for &C {
    #[inline]
    fn cpu_id(&self) -> usize {
        (**self).cpu_id()
    }

    #[inline]
    fn push_off(&self) {
        (**self).push_off()
    }

    #[inline]
    fn pop_off(&self) {
        (**self).pop_off()
    }
}

/// Guard de região sem migração.
///
/// Enquanto vivo, `id()` é a CPU em que a task está de fato rodando.
pub struct NoMigrate<'a, C: CpuLocal + ?Sized> {
    cpu: &'a C,
    id: usize,
}

impl<'a, C: CpuLocal + ?Sized> NoMigrate<'a, C> {
    pub fn new(cpu: &'a C) -> Self {
        cpu.push_off();
        let id = cpu.cpu_id();
        Self { cpu, id }
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }
}

impl<C: CpuLocal + ?Sized> Drop for NoMigrate<'_, C> {
    fn drop(&mut self) {
        self.cpu.pop_off();
    }
}

/// Plataforma de uma CPU só: ID sempre 0, migração impossível.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniCpu;

impl CpuLocal for UniCpu {
    #[inline]
    fn cpu_id(&self) -> usize {
        0
    }

    #[inline]
    fn push_off(&self) {}

    #[inline]
    fn pop_off(&self) {}
}
