//! SleepLock - lock de posse longa

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};
use spin::Once;

/// Hook que cede a CPU enquanto se espera um SleepLock.
static YIELD_HOOK: Once<fn()> = Once::new();

/// Registra a função do scheduler usada para ceder a CPU.
///
/// Sem hook registrado quem espera faz apenas `spin_loop`.
pub fn set_yield_hook(hook: fn()) {
    YIELD_HOOK.call_once(|| hook);
}

#[inline]
fn relax() {
    match YIELD_HOOK.get() {
        Some(hook) => hook(),
        None => core::hint::spin_loop(),
    }
}

/// SleepLock - quem espera cede a CPU em vez de girar
///
/// # Diferença do Spinlock
///
/// - Pode ser segurado através de I/O de disco
/// - NÃO pode ser adquirido segurando um Spinlock
pub struct SleepLock<T> {
    /// Estado do lock
    locked: AtomicBool,
    /// Nome (debug)
    name: &'static str,
    /// Dados protegidos
    data: UnsafeCell<T>,
}

// SAFETY: SleepLock protege acesso com lock
unsafe impl<T: Send> Send for SleepLock<T> {}
unsafe impl<T: Send> Sync for SleepLock<T> {}

impl<T> SleepLock<T> {
    pub const fn new(data: T, name: &'static str) -> Self {
        Self {
            locked: AtomicBool::new(false),
            name,
            data: UnsafeCell::new(data),
        }
    }

    /// Adquire o lock (pode bloquear)
    pub fn lock(&self) -> SleepLockGuard<'_, T> {
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            relax();
        }

        SleepLockGuard { lock: self }
    }

    /// Tenta adquirir sem bloquear
    pub fn try_lock(&self) -> Option<SleepLockGuard<'_, T>> {
        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            Some(SleepLockGuard { lock: self })
        } else {
            None
        }
    }

    /// Alguém segura o lock neste instante?
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

pub struct SleepLockGuard<'a, T> {
    lock: &'a SleepLock<T>,
}

impl<T> Deref for SleepLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: Lock está adquirido
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for SleepLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: Lock está adquirido
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for SleepLockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}
