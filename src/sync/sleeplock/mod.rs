mod sleeplock;

pub use sleeplock::{set_yield_hook, SleepLock, SleepLockGuard};
