use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Page scroll lock shared by every open modal form of an application.
///
/// The page is locked while at least one [`ScrollLockGuard`] is alive. Guards release
/// on drop, so every close path (including unmount) gives the lock back.
#[derive(Clone, Debug, Default)]
pub struct ScrollLock {
    holders: Arc<AtomicUsize>,
}

impl gpui::Global for ScrollLock {}

impl ScrollLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Application-wide lock, installed on first use.
    pub fn global(cx: &mut gpui::App) -> Self {
        if let Some(lock) = cx.try_global::<ScrollLock>() {
            return lock.clone();
        }
        let lock = Self::new();
        cx.set_global(lock.clone());
        lock
    }

    pub fn acquire(&self) -> ScrollLockGuard {
        let holders = self.holders.fetch_add(1, Ordering::SeqCst) + 1;
        log::trace!("scroll lock acquired ({holders} holder(s))");
        ScrollLockGuard {
            holders: self.holders.clone(),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.holders.load(Ordering::SeqCst) > 0
    }

    pub fn holders(&self) -> usize {
        self.holders.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
#[must_use = "the page unlocks as soon as the guard is dropped"]
pub struct ScrollLockGuard {
    holders: Arc<AtomicUsize>,
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        let previous = self.holders.fetch_sub(1, Ordering::SeqCst);
        log::trace!("scroll lock released ({} holder(s))", previous.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::ScrollLock;

    #[test]
    fn lock_is_held_until_last_guard_drops() {
        let lock = ScrollLock::new();
        let first = lock.acquire();
        let second = lock.clone().acquire();
        assert_eq!(lock.holders(), 2);

        drop(first);
        assert!(lock.is_locked());
        drop(second);
        assert!(!lock.is_locked());
    }
}
