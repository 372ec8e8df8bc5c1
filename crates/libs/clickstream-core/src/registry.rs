use crate::sync::{Mutex, RwLock};
use std::fmt;
use std::sync::{Arc, PoisonError};

/// Holder of at most one live session.
///
/// Creation and teardown are serialized by an initialization lock; the slot
/// has its own short read/write lock so [`SessionRegistry::get`] never waits
/// for a factory that is still running. A session only becomes visible once
/// its factory has returned successfully.
///
/// Factories run while the initialization lock is held and must not call
/// [`SessionRegistry::create_if_absent`] or [`SessionRegistry::destroy`] on
/// the same registry.
pub struct SessionRegistry<S> {
    init: Mutex<()>,
    slot: RwLock<Option<Arc<S>>>,
}

impl<S> SessionRegistry<S> {
    pub fn new() -> Self {
        Self { init: Mutex::new(()), slot: RwLock::new(None) }
    }

    /// Returns the live session, building it with `factory` if there is none.
    ///
    /// `factory` runs at most once across concurrent callers. On error nothing
    /// is stored and the error is returned unchanged.
    pub fn create_if_absent<F, E>(&self, factory: F) -> Result<Arc<S>, E>
    where
        F: FnOnce() -> Result<S, E>,
    {
        if let Some(existing) = self.get() {
            return Ok(existing);
        }

        let _init = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = self.get() {
            return Ok(existing);
        }

        let session = Arc::new(factory()?);
        *self.slot.write().expect("session slot lock poisoned") = Some(Arc::clone(&session));
        Ok(session)
    }

    pub fn get(&self) -> Option<Arc<S>> {
        self.slot.read().expect("session slot lock poisoned").clone()
    }

    pub fn is_active(&self) -> bool {
        self.slot.read().expect("session slot lock poisoned").is_some()
    }

    /// Clears the slot. No-op when empty.
    pub fn destroy(&self) -> Option<Arc<S>> {
        self.destroy_with(|_| {})
    }

    /// Runs `quiesce` on the live session, then clears the slot.
    ///
    /// Both steps happen under the initialization lock, so no concurrent
    /// `create_if_absent` can interleave between them. `quiesce` must not
    /// call host code that could re-enter this registry; hand anything that
    /// needs to reach the host back through the returned session instead.
    pub fn destroy_with<F>(&self, quiesce: F) -> Option<Arc<S>>
    where
        F: FnOnce(&S),
    {
        let _init = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.get()?;
        quiesce(&current);
        self.slot.write().expect("session slot lock poisoned").take()
    }
}

impl<S> Default for SessionRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for SessionRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry").field("active", &self.is_active()).finish()
    }
}

#[cfg(all(test, not(feature = "loom-tests")))]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct FakeSession {
        label: &'static str,
    }

    #[test]
    fn create_if_absent_builds_once_and_reuses() {
        let registry = SessionRegistry::new();
        let calls = AtomicUsize::new(0);

        let first = registry
            .create_if_absent(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(FakeSession { label: "first" })
            })
            .expect("first create");
        let second = registry
            .create_if_absent(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(FakeSession { label: "second" })
            })
            .expect("second create");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.label, "first");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_factory_leaves_registry_empty() {
        let registry: SessionRegistry<FakeSession> = SessionRegistry::new();
        let err = registry
            .create_if_absent(|| Err::<FakeSession, _>("dial failure".to_owned()))
            .expect_err("factory failure must propagate");
        assert_eq!(err, "dial failure");
        assert!(registry.get().is_none());
        assert!(!registry.is_active());

        let session = registry
            .create_if_absent(|| Ok::<_, String>(FakeSession { label: "retry" }))
            .expect("retry after failure");
        assert_eq!(session.label, "retry");
    }

    #[test]
    fn get_does_not_wait_for_running_factory() {
        let registry: Arc<SessionRegistry<FakeSession>> = Arc::new(SessionRegistry::new());
        let observer = Arc::clone(&registry);

        registry
            .create_if_absent(|| {
                let seen = std::thread::spawn(move || observer.get().is_some())
                    .join()
                    .expect("observer panicked");
                assert!(!seen, "partially built session must not be visible");
                Ok::<_, String>(FakeSession { label: "built" })
            })
            .expect("create");
        assert!(registry.is_active());
    }

    #[test]
    fn destroy_is_noop_when_empty_and_idempotent() {
        let registry: SessionRegistry<FakeSession> = SessionRegistry::new();
        assert!(registry.destroy().is_none());

        registry
            .create_if_absent(|| Ok::<_, String>(FakeSession { label: "live" }))
            .expect("create");
        assert!(registry.destroy().is_some());
        assert!(registry.destroy().is_none());
        assert!(registry.get().is_none());
    }

    #[test]
    fn destroy_with_quiesces_before_clearing() {
        let registry = SessionRegistry::new();
        registry
            .create_if_absent(|| Ok::<_, String>(FakeSession { label: "live" }))
            .expect("create");

        let quiesced = AtomicUsize::new(0);
        let removed = registry.destroy_with(|session| {
            assert_eq!(session.label, "live");
            quiesced.fetch_add(1, Ordering::SeqCst);
        });
        assert!(removed.is_some());

        registry.destroy_with(|_| {
            quiesced.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(quiesced.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn recreate_after_destroy_runs_factory_again() {
        let registry = SessionRegistry::new();
        registry
            .create_if_absent(|| Ok::<_, String>(FakeSession { label: "one" }))
            .expect("create");
        registry.destroy();
        let second = registry
            .create_if_absent(|| Ok::<_, String>(FakeSession { label: "two" }))
            .expect("recreate");
        assert_eq!(second.label, "two");
    }
}
