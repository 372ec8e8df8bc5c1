//! Lock primitives used by the core, swapped for `loom` models under the
//! `loom-tests` feature.

#[cfg(feature = "loom-tests")]
pub(crate) use loom::sync::atomic::{AtomicBool, Ordering};
#[cfg(feature = "loom-tests")]
pub(crate) use loom::sync::{Mutex, MutexGuard, RwLock};

#[cfg(not(feature = "loom-tests"))]
pub(crate) use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(not(feature = "loom-tests"))]
pub(crate) use std::sync::{Mutex, MutexGuard, RwLock};
