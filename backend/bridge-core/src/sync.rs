use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, taking the data even if a previous holder panicked.
///
/// A panicking listener must not wedge every later broadcast.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
