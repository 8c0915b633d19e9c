// ============================================================================
// spark-observables - Shared Cells
// Single-threaded (Rc<RefCell>) or thread-safe (Arc<Mutex>) shared state,
// selected by the `sync` feature
// ============================================================================
//
// Only the notification plumbing is shared. Backing stores are owned by
// their container and borrowed by views, so they never go through here.
// ============================================================================

#[cfg(not(feature = "sync"))]
mod imp {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    pub type Shared<T> = Rc<RefCell<T>>;
    pub type WeakShared<T> = Weak<RefCell<T>>;

    pub fn shared<T>(value: T) -> Shared<T> {
        Rc::new(RefCell::new(value))
    }

    pub fn with_mut<T: ?Sized, R>(cell: &Shared<T>, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut cell.borrow_mut())
    }

    pub fn downgrade<T: ?Sized>(cell: &Shared<T>) -> WeakShared<T> {
        Rc::downgrade(cell)
    }

    /// Marker for values that may cross threads. Everything qualifies
    /// without the `sync` feature.
    pub trait MaybeSend {}
    impl<T: ?Sized> MaybeSend for T {}
}

#[cfg(feature = "sync")]
mod imp {
    use std::sync::{Arc, Mutex, PoisonError, Weak};

    pub type Shared<T> = Arc<Mutex<T>>;
    pub type WeakShared<T> = Weak<Mutex<T>>;

    pub fn shared<T>(value: T) -> Shared<T> {
        Arc::new(Mutex::new(value))
    }

    pub fn with_mut<T: ?Sized, R>(cell: &Shared<T>, f: impl FnOnce(&mut T) -> R) -> R {
        // A panicking subscriber must not wedge the container.
        let mut guard = cell.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn downgrade<T: ?Sized>(cell: &Shared<T>) -> WeakShared<T> {
        Arc::downgrade(cell)
    }

    /// Marker for values that may cross threads.
    pub trait MaybeSend: Send {}
    impl<T: Send + ?Sized> MaybeSend for T {}
}

pub use imp::MaybeSend;
pub(crate) use imp::{downgrade, shared, with_mut, Shared, WeakShared};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_mut_mutates_in_place() {
        let cell = shared(vec![1, 2]);
        with_mut(&cell, |v| v.push(3));
        assert_eq!(with_mut(&cell, |v| v.clone()), vec![1, 2, 3]);
    }

    #[test]
    fn weak_handle_dies_with_owner() {
        let cell = shared(0u8);
        let weak = downgrade(&cell);
        assert!(weak.upgrade().is_some());
        drop(cell);
        assert!(weak.upgrade().is_none());
    }
}
