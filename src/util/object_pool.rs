use std::{
    cell::RefCell,
    ops::{Deref, DerefMut},
    rc::Rc,
};

struct PoolInner<T> {
    free: Vec<T>,
    capacity: usize,
    outstanding: usize,
}

/// Single-threaded pool of reusable objects with a fixed number of slots.
///
/// Objects come back to the pool when their `Pooled` handle drops. Asking
/// for more than `capacity` objects at once is a caller error: it is logged,
/// asserted in debug builds, and served by objects the pool won't keep.
pub struct ObjectPool<T: Default> {
    inner: Rc<RefCell<PoolInner<T>>>,
}

pub struct Pooled<T: Default> {
    value: T,
    pool: Option<Rc<RefCell<PoolInner<T>>>>,
}

impl<T: Default> ObjectPool<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PoolInner {
                free: Vec::new(),
                capacity,
                outstanding: 0,
            })),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.borrow().capacity
    }

    pub fn outstanding(&self) -> usize {
        self.inner.borrow().outstanding
    }

    pub fn allocate(&self) -> Pooled<T> {
        let mut inner = self.inner.borrow_mut();
        if inner.outstanding >= inner.capacity {
            log::warn!(
                "object pool exhausted, {} objects outstanding",
                inner.outstanding
            );
            debug_assert!(false, "object pool of {} exhausted", inner.capacity);
            return Pooled {
                value: T::default(),
                pool: None,
            };
        }
        inner.outstanding += 1;
        let value = inner.free.pop().unwrap_or_default();
        Pooled {
            value,
            pool: Some(self.inner.clone()),
        }
    }
}

impl<T: Default> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: Default> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: Default> Drop for Pooled<T> {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            let mut inner = pool.borrow_mut();
            inner.outstanding -= 1;
            inner.free.push(std::mem::take(&mut self.value));
        }
    }
}
