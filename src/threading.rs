//! Support for running tiles of one range on rayon workers.
//!
//! Tiles of a range are independent except through the destination buffer,
//! so parallel execution is only chosen when no two admitted elements share a
//! destination cell. Each worker then writes a disjoint set of cells through
//! a shared raw pointer.

/// A raw pointer wrapper that is `Send` + `Sync`.
///
/// # Safety
/// The pointed-to buffer must outlive every worker holding a copy, and the
/// workers must write disjoint elements.
pub(crate) struct SendPtr<T>(pub(crate) *mut T);

impl<T> Clone for SendPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SendPtr<T> {}

unsafe impl<T> Send for SendPtr<T> {}
unsafe impl<T> Sync for SendPtr<T> {}

impl<T> SendPtr<T> {
    pub(crate) fn as_ptr(self) -> *mut T {
        self.0
    }
}

/// Whether `tiles` tiles are worth splitting across the rayon pool.
#[cfg(feature = "parallel")]
pub(crate) fn should_run_parallel(tiles: usize) -> bool {
    tiles >= crate::MIN_PARALLEL_TILES && rayon::current_num_threads() > 1
}

/// Whether the admitted elements of a range address pairwise distinct cells.
///
/// `indices` must already be bounds-checked against `dest_len`.
#[cfg_attr(not(feature = "parallel"), allow(dead_code))]
pub(crate) fn collision_free<I>(dest_len: usize, indices: I) -> bool
where
    I: IntoIterator<Item = usize>,
{
    let mut seen = vec![false; dest_len];
    for index in indices {
        if std::mem::replace(&mut seen[index], true) {
            return false;
        }
    }
    true
}
