//! Thread-safety bounds of [`RangeScatter`](crate::RangeScatter) inputs.
//!
//! Values and the transform move onto rayon workers, so with `parallel` they
//! must be `Send + Sync`; offsets are only read there and must be `Sync`.
//! Without `parallel` tiles stay on the calling thread and both bounds hold
//! for every type.

/// Bound on range values and transforms.
#[cfg(feature = "parallel")]
pub trait MaybeSendSync: Send + Sync {}
#[cfg(feature = "parallel")]
impl<T: Send + Sync + ?Sized> MaybeSendSync for T {}

/// Bound on range offsets.
#[cfg(feature = "parallel")]
pub trait MaybeSync: Sync {}
#[cfg(feature = "parallel")]
impl<T: Sync + ?Sized> MaybeSync for T {}

#[cfg(not(feature = "parallel"))]
pub trait MaybeSendSync {}
#[cfg(not(feature = "parallel"))]
impl<T: ?Sized> MaybeSendSync for T {}

#[cfg(not(feature = "parallel"))]
pub trait MaybeSync {}
#[cfg(not(feature = "parallel"))]
impl<T: ?Sized> MaybeSync for T {}
