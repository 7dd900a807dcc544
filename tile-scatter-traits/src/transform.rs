//! Per-element transforms applied in place immediately before a write.
//!
//! The transform hook is resolved at the type level so that the identity case
//! costs nothing after monomorphization. Three marker transforms are provided:
//! - `Identity`: no change
//! - `Conj`: complex conjugate (identity on real types)
//! - `Negate`: arithmetic negation
//!
//! Any `FnMut(&mut T)` closure is also a transform, which is how kernels pass
//! their own per-element logic.
//!
//! # Contract
//!
//! A transform is invoked exactly once per element that passes its guard, in
//! the lane that owns the element. It must not communicate across lanes and
//! must not fail.

use num_complex::Complex;
use num_traits::Num;

/// Element types the [`Conj`] transform can act on.
///
/// Conjugation happens in place on the lane-local copy, right before the
/// store. Types with no imaginary part opt in with an empty impl and are
/// stored unchanged.
pub trait ConjApply {
    #[inline(always)]
    fn conj_in_place(&mut self) {}
}

macro_rules! impl_conj_apply_real {
    ($($t:ty),*) => {
        $(impl ConjApply for $t {})*
    };
}

impl_conj_apply_real!(
    f32, f64, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize
);

impl<T: Num + Clone + std::ops::Neg<Output = T>> ConjApply for Complex<T> {
    #[inline(always)]
    fn conj_in_place(&mut self) {
        self.im = -self.im.clone();
    }
}

// ---------------------------------------------------------------------------
// Marker types
// ---------------------------------------------------------------------------

/// Identity transform: the value is written unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

/// Complex conjugate transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Conj;

/// Negation transform: x = -x
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Negate;

// ---------------------------------------------------------------------------
// TileTransform<T>
// ---------------------------------------------------------------------------

/// In-place mutation of one tile element, applied just before it is stored.
///
/// The mutation is visible to the caller afterwards: the lane-local value
/// array holds the transformed values once the scatter returns.
pub trait TileTransform<T> {
    /// Whether this transform leaves every value unchanged.
    const IS_IDENTITY: bool = false;

    /// Mutate `value` in place.
    fn apply(&mut self, value: &mut T);
}

impl<T> TileTransform<T> for Identity {
    const IS_IDENTITY: bool = true;

    #[inline(always)]
    fn apply(&mut self, _value: &mut T) {}
}

impl<T: ConjApply> TileTransform<T> for Conj {
    #[inline(always)]
    fn apply(&mut self, value: &mut T) {
        value.conj_in_place();
    }
}

impl<T: Copy + std::ops::Neg<Output = T>> TileTransform<T> for Negate {
    #[inline(always)]
    fn apply(&mut self, value: &mut T) {
        *value = -*value;
    }
}

impl<T, F: FnMut(&mut T)> TileTransform<T> for F {
    #[inline(always)]
    fn apply(&mut self, value: &mut T) {
        self(value)
    }
}
