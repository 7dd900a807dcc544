//! Compile-time unrolled index traversal.
//!
//! `Count<N>::for_each(f)` calls `f(0), f(1), ..., f(N - 1)` as straight-line
//! code: each power of two is implemented by calling the half-size
//! implementation twice, and after inlining no loop counter or branch is
//! left. Only powers of two up to 64 are implemented, so an unsupported tile
//! dimension is a compile error rather than a silent runtime loop.

/// Marker carrying a compile-time trip count.
#[derive(Debug, Clone, Copy, Default)]
pub struct Count<const N: usize>;

/// A trip count that can be expanded into straight-line calls.
pub trait Unrolled {
    /// Number of calls issued by [`for_each`](Self::for_each).
    const COUNT: usize;

    /// Call `f(base), f(base + 1), ..., f(base + COUNT - 1)`.
    fn for_each_from<F: FnMut(usize)>(base: usize, f: &mut F);

    /// Call `f(0), ..., f(COUNT - 1)`.
    #[inline(always)]
    fn for_each<F: FnMut(usize)>(mut f: F) {
        Self::for_each_from(0, &mut f);
    }
}

impl Unrolled for Count<1> {
    const COUNT: usize = 1;

    #[inline(always)]
    fn for_each_from<F: FnMut(usize)>(base: usize, f: &mut F) {
        f(base);
    }
}

macro_rules! impl_unrolled_doubling {
    ($($n:literal => $half:literal),* $(,)?) => {
        $(
            impl Unrolled for Count<$n> {
                const COUNT: usize = $n;

                #[inline(always)]
                fn for_each_from<F: FnMut(usize)>(base: usize, f: &mut F) {
                    <Count<$half> as Unrolled>::for_each_from(base, f);
                    <Count<$half> as Unrolled>::for_each_from(base + $half, f);
                }
            }
        )*
    };
}

impl_unrolled_doubling!(2 => 1, 4 => 2, 8 => 4, 16 => 8, 32 => 16, 64 => 32);
