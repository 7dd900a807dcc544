//! Destination offset element types.

/// Integer types usable as element-granularity destination offsets.
///
/// Graph kernels carry vertex and edge indices in whatever width their
/// storage format uses, so the scatter façade is generic over the offset
/// type instead of forcing a conversion pass before every tile.
pub trait ScatterOffset: Copy {
    /// The zero offset, used to pad lanes past the end of a data range.
    const ZERO: Self;

    /// Pointer offset in elements.
    ///
    /// Values that do not fit in `isize` wrap; callers are responsible for
    /// supplying offsets inside the destination buffer.
    fn to_isize(self) -> isize;

    /// Checked conversion to a slice index. `None` for negative or
    /// unrepresentable offsets.
    fn to_index(self) -> Option<usize>;
}

macro_rules! impl_scatter_offset {
    ($($t:ty),*) => {
        $(
            impl ScatterOffset for $t {
                const ZERO: Self = 0;

                #[inline(always)]
                fn to_isize(self) -> isize {
                    self as isize
                }

                #[inline(always)]
                fn to_index(self) -> Option<usize> {
                    usize::try_from(self).ok()
                }
            }
        )*
    };
}

impl_scatter_offset!(u32, u64, usize, i32, i64, isize);
