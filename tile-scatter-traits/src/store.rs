//! Single-element store primitive with a cache/consistency hint.
//!
//! The hint family mirrors the PTX `st` modifiers:
//!
//! | Marker          | Hint        | Meaning on device                     |
//! |-----------------|-------------|---------------------------------------|
//! | `StoreDefault`  | `Default`   | compiler's choice                     |
//! | `StoreWb`       | `WriteBack` | cache at all levels                   |
//! | `StoreCg`       | `Global`    | cache in L2 only, bypass L1           |
//! | `StoreCs`       | `Streaming` | evict-first, written once             |
//! | `StoreWt`       | `WriteThrough` | write through to system memory     |
//! | `StoreVolatile` | `Volatile`  | never cached, never elided            |
//!
//! On host targets the first four lower to a plain store and the last two to
//! a volatile store. No hint provides atomicity or a read-modify-write.

/// Cache/consistency tag carried by a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CacheHint {
    #[default]
    Default,
    WriteBack,
    Global,
    Streaming,
    WriteThrough,
    Volatile,
}

impl CacheHint {
    /// Whether the store must not be merged or elided by the compiler.
    pub const fn is_volatile(self) -> bool {
        matches!(self, CacheHint::WriteThrough | CacheHint::Volatile)
    }
}

/// A single-element store honoring a cache hint.
///
/// Implementations perform exactly one write of `value` and return nothing.
/// Kernels may implement this for their own markers (e.g. to count or trace
/// stores) and pass them to the scatter façade as a type parameter.
pub trait StoreHint: Copy + Default + 'static {
    /// The hint this store carries.
    const HINT: CacheHint;

    /// Write `value` to `dst`.
    ///
    /// # Safety
    /// `dst` must be valid for writes and properly aligned for `T`.
    unsafe fn store<T: Copy>(dst: *mut T, value: T);
}

macro_rules! define_store_hint {
    ($($(#[$meta:meta])* $name:ident => $hint:ident, $write:path;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            pub struct $name;

            impl StoreHint for $name {
                const HINT: CacheHint = CacheHint::$hint;

                #[inline(always)]
                unsafe fn store<T: Copy>(dst: *mut T, value: T) {
                    unsafe { $write(dst, value) }
                }
            }
        )*
    };
}

define_store_hint! {
    /// Store with no explicit hint.
    StoreDefault => Default, std::ptr::write;
    /// Write-back store.
    StoreWb => WriteBack, std::ptr::write;
    /// Cache-global store (L2 only).
    StoreCg => Global, std::ptr::write;
    /// Streaming store for data written once.
    StoreCs => Streaming, std::ptr::write;
    /// Write-through store.
    StoreWt => WriteThrough, std::ptr::write_volatile;
    /// Volatile store.
    StoreVolatile => Volatile, std::ptr::write_volatile;
}
