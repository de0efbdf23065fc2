//! Scalar domain (§3.1, §6).
//!
//! The original design's type descriptor, operator bookkeeping, and the
//! ANSI-style complex arithmetic library are external collaborators (§1);
//! the core only consumes their *interfaces*. This module realizes the
//! minimal interface the core actually needs: a closed `Code` enumeration
//! mirroring the 11x11 built-in typecast matrix, a sealed `Scalar` trait
//! bounding the types the rest of the crate is generic over, and a
//! `CastFrom` mechanism implementing that matrix. Complex scalars wrap
//! `num_complex::Complex32`/`Complex64` rather than a hand-rolled ANSI
//! complex library.

use num_complex::{Complex32, Complex64};

/// Element type code, mirroring the GraphBLAS built-in type set (§6).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Code {
    /// `bool`.
    Bool,
    /// `i8`.
    I8,
    /// `i16`.
    I16,
    /// `i32`.
    I32,
    /// `i64`.
    I64,
    /// `u8`.
    U8,
    /// `u16`.
    U16,
    /// `u32`.
    U32,
    /// `u64`.
    U64,
    /// `f32`.
    F32,
    /// `f64`.
    F64,
    /// 32-bit complex (`num_complex::Complex32`).
    Fc32,
    /// 64-bit complex (`num_complex::Complex64`).
    Fc64,
    /// An opaque user-defined type of a declared byte size. Per §9's design
    /// note, represented as fixed-size byte arrays with equality-only
    /// casting; this crate does not instantiate `UserDefined` generically
    /// (there is no Rust value of "declared size N" as a type), but the
    /// code is retained so `Code` stays a faithful, total enumeration of
    /// the type system the core's callers may describe.
    UserDefined {
        /// Declared size, in bytes, of the opaque user type.
        size: usize,
    },
}

mod sealed {
    pub trait Sealed {}
}

/// The sealed bound used throughout the crate's generic algorithms.
///
/// Implemented only for the closed set of built-in scalar types named by
/// [`Code`] (excluding `UserDefined`, which has no single Rust
/// representation). This is the Rust analogue of "specialised workers
/// selected at dispatch": the compiler monomorphises generic code per
/// concrete `Scalar` type instead of a code generator emitting one
/// translation unit per (op, type) pair (§4.5.6).
pub trait Scalar: sealed::Sealed + Copy + PartialEq + Send + Sync + std::fmt::Debug + 'static {
    /// The [`Code`] identifying this type.
    const CODE: Code;

    /// The additive identity used as `zero()` by structural predicates
    /// (`nonzero`/`nonzombie` selection, §4.8) and by monoids that do not
    /// carry an explicit identity override.
    fn zero() -> Self;

    /// Structural zero test, used by `select(nonzero, ..)` and friends.
    fn is_zero_value(&self) -> bool {
        *self == Self::zero()
    }
}

macro_rules! impl_scalar {
    ($ty:ty, $code:expr, $zero:expr) => {
        impl sealed::Sealed for $ty {}
        impl Scalar for $ty {
            const CODE: Code = $code;
            fn zero() -> Self {
                $zero
            }
        }
    };
}

impl_scalar!(bool, Code::Bool, false);
impl_scalar!(i8, Code::I8, 0);
impl_scalar!(i16, Code::I16, 0);
impl_scalar!(i32, Code::I32, 0);
impl_scalar!(i64, Code::I64, 0);
impl_scalar!(u8, Code::U8, 0);
impl_scalar!(u16, Code::U16, 0);
impl_scalar!(u32, Code::U32, 0);
impl_scalar!(u64, Code::U64, 0);
impl_scalar!(f32, Code::F32, 0.0);
impl_scalar!(f64, Code::F64, 0.0);
impl_scalar!(Complex32, Code::Fc32, Complex32::new(0.0, 0.0));
impl_scalar!(Complex64, Code::Fc64, Complex64::new(0.0, 0.0));

/// One cell of the 11x11 built-in typecast matrix (§6): cast a value of
/// type `Src` into `Self`.
///
/// Implemented for every ordered pair of built-in real types via
/// [`impl_cast_real_pair`], plus the real/complex crossings. User-defined
/// types are copy-only (equality-restricted) per §9 and so never appear on
/// either side of `CastFrom`.
pub trait CastFrom<Src>: Scalar {
    /// Cast `src` into `Self`, following the built-in typecast matrix.
    fn cast_from(src: Src) -> Self;
}

/// Cast `src: Src` into `Dst`, the copy-cast interface named in §6.
pub fn cast<Dst, Src>(src: Src) -> Dst
where
    Dst: CastFrom<Src>,
{
    Dst::cast_from(src)
}

impl<T: Scalar> CastFrom<T> for T {
    fn cast_from(src: T) -> T {
        src
    }
}

macro_rules! impl_cast_real_pair {
    ($src:ty, $dst:ty) => {
        impl CastFrom<$src> for $dst {
            fn cast_from(src: $src) -> $dst {
                src as $dst
            }
        }
    };
}

macro_rules! impl_cast_real_matrix {
    ([$($ty:ty),+ $(,)?]) => {
        $(
            $(
                impl_cast_real_pair!($ty, $ty);
            )+
        )+
    };
}

// Numeric real <-> real casts, `as`-cast semantics (saturating/truncating
// the way C's built-in casts would). The identity diagonal is already
// covered by the blanket `CastFrom<T> for T` above; skip re-deriving it so
// the macro expansion below only needs the off-diagonal cells.
macro_rules! real_cast_pairs {
    ($($src:ty => [$($dst:ty),+ $(,)?]);+ $(;)?) => {
        $(
            $(
                impl CastFrom<$src> for $dst {
                    fn cast_from(src: $src) -> $dst { src as $dst }
                }
            )+
        )+
    };
}

real_cast_pairs! {
    i8  => [i16, i32, i64, u8, u16, u32, u64, f32, f64];
    i16 => [i8, i32, i64, u8, u16, u32, u64, f32, f64];
    i32 => [i8, i16, i64, u8, u16, u32, u64, f32, f64];
    i64 => [i8, i16, i32, u8, u16, u32, u64, f32, f64];
    u8  => [i8, i16, i32, i64, u16, u32, u64, f32, f64];
    u16 => [i8, i16, i32, i64, u8, u32, u64, f32, f64];
    u32 => [i8, i16, i32, i64, u8, u16, u64, f32, f64];
    u64 => [i8, i16, i32, i64, u8, u16, u32, f32, f64];
    f32 => [i8, i16, i32, i64, u8, u16, u32, u64, f64];
    f64 => [i8, i16, i32, i64, u8, u16, u32, u64, f32];
}

// bool <-> numeric: bool casts to 0/1, numeric casts to bool via nonzero.
macro_rules! bool_cast_pairs {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl CastFrom<bool> for $ty {
                fn cast_from(src: bool) -> $ty { if src { 1 as $ty } else { 0 as $ty } }
            }
            impl CastFrom<$ty> for bool {
                fn cast_from(src: $ty) -> bool { src != 0 as $ty }
            }
        )+
    };
}

bool_cast_pairs!(i8, i16, i32, i64, u8, u16, u32, u64);

impl CastFrom<bool> for f32 {
    fn cast_from(src: bool) -> f32 {
        if src {
            1.0
        } else {
            0.0
        }
    }
}
impl CastFrom<bool> for f64 {
    fn cast_from(src: bool) -> f64 {
        if src {
            1.0
        } else {
            0.0
        }
    }
}
impl CastFrom<f32> for bool {
    fn cast_from(src: f32) -> bool {
        src != 0.0
    }
}
impl CastFrom<f64> for bool {
    fn cast_from(src: f64) -> bool {
        src != 0.0
    }
}

// Real -> complex: embed as (re, 0). Complex -> real: take the real part,
// discarding the imaginary component (matches the source library's
// GB_cast behaviour for narrowing out of the complex domain).
macro_rules! complex_cast_pairs {
    ($complex:ty, $real:ty) => {
        impl CastFrom<$real> for $complex {
            fn cast_from(src: $real) -> $complex {
                <$complex>::new(src as _, 0.0)
            }
        }
        impl CastFrom<$complex> for $real {
            fn cast_from(src: $complex) -> $real {
                src.re as $real
            }
        }
    };
}

complex_cast_pairs!(Complex32, i8);
complex_cast_pairs!(Complex32, i16);
complex_cast_pairs!(Complex32, i32);
complex_cast_pairs!(Complex32, i64);
complex_cast_pairs!(Complex32, u8);
complex_cast_pairs!(Complex32, u16);
complex_cast_pairs!(Complex32, u32);
complex_cast_pairs!(Complex32, u64);
complex_cast_pairs!(Complex32, f32);
complex_cast_pairs!(Complex32, f64);
complex_cast_pairs!(Complex64, i8);
complex_cast_pairs!(Complex64, i16);
complex_cast_pairs!(Complex64, i32);
complex_cast_pairs!(Complex64, i64);
complex_cast_pairs!(Complex64, u8);
complex_cast_pairs!(Complex64, u16);
complex_cast_pairs!(Complex64, u32);
complex_cast_pairs!(Complex64, u64);
complex_cast_pairs!(Complex64, f32);
complex_cast_pairs!(Complex64, f64);

impl CastFrom<Complex32> for Complex64 {
    fn cast_from(src: Complex32) -> Complex64 {
        Complex64::new(src.re as f64, src.im as f64)
    }
}
impl CastFrom<Complex64> for Complex32 {
    fn cast_from(src: Complex64) -> Complex32 {
        Complex32::new(src.re as f32, src.im as f32)
    }
}
