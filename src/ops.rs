//! Operators, monoids, and semirings (§6).
//!
//! The original design's operator/monoid/semiring *construction and
//! bookkeeping* (printing, checking, user registration) is an external
//! collaborator (§1); this module is the thin interface the core actually
//! consumes: function-pointer-backed unary/binary operators, a monoid
//! (associative binary op + identity + optional terminal), and a semiring
//! (monoid + multiply). Built-in instances for the common numeric
//! monoids/semirings are provided as plain constructors, the way the
//! teacher crate exposes built-in monoid/semiring shorthands rather than a
//! registry.

use crate::types::Scalar;
use num_traits::{Bounded, Zero};
use std::sync::Arc;

/// `x: X -> z: Z`.
///
/// Backed by `Arc<dyn Fn>` rather than a bare function pointer so that
/// [`BinaryOp::bind_first`]/[`BinaryOp::bind_second`] can produce a unary
/// operator that closes over a bound constant (apply's scalar-broadcast
/// mechanism, §4.8).
#[derive(Clone)]
pub struct UnaryOp<X, Z> {
    /// Operator name, used in error messages and logging.
    pub name: &'static str,
    f: Arc<dyn Fn(X) -> Z + Send + Sync>,
}

impl<X, Z> UnaryOp<X, Z> {
    /// Wrap a function or closure as a named unary operator.
    pub fn new<F>(name: &'static str, f: F) -> Self
    where
        F: Fn(X) -> Z + Send + Sync + 'static,
    {
        Self { name, f: Arc::new(f) }
    }

    /// Evaluate the operator.
    #[inline]
    pub fn apply(&self, x: X) -> Z {
        (self.f)(x)
    }
}

/// `(x: X, y: Y) -> z: Z`.
#[derive(Clone, Copy)]
pub struct BinaryOp<X, Y, Z> {
    /// Operator name, used in error messages and logging.
    pub name: &'static str,
    f: fn(X, Y) -> Z,
}

impl<X, Y, Z> BinaryOp<X, Y, Z> {
    /// Wrap a plain function pointer as a named binary operator.
    pub const fn new(name: &'static str, f: fn(X, Y) -> Z) -> Self {
        Self { name, f }
    }

    /// Evaluate the operator.
    #[inline]
    pub fn apply(&self, x: X, y: Y) -> Z {
        (self.f)(x, y)
    }
}

impl<X: Copy + 'static, Y: Copy + 'static, Z: 'static> BinaryOp<X, Y, Z> {
    /// Bind the first operand to the constant `x`, producing the unary
    /// operator `y -> op(x, y)`. This is the mechanism scalar-broadcast
    /// operations (`subassign`/`assign` over a scalar `x`, §4.6) use to
    /// turn a binary operator into the unary map `apply` expects.
    pub fn bind_first(&self, x: X) -> UnaryOp<Y, Z> {
        let f = self.f;
        UnaryOp { name: self.name, f: Arc::new(move |y: Y| f(x, y)) }
    }

    /// Bind the second operand to the constant `y`, producing the unary
    /// operator `x -> op(x, y)`.
    pub fn bind_second(&self, y: Y) -> UnaryOp<X, Z> {
        let f = self.f;
        UnaryOp { name: self.name, f: Arc::new(move |x: X| f(x, y)) }
    }
}

/// `(op: binary with x=y=z=T, identity: T, terminal: option T)` (§6).
///
/// Associativity is assumed; commutativity is assumed for deterministic
/// results across task slicing but is not required for correctness (§5).
#[derive(Clone, Copy)]
pub struct Monoid<T: Scalar> {
    /// The associative combining operator.
    pub op: BinaryOp<T, T, T>,
    /// The identity element: `op.apply(identity, x) == x` for all `x`.
    pub identity: T,
    /// An optional absorbing element permitting early termination of a
    /// reduction or dot-product accumulation (§4.5.4, §4.8).
    pub terminal: Option<T>,
}

impl<T: Scalar> Monoid<T> {
    /// Construct a monoid, optionally with a terminal (absorbing) value.
    pub const fn new(op: BinaryOp<T, T, T>, identity: T, terminal: Option<T>) -> Self {
        Self { op, identity, terminal }
    }

    /// Whether `value` equals this monoid's terminal, if it has one.
    #[inline]
    pub fn is_terminal(&self, value: &T) -> bool {
        matches!(self.terminal, Some(t) if t == *value)
    }
}

/// `(monoid, mult)`; the monoid's `T` must equal `mult`'s `z` (§6).
#[derive(Clone, Copy)]
pub struct Semiring<X: Scalar, Y: Scalar, Z: Scalar> {
    /// The additive (`⊕`) monoid over the output type.
    pub add: Monoid<Z>,
    /// The multiplicative (`⊗`) operator, `X x Y -> Z`.
    pub mul: BinaryOp<X, Y, Z>,
}

impl<X: Scalar, Y: Scalar, Z: Scalar> Semiring<X, Y, Z> {
    /// Pair a monoid with a multiply operator into a semiring.
    pub const fn new(add: Monoid<Z>, mul: BinaryOp<X, Y, Z>) -> Self {
        Self { add, mul }
    }
}

/// Built-in operators, monoids, and semirings over the primitive numeric
/// and boolean scalar types.
pub mod builtin {
    use super::*;
    use std::ops::{Add, Mul};

    /// `z = x + y`.
    pub fn plus<T: Copy + Add<Output = T>>() -> BinaryOp<T, T, T> {
        BinaryOp::new("plus", |x: T, y: T| x + y)
    }

    /// `z = x * y`.
    pub fn times<T: Copy + Mul<Output = T>>() -> BinaryOp<T, T, T> {
        BinaryOp::new("times", |x: T, y: T| x * y)
    }

    /// `z = min(x, y)`.
    pub fn min<T: Copy + PartialOrd>() -> BinaryOp<T, T, T> {
        BinaryOp::new("min", |x: T, y: T| if x < y { x } else { y })
    }

    /// `z = max(x, y)`.
    pub fn max<T: Copy + PartialOrd>() -> BinaryOp<T, T, T> {
        BinaryOp::new("max", |x: T, y: T| if x > y { x } else { y })
    }

    /// `z = y` (second-overwrites); the default `opdup` for pending tuples
    /// relied on by `wait` (§4.2). Generalized over independent `X`/`Y` so
    /// `bind_second` can turn it into the constant map `_ -> y` driving
    /// scalar expansion (§4.6) over a pattern matrix of a different type
    /// than the broadcast value itself.
    pub fn second<X: Copy, Y: Copy>() -> BinaryOp<X, Y, Y> {
        BinaryOp::new("second", |_x: X, y: Y| y)
    }

    /// `z = x` (first-wins).
    pub fn first<T: Copy>() -> BinaryOp<T, T, T> {
        BinaryOp::new("first", |x: T, _y: T| x)
    }

    /// `z = x || y`.
    pub fn lor() -> BinaryOp<bool, bool, bool> {
        BinaryOp::new("lor", |x, y| x || y)
    }

    /// `z = x && y`.
    pub fn land() -> BinaryOp<bool, bool, bool> {
        BinaryOp::new("land", |x, y| x && y)
    }

    /// The `(PLUS, +)` monoid, identity `0`.
    pub fn plus_monoid<T: Copy + Add<Output = T> + Zero + PartialEq>() -> Monoid<T> {
        Monoid::new(plus(), T::zero(), None)
    }

    /// The `(MIN, min)` monoid over a `Bounded` type, identity `MAX`, no
    /// terminal (matching the source library's integer MIN monoids, which
    /// carry no terminal value for finite integer domains).
    pub fn min_monoid<T: Copy + PartialOrd + Bounded>() -> Monoid<T> {
        Monoid::new(min(), T::max_value(), None)
    }

    /// The `(MAX, max)` monoid over a `Bounded` type, identity `MIN`.
    pub fn max_monoid<T: Copy + PartialOrd + Bounded>() -> Monoid<T> {
        Monoid::new(max(), T::min_value(), None)
    }

    /// The boolean `(OR, ||)` monoid, identity `false`, terminal `true`
    /// (§8 scenario 6 relies on this terminal for early-exit reductions).
    pub fn lor_monoid() -> Monoid<bool> {
        Monoid::new(lor(), false, Some(true))
    }

    /// The boolean `(AND, &&)` monoid, identity `true`, terminal `false`.
    pub fn land_monoid() -> Monoid<bool> {
        Monoid::new(land(), true, Some(false))
    }

    /// The canonical `(PLUS, TIMES)` semiring over a numeric type (§8
    /// scenario 1).
    pub fn plus_times<T>() -> Semiring<T, T, T>
    where
        T: Copy + Add<Output = T> + Mul<Output = T> + Zero + PartialEq,
    {
        Semiring::new(plus_monoid(), times())
    }

    /// The boolean `(OR, AND)` semiring used for graph-style masking/BFS
    /// style computations.
    pub fn lor_land() -> Semiring<bool, bool, bool> {
        Semiring::new(lor_monoid(), land())
    }
}

#[cfg(test)]
mod tests {
    use super::builtin::*;

    #[test]
    fn plus_times_semiring_matches_scenario_1() {
        // A = [[1,2],[0,3]], B = [[4,0],[5,6]] -> one entry of the dot
        // product check used by §8 scenario 1: C[0][0] = 1*4 + 2*5 = 14.
        let sr = plus_times::<i32>();
        let c00 = sr.add.op.apply(sr.mul.apply(1, 4), sr.mul.apply(2, 5));
        assert_eq!(c00, 14);
    }

    #[test]
    fn lor_monoid_has_terminal_true() {
        let m = lor_monoid();
        assert!(m.is_terminal(&true));
        assert!(!m.is_terminal(&false));
        assert_eq!(m.identity, false);
    }

    #[test]
    fn min_monoid_identity_is_max_value() {
        let m = min_monoid::<i32>();
        assert_eq!(m.identity, i32::MAX);
        assert_eq!(m.op.apply(3, 5), 3);
    }

    #[test]
    fn bind_second_closes_over_a_constant() {
        let bound = second::<bool, i32>().bind_second(7);
        assert_eq!(bound.apply(true), 7);
        assert_eq!(bound.apply(false), 7);
    }

    #[test]
    fn bind_first_closes_over_a_constant() {
        let bound = plus::<i32>().bind_first(10);
        assert_eq!(bound.apply(5), 15);
    }
}
