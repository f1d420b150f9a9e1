//! Arbitrary precision signed integers used throughout coefficient rows,
//! matrices and simplex samples.
//!
//! The actual big-integer arithmetic is delegated to [`num_bigint`]; this
//! module only adds the handful of operations (GCD/LCM, floor/ceil
//! division, sign queries) that the rest of the crate leans on so that
//! call sites read in terms of Presburger-arithmetic vocabulary rather
//! than generic bignum vocabulary.

use std::{
	cmp::Ordering,
	fmt::{self, Display},
	iter::Sum,
	ops::{Add, AddAssign, Div, Mul, Neg, Rem, Sub, SubAssign},
};

use num_bigint::BigInt;
use num_integer::Integer as _;
use num_traits::{Signed, ToPrimitive, Zero};

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// An arbitrary precision signed integer.
pub struct Int(BigInt);

impl Int {
	/// The integer `0`.
	pub fn zero() -> Self {
		Self(BigInt::zero())
	}

	/// The integer `1`.
	pub fn one() -> Self {
		Self(BigInt::from(1))
	}

	/// The integer `-1`.
	pub fn neg_one() -> Self {
		Self(BigInt::from(-1))
	}

	/// Construct an [`Int`] from a native `i64`.
	pub fn from_i64(v: i64) -> Self {
		Self(BigInt::from(v))
	}

	/// Returns `true` if `self` is zero.
	pub fn is_zero(&self) -> bool {
		self.0.is_zero()
	}

	/// Returns `true` if `self` is one.
	pub fn is_one(&self) -> bool {
		self.0 == BigInt::from(1)
	}

	/// Returns `true` if `self` is negative one.
	pub fn is_negone(&self) -> bool {
		self.0 == BigInt::from(-1)
	}

	/// Returns `true` if `self` is strictly negative.
	pub fn is_negative(&self) -> bool {
		self.0.is_negative()
	}

	/// Returns `true` if `self` is strictly positive.
	pub fn is_positive(&self) -> bool {
		self.0.is_positive()
	}

	/// Sign of `self`: `-1`, `0` or `1`.
	pub fn signum(&self) -> i32 {
		if self.0.is_zero() {
			0
		} else if self.0.is_negative() {
			-1
		} else {
			1
		}
	}

	/// Absolute value.
	pub fn abs(&self) -> Self {
		Self(self.0.abs())
	}

	/// Greatest common divisor of `self` and `other`. Always non-negative.
	pub fn gcd(&self, other: &Self) -> Self {
		Self(self.0.gcd(&other.0))
	}

	/// Least common multiple of `self` and `other`. Always non-negative.
	pub fn lcm(&self, other: &Self) -> Self {
		Self(self.0.lcm(&other.0))
	}

	/// Division rounding towards negative infinity.
	///
	/// `m` must be non-zero.
	pub fn floor_div(&self, m: &Self) -> Self {
		debug_assert!(!m.is_zero(), "division by zero");
		Self(self.0.div_floor(&m.0))
	}

	/// Division rounding towards positive infinity.
	///
	/// `m` must be non-zero.
	pub fn ceil_div(&self, m: &Self) -> Self {
		debug_assert!(!m.is_zero(), "division by zero");
		let (q, r) = self.0.div_mod_floor(&m.0);
		if r.is_zero() {
			Self(q)
		} else {
			Self(q + 1)
		}
	}

	/// Exact division. Panics (in debug builds) if `m` does not divide
	/// `self` evenly.
	pub fn exact_div(&self, m: &Self) -> Self {
		debug_assert!(!m.is_zero(), "division by zero");
		debug_assert!(
			(&self.0 % &m.0).is_zero(),
			"exact_div: {self} is not a multiple of {m}"
		);
		Self(&self.0 / &m.0)
	}

	/// Try to convert to `i64`, used only on display/debug paths and in
	/// the handful of places that must hand a bounded width downstream.
	pub fn to_i64(&self) -> Option<i64> {
		self.0.to_i64()
	}
}

impl From<i64> for Int {
	fn from(v: i64) -> Self {
		Self::from_i64(v)
	}
}

impl From<i32> for Int {
	fn from(v: i32) -> Self {
		Self::from_i64(v as i64)
	}
}

impl Display for Int {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.0, f)
	}
}

impl PartialEq<i64> for Int {
	fn eq(&self, other: &i64) -> bool {
		self.0 == BigInt::from(*other)
	}
}

impl PartialOrd<i64> for Int {
	fn partial_cmp(&self, other: &i64) -> Option<Ordering> {
		self.0.partial_cmp(&BigInt::from(*other))
	}
}

macro_rules! forward_binop {
	($trait:ident, $method:ident) => {
		impl $trait for Int {
			type Output = Int;
			fn $method(self, rhs: Int) -> Int {
				Int(self.0.$method(rhs.0))
			}
		}
		impl $trait for &Int {
			type Output = Int;
			fn $method(self, rhs: &Int) -> Int {
				Int((&self.0).$method(&rhs.0))
			}
		}
	};
}

forward_binop!(Add, add);
forward_binop!(Sub, sub);
forward_binop!(Mul, mul);
forward_binop!(Rem, rem);

impl Div for Int {
	type Output = Int;
	/// Truncating division, exposed only for completeness; prefer
	/// [`Int::floor_div`] / [`Int::ceil_div`] / [`Int::exact_div`].
	fn div(self, rhs: Int) -> Int {
		Int(self.0 / rhs.0)
	}
}

impl Neg for Int {
	type Output = Int;
	fn neg(self) -> Int {
		Int(-self.0)
	}
}

impl Neg for &Int {
	type Output = Int;
	fn neg(self) -> Int {
		Int(-&self.0)
	}
}

impl AddAssign<&Int> for Int {
	fn add_assign(&mut self, rhs: &Int) {
		self.0 += &rhs.0;
	}
}

impl SubAssign<&Int> for Int {
	fn sub_assign(&mut self, rhs: &Int) {
		self.0 -= &rhs.0;
	}
}

impl Sum for Int {
	fn sum<I: Iterator<Item = Int>>(iter: I) -> Self {
		iter.fold(Int::zero(), |acc, x| acc + x)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn gcd_lcm() {
		let a = Int::from(12);
		let b = Int::from(18);
		assert_eq!(a.gcd(&b), Int::from(6));
		assert_eq!(a.lcm(&b), Int::from(36));
	}

	#[test]
	fn floor_ceil_div_negative() {
		let a = Int::from(-7);
		let m = Int::from(2);
		assert_eq!(a.floor_div(&m), Int::from(-4));
		assert_eq!(a.ceil_div(&m), Int::from(-3));
	}

	#[test]
	fn floor_ceil_div_exact() {
		let a = Int::from(6);
		let m = Int::from(3);
		assert_eq!(a.floor_div(&m), Int::from(2));
		assert_eq!(a.ceil_div(&m), Int::from(2));
	}
}
