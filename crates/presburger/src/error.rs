//! The handful of non-panicking failure modes exposed at the public API
//! boundary.
//!
//! Invariant violations (inconsistent dimensions passed to an internal
//! function, a stale tableau handle, a missing div) stay `panic!`/
//! `assert!` aborts — they indicate a bug inside this crate, not a
//! recoverable condition a caller can act on. Only the outcomes below are
//! ones a caller legitimately needs to branch on.

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
/// An error surfaced by a public solve/sample/lexmin entry point.
pub enum Error {
	/// An optimization direction has no finite optimum over the given set.
	#[error("the objective is unbounded over the given set")]
	Unbounded,
	/// The query has no feasible solution.
	#[error("the set is infeasible")]
	Infeasible,
	/// Two spaces that were required to match did not.
	#[error("incompatible spaces: {lhs} vs. {rhs}")]
	DimensionMismatch {
		/// Total width of the left-hand space.
		lhs: usize,
		/// Total width of the right-hand space.
		rhs: usize,
	},
	/// An `Int` value did not fit in the fixed-width type a caller asked
	/// for it to be converted to.
	#[error("integer value does not fit in the requested width")]
	Overflow,
}

/// Convenience alias for fallible public entry points.
pub type Result<T> = std::result::Result<T, Error>;
