//! Fourier-Motzkin elimination of a contiguous block of variables.

use tracing::trace;

use super::BasicMap;
use crate::vector::Vector;

/// Eliminate variables `pos..pos+n` from `b`'s constraint list in place.
/// Leaves those columns present but entirely zero in every surviving
/// row — the caller is responsible for shrinking the space and dropping
/// the now-dead columns (see `BasicMap::project_out`).
pub(super) fn eliminate_vars(b: &mut BasicMap, pos: usize, n: usize) {
	for col in pos..pos + n {
		eliminate_one(b, col);
	}
}

/// Eliminate a single column `col` by first using it as a pivot for any
/// equality that has a non-zero coefficient there (cheaper, exact), and
/// otherwise combining every pair of an upper and a lower inequality
/// bound on it.
fn eliminate_one(b: &mut BasicMap, col: usize) {
	if let Some(idx) = b.eqs.iter().position(|r| !r[col].is_zero()) {
		eliminate_via_equality(b, col, idx);
		return;
	}
	eliminate_via_inequalities(b, col);
}

/// Use equality `idx` (whose `col` coefficient is non-zero) to cancel
/// `col` out of every other row, then drop the equality itself — `col`
/// no longer appears anywhere.
pub(super) fn eliminate_via_equality(b: &mut BasicMap, col: usize, idx: usize) {
	let pivot = b.eqs[idx].clone();
	let pivot_coeff = pivot[col].clone();
	let scaled_pivot = pivot.scale(&pivot_coeff.abs());
	for r in 0..b.eqs.len() {
		if r == idx || b.eqs[r][col].is_zero() {
			continue;
		}
		let factor = -b.eqs[r][col].clone();
		let scaled_row = b.eqs[r].scale(&pivot_coeff.abs());
		let combined = scaled_row.combine(&factor, &scaled_pivot);
		b.eqs[r] = normalize_row(&combined);
	}
	for r in 0..b.ineqs.len() {
		if b.ineqs[r][col].is_zero() {
			continue;
		}
		let factor = -b.ineqs[r][col].clone();
		let scaled_row = b.ineqs[r].scale(&pivot_coeff.abs());
		let combined = scaled_row.combine(&factor, &scaled_pivot);
		b.ineqs[r] = normalize_row(&combined);
	}
	b.eqs.remove(idx);
	trace!(col, "eliminated variable via equality pivot");
}

/// Classical Fourier-Motzkin step: partition inequalities on `col` into
/// lower bounds (`coeff > 0`), upper bounds (`coeff < 0`) and those not
/// mentioning it; replace the bounded pair-set by every lower/upper
/// combination, dropping `col` from the result.
fn eliminate_via_inequalities(b: &mut BasicMap, col: usize) {
	let (mut lower, mut upper, mut rest) = (vec![], vec![], vec![]);
	for row in b.ineqs.drain(..) {
		if row[col].is_positive() {
			lower.push(row);
		} else if row[col].is_negative() {
			upper.push(row);
		} else {
			rest.push(row);
		}
	}
	let mut out = rest;
	for lo in &lower {
		for hi in &upper {
			let lo_coeff = lo[col].clone();
			let hi_coeff = hi[col].abs();
			// hi_coeff * lo + lo_coeff * hi has col-coefficient
			// hi_coeff*lo_coeff + lo_coeff*(-hi_coeff) == 0.
			let scaled_lo = lo.scale(&hi_coeff);
			let combined = scaled_lo.combine(&lo_coeff, hi);
			out.push(normalize_row(&combined));
		}
	}
	b.ineqs = out;
	trace!(col, lower = lower.len(), upper = upper.len(), "Fourier-Motzkin eliminated variable");
}

/// Divide a row by the GCD of all of its coefficients (including the
/// constant) so elimination does not blow rows up unboundedly.
fn normalize_row(row: &Vector) -> Vector {
	let g = row.gcd_range(0..row.len());
	if g.is_zero() || g.is_one() {
		row.clone()
	} else {
		Vector::from_vec(row.as_slice().iter().map(|c| c.exact_div(&g)).collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::space::Space;

	fn row(xs: &[i64]) -> Vector {
		Vector::from_vec(xs.iter().map(|&x| Int::from(x)).collect())
	}

	#[test]
	fn eliminates_bounded_variable() {
		// 0 <= x, x <= 5 (i.e. -x + 5 >= 0), eliminate x: leaves 5 >= 0.
		let mut b = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[0, 1]));
		b.add_inequality_row(row(&[5, -1]));
		eliminate_vars(&mut b, 1, 1);
		assert_eq!(b.ineqs.len(), 1);
		assert!(!b.ineqs[0][0].is_negative());
	}

	#[test]
	fn eliminates_via_equality_pivot() {
		// x = 3, eliminate x: no residual constraint.
		let mut b = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		b.add_equality_row(row(&[-3, 1]));
		eliminate_vars(&mut b, 1, 1);
		assert!(b.eqs.is_empty());
	}
}
