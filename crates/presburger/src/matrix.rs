//! Owned 2-D integer matrices and the lattice operations built on them:
//! Hermite normal form by column reduction, unimodular completion,
//! fraction-free linear solves (used as a stand-in for "right inverse"),
//! and the variable/parameter compression used by div normalisation and
//! integer sampling.
//!
//! Grounded on `isl_equalities.c`'s `compress_variables`: compute the left
//! Hermite normal form `M U = [H1 0]` of the equality matrix, solve
//! `H1 x1' = c` exactly, and express the original variables as `x = x0 +
//! U2 x2'` with `x2'` free.

use crate::int::Int;

#[derive(Clone, Debug, PartialEq, Eq)]
/// An owned, dense, row-major integer matrix.
pub struct Matrix {
	rows: Vec<Vec<Int>>,
	ncols: usize,
}

impl Matrix {
	/// A matrix of the given dimensions, filled with zeroes.
	pub fn zero(nrows: usize, ncols: usize) -> Self {
		Self {
			rows: vec![vec![Int::zero(); ncols]; nrows],
			ncols,
		}
	}

	/// The `n x n` identity matrix.
	pub fn identity(n: usize) -> Self {
		let mut m = Self::zero(n, n);
		for i in 0..n {
			m.rows[i][i] = Int::one();
		}
		m
	}

	/// Build a matrix from its rows. All rows must have equal length.
	pub fn from_rows(rows: Vec<Vec<Int>>) -> Self {
		let ncols = rows.first().map_or(0, Vec::len);
		debug_assert!(rows.iter().all(|r| r.len() == ncols));
		Self { rows, ncols }
	}

	/// Number of rows.
	pub fn nrows(&self) -> usize {
		self.rows.len()
	}

	/// Number of columns.
	pub fn ncols(&self) -> usize {
		self.ncols
	}

	/// Borrow row `i`.
	pub fn row(&self, i: usize) -> &[Int] {
		&self.rows[i]
	}

	/// Mutably borrow row `i`.
	pub fn row_mut(&mut self, i: usize) -> &mut [Int] {
		&mut self.rows[i]
	}

	/// Consume `self`, returning its rows.
	pub fn into_rows(self) -> Vec<Vec<Int>> {
		self.rows
	}

	/// Swap two columns.
	fn swap_cols(&mut self, a: usize, b: usize) {
		if a == b {
			return;
		}
		for row in &mut self.rows {
			row.swap(a, b);
		}
	}

	/// Negate a column in place.
	fn negate_col(&mut self, c: usize) {
		for row in &mut self.rows {
			row[c] = -std::mem::replace(&mut row[c], Int::zero());
		}
	}

	/// `col_a += factor * col_b`.
	fn combine_col(&mut self, a: usize, factor: &Int, b: usize) {
		for row in &mut self.rows {
			let add = factor * &row[b];
			row[a] += &add;
		}
	}

	/// Matrix-vector product `self · x`, where `x` has `ncols` entries.
	pub fn mul_vec(&self, x: &[Int]) -> Vec<Int> {
		debug_assert_eq!(x.len(), self.ncols);
		self.rows
			.iter()
			.map(|row| row.iter().zip(x.iter()).map(|(a, b)| a * b).sum())
			.collect()
	}

	/// Matrix product `self · other`.
	pub fn mul_mat(&self, other: &Matrix) -> Matrix {
		debug_assert_eq!(self.ncols, other.nrows());
		let mut out = Matrix::zero(self.nrows(), other.ncols());
		for i in 0..self.nrows() {
			for k in 0..self.ncols {
				if self.rows[i][k].is_zero() {
					continue;
				}
				for j in 0..other.ncols() {
					let add = &self.rows[i][k] * &other.rows[k][j];
					out.rows[i][j] += &add;
				}
			}
		}
		out
	}

	/// Left Hermite normal form by elementary column operations.
	///
	/// Returns `(h, u)` with `self · u == h`, `u` unimodular (built purely
	/// from column swaps, negations and integer combinations, each of
	/// which has an inverse of the same kind). `h`'s first `rank` columns
	/// are non-zero only in at most `rank` rows in total and every column
	/// from `rank` onward is entirely zero; `rank` is the row-rank of
	/// `self`.
	pub fn left_hermite(&self) -> (Matrix, Matrix) {
		let mut h = self.clone();
		let mut u = Matrix::identity(self.ncols);
		let mut rank = 0;
		for r in 0..h.nrows() {
			if rank >= h.ncols {
				break;
			}
			// Reduce row `r` among the not-yet-pivoted columns until at
			// most one of them is non-zero, via a column-wise Euclidean
			// algorithm (mirrors reducing a vector to its gcd).
			loop {
				let nz: Vec<usize> = (rank..h.ncols)
					.filter(|&c| !h.rows[r][c].is_zero())
					.collect();
				if nz.len() <= 1 {
					break;
				}
				let (c1, c2) = (nz[0], nz[1]);
				let (a, b) = (h.rows[r][c1].clone(), h.rows[r][c2].clone());
				// a -= floor(a/b) * b, i.e. standard Euclidean step.
				let q = a.floor_div(&b);
				let neg_q = -q;
				h.combine_col(c1, &neg_q, c2);
				u.combine_col(c1, &neg_q, c2);
			}
			if let Some(&pivot) = (rank..h.ncols).find(|&c| !h.rows[r][c].is_zero()).as_ref() {
				h.swap_cols(rank, pivot);
				u.swap_cols(rank, pivot);
				if h.rows[r][rank].is_negative() {
					h.negate_col(rank);
					u.negate_col(rank);
				}
				rank += 1;
			}
		}
		(h, u)
	}

	/// Fraction-free (Bareiss) solve of the square system `self · x = rhs`.
	///
	/// Returns `(numerators, denom)` such that `self · numerators == denom
	/// · rhs`, with `denom = det(self)` up to sign, or `None` if `self` is
	/// singular.
	pub fn solve_square(&self, rhs: &[Int]) -> Option<(Vec<Int>, Int)> {
		let n = self.nrows();
		debug_assert_eq!(self.ncols, n, "solve_square: matrix must be square");
		debug_assert_eq!(rhs.len(), n);
		// Augment with the RHS as an extra column and run fraction-free
		// Gauss-Jordan elimination (Bareiss), tracking the pivot product as
		// the running denominator.
		let mut a: Vec<Vec<Int>> = self
			.rows
			.iter()
			.zip(rhs.iter())
			.map(|(row, b)| {
				let mut r = row.clone();
				r.push(b.clone());
				r
			})
			.collect();
		let mut prev_pivot = Int::one();
		for k in 0..n {
			// Partial pivot: find a non-zero entry in column k at or below
			// row k.
			let pivot_row = (k..n).find(|&i| !a[i][k].is_zero())?;
			if pivot_row != k {
				a.swap(k, pivot_row);
				// Swapping two rows flips the sign of the determinant; the
				// Bareiss recurrence below tolerates this because we only
				// ever divide by the (unsigned-tracked) previous pivot, so
				// flip the whole row to keep the sign of the final
				// denominator consistent with `det(self)`.
				for v in &mut a[k] {
					*v = -std::mem::replace(v, Int::zero());
				}
			}
			let pivot = a[k][k].clone();
			for i in 0..n {
				if i == k {
					continue;
				}
				for j in 0..=n {
					if j == k {
						continue;
					}
					let num = &(&a[i][j] * &pivot) - &(&a[i][k] * &a[k][j]);
					a[i][j] = num.exact_div(&prev_pivot);
				}
				a[i][k] = Int::zero();
			}
			prev_pivot = pivot;
		}
		let denom = a[n - 1][n - 1].clone();
		if denom.is_zero() {
			return None;
		}
		// After elimination `a[i][i] == denom` for all `i` (up to sign
		// bookkeeping above) and `a[i][n]` holds `denom * x_i`.
		let nums: Vec<Int> = (0..n).map(|i| a[i][n].clone()).collect();
		Some((nums, denom))
	}

	/// A right inverse of a full row-rank `m x n` matrix (`m <= n`): a
	/// matrix `r` (`n x m`) and a denominator `d` such that `self · r == d
	/// · identity(m)`.
	pub fn right_inverse(&self) -> Option<(Matrix, Int)> {
		let m = self.nrows();
		let (h, u) = self.left_hermite();
		if (0..m).any(|r| (0..m).all(|c| h.row(r)[c].is_zero()) && !h.row(r).iter().all(Int::is_zero))
		{
			// a pivot row had no pivot among the first m columns: not full
			// row rank.
			return None;
		}
		let h1 = Matrix::from_rows((0..m).map(|r| h.row(r)[0..m].to_vec()).collect());
		let mut x1 = Matrix::zero(m, m);
		let mut denom = Int::one();
		for j in 0..m {
			let mut e = vec![Int::zero(); m];
			e[j] = Int::one();
			let (nums, d) = h1.solve_square(&e)?;
			// Re-scale all previously computed columns to a common
			// denominator `lcm`.
			let lcm = denom.lcm(&d);
			let scale_old = lcm.exact_div(&denom);
			let scale_new = lcm.exact_div(&d);
			if !scale_old.is_one() {
				for col in 0..j {
					for row in 0..m {
						x1.rows[row][col] = &x1.rows[row][col] * &scale_old;
					}
				}
			}
			for row in 0..m {
				x1.rows[row][j] = &nums[row] * &scale_new;
			}
			denom = lcm;
		}
		// r = U * [x1; 0]
		let mut full = Matrix::zero(u.ncols(), m);
		for row in 0..m {
			for col in 0..m {
				full.rows[row][col] = x1.rows[row][col].clone();
			}
		}
		let r = u.mul_mat(&full);
		Some((r, denom))
	}
}

/// The result of compressing a contiguous block of `ncols` columns of a
/// variable (or parameter) space using a matrix of equalities that
/// involve only those columns, following `isl_equalities.c`.
#[derive(Clone, Debug)]
pub struct Compression {
	/// Whether the system has any integer solution at all.
	pub feasible: bool,
	/// Base point `x0` (numerator vector) such that `x = x0 + u2 · x'`, as
	/// a fraction with `denom`.
	pub offset_num: Vec<Int>,
	/// Common denominator of `offset_num`. Always `1` when `feasible`, kept
	/// as a field so the non-integral case can be represented uniformly.
	pub denom: Int,
	/// Number of free transformed variables `x'` (columns of `u2`).
	pub rank_free: usize,
	/// The `u2` block of the unimodular completion: columns to express `x`
	/// in terms of the free `x'`.
	pub u2: Matrix,
	/// The `u1` block (used to map `x'` values back when only a subset of
	/// the compression is required, e.g. [`Compression::forward`]).
	pub u1: Matrix,
}

impl Compression {
	/// Compute the compression of `ncols` variables subject to the
	/// equalities `eq` (each row is `[const | var_1 .. var_ncols]`, i.e.
	/// `const + var·v = 0`).
	///
	/// Precondition: the rows of `eq` are linearly independent (callers
	/// run Gaussian elimination first, exactly as `isl_equalities.c`'s
	/// `isl_basic_set_remove_equalities` runs `isl_basic_set_gauss` before
	/// `compress_variables`).
	pub fn compute(eq: &Matrix, ncols: usize) -> Self {
		let n_eq = eq.nrows();
		if n_eq == 0 {
			return Self {
				feasible: true,
				offset_num: vec![Int::zero(); ncols],
				denom: Int::one(),
				rank_free: ncols,
				u2: Matrix::identity(ncols),
				u1: Matrix::zero(ncols, 0),
			};
		}
		debug_assert!(n_eq <= ncols, "more independent equalities than variables");
		let m = Matrix::from_rows(
			(0..n_eq)
				.map(|r| eq.row(r)[1..1 + ncols].to_vec())
				.collect(),
		);
		let c: Vec<Int> = (0..n_eq).map(|r| -eq.row(r)[0].clone()).collect();
		let (h, u) = m.left_hermite();
		let rank = (0..ncols)
			.filter(|&col| (0..n_eq).any(|r| !h.row(r)[col].is_zero()))
			.count();
		debug_assert_eq!(rank, n_eq, "equality rows were not linearly independent");

		let h1 = Matrix::from_rows((0..n_eq).map(|r| h.row(r)[0..n_eq].to_vec()).collect());
		let u1 = Matrix::from_rows((0..ncols).map(|r| u.row(r)[0..n_eq].to_vec()).collect());
		let u2 = Matrix::from_rows((0..ncols).map(|r| u.row(r)[n_eq..ncols].to_vec()).collect());

		let Some((x1_num, denom)) = h1.solve_square(&c) else {
			return Self {
				feasible: false,
				offset_num: vec![Int::zero(); ncols],
				denom: Int::one(),
				rank_free: ncols - n_eq,
				u2,
				u1,
			};
		};
		let feasible = denom.is_one() || x1_num.iter().all(|v| (v % &denom).is_zero());
		let (x1_num, denom) = if feasible && !denom.is_one() {
			(x1_num.iter().map(|v| v.exact_div(&denom)).collect(), Int::one())
		} else {
			(x1_num, denom)
		};
		let offset_num = u1.mul_vec(&x1_num);
		Self {
			feasible,
			offset_num,
			denom,
			rank_free: ncols - n_eq,
			u2,
			u1,
		}
	}

	/// Map free variables `x'` back to the original `x = x0 + u2 x'`, only
	/// valid when `self.feasible` and `self.denom.is_one()`.
	pub fn pull_back(&self, free: &[Int]) -> Vec<Int> {
		debug_assert!(self.feasible && self.denom.is_one());
		let shifted = self.u2.mul_vec(free);
		self.offset_num
			.iter()
			.zip(shifted.iter())
			.map(|(a, b)| a + b)
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn row(xs: &[i64]) -> Vec<Int> {
		xs.iter().map(|&x| Int::from(x)).collect()
	}

	#[test]
	fn hermite_identity_on_invertible() {
		// [[2,0],[0,3]] is already in Hermite form (rank 2).
		let m = Matrix::from_rows(vec![row(&[2, 0]), row(&[0, 3])]);
		let (h, u) = m.left_hermite();
		let prod = m.mul_mat(&u);
		assert_eq!(prod, h);
	}

	#[test]
	fn hermite_reduces_row() {
		// single equality 2x + 3y = 0: gcd(2,3) = 1, so H has a single
		// non-zero pivot column.
		let m = Matrix::from_rows(vec![row(&[2, 3])]);
		let (h, u) = m.left_hermite();
		let prod = m.mul_mat(&u);
		assert_eq!(prod, h);
		let nonzero_cols = (0..2).filter(|&c| !h.row(0)[c].is_zero()).count();
		assert_eq!(nonzero_cols, 1);
	}

	#[test]
	fn solve_square_basic() {
		// [[1,1],[0,1]] x = [3,2] => x = [1,2]
		let m = Matrix::from_rows(vec![row(&[1, 1]), row(&[0, 1])]);
		let (nums, denom) = m.solve_square(&row(&[3, 2])).unwrap();
		assert_eq!(denom, Int::from(1));
		assert_eq!(nums, row(&[1, 2]));
	}

	#[test]
	fn compression_single_equality() {
		// y = 3x  =>  -3x + y = 0. Compress 2 variables under 1 equality:
		// one free direction remains.
		let eq = Matrix::from_rows(vec![row(&[0, -3, 1])]);
		let comp = Compression::compute(&eq, 2);
		assert!(comp.feasible);
		assert_eq!(comp.rank_free, 1);
	}
}
