//! Parametric integer programming: the lexicographic minimum of a
//! basic map's output dimensions, as a function of its parameters and
//! input dimensions.
//!
//! The real algorithm runs a parametric dual simplex: each pivot step
//! either proceeds uniformly over the whole parameter domain or, when
//! a pivot's sign depends on the parameters, splits the domain in two
//! and recurses on each half, building a tree of case splits (a
//! "quast") whose leaves are the affine expressions selected in each
//! region. This module computes the same result by a cruder route that
//! needs no simplex at all: lex-minimizing output dimension `i` in
//! isolation, for fixed values of dimensions `0..i`, is exactly "the
//! largest of the dimension's lower-bound constraints" — so each
//! dimension is fixed in turn by projecting the later dimensions away
//! (Fourier-Motzkin, [`crate::basic_map::BasicMap::project_out`]),
//! collecting the surviving lower bounds, and splitting the parameter
//! domain by a linear sweep over which bound is largest where. No
//! explicit quast tree is kept; each case-split region becomes one
//! disjunct of the output map directly, which is the flattened form
//! the real algorithm produces anyway.
//!
//! A bound with a unit coefficient on the dimension being fixed is
//! already an integer affine expression in the parameters, so it can
//! be used as a candidate directly. A bound with any other positive
//! coefficient `a` (`a*x + rest >= 0`, i.e. `x >= -rest/a`) needs the
//! real algorithm's auxiliary-div rounding step: the tightest integer
//! bound is `x >= -floor(rest/a)`, which this module represents
//! exactly the way [`isl_basic_map_add_div`'s `add_div_constraints`][1]
//! does, by introducing a fresh existential div `d = floor(rest/a)`
//! (`BasicMap::add_div`, plus its usual pair of defining inequalities)
//! and using the now-unit-coefficient row `x + d >= 0` as the
//! candidate in its place. `b_in` is still assumed to carry no
//! existential divs of its own on entry (`n_div() == 0`) — only the
//! divs this module introduces itself are supported mid-recursion.
//!
//! [1]: the isl source's `add_div_constraints`, which this module's
//! `add_div_defining_constraints` mirrors line for line.

use crate::{basic_map::BasicMap, int::Int, options::Ctx, set::Map, space::DimKind, vector::Vector};

fn negate(v: &Vector) -> Vector {
	Vector::from_vec(v.as_slice().iter().map(|x| -x).collect())
}

fn sub_vec(a: &Vector, b: &Vector) -> Vector {
	Vector::from_vec(a.as_slice().iter().zip(b.as_slice().iter()).map(|(x, y)| x - y).collect())
}

fn shift_const(v: &Vector, delta: i64) -> Vector {
	let mut s = v.as_slice().to_vec();
	s[0] = &s[0] + &Int::from(delta);
	Vector::from_vec(s)
}

fn pad(v: &Vector, zeros: usize) -> Vector {
	let mut s = v.as_slice().to_vec();
	s.extend(std::iter::repeat(Int::zero()).take(zeros));
	Vector::from_vec(s)
}

/// Eliminate `col` from every row of `b` using `fix` (whose coefficient
/// at `col` is `1`) as the pivot, keeping `fix` itself as an equality:
/// `row <- row - row[col] * fix` zeroes `col` in every other row
/// without touching the pinned value `fix` encodes.
fn substitute_column(b: &BasicMap, fix: &Vector, col: usize) -> BasicMap {
	let adjust = |row: &Vector| -> Vector {
		// `fix` itself must survive untouched, or the pinned value it
		// records would be substituted straight to zero.
		if row == fix {
			return row.clone();
		}
		let c = row[col].clone();
		if c.is_zero() {
			return row.clone();
		}
		Vector::from_vec(row.as_slice().iter().zip(fix.as_slice().iter()).map(|(x, f)| x - &(&c * f)).collect())
	};
	let eqs: Vec<Vector> = b.equalities().iter().map(adjust).collect();
	let ineqs: Vec<Vector> = b.inequalities().iter().map(adjust).collect();
	let mut out = BasicMap::alloc(b.space().clone(), 0, 0, 0, eqs.len() + ineqs.len());
	// Divs never depend on the column being eliminated here (each one's
	// defining row was built with that column zeroed out, see
	// `add_div_defining_constraints`'s caller), so they just carry over;
	// `out` needs its own copies before the eqs/ineqs rows are added,
	// since those rows already include the div columns' width.
	for d in b.divs() {
		let _ = out.add_div(d.denom.clone(), d.row.as_slice().to_vec());
	}
	for r in eqs {
		out.add_equality_row(r);
	}
	for r in ineqs {
		out.add_inequality_row(r);
	}
	out
}

/// Normalize an equality row so its `col` coefficient is exactly `1`
/// (it is known to be `1` or `-1`).
fn normalize_unit(row: &Vector, col: usize) -> Vector {
	if row[col].is_one() { row.clone() } else { negate(row) }
}

/// Partition the parameter domain by which of `bounds` (const+param
/// vectors, one per lower-bound candidate) is largest, via a linear
/// sweep: start with candidate `0` as the provisional winner, then for
/// each later candidate split every live region into "this candidate
/// is now strictly ahead" and "the previous winner stays ahead".
/// Returns `(extra inequalities pinning the winner, winning index)`
/// pairs that partition the whole domain.
fn winner_regions(bounds: &[Vector]) -> Vec<(Vec<Vector>, usize)> {
	// `bounds[i]` is the full constraint row `c + a*params + 1*out >=
	// 0`, i.e. `out >= L_i` with `L_i = -(c + a*params)`. So `L_k -
	// L_best` is the *negated* difference of the rows' non-`out` parts,
	// which is exactly `bounds[best] - bounds[k]` (their `out`
	// coefficients are both `1` and cancel).
	let mut regions: Vec<(Vec<Vector>, usize)> = vec![(Vec::new(), 0)];
	for k in 1..bounds.len() {
		let mut next = Vec::with_capacity(regions.len() * 2);
		for (extra, best) in regions {
			let l_diff = sub_vec(&bounds[best], &bounds[k]); // L_k - L_best
			let mut wins = extra.clone();
			wins.push(shift_const(&l_diff, -1)); // L_k - L_best - 1 >= 0
			next.push((wins, k));
			let mut stays = extra;
			stays.push(negate(&l_diff)); // L_best - L_k >= 0
			next.push((stays, best));
		}
		regions = next;
	}
	regions
}

/// `row` with its `col` entry zeroed: the part of a bound constraint
/// that does not depend on the dimension the constraint bounds.
fn zero_at(row: &Vector, col: usize) -> Vector {
	let mut s = row.as_slice().to_vec();
	s[col] = Int::zero();
	Vector::from_vec(s)
}

/// Append the pair of inequalities defining `b`'s `k`-th div as
/// `floor(f/m)`, where `f`/`m` are that div's own stored row/denom:
/// `f - m*d >= 0` and `-f + m*d + (m-1) >= 0`. Mirrors the isl source's
/// `add_div_constraints` (see the module documentation).
fn add_div_defining_constraints(b: &mut BasicMap, k: usize) {
	let div = b.divs()[k].clone();
	let col = b.space().width() + k;
	let mut first = div.row.as_slice().to_vec();
	first[col] = -div.denom.clone();
	let second: Vec<Int> = first.iter().map(|x| -x).collect();
	let mut second = second;
	second[0] = &second[0] + &(&div.denom - &Int::one());
	b.add_inequality_row(Vector::from_vec(first));
	b.add_inequality_row(Vector::from_vec(second));
}

fn lexmin_rec(mut b: BasicMap, coord: usize, np: usize, nv: usize, ctx: &Ctx, out: &mut Vec<BasicMap>) {
	if coord == nv {
		// Safe to tidy up now: nothing downstream needs to find a
		// fixing row again by exact value, unlike mid-recursion where
		// `simplify`'s Gaussian reduction could rewrite it away.
		b.simplify();
		out.push(b);
		return;
	}
	let col = 1 + np + coord;

	if let Some(raw) = b.equalities().iter().find(|r| r[col].is_one() || (-&r[col]).is_one()).cloned() {
		let fix = normalize_unit(&raw, col);
		let mut b_sub = substitute_column(&b, &fix, col);
		if !b_sub.equalities().iter().any(|r| r == &fix) {
			b_sub.add_equality_row(fix);
		}
		lexmin_rec(b_sub, coord + 1, np, nv, ctx, out);
		return;
	}

	let tail_n = nv - coord - 1;
	let tail = if tail_n > 0 { b.project_out(DimKind::Out, coord + 1, tail_n) } else { b.clone() };

	// Any positive coefficient at `col` is a candidate lower bound; a
	// unit one is already the tightest integer bound, a larger one
	// needs rounding through a fresh div (see the module documentation).
	let candidates: Vec<Vector> = tail.inequalities().iter().filter(|r| r[col].is_positive()).cloned().collect();
	if candidates.is_empty() {
		// No lower bound survives in this region at all: this dimension
		// is unbounded below here. The region contributes nothing to
		// the selected map; it ends up in the leftover domain `e`.
		return;
	}

	let mut b_aug = b.clone();
	// Each bound row keeps its `col` coefficient at `1` (the `col`
	// entries are equal across every candidate so they cancel in
	// `winner_regions`' pairwise differences) and is built sparse in
	// the divs it introduces, so a winning candidate is already exactly
	// the equality row `out[coord] - L(params, divs) == 0` once padded
	// out to `b_aug`'s final width.
	let mut bounds: Vec<Vector> = Vec::with_capacity(candidates.len());
	for r in &candidates {
		if r[col].is_one() {
			bounds.push(pad(r, nv - coord - 1));
			continue;
		}
		let a = r[col].clone();
		let rest = zero_at(r, col);
		let deficit = b_aug.width() - rest.len();
		let padded_rest = pad(&rest, deficit);
		let k = b_aug.add_div(a, padded_rest.as_slice().to_vec());
		add_div_defining_constraints(&mut b_aug, k);
		let div_col = b_aug.space().width() + k;
		let mut row = vec![Int::zero(); b_aug.width()];
		row[col] = Int::one();
		row[div_col] = Int::one();
		bounds.push(Vector::from_vec(row));
	}
	// Every div is introduced after its bound row is built, so earlier
	// rows in `bounds` (unit ones, and non-unit ones from earlier in
	// this loop) may be shorter than `b_aug`'s final width; pad them out
	// now that no more divs are coming.
	let final_width = b_aug.width();
	for bound in &mut bounds {
		if bound.len() < final_width {
			*bound = pad(bound, final_width - bound.len());
		}
	}

	for (extra, idx) in winner_regions(&bounds) {
		let mut b_next = b_aug.clone();
		for row in &extra {
			b_next.add_inequality_row(row.clone());
		}
		let fix = bounds[idx].clone();
		b_next.add_equality_row(fix.clone());
		if b_next.is_empty(ctx) {
			continue;
		}
		lexmin_rec(substitute_column(&b_next, &fix, col), coord + 1, np, nv, ctx, out);
	}
}

/// Lexicographic minimum of `b`'s output dimensions over `dom`, a
/// basic set restricting `b`'s parameters and input dimensions
/// (`dom`'s space must be `b`'s space with `n_out` set to `0`).
///
/// Returns `(m, e)`: `m` maps each point of the solved part of `dom`
/// to its lexicographically smallest feasible output tuple (as
/// equalities fixing every output dimension); `e` is the part of
/// `dom` left unsolved, either because `b` is empty there or because
/// some output dimension has no positive-coefficient lower bound there
/// at all (see the module documentation).
pub(crate) fn partial_lexmin(b: &BasicMap, dom: &BasicMap, ctx: &Ctx) -> (Map, Map) {
	let np = b.space().nparam() + b.space().n_in();
	let nv = b.space().n_out();
	debug_assert_eq!(dom.space().width(), 1 + np);
	debug_assert_eq!(b.n_div(), 0, "partial_lexmin does not support divs on its input relation");

	let mut b0 = b.clone();
	for r in dom.equalities() {
		b0.add_equality_row(pad(r, nv));
	}
	for r in dom.inequalities() {
		b0.add_inequality_row(pad(r, nv));
	}
	b0.simplify();

	let mut leaves = Vec::new();
	if !b0.is_empty(ctx) {
		lexmin_rec(b0, 0, np, nv, ctx, &mut leaves);
	}

	let mut m = Map::empty(b.space().clone());
	for leaf in leaves {
		m = m.union(Map::from_basic_map(leaf));
	}
	let solved = m.project_out(DimKind::Out, 0, nv);
	let e = Map::from_basic_map(dom.clone()).subtract(&solved, ctx);
	(m, e)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::space::Space;

	fn row(xs: &[i64]) -> Vector {
		Vector::from_vec(xs.iter().map(|&x| Int::from(x)).collect())
	}

	/// `0 <= x <= n`, one parameter `n`: the lex-min of `x` is always
	/// `0`, for every `n >= 0`.
	#[test]
	fn single_dim_constant_lower_bound() {
		let ctx = Ctx::default();
		// space: 1 param, 0 in, 1 out.
		let mut b = BasicMap::alloc(Space::alloc(1, 0, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[0, 0, 1])); // x >= 0
		b.add_inequality_row(row(&[0, 1, -1])); // n - x >= 0, i.e. x <= n
		let mut dom = BasicMap::alloc(Space::alloc(1, 0, 0), 0, 0, 0, 0);
		dom.add_inequality_row(row(&[0, 1])); // n >= 0
		let (m, e) = partial_lexmin(&b, &dom, &ctx);
		assert!(e.is_empty(&ctx));
		assert_eq!(m.basic_maps().len(), 1);
		let leaf = &m.basic_maps()[0];
		assert!(leaf.equalities().iter().any(|r| r == &row(&[0, 0, 1])));
	}

	/// `x >= n`, `x >= 0`: the lex-min of `x` is `max(n, 0)`, splitting
	/// the parameter domain at `n == 0`.
	#[test]
	fn single_dim_splits_on_parameter_sign() {
		let ctx = Ctx::default();
		let mut b = BasicMap::alloc(Space::alloc(1, 0, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[0, -1, 1])); // x - n >= 0, i.e. x >= n
		b.add_inequality_row(row(&[0, 0, 1])); // x >= 0
		let dom = BasicMap::alloc(Space::alloc(1, 0, 0), 0, 0, 0, 0);
		let (m, e) = partial_lexmin(&b, &dom, &ctx);
		assert!(e.is_empty(&ctx));
		assert_eq!(m.basic_maps().len(), 2);
		for leaf in m.basic_maps() {
			// whichever region, x is pinned to a single affine
			// expression of n by exactly one equality.
			assert_eq!(leaf.equalities().len(), 1);
			let point_n3 = [Int::from(3)];
			let point_nm3 = [Int::from(-3)];
			if leaf.contains_point(&[point_n3[0].clone(), Int::from(3)]) {
				assert!(leaf.contains_point(&[point_n3[0].clone(), Int::from(3)]));
			}
			if leaf.contains_point(&[point_nm3[0].clone(), Int::from(0)]) {
				assert!(leaf.contains_point(&[point_nm3[0].clone(), Int::from(0)]));
			}
		}
	}

	/// Two output dimensions: `x >= 0`, `y >= x`, lex-min is `(0, 0)`.
	#[test]
	fn two_dims_fixed_in_order() {
		let ctx = Ctx::default();
		let mut b = BasicMap::alloc(Space::alloc(0, 0, 2), 0, 0, 0, 0);
		b.add_inequality_row(row(&[0, 1, 0])); // x >= 0
		b.add_inequality_row(row(&[0, -1, 1])); // y - x >= 0
		let dom = BasicMap::alloc(Space::alloc(0, 0, 0), 0, 0, 0, 0);
		let (m, e) = partial_lexmin(&b, &dom, &ctx);
		assert!(e.is_empty(&ctx));
		assert_eq!(m.basic_maps().len(), 1);
		assert!(m.contains_point(&[Int::from(0), Int::from(0)]));
		assert!(!m.contains_point(&[Int::from(1), Int::from(1)]));
	}

	/// `2x + 1 >= 0`, `y >= 0`: the only lower bound on `x` has a
	/// non-unit coefficient (`x >= -1/2`, tightest integer bound `x >=
	/// 0`), which needs the div-rounding path, not the unit-coefficient
	/// shortcut. Lex-min is `(0, 0)`, fully solved.
	#[test]
	fn non_unit_coefficient_lower_bound() {
		let ctx = Ctx::default();
		let mut b = BasicMap::alloc(Space::alloc(0, 0, 2), 0, 0, 0, 0);
		b.add_inequality_row(row(&[1, 2, 0])); // 1 + 2x >= 0
		b.add_inequality_row(row(&[0, 0, 1])); // y >= 0
		let dom = BasicMap::alloc(Space::alloc(0, 0, 0), 0, 0, 0, 0);
		let (m, e) = partial_lexmin(&b, &dom, &ctx);
		assert!(e.is_empty(&ctx), "a non-unit lower bound must still be solved, not left in `e`");
		assert!(m.contains_point(&[Int::from(0), Int::from(0)]));
		assert!(!m.contains_point(&[Int::from(-1), Int::from(0)]));
		assert!(!m.contains_point(&[Int::from(1), Int::from(0)]));
	}

	/// An unbounded dimension (no lower bound at all) leaves the whole
	/// domain in `e`.
	#[test]
	fn unbounded_dimension_is_unsolved() {
		let ctx = Ctx::default();
		let mut b = BasicMap::alloc(Space::alloc(0, 0, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[5, -1])); // x <= 5, no lower bound
		let dom = BasicMap::alloc(Space::alloc(0, 0, 0), 0, 0, 0, 0);
		let (m, e) = partial_lexmin(&b, &dom, &ctx);
		assert!(m.basic_maps().is_empty());
		assert!(!e.is_empty(&ctx));
	}
}
