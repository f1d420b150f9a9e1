//! Finding one integer point in a basic set's feasible region.
//!
//! The pipeline follows the same shape as the real generalised-basis-
//! reduction search: compress away the equalities first (Hermite normal
//! form via [`crate::matrix::Compression`], exactly `isl_equalities.c`'s
//! `isl_basic_set_remove_equalities`), leaving a reduced system over the
//! free variables only. When every free variable is individually
//! bounded (checked with [`Tableau::min`]/[`Tableau::max`]), a
//! depth-first branch-and-bound scan over the simplex relaxation (split
//! on the first fractional coordinate of the current feasible point,
//! recurse, snapshot/rollback) is exact and always terminates — no
//! basis reduction is needed when the axes already bound the region.
//!
//! When some axis is unbounded, [`reduced_basis`] runs a real (if
//! scoped-down) Cook-Pugh-Rubin reduction: starting from the identity
//! basis, it repeatedly combines adjacent direction vectors and swaps
//! them forward whenever the combination is thinner (epsilon = 1/4,
//! same constant the original algorithm uses), so a recession direction
//! that isn't axis-aligned (e.g. `x + y` bounded while `x` and `y`
//! individually aren't) still gets discovered and isolated instead of
//! defeating every axis bound at once. The real algorithm reads its
//! combining multiplier directly off the dual simplex basis
//! (`GBR_lp_get_alpha`); lacking that readout, this instead scans a
//! bounded neighbourhood of multipliers and keeps the one giving the
//! thinnest combination — width is convex in the multiplier, so this
//! finds the true minimiser whenever it falls inside the window. Once
//! every basis direction is individually bounded, the same
//! branch-and-bound scan from above runs over those directions instead
//! of the raw axes. If a combination of all `n` directions still
//! leaves some direction unbounded (a genuine recession direction),
//! the scan is retried inside a box of growing radius along just that
//! remaining direction, around a rational feasible point; this last
//! resort is a heuristic and can in principle miss a point only
//! reachable outside the largest box tried.
//!
//! A sample found is cached on the basic set ([`BasicMap::set_cached_sample`])
//! for reuse.

use tracing::trace;

use crate::{
	basic_map::BasicMap,
	int::Int,
	matrix::{Compression, Matrix},
	options::Ctx,
	space::Space,
	tableau::{LpOutcome, Rat, Tableau},
	vector::Vector,
};

const BOX_DOUBLINGS: u32 = 24;
/// How far from zero [`best_combining_multiplier`] scans for the
/// width-minimising combining multiplier.
const GBR_MU_RADIUS: i64 = 16;
/// Safety cap on [`reduced_basis`]'s outer reduction loop, in case a
/// multiplier outside the scan window stalls progress.
const GBR_ROUND_CAP: usize = 256;

fn dot(a: &[Int], b: &[Int]) -> Int {
	a.iter().zip(b.iter()).fold(Int::zero(), |acc, (x, y)| &acc + &(x * y))
}

/// Re-express `row` (over the original `ncols` variables) over the free
/// variables `x'` of `comp`, using `x = x0 + u2 x'`:
/// `row(x) = (c + a·x0) + (a·u2)·x'`.
fn transform_inequality(row: &Vector, comp: &Compression) -> Vector {
	let a = &row.as_slice()[1..];
	let c = &row.as_slice()[0];
	let shift = dot(a, &comp.offset_num);
	let mut out = Vec::with_capacity(1 + comp.rank_free);
	out.push(c + &shift);
	for col in 0..comp.rank_free {
		let column: Vec<Int> = (0..a.len()).map(|row_idx| comp.u2.row(row_idx)[col].clone()).collect();
		out.push(dot(a, &column));
	}
	Vector::from_vec(out)
}

/// Bounds (ceil of the LP min, floor of the LP max) for each variable of
/// `tab`, `None` on a side that is unbounded.
fn variable_bounds(tab: &Tableau) -> Vec<(Option<Int>, Option<Int>)> {
	(0..tab.n_var())
		.map(|i| {
			let mut e = vec![Int::zero(); tab.n_var() + 1];
			e[i + 1] = Int::one();
			let unit = Vector::from_vec(e);
			let lo = match tab.min(&unit) {
				(LpOutcome::Ok, Some(v)) => Some(v.ceil()),
				_ => None,
			};
			let hi = match tab.max(&unit) {
				(LpOutcome::Ok, Some(v)) => Some(v.floor()),
				_ => None,
			};
			(lo, hi)
		})
		.collect()
}

fn unit_row(n: usize, i: usize, coeff: i64, constant: Int) -> Vector {
	let mut row = vec![Int::zero(); n + 1];
	row[0] = constant;
	row[i + 1] = Int::from(coeff);
	Vector::from_vec(row)
}

/// Exact branch-and-bound over `tab`'s current feasible region: `true`
/// recursion on the first fractional coordinate of a feasible point,
/// guaranteed to terminate whenever `tab` is bounded in every direction
/// (each branch strictly narrows the range of the chosen coordinate).
fn dfs(tab: &mut Tableau, depth: u32) -> Option<Vec<Rat>> {
	let point = tab.get_sample_value()?;
	let Some(i) = point.iter().position(|v| !v.is_integer()) else {
		trace!(depth, "branch and bound found an integer point");
		return Some(point);
	};
	let v = &point[i];
	trace!(depth, coordinate = i, "splitting on fractional coordinate");
	let n = tab.n_var();
	let snap = tab.snap();
	tab.add_inequality(&unit_row(n, i, -1, v.floor()));
	if let Some(found) = dfs(tab, depth + 1) {
		return Some(found);
	}
	tab.rollback(snap);
	tab.add_inequality(&unit_row(n, i, 1, -v.ceil()));
	let found = dfs(tab, depth + 1);
	tab.rollback(snap);
	found
}

/// Value of affine row `row` (`[const | coeffs]`) at `point`.
fn eval_row_at(row: &Vector, point: &[Rat]) -> Rat {
	let s = row.as_slice();
	let mut acc = Rat::from_int(s[0].clone());
	for (c, v) in s[1..].iter().zip(point.iter()) {
		acc = acc.add(&Rat::from_int(c.clone()).mul(v));
	}
	acc
}

/// Constraint row encoding `row(x) <= bound`, i.e. `bound - row(x) >= 0`.
fn le_constraint(row: &Vector, bound: &Int) -> Vector {
	let s = row.as_slice();
	let mut out = Vec::with_capacity(s.len());
	out.push(bound - &s[0]);
	out.extend(s[1..].iter().map(|c| -c));
	Vector::from_vec(out)
}

/// Constraint row encoding `row(x) >= bound`, i.e. `row(x) - bound >= 0`.
fn ge_constraint(row: &Vector, bound: &Int) -> Vector {
	let s = row.as_slice();
	let mut out = Vec::with_capacity(s.len());
	out.push(&s[0] - bound);
	out.extend(s[1..].iter().cloned());
	Vector::from_vec(out)
}

/// Exact branch-and-bound like [`dfs`], but splits on the first entry
/// of `dirs` whose value at the current sample point is fractional,
/// instead of on a raw coordinate. Used once some coordinates are
/// unbounded individually but the reduced basis directions are not.
fn dfs_on_directions(tab: &mut Tableau, dirs: &[Vector], depth: u32) -> Option<Vec<Rat>> {
	let point = tab.get_sample_value()?;
	let Some(i) = dirs.iter().position(|d| !eval_row_at(d, &point).is_integer()) else {
		trace!(depth, "direction branch and bound found an integer point");
		return Some(point);
	};
	let val = eval_row_at(&dirs[i], &point);
	trace!(depth, direction = i, "splitting on fractional direction value");
	let snap = tab.snap();
	tab.add_inequality(&le_constraint(&dirs[i], &val.floor()));
	if let Some(found) = dfs_on_directions(tab, dirs, depth + 1) {
		return Some(found);
	}
	tab.rollback(snap);
	tab.add_inequality(&ge_constraint(&dirs[i], &val.ceil()));
	let found = dfs_on_directions(tab, dirs, depth + 1);
	tab.rollback(snap);
	found
}

/// Width of `tab`'s feasible region along `dir` (`max - min` of `dir`'s
/// support function), `None` if `dir` is unbounded on either side.
fn width(tab: &Tableau, dir: &Vector) -> Option<Rat> {
	let (lo_out, lo) = tab.min(dir);
	let (hi_out, hi) = tab.max(dir);
	match (lo_out, hi_out, lo, hi) {
		(LpOutcome::Ok, LpOutcome::Ok, Some(lo), Some(hi)) => Some(hi.sub(&lo)),
		_ => None,
	}
}

fn direction_row(n: usize, dir: &[Int]) -> Vector {
	let mut row = vec![Int::zero(); n + 1];
	row[1..].clone_from_slice(dir);
	Vector::from_vec(row)
}

fn combine(base: &[Int], mu: &Int, add: &[Int]) -> Vec<Int> {
	base.iter().zip(add.iter()).map(|(b, a)| b + &(mu * a)).collect()
}

/// Find the integer multiplier `mu` minimising the width of `base + mu *
/// add`, scanning a bounded neighbourhood of zero. Width is convex in
/// `mu` (a difference of a max and a min, each affine in `mu`), so in
/// principle a ternary search locates the exact minimiser in a
/// logarithmic number of LPs the way the real algorithm's dual-simplex
/// `alpha` readout does in one; scanning a bounded window instead is
/// simpler and still finds the minimiser whenever it falls within the
/// window. A minimiser outside the window is the one case this can
/// miss — the basis returned is still a valid (unimodular) one, just
/// not as fully reduced as the real algorithm's.
fn best_combining_multiplier(
	tab: &Tableau,
	base: &[Int],
	add: &[Int],
	n: usize,
	base_width: Option<Rat>,
) -> (Int, Option<Rat>) {
	let mut best_mu = Int::zero();
	let mut best_w = base_width;
	for k in -GBR_MU_RADIUS..=GBR_MU_RADIUS {
		if k == 0 {
			continue;
		}
		let mu = Int::from(k);
		let cand = combine(base, &mu, add);
		let w = width(tab, &direction_row(n, &cand));
		if let Some(w_val) = &w {
			let better = match &best_w {
				Some(b) => w_val < b,
				None => true,
			};
			if better {
				best_w = w.clone();
				best_mu = mu;
			}
		}
	}
	(best_mu, best_w)
}

/// Cook-Pugh-Rubin-style basis reduction (epsilon = 1/4), adapted to use
/// this crate's own [`Tableau::min`]/[`Tableau::max`] as the width
/// oracle in place of the dual-simplex alpha coefficients the original
/// algorithm reads directly off a live LP tableau (see the module doc).
/// Starts from the identity basis and repeatedly combines adjacent
/// direction vectors, swapping a combination forward whenever it is
/// thinner, until every direction is locally no wider than the one
/// before it or the round budget runs out. Returns the basis as `n`
/// integer direction vectors alongside each direction's own width
/// (`None` when a direction is unbounded); a basis returned early (round
/// cap, or `only_first`) is still a valid unimodular basis, just not
/// necessarily fully reduced past the point it stopped at.
///
/// `only_first` mirrors [`crate::options::Options::gbr_only_first`]:
/// stop as soon as the first direction's width drops below `2`, for a
/// caller that only needs one thin cutting direction rather than a full
/// reduction.
fn reduced_basis(tab: &Tableau, only_first: bool) -> (Vec<Vec<Int>>, Vec<Option<Rat>>) {
	let n = tab.n_var();
	let mut basis: Vec<Vec<Int>> = (0..n)
		.map(|i| {
			let mut row = vec![Int::zero(); n];
			row[i] = Int::one();
			row
		})
		.collect();
	let mut f: Vec<Option<Rat>> = (0..n).map(|_| None).collect();
	if n == 0 {
		return (basis, f);
	}
	f[0] = width(tab, &direction_row(n, &basis[0]));
	if n > 1 {
		let two = Rat::from_int(Int::from(2));
		let mut i = 0usize;
		let mut rounds = 0usize;
		while i < n - 1 && rounds < GBR_ROUND_CAP {
			rounds += 1;
			let next_width = width(tab, &direction_row(n, &basis[i + 1]));
			let (mu, f_new) = best_combining_multiplier(tab, &basis[i + 1], &basis[i], n, next_width);
			basis[i + 1] = combine(&basis[i + 1], &mu, &basis[i]);
			f[i + 1] = f_new.clone();

			let swap = match (&f_new, &f[i]) {
				(Some(new_w), Some(old_w)) => new_w.mul(&Rat::from_int(Int::from(4))) < old_w.mul(&Rat::from_int(Int::from(3))),
				(Some(_), None) => true,
				_ => false,
			};
			if swap {
				basis.swap(i, i + 1);
				f.swap(i, i + 1);
				if i > 0 {
					i -= 1;
				} else if only_first && matches!(&f[0], Some(w) if *w < two) {
					break;
				}
			} else {
				i += 1;
			}
		}
	}
	for (j, slot) in f.iter_mut().enumerate() {
		if slot.is_none() {
			*slot = width(tab, &direction_row(n, &basis[j]));
		}
	}
	(basis, f)
}

/// Find an integer point of the system `rows` defines over `n_var`
/// free variables, `None` if none exists (or, for an unbounded system,
/// none was found within the search budget).
fn solve_free(rows: &[Vector], n_var: usize, ctx: &Ctx) -> Option<Vec<Int>> {
	let space = Space::set_alloc(0, n_var);
	let mut b = BasicMap::alloc(space, 0, 0, 0, rows.len());
	for row in rows {
		b.add_inequality_row(row.clone());
	}
	let tab = Tableau::from_basic_map(&b, ctx);
	if tab.is_empty() {
		return None;
	}
	let bounds = variable_bounds(&tab);
	let mut scoped = tab.clone();
	if bounds.iter().all(|(lo, hi)| lo.is_some() && hi.is_some()) {
		return dfs(&mut scoped, 0).map(|p| p.iter().map(|r| r.floor()).collect());
	}

	if !ctx.options.gbr {
		let center = tab.get_sample_value()?;
		let mut radius = Int::from(1);
		for _ in 0..BOX_DOUBLINGS {
			let mut boxed = tab.clone();
			for (i, (lo, hi)) in bounds.iter().enumerate() {
				let c = center[i].floor();
				if lo.is_none() {
					boxed.add_inequality(&unit_row(n_var, i, 1, &(-&c) - &radius));
				}
				if hi.is_none() {
					boxed.add_inequality(&unit_row(n_var, i, -1, &c + &radius));
				}
			}
			if let Some(p) = dfs(&mut boxed, 0) {
				return Some(p.iter().map(|r| r.floor()).collect());
			}
			trace!(radius = %radius, "box search found nothing, doubling radius");
			radius = &radius * &Int::from(2);
		}
		return None;
	}

	let (basis, widths) = reduced_basis(&tab, ctx.options.gbr_only_first);
	let dirs: Vec<Vector> = basis.iter().map(|dir| direction_row(n_var, dir)).collect();
	let mut scoped = tab.clone();
	let mut all_bounded = true;
	for (dir, w) in dirs.iter().zip(widths.iter()) {
		if w.is_none() {
			all_bounded = false;
			continue;
		}
		let (lo_out, lo) = tab.min(dir);
		let (hi_out, hi) = tab.max(dir);
		match (lo_out, hi_out, lo, hi) {
			(LpOutcome::Ok, LpOutcome::Ok, Some(lo), Some(hi)) => {
				scoped.add_inequality(&ge_constraint(dir, &lo.ceil()));
				scoped.add_inequality(&le_constraint(dir, &hi.floor()));
			}
			_ => all_bounded = false,
		}
	}
	if all_bounded {
		return dfs_on_directions(&mut scoped, &dirs, 0).map(|p| p.iter().map(|r| r.floor()).collect());
	}

	trace!("reduced basis still has an unbounded direction, falling back to box growth");
	let center = tab.get_sample_value()?;
	let mut radius = Int::from(1);
	for _ in 0..BOX_DOUBLINGS {
		let mut boxed = scoped.clone();
		for (dir, w) in dirs.iter().zip(widths.iter()) {
			if w.is_some() {
				continue;
			}
			let c = eval_row_at(dir, &center).floor();
			boxed.add_inequality(&ge_constraint(dir, &(&c - &radius)));
			boxed.add_inequality(&le_constraint(dir, &(&c + &radius)));
		}
		if let Some(p) = dfs_on_directions(&mut boxed, &dirs, 0) {
			return Some(p.iter().map(|r| r.floor()).collect());
		}
		trace!(radius = %radius, "direction box search found nothing, doubling radius");
		radius = &radius * &Int::from(2);
	}
	None
}

/// Find one integer point of `b`'s feasible region, caching it on
/// success. `None` if `b` has no integer point (or, for an unbounded
/// basic set, none was found within the search budget).
pub fn find_integer_point(b: &mut BasicMap, ctx: &Ctx) -> Option<Vec<Int>> {
	if let Some(cached) = b.cached_sample() {
		return Some(cached.as_slice().to_vec());
	}
	let ncols = b.width() - 1;
	let eq = Matrix::from_rows(b.equalities().iter().map(|r| r.as_slice().to_vec()).collect());
	let comp = Compression::compute(&eq, ncols);
	if !comp.feasible {
		return None;
	}
	let rows: Vec<Vector> = b.inequalities().iter().map(|r| transform_inequality(r, &comp)).collect();
	let free = solve_free(&rows, comp.rank_free, ctx)?;
	let full = comp.pull_back(&free);
	let structural = full[..b.space().width() - 1].to_vec();
	b.set_cached_sample(Vector::from_vec(structural.clone()));
	Some(structural)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn row(xs: &[i64]) -> Vector {
		Vector::from_vec(xs.iter().map(|&x| Int::from(x)).collect())
	}

	#[test]
	fn finds_point_in_a_box() {
		let ctx = Ctx::default();
		let mut b = BasicMap::alloc(Space::set_alloc(0, 2), 0, 0, 0, 0);
		b.add_inequality_row(row(&[0, 1, 0])); // x >= 0
		b.add_inequality_row(row(&[5, -1, 0])); // x <= 5
		b.add_inequality_row(row(&[0, 0, 1])); // y >= 0
		b.add_inequality_row(row(&[5, 0, -1])); // y <= 5
		let p = find_integer_point(&mut b, &ctx).expect("bounded box has integer points");
		assert!(b.contains_point(&p));
	}

	#[test]
	fn equality_forces_a_coordinate() {
		let ctx = Ctx::default();
		let mut b = BasicMap::alloc(Space::set_alloc(0, 2), 0, 0, 0, 0);
		b.add_equality_row(row(&[-3, 1, 0])); // x = 3
		b.add_inequality_row(row(&[0, 0, 1])); // y >= 0
		b.add_inequality_row(row(&[2, 0, -1])); // y <= 2
		let p = find_integer_point(&mut b, &ctx).expect("feasible");
		assert_eq!(p[0], Int::from(3));
		assert!(b.contains_point(&p));
	}

	#[test]
	fn unsatisfiable_equality_is_empty() {
		let ctx = Ctx::default();
		let mut b = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		// 2x = 1 has no integer solution.
		b.add_equality_row(row(&[-1, 2]));
		assert!(find_integer_point(&mut b, &ctx).is_none());
	}

	#[test]
	fn empty_region_yields_none() {
		let ctx = Ctx::default();
		let mut b = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[-5, 1])); // x >= 5
		b.add_inequality_row(row(&[3, -1])); // x <= 3
		assert!(find_integer_point(&mut b, &ctx).is_none());
	}

	/// `x + y` confined to `[-10, 10]` but `x` and `y` individually
	/// unbounded (take `y = -x`): the reduced basis must discover the
	/// bounded combined direction instead of growing an axis box forever.
	#[test]
	fn gbr_finds_a_point_along_a_non_axis_bounded_direction() {
		let ctx = Ctx::default();
		let mut b = BasicMap::alloc(Space::set_alloc(0, 2), 0, 0, 0, 0);
		b.add_inequality_row(row(&[10, 1, 1])); // x + y >= -10
		b.add_inequality_row(row(&[10, -1, -1])); // x + y <= 10
		let p = find_integer_point(&mut b, &ctx).expect("bounded along x+y even though x, y individually are not");
		assert!(b.contains_point(&p));
	}

	#[test]
	fn gbr_disabled_still_finds_a_point_via_axis_box_growth() {
		let mut ctx = Ctx::default();
		ctx.options.gbr = false;
		let mut b = BasicMap::alloc(Space::set_alloc(0, 2), 0, 0, 0, 0);
		b.add_inequality_row(row(&[10, 1, 1]));
		b.add_inequality_row(row(&[10, -1, -1]));
		let p = find_integer_point(&mut b, &ctx).expect("axis box growth alone still finds a point here");
		assert!(b.contains_point(&p));
	}

	#[test]
	fn reduced_basis_discovers_a_bounded_combination() {
		let ctx = Ctx::default();
		let mut b = BasicMap::alloc(Space::set_alloc(0, 2), 0, 0, 0, 0);
		b.add_inequality_row(row(&[10, 1, 1]));
		b.add_inequality_row(row(&[10, -1, -1]));
		let tab = Tableau::from_basic_map(&b, &ctx);
		// neither raw axis is bounded on its own.
		assert!(width(&tab, &direction_row(2, &[Int::one(), Int::zero()])).is_none());
		assert!(width(&tab, &direction_row(2, &[Int::zero(), Int::one()])).is_none());
		let (basis, widths) = reduced_basis(&tab, false);
		let idx = widths.iter().position(|w| w.is_some()).expect("some direction should come out bounded after reduction");
		let dir = direction_row(2, &basis[idx]);
		assert_eq!(width(&tab, &dir), widths[idx].clone());
	}

	#[test]
	fn gbr_only_first_still_terminates_and_finds_a_point() {
		let mut ctx = Ctx::default();
		ctx.options.gbr_only_first = true;
		let mut b = BasicMap::alloc(Space::set_alloc(0, 2), 0, 0, 0, 0);
		b.add_inequality_row(row(&[10, 1, 1]));
		b.add_inequality_row(row(&[10, -1, -1]));
		let p = find_integer_point(&mut b, &ctx).expect("stopping after the first reduced direction still finds a point");
		assert!(b.contains_point(&p));
	}
}
