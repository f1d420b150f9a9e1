//! Affine hull and convex hull of a union of [`BasicMap`]s.
//!
//! **Affine hull** follows the Karr shape: tighten each disjunct's
//! implicit equalities (an inequality an LP proves is tight everywhere,
//! via [`Tableau::detect_implicit_equalities`]), then express the
//! disjunct's equality system as a generator `(point, direction basis)`
//! with [`Compression::compute`] (the same Hermite-normal-form routine
//! [`crate::sample`] uses to eliminate equalities before searching).
//! Several disjuncts' generators are combined into the hull of their
//! union via one identity: the affine hull's direction space is the
//! orthogonal complement of the *sum* of the disjuncts' own direction
//! spaces and their mutual displacement. That sum's null space is
//! again computed with [`Compression::compute`], this time treating
//! the displacement vectors as a homogeneous equality system over a
//! scratch [`BasicMap`] — the same "borrow `BasicMap` as a constraint
//! scratchpad" trick `sample.rs` and `lp.rs` use.
//!
//! **Convex hull** has two strategies, chosen by [`crate::options::ConvexHullStrategy`]:
//! the real implementation's preferred path is "wrapping" — grow the
//! hull's inequality description one candidate facet direction at a
//! time, each tightened against every disjunct by LP — which avoids
//! the exponential blowup the alternative, Fourier-Motzkin elimination
//! over Balas' lifted disjunctive-programming formulation (auxiliary
//! `y_i`/`lambda_i` per disjunct, projected out via
//! [`crate::basic_map::eliminate_vars`]), can produce. Balas is exact
//! and simpler to falsify, so it stays as the documented fallback.
//!
//! This module's wrapping pass takes its candidate directions from the
//! disjuncts' own facets (every inequality row appearing in any live
//! disjunct, deduplicated) rather than discovering new ridge directions
//! by pivoting the way the real wrapping step does when a candidate
//! facet turns out not to bound the hull — a scope cut from the real
//! per-ridge wrap, not a soundness one: each kept inequality's bound is
//! still the exact LP support value (`min` over every disjunct) for its
//! direction, so the result always contains the true hull, and is exact
//! whenever the hull's own facets are parallel to some disjunct's (true
//! for the common case of hulling boxes and other disjuncts that already
//! share facet directions).

use crate::{
	basic_map::BasicMap,
	error::Error,
	int::Int,
	lp,
	matrix::{Compression, Matrix},
	options::{Ctx, ConvexHullStrategy},
	set::Map,
	space::{DimKind, Space},
	tableau::Tableau,
	vector::Vector,
};

fn dot(a: &[Int], b: &[Int]) -> Int {
	a.iter().zip(b.iter()).fold(Int::zero(), |acc, (x, y)| &acc + &(x * y))
}

/// `(offset, directions)` generator of `b`'s equality system over its
/// structural variables (divs projected out first), or `None` if `b`
/// is empty or its equalities have no integer solution.
fn disjunct_generators(b: &BasicMap, ctx: &Ctx) -> Option<(Vec<Int>, Matrix)> {
	let mut b = b.project_out(DimKind::Div, 0, b.n_div());
	b.simplify();
	if b.is_empty(ctx) {
		return None;
	}
	let n_eq = b.equalities().len();
	let mut tab = Tableau::from_basic_map(&b, ctx);
	let implicit = tab.detect_implicit_equalities();
	// `Tableau::from_basic_map` lays equalities (as opposing pairs) down
	// first, then inequalities in `b`'s own order, untouched by
	// `detect_implicit_equalities` (which only flips `is_eq`, never
	// reorders) — so row `i` of the tableau's inequality block is still
	// `b.inequalities()[i - 2 * n_eq]`.
	let to_convert: Vec<Vector> = implicit
		.into_iter()
		.filter(|&i| i >= 2 * n_eq)
		.map(|i| b.inequalities()[i - 2 * n_eq].clone())
		.collect();
	for row in &to_convert {
		if let Some(idx) = b.inequalities().iter().position(|r| r == row) {
			b.inequality_to_equality(idx);
		}
	}
	b.gauss();
	let ncols = b.space().width() - 1;
	let rows: Vec<Vec<Int>> = b.equalities().iter().map(|r| r.as_slice().to_vec()).filter(|r| r.iter().any(|v| !v.is_zero())).collect();
	let eq = Matrix::from_rows(rows);
	let comp = Compression::compute(&eq, ncols);
	if !comp.feasible {
		return None;
	}
	Some((comp.offset_num, comp.u2))
}

/// The null space of the matrix whose rows are `vectors`, as a
/// [`Compression`] over a homogeneous (all-zero constant) equality
/// system; `comp.u2`'s columns are the resulting basis vectors.
fn null_space_basis(ncols: usize, vectors: &[Vec<Int>]) -> Compression {
	let space = Space::set_alloc(0, ncols);
	let mut scratch = BasicMap::alloc(space, 0, 0, 0, vectors.len());
	for v in vectors {
		let mut row = Vec::with_capacity(ncols + 1);
		row.push(Int::zero());
		row.extend(v.iter().cloned());
		scratch.add_equality_row(Vector::from_vec(row));
	}
	scratch.gauss();
	let rows: Vec<Vec<Int>> = scratch.equalities().iter().map(|r| r.as_slice().to_vec()).filter(|r| r.iter().any(|v| !v.is_zero())).collect();
	let eq = Matrix::from_rows(rows);
	Compression::compute(&eq, ncols)
}

/// The affine hull of the union `disjuncts` as a single [`BasicMap`]
/// over `space`: the smallest affine subspace containing every point
/// of every disjunct.
fn affine_hull_of(disjuncts: &[BasicMap], space: &Space, ctx: &Ctx) -> BasicMap {
	let ncols = space.width() - 1;
	let generators: Vec<(Vec<Int>, Matrix)> = disjuncts.iter().filter_map(|b| disjunct_generators(b, ctx)).collect();
	let Some((p0, _)) = generators.first() else {
		return BasicMap::empty(space.clone());
	};
	let p0 = p0.clone();
	let mut displacement: Vec<Vec<Int>> = Vec::new();
	for (offset, dirs) in &generators {
		let disp: Vec<Int> = offset.iter().zip(p0.iter()).map(|(a, b)| a - b).collect();
		if disp.iter().any(|v| !v.is_zero()) {
			displacement.push(disp);
		}
		for col in 0..dirs.ncols() {
			let d: Vec<Int> = (0..ncols).map(|row| dirs.row(row)[col].clone()).collect();
			displacement.push(d);
		}
	}
	let mut out = BasicMap::universe(space.clone());
	if displacement.is_empty() {
		// Every disjunct collapses to the single point `p0`.
		for c in 0..ncols {
			let mut row = vec![Int::zero(); ncols + 1];
			row[0] = -p0[c].clone();
			row[c + 1] = Int::one();
			out.add_equality_row(Vector::from_vec(row));
		}
		return out;
	}
	let null_space = null_space_basis(ncols, &displacement);
	for col in 0..null_space.u2.ncols() {
		let r: Vec<Int> = (0..ncols).map(|row| null_space.u2.row(row)[col].clone()).collect();
		let c = -dot(&r, &p0);
		let mut row = Vec::with_capacity(ncols + 1);
		row.push(c);
		row.extend(r);
		out.add_equality_row(Vector::from_vec(row));
	}
	out
}

/// The affine hull of `map`: the smallest affine subspace containing
/// every disjunct.
pub(crate) fn affine_hull(map: &Map, ctx: &Ctx) -> BasicMap {
	affine_hull_of(map.basic_maps(), map.space(), ctx)
}

/// Balas' lifted-disjunctive-programming convex hull of `disjuncts`
/// over `space`: one auxiliary copy `y_i` of the structural variables
/// and one scalar `lambda_i` per surviving disjunct, homogenising each
/// disjunct's constraints (`c * lambda_i + a . y_i >= 0`), tying
/// `x = sum_i y_i` and `sum_i lambda_i = 1`, then eliminating every
/// `y_i`/`lambda_i` by Fourier-Motzkin.
fn convex_hull_of(disjuncts: &[BasicMap], space: &Space, ctx: &Ctx) -> BasicMap {
	let live: Vec<BasicMap> = disjuncts
		.iter()
		.map(|b| {
			let mut b = b.project_out(DimKind::Div, 0, b.n_div());
			b.simplify();
			b
		})
		.filter(|b| !b.is_empty(ctx))
		.collect();
	match live.len() {
		0 => return BasicMap::empty(space.clone()),
		1 => return live.into_iter().next().expect("len checked above"),
		_ => {}
	}
	let n = space.width() - 1;
	let k = live.len();
	let lifted = n + k * (n + 1);
	let mut scratch = BasicMap::universe(Space::set_alloc(0, lifted));

	let lambda_col = |i: usize| 1 + n + i * (n + 1) + n;
	let y_col = |i: usize, c: usize| 1 + n + i * (n + 1) + c;

	let mut sum_row = vec![Int::zero(); 1 + lifted];
	sum_row[0] = -Int::one();
	for i in 0..k {
		sum_row[lambda_col(i)] = Int::one();
	}
	scratch.add_equality_row(Vector::from_vec(sum_row));

	for c in 0..n {
		let mut row = vec![Int::zero(); 1 + lifted];
		row[1 + c] = Int::one();
		for i in 0..k {
			row[y_col(i, c)] = -Int::one();
		}
		scratch.add_equality_row(Vector::from_vec(row));
	}

	for (i, b) in live.iter().enumerate() {
		let mut lam_row = vec![Int::zero(); 1 + lifted];
		lam_row[lambda_col(i)] = Int::one();
		scratch.add_inequality_row(Vector::from_vec(lam_row));

		for ineq in b.inequalities() {
			let mut row = vec![Int::zero(); 1 + lifted];
			row[lambda_col(i)] = ineq[0].clone();
			for c in 0..n {
				row[y_col(i, c)] = ineq.as_slice()[1 + c].clone();
			}
			scratch.add_inequality_row(Vector::from_vec(row));
		}
		for eq in b.equalities() {
			let mut row = vec![Int::zero(); 1 + lifted];
			row[lambda_col(i)] = eq[0].clone();
			for c in 0..n {
				row[y_col(i, c)] = eq.as_slice()[1 + c].clone();
			}
			scratch.add_equality_row(Vector::from_vec(row));
		}
	}

	let projected = scratch.project_out(DimKind::Out, n, lifted - n);
	let mut out = BasicMap::alloc(space.clone(), 0, 0, 0, 0);
	for eq in projected.equalities() {
		out.add_equality_row(eq.clone());
	}
	for ineq in projected.inequalities() {
		out.add_inequality_row(ineq.clone());
	}
	out.simplify();
	out
}

/// Live (non-empty, div-free) copies of `disjuncts`, ready for either
/// convex hull strategy.
fn live_disjuncts(disjuncts: &[BasicMap], ctx: &Ctx) -> Vec<BasicMap> {
	disjuncts
		.iter()
		.map(|b| {
			let mut b = b.project_out(DimKind::Div, 0, b.n_div());
			b.simplify();
			b
		})
		.filter(|b| !b.is_empty(ctx))
		.collect()
}

/// `dir · x >= bound` as an integer row, where `bound` may be a
/// non-integer rational: clearing `bound`'s denominator (always
/// positive) scales both sides without changing the inequality's sense.
fn scaled_bound_row(dir: &[Int], bound: &crate::tableau::Rat) -> Vector {
	let den = bound.denom().clone();
	let mut row = vec![-bound.numer().clone()];
	row.extend(dir.iter().map(|c| c * &den));
	Vector::from_vec(row)
}

/// Wrapping convex hull: for every candidate direction drawn from the
/// live disjuncts' own facets, the hull's inequality in that direction
/// is exactly `dir · x >= min_i (min over disjunct_i of dir · x)` — the
/// pointwise minimum of the disjuncts' support functions. A direction
/// unbounded below in any disjunct cannot bound the hull either and is
/// dropped (see the module documentation for why this only wraps
/// existing facet directions rather than discovering new ones).
pub(crate) fn convex_hull_wrap(disjuncts: &[BasicMap], space: &Space, ctx: &Ctx) -> BasicMap {
	let live = live_disjuncts(disjuncts, ctx);
	match live.len() {
		0 => return BasicMap::empty(space.clone()),
		1 => return live.into_iter().next().expect("len checked above"),
		_ => {}
	}
	let n = space.width() - 1;
	let mut seen = std::collections::HashSet::new();
	let mut directions: Vec<Vec<Int>> = Vec::new();
	for b in &live {
		for ineq in b.inequalities() {
			let dir: Vec<Int> = ineq.as_slice()[1..1 + n].to_vec();
			if dir.iter().all(Int::is_zero) {
				continue;
			}
			if seen.insert(dir.clone()) {
				directions.push(dir);
			}
		}
	}

	let mut out = BasicMap::universe(space.clone());
	for dir in &directions {
		let mut obj = vec![Int::zero()];
		obj.extend(dir.iter().cloned());
		let obj = Vector::from_vec(obj);
		let mut bound: Option<crate::tableau::Rat> = None;
		let mut unbounded = false;
		for b in &live {
			match lp::minimize(b, &obj, ctx) {
				Ok(v) => {
					bound = Some(match &bound {
						Some(cur) if *cur <= v => cur.clone(),
						_ => v,
					});
				}
				Err(Error::Unbounded) => {
					unbounded = true;
					break;
				}
				Err(Error::Infeasible) => {}
			}
		}
		if unbounded {
			continue;
		}
		let Some(bound) = bound else { continue };
		out.add_inequality_row(scaled_bound_row(dir, &bound));
	}
	out.simplify();
	out
}

/// The convex hull of `map`: the smallest convex set containing every
/// disjunct, via `ctx.options.convex` (see the module documentation for
/// both strategies' scope cuts).
pub(crate) fn convex_hull(map: &Map, ctx: &Ctx) -> BasicMap {
	match ctx.options.convex {
		ConvexHullStrategy::Wrap => convex_hull_wrap(map.basic_maps(), map.space(), ctx),
		ConvexHullStrategy::FourierMotzkin => convex_hull_of(map.basic_maps(), map.space(), ctx),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn row(xs: &[i64]) -> Vector {
		Vector::from_vec(xs.iter().map(|&x| Int::from(x)).collect())
	}

	#[test]
	fn affine_hull_of_a_line_segment_is_the_line() {
		let ctx = Ctx::default();
		// Two points (0,0) and (2,2): affine hull should be the line x = y.
		let mut a = BasicMap::alloc(Space::set_alloc(0, 2), 0, 0, 0, 0);
		a.add_equality_row(row(&[0, 1, 0]));
		a.add_equality_row(row(&[0, 0, 1]));
		let mut b = BasicMap::alloc(Space::set_alloc(0, 2), 0, 0, 0, 0);
		b.add_equality_row(row(&[-2, 1, 0]));
		b.add_equality_row(row(&[-2, 0, 1]));
		let map = Map::from_basic_map(a).union(Map::from_basic_map(b));
		let hull = affine_hull(&map, &ctx);
		assert_eq!(hull.equalities().len(), 1);
		assert!(hull.contains_point(&[Int::from(1), Int::from(1)]));
		assert!(!hull.contains_point(&[Int::from(1), Int::from(2)]));
	}

	#[test]
	fn affine_hull_of_two_boxes_is_the_whole_plane() {
		let ctx = Ctx::default();
		let mut a = BasicMap::alloc(Space::set_alloc(0, 2), 0, 0, 0, 0);
		a.add_inequality_row(row(&[0, 1, 0]));
		a.add_inequality_row(row(&[1, -1, 0]));
		a.add_inequality_row(row(&[0, 0, 1]));
		a.add_inequality_row(row(&[1, 0, -1]));
		let map = Map::from_basic_map(a);
		let hull = affine_hull(&map, &ctx);
		assert!(hull.equalities().is_empty());
		assert!(hull.is_universe());
	}

	#[test]
	fn convex_hull_of_two_boxes_covers_the_gap() {
		let ctx = Ctx::default();
		let mut a = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		a.add_inequality_row(row(&[0, 1])); // x >= 0
		a.add_inequality_row(row(&[1, -1])); // x <= 1
		let mut b = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[-9, 1])); // x >= 9
		b.add_inequality_row(row(&[10, -1])); // x <= 10
		let map = Map::from_basic_map(a).union(Map::from_basic_map(b));
		let hull = convex_hull_of(map.basic_maps(), map.space(), &ctx);
		assert!(hull.contains_point(&[Int::from(5)]));
		assert!(!hull.contains_point(&[Int::from(-1)]));
		assert!(!hull.contains_point(&[Int::from(11)]));
	}

	#[test]
	fn convex_hull_wrap_of_two_boxes_covers_the_gap() {
		let ctx = Ctx::default();
		let mut a = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		a.add_inequality_row(row(&[0, 1])); // x >= 0
		a.add_inequality_row(row(&[1, -1])); // x <= 1
		let mut b = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[-9, 1])); // x >= 9
		b.add_inequality_row(row(&[10, -1])); // x <= 10
		let map = Map::from_basic_map(a).union(Map::from_basic_map(b));
		let hull = convex_hull_wrap(map.basic_maps(), map.space(), &ctx);
		assert!(hull.contains_point(&[Int::from(5)]));
		assert!(!hull.contains_point(&[Int::from(-1)]));
		assert!(!hull.contains_point(&[Int::from(11)]));
	}

	#[test]
	fn convex_hull_dispatches_on_options() {
		let mut opts = crate::options::Options::default();
		opts.convex = ConvexHullStrategy::FourierMotzkin;
		let ctx = Ctx::new(opts);
		let mut a = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		a.add_inequality_row(row(&[0, 1]));
		a.add_inequality_row(row(&[1, -1]));
		let mut b = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[-9, 1]));
		b.add_inequality_row(row(&[10, -1]));
		let map = Map::from_basic_map(a).union(Map::from_basic_map(b));
		let hull = convex_hull(&map, &ctx);
		assert!(hull.contains_point(&[Int::from(5)]));
		assert!(!hull.contains_point(&[Int::from(-1)]));
	}

	#[test]
	fn convex_hull_single_disjunct_is_itself() {
		let ctx = Ctx::default();
		let mut a = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		a.add_inequality_row(row(&[0, 1]));
		a.add_inequality_row(row(&[3, -1]));
		let map = Map::from_basic_map(a);
		let hull = convex_hull(&map, &ctx);
		assert!(hull.contains_point(&[Int::from(2)]));
		assert!(!hull.contains_point(&[Int::from(4)]));
	}
}
