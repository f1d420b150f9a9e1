//! Linear and integer optimisation of an affine objective over a
//! [`BasicMap`]'s feasible region.
//!
//! Rational optimisation is a direct [`Tableau::max`]/[`Tableau::min`]
//! call. The integer variant first asks whether the LP-optimal vertex
//! already happens to be integral; if not, it tries every corner of the
//! unit box around that vertex (cheap, and often already optimal or at
//! least a good seed) before falling back to a binary search over the
//! objective value, each candidate bound tested for integer feasibility
//! by [`crate::sample`]. Minimisation is implemented as maximising the
//! negated objective, so only one direction of the search needs
//! writing.
//!
//! An objective vector is always expressed over the structural
//! variables only (`[const | params | in | out]`, matching
//! `b.space().width()`) — never the divs a [`BasicMap`] may carry
//! internally — and is padded with zero div coefficients before being
//! handed to a [`Tableau`], which optimises over every column.

use crate::{
	basic_map::BasicMap,
	error::{Error, Result},
	int::Int,
	options::Ctx,
	sample,
	tableau::{LpOutcome, Rat, Tableau},
	vector::Vector,
};

/// Above this many structural variables the `2^n`-corner unit-box
/// heuristic is skipped in favour of going straight to binary search.
const UNIT_BOX_DIM_LIMIT: u32 = 16;

fn padded_obj(b: &BasicMap, obj: &Vector) -> Vector {
	let mut v = obj.as_slice().to_vec();
	v.resize(b.width(), Int::zero());
	Vector::from_vec(v)
}

/// Maximise `obj · [1;x]` over `b`, rationally.
pub fn maximize(b: &BasicMap, obj: &Vector, ctx: &Ctx) -> Result<Rat> {
	optimize(b, obj, true, ctx)
}

/// Minimise `obj · [1;x]` over `b`, rationally.
pub fn minimize(b: &BasicMap, obj: &Vector, ctx: &Ctx) -> Result<Rat> {
	optimize(b, obj, false, ctx)
}

fn optimize(b: &BasicMap, obj: &Vector, maximize: bool, ctx: &Ctx) -> Result<Rat> {
	let tab = Tableau::from_basic_map(b, ctx);
	let padded = padded_obj(b, obj);
	let (outcome, v) = if maximize { tab.max(&padded) } else { tab.min(&padded) };
	match outcome {
		LpOutcome::Ok => Ok(v.expect("Ok outcome carries a value")),
		LpOutcome::Empty => Err(Error::Infeasible),
		LpOutcome::Unbounded => Err(Error::Unbounded),
	}
}

/// Maximise `obj · [1;x]` over the integer points of `b`.
pub fn maximize_integer(b: &BasicMap, obj: &Vector, ctx: &Ctx) -> Result<Int> {
	optimize_integer_max(b, obj, ctx)
}

/// Minimise `obj · [1;x]` over the integer points of `b`.
pub fn minimize_integer(b: &BasicMap, obj: &Vector, ctx: &Ctx) -> Result<Int> {
	optimize_integer_max(b, &obj.negate(), ctx).map(|v| -v)
}

/// Every corner of the unit box anchored at `floor(point)`, restricted
/// to those actually contained in `b`. Skipped (empty) above
/// [`UNIT_BOX_DIM_LIMIT`] dimensions.
fn unit_box_candidates<'a>(point: &'a [Rat], b: &'a BasicMap) -> impl Iterator<Item = Vec<Int>> + 'a {
	let n = point.len();
	let cap: u32 = if n as u32 <= UNIT_BOX_DIM_LIMIT { 1 << n } else { 0 };
	(0..cap).filter_map(move |mask| {
		let candidate: Vec<Int> = (0..n)
			.map(|i| {
				let floor = point[i].floor();
				if mask & (1 << i) != 0 { &floor + &Int::one() } else { floor }
			})
			.collect();
		b.contains_point(&candidate).then_some(candidate)
	})
}

fn bound_row(obj: &Vector, bound: &Int, width: usize) -> Vector {
	let mut v = obj.as_slice().to_vec();
	v[0] = &v[0] - bound;
	v.resize(width, Int::zero());
	Vector::from_vec(v)
}

/// `true` if `b ∩ {obj >= bound}` has an integer point.
fn feasible_at_bound(b: &BasicMap, obj: &Vector, bound: &Int, ctx: &Ctx) -> bool {
	let mut probe = b.clone();
	probe.add_inequality_row(bound_row(obj, bound, probe.width()));
	sample::find_integer_point(&mut probe, ctx).is_some()
}

fn optimize_integer_max(b: &BasicMap, obj: &Vector, ctx: &Ctx) -> Result<Int> {
	let padded = padded_obj(b, obj);
	let tab = Tableau::from_basic_map(b, ctx);
	let (outcome, v, point) = tab.max_point(&padded);
	match outcome {
		LpOutcome::Empty => return Err(Error::Infeasible),
		LpOutcome::Unbounded => return Err(Error::Unbounded),
		LpOutcome::Ok => {}
	}
	let v = v.expect("Ok outcome carries a value");
	let point = point.expect("Ok outcome carries a point");
	let n_struct = obj.len() - 1;
	let structural_point = &point[..n_struct];
	if structural_point.iter().all(Rat::is_integer) {
		return Ok(v.floor());
	}

	let lp_bound = v.floor();
	let best_corner = unit_box_candidates(structural_point, b).max_by_key(|c| obj.eval(c));
	if let Some(c) = &best_corner {
		if obj.eval(c) == lp_bound {
			return Ok(lp_bound);
		}
	}

	let mut lo = match &best_corner {
		Some(c) => obj.eval(c),
		None => {
			let mut seed = b.clone();
			let seed_point = sample::find_integer_point(&mut seed, ctx).ok_or(Error::Infeasible)?;
			obj.eval(&seed_point)
		}
	};
	let mut hi = lp_bound;
	while lo < hi {
		let half = (&(&hi - &lo) + &Int::one()).floor_div(&Int::from(2));
		let mid = &lo + &half;
		if feasible_at_bound(b, obj, &mid, ctx) {
			lo = mid;
		} else {
			hi = &mid - &Int::one();
		}
	}
	Ok(lo)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::space::Space;

	fn row(xs: &[i64]) -> Vector {
		Vector::from_vec(xs.iter().map(|&x| Int::from(x)).collect())
	}

	#[test]
	fn maximize_over_a_box() {
		let ctx = Ctx::default();
		let mut b = BasicMap::alloc(Space::set_alloc(0, 2), 0, 0, 0, 0);
		b.add_inequality_row(row(&[0, 1, 0])); // x >= 0
		b.add_inequality_row(row(&[5, -1, 0])); // x <= 5
		b.add_inequality_row(row(&[0, 0, 1])); // y >= 0
		b.add_inequality_row(row(&[3, 0, -1])); // y <= 3
		let obj = row(&[0, 1, 1]); // x + y
		assert_eq!(maximize(&b, &obj, &ctx).unwrap(), Rat::from_int(Int::from(8)));
		assert_eq!(minimize(&b, &obj, &ctx).unwrap(), Rat::from_int(Int::zero()));
	}

	#[test]
	fn unbounded_objective_is_an_error() {
		let ctx = Ctx::default();
		let mut b = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[0, 1])); // x >= 0
		let obj = row(&[0, 1]);
		assert_eq!(maximize(&b, &obj, &ctx), Err(Error::Unbounded));
	}

	#[test]
	fn integer_optimum_from_a_fractional_vertex() {
		let ctx = Ctx::default();
		// 2x <= 7, x >= 0: rational max of x is 3.5, integer max is 3.
		let mut b = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[7, -2])); // 7 - 2x >= 0
		b.add_inequality_row(row(&[0, 1])); // x >= 0
		let obj = row(&[0, 1]);
		assert_eq!(maximize_integer(&b, &obj, &ctx).unwrap(), Int::from(3));
	}

	#[test]
	fn minimize_integer_matches_negated_maximize() {
		let ctx = Ctx::default();
		let mut b = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[-3, 2])); // 2x - 3 >= 0  =>  x >= 1.5
		b.add_inequality_row(row(&[10, -1])); // x <= 10
		let obj = row(&[0, 1]);
		assert_eq!(minimize_integer(&b, &obj, &ctx).unwrap(), Int::from(2));
	}

	#[test]
	fn infeasible_set_is_an_error() {
		let ctx = Ctx::default();
		let mut b = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[-5, 1])); // x >= 5
		b.add_inequality_row(row(&[3, -1])); // x <= 3
		let obj = row(&[0, 1]);
		assert_eq!(maximize(&b, &obj, &ctx), Err(Error::Infeasible));
		assert_eq!(maximize_integer(&b, &obj, &ctx), Err(Error::Infeasible));
	}
}
