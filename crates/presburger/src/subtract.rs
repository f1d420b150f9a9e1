//! `A \ (B_1 ∪ ... ∪ B_n)` as a disjoint union of basic maps, computed by
//! a depth-first walk over each `B_i`'s defining constraints.
//!
//! The identity driving the recursion: the complement of a conjunction
//! `c_1 ∧ c_2 ∧ ... ∧ c_m` is `∪_i (¬c_i ∧ c_1 ∧ ... ∧ c_{i-1})` — pick
//! the first conjunct that fails, and require every earlier one to have
//! held (so the pieces produced for different `i` are disjoint). Walking
//! `B_1, B_2, ..., B_n` this way in sequence, carving the surviving
//! piece of `A` against each in turn, produces `A \ ∪ B_i` as a disjoint
//! union of basic maps. A [`Tableau`] tracks the accumulated extra
//! constraints along the current DFS path so each branch can be pruned
//! (via [`Status::Separate`]) without rebuilding a [`BasicMap`] at every
//! node; the final [`BasicMap`] is only materialised at successful
//! leaves.

use crate::{
	basic_map::BasicMap,
	coalesce::defining_inequalities,
	int::Int,
	options::Ctx,
	tableau::{Status, Tableau},
	vector::Vector,
};

/// The integer-tightened negation of `row >= 0`: since every variable is
/// integer-valued, `row < 0` is equivalent to `-row - 1 >= 0`.
fn not_row(row: &Vector) -> Vector {
	let mut v: Vec<Int> = row.as_slice().iter().map(|c| -c.clone()).collect();
	v[0] = &v[0] - &Int::one();
	Vector::from_vec(v)
}

/// `a \ (others[0] ∪ others[1] ∪ ...)`, as a disjoint list of basic
/// maps. `others` need not be aligned to `a`'s div list; alignment is
/// done internally.
pub(crate) fn subtract(a: &BasicMap, others: &[BasicMap], ctx: &Ctx) -> Vec<BasicMap> {
	let mut base = a.clone();
	base.simplify();
	if base.is_empty(ctx) {
		return vec![];
	}
	if others.is_empty() {
		return vec![base];
	}
	// First pass grows `base`'s div list to cover every `others[i]`;
	// second pass re-expresses each `others[i]` over the now-final list
	// (a first-pass result would be short the divs a later `others[j]`
	// introduced).
	for b in others {
		let _ = base.align_divs(b);
	}
	let aligned: Vec<BasicMap> = others.iter().map(|b| base.align_divs(b)).collect();

	let mut tab = Tableau::from_basic_map(&base, ctx);
	let mut extra = Vec::new();
	let mut out = Vec::new();
	carve(&base, &mut tab, &aligned, 0, &mut extra, ctx, &mut out);
	out
}

#[allow(clippy::too_many_arguments, reason = "internal recursion helper, not a public API")]
fn carve(base: &BasicMap, tab: &mut Tableau, bs: &[BasicMap], idx: usize, extra: &mut Vec<Vector>, ctx: &Ctx, out: &mut Vec<BasicMap>) {
	if idx == bs.len() {
		let mut piece = base.clone();
		for row in extra.iter() {
			piece.add_inequality_row(row.clone());
		}
		piece.simplify();
		if !piece.is_empty(ctx) {
			out.push(piece);
		}
		return;
	}
	let conjuncts = defining_inequalities(&bs[idx]);
	let snap_before = tab.snap();
	let depth_before = extra.len();
	for c in &conjuncts {
		let nc = not_row(c);
		let snap = tab.snap();
		let status = tab.add_inequality(&nc);
		if status != Status::Separate {
			extra.push(nc);
			carve(base, tab, bs, idx + 1, extra, ctx, out);
			extra.pop();
		}
		tab.rollback(snap);
		let _ = tab.add_inequality(c);
		extra.push(c.clone());
	}
	tab.rollback(snap_before);
	extra.truncate(depth_before);
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::space::Space;

	fn row(xs: &[i64]) -> Vector {
		Vector::from_vec(xs.iter().map(|&x| Int::from(x)).collect())
	}

	#[test]
	fn subtract_middle_leaves_two_pieces() {
		let ctx = Ctx::default();
		let mut a = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		a.add_inequality_row(row(&[0, 1])); // x >= 0
		a.add_inequality_row(row(&[10, -1])); // x <= 10
		let mut b = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[-4, 1])); // x >= 4
		b.add_inequality_row(row(&[6, -1])); // x <= 6
		let pieces = subtract(&a, &[b], &ctx);
		// [0,10] \ [4,6] = [0,3] u [7,10], two disjoint pieces.
		assert_eq!(pieces.len(), 2);
		for p in &pieces {
			assert!(!p.is_empty(&ctx));
		}
	}

	#[test]
	fn subtract_everything_is_empty() {
		let ctx = Ctx::default();
		let mut a = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		a.add_inequality_row(row(&[0, 1])); // x >= 0
		a.add_inequality_row(row(&[10, -1])); // x <= 10
		let b = a.clone();
		let pieces = subtract(&a, &[b], &ctx);
		assert!(pieces.is_empty());
	}

	#[test]
	fn subtract_disjoint_leaves_original() {
		let ctx = Ctx::default();
		let mut a = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		a.add_inequality_row(row(&[0, 1])); // x >= 0
		a.add_inequality_row(row(&[5, -1])); // x <= 5
		let mut b = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[-20, 1])); // x >= 20
		let pieces = subtract(&a, &[b], &ctx);
		assert_eq!(pieces.len(), 1);
	}
}
