//! Pairwise disjunct merging: given two basic maps `A` and `B`, decide
//! whether `A ∪ B` is itself expressible as one basic map, and if so
//! build it.
//!
//! Two cases are implemented, both driven by classifying one disjunct's
//! defining constraints against a tableau built from the other (the
//! same `redundant | valid | separate | cut` statuses
//! [`crate::tableau::Tableau::add_inequality`] already reports):
//!
//! - **Containment**: every constraint defining `B` is valid over every
//!   point of `A` (or vice versa) — one disjunct is a subset of the
//!   other and the union is just the larger one.
//! - **Single adjacent inequality**: `A` and `B` agree on their
//!   equalities, and are split by exactly one pair of complementary
//!   inequalities (`e >= 0` on one side, `-e >= 0` on the other) with
//!   every other constraint of each valid over the whole of the other —
//!   dropping that one inequality from each side and unioning the rest
//!   reconstructs `A ∪ B` exactly. This also catches the "adjacent
//!   equality" shape where the splitting hyperplane is an equality in
//!   one of the two disjuncts, as long as the rest of the two equality
//!   sets still line up: `tab.add_inequality` classifies a constraint
//!   that's an equality in one side but an ordinary bound in the other
//!   the same way it classifies any other cut.
//!
//! - **Wrapping**: when neither of the above applies (including when
//!   the two equality sets genuinely differ), fall back to building the
//!   wrapping convex hull of just `{A, B}` (the same construction
//!   [`crate::hull`] uses, reusing its candidate directions and LP
//!   support values) and check the result for exactness directly: the
//!   wrap is always a superset of `A ∪ B` by construction, so it
//!   equals `A ∪ B` exactly iff `wrap \ A \ B` is empty
//!   ([`crate::subtract`]). This accepts a coalescing wherever the
//!   wrap happens to reconstruct the union exactly and rejects it
//!   otherwise, rather than leaving every non-trivial pair un-coalesced.
//!
//! Discovering a genuinely new supporting hyperplane not already present
//! as some facet of `A` or `B` (true ridge-pivoting, as opposed to
//! reusing an existing facet direction) is still not implemented, for
//! the same reason [`crate::hull`]'s wrapping convex hull stops short of
//! it: it needs a polytope *vertex* enumeration this crate never builds.
//! Pairs that need it are left un-coalesced rather than merged
//! incorrectly.

use tracing::trace;

use crate::{basic_map::BasicMap, hull, options::Ctx, set::Map, tableau::{Status, Tableau}, vector::Vector};

/// Every inequality implied by `b`'s definition: its own inequalities,
/// plus both directions of each equality.
pub(crate) fn defining_inequalities(b: &BasicMap) -> Vec<Vector> {
	let mut out: Vec<Vector> = b.inequalities().to_vec();
	for eq in b.equalities() {
		out.push(eq.clone());
		out.push(eq.negate());
	}
	out
}

/// Classify `row` against the live feasible region of `tab` without
/// mutating it.
fn classify(tab: &mut Tableau, row: &Vector) -> Status {
	let snap = tab.snap();
	let status = tab.add_inequality(row);
	tab.rollback(snap);
	status
}

/// `true` if every point of `sub` satisfies every constraint defining
/// `sup` — i.e. `sub` is a (not necessarily strict) subset of `sup`.
fn is_subset(sub: &BasicMap, sup: &BasicMap, ctx: &Ctx) -> bool {
	let mut tab = Tableau::from_basic_map(sub, ctx);
	defining_inequalities(sup).iter().all(|row| matches!(classify(&mut tab, row), Status::Valid | Status::Redundant))
}

/// `true` if the two equality lists are equal as sets (order- and
/// duplicate-insensitive is not needed here since `gauss` already
/// dedupes; plain multiset-by-sorted-string comparison suffices).
fn equalities_match(a: &BasicMap, b: &BasicMap) -> bool {
	let mut a_rows: Vec<String> = a.equalities().iter().map(ToString::to_string).collect();
	let mut b_rows: Vec<String> = b.equalities().iter().map(ToString::to_string).collect();
	a_rows.sort();
	b_rows.sort();
	a_rows == b_rows
}

/// Build the wrapping convex hull of just `{a, b}` and accept it as
/// `a ∪ b` exactly when nothing outside both disjuncts survives the
/// subtraction (see the module doc for why that check is sufficient).
fn coalesce_by_wrap(a: &BasicMap, b: &BasicMap, ctx: &Ctx) -> Option<BasicMap> {
	let mut wrapped = hull::convex_hull_wrap(&[a.clone(), b.clone()], a.space(), ctx);
	wrapped.simplify();
	let excess = Map::from_basic_map(wrapped.clone())
		.subtract(&Map::from_basic_map(a.clone()), ctx)
		.subtract(&Map::from_basic_map(b.clone()), ctx);
	if excess.is_empty(ctx) { Some(wrapped) } else { None }
}

/// Try to fuse `a` and `b` (already expressed over the same div list)
/// into one basic map denoting exactly `a ∪ b`. See the module doc for
/// which cases are handled.
fn coalesce_pair(a: &BasicMap, b: &BasicMap, ctx: &Ctx) -> Option<BasicMap> {
	if is_subset(b, a, ctx) {
		return Some(a.clone());
	}
	if is_subset(a, b, ctx) {
		return Some(b.clone());
	}
	if !equalities_match(a, b) {
		return coalesce_by_wrap(a, b, ctx);
	}
	let mut tab_b = Tableau::from_basic_map(b, ctx);
	let status_a: Vec<Status> = a.inequalities().iter().map(|r| classify(&mut tab_b, r)).collect();
	let mut tab_a = Tableau::from_basic_map(a, ctx);
	let status_b: Vec<Status> = b.inequalities().iter().map(|r| classify(&mut tab_a, r)).collect();

	let cut_a: Vec<usize> = status_a.iter().enumerate().filter(|(_, s)| **s == Status::Cut).map(|(i, _)| i).collect();
	let cut_b: Vec<usize> = status_b.iter().enumerate().filter(|(_, s)| **s == Status::Cut).map(|(i, _)| i).collect();
	if cut_a.len() != 1 || cut_b.len() != 1 {
		return coalesce_by_wrap(a, b, ctx);
	}
	let others_ok = status_a.iter().enumerate().all(|(i, s)| i == cut_a[0] || matches!(s, Status::Valid | Status::Redundant))
		&& status_b.iter().enumerate().all(|(i, s)| i == cut_b[0] || matches!(s, Status::Valid | Status::Redundant));
	if !others_ok {
		return coalesce_by_wrap(a, b, ctx);
	}
	let (ca, cb) = (&a.inequalities()[cut_a[0]], &b.inequalities()[cut_b[0]]);
	if ca.negate() != *cb {
		return coalesce_by_wrap(a, b, ctx);
	}
	let mut fused = BasicMap::alloc(a.space().clone(), a.n_div(), 0, 0, 0);
	for eq in a.equalities() {
		fused.add_equality_row(eq.clone());
	}
	for (i, row) in a.inequalities().iter().enumerate() {
		if i != cut_a[0] {
			fused.add_inequality_row(row.clone());
		}
	}
	for (i, row) in b.inequalities().iter().enumerate() {
		if i != cut_b[0] {
			fused.add_inequality_row(row.clone());
		}
	}
	fused.simplify();
	trace!("fused adjacent pair into one disjunct");
	Some(fused)
}

/// Repeatedly scan `list` for a coalesce-able pair and fuse it, until no
/// pair merges. `O(n^2)` rescans per merge; fine for the small disjunct
/// counts this crate expects (no normalized-form disjunct count bound
/// is specified, but coalescing is run after subtraction/union driven
/// growth, not in a hot inner loop).
pub(crate) fn coalesce_in_place(list: &mut Vec<BasicMap>, ctx: &Ctx) {
	'restart: loop {
		for i in 0..list.len() {
			for j in (i + 1)..list.len() {
				let mut aligned_a = list[i].clone();
				let aligned_b = aligned_a.align_divs(&list[j]);
				if let Some(fused) = coalesce_pair(&aligned_a, &aligned_b, ctx) {
					list[i] = fused;
					list.remove(j);
					continue 'restart;
				}
			}
		}
		break;
	}
}

/// A deterministic sort key used to bring a disjunct list into a
/// canonical order (the `NORMALIZED` flag's contract: same multiset of
/// disjuncts always sorts to the same sequence).
pub(crate) fn canonical_key(b: &BasicMap) -> String {
	let mut eqs: Vec<String> = b.equalities().iter().map(ToString::to_string).collect();
	let mut ineqs: Vec<String> = b.inequalities().iter().map(ToString::to_string).collect();
	eqs.sort();
	ineqs.sort();
	format!("{}|{}|{}", b.n_div(), eqs.join(";"), ineqs.join(";"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{int::Int, space::Space};

	fn row(xs: &[i64]) -> Vector {
		Vector::from_vec(xs.iter().map(|&x| Int::from(x)).collect())
	}

	#[test]
	fn contained_box_coalesces_to_outer() {
		let ctx = Ctx::default();
		let mut outer = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		outer.add_inequality_row(row(&[0, 1])); // x >= 0
		outer.add_inequality_row(row(&[10, -1])); // x <= 10
		let mut inner = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		inner.add_inequality_row(row(&[-2, 1])); // x >= 2
		inner.add_inequality_row(row(&[5, -1])); // x <= 5
		let mut list = vec![outer.clone(), inner];
		coalesce_in_place(&mut list, &ctx);
		assert_eq!(list.len(), 1);
	}

	#[test]
	fn complementary_halves_fuse_into_one() {
		let ctx = Ctx::default();
		// A: 0 <= x <= 2, B: -5 <= x <= 0; the shared boundary x = 0 is
		// cut by exactly one complementary inequality pair on each side.
		let mut a = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		a.add_inequality_row(row(&[0, 1])); // x >= 0
		a.add_inequality_row(row(&[2, -1])); // x <= 2
		let mut b = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[0, -1])); // x <= 0
		b.add_inequality_row(row(&[5, 1])); // x >= -5
		let mut list = vec![a, b];
		coalesce_in_place(&mut list, &ctx);
		assert_eq!(list.len(), 1);
		assert_eq!(list[0].inequalities().len(), 2);
	}

	#[test]
	fn disjoint_pieces_with_a_gap_do_not_fuse() {
		let ctx = Ctx::default();
		// x <= 2 and x >= 3: not complementary, leaves a gap (2, 3).
		let mut lower = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		lower.add_inequality_row(row(&[0, 1])); // x >= 0
		lower.add_inequality_row(row(&[2, -1])); // x <= 2
		let mut upper = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		upper.add_inequality_row(row(&[4, -1])); // x <= 4
		upper.add_inequality_row(row(&[-3, 1])); // x >= 3
		let mut list = vec![lower, upper];
		coalesce_in_place(&mut list, &ctx);
		assert_eq!(list.len(), 2);
	}

	/// A unit square split by its diagonal into two triangles: the
	/// wrapping fallback (or the single-cut-pair rule, whichever fires
	/// first) must reconstruct the whole square exactly.
	#[test]
	fn diagonal_split_square_coalesces_exactly() {
		let ctx = Ctx::default();
		let mut lower = BasicMap::alloc(Space::set_alloc(0, 2), 0, 0, 0, 0);
		lower.add_inequality_row(row(&[0, 1, 0])); // x >= 0
		lower.add_inequality_row(row(&[1, -1, 0])); // x <= 1
		lower.add_inequality_row(row(&[0, 0, 1])); // y >= 0
		lower.add_inequality_row(row(&[0, 1, -1])); // y <= x
		let mut upper = BasicMap::alloc(Space::set_alloc(0, 2), 0, 0, 0, 0);
		upper.add_inequality_row(row(&[0, 1, 0])); // x >= 0
		upper.add_inequality_row(row(&[1, -1, 0])); // x <= 1
		upper.add_inequality_row(row(&[1, 0, -1])); // y <= 1
		upper.add_inequality_row(row(&[0, -1, 1])); // y >= x
		let mut list = vec![lower, upper];
		coalesce_in_place(&mut list, &ctx);
		assert_eq!(list.len(), 1);
		assert!(list[0].contains_point(&[Int::from(0), Int::from(1)]));
		assert!(list[0].contains_point(&[Int::from(1), Int::from(0)]));
		assert!(!list[0].contains_point(&[Int::from(2), Int::from(0)]));
	}

	/// A pentagon (a square with one corner cut off) reunited with the
	/// triangular corner piece that was cut away, at uneven inequality
	/// counts (5 vs 3): whichever rule reconstructs it first, the result
	/// must be exactly the original square.
	#[test]
	fn pentagon_and_corner_triangle_coalesce_via_wrap() {
		let ctx = Ctx::default();
		let mut pentagon = BasicMap::alloc(Space::set_alloc(0, 2), 0, 0, 0, 0);
		pentagon.add_inequality_row(row(&[0, 1, 0])); // x >= 0
		pentagon.add_inequality_row(row(&[10, -1, 0])); // x <= 10
		pentagon.add_inequality_row(row(&[0, 0, 1])); // y >= 0
		pentagon.add_inequality_row(row(&[10, 0, -1])); // y <= 10
		pentagon.add_inequality_row(row(&[18, -1, -1])); // x + y <= 18
		let mut corner = BasicMap::alloc(Space::set_alloc(0, 2), 0, 0, 0, 0);
		corner.add_inequality_row(row(&[10, -1, 0])); // x <= 10
		corner.add_inequality_row(row(&[10, 0, -1])); // y <= 10
		corner.add_inequality_row(row(&[-18, 1, 1])); // x + y >= 18
		let mut list = vec![pentagon, corner];
		coalesce_in_place(&mut list, &ctx);
		assert_eq!(list.len(), 1);
		assert!(list[0].contains_point(&[Int::from(10), Int::from(10)]));
		assert!(list[0].contains_point(&[Int::from(0), Int::from(0)]));
		assert!(!list[0].contains_point(&[Int::from(11), Int::from(11)]));
	}

	/// An L-shaped union (a wide short box plus a narrow tall box
	/// overlapping only along part of one edge) is not convex, so
	/// neither the single-cut-pair rule nor the wrapping fallback may
	/// coalesce it: the wrap would necessarily include points outside
	/// both boxes, which the subtraction-based exactness check must
	/// catch and reject.
	#[test]
	fn non_convex_l_shape_does_not_fuse() {
		let ctx = Ctx::default();
		let mut wide = BasicMap::alloc(Space::set_alloc(0, 2), 0, 0, 0, 0);
		wide.add_inequality_row(row(&[0, 1, 0])); // x >= 0
		wide.add_inequality_row(row(&[2, -1, 0])); // x <= 2
		wide.add_inequality_row(row(&[0, 0, 1])); // y >= 0
		wide.add_inequality_row(row(&[1, 0, -1])); // y <= 1
		let mut tall = BasicMap::alloc(Space::set_alloc(0, 2), 0, 0, 0, 0);
		tall.add_inequality_row(row(&[0, 1, 0])); // x >= 0
		tall.add_inequality_row(row(&[1, -1, 0])); // x <= 1
		tall.add_inequality_row(row(&[-1, 0, 1])); // y >= 1
		tall.add_inequality_row(row(&[2, 0, -1])); // y <= 2
		let mut list = vec![wide, tall];
		coalesce_in_place(&mut list, &ctx);
		assert_eq!(list.len(), 2);
	}
}
