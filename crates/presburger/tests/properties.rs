//! Cross-module property tests, exercised through the public API only.
//!
//! Per-module unit tests live next to their implementations; this file
//! covers properties that only make sense stated in terms of several
//! modules composed together, plus the headline scenarios used to
//! validate the engine end to end.

use presburger::{
	basic_map::BasicMap,
	options::Ctx,
	sample,
	set::Map,
	space::Space,
	vector::Vector,
};
use presburger::int::Int;

fn row(xs: &[i64]) -> Vector {
	Vector::from_vec(xs.iter().map(|&x| Int::from(x)).collect())
}

fn set(n: usize) -> Space {
	Space::set_alloc(0, n)
}

// ---------------------------------------------------------------------
// Universal properties
// ---------------------------------------------------------------------

/// `simplify` never changes the point set it describes, only how it is
/// written down: a redundant copy of a constraint should not change
/// which points satisfy it.
#[test]
fn simplify_preserves_the_point_set() {
	let mut b = BasicMap::alloc(set(1), 0, 0, 0, 0);
	b.add_inequality_row(row(&[5, -1])); // x <= 5
	b.add_inequality_row(row(&[5, -1])); // x <= 5, duplicated
	b.add_inequality_row(row(&[0, 1])); // x >= 0
	b.simplify();
	for x in 0..=5 {
		assert!(b.contains_point(&[Int::from(x)]));
	}
	assert!(!b.contains_point(&[Int::from(6)]));
	assert!(!b.contains_point(&[Int::from(-1)]));
}

/// `intersect(A, universe) == A`.
#[test]
fn intersect_with_universe_is_identity() {
	let ctx = Ctx::default();
	let mut b = BasicMap::alloc(set(1), 0, 0, 0, 0);
	b.add_inequality_row(row(&[0, 1]));
	b.add_inequality_row(row(&[10, -1]));
	let a = Map::from_basic_map(b);
	let universe = Map::universe(set(1));
	let result = a.intersect(&universe, &ctx);
	for x in -2..=12 {
		assert_eq!(result.contains_point(&[Int::from(x)]), a.contains_point(&[Int::from(x)]));
	}
}

/// `union(A, empty) == A`.
#[test]
fn union_with_empty_is_identity() {
	let mut b = BasicMap::alloc(set(1), 0, 0, 0, 0);
	b.add_inequality_row(row(&[0, 1]));
	b.add_inequality_row(row(&[3, -1]));
	let a = Map::from_basic_map(b);
	let empty = Map::empty(set(1));
	let result = a.clone().union(empty);
	for x in -1..=4 {
		assert_eq!(result.contains_point(&[Int::from(x)]), a.contains_point(&[Int::from(x)]));
	}
}

/// `reverse(reverse(M)) == M`.
#[test]
fn reverse_is_an_involution() {
	let space = Space::alloc(0, 1, 1);
	let mut b = BasicMap::alloc(space, 0, 0, 0, 0);
	b.add_equality_row(row(&[0, -1, 1])); // y = x
	b.add_inequality_row(row(&[5, -1, 0])); // x <= 5
	let m = Map::from_basic_map(b);
	let back = m.reverse().reverse();
	for x in 0..=6 {
		assert_eq!(back.contains_point(&[Int::from(x), Int::from(x)]), m.contains_point(&[Int::from(x), Int::from(x)]));
	}
}

/// `apply_range(M, identity) == M`, where `identity` is built by hand as
/// `{ [x] -> [y] : y = x }` over the same dimension count as `M`'s range.
#[test]
fn composing_with_identity_is_identity() {
	let space = Space::alloc(0, 1, 1);
	let mut b = BasicMap::alloc(space, 0, 0, 0, 0);
	b.add_equality_row(row(&[0, -2, 1])); // y = 2x
	b.add_inequality_row(row(&[0, 1, 0])); // x >= 0
	b.add_inequality_row(row(&[5, -1, 0])); // x <= 5
	let m = Map::from_basic_map(b);

	let mut id_b = BasicMap::alloc(Space::alloc(0, 1, 1), 0, 0, 0, 0);
	id_b.add_equality_row(row(&[0, -1, 1])); // y = x
	let identity = Map::from_basic_map(id_b);

	let composed = m.apply_range(&identity).expect("matching in/out dimension counts compose");
	for x in 0..=5 {
		let y = Int::from(2 * x);
		assert_eq!(composed.contains_point(&[Int::from(x), y.clone()]), m.contains_point(&[Int::from(x), y]));
	}
}

/// `subtract(A, A) == empty`.
#[test]
fn subtracting_a_set_from_itself_is_empty() {
	let ctx = Ctx::default();
	let mut b = BasicMap::alloc(set(1), 0, 0, 0, 0);
	b.add_inequality_row(row(&[0, 1]));
	b.add_inequality_row(row(&[7, -1]));
	let a = Map::from_basic_map(b);
	assert!(a.subtract(&a, &ctx).is_empty(&ctx));
}

/// `union(subtract(A, B), intersect(A, B)) == A`.
#[test]
fn difference_and_intersection_partition_a() {
	let ctx = Ctx::default();
	let mut ab = BasicMap::alloc(set(1), 0, 0, 0, 0);
	ab.add_inequality_row(row(&[0, 1])); // x >= 0
	ab.add_inequality_row(row(&[9, -1])); // x <= 9
	let a = Map::from_basic_map(ab);

	let mut bb = BasicMap::alloc(set(1), 0, 0, 0, 0);
	bb.add_inequality_row(row(&[-5, 1])); // x >= 5
	bb.add_inequality_row(row(&[15, -1])); // x <= 15
	let b = Map::from_basic_map(bb);

	let rebuilt = a.subtract(&b, &ctx).union(a.intersect(&b, &ctx));
	for x in -1..=16 {
		assert_eq!(rebuilt.contains_point(&[Int::from(x)]), a.contains_point(&[Int::from(x)]));
	}
}

/// `convex_hull(S) ⊇ S` for a single basic set (where it also equals the
/// same affine hull as `S`, since a single basic set's convex hull adds
/// no new equalities).
#[test]
fn convex_hull_of_a_single_basic_set_contains_it() {
	let ctx = Ctx::default();
	let mut b = BasicMap::alloc(set(2), 0, 0, 0, 0);
	b.add_inequality_row(row(&[0, 1, 0]));
	b.add_inequality_row(row(&[3, -1, 0]));
	b.add_inequality_row(row(&[0, 0, 1]));
	b.add_inequality_row(row(&[3, 0, -1]));
	let s = Map::from_basic_map(b.clone());
	let hull = s.convex_hull(&ctx);
	for x in 0..=3 {
		for y in 0..=3 {
			assert!(hull.contains_point(&[Int::from(x), Int::from(y)]));
		}
	}
	let affine = s.affine_hull(&ctx);
	assert!(affine.equalities().is_empty());
}

// Note: no `gist` operation is implemented by this crate (it was never
// found among the public API of `set.rs`/`basic_map.rs`), so the
// `gist(A,B) intersect B == A intersect B` property from the original
// property list has no counterpart to exercise here.

/// Closure properties: `R ⊆ R⁺`, `R⁺ ∘ R ⊆ R⁺`, and, when the closure is
/// reported exact, `R⁺ = R ∪ (R⁺ ∘ R)`.
#[test]
fn closure_properties_hold_for_a_bounded_self_feeding_relation() {
	let ctx = Ctx::default();
	let space = Space::alloc(0, 1, 1);
	let mut b = BasicMap::alloc(space, 0, 0, 0, 0);
	b.add_equality_row(row(&[-1, -1, 1])); // y = x + 1
	b.add_inequality_row(row(&[0, 1, 0])); // x >= 0
	b.add_inequality_row(row(&[9, -1, 0])); // x <= 9
	let r = Map::from_basic_map(b);

	let (closure, exact) = r.transitive_closure(&ctx);
	assert!(exact);

	for x in 0..=9 {
		assert!(closure.contains_point(&[Int::from(x), Int::from(x + 1)]));
	}

	let r_then_r = r.apply_range(&r).expect("self-map composes with itself");
	let closure_then_r = closure.apply_range(&r).expect("closure composes with r");
	for x in -1..=11 {
		for y in -1..=11 {
			let p = [Int::from(x), Int::from(y)];
			if closure_then_r.contains_point(&p) {
				assert!(closure.contains_point(&p));
			}
		}
	}

	let rebuilt = r.clone().union(closure_then_r);
	for x in -1..=11 {
		for y in -1..=11 {
			let p = [Int::from(x), Int::from(y)];
			assert_eq!(rebuilt.contains_point(&p), closure.contains_point(&p));
		}
	}
}

// ---------------------------------------------------------------------
// Concrete scenarios
// ---------------------------------------------------------------------

/// `{ [x,y] : 0<=x<=3, 0<=y<=3, x+y>=7 }` is empty.
#[test]
fn scenario_simple_polytope_emptiness() {
	let ctx = Ctx::default();
	let mut b = BasicMap::alloc(set(2), 0, 0, 0, 0);
	b.add_inequality_row(row(&[0, 1, 0]));
	b.add_inequality_row(row(&[3, -1, 0]));
	b.add_inequality_row(row(&[0, 0, 1]));
	b.add_inequality_row(row(&[3, 0, -1]));
	b.add_inequality_row(row(&[-7, 1, 1]));
	assert!(b.is_empty(&ctx));
}

/// `{ [x,y] : y=3x, 1<=x<=2 }` samples to `(1,3)` or `(2,6)`.
#[test]
fn scenario_integer_sample_on_a_z_skewed_set() {
	let ctx = Ctx::default();
	let mut b = BasicMap::alloc(set(2), 0, 0, 0, 0);
	b.add_equality_row(row(&[0, -3, 1])); // y - 3x = 0
	b.add_inequality_row(row(&[-1, 1, 0])); // x >= 1
	b.add_inequality_row(row(&[2, -1, 0])); // x <= 2
	let p = sample::find_integer_point(&mut b, &ctx).expect("feasible");
	assert!(p == vec![Int::from(1), Int::from(3)] || p == vec![Int::from(2), Int::from(6)]);
}

/// `{ [x,y,z] : x+y+z=10, x,y,z>=0 }`'s affine hull is `{x+y+z=10}`, with
/// no surviving inequalities.
#[test]
fn scenario_affine_hull() {
	let ctx = Ctx::default();
	let mut b = BasicMap::alloc(set(3), 0, 0, 0, 0);
	b.add_equality_row(row(&[-10, 1, 1, 1]));
	b.add_inequality_row(row(&[0, 1, 0, 0]));
	b.add_inequality_row(row(&[0, 0, 1, 0]));
	b.add_inequality_row(row(&[0, 0, 0, 1]));
	let hull = Map::from_basic_map(b).affine_hull(&ctx);
	assert_eq!(hull.equalities().len(), 1);
	assert!(hull.inequalities().is_empty());
	assert!(hull.contains_point(&[Int::from(20), Int::from(-5), Int::from(-5)]));
	assert!(!hull.contains_point(&[Int::from(1), Int::from(1), Int::from(1)]));
}

/// `{[x]:0<=x<=1} ∪ {[x]:3<=x<=5}`'s convex hull is `{[x]:0<=x<=5}`.
/// This crate does not attach a separate exactness flag to convex hull
/// results (unlike [`Map::transitive_closure`]): a convex hull is, by
/// its nature, an outer approximation whenever the input is not itself
/// convex, which this scenario demonstrates directly (`2` is accepted
/// by the hull despite not belonging to either disjunct).
#[test]
fn scenario_convex_hull() {
	let ctx = Ctx::default();
	let mut lo = BasicMap::alloc(set(1), 0, 0, 0, 0);
	lo.add_inequality_row(row(&[0, 1]));
	lo.add_inequality_row(row(&[1, -1]));
	let mut hi = BasicMap::alloc(set(1), 0, 0, 0, 0);
	hi.add_inequality_row(row(&[-3, 1]));
	hi.add_inequality_row(row(&[5, -1]));
	let s = Map::from_basic_map(lo).union(Map::from_basic_map(hi));

	let hull = s.convex_hull(&ctx);
	for x in 0..=5 {
		assert!(hull.contains_point(&[Int::from(x)]));
	}
	assert!(!hull.contains_point(&[Int::from(-1)]));
	assert!(!hull.contains_point(&[Int::from(6)]));
	assert!(!s.contains_point(&[Int::from(2)]));
	assert!(hull.contains_point(&[Int::from(2)]));
}

/// `B(n) = { [i] : 0<=i<=n }`, `D = { n : n>=0 }`: the lex-min of `i` is
/// always `0`, so `M = {n -> [0] : n>=0}` and `E` is empty.
#[test]
fn scenario_parametric_lex_min() {
	let ctx = Ctx::default();
	let space = Space::alloc(1, 0, 1);
	let mut b = BasicMap::alloc(space, 0, 0, 0, 0);
	b.add_inequality_row(row(&[0, 0, 1])); // i >= 0
	b.add_inequality_row(row(&[0, 1, -1])); // n - i >= 0

	let mut dom = BasicMap::alloc(Space::alloc(1, 0, 0), 0, 0, 0, 0);
	dom.add_inequality_row(row(&[0, 1])); // n >= 0

	let (m, e) = b.partial_lexmin(&dom, &ctx);
	assert!(e.is_empty(&ctx));
	for n in 0..=10 {
		assert!(m.contains_point(&[Int::from(n), Int::from(0)]));
		if n > 0 {
			assert!(!m.contains_point(&[Int::from(n), Int::from(1)]));
		}
	}
}

/// `R = { [x] -> [x+1] : 0<=x<10 }`. Its transitive closure is exactly
/// `R⁺ = { [x] -> [y] : 0<=x<y<=10 }`, and reported exact: the domain
/// shrinks by one with every application of `R`, so the chain of
/// compositions terminates.
#[test]
fn scenario_transitive_closure_of_a_translation() {
	let ctx = Ctx::default();
	let space = Space::alloc(0, 1, 1);
	let mut b = BasicMap::alloc(space, 0, 0, 0, 0);
	b.add_equality_row(row(&[-1, -1, 1])); // y = x + 1
	b.add_inequality_row(row(&[0, 1, 0])); // x >= 0
	b.add_inequality_row(row(&[9, -1, 0])); // x <= 9
	let r = Map::from_basic_map(b);

	let (closure, exact) = r.transitive_closure(&ctx);
	assert!(exact);

	for x in 0..=10 {
		for y in 0..=10 {
			let expected = x < y && y <= 10 && x >= 0;
			assert_eq!(closure.contains_point(&[Int::from(x), Int::from(y)]), expected, "x={x} y={y}");
		}
	}
}
