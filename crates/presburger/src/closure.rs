//! Over-approximating the transitive closure `R+` of a self-map `R`
//! (a [`crate::set::Map`] whose domain and range share one space).
//!
//! `R+ = R ∪ (R ∘ R) ∪ (R ∘ R ∘ R) ∪ ...`. Rather than bounding how
//! many terms of that union can matter from the *disjunct* adjacency
//! graph alone, this computes the union's own powers directly: `R`,
//! `R²`, `R³`, ... accumulating as it goes, and stops the moment a new
//! power adds nothing the accumulated union doesn't already contain.
//! That stopping condition is exact, not a heuristic cutoff: if
//! `R^(k+1) ⊆ R ∪ ... ∪ R^k`, composing both sides with `R` again gives
//! `R^(k+2) ⊆ R² ∪ ... ∪ R^(k+1) ⊆ (R ∪ ... ∪ R^k) ∪ R^(k+1)`, which is
//! already inside the accumulated union — so by induction every later
//! power is too, and the union accumulated so far already equals `R+`.
//! A domain that shrinks every application the way `{ [x] → [x+1] : 0
//! ≤ x < 10 }` does reaches this point (`R^11` is empty) after finitely
//! many rounds even though the relation can clearly feed into itself.
//!
//! Disjunct-level reachability — does some point in disjunct `i`'s
//! range feed a point in disjunct `j`'s domain? — is always computed as
//! a directed graph, decomposed into strongly connected components with
//! Tarjan's algorithm. [`ClosureStrategy::Isl`] uses that decomposition
//! only to size the flat iteration's round budget: when every component
//! is a single disjunct with no self-edge, no path through the
//! disjuncts has more than `n` edges, so the accumulation above is
//! guaranteed to hit its stopping condition within `n` rounds and the
//! round budget can stay small; a cyclic graph instead gets a generous
//! but finite budget.
//!
//! [`ClosureStrategy::Kelly`] (the default) puts the same decomposition
//! to the use Kelly et al.'s closure algorithm makes of it: each
//! strongly connected component gets its own closure computed in
//! isolation — trivially itself when the component is a single
//! disjunct with no self-edge, by the same bounded power iteration
//! otherwise, but now bounded by that component's own size rather than
//! the whole map's — and the components are then composed into the
//! overall closure one at a time in the order Tarjan already emits them
//! in (a sink component, nothing following it, first; its predecessors
//! after). Accumulating a running union `path` this way, each new
//! component's own closure composed in front of whatever `path` already
//! holds picks up every multi-component chain automatically, because by
//! the time a component is processed `path` already contains the exact
//! closure of everything reachable after it. A relation with one
//! bounded self-feeding part and an unrelated acyclic chain elsewhere is
//! exact under `Kelly` precisely because the cyclic part no longer has
//! to share a round budget with disjuncts it can never actually reach.
//!
//! Either strategy can still exhaust its round budget on a component
//! whose reachable set never stops growing (unbounded self-feeding).
//! When that happens this falls back to an over-approximation for that
//! component, rather than the real algorithm's other option once a
//! bounded power iteration fails: a generic per-step recurrence derived
//! from the polytope's *vertices* (a double-description style
//! computation this crate does not build; [`crate::hull`] only ever
//! produces an inequality description). The bound used instead: `R+ ⊆
//! dom(R) × ran(R)`, always true since any composed pair starts
//! somewhere `R` can start from and ends somewhere it can end up,
//! tightened by the *delta set* `{ y - x : (x, y) in R }` (the same
//! per-application displacement the real algorithm's steps matrix
//! tracks) wherever that tightening is sound without knowing how many
//! times `R` was actually applied:
//!
//! - a delta-set equality `a·z = 0` survives `k` applications summed
//!   together unchanged (`a·(sum of k deltas) = 0` for any `k`), so it
//!   is kept as-is;
//! - a delta-set inequality `a·z >= -c` with `c <= 0` means every
//!   individual delta already satisfies the homogeneous `a·z >= 0`,
//!   which a sum of such terms inherits, so it is kept with its
//!   constant dropped;
//! - anything else (an equality with a non-zero constant, or an
//!   inequality with a positive constant) is simply omitted — omitting
//!   a constraint only widens the over-approximation, never narrows it
//!   past soundness.

use crate::{
	basic_map::BasicMap,
	int::Int,
	options::{Ctx, ClosureStrategy},
	set::Map,
	space::{DimKind, Space},
	vector::Vector,
};

fn homogenize(row: &Vector) -> Vector {
	let mut s = row.as_slice().to_vec();
	s[0] = Int::zero();
	Vector::from_vec(s)
}

/// `{ y - x : (x, y) in b }`, as a basic set over the parameters only
/// (`b` is assumed to carry no existential divs).
fn delta_set(b: &BasicMap, nparam: usize, d: usize) -> BasicMap {
	debug_assert_eq!(b.n_div(), 0, "transitive closure does not support divs on its disjuncts");
	let mut ext = b.clone();
	ext.add_dims(DimKind::Out, d); // out block becomes [y(d), z(d)]
	let width = ext.width();
	for k in 0..d {
		let mut row = vec![Int::zero(); width];
		row[1 + nparam + k] = Int::one(); // x_k
		row[1 + nparam + d + k] = -Int::one(); // -y_k
		row[1 + nparam + 2 * d + k] = Int::one(); // z_k
		ext.add_equality_row(Vector::from_vec(row));
	}
	let ext = ext.project_out(DimKind::Out, 0, d); // drop y, leaves z
	ext.project_out(DimKind::In, 0, d) // drop x
}

/// The constraints of `deltas`' convex hull that remain valid for the
/// sum of any number of deltas (see the module documentation).
fn sound_delta_invariants(deltas: &Map, ctx: &Ctx) -> BasicMap {
	let hull = deltas.convex_hull(ctx);
	let mut cone = BasicMap::alloc(hull.space().clone(), 0, 0, 0, 0);
	for r in hull.equalities() {
		if r[0].is_zero() {
			cone.add_equality_row(r.clone());
		}
	}
	for r in hull.inequalities() {
		if !r[0].is_positive() {
			cone.add_inequality_row(homogenize(r));
		}
	}
	cone
}

/// Pad a row over `(nparam, d)` with `d` trailing zero columns (for
/// embedding a domain-only row into the full `(nparam, d, d)` space).
fn pad_out(row: &Vector, d: usize) -> Vector {
	let mut s = row.as_slice().to_vec();
	s.extend(std::iter::repeat(Int::zero()).take(d));
	Vector::from_vec(s)
}

/// Insert `d` zero columns right after the parameter block of a row
/// over `(nparam, 0, d)` (for embedding a range-only row into the full
/// `(nparam, d, d)` space, ahead of its own `d` output columns).
fn insert_in(row: &Vector, nparam: usize, d: usize) -> Vector {
	let mut s = row.as_slice()[0..1 + nparam].to_vec();
	s.extend(std::iter::repeat(Int::zero()).take(d));
	s.extend(row.as_slice()[1 + nparam..].iter().cloned());
	Vector::from_vec(s)
}

/// Re-express a delta-invariant row `a·z (+ c) >= 0` (or `== 0`) over
/// `(nparam, 0, d)` as `a·(y - x) (+ c) >= 0` over `(nparam, d, d)`.
fn delta_constraint(row: &Vector, nparam: usize, d: usize) -> Vector {
	let head = &row.as_slice()[0..1 + nparam];
	let a = &row.as_slice()[1 + nparam..1 + nparam + d];
	let mut s = head.to_vec();
	s.extend(a.iter().map(|v| -v)); // x block: -a
	s.extend(a.iter().cloned()); // y block: +a
	Vector::from_vec(s)
}

/// `dom(map) × ran(map)`, tightened by `invariants` on `y - x`, one
/// disjunct per (domain disjunct, range disjunct) pair.
fn bound_by_deltas(map: &Map, invariants: &BasicMap, nparam: usize, d: usize, ctx: &Ctx) -> Map {
	let dom = map.project_out(DimKind::Out, 0, d);
	let ran = map.project_out(DimKind::In, 0, d);
	let full_space = map.space().clone();
	let mut out = Map::empty(full_space.clone());
	for dm in dom.basic_maps() {
		for rn in ran.basic_maps() {
			let mut b = BasicMap::alloc(full_space.clone(), 0, 0, 0, 0);
			for r in dm.equalities() {
				b.add_equality_row(pad_out(r, d));
			}
			for r in dm.inequalities() {
				b.add_inequality_row(pad_out(r, d));
			}
			for r in rn.equalities() {
				b.add_equality_row(insert_in(r, nparam, d));
			}
			for r in rn.inequalities() {
				b.add_inequality_row(insert_in(r, nparam, d));
			}
			for r in invariants.equalities() {
				b.add_equality_row(delta_constraint(r, nparam, d));
			}
			for r in invariants.inequalities() {
				b.add_inequality_row(delta_constraint(r, nparam, d));
			}
			if !b.is_empty(ctx) {
				out = out.union(Map::from_basic_map(b));
			}
		}
	}
	out
}

fn tarjan_strongconnect(
	v: usize,
	adj: &[Vec<bool>],
	index: &mut usize,
	indices: &mut [Option<usize>],
	lowlink: &mut [usize],
	on_stack: &mut [bool],
	stack: &mut Vec<usize>,
	sccs: &mut Vec<Vec<usize>>,
) {
	indices[v] = Some(*index);
	lowlink[v] = *index;
	*index += 1;
	stack.push(v);
	on_stack[v] = true;
	for w in 0..adj.len() {
		if !adj[v][w] {
			continue;
		}
		if indices[w].is_none() {
			tarjan_strongconnect(w, adj, index, indices, lowlink, on_stack, stack, sccs);
			lowlink[v] = lowlink[v].min(lowlink[w]);
		} else if on_stack[w] {
			lowlink[v] = lowlink[v].min(indices[w].expect("visited node has an index"));
		}
	}
	if lowlink[v] == indices[v].expect("v was just indexed") {
		let mut component = Vec::new();
		loop {
			let w = stack.pop().expect("v's own frame is still on the stack");
			on_stack[w] = false;
			component.push(w);
			if w == v {
				break;
			}
		}
		sccs.push(component);
	}
}

/// Strongly connected components of the directed graph `adj` (`adj[i][j]`
/// = edge `i -> j`), via Tarjan's algorithm.
fn tarjan_sccs(adj: &[Vec<bool>]) -> Vec<Vec<usize>> {
	let n = adj.len();
	let mut index = 0;
	let mut indices = vec![None; n];
	let mut lowlink = vec![0; n];
	let mut on_stack = vec![false; n];
	let mut stack = Vec::new();
	let mut sccs = Vec::new();
	for v in 0..n {
		if indices[v].is_none() {
			tarjan_strongconnect(v, adj, &mut index, &mut indices, &mut lowlink, &mut on_stack, &mut stack, &mut sccs);
		}
	}
	sccs
}

/// `true` if no disjunct can (directly or transitively, through other
/// disjuncts) follow itself — every strongly connected component of
/// the disjunct-adjacency graph is a single disjunct with no self-edge.
fn is_acyclic(adj: &[Vec<bool>]) -> bool {
	tarjan_sccs(adj).iter().all(|c| c.len() == 1 && !adj[c[0]][c[0]])
}

/// A generous but finite round budget for [`iterate_to_fixed_point`]
/// when the disjunct-adjacency graph is cyclic and no cheaper bound on
/// the number of rounds needed is available.
const FIXED_POINT_ROUND_CAP: usize = 64;

/// `map`, `map∘map`, `map∘map∘map`, ... accumulated into a union, up to
/// `max_rounds` powers past the first. Stops and returns `Some` the
/// moment a new power adds nothing new (see the module documentation
/// for why that makes the accumulated union exactly `map+`); returns
/// `None` if the budget runs out first.
fn iterate_to_fixed_point(map: &Map, ctx: &Ctx, max_rounds: usize) -> Option<Map> {
	let mut acc = map.clone();
	let mut cur = map.clone();
	for _ in 0..max_rounds {
		let Some(next) = cur.apply_range(map) else {
			return Some(acc);
		};
		if next.subtract(&acc, ctx).is_empty(ctx) {
			return Some(acc.coalesce(ctx));
		}
		acc = acc.union(next.clone());
		cur = next;
	}
	None
}

fn approximate_closure(map: &Map, ctx: &Ctx) -> Map {
	let nparam = map.space().nparam();
	let d = map.space().n_out();
	let mut deltas = Map::empty(Space::alloc(nparam, 0, d));
	for b in map.basic_maps() {
		deltas = deltas.union(Map::from_basic_map(delta_set(b, nparam, d)));
	}
	let invariants = sound_delta_invariants(&deltas, ctx);
	bound_by_deltas(map, &invariants, nparam, d, ctx)
}

/// [`ClosureStrategy::Isl`]: one flat power iteration over the whole
/// map, `adj` used only to size the round budget.
fn flat_closure(map: &Map, ctx: &Ctx, adj: &[Vec<bool>]) -> (Map, bool) {
	let n = map.basic_maps().len();
	let round_budget = if is_acyclic(adj) { n.max(1) } else { FIXED_POINT_ROUND_CAP };
	if let Some(exact) = iterate_to_fixed_point(map, ctx, round_budget) {
		return (exact, true);
	}
	(approximate_closure(map, ctx), false)
}

/// [`ClosureStrategy::Kelly`]: decompose `map`'s disjuncts into strongly
/// connected components (Tarjan, emitted sink component first) and
/// compose each component's own closure into a running `path` in that
/// order. By the time a component is processed, `path` already holds
/// the exact closure of everything that can follow it, so composing the
/// component's own closure in front of `path` picks up every chain that
/// passes through it — direct or through several other components —
/// without walking the condensation graph's edges explicitly.
fn per_scc_closure(map: &Map, ctx: &Ctx, adj: &[Vec<bool>]) -> (Map, bool) {
	let sccs = tarjan_sccs(adj);
	let space = map.space().clone();
	let mut path = Map::empty(space.clone());
	let mut exact = true;
	for comp in &sccs {
		let mut local = Map::empty(space.clone());
		for &i in comp {
			local = local.union(Map::from_basic_map(map.basic_maps()[i].clone()));
		}
		let trivial = comp.len() == 1 && !adj[comp[0]][comp[0]];
		let (path_comp, comp_exact) = if trivial {
			(local, true)
		} else {
			match iterate_to_fixed_point(&local, ctx, FIXED_POINT_ROUND_CAP) {
				Some(e) => (e, true),
				None => (approximate_closure(&local, ctx), false),
			}
		};
		exact = exact && comp_exact;
		let path_comb = path_comp.apply_range(&path);
		path = path.union(path_comp);
		if let Some(comb) = path_comb {
			path = path.union(comb);
		}
	}
	(path.coalesce(ctx), exact)
}

/// Over-approximate `map+` (`map` composed with itself one or more
/// times). The returned `bool` is `true` exactly when the result is
/// known exact (see the module documentation).
pub(crate) fn transitive_closure(map: &Map, ctx: &Ctx) -> (Map, bool) {
	if map.is_empty(ctx) {
		return (Map::empty(map.space().clone()), true);
	}
	debug_assert_eq!(map.space().n_in(), map.space().n_out(), "transitive closure requires a self-map");

	let n = map.basic_maps().len();
	let mut adj = vec![vec![false; n]; n];
	for i in 0..n {
		for j in 0..n {
			if let Some(comp) = map.basic_maps()[i].apply_range(&map.basic_maps()[j]) {
				adj[i][j] = !comp.is_empty(ctx);
			}
		}
	}

	match ctx.options.closure {
		ClosureStrategy::Isl => flat_closure(map, ctx, &adj),
		ClosureStrategy::Kelly => per_scc_closure(map, ctx, &adj),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn row(xs: &[i64]) -> Vector {
		Vector::from_vec(xs.iter().map(|&x| Int::from(x)).collect())
	}

	/// A two-stage chain `0 -> 1 -> 2` has no disjunct that can follow
	/// itself: the closure is exact and is exactly the three pairs
	/// reachable by one or two steps.
	#[test]
	fn acyclic_chain_is_exact() {
		let ctx = Ctx::default();
		let space = Space::alloc(0, 1, 1);
		let mut step0 = BasicMap::alloc(space.clone(), 0, 0, 0, 0);
		step0.add_equality_row(row(&[0, -1, 0])); // x == 0
		step0.add_equality_row(row(&[-1, 0, 1])); // y == 1
		let mut step1 = BasicMap::alloc(space.clone(), 0, 0, 0, 0);
		step1.add_equality_row(row(&[-1, -1, 0])); // x == 1
		step1.add_equality_row(row(&[-2, 0, 1])); // y == 2
		let map = Map::from_basic_map(step0).union(Map::from_basic_map(step1));
		let (closure, exact) = transitive_closure(&map, &ctx);
		assert!(exact);
		assert!(closure.contains_point(&[Int::from(0), Int::from(1)]));
		assert!(closure.contains_point(&[Int::from(1), Int::from(2)]));
		assert!(closure.contains_point(&[Int::from(0), Int::from(2)]));
		assert!(!closure.contains_point(&[Int::from(0), Int::from(3)]));
	}

	/// `{ [x] -> [x+1] : 0 <= x < 10 }` can feed itself (any point past
	/// the first is also a valid starting point), so the disjunct-level
	/// adjacency check alone would call this cyclic — but the domain
	/// shrinks by one each application, so after ten rounds no further
	/// composition is possible and the union accumulated so far is
	/// already exact: `R+ = { [x] -> [y] : 0 <= x < y <= 10 }`.
	#[test]
	fn domain_bounded_self_feeding_relation_is_still_exact() {
		let ctx = Ctx::default();
		let mut step = BasicMap::alloc(Space::alloc(0, 1, 1), 0, 0, 0, 0);
		step.add_inequality_row(row(&[0, 1, 0])); // x >= 0
		step.add_inequality_row(row(&[9, -1, 0])); // x <= 9
		step.add_equality_row(row(&[-1, -1, 1])); // y == x + 1
		let map = Map::from_basic_map(step);
		let (closure, exact) = transitive_closure(&map, &ctx);
		assert!(exact);
		assert!(closure.contains_point(&[Int::from(0), Int::from(1)]));
		assert!(closure.contains_point(&[Int::from(0), Int::from(10)]));
		assert!(closure.contains_point(&[Int::from(5), Int::from(10)]));
		assert!(!closure.contains_point(&[Int::from(5), Int::from(5)]));
		assert!(!closure.contains_point(&[Int::from(0), Int::from(11)]));
	}

	/// `y == x + 1` with no bound on `x` at all never stops discovering
	/// new reachable pairs (`R^k` always contributes `(x, x+k)` for
	/// every `x`), so the round budget is exhausted and this falls back
	/// to the delta-bound approximation. The single delta here is the
	/// single point `z == 1`, whose hull equality has a non-zero
	/// constant, so no invariant survives homogenization and `dom ×
	/// ran` (both unbounded) is all that is left — sound, if loose;
	/// this scope cut is documented in the module's doc comment.
	#[test]
	fn unbounded_self_feeding_relation_is_approximate_but_sound() {
		let ctx = Ctx::default();
		let mut step = BasicMap::alloc(Space::alloc(0, 1, 1), 0, 0, 0, 0);
		step.add_equality_row(row(&[-1, -1, 1])); // y == x + 1
		let map = Map::from_basic_map(step);
		let (closure, exact) = transitive_closure(&map, &ctx);
		assert!(!exact);
		assert!(closure.contains_point(&[Int::from(0), Int::from(5)]));
	}

	#[test]
	fn empty_map_closure_is_exact_and_empty() {
		let ctx = Ctx::default();
		let map = Map::empty(Space::alloc(0, 1, 1));
		let (closure, exact) = transitive_closure(&map, &ctx);
		assert!(exact);
		assert!(closure.is_empty(&ctx));
	}

	/// Default options use [`ClosureStrategy::Kelly`]: an acyclic chain
	/// `0 -> 1` and an unrelated bounded self-feeding relation on a
	/// disjoint range end up in separate strongly connected components.
	/// Each is exact on its own, and since they share no adjacency the
	/// running `path` accumulation just unions their two closures
	/// together, so the whole result is still exact.
	#[test]
	fn kelly_strategy_composes_independent_components_exactly() {
		let ctx = Ctx::default();
		let space = Space::alloc(0, 1, 1);
		let mut step0 = BasicMap::alloc(space.clone(), 0, 0, 0, 0);
		step0.add_equality_row(row(&[0, -1, 0])); // x == 0
		step0.add_equality_row(row(&[-1, 0, 1])); // y == 1
		let mut step1 = BasicMap::alloc(space.clone(), 0, 0, 0, 0);
		step1.add_equality_row(row(&[-1, -1, 0])); // x == 1
		step1.add_equality_row(row(&[-2, 0, 1])); // y == 2
		let mut loop2 = BasicMap::alloc(space.clone(), 0, 0, 0, 0);
		loop2.add_inequality_row(row(&[-100, 1, 0])); // x >= 100
		loop2.add_inequality_row(row(&[109, -1, 0])); // x <= 109
		loop2.add_equality_row(row(&[-1, -1, 1])); // y == x + 1
		let map = Map::from_basic_map(step0).union(Map::from_basic_map(step1)).union(Map::from_basic_map(loop2));
		let (closure, exact) = transitive_closure(&map, &ctx);
		assert!(exact);
		assert!(closure.contains_point(&[Int::from(0), Int::from(1)]));
		assert!(closure.contains_point(&[Int::from(0), Int::from(2)]));
		assert!(closure.contains_point(&[Int::from(100), Int::from(110)]));
		assert!(closure.contains_point(&[Int::from(105), Int::from(110)]));
		assert!(!closure.contains_point(&[Int::from(100), Int::from(111)]));
		assert!(!closure.contains_point(&[Int::from(0), Int::from(3)]));
	}

	/// Selecting [`ClosureStrategy::Isl`] explicitly still reaches the
	/// flat power-iteration path and gives the same exact answer on a
	/// plain chain.
	#[test]
	fn isl_strategy_still_available_via_options() {
		let mut opts = crate::options::Options::default();
		opts.closure = ClosureStrategy::Isl;
		let ctx = Ctx::new(opts);
		let space = Space::alloc(0, 1, 1);
		let mut step0 = BasicMap::alloc(space.clone(), 0, 0, 0, 0);
		step0.add_equality_row(row(&[0, -1, 0])); // x == 0
		step0.add_equality_row(row(&[-1, 0, 1])); // y == 1
		let mut step1 = BasicMap::alloc(space.clone(), 0, 0, 0, 0);
		step1.add_equality_row(row(&[-1, -1, 0])); // x == 1
		step1.add_equality_row(row(&[-2, 0, 1])); // y == 2
		let map = Map::from_basic_map(step0).union(Map::from_basic_map(step1));
		let (closure, exact) = transitive_closure(&map, &ctx);
		assert!(exact);
		assert!(closure.contains_point(&[Int::from(0), Int::from(2)]));
	}
}
