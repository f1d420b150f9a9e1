//! A disjunctive union of [`BasicMap`]s sharing one [`Space`]: the
//! `Map`/`Set` container. Most operations simply map the corresponding
//! [`BasicMap`] operation over every disjunct and concatenate the
//! results; the interesting work (merging overlapping disjuncts,
//! computing a set difference) is delegated to [`crate::coalesce`] and
//! [`crate::subtract`].

use std::rc::Rc;

use tracing::trace;

use crate::{
	basic_map::BasicMap,
	coalesce, closure, hull,
	options::Ctx,
	space::{DimKind, Space},
	subtract,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Boolean state about the disjunct list, cheaper to check than
/// re-deriving.
pub struct Flags {
	/// The disjuncts are known pairwise disjoint.
	pub disjoint: bool,
	/// The disjunct list is in canonical order with no two disjuncts
	/// that could be merged by [`Map::coalesce`].
	pub normalized: bool,
}

#[derive(Clone, Debug)]
/// A union of basic maps (or, when `space.n_in() == 0`, basic sets) over
/// one shared [`Space`].
pub struct Map {
	space: Rc<Space>,
	flags: Flags,
	disjuncts: Vec<BasicMap>,
}

/// A [`Map`] whose space has no input dimensions.
pub type Set = Map;

impl Map {
	/// The empty union (no disjuncts) over `space`.
	pub fn empty(space: Space) -> Self {
		Self {
			space: Rc::new(space),
			flags: Flags { disjoint: true, normalized: true },
			disjuncts: vec![],
		}
	}

	/// The union containing exactly `b`.
	pub fn from_basic_map(b: BasicMap) -> Self {
		Self {
			space: Rc::new(b.space().clone()),
			flags: Flags { disjoint: true, normalized: true },
			disjuncts: vec![b],
		}
	}

	/// The universe relation over `space` (a single universe disjunct).
	pub fn universe(space: Space) -> Self {
		let b = BasicMap::universe(space);
		Self::from_basic_map(b)
	}

	/// The space shared by every disjunct.
	pub fn space(&self) -> &Space {
		&self.space
	}

	/// The disjunct list, borrowed.
	pub fn basic_maps(&self) -> &[BasicMap] {
		&self.disjuncts
	}

	/// The flags struct.
	pub fn flags(&self) -> Flags {
		self.flags
	}

	/// `true` if every disjunct is empty (after simplifying each).
	pub fn is_empty(&self, ctx: &Ctx) -> bool {
		self.disjuncts.iter().all(|b| {
			let mut b = b.clone();
			b.simplify();
			b.is_empty(ctx)
		})
	}

	/// `true` if some disjunct is the universe.
	pub fn is_universe(&self) -> bool {
		self.disjuncts.iter().any(BasicMap::is_universe)
	}

	/// `true` if `point` (width `self.space.width()`, no div columns) is
	/// contained in some disjunct.
	pub fn contains_point(&self, point: &[crate::int::Int]) -> bool {
		self.disjuncts.iter().any(|b| b.contains_point(point))
	}

	/// Union: concatenate disjunct lists. Cheap; does not coalesce —
	/// call [`Map::coalesce`] afterwards if a minimal disjunct count
	/// matters.
	pub fn union(mut self, mut other: Map) -> Map {
		debug_assert!(self.space.compatible(&other.space));
		self.disjuncts.append(&mut other.disjuncts);
		self.flags.disjoint = false;
		self.flags.normalized = false;
		self
	}

	/// Intersect every pair of disjuncts, dropping empty results.
	pub fn intersect(&self, other: &Map, ctx: &Ctx) -> Map {
		debug_assert!(self.space.compatible(&other.space));
		let mut out = Vec::with_capacity(self.disjuncts.len() * other.disjuncts.len());
		for a in &self.disjuncts {
			for b in &other.disjuncts {
				let mut r = a.intersect(b);
				r.simplify();
				if !r.is_empty(ctx) {
					out.push(r);
				}
			}
		}
		Map {
			space: self.space.clone(),
			flags: Flags { disjoint: false, normalized: false },
			disjuncts: out,
		}
	}

	/// Apply each disjunct of `self` then of `other` pairwise
	/// (relational composition), dropping pairs whose spaces cannot be
	/// joined.
	pub fn apply_range(&self, other: &Map) -> Option<Map> {
		let space = self.space.join(&other.space)?;
		let mut out = Vec::with_capacity(self.disjuncts.len() * other.disjuncts.len());
		for a in &self.disjuncts {
			for b in &other.disjuncts {
				if let Some(r) = a.apply_range(b) {
					out.push(r);
				}
			}
		}
		Some(Map {
			space: Rc::new(space),
			flags: Flags { disjoint: false, normalized: false },
			disjuncts: out,
		})
	}

	/// `self` restricted on the domain side by `other`: see
	/// [`BasicMap::apply_domain`].
	pub fn apply_domain(&self, other: &Map) -> Option<Map> {
		let reversed = self.reverse().apply_range(other)?;
		Some(reversed.reverse())
	}

	/// Swap domain and range of every disjunct.
	pub fn reverse(&self) -> Map {
		Map {
			space: Rc::new(self.space.reverse()),
			flags: self.flags,
			disjuncts: self.disjuncts.iter().map(BasicMap::reverse).collect(),
		}
	}

	/// Cartesian product, disjunct by disjunct.
	pub fn product(&self, other: &Map) -> Option<Map> {
		let space = self.space.product(&other.space)?;
		let mut out = Vec::with_capacity(self.disjuncts.len() * other.disjuncts.len());
		for a in &self.disjuncts {
			for b in &other.disjuncts {
				if let Some(r) = a.product(b) {
					out.push(r);
				}
			}
		}
		Some(Map {
			space: Rc::new(space),
			flags: Flags { disjoint: false, normalized: false },
			disjuncts: out,
		})
	}

	/// Project out `n` dimensions of `kind` starting at `first` in every
	/// disjunct.
	pub fn project_out(&self, kind: DimKind, first: usize, n: usize) -> Map {
		if n == 0 {
			return self.clone();
		}
		let disjuncts: Vec<BasicMap> = self.disjuncts.iter().map(|b| b.project_out(kind, first, n)).collect();
		let space = disjuncts.first().map(|b| b.space().clone()).unwrap_or_else(|| {
			let (mut p, mut i, mut o) = (self.space.nparam(), self.space.n_in(), self.space.n_out());
			match kind {
				DimKind::Param => p -= n,
				DimKind::In => i -= n,
				DimKind::Out => o -= n,
				DimKind::Div => {}
			}
			Space::alloc(p, i, o)
		});
		Map {
			space: Rc::new(space),
			flags: Flags { disjoint: false, normalized: false },
			disjuncts,
		}
	}

	/// Drop disjuncts that simplify to empty, then run the pairwise
	/// coalescing driver ([`crate::coalesce`]) until a fixed point, and
	/// sort the survivors into a canonical, hash-stable order.
	pub fn coalesce(&self, ctx: &Ctx) -> Map {
		let mut live: Vec<BasicMap> = self
			.disjuncts
			.iter()
			.cloned()
			.map(|mut b| {
				b.simplify();
				b
			})
			.filter(|b| !b.is_empty(ctx))
			.collect();
		coalesce::coalesce_in_place(&mut live, ctx);
		live.sort_by_key(coalesce::canonical_key);
		trace!(before = self.disjuncts.len(), after = live.len(), "coalesced union");
		Map {
			space: self.space.clone(),
			flags: Flags { disjoint: self.flags.disjoint, normalized: true },
			disjuncts: live,
		}
	}

	/// `self \ other`, computed disjunct-by-disjunct via
	/// [`crate::subtract`] and unioned (the pieces subtract produces for
	/// distinct `self`-disjuncts are themselves pairwise disjoint, but
	/// not necessarily disjoint from pieces produced for other
	/// `self`-disjuncts, hence no `disjoint` flag on the result).
	pub fn subtract(&self, other: &Map, ctx: &Ctx) -> Map {
		let mut out = Vec::new();
		for a in &self.disjuncts {
			out.extend(subtract::subtract(a, &other.disjuncts, ctx));
		}
		Map {
			space: self.space.clone(),
			flags: Flags { disjoint: false, normalized: false },
			disjuncts: out,
		}
	}

	/// Over-approximate the transitive closure of `self` (a map from a
	/// space to itself): see [`crate::closure`].
	pub fn transitive_closure(&self, ctx: &Ctx) -> (Map, bool) {
		closure::transitive_closure(self, ctx)
	}

	/// The smallest affine subspace containing every disjunct: see
	/// [`crate::hull`].
	pub fn affine_hull(&self, ctx: &Ctx) -> BasicMap {
		hull::affine_hull(self, ctx)
	}

	/// The smallest convex set containing every disjunct: see
	/// [`crate::hull`].
	pub fn convex_hull(&self, ctx: &Ctx) -> BasicMap {
		hull::convex_hull(self, ctx)
	}
}
