//! The core entity: a conjunction of equalities, inequalities and
//! existentially quantified "div" variables over a [`Space`].
//!
//! A row's layout is `[const | params | in | out | divs]`: the first
//! `space.width()` columns are interpreted by the space, and the
//! remaining `n_div` columns are the divs, ordered so that `div_k`'s
//! defining row only references `div_j` for `j < k`.

mod divs;
mod elim;

use std::rc::Rc;

use tracing::trace;

use crate::{
	int::Int,
	space::{DimKind, Space},
	vector::Vector,
};

pub use elim::eliminate_vars;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Boolean state that is cheaper to check than re-deriving from the
/// constraint list.
pub struct Flags {
	/// A contradictory equality (`const = 1`, everything else `0`) is
	/// present; the basic map denotes the empty relation.
	pub empty: bool,
	/// No further simplification is expected to make progress; set by
	/// [`BasicMap::finalize`].
	pub final_: bool,
	/// All equalities implied by the inequalities have already been
	/// pulled out (no call to detect-implicit-equalities would find
	/// more).
	pub no_implicit: bool,
	/// No inequality is redundant with respect to the others.
	pub no_redundant: bool,
	/// Treat the basic map as a rational polyhedron (ignore
	/// integrality) rather than a lattice-restricted one.
	pub rational: bool,
	/// The constraint list is in the canonical form [`BasicMap::simplify`]
	/// produces (normalized, trivial rows dropped, Gaussian-reduced,
	/// deduplicated); any further mutation clears this.
	pub normalized: bool,
	/// The div list is in the canonical order [`divs::normalize_divs`]
	/// produces; any further mutation clears this.
	pub normalized_divs: bool,
	/// The basic map has no inequalities at all — it denotes (a subset
	/// of) an affine subspace rather than a full-dimensional polyhedron.
	pub all_equalities: bool,
}

#[derive(Clone, Debug)]
/// One div's defining row: `denom * div_k = row · [1; x; div_{<k}]`
/// (floored). `denom == 0` marks the div as "unknown" (no defining row
/// is known yet).
pub struct DivDef {
	/// The denominator. `0` means unknown.
	pub denom: Int,
	/// The numerator row, width `space.width() + k` where `k` is this
	/// div's index.
	pub row: Vector,
}

#[derive(Clone, Debug)]
/// A conjunction of equalities, inequalities and divs over a [`Space`].
pub struct BasicMap {
	space: Rc<Space>,
	divs: Vec<DivDef>,
	eqs: Vec<Vector>,
	ineqs: Vec<Vector>,
	flags: Flags,
	sample: Option<Vector>,
}

/// A [`BasicMap`] whose space has no input dimensions.
pub type BasicSet = BasicMap;

impl BasicMap {
	/// An empty-constraint-list basic map (the universe) of the given
	/// space, reserving room for `n_div` divs plus `extra` more rows than
	/// `n_eq + n_ineq` will initially be filled.
	pub fn alloc(space: Space, n_div: usize, n_eq: usize, n_ineq: usize, extra: usize) -> Self {
		let width = space.width() + n_div;
		let mut eqs = Vec::with_capacity(n_eq + extra);
		eqs.extend((0..n_eq).map(|_| Vector::zero(width)));
		let mut ineqs = Vec::with_capacity(n_ineq + extra);
		ineqs.extend((0..n_ineq).map(|_| Vector::zero(width)));
		Self {
			space: Rc::new(space),
			divs: (0..n_div)
				.map(|_| DivDef {
					denom: Int::zero(),
					row: Vector::zero(width),
				})
				.collect(),
			eqs,
			ineqs,
			flags: Flags::default(),
			sample: None,
		}
	}

	/// The universe relation over `space` (no constraints at all).
	pub fn universe(space: Space) -> Self {
		Self::alloc(space, 0, 0, 0, 0)
	}

	/// The empty relation over `space`: a single contradictory equality.
	pub fn empty(space: Space) -> Self {
		let mut b = Self::alloc(space, 0, 1, 0, 0);
		b.eqs[0].make_mut()[0] = Int::one();
		b.flags.empty = true;
		b.flags.final_ = true;
		b
	}

	/// The space this basic map is defined over.
	pub fn space(&self) -> &Space {
		&self.space
	}

	/// Number of divs.
	pub fn n_div(&self) -> usize {
		self.divs.len()
	}

	/// Total row width: `space.width() + n_div`.
	pub fn width(&self) -> usize {
		self.space.width() + self.divs.len()
	}

	/// Equality rows, borrowed.
	pub fn equalities(&self) -> &[Vector] {
		&self.eqs
	}

	/// Inequality rows, borrowed.
	pub fn inequalities(&self) -> &[Vector] {
		&self.ineqs
	}

	/// Div definitions, borrowed.
	pub fn divs(&self) -> &[DivDef] {
		&self.divs
	}

	/// The flags struct, borrowed.
	pub fn flags(&self) -> Flags {
		self.flags
	}

	/// Quick emptiness test: only looks at the [`Flags::empty`] flag, set
	/// whenever a contradictory equality is known to be present. May
	/// return `false` for a basic map that is empty but hasn't been
	/// [`BasicMap::simplify`]d yet.
	pub fn fast_is_empty(&self) -> bool {
		self.flags.empty
	}

	/// Reserve a new, zeroed equality row and return its index.
	pub fn add_equality(&mut self) -> usize {
		self.eqs.push(Vector::zero(self.width()));
		self.flags.final_ = false;
		self.flags.normalized = false;
		self.eqs.len() - 1
	}

	/// Reserve a new, zeroed inequality row and return its index.
	pub fn add_inequality(&mut self) -> usize {
		self.ineqs.push(Vector::zero(self.width()));
		self.flags.final_ = false;
		self.flags.normalized = false;
		self.flags.all_equalities = false;
		self.ineqs.len() - 1
	}

	/// Add an already-built equality row (`const + coeffs · x = 0`).
	pub fn add_equality_row(&mut self, row: Vector) {
		debug_assert_eq!(row.len(), self.width());
		self.eqs.push(row);
		self.flags.final_ = false;
		self.flags.normalized = false;
	}

	/// Add an already-built inequality row (`const + coeffs · x >= 0`).
	pub fn add_inequality_row(&mut self, row: Vector) {
		debug_assert_eq!(row.len(), self.width());
		self.ineqs.push(row);
		self.flags.final_ = false;
		self.flags.normalized = false;
		self.flags.all_equalities = false;
	}

	/// Drop equality `k`, swap-removing it from the list.
	pub fn drop_equality(&mut self, k: usize) {
		let _ = self.eqs.swap_remove(k);
		self.flags.final_ = false;
		self.flags.normalized = false;
	}

	/// Drop inequality `k`, swap-removing it from the list.
	pub fn drop_inequality(&mut self, k: usize) {
		let _ = self.ineqs.swap_remove(k);
		self.flags.final_ = false;
		self.flags.normalized = false;
	}

	/// Move inequality `k` to the equality list (both directions of the
	/// inequality are implied equal, typically after a redundancy check
	/// on the tableau).
	pub fn inequality_to_equality(&mut self, k: usize) {
		let row = self.ineqs.swap_remove(k);
		self.eqs.push(row);
		self.flags.no_implicit = false;
		self.flags.final_ = false;
		self.flags.normalized = false;
	}

	/// Drop div `k`: removes its defining row and the `k`-th div column
	/// from every equality, inequality and later div row, and
	/// renumbers.
	pub fn drop_div(&mut self, k: usize) {
		let col = self.space.width() + k;
		for row in self.eqs.iter_mut().chain(self.ineqs.iter_mut()) {
			row.make_mut().remove(col);
		}
		for (j, d) in self.divs.iter_mut().enumerate() {
			if j <= k {
				continue;
			}
			if col < d.row.len() {
				d.row.make_mut().remove(col);
			}
		}
		let _ = self.divs.remove(k);
		self.flags.final_ = false;
		self.flags.normalized = false;
	}

	/// Append a new div with the given defining row (width must already
	/// match the *post*-append width, i.e. include the new div's own
	/// column if it depends on itself trivially — it must not).
	pub fn add_div(&mut self, denom: Int, mut row_before_divs: Vec<Int>) -> usize {
		let old_width = self.width();
		debug_assert!(row_before_divs.len() <= old_width + 1);
		row_before_divs.resize(old_width + 1, Int::zero());
		for row in self.eqs.iter_mut().chain(self.ineqs.iter_mut()) {
			row.make_mut().push(Int::zero());
		}
		for d in &mut self.divs {
			d.row.make_mut().push(Int::zero());
		}
		self.divs.push(DivDef {
			denom,
			row: Vector::from_vec(row_before_divs),
		});
		self.flags.final_ = false;
		self.flags.normalized = false;
		self.divs.len() - 1
	}

	/// Reduce the equalities to reduced row-echelon form, pivoting from
	/// the last column backward so divs (and then output, input, param
	/// columns) are eliminated first. Sets [`Flags::empty`] if a
	/// contradictory zero row remains.
	pub fn gauss(&mut self) {
		let width = self.width();
		let mut pivot_row = 0;
		for col in (1..width).rev() {
			if pivot_row >= self.eqs.len() {
				break;
			}
			let Some(sel) = (pivot_row..self.eqs.len()).find(|&r| !self.eqs[r][col].is_zero()) else {
				continue;
			};
			self.eqs.swap(pivot_row, sel);
			if self.eqs[pivot_row][col].is_negative() {
				let negated = self.eqs[pivot_row].negate();
				self.eqs[pivot_row] = negated;
			}
			for r in 0..self.eqs.len() {
				if r == pivot_row || self.eqs[r][col].is_zero() {
					continue;
				}
				let factor = -self.eqs[r][col].clone();
				let combined = self.eqs[r].combine(&factor, &self.eqs[pivot_row]);
				self.eqs[r] = combined;
			}
			pivot_row += 1;
		}
		for eq in &self.eqs {
			if eq.as_slice()[1..].iter().all(Int::is_zero) && !eq[0].is_zero() {
				self.flags.empty = true;
			}
		}
		self.flags.final_ = false;
		self.flags.normalized = false;
		trace!(pivots = pivot_row, "gauss reduced equalities");
	}

	/// Divide each row by the GCD of its non-constant coefficients. An
	/// equality whose constant is not divisible by that GCD makes the
	/// basic map empty; an inequality floor-divides its constant.
	pub fn normalize_constraints(&mut self) {
		let width = self.width();
		let mut to_drop = vec![];
		for (i, eq) in self.eqs.iter_mut().enumerate() {
			let g = eq.gcd_range(1..width);
			if g.is_zero() || g.is_one() {
				continue;
			}
			if (&eq[0] % &g).is_zero() {
				*eq = Vector::from_vec(eq.as_slice().iter().map(|c| c.exact_div(&g)).collect());
			} else {
				self.flags.empty = true;
				let _ = i;
			}
		}
		for (i, ineq) in self.ineqs.iter_mut().enumerate() {
			let g = ineq.gcd_range(1..width);
			if g.is_zero() || g.is_one() {
				continue;
			}
			let new_const = ineq[0].floor_div(&g);
			let mut coeffs: Vec<Int> = ineq.as_slice()[1..].iter().map(|c| c.exact_div(&g)).collect();
			let mut row = vec![new_const];
			row.append(&mut coeffs);
			*ineq = Vector::from_vec(row);
			let _ = i;
		}
		for (i, ineq) in self.ineqs.iter().enumerate() {
			if ineq.is_zero() {
				to_drop.push(i);
			}
		}
		for i in to_drop.into_iter().rev() {
			let _ = self.ineqs.remove(i);
		}
		self.flags.final_ = false;
		self.flags.normalized = false;
	}

	/// Drop every equality/inequality row whose non-constant part is
	/// entirely zero and whose constant satisfies the constraint
	/// trivially, and mark [`Flags::empty`] when it does not.
	fn drop_trivial_rows(&mut self) {
		let width = self.width();
		self.eqs.retain(|eq| {
			if eq.as_slice()[1..width].iter().all(Int::is_zero) {
				if !eq[0].is_zero() {
					self.flags.empty = true;
				}
				false
			} else {
				true
			}
		});
		self.ineqs.retain(|ineq| {
			if ineq.as_slice()[1..width].iter().all(Int::is_zero) {
				if ineq[0].is_negative() {
					self.flags.empty = true;
				}
				false
			} else {
				true
			}
		});
	}

	/// Remove exact-duplicate rows (equalities and inequalities are each
	/// deduplicated within their own list).
	fn remove_duplicate_constraints(&mut self) {
		dedup_unordered(&mut self.eqs);
		dedup_unordered(&mut self.ineqs);
	}

	/// Fixed-point simplification loop: normalize constraints, eliminate
	/// divs, re-run Gauss, normalize divs, drop duplicate divs and
	/// constraints, until nothing reports progress.
	pub fn simplify(&mut self) {
		loop {
			let before = (self.eqs.len(), self.ineqs.len(), self.divs.len());
			self.normalize_constraints();
			self.drop_trivial_rows();
			self.gauss();
			divs::eliminate_divs_eq(self);
			divs::eliminate_divs_ineq(self);
			divs::remove_duplicate_divs(self);
			divs::remove_redundant_divs(self);
			self.remove_duplicate_constraints();
			if self.flags.empty {
				self.eqs.clear();
				self.ineqs.clear();
				self.divs.clear();
				let width = self.space.width();
				let mut row = vec![Int::zero(); width];
				row[0] = Int::one();
				self.eqs.push(Vector::from_vec(row));
				break;
			}
			let after = (self.eqs.len(), self.ineqs.len(), self.divs.len());
			if before == after {
				break;
			}
		}
		divs::normalize_divs(self);
		self.flags.final_ = false;
		self.flags.normalized = true;
		self.flags.normalized_divs = true;
		self.flags.all_equalities = self.ineqs.is_empty();
	}

	/// Mark the basic map as fully simplified; no further progress is
	/// expected from another [`BasicMap::simplify`] call.
	pub fn finalize(&mut self) {
		self.flags.final_ = true;
	}

	/// Intersect two basic maps over the same space: concatenate their
	/// constraint lists (divs of `other` are appended via
	/// [`BasicMap::align_divs`] first).
	pub fn intersect(&self, other: &BasicMap) -> BasicMap {
		debug_assert!(self.space.compatible(&other.space));
		let mut lhs = self.clone();
		let rhs = lhs.align_divs(other);
		lhs.eqs.extend(rhs.eqs);
		lhs.ineqs.extend(rhs.ineqs);
		lhs.flags.final_ = false;
		lhs.flags.normalized = false;
		lhs.flags.normalized_divs = false;
		lhs.flags.no_implicit = false;
		lhs.flags.no_redundant = false;
		lhs.flags.all_equalities = false;
		lhs.sample = None;
		lhs
	}

	/// Relation composition: `self: A -> B`, `other: B -> C`, result
	/// `A -> C`, by treating `self`'s output and `other`'s input as the
	/// same variables, constraining them equal, then projecting them
	/// out.
	pub fn apply_range(&self, other: &BasicMap) -> Option<BasicMap> {
		let joined_space = self.space.join(&other.space)?;
		let p = self.space.nparam();
		let n_in = self.space.n_in();
		let mid = self.space.n_out();
		let n_out2 = other.space.n_out();

		let mut b = BasicMap::alloc(joined_space, 0, 0, 0, 0);
		// self's rows: [const|param|in|mid], padded with zero for other's out.
		for row in &self.eqs {
			let mut r: Vec<Int> = row.as_slice().to_vec();
			r.resize(1 + p + n_in + mid + n_out2, Int::zero());
			b.eqs.push(Vector::from_vec(r));
		}
		for row in &self.ineqs {
			let mut r: Vec<Int> = row.as_slice().to_vec();
			r.resize(1 + p + n_in + mid + n_out2, Int::zero());
			b.ineqs.push(Vector::from_vec(r));
		}
		// other's rows: [const|param|mid|out2] -> shift mid block after n_in.
		for row in &other.eqs {
			b.eqs.push(shift_other_row(row, p, n_in, mid, n_out2));
		}
		for row in &other.ineqs {
			b.ineqs.push(shift_other_row(row, p, n_in, mid, n_out2));
		}
		b.flags.final_ = false;
		b.flags.all_equalities = b.ineqs.is_empty();
		Some(b.project_out(DimKind::Out, 0, mid))
	}

	/// `self` composed with `other` applied to the domain:
	/// `reverse(reverse(self).apply_range(other))`-shaped, i.e. `other`
	/// restricts/transforms `self`'s input.
	pub fn apply_domain(&self, other: &BasicMap) -> Option<BasicMap> {
		Some(self.reverse().apply_range(&other.reverse())?.reverse())
	}

	/// Swap input and output dimensions.
	pub fn reverse(&self) -> BasicMap {
		let n_in = self.space.n_in();
		let n_out = self.space.n_out();
		let p = self.space.nparam();
		let swap_row = |row: &Vector| -> Vector {
			let mut r = row.as_slice().to_vec();
			let (lo, hi) = (1 + p, 1 + p + n_in);
			let ins: Vec<Int> = r[lo..hi].to_vec();
			let outs: Vec<Int> = r[hi..hi + n_out].to_vec();
			r[lo..lo + n_out].clone_from_slice(&outs);
			r[lo + n_out..lo + n_out + n_in].clone_from_slice(&ins);
			Vector::from_vec(r)
		};
		BasicMap {
			space: Rc::new(self.space.reverse()),
			divs: self.divs.clone(),
			eqs: self.eqs.iter().map(swap_row).collect(),
			ineqs: self.ineqs.iter().map(swap_row).collect(),
			flags: self.flags,
			sample: None,
		}
	}

	/// Cartesian product: independent conjunction of `self` and `other`
	/// over disjoint copies of their input/output dims, sharing
	/// parameters.
	pub fn product(&self, other: &BasicMap) -> Option<BasicMap> {
		let space = self.space.product(&other.space)?;
		let p = self.space.nparam();
		let (n_in1, n_out1) = (self.space.n_in(), self.space.n_out());
		let (n_in2, n_out2) = (other.space.n_in(), other.space.n_out());
		let new_width_no_div = space.width();

		let embed_lhs = |row: &Vector| -> Vector {
			let mut r = vec![Int::zero(); new_width_no_div];
			r[0] = row[0].clone();
			r[1..1 + p].clone_from_slice(&row.as_slice()[1..1 + p]);
			r[1 + p..1 + p + n_in1].clone_from_slice(&row.as_slice()[1 + p..1 + p + n_in1]);
			let out_off = 1 + p + n_in1 + n_in2;
			r[out_off..out_off + n_out1].clone_from_slice(&row.as_slice()[1 + p + n_in1..1 + p + n_in1 + n_out1]);
			Vector::from_vec(r)
		};
		let embed_rhs = |row: &Vector| -> Vector {
			let mut r = vec![Int::zero(); new_width_no_div];
			r[0] = row[0].clone();
			r[1..1 + p].clone_from_slice(&row.as_slice()[1..1 + p]);
			let in_off = 1 + p + n_in1;
			r[in_off..in_off + n_in2].clone_from_slice(&row.as_slice()[1 + p..1 + p + n_in2]);
			let out_off = 1 + p + n_in1 + n_in2 + n_out1;
			r[out_off..out_off + n_out2].clone_from_slice(&row.as_slice()[1 + p + n_in2..1 + p + n_in2 + n_out2]);
			Vector::from_vec(r)
		};
		let mut b = BasicMap::alloc(space, 0, 0, 0, 0);
		b.eqs = self.eqs.iter().map(embed_lhs).chain(other.eqs.iter().map(embed_rhs)).collect();
		b.ineqs = self.ineqs.iter().map(embed_lhs).chain(other.ineqs.iter().map(embed_rhs)).collect();
		Some(b)
	}

	/// Existentially quantify away `n` dimensions of `kind` starting at
	/// `first`, via Fourier-Motzkin elimination.
	pub fn project_out(&self, kind: DimKind, first: usize, n: usize) -> BasicMap {
		if n == 0 {
			return self.clone();
		}
		let pos = self.space.offset(kind) + first;
		let mut b = self.clone();
		elim::eliminate_vars(&mut b, pos, n);
		b.remove_dim_columns(kind, first, n);
		b
	}

	/// Drop `n` columns of `kind` starting at `first` from every row and
	/// shrink the space accordingly. Caller must ensure those columns
	/// are already eliminated (all-zero) from every constraint.
	fn remove_dim_columns(&mut self, kind: DimKind, first: usize, n: usize) {
		let pos = self.space.offset(kind) + first;
		for row in self.eqs.iter_mut().chain(self.ineqs.iter_mut()) {
			let v = row.make_mut();
			let _ = v.drain(pos..pos + n);
		}
		for d in &mut self.divs {
			if d.row.len() > pos {
				let v = d.row.make_mut();
				let end = (pos + n).min(v.len());
				if pos < end {
					let _ = v.drain(pos..end);
				}
			}
		}
		let space = Rc::make_mut(&mut self.space);
		let (p, i, o) = (space.nparam(), space.n_in(), space.n_out());
		*space = match kind {
			DimKind::Param => Space::alloc(p - n, i, o),
			DimKind::In => Space::alloc(p, i - n, o),
			DimKind::Out => Space::alloc(p, i, o - n),
			DimKind::Div => unreachable!("divs are not part of the space"),
		};
		self.flags.final_ = false;
		self.flags.normalized = false;
	}

	/// Append `n` fresh, unconstrained dimensions of `kind` after the
	/// existing ones.
	pub fn add_dims(&mut self, kind: DimKind, n: usize) {
		if n == 0 {
			return;
		}
		let pos = self.space.offset(kind) + self.space.dim(kind);
		for row in self.eqs.iter_mut().chain(self.ineqs.iter_mut()) {
			let v = row.make_mut();
			for _ in 0..n {
				v.insert(pos, Int::zero());
			}
		}
		for d in &mut self.divs {
			if d.row.len() >= pos {
				let v = d.row.make_mut();
				for _ in 0..n {
					v.insert(pos, Int::zero());
				}
			}
		}
		let space = Rc::make_mut(&mut self.space);
		let (p, i, o) = (space.nparam(), space.n_in(), space.n_out());
		*space = match kind {
			DimKind::Param => Space::alloc(p + n, i, o),
			DimKind::In => Space::alloc(p, i + n, o),
			DimKind::Out => Space::alloc(p, i, o + n),
			DimKind::Div => unreachable!("divs are not part of the space"),
		};
		self.flags.final_ = false;
		self.flags.normalized = false;
	}

	/// Insert `n` fresh dimensions of `kind` at position `first` (shifting
	/// existing dimensions of that kind at or after `first` up by `n`).
	pub fn insert_dims(&mut self, kind: DimKind, first: usize, n: usize) {
		if n == 0 {
			return;
		}
		let dim = self.space.dim(kind);
		debug_assert!(first <= dim);
		self.add_dims(kind, n);
		if first == dim {
			return;
		}
		// Rotate the newly appended block into position `first`.
		let pos = self.space.offset(kind);
		for row in self.eqs.iter_mut().chain(self.ineqs.iter_mut()) {
			let v = row.make_mut();
			v[pos + first..pos + dim + n].rotate_right(n);
		}
		for d in &mut self.divs {
			if d.row.len() >= pos + dim + n {
				let v = d.row.make_mut();
				v[pos + first..pos + dim + n].rotate_right(n);
			}
		}
	}

	/// Move `n` dimensions of `src_kind` starting at `src_first` to just
	/// before position `dst_first` of `dst_kind`.
	pub fn move_dims(&mut self, dst_kind: DimKind, dst_first: usize, src_kind: DimKind, src_first: usize, n: usize) {
		if n == 0 {
			return;
		}
		let src_pos = self.space.offset(src_kind) + src_first;
		let dst_pos_before_removal = self.space.offset(dst_kind) + dst_first;
		for row in self.eqs.iter_mut().chain(self.ineqs.iter_mut()) {
			let v = row.make_mut();
			let moved: Vec<Int> = v.drain(src_pos..src_pos + n).collect();
			let dst_pos = if dst_pos_before_removal > src_pos {
				dst_pos_before_removal - n
			} else {
				dst_pos_before_removal
			};
			for (i, val) in moved.into_iter().enumerate() {
				v.insert(dst_pos + i, val);
			}
		}
		let space = Rc::make_mut(&mut self.space);
		let (p, i, o) = (space.nparam(), space.n_in(), space.n_out());
		let mut dims = [p, i, o];
		let src_idx = match src_kind {
			DimKind::Param => 0,
			DimKind::In => 1,
			DimKind::Out => 2,
			DimKind::Div => unreachable!(),
		};
		let dst_idx = match dst_kind {
			DimKind::Param => 0,
			DimKind::In => 1,
			DimKind::Out => 2,
			DimKind::Div => unreachable!(),
		};
		dims[src_idx] -= n;
		dims[dst_idx] += n;
		*space = Space::alloc(dims[0], dims[1], dims[2]);
		self.flags.final_ = false;
		self.flags.normalized = false;
	}

	/// Extend `self`'s div list in place with exactly those divs of
	/// `other` it does not already contain (matched by defining row,
	/// once both are padded to a shared width), permuting so matching
	/// divs share an index. Returns `other` re-expressed over the merged
	/// div list.
	pub fn align_divs(&mut self, other: &BasicMap) -> BasicMap {
		divs::align_divs(self, other)
	}

	/// `true` if [`BasicMap::simplify`] + a feasibility check show no
	/// point satisfies the constraints. Uses the cheap flag check first.
	pub fn is_empty(&self, ctx: &crate::options::Ctx) -> bool {
		if self.flags.empty {
			return true;
		}
		let tab = crate::tableau::Tableau::from_basic_map(self, ctx);
		tab.is_empty()
	}

	/// `true` if the basic map has no constraints at all (the universe).
	pub fn is_universe(&self) -> bool {
		self.eqs.is_empty() && self.ineqs.is_empty()
	}

	/// `true` if `point` (length `space.width()-1`, divs computed
	/// automatically) satisfies every equality and inequality.
	pub fn contains_point(&self, point: &[Int]) -> bool {
		debug_assert_eq!(point.len(), self.space.width() - 1);
		let mut full = vec![Int::one()];
		full.extend_from_slice(point);
		for d in &self.divs {
			if d.denom.is_zero() {
				return false;
			}
			// `d.row` is kept padded to the *final* width() at the time it
			// was stored (every later div's column included, always zero
			// there), not just to its own priors, so `full` needs the same
			// trailing padding before the two can be dotted together.
			let mut vals = full[1..].to_vec();
			vals.resize(d.row.len() - 1, Int::zero());
			let val = d.row.eval(&vals);
			full.push(val.floor_div(&d.denom));
		}
		self.eqs.iter().all(|r| r.eval(&full[1..]).is_zero())
			&& self.ineqs.iter().all(|r| !r.eval(&full[1..]).is_negative())
	}

	/// Cached integer sample, if one has been computed and stored by
	/// [`crate::sample`].
	pub fn cached_sample(&self) -> Option<&Vector> {
		self.sample.as_ref()
	}

	/// Store an integer sample point found for this basic map.
	pub fn set_cached_sample(&mut self, sample: Vector) {
		self.sample = Some(sample);
	}

	/// Lexicographic minimum of this map's output dimensions as a
	/// function of `dom`, a basic set restricting its parameters and
	/// input dimensions: see [`crate::pip`].
	pub fn partial_lexmin(&self, dom: &BasicMap, ctx: &crate::options::Ctx) -> (crate::set::Map, crate::set::Map) {
		crate::pip::partial_lexmin(self, dom, ctx)
	}
}

fn shift_other_row(row: &Vector, p: usize, n_in: usize, mid: usize, n_out2: usize) -> Vector {
	let mut r = vec![Int::zero(); 1 + p + n_in + mid + n_out2];
	r[0] = row[0].clone();
	r[1..1 + p].clone_from_slice(&row.as_slice()[1..1 + p]);
	let mid_off = 1 + p + n_in;
	r[mid_off..mid_off + mid].clone_from_slice(&row.as_slice()[1 + p..1 + p + mid]);
	let out_off = mid_off + mid;
	r[out_off..out_off + n_out2].clone_from_slice(&row.as_slice()[1 + p + mid..1 + p + mid + n_out2]);
	Vector::from_vec(r)
}

fn dedup_unordered(rows: &mut Vec<Vector>) {
	let mut seen: Vec<Vector> = Vec::with_capacity(rows.len());
	rows.retain(|r| {
		if seen.contains(r) {
			false
		} else {
			seen.push(r.clone());
			true
		}
	});
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::space::Space;

	fn row(xs: &[i64]) -> Vector {
		Vector::from_vec(xs.iter().map(|&x| Int::from(x)).collect())
	}

	#[test]
	fn empty_has_contradictory_equality() {
		let b = BasicMap::empty(Space::set_alloc(0, 2));
		assert!(b.fast_is_empty());
	}

	#[test]
	fn gauss_detects_contradiction() {
		// 0 = 1
		let mut b = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		b.add_equality_row(row(&[1, 0]));
		b.gauss();
		assert!(b.flags.empty);
	}

	#[test]
	fn normalize_divides_by_gcd() {
		let mut b = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[0, 4])); // 4x >= 0
		b.normalize_constraints();
		assert_eq!(b.ineqs[0], row(&[0, 1]));
	}

	#[test]
	fn project_out_removes_column() {
		// 0 <= x <= y, project out x: leaves universe over y (no residual
		// constraint after FM when x's bounds are one-sided is non-trivial,
		// so test only the column count shrinks).
		let mut b = BasicMap::alloc(Space::set_alloc(0, 2), 0, 0, 0, 0);
		b.add_inequality_row(row(&[0, 1, 0])); // x >= 0
		let p = b.project_out(DimKind::Out, 0, 1);
		assert_eq!(p.space().n_out(), 1);
		for c in p.ineqs.iter().chain(p.eqs.iter()) {
			assert_eq!(c.len(), p.width());
		}
	}

	#[test]
	fn reverse_swaps_in_out_dims() {
		let mut b = BasicMap::alloc(Space::alloc(0, 1, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[0, 1, 0])); // in >= 0
		let r = b.reverse();
		assert_eq!(r.ineqs[0], row(&[0, 0, 1]));
	}
}
