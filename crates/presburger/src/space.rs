//! Dimension layout: how many parameters, input and output dimensions a
//! [`crate::basic_map::BasicMap`] has, and the optional names attached to
//! them.

use std::rc::Rc;

use crate::options::{Ctx, NameId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Which block of a [`Space`] a dimension index falls in.
pub enum DimKind {
	/// A parameter, shared between the domain and range of a map.
	Param,
	/// An input (domain) dimension. Absent (`n_in == 0`) for a set.
	In,
	/// An output (range) dimension, or the only tuple of dims for a set.
	Out,
	/// An existentially quantified div. Divs are not addressed through
	/// [`Space`]; this variant exists only so dimension-moving operations
	/// can describe "append after the last div" uniformly.
	Div,
}

#[derive(Clone, Debug, Default)]
/// Optional per-dimension names, lazily populated: most basic maps carry
/// no names at all.
struct NameTable {
	params: Vec<Option<NameId>>,
	in_dims: Vec<Option<NameId>>,
	out_dims: Vec<Option<NameId>>,
}

#[derive(Clone, Debug)]
/// The dimension layout of a basic map: `(nparam, n_in, n_out)` plus
/// optional names. Reference counted so it can be shared cheaply between
/// basic maps that only differ in their constraints.
pub struct Space(Rc<SpaceInner>);

#[derive(Clone, Debug)]
struct SpaceInner {
	nparam: usize,
	n_in: usize,
	n_out: usize,
	names: NameTable,
}

impl Space {
	/// A space with no names, the given dimension counts.
	pub fn alloc(nparam: usize, n_in: usize, n_out: usize) -> Self {
		Self(Rc::new(SpaceInner {
			nparam,
			n_in,
			n_out,
			names: NameTable {
				params: vec![None; nparam],
				in_dims: vec![None; n_in],
				out_dims: vec![None; n_out],
			},
		}))
	}

	/// A set space (no input dimensions): `alloc(nparam, 0, n_set)`.
	pub fn set_alloc(nparam: usize, n_set: usize) -> Self {
		Self::alloc(nparam, 0, n_set)
	}

	/// Number of parameters.
	pub fn nparam(&self) -> usize {
		self.0.nparam
	}

	/// Number of input (domain) dimensions.
	pub fn n_in(&self) -> usize {
		self.0.n_in
	}

	/// Number of output (range, or set) dimensions.
	pub fn n_out(&self) -> usize {
		self.0.n_out
	}

	/// Total width of the non-div part of a row over this space,
	/// including the leading constant column: `1 + nparam + n_in + n_out`.
	pub fn width(&self) -> usize {
		1 + self.0.nparam + self.0.n_in + self.0.n_out
	}

	/// Column offset of the first coefficient of `kind` within a row.
	pub fn offset(&self, kind: DimKind) -> usize {
		match kind {
			DimKind::Param => 1,
			DimKind::In => 1 + self.0.nparam,
			DimKind::Out => 1 + self.0.nparam + self.0.n_in,
			DimKind::Div => self.width(),
		}
	}

	/// Number of dimensions of `kind` (`Div` is always `0`; div counts
	/// live on the owning [`crate::basic_map::BasicMap`], not the space).
	pub fn dim(&self, kind: DimKind) -> usize {
		match kind {
			DimKind::Param => self.0.nparam,
			DimKind::In => self.0.n_in,
			DimKind::Out => self.0.n_out,
			DimKind::Div => 0,
		}
	}

	/// Set the name of dimension `idx` of `kind`.
	pub fn set_name(&mut self, kind: DimKind, idx: usize, name: NameId) {
		let inner = Rc::make_mut(&mut self.0);
		let table = match kind {
			DimKind::Param => &mut inner.names.params,
			DimKind::In => &mut inner.names.in_dims,
			DimKind::Out => &mut inner.names.out_dims,
			DimKind::Div => return,
		};
		table[idx] = Some(name);
	}

	/// Name of dimension `idx` of `kind`, if any.
	pub fn name(&self, kind: DimKind, idx: usize) -> Option<NameId> {
		match kind {
			DimKind::Param => self.0.names.params[idx],
			DimKind::In => self.0.names.in_dims[idx],
			DimKind::Out => self.0.names.out_dims[idx],
			DimKind::Div => None,
		}
	}

	/// `true` when the two spaces have identical dimension counts *and*
	/// the same names in every named slot.
	pub fn equal(&self, other: &Space) -> bool {
		self.0.nparam == other.0.nparam
			&& self.0.n_in == other.0.n_in
			&& self.0.n_out == other.0.n_out
			&& self.0.names.params == other.0.names.params
			&& self.0.names.in_dims == other.0.names.in_dims
			&& self.0.names.out_dims == other.0.names.out_dims
	}

	/// `true` when the two spaces have identical dimension counts,
	/// ignoring names — the condition required to intersect, apply or
	/// otherwise structurally combine two basic maps.
	pub fn compatible(&self, other: &Space) -> bool {
		self.0.nparam == other.0.nparam && self.0.n_in == other.0.n_in && self.0.n_out == other.0.n_out
	}

	/// Space with the domain and range tuples swapped (`n_in` and
	/// `n_out`, and their name tables, trade places).
	pub fn reverse(&self) -> Self {
		Self(Rc::new(SpaceInner {
			nparam: self.0.nparam,
			n_in: self.0.n_out,
			n_out: self.0.n_in,
			names: NameTable {
				params: self.0.names.params.clone(),
				in_dims: self.0.names.out_dims.clone(),
				out_dims: self.0.names.in_dims.clone(),
			},
		}))
	}

	/// Space for `self` composed with `other` as relations
	/// (`self: A -> B`, `other: B -> C`, result `A -> C`); requires
	/// `self.n_out == other.n_in` and matching parameter counts.
	pub fn join(&self, other: &Space) -> Option<Self> {
		if self.0.nparam != other.0.nparam {
			return None;
		}
		Some(Self::alloc(self.0.nparam, self.0.n_in, other.0.n_out))
	}

	/// Space of the Cartesian product of two maps sharing parameters.
	pub fn product(&self, other: &Space) -> Option<Self> {
		if self.0.nparam != other.0.nparam {
			return None;
		}
		Some(Self::alloc(
			self.0.nparam,
			self.0.n_in + other.0.n_in,
			self.0.n_out + other.0.n_out,
		))
	}

	/// Resolve a dimension name against `ctx`, for display purposes.
	pub fn display_name(&self, ctx: &Ctx, kind: DimKind, idx: usize) -> Option<Rc<str>> {
		self.name(kind, idx).map(|id| ctx.resolve(id))
	}
}

impl PartialEq for Space {
	fn eq(&self, other: &Self) -> bool {
		self.equal(other)
	}
}
impl Eq for Space {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn compatible_ignores_names() {
		let ctx = Ctx::default();
		let mut a = Space::alloc(1, 2, 2);
		let b = Space::alloc(1, 2, 2);
		assert!(a.compatible(&b));
		assert!(a.equal(&b));
		let id = ctx.intern("i");
		a.set_name(DimKind::In, 0, id);
		assert!(a.compatible(&b));
		assert!(!a.equal(&b));
	}

	#[test]
	fn reverse_swaps_in_out() {
		let s = Space::alloc(1, 2, 3);
		let r = s.reverse();
		assert_eq!(r.n_in(), 3);
		assert_eq!(r.n_out(), 2);
	}

	#[test]
	fn offsets_follow_const_param_in_out_layout() {
		let s = Space::alloc(2, 3, 1);
		assert_eq!(s.offset(DimKind::Param), 1);
		assert_eq!(s.offset(DimKind::In), 3);
		assert_eq!(s.offset(DimKind::Out), 6);
		assert_eq!(s.width(), 7);
	}
}
