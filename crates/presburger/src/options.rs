//! In-process configuration. This crate does not specify or implement a
//! global context container (arena block pool, interning table as a
//! persisted singleton) — only the contract such a container must satisfy:
//! a per-thread, non-persisted bag of algorithm choices plus the resource
//! pools the algorithms below consult while they run.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// Which backend a query should prefer when more than one is applicable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LpSolver {
	/// Drive the simplex [`crate::tableau::Tableau`] directly.
	Tab,
	/// Binary search on top of repeated feasibility checks.
	BinarySearch,
}

/// Which backend an integer program should prefer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IlpSolver {
	/// Generalised basis reduction sampling.
	Gbr,
	/// Parametric integer programming (treat as 0-parameter PIP).
	Pip,
}

/// When to fall back from wrapping to Fourier-Motzkin in convex hull.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConvexHullStrategy {
	/// Facet wrapping, falling back to Fourier-Motzkin when wrapping
	/// cannot bound a direction.
	Wrap,
	/// Always use Fourier-Motzkin elimination.
	FourierMotzkin,
}

/// How eagerly to attempt an exact transitive closure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClosureStrategy {
	/// Flat power iteration over the whole map at once, using Tarjan SCC
	/// decomposition of the disjunct adjacency graph only to size the
	/// round budget. See [`crate::closure`].
	Isl,
	/// Decompose the disjunct adjacency graph into strongly connected
	/// components with Tarjan's algorithm and compose each component's
	/// own closure into the overall result in the order Tarjan emits
	/// them, so a bounded cycle no longer has to share a round budget
	/// with disjuncts it can never reach. See [`crate::closure`].
	Kelly,
}

/// Plain data: one field per option consulted by the algorithms in this
/// crate. `Default` matches the documented defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Options {
	/// Backend for rational LP queries.
	pub lp_solver: LpSolver,
	/// Backend for integer LP queries.
	pub ilp_solver: IlpSolver,
	/// Whether `pip` should restrict itself to the context's domain
	/// before recursing.
	pub pip_context: bool,
	/// Run generalised basis reduction during sampling.
	pub gbr: bool,
	/// Stop GBR after the first reduction round instead of iterating to a
	/// fixed point.
	pub gbr_only_first: bool,
	/// Convex hull strategy.
	pub convex: ConvexHullStrategy,
	/// Transitive closure strategy.
	pub closure: ClosureStrategy,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			lp_solver: LpSolver::Tab,
			ilp_solver: IlpSolver::Gbr,
			pip_context: true,
			gbr: true,
			gbr_only_first: false,
			convex: ConvexHullStrategy::Wrap,
			closure: ClosureStrategy::Kelly,
		}
	}
}

index_vec::define_index_type! {
	/// Identifies an interned dimension or div name.
	pub struct NameId = u32;
}

/// Per-thread context: the options in force plus the resource pools the
/// algorithms below share while a query is in flight. Never persisted,
/// never shared across threads — every public entry point borrows a
/// `&Ctx` rather than storing one.
#[derive(Debug, Default)]
pub struct Ctx {
	/// The active option set.
	pub options: Options,
	names: RefCell<HashMap<Rc<str>, NameId>>,
	name_table: RefCell<Vec<Rc<str>>>,
}

impl Ctx {
	/// Build a context with the given options.
	pub fn new(options: Options) -> Self {
		Self {
			options,
			names: RefCell::default(),
			name_table: RefCell::default(),
		}
	}

	/// Intern `name`, returning a stable [`NameId`] for it. Repeated calls
	/// with the same string return the same id.
	pub fn intern(&self, name: &str) -> NameId {
		if let Some(&id) = self.names.borrow().get(name) {
			return id;
		}
		let rc: Rc<str> = Rc::from(name);
		let mut table = self.name_table.borrow_mut();
		let id = NameId::from_usize(table.len());
		table.push(Rc::clone(&rc));
		let _ = self.names.borrow_mut().insert(rc, id);
		id
	}

	/// Resolve an interned name back to its string.
	pub fn resolve(&self, id: NameId) -> Rc<str> {
		Rc::clone(&self.name_table.borrow()[id.index()])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn intern_is_stable() {
		let ctx = Ctx::default();
		let a = ctx.intern("i");
		let b = ctx.intern("j");
		let a2 = ctx.intern("i");
		assert_eq!(a, a2);
		assert_ne!(a, b);
		assert_eq!(&*ctx.resolve(a), "i");
	}
}
