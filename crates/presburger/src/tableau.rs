//! The simplex tableau: the analytical shadow of a [`BasicMap`] that
//! backs every feasibility, optimisation, equality-detection and
//! redundancy query.
//!
//! Internally every query is answered by a two-phase primal simplex
//! over exact rationals (`Rat`, a reduced `Int` numerator/denominator
//! pair). Presburger variables are unrestricted in sign, which the
//! textbook simplex method does not handle directly (it assumes every
//! column is non-negative); rather than reimplementing isl's bespoke
//! sign-tracking tableau, each original variable `x` is split into two
//! non-negative columns `p - m` (a standard LP transformation), plus one
//! slack and one artificial column per row. This keeps the pivoting
//! itself completely textbook (Bland's rule throughout, for guaranteed
//! termination) at the cost of a wider tableau.
//!
//! Undo is implemented as whole-tableau snapshots rather than isl's
//! fine-grained operation log: every tableau here is small enough
//! (bounded by the basic map it was built from) that cloning the row
//! list is cheaper to get right than replaying an undo log.

use std::cmp::Ordering;

use tracing::trace;

use crate::{basic_map::BasicMap, int::Int, options::Ctx, vector::Vector};

#[derive(Clone, Debug, PartialEq, Eq)]
/// An exact rational number, always kept with a positive, reduced
/// denominator.
pub struct Rat {
	num: Int,
	den: Int,
}

impl Rat {
	/// Build `num/den`, reducing by the GCD and normalising the sign so
	/// `den > 0`.
	pub fn new(num: Int, den: Int) -> Self {
		debug_assert!(!den.is_zero(), "rational with zero denominator");
		let (mut num, mut den) = if den.is_negative() { (-num, -den) } else { (num, den) };
		let g = num.gcd(&den);
		if !g.is_zero() && !g.is_one() {
			num = num.exact_div(&g);
			den = den.exact_div(&g);
		}
		Self { num, den }
	}

	/// The rational `0`.
	pub fn zero() -> Self {
		Self { num: Int::zero(), den: Int::one() }
	}

	/// Build from an integer.
	pub fn from_int(v: Int) -> Self {
		Self { num: v, den: Int::one() }
	}

	/// `true` when exactly zero.
	pub fn is_zero(&self) -> bool {
		self.num.is_zero()
	}

	/// `true` when strictly negative.
	pub fn is_negative(&self) -> bool {
		self.num.is_negative()
	}

	/// `true` when strictly positive.
	pub fn is_positive(&self) -> bool {
		self.num.is_positive()
	}

	/// Addition.
	pub fn add(&self, other: &Rat) -> Rat {
		Rat::new(&self.num * &other.den + &other.num * &self.den, &self.den * &other.den)
	}

	/// Subtraction.
	pub fn sub(&self, other: &Rat) -> Rat {
		Rat::new(&self.num * &other.den - &other.num * &self.den, &self.den * &other.den)
	}

	/// Multiplication.
	pub fn mul(&self, other: &Rat) -> Rat {
		Rat::new(&self.num * &other.num, &self.den * &other.den)
	}

	/// Division. `other` must be non-zero.
	pub fn div(&self, other: &Rat) -> Rat {
		debug_assert!(!other.is_zero());
		Rat::new(&self.num * &other.den, &self.den * &other.num)
	}

	/// Negation.
	pub fn neg(&self) -> Rat {
		Rat::new(-self.num.clone(), self.den.clone())
	}

	/// Round down to the nearest integer.
	pub fn floor(&self) -> Int {
		self.num.floor_div(&self.den)
	}

	/// Round up to the nearest integer.
	pub fn ceil(&self) -> Int {
		self.num.ceil_div(&self.den)
	}

	/// `true` if the value has no fractional part.
	pub fn is_integer(&self) -> bool {
		self.den.is_one()
	}

	/// The reduced numerator.
	pub fn numer(&self) -> &Int {
		&self.num
	}

	/// The reduced denominator, always positive.
	pub fn denom(&self) -> &Int {
		&self.den
	}

	fn cmp_rat(&self, other: &Rat) -> Ordering {
		let lhs = &self.num * &other.den;
		let rhs = &other.num * &self.den;
		lhs.partial_cmp(&rhs).unwrap_or(Ordering::Equal)
	}
}

impl PartialOrd for Rat {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp_rat(other))
	}
}

impl Ord for Rat {
	fn cmp(&self, other: &Self) -> Ordering {
		self.cmp_rat(other)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// The outcome of adding a constraint to a tableau.
pub enum Status {
	/// The constraint was implied by the existing tableau (redundant).
	Redundant,
	/// The constraint was added and is satisfiable.
	Valid,
	/// The constraint is disjoint from the tableau's feasible region.
	Separate,
	/// The constraint cuts the feasible region.
	Cut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// The outcome of a `min`/`max` query.
pub enum LpOutcome {
	/// An optimum was found; see the returned value.
	Ok,
	/// No feasible point exists.
	Empty,
	/// The objective is unbounded in the requested direction.
	Unbounded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Per-constraint lifecycle state.
enum RowState {
	Live,
	Redundant,
	Dead,
}

#[derive(Clone, Debug)]
struct ConstraintRow {
	/// `[const, coeff_1, .., coeff_n]`, `n == n_var`, the original
	/// (un-split) representation: `const + Σ coeff_i x_i >= 0`.
	entries: Vector,
	is_eq: bool,
	state: RowState,
}

/// Dense simplex tableau over the constraints of a [`BasicMap`].
#[derive(Clone, Debug)]
pub struct Tableau {
	n_var: usize,
	rows: Vec<ConstraintRow>,
	undo: Vec<Vec<ConstraintRow>>,
}

impl Tableau {
	/// Build a tableau from every equality (as a pair of opposing
	/// inequality rows) and inequality of `b`. `ctx` is accepted for
	/// symmetry with the rest of the crate's entry points (a future
	/// solver-selection option would read it) but is not consulted yet.
	pub fn from_basic_map(b: &BasicMap, _ctx: &Ctx) -> Self {
		let n_var = b.width() - 1;
		let mut t = Self { n_var, rows: vec![], undo: vec![] };
		for eq in b.equalities() {
			let _ = t.add_equality(eq);
		}
		for ineq in b.inequalities() {
			let _ = t.add_inequality(ineq);
		}
		t
	}

	/// Current number of variables.
	pub fn n_var(&self) -> usize {
		self.n_var
	}

	/// Live (non-dead, non-redundant) constraint count.
	pub fn n_live(&self) -> usize {
		self.rows.iter().filter(|r| matches!(r.state, RowState::Live)).count()
	}

	fn live_rows(&self) -> Vec<&Vector> {
		self.rows.iter().filter(|r| matches!(r.state, RowState::Live)).map(|r| &r.entries).collect()
	}

	/// Add an inequality `row · [1;x] >= 0`. Classifies it against the
	/// tableau's current feasible region: [`Status::Cut`] if some
	/// previously feasible points violate it, [`Status::Valid`] if every
	/// previously feasible point already satisfies it, [`Status::Separate`]
	/// if adding it leaves no feasible point at all.
	pub fn add_inequality(&mut self, row: &Vector) -> Status {
		if row.is_zero() {
			return Status::Redundant;
		}
		let negated = row.negate();
		let cuts_something = feasible_rows_with_extra(&self.live_rows(), self.n_var, &negated);
		self.rows.push(ConstraintRow { entries: row.clone(), is_eq: false, state: RowState::Live });
		if self.is_empty() {
			self.rows.pop();
			return Status::Separate;
		}
		if cuts_something {
			Status::Cut
		} else {
			Status::Valid
		}
	}

	/// Add an equality `row · [1;x] == 0`, modelled as two opposing
	/// inequality rows.
	pub fn add_equality(&mut self, row: &Vector) -> Status {
		if row.is_zero() {
			return Status::Redundant;
		}
		self.rows.push(ConstraintRow { entries: row.clone(), is_eq: true, state: RowState::Live });
		self.rows.push(ConstraintRow { entries: row.negate(), is_eq: true, state: RowState::Live });
		Status::Valid
	}

	/// `true` if the system has no feasible rational point.
	pub fn is_empty(&self) -> bool {
		feasible_point(&self.live_rows(), self.n_var).is_none()
	}

	/// Optimise `obj · [1;x]`, maximising when `maximize`, minimising
	/// otherwise, also returning the optimal point when one exists.
	fn optimize_with_point(&self, obj: &Vector, maximize: bool) -> (LpOutcome, Option<Rat>, Option<Vec<Rat>>) {
		debug_assert_eq!(obj.len(), self.n_var + 1);
		match run_simplex(&self.live_rows(), self.n_var, Some((obj, maximize))) {
			SimplexOutcome::Infeasible => (LpOutcome::Empty, None, None),
			SimplexOutcome::Unbounded => (LpOutcome::Unbounded, None, None),
			SimplexOutcome::Optimal(v, point) => (LpOutcome::Ok, Some(v), Some(point)),
		}
	}

	/// Maximise `obj · [1;x]`.
	pub fn max(&self, obj: &Vector) -> (LpOutcome, Option<Rat>) {
		let (outcome, v, _) = self.optimize_with_point(obj, true);
		(outcome, v)
	}

	/// Minimise `obj · [1;x]`.
	pub fn min(&self, obj: &Vector) -> (LpOutcome, Option<Rat>) {
		let (outcome, v, _) = self.optimize_with_point(obj, false);
		(outcome, v)
	}

	/// Maximise `obj · [1;x]`, also returning the optimal point's
	/// variable values (not just the objective value).
	pub fn max_point(&self, obj: &Vector) -> (LpOutcome, Option<Rat>, Option<Vec<Rat>>) {
		self.optimize_with_point(obj, true)
	}

	/// Minimise `obj · [1;x]`, also returning the optimal point's
	/// variable values.
	pub fn min_point(&self, obj: &Vector) -> (LpOutcome, Option<Rat>, Option<Vec<Rat>>) {
		self.optimize_with_point(obj, false)
	}

	/// `true` if a feasible point's sample values are all already
	/// integral (a cheap necessary-not-sufficient check run before
	/// falling back to [`crate::sample`]'s GBR search).
	pub fn sample_is_integer(&self) -> bool {
		match feasible_point(&self.live_rows(), self.n_var) {
			Some(x) => x.iter().all(Rat::is_integer),
			None => false,
		}
	}

	/// The rational sample vector `x_1, ..., x_n` for a feasible point,
	/// if one exists.
	pub fn get_sample_value(&self) -> Option<Vec<Rat>> {
		feasible_point(&self.live_rows(), self.n_var)
	}

	/// Select a facet (a live inequality) to branch on for sampling: the
	/// first live, non-equality row.
	pub fn select_facet(&self) -> Option<usize> {
		self.rows.iter().position(|r| matches!(r.state, RowState::Live) && !r.is_eq)
	}

	/// Mark row `k` dead (no longer enforced) — used by subtraction's
	/// backtracking search to temporarily relax a constraint.
	pub fn relax(&mut self, k: usize) {
		self.rows[k].state = RowState::Dead;
	}

	/// Mark row `k` permanently frozen/known-valid: future backtracking
	/// will not attempt to falsify it.
	pub fn freeze_constraint(&mut self, k: usize) {
		self.rows[k].state = RowState::Live;
	}

	/// Record every currently-live row that is implied by the others
	/// (its negation is infeasible), marking it redundant. Returns the
	/// indices found redundant.
	pub fn detect_redundant(&mut self) -> Vec<usize> {
		let mut redundant = vec![];
		for i in 0..self.rows.len() {
			if !matches!(self.rows[i].state, RowState::Live) || self.rows[i].is_eq {
				continue;
			}
			let others: Vec<&Vector> = self
				.rows
				.iter()
				.enumerate()
				.filter(|(j, r)| *j != i && matches!(r.state, RowState::Live))
				.map(|(_, r)| &r.entries)
				.collect();
			let negated = self.rows[i].entries.negate();
			if !feasible_rows_with_extra(&others, self.n_var, &negated) {
				self.rows[i].state = RowState::Redundant;
				redundant.push(i);
			}
		}
		trace!(count = redundant.len(), "detected redundant constraints");
		redundant
	}

	/// Detect inequalities that are satisfied with equality at every
	/// feasible point, and return their indices.
	///
	/// `row >= 0` already holds at every feasible point (it is itself a
	/// live constraint), so it is forced to `== 0` everywhere exactly
	/// when its maximum over the region is also `0` — checking the
	/// minimum instead would flag every facet merely touched by the
	/// optimum, including ordinary bounding constraints.
	pub fn detect_implicit_equalities(&mut self) -> Vec<usize> {
		let mut implicit = vec![];
		for i in 0..self.rows.len() {
			if self.rows[i].is_eq || !matches!(self.rows[i].state, RowState::Live) {
				continue;
			}
			let row = self.rows[i].entries.clone();
			if let (LpOutcome::Ok, Some(v)) = self.max(&row) {
				if v.is_zero() {
					self.rows[i].is_eq = true;
					implicit.push(i);
				}
			}
		}
		trace!(count = implicit.len(), "detected implicit equalities");
		implicit
	}

	/// Push a snapshot of the current state; paired with
	/// [`Tableau::rollback`].
	pub fn snap(&mut self) -> usize {
		self.undo.push(self.rows.clone());
		self.undo.len() - 1
	}

	/// Restore the tableau to the state at `snap`, discarding every
	/// snapshot taken after it.
	pub fn rollback(&mut self, snap: usize) {
		self.rows = self.undo[snap].clone();
		self.undo.truncate(snap);
	}

	/// Rebuild a [`BasicMap`] keeping only the tableau's surviving
	/// (live, non-redundant) rows — used after a query that discovered
	/// implicit equalities or redundant constraints.
	pub fn update_from_tab(&self, b: &BasicMap) -> BasicMap {
		let mut out = b.clone();
		for row in &self.rows {
			if matches!(row.state, RowState::Redundant) {
				if let Some(idx) = out.inequalities().iter().position(|r| r == &row.entries) {
					out.drop_inequality(idx);
				}
			}
		}
		out
	}
}

/// `true` if `rows` together with `extra >= 0` have a common point.
fn feasible_rows_with_extra(rows: &[&Vector], n_var: usize, extra: &Vector) -> bool {
	let mut all: Vec<&Vector> = rows.to_vec();
	all.push(extra);
	feasible_point(&all, n_var).is_some()
}

/// Feasibility of `rows` (each `entries[0] + Σ entries[c] x_c >= 0`) via
/// phase-1 simplex, returning a witness point if one exists.
fn feasible_point(rows: &[&Vector], n_var: usize) -> Option<Vec<Rat>> {
	match run_simplex(rows, n_var, None) {
		SimplexOutcome::Infeasible => None,
		SimplexOutcome::Unbounded => None,
		SimplexOutcome::Optimal(_, x) => Some(x),
	}
}

enum SimplexOutcome {
	Infeasible,
	Unbounded,
	/// Objective value (zero if no objective was given) and the
	/// resulting `x_1..x_n` assignment.
	Optimal(Rat, Vec<Rat>),
}

/// Columns, in order: `[RHS | p_1..p_n | m_1..m_n | s_1..s_m | a_1..a_m]`
/// where `n == n_var` and `m == rows.len()`. Each original variable `x_i`
/// is represented as `p_i - m_i`, both non-negative; each row gets its
/// own slack and artificial column.
fn run_simplex(rows: &[&Vector], n_var: usize, objective: Option<(&Vector, bool)>) -> SimplexOutcome {
	let m = rows.len();
	let n_cols = 1 + 2 * n_var + 2 * m;
	let p_off = 1;
	let m_off = 1 + n_var;
	let s_off = 1 + 2 * n_var;
	let a_off = 1 + 2 * n_var + m;

	let mut tab: Vec<Vec<Rat>> = Vec::with_capacity(m);
	let mut basis: Vec<usize> = Vec::with_capacity(m);
	let mut needs_artificial = vec![false; m];
	for (i, row) in rows.iter().enumerate() {
		let sign = if row[0].is_negative() { -1 } else { 1 };
		let mut r = vec![Rat::zero(); n_cols];
		r[0] = Rat::from_int(if sign < 0 { -row[0].clone() } else { row[0].clone() });
		for c in 0..n_var {
			// Defining equation for the row's slack `s_i`, after possibly
			// flipping sign to make the RHS non-negative:
			//   sign*s_i - sign*entries[c]*p_c + sign*entries[c]*m_c = |entries[0]|
			let coeff = Rat::from_int(row[c + 1].clone()).mul(&Rat::from_int(Int::from(sign as i64)));
			r[p_off + c] = coeff.neg();
			r[m_off + c] = coeff;
		}
		r[s_off + i] = Rat::from_int(Int::from(sign as i64));
		if sign < 0 {
			r[a_off + i] = Rat::from_int(Int::one());
			needs_artificial[i] = true;
			basis.push(a_off + i);
		} else {
			basis.push(s_off + i);
		}
		tab.push(r);
	}

	if needs_artificial.iter().any(|&b| b) {
		let art_cols: Vec<usize> = (0..m).filter(|&i| needs_artificial[i]).map(|i| a_off + i).collect();
		// Phase 1 maximises `-Σ a_i` (equivalently, minimises `Σ a_i`), so the
		// artificial columns enter the objective row with coefficient `-1`.
		let mut phase1_obj = vec![Rat::zero(); n_cols];
		for &c in &art_cols {
			phase1_obj[c] = Rat::from_int(Int::neg_one());
		}
		reduce_objective(&mut phase1_obj, &tab, &basis);
		let blocked: Vec<usize> = vec![];
		let result = pivot_to_optimum(&mut tab, &mut basis, &mut phase1_obj, n_cols, &blocked);
		if result.is_none() {
			return SimplexOutcome::Unbounded;
		}
		// `objective_value` reports the maximised expression `-Σ a_i`; the
		// actual artificial sum is its negation.
		let artificial_sum = objective_value(&phase1_obj).neg();
		if artificial_sum.is_positive() {
			return SimplexOutcome::Infeasible;
		}
	}

	let art_cols: Vec<usize> = (a_off..n_cols).collect();
	let Some((obj, maximize)) = objective else {
		let x = read_solution(&tab, &basis, n_var, p_off, m_off);
		return SimplexOutcome::Optimal(Rat::zero(), x);
	};
	let mut obj_row = vec![Rat::zero(); n_cols];
	let dir = if maximize { Int::one() } else { Int::neg_one() };
	for c in 0..n_var {
		let coeff = Rat::from_int(obj[c + 1].clone()).mul(&Rat::from_int(dir.clone()));
		obj_row[p_off + c] = coeff.clone();
		obj_row[m_off + c] = coeff.neg();
	}
	let const_term = Rat::from_int(obj[0].clone()).mul(&Rat::from_int(dir));
	reduce_objective(&mut obj_row, &tab, &basis);
	match pivot_to_optimum(&mut tab, &mut basis, &mut obj_row, n_cols, &art_cols) {
		None => SimplexOutcome::Unbounded,
		Some(()) => {
			let value = objective_value(&obj_row).add(&const_term);
			let value = if maximize { value } else { value.neg() };
			let x = read_solution(&tab, &basis, n_var, p_off, m_off);
			SimplexOutcome::Optimal(value, x)
		}
	}
}

/// Re-express `obj_row` (initially in terms of all columns, zero on
/// basic ones) as reduced costs against the current basis.
fn reduce_objective(obj_row: &mut [Rat], tab: &[Vec<Rat>], basis: &[usize]) {
	for (i, &b) in basis.iter().enumerate() {
		let coeff = obj_row[b].clone();
		if coeff.is_zero() {
			continue;
		}
		for c in 0..obj_row.len() {
			let delta = coeff.mul(&tab[i][c]);
			obj_row[c] = obj_row[c].sub(&delta);
		}
	}
}

/// Standard primal simplex (Bland's rule) maximising `-obj_row[0] + Σ
/// obj_row[c] x_c` subject to `tab`/`basis`, never choosing an entering
/// column from `forbidden`. Returns `None` if unbounded.
fn pivot_to_optimum(tab: &mut [Vec<Rat>], basis: &mut [usize], obj_row: &mut [Rat], n_cols: usize, forbidden: &[usize]) -> Option<()> {
	loop {
		let Some(enter) = (1..n_cols).find(|c| !forbidden.contains(c) && obj_row[*c].is_positive()) else {
			return Some(());
		};
		let mut leave: Option<usize> = None;
		let mut best: Option<Rat> = None;
		for (i, row) in tab.iter().enumerate() {
			if !row[enter].is_positive() {
				continue;
			}
			let ratio = row[0].div(&row[enter]);
			// Bland's rule tie-break: among rows tied for the minimum ratio,
			// leave the one whose basic variable has the smallest column
			// index, which guarantees the pivoting terminates.
			let better = match (&best, leave) {
				(None, _) => true,
				(Some(b), Some(l)) => match ratio.cmp_rat(b) {
					Ordering::Less => true,
					Ordering::Equal => basis[i] < basis[l],
					Ordering::Greater => false,
				},
				(Some(_), None) => unreachable!("best is only set alongside leave"),
			};
			if better {
				best = Some(ratio);
				leave = Some(i);
			}
		}
		let leave_row = leave?;
		pivot(tab, leave_row, enter);
		basis[leave_row] = enter;
		let coeff = obj_row[enter].clone();
		for c in 0..n_cols {
			let delta = coeff.mul(&tab[leave_row][c]);
			obj_row[c] = obj_row[c].sub(&delta);
		}
	}
}

/// Gauss-Jordan pivot: divide row `r` by its entry in column `c`, then
/// eliminate column `c` from every other row.
fn pivot(tab: &mut [Vec<Rat>], r: usize, c: usize) {
	let piv = tab[r][c].clone();
	for v in &mut tab[r] {
		*v = v.div(&piv);
	}
	for i in 0..tab.len() {
		if i == r {
			continue;
		}
		let factor = tab[i][c].clone();
		if factor.is_zero() {
			continue;
		}
		for col in 0..tab[r].len() {
			let delta = factor.mul(&tab[r][col]);
			tab[i][col] = tab[i][col].sub(&delta);
		}
	}
}

/// Value of the (fully reduced) objective row at the current basic
/// solution (every nonbasic variable held at `0`).
fn objective_value(obj_row: &[Rat]) -> Rat {
	obj_row[0].neg()
}

fn read_solution(tab: &[Vec<Rat>], basis: &[usize], n_var: usize, p_off: usize, m_off: usize) -> Vec<Rat> {
	let mut p = vec![Rat::zero(); n_var];
	let mut m = vec![Rat::zero(); n_var];
	for (i, &b) in basis.iter().enumerate() {
		if (p_off..p_off + n_var).contains(&b) {
			p[b - p_off] = tab[i][0].clone();
		} else if (m_off..m_off + n_var).contains(&b) {
			m[b - m_off] = tab[i][0].clone();
		}
	}
	p.into_iter().zip(m).map(|(pi, mi)| pi.sub(&mi)).collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::space::Space;

	fn row(xs: &[i64]) -> Vector {
		Vector::from_vec(xs.iter().map(|&x| Int::from(x)).collect())
	}

	#[test]
	fn feasible_box_is_not_empty() {
		let ctx = Ctx::default();
		let mut b = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[0, 1])); // x >= 0
		b.add_inequality_row(row(&[5, -1])); // -x + 5 >= 0, i.e. x <= 5
		let tab = Tableau::from_basic_map(&b, &ctx);
		assert!(!tab.is_empty());
	}

	#[test]
	fn contradictory_box_is_empty() {
		let ctx = Ctx::default();
		let mut b = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[-5, 1])); // x - 5 >= 0, i.e. x >= 5
		b.add_inequality_row(row(&[3, -1])); // -x + 3 >= 0, i.e. x <= 3
		let tab = Tableau::from_basic_map(&b, &ctx);
		assert!(tab.is_empty());
	}

	#[test]
	fn maximize_bounded_box() {
		let ctx = Ctx::default();
		let mut b = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[0, 1]));
		b.add_inequality_row(row(&[5, -1]));
		let tab = Tableau::from_basic_map(&b, &ctx);
		let (outcome, v) = tab.max(&row(&[0, 1]));
		assert_eq!(outcome, LpOutcome::Ok);
		assert_eq!(v.unwrap(), Rat::from_int(Int::from(5)));
	}

	#[test]
	fn minimize_bounded_box() {
		let ctx = Ctx::default();
		let mut b = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[0, 1]));
		b.add_inequality_row(row(&[5, -1]));
		let tab = Tableau::from_basic_map(&b, &ctx);
		let (outcome, v) = tab.min(&row(&[0, 1]));
		assert_eq!(outcome, LpOutcome::Ok);
		assert_eq!(v.unwrap(), Rat::from_int(Int::zero()));
	}

	#[test]
	fn unbounded_maximum() {
		let ctx = Ctx::default();
		let mut b = BasicMap::alloc(Space::set_alloc(0, 1), 0, 0, 0, 0);
		b.add_inequality_row(row(&[0, 1])); // x >= 0, unbounded above
		let tab = Tableau::from_basic_map(&b, &ctx);
		let (outcome, _) = tab.max(&row(&[0, 1]));
		assert_eq!(outcome, LpOutcome::Unbounded);
	}
}
