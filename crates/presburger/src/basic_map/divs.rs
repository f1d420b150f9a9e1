//! Div-specific simplification: eliminating divs that turn out to be
//! exactly determined, deduplicating divs with identical defining rows,
//! dropping divs nobody references, and canonicalising div order.

use tracing::trace;

use super::{BasicMap, DivDef};
use crate::{int::Int, vector::Vector};

/// Column index of div `k` in a row.
fn div_col(b: &BasicMap, k: usize) -> usize {
	b.space.width() + k
}

/// Eliminate every div that has coefficient `±1` in some equality: that
/// equality pins the div's value exactly, so it can be substituted away
/// like any other variable and dropped from the div list.
pub(super) fn eliminate_divs_eq(b: &mut BasicMap) {
	let mut k = 0;
	while k < b.divs.len() {
		let col = div_col(b, k);
		let Some(idx) = b
			.eqs
			.iter()
			.position(|r| col < r.len() && (r[col].is_one() || r[col].is_negone()))
		else {
			k += 1;
			continue;
		};
		eliminate_via_equality_including_divs(b, col, idx);
		drop_div_column_only(b, k);
		trace!(div = k, "eliminated div pinned by an equality");
		// Do not advance `k`: the div that used to be at `k + 1` has
		// shifted down into `k`.
	}
}

/// Eliminate a div whose only appearances, across every equality and
/// inequality, are in its own defining constraint pair (`denom * div -
/// row <= 0` and `row - denom * div + denom - 1 >= 0`) with coefficient
/// exactly `1`: those two inequalities already fully determine its
/// floor value, so the column can be dropped and its defining
/// inequalities with it, just as with an equality pivot.
pub(super) fn eliminate_divs_ineq(b: &mut BasicMap) {
	let mut k = 0;
	'outer: while k < b.divs.len() {
		let col = div_col(b, k);
		let appearances: Vec<usize> = b
			.ineqs
			.iter()
			.enumerate()
			.filter(|(_, r)| col < r.len() && !r[col].is_zero())
			.map(|(i, _)| i)
			.collect();
		if appearances.len() != 2 {
			k += 1;
			continue;
		}
		let (a, c) = (&b.ineqs[appearances[0]], &b.ineqs[appearances[1]]);
		let (coeff_a, coeff_c) = (a[col].clone(), c[col].clone());
		if !((coeff_a.is_one() && coeff_c.is_negone()) || (coeff_a.is_negone() && coeff_c.is_one())) {
			k += 1;
			continue;
		}
		for (i, row) in b.ineqs.iter().enumerate() {
			if appearances.contains(&i) {
				continue;
			}
			if col < row.len() && !row[col].is_zero() {
				k += 1;
				continue 'outer;
			}
		}
		for i in appearances.iter().rev() {
			b.ineqs.remove(*i);
		}
		drop_div_column_only(b, k);
		trace!(div = k, "eliminated div bounded only by its own defining pair");
	}
}

/// Same elimination step as Fourier-Motzkin's equality pivot, but also
/// applied to later divs' own defining rows when they reference `col`
/// (those rows are not ordinary constraints, so the generic eliminator
/// never sees them).
fn eliminate_via_equality_including_divs(b: &mut BasicMap, col: usize, idx: usize) {
	let pivot = b.eqs[idx].clone();
	let pivot_coeff = pivot[col].clone();
	let scaled_pivot = pivot.scale(&pivot_coeff.abs());
	let cancel = |row: &Vector| -> Vector {
		if col >= row.len() || row[col].is_zero() {
			return row.clone();
		}
		let factor = -row[col].clone();
		let scaled_row = row.scale(&pivot_coeff.abs());
		scaled_row.combine(&factor, &scaled_pivot)
	};
	for r in 0..b.eqs.len() {
		if r == idx {
			continue;
		}
		b.eqs[r] = cancel(&b.eqs[r]);
	}
	for r in 0..b.ineqs.len() {
		b.ineqs[r] = cancel(&b.ineqs[r]);
	}
	for d in &mut b.divs {
		d.row = cancel(&d.row);
	}
	b.eqs.remove(idx);
}

/// Drop div `k`'s own column from every row and from the div list,
/// without touching equalities/inequalities otherwise (the caller has
/// already removed whatever constrained it).
fn drop_div_column_only(b: &mut BasicMap, k: usize) {
	let col = div_col(b, k);
	for row in b.eqs.iter_mut().chain(b.ineqs.iter_mut()) {
		if col < row.len() {
			row.make_mut().remove(col);
		}
	}
	for (j, d) in b.divs.iter_mut().enumerate() {
		if j > k && col < d.row.len() {
			d.row.make_mut().remove(col);
		}
	}
	let _ = b.divs.remove(k);
}

/// Merge divs with byte-identical `(denom, row)` defining pairs: later
/// occurrences are dropped and every reference to them is rewritten to
/// the earlier (canonical) index.
pub(super) fn remove_duplicate_divs(b: &mut BasicMap) {
	let mut k = 1;
	'outer: while k < b.divs.len() {
		for j in 0..k {
			if b.divs[j].denom == b.divs[k].denom && b.divs[j].row == b.divs[k].row {
				merge_div_into(b, k, j);
				trace!(from = k, into = j, "merged duplicate divs");
				continue 'outer;
			}
		}
		k += 1;
	}
}

/// Rewrite every reference to div `from` as a reference to div `into`,
/// then drop `from`'s column entirely (`into < from` is required).
fn merge_div_into(b: &mut BasicMap, from: usize, into: usize) {
	debug_assert!(into < from);
	let from_col = div_col(b, from);
	let into_col = div_col(b, into);
	for row in b.eqs.iter_mut().chain(b.ineqs.iter_mut()) {
		if from_col >= row.len() {
			continue;
		}
		let coeff = row[from_col].clone();
		if coeff.is_zero() {
			row.make_mut().remove(from_col);
			continue;
		}
		let v = row.make_mut();
		v[into_col] += &coeff;
		v.remove(from_col);
	}
	for (j, d) in b.divs.iter_mut().enumerate() {
		if j == from || from_col >= d.row.len() {
			continue;
		}
		let coeff = d.row[from_col].clone();
		let v = d.row.make_mut();
		if !coeff.is_zero() && j != into {
			v[into_col] += &coeff;
		}
		v.remove(from_col);
	}
	let _ = b.divs.remove(from);
}

/// Drop a div that appears with a non-zero coefficient nowhere but is
/// otherwise dead weight (no equality, no inequality and no later div
/// references it).
pub(super) fn remove_redundant_divs(b: &mut BasicMap) {
	let mut k = 0;
	while k < b.divs.len() {
		let col = div_col(b, k);
		let referenced = b
			.eqs
			.iter()
			.chain(b.ineqs.iter())
			.any(|r| col < r.len() && !r[col].is_zero())
			|| b.divs
				.iter()
				.enumerate()
				.any(|(j, d)| j != k && col < d.row.len() && !d.row[col].is_zero());
		if referenced {
			k += 1;
			continue;
		}
		for row in b.eqs.iter_mut().chain(b.ineqs.iter_mut()) {
			if col < row.len() {
				row.make_mut().remove(col);
			}
		}
		for (j, d) in b.divs.iter_mut().enumerate() {
			if j > k && col < d.row.len() {
				d.row.make_mut().remove(col);
			}
		}
		let _ = b.divs.remove(k);
		trace!(div = k, "dropped unreferenced div");
	}
}

/// Canonical div order: divs are only constrained to come after the
/// divs they depend on, so a stable sort by `(denom, row)` is a valid
/// canonical form as long as references are remapped along with the
/// reordering.
pub(super) fn normalize_divs(b: &mut BasicMap) {
	let n = b.divs.len();
	if n <= 1 {
		return;
	}
	let mut order: Vec<usize> = (0..n).collect();
	order.sort_by(|&a, &b_idx| {
		let a_key = (&b.divs[a].denom, b.divs[a].row.as_slice());
		let b_key = (&b.divs[b_idx].denom, b.divs[b_idx].row.as_slice());
		a_key.partial_cmp(&b_key).unwrap_or(std::cmp::Ordering::Equal)
	});
	if order == (0..n).collect::<Vec<_>>() {
		return;
	}
	permute_divs(b, &order);
}

/// Apply permutation `order` (old index at each new position) to the div
/// list and every reference to a div column, in one pass.
fn permute_divs(b: &mut BasicMap, order: &[usize]) {
	let width0 = b.space.width();
	let mut new_pos = vec![0usize; order.len()];
	for (new_idx, &old_idx) in order.iter().enumerate() {
		new_pos[old_idx] = new_idx;
	}
	let remap_row = |row: &Vector| -> Vector {
		let mut out = row.as_slice()[..width0].to_vec();
		out.extend((0..order.len()).map(|new_idx| row.as_slice()[width0 + order[new_idx]].clone()));
		Vector::from_vec(out)
	};
	for row in b.eqs.iter_mut().chain(b.ineqs.iter_mut()) {
		*row = remap_row(row);
	}
	let old_divs = std::mem::take(&mut b.divs);
	let mut new_divs: Vec<DivDef> = Vec::with_capacity(old_divs.len());
	for &old_idx in order {
		let d = &old_divs[old_idx];
		let extra = d.row.len().saturating_sub(width0);
		let mut out = d.row.as_slice()[..width0].to_vec();
		for j in 0..extra {
			out.push(d.row.as_slice()[width0 + j].clone());
		}
		new_divs.push(DivDef {
			denom: d.denom.clone(),
			row: Vector::from_vec(out),
		});
	}
	b.divs = new_divs;
}

/// Extend `b` with exactly the divs of `other` it does not already
/// contain (matched by `(denom, row)` once both are expressed over the
/// union of the two div lists), and return `other` re-expressed over
/// that merged list.
pub(super) fn align_divs(b: &mut BasicMap, other: &BasicMap) -> BasicMap {
	let width0 = b.space.width();
	debug_assert_eq!(width0, other.space.width());
	let mut map_other_to_b = vec![0usize; other.divs.len()];
	for (j, od) in other.divs.iter().enumerate() {
		let existing = b.divs.iter().position(|d| d.denom == od.denom && rows_equal_on_shared_prefix(&d.row, &od.row, width0));
		let idx = match existing {
			Some(i) => i,
			None => {
				let mut row = od.row.as_slice()[..width0.min(od.row.len())].to_vec();
				row.resize(width0, Int::zero());
				for prior in &map_other_to_b[..j] {
					row.push(if od.row.len() > width0 + *prior { od.row[width0 + *prior].clone() } else { Int::zero() });
				}
				b.divs.push(DivDef {
					denom: od.denom.clone(),
					row: Vector::from_vec(row),
				});
				for eq in b.eqs.iter_mut().chain(b.ineqs.iter_mut()) {
					eq.make_mut().push(Int::zero());
				}
				for d in &mut b.divs {
					d.row.make_mut().push(Int::zero());
				}
				b.divs.len() - 1
			}
		};
		map_other_to_b[j] = idx;
	}
	let mut rebuilt = other.clone();
	rebuilt.divs = b.divs.clone();
	let remap_row = |row: &Vector| -> Vector {
		let mut out = row.as_slice()[..width0].to_vec();
		out.resize(width0 + b.divs.len(), Int::zero());
		for (j, &new_idx) in map_other_to_b.iter().enumerate() {
			if width0 + j < row.len() {
				out[width0 + new_idx] = row[width0 + j].clone();
			}
		}
		Vector::from_vec(out)
	};
	rebuilt.eqs = other.eqs.iter().map(remap_row).collect();
	rebuilt.ineqs = other.ineqs.iter().map(remap_row).collect();
	rebuilt
}

/// `true` if two div-defining rows agree on their shared, non-div
/// prefix (both always agree there since both are expressed over the
/// same base space; divergence can only be in the div-dependent tail,
/// which this conservative check ignores).
fn rows_equal_on_shared_prefix(a: &Vector, b: &Vector, width0: usize) -> bool {
	a.as_slice()[..width0.min(a.len())] == b.as_slice()[..width0.min(b.len())]
}
