//! Weighted determinization via the powerstate (subset) construction.
//!
//! Each state of the determinized automaton is a *residual map* — a weighted
//! subset of the original states reachable by a given string, each paired
//! with the leftover weight still owed along that branch. Grouping
//! successors by symbol, summing their unnormalized residual weight, and
//! factoring out that sum (dividing it back out of each residual) produces
//! the unique minimal-residual representation, which is what makes two
//! syntactically different powerstates collide when they denote the same
//! residual subset.

use std::collections::{BTreeMap, VecDeque};

use crate::semiring::{Invertible, Semiring};
use crate::state::{PowerStateTable, State};

use super::Fsa;

/// Weighted determinization failure modes.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum DeterminizeError {
    /// A required residual normalization divided by `zero`, or a produced
    /// residual weight had no inverse.
    #[error(transparent)]
    Semiring(#[from] crate::semiring::SemiringError),
}

/// An equivalent deterministic automaton (at most one arc per symbol per
/// state). Requires `R: Invertible` to normalize residual weights.
pub fn determinize<R: Semiring + Invertible>(fsa: &Fsa<R>) -> Result<Fsa<R>, DeterminizeError> {
    tracing::debug!(states = fsa.num_states(), "determinizing automaton");
    let mut out = Fsa::new();
    let mut table: PowerStateTable<R> = PowerStateTable::new();

    let seed: BTreeMap<State, R> = fsa.initials().collect();
    let (start, _) = table.get_or_insert(&seed);
    out.add_state(start.clone());
    out.set_i(start.clone(), Some(R::one()));

    let mut residuals: BTreeMap<State, BTreeMap<State, R>> = BTreeMap::new();
    residuals.insert(start.clone(), seed);

    let mut queue: VecDeque<State> = VecDeque::new();
    queue.push_back(start);
    let mut visited: std::collections::BTreeSet<State> = std::collections::BTreeSet::new();

    while let Some(here) = queue.pop_front() {
        if !visited.insert(here.clone()) {
            continue;
        }
        let m = residuals[&here].clone();

        let mut final_weight = R::zero();
        for (q, w) in &m {
            final_weight = final_weight.plus(&w.times(&fsa.rho(q)));
        }
        if final_weight != R::zero() {
            out.set_f(here.clone(), Some(final_weight));
        }

        for a in fsa.sigma() {
            if a.is_epsilon() {
                continue;
            }
            let mut unnormalized: BTreeMap<State, R> = BTreeMap::new();
            for (q, w) in &m {
                for (j, wj) in fsa.arcs_on(q, a) {
                    let e = unnormalized.entry(j).or_insert_with(R::zero);
                    *e = e.plus(&w.times(&wj));
                }
            }
            if unnormalized.is_empty() {
                continue;
            }
            let total = unnormalized.values().fold(R::zero(), |acc, w| acc.plus(w));
            let total_inv = total.inverse()?;
            let mut normalized = BTreeMap::new();
            for (j, w) in unnormalized {
                normalized.insert(j, w.times(&total_inv));
            }

            let (target, fresh) = table.get_or_insert(&normalized);
            out.add_state(target.clone());
            out.set_arc(here.clone(), a.clone(), target.clone(), total);
            if fresh {
                residuals.insert(target.clone(), normalized);
                queue.push_back(target);
            }
        }
    }

    Ok(out)
}
