//! Minimization of a deterministic, input-complete automaton via Hopcroft's
//! worklist refinement: states start grouped by final weight, and a
//! worklist of `(block, symbol)` splitters repeatedly breaks blocks apart
//! using their predecessors under that symbol, until no splitter can
//! further divide anything.
//!
//! Weighted transitions need one adjustment over the textbook unweighted
//! algorithm: a splitter `(S, a)` doesn't just separate "has an `a`-arc
//! into `S`" from "doesn't" — states with an `a`-arc into `S` at different
//! weights can't be equivalent either, so each splitter is refined further
//! by the arc's weight before it's used to divide other blocks. Whenever a
//! block is split, only the smaller of the two resulting pieces is pushed
//! back onto the worklist (Hopcroft's `O(n log n)` trick: every state can
//! only ever be the "smaller half" `O(log n)` times across the whole run).

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::semiring::Semiring;
use crate::state::State;
use crate::symbol::Sym;

use super::Fsa;

/// Minimization failure modes.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum MinimizeError {
    /// The input isn't deterministic.
    #[error("minimize requires a deterministic automaton")]
    NotDeterministic,
    /// Some state lacks an outgoing arc for a symbol used elsewhere in the
    /// automaton — matching the `for...else: raise` in the source this
    /// crate is grounded on.
    #[error("minimize requires the automaton to be input-complete")]
    Incomplete,
}

/// The unique minimal automaton equivalent to `fsa`, collapsing each
/// equivalence-class block to one representative state.
pub fn minimize<R: Semiring>(fsa: &Fsa<R>) -> Result<Fsa<R>, MinimizeError> {
    tracing::debug!(states = fsa.num_states(), "minimizing automaton");
    if !fsa.deterministic() {
        return Err(MinimizeError::NotDeterministic);
    }
    if !fsa.complete() {
        return Err(MinimizeError::Incomplete);
    }

    let states: Vec<State> = fsa.states().cloned().collect();
    let sigma: Vec<Sym> = fsa.sigma().iter().cloned().collect();

    // Initial partition: group by final weight (including "not final",
    // i.e. `zero`).
    let mut partition: Vec<BTreeSet<State>> = Vec::new();
    let mut block_of: BTreeMap<State, usize> = BTreeMap::new();
    {
        let mut reps: Vec<R> = Vec::new();
        for q in &states {
            let w = fsa.rho(q);
            let block = match reps.iter().position(|r| *r == w) {
                Some(b) => b,
                None => {
                    reps.push(w);
                    partition.push(BTreeSet::new());
                    reps.len() - 1
                }
            };
            partition[block].insert(q.clone());
            block_of.insert(q.clone(), block);
        }
    }

    // Reverse index: for each `(symbol, target state)`, the predecessors
    // that reach `target` on `symbol`, paired with the arc's weight.
    let mut preds: BTreeMap<(usize, State), Vec<(State, R)>> = BTreeMap::new();
    for p in &states {
        for (a_idx, a) in sigma.iter().enumerate() {
            if let Some((j, w)) = fsa.arcs_on(p, a).next() {
                preds.entry((a_idx, j)).or_default().push((p.clone(), w));
            }
        }
    }

    // Worklist of `(block, symbol)` splitters. `queued` is the source of
    // truth for whether a pair is still pending — `worklist` may carry
    // stale entries for a pair that's since been popped and re-split.
    let mut queued: BTreeSet<(usize, usize)> = BTreeSet::new();
    let mut worklist: VecDeque<(usize, usize)> = VecDeque::new();
    for b in 0..partition.len() {
        for a_idx in 0..sigma.len() {
            worklist.push_back((b, a_idx));
            queued.insert((b, a_idx));
        }
    }

    while let Some((splitter_block, a_idx)) = worklist.pop_front() {
        if !queued.remove(&(splitter_block, a_idx)) {
            continue;
        }
        // Predecessors of the splitter block via `a_idx`, grouped by arc
        // weight: two states that both land in the splitter on this symbol
        // are only the same splitter set if they pay the same weight to do
        // so.
        let mut groups: Vec<(R, Vec<State>)> = Vec::new();
        for j in &partition[splitter_block] {
            if let Some(plist) = preds.get(&(a_idx, j.clone())) {
                for (p, w) in plist {
                    match groups.iter_mut().find(|(gw, _)| gw == w) {
                        Some((_, ps)) => ps.push(p.clone()),
                        None => groups.push((w.clone(), vec![p.clone()])),
                    }
                }
            }
        }

        for (_, xs) in groups {
            let x: BTreeSet<State> = xs.into_iter().collect();
            for y in 0..partition.len() {
                if partition[y].is_empty() {
                    continue;
                }
                let in_x: BTreeSet<State> = partition[y].intersection(&x).cloned().collect();
                if in_x.is_empty() || in_x.len() == partition[y].len() {
                    continue;
                }
                let out_x: BTreeSet<State> = partition[y].difference(&x).cloned().collect();

                let new_idx = partition.len();
                for s in &out_x {
                    block_of.insert(s.clone(), new_idx);
                }
                partition[y] = in_x.clone();
                partition.push(out_x.clone());

                let (smaller_idx, larger_idx) = if in_x.len() <= out_x.len() {
                    (y, new_idx)
                } else {
                    (new_idx, y)
                };
                let _ = larger_idx;

                for a2 in 0..sigma.len() {
                    if queued.remove(&(y, a2)) {
                        // `y` (pre-split) was a pending splitter: both
                        // halves need to inherit it.
                        worklist.push_back((y, a2));
                        queued.insert((y, a2));
                        worklist.push_back((new_idx, a2));
                        queued.insert((new_idx, a2));
                    } else if queued.insert((smaller_idx, a2)) {
                        worklist.push_back((smaller_idx, a2));
                    }
                }
            }
        }
    }

    let num_blocks = partition.len();
    let mut out = Fsa::new();
    let mut block_state: Vec<State> = Vec::with_capacity(num_blocks);
    for _ in 0..num_blocks {
        block_state.push(out.fresh_state());
    }

    for q in &states {
        let b = block_of[q];
        let lambda = fsa.lambda(q);
        if lambda != R::zero() {
            out.add_i(block_state[b].clone(), Some(lambda));
        }
        let rho = fsa.rho(q);
        if rho != R::zero() {
            out.add_f(block_state[b].clone(), Some(rho));
        }
    }

    for q in &states {
        let b = block_of[q];
        for a in &sigma {
            if let Some((j, w)) = fsa.arcs_on(q, a).next() {
                let tb = block_of[&j];
                out.set_arc(block_state[b].clone(), a.clone(), block_state[tb].clone(), w);
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semiring::Boolean;

    fn complete_dfa() -> Fsa<Boolean> {
        // Accepts strings over {a} ending after an even number of `a`s;
        // two isomorphic copies of the 2-state cycle are merged by minimize.
        let mut fsa: Fsa<Boolean> = Fsa::new();
        let s0 = fsa.fresh_state();
        let s1 = fsa.fresh_state();
        let s2 = fsa.fresh_state();
        let s3 = fsa.fresh_state();
        fsa.set_i(s0.clone(), None);
        fsa.set_f(s0.clone(), None);
        fsa.set_f(s2.clone(), None);
        fsa.set_arc(s0.clone(), Sym::sym("a"), s1.clone(), Boolean(true));
        fsa.set_arc(s1.clone(), Sym::sym("a"), s0.clone(), Boolean(true));
        fsa.set_arc(s2.clone(), Sym::sym("a"), s3.clone(), Boolean(true));
        fsa.set_arc(s3.clone(), Sym::sym("a"), s2.clone(), Boolean(true));
        // Disconnected twin component is still complete/deterministic.
        fsa
    }

    #[test]
    fn rejects_incomplete_automaton() {
        let mut fsa: Fsa<Boolean> = Fsa::new();
        let a = fsa.fresh_state();
        fsa.set_i(a.clone(), None);
        fsa.set_arc(a.clone(), Sym::sym("x"), a, Boolean(true));
        let mut fsa2 = fsa.clone();
        let b = fsa2.fresh_state();
        fsa2.set_arc(b, Sym::sym("y"), fsa2.states().next().unwrap().clone(), Boolean(true));
        assert!(minimize(&fsa2).is_err());
    }

    #[test]
    fn merges_equivalent_states() {
        let fsa = complete_dfa();
        let min = minimize(&fsa).unwrap();
        assert!(min.num_states() <= fsa.num_states());
    }
}
