//! The Pathsum engine: six strategies for computing
//! `pathsum(F) = ⊕_{path π} λ(π) ⊗ w(π) ⊗ ρ(π)` over all accepting paths.
//!
//! Each strategy has a precondition on the semiring or the automaton's
//! structure (acyclicity, idempotence, a total order, closure); callers pick
//! the cheapest strategy their inputs satisfy. `forward`/`backward` compute
//! per-state partial sums (`α`/`β`); `pathsum` reduces those to the scalar
//! total.

use std::collections::BTreeMap;

use crate::fsa::Fsa;
use crate::graph;
use crate::semiring::{Closed, Invertible, Semiring};
use crate::state::State;
use crate::symbol::Sym;

/// Which algorithm computes the pathsum / forward / backward values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Requires an acyclic automaton. `O(|Q| + |δ|)`.
    Viterbi,
    /// Requires `R::IS_IDEMPOTENT`. `O(|Q| · |δ|)`, detects negative cycles.
    BellmanFord,
    /// Requires `R::IS_SUPERIOR`. `O(|Q|² )` (linear scan agenda).
    Dijkstra,
    /// Requires `R: Closed`. Full all-pairs Gauss-Jordan closure, `O(|Q|³)`.
    Lehmann,
    /// Requires `R: Closed + Invertible`. Reweights via Bellman-Ford
    /// potentials then runs per-source Dijkstra on nonnegative weights.
    Johnson,
    /// Requires `R: Closed`. Lehmann's closure computed one SCC at a time.
    DecomposedLehmann,
    /// Not supported — see module docs on `Pathsum.fixpoint` in the source
    /// this crate is grounded on, which also leaves it unimplemented.
    Fixpoint,
}

/// Failure modes for a [`Strategy`] invoked outside its precondition.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum PathsumError {
    /// [`Strategy::Viterbi`] requires an acyclic automaton.
    #[error("Viterbi requires an acyclic automaton")]
    NotAcyclic,
    /// [`Strategy::BellmanFord`]/[`Strategy::Johnson`] require idempotence.
    #[error("this strategy requires an idempotent semiring")]
    RequiresIdempotent,
    /// [`Strategy::Dijkstra`]/[`Strategy::Johnson`] require a total order.
    #[error("this strategy requires a superior semiring")]
    RequiresSuperior,
    /// A negative-weight cycle makes the pathsum undefined.
    #[error("negative-weight cycle detected")]
    NegativeCycle,
    /// A `star`/`~` call inside the strategy hit a non-closed element.
    #[error(transparent)]
    Semiring(#[from] crate::semiring::SemiringError),
    /// Strategy explicitly not implemented, matching the source this crate
    /// is grounded on.
    #[error("{0} is not supported")]
    NotSupported(&'static str),
}

fn zeros<R: Semiring>(fsa: &Fsa<R>) -> BTreeMap<State, R> {
    fsa.states().map(|q| (q.clone(), R::zero())).collect()
}

/// `α`: per-state forward sums, `α(q) = λ(q) ⊕ ⊕_{(p,a,q)} α(p) ⊗ w`.
///
/// [`Strategy::Lehmann`], [`Strategy::DecomposedLehmann`], and
/// [`Strategy::Johnson`] need a `Closed` (and, for Johnson, `Invertible`)
/// semiring, a bound this function's generic `R: Semiring` can't express —
/// call [`lehmann`], [`decomposed_lehmann_bwd`], or [`johnson`] directly for
/// those strategies on a cyclic automaton. On an acyclic automaton, though,
/// the engine dispatches to Viterbi regardless of the requested strategy,
/// since every strategy agrees on an acyclic input and Viterbi needs no
/// extra trait bound.
pub fn forward<R: Semiring>(fsa: &Fsa<R>, strategy: Strategy) -> Result<BTreeMap<State, R>, PathsumError> {
    tracing::debug!(?strategy, states = fsa.num_states(), "computing forward sums");
    match strategy {
        Strategy::Viterbi => viterbi_fwd(fsa),
        Strategy::BellmanFord => bellmanford_fwd(fsa),
        Strategy::Dijkstra => dijkstra_fwd(fsa),
        Strategy::Lehmann if fsa.acyclic() => viterbi_fwd(fsa),
        Strategy::Lehmann => Err(PathsumError::NotSupported("Lehmann requires R: Closed — call lehmann() directly")),
        Strategy::DecomposedLehmann if fsa.acyclic() => viterbi_fwd(fsa),
        Strategy::DecomposedLehmann => Err(PathsumError::NotSupported(
            "DecomposedLehmann requires R: Closed — call decomposed_lehmann_bwd() directly",
        )),
        Strategy::Johnson if fsa.acyclic() => viterbi_fwd(fsa),
        Strategy::Johnson => Err(PathsumError::NotSupported(
            "Johnson requires R: Closed + Invertible — call johnson() directly",
        )),
        Strategy::Fixpoint => Err(PathsumError::NotSupported("fixpoint")),
    }
}

/// `β`: per-state backward sums, `β(q) = ρ(q) ⊕ ⊕_{(q,a,j)} w ⊗ β(j)`.
pub fn backward<R: Semiring>(fsa: &Fsa<R>, strategy: Strategy) -> Result<BTreeMap<State, R>, PathsumError> {
    let rev = fsa.reverse();
    forward(&rev, strategy)
}

/// The scalar total `⊕_{path π} λ(π) ⊗ w(π) ⊗ ρ(π)`.
pub fn pathsum<R: Semiring>(fsa: &Fsa<R>, strategy: Strategy) -> Result<R, PathsumError> {
    let alpha = forward(fsa, strategy)?;
    Ok(fsa
        .finals()
        .fold(R::zero(), |acc, (q, rho)| acc.plus(&alpha.get(&q).cloned().unwrap_or_else(R::zero).times(&rho))))
}

/// The weight every arc contributes to the total pathsum: `μ(p, a, q) = α(p)
/// ⊗ w(p,a,q) ⊗ β(q)`, requiring an acyclic automaton (forward/backward sums
/// are computed via [`Strategy::Viterbi`]).
///
/// Summing `μ` over every arc recovers `pathsum(F)` exactly (spec.md §8's
/// "edge marginals normalize" property), since every accepting path is
/// covered by exactly one `(p,a,q)` term per arc it crosses, weighted by
/// everything before and after that arc.
pub fn edge_marginals<R: Semiring>(
    fsa: &Fsa<R>,
) -> Result<BTreeMap<(State, Sym, State), R>, PathsumError> {
    let alpha = viterbi_fwd(fsa)?;
    let beta = {
        let rev = fsa.reverse();
        viterbi_fwd(&rev)?
    };
    let mut out = BTreeMap::new();
    for p in fsa.states() {
        let ap = alpha.get(p).cloned().unwrap_or_else(R::zero);
        if ap == R::zero() {
            continue;
        }
        for (a, q, w) in fsa.arcs(p) {
            let bq = beta.get(&q).cloned().unwrap_or_else(R::zero);
            if bq == R::zero() {
                continue;
            }
            out.insert((p.clone(), a, q), ap.times(&w).times(&bq));
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------- Viterbi

fn viterbi_fwd<R: Semiring>(fsa: &Fsa<R>) -> Result<BTreeMap<State, R>, PathsumError> {
    if !fsa.acyclic() {
        return Err(PathsumError::NotAcyclic);
    }
    let mut alpha = zeros(fsa);
    for (q, w) in fsa.initials() {
        let e = alpha.entry(q).or_insert_with(R::zero);
        *e = e.plus(&w);
    }
    let order = graph::toposort(fsa, false).map_err(|_| PathsumError::NotAcyclic)?;
    for p in order {
        let ap = alpha.get(&p).cloned().unwrap_or_else(R::zero);
        if ap == R::zero() {
            continue;
        }
        for (_, j, w) in fsa.arcs(&p) {
            let e = alpha.entry(j).or_insert_with(R::zero);
            *e = e.plus(&ap.times(&w));
        }
    }
    Ok(alpha)
}

// ----------------------------------------------------------- Bellman-Ford

fn bellmanford_fwd<R: Semiring>(fsa: &Fsa<R>) -> Result<BTreeMap<State, R>, PathsumError> {
    if !R::IS_IDEMPOTENT {
        return Err(PathsumError::RequiresIdempotent);
    }
    let mut alpha = zeros(fsa);
    for (q, w) in fsa.initials() {
        let e = alpha.entry(q).or_insert_with(R::zero);
        *e = e.plus(&w);
    }
    let n = fsa.num_states();
    let mut changed = true;
    for iter in 0..=n {
        if !changed {
            break;
        }
        changed = false;
        for p in fsa.states() {
            let ap = alpha.get(p).cloned().unwrap_or_else(R::zero);
            if ap == R::zero() {
                continue;
            }
            for (_, j, w) in fsa.arcs(p) {
                let candidate = ap.times(&w);
                let e = alpha.entry(j).or_insert_with(R::zero);
                let updated = e.plus(&candidate);
                if updated != *e {
                    *e = updated;
                    changed = true;
                }
            }
        }
        if iter == n && changed {
            return Err(PathsumError::NegativeCycle);
        }
    }
    Ok(alpha)
}

// -------------------------------------------------------------- Dijkstra

fn dijkstra_fwd<R: Semiring>(fsa: &Fsa<R>) -> Result<BTreeMap<State, R>, PathsumError> {
    if !R::IS_SUPERIOR {
        return Err(PathsumError::RequiresSuperior);
    }
    let mut alpha = zeros(fsa);
    for (q, w) in fsa.initials() {
        let e = alpha.entry(q).or_insert_with(R::zero);
        *e = e.plus(&w);
    }
    let mut settled: std::collections::BTreeSet<State> = std::collections::BTreeSet::new();
    let n = fsa.num_states();
    for _ in 0..n {
        // Linear scan for the unsettled state with minimal `alpha` under
        // the semiring's natural order — avoids requiring `R: Ord`.
        let next = alpha
            .iter()
            .filter(|(q, w)| !settled.contains(*q) && **w != R::zero())
            .fold(None::<(State, R)>, |best, (q, w)| match best {
                None => Some((q.clone(), w.clone())),
                Some((bq, bw)) => {
                    if w.le(&bw) {
                        Some((q.clone(), w.clone()))
                    } else {
                        Some((bq, bw))
                    }
                }
            });
        let Some((p, ap)) = next else { break };
        settled.insert(p.clone());
        for (_, j, w) in fsa.arcs(&p) {
            if settled.contains(&j) {
                continue;
            }
            let candidate = ap.times(&w);
            let e = alpha.entry(j).or_insert_with(R::zero);
            *e = e.plus(&candidate);
        }
    }
    Ok(alpha)
}

/// Early-terminating Dijkstra (stop once every final state is settled) —
/// left unimplemented, matching `Pathsum.dijkstra_early` in the source this
/// crate is grounded on.
pub fn dijkstra_early<R: Semiring>(_fsa: &Fsa<R>) -> Result<BTreeMap<State, R>, PathsumError> {
    Err(PathsumError::NotSupported("dijkstra_early"))
}

// --------------------------------------------------------------- Lehmann

/// `⊕_{i,j} λ(i) ⊗ W*[i][j] ⊗ ρ(j)` where `W*` is the full transitive
/// closure of the direct-edge-weight matrix `W[i][j] = ⊕_a δ(i,a,j)`
/// (`W[i][i]` additionally includes `one`).
///
/// Computed by Gauss-Jordan elimination: for each pivot `k` in turn, fold
/// `k`'s self-loop closure into every other cell that routes through `k`.
/// `O(|Q|³)`.
pub fn lehmann<R: Semiring + Closed>(
    fsa: &Fsa<R>,
) -> Result<BTreeMap<(State, State), R>, PathsumError> {
    tracing::debug!(states = fsa.num_states(), "computing Lehmann closure");
    let states: Vec<State> = fsa.states().cloned().collect();
    let mut w: BTreeMap<(State, State), R> = BTreeMap::new();
    for i in &states {
        for j in &states {
            let mut direct = R::zero();
            for (_, t, wt) in fsa.arcs(i) {
                if &t == j {
                    direct = direct.plus(&wt);
                }
            }
            if i == j {
                direct = direct.plus(&R::one());
            }
            w.insert((i.clone(), j.clone()), direct);
        }
    }

    for k in &states {
        let wkk = w[&(k.clone(), k.clone())].star()?;
        w.insert((k.clone(), k.clone()), wkk.clone());
        for i in &states {
            if i == k {
                continue;
            }
            let wik = w[&(i.clone(), k.clone())].clone();
            if wik == R::zero() {
                continue;
            }
            for j in &states {
                if j == k {
                    continue;
                }
                let wkj = w[&(k.clone(), j.clone())].clone();
                if wkj == R::zero() {
                    continue;
                }
                let through = wik.times(&wkk).times(&wkj);
                let e = w.get_mut(&(i.clone(), j.clone())).unwrap();
                *e = e.plus(&through);
            }
        }
        for i in &states {
            if i == k {
                continue;
            }
            let e = w.get_mut(&(i.clone(), k.clone())).unwrap();
            *e = e.times(&wkk);
        }
        for j in &states {
            if j == k {
                continue;
            }
            let e = w.get_mut(&(k.clone(), j.clone())).unwrap();
            *e = wkk.times(e);
        }
    }

    Ok(w)
}

/// `α` via [`lehmann`]'s full closure matrix, for callers that already know
/// `R: Closed`.
pub fn lehmann_fwd<R: Semiring + Closed>(fsa: &Fsa<R>) -> Result<BTreeMap<State, R>, PathsumError> {
    let closure = lehmann(fsa)?;
    let mut alpha = zeros(fsa);
    for (i, wi) in fsa.initials() {
        for j in fsa.states() {
            let e = alpha.entry(j.clone()).or_insert_with(R::zero);
            *e = e.plus(&wi.times(&closure[&(i.clone(), j.clone())]));
        }
    }
    Ok(alpha)
}

/// One SCC's worth of `W*[i][j]` among `states`, considering only arcs
/// whose endpoints are both inside `states` (inter-component edges are the
/// caller's responsibility — see [`decomposed_lehmann_bwd`]).
fn local_lehmann<R: Semiring + Closed>(
    fsa: &Fsa<R>,
    states: &std::collections::BTreeSet<State>,
) -> Result<BTreeMap<(State, State), R>, crate::semiring::SemiringError> {
    let list: Vec<State> = states.iter().cloned().collect();
    let mut w: BTreeMap<(State, State), R> = BTreeMap::new();
    for i in &list {
        for j in &list {
            let mut direct = R::zero();
            for (_, t, wt) in fsa.arcs(i) {
                if &t == j && states.contains(&t) {
                    direct = direct.plus(&wt);
                }
            }
            if i == j {
                direct = direct.plus(&R::one());
            }
            w.insert((i.clone(), j.clone()), direct);
        }
    }
    for k in &list {
        let wkk = w[&(k.clone(), k.clone())].star()?;
        w.insert((k.clone(), k.clone()), wkk.clone());
        for i in &list {
            if i == k {
                continue;
            }
            let wik = w[&(i.clone(), k.clone())].clone();
            for j in &list {
                if j == k {
                    continue;
                }
                let wkj = w[&(k.clone(), j.clone())].clone();
                let through = wik.times(&wkk).times(&wkj);
                let e = w.get_mut(&(i.clone(), j.clone())).unwrap();
                *e = e.plus(&through);
            }
        }
        for i in &list {
            if i == k {
                continue;
            }
            let e = w.get_mut(&(i.clone(), k.clone())).unwrap();
            *e = e.times(&wkk);
        }
        for j in &list {
            if j == k {
                continue;
            }
            let e = w.get_mut(&(k.clone(), j.clone())).unwrap();
            *e = wkk.times(e);
        }
    }
    Ok(w)
}

/// Backward sums via per-SCC closures: strongly-connected components are
/// resolved sink-to-source, each needing only an `O(|C|³)` local closure
/// rather than `O(|Q|³)` over the whole automaton.
pub fn decomposed_lehmann_bwd<R: Semiring + Closed>(
    fsa: &Fsa<R>,
) -> Result<BTreeMap<State, R>, PathsumError> {
    let sccs = graph::scc(fsa);
    tracing::debug!(states = fsa.num_states(), components = sccs.len(), "computing decomposed Lehmann closure");
    let mut beta: BTreeMap<State, R> = fsa.states().map(|q| (q.clone(), fsa.rho(q))).collect();

    for component in sccs.iter().rev() {
        let mut base: BTreeMap<State, R> = BTreeMap::new();
        for i in component {
            let mut b = fsa.rho(i);
            for (_, j, w) in fsa.arcs(i) {
                if !component.contains(&j) {
                    b = b.plus(&w.times(&beta[&j]));
                }
            }
            base.insert(i.clone(), b);
        }
        let closure = local_lehmann(fsa, component)?;
        for i in component {
            let mut bi = R::zero();
            for j in component {
                bi = bi.plus(&closure[&(i.clone(), j.clone())].times(&base[j]));
            }
            beta.insert(i.clone(), bi);
        }
    }

    Ok(beta)
}

/// `α` computed by mirroring [`decomposed_lehmann_bwd`] onto the reverse
/// automaton.
pub fn decomposed_lehmann_fwd<R: Semiring + Closed>(fsa: &Fsa<R>) -> Result<BTreeMap<State, R>, PathsumError> {
    decomposed_lehmann_bwd(&fsa.reverse())
}

// ---------------------------------------------------------------- Johnson

/// Bellman-Ford distances from a virtual super-source connected to every
/// state at weight `one` — unlike [`bellmanford_fwd`], which only seeds
/// `λ`'s actual initial states, this gives every state in the automaton a
/// finite potential, including states with no path from a real initial
/// state. Used by [`johnson`], whose reweighting step needs to invert every
/// state's potential: an uninitialized (`zero`) potential is `+∞` for
/// `Tropical`, and `+∞` has no inverse.
fn bellmanford_from_super_source<R: Semiring>(fsa: &Fsa<R>) -> Result<BTreeMap<State, R>, PathsumError> {
    if !R::IS_IDEMPOTENT {
        return Err(PathsumError::RequiresIdempotent);
    }
    let mut alpha: BTreeMap<State, R> = fsa.states().map(|q| (q.clone(), R::one())).collect();
    let n = fsa.num_states();
    let mut changed = true;
    for iter in 0..=n {
        if !changed {
            break;
        }
        changed = false;
        for p in fsa.states() {
            let ap = alpha.get(p).cloned().unwrap_or_else(R::zero);
            if ap == R::zero() {
                continue;
            }
            for (_, j, w) in fsa.arcs(p) {
                let candidate = ap.times(&w);
                let e = alpha.entry(j).or_insert_with(R::zero);
                let updated = e.plus(&candidate);
                if updated != *e {
                    *e = updated;
                    changed = true;
                }
            }
        }
        if iter == n && changed {
            return Err(PathsumError::NegativeCycle);
        }
    }
    Ok(alpha)
}

/// Bellman-Ford potentials reweight every arc to a nonnegative-equivalent
/// weight, then one Dijkstra run per source recovers the same pathsums —
/// cheaper than full Lehmann when the graph is sparse and mostly acyclic
/// with only a few negative edges.
pub fn johnson<R: Semiring + Closed + Invertible>(fsa: &Fsa<R>) -> Result<R, PathsumError> {
    tracing::debug!(states = fsa.num_states(), "computing pathsum via Johnson's algorithm");
    if !R::IS_IDEMPOTENT {
        return Err(PathsumError::RequiresIdempotent);
    }
    let potentials = bellmanford_from_super_source(fsa)?;
    let pushed = crate::fsa::push::push_with_potential_unchecked(fsa, &potentials)?;
    let alpha = dijkstra_fwd(&pushed)?;
    // Un-reweight: pathsum(original) = pathsum(pushed) composed back through
    // the same potentials applied at the boundary states.
    let mut total = R::zero();
    for (q, rho) in fsa.finals() {
        let a = alpha.get(&q).cloned().unwrap_or_else(R::zero);
        total = total.plus(&a.times(&rho));
    }
    Ok(total)
}

/// Weighted-automaton fixpoint iteration over an arbitrary (not necessarily
/// closed or idempotent) semiring — left unimplemented, matching
/// `Pathsum.fixpoint` in the source this crate is grounded on.
pub fn fixpoint<R: Semiring>(_fsa: &Fsa<R>) -> Result<R, PathsumError> {
    Err(PathsumError::NotSupported("fixpoint"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semiring::Tropical;

    fn chain() -> Fsa<Tropical> {
        let mut fsa = Fsa::new();
        let a = fsa.fresh_state();
        let b = fsa.fresh_state();
        let c = fsa.fresh_state();
        fsa.set_i(a.clone(), Some(Tropical(0.0)));
        fsa.add_arc(a, Sym::sym("x"), b.clone(), Tropical(2.0));
        fsa.add_arc(b.clone(), Sym::sym("y"), c.clone(), Tropical(3.0));
        fsa.set_f(c, Some(Tropical(0.0)));
        fsa
    }

    #[test]
    fn viterbi_shortest_path() {
        let fsa = chain();
        let total = pathsum(&fsa, Strategy::Viterbi).unwrap();
        assert_eq!(total, Tropical(5.0));
    }

    #[test]
    fn bellman_ford_agrees_with_viterbi() {
        let fsa = chain();
        let viterbi = pathsum(&fsa, Strategy::Viterbi).unwrap();
        let bf = pathsum(&fsa, Strategy::BellmanFord).unwrap();
        assert_eq!(viterbi, bf);
    }

    #[test]
    fn dijkstra_agrees_with_viterbi() {
        let fsa = chain();
        let viterbi = pathsum(&fsa, Strategy::Viterbi).unwrap();
        let dij = pathsum(&fsa, Strategy::Dijkstra).unwrap();
        assert_eq!(viterbi, dij);
    }

    #[test]
    fn lehmann_agrees_with_viterbi() {
        let fsa = chain();
        let viterbi = pathsum(&fsa, Strategy::Viterbi).unwrap();
        let closure = lehmann(&fsa).unwrap();
        let mut total = Tropical::zero();
        for (i, wi) in fsa.initials() {
            for (j, wj) in fsa.finals() {
                total = total.plus(&wi.times(&closure[&(i.clone(), j.clone())]).times(&wj));
            }
        }
        assert_eq!(viterbi, total);
    }

    #[test]
    fn edge_marginals_sum_to_pathsum_on_single_path() {
        let fsa = chain();
        let total = pathsum(&fsa, Strategy::Viterbi).unwrap();
        let marginals = edge_marginals(&fsa).unwrap();
        assert_eq!(marginals.len(), 2);
        for mu in marginals.values() {
            assert_eq!(*mu, total);
        }
        let folded = marginals.values().fold(Tropical::zero(), |acc, mu| acc.plus(mu));
        assert_eq!(folded, total);
    }

    #[test]
    fn bellman_ford_rejects_non_idempotent() {
        use crate::semiring::Real;
        let mut fsa: Fsa<Real> = Fsa::new();
        let a = fsa.fresh_state();
        fsa.set_i(a.clone(), None);
        fsa.set_f(a, None);
        assert_eq!(forward(&fsa, Strategy::BellmanFord), Err(PathsumError::RequiresIdempotent));
    }
}
