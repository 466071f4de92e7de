//! Algebraic invariants that must hold for every supported semiring and
//! automaton/grammar shape, as opposed to `scenarios.rs`'s fixed concrete
//! inputs.

use std::collections::BTreeMap;

use rayuela::cfg::transformer::Transformer;
use rayuela::cfg::treesum;
use rayuela::fsa::determinize::determinize;
use rayuela::fsa::minimize::minimize;
use rayuela::fsa::push::push;
use rayuela::fsa::rational::{concatenate, kleene_closure, union};
use rayuela::pathsum::{self, Strategy};
use rayuela::semiring::{Boolean, Closed, Real, Tropical};
use rayuela::{CfgSym, Fsa, Semiring, State, Sym, Wcfg};

fn combine_alpha<R: Semiring>(fsa: &Fsa<R>, alpha: &BTreeMap<State, R>) -> R {
    fsa.finals().fold(R::zero(), |acc, (q, rho)| {
        acc.plus(&alpha.get(&q).cloned().unwrap_or_else(R::zero).times(&rho))
    })
}

fn branchy_chain() -> Fsa<Tropical> {
    let mut fsa = Fsa::new();
    let a = fsa.fresh_state();
    let b = fsa.fresh_state();
    let c = fsa.fresh_state();
    let d = fsa.fresh_state();
    fsa.set_i(a.clone(), Some(Tropical(0.0)));
    fsa.add_arc(a.clone(), Sym::sym("x"), b.clone(), Tropical(1.0));
    fsa.add_arc(a, Sym::sym("x"), c.clone(), Tropical(2.0));
    fsa.add_arc(b, Sym::sym("c"), d.clone(), Tropical(5.0));
    fsa.add_arc(c, Sym::sym("d"), d.clone(), Tropical(6.0));
    fsa.set_f(d, Some(Tropical(0.0)));
    fsa
}

#[test]
fn star_fixed_point_holds_on_closed_elements() {
    let a = Real(0.4);
    let star = a.star().unwrap();
    let rhs = Real::one().plus(&a.times(&star));
    assert!((star.0 - rhs.0).abs() < 1e-9);

    let t = Tropical(3.0);
    let tstar = t.star().unwrap();
    let trhs = Tropical::one().plus(&t.times(&tstar));
    assert_eq!(tstar, trhs);
}

#[test]
fn pushed_automaton_has_unit_backward_potential_everywhere() {
    let fsa = branchy_chain();
    let pushed = push(&fsa).unwrap();
    assert!(rayuela::fsa::push::is_pushed(&pushed).unwrap());
    // Pathsum survives the reweighting.
    let before = pathsum::pathsum(&fsa, Strategy::Viterbi).unwrap();
    let after = pathsum::pathsum(&pushed, Strategy::Viterbi).unwrap();
    assert_eq!(before, after);
}

#[test]
fn reverse_is_involutive_on_pathsum_and_arcs() {
    let fsa = branchy_chain();
    let twice = fsa.reverse().reverse();
    assert_eq!(twice.num_states(), fsa.num_states());

    let mut original_arcs: Vec<(Sym, Tropical)> =
        fsa.states().flat_map(|q| fsa.arcs(q).map(|(a, _, w)| (a, w))).collect();
    let mut twice_arcs: Vec<(Sym, Tropical)> =
        twice.states().flat_map(|q| twice.arcs(q).map(|(a, _, w)| (a, w))).collect();
    original_arcs.sort_by(|a, b| a.0.cmp(&b.0).then(a.1 .0.partial_cmp(&b.1 .0).unwrap()));
    twice_arcs.sort_by(|a, b| a.0.cmp(&b.0).then(a.1 .0.partial_cmp(&b.1 .0).unwrap()));
    assert_eq!(original_arcs, twice_arcs);

    let p1 = pathsum::pathsum(&fsa, Strategy::Viterbi).unwrap();
    let p2 = pathsum::pathsum(&twice, Strategy::Viterbi).unwrap();
    assert_eq!(p1, p2);
}

#[test]
fn trim_preserves_pathsum() {
    let mut fsa = branchy_chain();
    // A dangling unreachable state: no initial weight, no path in or out.
    fsa.fresh_state();

    let trimmed = fsa.trim();
    let before = pathsum::pathsum(&fsa, Strategy::Viterbi).unwrap();
    let after = pathsum::pathsum(&trimmed, Strategy::Viterbi).unwrap();
    assert_eq!(before, after);
    assert!(trimmed.num_states() < fsa.num_states());
}

#[test]
fn determinize_preserves_pathsum_and_yields_a_deterministic_automaton() {
    let mut fsa: Fsa<Tropical> = Fsa::new();
    let a = fsa.fresh_state();
    let b = fsa.fresh_state();
    let c = fsa.fresh_state();
    fsa.set_i(a.clone(), Some(Tropical(0.0)));
    fsa.add_arc(a.clone(), Sym::sym("x"), b.clone(), Tropical(1.0));
    fsa.add_arc(a, Sym::sym("x"), c.clone(), Tropical(2.0));
    fsa.set_f(b, Some(Tropical(0.0)));
    fsa.set_f(c, Some(Tropical(0.0)));

    let det = determinize(&fsa).unwrap();
    assert!(det.deterministic());
    let before = pathsum::pathsum(&fsa, Strategy::Viterbi).unwrap();
    let after = pathsum::pathsum(&det, Strategy::Viterbi).unwrap();
    assert_eq!(before, after);
}

#[test]
fn minimize_preserves_pathsum_and_determinism() {
    let mut fsa: Fsa<Boolean> = Fsa::new();
    let s0 = fsa.fresh_state();
    let s1 = fsa.fresh_state();
    let s2 = fsa.fresh_state();
    fsa.set_i(s0.clone(), None);
    // s1 and s2 are behaviorally identical (both final, both self-loop on
    // "x"): minimize should collapse them into one state. Every state has
    // exactly one outgoing "x" arc, so the automaton is complete.
    fsa.add_arc(s0, Sym::sym("x"), s1.clone(), Boolean(true));
    fsa.add_arc(s1.clone(), Sym::sym("x"), s1.clone(), Boolean(true));
    fsa.add_arc(s2.clone(), Sym::sym("x"), s2.clone(), Boolean(true));
    fsa.set_f(s1, None);
    fsa.set_f(s2, None);

    assert!(fsa.deterministic());
    assert!(fsa.complete());

    let minimized = minimize(&fsa).unwrap();
    assert!(minimized.deterministic());
    assert!(minimized.num_states() < fsa.num_states());
    let before = pathsum::pathsum(&fsa, Strategy::BellmanFord).unwrap();
    let after = pathsum::pathsum(&minimized, Strategy::BellmanFord).unwrap();
    assert_eq!(before, after);
}

#[test]
fn intersection_pathsum_is_independent_of_which_side_moves_first() {
    let mut a: Fsa<Boolean> = Fsa::new();
    let a0 = a.fresh_state();
    let a1 = a.fresh_state();
    a.set_i(a0.clone(), None);
    a.add_arc(a0, Sym::Eps, a1.clone(), Boolean(true));
    a.set_f(a1, None);

    let mut b: Fsa<Boolean> = Fsa::new();
    let b0 = b.fresh_state();
    let b1 = b.fresh_state();
    b.set_i(b0.clone(), None);
    b.add_arc(b0, Sym::Eps, b1.clone(), Boolean(true));
    b.set_f(b1, None);

    let both = rayuela::fsa::intersect::intersect(&a, &b);
    let total = pathsum::pathsum(&both, Strategy::BellmanFord).unwrap();
    assert_eq!(total, Boolean(true));
}

#[test]
fn pathsum_strategies_agree_on_an_acyclic_automaton() {
    let fsa = branchy_chain();
    let viterbi = pathsum::pathsum(&fsa, Strategy::Viterbi).unwrap();
    let bf = pathsum::pathsum(&fsa, Strategy::BellmanFord).unwrap();
    let dij = pathsum::pathsum(&fsa, Strategy::Dijkstra).unwrap();
    let lehmann_alpha = pathsum::lehmann_fwd(&fsa).unwrap();
    let lehmann = combine_alpha(&fsa, &lehmann_alpha);
    let decomposed_alpha = pathsum::decomposed_lehmann_fwd(&fsa).unwrap();
    let decomposed = combine_alpha(&fsa, &decomposed_alpha);
    let johnson = pathsum::johnson(&fsa).unwrap();

    assert_eq!(viterbi, bf);
    assert_eq!(viterbi, dij);
    assert_eq!(viterbi, lehmann);
    assert_eq!(viterbi, decomposed);
    assert_eq!(viterbi, johnson);
}

#[test]
fn rational_operation_identities_on_tropical() {
    let mut a: Fsa<Tropical> = Fsa::new();
    let a0 = a.fresh_state();
    let a1 = a.fresh_state();
    a.set_i(a0.clone(), Some(Tropical(0.0)));
    a.add_arc(a0, Sym::sym("a"), a1.clone(), Tropical(2.0));
    a.set_f(a1, Some(Tropical(0.0)));

    let mut b: Fsa<Tropical> = Fsa::new();
    let b0 = b.fresh_state();
    let b1 = b.fresh_state();
    b.set_i(b0.clone(), Some(Tropical(0.0)));
    b.add_arc(b0, Sym::sym("b"), b1.clone(), Tropical(3.0));
    b.set_f(b1, Some(Tropical(0.0)));

    let pa = pathsum::pathsum(&a, Strategy::Viterbi).unwrap();
    let pb = pathsum::pathsum(&b, Strategy::Viterbi).unwrap();

    let u = union(&a, &b);
    let pu = pathsum::pathsum(&u, Strategy::Viterbi).unwrap();
    assert_eq!(pu, pa.plus(&pb));

    let cat = concatenate(&a, &b);
    let pcat = pathsum::pathsum(&cat, Strategy::Viterbi).unwrap();
    assert_eq!(pcat, pa.times(&pb));

    let star = kleene_closure(&a).unwrap();
    let pstar = pathsum::lehmann_fwd(&star).unwrap();
    let pstar_total = combine_alpha(&star, &pstar);
    // `pathsum(F.kleene_closure()) >= one`: the closure always accepts the
    // empty string, so `one` never exceeds it in the semiring order.
    assert!(Tropical::one().le(&pstar_total));
}

#[test]
fn cfg_transforms_preserve_treesum_on_boolean_grammars() {
    let mut g: Wcfg<Boolean> = Wcfg::new("S");
    g.add("S", vec![CfgSym::nt("A"), CfgSym::nt("B")], Boolean(true));
    g.add("A", vec![CfgSym::term("a")], Boolean(true));
    g.add("A", vec![], Boolean(true));
    g.add("B", vec![CfgSym::nt("C")], Boolean(true));
    g.add("C", vec![CfgSym::term("c")], Boolean(true));

    let mut t = Transformer::new();
    let before = treesum::treesum(&g);

    let denulled = t.nullary_remove(&g);
    assert_eq!(treesum::treesum(&denulled), before);

    let deunaried = t.unary_remove(&denulled).unwrap();
    assert_eq!(treesum::treesum(&deunaried), before);

    let cnf = t.cnf(&g).unwrap();
    assert_eq!(treesum::treesum(&cnf), before);
    assert!(cnf.productions().all(|(_, rhs, _)| rhs.len() <= 2));
}
