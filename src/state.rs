//! Opaque state identity and the derived-state key types used internally by
//! the rational constructions.
//!
//! A [`State`] is an opaque identity (a `u64`) with an optional display
//! label; equality, hashing, and ordering are over the identity only. Every
//! automaton returned by an algorithm in this crate is built from fresh
//! `State`s allocated by a local [`StateArena`] — derived-state identity
//! (pair states, power states) is resolved to a canonical `State` through a
//! structural key lookup *before* construction, so two occurrences of the
//! same derived state collide onto one `State`, matching spec.md's
//! `PairState`/`PowerState` equality rules.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::semiring::Semiring;

/// An opaque state identity, optionally carrying a display label.
///
/// Equality, ordering, and hashing consider only [`State::id`]; the label is
/// purely cosmetic (used by [`std::fmt::Display`]).
#[derive(Clone, Debug)]
pub struct State {
    id: u64,
    label: Option<String>,
}

impl State {
    /// A bare state with no label.
    pub fn new(id: u64) -> Self {
        State { id, label: None }
    }

    /// A state labeled for display purposes only.
    pub fn labeled(id: u64, label: impl Into<String>) -> Self {
        State { id, label: Some(label.into()) }
    }

    /// The opaque identity.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The display label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for State {}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(l) => write!(f, "{l}"),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Allocates fresh [`State`]s with strictly increasing ids, so iteration
/// order over a `BTreeSet<State>`/`BTreeMap<State, _>` matches discovery
/// order during a construction (union tag, BFS in intersect/determinize,
/// block numbering in minimize), which is what makes that iteration
/// deterministic per spec.md §5.
#[derive(Default, Clone)]
pub struct StateArena {
    next: u64,
}

impl StateArena {
    pub fn new() -> Self {
        StateArena { next: 0 }
    }

    /// Allocate a fresh, unlabeled state.
    pub fn fresh(&mut self) -> State {
        let id = self.next;
        self.next += 1;
        State::new(id)
    }

    /// Allocate a fresh state carrying a display label.
    pub fn fresh_labeled(&mut self, label: impl Into<String>) -> State {
        let id = self.next;
        self.next += 1;
        State::labeled(id, label)
    }
}

/// Structural key for a `PairState(p, q)`: equal iff both components are
/// equal, exactly as spec.md §3 specifies.
///
/// Backed by a `BTreeMap` keyed on `(u64, u64)` (the components' ids), since
/// `State`'s `Ord` already gives a total, stable order.
#[derive(Default)]
pub struct PairStateTable {
    assigned: BTreeMap<(u64, u64), State>,
    arena: StateArena,
}

impl PairStateTable {
    pub fn new() -> Self {
        PairStateTable::default()
    }

    /// Resolve `(p, q)` to its canonical `State`, allocating a fresh one on
    /// first occurrence.
    pub fn get_or_insert(&mut self, p: &State, q: &State) -> State {
        let key = (p.id(), q.id());
        if let Some(s) = self.assigned.get(&key) {
            return s.clone();
        }
        let fresh = self.arena.fresh_labeled(format!("({p}, {q})"));
        self.assigned.insert(key, fresh.clone());
        fresh
    }
}

/// Structural key for a `PowerState`: a finite residual map `Q → R`.
///
/// Two power states are equal iff they carry the *same set of (state,
/// residual) pairs* (spec.md §3, §9): this is checked with a sorted,
/// immutable residual list rather than relying on insertion order, and
/// without requiring `R: Hash`/`Ord` (many semirings, e.g. `Real`, carry
/// `f64` payloads with no total order) — lookups instead do a linear scan
/// over previously-seen keys comparing by `PartialEq`, which is adequate
/// for the automaton sizes this crate targets.
pub struct PowerStateTable<R: Semiring> {
    seen: Vec<(Vec<(u64, R)>, State)>,
    arena: StateArena,
}

impl<R: Semiring> Default for PowerStateTable<R> {
    fn default() -> Self {
        PowerStateTable { seen: Vec::new(), arena: StateArena::new() }
    }
}

impl<R: Semiring> PowerStateTable<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a residual map to its canonical `State`, allocating a fresh
    /// one the first time this exact residual multiset is seen.
    ///
    /// `residuals` need not be pre-sorted; it is sorted here by component
    /// state id to produce a stable key.
    pub fn get_or_insert(&mut self, residuals: &BTreeMap<State, R>) -> (State, bool) {
        let mut key: Vec<(u64, R)> =
            residuals.iter().map(|(q, w)| (q.id(), w.clone())).collect();
        key.sort_by_key(|(id, _)| *id);

        for (existing, s) in &self.seen {
            if existing == &key {
                return (s.clone(), false);
            }
        }

        let label = residuals
            .iter()
            .map(|(q, w)| format!("{q}/{w}"))
            .collect::<Vec<_>>()
            .join(", ");
        let fresh = self.arena.fresh_labeled(format!("{{{label}}}"));
        self.seen.push((key, fresh.clone()));
        (fresh, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semiring::Boolean;

    #[test]
    fn state_equality_is_by_id_only() {
        let a = State::labeled(3, "a");
        let b = State::new(3);
        assert_eq!(a, b);
        let c = State::new(4);
        assert_ne!(a, c);
    }

    #[test]
    fn pair_state_table_collides_on_equal_components() {
        let mut table = PairStateTable::new();
        let p = State::new(0);
        let q = State::new(1);
        let s1 = table.get_or_insert(&p, &q);
        let s2 = table.get_or_insert(&p, &q);
        assert_eq!(s1, s2);
        let s3 = table.get_or_insert(&q, &p);
        assert_ne!(s1, s3);
    }

    #[test]
    fn power_state_table_collides_on_equal_residuals() {
        let mut table: PowerStateTable<Boolean> = PowerStateTable::new();
        let p = State::new(0);
        let q = State::new(1);

        let mut m1 = BTreeMap::new();
        m1.insert(p.clone(), Boolean(true));
        m1.insert(q.clone(), Boolean(false));

        let mut m2 = BTreeMap::new();
        m2.insert(q.clone(), Boolean(false));
        m2.insert(p.clone(), Boolean(true));

        let (s1, fresh1) = table.get_or_insert(&m1);
        let (s2, fresh2) = table.get_or_insert(&m2);
        assert_eq!(s1, s2);
        assert!(fresh1);
        assert!(!fresh2);
    }
}
