//! The weighted context-free grammar (WCFG) data model: `⟨Σ, V, S, P⟩`.
//!
//! A grammar is built imperatively with [`Wcfg::add`]; every production's
//! right-hand side is a mix of terminals (ordinary alphabet symbols) and
//! nonterminals (plain `String` names — fresh ones, minted by
//! [`crate::cfg::transformer::Transformer`], use an `@`-prefixed
//! convention to stay visibly distinct from user-chosen names).

pub mod transformer;
pub mod treesum;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::semiring::Semiring;
use crate::symbol::Sym;

/// One symbol on a production's right-hand side.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum CfgSym {
    /// A nonterminal, named by a plain string.
    NonTerm(String),
    /// A terminal drawn from `Σ` (or `ε`).
    Term(Sym),
}

impl CfgSym {
    /// Shorthand for a nonterminal symbol.
    pub fn nt(name: impl Into<String>) -> Self {
        CfgSym::NonTerm(name.into())
    }

    /// Shorthand for a terminal symbol.
    pub fn term(sym: impl Into<Sym>) -> Self {
        CfgSym::Term(sym.into())
    }

    /// True for [`CfgSym::NonTerm`].
    pub fn is_nonterminal(&self) -> bool {
        matches!(self, CfgSym::NonTerm(_))
    }
}

impl fmt::Display for CfgSym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CfgSym::NonTerm(n) => write!(f, "{n}"),
            CfgSym::Term(s) => write!(f, "{s}"),
        }
    }
}

/// `⟨Σ, V, S, P⟩` over a semiring `R`: weighted productions `A → α` keyed on
/// `(A, α)` so repeated `add` calls for the same rule accumulate weight
/// under `⊕`, exactly like [`crate::fsa::Fsa::add_arc`].
#[derive(Clone, Debug)]
pub struct Wcfg<R: Semiring> {
    sigma: BTreeSet<Sym>,
    v: BTreeSet<String>,
    s: String,
    p: BTreeMap<(String, Vec<CfgSym>), R>,
}

impl<R: Semiring> Wcfg<R> {
    /// A grammar with start symbol `s` and no productions yet.
    pub fn new(s: impl Into<String>) -> Self {
        let s = s.into();
        let mut v = BTreeSet::new();
        v.insert(s.clone());
        Wcfg { sigma: BTreeSet::new(), v, s, p: BTreeMap::new() }
    }

    /// `P(A → α) ⊕= w`.
    pub fn add(&mut self, lhs: impl Into<String>, rhs: Vec<CfgSym>, w: R) {
        let lhs = lhs.into();
        self.v.insert(lhs.clone());
        for sym in &rhs {
            match sym {
                CfgSym::NonTerm(n) => {
                    self.v.insert(n.clone());
                }
                CfgSym::Term(t) => {
                    if !t.is_epsilon() {
                        self.sigma.insert(t.clone());
                    }
                }
            }
        }
        let key = (lhs, rhs);
        let e = self.p.entry(key).or_insert_with(R::zero);
        *e = e.plus(&w);
    }

    /// The start nonterminal `S`.
    pub fn start(&self) -> &str {
        &self.s
    }

    /// `V`.
    pub fn nonterminals(&self) -> impl Iterator<Item = &str> {
        self.v.iter().map(String::as_str)
    }

    /// `Σ`.
    pub fn terminals(&self) -> &BTreeSet<Sym> {
        &self.sigma
    }

    /// All `(rhs, weight)` pairs for productions with this left-hand side.
    pub fn productions_for(&self, lhs: &str) -> impl Iterator<Item = (&[CfgSym], R)> {
        self.p
            .iter()
            .filter(move |((l, _), _)| l == lhs)
            .map(|((_, rhs), w)| (rhs.as_slice(), w.clone()))
    }

    /// Every `(lhs, rhs, weight)` triple.
    pub fn productions(&self) -> impl Iterator<Item = (&str, &[CfgSym], R)> {
        self.p.iter().map(|((l, rhs), w)| (l.as_str(), rhs.as_slice(), w.clone()))
    }

    /// `|P|`.
    pub fn num_productions(&self) -> usize {
        self.p.len()
    }

    /// An empty grammar with a fresh start symbol, sharing no productions
    /// with `self` — used by transformer stages that build a new grammar
    /// from scratch.
    pub fn spawn(&self, s: impl Into<String>) -> Self {
        Wcfg::new(s)
    }
}

impl<R: Semiring> fmt::Display for Wcfg<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "WCFG start={}, {} nonterminals, {} productions", self.s, self.v.len(), self.p.len())?;
        for (lhs, rhs, w) in self.productions() {
            let rhs_str = if rhs.is_empty() {
                "ε".to_string()
            } else {
                rhs.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" ")
            };
            writeln!(f, "  {lhs} -> {rhs_str} / {w}")?;
        }
        Ok(())
    }
}
