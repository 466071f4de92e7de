//! Algorithms over weighted finite-state automata (WFSA) and weighted
//! context-free grammars (WCFG), generic over an arbitrary semiring.
//!
//! ## Layout
//!
//! - [`semiring`]: the `Semiring`/`Closed`/`Invertible` traits and the
//!   concrete semirings (`Boolean`, `Real`, `Tropical`, `StringSemiring`,
//!   `Derivation`, `Product`).
//! - [`symbol`]: alphabet symbols, including the epsilon filter markers.
//! - [`state`]: opaque state identity and the derived-state key tables
//!   (`PairStateTable`, `PowerStateTable`) shared by several algorithms.
//! - [`graph`]: generic graph utilities (toposort, SCC, accessibility) over
//!   an [`fsa::Fsa`]'s transition structure.
//! - [`pathsum`]: the six pathsum strategies (Viterbi, Bellman-Ford,
//!   Dijkstra, Lehmann, decomposed Lehmann, Johnson).
//! - [`fsa`]: the WFSA data model and its algorithms (rational operations,
//!   intersection, determinization, minimization, weight pushing, epsilon
//!   removal).
//! - [`fst`]: weighted finite-state transducers and composition.
//! - [`cfg`]: the WCFG data model, Treesum, and grammar-to-grammar
//!   transforms (nullary/unary removal, Chomsky normal form).
//!
//! Every algorithm here builds and returns a fresh structure rather than
//! mutating its input, runs single-threaded, and iterates in a
//! deterministic order (`BTreeMap`/`BTreeSet` keyed on id-based `Ord`) so
//! that non-idempotent semirings (e.g. `Real`) sum in a reproducible order.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

/// Semiring algebra: `Semiring`, `Closed`, `Invertible`, and the concrete
/// semirings this crate ships.
pub mod semiring;
/// Alphabet symbols, including the epsilon filter markers used by
/// [`fsa::intersect`].
pub mod symbol;
/// Opaque state identity and derived-state key tables.
pub mod state;
/// Graph utilities over an automaton's transition structure.
pub mod graph;
/// The pathsum engine: six strategies for summing over accepting paths.
pub mod pathsum;
/// The weighted finite-state automaton data model and its algorithms.
pub mod fsa;
/// Weighted finite-state transducers and composition.
pub mod fst;
/// The weighted context-free grammar data model and its transforms.
pub mod cfg;

pub use fsa::Fsa;
pub use fst::Wfst;
pub use cfg::{CfgSym, Wcfg};
pub use pathsum::{pathsum, PathsumError, Strategy};
pub use semiring::{Closed, Invertible, Semiring, SemiringError};
pub use state::State;
pub use symbol::Sym;

pub use fsa::determinize::DeterminizeError;
pub use fsa::minimize::MinimizeError;
pub use fsa::push::PushError;
pub use fsa::EquivalentError;
