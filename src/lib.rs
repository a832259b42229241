//! # Subgraph solver
//!
//! A solver for subgraph-mapping problems: given a pattern graph and a target
//! graph, it decides whether a mapping from pattern vertices to target
//! vertices exists under a configurable set of structural constraints
//! (homomorphism, injective or locally injective mappings, induced
//! subgraphs, directed and edge-labelled graphs, ordered-vertex constraints,
//! and a bigraph extension), returning one such mapping or enumerating and
//! counting all of them.
//!
//! The engine is a constraint-propagation backtracking search with
//! nogood-driven restarts: domains are bitsets over the target vertices,
//! propagation runs adjacency, injectivity, ordering, and watched-nogood
//! filtering to fixpoint at every node, and restarts record the refuted
//! decision prefixes as nogoods so no work is repeated.
//!
//! # Solving a problem
//!
//! A problem is described by a [`Model`], built from the two edge lists:
//! ```rust
//! use subgraph_solver::restarts::NoRestartsSchedule;
//! use subgraph_solver::termination::Indefinite;
//! use subgraph_solver::ModelBuilder;
//! use subgraph_solver::Searcher;
//! use subgraph_solver::SolverOptions;
//!
//! // A triangle pattern, and a clique on four vertices as the target.
//! let mut builder = ModelBuilder::new(3, 4);
//! for (u, v) in [(0, 1), (0, 2), (1, 2)] {
//!     builder = builder.add_pattern_edge(u, v);
//! }
//! for u in 0..4 {
//!     for v in (u + 1)..4 {
//!         builder = builder.add_target_edge(u, v);
//!     }
//! }
//! let model = builder.build().expect("a well-formed model");
//!
//! // Find one injective mapping, searching without a time limit and without
//! // restarts.
//! let mut searcher = Searcher::new(&model, SolverOptions::default());
//! let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);
//!
//! assert!(result.satisfiable);
//! assert_eq!(result.mapping.len(), 3);
//! ```
//!
//! Counting instead of searching for a single mapping is a matter of options:
//! ```rust
//! # use subgraph_solver::restarts::NoRestartsSchedule;
//! # use subgraph_solver::termination::Indefinite;
//! # use subgraph_solver::ModelBuilder;
//! # use subgraph_solver::Searcher;
//! # use subgraph_solver::SolverOptions;
//! # let mut builder = ModelBuilder::new(3, 4);
//! # for (u, v) in [(0, 1), (0, 2), (1, 2)] {
//! #     builder = builder.add_pattern_edge(u, v);
//! # }
//! # for u in 0..4 {
//! #     for v in (u + 1)..4 {
//! #         builder = builder.add_target_edge(u, v);
//! #     }
//! # }
//! # let model = builder.build().expect("a well-formed model");
//! let options = SolverOptions {
//!     count_solutions: true,
//!     ..Default::default()
//! };
//! let mut searcher = Searcher::new(&model, options);
//! let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);
//!
//! // Each of the 4 * 3 * 2 ordered vertex triples of the clique is a
//! // distinct injective mapping of the triangle.
//! assert_eq!(result.solution_count, 24);
//! ```
//!
//! Long-running searches are kept in check by a
//! [`termination::TerminationCondition`] polled at every node, and a
//! [`restarts::RestartsSchedule`] decides when the search unwinds to the root
//! and re-enters with its learned nogoods (for example
//! [`restarts::SequenceRestartsSchedule::luby`]).
//!
//! # Feature flags
//! - `debug-checks`: enable expensive internal consistency assertions. These
//!   slow the solver down considerably, so they are off by default.

#[doc(hidden)]
pub mod asserts;

pub(crate) mod basic_types;
pub(crate) mod branching;
pub mod containers;
pub(crate) mod engine;
mod lackey;
mod model;
mod options;
mod proof;

pub use basic_types::HomomorphismResult;
pub use basic_types::Random;
pub use basic_types::VertexMapping;
pub use engine::restarts;
pub use engine::termination;
pub use engine::Searcher;
pub use lackey::DeletionCallback;
pub use lackey::Lackey;
pub use model::Model;
pub use model::ModelBuildError;
pub use model::ModelBuilder;
pub use model::NamedVertex;
pub use model::MAX_GRAPHS;
pub use options::Injectivity;
pub use options::PropagateUsingLackey;
pub use options::SolverOptions;
pub use options::ValueOrdering;
pub use proof::Proof;
