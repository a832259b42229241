//! End-to-end solves over small hand-built instances.

use subgraph_solver::restarts::NoRestartsSchedule;
use subgraph_solver::restarts::SequenceRestartsSchedule;
use subgraph_solver::termination::Indefinite;
use subgraph_solver::DeletionCallback;
use subgraph_solver::Injectivity;
use subgraph_solver::Lackey;
use subgraph_solver::ModelBuilder;
use subgraph_solver::NamedVertex;
use subgraph_solver::PropagateUsingLackey;
use subgraph_solver::Proof;
use subgraph_solver::Searcher;
use subgraph_solver::SolverOptions;
use subgraph_solver::ValueOrdering;
use subgraph_solver::VertexMapping;

fn clique(builder: ModelBuilder, size: usize, target: bool) -> ModelBuilder {
    let mut builder = builder;
    for u in 0..size {
        for v in (u + 1)..size {
            builder = if target {
                builder.add_target_edge(u, v)
            } else {
                builder.add_pattern_edge(u, v)
            };
        }
    }
    builder
}

fn counting_options() -> SolverOptions {
    SolverOptions {
        count_solutions: true,
        ..Default::default()
    }
}

#[test]
fn an_empty_pattern_is_trivially_satisfiable() {
    let model = ModelBuilder::new(0, 3)
        .add_target_edge(0, 1)
        .build()
        .expect("valid model");
    let mut searcher = Searcher::new(&model, SolverOptions::default());
    let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);

    assert!(result.satisfiable);
    assert!(result.mapping.is_empty());
    assert!(!result.aborted);
}

#[test]
fn a_single_edge_into_a_single_edge_has_two_mappings() {
    let model = ModelBuilder::new(2, 2)
        .add_pattern_edge(0, 1)
        .add_target_edge(0, 1)
        .build()
        .expect("valid model");
    let mut searcher = Searcher::new(&model, counting_options());
    let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);

    assert!(result.satisfiable);
    assert_eq!(result.solution_count, 2);
}

#[test]
fn a_triangle_does_not_embed_into_a_path() {
    let model = ModelBuilder::new(3, 3)
        .add_pattern_edge(0, 1)
        .add_pattern_edge(0, 2)
        .add_pattern_edge(1, 2)
        .add_target_edge(0, 1)
        .add_target_edge(1, 2)
        .build()
        .expect("valid model");
    let mut searcher = Searcher::new(&model, SolverOptions::default());
    let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);

    assert!(!result.satisfiable);
    assert!(result.mapping.is_empty());
}

#[test]
fn a_triangle_embeds_into_a_four_clique_twenty_four_ways() {
    let model = clique(clique(ModelBuilder::new(3, 4), 3, false), 4, true)
        .build()
        .expect("valid model");
    let mut searcher = Searcher::new(&model, counting_options());
    let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);

    assert_eq!(result.solution_count, 24);
}

#[test]
fn ordered_vertices_enumerate_the_increasing_pairs() {
    let model = ModelBuilder::new(2, 3)
        .add_pattern_less_than(0, 1)
        .build()
        .expect("valid model");
    let mut searcher = Searcher::new(&model, counting_options());
    let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);

    // Exactly (0,1), (0,2), and (1,2).
    assert_eq!(result.solution_count, 3);
}

#[test]
fn mismatched_edge_labels_make_the_instance_unsatisfiable() {
    let model = ModelBuilder::new(2, 2)
        .directed()
        .add_labelled_pattern_edge(0, 1, 1)
        .add_labelled_target_edge(0, 1, 2)
        .build()
        .expect("valid model");
    let mut searcher = Searcher::new(&model, SolverOptions::default());
    let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);

    assert!(!result.satisfiable);
}

#[test]
fn matching_edge_labels_are_accepted() {
    let model = ModelBuilder::new(2, 2)
        .directed()
        .add_labelled_pattern_edge(0, 1, 1)
        .add_labelled_target_edge(0, 1, 1)
        .build()
        .expect("valid model");
    let mut searcher = Searcher::new(&model, SolverOptions::default());
    let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);

    assert!(result.satisfiable);
    assert_eq!(result.mapping[&0], 0);
    assert_eq!(result.mapping[&1], 1);
}

#[test]
fn directed_edges_are_not_matched_backwards() {
    let model = ModelBuilder::new(2, 2)
        .directed()
        .add_pattern_edge(1, 0)
        .add_target_edge(0, 1)
        .build()
        .expect("valid model");
    let mut searcher = Searcher::new(&model, counting_options());
    let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);

    // The only target edge runs 0 -> 1, so the pattern edge 1 -> 0 forces
    // the reversed mapping.
    assert_eq!(result.solution_count, 1);
}

#[test]
fn induced_mode_rejects_mappings_that_add_edges() {
    // A path on three vertices into a triangle: fine as a plain subgraph,
    // impossible induced since its endpoints must stay non-adjacent.
    let builder = ModelBuilder::new(3, 3)
        .add_pattern_edge(0, 1)
        .add_pattern_edge(1, 2);
    let model = clique(builder, 3, true).build().expect("valid model");

    let mut searcher = Searcher::new(&model, SolverOptions::default());
    assert!(
        searcher
            .solve(&mut Indefinite, &mut NoRestartsSchedule)
            .satisfiable
    );

    let induced = SolverOptions {
        induced: true,
        ..Default::default()
    };
    let mut searcher = Searcher::new(&model, induced);
    assert!(
        !searcher
            .solve(&mut Indefinite, &mut NoRestartsSchedule)
            .satisfiable
    );
}

#[test]
fn non_injective_homomorphisms_may_collapse_vertices() {
    // A path on three vertices maps onto a single edge by folding.
    let model = ModelBuilder::new(3, 2)
        .add_pattern_edge(0, 1)
        .add_pattern_edge(1, 2)
        .add_target_edge(0, 1)
        .build()
        .expect("valid model");
    let options = SolverOptions {
        injectivity: Injectivity::NonInjective,
        count_solutions: true,
        ..Default::default()
    };
    let mut searcher = Searcher::new(&model, options);
    let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);

    // The image of vertex 1 determines the other two: two homomorphisms.
    assert_eq!(result.solution_count, 2);
}

#[test]
fn supplemental_graphs_restrict_the_mapping() {
    // Three isolated vertices each way; the supplemental graph pairs pattern
    // vertices 0 and 1 and only target vertices 0 and 1.
    let model = ModelBuilder::new(3, 3)
        .add_supplemental_graph(vec![(0, 1)], vec![(0, 1)])
        .build()
        .expect("valid model");
    let mut searcher = Searcher::new(&model, counting_options());
    let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);

    // 0 and 1 must occupy targets 0 and 1 in one of two orders; vertex 2
    // takes the remaining target.
    assert_eq!(result.solution_count, 2);
}

#[test]
fn every_value_ordering_reports_the_same_solution_set() {
    let model = clique(clique(ModelBuilder::new(3, 4), 3, false), 4, true)
        .build()
        .expect("valid model");

    let mut solution_sets: Vec<Vec<Vec<(usize, usize)>>> = Vec::new();
    for value_ordering in [
        ValueOrdering::Degree,
        ValueOrdering::AntiDegree,
        ValueOrdering::Biased,
        ValueOrdering::Random,
    ] {
        let options = SolverOptions {
            count_solutions: true,
            value_ordering,
            ..Default::default()
        };

        let mut seen: Vec<Vec<(usize, usize)>> = Vec::new();
        let mut record = |mapping: &VertexMapping| {
            let mut pairs: Vec<(usize, usize)> =
                mapping.iter().map(|(&p, &t)| (p, t)).collect();
            pairs.sort_unstable();
            seen.push(pairs);
        };

        let mut searcher = Searcher::new(&model, options).with_enumerate_callback(&mut record);
        let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);
        assert_eq!(result.solution_count, 24);
        drop(searcher);

        seen.sort_unstable();
        solution_sets.push(seen);
    }

    for set in &solution_sets[1..] {
        assert_eq!(set, &solution_sets[0]);
    }
}

#[test]
fn restarts_do_not_change_the_solution_count() {
    let model = clique(clique(ModelBuilder::new(3, 4), 3, false), 4, true)
        .build()
        .expect("valid model");
    let mut searcher = Searcher::new(&model, counting_options());
    let mut restarts = SequenceRestartsSchedule::luby(1);
    let result = searcher.solve(&mut Indefinite, &mut restarts);

    assert_eq!(result.solution_count, 24);
}

#[test]
fn restarts_do_not_change_unsatisfiability() {
    let model = ModelBuilder::new(3, 3)
        .add_pattern_edge(0, 1)
        .add_pattern_edge(0, 2)
        .add_pattern_edge(1, 2)
        .add_target_edge(0, 1)
        .add_target_edge(1, 2)
        .build()
        .expect("valid model");
    let mut searcher = Searcher::new(&model, SolverOptions::default());
    let mut restarts = SequenceRestartsSchedule::luby(1);
    let result = searcher.solve(&mut Indefinite, &mut restarts);

    assert!(!result.satisfiable);
}

#[test]
fn a_satisfiable_instance_survives_aggressive_restarts() {
    let model = clique(clique(ModelBuilder::new(3, 5), 3, false), 5, true)
        .build()
        .expect("valid model");
    let mut searcher = Searcher::new(&model, SolverOptions::default());
    let mut restarts = SequenceRestartsSchedule::luby(1);
    let result = searcher.solve(&mut Indefinite, &mut restarts);

    assert!(result.satisfiable);
    assert_eq!(result.mapping.len(), 3);
}

struct VetoLackey {
    rejected: (usize, usize),
}

impl Lackey for VetoLackey {
    fn check_solution(
        &mut self,
        mapping: &VertexMapping,
        is_partial: bool,
        _counting: bool,
        _deletions: Option<DeletionCallback<'_>>,
    ) -> bool {
        is_partial || mapping.get(&self.rejected.0) != Some(&self.rejected.1)
    }
}

#[test]
fn a_lackey_veto_steers_the_search_to_another_mapping() {
    let model = ModelBuilder::new(2, 2)
        .add_pattern_edge(0, 1)
        .add_target_edge(0, 1)
        .build()
        .expect("valid model");
    let mut lackey = VetoLackey { rejected: (0, 0) };
    let mut searcher = Searcher::new(&model, SolverOptions::default()).with_lackey(&mut lackey);
    let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);

    assert!(result.satisfiable);
    assert_eq!(result.mapping[&0], 1);
    assert_eq!(result.mapping[&1], 0);
}

struct RejectEverythingLackey;

impl Lackey for RejectEverythingLackey {
    fn check_solution(
        &mut self,
        _mapping: &VertexMapping,
        is_partial: bool,
        _counting: bool,
        _deletions: Option<DeletionCallback<'_>>,
    ) -> bool {
        is_partial
    }
}

#[test]
fn a_lackey_rejecting_every_mapping_makes_the_instance_unsatisfiable() {
    let model = ModelBuilder::new(2, 3)
        .build()
        .expect("valid model");
    let mut lackey = RejectEverythingLackey;
    let mut searcher = Searcher::new(&model, SolverOptions::default()).with_lackey(&mut lackey);
    let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);

    assert!(!result.satisfiable);
}

struct PartialObservingLackey {
    num_partials_seen: usize,
}

impl Lackey for PartialObservingLackey {
    fn check_solution(
        &mut self,
        _mapping: &VertexMapping,
        is_partial: bool,
        _counting: bool,
        _deletions: Option<DeletionCallback<'_>>,
    ) -> bool {
        if is_partial {
            self.num_partials_seen += 1;
        }
        true
    }
}

#[test]
fn partials_mode_shows_partial_mappings_to_the_lackey() {
    let model = ModelBuilder::new(2, 2)
        .add_pattern_edge(0, 1)
        .add_target_edge(0, 1)
        .build()
        .expect("valid model");
    let options = SolverOptions {
        propagate_using_lackey: PropagateUsingLackey::Partials,
        ..Default::default()
    };
    let mut lackey = PartialObservingLackey {
        num_partials_seen: 0,
    };
    let mut searcher = Searcher::new(&model, options).with_lackey(&mut lackey);
    let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);

    assert!(result.satisfiable);
    drop(searcher);
    assert!(lackey.num_partials_seen > 0);
}

#[test]
fn bigraph_constraints_veto_mappings_at_the_leaf() {
    let model = ModelBuilder::new(2, 2)
        .add_pattern_edge(0, 1)
        .add_target_edge(0, 1)
        .extra_bigraph_constraints(|mapping| mapping[&0] == 0)
        .build()
        .expect("valid model");
    let options = SolverOptions {
        bigraph: true,
        ..Default::default()
    };
    let mut searcher = Searcher::new(&model, options);
    let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);

    assert!(result.satisfiable);
    assert_eq!(result.mapping[&0], 0);
}

#[test]
fn bigraph_constraints_rejecting_everything_mean_unsatisfiable() {
    let model = ModelBuilder::new(2, 2)
        .add_pattern_edge(0, 1)
        .add_target_edge(0, 1)
        .extra_bigraph_constraints(|_| false)
        .build()
        .expect("valid model");
    let options = SolverOptions {
        bigraph: true,
        ..Default::default()
    };
    let mut searcher = Searcher::new(&model, options);
    let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);

    assert!(!result.satisfiable);
}

#[derive(Default)]
struct RecordingProof {
    num_guesses: usize,
    num_solutions: usize,
    num_unit_propagations: usize,
}

impl Proof for RecordingProof {
    fn guessing(&mut self, _depth: usize, _pattern: NamedVertex, _target: NamedVertex) {
        self.num_guesses += 1;
    }

    fn propagation_failure(
        &mut self,
        _decisions: &[(usize, usize)],
        _pattern: NamedVertex,
        _target: NamedVertex,
    ) {
    }

    fn start_level(&mut self, _level: usize) {}

    fn back_up_to_level(&mut self, _level: usize) {}

    fn incorrect_guess(&mut self, _decisions: &[(usize, usize)], _was_failure: bool) {}

    fn forget_level(&mut self, _level: usize) {}

    fn out_of_guesses(&mut self, _decisions: &[(usize, usize)]) {}

    fn unit_propagating(&mut self, _pattern: NamedVertex, _target: NamedVertex) {
        self.num_unit_propagations += 1;
    }

    fn post_restart_nogood(&mut self, _decisions: &[(usize, usize)]) {}

    fn post_solution(&mut self, _solution: &[(NamedVertex, NamedVertex)]) {
        self.num_solutions += 1;
    }

    fn back_up_to_top(&mut self) {}
}

#[test]
fn proof_events_track_the_enumeration() {
    let model = ModelBuilder::new(2, 2)
        .add_pattern_edge(0, 1)
        .add_target_edge(0, 1)
        .build()
        .expect("valid model");
    let mut proof = RecordingProof::default();
    let mut searcher = Searcher::new(&model, counting_options()).with_proof(&mut proof);
    let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);

    assert_eq!(result.solution_count, 2);
    drop(searcher);
    assert_eq!(proof.num_solutions, 2);
    assert!(proof.num_guesses > 0);
    assert!(proof.num_unit_propagations > 0);
}

#[test]
fn the_enumerate_callback_sees_every_mapping_once() {
    let model = ModelBuilder::new(2, 3)
        .build()
        .expect("valid model");

    let mut seen: Vec<Vec<(usize, usize)>> = Vec::new();
    let mut record = |mapping: &VertexMapping| {
        let mut pairs: Vec<(usize, usize)> = mapping.iter().map(|(&p, &t)| (p, t)).collect();
        pairs.sort_unstable();
        seen.push(pairs);
    };
    let mut searcher =
        Searcher::new(&model, counting_options()).with_enumerate_callback(&mut record);
    let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);

    // Two free vertices over three targets, injectively.
    assert_eq!(result.solution_count, 6);
    drop(searcher);
    seen.sort_unstable();
    let mut deduplicated = seen.clone();
    deduplicated.dedup();
    assert_eq!(seen.len(), 6);
    assert_eq!(seen, deduplicated);
}
