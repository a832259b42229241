use std::fmt;

use itertools::Itertools;
use log::debug;
use log::trace;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::basic_types::Assignment;
use crate::basic_types::AssignmentsTrail;
use crate::basic_types::HomomorphismResult;
use crate::basic_types::SearchResult;
use crate::basic_types::VertexMapping;
use crate::branching::find_branch_domain;
use crate::branching::order_values;
use crate::engine::domains::copy_nonfixed_and_assign;
use crate::engine::domains::Domains;
use crate::engine::restarts::RestartsSchedule;
use crate::engine::termination::TerminationCondition;
use crate::engine::watch_table::Nogood;
use crate::engine::watch_table::WatchTable;
use crate::engine::SearchStatistics;
use crate::lackey::Lackey;
use crate::model::Model;
use crate::model::NamedVertex;
use crate::options::PropagateUsingLackey;
use crate::options::SolverOptions;
use crate::proof::Proof;

const DEFAULT_SEED: u64 = 42;

/// The search core: a recursive, restarting depth-first search over the
/// pattern-vertex domains, with constraint propagation at every node and
/// nogood recording across restarts.
///
/// A searcher borrows its immutable [`Model`] and owns everything whose
/// lifetime matches one solve: the watch table (which accumulates nogoods
/// across restarts), the random generator behind the randomised value
/// orderings, and the optional collaborator hooks.
pub struct Searcher<'a> {
    pub(crate) model: &'a Model,
    pub(crate) options: SolverOptions,
    pub(crate) watches: WatchTable,
    pub(crate) random: SmallRng,
    pub(crate) proof: Option<&'a mut dyn Proof>,
    pub(crate) lackey: Option<&'a mut dyn Lackey>,
    pub(crate) enumerate_callback: Option<&'a mut dyn FnMut(&VertexMapping)>,
}

impl fmt::Debug for Searcher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Searcher")
            .field("model", &self.model)
            .field("options", &self.options)
            .finish()
    }
}

impl<'a> Searcher<'a> {
    pub fn new(model: &'a Model, options: SolverOptions) -> Searcher<'a> {
        Searcher {
            model,
            options,
            watches: WatchTable::default(),
            random: SmallRng::seed_from_u64(DEFAULT_SEED),
            proof: None,
            lackey: None,
            enumerate_callback: None,
        }
    }

    /// Reseeds the random generator driving the randomised value orderings.
    pub fn set_seed(&mut self, seed: u64) {
        self.random = SmallRng::seed_from_u64(seed);
    }

    /// Attaches a proof event sink.
    pub fn with_proof(mut self, proof: &'a mut dyn Proof) -> Searcher<'a> {
        self.proof = Some(proof);
        self
    }

    /// Attaches the external lackey oracle.
    pub fn with_lackey(mut self, lackey: &'a mut dyn Lackey) -> Searcher<'a> {
        self.lackey = Some(lackey);
        self
    }

    /// Attaches a consumer invoked with every complete mapping found while
    /// counting.
    pub fn with_enumerate_callback(
        mut self,
        callback: &'a mut dyn FnMut(&VertexMapping),
    ) -> Searcher<'a> {
        self.enumerate_callback = Some(callback);
        self
    }

    /// Decides whether there is a mapping of the pattern into the target
    /// satisfying the configured constraints, returning the first one found,
    /// or enumerating and counting all of them when requested.
    pub fn solve(
        &mut self,
        termination: &mut dyn TerminationCondition,
        restarts_schedule: &mut dyn RestartsSchedule,
    ) -> HomomorphismResult {
        if (restarts_schedule.might_restart() || self.options.bigraph)
            && !self.watches.is_enabled()
        {
            self.watches = WatchTable::new(self.model.pattern_size(), self.model.target_size());
        }

        let mut statistics = SearchStatistics::default();
        let mut result = HomomorphismResult::default();
        let mut trail = AssignmentsTrail::default();
        let mut domains = self.model.initial_domains();

        let mut found_a_mapping = false;

        statistics.propagations += 1;
        let root_uses_lackey = self.lackey.is_some() && self.options.uses_lackey_at_root();
        if self.propagate(&mut domains, &mut trail, root_uses_lackey) {
            loop {
                if !self.apply_pending_singleton_nogoods(&mut domains, &mut trail, &mut statistics)
                {
                    break;
                }

                match self.restarting_search(
                    &mut trail,
                    &domains,
                    &mut statistics,
                    0,
                    restarts_schedule,
                    termination,
                ) {
                    SearchResult::Satisfiable => {
                        self.save_result(&trail, &mut result);
                        found_a_mapping = true;
                        break;
                    }
                    SearchResult::SatisfiableButKeepGoing
                    | SearchResult::Unsatisfiable
                    | SearchResult::UnsatisfiableAndBackjumpUsingLackey => break,
                    SearchResult::Aborted => {
                        result.aborted = true;
                        break;
                    }
                    SearchResult::Restart => {
                        restarts_schedule.did_a_restart();
                        debug!(
                            "restarting the search with {} recorded nogoods",
                            self.watches.len()
                        );
                    }
                }
            }
        }

        result.satisfiable = found_a_mapping || statistics.solution_count > 0;
        result.solution_count = statistics.solution_count;
        result.nodes = statistics.nodes;
        result.propagations = statistics.propagations;
        result
    }

    /// One node of the restarting search. The trail and the statistics are
    /// threaded through the recursion; the domains belong to this frame and
    /// children receive fresh copies.
    fn restarting_search(
        &mut self,
        trail: &mut AssignmentsTrail,
        domains: &Domains,
        statistics: &mut SearchStatistics,
        depth: usize,
        restarts_schedule: &mut dyn RestartsSchedule,
        termination: &mut dyn TerminationCondition,
    ) -> SearchResult {
        if termination.should_stop() {
            return SearchResult::Aborted;
        }

        statistics.nodes += 1;
        termination.node_has_been_visited();

        // Find a domain to branch on, or deal with a complete mapping.
        let Some(branch_domain) = find_branch_domain(self.model, domains) else {
            return self.handle_complete_mapping(trail, statistics);
        };
        let branch_vertex = branch_domain.vertex;
        let mut candidates: Vec<usize> = branch_domain.values.iter().collect();

        order_values(
            self.model,
            self.options.value_ordering,
            &mut self.random,
            &mut candidates,
        );

        let choice_count = candidates.len() as i32;
        let mut discrepancy_count: i32 = 0;
        let mut actually_hit_a_failure = false;
        let mut use_lackey_for_propagation = false;

        for (num_tried, &candidate) in candidates.iter().enumerate() {
            let model = self.model;
            if let Some(proof) = self.proof.as_deref_mut() {
                proof.guessing(
                    depth,
                    model.pattern_vertex_for_proof(branch_vertex),
                    model.target_vertex_for_proof(candidate),
                );
            }

            // The trail is restored by shrinking back to this mark.
            let trail_mark = trail.len();
            trail.push_decision(
                Assignment::new(branch_vertex, candidate),
                discrepancy_count,
                choice_count,
            );

            let mut child_domains = copy_nonfixed_and_assign(domains, branch_vertex, candidate);

            statistics.propagations += 1;
            let propagate_with_lackey = use_lackey_for_propagation
                || self.options.propagate_using_lackey == PropagateUsingLackey::Always;
            if !self.propagate(&mut child_domains, trail, propagate_with_lackey) {
                if let Some(proof) = self.proof.as_deref_mut() {
                    proof.propagation_failure(
                        &trail.decisions(),
                        model.pattern_vertex_for_proof(branch_vertex),
                        model.target_vertex_for_proof(candidate),
                    );
                }

                trail.truncate(trail_mark);
                actually_hit_a_failure = true;
                continue;
            }

            if let Some(proof) = self.proof.as_deref_mut() {
                proof.start_level(depth + 2);
            }

            let search_result = self.restarting_search(
                trail,
                &child_domains,
                statistics,
                depth + 1,
                restarts_schedule,
                termination,
            );

            match search_result {
                SearchResult::Satisfiable => return SearchResult::Satisfiable,

                SearchResult::Aborted => return SearchResult::Aborted,

                SearchResult::Restart => {
                    // Restore the trail first; the nogoods for the siblings
                    // already tried at this node are then posted over it, one
                    // synthetic decision at a time.
                    trail.truncate(trail_mark);

                    for &earlier in &candidates[..num_tried] {
                        trail.push_synthetic_decision(Assignment::new(branch_vertex, earlier));
                        self.post_nogood(trail);
                        trail.pop();
                    }

                    return SearchResult::Restart;
                }

                SearchResult::SatisfiableButKeepGoing => {
                    if let Some(proof) = self.proof.as_deref_mut() {
                        proof.back_up_to_level(depth + 1);
                        proof.incorrect_guess(&trail.decisions(), false);
                        proof.forget_level(depth + 2);
                    }

                    trail.truncate(trail_mark);
                }

                result @ (SearchResult::Unsatisfiable
                | SearchResult::UnsatisfiableAndBackjumpUsingLackey) => {
                    if result == SearchResult::UnsatisfiableAndBackjumpUsingLackey {
                        // The remaining siblings propagate with the lackey.
                        use_lackey_for_propagation = true;
                    }

                    if let Some(proof) = self.proof.as_deref_mut() {
                        proof.back_up_to_level(depth + 1);
                        proof.incorrect_guess(&trail.decisions(), true);
                        proof.forget_level(depth + 2);
                    }

                    trail.truncate(trail_mark);
                    actually_hit_a_failure = true;
                }
            }

            discrepancy_count += 1;
        }

        // Out of candidates: back off, or kick off a restart.
        if let Some(proof) = self.proof.as_deref_mut() {
            proof.out_of_guesses(&trail.decisions());
        }

        if actually_hit_a_failure {
            restarts_schedule.did_a_backtrack();
        }

        if restarts_schedule.should_restart() {
            if let Some(proof) = self.proof.as_deref_mut() {
                proof.back_up_to_top();
            }
            self.post_nogood(trail);
            return SearchResult::Restart;
        }

        if use_lackey_for_propagation {
            SearchResult::UnsatisfiableAndBackjumpUsingLackey
        } else {
            SearchResult::Unsatisfiable
        }
    }

    /// Leaf handling: the trail holds an assignment for every pattern vertex.
    fn handle_complete_mapping(
        &mut self,
        trail: &AssignmentsTrail,
        statistics: &mut SearchStatistics,
    ) -> SearchResult {
        if self.options.bigraph {
            let mapping = trail.as_mapping();
            if !self.model.check_extra_bigraph_constraints(&mapping) {
                // Forbid the isomorphic variants of this mapping as well, so
                // the extra constraints are not re-checked on each of them.
                self.post_solution_nogood(trail);
                return SearchResult::Unsatisfiable;
            }
        }

        if let Some(lackey) = self.lackey.as_deref_mut() {
            let mapping = trail.as_mapping();
            if !lackey.check_solution(&mapping, false, self.options.count_solutions, None) {
                return if self.options.propagate_using_lackey
                    == PropagateUsingLackey::RootAndBackjump
                {
                    SearchResult::UnsatisfiableAndBackjumpUsingLackey
                } else {
                    SearchResult::Unsatisfiable
                };
            }
        }

        if self.proof.is_some() {
            let solution = self.solution_in_proof_form(trail);
            if let Some(proof) = self.proof.as_deref_mut() {
                proof.post_solution(&solution);
            }
        }

        if self.options.count_solutions {
            statistics.solution_count += 1;
            trace!("found mapping number {}", statistics.solution_count);

            if self.options.bigraph {
                self.post_solution_nogood(trail);
            }

            if let Some(callback) = self.enumerate_callback.as_deref_mut() {
                let mapping = trail.as_mapping();
                callback(&mapping);
            }

            SearchResult::SatisfiableButKeepGoing
        } else {
            SearchResult::Satisfiable
        }
    }

    /// Records the decisions on the trail as a nogood.
    fn post_nogood(&mut self, trail: &AssignmentsTrail) {
        if !self.watches.is_enabled() {
            return;
        }

        let literals: Vec<Assignment> = trail
            .iter()
            .filter(|record| record.is_decision)
            .map(|record| record.assignment)
            .collect();
        trace!("posting a nogood over {} decisions", literals.len());
        self.watches.post(Nogood { literals });

        if let Some(proof) = self.proof.as_deref_mut() {
            proof.post_restart_nogood(&trail.decisions());
        }
    }

    /// Records the non-anchor decisions of an accepted (or bigraph-rejected)
    /// complete mapping as a nogood, so that variants differing only in their
    /// anchor vertices are suppressed.
    fn post_solution_nogood(&mut self, trail: &AssignmentsTrail) {
        if !self.watches.is_enabled() {
            return;
        }

        let anchors_from = self.model.pattern_size() - self.model.pattern_link_count();
        let literals: Vec<Assignment> = trail
            .iter()
            .filter(|record| {
                record.is_decision && record.assignment.pattern_vertex < anchors_from
            })
            .map(|record| record.assignment)
            .collect();
        self.watches.post(Nogood { literals });
    }

    /// Applies any single-literal nogoods learned since the last restart to
    /// the root domains, re-propagating when something changed. Returns false
    /// on wipeout.
    fn apply_pending_singleton_nogoods(
        &mut self,
        domains: &mut Domains,
        trail: &mut AssignmentsTrail,
        statistics: &mut SearchStatistics,
    ) -> bool {
        if !self.watches.is_enabled() {
            return true;
        }

        let singletons = self.watches.drain_singletons();
        if singletons.is_empty() {
            return true;
        }

        for forbidden in singletons {
            let Some(domain) = domains
                .iter_mut()
                .find(|domain| domain.vertex == forbidden.pattern_vertex)
            else {
                continue;
            };

            if domain.fixed {
                if domain.values.contains(forbidden.target_vertex) {
                    return false;
                }
            } else if domain.values.contains(forbidden.target_vertex) {
                domain.values.clear(forbidden.target_vertex);
                domain.count -= 1;
                if domain.count == 0 {
                    return false;
                }
            }
        }

        statistics.propagations += 1;
        self.propagate(domains, trail, false)
    }

    /// Projects the trail into named-vertex form for the proof log, with each
    /// pattern vertex reported once.
    fn solution_in_proof_form(&self, trail: &AssignmentsTrail) -> Vec<(NamedVertex, NamedVertex)> {
        trail
            .iter()
            .unique_by(|record| record.assignment.pattern_vertex)
            .map(|record| {
                (
                    self.model
                        .pattern_vertex_for_proof(record.assignment.pattern_vertex),
                    self.model
                        .target_vertex_for_proof(record.assignment.target_vertex),
                )
            })
            .collect()
    }

    /// Records the mapping on the trail into the result, together with the
    /// discrepancy trace of how it was reached.
    fn save_result(&self, trail: &AssignmentsTrail, result: &mut HomomorphismResult) {
        result.mapping = trail.as_mapping();

        let mut where_line = String::from("where =");
        for record in trail.iter() {
            where_line.push_str(&format!(
                " {}/{}",
                record.discrepancy, record.choice_count
            ));
        }
        result.extra_stats.push(where_line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::restarts::NoRestartsSchedule;
    use crate::engine::termination::Indefinite;
    use crate::engine::termination::NodeBudget;
    use crate::model::ModelBuilder;

    fn triangle_into_clique(clique_size: usize) -> Model {
        let mut builder = ModelBuilder::new(3, clique_size)
            .add_pattern_edge(0, 1)
            .add_pattern_edge(0, 2)
            .add_pattern_edge(1, 2);
        for u in 0..clique_size {
            for v in (u + 1)..clique_size {
                builder = builder.add_target_edge(u, v);
            }
        }
        builder.build().expect("valid model")
    }

    #[test]
    fn a_satisfiable_instance_reports_a_full_mapping() {
        let model = triangle_into_clique(4);
        let mut searcher = Searcher::new(&model, SolverOptions::default());
        let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);

        assert!(result.satisfiable);
        assert_eq!(result.mapping.len(), 3);
        assert!(!result.aborted);
        assert!(result.nodes > 0);
        assert_eq!(result.extra_stats.len(), 1);
        assert!(result.extra_stats[0].starts_with("where ="));
    }

    #[test]
    fn the_mapping_respects_adjacency_and_injectivity() {
        let model = triangle_into_clique(5);
        let mut searcher = Searcher::new(&model, SolverOptions::default());
        let result = searcher.solve(&mut Indefinite, &mut NoRestartsSchedule);

        let mapping = &result.mapping;
        for u in 0..3 {
            for v in (u + 1)..3 {
                assert_ne!(mapping[&u], mapping[&v]);
            }
        }
    }

    #[test]
    fn an_exhausted_node_budget_reports_aborted() {
        let model = triangle_into_clique(4);
        let mut searcher = Searcher::new(&model, SolverOptions::default());
        let mut termination = NodeBudget::new(0);
        let result = searcher.solve(&mut termination, &mut NoRestartsSchedule);

        assert!(result.aborted);
        assert!(!result.satisfiable);
    }

    #[test]
    fn reseeding_gives_a_reproducible_random_search() {
        let model = triangle_into_clique(5);
        let options = SolverOptions {
            value_ordering: crate::options::ValueOrdering::Random,
            ..Default::default()
        };

        let mut first = Searcher::new(&model, options);
        first.set_seed(7);
        let first_result = first.solve(&mut Indefinite, &mut NoRestartsSchedule);

        let mut second = Searcher::new(&model, options);
        second.set_seed(7);
        let second_result = second.solve(&mut Indefinite, &mut NoRestartsSchedule);

        assert_eq!(first_result.mapping, second_result.mapping);
        assert_eq!(first_result.nodes, second_result.nodes);
    }
}
