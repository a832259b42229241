//! Constraint propagation: the unit-domain fixpoint loop and the individual
//! filtering rules it applies.

use log::trace;

use crate::basic_types::Assignment;
use crate::basic_types::AssignmentsTrail;
use crate::engine::all_different::cheap_all_different;
use crate::engine::domains::find_unit_domain;
use crate::engine::domains::Domain;
use crate::engine::domains::Domains;
use crate::engine::Searcher;
use crate::model::Model;
use crate::options::Injectivity;
use crate::options::SolverOptions;

impl Searcher<'_> {
    /// Runs propagation to fixpoint over the given domains, appending every
    /// forced assignment to the trail. Returns false as soon as a domain is
    /// wiped out or a collaborator rejects the partial mapping; the domains
    /// are then in an unspecified (but owned, droppable) state.
    ///
    /// Each round takes some non-fixed unit domain, commits its assignment,
    /// and then filters every remaining domain through the watched nogoods,
    /// the injectivity rule, the adjacency rules over all graph pairs, the
    /// ordering constraints, and (under global injectivity) the cheap
    /// all-different pass. After the fixpoint the lackey is consulted when
    /// configured to see partial mappings.
    pub(crate) fn propagate(
        &mut self,
        domains: &mut Domains,
        trail: &mut AssignmentsTrail,
        with_lackey_deletions: bool,
    ) -> bool {
        while let Some(unit_index) = find_unit_domain(domains) {
            let current_assignment = {
                let domain = &mut domains[unit_index];
                let target = domain
                    .values
                    .first()
                    .expect("a unit domain has a candidate");
                domain.fixed = true;
                Assignment::new(domain.vertex, target)
            };
            trail.push_propagation(current_assignment);

            if let Some(proof) = self.proof.as_deref_mut() {
                proof.unit_propagating(
                    self.model
                        .pattern_vertex_for_proof(current_assignment.pattern_vertex),
                    self.model
                        .target_vertex_for_proof(current_assignment.target_vertex),
                );
            }

            if self.watches.is_enabled() {
                self.watches.propagate(
                    current_assignment,
                    |assignment| !trail.contains(assignment),
                    |assignment| {
                        for domain in domains.iter_mut() {
                            if domain.fixed {
                                continue;
                            }
                            if domain.vertex == assignment.pattern_vertex {
                                domain.values.clear(assignment.target_vertex);
                                break;
                            }
                        }
                    },
                );
            }

            if !propagate_simple_constraints(self.model, &self.options, domains, current_assignment)
            {
                return false;
            }

            if self.options.bigraph
                && !propagate_hyperedge_constraints(domains, current_assignment)
            {
                return false;
            }

            if self.model.has_less_thans() && !propagate_less_thans(self.model, domains) {
                return false;
            }

            if self.options.injectivity == Injectivity::Injective
                && !cheap_all_different(self.model.target_size(), domains)
            {
                return false;
            }
        }

        if self.lackey.is_some() && (with_lackey_deletions || self.options.sends_partials()) {
            let mapping = trail.as_mapping();
            let mut wipeout = false;
            let mut num_deletions = 0u64;
            let mut deletion = |pattern_vertex: usize, target_vertex: usize| -> bool {
                if wipeout {
                    return false;
                }
                for domain in domains.iter_mut() {
                    if domain.vertex == pattern_vertex {
                        if domain.values.contains(target_vertex) {
                            num_deletions += 1;
                            domain.values.clear(target_vertex);
                            domain.count -= 1;
                            if domain.count == 0 {
                                wipeout = true;
                            }
                            return true;
                        }
                        break;
                    }
                }
                false
            };

            let verdict = match self.lackey.as_deref_mut() {
                Some(lackey) => lackey.check_solution(
                    &mapping,
                    true,
                    false,
                    if with_lackey_deletions {
                        Some(&mut deletion)
                    } else {
                        None
                    },
                ),
                None => true,
            };

            if num_deletions > 0 {
                trace!("lackey removed {num_deletions} candidate values");
            }
            if !verdict || wipeout {
                return false;
            }
        }

        true
    }
}

/// Injectivity and adjacency filtering of every non-fixed domain against the
/// just-made assignment. Recomputes each domain's cached count; false on
/// wipeout.
fn propagate_simple_constraints(
    model: &Model,
    options: &SolverOptions,
    domains: &mut Domains,
    current_assignment: Assignment,
) -> bool {
    for domain in domains.iter_mut() {
        if domain.fixed {
            continue;
        }

        match options.injectivity {
            Injectivity::Injective => domain.values.clear(current_assignment.target_vertex),
            Injectivity::LocallyInjective => {
                if share_a_pattern_neighbour(
                    model,
                    current_assignment.pattern_vertex,
                    domain.vertex,
                ) {
                    domain.values.clear(current_assignment.target_vertex);
                }
            }
            Injectivity::NonInjective => {}
        }

        propagate_adjacency_constraints(model, options, domain, current_assignment);

        domain.count = domain.values.count();
        if domain.count == 0 {
            return false;
        }
    }

    true
}

fn share_a_pattern_neighbour(model: &Model, v: usize, w: usize) -> bool {
    model
        .pattern_graph_row(0, v)
        .intersects(model.pattern_graph_row(0, w))
}

/// Filters one domain against the assignment through every graph pair. For
/// graph 0 an edge restricts the domain to the corresponding target row, a
/// non-edge restricts it to the row's complement under induced mode, and on
/// directed models both edge directions are applied separately. Supplemental
/// graphs only ever constrain in the positive direction. On edge-labelled
/// models the surviving candidates must also carry the pattern edge's label
/// in each present direction.
fn propagate_adjacency_constraints(
    model: &Model,
    options: &SolverOptions,
    domain: &mut Domain,
    current_assignment: Assignment,
) {
    let graphs_to_consider =
        model.pattern_adjacency_bits(current_assignment.pattern_vertex, domain.vertex);

    if !model.directed() {
        if graphs_to_consider & 1 != 0 {
            domain
                .values
                .intersect_with(model.target_graph_row(0, current_assignment.target_vertex));
        } else if options.induced {
            domain.values.intersect_with_complement(
                model.target_graph_row(0, current_assignment.target_vertex),
            );
        }
    } else {
        if graphs_to_consider & 1 != 0 {
            domain.values.intersect_with(
                model.forward_target_graph_row(current_assignment.target_vertex),
            );
        } else if options.induced {
            domain.values.intersect_with_complement(
                model.forward_target_graph_row(current_assignment.target_vertex),
            );
        }

        let reverse_graphs_to_consider =
            model.pattern_adjacency_bits(domain.vertex, current_assignment.pattern_vertex);
        if reverse_graphs_to_consider & 1 != 0 {
            domain.values.intersect_with(
                model.reverse_target_graph_row(current_assignment.target_vertex),
            );
        } else if options.induced {
            domain.values.intersect_with_complement(
                model.reverse_target_graph_row(current_assignment.target_vertex),
            );
        }
    }

    for graph in 1..model.max_graphs() {
        if graphs_to_consider & (1 << graph) != 0 {
            domain.values.intersect_with(
                model.target_graph_row(graph, current_assignment.target_vertex),
            );
        }
    }

    if model.has_edge_labels() {
        if graphs_to_consider & 1 != 0 {
            let wanted =
                model.pattern_edge_label(current_assignment.pattern_vertex, domain.vertex);
            let candidates = domain.values.clone();
            for candidate in candidates.iter() {
                if model.target_edge_label(current_assignment.target_vertex, candidate) != wanted {
                    domain.values.clear(candidate);
                }
            }
        }

        let reverse_graphs_to_consider =
            model.pattern_adjacency_bits(domain.vertex, current_assignment.pattern_vertex);
        if reverse_graphs_to_consider & 1 != 0 {
            let wanted =
                model.pattern_edge_label(domain.vertex, current_assignment.pattern_vertex);
            let candidates = domain.values.clone();
            for candidate in candidates.iter() {
                if model.target_edge_label(candidate, current_assignment.target_vertex) != wanted {
                    domain.values.clear(candidate);
                }
            }
        }
    }
}

/// Bounds propagation of the ordered-vertex constraints: a forward sweep
/// forcing each `b` strictly above the smallest candidate of its `a`, then a
/// backward sweep forcing each `a` strictly below the largest candidate of
/// its `b`. Pairs whose vertices are no longer present are skipped; false on
/// wipeout or when no room is left.
fn propagate_less_thans(model: &Model, domains: &mut Domains) -> bool {
    let mut domain_index = vec![usize::MAX; model.pattern_size()];
    for (index, domain) in domains.iter().enumerate() {
        domain_index[domain.vertex] = index;
    }

    for &(a, b) in model.pattern_less_thans() {
        if domain_index[a] == usize::MAX || domain_index[b] == usize::MAX {
            continue;
        }

        let Some(first_a) = domains[domain_index[a]].values.first() else {
            return false;
        };
        let first_allowed_b = first_a + 1;
        if first_allowed_b >= model.target_size() {
            return false;
        }

        let b_domain = &mut domains[domain_index[b]];
        while let Some(value) = b_domain.values.first() {
            if value >= first_allowed_b {
                break;
            }
            b_domain.values.clear(value);
        }

        b_domain.count = b_domain.values.count();
        if b_domain.count == 0 {
            return false;
        }
    }

    for &(a, b) in model.pattern_less_thans() {
        if domain_index[a] == usize::MAX || domain_index[b] == usize::MAX {
            continue;
        }

        let Some(last_b) = domains[domain_index[b]].values.last() else {
            return false;
        };
        if last_b == 0 {
            return false;
        }
        let last_allowed_a = last_b - 1;

        let a_domain = &mut domains[domain_index[a]];
        let candidates = a_domain.values.clone();
        for value in candidates.iter() {
            if value > last_allowed_a {
                a_domain.values.clear(value);
            }
        }

        a_domain.count = a_domain.values.count();
        if a_domain.count == 0 {
            return false;
        }
    }

    true
}

/// Hook for the external hyperedge checker used by the bigraph extension; the
/// plain solver has no hyperedge constraints to enforce.
fn propagate_hyperedge_constraints(_domains: &mut Domains, _current_assignment: Assignment) -> bool {
    true
}
