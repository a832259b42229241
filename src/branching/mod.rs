//! Branch-domain selection and value ordering.

use std::cmp::Reverse;

use crate::basic_types::Random;
use crate::engine::domains::Domain;
use crate::engine::domains::Domains;
use crate::model::Model;
use crate::options::ValueOrdering;

/// Selects the domain to branch on: the non-fixed domain with the fewest
/// candidates, ties broken by the larger pattern degree, then by first
/// occurrence. Returns `None` when every domain is fixed, i.e. when the trail
/// holds a complete mapping.
pub(crate) fn find_branch_domain<'a>(model: &Model, domains: &'a Domains) -> Option<&'a Domain> {
    let mut result: Option<&Domain> = None;
    for domain in domains {
        if domain.fixed {
            continue;
        }

        let better = match result {
            None => true,
            Some(best) => {
                domain.count < best.count
                    || (domain.count == best.count
                        && model.pattern_degree(domain.vertex) > model.pattern_degree(best.vertex))
            }
        };
        if better {
            result = Some(domain);
        }
    }
    result
}

/// Reorders the branch candidates in place according to the configured value
/// ordering heuristic.
pub(crate) fn order_values(
    model: &Model,
    ordering: ValueOrdering,
    random: &mut dyn Random,
    candidates: &mut [usize],
) {
    match ordering {
        ValueOrdering::Degree => degree_sort(model, candidates, false),
        ValueOrdering::AntiDegree => degree_sort(model, candidates, true),
        ValueOrdering::Biased => softmax_shuffle(model, random, candidates),
        ValueOrdering::Random => uniform_shuffle(random, candidates),
    }
}

fn degree_sort(model: &Model, candidates: &mut [usize], reverse: bool) {
    if reverse {
        candidates.sort_by_key(|&vertex| model.target_degree(vertex));
    } else {
        candidates.sort_by_key(|&vertex| Reverse(model.target_degree(vertex)));
    }
}

/// Repeatedly draws a candidate with probability proportional to two to the
/// power of its target degree and moves it to the front, so higher-degree
/// vertices tend to be tried earlier without being tried first every time.
///
/// The weights are integer powers of two. Exponents are shifted down relative
/// to the largest target degree, keeping 18 bits of headroom so the running
/// total fits in a signed 64-bit value; a shift below zero clamps to zero.
/// Rescaling all weights uniformly leaves the distribution unchanged.
fn softmax_shuffle(model: &Model, random: &mut dyn Random, candidates: &mut [usize]) {
    let largest_target_degree = model.largest_target_degree();
    let weight = |degree: usize| -> i64 {
        const SPACE_FOR_ADDING_UP: i64 = (i64::BITS as i64 - 1) - 18;
        let shift = (degree as i64 - largest_target_degree as i64 + SPACE_FOR_ADDING_UP).max(0);
        1i64 << shift
    };

    let mut total: i64 = candidates
        .iter()
        .map(|&vertex| weight(model.target_degree(vertex)))
        .sum();

    for start in 0..candidates.len() {
        let mut select_score = random.generate_u64_in_range(1..=total as u64) as i64;

        // Walk the remaining candidates until the score is used up.
        let mut select_element = start;
        while select_element + 1 < candidates.len() {
            select_score -= weight(model.target_degree(candidates[select_element]));
            if select_score <= 0 {
                break;
            }
            select_element += 1;
        }

        total -= weight(model.target_degree(candidates[select_element]));
        candidates.swap(select_element, start);
    }
}

fn uniform_shuffle(random: &mut dyn Random, candidates: &mut [usize]) {
    for i in (1..candidates.len()).rev() {
        let j = random.generate_usize_in_range(0..i + 1);
        candidates.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::TestRandom;
    use crate::containers::BitSet;
    use crate::model::ModelBuilder;

    fn domain_over(vertex: usize, num_bits: usize, values: &[usize]) -> Domain {
        let mut set = BitSet::new(num_bits);
        for &value in values {
            set.set(value);
        }
        Domain::new(vertex, set)
    }

    /// A path 0 - 1 - 2 as the pattern; target degrees 3, 1, 1, 1 on a star
    /// centred at 0.
    fn star_model() -> crate::model::Model {
        ModelBuilder::new(3, 4)
            .add_pattern_edge(0, 1)
            .add_pattern_edge(1, 2)
            .add_target_edge(0, 1)
            .add_target_edge(0, 2)
            .add_target_edge(0, 3)
            .build()
            .expect("valid model")
    }

    #[test]
    fn smallest_domain_is_selected() {
        let model = star_model();
        let domains = vec![
            domain_over(0, 4, &[0, 1, 2]),
            domain_over(1, 4, &[0, 1]),
            domain_over(2, 4, &[0, 1, 2, 3]),
        ];

        let selected = find_branch_domain(&model, &domains).expect("a non-fixed domain exists");
        assert_eq!(selected.vertex, 1);
    }

    #[test]
    fn count_ties_are_broken_by_pattern_degree() {
        let model = star_model();
        // Vertex 1 has pattern degree 2; vertices 0 and 2 have degree 1.
        let domains = vec![
            domain_over(0, 4, &[0, 1]),
            domain_over(1, 4, &[2, 3]),
            domain_over(2, 4, &[0, 3]),
        ];

        let selected = find_branch_domain(&model, &domains).expect("a non-fixed domain exists");
        assert_eq!(selected.vertex, 1);
    }

    #[test]
    fn all_fixed_domains_mean_no_branching() {
        let model = star_model();
        let mut domains = vec![domain_over(0, 4, &[0]), domain_over(1, 4, &[1])];
        for domain in domains.iter_mut() {
            domain.fixed = true;
        }

        assert!(find_branch_domain(&model, &domains).is_none());
    }

    #[test]
    fn degree_sort_puts_high_degree_targets_first() {
        let model = star_model();
        let mut candidates = vec![1, 0, 2, 3];
        let mut random = TestRandom::default();
        order_values(&model, ValueOrdering::Degree, &mut random, &mut candidates);

        assert_eq!(candidates[0], 0);
    }

    #[test]
    fn anti_degree_sort_puts_high_degree_targets_last() {
        let model = star_model();
        let mut candidates = vec![1, 0, 2, 3];
        let mut random = TestRandom::default();
        order_values(
            &model,
            ValueOrdering::AntiDegree,
            &mut random,
            &mut candidates,
        );

        assert_eq!(candidates[3], 0);
    }

    #[test]
    fn degree_sort_is_stable_between_equal_degrees() {
        let model = star_model();
        let mut candidates = vec![3, 1, 2];
        let mut random = TestRandom::default();
        order_values(&model, ValueOrdering::Degree, &mut random, &mut candidates);

        // All three have degree one and keep their relative order.
        assert_eq!(candidates, vec![3, 1, 2]);
    }

    #[test]
    fn uniform_shuffle_follows_the_scripted_draws() {
        let model = star_model();
        let mut candidates = vec![0, 1, 2];
        // Fisher-Yates from the back: swap index 2 with 0, then index 1 with
        // itself.
        let mut random = TestRandom {
            usizes: vec![0, 1],
            ..Default::default()
        };
        order_values(&model, ValueOrdering::Random, &mut random, &mut candidates);

        assert_eq!(candidates, vec![2, 1, 0]);
    }

    #[test]
    fn biased_shuffle_with_minimal_scores_walks_the_list() {
        let model = star_model();
        let mut candidates = vec![1, 2];
        // Degrees are equal, so each draw of 1 selects the first remaining
        // element and the order is preserved.
        let mut random = TestRandom {
            u64s: vec![1, 1],
            ..Default::default()
        };
        order_values(&model, ValueOrdering::Biased, &mut random, &mut candidates);

        assert_eq!(candidates, vec![1, 2]);
    }

    #[test]
    fn biased_shuffle_selects_a_later_element_on_a_large_draw() {
        let model = star_model();
        let mut candidates = vec![1, 2];
        // The first draw exhausts the first element's weight, selecting the
        // second.
        let weight_of_degree_one = 1u64 << (63 - 18 - 2);
        let mut random = TestRandom {
            u64s: vec![weight_of_degree_one + 1, 1],
            ..Default::default()
        };
        order_values(&model, ValueOrdering::Biased, &mut random, &mut candidates);

        assert_eq!(candidates, vec![2, 1]);
    }
}
