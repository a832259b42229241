use crate::containers::BitSet;

/// The current candidate set of target vertices for one pattern vertex.
///
/// The cached `count` equals `values.count()` at every point where the
/// propagator is at rest; a `fixed` domain represents an assignment that has
/// already been committed to the trail and is skipped by propagation and
/// branching.
#[derive(Clone, Debug)]
pub(crate) struct Domain {
    pub(crate) vertex: usize,
    pub(crate) values: BitSet,
    pub(crate) count: usize,
    pub(crate) fixed: bool,
}

impl Domain {
    pub(crate) fn new(vertex: usize, values: BitSet) -> Domain {
        let count = values.count();
        Domain {
            vertex,
            values,
            count,
            fixed: false,
        }
    }
}

/// The domains of all pattern vertices that are still relevant on the current
/// search path. The order is irrelevant to correctness but kept deterministic
/// so that runs are reproducible.
pub(crate) type Domains = Vec<Domain>;

/// The index of some non-fixed domain with exactly one candidate left, if any.
pub(crate) fn find_unit_domain(domains: &Domains) -> Option<usize> {
    domains
        .iter()
        .position(|domain| !domain.fixed && domain.count == 1)
}

/// Builds the child domains for a branching step: fixed domains are dropped,
/// every other domain is copied, and the branch domain is narrowed to the
/// single chosen value.
pub(crate) fn copy_nonfixed_and_assign(
    domains: &Domains,
    branch_vertex: usize,
    target_vertex: usize,
) -> Domains {
    let mut new_domains = Vec::with_capacity(domains.len());
    for domain in domains {
        if domain.fixed {
            continue;
        }

        let mut copy = domain.clone();
        if copy.vertex == branch_vertex {
            copy.values.clear_all();
            copy.values.set(target_vertex);
            copy.count = 1;
        }
        new_domains.push(copy);
    }
    new_domains
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain_over(vertex: usize, num_bits: usize, values: &[usize]) -> Domain {
        let mut set = BitSet::new(num_bits);
        for &value in values {
            set.set(value);
        }
        Domain::new(vertex, set)
    }

    #[test]
    fn unit_domains_are_found_and_fixed_ones_are_skipped() {
        let mut domains = vec![
            domain_over(0, 4, &[1]),
            domain_over(1, 4, &[0, 2]),
            domain_over(2, 4, &[3]),
        ];
        domains[0].fixed = true;

        assert_eq!(find_unit_domain(&domains), Some(2));
    }

    #[test]
    fn branching_copies_drop_fixed_domains_and_narrow_the_branch() {
        let mut domains = vec![
            domain_over(0, 4, &[1]),
            domain_over(1, 4, &[0, 2, 3]),
            domain_over(2, 4, &[2, 3]),
        ];
        domains[0].fixed = true;

        let child = copy_nonfixed_and_assign(&domains, 1, 2);

        assert_eq!(child.len(), 2);
        assert_eq!(child[0].vertex, 1);
        assert_eq!(child[0].count, 1);
        assert_eq!(child[0].values.iter().collect::<Vec<_>>(), vec![2]);
        assert!(!child[0].fixed);
        assert_eq!(child[1].vertex, 2);
        assert_eq!(child[1].count, 2);
    }
}
