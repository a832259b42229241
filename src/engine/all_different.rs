use crate::containers::BitSet;
use crate::engine::domains::Domains;

/// A cheap, sound-but-incomplete all-different pass over the domains, used
/// when the mapping must be globally injective.
///
/// Domains are visited smallest first while a running union of their values
/// is maintained. If at any point the union holds fewer values than the
/// number of domains seen, a matching is impossible by the pigeonhole
/// principle. If it holds exactly as many, those domains form a Hall set:
/// their values are spoken for, and are removed from every later domain.
///
/// Returns false on wipeout. Reorders the domains (by size, then by vertex);
/// the order of the domains never affects which values survive a full
/// propagation run.
pub(crate) fn cheap_all_different(target_size: usize, domains: &mut Domains) -> bool {
    domains.sort_by(|a, b| a.count.cmp(&b.count).then(a.vertex.cmp(&b.vertex)));

    let mut values_so_far = BitSet::new(target_size);
    let mut domains_so_far = 0;
    let mut hall = BitSet::new(target_size);

    for domain in domains.iter_mut() {
        // All the values in this domain, except ones we know are spoken for
        // by a Hall set.
        domain.values.intersect_with_complement(&hall);
        domain.count = domain.values.count();
        if domain.count == 0 {
            return false;
        }

        values_so_far.union_with(&domain.values);
        domains_so_far += 1;

        let num_values_so_far = values_so_far.count();
        if num_values_so_far < domains_so_far {
            // More domains than values to go around.
            return false;
        } else if num_values_so_far == domains_so_far {
            // These domains use up exactly these values.
            hall.union_with(&values_so_far);
        }
    }

    true
}
