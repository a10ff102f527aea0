//! Static index of 1-dimensional intervals supporting overlap queries.
//!
//! Built once from a finalized interval set, immutable afterwards, so any
//! number of readers may query it concurrently. There are no insert or
//! remove operations; rebuild from scratch if the interval set changes.

/// A balanced, packed interval tree over `[min, max]` intervals.
///
/// Leaves are sorted by interval start; an implicit binary tree augmented
/// with subtree maxima prunes queries to O(log n + k).
pub struct IntervalIndex<T> {
    mins: Vec<f64>,
    maxs: Vec<f64>,
    items: Vec<T>,
    /// Max interval end within each implicit tree node (1-based heap layout).
    subtree_max: Vec<f64>,
}

impl<T> IntervalIndex<T> {
    /// Builds the index in O(n log n). Intervals with `min > max` are
    /// normalized. An empty input yields an index that returns no results
    /// for any query.
    pub fn build(intervals: Vec<(f64, f64, T)>) -> Self {
        let mut entries: Vec<(f64, f64, T)> = intervals
            .into_iter()
            .map(|(min, max, item)| {
                if min <= max {
                    (min, max, item)
                } else {
                    (max, min, item)
                }
            })
            .collect();

        // Deterministic leaf order regardless of input order.
        entries.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        });

        let n = entries.len();
        let mut mins = Vec::with_capacity(n);
        let mut maxs = Vec::with_capacity(n);
        let mut items = Vec::with_capacity(n);
        for (min, max, item) in entries {
            mins.push(min);
            maxs.push(max);
            items.push(item);
        }

        let mut index = Self {
            mins,
            maxs,
            items,
            subtree_max: vec![f64::NEG_INFINITY; 4 * n.max(1)],
        };
        if n > 0 {
            index.build_max(1, 0, n - 1);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn build_max(&mut self, node: usize, lo: usize, hi: usize) -> f64 {
        let max = if lo == hi {
            self.maxs[lo]
        } else {
            let mid = (lo + hi) / 2;
            let left = self.build_max(2 * node, lo, mid);
            let right = self.build_max(2 * node + 1, mid + 1, hi);
            left.max(right)
        };
        self.subtree_max[node] = max;
        max
    }

    /// Visits every stored item whose interval overlaps `[qmin, qmax]`.
    ///
    /// The visited set is complete and duplicate-free; visiting order is
    /// unspecified. A degenerate point query (`qmin == qmax`) is valid, and
    /// reversed bounds are normalized.
    pub fn query<F>(&self, qmin: f64, qmax: f64, mut visit: F)
    where
        F: FnMut(&T),
    {
        if self.items.is_empty() {
            return;
        }
        let (qmin, qmax) = if qmin <= qmax { (qmin, qmax) } else { (qmax, qmin) };
        self.query_node(1, 0, self.items.len() - 1, qmin, qmax, &mut visit);
    }

    fn query_node<F>(&self, node: usize, lo: usize, hi: usize, qmin: f64, qmax: f64, visit: &mut F)
    where
        F: FnMut(&T),
    {
        // Every interval end in this subtree lies left of the query.
        if self.subtree_max[node] < qmin {
            return;
        }
        // Leaves are sorted by start, so every start in this subtree lies
        // right of the query.
        if self.mins[lo] > qmax {
            return;
        }
        if lo == hi {
            if self.mins[lo] <= qmax && self.maxs[lo] >= qmin {
                visit(&self.items[lo]);
            }
            return;
        }
        let mid = (lo + hi) / 2;
        self.query_node(2 * node, lo, mid, qmin, qmax, visit);
        self.query_node(2 * node + 1, mid + 1, hi, qmin, qmax, visit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn collect(index: &IntervalIndex<usize>, qmin: f64, qmax: f64) -> Vec<usize> {
        let mut out = Vec::new();
        index.query(qmin, qmax, |&id| out.push(id));
        out.sort_unstable();
        out
    }

    #[test]
    fn test_empty_index() {
        let index: IntervalIndex<usize> = IntervalIndex::build(Vec::new());
        assert!(index.is_empty());
        assert!(collect(&index, f64::NEG_INFINITY, f64::INFINITY).is_empty());
    }

    #[test]
    fn test_basic_overlap() {
        let index = IntervalIndex::build(vec![
            (0.0, 1.0, 0),
            (2.0, 5.0, 1),
            (4.0, 4.5, 2),
            (10.0, 12.0, 3),
        ]);
        assert_eq!(collect(&index, 4.2, 4.3), vec![1, 2]);
        assert_eq!(collect(&index, -5.0, -1.0), Vec::<usize>::new());
        assert_eq!(collect(&index, 0.0, 20.0), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_point_query() {
        // Degenerate queries are used for "does any segment span this Y".
        let index = IntervalIndex::build(vec![(0.0, 10.0, 0), (5.0, 5.0, 1), (6.0, 8.0, 2)]);
        assert_eq!(collect(&index, 5.0, 5.0), vec![0, 1]);
        assert_eq!(collect(&index, 7.0, 7.0), vec![0, 2]);
    }

    #[test]
    fn test_reversed_bounds_normalized() {
        let index = IntervalIndex::build(vec![(3.0, 1.0, 0)]);
        assert_eq!(collect(&index, 2.5, 1.5), vec![0]);
    }

    #[test]
    fn test_random_against_reference() {
        let mut rng = StdRng::seed_from_u64(42);
        let intervals: Vec<(f64, f64, usize)> = (0..500)
            .map(|i| {
                let a = rng.gen_range(-100.0..100.0);
                let b = a + rng.gen_range(0.0..20.0);
                (a, b, i)
            })
            .collect();
        let index = IntervalIndex::build(intervals.clone());

        for _ in 0..200 {
            let qa = rng.gen_range(-120.0..120.0);
            let qb = qa + rng.gen_range(0.0..30.0);

            let mut expected: Vec<usize> = intervals
                .iter()
                .filter(|(min, max, _)| *min <= qb && *max >= qa)
                .map(|(_, _, i)| *i)
                .collect();
            expected.sort_unstable();

            assert_eq!(collect(&index, qa, qb), expected);
        }
    }
}
