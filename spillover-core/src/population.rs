//! Synthetic population graphs: complete clusters joined by bridge edges.
//!
//! A population models an experiment's ground truth. Each cluster is a
//! complete graph standing in for one treatment/control-like group, and a
//! small number of random bridge edges between adjacent clusters model
//! imperfect isolation between groups.

use std::ops::Range;

use petgraph::graph::{NodeIndex, UnGraph};
use rand::{rngs::SmallRng, seq::index};

use crate::error::PopulationError;

/// The ground-truth network for one simulation combination.
///
/// Node identities are contiguous: cluster `i` of a population with
/// `cluster_size == n` occupies identities `[i * n, (i + 1) * n)`, so
/// identities never collide across clusters. The graph is built once per
/// `(n, s, c)` parameter combination and is read-only afterward.
///
/// # Examples
/// ```
/// use rand::{SeedableRng, rngs::SmallRng};
/// use spillover_core::PopulationGraph;
///
/// let mut rng = SmallRng::seed_from_u64(7);
/// let population = PopulationGraph::build(10, 2, 3, &mut rng)
///     .expect("parameters are valid");
/// assert_eq!(population.node_count(), 20);
/// // s * n*(n-1)/2 intra-cluster edges plus (s-1) * c bridges.
/// assert_eq!(population.edge_count(), 2 * 45 + 3);
/// ```
#[derive(Debug, Clone)]
pub struct PopulationGraph {
    graph: UnGraph<(), ()>,
    cluster_size: usize,
    cluster_count: usize,
    bridge_count: usize,
}

impl PopulationGraph {
    /// Builds `cluster_count` complete clusters of `cluster_size` nodes,
    /// joined chain-wise by exactly `bridge_count` bridge edges per adjacent
    /// cluster pair.
    ///
    /// Bridge endpoints are drawn uniformly without replacement from each
    /// side of the pair and connected index-aligned: the i-th drawn endpoint
    /// on one side connects to the i-th drawn endpoint on the other. This
    /// yields exactly `bridge_count` bridges per pair, not a cross product.
    ///
    /// # Errors
    /// Returns [`PopulationError::NoClusters`] when `cluster_count` is zero,
    /// [`PopulationError::EmptyCluster`] when `cluster_size` is zero,
    /// [`PopulationError::NoBridges`] when `bridge_count` is zero, and
    /// [`PopulationError::TooManyBridges`] when `bridge_count` exceeds
    /// `cluster_size` (endpoints are drawn without replacement).
    pub fn build(
        cluster_size: usize,
        cluster_count: usize,
        bridge_count: usize,
        rng: &mut SmallRng,
    ) -> Result<Self, PopulationError> {
        if cluster_count < 1 {
            return Err(PopulationError::NoClusters { got: cluster_count });
        }
        if cluster_size == 0 {
            return Err(PopulationError::EmptyCluster);
        }
        if bridge_count == 0 {
            return Err(PopulationError::NoBridges);
        }
        if bridge_count > cluster_size {
            return Err(PopulationError::TooManyBridges {
                bridges: bridge_count,
                cluster_size,
            });
        }

        let nodes = cluster_count * cluster_size;
        let intra_edges = cluster_count * cluster_size * (cluster_size - 1) / 2;
        let bridges = (cluster_count - 1) * bridge_count;
        let mut graph = UnGraph::with_capacity(nodes, intra_edges + bridges);

        for _ in 0..nodes {
            graph.add_node(());
        }
        for cluster in 0..cluster_count {
            let base = cluster * cluster_size;
            for left in 0..cluster_size {
                for right in (left + 1)..cluster_size {
                    graph.add_edge(
                        NodeIndex::new(base + left),
                        NodeIndex::new(base + right),
                        (),
                    );
                }
            }
        }
        for cluster in 1..cluster_count {
            let from_base = (cluster - 1) * cluster_size;
            let to_base = cluster * cluster_size;
            let from = index::sample(rng, cluster_size, bridge_count);
            let to = index::sample(rng, cluster_size, bridge_count);
            for (source, target) in from.into_iter().zip(to) {
                graph.add_edge(
                    NodeIndex::new(from_base + source),
                    NodeIndex::new(to_base + target),
                    (),
                );
            }
        }

        Ok(Self {
            graph,
            cluster_size,
            cluster_count,
            bridge_count,
        })
    }

    /// Returns the total number of nodes, `cluster_count * cluster_size`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the total number of edges, intra-cluster plus bridges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns the number of nodes per cluster.
    #[must_use]
    pub fn cluster_size(&self) -> usize {
        self.cluster_size
    }

    /// Returns the number of clusters.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    /// Returns the number of bridge edges per adjacent cluster pair.
    #[must_use]
    pub fn bridge_count(&self) -> usize {
        self.bridge_count
    }

    /// Tests whether two node identities are directly connected.
    #[must_use]
    pub fn contains_edge(&self, left: usize, right: usize) -> bool {
        self.graph
            .contains_edge(NodeIndex::new(left), NodeIndex::new(right))
    }

    /// Iterates over the neighbours of a node identity.
    pub fn neighbours(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.graph.neighbors(NodeIndex::new(node)).map(NodeIndex::index)
    }

    /// Splits the identity range at its midpoint into lower and upper halves.
    ///
    /// Samplers treat the two halves as the combined index spaces of the two
    /// groups. With two clusters the split coincides exactly with the
    /// cluster boundary.
    ///
    /// # Examples
    /// ```
    /// use rand::{SeedableRng, rngs::SmallRng};
    /// use spillover_core::PopulationGraph;
    ///
    /// let mut rng = SmallRng::seed_from_u64(7);
    /// let population = PopulationGraph::build(10, 2, 1, &mut rng)
    ///     .expect("parameters are valid");
    /// let (lower, upper) = population.halves();
    /// assert_eq!(lower, 0..10);
    /// assert_eq!(upper, 10..20);
    /// ```
    #[must_use]
    pub fn halves(&self) -> (Range<usize>, Range<usize>) {
        let midpoint = self.node_count() / 2;
        (0..midpoint, midpoint..self.node_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rstest::rstest;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(0x5EED)
    }

    #[rstest]
    #[case::two_clusters(10, 2, 1)]
    #[case::many_bridges(10, 2, 10)]
    #[case::three_clusters(20, 3, 5)]
    #[case::single_cluster(10, 1, 1)]
    fn node_and_edge_counts_match_the_formula(
        #[case] cluster_size: usize,
        #[case] cluster_count: usize,
        #[case] bridge_count: usize,
    ) {
        let population =
            PopulationGraph::build(cluster_size, cluster_count, bridge_count, &mut rng())
                .expect("parameters are valid");

        assert_eq!(population.node_count(), cluster_size * cluster_count);
        let intra = cluster_count * cluster_size * (cluster_size - 1) / 2;
        let bridges = (cluster_count - 1) * bridge_count;
        assert_eq!(population.edge_count(), intra + bridges);
    }

    #[test]
    fn clusters_are_complete_on_contiguous_ranges() {
        let population =
            PopulationGraph::build(5, 2, 1, &mut rng()).expect("parameters are valid");

        for base in [0, 5] {
            for left in base..base + 5 {
                for right in (left + 1)..base + 5 {
                    assert!(
                        population.contains_edge(left, right),
                        "cluster nodes {left} and {right} must be adjacent",
                    );
                }
            }
        }
    }

    #[test]
    fn bridges_connect_adjacent_clusters() {
        let population =
            PopulationGraph::build(10, 3, 4, &mut rng()).expect("parameters are valid");

        for pair in 0..2 {
            let from = pair * 10..(pair + 1) * 10;
            let to = (pair + 1) * 10..(pair + 2) * 10;
            let bridges = from
                .flat_map(|left| {
                    population
                        .neighbours(left)
                        .filter(|&right| to.contains(&right))
                        .collect::<Vec<_>>()
                })
                .count();
            assert_eq!(bridges, 4, "each adjacent pair carries exactly c bridges");
        }
    }

    #[test]
    fn rejects_more_bridges_than_cluster_nodes() {
        let err = PopulationGraph::build(10, 2, 11, &mut rng())
            .expect_err("c > n must be rejected");
        assert_eq!(
            err,
            PopulationError::TooManyBridges {
                bridges: 11,
                cluster_size: 10,
            },
        );
    }

    #[rstest]
    #[case::no_clusters(10, 0, 1, PopulationError::NoClusters { got: 0 })]
    #[case::empty_cluster(0, 2, 1, PopulationError::EmptyCluster)]
    #[case::no_bridges(10, 2, 0, PopulationError::NoBridges)]
    fn rejects_degenerate_parameters(
        #[case] cluster_size: usize,
        #[case] cluster_count: usize,
        #[case] bridge_count: usize,
        #[case] expected: PopulationError,
    ) {
        let err = PopulationGraph::build(cluster_size, cluster_count, bridge_count, &mut rng())
            .expect_err("degenerate parameters must be rejected");
        assert_eq!(err, expected);
    }

    #[test]
    fn identical_seeds_build_identical_bridges() {
        let first = PopulationGraph::build(10, 2, 3, &mut SmallRng::seed_from_u64(99))
            .expect("parameters are valid");
        let second = PopulationGraph::build(10, 2, 3, &mut SmallRng::seed_from_u64(99))
            .expect("parameters are valid");

        for node in 0..first.node_count() {
            let left: Vec<_> = first.neighbours(node).collect();
            let right: Vec<_> = second.neighbours(node).collect();
            assert_eq!(left, right, "adjacency of node {node} must match");
        }
    }
}
