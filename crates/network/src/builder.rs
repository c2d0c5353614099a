use crate::error::NetworkError;
use crate::graph::{EdgeDirection, Node, RelationshipGraph};
use analytics::CorrelationMatrix;
use core_types::{MetadataMap, compare_caps};
use std::cmp::Ordering;

/// Assembles a `RelationshipGraph` from a correlation matrix and company metadata.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    direction: EdgeDirection,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_direction(direction: EdgeDirection) -> Self {
        Self { direction }
    }

    /// Builds the thresholded network.
    ///
    /// Every ticker of the matrix becomes a node, whether or not `metadata` knows
    /// it; node attributes are copied, so later changes to `metadata` do not
    /// affect the graph. Each unordered pair with a defined correlation whose
    /// absolute value is at least `threshold` yields exactly one directed edge,
    /// oriented by the builder's `EdgeDirection`. Undefined correlations never
    /// produce an edge.
    ///
    /// # Errors
    ///
    /// `InvalidThreshold` unless `0 <= threshold <= 1`.
    pub fn build_graph(
        &self,
        matrix: &CorrelationMatrix,
        metadata: &MetadataMap,
        threshold: f64,
    ) -> Result<RelationshipGraph, NetworkError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(NetworkError::InvalidThreshold(threshold));
        }

        let nodes: Vec<Node> = matrix
            .tickers()
            .iter()
            .map(|ticker| Node::snapshot(ticker, metadata.get(ticker)))
            .collect();

        let without_metadata = matrix
            .tickers()
            .iter()
            .filter(|t| metadata.get(t).is_none())
            .count();
        if without_metadata > 0 {
            tracing::warn!(
                count = without_metadata,
                "Tickers without metadata were added as bare nodes."
            );
        }

        let mut links = Vec::new();
        let mut undefined = 0usize;
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let Some(corr) = matrix.value(i, j) else {
                    undefined += 1;
                    continue;
                };
                if corr.abs() < threshold {
                    continue;
                }
                let (source, target) = self.orient(&nodes, i, j);
                links.push((source, target, corr));
            }
        }

        let graph = RelationshipGraph::assemble(threshold, matrix.window(), self.direction, nodes, links);

        tracing::info!(
            nodes = graph.nodes().len(),
            edges = graph.edges().len(),
            threshold,
            skipped_undefined = undefined,
            "Built correlation network."
        );

        Ok(graph)
    }

    /// Returns `(source, target)` for the pair `i`, `j`.
    fn orient(&self, nodes: &[Node], i: usize, j: usize) -> (usize, usize) {
        match self.direction {
            EdgeDirection::LargerCapToSmaller => {
                let by_cap = compare_caps(nodes[i].market_cap, nodes[j].market_cap);
                let i_leads = match by_cap {
                    Ordering::Greater => true,
                    Ordering::Less => false,
                    Ordering::Equal => nodes[i].ticker <= nodes[j].ticker,
                };
                if i_leads { (i, j) } else { (j, i) }
            }
        }
    }
}
