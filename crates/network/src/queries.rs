use crate::error::NetworkError;
use crate::graph::RelationshipGraph;
use analytics::BoundedSelection;
use core_types::{RankOrder, RankedEntry, RankedList};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Headline size of a graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphInfo {
    pub nodes: usize,
    pub edges: usize,
    pub threshold: f64,
}

/// Connectivity summary of a graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkStats {
    pub total_nodes: usize,
    /// Nodes with at least one edge.
    pub connected_nodes: usize,
    pub edges: usize,
    pub threshold: f64,
    pub connected_node_list: Vec<String>,
    /// Mean degree over connected nodes; 0 when nothing is connected.
    pub average_degree: f64,
}

impl RelationshipGraph {
    /// For each input ticker, its `n` strongest neighbours.
    ///
    /// Neighbours are gathered over incoming and outgoing edges and ranked by
    /// absolute edge weight, which is also the value reported. A ticker that is
    /// not in the graph maps to an empty list.
    pub fn similar_stocks(
        &self,
        tickers: &[&str],
        n: usize,
    ) -> Result<BTreeMap<String, RankedList>, NetworkError> {
        if n == 0 {
            return Err(NetworkError::InvalidSelectionSize(n));
        }

        let mut result = BTreeMap::new();
        for &ticker in tickers {
            let Some(node) = self.index_of(ticker) else {
                tracing::warn!(ticker, "Ticker not in graph; no similar stocks.");
                result.insert(ticker.to_string(), RankedList::from_unsorted(RankOrder::Descending, Vec::new()));
                continue;
            };

            let mut selection = BoundedSelection::new(n, RankOrder::Descending)?;
            for &(other, e) in self.adjacency_at(node) {
                selection.push(RankedEntry::new(
                    self.nodes()[other].ticker.clone(),
                    self.edges()[e].weight.abs(),
                ));
            }
            result.insert(ticker.to_string(), selection.into_ranked_list());
        }
        Ok(result)
    }

    /// Neighbours shared by every input ticker, scored by their mean absolute
    /// edge weight to the inputs; the best `n` are returned.
    ///
    /// The input tickers themselves are never reported. An empty input, or any
    /// input outside the graph, yields an empty list.
    pub fn common_similar_stocks(&self, tickers: &[&str], n: usize) -> Result<RankedList, NetworkError> {
        if n == 0 {
            return Err(NetworkError::InvalidSelectionSize(n));
        }
        let empty = || RankedList::from_unsorted(RankOrder::Descending, Vec::new());

        let mut inputs = Vec::with_capacity(tickers.len());
        for &ticker in tickers {
            match self.index_of(ticker) {
                Some(i) => inputs.push(i),
                None => {
                    tracing::warn!(ticker, "Ticker not in graph; no common neighbours.");
                    return Ok(empty());
                }
            }
        }
        if inputs.is_empty() {
            return Ok(empty());
        }

        // neighbour -> (number of inputs linked, summed |weight|)
        let mut shared: HashMap<usize, (usize, f64)> = HashMap::new();
        for &input in &inputs {
            for &(other, e) in self.adjacency_at(input) {
                let slot = shared.entry(other).or_insert((0, 0.0));
                slot.0 += 1;
                slot.1 += self.edges()[e].weight.abs();
            }
        }

        let mut selection = BoundedSelection::new(n, RankOrder::Descending)?;
        for (other, (count, total)) in shared {
            if count == inputs.len() && !inputs.contains(&other) {
                selection.push(RankedEntry::new(
                    self.nodes()[other].ticker.clone(),
                    total / count as f64,
                ));
            }
        }
        let common = selection.into_ranked_list();

        tracing::info!(inputs = inputs.len(), found = common.len(), "Common similar stocks.");
        Ok(common)
    }

    pub fn info(&self) -> GraphInfo {
        GraphInfo {
            nodes: self.nodes().len(),
            edges: self.edges().len(),
            threshold: self.threshold(),
        }
    }

    pub fn network_stats(&self) -> NetworkStats {
        let connected: Vec<usize> = (0..self.nodes().len()).filter(|&i| self.degree_at(i) > 0).collect();
        let degree_sum: usize = connected.iter().map(|&i| self.degree_at(i)).sum();
        let average_degree = if connected.is_empty() {
            0.0
        } else {
            degree_sum as f64 / connected.len() as f64
        };

        NetworkStats {
            total_nodes: self.nodes().len(),
            connected_nodes: connected.len(),
            edges: self.edges().len(),
            threshold: self.threshold(),
            connected_node_list: connected.iter().map(|&i| self.nodes()[i].ticker.clone()).collect(),
            average_degree,
        }
    }

    /// Tickers with at least `min_connections` edges, most connected first.
    pub fn highly_connected(&self, min_connections: usize) -> Vec<(String, usize)> {
        let mut hubs: Vec<(String, usize)> = self
            .nodes()
            .iter()
            .enumerate()
            .map(|(i, node)| (node.ticker.clone(), self.degree_at(i)))
            .filter(|(_, degree)| *degree >= min_connections)
            .collect();
        hubs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        hubs
    }
}
