use crate::error::NetworkError;
use core_types::CompanyInfo;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// Which endpoint of a correlated pair an edge leaves from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum EdgeDirection {
    /// The edge points from the company with the larger market capitalisation to
    /// the smaller one. A known capitalisation outranks an unknown one; when both
    /// are equal or both unknown, the lexically smaller ticker is the source.
    #[default]
    LargerCapToSmaller,
}

/// A ticker in the relationship graph with the metadata it had at build time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub ticker: String,
    pub market_cap: Option<Decimal>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub name: Option<String>,
}

impl Node {
    pub(crate) fn snapshot(ticker: &str, info: Option<&CompanyInfo>) -> Self {
        let info = info.cloned().unwrap_or_default();
        Self {
            ticker: ticker.to_string(),
            market_cap: info.market_cap,
            sector: info.sector,
            industry: info.industry,
            name: info.name,
        }
    }
}

/// A directed, weighted link between two correlated tickers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    /// The signed correlation coefficient of the pair.
    pub weight: f64,
}

/// A thresholded correlation network.
///
/// Immutable once built: a different threshold means building a new graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipGraph {
    threshold: f64,
    window: usize,
    direction: EdgeDirection,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    /// For each node, `(neighbour node, edge)` index pairs over both directions.
    #[serde(skip)]
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl RelationshipGraph {
    /// Assembles a graph from nodes and `(source, target, weight)` index triples.
    pub(crate) fn assemble(
        threshold: f64,
        window: usize,
        direction: EdgeDirection,
        nodes: Vec<Node>,
        links: Vec<(usize, usize, f64)>,
    ) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.ticker.clone(), i))
            .collect();

        let mut adjacency = vec![Vec::new(); nodes.len()];
        let mut edges = Vec::with_capacity(links.len());
        for (e, (source, target, weight)) in links.into_iter().enumerate() {
            adjacency[source].push((target, e));
            adjacency[target].push((source, e));
            edges.push(Edge {
                source: nodes[source].ticker.clone(),
                target: nodes[target].ticker.clone(),
                weight,
            });
        }

        Self {
            threshold,
            window,
            direction,
            nodes,
            edges,
            index,
            adjacency,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// The correlation window the underlying matrix was estimated over.
    pub fn window(&self) -> usize {
        self.window
    }

    pub fn direction(&self) -> EdgeDirection {
        self.direction
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, ticker: &str) -> Option<&Node> {
        self.index.get(ticker).map(|&i| &self.nodes[i])
    }

    /// The edge joining two tickers, in whichever direction it was built.
    pub fn edge_between(&self, a: &str, b: &str) -> Option<&Edge> {
        let i = *self.index.get(a)?;
        let j = *self.index.get(b)?;
        self.adjacency[i]
            .iter()
            .find(|(other, _)| *other == j)
            .map(|&(_, e)| &self.edges[e])
    }

    /// Every ticker linked to `ticker` by an incoming or outgoing edge, with the edge weight.
    pub fn neighbours(&self, ticker: &str) -> Result<Vec<(&str, f64)>, NetworkError> {
        let i = self.require(ticker)?;
        Ok(self.adjacency[i]
            .iter()
            .map(|&(other, e)| (self.nodes[other].ticker.as_str(), self.edges[e].weight))
            .collect())
    }

    /// Total number of incident edges.
    pub fn degree(&self, ticker: &str) -> Result<usize, NetworkError> {
        Ok(self.adjacency[self.require(ticker)?].len())
    }

    pub fn out_degree(&self, ticker: &str) -> Result<usize, NetworkError> {
        let i = self.require(ticker)?;
        Ok(self.adjacency[i]
            .iter()
            .filter(|&&(_, e)| self.edges[e].source == self.nodes[i].ticker)
            .count())
    }

    pub fn in_degree(&self, ticker: &str) -> Result<usize, NetworkError> {
        Ok(self.degree(ticker)? - self.out_degree(ticker)?)
    }

    pub(crate) fn degree_at(&self, node: usize) -> usize {
        self.adjacency[node].len()
    }

    pub(crate) fn adjacency_at(&self, node: usize) -> &[(usize, usize)] {
        &self.adjacency[node]
    }

    pub(crate) fn index_of(&self, ticker: &str) -> Option<usize> {
        self.index.get(ticker).copied()
    }

    fn require(&self, ticker: &str) -> Result<usize, NetworkError> {
        self.index_of(ticker)
            .ok_or_else(|| NetworkError::UnknownTicker(ticker.to_string()))
    }
}
