//! # Stockgraph Network
//!
//! Builds the correlation relationship graph between tickers and answers
//! neighbourhood questions about it.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** Consumes a `CorrelationMatrix` from `analytics` and a
//!   `MetadataMap` from `core-types`. No I/O.
//! - **Snapshot Nodes:** Node attributes are copied out of the metadata at build
//!   time. A graph stays valid however the metadata changes afterwards.
//! - **Rebuild, Never Patch:** A graph is immutable. A new threshold means a new
//!   `NetworkBuilder::build_graph` call.
//!
//! ## Public API
//!
//! - `NetworkBuilder`: thresholded graph construction.
//! - `RelationshipGraph`, `Node`, `Edge`, `EdgeDirection`: the graph itself.
//! - `GraphInfo`, `NetworkStats`: summaries returned by the graph queries.
//! - `NetworkError`: The specific error types that can be returned from this crate.

pub mod builder;
pub mod error;
pub mod graph;
pub mod queries;

pub use builder::NetworkBuilder;
pub use error::NetworkError;
pub use graph::{Edge, EdgeDirection, Node, RelationshipGraph};
pub use queries::{GraphInfo, NetworkStats};
