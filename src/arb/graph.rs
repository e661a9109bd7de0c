//! # Exchange graph
//!
//! A directed multigraph with one node per currency and one edge per quote.
//! Every observed quote contributes two edges: the observed direction and a
//! synthesized inverse. Parallel edges (the same pair quoted by several
//! venues) are all kept, since any of them may be the one that makes a cycle
//! profitable.

use std::collections::{BTreeSet, HashMap};

use log::{debug, warn};

use super::currency::Currency;
use super::feed::{QuoteRecord, Rejection};
use super::quote::Quote;

/// Index of a currency node. Nodes are numbered in ascending currency order.
pub type NodeId = usize;

/// Index of an edge in insertion order
pub type EdgeId = usize;

/// A directed edge between two currencies
#[derive(Debug, Clone)]
pub struct Edge {
    /// Node of the currency given up
    pub from: NodeId,
    /// Node of the currency received
    pub to: NodeId,
    /// The quote as traversed along this edge (possibly synthesized)
    pub quote: Quote,
    /// The observed edge this one comes from. Equal to its own id for observed edges.
    pub source: EdgeId,
}

/// Currencies and the quotes between them, built once per snapshot
#[derive(Debug, Clone, Default)]
pub struct ExchangeGraph {
    /// Node id -> currency, ascending
    currencies: Vec<Currency>,
    /// Currency -> node id
    index: HashMap<Currency, NodeId>,
    /// All edges, observed followed by its inverse
    edges: Vec<Edge>,
    /// Distinct successor nodes for each node, ascending
    successors: Vec<Vec<NodeId>>,
    /// Parallel edges for each ordered node pair, in insertion order
    parallel: HashMap<(NodeId, NodeId), Vec<EdgeId>>,
    /// Records excluded during construction
    rejected: Vec<Rejection>,
}

impl ExchangeGraph {
    /// Builds the graph from raw feed records.
    ///
    /// Records that do not form a valid quote are skipped and kept as
    /// rejections; they never fail the batch.
    #[must_use]
    pub fn build(records: &[QuoteRecord]) -> Self {
        let mut rejected = Vec::new();
        let quotes: Vec<Quote> = records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| match Quote::try_from(record) {
                Ok(quote) => Some(quote),
                Err(reason) => {
                    warn!(
                        "graph::build: Skipping record {} from {}: {}",
                        index,
                        record.venue.as_deref().unwrap_or("unknown venue"),
                        reason
                    );
                    rejected.push(Rejection {
                        index,
                        venue: record.venue.clone(),
                        reason,
                    });
                    None
                }
            })
            .collect();

        let mut graph = Self::from_quotes(quotes);
        graph.rejected = rejected;
        graph
    }

    /// Builds the graph from already validated quotes.
    ///
    /// # Panics
    ///
    /// Panics if any input quote is synthesized; inputs must be observed data.
    #[must_use]
    pub fn from_quotes(quotes: impl IntoIterator<Item = Quote>) -> Self {
        let quotes: Vec<Quote> = quotes.into_iter().collect();

        let currencies: Vec<Currency> = quotes
            .iter()
            .flat_map(|quote| [quote.base().clone(), quote.quote().clone()])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index: HashMap<Currency, NodeId> = currencies
            .iter()
            .enumerate()
            .map(|(node, currency)| (currency.clone(), node))
            .collect();

        let mut graph = Self {
            successors: vec![Vec::new(); currencies.len()],
            currencies,
            index,
            edges: Vec::with_capacity(quotes.len() * 2),
            parallel: HashMap::new(),
            rejected: Vec::new(),
        };

        for quote in quotes {
            let inverse = quote.synthesize();
            let source = graph.edges.len();
            graph.push_edge(quote, source);
            graph.push_edge(inverse, source);
        }

        for successors in &mut graph.successors {
            successors.sort_unstable();
            successors.dedup();
        }

        debug!(
            "graph::from_quotes: Built graph with {} currencies and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }

    /// Appends an edge and indexes it
    fn push_edge(&mut self, quote: Quote, source: EdgeId) {
        let from = self.index[quote.base()];
        let to = self.index[quote.quote()];
        let id = self.edges.len();
        self.edges.push(Edge {
            from,
            to,
            quote,
            source,
        });
        self.successors[from].push(to);
        self.parallel.entry((from, to)).or_default().push(id);
    }

    /// Number of currencies
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.currencies.len()
    }

    /// Number of edges, synthesized ones included
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no currencies at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }

    /// Node id of a currency, if it was quoted
    #[must_use]
    pub fn node(&self, currency: &Currency) -> Option<NodeId> {
        self.index.get(currency).copied()
    }

    /// Currency of a node
    #[must_use]
    pub fn currency(&self, node: NodeId) -> &Currency {
        &self.currencies[node]
    }

    /// An edge by id
    #[must_use]
    pub fn edge(&self, edge: EdgeId) -> &Edge {
        &self.edges[edge]
    }

    /// All edges in insertion order
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Distinct nodes reachable from `node` in one hop, ascending
    #[must_use]
    pub fn successors(&self, node: NodeId) -> &[NodeId] {
        &self.successors[node]
    }

    /// All parallel edges from `from` to `to`, in insertion order
    #[must_use]
    pub fn edges_between(&self, from: NodeId, to: NodeId) -> &[EdgeId] {
        self.parallel.get(&(from, to)).map_or(&[][..], Vec::as_slice)
    }

    /// The observed quote behind an edge. For observed edges this is the edge's own quote.
    #[must_use]
    pub fn observed(&self, edge: EdgeId) -> &Quote {
        &self.edges[self.edges[edge].source].quote
    }

    /// Records skipped while building
    #[must_use]
    pub fn rejected(&self) -> &[Rejection] {
        &self.rejected
    }
}
