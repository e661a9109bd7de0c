use log::warn;

use super::cycle::{Cycle, MIN_CYCLE_LENGTH};
use super::graph::{EdgeId, ExchangeGraph};

/// Represents a quote for a complete trading cycle: which edge serves each hop, and the
/// resulting yield.
///
/// The yield is the product of the chosen edge rates in traversal order. Above 1.0 the
/// round trip ends with more of the starting currency than it began with.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleQuote {
    /// The cycle being quoted
    cycle: Cycle,
    /// The chosen edge for each hop, in traversal order
    edges: Vec<EdgeId>,
    /// Product of the chosen edge rates
    rate: f64,
}

impl CycleQuote {
    /// Quotes a cycle using the best available edge for every hop.
    ///
    /// When a hop is served by several parallel quotes, the highest rate wins (the first
    /// one on ties). Rates are positive, so picking the best edge per hop gives the best
    /// product over every combination of edges.
    ///
    /// # Panics
    ///
    /// Panics if the cycle is shorter than three currencies or a hop has no edge in the
    /// graph. Either means the cycle did not come from this graph's cycle finder.
    #[must_use]
    pub fn score(graph: &ExchangeGraph, cycle: &Cycle) -> Self {
        let hops = Self::hops(graph, cycle);
        let edges = hops.iter().map(|hop| hop.best).collect();
        Self::new(graph, cycle, edges)
    }

    /// Like [`CycleQuote::score`], but only over edge combinations that trade at least
    /// one hop in its observed direction.
    ///
    /// A cycle made purely of synthesized inverses mirrors a cycle of observed quotes.
    /// Returns `None` when no hop of the cycle has an observed quote.
    ///
    /// # Panics
    ///
    /// Same conditions as [`CycleQuote::score`]
    #[must_use]
    pub fn score_observed(graph: &ExchangeGraph, cycle: &Cycle) -> Option<Self> {
        let hops = Self::hops(graph, cycle);
        let best: Vec<EdgeId> = hops.iter().map(|hop| hop.best).collect();
        if best.iter().any(|&edge| !graph.edge(edge).quote.is_synthesized()) {
            return Some(Self::new(graph, cycle, best));
        }

        // Every best edge is an inverse: force one hop onto its best observed quote
        let mut leader: Option<Self> = None;
        for (i, hop) in hops.iter().enumerate() {
            let Some(observed) = hop.best_observed else {
                continue;
            };
            let mut edges = best.clone();
            edges[i] = observed;
            let candidate = Self::new(graph, cycle, edges);
            if leader.as_ref().map_or(true, |leader| candidate.rate > leader.rate) {
                leader = Some(candidate);
            }
        }
        leader
    }

    /// Best edge, and best observed edge, for each hop in traversal order
    #[allow(clippy::panic)]
    fn hops(graph: &ExchangeGraph, cycle: &Cycle) -> Vec<HopEdges> {
        assert!(
            cycle.len() >= MIN_CYCLE_LENGTH,
            "Cannot score {cycle:?}: fewer than {MIN_CYCLE_LENGTH} currencies"
        );

        let higher = |best: EdgeId, edge: EdgeId| {
            if graph.edge(edge).quote.rate() > graph.edge(best).quote.rate() {
                edge
            } else {
                best
            }
        };

        cycle
            .hops()
            .map(|(from, to)| {
                let edges = graph.edges_between(from, to);
                let Some(best) = edges.iter().copied().reduce(higher) else {
                    panic!(
                        "Cannot score {cycle:?}: no quote from {} to {}",
                        graph.currency(from),
                        graph.currency(to)
                    );
                };
                let best_observed = edges
                    .iter()
                    .copied()
                    .filter(|&edge| !graph.edge(edge).quote.is_synthesized())
                    .reduce(higher);
                HopEdges {
                    best,
                    best_observed,
                }
            })
            .collect()
    }

    /// Multiplies the chosen rates in traversal order
    fn new(graph: &ExchangeGraph, cycle: &Cycle, edges: Vec<EdgeId>) -> Self {
        let rate = edges
            .iter()
            .fold(1.0, |rate, &edge| rate * graph.edge(edge).quote.rate());
        Self {
            cycle: cycle.clone(),
            edges,
            rate,
        }
    }

    /// The quoted cycle
    #[must_use]
    pub const fn cycle(&self) -> &Cycle {
        &self.cycle
    }

    /// The chosen edge for each hop
    #[must_use]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// The cycle's yield: product of the chosen rates
    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }

    /// Whether the round trip ends with more than it started with
    #[must_use]
    pub fn is_profitable(&self) -> bool {
        self.rate > 1.0
    }
}

/// Candidate edges for one hop of a cycle
struct HopEdges {
    /// Highest-rate edge, first on ties
    best: EdgeId,
    /// Highest-rate observed edge, if the hop has one
    best_observed: Option<EdgeId>,
}

/// Keeps the highest-yield cycle quote seen so far
#[derive(Debug, Clone, Default)]
pub struct BestCycle {
    /// Current leader
    best: Option<CycleQuote>,
    /// How many cycles have been looked at
    examined: u64,
}

impl BestCycle {
    /// Offers a candidate. It replaces the leader only with a strictly higher
    /// yield, so the earliest of equal candidates wins. A yield that overflowed
    /// to infinity is counted but never leads.
    ///
    /// Returns whether the candidate became the leader.
    pub fn offer(&mut self, candidate: CycleQuote) -> bool {
        self.examined += 1;
        if !candidate.rate.is_finite() {
            warn!(
                "cycle_quote: Skipping {:?}, yield {} is not a finite number",
                candidate.cycle, candidate.rate
            );
            return false;
        }
        let better = self
            .best
            .as_ref()
            .map_or(true, |best| candidate.rate > best.rate);
        if better {
            self.best = Some(candidate);
        }
        better
    }

    /// Counts a cycle that had no eligible quote
    pub fn pass(&mut self) {
        self.examined += 1;
    }

    /// Combines with the result of a search that ran after this one. On equal
    /// yields `self` wins.
    #[must_use]
    pub fn merge(mut self, later: Self) -> Self {
        let examined = self.examined + later.examined;
        if let Some(candidate) = later.best {
            self.offer(candidate);
        }
        self.examined = examined;
        self
    }

    /// The current leader
    #[must_use]
    pub const fn best(&self) -> Option<&CycleQuote> {
        self.best.as_ref()
    }

    /// Consumes the tracker, returning the leader
    #[must_use]
    pub fn into_best(self) -> Option<CycleQuote> {
        self.best
    }

    /// Number of cycles offered or passed, merged trackers included
    #[must_use]
    pub const fn examined(&self) -> u64 {
        self.examined
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::arb::cycle::Cycle;
    use crate::arb::test_helpers::*;

    #[test]
    fn test_losing_triangle() {
        let graph = graph(&LOSING_TRIANGLE);
        let quote = CycleQuote::score(&graph, &cycle(&graph, &["USD", "EUR", "GBP"]));
        // 0.85 * 0.9 * 1.30
        assert!((quote.rate() - 0.9945).abs() < 1e-12);
        assert!(!quote.is_profitable());
    }

    #[test]
    fn test_winning_triangle() {
        let graph = graph(&WINNING_TRIANGLE);
        let quote = CycleQuote::score(&graph, &cycle(&graph, &["USD", "EUR", "GBP"]));
        assert!((quote.rate() - 1.053).abs() < 1e-12);
        assert!(quote.is_profitable());
        assert_eq!(quote.edges().len(), 3);
        assert!(quote
            .edges()
            .iter()
            .all(|edge| !graph.edge(*edge).quote.is_synthesized()));

        // The other direction runs through the inverses
        let reverse = CycleQuote::score(&graph, &cycle(&graph, &["USD", "GBP", "EUR"]));
        assert!((reverse.rate() - 1.0 / 1.053).abs() < 1e-12);
        assert!(reverse
            .edges()
            .iter()
            .all(|edge| graph.edge(*edge).quote.is_synthesized()));
    }

    #[test]
    fn test_pair_against_its_inverse_breaks_even() {
        for rate in [0.85, 1.3, 123.456, 1e-6] {
            let graph = graph(&[("USD", "EUR", rate)]);
            let forward = graph.edge(0).quote.rate();
            let inverse = graph.edge(1).quote.rate();
            assert!((forward * inverse - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_best_parallel_quote() {
        let graph = graph(&[
            ("A", "B", 1.0),
            ("A", "B", 1.2),
            ("A", "B", 1.1),
            ("B", "C", 1.0),
            ("C", "A", 0.9),
            ("A", "C", 1.0 / 0.95),
        ]);
        let cycle = cycle(&graph, &["A", "B", "C"]);
        let quote = CycleQuote::score(&graph, &cycle);

        // Exhaustive search over every combination of parallel edges
        let mut best = 0.0_f64;
        for &ab in graph.edges_between(0, 1) {
            for &bc in graph.edges_between(1, 2) {
                for &ca in graph.edges_between(2, 0) {
                    let product = graph.edge(ab).quote.rate()
                        * graph.edge(bc).quote.rate()
                        * graph.edge(ca).quote.rate();
                    best = best.max(product);
                }
            }
        }
        assert!((quote.rate() - best).abs() < 1e-12);
        // A->B at 1.2, B->C at 1.0, C->A at 0.95 via the inverse of A/C
        assert!((quote.rate() - 1.2 * 0.95).abs() < 1e-12);
        assert!(graph.edge(quote.edges()[2]).quote.is_synthesized());
    }

    #[test]
    fn test_first_parallel_quote_wins_ties() {
        let graph = ExchangeGraph::from_quotes(vec![
            venue_quote("X", "A", "B", 2.0),
            venue_quote("Y", "A", "B", 2.0),
            venue_quote("X", "B", "C", 1.0),
            venue_quote("X", "C", "A", 1.0),
        ]);
        let quote = CycleQuote::score(&graph, &cycle(&graph, &["A", "B", "C"]));
        assert_eq!(graph.edge(quote.edges()[0]).quote.venue(), Some("X"));
    }

    #[test]
    #[should_panic(expected = "no quote from C to A")]
    fn test_missing_hop() {
        let graph = graph(&[("A", "B", 1.0), ("B", "C", 1.0)]);
        let _ = CycleQuote::score(&graph, &Cycle::new(vec![0, 1, 2]).unwrap());
    }

    #[test]
    fn test_best_cycle() {
        let graph = graph(&WINNING_TRIANGLE);
        let forward = CycleQuote::score(&graph, &cycle(&graph, &["USD", "EUR", "GBP"]));
        let backward = CycleQuote::score(&graph, &cycle(&graph, &["USD", "GBP", "EUR"]));

        let mut best = BestCycle::default();
        assert!(best.offer(backward.clone()));
        assert!(best.offer(forward.clone()));
        assert!(!best.offer(backward.clone()));
        // Equal yield does not displace the leader
        assert!(!best.offer(forward.clone()));
        assert_eq!(best.best(), Some(&forward));
        assert_eq!(best.examined(), 4);
    }

    #[test]
    fn test_merge_prefers_earlier_on_ties() {
        let graph = graph(&WINNING_TRIANGLE);
        let quote = CycleQuote::score(&graph, &cycle(&graph, &["USD", "EUR", "GBP"]));

        let mut earlier = BestCycle::default();
        earlier.offer(quote.clone());
        let mut later = BestCycle::default();
        later.offer(quote.clone());
        later.offer(quote);

        let merged = earlier.clone().merge(later);
        assert_eq!(merged.examined(), 3);
        assert_eq!(merged.best(), earlier.best());

        let empty = BestCycle::default().merge(BestCycle::default());
        assert!(empty.best().is_none());
    }

    #[test]
    fn test_observed_only_rejects_mirror_cycles() {
        let graph = graph(&LOSING_TRIANGLE);
        let forward = cycle(&graph, &["USD", "EUR", "GBP"]);
        let mirror = cycle(&graph, &["USD", "GBP", "EUR"]);

        // Unrestricted, the mirror of a losing cycle wins
        assert!(CycleQuote::score(&graph, &mirror).is_profitable());
        assert!(CycleQuote::score_observed(&graph, &mirror).is_none());
        let observed = CycleQuote::score_observed(&graph, &forward).unwrap();
        assert_eq!(observed, CycleQuote::score(&graph, &forward));
    }

    #[test]
    fn test_observed_only_forces_one_observed_hop() {
        // A->B is quoted both ways; every other hop only through inverses
        let graph = ExchangeGraph::from_quotes(vec![
            venue_quote("X", "B", "A", 0.5),
            venue_quote("Y", "A", "B", 1.9),
            venue_quote("X", "C", "B", 1.0),
            venue_quote("X", "A", "C", 1.0),
        ]);
        let cycle = cycle(&graph, &["A", "B", "C"]);

        let free = CycleQuote::score(&graph, &cycle);
        assert!((free.rate() - 2.0).abs() < 1e-12);
        assert!(free.edges().iter().all(|e| graph.edge(*e).quote.is_synthesized()));

        let observed = CycleQuote::score_observed(&graph, &cycle).unwrap();
        assert!((observed.rate() - 1.9).abs() < 1e-12);
        assert_eq!(graph.edge(observed.edges()[0]).quote.venue(), Some("Y"));
        assert!(!graph.edge(observed.edges()[0]).quote.is_synthesized());
    }

    #[test]
    fn test_pass_counts_as_examined() {
        let mut best = BestCycle::default();
        best.pass();
        best.pass();
        assert_eq!(best.examined(), 2);
        assert!(best.into_best().is_none());
    }

    #[test]
    fn test_overflowing_yield_never_leads() {
        let graph = graph(&[("A", "B", 1e200), ("B", "C", 1e200), ("C", "A", 1.0)]);
        let overflow = CycleQuote::score(&graph, &cycle(&graph, &["A", "B", "C"]));
        assert!(overflow.rate().is_infinite());

        let mut best = BestCycle::default();
        assert!(!best.offer(overflow.clone()));
        assert!(best.best().is_none());

        let finite = CycleQuote::score(&graph, &cycle(&graph, &["A", "C", "B"]));
        assert!(best.offer(finite.clone()));
        assert!(!best.offer(overflow));
        assert_eq!(best.best(), Some(&finite));
        assert_eq!(best.examined(), 3);
    }
}
