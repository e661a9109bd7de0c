//! # Cycle finder
//!
//! Enumerates every simple cycle of at least three currencies in an
//! [`ExchangeGraph`], each exactly once and in canonical rotation.
//!
//! The graph is split into strongly connected components first. Each
//! component is then searched by repeatedly taking its smallest node,
//! emitting all cycles through it, removing it and re-splitting what is left.
//! Cycles through the chosen node are found with Johnson's blocked-set search
//! when the length is unbounded, or by depth-limited backtracking when a
//! maximum length is configured.
//!
//! Because every quote has a synthesized inverse, each pair of quoted
//! currencies forms a two-node loop. Those loops yield 1.0 up to rounding and
//! are never emitted.
//!
//! Both searches keep their own stack of frames, so path length is bounded by
//! memory rather than by the thread's call stack.

use std::collections::HashSet;
use std::ops::ControlFlow;

use super::cycle::{Cycle, MIN_CYCLE_LENGTH};
use super::graph::{ExchangeGraph, NodeId};
use super::scc::cyclic_components;

/// Search steps between two calls of the stop predicate
const STOP_CHECK_INTERVAL: u32 = 1024;

/// Calls `visit` once for every simple cycle in the graph.
///
/// Stops early, returning `Break`, as soon as `visit` does.
pub fn for_each_cycle<F>(
    graph: &ExchangeGraph,
    max_length: Option<usize>,
    mut visit: F,
) -> ControlFlow<()>
where
    F: FnMut(Cycle) -> ControlFlow<()>,
{
    if max_length.is_some_and(|max| max < MIN_CYCLE_LENGTH) {
        return ControlFlow::Continue(());
    }
    let active = vec![true; graph.node_count()];
    for component in cyclic_components(graph, &active) {
        for_each_cycle_in(graph, &component, max_length, &|| false, &mut visit)?;
    }
    ControlFlow::Continue(())
}

/// Calls `visit` once for every simple cycle inside one strongly connected component.
///
/// `stop` is polled before each sub-component and periodically while searching,
/// including stretches where no cycle is found. The search returns `Break` once
/// it answers `true`, or as soon as `visit` does.
///
/// Components are independent, so callers may search several of them concurrently.
pub fn for_each_cycle_in<S, F>(
    graph: &ExchangeGraph,
    component: &[NodeId],
    max_length: Option<usize>,
    stop: &S,
    visit: &mut F,
) -> ControlFlow<()>
where
    S: Fn() -> bool,
    F: FnMut(Cycle) -> ControlFlow<()>,
{
    if max_length.is_some_and(|max| max < MIN_CYCLE_LENGTH) {
        return ControlFlow::Continue(());
    }

    let mut scratch = Scratch::new(graph.node_count());
    let mut watch = Watch::new(stop);
    let mut pending = vec![component.to_vec()];
    while let Some(component) = pending.pop() {
        if stop() {
            return ControlFlow::Break(());
        }
        if component.len() < MIN_CYCLE_LENGTH {
            continue;
        }
        for &node in &component {
            scratch.members[node] = true;
        }
        let start = component[0];

        let flow = match max_length {
            None => Circuits::new(graph, &mut scratch, start, &mut watch, &mut *visit).run(),
            Some(max_length) => {
                Bounded::new(graph, &mut scratch, start, max_length, &mut watch, &mut *visit).run()
            }
        };
        if flow.is_break() {
            return flow;
        }

        // Every cycle through `start` has been emitted; search the rest without it
        scratch.members[start] = false;
        let mut rest = cyclic_components(graph, &scratch.members);
        scratch.reset(&component);
        rest.reverse();
        pending.extend(rest);
    }
    ControlFlow::Continue(())
}

/// Collects every simple cycle of the graph
#[must_use]
pub fn enumerate(graph: &ExchangeGraph, max_length: Option<usize>) -> Vec<Cycle> {
    let mut cycles = Vec::new();
    let _ = for_each_cycle(graph, max_length, |cycle| {
        cycles.push(cycle);
        ControlFlow::Continue(())
    });
    cycles
}

/// Turns a search path into a cycle. The path is simple and starts at the
/// component's smallest node by construction.
#[allow(clippy::panic)]
fn emit(path: &[NodeId]) -> Cycle {
    match Cycle::new(path.to_vec()) {
        Ok(cycle) => cycle,
        Err(e) => panic!("Cycle finder produced an invalid path {path:?}: {e}"),
    }
}

/// Per-node state, allocated once per component and reused for every start node
struct Scratch {
    /// Nodes of the sub-component being searched
    members: Vec<bool>,
    /// Nodes that currently cannot lead back to the start off the path
    blocked: Vec<bool>,
    /// `blocked_by[w]` holds nodes to unblock once `w` is unblocked
    blocked_by: Vec<HashSet<NodeId>>,
    /// Nodes on the current path
    on_path: Vec<bool>,
}

impl Scratch {
    /// All-clear state for a graph of `node_count` nodes
    fn new(node_count: usize) -> Self {
        Self {
            members: vec![false; node_count],
            blocked: vec![false; node_count],
            blocked_by: vec![HashSet::new(); node_count],
            on_path: vec![false; node_count],
        }
    }

    /// Clears whatever a search over `nodes` left behind
    fn reset(&mut self, nodes: &[NodeId]) {
        for &node in nodes {
            self.members[node] = false;
            self.blocked[node] = false;
            self.blocked_by[node].clear();
            self.on_path[node] = false;
        }
    }
}

/// Polls the stop predicate every [`STOP_CHECK_INTERVAL`] steps
struct Watch<'a, S> {
    /// Answers whether the search should give up
    stop: &'a S,
    /// Steps since the last poll
    steps: u32,
}

impl<'a, S: Fn() -> bool> Watch<'a, S> {
    /// Starts counting from zero
    fn new(stop: &'a S) -> Self {
        Self { stop, steps: 0 }
    }

    /// Counts one search step
    fn tick(&mut self) -> ControlFlow<()> {
        self.steps += 1;
        if self.steps < STOP_CHECK_INTERVAL {
            return ControlFlow::Continue(());
        }
        self.steps = 0;
        if (self.stop)() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

/// One node on the Johnson search path
struct CircuitFrame {
    /// The node
    node: NodeId,
    /// Position of the next successor to look at
    next: usize,
    /// Whether some path from here got back to the start
    closed: bool,
}

/// Johnson's circuit search for all cycles through `start`
struct Circuits<'a, 'w, S, F> {
    /// The graph being searched
    graph: &'a ExchangeGraph,
    /// Membership and blocking state
    scratch: &'a mut Scratch,
    /// Every emitted cycle starts and ends here
    start: NodeId,
    /// Current path from `start`
    path: Vec<NodeId>,
    /// Stop predicate
    watch: &'a mut Watch<'w, S>,
    /// Cycle sink
    visit: &'a mut F,
}

impl<'a, 'w, S, F> Circuits<'a, 'w, S, F>
where
    S: Fn() -> bool,
    F: FnMut(Cycle) -> ControlFlow<()>,
{
    /// Prepares a search from `start` over `scratch.members`
    fn new(
        graph: &'a ExchangeGraph,
        scratch: &'a mut Scratch,
        start: NodeId,
        watch: &'a mut Watch<'w, S>,
        visit: &'a mut F,
    ) -> Self {
        Self {
            graph,
            scratch,
            start,
            path: Vec::new(),
            watch,
            visit,
        }
    }

    /// Emits every cycle through `start`
    fn run(mut self) -> ControlFlow<()> {
        let graph = self.graph;
        let mut frames = vec![self.enter(self.start)];

        while let Some(frame) = frames.last_mut() {
            self.watch.tick()?;
            let node = frame.node;

            if let Some(&next) = graph.successors(node).get(frame.next) {
                frame.next += 1;
                if !self.scratch.members[next] {
                    continue;
                }
                if next == self.start {
                    // Two-node loops close the search but are not reported
                    frame.closed = true;
                    if self.path.len() >= MIN_CYCLE_LENGTH {
                        (self.visit)(emit(&self.path))?;
                    }
                } else if !self.scratch.blocked[next] {
                    frames.push(self.enter(next));
                }
                continue;
            }

            let closed = frame.closed;
            frames.pop();
            if closed {
                self.unblock(node);
            } else {
                for &next in graph.successors(node) {
                    if self.scratch.members[next] {
                        self.scratch.blocked_by[next].insert(node);
                    }
                }
            }
            self.path.pop();
            if let Some(parent) = frames.last_mut() {
                parent.closed |= closed;
            }
        }
        ControlFlow::Continue(())
    }

    /// Puts `node` on the path and blocks it
    fn enter(&mut self, node: NodeId) -> CircuitFrame {
        self.path.push(node);
        self.scratch.blocked[node] = true;
        CircuitFrame {
            node,
            next: 0,
            closed: false,
        }
    }

    /// Unblocks `node` and, transitively, everything waiting on it
    fn unblock(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(node) = stack.pop() {
            if self.scratch.blocked[node] {
                self.scratch.blocked[node] = false;
                stack.extend(self.scratch.blocked_by[node].drain());
            }
        }
    }
}

/// Depth-limited backtracking for all cycles through `start` of at most `max_length` nodes
struct Bounded<'a, 'w, S, F> {
    /// The graph being searched
    graph: &'a ExchangeGraph,
    /// Membership and path state
    scratch: &'a mut Scratch,
    /// Every emitted cycle starts and ends here
    start: NodeId,
    /// Longest cycle to report, in nodes
    max_length: usize,
    /// Current path from `start`
    path: Vec<NodeId>,
    /// Stop predicate
    watch: &'a mut Watch<'w, S>,
    /// Cycle sink
    visit: &'a mut F,
}

impl<'a, 'w, S, F> Bounded<'a, 'w, S, F>
where
    S: Fn() -> bool,
    F: FnMut(Cycle) -> ControlFlow<()>,
{
    /// Prepares a search from `start` over `scratch.members`
    fn new(
        graph: &'a ExchangeGraph,
        scratch: &'a mut Scratch,
        start: NodeId,
        max_length: usize,
        watch: &'a mut Watch<'w, S>,
        visit: &'a mut F,
    ) -> Self {
        Self {
            graph,
            scratch,
            start,
            max_length,
            path: Vec::with_capacity(max_length.min(graph.node_count())),
            watch,
            visit,
        }
    }

    /// Emits every cycle through `start` within the length limit
    fn run(mut self) -> ControlFlow<()> {
        let graph = self.graph;
        self.path.push(self.start);
        self.scratch.on_path[self.start] = true;
        // (node, position of the next successor to look at)
        let mut frames: Vec<(NodeId, usize)> = vec![(self.start, 0)];

        while let Some(frame) = frames.last_mut() {
            self.watch.tick()?;
            let node = frame.0;

            let Some(&next) = graph.successors(node).get(frame.1) else {
                frames.pop();
                if let Some(last) = self.path.pop() {
                    self.scratch.on_path[last] = false;
                }
                continue;
            };
            frame.1 += 1;

            if !self.scratch.members[next] {
                continue;
            }
            if next == self.start {
                if self.path.len() >= MIN_CYCLE_LENGTH {
                    (self.visit)(emit(&self.path))?;
                }
            } else if !self.scratch.on_path[next] && self.path.len() < self.max_length {
                self.path.push(next);
                self.scratch.on_path[next] = true;
                frames.push((next, 0));
            }
        }
        ControlFlow::Continue(())
    }
}
