//! # Strongly connected components
//!
//! Tarjan's algorithm over the exchange graph, restricted to a set of active
//! nodes. Cycles can only live inside a component, so the cycle finder uses
//! this both to split the graph into independent searches and to shrink each
//! search after a node has been exhausted.
//!
//! The traversal is iterative so deep graphs cannot overflow the call stack.

use std::cmp::min;

use super::graph::{ExchangeGraph, NodeId};

/// Finds the strongly connected components among the `active` nodes.
///
/// Nodes within a component are ascending, and components are ordered by
/// their smallest node, so the output does not depend on traversal order.
///
/// # Panics
///
/// Panics if `active` does not have one entry per graph node
#[must_use]
pub fn strongly_connected_components(graph: &ExchangeGraph, active: &[bool]) -> Vec<Vec<NodeId>> {
    assert_eq!(
        active.len(),
        graph.node_count(),
        "Active mask must cover every node"
    );

    let node_count = graph.node_count();
    let mut index: Vec<Option<usize>> = vec![None; node_count];
    let mut lowlink = vec![0; node_count];
    let mut on_stack = vec![false; node_count];
    let mut stack: Vec<NodeId> = Vec::new();
    let mut next_index = 0;
    let mut components = Vec::new();

    for root in 0..node_count {
        if !active[root] || index[root].is_some() {
            continue;
        }

        index[root] = Some(next_index);
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;

        // (node, position of the next successor to look at)
        let mut calls: Vec<(NodeId, usize)> = vec![(root, 0)];

        while let Some(frame) = calls.last_mut() {
            let node = frame.0;

            if let Some(&next) = graph.successors(node).get(frame.1) {
                frame.1 += 1;
                if !active[next] {
                    continue;
                }
                match index[next] {
                    None => {
                        index[next] = Some(next_index);
                        lowlink[next] = next_index;
                        next_index += 1;
                        stack.push(next);
                        on_stack[next] = true;
                        calls.push((next, 0));
                    }
                    Some(next_idx) if on_stack[next] => {
                        lowlink[node] = min(lowlink[node], next_idx);
                    }
                    Some(_) => {}
                }
                continue;
            }

            calls.pop();
            if let Some(&(parent, _)) = calls.last() {
                lowlink[parent] = min(lowlink[parent], lowlink[node]);
            }

            if Some(lowlink[node]) == index[node] {
                let mut component = Vec::new();
                while let Some(member) = stack.pop() {
                    on_stack[member] = false;
                    component.push(member);
                    if member == node {
                        break;
                    }
                }
                component.sort_unstable();
                components.push(component);
            }
        }
    }

    components.sort_unstable_by_key(|component| component[0]);
    components
}

/// Components that can contain a cycle, i.e. those with at least two nodes
#[must_use]
pub fn cyclic_components(graph: &ExchangeGraph, active: &[bool]) -> Vec<Vec<NodeId>> {
    strongly_connected_components(graph, active)
        .into_iter()
        .filter(|component| component.len() >= 2)
        .collect()
}
