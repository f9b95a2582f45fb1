//! Static checks over a flow document.
//!
//! Checks only report. Nothing here prevents an edit or a save.

use crate::graph::FlowDocument;
use crate::node_types::{NodeData, NodeKind, MAX_BUTTON_OPTIONS};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowIssue {
    MissingStart,
    MultipleStarts(Vec<String>),
    DanglingEdge { edge: String, missing: String },
    Unreachable(String),
    EmptyContent(String),
    TooManyOptions { id: String, count: usize },
    Cycle(Vec<String>),
}

impl FlowIssue {
    pub fn severity(&self) -> Severity {
        match self {
            FlowIssue::MissingStart | FlowIssue::MultipleStarts(_) | FlowIssue::DanglingEdge { .. } => {
                Severity::Error
            }
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for FlowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowIssue::MissingStart => write!(f, "Flow has no start node"),
            FlowIssue::MultipleStarts(ids) => write!(f, "Flow has {} start nodes: {}", ids.len(), ids.join(", ")),
            FlowIssue::DanglingEdge { edge, missing } => {
                write!(f, "Edge '{}' points to missing node '{}'", edge, missing)
            }
            FlowIssue::Unreachable(id) => write!(f, "Node '{}' is not reachable from start", id),
            FlowIssue::EmptyContent(id) => write!(f, "Node '{}' has no message text", id),
            FlowIssue::TooManyOptions { id, count } => write!(
                f,
                "Node '{}' has {} options (max {})",
                id, count, MAX_BUTTON_OPTIONS
            ),
            FlowIssue::Cycle(ids) => write!(f, "Cycle: {}", ids.join(" -> ")),
        }
    }
}

/// Run every check. Issues come back errors first, then in discovery order.
pub fn check_flow(doc: &FlowDocument) -> Vec<FlowIssue> {
    let mut issues = Vec::new();

    let starts: Vec<String> = doc
        .nodes
        .iter()
        .filter(|n| n.kind() == NodeKind::Start)
        .map(|n| n.id.clone())
        .collect();
    match starts.len() {
        0 => issues.push(FlowIssue::MissingStart),
        1 => {}
        _ => issues.push(FlowIssue::MultipleStarts(starts.clone())),
    }

    let ids: HashSet<&str> = doc.nodes.iter().map(|n| n.id.as_str()).collect();
    for edge in &doc.edges {
        for endpoint in [&edge.source, &edge.target] {
            if !ids.contains(endpoint.as_str()) {
                issues.push(FlowIssue::DanglingEdge {
                    edge: edge.id.clone(),
                    missing: endpoint.clone(),
                });
            }
        }
    }

    for node in &doc.nodes {
        match &node.data {
            NodeData::Message(m) if m.content.trim().is_empty() => {
                issues.push(FlowIssue::EmptyContent(node.id.clone()))
            }
            NodeData::Button(b) => {
                if b.content.trim().is_empty() {
                    issues.push(FlowIssue::EmptyContent(node.id.clone()));
                }
                if b.options.len() > MAX_BUTTON_OPTIONS {
                    issues.push(FlowIssue::TooManyOptions {
                        id: node.id.clone(),
                        count: b.options.len(),
                    });
                }
            }
            _ => {}
        }
    }

    let adjacency = adjacency(doc, &ids);

    if !starts.is_empty() {
        let reachable = reachable_from(&starts, &adjacency);
        for node in &doc.nodes {
            if !reachable.contains(node.id.as_str()) {
                issues.push(FlowIssue::Unreachable(node.id.clone()));
            }
        }
    }

    if let Some(cycle) = find_cycle(doc, &adjacency) {
        issues.push(FlowIssue::Cycle(cycle));
    }

    issues.sort_by_key(|issue| std::cmp::Reverse(issue.severity()));
    issues
}

/// Outgoing neighbours per node, in edge order, ignoring dangling edges.
fn adjacency<'a>(doc: &'a FlowDocument, ids: &HashSet<&str>) -> HashMap<&'a str, Vec<&'a str>> {
    let mut map: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &doc.edges {
        if ids.contains(edge.source.as_str()) && ids.contains(edge.target.as_str()) {
            map.entry(edge.source.as_str()).or_default().push(edge.target.as_str());
        }
    }
    map
}

fn reachable_from<'a>(starts: &'a [String], adjacency: &HashMap<&'a str, Vec<&'a str>>) -> HashSet<&'a str> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = starts.iter().map(String::as_str).collect();
    while let Some(id) = queue.pop_front() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(next) = adjacency.get(id) {
            queue.extend(next.iter().copied());
        }
    }
    seen
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// First cycle found by depth-first search, as the node ids along it with
/// the entry node repeated at the end.
fn find_cycle(doc: &FlowDocument, adjacency: &HashMap<&str, Vec<&str>>) -> Option<Vec<String>> {
    let mut marks: HashMap<&str, Mark> = doc.nodes.iter().map(|n| (n.id.as_str(), Mark::Unvisited)).collect();

    for root in doc.nodes.iter().map(|n| n.id.as_str()) {
        if marks.get(root) != Some(&Mark::Unvisited) {
            continue;
        }
        // (node, next child index)
        let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
        marks.insert(root, Mark::InProgress);

        while let Some((node, child)) = stack.last().copied() {
            let children = adjacency.get(node).map(Vec::as_slice).unwrap_or(&[]);
            if let Some(&next) = children.get(child) {
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                match marks.get(next).copied().unwrap_or(Mark::Done) {
                    Mark::Unvisited => {
                        marks.insert(next, Mark::InProgress);
                        stack.push((next, 0));
                    }
                    Mark::InProgress => {
                        let start = stack.iter().position(|(id, _)| *id == next).unwrap_or(0);
                        let mut cycle: Vec<String> = stack[start..].iter().map(|(id, _)| id.to_string()).collect();
                        cycle.push(next.to_string());
                        return Some(cycle);
                    }
                    Mark::Done => {}
                }
            } else {
                marks.insert(node, Mark::Done);
                stack.pop();
            }
        }
    }
    None
}
