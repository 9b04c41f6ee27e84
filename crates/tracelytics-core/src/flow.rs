//! Folds referrer flows from many traces into one deduplicated, laid-out
//! navigation graph.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LayoutConfig;
use crate::format::url_label;
use crate::trace::{FlowType, TraceRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowNodeKind {
    Source,
    Landing,
    Internal,
    Conversion,
    Exit,
}

impl FlowNodeKind {
    /// Column of the layered layout, left to right.
    pub fn layer(self) -> u8 {
        match self {
            Self::Source => 0,
            Self::Landing => 1,
            Self::Internal => 2,
            Self::Conversion | Self::Exit => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: FlowNodeKind,
    /// Occurrences as a flow source or destination, not unique visitors.
    pub count: u64,
    pub layer: u8,
    pub position: Position,
}

impl FlowNode {
    /// Short label for rendering: the URL path, or host for bare origins.
    pub fn label(&self) -> String {
        url_label(&self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
    pub source_url: String,
    pub target_url: String,
    pub count: u64,
    /// True when any trace that walked this edge converted.
    pub converted: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    /// No trace carried flow data. Renderers show a "no data" state.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, url: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.url == url)
    }

    pub fn edge(&self, source_url: &str, target_url: &str) -> Option<&FlowEdge> {
        self.edges
            .iter()
            .find(|e| e.source_url == source_url && e.target_url == target_url)
    }
}

/// Node accumulated before layout.
struct PendingNode {
    url: String,
    kind: FlowNodeKind,
    count: u64,
}

#[derive(Default)]
struct GraphBuilder {
    nodes: Vec<PendingNode>,
    node_index: HashMap<String, usize>,
    edges: Vec<FlowEdge>,
    edge_index: HashMap<(String, String), usize>,
}

impl GraphBuilder {
    /// Counts one occurrence of `url`. The kind of the first occurrence sticks.
    fn touch_node(&mut self, url: &str, kind: FlowNodeKind) {
        match self.node_index.get(url) {
            Some(&idx) => self.nodes[idx].count += 1,
            None => {
                self.node_index.insert(url.to_string(), self.nodes.len());
                self.nodes.push(PendingNode {
                    url: url.to_string(),
                    kind,
                    count: 1,
                });
            }
        }
    }

    fn touch_edge(&mut self, source_url: &str, target_url: &str, converted: bool) {
        let key = (source_url.to_string(), target_url.to_string());
        match self.edge_index.get(&key) {
            Some(&idx) => {
                let edge = &mut self.edges[idx];
                edge.count += 1;
                edge.converted |= converted;
            }
            None => {
                self.edge_index.insert(key, self.edges.len());
                self.edges.push(FlowEdge {
                    source_url: source_url.to_string(),
                    target_url: target_url.to_string(),
                    count: 1,
                    converted,
                });
            }
        }
    }

    fn add_trace(&mut self, trace: &TraceRecord) -> bool {
        let flows = trace.flows();
        let Some(first) = flows.first() else {
            return false;
        };
        let entry_kind = if first.flow_type == FlowType::External {
            FlowNodeKind::Source
        } else {
            FlowNodeKind::Landing
        };
        let exit_kind = if trace.is_converted() {
            FlowNodeKind::Conversion
        } else {
            FlowNodeKind::Exit
        };
        let last = flows.len() - 1;

        for (i, flow) in flows.iter().enumerate() {
            let source_kind = if i == 0 {
                entry_kind
            } else {
                FlowNodeKind::Internal
            };
            self.touch_node(&flow.source_url, source_kind);

            let destination_kind = if i == last {
                exit_kind
            } else {
                FlowNodeKind::Internal
            };
            self.touch_node(&flow.destination_url, destination_kind);

            self.touch_edge(&flow.source_url, &flow.destination_url, trace.is_converted());
        }
        true
    }

    /// Stacks each layer's nodes vertically around y = 0, one column per layer.
    fn finish(self, layout: &LayoutConfig) -> FlowGraph {
        let mut layers: [Vec<PendingNode>; 4] = Default::default();
        for node in self.nodes {
            layers[usize::from(node.kind.layer())].push(node);
        }

        let mut nodes = Vec::with_capacity(layers.iter().map(Vec::len).sum());
        for (layer, members) in layers.into_iter().enumerate() {
            let start_y = -(members.len() as f64 * layout.row_height) / 2.0;
            let x = layer as f64 * layout.column_width;
            for (row, node) in members.into_iter().enumerate() {
                nodes.push(FlowNode {
                    layer: node.kind.layer(),
                    url: node.url,
                    kind: node.kind,
                    count: node.count,
                    position: Position {
                        x,
                        y: start_y + row as f64 * layout.row_height,
                    },
                });
            }
        }

        FlowGraph {
            nodes,
            edges: self.edges,
        }
    }
}

/// Builds the referral flow graph for `traces`.
///
/// Traces without referrer flows contribute nothing. Output is fully
/// determined by the input order: nodes come out layer by layer in
/// first-encounter order, edges in first-encounter order.
pub fn build_flow_graph(traces: &[TraceRecord], layout: &LayoutConfig) -> FlowGraph {
    let mut builder = GraphBuilder::default();
    let mut skipped = 0usize;
    for trace in traces {
        if !builder.add_trace(trace) {
            skipped += 1;
        }
    }

    let graph = builder.finish(layout);
    debug!(
        traces = traces.len(),
        skipped,
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "built flow graph"
    );
    graph
}
