use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use itertools::Itertools;
use petgraph::algo::is_cyclic_directed;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::graphs::base_edge::{BaseEdge, BaseEdgeStruct};
use crate::graphs::base_vertex::BaseVertex;
use crate::graphs::seq_graph::SeqGraph;
use crate::graphs::seq_vertex::SeqVertex;

/**
 * Common code for graphs used for local assembly.
 *
 * A directed graph of sequence vertices.  Parallel edges between the same ordered pair of
 * vertices are disallowed; add_edge merges into an existing edge instead.  The subgraph
 * induced by edges whose is_ref flag is set forms the reference path, a simple cycle-free
 * path from the reference source to the reference sink.
 */
#[derive(Debug, Clone)]
pub struct BaseGraph<V: BaseVertex, E: BaseEdge> {
    pub graph: StableDiGraph<V, E>,
    kmer_size: usize,
}

impl<V: BaseVertex, E: BaseEdge> BaseGraph<V, E> {
    pub fn new(kmer_size: usize) -> BaseGraph<V, E> {
        BaseGraph {
            graph: StableDiGraph::new(),
            kmer_size,
        }
    }

    pub fn get_kmer_size(&self) -> usize {
        self.kmer_size
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn add_node(&mut self, vertex: V) -> NodeIndex {
        self.graph.add_node(vertex)
    }

    /**
     * Add an edge from source to target.  If an edge already connects the pair, the new
     * edge is merged into the existing one rather than creating a parallel edge.
     */
    pub fn add_edge(&mut self, source: NodeIndex, target: NodeIndex, edge: E) -> EdgeIndex {
        match self.graph.find_edge(source, target) {
            Some(existing) => {
                self.graph[existing].add(edge);
                existing
            }
            None => self.graph.add_edge(source, target, edge),
        }
    }

    pub fn get_edge(&self, source: NodeIndex, target: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(source, target)
    }

    pub fn remove_edge(&mut self, edge: EdgeIndex) -> Option<E> {
        self.graph.remove_edge(edge)
    }

    pub fn remove_vertex(&mut self, vertex: NodeIndex) -> Option<V> {
        self.graph.remove_node(vertex)
    }

    pub fn get_edge_source(&self, edge: EdgeIndex) -> NodeIndex {
        self.graph.edge_endpoints(edge).unwrap().0
    }

    pub fn get_edge_target(&self, edge: EdgeIndex) -> NodeIndex {
        self.graph.edge_endpoints(edge).unwrap().1
    }

    pub fn in_degree_of(&self, vertex: NodeIndex) -> usize {
        self.graph
            .edges_directed(vertex, Direction::Incoming)
            .count()
    }

    pub fn out_degree_of(&self, vertex: NodeIndex) -> usize {
        self.graph
            .edges_directed(vertex, Direction::Outgoing)
            .count()
    }

    pub fn incoming_edges_of(&self, vertex: NodeIndex) -> Vec<EdgeIndex> {
        self.graph
            .edges_directed(vertex, Direction::Incoming)
            .map(|e| e.id())
            .collect()
    }

    pub fn outgoing_edges_of(&self, vertex: NodeIndex) -> Vec<EdgeIndex> {
        self.graph
            .edges_directed(vertex, Direction::Outgoing)
            .map(|e| e.id())
            .collect()
    }

    pub fn incoming_vertices_of(&self, vertex: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .neighbors_directed(vertex, Direction::Incoming)
            .collect()
    }

    pub fn outgoing_vertices_of(&self, vertex: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .neighbors_directed(vertex, Direction::Outgoing)
            .collect()
    }

    pub fn is_source(&self, vertex: NodeIndex) -> bool {
        self.in_degree_of(vertex) == 0
    }

    pub fn is_sink(&self, vertex: NodeIndex) -> bool {
        self.out_degree_of(vertex) == 0
    }

    /**
     * All vertices with no incoming edges
     */
    pub fn get_sources(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|v| self.is_source(*v))
            .collect()
    }

    /**
     * All vertices with no outgoing edges
     */
    pub fn get_sinks(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|v| self.is_sink(*v))
            .collect()
    }

    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /**
     * Is the vertex on the reference path at all?
     */
    pub fn is_reference_node(&self, vertex: NodeIndex) -> bool {
        if self
            .graph
            .edges_directed(vertex, Direction::Incoming)
            .chain(self.graph.edges_directed(vertex, Direction::Outgoing))
            .any(|e| e.weight().is_ref())
        {
            return true;
        }
        // edge case: if the graph only has one node then it's a reference node
        self.graph.node_count() == 1
    }

    /**
     * Is the vertex the start of the reference path?  True when no incoming edge is a
     * reference edge but some outgoing edge is.
     */
    pub fn is_ref_source(&self, vertex: NodeIndex) -> bool {
        for e in self.graph.edges_directed(vertex, Direction::Incoming) {
            if e.weight().is_ref() {
                return false;
            }
        }
        for e in self.graph.edges_directed(vertex, Direction::Outgoing) {
            if e.weight().is_ref() {
                return true;
            }
        }
        // edge case: a graph with a single node contains its own reference source
        self.graph.node_count() == 1
    }

    pub fn is_ref_sink(&self, vertex: NodeIndex) -> bool {
        for e in self.graph.edges_directed(vertex, Direction::Outgoing) {
            if e.weight().is_ref() {
                return false;
            }
        }
        for e in self.graph.edges_directed(vertex, Direction::Incoming) {
            if e.weight().is_ref() {
                return true;
            }
        }
        self.graph.node_count() == 1
    }

    pub fn get_reference_source_vertex(&self) -> Option<NodeIndex> {
        self.graph.node_indices().find(|v| self.is_ref_source(*v))
    }

    pub fn get_reference_sink_vertex(&self) -> Option<NodeIndex> {
        self.graph.node_indices().find(|v| self.is_ref_sink(*v))
    }

    /**
     * Traverse the graph and get the next reference vertex if it exists
     * @param vertex the current vertex, can be None
     * @param allow_non_ref_paths if true, allow the traversal to proceed through the single
     *                            outgoing non-reference edge when no reference edge exists
     * @param blacklisted_edge an edge to ignore in the graph, useful to exclude the non-reference
     *                         path, can be None
     */
    pub fn get_next_reference_vertex(
        &self,
        vertex: Option<NodeIndex>,
        allow_non_ref_paths: bool,
        blacklisted_edge: Option<EdgeIndex>,
    ) -> Option<NodeIndex> {
        let vertex = vertex?;

        for e in self.graph.edges_directed(vertex, Direction::Outgoing) {
            if e.weight().is_ref() {
                return Some(e.target());
            }
        }

        if !allow_non_ref_paths {
            return None;
        }

        // singleton or empty set, after removing the blacklisted edge
        let edges = self
            .graph
            .edges_directed(vertex, Direction::Outgoing)
            .filter(|e| blacklisted_edge != Some(e.id()))
            .map(|e| e.target())
            .take(2)
            .collect::<Vec<NodeIndex>>();
        if edges.len() == 1 {
            Some(edges[0])
        } else {
            None
        }
    }

    /**
     * Traverse the graph and get the previous reference vertex if it exists
     */
    pub fn get_prev_reference_vertex(&self, vertex: Option<NodeIndex>) -> Option<NodeIndex> {
        let vertex = vertex?;
        self.graph
            .edges_directed(vertex, Direction::Incoming)
            .find(|e| e.weight().is_ref())
            .map(|e| e.source())
    }

    /**
     * Walk along the reference path in the graph and pull out the corresponding bases.
     *
     * The full sequence of from_vertex is included when include_start is set; subsequent
     * vertices contribute only their additional (suffix) sequence.
     *
     * @param from_vertex the starting vertex in the reference path
     * @param to_vertex the ending vertex in the reference path, or None to walk to the end
     */
    pub fn get_reference_bytes(
        &self,
        from_vertex: NodeIndex,
        to_vertex: Option<NodeIndex>,
        include_start: bool,
        include_stop: bool,
    ) -> Vec<u8> {
        let mut bytes = Vec::new();

        if include_start {
            bytes.extend_from_slice(self.graph[from_vertex].get_sequence());
        }

        let mut v = self.get_next_reference_vertex(Some(from_vertex), true, None);
        while let Some(cur) = v {
            if Some(cur) == to_vertex {
                break;
            }
            bytes.extend_from_slice(self.graph[cur].get_additional_sequence(false));
            v = self.get_next_reference_vertex(Some(cur), true, None);
        }
        if include_stop && v.is_some() && v == to_vertex {
            bytes.extend_from_slice(self.graph[v.unwrap()].get_additional_sequence(false));
        }
        bytes
    }

    /**
     * Remove all vertices that are orphaned by everything else in the graph: those with no
     * incoming and no outgoing edges that are not the reference source.
     */
    pub fn remove_singleton_orphan_vertices(&mut self) {
        let to_remove = self
            .graph
            .node_indices()
            .filter(|v| self.is_source(*v) && self.is_sink(*v) && !self.is_ref_source(*v))
            .collect::<Vec<NodeIndex>>();
        for v in to_remove {
            self.graph.remove_node(v);
        }
    }

    /**
     * Remove all non-reference edges whose pruning multiplicity falls below prune_factor,
     * then sweep the vertices orphaned by the removal.
     */
    pub fn prune_low_weight_chains(&mut self, prune_factor: usize) {
        let edges_to_remove = self
            .graph
            .edge_indices()
            .filter(|e| {
                let weight = &self.graph[*e];
                weight.get_pruning_multiplicity() < prune_factor && !weight.is_ref()
            })
            .collect::<Vec<EdgeIndex>>();
        for e in edges_to_remove {
            self.graph.remove_edge(e);
        }
        self.remove_singleton_orphan_vertices();
    }

    /**
     * Remove edges that are connected before the reference source and after the reference
     * sink: transitively non-reference predecessors of the source and successors of the sink.
     */
    pub fn clean_non_ref_paths(&mut self) {
        let (ref_source, ref_sink) = match (
            self.get_reference_source_vertex(),
            self.get_reference_sink_vertex(),
        ) {
            (Some(source), Some(sink)) => (source, sink),
            _ => return,
        };

        let mut edges_to_check: VecDeque<EdgeIndex> =
            self.incoming_edges_of(ref_source).into_iter().collect();
        let mut seen: HashSet<EdgeIndex> = edges_to_check.iter().copied().collect();
        while let Some(e) = edges_to_check.pop_front() {
            if !self.graph[e].is_ref() {
                let source = self.get_edge_source(e);
                self.graph.remove_edge(e);
                for incoming in self.incoming_edges_of(source) {
                    if seen.insert(incoming) {
                        edges_to_check.push_back(incoming);
                    }
                }
            }
        }

        let mut edges_to_check: VecDeque<EdgeIndex> =
            self.outgoing_edges_of(ref_sink).into_iter().collect();
        let mut seen: HashSet<EdgeIndex> = edges_to_check.iter().copied().collect();
        while let Some(e) = edges_to_check.pop_front() {
            if !self.graph[e].is_ref() {
                let target = self.get_edge_target(e);
                self.graph.remove_edge(e);
                for outgoing in self.outgoing_edges_of(target) {
                    if seen.insert(outgoing) {
                        edges_to_check.push_back(outgoing);
                    }
                }
            }
        }

        self.remove_singleton_orphan_vertices();
    }

    /**
     * Remove all vertices on paths that do not both originate from the reference source and
     * reach the reference sink.  Afterwards the graph has exactly one source and one sink.
     */
    pub fn remove_paths_not_connected_to_ref(&mut self) {
        let ref_source = self
            .get_reference_source_vertex()
            .unwrap_or_else(|| panic!("Graph must have a reference source vertex"));
        let ref_sink = self
            .get_reference_sink_vertex()
            .unwrap_or_else(|| panic!("Graph must have a reference sink vertex"));

        let on_path_from_ref_source = self.reachable_set(ref_source, false, true);
        let on_path_from_ref_sink = self.reachable_set(ref_sink, true, false);

        let vertices_to_remove = self
            .graph
            .node_indices()
            .filter(|v| {
                !(on_path_from_ref_source.contains(v) && on_path_from_ref_sink.contains(v))
            })
            .collect::<Vec<NodeIndex>>();
        for v in vertices_to_remove {
            self.graph.remove_node(v);
        }

        // sanity checks that the algorithm worked
        assert!(
            self.get_sources().len() <= 1,
            "Should have eliminated all but the reference source"
        );
        assert!(
            self.get_sinks().len() <= 1,
            "Should have eliminated all but the reference sink"
        );
    }

    /**
     * Remove all vertices unreachable from the reference source following edges in either
     * direction.
     */
    pub fn remove_vertices_not_connected_to_ref_regardless_of_edge_direction(&mut self) {
        let connected = match self.get_reference_source_vertex() {
            Some(ref_source) => self.reachable_set(ref_source, true, true),
            None => HashSet::new(),
        };
        let to_remove = self
            .graph
            .node_indices()
            .filter(|v| !connected.contains(v))
            .collect::<Vec<NodeIndex>>();
        for v in to_remove {
            self.graph.remove_node(v);
        }
    }

    // breadth-first reachability following incoming and/or outgoing edges
    fn reachable_set(
        &self,
        start: NodeIndex,
        follow_incoming: bool,
        follow_outgoing: bool,
    ) -> HashSet<NodeIndex> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);
        while let Some(v) = queue.pop_front() {
            if follow_outgoing {
                for next in self.graph.neighbors_directed(v, Direction::Outgoing) {
                    if visited.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
            if follow_incoming {
                for next in self.graph.neighbors_directed(v, Direction::Incoming) {
                    if visited.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        visited
    }

    /**
     * Convert this kmer graph to a simple sequence graph.
     *
     * Each vertex becomes a SeqVertex whose sequence is the full kmer sequence for graph
     * sources and the suffix base otherwise; every edge is copied with its is_ref flag and
     * multiplicity.  The input graph is left untouched.
     */
    pub fn to_sequence_graph(&self) -> SeqGraph<BaseEdgeStruct> {
        let mut seq_graph = SeqGraph::new(self.kmer_size);
        let mut vertex_map: HashMap<NodeIndex, NodeIndex> =
            HashMap::with_capacity(self.graph.node_count());

        // create all of the equivalent seq graph vertices
        for v in self.graph.node_indices() {
            let dv = &self.graph[v];
            let mut sv = SeqVertex::new(dv.get_additional_sequence(self.is_source(v)).to_vec());
            sv.set_additional_info(dv.get_additional_info().to_string());
            let sv_index = seq_graph.base_graph.add_node(sv);
            vertex_map.insert(v, sv_index);
        }

        // walk through the nodes and connect them to their equivalent seq vertices
        for e in self.graph.edge_indices() {
            let (source, target) = self.graph.edge_endpoints(e).unwrap();
            let weight = &self.graph[e];
            seq_graph.base_graph.add_edge(
                vertex_map[&source],
                vertex_map[&target],
                BaseEdgeStruct::new(weight.is_ref(), weight.get_multiplicity(), 0),
            );
        }

        seq_graph
    }

    /**
     * The DOT language representation of this graph.  Reference edges are red, edges below
     * the prune factor dotted.
     */
    pub fn to_dot(&self, prune_factor: usize) -> String {
        let mut lines = vec!["digraph assemblyGraphs {".to_string()];

        for e in self.graph.edge_indices() {
            let (source, target) = self.graph.edge_endpoints(e).unwrap();
            let weight = &self.graph[e];
            let style = if weight.get_multiplicity() > 0
                && weight.get_multiplicity() < prune_factor
            {
                "dotted"
            } else {
                "solid"
            };
            let color = if weight.is_ref() { ",color=red" } else { "" };
            lines.push(format!(
                "\t{} -> {} [label=\"{}\",style={}{}];",
                self.graph[source].to_string(),
                self.graph[target].to_string(),
                weight.get_dot_label(),
                style,
                color
            ));
        }

        for v in self.graph.node_indices() {
            let vertex = &self.graph[v];
            lines.push(format!(
                "\t{} [label=\"{}{}\",shape=box];",
                vertex.to_string(),
                vertex.get_sequence_string(),
                vertex.get_additional_info()
            ));
        }

        lines.push("}".to_string());
        lines.iter().join("\n")
    }

    /**
     * Print this graph in DOT format to the given file
     */
    pub fn print_graph<P: AsRef<Path>>(&self, path: P, prune_factor: usize) -> anyhow::Result<()> {
        let mut file = File::create(path.as_ref())
            .with_context(|| format!("failed to create {}", path.as_ref().display()))?;
        file.write_all(self.to_dot(prune_factor).as_bytes())
            .with_context(|| format!("failed to write {}", path.as_ref().display()))?;
        Ok(())
    }
}
