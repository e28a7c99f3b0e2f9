use petgraph::stable_graph::NodeIndex;

use crate::graphs::base_edge::BaseEdge;
use crate::graphs::base_graph::BaseGraph;
use crate::graphs::base_vertex::BaseVertex;
use crate::graphs::seq_vertex::SeqVertex;

/**
 * A graph that contains base sequence at each node.  Produced by collapsing a kmer graph;
 * suitable input for haplotype enumeration.
 */
#[derive(Debug, Clone)]
pub struct SeqGraph<E: BaseEdge> {
    pub base_graph: BaseGraph<SeqVertex, E>,
}

impl<E: BaseEdge> SeqGraph<E> {
    /**
     * Construct an empty SeqGraph where we'll add nodes based on a kmer size of kmer
     */
    pub fn new(kmer_size: usize) -> SeqGraph<E> {
        SeqGraph {
            base_graph: BaseGraph::new(kmer_size),
        }
    }

    /**
     * Zip up all of the simple linear chains present in this graph.
     *
     * Merges together all vertices in the graph v1 -> v2 -> ... -> vn (where w -> v means
     * w is the only predecessor of v and v the only successor of w) into a single vertex
     * carrying the concatenated sequence.  Edges into the chain head and out of the chain
     * tail are reattached to the merged vertex unchanged.
     *
     * @return true if any such pair of vertices could be found and merged
     */
    pub fn zip_linear_chains(&mut self) -> bool {
        // create the list of start sites
        let zip_starts = self
            .base_graph
            .graph
            .node_indices()
            .filter(|v| self.is_linear_chain_start(*v))
            .collect::<Vec<NodeIndex>>();
        if zip_starts.is_empty() {
            return false;
        }

        // At this point zip_starts contains all vertices in this graph that might start some
        // linear chain of vertices.  Chains are disjoint, so each can be merged independently.
        let mut merged_one = false;
        for zip_start in zip_starts {
            let linear_chain = self.trace_linear_chain(zip_start);
            merged_one |= self.merge_linear_chain(&linear_chain);
        }
        merged_one
    }

    fn is_linear_chain_start(&self, source: NodeIndex) -> bool {
        if self.base_graph.out_degree_of(source) != 1 {
            return false;
        }
        if self.base_graph.in_degree_of(source) != 1 {
            return true;
        }
        let prev = self.base_graph.incoming_vertices_of(source)[0];
        self.base_graph.out_degree_of(prev) > 1
    }

    /**
     * Get all of the vertices in a linear chain of vertices starting at zip_start.  The
     * chain stops at the first vertex that branches, joins, or changes reference status.
     */
    fn trace_linear_chain(&self, zip_start: NodeIndex) -> Vec<NodeIndex> {
        let mut linear_chain = vec![zip_start];

        // remember the status of the last vertex, the calculation is expensive
        let mut last_is_ref = self.base_graph.is_reference_node(zip_start);
        let mut last = zip_start;
        loop {
            if self.base_graph.out_degree_of(last) != 1 {
                break;
            }
            let target = self.base_graph.outgoing_vertices_of(last)[0];
            if self.base_graph.in_degree_of(target) != 1 || last == target {
                break;
            }
            let target_is_ref = self.base_graph.is_reference_node(target);
            if last_is_ref != target_is_ref {
                break;
            }
            linear_chain.push(target);
            last = target;
            last_is_ref = target_is_ref;
        }
        linear_chain
    }

    /**
     * Merge a linear chain into a single combined vertex, updating the surrounding edges
     */
    fn merge_linear_chain(&mut self, linear_chain: &[NodeIndex]) -> bool {
        if linear_chain.len() < 2 {
            return false;
        }

        let first = linear_chain[0];
        let last = *linear_chain.last().unwrap();

        let mut sequence = Vec::new();
        for v in linear_chain {
            sequence.extend_from_slice(self.base_graph.graph[*v].get_sequence());
        }
        let added_vertex = self.base_graph.add_node(SeqVertex::new(sequence));

        for e in self.base_graph.outgoing_edges_of(last) {
            let target = self.base_graph.get_edge_target(e);
            let weight = self.base_graph.graph[e].clone();
            self.base_graph.add_edge(added_vertex, target, weight);
        }
        for e in self.base_graph.incoming_edges_of(first) {
            let source = self.base_graph.get_edge_source(e);
            let weight = self.base_graph.graph[e].clone();
            self.base_graph.add_edge(source, added_vertex, weight);
        }

        for v in linear_chain {
            self.base_graph.graph.remove_node(*v);
        }
        true
    }
}
