use corella::graphs::base_edge::{BaseEdge, BaseEdgeStruct};
use corella::graphs::base_graph::BaseGraph;
use corella::graphs::base_vertex::BaseVertex;
use corella::read_threading::multi_debruijn_vertex::MultiDeBruijnVertex;

fn mdv(seq: &[u8]) -> MultiDeBruijnVertex {
    MultiDeBruijnVertex::new(seq.to_vec())
}

fn ref_edge(multiplicity: usize) -> BaseEdgeStruct {
    BaseEdgeStruct::new(true, multiplicity, 0)
}

fn alt_edge(multiplicity: usize) -> BaseEdgeStruct {
    BaseEdgeStruct::new(false, multiplicity, 0)
}

#[test]
fn test_degrees_sources_and_sinks() {
    let mut graph: BaseGraph<MultiDeBruijnVertex, BaseEdgeStruct> = BaseGraph::new(3);
    let a = graph.add_node(mdv(b"ACG"));
    let b = graph.add_node(mdv(b"CGT"));
    let c = graph.add_node(mdv(b"GTA"));
    graph.add_edge(a, b, ref_edge(1));
    graph.add_edge(b, c, ref_edge(1));

    assert_eq!(graph.in_degree_of(a), 0);
    assert_eq!(graph.out_degree_of(a), 1);
    assert_eq!(graph.in_degree_of(b), 1);
    assert_eq!(graph.out_degree_of(b), 1);
    assert_eq!(graph.out_degree_of(c), 0);

    assert_eq!(graph.get_sources(), vec![a]);
    assert_eq!(graph.get_sinks(), vec![c]);
    assert!(graph.is_source(a));
    assert!(graph.is_sink(c));
}

#[test]
fn test_add_edge_merges_parallel_edges() {
    let mut graph: BaseGraph<MultiDeBruijnVertex, BaseEdgeStruct> = BaseGraph::new(3);
    let a = graph.add_node(mdv(b"ACG"));
    let b = graph.add_node(mdv(b"CGT"));
    let e1 = graph.add_edge(a, b, alt_edge(1));
    let e2 = graph.add_edge(a, b, alt_edge(2));

    assert_eq!(e1, e2);
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.graph[e1].get_multiplicity(), 3);
}

#[test]
fn test_reference_source_and_sink() {
    let mut graph: BaseGraph<MultiDeBruijnVertex, BaseEdgeStruct> = BaseGraph::new(3);
    let a = graph.add_node(mdv(b"ACG"));
    let b = graph.add_node(mdv(b"CGT"));
    let c = graph.add_node(mdv(b"GTT"));
    let alt = graph.add_node(mdv(b"GTA"));
    graph.add_edge(a, b, ref_edge(1));
    graph.add_edge(b, c, ref_edge(1));
    graph.add_edge(b, alt, alt_edge(1));

    assert_eq!(graph.get_reference_source_vertex(), Some(a));
    assert_eq!(graph.get_reference_sink_vertex(), Some(c));
    assert!(graph.is_ref_source(a));
    assert!(!graph.is_ref_source(b));
    assert!(graph.is_ref_sink(c));
    assert!(!graph.is_ref_sink(alt));
    assert!(graph.is_reference_node(b));
    assert!(!graph.is_reference_node(alt));
}

#[test]
fn test_next_and_prev_reference_vertex() {
    let mut graph: BaseGraph<MultiDeBruijnVertex, BaseEdgeStruct> = BaseGraph::new(3);
    let a = graph.add_node(mdv(b"ACG"));
    let b = graph.add_node(mdv(b"CGT"));
    let alt = graph.add_node(mdv(b"CGA"));
    graph.add_edge(a, b, ref_edge(1));
    graph.add_edge(a, alt, alt_edge(1));

    assert_eq!(graph.get_next_reference_vertex(Some(a), false, None), Some(b));
    assert_eq!(graph.get_prev_reference_vertex(Some(b)), Some(a));
    assert_eq!(graph.get_prev_reference_vertex(Some(alt)), None);
    assert_eq!(graph.get_next_reference_vertex(None, false, None), None);
}

#[test]
fn test_next_reference_vertex_follows_single_non_ref_edge() {
    let mut graph: BaseGraph<MultiDeBruijnVertex, BaseEdgeStruct> = BaseGraph::new(3);
    let a = graph.add_node(mdv(b"ACG"));
    let b = graph.add_node(mdv(b"CGT"));
    let c = graph.add_node(mdv(b"CGA"));
    let ab = graph.add_edge(a, b, alt_edge(1));

    // no ref edge: the single outgoing non-ref edge is followed only when allowed
    assert_eq!(graph.get_next_reference_vertex(Some(a), false, None), None);
    assert_eq!(graph.get_next_reference_vertex(Some(a), true, None), Some(b));

    // with two outgoing candidates the walk stops, unless one is blacklisted
    graph.add_edge(a, c, alt_edge(1));
    assert_eq!(graph.get_next_reference_vertex(Some(a), true, None), None);
    assert_eq!(
        graph.get_next_reference_vertex(Some(a), true, Some(ab)),
        Some(c)
    );
}

#[test]
fn test_get_reference_bytes() {
    let mut graph: BaseGraph<MultiDeBruijnVertex, BaseEdgeStruct> = BaseGraph::new(3);
    let a = graph.add_node(mdv(b"ACG"));
    let b = graph.add_node(mdv(b"CGT"));
    let c = graph.add_node(mdv(b"GTA"));
    graph.add_edge(a, b, ref_edge(1));
    graph.add_edge(b, c, ref_edge(1));

    assert_eq!(graph.get_reference_bytes(a, Some(c), true, true), b"ACGTA");
    assert_eq!(graph.get_reference_bytes(a, Some(c), true, false), b"ACGT");
    assert_eq!(graph.get_reference_bytes(a, Some(c), false, true), b"TA");
    assert_eq!(graph.get_reference_bytes(a, None, true, false), b"ACGTA");
}

#[test]
fn test_has_cycles() {
    let mut graph: BaseGraph<MultiDeBruijnVertex, BaseEdgeStruct> = BaseGraph::new(3);
    let a = graph.add_node(mdv(b"ACG"));
    let b = graph.add_node(mdv(b"CGT"));
    let c = graph.add_node(mdv(b"GTA"));
    graph.add_edge(a, b, ref_edge(1));
    graph.add_edge(b, c, ref_edge(1));
    assert!(!graph.has_cycles());

    graph.add_edge(c, a, alt_edge(1));
    assert!(graph.has_cycles());
}

#[test]
fn test_prune_low_weight_chains() {
    let mut graph: BaseGraph<MultiDeBruijnVertex, BaseEdgeStruct> = BaseGraph::new(4);
    let a = graph.add_node(mdv(b"AAAC"));
    let b = graph.add_node(mdv(b"AACC"));
    let c = graph.add_node(mdv(b"ACCC"));
    let weak1 = graph.add_node(mdv(b"AACT"));
    let weak2 = graph.add_node(mdv(b"ACTC"));
    graph.add_edge(a, b, ref_edge(1));
    graph.add_edge(b, c, ref_edge(1));
    graph.add_edge(a, weak1, alt_edge(1));
    graph.add_edge(weak1, weak2, alt_edge(1));
    graph.add_edge(weak2, c, alt_edge(1));

    // everything survives a prune factor of 1
    graph.prune_low_weight_chains(1);
    assert_eq!(graph.vertex_count(), 5);
    assert_eq!(graph.edge_count(), 5);

    // a prune factor of 2 removes the weak branch but never the reference path
    graph.prune_low_weight_chains(2);
    assert_eq!(graph.vertex_count(), 3);
    assert_eq!(graph.edge_count(), 2);
    assert!(graph.get_reference_source_vertex().is_some());
    assert!(graph.get_reference_sink_vertex().is_some());
}

#[test]
fn test_clean_non_ref_paths() {
    let mut graph: BaseGraph<MultiDeBruijnVertex, BaseEdgeStruct> = BaseGraph::new(3);
    let pre = graph.add_node(mdv(b"TAC"));
    let a = graph.add_node(mdv(b"ACG"));
    let b = graph.add_node(mdv(b"CGT"));
    let c = graph.add_node(mdv(b"GTA"));
    let post = graph.add_node(mdv(b"TAG"));
    graph.add_edge(pre, a, alt_edge(1));
    graph.add_edge(a, b, ref_edge(1));
    graph.add_edge(b, c, ref_edge(1));
    graph.add_edge(c, post, alt_edge(1));

    graph.clean_non_ref_paths();

    assert_eq!(graph.vertex_count(), 3);
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.get_sources(), vec![a]);
    assert_eq!(graph.get_sinks(), vec![c]);
}

#[test]
fn test_remove_paths_not_connected_to_ref() {
    let mut graph: BaseGraph<MultiDeBruijnVertex, BaseEdgeStruct> = BaseGraph::new(3);
    let a = graph.add_node(mdv(b"ACG"));
    let b = graph.add_node(mdv(b"CGT"));
    let c = graph.add_node(mdv(b"GTA"));
    let dead_end = graph.add_node(mdv(b"CGA"));
    graph.add_edge(a, b, ref_edge(1));
    graph.add_edge(b, c, ref_edge(1));
    graph.add_edge(b, dead_end, alt_edge(1));

    graph.remove_paths_not_connected_to_ref();

    assert_eq!(graph.vertex_count(), 3);
    assert!(!graph.graph.contains_node(dead_end));
    assert_eq!(graph.get_sources().len(), 1);
    assert_eq!(graph.get_sinks().len(), 1);
}

#[test]
fn test_remove_vertices_not_connected_to_ref_regardless_of_edge_direction() {
    let mut graph: BaseGraph<MultiDeBruijnVertex, BaseEdgeStruct> = BaseGraph::new(3);
    let a = graph.add_node(mdv(b"ACG"));
    let b = graph.add_node(mdv(b"CGT"));
    let into_ref = graph.add_node(mdv(b"TAC"));
    let island = graph.add_node(mdv(b"GGG"));
    graph.add_edge(a, b, ref_edge(1));
    graph.add_edge(into_ref, a, alt_edge(1));

    graph.remove_vertices_not_connected_to_ref_regardless_of_edge_direction();

    // the vertex feeding the ref source survives (it is connected, just upstream);
    // the disconnected island does not
    assert!(graph.graph.contains_node(into_ref));
    assert!(!graph.graph.contains_node(island));
    assert_eq!(graph.vertex_count(), 3);
}

#[test]
fn test_remove_singleton_orphan_vertices() {
    let mut graph: BaseGraph<MultiDeBruijnVertex, BaseEdgeStruct> = BaseGraph::new(3);
    let a = graph.add_node(mdv(b"ACG"));
    let b = graph.add_node(mdv(b"CGT"));
    let orphan = graph.add_node(mdv(b"TTT"));
    graph.add_edge(a, b, ref_edge(1));

    graph.remove_singleton_orphan_vertices();
    assert!(!graph.graph.contains_node(orphan));
    assert_eq!(graph.vertex_count(), 2);
}

#[test]
fn test_to_dot_output() {
    let mut graph: BaseGraph<MultiDeBruijnVertex, BaseEdgeStruct> = BaseGraph::new(3);
    let a = graph.add_node(mdv(b"ACG"));
    let b = graph.add_node(mdv(b"CGT"));
    let c = graph.add_node(mdv(b"CGA"));
    graph.add_edge(a, b, ref_edge(5));
    graph.add_edge(a, c, alt_edge(1));

    let dot = graph.to_dot(2);
    assert!(dot.starts_with("digraph assemblyGraphs {"));
    assert!(dot.trim_end().ends_with('}'));
    assert!(dot.contains("color=red"));
    assert!(dot.contains("style=dotted"));
    assert!(dot.contains("style=solid"));
    assert!(dot.contains("shape=box"));
    assert!(dot.contains("label=\"5\""));
}

#[test]
fn test_print_graph_writes_file() {
    let mut graph: BaseGraph<MultiDeBruijnVertex, BaseEdgeStruct> = BaseGraph::new(3);
    let a = graph.add_node(mdv(b"ACG"));
    let b = graph.add_node(mdv(b"CGT"));
    graph.add_edge(a, b, ref_edge(1));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("assembly_graph.dot");
    graph.print_graph(&path, 1).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, graph.to_dot(1));
}

#[test]
fn test_to_sequence_graph_bases() {
    let mut graph: BaseGraph<MultiDeBruijnVertex, BaseEdgeStruct> = BaseGraph::new(3);
    let a = graph.add_node(mdv(b"ACG"));
    let b = graph.add_node(mdv(b"CGT"));
    let c = graph.add_node(mdv(b"GTA"));
    graph.add_edge(a, b, ref_edge(2));
    graph.add_edge(b, c, ref_edge(2));

    let seq_graph = graph.to_sequence_graph();
    assert_eq!(seq_graph.base_graph.vertex_count(), 3);
    assert_eq!(seq_graph.base_graph.edge_count(), 2);

    // the source keeps its full kmer; interior vertices keep only their suffix base
    let source = seq_graph.base_graph.get_reference_source_vertex().unwrap();
    assert_eq!(seq_graph.base_graph.graph[source].get_sequence(), b"ACG");

    let mut bases = Vec::new();
    let mut v = Some(source);
    while let Some(cur) = v {
        bases.extend_from_slice(seq_graph.base_graph.graph[cur].get_sequence());
        v = seq_graph.base_graph.get_next_reference_vertex(Some(cur), false, None);
    }
    assert_eq!(bases, b"ACGTA");

    // edges keep their flags and multiplicities
    let source_edge = seq_graph.base_graph.outgoing_edges_of(source)[0];
    assert!(seq_graph.base_graph.graph[source_edge].is_ref());
    assert_eq!(seq_graph.base_graph.graph[source_edge].get_multiplicity(), 2);
}
