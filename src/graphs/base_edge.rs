use std::fmt::Debug;
use std::hash::Hash;

/**
 * Simple edge class for connecting nodes in the graph.
 *
 * Works with all graphs of the assembly engine.  An edge knows whether it lies on the
 * reference path and how many times its transition was observed across all inputs.
 */
pub trait BaseEdge: Debug + Clone + Eq + PartialEq + Hash + Send + Sync {
    /**
     * Create a new edge with the given is_ref flag and multiplicity.  The
     * single_sample_capacity argument sizes per-sample accounting for edge types that
     * keep it; edge types without per-sample state ignore it.
     */
    fn new(is_ref: bool, multiplicity: usize, single_sample_capacity: usize) -> Self;

    /**
     * The number of observations of paths connecting the two vertices, all samples combined
     */
    fn get_multiplicity(&self) -> usize;

    /**
     * Increase the multiplicity of this edge by incr
     */
    fn inc_multiplicity(&mut self, incr: usize);

    fn set_multiplicity(&mut self, value: usize);

    /**
     * The multiplicity that pruning decisions should be based on
     */
    fn get_pruning_multiplicity(&self) -> usize;

    /**
     * Does this edge indicate a path through the reference graph?
     */
    fn is_ref(&self) -> bool;

    fn set_is_ref(&mut self, is_ref: bool);

    /**
     * Add the contents of edge to this edge, merging the two.  Used when a parallel edge
     * would otherwise be created between an ordered pair of vertices.
     */
    fn add(&mut self, edge: Self);

    /**
     * The string to print for this edge in DOT dumps
     */
    fn get_dot_label(&self) -> String {
        self.get_multiplicity().to_string()
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct BaseEdgeStruct {
    pub multiplicity: usize,
    pub is_ref: bool,
}

impl BaseEdge for BaseEdgeStruct {
    fn new(is_ref: bool, multiplicity: usize, _single_sample_capacity: usize) -> Self {
        BaseEdgeStruct {
            multiplicity,
            is_ref,
        }
    }

    fn get_multiplicity(&self) -> usize {
        self.multiplicity
    }

    fn inc_multiplicity(&mut self, incr: usize) {
        self.multiplicity += incr;
    }

    fn set_multiplicity(&mut self, value: usize) {
        self.multiplicity = value;
    }

    fn get_pruning_multiplicity(&self) -> usize {
        self.multiplicity
    }

    fn is_ref(&self) -> bool {
        self.is_ref
    }

    fn set_is_ref(&mut self, is_ref: bool) {
        self.is_ref = is_ref;
    }

    fn add(&mut self, edge: Self) {
        self.multiplicity += edge.multiplicity;
        self.is_ref = self.is_ref || edge.is_ref;
    }
}
