use std::collections::VecDeque;

use crate::graphs::base_edge::BaseEdge;

/**
 * Edge class for connecting nodes in the graph that tracks some per-sample information.
 *
 * On top of the total multiplicity, this edge keeps a ring of per-sample multiplicities of
 * fixed depth.  The graph rotates the ring at sample boundaries via
 * flush_single_sample_multiplicity(); pruning decisions then use the minimum multiplicity
 * over the samples currently held in the ring, so a chain must be supported in every recent
 * sample to survive pruning.
 */
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct MultiSampleEdge {
    multiplicity: usize,
    is_ref: bool,
    // multiplicity accumulated since the last sample boundary
    current_single_sample_multiplicity: usize,
    // per-sample totals for the most recent single_sample_capacity samples
    single_sample_multiplicities: VecDeque<usize>,
    single_sample_capacity: usize,
}

impl MultiSampleEdge {
    /**
     * Rotate the per-sample ring: record the multiplicity accumulated for the sample that
     * just finished and zero the accumulator for the next one.
     */
    pub fn flush_single_sample_multiplicity(&mut self) {
        self.single_sample_multiplicities
            .push_back(self.current_single_sample_multiplicity);
        if self.single_sample_multiplicities.len() > self.single_sample_capacity {
            self.single_sample_multiplicities.pop_front();
        }
        self.current_single_sample_multiplicity = 0;
    }

    pub fn get_current_single_sample_multiplicity(&self) -> usize {
        self.current_single_sample_multiplicity
    }
}

impl BaseEdge for MultiSampleEdge {
    fn new(is_ref: bool, multiplicity: usize, single_sample_capacity: usize) -> Self {
        assert!(
            single_sample_capacity >= 1,
            "single_sample_capacity must be >= 1 but got {}",
            single_sample_capacity
        );
        MultiSampleEdge {
            multiplicity,
            is_ref,
            current_single_sample_multiplicity: multiplicity,
            single_sample_multiplicities: VecDeque::with_capacity(single_sample_capacity + 1),
            single_sample_capacity,
        }
    }

    fn get_multiplicity(&self) -> usize {
        self.multiplicity
    }

    fn inc_multiplicity(&mut self, incr: usize) {
        self.multiplicity += incr;
        self.current_single_sample_multiplicity += incr;
    }

    fn set_multiplicity(&mut self, value: usize) {
        self.multiplicity = value;
        self.current_single_sample_multiplicity = value;
    }

    /**
     * The minimum per-sample multiplicity over the samples seen so far, or the total
     * multiplicity when no sample boundary has been crossed yet.
     */
    fn get_pruning_multiplicity(&self) -> usize {
        self.single_sample_multiplicities
            .iter()
            .min()
            .copied()
            .unwrap_or(self.multiplicity)
    }

    fn is_ref(&self) -> bool {
        self.is_ref
    }

    fn set_is_ref(&mut self, is_ref: bool) {
        self.is_ref = is_ref;
    }

    fn add(&mut self, edge: Self) {
        self.multiplicity += edge.multiplicity;
        self.current_single_sample_multiplicity += edge.current_single_sample_multiplicity;
        self.is_ref = self.is_ref || edge.is_ref;
    }
}
