use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use hashlink::LinkedHashMap;
use petgraph::stable_graph::{EdgeIndex, NodeIndex};
use rayon::prelude::*;
use rust_htslib::bam::record::{Cigar, CigarString};

use crate::assembly::kmer::Kmer;
use crate::assembly::kmer_counter::KmerCounter;
use crate::graphs::base_edge::{BaseEdge, BaseEdgeStruct};
use crate::graphs::base_graph::BaseGraph;
use crate::graphs::base_vertex::BaseVertex;
use crate::graphs::multi_sample_edge::MultiSampleEdge;
use crate::graphs::seq_graph::SeqGraph;
use crate::read_threading::multi_debruijn_vertex::MultiDeBruijnVertex;
use crate::reads::assembly_read::AssemblyRead;
use crate::reads::cigar_utils::CigarUtils;
use crate::smith_waterman::smith_waterman_aligner::{
    OverhangStrategy, SmithWatermanAligner, STANDARD_NGS,
};

/**
 * The sample the reference sequence is threaded under, separating it from every read sample
 */
pub const ANONYMOUS_SAMPLE: &str = "XXX_UNNAMED_XXX";

const MAX_CIGAR_COMPLEXITY: usize = 3;

/**
 * Keeps track of the information needed to add a sequence to the read threading assembly
 * graph.  The bases are shared with the source read, so the kmers cut from this sequence
 * all window one allocation.
 */
#[derive(Debug, Clone)]
pub struct SequenceForKmers {
    pub name: String,
    pub sequence: Arc<[u8]>,
    pub start: usize,
    pub stop: usize,
    pub count: usize,
    pub is_ref: bool,
}

impl SequenceForKmers {
    pub fn new(
        name: String,
        sequence: Arc<[u8]>,
        start: usize,
        stop: usize,
        count: usize,
        is_ref: bool,
    ) -> SequenceForKmers {
        assert!(stop > start, "stop must be > start");
        assert!(count > 0, "count must be > 0");
        SequenceForKmers {
            name,
            sequence,
            start,
            stop,
            count,
            is_ref,
        }
    }
}

enum TraversalDirection {
    Downwards,
    Upwards,
}

// the intermediate state of a dangling branch recovery attempt: the two paths being merged
// and the Smith-Waterman alignment between their base strings
struct DanglingChainMergeHelper {
    dangling_path: Vec<NodeIndex>,
    reference_path: Vec<NodeIndex>,
    dangling_path_string: Vec<u8>,
    reference_path_string: Vec<u8>,
    cigar: CigarString,
}

/**
 * Read threading assembly graph.
 *
 * Builds a kmer-indexed de Bruijn multigraph from a reference sequence and a collection of
 * reads, one sample at a time.  Non-unique kmers (those occurring more than once within a
 * single input sequence) never act as merge anchors; they become separate graph positions.
 * After building, dangling tails and heads left by sequencing artifacts can be realigned
 * onto the reference path via Smith-Waterman and merged back in.
 */
#[derive(Debug, Clone)]
pub struct ReadThreadingGraph {
    pub base_graph: BaseGraph<MultiDeBruijnVertex, MultiSampleEdge>,
    min_base_quality_to_use_in_assembly: u8,
    num_pruning_samples: usize,
    debug_graph_transformations: bool,

    // sequences added for processing, grouped by sample in insertion order
    pending: LinkedHashMap<String, Vec<SequenceForKmers>>,

    // a map from kmers -> the vertex that represents them, for kmers proven unique within
    // all input sequences
    unique_kmers: HashMap<Kmer, NodeIndex>,

    // kmers that appear more than once within at least one input sequence, and therefore
    // cannot anchor a threading merge
    non_unique_kmers: HashSet<Kmer>,

    // the kmer at the start of the reference sequence
    ref_source: Option<Kmer>,

    already_built: bool,

    start_threading_only_at_existing_vertex: bool,
    increase_counts_through_branches: bool,

    // positive values override the computed mismatch budget of dangling head recovery
    max_mismatches_in_dangling_head: i32,
}

impl ReadThreadingGraph {
    pub fn new(
        kmer_size: usize,
        debug_graph_transformations: bool,
        min_base_quality_to_use_in_assembly: u8,
        num_pruning_samples: usize,
    ) -> ReadThreadingGraph {
        assert!(kmer_size >= 1, "kmer_size must be >= 1 but got {}", kmer_size);
        assert!(
            num_pruning_samples >= 1,
            "num_pruning_samples must be >= 1 but got {}",
            num_pruning_samples
        );
        ReadThreadingGraph {
            base_graph: BaseGraph::new(kmer_size),
            min_base_quality_to_use_in_assembly,
            num_pruning_samples,
            debug_graph_transformations,
            pending: LinkedHashMap::new(),
            unique_kmers: HashMap::new(),
            non_unique_kmers: HashSet::new(),
            ref_source: None,
            already_built: false,
            start_threading_only_at_existing_vertex: false,
            increase_counts_through_branches: false,
            max_mismatches_in_dangling_head: -1,
        }
    }

    pub fn get_kmer_size(&self) -> usize {
        self.base_graph.get_kmer_size()
    }

    pub fn is_already_built(&self) -> bool {
        self.already_built
    }

    pub fn set_threading_start_only_at_existing_vertex(&mut self, value: bool) {
        self.start_threading_only_at_existing_vertex = value;
    }

    pub fn set_increase_counts_through_branches(&mut self, value: bool) {
        self.increase_counts_through_branches = value;
    }

    pub fn set_max_mismatches_in_dangling_head(&mut self, value: i32) {
        self.max_mismatches_in_dangling_head = value;
    }

    pub fn get_non_unique_kmers(&self) -> &HashSet<Kmer> {
        &self.non_unique_kmers
    }

    pub fn get_unique_kmer_vertex(&self, kmer: &Kmer) -> Option<NodeIndex> {
        self.unique_kmers.get(kmer).copied()
    }

    pub fn has_cycles(&self) -> bool {
        self.base_graph.has_cycles()
    }

    /**
     * Add the reference sequence, to be threaded under the anonymous sample
     */
    pub fn add_reference_sequence(&mut self, sequence: &[u8]) {
        let stop = sequence.len();
        self.add_sequence("ref".to_string(), ANONYMOUS_SAMPLE, sequence, 0, stop, 1, true);
    }

    /**
     * Add a sequence of bases to the graph for future threading
     *
     * @param name a useful name for debugging purposes
     * @param sample_name the sample the sequence was drawn from
     * @param start the first base (inclusive) within sequence to use
     * @param stop the last base (exclusive) within sequence to use
     * @param count the representative count of this sequence
     * @param is_ref true if this is the reference sequence
     */
    #[allow(clippy::too_many_arguments)]
    pub fn add_sequence(
        &mut self,
        name: String,
        sample_name: &str,
        sequence: &[u8],
        start: usize,
        stop: usize,
        count: usize,
        is_ref: bool,
    ) {
        assert!(
            stop <= sequence.len() && start < stop,
            "invalid bounds [{}, {}) for sequence {} of length {}",
            start,
            stop,
            name,
            sequence.len()
        );
        assert!(
            stop - start >= self.get_kmer_size(),
            "sequence {} spans {} bases but the kmer size is {}",
            name,
            stop - start,
            self.get_kmer_size()
        );
        self.add_sequence_for_kmers(
            sample_name.to_string(),
            SequenceForKmers::new(name, Arc::from(sequence), start, stop, count, is_ref),
        );
    }

    /**
     * Add a read to the sequence graph.  Finds maximal consecutive runs of bases usable for
     * assembly (no Ns, quality at least min_base_quality_to_use_in_assembly) and long enough
     * to overlap at least one kmer, and enqueues each under the read's sample.
     */
    pub fn add_read(&mut self, read: &AssemblyRead) {
        let sequence: Arc<[u8]> = Arc::from(read.bases());
        let qualities = read.base_qualities();
        let kmer_size = self.get_kmer_size();

        let mut last_good: i64 = -1;
        for end in 0..=sequence.len() {
            if end == sequence.len()
                || !self.base_is_usable_for_assembly(sequence[end], qualities[end])
            {
                // the current base is bad or we've reached the end: emit the previous good
                // run if it was long enough to get any value out of
                let start = last_good;
                let len = end as i64 - start;
                if start != -1 && len >= kmer_size as i64 {
                    let name = format!("{}_{}_{}", read.name(), start, end);
                    self.add_sequence_for_kmers(
                        read.sample_name().to_string(),
                        SequenceForKmers::new(
                            name,
                            Arc::clone(&sequence),
                            start as usize,
                            end,
                            1,
                            false,
                        ),
                    );
                }
                last_good = -1;
            } else if last_good == -1 {
                last_good = end as i64;
            }
        }
    }

    fn base_is_usable_for_assembly(&self, base: u8, qual: u8) -> bool {
        base != b'N' && qual >= self.min_base_quality_to_use_in_assembly
    }

    fn add_sequence_for_kmers(&mut self, sample_name: String, seq_for_kmers: SequenceForKmers) {
        assert!(
            !self.already_built,
            "Attempting to add sequence {} to a graph that has already been built",
            seq_for_kmers.name
        );
        self.pending
            .entry(sample_name)
            .or_insert_with(Vec::new)
            .push(seq_for_kmers);
    }

    /**
     * Build the read threading assembly graph if it hasn't already been constructed from the
     * sequences that have been added to the graph.  Idempotent.
     */
    pub fn build_graph_if_necessary(&mut self) {
        if self.already_built {
            return;
        }

        // capture the set of non-unique kmers for the given kmer size
        let kmer_size = self.get_kmer_size();
        let (_, non_uniques) = self.determine_kmer_size_and_non_uniques(kmer_size, kmer_size);
        self.non_unique_kmers = non_uniques;

        // go through the pending sequences and thread them into the graph, one sample group
        // at a time, rotating the per-sample edge counters between groups
        let pending = std::mem::take(&mut self.pending);
        for (_sample, sequences_for_sample) in pending.iter() {
            for seq_for_kmers in sequences_for_sample {
                self.thread_sequence(seq_for_kmers);
            }
            let edges = self.base_graph.graph.edge_indices().collect::<Vec<EdgeIndex>>();
            for e in edges {
                self.base_graph.graph[e].flush_single_sample_multiplicity();
            }
        }

        self.already_built = true;
    }

    /**
     * Compute the smallest kmer size in [min_kmer_size, max_kmer_size] for which no input
     * sequence contains a repeated kmer, together with the union of non-unique kmers at the
     * returned size.  Sequences that stop producing non-unique kmers are dropped from
     * consideration at subsequent sizes.  If every candidate size has repeats, returns
     * max_kmer_size and its non-unique set.
     */
    pub fn determine_kmer_size_and_non_uniques(
        &self,
        min_kmer_size: usize,
        max_kmer_size: usize,
    ) -> (usize, HashSet<Kmer>) {
        let mut with_non_uniques = self
            .pending
            .values()
            .flatten()
            .collect::<Vec<&SequenceForKmers>>();
        let mut non_unique_kmers = HashSet::new();

        let mut kmer_size = min_kmer_size;
        while kmer_size <= max_kmer_size {
            non_unique_kmers.clear();

            let per_sequence = with_non_uniques
                .par_iter()
                .map(|seq| Self::determine_non_unique_kmers(seq, kmer_size))
                .collect::<Vec<Vec<Kmer>>>();

            let mut still_non_unique = Vec::with_capacity(with_non_uniques.len());
            for (seq, non_uniques_from_seq) in with_non_uniques.iter().zip(per_sequence) {
                if !non_uniques_from_seq.is_empty() {
                    non_unique_kmers.extend(non_uniques_from_seq);
                    still_non_unique.push(*seq);
                }
            }
            with_non_uniques = still_non_unique;

            if non_unique_kmers.is_empty() {
                // this kmer size produces no non-unique kmers, so use it
                break;
            }
            kmer_size += 1;
        }

        (kmer_size.min(max_kmer_size), non_unique_kmers)
    }

    /**
     * The kmers occurring more than once in the sliding kmer stream of the sequence
     */
    pub fn determine_non_unique_kmers(
        seq_for_kmers: &SequenceForKmers,
        kmer_size: usize,
    ) -> Vec<Kmer> {
        if seq_for_kmers.stop < seq_for_kmers.start + kmer_size {
            return Vec::new();
        }
        let mut counter = KmerCounter::new(kmer_size);
        let stop_position = seq_for_kmers.stop - kmer_size;
        for i in seq_for_kmers.start..=stop_position {
            counter.add_kmer(
                Kmer::new_with_start_and_length(Arc::clone(&seq_for_kmers.sequence), i, kmer_size),
                1,
            );
        }
        counter.get_kmers_with_counts_at_least(2)
    }

    /**
     * Thread one sequence through the graph
     */
    fn thread_sequence(&mut self, seq_for_kmers: &SequenceForKmers) {
        let kmer_size = self.get_kmer_size();
        let start_pos = match self.find_start(seq_for_kmers) {
            Some(i) => i,
            None => return,
        };

        let starting_vertex = self.get_or_create_kmer_vertex(&seq_for_kmers.sequence, start_pos);

        // increase the counts of all edges incoming into the starting vertex supported by
        // going back in sequence
        let original_kmer = self.base_graph.graph[starting_vertex].get_sequence().to_vec();
        self.increase_counts_in_matched_kmers(
            seq_for_kmers.count,
            starting_vertex,
            &original_kmer,
            kmer_size as i32 - 2,
        );

        if self.debug_graph_transformations {
            self.base_graph.graph[starting_vertex].add_read(seq_for_kmers.name.clone());
        }

        // keep track of information about the reference source
        if seq_for_kmers.is_ref {
            if let Some(prev) = &self.ref_source {
                panic!(
                    "Found two reference source vertices: prev: {}, new: {}",
                    prev, seq_for_kmers.name
                );
            }
            self.ref_source = Some(Kmer::new_with_start_and_length(
                Arc::clone(&seq_for_kmers.sequence),
                seq_for_kmers.start,
                kmer_size,
            ));
        }

        // loop over the remaining bases in the sequence, extending the graph by one base at
        // each point, as appropriate
        let mut vertex = starting_vertex;
        for i in (start_pos + 1)..=(seq_for_kmers.stop - kmer_size) {
            vertex = self.extend_chain_by_one(
                vertex,
                &seq_for_kmers.sequence,
                i,
                seq_for_kmers.count,
                seq_for_kmers.is_ref,
            );
            if self.debug_graph_transformations {
                self.base_graph.graph[vertex].add_read(seq_for_kmers.name.clone());
            }
        }
    }

    /**
     * Find the first position in the sequence eligible to start threading, or None if no
     * position is eligible (in which case the sequence contributes nothing to the graph).
     * The reference always starts at its own beginning.
     */
    fn find_start(&self, seq_for_kmers: &SequenceForKmers) -> Option<usize> {
        if seq_for_kmers.is_ref {
            return Some(seq_for_kmers.start);
        }

        let kmer_size = self.get_kmer_size();
        if seq_for_kmers.stop < seq_for_kmers.start + kmer_size {
            return None;
        }
        for i in seq_for_kmers.start..(seq_for_kmers.stop - kmer_size) {
            let kmer =
                Kmer::new_with_start_and_length(Arc::clone(&seq_for_kmers.sequence), i, kmer_size);
            if self.is_threading_start(&kmer) {
                return Some(i);
            }
        }
        None
    }

    fn is_threading_start(&self, kmer: &Kmer) -> bool {
        if self.start_threading_only_at_existing_vertex {
            self.unique_kmers.contains_key(kmer)
        } else {
            !self.non_unique_kmers.contains(kmer)
        }
    }

    /**
     * Get the unique vertex for kmer, or None if not present
     * @param allow_ref_source if false, the reference source kmer is never returned
     */
    fn get_kmer_vertex(&self, kmer: &Kmer, allow_ref_source: bool) -> Option<NodeIndex> {
        if !allow_ref_source && self.ref_source.as_ref() == Some(kmer) {
            return None;
        }
        self.unique_kmers.get(kmer).copied()
    }

    fn get_or_create_kmer_vertex(&mut self, sequence: &Arc<[u8]>, start: usize) -> NodeIndex {
        let kmer =
            Kmer::new_with_start_and_length(Arc::clone(sequence), start, self.get_kmer_size());
        match self.get_kmer_vertex(&kmer, true) {
            Some(v) => v,
            None => self.create_vertex(kmer),
        }
    }

    /**
     * Create a new vertex for kmer.  Add it to the unique kmer map if it is unique and not
     * already mapped.
     */
    fn create_vertex(&mut self, mut kmer: Kmer) -> NodeIndex {
        let new_vertex = MultiDeBruijnVertex::new(kmer.bases().to_vec());
        let vertex_index = self.base_graph.add_node(new_vertex);
        self.track_kmer(kmer, vertex_index);
        vertex_index
    }

    fn track_kmer(&mut self, kmer: Kmer, vertex: NodeIndex) {
        if !self.non_unique_kmers.contains(&kmer) && !self.unique_kmers.contains_key(&kmer) {
            self.unique_kmers.insert(kmer, vertex);
        }
    }

    /**
     * Propagate the count of a sequence backwards through the chain of vertices matching the
     * starting kmer, so evidence starting mid-graph still supports the edges leading to it
     */
    fn increase_counts_in_matched_kmers(
        &mut self,
        count: usize,
        vertex: NodeIndex,
        original_kmer: &[u8],
        offset: i32,
    ) {
        if offset == -1 {
            return;
        }
        for edge in self.base_graph.incoming_edges_of(vertex) {
            let prev = self.base_graph.get_edge_source(edge);
            let suffix = self.base_graph.graph[prev].get_suffix();
            let seq_base = original_kmer[offset as usize];
            if suffix == seq_base
                && (self.increase_counts_through_branches
                    || self.base_graph.in_degree_of(vertex) == 1)
            {
                self.base_graph.graph[edge].inc_multiplicity(count);
                self.increase_counts_in_matched_kmers(count, prev, original_kmer, offset - 1);
            }
        }
    }

    /**
     * Extend the chain by one, either reusing an existing outgoing edge whose target matches
     * the next base, merging into the unique vertex for the next kmer, or creating a fresh
     * vertex.
     */
    fn extend_chain_by_one(
        &mut self,
        prev_vertex: NodeIndex,
        sequence: &Arc<[u8]>,
        kmer_start: usize,
        count: usize,
        is_ref: bool,
    ) -> NodeIndex {
        let kmer_size = self.get_kmer_size();
        let next_pos = kmer_start + kmer_size - 1;

        for outgoing_edge in self.base_graph.outgoing_edges_of(prev_vertex) {
            let target = self.base_graph.get_edge_target(outgoing_edge);
            if self.base_graph.graph[target].get_suffix() == sequence[next_pos] {
                // we've got a match in the chain, so simply increase the count of the edge
                // and continue
                self.base_graph.graph[outgoing_edge].inc_multiplicity(count);
                return target;
            }
        }

        // none of our outgoing edges had our unique suffix base, so we check for an
        // opportunity to merge back in
        let kmer = Kmer::new_with_start_and_length(Arc::clone(sequence), kmer_start, kmer_size);
        let merge_vertex = self.get_kmer_vertex(&kmer, false);

        // either use our merge vertex, or create a new one in the chain
        let next_vertex = match merge_vertex {
            Some(_) if is_ref => {
                // the reference must never merge into an existing unique vertex; that would
                // create a cycle through the reference path
                debug_assert!(
                    false,
                    "Reference path attempted to merge into an existing unique vertex: {}",
                    kmer
                );
                warn!(
                    "Reference path attempted to merge into an existing unique vertex at {}; \
                     keeping the reference on a fresh vertex",
                    kmer
                );
                self.create_vertex(kmer)
            }
            Some(v) => v,
            None => self.create_vertex(kmer),
        };
        self.base_graph.add_edge(
            prev_vertex,
            next_vertex,
            MultiSampleEdge::new(is_ref, count, self.num_pruning_samples),
        );
        next_vertex
    }

    /**
     * Try to recover dangling tails
     *
     * @param prune_factor the prune factor to use in ignoring chain pieces
     * @param min_dangling_branch_length the minimum length of a dangling branch for us to try to merge it
     * @return the number of tails merged back into the reference path
     */
    pub fn recover_dangling_tails(
        &mut self,
        prune_factor: usize,
        min_dangling_branch_length: usize,
    ) -> usize {
        assert!(
            self.already_built,
            "recover_dangling_tails requires the graph to have already been built"
        );

        let candidates = self
            .base_graph
            .graph
            .node_indices()
            .filter(|v| self.base_graph.out_degree_of(*v) == 0 && !self.base_graph.is_ref_sink(*v))
            .collect::<Vec<NodeIndex>>();

        let mut attempted = 0;
        let mut n_recovered = 0;
        for v in candidates {
            attempted += 1;
            n_recovered += self.recover_dangling_tail(v, prune_factor, min_dangling_branch_length);
        }

        debug!("Recovered {} of {} dangling tails", n_recovered, attempted);
        n_recovered
    }

    /**
     * Try to recover dangling heads
     *
     * @param prune_factor the prune factor to use in ignoring chain pieces
     * @param min_dangling_branch_length the minimum length of a dangling branch for us to try to merge it
     * @return the number of heads merged back into the reference path
     */
    pub fn recover_dangling_heads(
        &mut self,
        prune_factor: usize,
        min_dangling_branch_length: usize,
    ) -> usize {
        assert!(
            self.already_built,
            "recover_dangling_heads requires the graph to have already been built"
        );

        let candidates = self
            .base_graph
            .graph
            .node_indices()
            .filter(|v| self.base_graph.in_degree_of(*v) == 0 && !self.base_graph.is_ref_source(*v))
            .collect::<Vec<NodeIndex>>();

        let mut attempted = 0;
        let mut n_recovered = 0;
        for v in candidates {
            attempted += 1;
            n_recovered += self.recover_dangling_head(v, prune_factor, min_dangling_branch_length);
        }

        debug!("Recovered {} of {} dangling heads", n_recovered, attempted);
        n_recovered
    }

    fn recover_dangling_tail(
        &mut self,
        vertex: NodeIndex,
        prune_factor: usize,
        min_dangling_branch_length: usize,
    ) -> usize {
        assert!(
            self.base_graph.out_degree_of(vertex) == 0,
            "attempting to recover a dangling tail for a vertex that is not a sink"
        );

        // generate the CIGAR string from Smith-Waterman between the dangling tail and
        // reference paths
        let merge_result = match self.generate_cigar_against_downwards_reference_path(
            vertex,
            prune_factor,
            min_dangling_branch_length,
        ) {
            Some(result) => result,
            None => return 0,
        };

        // if the CIGAR is too complex (or couldn't be computed) then we do not allow the
        // merge into the reference path
        if !Self::cigar_is_okay_to_merge(&merge_result.cigar, false, true) {
            return 0;
        }
        self.merge_dangling_tail(merge_result)
    }

    fn recover_dangling_head(
        &mut self,
        vertex: NodeIndex,
        prune_factor: usize,
        min_dangling_branch_length: usize,
    ) -> usize {
        assert!(
            self.base_graph.in_degree_of(vertex) == 0,
            "attempting to recover a dangling head for a vertex that is not a source"
        );

        let merge_result = match self.generate_cigar_against_upwards_reference_path(
            vertex,
            prune_factor,
            min_dangling_branch_length,
        ) {
            Some(result) => result,
            None => return 0,
        };

        if !Self::cigar_is_okay_to_merge(&merge_result.cigar, true, false) {
            return 0;
        }
        self.merge_dangling_head(merge_result)
    }

    /**
     * Determine whether the provided cigar is okay to merge into the reference path
     */
    fn cigar_is_okay_to_merge(
        cigar: &CigarString,
        require_first_element_m: bool,
        require_last_element_m: bool,
    ) -> bool {
        let elements = &cigar.0;
        let num_elements = elements.len();

        // don't allow more than a couple of different ops
        if num_elements == 0 || num_elements > MAX_CIGAR_COMPLEXITY {
            return false;
        }
        if require_first_element_m && !matches!(elements[0], Cigar::Match(_)) {
            return false;
        }
        if require_last_element_m && !matches!(elements[num_elements - 1], Cigar::Match(_)) {
            return false;
        }
        // checks for too many mismatches in the dangling branch happen later in the process
        true
    }

    /**
     * Generate the CIGAR of the dangling tail against the reference path downwards from the
     * lowest common ancestor of the two.
     */
    fn generate_cigar_against_downwards_reference_path(
        &self,
        vertex: NodeIndex,
        prune_factor: usize,
        min_dangling_branch_length: usize,
    ) -> Option<DanglingChainMergeHelper> {
        // while heads can be arbitrarily short, tails absolutely cannot
        let min_tail_path_length = std::cmp::max(1, min_dangling_branch_length);

        // find the path between this vertex and the diverging point from the master path
        let alt_path =
            self.find_path_upwards_to_lowest_common_ancestor(vertex, prune_factor)?;
        if self.base_graph.is_ref_source(alt_path[0]) || alt_path.len() < min_tail_path_length + 1
        {
            return None;
        }

        // now get the reference path from the LCA downwards, blacklisting the edge that
        // enters the dangling branch so the traversal cannot wander back into it
        let blacklisted_edge = self.base_graph.get_edge(alt_path[0], alt_path[1]);
        let ref_path =
            self.get_reference_path(alt_path[0], TraversalDirection::Downwards, blacklisted_edge);

        // create the Smith-Waterman strings to use
        let ref_bases = self.get_bases_for_path(&ref_path, false);
        let alt_bases = self.get_bases_for_path(&alt_path, false);

        // run Smith-Waterman to determine the best alignment (and remove trailing deletions
        // since they aren't interesting)
        let alignment = SmithWatermanAligner::align(
            &ref_bases,
            &alt_bases,
            &STANDARD_NGS,
            OverhangStrategy::LeadingIndel,
        );
        Some(DanglingChainMergeHelper {
            dangling_path: alt_path,
            reference_path: ref_path,
            dangling_path_string: alt_bases,
            reference_path_string: ref_bases,
            cigar: CigarUtils::remove_trailing_deletions(alignment.cigar),
        })
    }

    /**
     * Generate the CIGAR of the dangling head against the reference path upwards from the
     * highest common descendant of the two.  Both base strings are reversed, anchored at the
     * common descendant.
     */
    fn generate_cigar_against_upwards_reference_path(
        &self,
        vertex: NodeIndex,
        prune_factor: usize,
        min_dangling_branch_length: usize,
    ) -> Option<DanglingChainMergeHelper> {
        let alt_path =
            self.find_path_downwards_to_highest_common_descendant_of_reference(vertex, prune_factor)?;
        if self.base_graph.is_ref_sink(alt_path[0])
            || alt_path.len() < min_dangling_branch_length + 1
        {
            return None;
        }

        let ref_path = self.get_reference_path(alt_path[0], TraversalDirection::Upwards, None);

        let ref_bases = self.get_bases_for_path(&ref_path, true);
        let alt_bases = self.get_bases_for_path(&alt_path, true);

        let alignment = SmithWatermanAligner::align(
            &ref_bases,
            &alt_bases,
            &STANDARD_NGS,
            OverhangStrategy::LeadingIndel,
        );
        Some(DanglingChainMergeHelper {
            dangling_path: alt_path,
            reference_path: ref_path,
            dangling_path_string: alt_bases,
            reference_path_string: ref_bases,
            cigar: CigarUtils::remove_trailing_deletions(alignment.cigar),
        })
    }

    /**
     * Walk backwards from the sink through any chain of single-predecessor vertices until
     * reaching a vertex that branches, accumulating the path.  Stretches of the walk below
     * the prune factor are discarded, but the walk continues past them.
     *
     * @return the path, in order from the lowest common ancestor to the sink, or None if the
     *         walk dead-ends or loops before reaching a branching vertex
     */
    fn find_path_upwards_to_lowest_common_ancestor(
        &self,
        vertex: NodeIndex,
        prune_factor: usize,
    ) -> Option<Vec<NodeIndex>> {
        let mut path = VecDeque::new();
        // protects us from riding forever around a cycle
        let mut visited = HashSet::new();

        let mut v = vertex;
        while self.base_graph.in_degree_of(v) == 1 && self.base_graph.out_degree_of(v) < 2 {
            let edge = self.base_graph.incoming_edges_of(v)[0];
            // if the edge has too low a weight, don't use it (or anything accumulated so
            // far) for the path
            if self.base_graph.graph[edge].get_pruning_multiplicity() < prune_factor {
                visited.extend(path.drain(..));
            } else {
                path.push_front(v);
            }
            v = self.base_graph.get_edge_source(edge);
            if visited.contains(&v) {
                return None;
            }
        }
        path.push_front(v);

        if self.base_graph.out_degree_of(v) > 1 {
            Some(path.into_iter().collect())
        } else {
            None
        }
    }

    /**
     * The mirror of find_path_upwards_to_lowest_common_ancestor for dangling heads: walk
     * forwards from the source until reaching a vertex with other incoming edges.
     *
     * @return the path, in order from the highest common descendant to the source, or None
     */
    fn find_path_downwards_to_highest_common_descendant_of_reference(
        &self,
        vertex: NodeIndex,
        prune_factor: usize,
    ) -> Option<Vec<NodeIndex>> {
        let mut path = VecDeque::new();
        let mut visited = HashSet::new();

        let mut v = vertex;
        while self.base_graph.out_degree_of(v) == 1 && self.base_graph.in_degree_of(v) < 2 {
            let edge = self.base_graph.outgoing_edges_of(v)[0];
            if self.base_graph.graph[edge].get_pruning_multiplicity() < prune_factor {
                visited.extend(path.drain(..));
            } else {
                path.push_front(v);
            }
            v = self.base_graph.get_edge_target(edge);
            if visited.contains(&v) {
                return None;
            }
        }
        path.push_front(v);

        if self.base_graph.in_degree_of(v) > 1 {
            Some(path.into_iter().collect())
        } else {
            None
        }
    }

    /**
     * Walk the reference path from start in the given direction, accumulating vertices
     */
    fn get_reference_path(
        &self,
        start: NodeIndex,
        direction: TraversalDirection,
        blacklisted_edge: Option<EdgeIndex>,
    ) -> Vec<NodeIndex> {
        let mut path = Vec::new();
        let mut v = Some(start);
        while let Some(cur) = v {
            path.push(cur);
            v = match direction {
                TraversalDirection::Downwards => {
                    self.base_graph
                        .get_next_reference_vertex(Some(cur), true, blacklisted_edge)
                }
                TraversalDirection::Upwards => {
                    self.base_graph.get_prev_reference_vertex(Some(cur))
                }
            };
        }
        path
    }

    /**
     * The bases corresponding to a path of vertices: each vertex contributes its suffix
     * byte, except that when expand_source is set a graph source contributes its full kmer
     * reversed (used for dangling heads, where paths run backwards from the common
     * descendant)
     */
    fn get_bases_for_path(&self, path: &[NodeIndex], expand_source: bool) -> Vec<u8> {
        let mut bases = Vec::with_capacity(path.len());
        for v in path {
            let vertex = &self.base_graph.graph[*v];
            if expand_source && self.base_graph.is_source(*v) {
                let mut sequence = vertex.get_sequence().to_vec();
                sequence.reverse();
                bases.extend_from_slice(&sequence);
            } else {
                bases.push(vertex.get_suffix());
            }
        }
        bases
    }

    /**
     * Merge a dangling tail into the reference path if the alignment supports it
     *
     * @return 1 if merged, 0 if the merge was refused
     */
    fn merge_dangling_tail(&mut self, merge_result: DanglingChainMergeHelper) -> usize {
        let elements = &merge_result.cigar.0;
        let last_element_length = match &elements[elements.len() - 1] {
            Cigar::Match(len) => *len as usize,
            _ => panic!("The last Cigar element must be an M"),
        };

        let last_ref_index = CigarUtils::get_reference_length(&merge_result.cigar) as i64 - 1;
        let matching_suffix = std::cmp::min(
            Self::longest_suffix_match(
                &merge_result.reference_path_string,
                &merge_result.dangling_path_string,
                last_ref_index,
            ),
            last_element_length,
        );
        if matching_suffix == 0 {
            return 0;
        }

        let read_length = CigarUtils::get_read_length(&merge_result.cigar) as i64;
        let alt_index_to_merge = std::cmp::max(read_length - matching_suffix as i64 - 1, 0) as usize;

        // there is an important edge condition that we need to handle here: Smith-Waterman
        // correctly calculates that there is a deletion, that deletion is left-aligned such
        // that the LCA node is part of that deletion, and the rest of the dangling end is a
        // perfect match to the suffix of the reference path.  In this case we need to push
        // the reference index to merge down one position so that we don't incorrectly cut a
        // base off of the deletion.
        let first_element_is_deletion = matches!(elements[0], Cigar::Del(_));
        let must_handle_leading_deletion_case = first_element_is_deletion
            && (elements[0].len() as i64 + matching_suffix as i64 == last_ref_index + 1);
        let ref_index_to_merge = (last_ref_index - matching_suffix as i64
            + 1
            + if must_handle_leading_deletion_case { 1 } else { 0 })
            as usize;

        // another edge condition occurs here: if Smith-Waterman places the whole tail into
        // an insertion then it will try to merge back to the LCA, which results in a cycle
        // in the graph.  So we do not want to merge in such a case.
        if ref_index_to_merge == 0 {
            return 0;
        }
        if ref_index_to_merge >= merge_result.reference_path.len() {
            return 0;
        }

        // it's safe to merge now
        self.base_graph.add_edge(
            merge_result.dangling_path[alt_index_to_merge],
            merge_result.reference_path[ref_index_to_merge],
            MultiSampleEdge::new(false, 1, self.num_pruning_samples),
        );
        1
    }

    /**
     * Merge a dangling head into the reference path if the alignment supports it
     *
     * @return 1 if merged, 0 if the merge was refused
     */
    fn merge_dangling_head(&mut self, mut merge_result: DanglingChainMergeHelper) -> usize {
        let first_element_length = match &merge_result.cigar.0[0] {
            Cigar::Match(len) => *len as usize,
            _ => panic!("The first Cigar element must be an M"),
        };

        let indexes_to_merge = self.best_prefix_match(
            &merge_result.reference_path_string,
            &merge_result.dangling_path_string,
            first_element_length,
        );
        if indexes_to_merge <= 0 {
            return 0;
        }
        let indexes_to_merge = indexes_to_merge as usize;

        // we can't push back the reference path
        if indexes_to_merge >= merge_result.reference_path.len() - 1 {
            return 0;
        }

        // but we can manipulate the dangling path if we need to
        if indexes_to_merge >= merge_result.dangling_path.len() {
            let num_nodes_to_extend = indexes_to_merge - merge_result.dangling_path.len() + 2;
            if !self.extend_dangling_path_against_reference(&mut merge_result, num_nodes_to_extend)
            {
                return 0;
            }
        }

        self.base_graph.add_edge(
            merge_result.reference_path[indexes_to_merge + 1],
            merge_result.dangling_path[indexes_to_merge],
            MultiSampleEdge::new(false, 1, self.num_pruning_samples),
        );
        1
    }

    /**
     * The index of the last mismatch in the (reversed) reference and dangling head strings
     * that still fits the mismatch budget, scanning positions [0, max_index).  Returns -1 if
     * the budget is exceeded or no mismatch exists.
     */
    fn best_prefix_match(&self, ref_bases: &[u8], alt_bases: &[u8], max_index: usize) -> i64 {
        let max_mismatches = self.get_max_mismatches(max_index);
        let mut mismatches = 0;
        let mut last_mismatch: i64 = -1;
        for index in 0..max_index {
            if ref_bases[index] != alt_bases[index] {
                mismatches += 1;
                if mismatches > max_mismatches {
                    return -1;
                }
                last_mismatch = index as i64;
            }
        }
        last_mismatch
    }

    /**
     * The mismatch budget for a dangling head of the given length: one mismatch per full
     * kmer spanned, at least one, unless overridden
     */
    fn get_max_mismatches(&self, length_of_dangling_branch: usize) -> usize {
        if self.max_mismatches_in_dangling_head > 0 {
            self.max_mismatches_in_dangling_head as usize
        } else {
            std::cmp::max(1, length_of_dangling_branch / self.get_kmer_size())
        }
    }

    /**
     * The dangling head is too short to reach its merge point, so synthesize vertices by
     * extending the head with successive reference bases until it is long enough.  The old
     * source vertex is disconnected and left for the orphan sweep.
     *
     * @return true if the path was extended, false if extension was impossible
     */
    fn extend_dangling_path_against_reference(
        &mut self,
        merge_result: &mut DanglingChainMergeHelper,
        num_nodes_to_extend: usize,
    ) -> bool {
        let index_of_last_dangling_node = merge_result.dangling_path.len() - 1;
        let index_of_ref_node_to_use = index_of_last_dangling_node + num_nodes_to_extend;
        if index_of_ref_node_to_use >= merge_result.reference_path.len() {
            return false;
        }

        let kmer_size = self.get_kmer_size();
        let ref_source_sequence = self.base_graph.graph
            [merge_result.reference_path[index_of_ref_node_to_use]]
            .get_sequence()
            .to_vec();
        if num_nodes_to_extend > ref_source_sequence.len() {
            return false;
        }

        let dangling_source = merge_result.dangling_path.remove(index_of_last_dangling_node);
        let mut sequence_to_extend = Vec::with_capacity(num_nodes_to_extend + kmer_size);
        sequence_to_extend.extend_from_slice(&ref_source_sequence[0..num_nodes_to_extend]);
        sequence_to_extend.extend_from_slice(self.base_graph.graph[dangling_source].get_sequence());

        // clean up the source and its edge
        let source_edge = self.get_heaviest_outgoing_edge(dangling_source);
        let source_edge_multiplicity = self.base_graph.graph[source_edge].get_multiplicity();
        let mut prev_v = self.base_graph.get_edge_target(source_edge);
        self.base_graph.remove_edge(source_edge);

        // extend the path
        for i in (1..=num_nodes_to_extend).rev() {
            let new_v = self
                .base_graph
                .add_node(MultiDeBruijnVertex::new(
                    sequence_to_extend[i..i + kmer_size].to_vec(),
                ));
            self.base_graph.add_edge(
                new_v,
                prev_v,
                MultiSampleEdge::new(false, source_edge_multiplicity, self.num_pruning_samples),
            );
            merge_result.dangling_path.push(new_v);
            prev_v = new_v;
        }
        true
    }

    fn get_heaviest_outgoing_edge(&self, vertex: NodeIndex) -> EdgeIndex {
        self.base_graph
            .outgoing_edges_of(vertex)
            .into_iter()
            .max_by_key(|e| self.base_graph.graph[*e].get_multiplicity())
            .unwrap()
    }

    /**
     * The longest suffix of kmer that matches the suffix of seq truncated at seq_start
     * (inclusive)
     */
    fn longest_suffix_match(seq: &[u8], kmer: &[u8], seq_start: i64) -> usize {
        for len in 1..=kmer.len() as i64 {
            let seq_i = seq_start - len + 1;
            let kmer_i = kmer.len() as i64 - len;
            if seq_i < 0 || seq[seq_i as usize] != kmer[kmer_i as usize] {
                return (len - 1) as usize;
            }
        }
        kmer.len()
    }

    /**
     * Convert this kmer graph to a simple sequence graph, building the kmer graph first if
     * necessary.  The kmer graph is left intact.
     */
    pub fn to_sequence_graph(&mut self) -> SeqGraph<BaseEdgeStruct> {
        self.build_graph_if_necessary();
        self.base_graph.to_sequence_graph()
    }
}
