use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

// Process-wide counter backing vertex identity.  Ids must stay unique across graphs,
// including graphs being built concurrently on different threads.
static NEXT_VERTEX_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_vertex_id() -> u64 {
    NEXT_VERTEX_ID.fetch_add(1, Ordering::Relaxed)
}

/**
 * A graph vertex containing a sequence of bases and a unique identifier that
 * allows multiple distinct nodes in the graph to have the same sequence.
 *
 * This is essential when isolating low complexity graphs, regions where the same
 * kmer occurs at multiple graph positions and must not collapse into one vertex.
 */
pub trait BaseVertex: Debug + Clone + Eq + PartialEq + Hash + Send + Sync {
    /**
     * Create a new sequence vertex with the given sequence.  The vertex receives a
     * process-unique id at construction.
     */
    fn new(sequence: Vec<u8>) -> Self;

    /**
     * The process-unique id of this vertex.  Two vertices are equal iff their ids are equal.
     */
    fn get_id(&self) -> u64;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /**
     * Get the sequence of bases contained in this vertex
     *
     * Do not modify these bytes in any way!
     */
    fn get_sequence(&self) -> &[u8];

    /**
     * Get the sequence unique to this vertex.  May differ from get_sequence() if this vertex
     * only carries part of its sequence uniquely (e.g., the suffix base of an interior kmer
     * vertex).  The source flag tells the vertex whether it sits at a graph source, where the
     * full sequence is unique to it.
     */
    fn get_additional_sequence(&self, source: bool) -> &[u8] {
        let _ = source;
        self.get_sequence()
    }

    fn get_sequence_string(&self) -> String {
        String::from_utf8_lossy(self.get_sequence()).into_owned()
    }

    /**
     * Set additional debugging information for this vertex, carried into DOT dumps
     */
    fn set_additional_info(&mut self, info: String);

    fn get_additional_info(&self) -> &str;

    /**
     * A DOT-safe, unique name for this vertex
     */
    fn to_string(&self) -> String;
}
