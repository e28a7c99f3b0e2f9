use std::hash::{Hash, Hasher};

use crate::graphs::base_vertex::{next_vertex_id, BaseVertex};

/**
 * A vertex in a read-threading graph: one occurrence of a kmer.
 *
 * Identity is the process-unique id assigned at construction, never the sequence; non-unique
 * kmers legitimately occupy several graph positions with identical bases.
 */
#[derive(Debug, Clone)]
pub struct MultiDeBruijnVertex {
    pub sequence: Vec<u8>,
    additional_info: String,
    id: u64,
    #[cfg(feature = "track-reads")]
    reads: Vec<String>,
}

impl MultiDeBruijnVertex {
    pub fn get_kmer_size(&self) -> usize {
        self.sequence.len()
    }

    /**
     * Get the final base of this kmer, the only base this vertex contributes beyond its
     * predecessor on a path
     */
    pub fn get_suffix(&self) -> u8 {
        *self.sequence.last().unwrap()
    }

    /**
     * Record that name's read was used in building this vertex
     */
    #[cfg(feature = "track-reads")]
    pub fn add_read(&mut self, name: String) {
        self.reads.push(name);
    }

    #[cfg(not(feature = "track-reads"))]
    pub fn add_read(&mut self, _name: String) {}
}

impl BaseVertex for MultiDeBruijnVertex {
    fn new(sequence: Vec<u8>) -> MultiDeBruijnVertex {
        assert!(!sequence.is_empty(), "kmer vertex sequence cannot be empty");
        MultiDeBruijnVertex {
            sequence,
            additional_info: String::new(),
            id: next_vertex_id(),
            #[cfg(feature = "track-reads")]
            reads: Vec::new(),
        }
    }

    fn get_id(&self) -> u64 {
        self.id
    }

    fn len(&self) -> usize {
        self.sequence.len()
    }

    fn get_sequence(&self) -> &[u8] {
        &self.sequence
    }

    /**
     * The full kmer when this vertex is a graph source, otherwise just the suffix base
     */
    fn get_additional_sequence(&self, source: bool) -> &[u8] {
        if source {
            &self.sequence
        } else {
            &self.sequence[self.sequence.len() - 1..]
        }
    }

    fn set_additional_info(&mut self, info: String) {
        self.additional_info = info;
    }

    fn get_additional_info(&self) -> &str {
        &self.additional_info
    }

    fn to_string(&self) -> String {
        format!(
            "MultiDeBruijnVertex_id_{}_seq_{}",
            self.id,
            self.get_sequence_string()
        )
    }
}

impl PartialEq for MultiDeBruijnVertex {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MultiDeBruijnVertex {}

impl Hash for MultiDeBruijnVertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.id);
    }
}
