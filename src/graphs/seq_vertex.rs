use std::hash::{Hash, Hasher};

use crate::graphs::base_vertex::{next_vertex_id, BaseVertex};

/**
 * A graph vertex that holds some sequence of bases.  Unlike kmer vertices, a SeqVertex may
 * hold a sequence of any length, including none at all, and vertices with identical bases
 * remain distinct (identity is the process-unique id).
 */
#[derive(Debug, Clone)]
pub struct SeqVertex {
    pub sequence: Vec<u8>,
    additional_info: String,
    id: u64,
}

impl BaseVertex for SeqVertex {
    fn new(sequence: Vec<u8>) -> SeqVertex {
        SeqVertex {
            sequence,
            additional_info: String::new(),
            id: next_vertex_id(),
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

    fn set_additional_info(&mut self, info: String) {
        self.additional_info = info;
    }

    fn get_additional_info(&self) -> &str {
        &self.additional_info
    }

    fn to_string(&self) -> String {
        format!(
            "SeqVertex_id_{}_seq_{}",
            self.id,
            self.get_sequence_string()
        )
    }
}

impl PartialEq for SeqVertex {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SeqVertex {}

impl Hash for SeqVertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.id);
    }
}
