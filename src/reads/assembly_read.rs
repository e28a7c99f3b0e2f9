/**
 * The read surface the assembly engine consumes: bases, per-base qualities, a read name and
 * the sample the read was drawn from.  How reads are produced (and any upstream filtering)
 * is the caller's concern.
 */
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AssemblyRead {
    name: String,
    sample_name: String,
    bases: Vec<u8>,
    quals: Vec<u8>,
}

impl AssemblyRead {
    pub fn new(name: String, sample_name: String, bases: Vec<u8>, quals: Vec<u8>) -> AssemblyRead {
        assert!(
            bases.len() == quals.len(),
            "bases and qualities must have the same length: {} vs {}",
            bases.len(),
            quals.len()
        );
        AssemblyRead {
            name,
            sample_name,
            bases,
            quals,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sample_name(&self) -> &str {
        &self.sample_name
    }

    pub fn bases(&self) -> &[u8] {
        &self.bases
    }

    pub fn base_qualities(&self) -> &[u8] {
        &self.quals
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}
