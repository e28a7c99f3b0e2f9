use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/**
 * Fast wrapper for byte[] kmers
 *
 * This objects has several important features that make it better than using a raw byte[] for a kmer:
 *
 * -- Can create kmer from a range of a larger byte[], allowing us to avoid copying the source bytes
 * -- Fast equals and hashcode methods
 * -- can get actual byte[] of the kmer, even if it's from a larger byte[], and this operation
 *    only does the work of that operation once, updating its internal state
 *
 * The backing buffer is shared (`Arc`), so sub-kmers and kmers cut from the same read all
 * window one allocation.  The hash is computed over the windowed bytes at construction time
 * and is stable across materialization.
 */
#[derive(Debug, Clone)]
pub struct Kmer {
    // this buffer may be rebound to a trimmed copy when the kmer is materialized
    bases: Arc<[u8]>,
    start: usize,
    // two constants
    length: usize,
    hash: i32,
}

impl Kmer {
    /**
     * Create a new kmer using all bases in kmer
     * @param kmer a non-empty byte slice
     */
    pub fn new(kmer: &[u8]) -> Kmer {
        Self::new_with_start_and_length(Arc::from(kmer), 0, kmer.len())
    }

    /**
     * Create a new kmer backed by the bases in bases, spanning start -> start + length
     *
     * The buffer is shared, not copied; under no circumstances can the windowed bases be
     * modified anywhere in the client code.
     *
     * @param bases the shared array of bases
     * @param start the start of the kmer in bases, where start + length must be <= bases.len()
     * @param length the length of the kmer
     */
    pub fn new_with_start_and_length(bases: Arc<[u8]>, start: usize, length: usize) -> Kmer {
        assert!(
            start + length <= bases.len(),
            "kmer window [{}, {}+{}) out of bounds for buffer of length {}",
            start,
            start,
            length,
            bases.len()
        );
        let hash = Self::hash_code(&bases, start, length);
        Kmer {
            bases,
            start,
            length,
            hash,
        }
    }

    /**
     * Create a derived shallow kmer that starts at newStart and has newLength bases
     * @param new_start the new start of kmer, where 0 means the start of this kmer, 1 means skip the first base
     * @param new_length the new length
     * @return a new kmer based on the data in this kmer.  Does not make a copy, so shares the buffer
     */
    pub fn sub_kmer(&self, new_start: usize, new_length: usize) -> Kmer {
        Self::new_with_start_and_length(Arc::clone(&self.bases), self.start + new_start, new_length)
    }

    /**
     * Get the bases of this kmer.  May trim the backing buffer, depending on how this kmer was constructed.
     *
     * Note that this function is efficient in that if it needs to copy the bases this only occurs once.
     *
     * @return the length() bases of this kmer, regardless of how this kmer was created
     */
    pub fn bases(&mut self) -> &[u8] {
        if self.start != 0 || self.bases.len() != self.length {
            // rip out the exact bytes and update start so we don't ever do this again
            self.bases = Arc::from(&self.bases[self.start..self.start + self.length]);
            self.start = 0;
        }

        &self.bases
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /**
     * The byte at position i of this kmer
     */
    pub fn base(&self, i: usize) -> u8 {
        self.bases[self.start + i]
    }

    /**
     * Gets a set of differing positions and bases from another k-mer, limiting up to a max distance.
     * For example, if this = "ACATT" and other = "ACGGT":
     * - if maxDistance < 2 then -1 will be returned, since distance between kmers is 2.
     * - If maxDistance >= 2, then 2 will be returned, and arrays will be filled as follows:
     * differingIndices = {2,3}
     * differingBases = {'G','G'}
     *
     * @param other                 Other k-mer to test
     * @param max_distance          Maximum distance to search. If this and other k-mers are beyond this Hamming distance,
     *                              search is aborted and -1 is returned
     * @param differing_indices     Output array for the indices of differing bytes
     * @param differing_bases       Output array for the actual differing bases (taken from other)
     * @return                      The Hamming distance, or -1 if it exceeds max_distance
     */
    pub fn get_differing_positions(
        &self,
        other: &Kmer,
        max_distance: usize,
        differing_indices: &mut [usize],
        differing_bases: &mut [u8],
    ) -> i32 {
        let mut dist = 0;
        if self.length == other.length {
            for i in 0..self.length {
                let other_base = other.bases[other.start + i];
                if self.bases[self.start + i] != other_base {
                    differing_indices[dist] = i;
                    differing_bases[dist] = other_base;
                    dist += 1;
                    if dist > max_distance {
                        return -1;
                    }
                }
            }
        }
        dist as i32
    }

    // the hash used by the surrounding containers: h0 = 1, hi = 31 * h(i-1) + base[i],
    // wrapping i32 arithmetic over the windowed bytes only
    fn hash_code(bases: &[u8], start: usize, length: usize) -> i32 {
        let mut result: i32 = 1;
        for i in 0..length {
            result = result.wrapping_mul(31).wrapping_add(bases[start + i] as i32);
        }
        result
    }

    fn window(&self) -> &[u8] {
        &self.bases[self.start..self.start + self.length]
    }
}

impl PartialEq for Kmer {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.length == other.length && self.window() == other.window()
    }
}

impl Eq for Kmer {}

impl Hash for Kmer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.hash);
    }
}

impl fmt::Display for Kmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Kmer{{{}}}",
            std::str::from_utf8(self.window()).unwrap_or("<non-utf8>")
        )
    }
}
