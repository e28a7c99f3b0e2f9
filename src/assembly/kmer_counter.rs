use std::collections::HashMap;

use crate::assembly::kmer::Kmer;

/**
 * Generic utility class that counts kmers
 *
 * Maps kmers to their counts.  The iteration order of the counted kmers is unspecified.
 */
#[derive(Debug, Clone)]
pub struct KmerCounter {
    // a map of kmer -> count of observations
    counts_by_kmer: HashMap<Kmer, u64>,
    kmer_length: usize,
}

impl KmerCounter {
    /**
     * Create a new kmer counter
     * @param kmer_length the length of kmers we'll be counting, must be >= 1
     */
    pub fn new(kmer_length: usize) -> KmerCounter {
        assert!(kmer_length >= 1, "kmer_length must be >= 1");
        KmerCounter {
            counts_by_kmer: HashMap::new(),
            kmer_length,
        }
    }

    pub fn add_kmer(&mut self, kmer: Kmer, kmer_count: u64) {
        assert!(
            kmer.len() == self.kmer_length,
            "bad kmer length {} expected {}",
            kmer.len(),
            self.kmer_length
        );
        *self.counts_by_kmer.entry(kmer).or_insert(0) += kmer_count;
    }

    /**
     * Get the count of kmer in this kmer counter
     */
    pub fn get_kmer_count(&self, kmer: &Kmer) -> u64 {
        *self.counts_by_kmer.get(kmer).unwrap_or(&0)
    }

    /**
     * Get kmers that have minCount or greater in this counter.  Iteration order is unspecified.
     */
    pub fn get_kmers_with_counts_at_least(&self, min_count: u64) -> Vec<Kmer> {
        self.counts_by_kmer
            .iter()
            .filter(|(_, &count)| count >= min_count)
            .map(|(kmer, _)| kmer.clone())
            .collect()
    }

    pub fn get_counted_kmers(&self) -> impl Iterator<Item = (&Kmer, u64)> {
        self.counts_by_kmer.iter().map(|(kmer, &count)| (kmer, count))
    }

    pub fn len(&self) -> usize {
        self.counts_by_kmer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts_by_kmer.is_empty()
    }
}
