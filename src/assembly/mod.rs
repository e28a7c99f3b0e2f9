pub mod kmer;
pub mod kmer_counter;
