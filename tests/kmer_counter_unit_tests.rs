use corella::assembly::kmer::Kmer;
use corella::assembly::kmer_counter::KmerCounter;

#[test]
fn test_count_kmers() {
    let mut counter = KmerCounter::new(3);
    counter.add_kmer(Kmer::new(b"ACG"), 1);
    counter.add_kmer(Kmer::new(b"ACG"), 1);
    counter.add_kmer(Kmer::new(b"CGT"), 1);

    assert_eq!(counter.get_kmer_count(&Kmer::new(b"ACG")), 2);
    assert_eq!(counter.get_kmer_count(&Kmer::new(b"CGT")), 1);
    assert_eq!(counter.get_kmer_count(&Kmer::new(b"TTT")), 0);
    assert_eq!(counter.len(), 2);
}

#[test]
fn test_kmers_with_counts_at_least() {
    let mut counter = KmerCounter::new(3);
    counter.add_kmer(Kmer::new(b"AAA"), 1);
    counter.add_kmer(Kmer::new(b"AAA"), 1);
    counter.add_kmer(Kmer::new(b"TTT"), 5);
    counter.add_kmer(Kmer::new(b"CCC"), 1);

    let at_least_two = counter.get_kmers_with_counts_at_least(2);
    assert_eq!(at_least_two.len(), 2);
    assert!(at_least_two.contains(&Kmer::new(b"AAA")));
    assert!(at_least_two.contains(&Kmer::new(b"TTT")));

    assert!(counter.get_kmers_with_counts_at_least(6).is_empty());
}

#[test]
fn test_counts_accumulate_across_windowed_kmers() {
    use std::sync::Arc;
    let buffer: Arc<[u8]> = Arc::from(b"GATTGATT".as_slice());

    let mut counter = KmerCounter::new(4);
    counter.add_kmer(Kmer::new_with_start_and_length(Arc::clone(&buffer), 0, 4), 1);
    counter.add_kmer(Kmer::new_with_start_and_length(buffer, 4, 4), 1);
    assert_eq!(counter.get_kmer_count(&Kmer::new(b"GATT")), 2);
}

#[test]
#[should_panic]
fn test_wrong_kmer_length_panics() {
    let mut counter = KmerCounter::new(3);
    counter.add_kmer(Kmer::new(b"ACGT"), 1);
}
