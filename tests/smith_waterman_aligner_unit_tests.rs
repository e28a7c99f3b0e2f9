use rust_htslib::bam::record::{Cigar, CigarString};

use corella::smith_waterman::smith_waterman_aligner::{
    OverhangStrategy, SmithWatermanAligner, STANDARD_NGS,
};

fn align(reference: &[u8], alternate: &[u8], strategy: OverhangStrategy) -> (CigarString, i32) {
    let result = SmithWatermanAligner::align(reference, alternate, &STANDARD_NGS, strategy);
    (result.cigar, result.alignment_offset)
}

#[test]
fn test_identical_sequences() {
    let (cigar, offset) = align(b"ACGTACGT", b"ACGTACGT", OverhangStrategy::InDel);
    assert_eq!(cigar, CigarString(vec![Cigar::Match(8)]));
    assert_eq!(offset, 0);
}

#[test]
fn test_exact_substring_shortcut() {
    // the alternate occurs verbatim inside the reference; the rightmost occurrence wins
    let (cigar, offset) = align(b"ACGTACGTACGT", b"CGTACG", OverhangStrategy::SoftClip);
    assert_eq!(cigar, CigarString(vec![Cigar::Match(6)]));
    assert_eq!(offset, 5);

    let (cigar, offset) = align(b"ACTGACCTGAAGG", b"ACTG", OverhangStrategy::SoftClip);
    assert_eq!(cigar, CigarString(vec![Cigar::Match(4)]));
    assert_eq!(offset, 0);
}

#[test]
fn test_substitution_stays_a_match() {
    let (cigar, offset) = align(b"AAACCCTTT", b"AAACGCTTT", OverhangStrategy::InDel);
    assert_eq!(cigar, CigarString(vec![Cigar::Match(9)]));
    assert_eq!(offset, 0);

    let (cigar, _) = align(b"GGGGGGGG", b"GGGGAGGG", OverhangStrategy::SoftClip);
    assert_eq!(cigar, CigarString(vec![Cigar::Match(8)]));
}

#[test]
fn test_deletion() {
    let (cigar, offset) = align(b"AAACCCTTT", b"AAATTT", OverhangStrategy::InDel);
    assert_eq!(
        cigar,
        CigarString(vec![Cigar::Match(3), Cigar::Del(3), Cigar::Match(3)])
    );
    assert_eq!(offset, 0);
}

#[test]
fn test_insertion() {
    let (cigar, offset) = align(b"AAATTT", b"AAACCCTTT", OverhangStrategy::InDel);
    assert_eq!(
        cigar,
        CigarString(vec![Cigar::Match(3), Cigar::Ins(3), Cigar::Match(3)])
    );
    assert_eq!(offset, 0);
}

#[test]
fn test_leading_indel_prefers_leading_deletion() {
    // the alternate is missing the first two reference bases; with the leading-indel
    // strategy the overhang becomes an explicit deletion
    let (cigar, offset) = align(b"AACCCCC", b"CCCCC", OverhangStrategy::LeadingIndel);
    assert_eq!(cigar, CigarString(vec![Cigar::Del(2), Cigar::Match(5)]));
    assert_eq!(offset, 0);
}

#[test]
fn test_leading_indel_prefers_leading_insertion() {
    let (cigar, offset) = align(b"CCCCC", b"AAACCCCC", OverhangStrategy::LeadingIndel);
    assert_eq!(cigar, CigarString(vec![Cigar::Ins(3), Cigar::Match(5)]));
    assert_eq!(offset, 0);
}

#[test]
fn test_ignore_strategy_absorbs_overhang() {
    let (cigar, offset) = align(b"CCCCC", b"AAACCCCC", OverhangStrategy::Ignore);
    assert_eq!(cigar, CigarString(vec![Cigar::Match(8)]));
    assert_eq!(offset, -3);
}

#[test]
#[should_panic]
fn test_empty_sequence_panics() {
    SmithWatermanAligner::align(b"", b"ACGT", &STANDARD_NGS, OverhangStrategy::InDel);
}
