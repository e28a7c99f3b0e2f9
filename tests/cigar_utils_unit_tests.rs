use rust_htslib::bam::record::{Cigar, CigarString};

use corella::reads::cigar_utils::CigarUtils;

#[test]
fn test_read_and_reference_lengths() {
    let cigar = CigarString(vec![Cigar::Match(5), Cigar::Ins(2), Cigar::Del(3), Cigar::Match(4)]);
    assert_eq!(CigarUtils::get_read_length(&cigar), 11);
    assert_eq!(CigarUtils::get_reference_length(&cigar), 12);
}

#[test]
fn test_remove_trailing_deletions() {
    let cigar = CigarString(vec![Cigar::Match(5), Cigar::Del(2)]);
    assert_eq!(
        CigarUtils::remove_trailing_deletions(cigar),
        CigarString(vec![Cigar::Match(5)])
    );

    // a leading deletion still matters and is kept
    let cigar = CigarString(vec![Cigar::Del(2), Cigar::Match(5)]);
    assert_eq!(
        CigarUtils::remove_trailing_deletions(cigar.clone()),
        cigar
    );

    let cigar = CigarString(vec![Cigar::Match(5)]);
    assert_eq!(
        CigarUtils::remove_trailing_deletions(cigar.clone()),
        cigar
    );
}

#[test]
fn test_consolidate_cigar() {
    let consolidated = CigarUtils::consolidate_cigar(vec![
        Cigar::Match(0),
        Cigar::Match(3),
        Cigar::Match(2),
        Cigar::Ins(1),
        Cigar::Ins(1),
        Cigar::Match(4),
    ]);
    assert_eq!(
        consolidated,
        CigarString(vec![Cigar::Match(5), Cigar::Ins(2), Cigar::Match(4)])
    );
}

#[test]
fn test_operator_predicates() {
    assert!(CigarUtils::cigar_consumes_read_bases(&Cigar::Match(1)));
    assert!(CigarUtils::cigar_consumes_read_bases(&Cigar::Ins(1)));
    assert!(!CigarUtils::cigar_consumes_read_bases(&Cigar::Del(1)));
    assert!(CigarUtils::cigar_consumes_reference_bases(&Cigar::Del(1)));
    assert!(!CigarUtils::cigar_consumes_reference_bases(&Cigar::Ins(1)));
    assert!(!CigarUtils::cigar_consumes_reference_bases(&Cigar::SoftClip(1)));
}
