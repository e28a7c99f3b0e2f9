use corella::graphs::base_edge::BaseEdge;
use corella::graphs::multi_sample_edge::MultiSampleEdge;

#[test]
fn test_pruning_multiplicity_before_any_flush_is_total() {
    let mut edge = MultiSampleEdge::new(false, 3, 2);
    assert_eq!(edge.get_multiplicity(), 3);
    assert_eq!(edge.get_pruning_multiplicity(), 3);

    edge.inc_multiplicity(2);
    assert_eq!(edge.get_multiplicity(), 5);
    assert_eq!(edge.get_pruning_multiplicity(), 5);
}

#[test]
fn test_flush_rotates_per_sample_counts() {
    let mut edge = MultiSampleEdge::new(false, 3, 2);
    edge.inc_multiplicity(2);
    edge.flush_single_sample_multiplicity();
    assert_eq!(edge.get_pruning_multiplicity(), 5);
    assert_eq!(edge.get_current_single_sample_multiplicity(), 0);

    // the second sample only supports this edge once
    edge.inc_multiplicity(1);
    edge.flush_single_sample_multiplicity();
    assert_eq!(edge.get_multiplicity(), 6);
    assert_eq!(edge.get_pruning_multiplicity(), 1);

    // a third heavily-supported sample pushes the first out of the window; the weakest
    // remaining sample still dominates
    edge.inc_multiplicity(7);
    edge.flush_single_sample_multiplicity();
    assert_eq!(edge.get_pruning_multiplicity(), 1);
}

#[test]
fn test_unsupporting_sample_zeroes_pruning_multiplicity() {
    let mut edge = MultiSampleEdge::new(false, 4, 2);
    edge.flush_single_sample_multiplicity();
    // a sample boundary passes with no observations at all
    edge.flush_single_sample_multiplicity();
    assert_eq!(edge.get_multiplicity(), 4);
    assert_eq!(edge.get_pruning_multiplicity(), 0);
}

#[test]
fn test_ref_flag_and_merge() {
    let mut edge = MultiSampleEdge::new(false, 1, 1);
    assert!(!edge.is_ref());
    edge.set_is_ref(true);
    assert!(edge.is_ref());

    let other = MultiSampleEdge::new(false, 2, 1);
    edge.add(other);
    assert_eq!(edge.get_multiplicity(), 3);
    assert!(edge.is_ref());
}

#[test]
#[should_panic]
fn test_zero_capacity_panics() {
    MultiSampleEdge::new(false, 1, 0);
}
