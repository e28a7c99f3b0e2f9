use ndarray::Array2;
use rust_htslib::bam::record::{Cigar, CigarString};

use crate::reads::cigar_utils::CigarUtils;

/**
 * How overhangs — ends of the alternate sequence that stick out past the reference — should
 * be treated by the aligner.
 */
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum OverhangStrategy {
    /**
     * Add softclips for the overhangs
     */
    SoftClip,
    /**
     * Treat the overhangs as proper insertions/deletions
     */
    InDel,
    /**
     * Treat the overhangs as proper insertions/deletions for leading (but not trailing) overhangs.
     * This is useful e.g. when we want to merge dangling tails in an assembly graph: because we don't
     * expect the dangling tail to reach the end of the reference path we are okay ignoring trailing
     * deletions - but leading indels are still very much relevant.
     */
    LeadingIndel,
    /**
     * Just ignore the overhangs
     */
    Ignore,
}

/**
 * Scoring parameters for the aligner.  Penalties are expressed as non-positive values.
 */
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Parameters {
    pub match_value: i32,
    pub mismatch_penalty: i32,
    pub gap_open_penalty: i32,
    pub gap_extend_penalty: i32,
}

impl Parameters {
    pub fn new(
        match_value: i32,
        mismatch_penalty: i32,
        gap_open_penalty: i32,
        gap_extend_penalty: i32,
    ) -> Parameters {
        assert!(match_value >= 0, "match_value must be >= 0");
        assert!(mismatch_penalty <= 0, "mismatch_penalty must be <= 0");
        assert!(gap_open_penalty <= 0, "gap_open_penalty must be <= 0");
        assert!(gap_extend_penalty <= 0, "gap_extend_penalty must be <= 0");
        Parameters {
            match_value,
            mismatch_penalty,
            gap_open_penalty,
            gap_extend_penalty,
        }
    }
}

lazy_static! {
    // match=1, mismatch=-1/3, gap=-(1+k/3)
    pub static ref ORIGINAL_DEFAULT: Parameters = Parameters::new(3, -1, -4, -3);
    pub static ref STANDARD_NGS: Parameters = Parameters::new(25, -50, -110, -6);
    // used to compare assembly haplotypes against the reference; chosen via optimization
    // against a well-characterized truth set
    pub static ref NEW_SW_PARAMETERS: Parameters = Parameters::new(200, -150, -260, -11);
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SmithWatermanAlignmentResult {
    pub cigar: CigarString,
    pub alignment_offset: i32,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum State {
    Match,
    Insertion,
    Deletion,
    Clip,
}

// never let matrix elements drop below this cutoff
const MATRIX_MIN_CUTOFF: i32 = -100_000_000;

/**
 * Pairwise discrete Smith-Waterman alignment implemented in plain (non-SIMD) code.
 *
 * All insertions and deletions in the resulting cigar are expressed with respect to the
 * alternate sequence.
 */
pub struct SmithWatermanAligner {}

impl SmithWatermanAligner {
    /**
     * Aligns the alternate sequence to the reference sequence
     *
     * @param reference  the reference sequence
     * @param alternate  the alternate sequence
     */
    pub fn align(
        reference: &[u8],
        alternate: &[u8],
        parameters: &Parameters,
        overhang_strategy: OverhangStrategy,
    ) -> SmithWatermanAlignmentResult {
        assert!(
            !reference.is_empty() && !alternate.is_empty(),
            "Non-empty sequences are required for the Smith-Waterman calculation"
        );

        // avoid running the full Smith-Waterman if an exact match of the alternate exists
        // within the reference
        if overhang_strategy == OverhangStrategy::SoftClip
            || overhang_strategy == OverhangStrategy::Ignore
        {
            let match_index = Self::last_index_of(reference, alternate);
            if match_index != -1 {
                return SmithWatermanAlignmentResult {
                    cigar: CigarString(vec![Cigar::Match(alternate.len() as u32)]),
                    alignment_offset: match_index,
                };
            }
        }

        let n = reference.len() + 1;
        let m = alternate.len() + 1;
        let mut sw = Array2::<i32>::zeros((n, m));
        let mut btrack = Array2::<i32>::zeros((n, m));
        Self::calculate_matrix(
            reference,
            alternate,
            &mut sw,
            &mut btrack,
            overhang_strategy,
            parameters,
        );
        Self::calculate_cigar(&sw, &btrack, overhang_strategy)
    }

    /**
     * Find the last index of query within reference, or -1 if absent
     */
    fn last_index_of(reference: &[u8], query: &[u8]) -> i32 {
        if query.len() > reference.len() {
            return -1;
        }
        for start in (0..=reference.len() - query.len()).rev() {
            if &reference[start..start + query.len()] == query {
                return start as i32;
            }
        }
        -1
    }

    fn wd(x: u8, y: u8, parameters: &Parameters) -> i32 {
        if x == y {
            parameters.match_value
        } else {
            parameters.mismatch_penalty
        }
    }

    /**
     * Calculates the SW matrices for the two sequences
     */
    fn calculate_matrix(
        reference: &[u8],
        alternate: &[u8],
        sw: &mut Array2<i32>,
        btrack: &mut Array2<i32>,
        overhang_strategy: OverhangStrategy,
        parameters: &Parameters,
    ) {
        let nrow = sw.nrows();
        let ncol = sw.ncols();

        let low_init_value = i32::MIN / 2;
        let mut best_gap_v = vec![low_init_value; ncol + 1];
        let mut gap_size_v = vec![0i32; ncol + 1];
        let mut best_gap_h = vec![low_init_value; nrow + 1];
        let mut gap_size_h = vec![0i32; nrow + 1];

        // we need to initialize the SW matrix with gap penalties if we want to keep track of
        // indels at the edges of alignments
        if overhang_strategy == OverhangStrategy::InDel
            || overhang_strategy == OverhangStrategy::LeadingIndel
        {
            let mut current_value = parameters.gap_open_penalty;
            sw[[0, 1]] = current_value;
            for i in 2..ncol {
                current_value += parameters.gap_extend_penalty;
                sw[[0, i]] = current_value;
            }
            let mut current_value = parameters.gap_open_penalty;
            sw[[1, 0]] = current_value;
            for i in 2..nrow {
                current_value += parameters.gap_extend_penalty;
                sw[[i, 0]] = current_value;
            }
        }

        for i in 1..nrow {
            let a_base = reference[i - 1];
            for j in 1..ncol {
                let b_base = alternate[j - 1];

                // step diag = sw[i-1][j-1] + wd(a_base, b_base)
                let step_diag = sw[[i - 1, j - 1]] + Self::wd(a_base, b_base, parameters);

                // optimized traversal of all the 'step down' events ending in the current
                // cell; works only for the linear gap penalty w(k) = w_open + (k-1)*w_extend
                let prev_gap = sw[[i - 1, j]] + parameters.gap_open_penalty;
                best_gap_v[j] += parameters.gap_extend_penalty;
                if prev_gap > best_gap_v[j] {
                    // opening a gap just before the current cell beats extending the best
                    // previously opened gap, and will for all cells below as well
                    best_gap_v[j] = prev_gap;
                    gap_size_v[j] = 1;
                } else {
                    gap_size_v[j] += 1;
                }

                let step_down = best_gap_v[j];
                let kd = gap_size_v[j];

                // the same logic for gaps opened to the left
                let prev_gap_h = sw[[i, j - 1]] + parameters.gap_open_penalty;
                best_gap_h[i] += parameters.gap_extend_penalty;
                if prev_gap_h > best_gap_h[i] {
                    best_gap_h[i] = prev_gap_h;
                    gap_size_h[i] = 1;
                } else {
                    gap_size_h[i] += 1;
                }

                let step_right = best_gap_h[i];
                let ki = gap_size_h[i];

                // priority here will be step diagonal, step right, step down
                let diag_highest_or_equal = step_diag >= step_down && step_diag >= step_right;
                if diag_highest_or_equal {
                    sw[[i, j]] = MATRIX_MIN_CUTOFF.max(step_diag);
                    btrack[[i, j]] = 0;
                } else if step_right >= step_down {
                    // moving right is the highest
                    sw[[i, j]] = MATRIX_MIN_CUTOFF.max(step_right);
                    btrack[[i, j]] = -ki; // negative = horizontal
                } else {
                    sw[[i, j]] = MATRIX_MIN_CUTOFF.max(step_down);
                    btrack[[i, j]] = kd; // positive = vertical
                }
            }
        }
    }

    /**
     * Calculates the CIGAR for the alignment from the back track matrix
     */
    fn calculate_cigar(
        sw: &Array2<i32>,
        btrack: &Array2<i32>,
        overhang_strategy: OverhangStrategy,
    ) -> SmithWatermanAlignmentResult {
        let ref_length = sw.nrows() as i32 - 1;
        let alt_length = sw.ncols() as i32 - 1;

        // p holds the position we start backtracking from; we will be assembling a cigar in
        // the backwards order
        let mut p1: i32 = 0;
        let mut p2: i32 = 0;
        let mut maxscore = i32::MIN; // sw scores are allowed to be negative
        let mut segment_length: i32 = 0; // length of the current segment

        // if we want to consider overhangs as legitimate operators, then just start from the
        // corner of the matrix
        if overhang_strategy == OverhangStrategy::InDel {
            p1 = ref_length;
            p2 = alt_length;
        } else {
            // look for the largest score on the rightmost column.  We use >= combined with
            // the traversal direction to ensure that if two scores are equal, the one closer
            // to the diagonal gets picked.  Note that this is not technically
            // Smith-Waterman: by only looking for max values on the right we exclude high
            // scoring local alignments.
            p2 = alt_length;
            for i in 1..sw.nrows() as i32 {
                let cur_score = sw[[i as usize, alt_length as usize]];
                if cur_score >= maxscore {
                    p1 = i;
                    maxscore = cur_score;
                }
            }

            // now look for a larger score on the bottom-most row
            if overhang_strategy != OverhangStrategy::LeadingIndel {
                for j in 1..sw.ncols() as i32 {
                    let cur_score = sw[[ref_length as usize, j as usize]];
                    // the optimization above discards ties in favor of the diagonal
                    if cur_score > maxscore
                        || (cur_score == maxscore && (ref_length - j).abs() < (p1 - p2).abs())
                    {
                        p1 = ref_length;
                        p2 = j;
                        maxscore = cur_score;
                        // end of the alternate is overhanging; we will just record it as 'M'
                        // segment
                        segment_length = alt_length - j;
                    }
                }
            }
        }

        let mut lce: Vec<Cigar> = Vec::with_capacity(5);
        if segment_length > 0 && overhang_strategy == OverhangStrategy::SoftClip {
            lce.push(Self::make_element(State::Clip, segment_length as u32));
            segment_length = 0;
        }

        // we will be placing all insertions and deletions into the alternate sequence, so
        // the states are named with regard to that sequence
        let mut state = State::Match;
        loop {
            let btr = btrack[[p1 as usize, p2 as usize]];
            let (new_state, step_length) = if btr > 0 {
                (State::Deletion, btr)
            } else if btr < 0 {
                (State::Insertion, -btr)
            } else {
                (State::Match, 1)
            };

            // move to the next best location in the sw matrix
            match new_state {
                State::Match => {
                    // move back along the diag in the sw matrix
                    p1 -= 1;
                    p2 -= 1;
                }
                State::Insertion => p2 -= step_length,
                State::Deletion => p1 -= step_length,
                State::Clip => unreachable!(),
            }

            // now let's see if the state actually changed
            if new_state == state {
                segment_length += step_length;
            } else {
                // state changed, emit the previous segment, whatever it was
                lce.push(Self::make_element(state, segment_length as u32));
                segment_length = step_length;
                state = new_state;
            }
            if !(p1 > 0 && p2 > 0) {
                break;
            }
        }

        // post-process the last segment we are still keeping; if the alternate overhangs the
        // reference on the left (p2 > 0), those extra bases are either soft-clipped,
        // absorbed into the first M, or recorded as a leading insertion, depending on the
        // strategy.  The alignment offset reports where the alignment starts on the
        // reference.
        let alignment_offset: i32;
        match overhang_strategy {
            OverhangStrategy::SoftClip => {
                lce.push(Self::make_element(state, segment_length as u32));
                if p2 > 0 {
                    lce.push(Self::make_element(State::Clip, p2 as u32));
                }
                alignment_offset = p1;
            }
            OverhangStrategy::Ignore => {
                lce.push(Self::make_element(state, (segment_length + p2) as u32));
                alignment_offset = p1 - p2;
            }
            OverhangStrategy::InDel | OverhangStrategy::LeadingIndel => {
                // take care of the actual alignment
                lce.push(Self::make_element(state, segment_length as u32));

                // take care of overhangs at the beginning of the alignment
                if p1 > 0 {
                    lce.push(Self::make_element(State::Deletion, p1 as u32));
                } else if p2 > 0 {
                    lce.push(Self::make_element(State::Insertion, p2 as u32));
                }

                alignment_offset = 0;
            }
        }

        lce.reverse();
        SmithWatermanAlignmentResult {
            cigar: CigarUtils::consolidate_cigar(lce),
            alignment_offset,
        }
    }

    fn make_element(state: State, length: u32) -> Cigar {
        match state {
            State::Match => Cigar::Match(length),
            State::Insertion => Cigar::Ins(length),
            State::Deletion => Cigar::Del(length),
            State::Clip => Cigar::SoftClip(length),
        }
    }
}
