use rust_htslib::bam::record::{Cigar, CigarString};

pub struct CigarUtils {}

impl CigarUtils {
    pub fn cigar_consumes_read_bases(cig: &Cigar) -> bool {
        matches!(
            cig,
            Cigar::Match(_)
                | Cigar::Equal(_)
                | Cigar::Diff(_)
                | Cigar::Ins(_)
                | Cigar::SoftClip(_)
        )
    }

    pub fn cigar_consumes_reference_bases(cig: &Cigar) -> bool {
        matches!(
            cig,
            Cigar::Match(_)
                | Cigar::Del(_)
                | Cigar::RefSkip(_)
                | Cigar::Equal(_)
                | Cigar::Diff(_)
        )
    }

    /**
     * The number of read bases spanned by this cigar
     */
    pub fn get_read_length(cigar: &CigarString) -> u32 {
        cigar
            .0
            .iter()
            .filter(|c| Self::cigar_consumes_read_bases(c))
            .map(|c| c.len())
            .sum()
    }

    /**
     * The number of reference bases spanned by this cigar
     */
    pub fn get_reference_length(cigar: &CigarString) -> u32 {
        cigar
            .0
            .iter()
            .filter(|c| Self::cigar_consumes_reference_bases(c))
            .map(|c| c.len())
            .sum()
    }

    /**
     * Remove a trailing deletion operator from the cigar, if one is present.  A leading
     * deletion is kept: it still changes where the alignment starts on the reference.
     */
    pub fn remove_trailing_deletions(cigar: CigarString) -> CigarString {
        if matches!(cigar.0.last(), Some(Cigar::Del(_))) {
            CigarString(cigar.0[..cigar.0.len() - 1].to_vec())
        } else {
            cigar
        }
    }

    pub fn cigar_from_element_and_length(cigar: &Cigar, length: u32) -> Cigar {
        match cigar {
            Cigar::Match(_) => Cigar::Match(length),
            Cigar::Ins(_) => Cigar::Ins(length),
            Cigar::Del(_) => Cigar::Del(length),
            Cigar::RefSkip(_) => Cigar::RefSkip(length),
            Cigar::SoftClip(_) => Cigar::SoftClip(length),
            Cigar::HardClip(_) => Cigar::HardClip(length),
            Cigar::Pad(_) => Cigar::Pad(length),
            Cigar::Equal(_) => Cigar::Equal(length),
            Cigar::Diff(_) => Cigar::Diff(length),
        }
    }

    /**
     * Combine consecutive cigar elements with the same operator and drop length-zero
     * elements, e.g. 0M3M2M1I -> 5M1I
     */
    pub fn consolidate_cigar(elements: Vec<Cigar>) -> CigarString {
        let mut consolidated: Vec<Cigar> = Vec::with_capacity(elements.len());
        for element in elements {
            if element.len() == 0 {
                continue;
            }
            let same_operator = matches!(
                consolidated.last(),
                Some(last) if std::mem::discriminant(last) == std::mem::discriminant(&element)
            );
            if same_operator {
                let last = consolidated.last_mut().unwrap();
                *last = Self::cigar_from_element_and_length(last, last.len() + element.len());
            } else {
                consolidated.push(element);
            }
        }
        CigarString(consolidated)
    }
}
