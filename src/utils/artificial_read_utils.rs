use crate::reads::assembly_read::AssemblyRead;

pub const DEFAULT_SAMPLE_NAME: &str = "sample_1";

/**
 * Helpers for building synthetic reads, mostly useful for testing
 */
pub struct ArtificialReadUtils {}

impl ArtificialReadUtils {
    pub fn create_artificial_read(
        name: &str,
        sample_name: &str,
        bases: &[u8],
        quals: &[u8],
    ) -> AssemblyRead {
        AssemblyRead::new(
            name.to_string(),
            sample_name.to_string(),
            bases.to_vec(),
            quals.to_vec(),
        )
    }

    /**
     * Create a read with every base at the given quality, under the default sample
     */
    pub fn create_artificial_read_with_quality(bases: &[u8], qual: u8) -> AssemblyRead {
        AssemblyRead::new(
            "artificial_read".to_string(),
            DEFAULT_SAMPLE_NAME.to_string(),
            bases.to_vec(),
            vec![qual; bases.len()],
        )
    }
}
