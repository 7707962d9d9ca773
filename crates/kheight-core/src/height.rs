//! Labels and labelings.

use smallvec::SmallVec;

/// A single vertex label, always in `0..=k`.
pub type Height = u8;

/// One label per vertex of an index space, in vertex-id order.
///
/// Blocks and boundaries handled by this crate are small, so sixteen labels
/// are kept inline.
pub type Labeling = SmallVec<[Height; 16]>;

/// Total weight of a labeling: the sum of its labels.
pub fn weight(labels: &[Height]) -> u64 {
    labels.iter().map(|&h| u64::from(h)).sum()
}

/// Whether two labels may sit on adjacent vertices.
#[inline]
pub fn within_one(a: Height, b: Height) -> bool {
    a.abs_diff(b) <= 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_sums_labels() {
        assert_eq!(weight(&[]), 0);
        assert_eq!(weight(&[0, 1, 2, 3]), 6);
        assert_eq!(weight(&[255, 255]), 510);
    }

    #[test]
    fn within_one_is_symmetric() {
        assert!(within_one(2, 3));
        assert!(within_one(3, 2));
        assert!(within_one(4, 4));
        assert!(!within_one(0, 2));
        assert!(!within_one(2, 0));
    }
}
