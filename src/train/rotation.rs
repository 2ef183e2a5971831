//! Style rotation policy

/// Rotation slot for a given optimizer step.
///
/// A pure function of the update count: step `i` targets slot
/// `i % style_count`, round-robining through every configured style
/// regardless of loss magnitude.
pub fn style_slot(update_count: usize, style_count: usize) -> usize {
    debug_assert!(style_count > 0);
    update_count % style_count
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rotates_round_robin() {
        let slots: Vec<usize> = (0..5).map(|i| style_slot(i, 2)).collect();
        assert_eq!(slots, vec![0, 1, 0, 1, 0]);
    }

    #[test]
    fn single_style_always_slot_zero() {
        for i in 0..10 {
            assert_eq!(style_slot(i, 1), 0);
        }
    }

    proptest! {
        #[test]
        fn aligned_window_covers_every_slot_once(k in 1usize..16, window in 0usize..64) {
            let start = window * k;
            let mut seen = vec![0usize; k];
            for i in start..start + k {
                seen[style_slot(i, k)] += 1;
            }
            prop_assert!(seen.iter().all(|&count| count == 1));
        }
    }
}
