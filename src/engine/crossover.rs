//! Two-point crossover of conditions.

use crate::rules::Condition;
use rand::Rng;

/// Swap the attributes between two random cut points.
///
/// Both cut points are drawn from `0..=len` and ordered; the half-open range
/// between them is exchanged. Actions and effects are never touched.
pub fn two_point_crossover<R: Rng>(a: &mut Condition, b: &mut Condition, rng: &mut R) {
    let len = a.len().min(b.len());
    let mut x = rng.gen_range(0..=len);
    let mut y = rng.gen_range(0..=len);
    if x > y {
        std::mem::swap(&mut x, &mut y);
    }
    for i in x..y {
        let (sa, sb) = (a[i], b[i]);
        a.specialize(i, sb);
        b.specialize(i, sa);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_crossover_preserves_multiset_per_position() {
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..20 {
            let mut a = Condition::parse("000000", '#');
            let mut b = Condition::parse("111111", '#');
            two_point_crossover(&mut a, &mut b, &mut rng);
            for i in 0..6 {
                assert_ne!(a[i], b[i]);
            }
            // The swapped region is contiguous
            let ones: Vec<usize> = (0..6).filter(|&i| a[i] == '1').collect();
            if let (Some(first), Some(last)) = (ones.first(), ones.last()) {
                assert_eq!(last - first + 1, ones.len());
            }
        }
    }
}
