use rand::Rng;

use crate::ranking::config::InterleavePattern;

/// Weave two ordered streams into one of at most `limit` items.
///
/// Each round takes up to `primary_per_round` items from `primary` (one more
/// on a successful bonus draw), then one item from `secondary`. When either
/// stream runs dry the other keeps draining alone. Relative order within each
/// stream is preserved.
pub fn interleave<T, R>(
    primary: Vec<T>,
    secondary: Vec<T>,
    limit: usize,
    pattern: &InterleavePattern,
    rng: &mut R,
) -> Vec<T>
where
    R: Rng + ?Sized,
{
    let mut out = Vec::with_capacity(limit.min(primary.len() + secondary.len()));
    let mut primary = primary.into_iter();
    let mut secondary = secondary.into_iter();

    while out.len() < limit {
        let before = out.len();

        let mut take = pattern.primary_per_round.max(1);
        if pattern.bonus_primary_chance > 0.0 && rng.random::<f64>() < pattern.bonus_primary_chance {
            take += 1;
        }

        for _ in 0..take {
            if out.len() >= limit {
                break;
            }
            match primary.next() {
                Some(item) => out.push(item),
                None => break,
            }
        }

        if out.len() < limit {
            if let Some(item) = secondary.next() {
                out.push(item);
            }
        }

        // Both streams exhausted.
        if out.len() == before {
            break;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn fixed_pattern_two_then_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let out = interleave(
            vec!["m1", "m2", "m3", "m4"],
            vec!["d1", "d2"],
            6,
            &InterleavePattern::fixed(),
            &mut rng,
        );
        assert_eq!(out, vec!["m1", "m2", "d1", "m3", "m4", "d2"]);
    }

    #[test]
    fn drains_remaining_stream() {
        let mut rng = StdRng::seed_from_u64(1);
        let out = interleave(
            vec!["m1"],
            vec!["d1", "d2", "d3"],
            10,
            &InterleavePattern::fixed(),
            &mut rng,
        );
        assert_eq!(out, vec!["m1", "d1", "d2", "d3"]);

        let out = interleave(
            vec!["m1", "m2", "m3", "m4"],
            Vec::<&str>::new(),
            3,
            &InterleavePattern::fixed(),
            &mut rng,
        );
        assert_eq!(out, vec!["m1", "m2", "m3"]);
    }

    #[test]
    fn zero_limit_is_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let out = interleave(vec![1, 2], vec![3], 0, &InterleavePattern::fixed(), &mut rng);
        assert!(out.is_empty());
    }
}
