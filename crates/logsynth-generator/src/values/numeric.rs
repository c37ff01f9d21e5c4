//! Numeric value producers.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Random integer in the given range (inclusive).
pub fn int_range<R: Rng>(rng: &mut R, min: i64, max: i64) -> i64 {
    rng.gen_range(min..=max)
}

/// Random float in the given range (inclusive).
pub fn float_range<R: Rng>(rng: &mut R, min: f64, max: f64) -> f64 {
    rng.gen_range(min..=max)
}

/// Random epoch-millisecond timestamp within the hour before `now`.
pub fn recent_millis<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> i64 {
    let end = now.timestamp_millis();
    rng.gen_range(end - 3_600_000..=end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_int_range() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let value = int_range(&mut rng, 10, 20);
            assert!((10..=20).contains(&value));
        }
    }

    #[test]
    fn test_int_range_single_value() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(int_range(&mut rng, 7, 7), 7);
    }

    #[test]
    fn test_float_range() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let value = float_range(&mut rng, -90.0, 90.0);
            assert!((-90.0..=90.0).contains(&value));
        }
    }
}
