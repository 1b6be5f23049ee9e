//! Combinatorial helpers shared by the formula families.

/// Factorial as `f64`.
///
/// Negative arguments yield `1.0`. Arguments above 170 overflow to infinity,
/// which the engine's finiteness checks turn into a computation error.
#[must_use]
pub fn factorial(n: i64) -> f64 {
    if n < 0 {
        return 1.0;
    }
    (2..=n).fold(1.0, |acc, i| acc * i as f64)
}

/// Unnormalized birth-death probabilities `Pn / P0` for `n = 0..=last`.
///
/// For a birth-death chain with arrival rate `λ_n` and departure rate `μ_n`,
/// `Pn / P0 = Π_{i=1..n} λ_{i-1} / μ_i`. The closure returns that ratio for
/// step `i`. The first element is exactly `1.0`. Terms are produced lazily.
pub fn birth_death_terms<F>(last: u64, ratio: F) -> impl Iterator<Item = f64>
where
    F: Fn(u64) -> f64,
{
    std::iter::once(1.0).chain((1..=last).scan(1.0, move |term, i| {
        *term *= ratio(i);
        Some(*term)
    }))
}

/// Single unnormalized term `Pn / P0` without materializing the sequence.
#[must_use]
pub fn birth_death_term<F>(n: u64, ratio: F) -> f64
where
    F: Fn(u64) -> f64,
{
    (1..=n).fold(1.0, |acc, i| acc * ratio(i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factorial_small_values() {
        assert!((factorial(0) - 1.0).abs() < 1e-12);
        assert!((factorial(1) - 1.0).abs() < 1e-12);
        assert!((factorial(5) - 120.0).abs() < 1e-12);
        assert!((factorial(10) - 3_628_800.0).abs() < 1e-6);
    }

    #[test]
    fn test_factorial_negative_is_one() {
        assert!((factorial(-1) - 1.0).abs() < 1e-12);
        assert!((factorial(-42) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_factorial_overflows_to_infinity() {
        assert!(factorial(170).is_finite());
        assert!(factorial(171).is_infinite());
    }

    #[test]
    fn test_birth_death_terms_geometric() {
        let terms: Vec<f64> = birth_death_terms(4, |_| 0.5).collect();
        assert_eq!(terms.len(), 5);
        assert!((terms[0] - 1.0).abs() < f64::EPSILON);
        assert!((terms[4] - 0.0625).abs() < 1e-12);
    }

    #[test]
    fn test_birth_death_terms_are_lazy() {
        let terms: Vec<f64> = birth_death_terms(u64::MAX, |_| 2.0).take(3).collect();
        assert_eq!(terms, [1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_birth_death_term_matches_sequence() {
        let ratio = |i: u64| (6 - i) as f64 * 0.25;
        let terms: Vec<f64> = birth_death_terms(5, ratio).collect();
        for (n, expected) in terms.iter().enumerate() {
            let single = birth_death_term(n as u64, ratio);
            assert!((single - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_birth_death_term_zero_is_exact_one() {
        assert_eq!(birth_death_term(0, |_| 123.0).to_bits(), 1.0f64.to_bits());
    }
}
