// src/rng.rs
//
// RandomStream: the single seeded source of randomness for a run.
//
// All sampling is deterministic given a seed. The stream is passed explicitly
// to whoever draws from it; there is no ambient or thread-local RNG anywhere
// in the pipeline. Callers own the draw order.

use rand::distributions::WeightedIndex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Beta, Distribution, Normal};

use crate::error::{SimError, SimResult};

#[derive(Debug, Clone)]
pub struct RandomStream {
    rng: ChaCha8Rng,
}

impl RandomStream {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform draw in [0, 1).
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Bernoulli(p) as `uniform() < p`.
    pub fn bernoulli(&mut self, p: f64) -> SimResult<bool> {
        check_probability("bernoulli", p)?;
        Ok(self.uniform() < p)
    }

    /// Single-trial binomial, returned as 0/1.
    pub fn binomial01(&mut self, p: f64) -> SimResult<u8> {
        Ok(u8::from(self.bernoulli(p)?))
    }

    pub fn beta(&mut self, a: f64, b: f64) -> SimResult<f64> {
        if !(a.is_finite() && b.is_finite() && a > 0.0 && b > 0.0) {
            return Err(SimError::parameter(
                "beta",
                format!("shape parameters must be finite and > 0 (a={a}, b={b})"),
            ));
        }
        let dist =
            Beta::new(a, b).map_err(|e| SimError::parameter("beta", format!("{e:?}")))?;
        Ok(dist.sample(&mut self.rng))
    }

    /// Normal(mean, sd) clipped to [lo, hi].
    pub fn normal_clipped(&mut self, mean: f64, sd: f64, lo: f64, hi: f64) -> SimResult<f64> {
        if !mean.is_finite() {
            return Err(SimError::parameter("normal", format!("mean must be finite ({mean})")));
        }
        if !sd.is_finite() || sd < 0.0 {
            return Err(SimError::parameter(
                "normal",
                format!("standard deviation must be finite and >= 0 ({sd})"),
            ));
        }
        if lo.is_nan() || hi.is_nan() || lo > hi {
            return Err(SimError::parameter(
                "normal",
                format!("clip bounds are inverted (lo={lo}, hi={hi})"),
            ));
        }
        let dist =
            Normal::new(mean, sd).map_err(|e| SimError::parameter("normal", format!("{e:?}")))?;
        Ok(dist.sample(&mut self.rng).clamp(lo, hi))
    }

    /// Uniform pick over a non-empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> SimResult<&'a T> {
        if items.is_empty() {
            return Err(SimError::parameter("choice", "cannot choose from an empty set"));
        }
        let idx = self.rng.gen_range(0..items.len());
        Ok(&items[idx])
    }

    /// Weighted categorical pick. Weights need not sum to one.
    pub fn choose_weighted<'a, T>(&mut self, items: &'a [T], weights: &[f64]) -> SimResult<&'a T> {
        if items.is_empty() || items.len() != weights.len() {
            return Err(SimError::parameter(
                "categorical",
                format!(
                    "need one weight per label ({} labels, {} weights)",
                    items.len(),
                    weights.len()
                ),
            ));
        }
        let dist = WeightedIndex::<f64>::new(weights)
            .map_err(|e| SimError::parameter("categorical", e.to_string()))?;
        Ok(&items[dist.sample(&mut self.rng)])
    }
}

fn check_probability(distribution: &str, p: f64) -> SimResult<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(SimError::parameter(
            distribution,
            format!("probability must lie in [0, 1] ({p})"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = RandomStream::new(42);
        let mut b = RandomStream::new(42);
        for _ in 0..32 {
            assert_eq!(a.uniform().to_bits(), b.uniform().to_bits());
            assert_eq!(
                a.beta(2.0, 5.0).unwrap().to_bits(),
                b.beta(2.0, 5.0).unwrap().to_bits()
            );
        }
    }

    #[test]
    fn negative_sd_is_rejected_not_clamped() {
        let mut s = RandomStream::new(1);
        let err = s.normal_clipped(0.5, -0.1, 0.0, 1.0).unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter { .. }));
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let mut s = RandomStream::new(1);
        assert!(s.bernoulli(1.5).is_err());
        assert!(s.bernoulli(-0.01).is_err());
        assert!(s.bernoulli(f64::NAN).is_err());
    }

    #[test]
    fn degenerate_probabilities_are_certain() {
        let mut s = RandomStream::new(3);
        for _ in 0..100 {
            assert!(!s.bernoulli(0.0).unwrap());
            assert!(s.bernoulli(1.0).unwrap());
        }
    }

    #[test]
    fn beta_rejects_non_positive_shapes() {
        let mut s = RandomStream::new(1);
        assert!(s.beta(0.0, 5.0).is_err());
        assert!(s.beta(2.0, -1.0).is_err());
    }

    #[test]
    fn clipped_normal_respects_bounds() {
        let mut s = RandomStream::new(5);
        for _ in 0..1000 {
            let x = s.normal_clipped(0.9, 0.5, 0.01, 0.99).unwrap();
            assert!((0.01..=0.99).contains(&x));
        }
    }

    #[test]
    fn choice_errors_on_bad_inputs() {
        let mut s = RandomStream::new(1);
        let empty: [u8; 0] = [];
        assert!(s.choose(&empty).is_err());
        assert!(s.choose_weighted(&[1, 2], &[0.5]).is_err());
        assert!(s.choose_weighted(&[1, 2], &[0.0, 0.0]).is_err());
    }

    #[test]
    fn weighted_choice_never_picks_zero_weight() {
        let mut s = RandomStream::new(11);
        for _ in 0..200 {
            let pick = *s.choose_weighted(&["a", "b", "c"], &[0.0, 1.0, 0.0]).unwrap();
            assert_eq!(pick, "b");
        }
    }
}
