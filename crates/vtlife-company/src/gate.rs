//! Skip gate for the daily scheduling step.

use rand::Rng;

/// Decides whether this cycle skips scheduling a shoot.
pub trait SkipDecider: Send {
    fn should_skip(&mut self) -> bool;
}

impl<F> SkipDecider for F
where
    F: FnMut() -> bool + Send,
{
    fn should_skip(&mut self) -> bool {
        self()
    }
}

/// Skips with probability `p` using the thread-local RNG.
#[derive(Debug, Clone, Copy)]
pub struct RandomSkip {
    probability: f64,
}

impl RandomSkip {
    pub fn new(probability: f64) -> Self {
        let probability = if probability.is_finite() {
            probability.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { probability }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl SkipDecider for RandomSkip {
    fn should_skip(&mut self) -> bool {
        rand::thread_rng().gen_bool(self.probability)
    }
}

/// Always the same answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedSkip(pub bool);

impl SkipDecider for FixedSkip {
    fn should_skip(&mut self) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_skip_extremes() {
        let mut never = RandomSkip::new(0.0);
        let mut always = RandomSkip::new(1.0);
        for _ in 0..100 {
            assert!(!never.should_skip());
            assert!(always.should_skip());
        }
    }

    #[test]
    fn test_probability_is_clamped() {
        assert_eq!(RandomSkip::new(3.0).probability(), 1.0);
        assert_eq!(RandomSkip::new(-1.0).probability(), 0.0);
        assert_eq!(RandomSkip::new(f64::NAN).probability(), 0.0);
    }

    #[test]
    fn test_closure_decider() {
        let mut answers = vec![true, false].into_iter();
        let mut decider = move || answers.next().unwrap_or(false);
        assert!(decider.should_skip());
        assert!(!decider.should_skip());
    }
}
