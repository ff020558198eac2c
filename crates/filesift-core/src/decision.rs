use crate::config::Thresholds;
use crate::error::{Error, Result};
use crate::model::Decision;

/// Maps a confidence score onto APPROVE / REVIEW / SKIP.
///
/// Each band includes its lower edge, so a confidence exactly equal to a
/// threshold lands in the higher-action band.
#[derive(Debug, Clone, Copy)]
pub struct DecisionEngine {
    approve: f64,
    review: f64,
}

impl DecisionEngine {
    pub fn new(thresholds: &Thresholds) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self {
            approve: thresholds.approve,
            review: thresholds.review,
        })
    }

    pub fn decide(&self, confidence: f64) -> Result<Decision> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(Error::InvalidConfidence(confidence));
        }

        let decision = if confidence >= self.approve {
            Decision::Approve
        } else if confidence >= self.review {
            Decision::Review
        } else {
            Decision::Skip
        };
        Ok(decision)
    }

    pub fn approve_threshold(&self) -> f64 {
        self.approve
    }

    pub fn review_threshold(&self) -> f64 {
        self.review
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(approve: f64, review: f64) -> DecisionEngine {
        DecisionEngine::new(&Thresholds { approve, review }).unwrap()
    }

    #[test]
    fn test_boundaries_resolve_upward() {
        let e = engine(0.9, 0.75);
        assert_eq!(e.decide(0.9).unwrap(), Decision::Approve);
        assert_eq!(e.decide(0.9 - f64::EPSILON).unwrap(), Decision::Review);
        assert_eq!(e.decide(0.75).unwrap(), Decision::Review);
        assert_eq!(e.decide(0.75 - f64::EPSILON).unwrap(), Decision::Skip);
    }

    #[test]
    fn test_extremes() {
        let e = engine(0.9, 0.75);
        assert_eq!(e.decide(1.0).unwrap(), Decision::Approve);
        assert_eq!(e.decide(0.0).unwrap(), Decision::Skip);
        assert_eq!(e.decide(0.5).unwrap(), Decision::Skip);
    }

    #[test]
    fn test_invalid_confidence() {
        let e = engine(0.9, 0.75);
        assert!(matches!(e.decide(1.01), Err(Error::InvalidConfidence(_))));
        assert!(matches!(e.decide(-0.1), Err(Error::InvalidConfidence(_))));
        assert!(matches!(e.decide(f64::NAN), Err(Error::InvalidConfidence(_))));
    }

    #[test]
    fn test_invalid_thresholds_rejected_at_construction() {
        let bad = [(0.5, 0.7), (1.2, 0.5), (0.9, -0.1), (f64::NAN, 0.5)];
        for (approve, review) in bad {
            let result = DecisionEngine::new(&Thresholds { approve, review });
            assert!(matches!(result, Err(Error::InvalidPolicy(_))), "{approve}/{review}");
        }
    }

    #[test]
    fn test_equal_thresholds_have_no_review_band() {
        let e = engine(0.8, 0.8);
        assert_eq!(e.decide(0.8).unwrap(), Decision::Approve);
        assert_eq!(e.decide(0.79).unwrap(), Decision::Skip);
    }

    #[test]
    fn test_deterministic() {
        let e = engine(0.9, 0.75);
        for i in 0..=100 {
            let c = i as f64 / 100.0;
            assert_eq!(e.decide(c).unwrap(), e.decide(c).unwrap());
        }
    }
}
