//! Canned verdict phrases keyed by fixed confidence thresholds.
//! Purely presentational; nothing downstream reads these strings.

pub const HIGH_CONFIDENCE: f32 = 0.90;
pub const CLEAR_CONFIDENCE: f32 = 0.75;

/// Picks the templated message for a label/score pair.
pub fn verdict(label: &str, score: f32) -> String {
    let tone = label.to_lowercase();
    if score >= HIGH_CONFIDENCE {
        format!("The model is highly confident: this reads as extremely {}.", tone)
    } else if score >= CLEAR_CONFIDENCE {
        format!("This reads as clearly {}.", tone)
    } else {
        format!("This leans {}, but the signal is weak.", tone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_confidence_negative_phrase() {
        assert_eq!(
            verdict("NEGATIVE", 0.95),
            "The model is highly confident: this reads as extremely negative."
        );
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        assert!(verdict("POSITIVE", 0.90).contains("extremely"));
        assert!(verdict("POSITIVE", 0.75).contains("clearly"));
        assert!(verdict("POSITIVE", 0.749).contains("signal is weak"));
    }

    #[test]
    fn test_emotion_labels_are_lowercased() {
        assert!(verdict("JOY", 0.8).contains("clearly joy"));
    }
}
