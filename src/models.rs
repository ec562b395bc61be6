//! The two-entry table mapping an operating mode to a pre-trained model.

use std::fmt;

/// Operating mode of the page. Each mode is bound to exactly one
/// pre-trained text-classification model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Binary sentiment analysis, open to everyone.
    Basic,
    /// Fine-grained emotion detection, behind the access gate.
    Advanced,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Basic, Mode::Advanced];

    /// Stable tag used in forms and logs.
    pub fn tag(&self) -> &'static str {
        match self {
            Mode::Basic => "basic",
            Mode::Advanced => "advanced",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Mode> {
        match tag {
            "basic" => Some(Mode::Basic),
            "advanced" => Some(Mode::Advanced),
            _ => None,
        }
    }

    /// Label shown next to the mode radio control.
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Basic => "Basic (Sentiment Analysis)",
            Mode::Advanced => "Advanced (Emotion Detection)",
        }
    }

    /// Resolves the mode to its pre-trained model.
    pub fn model_spec(&self) -> &'static ModelSpec {
        match self {
            Mode::Basic => &SENTIMENT_ROBERTA,
            Mode::Advanced => &GO_EMOTIONS_ROBERTA,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// How raw logits become scores in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Single-label head: scores sum to 1.
    Softmax,
    /// Multi-label head: each label scored independently.
    Sigmoid,
}

/// Everything needed to fetch and run one pre-trained model.
#[derive(Debug)]
pub struct ModelSpec {
    /// Directory name inside the local model cache.
    pub name: &'static str,
    /// Upstream model identifier, shown in the page footer.
    pub model_id: &'static str,
    pub model_url: &'static str,
    pub tokenizer_url: &'static str,
    /// Pinned SHA-256 digests; verified when present, logged otherwise.
    pub model_sha256: Option<&'static str>,
    pub tokenizer_sha256: Option<&'static str>,
    /// Output labels in id order (the model's id2label table).
    pub labels: &'static [&'static str],
    pub activation: Activation,
    pub max_sequence_length: usize,
}

pub static SENTIMENT_ROBERTA: ModelSpec = ModelSpec {
    name: "sentiment-roberta-large-english",
    model_id: "siebert/sentiment-roberta-large-english",
    model_url:
        "https://huggingface.co/siebert/sentiment-roberta-large-english/resolve/main/onnx/model.onnx",
    tokenizer_url:
        "https://huggingface.co/siebert/sentiment-roberta-large-english/resolve/main/tokenizer.json",
    model_sha256: None,
    tokenizer_sha256: None,
    labels: &["NEGATIVE", "POSITIVE"],
    activation: Activation::Softmax,
    max_sequence_length: 512,
};

pub static GO_EMOTIONS_ROBERTA: ModelSpec = ModelSpec {
    name: "roberta-base-go_emotions",
    model_id: "SamLowe/roberta-base-go_emotions",
    model_url:
        "https://huggingface.co/SamLowe/roberta-base-go_emotions-onnx/resolve/main/onnx/model.onnx",
    tokenizer_url:
        "https://huggingface.co/SamLowe/roberta-base-go_emotions/resolve/main/tokenizer.json",
    model_sha256: None,
    tokenizer_sha256: None,
    labels: &[
        "admiration",
        "amusement",
        "anger",
        "annoyance",
        "approval",
        "caring",
        "confusion",
        "curiosity",
        "desire",
        "disappointment",
        "disapproval",
        "disgust",
        "embarrassment",
        "excitement",
        "fear",
        "gratitude",
        "grief",
        "joy",
        "love",
        "nervousness",
        "optimism",
        "pride",
        "realization",
        "relief",
        "remorse",
        "sadness",
        "surprise",
        "neutral",
    ],
    activation: Activation::Sigmoid,
    max_sequence_length: 512,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_tags_round_trip() {
        for mode in Mode::ALL {
            assert_eq!(Mode::from_tag(mode.tag()), Some(mode));
        }
        assert_eq!(Mode::from_tag("expert"), None);
    }

    #[test]
    fn test_registry_has_two_entries() {
        assert_eq!(Mode::ALL.len(), 2);
        assert_ne!(
            Mode::Basic.model_spec().model_id,
            Mode::Advanced.model_spec().model_id
        );
    }

    #[test]
    fn test_basic_model_is_binary_sentiment() {
        let spec = Mode::Basic.model_spec();
        assert_eq!(spec.labels, ["NEGATIVE", "POSITIVE"]);
        assert_eq!(spec.activation, Activation::Softmax);
    }

    #[test]
    fn test_advanced_model_covers_go_emotions() {
        let spec = Mode::Advanced.model_spec();
        assert_eq!(spec.labels.len(), 28);
        assert!(spec.labels.contains(&"neutral"));
        assert_eq!(spec.activation, Activation::Sigmoid);
    }
}
