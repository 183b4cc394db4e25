//! Handoff configuration types.

use serde::{Deserialize, Serialize};

/// Segment sizing for a request's shared cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffConfig {
    /// Input segment capacity in words.
    pub input_words: usize,
    /// Output segment capacity in words.
    pub output_words: usize,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        // 256 words = 1 KiB per segment
        Self {
            input_words: 256,
            output_words: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sizes() {
        let config = HandoffConfig::default();
        assert_eq!(config.input_words, 256);
        assert_eq!(config.output_words, 256);
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = HandoffConfig {
            input_words: 2,
            output_words: 1,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: HandoffConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
