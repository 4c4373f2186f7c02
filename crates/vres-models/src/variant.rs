//! Derived variants produced by external processing.

use serde::{Deserialize, Serialize};

/// One derived rendition of a processed video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Platform file reference for the rendition.
    pub file_id: String,
    pub width: u32,
    pub height: u32,
    /// Size in bytes.
    pub file_size: u64,
}

/// The set of variants detected for a completed job.
///
/// Opaque to the engine: it is carried from the completion probe to the
/// delivery call without inspection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantSet(pub Vec<Variant>);

impl VariantSet {
    pub fn new(variants: Vec<Variant>) -> Self {
        Self(variants)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_set_counts() {
        let set = VariantSet::new(vec![Variant {
            file_id: "abc".into(),
            width: 1280,
            height: 720,
            file_size: 1024,
        }]);
        assert_eq!(set.len(), 1);
        assert!(!set.is_empty());
    }
}
