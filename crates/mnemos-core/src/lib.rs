// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Mnemos.
//!
//! Holds the error type, the adapter traits for the pipeline's external
//! collaborators (embedding provider, text extractor), and the types that
//! cross those trait boundaries.

pub mod error;
pub mod traits;
pub mod types;

pub use error::MnemosError;
pub use traits::{EmbeddingAdapter, PluginAdapter, TextExtractor};
pub use types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnemos_error_has_all_variants() {
        let _config = MnemosError::Config("test".into());
        let _storage = MnemosError::storage(std::io::Error::other("test"));
        let _busy = MnemosError::StorageBusy { attempts: 5 };
        let _embedding = MnemosError::Embedding {
            message: "test".into(),
            source: None,
        };
        let _extraction = MnemosError::Extraction {
            path: "/tmp/a.txt".into(),
            source: Box::new(std::io::Error::other("test")),
        };
        let _watcher = MnemosError::Watcher {
            message: "test".into(),
            source: None,
        };
        let _internal = MnemosError::Internal("test".into());
    }

    #[test]
    fn dimension_mismatch_message_names_both_sizes() {
        let err = MnemosError::DimensionMismatch {
            expected: 3072,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "embedding dimension mismatch: expected 3072, got 2"
        );
    }

    #[test]
    fn extraction_error_displays_path() {
        let err = MnemosError::Extraction {
            path: "/tmp/report.pdf".into(),
            source: Box::new(std::io::Error::other("bad xref")),
        };
        assert!(err.to_string().contains("/tmp/report.pdf"));
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [AdapterType::Embedding, AdapterType::Extractor] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn adapter_type_serialization() {
        let json = serde_json::to_string(&AdapterType::Embedding).expect("should serialize");
        let parsed: AdapterType = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(parsed, AdapterType::Embedding);
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        assert_ne!(HealthStatus::Degraded("slow".into()), healthy);
        assert_ne!(HealthStatus::Unhealthy("down".into()), healthy);
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_embedding_adapter<T: EmbeddingAdapter>() {}
        fn _assert_text_extractor<T: TextExtractor>() {}
    }
}
