//! Text-generation backend clients for CropSage.
//!
//! All backends implement the `cropsage_core::Generator` trait. The only
//! wire protocol spoken is OpenAI-style chat completions, which covers
//! OpenAI, Groq, Azure OpenAI, and Ollama.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatGenerator;

use std::sync::Arc;

use cropsage_config::AppConfig;
use cropsage_core::Generator;
use cropsage_core::error::GenerationError;

/// Build the generation backend from configuration.
///
/// Resolution happens exactly once at startup. `Ok(None)` means the
/// backend is explicitly disabled (no credentials); a misconfigured
/// backend is a hard error, never a silent fallback.
pub fn build_from_config(config: &AppConfig) -> Result<Option<Arc<dyn Generator>>, GenerationError> {
    let generation = &config.generation;
    let key = generation.api_key.clone();

    let generator = match generation.backend.as_str() {
        "ollama" => OpenAiCompatGenerator::ollama(generation.api_url.as_deref(), generation),
        "openai" => match key {
            Some(key) => OpenAiCompatGenerator::openai(key, generation),
            None => return Ok(None),
        },
        "groq" => match key {
            Some(key) => OpenAiCompatGenerator::groq(key, generation),
            None => return Ok(None),
        },
        "azure" => match (key, &generation.api_url) {
            (Some(key), Some(endpoint)) => {
                OpenAiCompatGenerator::azure(endpoint, key, generation)
            }
            (None, _) => return Ok(None),
            (_, None) => {
                return Err(GenerationError::Unconfigured(
                    "backend 'azure' requires generation.api_url".into(),
                ));
            }
        },
        "custom" => match &generation.api_url {
            Some(url) => OpenAiCompatGenerator::new(
                "custom",
                url,
                key.unwrap_or_default(),
                generation,
            ),
            None => {
                return Err(GenerationError::Unconfigured(
                    "backend 'custom' requires generation.api_url".into(),
                ));
            }
        },
        other => {
            return Err(GenerationError::Unconfigured(format!(
                "unknown generation backend '{other}'"
            )));
        }
    };

    Ok(Some(Arc::new(generator)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_disables_generation() {
        let config = AppConfig::default();
        assert!(build_from_config(&config).unwrap().is_none());
    }

    #[test]
    fn groq_key_enables_generation() {
        let mut config = AppConfig::default();
        config.generation.api_key = Some("gsk-test".into());
        let generator = build_from_config(&config).unwrap().unwrap();
        assert_eq!(generator.name(), "groq");
    }

    #[test]
    fn ollama_enabled_without_key() {
        let mut config = AppConfig::default();
        config.generation.backend = "ollama".into();
        let generator = build_from_config(&config).unwrap().unwrap();
        assert_eq!(generator.name(), "ollama");
    }

    #[test]
    fn azure_without_url_is_a_hard_error() {
        let mut config = AppConfig::default();
        config.generation.backend = "azure".into();
        config.generation.api_key = Some("key".into());
        assert!(build_from_config(&config).is_err());
    }

    #[test]
    fn unknown_backend_is_a_hard_error() {
        let mut config = AppConfig::default();
        config.generation.backend = "carrier-pigeon".into();
        config.generation.api_key = Some("key".into());
        assert!(build_from_config(&config).is_err());
    }
}
