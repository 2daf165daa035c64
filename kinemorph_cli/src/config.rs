// kinemorph_cli/src/config.rs

//! Layered pipeline settings: built-in defaults, then an optional TOML file,
//! then `KINEMORPH_` environment variables.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use kinemorph_core::pipeline::PipelineConfig;
use std::path::Path;

/// Prefix of the environment variables read into the configuration. Nested
/// keys are separated by a double underscore, e.g.
/// `KINEMORPH_CONDITIONER__WINDOW=5`.
pub const ENV_PREFIX: &str = "KINEMORPH_";

/// The provider stack without extracting it.
pub fn figment(file: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(PipelineConfig::default()));
    if let Some(path) = file {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Loads the pipeline settings. Values are checked when the pipeline is built.
pub fn load_config(file: Option<&Path>) -> Result<PipelineConfig, figment::Error> {
    figment(file).extract()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_any_source() {
        let config: PipelineConfig = Figment::from(Serialized::defaults(PipelineConfig::default()))
            .extract()
            .unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn toml_overrides_single_fields() {
        let config: PipelineConfig = Figment::from(Serialized::defaults(PipelineConfig::default()))
            .merge(Toml::string("[conditioner]\nwindow = 7\nfilter_hands = false\n"))
            .extract()
            .unwrap();
        assert_eq!(config.conditioner.window, 7);
        assert!(!config.conditioner.filter_hands);
        assert_eq!(
            config.conditioner.process_noise,
            PipelineConfig::default().conditioner.process_noise
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<PipelineConfig, _> =
            Figment::from(Serialized::defaults(PipelineConfig::default()))
                .merge(Toml::string("[conditioner]\nwindw = 7\n"))
                .extract();
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("kinemorph-does-not-exist.toml");
        let config: PipelineConfig = Figment::from(Serialized::defaults(PipelineConfig::default()))
            .merge(Toml::file(&path))
            .extract()
            .unwrap();
        assert_eq!(config, PipelineConfig::default());
    }
}
