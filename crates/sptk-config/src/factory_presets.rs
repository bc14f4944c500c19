//! Factory presets bundled with the library.
//!
//! One preset per common sampling rate, each pinning the all-pass constant
//! that best approximates the mel scale at that rate. They are embedded at
//! compile time and always available.

use crate::AnalysisPreset;

/// Names of the factory presets.
pub static FACTORY_PRESET_NAMES: &[&str] = &[
    "speech-8k",
    "speech-10k",
    "speech-12k",
    "speech-16k",
    "speech-22k",
    "speech-32k",
    "speech-44k",
    "speech-48k",
];

static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("speech-8k", SPEECH_8K),
    ("speech-10k", SPEECH_10K),
    ("speech-12k", SPEECH_12K),
    ("speech-16k", SPEECH_16K),
    ("speech-22k", SPEECH_22K),
    ("speech-32k", SPEECH_32K),
    ("speech-44k", SPEECH_44K),
    ("speech-48k", SPEECH_48K),
];

const SPEECH_8K: &str = r#"
name = "speech-8k"
description = "8 kHz telephone-band speech"
sample_rate = 8000
order = 16
alpha = 0.31
fft_length = 256
"#;

const SPEECH_10K: &str = r#"
name = "speech-10k"
description = "10 kHz speech"
sample_rate = 10000
order = 18
alpha = 0.35
fft_length = 256
"#;

const SPEECH_12K: &str = r#"
name = "speech-12k"
description = "12 kHz speech"
sample_rate = 12000
order = 20
alpha = 0.37
fft_length = 512
"#;

const SPEECH_16K: &str = r#"
name = "speech-16k"
description = "16 kHz speech, 25th-order mel-cepstrum"
sample_rate = 16000
order = 24
alpha = 0.42
fft_length = 512
"#;

const SPEECH_22K: &str = r#"
name = "speech-22k"
description = "22.05 kHz speech"
sample_rate = 22050
order = 30
alpha = 0.45
fft_length = 1024
"#;

const SPEECH_32K: &str = r#"
name = "speech-32k"
description = "32 kHz speech"
sample_rate = 32000
order = 34
alpha = 0.50
fft_length = 1024
"#;

const SPEECH_44K: &str = r#"
name = "speech-44k"
description = "44.1 kHz speech and singing"
sample_rate = 44100
order = 39
alpha = 0.53
fft_length = 2048
"#;

const SPEECH_48K: &str = r#"
name = "speech-48k"
description = "48 kHz speech and singing"
sample_rate = 48000
order = 39
alpha = 0.55
fft_length = 2048
"#;

/// Get all factory presets.
///
/// ```rust
/// use sptk_config::factory_presets;
///
/// for preset in factory_presets() {
///     println!("{}: alpha = {}", preset.name, preset.alpha());
/// }
/// ```
pub fn factory_presets() -> Vec<AnalysisPreset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| AnalysisPreset::from_toml(toml).ok())
        .collect()
}

/// Get a factory preset by name. The match is case-insensitive.
pub fn get_factory_preset(name: &str) -> Option<AnalysisPreset> {
    FACTORY_PRESETS_TOML
        .iter()
        .find(|(preset_name, _)| preset_name.eq_ignore_ascii_case(name))
        .and_then(|(_, toml)| AnalysisPreset::from_toml(toml).ok())
}

/// Get the names of all factory presets.
pub fn factory_preset_names() -> Vec<&'static str> {
    FACTORY_PRESETS_TOML.iter().map(|(name, _)| *name).collect()
}

/// Check if a name refers to a factory preset (case-insensitive).
pub fn is_factory_preset(name: &str) -> bool {
    FACTORY_PRESET_NAMES
        .iter()
        .any(|preset_name| preset_name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_preset;

    #[test]
    fn test_all_factory_presets_parse() {
        assert_eq!(factory_presets().len(), FACTORY_PRESET_NAMES.len());
        assert_eq!(factory_preset_names(), FACTORY_PRESET_NAMES);
    }

    #[test]
    fn test_all_factory_presets_validate() {
        for preset in factory_presets() {
            assert!(
                validate_preset(&preset).is_ok(),
                "{} failed validation",
                preset.name
            );
        }
    }

    #[test]
    fn test_pinned_alpha_matches_rate() {
        for preset in factory_presets() {
            assert_eq!(preset.alpha, Some(crate::recommended_alpha(preset.sample_rate)));
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let preset = get_factory_preset("Speech-44K").unwrap();
        assert_eq!(preset.sample_rate, 44100);
        assert!(is_factory_preset("SPEECH-8K"));
        assert!(!is_factory_preset("speech-96k"));
        assert!(get_factory_preset("speech-96k").is_none());
    }

    #[test]
    fn test_names_match_documents() {
        for name in FACTORY_PRESET_NAMES {
            assert_eq!(get_factory_preset(name).unwrap().name, *name);
        }
    }
}
