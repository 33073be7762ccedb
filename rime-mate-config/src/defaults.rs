//! Fixed names, download sources and patch settings for the Wanxiang
//! language model add-on.

use crate::document::Scalar;

/// Section of a `*.custom.yaml` file that Rime applies as overrides.
pub const PATCH_SECTION: &str = "patch";

/// Custom configuration file for the rime_mint schema.
pub const CUSTOM_YAML_FILE_NAME: &str = "rime_mint.custom.yaml";

/// Language model file, stored next to the custom configuration.
pub const LANG_MODEL_FILE_NAME: &str = "wanxiang-lts-zh-hans.gram";

/// Grammar name Rime uses to locate the model file.
pub const LANG_MODEL_GRAMMAR: &str = "wanxiang-lts-zh-hans";

/// CNB mirror, tried first.
pub const LANG_MODEL_MIRROR_URL: &str =
    "https://cnb.cool/amzxyz/rime-wanxiang/-/releases/download/model/wanxiang-lts-zh-hans.gram";

/// GitHub release of the model, tried last.
pub const LANG_MODEL_ORIGIN_URL: &str =
    "https://github.com/amzxyz/RIME-LMDG/releases/download/LTS/wanxiang-lts-zh-hans.gram";

/// Download sources in priority order.
pub fn lang_model_sources() -> Vec<String> {
    vec![
        LANG_MODEL_MIRROR_URL.to_string(),
        LANG_MODEL_ORIGIN_URL.to_string(),
    ]
}

/// Patch settings that enable the language model, in the order they are
/// written to a fresh file.
pub fn lang_model_settings() -> Vec<(&'static str, Scalar)> {
    vec![
        ("grammar/language", Scalar::from(LANG_MODEL_GRAMMAR)),
        ("grammar/collocation_max_length", Scalar::Int(5)),
        ("grammar/collocation_min_length", Scalar::Int(2)),
        ("translator/contextual_suggestions", Scalar::Bool(true)),
        ("translator/max_homophones", Scalar::Int(7)),
        ("translator/max_homographs", Scalar::Int(7)),
    ]
}

/// Keys purged on removal: exactly the keys of [`lang_model_settings`].
pub fn lang_model_keys() -> Vec<&'static str> {
    lang_model_settings().into_iter().map(|(k, _)| k).collect()
}
