/// Engine-wide knobs, usually loaded from the `[engine]` table of a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Exposes `__schema` and `__type` on the query root.
    pub introspection: bool,
    /// Default list completion mode for fields that don't override it.
    pub concurrent_list_items: bool,
    /// Upper bound of list items completed at the same time.
    pub max_concurrency: usize,
    /// Deepest list/object nesting accepted in arguments and variables.
    pub max_input_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            introspection: true,
            concurrent_list_items: true,
            max_concurrency: 64,
            max_input_depth: 64,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid engine settings: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("max_concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("max_input_depth must be at least 1")]
    ZeroInputDepth,
}

impl Settings {
    pub fn from_toml(source: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(source)?;

        if settings.max_concurrency == 0 {
            return Err(SettingsError::ZeroConcurrency);
        }

        if settings.max_input_depth == 0 {
            return Err(SettingsError::ZeroInputDepth);
        }

        Ok(settings)
    }
}
