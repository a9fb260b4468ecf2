use serde::Deserialize;

/// Soft limit on the number of controllers the consuming application handles.
pub const DEFAULT_SOFT_LIMIT: usize = 128;

/// Per-run generator settings. Loadable from the `[generator]` table of a TOML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Exceeding this count produces a warning, never an error.
    pub soft_limit: usize,
    /// Type tag of the blocks read from both documents and written to the output.
    pub marker: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            soft_limit: DEFAULT_SOFT_LIMIT,
            marker: kv2::COMBINATION_INPUT_CONTROL.to_string(),
        }
    }
}
