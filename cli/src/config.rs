use std::path::{Path, PathBuf};

use controllers::GeneratorConfig;
use serde::Deserialize;

/// Optional project file passed with `--config`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub generator: GeneratorConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub id_source: Option<PathBuf>,
    pub combinations: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl ConfigFile {
    /// Relative paths in the file are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
        let mut config: ConfigFile = toml::from_str(&text)
            .map_err(|e| format!("invalid config '{}': {}", path.display(), e))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for slot in [
            &mut config.paths.id_source,
            &mut config.paths.combinations,
            &mut config.paths.output,
        ] {
            if let Some(p) = slot.as_mut() {
                if p.is_relative() {
                    *p = base.join(&*p);
                }
            }
        }
        Ok(config)
    }
}

/// `<stem>-new.dmx` next to the ID source.
pub fn default_output_path(id_source: &Path) -> PathBuf {
    let stem = id_source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("controllers");
    id_source.with_file_name(format!("{}-new.dmx", stem))
}
