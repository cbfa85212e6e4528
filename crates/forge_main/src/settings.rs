use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use config::builder::DefaultState;
use forge_markdown_stream::RenderConfig;

/// Prefix of environment variables overriding renderer settings.
const ENV_PREFIX: &str = "FORGE_MD";

/// Loads renderer settings from an optional TOML file and `FORGE_MD__*`
/// environment variables. Missing keys keep their defaults.
pub fn load(path: Option<&Path>) -> Result<RenderConfig> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml));
    }
    let builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("reserved"),
    );

    resolve(builder).with_context(|| match path {
        Some(path) => format!("Failed to load settings from {}", path.display()),
        None => "Failed to load settings from the environment".to_string(),
    })
}

fn resolve(builder: ConfigBuilder<DefaultState>) -> Result<RenderConfig> {
    Ok(builder.build()?.try_deserialize()?)
}
