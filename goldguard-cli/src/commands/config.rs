use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use goldguard_core::ConfigLoader;

#[derive(Args)]
pub struct ConfigArgs {
    /// Load from this file instead of searching the working directory
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    let config = match args.config {
        Some(path) => ConfigLoader::load_from(path)?,
        None => ConfigLoader::load()?,
    };

    let rendered = serde_yaml::to_string(&config).context("rendering configuration")?;
    print!("{rendered}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use goldguard_core::CoreConfig;

    #[test]
    fn resolved_config_renders_as_yaml() {
        let rendered = serde_yaml::to_string(&CoreConfig::default()).unwrap();

        assert!(rendered.contains("provider: anthropic"));
        assert!(rendered.contains("fail_on: must-pass"));
        assert!(rendered.contains("backend: yaml"));
    }
}
