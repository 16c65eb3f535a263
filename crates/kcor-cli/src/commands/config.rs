use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use kcor_core::pipeline::config::StreamConfig;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save a full default StreamConfig as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let mut config = StreamConfig::new(
        PathBuf::from("stream_data"),
        PathBuf::from("aerosol"),
    );
    config.luts.root = PathBuf::from("luts");
    config.luts.identifier = "20200615".into();
    config.luts.camera_ids = vec!["rcam".into(), "tcam".into()];
    let toml_str = toml::to_string_pretty(&config)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
