use anyhow::Result;
use clap::Args;
use goldguard_core::{PluginKind, Registry};

#[derive(Args)]
pub struct ListArgs {}

pub fn run(_args: ListArgs) -> Result<()> {
    let mut registry = Registry::with_builtins();
    goldguard_providers::register_defaults(&mut registry)?;

    for (heading, kind) in [
        ("Metrics:", PluginKind::Metric),
        ("Providers:", PluginKind::Provider),
        ("Stores:", PluginKind::Store),
        ("Reporters:", PluginKind::Reporter),
    ] {
        println!("{heading}");
        for name in registry.list(kind) {
            println!("  {name}");
        }
        println!();
    }

    Ok(())
}
