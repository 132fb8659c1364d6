use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,
}

const CONFIG_TEMPLATE: &str = r#"# goldguard configuration
defaults:
  provider: anthropic
  model: claude-sonnet-4-20250514
  temperature: 0.0
  metrics:
    - exact
    - "semantic>=0.92"

metrics:
  exact:
    enabled: true
  semantic:
    provider: hash-embed
    min: 0.92
  judge:
    enabled: false
    provider: openai
    model: gpt-4o-mini
    rubric_file: .goldguard/rubrics/default.md
    min: 8

snapshots:
  backend: yaml
  dir: .goldguard/snapshots

reporters:
  - console

# Spend ceiling for external schedulers; also settable via GOLDGUARD_BUDGET_USD
budget_usd: 2.0
concurrency: 3

# must-pass | any | average
fail_on: must-pass
"#;

const RUBRIC_TEMPLATE: &str = r#"# Default Evaluation Rubric

Score each criterion, then give an overall score from 0 to 10.

## Relevance (0-3)
- 3: Directly addresses the query with no digressions
- 2: Addresses the query with minor digressions
- 1: Partially addresses the query
- 0: Off-topic or unresponsive

## Accuracy (0-3)
- 3: All claims are correct and consistent with the gold response
- 2: Mostly correct with minor inaccuracies
- 1: Significant inaccuracies
- 0: Fundamentally wrong

## Completeness (0-2)
- 2: Covers everything the gold response covers
- 1: Covers the main points but misses details
- 0: Misses the main points

## Clarity (0-2)
- 2: Clear, well organized, easy to follow
- 1: Understandable with effort
- 0: Confusing or disorganized

## Scoring Guide
Sum the criteria for the overall score. 9-10 excellent, 7-8 good,
5-6 acceptable, below 5 failing.
"#;

pub fn run(args: InitArgs) -> Result<()> {
    scaffold(Path::new("."), args.force)?;
    println!("Initialized goldguard");
    Ok(())
}

/// Lay out config, snapshot directory, and rubric under `root`.
fn scaffold(root: &Path, force: bool) -> Result<()> {
    write_if_absent(&root.join(".goldguardrc.yaml"), CONFIG_TEMPLATE, force)?;

    let snapshots = root.join(".goldguard").join("snapshots");
    std::fs::create_dir_all(&snapshots)
        .with_context(|| format!("creating {}", snapshots.display()))?;

    let rubrics = root.join(".goldguard").join("rubrics");
    std::fs::create_dir_all(&rubrics).with_context(|| format!("creating {}", rubrics.display()))?;
    write_if_absent(&rubrics.join("default.md"), RUBRIC_TEMPLATE, force)?;

    Ok(())
}

fn write_if_absent(path: &Path, contents: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!("  exists  {}", path.display());
        return Ok(());
    }
    std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
    println!("  created {}", path.display());
    Ok(())
}
