//! GitHub Actions job summaries.

use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::report::{GuardResult, MetricScore, Reporter};

/// Appends a Markdown section per result to the Actions step summary.
///
/// Outside GitHub Actions the reporter is inert, so it can stay in the
/// default reporter list without polluting local runs.
pub struct GitHubCheckReporter {
    in_actions: bool,
    summary_path: Option<PathBuf>,
}

impl GitHubCheckReporter {
    /// Reads `GITHUB_ACTIONS` and `GITHUB_STEP_SUMMARY` once at construction.
    pub fn new() -> Self {
        Self {
            in_actions: std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true"),
            summary_path: std::env::var_os("GITHUB_STEP_SUMMARY").map(PathBuf::from),
        }
    }

    /// Write to an explicit summary file regardless of environment.
    pub fn with_summary_path(path: impl Into<PathBuf>) -> Self {
        Self {
            in_actions: true,
            summary_path: Some(path.into()),
        }
    }
}

impl Default for GitHubCheckReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Reporter for GitHubCheckReporter {
    fn name(&self) -> &str {
        "github-check"
    }

    async fn report(&self, result: &GuardResult) -> std::io::Result<()> {
        if !self.in_actions {
            tracing::debug!("not running in GitHub Actions, skipping summary");
            return Ok(());
        }

        let summary = render_summary(result);
        match &self.summary_path {
            Some(path) => {
                let mut file = tokio::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .await?;
                file.write_all(summary.as_bytes()).await?;
                // tokio::fs::File buffers internally; without this the write
                // may still be in flight when the file handle drops.
                file.flush().await
            }
            None => std::io::stdout().lock().write_all(summary.as_bytes()),
        }
    }
}

fn render_summary(result: &GuardResult) -> String {
    let verdict = if result.passed { "✅" } else { "❌" };
    let mut out = format!("## GoldGuard: {} {verdict}\n\n", result.id);

    if result.bootstrapped {
        out.push_str("Snapshot created; nothing to score yet.\n\n");
        return out;
    }

    out.push_str("| Metric | Score | Bounds | Pass |\n");
    out.push_str("| --- | --- | --- | --- |\n");
    for metric in &result.metrics {
        let symbol = if metric.passed { "✅" } else { "❌" };
        out.push_str(&format!(
            "| {} | {:.2} | {} | {symbol} |\n",
            metric.name,
            metric.value,
            bounds_cell(metric)
        ));
    }

    let passed = result.metrics.iter().filter(|m| m.passed).count();
    out.push_str(&format!(
        "\n{passed}/{} metrics passed\n",
        result.metrics.len()
    ));

    let failed: Vec<String> = result
        .metrics
        .iter()
        .filter(|m| !m.passed)
        .map(failure_detail)
        .collect();
    if !failed.is_empty() {
        out.push_str(&format!("\nFailed metrics: {}\n", failed.join(", ")));
    }

    out.push('\n');
    out
}

fn bounds_cell(metric: &MetricScore) -> String {
    match (metric.min, metric.max) {
        (Some(min), Some(max)) => format!("min {min:.2}, max {max:.2}"),
        (Some(min), None) => format!("min {min:.2}"),
        (None, Some(max)) => format!("max {max:.2}"),
        (None, None) => "-".to_string(),
    }
}

fn failure_detail(metric: &MetricScore) -> String {
    match (metric.min, metric.max) {
        (Some(min), _) if metric.value < min => {
            format!("{} ({:.2} < {min:.2})", metric.name, metric.value)
        }
        (_, Some(max)) if metric.value > max => {
            format!("{} ({:.2} > {max:.2})", metric.name, metric.value)
        }
        _ => format!("{} ({:.2})", metric.name, metric.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::sample_result;
    use tempfile::TempDir;

    #[test]
    fn summary_includes_table_count_and_failures() {
        let summary = render_summary(&sample_result());

        assert!(summary.starts_with("## GoldGuard: greet ❌\n"));
        assert!(summary.contains("| exact | 1.00 | min 1.00 | ✅ |\n"));
        assert!(summary.contains("| semantic | 0.85 | min 0.92 | ❌ |\n"));
        assert!(summary.contains("1/2 metrics passed\n"));
        assert!(summary.contains("Failed metrics: semantic (0.85 < 0.92)\n"));
    }

    #[test]
    fn bootstrap_summary_skips_the_table() {
        let mut result = sample_result();
        result.passed = true;
        result.bootstrapped = true;
        result.metrics.clear();

        let summary = render_summary(&result);
        assert!(summary.contains("Snapshot created"));
        assert!(!summary.contains("| Metric |"));
    }

    #[tokio::test]
    async fn reports_append_to_the_summary_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("summary.md");
        let reporter = GitHubCheckReporter::with_summary_path(&path);

        reporter.report(&sample_result()).await.unwrap();
        reporter.report(&sample_result()).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("## GoldGuard: greet").count(), 2);
    }

    #[tokio::test]
    async fn outside_actions_reporting_is_a_no_op() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("summary.md");
        let reporter = GitHubCheckReporter {
            in_actions: false,
            summary_path: Some(path.clone()),
        };

        reporter.report(&sample_result()).await.unwrap();
        assert!(!path.exists());
    }
}
