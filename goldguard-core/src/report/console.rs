//! Human-readable result blocks on stdout.

use std::io::Write;

use async_trait::async_trait;

use crate::report::{GuardResult, MetricScore, Reporter};

const TRUNCATE_AT: usize = 100;

/// Prints one block per result.
pub struct ConsoleReporter;

#[async_trait]
impl Reporter for ConsoleReporter {
    fn name(&self) -> &str {
        "console"
    }

    async fn report(&self, result: &GuardResult) -> std::io::Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(format_block(result).as_bytes())
    }
}

fn format_block(result: &GuardResult) -> String {
    let mut out = String::new();

    out.push_str("=== GoldGuard Result ===\n");
    out.push_str(&format!("ID: {}\n", result.id));
    out.push_str(&format!(
        "Pass: {}\n",
        if result.passed { "✅ YES" } else { "❌ NO" }
    ));

    if result.bootstrapped {
        out.push_str("Bootstrap: snapshot created\n");
    }

    if !result.metrics.is_empty() {
        out.push_str("Metrics:\n");
        for metric in &result.metrics {
            out.push_str(&format_metric(metric));
        }
    }

    out.push_str(&format!("Prompt: {}\n", truncate(&result.prompt)));
    out.push_str(&format!("Gold: {}\n", truncate(&result.gold_answer)));
    out.push_str(&format!("Fresh: {}\n", truncate(&result.fresh_answer)));
    out.push_str(&format!("Duration: {}ms\n", result.duration_ms));
    out.push_str(&format!("Cost: ${:.4}\n", result.cost_usd));
    out.push('\n');

    out
}

fn format_metric(metric: &MetricScore) -> String {
    let symbol = if metric.passed { "✅" } else { "❌" };
    let bounds = match (metric.min, metric.max) {
        (Some(min), Some(max)) => format!(" (min: {min:.2}, max: {max:.2})"),
        (Some(min), None) => format!(" (threshold: {min:.2})"),
        (None, Some(max)) => format!(" (max: {max:.2})"),
        (None, None) => String::new(),
    };
    format!("  {symbol} {}: {:.2}{bounds}\n", metric.name, metric.value)
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= TRUNCATE_AT {
        return text.to_string();
    }
    let head: String = text.chars().take(TRUNCATE_AT).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::sample_result;

    #[test]
    fn block_shows_verdict_and_metric_lines() {
        let block = format_block(&sample_result());

        assert!(block.starts_with("=== GoldGuard Result ===\nID: greet\nPass: ❌ NO\n"));
        assert!(block.contains("  ✅ exact: 1.00 (threshold: 1.00)\n"));
        assert!(block.contains("  ❌ semantic: 0.85 (threshold: 0.92)\n"));
        assert!(block.contains("Duration: 42ms\n"));
        assert!(block.contains("Cost: $0.0001\n"));
    }

    #[test]
    fn bootstrap_results_note_the_new_snapshot() {
        let mut result = sample_result();
        result.passed = true;
        result.bootstrapped = true;
        result.metrics.clear();

        let block = format_block(&result);

        assert!(block.contains("Pass: ✅ YES\n"));
        assert!(block.contains("Bootstrap: snapshot created\n"));
        assert!(!block.contains("Metrics:"));
    }

    #[test]
    fn long_texts_are_truncated() {
        let mut result = sample_result();
        result.fresh_answer = "x".repeat(250);

        let block = format_block(&result);
        let expected = format!("Fresh: {}...\n", "x".repeat(100));
        assert!(block.contains(&expected));
    }

    #[test]
    fn max_only_bounds_render_as_max() {
        let metric = MetricScore {
            name: "length".to_string(),
            value: 0.5,
            passed: true,
            min: None,
            max: Some(0.9),
            must_pass: false,
            cost_usd: 0.0,
        };
        assert_eq!(format_metric(&metric), "  ✅ length: 0.50 (max: 0.90)\n");
    }
}
