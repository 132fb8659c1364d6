use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use goldguard_core::{ConfigLoader, Snapshot};

#[derive(Args)]
pub struct SnapshotArgs {
    #[command(subcommand)]
    pub command: SnapshotCommands,

    /// Snapshot directory (defaults to the configured one)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum SnapshotCommands {
    /// List stored snapshots, optionally for a single guard
    List { id: Option<String> },
    /// Print one snapshot in full (the digest may be a unique prefix)
    Show { id: String, digest: String },
    /// Delete one snapshot, or every snapshot for a guard
    Rm { id: String, digest: Option<String> },
}

pub fn run(args: SnapshotArgs) -> Result<()> {
    let root = match args.dir {
        Some(dir) => dir,
        None => ConfigLoader::load()?.snapshots.dir,
    };
    tracing::debug!(dir = %root.display(), "using snapshot directory");

    match args.command {
        SnapshotCommands::List { id } => list(&root, id.as_deref()),
        SnapshotCommands::Show { id, digest } => show(&root, &id, &digest),
        SnapshotCommands::Rm { id, digest } => rm(&root, &id, digest.as_deref()),
    }
}

/// One stored snapshot file, addressed by guard id and argument digest.
#[derive(Debug)]
struct StoredEntry {
    id: String,
    digest: String,
    path: PathBuf,
}

const PREVIEW_AT: usize = 80;

fn list(root: &Path, filter: Option<&str>) -> Result<()> {
    let entries = collect(root, filter)?;
    if entries.is_empty() {
        println!("no snapshots under {}", root.display());
        return Ok(());
    }

    for entry in entries {
        let snapshot = load_snapshot(&entry.path)?;
        println!(
            "{}  {}  {}",
            entry.id,
            short(&entry.digest),
            snapshot.timestamp.to_rfc3339()
        );
        println!("    {}", preview(&snapshot.answer));
    }

    Ok(())
}

fn show(root: &Path, id: &str, digest: &str) -> Result<()> {
    let entry = find_by_prefix(root, id, digest)?;
    let snapshot = load_snapshot(&entry.path)?;

    println!("ID:        {}", snapshot.id);
    println!("Digest:    {}", entry.digest);
    println!("Recorded:  {}", snapshot.timestamp.to_rfc3339());
    println!();
    println!("Prompt:");
    println!("{}", snapshot.prompt);
    println!();
    println!("Answer:");
    println!("{}", snapshot.answer);

    Ok(())
}

fn rm(root: &Path, id: &str, digest: Option<&str>) -> Result<()> {
    match digest {
        Some(prefix) => {
            let entry = find_by_prefix(root, id, prefix)?;
            fs::remove_file(&entry.path)
                .with_context(|| format!("removing {}", entry.path.display()))?;
            println!("removed {}", entry.path.display());
        }
        None => {
            let dir = root.join(id);
            if !dir.is_dir() {
                bail!("no snapshots for '{id}' under {}", root.display());
            }
            fs::remove_dir_all(&dir).with_context(|| format!("removing {}", dir.display()))?;
            println!("removed {}", dir.display());
        }
    }

    Ok(())
}

/// Walk `<root>/<id>/<digest>.yaml`, sorted by id then digest.
///
/// Directory names are the store's sanitized guard ids.
fn collect(root: &Path, filter: Option<&str>) -> Result<Vec<StoredEntry>> {
    let mut entries = Vec::new();
    if !root.is_dir() {
        return Ok(entries);
    }

    for guard_dir in fs::read_dir(root).with_context(|| format!("reading {}", root.display()))? {
        let guard_dir = guard_dir?;
        if !guard_dir.file_type()?.is_dir() {
            continue;
        }
        let id = guard_dir.file_name().to_string_lossy().into_owned();
        if filter.is_some_and(|want| want != id) {
            continue;
        }

        for file in fs::read_dir(guard_dir.path())? {
            let path = file?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            let Some(digest) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            entries.push(StoredEntry {
                id: id.clone(),
                digest: digest.to_string(),
                path: path.clone(),
            });
        }
    }

    entries.sort_by(|a, b| (&a.id, &a.digest).cmp(&(&b.id, &b.digest)));
    Ok(entries)
}

fn find_by_prefix(root: &Path, id: &str, prefix: &str) -> Result<StoredEntry> {
    let mut matches: Vec<StoredEntry> = collect(root, Some(id))?
        .into_iter()
        .filter(|entry| entry.digest.starts_with(prefix))
        .collect();

    match matches.len() {
        0 => bail!("no snapshot matching '{prefix}' for '{id}'"),
        1 => Ok(matches.remove(0)),
        n => bail!("'{prefix}' is ambiguous: {n} snapshots for '{id}' match"),
    }
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_yaml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn short(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}

fn preview(text: &str) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= PREVIEW_AT {
        return flat;
    }
    let cut: String = flat.chars().take(PREVIEW_AT).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed(root: &Path, id: &str, digest: &str, answer: &str) {
        let dir = root.join(id);
        fs::create_dir_all(&dir).unwrap();
        let snapshot = Snapshot::new(id, "{\"q\":\"hi\"}", answer);
        let raw = serde_yaml::to_string(&snapshot).unwrap();
        fs::write(dir.join(format!("{digest}.yaml")), raw).unwrap();
    }

    #[test]
    fn collect_walks_ids_and_digests_in_order() {
        let tmp = TempDir::new().unwrap();
        seed(tmp.path(), "beta", "bb11", "two");
        seed(tmp.path(), "alpha", "aa22", "one");
        seed(tmp.path(), "alpha", "aa11", "zero");

        let entries = collect(tmp.path(), None).unwrap();

        let keys: Vec<(&str, &str)> = entries
            .iter()
            .map(|e| (e.id.as_str(), e.digest.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![("alpha", "aa11"), ("alpha", "aa22"), ("beta", "bb11")]
        );
    }

    #[test]
    fn collect_filters_to_one_guard() {
        let tmp = TempDir::new().unwrap();
        seed(tmp.path(), "alpha", "aa11", "one");
        seed(tmp.path(), "beta", "bb11", "two");

        let entries = collect(tmp.path(), Some("beta")).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "beta");
    }

    #[test]
    fn collect_on_a_missing_root_is_empty() {
        let tmp = TempDir::new().unwrap();
        let entries = collect(&tmp.path().join("nope"), None).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn collect_skips_non_yaml_files() {
        let tmp = TempDir::new().unwrap();
        seed(tmp.path(), "alpha", "aa11", "one");
        fs::write(tmp.path().join("alpha").join("notes.txt"), "scratch").unwrap();

        let entries = collect(tmp.path(), None).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].digest, "aa11");
    }

    #[test]
    fn prefix_lookup_resolves_a_unique_match() {
        let tmp = TempDir::new().unwrap();
        seed(tmp.path(), "alpha", "aa11", "one");
        seed(tmp.path(), "alpha", "bb22", "two");

        let entry = find_by_prefix(tmp.path(), "alpha", "bb").unwrap();

        assert_eq!(entry.digest, "bb22");
    }

    #[test]
    fn prefix_lookup_rejects_ambiguity() {
        let tmp = TempDir::new().unwrap();
        seed(tmp.path(), "alpha", "aa11", "one");
        seed(tmp.path(), "alpha", "aa22", "two");

        let err = find_by_prefix(tmp.path(), "alpha", "aa").unwrap_err();

        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn prefix_lookup_errors_when_nothing_matches() {
        let tmp = TempDir::new().unwrap();
        seed(tmp.path(), "alpha", "aa11", "one");

        let err = find_by_prefix(tmp.path(), "alpha", "zz").unwrap_err();

        assert!(err.to_string().contains("no snapshot matching"));
    }

    #[test]
    fn rm_with_a_digest_removes_only_that_file() {
        let tmp = TempDir::new().unwrap();
        seed(tmp.path(), "alpha", "aa11", "one");
        seed(tmp.path(), "alpha", "bb22", "two");

        rm(tmp.path(), "alpha", Some("aa")).unwrap();

        assert!(!tmp.path().join("alpha/aa11.yaml").exists());
        assert!(tmp.path().join("alpha/bb22.yaml").exists());
    }

    #[test]
    fn rm_without_a_digest_removes_the_guard_directory() {
        let tmp = TempDir::new().unwrap();
        seed(tmp.path(), "alpha", "aa11", "one");

        rm(tmp.path(), "alpha", None).unwrap();

        assert!(!tmp.path().join("alpha").exists());
    }

    #[test]
    fn rm_for_an_unknown_guard_fails() {
        let tmp = TempDir::new().unwrap();
        let err = rm(tmp.path(), "ghost", None).unwrap_err();
        assert!(err.to_string().contains("no snapshots for 'ghost'"));
    }

    #[test]
    fn preview_flattens_and_truncates() {
        assert_eq!(preview("short\nanswer"), "short answer");

        let long = "x".repeat(200);
        let cut = preview(&long);
        assert_eq!(cut.chars().count(), PREVIEW_AT + 3);
        assert!(cut.ends_with("..."));
    }
}
