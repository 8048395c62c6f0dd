//! arctree - Browse directories and nested archives as one tree

use anyhow::{bail, Context, Result};
use arctree_core::{flatten, read_all, walk, Node, Traversal, TraversalOptions, WalkControl};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

mod cli;
use cli::{Cli, Commands};

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let traversal = load_traversal(cli.config.as_deref())?;

    match cli.command {
        Commands::List { path, contents } => {
            let root = open_root(&path, &traversal)?;
            println!("{}", root.name());

            let mut failures = 0usize;
            walk(&root, |node, depth| {
                let indent = "  ".repeat(depth + 1);
                if let Some(container) = node.as_container() {
                    println!("{}{}/ [{}]", indent, node.name(), container.handle().format());
                } else if node.is_directory() {
                    println!("{}{}/", indent, node.name());
                } else if contents {
                    match read_all(node) {
                        Ok(bytes) => println!("{}{} ({} bytes)", indent, node.name(), bytes.len()),
                        Err(e) => {
                            failures += 1;
                            println!("{}{} (unreadable: {})", indent, node.name(), e);
                        }
                    }
                } else {
                    println!("{}{}", indent, node.name());
                }
                WalkControl::Continue
            })?;

            if failures > 0 {
                eprintln!("{} file(s) could not be read", failures);
            }
            Ok(())
        }

        Commands::Cat { path, virtual_path } => {
            let root = open_root(&path, &traversal)?;
            let node = locate(root, &virtual_path)?;
            if node.is_directory() {
                bail!("{} is a directory", virtual_path);
            }

            let mut stream = node
                .input_stream()
                .with_context(|| format!("Failed to read {}", virtual_path))?;
            let mut stdout = io::stdout().lock();
            io::copy(&mut stream, &mut stdout)?;
            stdout.flush()?;
            Ok(())
        }

        Commands::Extract { path, output } => {
            let root = open_root(&path, &traversal)?;
            println!("Extracting {} to {}", path.display(), output.display());

            let nodes = flatten(&root)?;
            let file_count = nodes.iter().filter(|(_, node)| node.is_file()).count();

            let pb = ProgressBar::new(file_count as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(PROGRESS_TEMPLATE)?
                    .progress_chars("#>-"),
            );

            fs::create_dir_all(&output)
                .with_context(|| format!("Failed to create {}", output.display()))?;

            let mut written = 0usize;
            let mut skipped = 0usize;
            for (virtual_path, node) in &nodes {
                let Some(target) = safe_join(&output, virtual_path) else {
                    pb.println(format!("Skipping unsafe path {}", virtual_path));
                    skipped += 1;
                    continue;
                };

                if node.is_directory() {
                    fs::create_dir_all(&target)
                        .with_context(|| format!("Failed to create {}", target.display()))?;
                    continue;
                }

                pb.set_message(virtual_path.clone());
                match read_all(node) {
                    Ok(bytes) => {
                        if let Some(parent) = target.parent() {
                            fs::create_dir_all(parent)?;
                        }
                        fs::write(&target, bytes)
                            .with_context(|| format!("Failed to write {}", target.display()))?;
                        written += 1;
                    }
                    Err(e) => {
                        pb.println(format!("Skipping {}: {}", virtual_path, e));
                        skipped += 1;
                    }
                }
                pb.inc(1);
            }

            pb.finish_with_message("Complete");
            println!();
            println!("Extraction complete!");
            println!("  Written: {} files", written);
            if skipped > 0 {
                println!("  Skipped: {} entries", skipped);
            }
            Ok(())
        }
    }
}

fn load_traversal(config: Option<&Path>) -> Result<Arc<Traversal>> {
    let opts = match config {
        Some(path) => TraversalOptions::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TraversalOptions::default(),
    };
    Ok(Traversal::new(opts))
}

fn open_root(path: &Path, traversal: &Arc<Traversal>) -> Result<Node> {
    Node::create_with(path, traversal).with_context(|| format!("Failed to open {}", path.display()))
}

/// Follow `virtual_path` down from `root`.
///
/// Archive entry names can contain `/`, so at each level an exact name match wins,
/// then the longest directory-like child whose name is a segment prefix of what is left.
fn locate(root: Node, virtual_path: &str) -> Result<Node> {
    let mut current = root;
    let mut rest = virtual_path.trim_matches('/').to_string();

    while !rest.is_empty() {
        let mut exact = None;
        let mut best: Option<Node> = None;
        for child in current.children()? {
            if child.name() == rest {
                exact = Some(child);
                break;
            }
            let is_prefix = child.is_directory()
                && rest
                    .strip_prefix(child.name())
                    .is_some_and(|tail| tail.starts_with('/'));
            if is_prefix && best.as_ref().map_or(true, |b| child.name().len() > b.name().len()) {
                best = Some(child);
            }
        }

        if let Some(found) = exact {
            return Ok(found);
        }
        let Some(next) = best else {
            bail!("{} not found under {}", rest, current.name());
        };
        rest = rest[next.name().len() + 1..].to_string();
        current = next;
    }

    Ok(current)
}

/// `base/virtual_path`, or `None` if the path would escape `base`.
fn safe_join(base: &Path, virtual_path: &str) -> Option<PathBuf> {
    let mut out = base.to_path_buf();
    for component in Path::new(virtual_path).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build_zip(files: &[(&str, &[u8])]) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in files {
            writer.start_file(*name, SimpleFileOptions::default())?;
            writer.write_all(content)?;
        }
        Ok(writer.finish()?.into_inner())
    }

    #[test]
    fn test_locate_through_nested_archives() -> Result<()> {
        let dir = TempDir::new()?;
        let inner = build_zip(&[("deep/world.txt", b"world")])?;
        let outer = build_zip(&[("sub/inner.zip", &inner), ("notes.txt", b"hello")])?;
        fs::write(dir.path().join("outer.zip"), outer)?;

        let traversal = load_traversal(None)?;
        let root = open_root(dir.path(), &traversal)?;
        let node = locate(root, "outer.zip/sub/inner.zip/deep/world.txt")?;

        let mut text = String::new();
        node.input_stream()?.read_to_string(&mut text)?;
        assert_eq!(text, "world");

        let root = open_root(dir.path(), &traversal)?;
        assert!(locate(root, "outer.zip/missing.txt").is_err());

        Ok(())
    }

    #[test]
    fn test_safe_join_rejects_escapes() {
        let base = Path::new("/out");
        assert_eq!(safe_join(base, "a.zip/sub/b.txt"), Some(PathBuf::from("/out/a.zip/sub/b.txt")));
        assert_eq!(safe_join(base, "./a.txt"), Some(PathBuf::from("/out/a.txt")));
        assert_eq!(safe_join(base, "a.zip/../../etc/passwd"), None);
        assert_eq!(safe_join(base, "/etc/passwd"), None);
    }
}
