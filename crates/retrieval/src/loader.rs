//! Knowledge corpus loader.
//!
//! The corpus is a plain-text file of passages. Passages are separated by
//! rule lines (four or more `=` characters) when present, otherwise by
//! blank lines. Each passage keeps a `file#index` source tag for status
//! and debug display.

use std::path::Path;

use cropsage_core::Passage;
use cropsage_core::error::RetrievalError;

/// Load all passages from a corpus file.
pub fn load_passages(path: &Path) -> Result<Vec<Passage>, RetrievalError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        RetrievalError::Unavailable(format!(
            "cannot read knowledge corpus at {}: {e}",
            path.display()
        ))
    })?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "corpus".into());

    Ok(split_passages(&content)
        .into_iter()
        .enumerate()
        .map(|(i, block)| Passage {
            content: block,
            source: Some(format!("{stem}#{i}")),
            score: 0.0,
        })
        .collect())
}

fn is_rule(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 4 && trimmed.chars().all(|c| c == '=')
}

fn split_passages(content: &str) -> Vec<String> {
    let uses_rules = content.lines().any(is_rule);

    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in content.lines() {
        let boundary = if uses_rules {
            is_rule(line)
        } else {
            line.trim().is_empty()
        };

        if boundary {
            flush(&mut current, &mut blocks);
        } else {
            current.push(line);
        }
    }
    flush(&mut current, &mut blocks);

    blocks
}

fn flush(current: &mut Vec<&str>, blocks: &mut Vec<String>) {
    if current.is_empty() {
        return;
    }
    let block = current.join("\n").trim().to_string();
    current.clear();
    if !block.is_empty() {
        blocks.push(block);
    }
}
