//! Size-bounded artifact writing.
//!
//! Directory reports are split into multiple artifacts only at section
//! boundaries (the `\n---\n` file separator). The limit is a soft target:
//! a single section larger than the limit is written as one oversized chunk
//! rather than truncated or split mid-section.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Separator marking file-to-file transitions inside a directory report.
pub const SECTION_SEPARATOR: &str = "\n---\n";

/// Greedy first-fit split of `content` at section boundaries.
///
/// Each section keeps its trailing separator, so the returned chunks are
/// contiguous slices of the input: concatenating them in order reproduces
/// `content` byte for byte.
pub fn split_sections(content: &str, limit: usize) -> Vec<String> {
    if content.len() <= limit {
        return vec![content.to_string()];
    }

    let mut sections: Vec<&str> = Vec::new();
    let mut rest = content;
    while let Some(idx) = rest.find(SECTION_SEPARATOR) {
        let end = idx + SECTION_SEPARATOR.len();
        sections.push(&rest[..end]);
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        sections.push(rest);
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    for section in sections {
        if !current.is_empty() && current.len() + section.len() > limit {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(section);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Write `content` under `out_dir` as `<base_name>.md`, or as numbered
/// `<base_name>_partN.md` artifacts when it exceeds `limit`.
///
/// Parts after the first carry a `# <base_name> (Part N)` marker so a reader
/// can reconstruct ordering; the marker is a write-time prefix, not part of
/// the packed content.
pub fn write_chunked(
    content: &str,
    out_dir: &Path,
    base_name: &str,
    limit: usize,
) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    remove_existing_artifacts(out_dir, base_name)?;

    let chunks = split_sections(content, limit);
    let mut written = Vec::with_capacity(chunks.len());

    if chunks.len() == 1 {
        let path = out_dir.join(format!("{base_name}.md"));
        fs::write(&path, &chunks[0])?;
        written.push(path);
    } else {
        debug!(
            "splitting {base_name}: {} chars into {} parts",
            content.len(),
            chunks.len()
        );
        for (i, chunk) in chunks.iter().enumerate() {
            let part = i + 1;
            let path = out_dir.join(format!("{base_name}_part{part}.md"));
            if part > 1 {
                fs::write(&path, format!("# {base_name} (Part {part})\n\n{chunk}"))?;
            } else {
                fs::write(&path, chunk)?;
            }
            written.push(path);
        }
    }

    Ok(written)
}

/// Delete every artifact previously written for `base_name`, whichever form
/// it took. A report that shrinks back under the limit must not leave
/// `_partN` files behind (and vice versa), or the main index would link both
/// the current and the superseded content.
fn remove_existing_artifacts(out_dir: &Path, base_name: &str) -> io::Result<()> {
    for entry in fs::read_dir(out_dir)? {
        let path = entry?.path();
        let belongs = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| is_artifact_of(n, base_name));
        if belongs {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

fn is_artifact_of(file_name: &str, base_name: &str) -> bool {
    let Some(stem) = file_name.strip_suffix(".md") else {
        return false;
    };
    if stem == base_name {
        return true;
    }
    stem.strip_prefix(base_name)
        .and_then(|rest| rest.strip_prefix("_part"))
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with_sections(section_size: usize, count: usize) -> String {
        let mut out = String::new();
        for i in 0..count {
            let header = format!("### file_{i}.py\n");
            out.push_str(&header);
            out.push_str(&"x".repeat(section_size - header.len() - SECTION_SEPARATOR.len()));
            out.push_str(SECTION_SEPARATOR);
        }
        out
    }

    #[test]
    fn test_fits_in_one_chunk() {
        let content = "short report";
        assert_eq!(split_sections(content, 1000), vec![content.to_string()]);
    }

    #[test]
    fn test_round_trip_reproduces_content() {
        let content = report_with_sections(5_000, 8); // 40k chars
        assert_eq!(content.len(), 40_000);

        let chunks = split_sections(&content, 32_000);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks.concat(), content);
    }

    #[test]
    fn test_no_section_split_across_chunks() {
        let content = report_with_sections(5_000, 8);
        for chunk in split_sections(&content, 32_000) {
            // Every chunk holds whole sections: it must end exactly at a
            // section boundary (or be the tail of the content).
            assert!(
                chunk.ends_with(SECTION_SEPARATOR),
                "chunk does not end at a section boundary"
            );
            assert_eq!(chunk.len() % 5_000, 0);
        }
    }

    #[test]
    fn test_greedy_packing_is_minimal() {
        // 8 sections of 5k with a 32k limit: 6 fit in the first chunk,
        // 2 in the second.
        let content = report_with_sections(5_000, 8);
        let chunks = split_sections(&content, 32_000);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 30_000);
        assert_eq!(chunks[1].len(), 10_000);
    }

    #[test]
    fn test_oversized_single_section() {
        let mut content = String::from("header");
        content.push_str(&"y".repeat(50_000));
        // No separator anywhere: one oversized chunk, nothing truncated.
        let chunks = split_sections(&content, 32_000);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], content);
    }

    #[test]
    fn test_oversized_section_between_normal_ones() {
        let mut content = String::new();
        content.push_str("aaa");
        content.push_str(SECTION_SEPARATOR);
        content.push_str(&"b".repeat(500));
        content.push_str(SECTION_SEPARATOR);
        content.push_str("ccc");

        let chunks = split_sections(&content, 100);
        assert_eq!(chunks.concat(), content);
        // Middle section exceeds the limit on its own and stays whole.
        assert!(chunks.iter().any(|c| c.contains(&"b".repeat(500))));
        assert!(chunks.len() >= 2);
    }

    #[test]
    fn test_write_chunked_part_markers() {
        let temp = tempfile::tempdir().unwrap();
        let content = report_with_sections(5_000, 8);

        let written = write_chunked(&content, temp.path(), "src_api", 32_000).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written[0].ends_with("src_api_part1.md"));
        assert!(written[1].ends_with("src_api_part2.md"));

        let part1 = std::fs::read_to_string(&written[0]).unwrap();
        let part2 = std::fs::read_to_string(&written[1]).unwrap();
        assert!(!part1.starts_with("# src_api (Part"));
        assert!(part2.starts_with("# src_api (Part 2)\n\n"));

        // Stripping the part marker restores the original content.
        let restored = format!(
            "{part1}{}",
            part2.strip_prefix("# src_api (Part 2)\n\n").unwrap()
        );
        assert_eq!(restored, content);
    }

    #[test]
    fn test_form_switch_removes_stale_artifacts() {
        let temp = tempfile::tempdir().unwrap();
        let large = report_with_sections(5_000, 8);

        let written = write_chunked(&large, temp.path(), "root", 32_000).unwrap();
        assert_eq!(written.len(), 2);

        // A neighboring artifact with a shared prefix must survive the swap.
        std::fs::write(temp.path().join("rooter.md"), "other dir").unwrap();

        // Shrunk below the limit: the single form replaces both parts.
        let written = write_chunked("small again", temp.path(), "root", 32_000).unwrap();
        assert_eq!(written.len(), 1);
        assert!(temp.path().join("root.md").exists());
        assert!(!temp.path().join("root_part1.md").exists());
        assert!(!temp.path().join("root_part2.md").exists());
        assert!(temp.path().join("rooter.md").exists());

        // Growing again removes the single form.
        write_chunked(&large, temp.path(), "root", 32_000).unwrap();
        assert!(!temp.path().join("root.md").exists());
        assert!(temp.path().join("root_part1.md").exists());
        assert!(temp.path().join("root_part2.md").exists());
    }

    #[test]
    fn test_write_single_artifact() {
        let temp = tempfile::tempdir().unwrap();
        let written = write_chunked("small", temp.path(), "root", 32_000).unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("root.md"));
        assert_eq!(std::fs::read_to_string(&written[0]).unwrap(), "small");
    }
}
