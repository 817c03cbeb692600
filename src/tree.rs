//! ASCII directory tree rendering for the main index page.

use std::path::Path;

const MAX_FILES_PER_DIR: usize = 20;

/// Directories never descended into.
pub const SKIP_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "target",
    "dist",
    "build",
    "__pycache__",
    ".venv",
    "venv",
    ".idea",
    ".vscode",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    "coverage",
];

/// Render `root` as an indented ASCII tree, depth-limited.
///
/// Directories sort before files, both case-insensitively. A directory with
/// more than 20 entries of either kind is truncated with an ellipsis line;
/// an unreadable directory gets a permission marker instead of aborting the
/// render.
pub fn render(root: &Path, max_depth: usize, skip: &[String]) -> String {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.to_string_lossy().to_string());
    let mut out = format!("{name}/\n");
    render_level(root, 1, max_depth, skip, &mut out);
    out.trim_end().to_string()
}

fn render_level(dir: &Path, depth: usize, max_depth: usize, skip: &[String], out: &mut String) {
    if depth > max_depth {
        return;
    }
    let indent = "    ".repeat(depth);

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => {
            out.push_str(&format!("{indent}[permission denied]\n"));
            return;
        }
    };

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') && name != ".github" {
            continue;
        }
        if entry.path().is_dir() {
            if !SKIP_DIRS.contains(&name.as_str()) && !skip.contains(&name) {
                dirs.push(name);
            }
        } else {
            files.push(name);
        }
    }
    dirs.sort_by_key(|n| n.to_lowercase());
    files.sort_by_key(|n| n.to_lowercase());

    for name in dirs.iter().take(MAX_FILES_PER_DIR) {
        out.push_str(&format!("{indent}{name}/\n"));
        render_level(&dir.join(name), depth + 1, max_depth, skip, out);
    }
    if dirs.len() > MAX_FILES_PER_DIR {
        out.push_str(&format!(
            "{indent}... ({} more directories)\n",
            dirs.len() - MAX_FILES_PER_DIR
        ));
    }

    for name in files.iter().take(MAX_FILES_PER_DIR) {
        out.push_str(&format!("{indent}{name}\n"));
    }
    if files.len() > MAX_FILES_PER_DIR {
        out.push_str(&format!(
            "{indent}... ({} more files)\n",
            files.len() - MAX_FILES_PER_DIR
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_render_sorted_dirs_first() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("src")).unwrap();
        fs::create_dir(temp.path().join("docs")).unwrap();
        fs::write(temp.path().join("a.py"), "").unwrap();
        fs::write(temp.path().join("src").join("main.py"), "").unwrap();

        let tree = render(temp.path(), 3, &[]);
        let lines: Vec<&str> = tree.lines().collect();

        // Root, then docs/ before src/, files last.
        assert!(lines[1].trim_end().ends_with("docs/"));
        assert!(lines[2].trim_end().ends_with("src/"));
        assert!(tree.contains("main.py"));
        let a_pos = tree.find("a.py").unwrap();
        let src_pos = tree.find("src/").unwrap();
        assert!(src_pos < a_pos);
    }

    #[test]
    fn test_depth_limit() {
        let temp = tempfile::tempdir().unwrap();
        let deep = temp.path().join("a").join("b").join("c");
        fs::create_dir_all(&deep).unwrap();
        fs::write(deep.join("hidden.py"), "").unwrap();

        let tree = render(temp.path(), 2, &[]);
        assert!(tree.contains("a/"));
        assert!(tree.contains("b/"));
        assert!(!tree.contains("hidden.py"));
    }

    #[test]
    fn test_truncation() {
        let temp = tempfile::tempdir().unwrap();
        for i in 0..25 {
            fs::write(temp.path().join(format!("file_{i:02}.py")), "").unwrap();
        }

        let tree = render(temp.path(), 1, &[]);
        assert!(tree.contains("... (5 more files)"));
        assert!(tree.contains("file_00.py"));
        assert!(!tree.contains("file_24.py"));
    }

    #[test]
    fn test_skip_dirs() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("node_modules")).unwrap();
        fs::create_dir(temp.path().join("project-index")).unwrap();
        fs::create_dir(temp.path().join("src")).unwrap();

        let tree = render(temp.path(), 2, &["project-index".to_string()]);
        assert!(!tree.contains("node_modules"));
        assert!(!tree.contains("project-index"));
        assert!(tree.contains("src/"));
    }
}
