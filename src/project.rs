//! Project type and tech stack detection from manifest files.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

/// What the project root's manifests say about the codebase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub project_type: String,
    pub tech_stack: Vec<String>,
}

impl Default for ProjectInfo {
    fn default() -> Self {
        Self {
            project_type: "unknown".to_string(),
            tech_stack: Vec::new(),
        }
    }
}

#[derive(Deserialize, Default)]
struct PackageJson {
    #[serde(default)]
    dependencies: serde_json::Map<String, serde_json::Value>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: serde_json::Map<String, serde_json::Value>,
}

/// Inspect well-known manifest files at `root` and classify the project.
///
/// Detection is additive: a repo with both a `package.json` and a
/// `pyproject.toml` reports a combined type and the union of both stacks.
pub fn detect(root: &Path) -> ProjectInfo {
    let mut types = Vec::new();
    let mut stack = Vec::new();

    if let Some(pkg) = read_package_json(root) {
        let deps: Vec<&String> = pkg
            .dependencies
            .keys()
            .chain(pkg.dev_dependencies.keys())
            .collect();

        let mut kind = "javascript";
        if deps.iter().any(|d| d.as_str() == "typescript") {
            kind = "typescript";
        }
        for (marker, label) in [
            ("react", "React"),
            ("vue", "Vue"),
            ("next", "Next.js"),
            ("express", "Express"),
            ("svelte", "Svelte"),
        ] {
            if deps.iter().any(|d| d.as_str() == marker) {
                stack.push(label.to_string());
            }
        }
        types.push(kind.to_string());
        stack.push("Node.js".to_string());
    }

    if root.join("pyproject.toml").is_file()
        || root.join("requirements.txt").is_file()
        || root.join("setup.py").is_file()
    {
        types.push("python".to_string());
        stack.push("Python".to_string());
        for marker in python_markers(root) {
            stack.push(marker);
        }
    }

    if root.join("Cargo.toml").is_file() {
        types.push("rust".to_string());
        stack.push("Rust".to_string());
    }

    if root.join("go.mod").is_file() {
        types.push("go".to_string());
        stack.push("Go".to_string());
    }

    stack.dedup();
    let info = match types.len() {
        0 => ProjectInfo::default(),
        1 => ProjectInfo {
            project_type: types.remove(0),
            tech_stack: stack,
        },
        _ => ProjectInfo {
            project_type: format!("mixed ({})", types.join(", ")),
            tech_stack: stack,
        },
    };
    debug!("detected project type: {}", info.project_type);
    info
}

fn read_package_json(root: &Path) -> Option<PackageJson> {
    let raw = std::fs::read_to_string(root.join("package.json")).ok()?;
    serde_json::from_str(&raw).ok()
}

/// Framework markers from requirements.txt, best effort.
fn python_markers(root: &Path) -> Vec<String> {
    let Ok(raw) = std::fs::read_to_string(root.join("requirements.txt")) else {
        return Vec::new();
    };
    let mut markers = Vec::new();
    for line in raw.lines() {
        let name = line
            .split(['=', '<', '>', '~', '[', ';', ' '])
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        match name.as_str() {
            "django" => markers.push("Django".to_string()),
            "flask" => markers.push("Flask".to_string()),
            "fastapi" => markers.push("FastAPI".to_string()),
            _ => {}
        }
    }
    markers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_detect_typescript_react() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{"dependencies": {"react": "^18.0.0"}, "devDependencies": {"typescript": "^5"}}"#,
        )
        .unwrap();

        let info = detect(temp.path());
        assert_eq!(info.project_type, "typescript");
        assert!(info.tech_stack.contains(&"React".to_string()));
        assert!(info.tech_stack.contains(&"Node.js".to_string()));
    }

    #[test]
    fn test_detect_python_framework() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("requirements.txt"), "fastapi>=0.100\nuvicorn\n").unwrap();

        let info = detect(temp.path());
        assert_eq!(info.project_type, "python");
        assert!(info.tech_stack.contains(&"FastAPI".to_string()));
    }

    #[test]
    fn test_detect_mixed() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("Cargo.toml"), "[package]\nname = \"x\"\n").unwrap();
        fs::write(temp.path().join("pyproject.toml"), "[project]\nname = \"x\"\n").unwrap();

        let info = detect(temp.path());
        assert!(info.project_type.starts_with("mixed ("));
        assert!(info.project_type.contains("rust"));
        assert!(info.project_type.contains("python"));
    }

    #[test]
    fn test_detect_unknown() {
        let temp = tempfile::tempdir().unwrap();
        assert_eq!(detect(temp.path()), ProjectInfo::default());
    }

    #[test]
    fn test_malformed_package_json_ignored() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("package.json"), "{not json").unwrap();

        let info = detect(temp.path());
        assert_eq!(info.project_type, "unknown");
    }
}
