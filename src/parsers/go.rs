//! Go signature extractor (pattern tier).
//!
//! Exported symbols are the capitalized identifiers; doc comments are the
//! `//` line directly above a declaration. Import paths collapse to their
//! final segment so `github.com/user/pkg` indexes as `pkg`.

use std::sync::LazyLock;

use regex::Regex;

use super::{ExportItem, FileSignature, LanguageParser};

static PACKAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^package\s+(\w+)").expect("package regex"));
static IMPORT_SINGLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^import\s+"([^"]+)""#).expect("single import regex"));
static IMPORT_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)import\s*\(([^)]*)\)").expect("import block regex"));
static IMPORT_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("import path regex"));
static TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?://[ \t]*([^\n]*)\n)?^type\s+(\w+)\s+(struct|interface)\s*\{")
        .expect("type regex")
});
static ALIAS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^type\s+(\w+)\s*=\s*([\w.\[\]*]+)").expect("alias regex"));
static FUNC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)(?://[ \t]*([^\n]*)\n)?^func\s+(?:\(([^)]*)\)\s*)?(\w+)\s*\(([^)]*)\)(?:[ \t]*\(([^)]*)\)|[ \t]+([\w.*\[\]]+))?",
    )
    .expect("func regex")
});

#[derive(Default)]
pub struct GoParser;

impl GoParser {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageParser for GoParser {
    fn language_name(&self) -> &'static str {
        "Go"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn parse(&self, source: &str) -> FileSignature {
        let module_doc = PACKAGE_RE
            .captures(source)
            .map(|c| format!("Package: {}", &c[1]));

        let mut found: Vec<(usize, ExportItem)> = Vec::new();
        extract_types(source, &mut found);
        extract_functions(source, &mut found);
        found.sort_by_key(|(pos, _)| *pos);

        FileSignature {
            exports: found.into_iter().map(|(_, item)| item).collect(),
            imports: extract_imports(source),
            module_doc,
            internal_deps: Vec::new(),
        }
    }
}

fn extract_imports(source: &str) -> Vec<String> {
    let mut imports = std::collections::BTreeSet::new();

    for caps in IMPORT_SINGLE_RE.captures_iter(source) {
        imports.insert(leaf_segment(&caps[1]));
    }

    for caps in IMPORT_BLOCK_RE.captures_iter(source) {
        for line in caps[1].lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            if let Some(path) = IMPORT_PATH_RE.captures(line) {
                imports.insert(leaf_segment(&path[1]));
            }
        }
    }

    imports.into_iter().collect()
}

fn leaf_segment(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

fn extract_types(source: &str, found: &mut Vec<(usize, ExportItem)>) {
    for caps in TYPE_RE.captures_iter(source) {
        let name = &caps[2];
        if !starts_uppercase(name) {
            continue;
        }
        let pos = caps.get(0).map_or(0, |m| m.start());
        let doc = caps
            .get(1)
            .map(|m| m.as_str().trim().to_string())
            .filter(|d| !d.is_empty());
        found.push((
            pos,
            ExportItem::with_doc(format!("type {} {}", name, &caps[3]), doc),
        ));
    }

    for caps in ALIAS_RE.captures_iter(source) {
        let name = &caps[1];
        if !starts_uppercase(name) {
            continue;
        }
        let pos = caps.get(0).map_or(0, |m| m.start());
        found.push((
            pos,
            ExportItem::new(format!("type {} = {}", name, &caps[2])),
        ));
    }
}

fn extract_functions(source: &str, found: &mut Vec<(usize, ExportItem)>) {
    for caps in FUNC_RE.captures_iter(source) {
        let name = &caps[3];
        if !starts_uppercase(name) {
            continue;
        }
        let pos = caps.get(0).map_or(0, |m| m.start());
        let params = simplify_params(caps.get(4).map_or("", |m| m.as_str()));

        let mut sig = match caps.get(2) {
            Some(receiver) => format!(
                "func ({}) {}({})",
                simplify_receiver(receiver.as_str()),
                name,
                params
            ),
            None => format!("func {name}({params})"),
        };

        // Multi-value returns render parenthesized and comma-joined.
        if let Some(multi) = caps.get(5) {
            sig.push_str(&format!(" {}", simplify_returns(multi.as_str())));
        } else if let Some(single) = caps.get(6) {
            sig.push_str(&format!(" {}", single.as_str()));
        }

        let doc = caps
            .get(1)
            .map(|m| m.as_str().trim().to_string())
            .filter(|d| !d.is_empty());
        found.push((pos, ExportItem::with_doc(sig, doc)));
    }
}

/// `name type` pairs keep both parts; grouped parameters keep each name.
fn simplify_params(params: &str) -> String {
    let mut simplified = Vec::new();
    for param in params.split(',') {
        let parts: Vec<&str> = param.split_whitespace().collect();
        match parts.len() {
            0 => {}
            1 => simplified.push(parts[0].to_string()),
            _ => simplified.push(format!("{} {}", parts[0], parts[parts.len() - 1])),
        }
    }
    simplified.join(", ")
}

fn simplify_receiver(receiver: &str) -> String {
    let parts: Vec<&str> = receiver.split_whitespace().collect();
    if parts.len() >= 2 {
        format!("{} {}", parts[0], parts[parts.len() - 1])
    } else {
        receiver.trim().to_string()
    }
}

fn simplify_returns(returns: &str) -> String {
    let returns = returns.trim();
    if returns.contains(',') {
        let types: Vec<&str> = returns
            .split(',')
            .filter_map(|t| t.split_whitespace().last())
            .collect();
        format!("({})", types.join(", "))
    } else {
        returns.to_string()
    }
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}
