//! TypeScript/JavaScript signature extractor (pattern tier).
//!
//! Regex-level declaration discovery over `export` statements. Cheap and
//! good enough for the common single-line forms; exotic multi-line
//! declarations may be missed, which is the documented trade-off of this
//! tier versus the Tree-sitter extractors.

use std::sync::LazyLock;

use regex::Regex;

use super::{ExportItem, FileSignature, LanguageParser};

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)import\s+[^;'"]*?\s*from\s+['"]([^'"]+)['"]"#).expect("import regex")
});
static REQUIRE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"require\s*\(\s*['"]([^'"]+)['"]\s*\)"#).expect("require regex")
});
static FUNC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)export\s+(async\s+)?function\s+(\w+)\s*(<[^>]*>)?\s*\(([^)]*)\)(?:\s*:\s*([^\n{]+))?")
        .expect("function regex")
});
static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)export\s+(?:abstract\s+)?class\s+(\w+)(?:<[^>]*>)?(?:\s+extends\s+(\w+))?")
        .expect("class regex")
});
static INTERFACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)export\s+interface\s+(\w+)").expect("interface regex"));
static TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)export\s+type\s+(\w+)(?:<[^>]*>)?\s*=").expect("type regex")
});
static VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)export\s+(const|let|var)\s+(\w+)(?:\s*:\s*([^=\n]+))?\s*=").expect("var regex")
});
static ENUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)export\s+enum\s+(\w+)").expect("enum regex"));
static DEFAULT_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"export\s+default\s+class\s+(\w+)").expect("default class regex")
});
static DEFAULT_FUNC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"export\s+default\s+(?:async\s+)?function\s+(\w+)").expect("default fn regex")
});
static DEFAULT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"export\s+default\s+").expect("default regex"));
static PARAM_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)\??").expect("param regex"));

#[derive(Default)]
pub struct TypeScriptParser;

impl TypeScriptParser {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageParser for TypeScriptParser {
    fn language_name(&self) -> &'static str {
        "TypeScript/JavaScript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["ts", "tsx", "js", "jsx", "mjs", "cjs"]
    }

    fn parse(&self, source: &str) -> FileSignature {
        let (imports, internal_deps) = extract_imports(source);
        FileSignature {
            exports: extract_exports(source),
            imports,
            module_doc: None,
            internal_deps,
        }
    }
}

fn extract_imports(source: &str) -> (Vec<String>, Vec<String>) {
    let mut external = std::collections::BTreeSet::new();
    let mut internal = Vec::new();

    for caps in IMPORT_RE
        .captures_iter(source)
        .chain(REQUIRE_RE.captures_iter(source))
    {
        let module = &caps[1];
        if module.starts_with('.') {
            if !internal.iter().any(|m| m == module) {
                internal.push(module.to_string());
            }
        } else {
            external.insert(module.to_string());
        }
    }

    (external.into_iter().collect(), internal)
}

/// All exported declarations, ordered by position in the source so that
/// repeated parses of the same text are byte-identical.
fn extract_exports(source: &str) -> Vec<ExportItem> {
    let mut found: Vec<(usize, String)> = Vec::new();

    for caps in FUNC_RE.captures_iter(source) {
        let start = caps.get(0).map_or(0, |m| m.start());
        let is_async = caps.get(1).map_or("", |_| "async ");
        let name = &caps[2];
        let generics = caps.get(3).map_or("", |m| m.as_str());
        let params = simplify_params(caps.get(4).map_or("", |m| m.as_str()));
        let sig = match caps.get(5) {
            Some(ret) => format!(
                "{is_async}function {name}{generics}({params}): {}",
                ret.as_str().trim()
            ),
            None => format!("{is_async}function {name}{generics}({params})"),
        };
        found.push((start, sig));
    }

    for caps in CLASS_RE.captures_iter(source) {
        let start = caps.get(0).map_or(0, |m| m.start());
        let name = &caps[1];
        let sig = match caps.get(2) {
            Some(base) => format!("class {name} extends {}", base.as_str()),
            None => format!("class {name}"),
        };
        found.push((start, sig));
    }

    for caps in INTERFACE_RE.captures_iter(source) {
        found.push((
            caps.get(0).map_or(0, |m| m.start()),
            format!("interface {}", &caps[1]),
        ));
    }

    for caps in TYPE_RE.captures_iter(source) {
        found.push((
            caps.get(0).map_or(0, |m| m.start()),
            format!("type {}", &caps[1]),
        ));
    }

    for caps in VAR_RE.captures_iter(source) {
        let start = caps.get(0).map_or(0, |m| m.start());
        let kind = &caps[1];
        let name = &caps[2];
        let sig = match caps.get(3) {
            Some(ty) => format!("{kind} {name}: {}", ty.as_str().trim()),
            None => format!("{kind} {name}"),
        };
        found.push((start, sig));
    }

    for caps in ENUM_RE.captures_iter(source) {
        found.push((
            caps.get(0).map_or(0, |m| m.start()),
            format!("enum {}", &caps[1]),
        ));
    }

    if let Some(m) = DEFAULT_RE.find(source) {
        let sig = if let Some(caps) = DEFAULT_CLASS_RE.captures(source) {
            format!("default class {}", &caps[1])
        } else if let Some(caps) = DEFAULT_FUNC_RE.captures(source) {
            format!("default function {}", &caps[1])
        } else {
            "default export".to_string()
        };
        found.push((m.start(), sig));
    }

    found.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    found
        .into_iter()
        .map(|(_, sig)| ExportItem::new(sig))
        .collect()
}

/// Reduce a parameter list to names only, tracking bracket depth so typed
/// and destructured parameters split correctly.
fn simplify_params(params: &str) -> String {
    if params.trim().is_empty() {
        return String::new();
    }

    let mut simplified = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;

    for ch in params.chars() {
        match ch {
            '(' | '<' | '{' | '[' => {
                depth += 1;
                current.push(ch);
            }
            ')' | '>' | '}' | ']' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                simplified.push(extract_param_name(&current));
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        simplified.push(extract_param_name(&current));
    }

    simplified.retain(|p| !p.is_empty());
    simplified.join(", ")
}

fn extract_param_name(param: &str) -> String {
    let param = param.trim();
    if param.is_empty() {
        return String::new();
    }

    // Destructuring patterns keep their shape, minus the type annotation.
    if param.starts_with('{') || param.starts_with('[') {
        return param
            .split(':')
            .next()
            .unwrap_or(param)
            .trim()
            .to_string();
    }

    let param = param.trim_start_matches("...");
    PARAM_NAME_RE
        .captures(param)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| param.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> FileSignature {
        TypeScriptParser::new().parse(source)
    }

    #[test]
    fn test_exported_declarations() {
        let sig = parse(
            r#"
import { Injectable } from '@angular/core';
import axios from 'axios';
import { helper } from './helper';

export class AuthService {
}

export function checkAuthToken(token: string): boolean {
  return true;
}

export const MAX_RETRIES: number = 3;

export interface Credentials {}

export type TokenPair = [string, string];

export enum Role { Admin, User }
"#,
        );
        let sigs: Vec<&str> = sig.exports.iter().map(|e| e.signature.as_str()).collect();
        assert_eq!(
            sigs,
            vec![
                "class AuthService",
                "function checkAuthToken(token): boolean",
                "const MAX_RETRIES: number",
                "interface Credentials",
                "type TokenPair",
                "enum Role",
            ]
        );
        assert_eq!(sig.imports, vec!["@angular/core", "axios"]);
        assert_eq!(sig.internal_deps, vec!["./helper"]);
    }

    #[test]
    fn test_async_and_generics() {
        let sig = parse("export async function load<T>(id: number, opts?: Options): Promise<T> {}");
        assert_eq!(
            sig.exports[0].signature,
            "async function load<T>(id, opts): Promise<T>"
        );
    }

    #[test]
    fn test_class_extends() {
        let sig = parse("export abstract class Repo extends BaseRepo {}");
        assert_eq!(sig.exports[0].signature, "class Repo extends BaseRepo");
    }

    #[test]
    fn test_default_export() {
        let sig = parse("export default class App {}");
        assert_eq!(sig.exports[0].signature, "default class App");

        let sig = parse("const x = 1;\nexport default x;\n");
        assert_eq!(sig.exports[0].signature, "default export");
    }

    #[test]
    fn test_destructured_params() {
        let sig = parse("export function draw({ x, y }: Point, [a, b]: Pair, ...rest: number[]) {}");
        assert_eq!(
            sig.exports[0].signature,
            "function draw({ x, y }, [a, b], rest)"
        );
    }

    #[test]
    fn test_require_imports() {
        let sig = parse("const fs = require('fs');\nconst local = require('./local');\n");
        assert_eq!(sig.imports, vec!["fs"]);
        assert_eq!(sig.internal_deps, vec!["./local"]);
    }

    #[test]
    fn test_determinism() {
        let source = "export function a() {}\nexport class B {}\n";
        assert_eq!(parse(source), parse(source));
    }
}
