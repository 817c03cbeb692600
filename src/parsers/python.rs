//! Python signature extractor backed by Tree-sitter (structured tier).
//!
//! The syntax-tree walk is what makes multi-line signatures, decorators, and
//! docstrings come out right; a regex pass over Python gets all three wrong.

use tree_sitter::{Node, Parser};

use super::{ExportItem, FileSignature, LanguageParser};

/// Private-named methods kept anyway because they define a type's public
/// contract (construction, string conversion, equality, hashing, call).
const SPECIAL_METHODS: &[&str] = &[
    "__init__", "__str__", "__repr__", "__eq__", "__hash__", "__call__",
];

/// Decorators too noisy to surface.
const SKIPPED_DECORATORS: &[&str] = &["overload"];

pub struct PythonParser;

impl LanguageParser for PythonParser {
    fn language_name(&self) -> &'static str {
        "Python"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py", "pyi"]
    }

    fn parse(&self, source: &str) -> FileSignature {
        let mut parser = Parser::new();
        if parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .is_err()
        {
            return FileSignature::parse_failure();
        }
        let Some(tree) = parser.parse(source, None) else {
            return FileSignature::parse_failure();
        };
        let root = tree.root_node();
        if root.kind() != "module" {
            return FileSignature::parse_failure();
        }

        let src = source.as_bytes();
        let mut sig = FileSignature {
            module_doc: module_docstring(root, src),
            ..FileSignature::default()
        };
        let mut imports = std::collections::BTreeSet::new();

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            process_top_level(child, src, &mut sig, &mut imports);
        }

        sig.imports = imports.into_iter().collect();
        sig
    }
}

fn process_top_level(
    node: Node,
    src: &[u8],
    sig: &mut FileSignature,
    imports: &mut std::collections::BTreeSet<String>,
) {
    match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            for name in node.named_children(&mut cursor) {
                let target = match name.kind() {
                    "aliased_import" => name.child_by_field_name("name"),
                    "dotted_name" => Some(name),
                    _ => None,
                };
                if let Some(module) = target.and_then(|n| text(n, src)) {
                    imports.insert(top_segment(&module));
                }
            }
        }
        "import_from_statement" => {
            if let Some(module) = node.child_by_field_name("module_name") {
                if module.kind() == "relative_import" {
                    if let Some(t) = text(module, src) {
                        sig.internal_deps.push(t);
                    }
                } else if let Some(t) = text(module, src) {
                    imports.insert(top_segment(&t));
                }
            }
        }
        "decorated_definition" => {
            let decorators = decorator_names(node, src);
            if let Some(def) = node.child_by_field_name("definition") {
                match def.kind() {
                    "class_definition" => process_class(def, src, &decorators, sig),
                    "function_definition" => {
                        if let Some(item) = function_item(def, src, &decorators, None) {
                            sig.exports.push(item);
                        }
                    }
                    _ => {}
                }
            }
        }
        "class_definition" => process_class(node, src, &[], sig),
        "function_definition" => {
            if let Some(item) = function_item(node, src, &[], None) {
                sig.exports.push(item);
            }
        }
        _ => {}
    }
}

fn process_class(node: Node, src: &[u8], decorators: &[String], sig: &mut FileSignature) {
    let Some(name) = node.child_by_field_name("name").and_then(|n| text(n, src)) else {
        return;
    };
    // Private classes stay out, dunder-named ones stay in.
    if name.starts_with('_') && !name.starts_with("__") {
        return;
    }

    let bases = superclass_names(node, src);
    let base_str = if bases.is_empty() {
        String::new()
    } else {
        format!("({})", bases.join(", "))
    };
    let signature = format!(
        "{}class {}{}",
        decorator_prefix(decorators),
        name,
        base_str
    );
    sig.exports.push(ExportItem::with_doc(
        signature,
        body_docstring(node, src),
    ));

    let Some(body) = node.child_by_field_name("body") else {
        return;
    };
    let mut cursor = body.walk();
    for child in body.named_children(&mut cursor) {
        let (def, method_decorators) = if child.kind() == "decorated_definition" {
            let decs = decorator_names(child, src);
            match child.child_by_field_name("definition") {
                Some(d) => (d, decs),
                None => continue,
            }
        } else {
            (child, Vec::new())
        };
        if def.kind() == "function_definition" {
            if let Some(item) = function_item(def, src, &method_decorators, Some(&name)) {
                sig.exports.push(item);
            }
        }
    }
}

/// Build the normalized one-line signature for a function or method.
/// Returns `None` when the name fails the visibility filter.
fn function_item(
    node: Node,
    src: &[u8],
    decorators: &[String],
    class_name: Option<&str>,
) -> Option<ExportItem> {
    let name = text(node.child_by_field_name("name")?, src)?;

    if name.starts_with('_') && !SPECIAL_METHODS.contains(&name.as_str()) {
        return None;
    }

    let async_prefix = if node
        .child(0)
        .is_some_and(|c| c.kind() == "async")
    {
        "async "
    } else {
        ""
    };
    let params = node
        .child_by_field_name("parameters")
        .map(|p| parameter_names(p, src))
        .unwrap_or_default();
    let return_suffix = node
        .child_by_field_name("return_type")
        .and_then(|r| text(r, src))
        .map(|r| format!(" -> {}", compact(&r)))
        .unwrap_or_default();

    // Methods are indented display entries under their class and keep only
    // the first decorator; top-level functions keep all of them.
    let signature = if class_name.is_some() {
        let dec = decorators
            .first()
            .map(|d| format!("@{d} "))
            .unwrap_or_default();
        format!("  {dec}{async_prefix}def {name}({params}){return_suffix}")
    } else {
        format!(
            "{}{async_prefix}def {name}({params}){return_suffix}",
            decorator_prefix(decorators)
        )
    };

    Some(ExportItem::with_doc(signature, body_docstring(node, src)))
}

/// Parameter list reduced to names only; types and defaults are stripped so
/// the signature stays short and stable.
fn parameter_names(params: Node, src: &[u8]) -> String {
    let mut names = Vec::new();
    let mut cursor = params.walk();
    for param in params.named_children(&mut cursor) {
        let name = match param.kind() {
            "identifier" => text(param, src),
            "typed_parameter" => param.named_child(0).and_then(|n| text(n, src)),
            "default_parameter" | "typed_default_parameter" => param
                .child_by_field_name("name")
                .and_then(|n| text(n, src)),
            "list_splat_pattern" | "dictionary_splat_pattern" => text(param, src),
            _ => None,
        };
        if let Some(name) = name {
            if name != "self" && name != "cls" {
                names.push(name);
            }
        }
    }
    names.join(", ")
}

fn superclass_names(class: Node, src: &[u8]) -> Vec<String> {
    let Some(args) = class.child_by_field_name("superclasses") else {
        return Vec::new();
    };
    let mut cursor = args.walk();
    args.named_children(&mut cursor)
        .filter(|n| n.kind() != "keyword_argument")
        .filter_map(|n| text(n, src))
        .map(|t| compact(&t))
        .collect()
}

fn decorator_names(node: Node, src: &[u8]) -> Vec<String> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|c| c.kind() == "decorator")
        .filter_map(|c| text(c, src))
        .map(|t| {
            let t = t.trim_start_matches('@');
            t.split('(').next().unwrap_or(t).trim().to_string()
        })
        .filter(|name| !name.is_empty() && !SKIPPED_DECORATORS.contains(&name.as_str()))
        .collect()
}

fn decorator_prefix(decorators: &[String]) -> String {
    if decorators.is_empty() {
        String::new()
    } else {
        format!("@{} ", decorators.join(", @"))
    }
}

/// First line of the module-level docstring, if present.
fn module_docstring(root: Node, src: &[u8]) -> Option<String> {
    docstring_of_block(root, src)
}

/// First line of the docstring found in a definition's body block.
fn body_docstring(def: Node, src: &[u8]) -> Option<String> {
    let body = def.child_by_field_name("body")?;
    docstring_of_block(body, src)
}

fn docstring_of_block(block: Node, src: &[u8]) -> Option<String> {
    let first = block.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let string = first.named_child(0)?;
    if string.kind() != "string" {
        return None;
    }
    let raw = text(string, src)?;
    let line = strip_string_quotes(&raw).lines().next()?.trim().to_string();
    if line.is_empty() { None } else { Some(line) }
}

fn strip_string_quotes(raw: &str) -> &str {
    let s = raw
        .trim()
        .trim_start_matches(['r', 'R', 'b', 'B', 'f', 'F', 'u', 'U']);
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(rest) = s.strip_prefix(quote) {
            return rest.strip_suffix(quote).unwrap_or(rest);
        }
    }
    s
}

fn top_segment(module: &str) -> String {
    module.split('.').next().unwrap_or(module).to_string()
}

fn compact(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn text(node: Node, src: &[u8]) -> Option<String> {
    node.utf8_text(src).ok().map(|t| t.to_string())
}
