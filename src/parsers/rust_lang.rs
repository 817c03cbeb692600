//! Rust signature extractor backed by Tree-sitter (structured tier).
//!
//! Visibility follows the language rather than a naming convention: an item
//! is exported when it carries a plain `pub`. Methods inside `impl` blocks
//! are rendered as indented entries under the impl header.

use tree_sitter::{Node, Parser};

use super::{ExportItem, FileSignature, LanguageParser};

pub struct RustParser;

impl LanguageParser for RustParser {
    fn language_name(&self) -> &'static str {
        "Rust"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["rs"]
    }

    fn parse(&self, source: &str) -> FileSignature {
        let mut parser = Parser::new();
        if parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .is_err()
        {
            return FileSignature::parse_failure();
        }
        let Some(tree) = parser.parse(source, None) else {
            return FileSignature::parse_failure();
        };
        let root = tree.root_node();
        if root.kind() != "source_file" {
            return FileSignature::parse_failure();
        }

        let src = source.as_bytes();
        let mut sig = FileSignature {
            module_doc: inner_doc_line(root, src),
            ..FileSignature::default()
        };
        let mut imports = std::collections::BTreeSet::new();

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            process_item(child, src, &mut sig, &mut imports);
        }

        sig.imports = imports.into_iter().collect();
        sig
    }
}

fn process_item(
    node: Node,
    src: &[u8],
    sig: &mut FileSignature,
    imports: &mut std::collections::BTreeSet<String>,
) {
    match node.kind() {
        "use_declaration" => {
            if let Some(arg) = node.child_by_field_name("argument") {
                classify_use(&node_text(arg, src), sig, imports);
            }
        }
        "function_item" => {
            if is_pub(node, src) {
                let signature = function_signature(node, src, "");
                sig.exports
                    .push(ExportItem::with_doc(signature, doc_line(node, src)));
            }
        }
        "struct_item" | "enum_item" | "trait_item" | "type_item" | "union_item" => {
            if is_pub(node, src) {
                if let Some(name) = field_text(node, "name", src) {
                    let kind = node.kind().trim_end_matches("_item");
                    sig.exports.push(ExportItem::with_doc(
                        format!("{kind} {name}"),
                        doc_line(node, src),
                    ));
                }
            }
        }
        "const_item" | "static_item" => {
            if is_pub(node, src) {
                if let Some(name) = field_text(node, "name", src) {
                    let kind = node.kind().trim_end_matches("_item");
                    sig.exports.push(ExportItem::with_doc(
                        format!("{kind} {name}"),
                        doc_line(node, src),
                    ));
                }
            }
        }
        "mod_item" => {
            // Declaration-only modules (`pub mod foo;`) are navigation hints.
            if is_pub(node, src) && node.child_by_field_name("body").is_none() {
                if let Some(name) = field_text(node, "name", src) {
                    sig.exports.push(ExportItem::with_doc(
                        format!("mod {name}"),
                        doc_line(node, src),
                    ));
                }
            }
        }
        "impl_item" => process_impl(node, src, sig),
        _ => {}
    }
}

fn process_impl(node: Node, src: &[u8], sig: &mut FileSignature) {
    let Some(type_name) = field_text(node, "type", src) else {
        return;
    };
    let trait_name = field_text(node, "trait", src);
    let is_trait_impl = trait_name.is_some();

    let Some(body) = node.child_by_field_name("body") else {
        return;
    };
    let mut methods = Vec::new();
    let mut cursor = body.walk();
    for child in body.named_children(&mut cursor) {
        if child.kind() != "function_item" {
            continue;
        }
        // Trait-impl methods inherit the trait's visibility.
        if !is_trait_impl && !is_pub(child, src) {
            continue;
        }
        methods.push(ExportItem::with_doc(
            function_signature(child, src, "  "),
            doc_line(child, src),
        ));
    }

    // Impl headers with nothing visible underneath are noise.
    if methods.is_empty() {
        return;
    }

    let header = match trait_name {
        Some(t) => format!("impl {t} for {type_name}"),
        None => format!("impl {type_name}"),
    };
    sig.exports
        .push(ExportItem::with_doc(header, doc_line(node, src)));
    sig.exports.extend(methods);
}

fn function_signature(node: Node, src: &[u8], indent: &str) -> String {
    let name = field_text(node, "name", src).unwrap_or_default();
    let params = node
        .child_by_field_name("parameters")
        .map(|p| parameter_names(p, src))
        .unwrap_or_default();
    let ret = node
        .child_by_field_name("return_type")
        .map(|r| format!(" -> {}", compact(&node_text(r, src))))
        .unwrap_or_default();
    let asyncness = if has_modifier(node, src, "async") {
        "async "
    } else {
        ""
    };
    format!("{indent}{asyncness}fn {name}({params}){ret}")
}

/// Parameter patterns only; types are stripped. `self` receivers are elided.
fn parameter_names(params: Node, src: &[u8]) -> String {
    let mut names = Vec::new();
    let mut cursor = params.walk();
    for param in params.named_children(&mut cursor) {
        match param.kind() {
            "parameter" => {
                if let Some(pattern) = param.child_by_field_name("pattern") {
                    names.push(compact(&node_text(pattern, src)));
                }
            }
            "self_parameter" => {}
            "variadic_parameter" => names.push("...".to_string()),
            _ => {}
        }
    }
    names.join(", ")
}

/// `use` arguments rooted at `crate`/`self`/`super` are intra-project; the
/// rest contribute their root crate name to the external import set.
fn classify_use(
    argument: &str,
    sig: &mut FileSignature,
    imports: &mut std::collections::BTreeSet<String>,
) {
    let compacted = compact(argument);
    let root = compacted
        .split("::")
        .next()
        .unwrap_or(&compacted)
        .trim()
        .to_string();
    match root.as_str() {
        "crate" | "self" | "super" => sig.internal_deps.push(compacted),
        "" => {}
        _ => {
            imports.insert(root);
        }
    }
}

fn is_pub(node: Node, src: &[u8]) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .any(|c| c.kind() == "visibility_modifier" && node_text(c, src) == "pub")
}

fn has_modifier(node: Node, src: &[u8], modifier: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .take_while(|c| c.kind() != "identifier")
        .any(|c| node_text(c, src).split_whitespace().any(|t| t == modifier))
}

/// First line of the `///` block immediately above an item.
fn doc_line(node: Node, src: &[u8]) -> Option<String> {
    let mut docs = Vec::new();
    let mut prev = node.prev_sibling();
    while let Some(p) = prev {
        // Attributes may sit between the doc block and the item.
        if p.kind() == "attribute_item" {
            prev = p.prev_sibling();
            continue;
        }
        if p.kind() != "line_comment" {
            break;
        }
        let t = node_text(p, src);
        if let Some(stripped) = t.strip_prefix("///") {
            docs.push(stripped.trim().to_string());
        } else {
            break;
        }
        prev = p.prev_sibling();
    }
    docs.reverse();
    docs.into_iter().find(|d| !d.is_empty())
}

/// First `//!` line of the file, used as the module doc.
fn inner_doc_line(root: Node, src: &[u8]) -> Option<String> {
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        match child.kind() {
            "line_comment" => {
                let t = node_text(child, src);
                if let Some(stripped) = t.strip_prefix("//!") {
                    let line = stripped.trim();
                    if !line.is_empty() {
                        return Some(line.to_string());
                    }
                } else {
                    return None;
                }
            }
            _ => return None,
        }
    }
    None
}

fn field_text(node: Node, field: &str, src: &[u8]) -> Option<String> {
    node.child_by_field_name(field)
        .map(|n| compact(&node_text(n, src)))
}

fn node_text(node: Node, src: &[u8]) -> String {
    node.utf8_text(src).unwrap_or_default().to_string()
}

fn compact(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
