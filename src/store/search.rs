//! Symbol search over the persisted index.

use rusqlite::{Result, params};

use super::MetaStore;

/// One search match: which file, which symbol, and the full normalized
/// signature shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub path: String,
    pub symbol: String,
    pub context: String,
}

impl MetaStore {
    /// Substring match against both the symbol name and its full signature.
    ///
    /// Uses SQLite `LIKE`, which is case-insensitive for ASCII — that is the
    /// documented matching semantics. `%`, `_`, and `\` in the query are
    /// escaped so they match literally; underscores are everywhere in symbol
    /// names. Results are deduplicated by (path, symbol) and ordered by
    /// (path, symbol) so a fixed query against unchanged data is stable.
    /// No relevance ranking.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let pattern = format!("%{}%", escape_like(query));
        let mut stmt = self.conn.prepare(
            r#"
            SELECT path, symbol, MIN(context)
            FROM search_index
            WHERE symbol LIKE ?1 ESCAPE '\' OR context LIKE ?1 ESCAPE '\'
            GROUP BY path, symbol
            ORDER BY path, symbol
            LIMIT ?2
            "#,
        )?;
        let rows = stmt.query_map(params![pattern, limit as i64], |row| {
            Ok(SearchHit {
                path: row.get(0)?,
                symbol: row.get(1)?,
                context: row.get(2)?,
            })
        })?;
        rows.collect()
    }
}

/// Backslash-escape the `LIKE` metacharacters so the query text matches
/// itself and nothing else.
fn escape_like(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Map from a signature's leading keyword to the kind reported in search.
const KIND_KEYWORDS: &[(&str, &str)] = &[
    ("def", "function"),
    ("fn", "function"),
    ("func", "function"),
    ("function", "function"),
    ("class", "class"),
    ("interface", "interface"),
    ("trait", "trait"),
    ("struct", "struct"),
    ("enum", "enum"),
    ("type", "type"),
    ("union", "type"),
    ("const", "const"),
    ("static", "const"),
    ("let", "const"),
    ("var", "const"),
    ("mod", "module"),
    ("impl", "impl"),
];

/// Parse `(kind, name)` out of a raw signature string.
///
/// Decorator prefixes, receivers, and modifiers are skipped; an
/// unrecognizable shape falls back to kind `"symbol"`.
pub(crate) fn split_symbol(raw: &str) -> (String, String) {
    let mut tokens: Vec<&str> = raw.split_whitespace().collect();

    let mut skip = 0;
    while skip < tokens.len()
        && (tokens[skip].starts_with('@')
            || matches!(tokens[skip], "async" | "pub" | "export" | "abstract" | "default"))
    {
        skip += 1;
    }
    tokens.drain(..skip);

    let Some(&first) = tokens.first() else {
        return ("symbol".to_string(), raw.trim().to_string());
    };

    let Some(kind) = KIND_KEYWORDS
        .iter()
        .find(|(k, _)| *k == first)
        .map(|(_, v)| *v)
    else {
        return ("symbol".to_string(), trim_name(first));
    };

    let mut idx = 1;
    // Go-style receiver: `func (s *Server) Name(...)`.
    if first == "func" && tokens.get(1).is_some_and(|t| t.starts_with('(')) {
        while idx < tokens.len() && !tokens[idx].ends_with(')') {
            idx += 1;
        }
        idx += 1;
    }

    match tokens.get(idx).map(|t| trim_name(t)) {
        Some(name) if !name.is_empty() => (kind.to_string(), name),
        _ => ("symbol".to_string(), raw.trim().to_string()),
    }
}

fn trim_name(token: &str) -> String {
    token
        .split(['(', '<', ':', '='])
        .next()
        .unwrap_or(token)
        .trim_end_matches(',')
        .to_string()
}
