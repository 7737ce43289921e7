//! Static extraction of `resolve.alias` from a Vite config.
//!
//! The config is source code, so it is never executed. Instead the text is
//! scanned for the one shape we support:
//!
//! ```js
//! export default defineConfig({
//!   resolve: {
//!     alias: {
//!       '@': './src',
//!       '~utils': path.resolve(__dirname, 'src/utils'),
//!     },
//!   },
//! });
//! ```
//!
//! The alias literal may also be the array form
//! (`[{ find: '@', replacement: './src' }]`). Values must be string literals
//! or one of the static call shapes in [`LiteralParser::parse_call`]. Any
//! other expression, spread, or computed key makes the whole block unusable;
//! conditional or generated aliases are out of reach by design.

use crate::error::Error;
use importnav_util::path::join_normalized;
use regex_lite::Regex;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Bundler config file names in priority order. Only the first one found is read.
pub const BUNDLER_CONFIG_FILES: &[&str] = &[
    "vite.config.ts",
    "vite.config.js",
    "vite.config.mts",
    "vite.config.mjs",
];

/// Find the bundler config file directly under `root`.
#[must_use]
pub fn find_bundler_config(root: &Path) -> Option<PathBuf> {
    BUNDLER_CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

/// Read `path` and return its alias table with targets made absolute.
///
/// Relative targets are resolved against `root`.
pub fn load_aliases(path: &Path, root: &Path) -> Result<Vec<(String, PathBuf)>, Error> {
    let source =
        importnav_util::fs::read_to_string_lossy(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

    let raw = extract_aliases(&source).map_err(|reason| Error::AliasBlock {
        path: path.to_path_buf(),
        reason,
    })?;

    Ok(raw
        .into_iter()
        .map(|(key, target)| {
            let abs = join_normalized(root, &target);
            (key, abs)
        })
        .collect())
}

/// Pull `(key, raw target)` pairs out of config source text.
///
/// An absent `resolve.alias` block is not an error: it yields an empty list.
pub fn extract_aliases(source: &str) -> Result<Vec<(String, String)>, String> {
    let code = strip_comments(source);

    let Some(resolve_body) = find_keyed_block(&code, "resolve", &['{']) else {
        return Ok(Vec::new());
    };
    let Some(alias_body) = find_keyed_block(resolve_body, "alias", &['{', '[']) else {
        return Ok(Vec::new());
    };

    let value = LiteralParser::new(alias_body).parse()?;
    Ok(alias_pairs(value))
}

fn alias_pairs(value: Value) -> Vec<(String, String)> {
    match value {
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(key, target)| match target {
                Value::String(s) => Some((key, s)),
                _ => None,
            })
            .collect(),
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| {
                let find = item.get("find")?.as_str()?.to_string();
                let replacement = item.get("replacement")?.as_str()?.to_string();
                Some((find, replacement))
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn keyed_block_regex(key: &str) -> Option<Regex> {
    // `key:`, `'key':` or `"key":`, not preceded by an identifier character or a dot.
    let pattern = format!(r#"(?:^|[^\w$.])(?:{key}|'{key}'|"{key}")\s*:\s*"#);
    Regex::new(&pattern).ok()
}

fn resolve_key_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| keyed_block_regex("resolve")).as_ref()
}

fn alias_key_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| keyed_block_regex("alias")).as_ref()
}

/// Find the first `key: <open>…<close>` in `code` whose value starts with one
/// of `opens`, returning the balanced literal including its delimiters.
fn find_keyed_block<'a>(code: &'a str, key: &str, opens: &[char]) -> Option<&'a str> {
    let re = match key {
        "resolve" => resolve_key_regex()?,
        "alias" => alias_key_regex()?,
        _ => return None,
    };

    for m in re.find_iter(code) {
        let start = m.end();
        let Some(first) = code[start..].chars().next() else {
            continue;
        };
        if !opens.contains(&first) {
            continue;
        }
        if let Some(len) = balanced_len(&code[start..]) {
            return Some(&code[start..start + len]);
        }
    }
    None
}

/// Byte length of the bracketed literal at the start of `text`, honouring
/// nesting and string quoting. `None` if it never closes.
fn balanced_len(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' | '`' => quote = Some(ch),
            '{' | '[' | '(' => depth += 1,
            '}' | ']' | ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + ch.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// Remove `//` and `/* */` comments outside string literals.
///
/// Newlines inside block comments are kept so line structure survives.
/// Also used for JSONC tsconfig files.
#[must_use]
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        let next = chars.peek().copied();
        match (ch, next) {
            ('/', Some('/')) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    if c == '\n' {
                        out.push('\n');
                    }
                    prev = c;
                }
            }
            ('"' | '\'' | '`', _) => {
                quote = Some(ch);
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }

    out
}

/// Parser for the JSON5-ish subset that appears in config object literals:
/// bare or quoted keys, single or double quotes, trailing commas.
struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
}

impl LiteralParser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<Value, String> {
        let value = self.parse_value()?;
        self.skip_ws();
        if self.pos < self.chars.len() {
            return Err(format!("trailing input at offset {}", self.pos));
        }
        Ok(value)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, want: char) -> Result<(), String> {
        self.skip_ws();
        match self.bump() {
            Some(ch) if ch == want => Ok(()),
            other => Err(format!("expected '{want}', found {other:?} at offset {}", self.pos)),
        }
    }

    fn parse_value(&mut self) -> Result<Value, String> {
        self.skip_ws();
        match self.peek() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('"' | '\'' | '`') => self.parse_string().map(Value::String),
            Some(ch) if ch == '-' || ch.is_ascii_digit() => self.parse_number(),
            Some(ch) if is_ident_start(ch) => self.parse_word(),
            Some(ch) => Err(format!("unexpected '{ch}' at offset {}", self.pos)),
            None => Err("unexpected end of input".to_string()),
        }
    }

    fn parse_object(&mut self) -> Result<Value, String> {
        self.expect('{')?;
        let mut map = Map::new();

        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Value::Object(map));
            }

            let key = match self.peek() {
                Some('"' | '\'') => self.parse_string()?,
                Some(ch) if is_ident_start(ch) => self.parse_ident(),
                other => return Err(format!("unsupported object key {other:?}")),
            };
            self.expect(':')?;
            let value = self.parse_value()?;
            map.insert(key, value);

            self.skip_ws();
            match self.bump() {
                Some(',') => {}
                Some('}') => return Ok(Value::Object(map)),
                other => return Err(format!("expected ',' or '}}' in object, found {other:?}")),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Value, String> {
        self.expect('[')?;
        let mut items = Vec::new();

        loop {
            self.skip_ws();
            if self.peek() == Some(']') {
                self.pos += 1;
                return Ok(Value::Array(items));
            }

            items.push(self.parse_value()?);

            self.skip_ws();
            match self.bump() {
                Some(',') => {}
                Some(']') => return Ok(Value::Array(items)),
                other => return Err(format!("expected ',' or ']' in array, found {other:?}")),
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, String> {
        let quote = self.bump().ok_or("unexpected end of input")?;
        let mut s = String::new();

        loop {
            match self.bump() {
                Some(ch) if ch == quote => return Ok(s),
                Some('$') if quote == '`' && self.peek() == Some('{') => {
                    return Err("template interpolation is not static".to_string());
                }
                Some('\\') => match self.bump() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('r') => s.push('\r'),
                    Some(ch) => s.push(ch),
                    None => return Err("unterminated escape".to_string()),
                },
                Some(ch) => s.push(ch),
                None => return Err("unterminated string".to_string()),
            }
        }
    }

    fn parse_number(&mut self) -> Result<Value, String> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E')
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        serde_json::from_str(&text).map_err(|e| format!("invalid number '{text}': {e}"))
    }

    fn parse_ident(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_continue) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// Keywords, or one of the supported static call shapes.
    fn parse_word(&mut self) -> Result<Value, String> {
        let start = self.pos;
        let word = self.parse_ident();
        match word.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" => Ok(Value::Null),
            _ => {
                self.skip_ws();
                if self.peek() == Some('(') {
                    self.parse_call(&word).map(Value::String)
                } else {
                    Err(format!("'{word}' at offset {start} is not a static value"))
                }
            }
        }
    }

    /// Fold the call shapes that are common in alias tables and have a
    /// static answer. The result is relative to the config's directory.
    ///
    /// - `path.resolve(__dirname, 'src', …)` / `resolve(…)`
    /// - `path.join(__dirname, 'src', …)` / `join(…)`
    /// - `fileURLToPath(new URL('./src', import.meta.url))`
    fn parse_call(&mut self, callee: &str) -> Result<String, String> {
        match callee {
            "path.resolve" | "resolve" => {
                let args = self.parse_path_args()?;
                fold_path_args(&args, PathFold::Resolve)
            }
            "path.join" | "join" => {
                let args = self.parse_path_args()?;
                fold_path_args(&args, PathFold::Join)
            }
            "fileURLToPath" | "url.fileURLToPath" => {
                self.expect('(')?;
                self.skip_ws();
                if self.parse_ident() != "new" {
                    return Err("expected `new URL(...)`".to_string());
                }
                self.skip_ws();
                if self.parse_ident() != "URL" {
                    return Err("expected `new URL(...)`".to_string());
                }
                self.expect('(')?;
                self.skip_ws();
                let target = self.parse_string()?;
                self.expect(',')?;
                self.skip_ws();
                if self.parse_ident() != "import.meta.url" {
                    return Err("URL base must be import.meta.url".to_string());
                }
                self.expect(')')?;
                self.expect(')')?;
                Ok(target)
            }
            _ => Err(format!("call to '{callee}' is not static")),
        }
    }

    fn parse_path_args(&mut self) -> Result<Vec<PathArg>, String> {
        self.expect('(')?;
        let mut args = Vec::new();

        loop {
            self.skip_ws();
            match self.peek() {
                Some(')') => {
                    self.pos += 1;
                    return Ok(args);
                }
                Some('"' | '\'' | '`') => args.push(PathArg::Literal(self.parse_string()?)),
                Some(ch) if is_ident_start(ch) => match self.parse_ident().as_str() {
                    "__dirname" => args.push(PathArg::ConfigDir),
                    other => return Err(format!("'{other}' is not a static path argument")),
                },
                other => return Err(format!("unexpected {other:?} in path arguments")),
            }

            self.skip_ws();
            match self.bump() {
                Some(',') => {}
                Some(')') => return Ok(args),
                other => return Err(format!("expected ',' or ')', found {other:?}")),
            }
        }
    }
}

enum PathArg {
    ConfigDir,
    Literal(String),
}

/// `path.resolve` restarts at every absolute segment; `path.join` only
/// concatenates.
#[derive(Clone, Copy, PartialEq, Eq)]
enum PathFold {
    Resolve,
    Join,
}

fn fold_path_args(args: &[PathArg], fold: PathFold) -> Result<String, String> {
    let mut parts: Vec<&str> = Vec::new();
    let mut anchored = false;

    for (i, arg) in args.iter().enumerate() {
        match arg {
            PathArg::ConfigDir if fold == PathFold::Join && i > 0 => {
                return Err("__dirname must lead a path.join call".to_string());
            }
            PathArg::ConfigDir => {
                parts.clear();
                anchored = true;
            }
            PathArg::Literal(s) if Path::new(s).is_absolute() => match fold {
                PathFold::Resolve => {
                    parts.clear();
                    parts.push(s);
                    anchored = true;
                }
                // join('/a') is absolute only as the leading segment.
                PathFold::Join if i == 0 => {
                    parts.push(s);
                    anchored = true;
                }
                PathFold::Join => parts.push(s.trim_start_matches('/')),
            },
            PathArg::Literal(s) => parts.push(s),
        }
    }

    // Without __dirname or an absolute segment the result depends on the
    // process working directory, which we cannot know.
    if !anchored {
        return Err("path call is relative to the process cwd".to_string());
    }
    let parts: Vec<&str> = parts.into_iter().filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        return Ok(".".to_string());
    }
    Ok(parts.join("/"))
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$' || ch == '.'
}
