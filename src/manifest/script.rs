//! Statement scanner for Python-syntax manifests (conanfile.py, setup.py)
//!
//! Scripts are never executed. The scanner only splits source text into
//! logical statements, joining lines while brackets are open or a
//! triple-quoted string is unterminated, and drops comments. Helpers below
//! pick string literals and sequence items out of statement text.

/// One logical statement of a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// 1-based line the statement starts on
    pub line: usize,
    /// Indentation width of the first line (tabs count as 4)
    pub indent: usize,
    /// Statement text with comments removed and continuation lines joined
    pub text: String,
}

/// Lazy iterator over the logical statements of a script
pub struct Statements {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Statements {
    /// Creates a scanner over the given source
    pub fn new(content: &str) -> Self {
        Self {
            chars: content.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn at_triple(&self, quote: char) -> bool {
        (0..3).all(|i| self.peek(i) == Some(quote))
    }
}

impl Iterator for Statements {
    type Item = Statement;

    fn next(&mut self) -> Option<Statement> {
        while self.pos < self.chars.len() {
            let line = self.line;
            let mut indent = 0;
            while let Some(c) = self.peek(0) {
                match c {
                    ' ' => indent += 1,
                    '\t' => indent += 4,
                    _ => break,
                }
                self.pos += 1;
            }

            let mut text = String::new();
            let mut depth = 0i32;
            // (delimiter, triple-quoted)
            let mut quote: Option<(char, bool)> = None;

            while let Some(c) = self.peek(0) {
                if let Some((q, triple)) = quote {
                    if c == '\\' {
                        text.push(c);
                        self.pos += 1;
                        if let Some(escaped) = self.peek(0) {
                            if escaped == '\n' {
                                self.line += 1;
                            }
                            text.push(escaped);
                            self.pos += 1;
                        }
                        continue;
                    }
                    if triple && self.at_triple(q) {
                        text.extend([q, q, q]);
                        self.pos += 3;
                        quote = None;
                        continue;
                    }
                    if !triple && c == q {
                        text.push(c);
                        self.pos += 1;
                        quote = None;
                        continue;
                    }
                    if c == '\n' {
                        self.line += 1;
                        if !triple {
                            // Unterminated single-line string
                            self.pos += 1;
                            quote = None;
                            if depth <= 0 {
                                break;
                            }
                            text.push(' ');
                            continue;
                        }
                    }
                    text.push(c);
                    self.pos += 1;
                    continue;
                }

                match c {
                    '\'' | '"' => {
                        if self.at_triple(c) {
                            text.extend([c, c, c]);
                            self.pos += 3;
                            quote = Some((c, true));
                        } else {
                            text.push(c);
                            self.pos += 1;
                            quote = Some((c, false));
                        }
                    }
                    '#' => {
                        while let Some(n) = self.peek(0) {
                            if n == '\n' {
                                break;
                            }
                            self.pos += 1;
                        }
                    }
                    '\\' if self.peek(1) == Some('\n') => {
                        self.pos += 2;
                        self.line += 1;
                        text.push(' ');
                    }
                    '(' | '[' | '{' => {
                        depth += 1;
                        text.push(c);
                        self.pos += 1;
                    }
                    ')' | ']' | '}' => {
                        depth -= 1;
                        text.push(c);
                        self.pos += 1;
                    }
                    '\n' => {
                        self.pos += 1;
                        self.line += 1;
                        if depth <= 0 {
                            break;
                        }
                        text.push(' ');
                    }
                    _ => {
                        text.push(c);
                        self.pos += 1;
                    }
                }
            }

            let text = text.trim().to_string();
            if !text.is_empty() {
                return Some(Statement { line, indent, text });
            }
        }
        None
    }
}

/// Returns the value of a plain string literal (`"x"`, `'x'`, `r"x"`, `"""x"""`).
///
/// Returns `None` for anything else, including f-strings and concatenations.
pub fn string_literal(expr: &str) -> Option<String> {
    let expr = expr.trim();
    let body = match expr.strip_prefix(|c: char| matches!(c, 'r' | 'R' | 'u' | 'U')) {
        Some(rest) if rest.starts_with(['"', '\'']) => rest,
        _ => expr,
    };

    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if body.len() < quote.len() * 2 {
            continue;
        }
        if let Some(inner) = body.strip_prefix(quote).and_then(|b| b.strip_suffix(quote)) {
            if !inner.contains(quote) {
                return Some(inner.to_string());
            }
        }
    }
    None
}

/// Finds the index of the bracket closing the one at `open`, skipping strings
pub fn closing_index(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices().skip_while(|(i, _)| *i < open) {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits on commas that are outside brackets and strings; empty parts are dropped
pub fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

/// Returns the items of a list or tuple display (`[a, b]`, `(a, b)`).
///
/// Returns `None` when the expression is not a single bracketed sequence.
pub fn sequence_items(expr: &str) -> Option<Vec<&str>> {
    let expr = expr.trim();
    let close = match expr.chars().next()? {
        '[' => ']',
        '(' => ')',
        _ => return None,
    };
    if !expr.ends_with(close) || closing_index(expr, 0)? != expr.len() - 1 {
        return None;
    }
    Some(split_top_level(&expr[1..expr.len() - 1]))
}

/// Returns the argument text of the call whose `(` sits at `open`
pub fn call_arguments(text: &str, open: usize) -> Option<&str> {
    let close = closing_index(text, open)?;
    Some(&text[open + 1..close])
}

/// Splits `key=value` at the first top-level `=`, ignoring `==` and friends
pub fn keyword_argument(arg: &str) -> Option<(&str, &str)> {
    let (key, value) = arg.split_once('=')?;
    let key = key.trim();
    if value.starts_with('=')
        || key.is_empty()
        || !key.chars().all(|c| c.is_alphanumeric() || c == '_')
    {
        return None;
    }
    Some((key, value.trim()))
}
