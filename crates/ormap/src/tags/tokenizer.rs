//! Field annotation tokenizer.
//!
//! An annotation such as `varchar(32) notnull default 'n/a' comment('a, b')`
//! is split on whitespace into keyword tokens. A keyword directly followed
//! by `(` takes a comma-separated parameter list up to the closing `)`.
//! Single-quoted runs are never split, inside or outside parentheses.

use crate::error::{MapError, Result};

/// One annotation keyword with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Token {
    /// Keyword text as written.
    pub name: String,

    /// Parameters, trimmed and with one layer of outer quotes removed.
    pub params: Vec<String>,

    /// Parameters, trimmed only.
    pub raw_params: Vec<String>,
}

impl Token {
    fn keyword(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Case-insensitive keyword match.
    pub fn is(&self, keyword: &str) -> bool {
        self.name.eq_ignore_ascii_case(keyword)
    }

    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }

    /// Single-quoted keyword such as `'user_name'`.
    pub fn is_quoted(&self) -> bool {
        self.name.len() >= 2 && self.name.starts_with('\'') && self.name.ends_with('\'')
    }
}

fn unquote(param: &str) -> &str {
    for quote in ['\'', '"', '`'] {
        if param.len() >= 2 && param.starts_with(quote) && param.ends_with(quote) {
            return &param[1..param.len() - 1];
        }
    }
    param
}

fn split_params(annotation: &str, list: &str) -> Result<(Vec<String>, Vec<String>)> {
    if list.trim().is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }
    let mut raw = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    for c in list.chars() {
        match c {
            '\'' => {
                in_quote = !in_quote;
                current.push(c);
            }
            ',' if !in_quote => raw.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    if in_quote {
        return Err(MapError::malformed(annotation, "unterminated quote in parameters"));
    }
    raw.push(current.trim().to_string());

    let params = raw.iter().map(|p| unquote(p).to_string()).collect();
    Ok((params, raw))
}

/// Split an annotation into tokens.
///
/// Fails with [`MapError::MalformedAnnotation`] on an unclosed `(`, a stray
/// `)`, nested parentheses or an unterminated quote.
pub fn split_tag(annotation: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = annotation.chars();
    let mut in_quote = false;

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_quote = !in_quote;
                current.push(c);
            }
            _ if in_quote => current.push(c),
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(Token::keyword(std::mem::take(&mut current)));
                }
            }
            '(' => {
                if current.is_empty() {
                    return Err(MapError::malformed(annotation, "parameter list without keyword"));
                }
                let mut list = String::new();
                let mut list_quote = false;
                let mut closed = false;
                for p in chars.by_ref() {
                    match p {
                        '\'' => {
                            list_quote = !list_quote;
                            list.push(p);
                        }
                        ')' if !list_quote => {
                            closed = true;
                            break;
                        }
                        '(' if !list_quote => {
                            return Err(MapError::malformed(
                                annotation,
                                "nested parentheses are not supported",
                            ));
                        }
                        _ => list.push(p),
                    }
                }
                if !closed {
                    return Err(MapError::malformed(annotation, "unclosed '('"));
                }
                let (params, raw_params) = split_params(annotation, &list)?;
                tokens.push(Token {
                    name: std::mem::take(&mut current),
                    params,
                    raw_params,
                });
            }
            ')' => return Err(MapError::malformed(annotation, "unexpected ')'")),
            _ => current.push(c),
        }
    }

    if in_quote {
        return Err(MapError::malformed(annotation, "unterminated quote"));
    }
    if !current.is_empty() {
        tokens.push(Token::keyword(current));
    }
    Ok(tokens)
}
