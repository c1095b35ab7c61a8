//! Shape recognizers using nom.
//!
//! Every recognizer here is a pure function over `&str`: it either matches the
//! whole input or returns `None`. Nothing is cached between calls, so the
//! escapers can recurse into themselves freely.
//!
//! # Shapes
//!
//! ```text
//! COUNT(*)              function call     word '(' balanced ')'
//! (a + b)               parenthesized     '(' balanced ')'
//! price * 2 - tax       operator chain    operand (ws op ws operand)+
//! *  t.*  (*)           wildcard          '('? (qualifier '.')? '*' ')'?
//! name AS n  name n     alias             expr ws+ [AS ws+] word
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{char, multispace0, multispace1, one_of},
    combinator::{all_consuming, opt, recognize},
    error::{Error as NomError, ErrorKind},
    multi::{many0, many1},
    sequence::{delimited, pair, terminated, tuple},
    Err as NomErr, IResult,
};

/// A `*` projection, optionally qualified and/or parenthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wildcard<'a> {
    pub qualifier: Option<&'a str>,
    pub parenthesized: bool,
}

/// Arithmetic chain: `first op operand op operand ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain<'a> {
    pub first: &'a str,
    pub rest: Vec<(char, &'a str)>,
}

/// A column expression split into expression and alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alias<'a> {
    pub expr: &'a str,
    /// The `AS` token as written, or `"AS"` for implicit aliases.
    pub keyword: &'a str,
    pub alias: &'a str,
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn fail(input: &str) -> NomErr<NomError<&str>> {
    NomErr::Error(NomError::new(input, ErrorKind::Verify))
}

/// Parse a run of word characters (`[A-Za-z0-9_]+`).
fn word(input: &str) -> IResult<&str, &str> {
    take_while1(is_word)(input)
}

/// Parse a balanced `( ... )` group, returning the text between the outer
/// parens. Parens inside quoted text do not count.
fn balanced(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('(') {
        return Err(fail(input));
    }

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, c) in input.char_indices() {
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
            '\'' | '"' | '`' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[idx + 1..], &input[1..idx]));
                }
            }
            _ => {}
        }
    }

    Err(fail(input))
}

/// Parse `name(args)`.
fn call(input: &str) -> IResult<&str, &str> {
    recognize(pair(word, balanced))(input)
}

/// Parse `'word'` or `"word"`.
fn quoted_word(input: &str) -> IResult<&str, &str> {
    recognize(alt((
        delimited(char('\''), word, char('\'')),
        delimited(char('"'), word, char('"')),
    )))(input)
}

/// Parse `a`, `a.b`, `2.5`.
fn dotted(input: &str) -> IResult<&str, &str> {
    recognize(pair(word, many0(pair(char('.'), word))))(input)
}

/// Parse one operand of an arithmetic chain.
fn operand(input: &str) -> IResult<&str, &str> {
    alt((quoted_word, call, recognize(balanced), dotted))(input)
}

/// Parse one segment of a wildcard qualifier.
fn qualifier_segment(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && !matches!(c, '(' | ')' | '.' | '*'))(input)
}

/// Parse a (possibly dotted) wildcard qualifier.
fn qualifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        qualifier_segment,
        many0(pair(char('.'), qualifier_segment)),
    ))(input)
}

/// Match a whole function call such as `NOW()` or `COUNT(DISTINCT id)`.
///
/// Returns the call without surrounding whitespace. The outer parens must
/// close at the very end, so `f(x); DROP TABLE t` is not a call.
pub fn function_call(text: &str) -> Option<&str> {
    all_consuming(delimited(multispace0, call, multispace0))(text)
        .ok()
        .map(|(_, c)| c)
}

/// Match text wrapped in one pair of balanced parens and return the inside.
pub fn parenthesized(text: &str) -> Option<&str> {
    all_consuming(delimited(multispace0, balanced, multispace0))(text)
        .ok()
        .map(|(_, inner)| inner.trim())
        .filter(|inner| !inner.is_empty())
}

/// Match `*`, `t.*`, `(*)`, `( t.* )`.
pub fn wildcard(text: &str) -> Option<Wildcard<'_>> {
    let (_, (_, open, _, qualifier, _, _, close, _)) = all_consuming(tuple((
        multispace0,
        opt(char('(')),
        multispace0,
        opt(terminated(qualifier, char('.'))),
        char('*'),
        multispace0,
        opt(char(')')),
        multispace0,
    )))(text)
    .ok()?;

    (open.is_some() == close.is_some()).then_some(Wildcard {
        qualifier,
        parenthesized: open.is_some(),
    })
}

/// Match an arithmetic chain like `COUNT(*) - 1` or `'a' + 'b'`.
///
/// Operators need whitespace on both sides; `a-b` stays a plain name.
pub fn operator_chain(text: &str) -> Option<Chain<'_>> {
    let (_, (_, first, rest, _)) = all_consuming(tuple((
        multispace0,
        operand,
        many1(tuple((multispace1, one_of("+-*/"), multispace1, operand))),
        multispace0,
    )))(text)
    .ok()?;

    Some(Chain {
        first,
        rest: rest
            .into_iter()
            .map(|(_, op, _, operand)| (op, operand))
            .collect(),
    })
}

/// Positions where an expression may end and an alias tail may begin.
fn split_points(text: &str) -> impl Iterator<Item = (&str, &str)> + '_ {
    text.char_indices()
        .filter(|&(idx, c)| idx > 0 && c.is_whitespace())
        .map(|(idx, _)| text.split_at(idx))
        .filter(|(expr, _)| !expr.trim().is_empty())
}

/// Parse ` AS alias` at the end of a column expression.
fn explicit_tail(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, _) = multispace1(input)?;
    let (input, keyword) = tag_no_case("as")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, alias) = word(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, (keyword, alias)))
}

/// Parse ` alias` at the end of a column expression.
fn implicit_tail(input: &str) -> IResult<&str, &str> {
    delimited(multispace1, word, multispace0)(input)
}

/// Match `<expr> AS <alias>`; the shortest expression wins.
pub fn explicit_alias(text: &str) -> Option<Alias<'_>> {
    split_points(text).find_map(|(expr, tail)| {
        let (_, (keyword, alias)) = all_consuming(explicit_tail)(tail).ok()?;
        Some(Alias {
            expr: expr.trim(),
            keyword,
            alias,
        })
    })
}

/// Match `<expr> <alias>` without the `AS` keyword.
///
/// An expression ending in an operator is never aliased, so `2 + 2` stays an
/// arithmetic chain instead of becoming `2 +` aliased as `2`.
pub fn implicit_alias(text: &str) -> Option<Alias<'_>> {
    split_points(text).find_map(|(expr, tail)| {
        let expr = expr.trim();
        if expr.ends_with(|c: char| matches!(c, '+' | '-' | '*' | '/')) && wildcard(expr).is_none()
        {
            return None;
        }
        let (_, alias) = all_consuming(implicit_tail)(tail).ok()?;
        Some(Alias {
            expr,
            keyword: "AS",
            alias,
        })
    })
}

/// Split a column list on commas that are not inside parens or quotes.
/// Pieces are trimmed; empty pieces are dropped.
pub fn split_columns(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (idx, c) in text.char_indices() {
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
            '\'' | '"' | '`' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Whether a value holds LIKE meta-characters: `%`, `_`, `[abc]` or `[^abc]`.
pub fn is_like_pattern(text: &str) -> bool {
    if text.contains(|c: char| c == '%' || c == '_') {
        return true;
    }

    let mut rest = text;
    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let body = after.strip_prefix('^').unwrap_or(after);
        if matches!(body.find(']'), Some(close) if close > 0) {
            return true;
        }
        rest = after;
    }
    false
}

/// Match text that is entirely a finite number, ignoring outer whitespace.
///
/// Returns the trimmed digits unchanged, so long ids and leading zeros
/// survive.
pub fn number(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|_| trimmed)
}
