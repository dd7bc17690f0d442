use super::MAX_SLOT;
use crate::domain::{EngineError, NamelistValue, ParserResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Segment {
    Text(String),
    Block(RawBlock),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RawBlock {
    pub(super) name: String,
    pub(super) line: usize,
    pub(super) body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Subscript {
    Index(usize),
    Range(usize, usize),
}

impl Subscript {
    pub(super) const fn start(self) -> usize {
        match self {
            Self::Index(start) | Self::Range(start, _) => start,
        }
    }
}

/// One `key=values` assignment. `None` entries are Fortran null values
/// (`3*`), which leave the addressed slot untouched.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Assignment {
    pub(super) key: String,
    pub(super) subscript: Option<Subscript>,
    pub(super) values: Vec<Option<NamelistValue>>,
    pub(super) line: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Word(String),
    Quoted(String),
    Equals,
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    line: usize,
}

/// Splits normalized text into free text and `&NAME ... /` blocks, dropping
/// `!` comments that sit outside quoted strings.
pub(super) fn segment(text: &str) -> ParserResult<Vec<Segment>> {
    let chars: Vec<char> = text.chars().collect();
    let mut segments = Vec::new();
    let mut outside = String::new();
    let mut line = 1;
    let mut index = 0;

    while let Some(&ch) = chars.get(index) {
        match ch {
            '\n' => {
                flush_text(&mut segments, &mut outside);
                line += 1;
                index += 1;
            }
            '!' => index = skip_comment(&chars, index),
            '&' if starts_block(&chars, index) => {
                flush_text(&mut segments, &mut outside);
                let (block, next_index, next_line) = read_block(&chars, index, line)?;
                if let Some(block) = block {
                    segments.push(Segment::Block(block));
                }
                index = next_index;
                line = next_line;
            }
            _ => {
                outside.push(ch);
                index += 1;
            }
        }
    }
    flush_text(&mut segments, &mut outside);

    Ok(segments)
}

fn flush_text(segments: &mut Vec<Segment>, outside: &mut String) {
    let trimmed = outside.trim();
    if !trimmed.is_empty() {
        segments.push(Segment::Text(trimmed.to_string()));
    }
    outside.clear();
}

fn skip_comment(chars: &[char], mut index: usize) -> usize {
    while chars.get(index).is_some_and(|ch| *ch != '\n') {
        index += 1;
    }
    index
}

fn starts_block(chars: &[char], index: usize) -> bool {
    let at_token_start = index == 0 || chars[index - 1].is_whitespace();
    at_token_start
        && chars
            .get(index + 1)
            .is_some_and(|ch| ch.is_ascii_alphabetic())
}

fn read_identifier(chars: &[char], mut index: usize) -> (String, usize) {
    let mut name = String::new();
    while let Some(&ch) = chars.get(index) {
        if !(ch.is_ascii_alphanumeric() || ch == '_') {
            break;
        }
        name.push(ch);
        index += 1;
    }
    (name, index)
}

/// Reads one block starting at its `&`. A stray `&END` (old-style
/// terminator) outside any block yields no block.
fn read_block(
    chars: &[char],
    start: usize,
    start_line: usize,
) -> ParserResult<(Option<RawBlock>, usize, usize)> {
    let (name, mut index) = read_identifier(chars, start + 1);
    if name.eq_ignore_ascii_case("END") {
        return Ok((None, index, start_line));
    }

    let mut line = start_line;
    let mut body = String::new();
    let mut quote: Option<char> = None;
    let unterminated = |detail: String| {
        EngineError::malformed(
            start_line,
            format!("block '&{name}' is missing its closing '/'{detail}"),
        )
    };

    loop {
        let Some(&ch) = chars.get(index) else {
            return Err(unterminated(String::new()));
        };

        if let Some(open) = quote {
            body.push(ch);
            if ch == open {
                if chars.get(index + 1) == Some(&open) {
                    body.push(open);
                    index += 1;
                } else {
                    quote = None;
                }
            } else if ch == '\n' {
                line += 1;
            }
            index += 1;
            continue;
        }

        match ch {
            '\'' | '"' => {
                quote = Some(ch);
                body.push(ch);
                index += 1;
            }
            '!' => index = skip_comment(chars, index),
            '/' => {
                index += 1;
                break;
            }
            '&' if starts_block(chars, index) => {
                let (next, after) = read_identifier(chars, index + 1);
                if next.eq_ignore_ascii_case("END") {
                    index = after;
                    break;
                }
                return Err(unterminated(format!(
                    " before '&{next}' at line {line}"
                )));
            }
            '\n' => {
                line += 1;
                body.push(ch);
                index += 1;
            }
            _ => {
                body.push(ch);
                index += 1;
            }
        }
    }

    Ok((
        Some(RawBlock {
            name,
            line: start_line,
            body,
        }),
        index,
        line,
    ))
}

fn tokenize(body: &str, first_line: usize) -> ParserResult<Vec<Token>> {
    let chars: Vec<char> = body.chars().collect();
    let mut tokens = Vec::new();
    let mut line = first_line;
    let mut index = 0;

    while let Some(&ch) = chars.get(index) {
        match ch {
            '\n' => {
                line += 1;
                index += 1;
            }
            ',' => index += 1,
            _ if ch.is_whitespace() => index += 1,
            '=' => {
                tokens.push(Token {
                    kind: TokenKind::Equals,
                    line,
                });
                index += 1;
            }
            '\'' | '"' => {
                let token_line = line;
                let mut text = String::new();
                index += 1;
                loop {
                    let Some(&next) = chars.get(index) else {
                        return Err(EngineError::malformed(
                            token_line,
                            "unterminated quoted string",
                        ));
                    };
                    index += 1;
                    if next == ch {
                        if chars.get(index) == Some(&ch) {
                            text.push(ch);
                            index += 1;
                            continue;
                        }
                        break;
                    }
                    if next == '\n' {
                        line += 1;
                    }
                    text.push(next);
                }
                tokens.push(Token {
                    kind: TokenKind::Quoted(text),
                    line: token_line,
                });
            }
            _ => {
                let token_line = line;
                let mut word = String::new();
                while let Some(&next) = chars.get(index) {
                    if next.is_whitespace() || matches!(next, ',' | '=' | '\'' | '"') {
                        break;
                    }
                    index += 1;
                    if next == '(' {
                        word.push(next);
                        index = read_subscript(&chars, index, &mut word, token_line)?;
                        continue;
                    }
                    word.push(next);
                }
                tokens.push(Token {
                    kind: TokenKind::Word(word),
                    line: token_line,
                });
            }
        }
    }

    Ok(tokens)
}

fn read_subscript(
    chars: &[char],
    mut index: usize,
    word: &mut String,
    line: usize,
) -> ParserResult<usize> {
    while let Some(&ch) = chars.get(index) {
        index += 1;
        if ch == ')' {
            word.push(ch);
            return Ok(index);
        }
        if !ch.is_whitespace() {
            word.push(ch);
        }
    }
    Err(EngineError::malformed(
        line,
        format!("unclosed subscript in '{word}'"),
    ))
}

/// Tokenizes a block body and groups it into assignments.
pub(super) fn parse_assignments(body: &str, first_line: usize) -> ParserResult<Vec<Assignment>> {
    let tokens = tokenize(body, first_line)?;
    let mut assignments = Vec::new();
    let mut index = 0;

    while let Some(token) = tokens.get(index) {
        let TokenKind::Word(target) = &token.kind else {
            return Err(EngineError::malformed(
                token.line,
                "expected a name before '='",
            ));
        };
        if !matches!(tokens.get(index + 1).map(|next| &next.kind), Some(TokenKind::Equals)) {
            return Err(EngineError::malformed(
                token.line,
                format!("expected '=' after '{target}'"),
            ));
        }
        let (key, subscript) = parse_target(target, token.line)?;
        index += 2;

        let mut values = Vec::new();
        while let Some(value_token) = tokens.get(index) {
            match &value_token.kind {
                TokenKind::Word(word)
                    if names_a_target(word)
                        && matches!(
                            tokens.get(index + 1).map(|next| &next.kind),
                            Some(TokenKind::Equals)
                        ) =>
                {
                    break;
                }
                TokenKind::Word(word) => values.extend(parse_word(word, value_token.line)?),
                TokenKind::Quoted(text) => values.push(Some(NamelistValue::Text(text.clone()))),
                TokenKind::Equals => {
                    return Err(EngineError::malformed(
                        value_token.line,
                        format!("unexpected '=' in the value of '{key}'"),
                    ));
                }
            }
            index += 1;
        }

        assignments.push(Assignment {
            key,
            subscript,
            values,
            line: token.line,
        });
    }

    Ok(assignments)
}

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Whether `word` can start the next assignment. Literals never can.
fn names_a_target(word: &str) -> bool {
    let name = word.split_once('(').map_or(word, |(name, _)| name);
    is_valid_identifier(name)
}

fn parse_target(target: &str, line: usize) -> ParserResult<(String, Option<Subscript>)> {
    let (name, subscript) = match target.split_once('(') {
        Some((name, rest)) => {
            let inner = rest.strip_suffix(')').ok_or_else(|| {
                EngineError::malformed(line, format!("invalid subscript in '{target}'"))
            })?;
            (name, Some(parse_subscript(inner, target, line)?))
        }
        None => (target, None),
    };

    if !is_valid_identifier(name) {
        return Err(EngineError::malformed(
            line,
            format!("invalid variable name '{name}'"),
        ));
    }
    Ok((name.to_ascii_lowercase(), subscript))
}

fn parse_subscript(inner: &str, target: &str, line: usize) -> ParserResult<Subscript> {
    let index = |text: &str| -> ParserResult<usize> {
        let value: usize = text.parse().map_err(|_| {
            EngineError::malformed(line, format!("invalid subscript in '{target}'"))
        })?;
        if value == 0 {
            return Err(EngineError::malformed(
                line,
                format!("subscript in '{target}' must start at 1"),
            ));
        }
        if value > MAX_SLOT {
            return Err(EngineError::malformed(
                line,
                format!("subscript in '{target}' exceeds {MAX_SLOT}"),
            ));
        }
        Ok(value)
    };

    match inner.split_once(':') {
        Some((first, last)) => {
            let (first, last) = (index(first)?, index(last)?);
            if last < first {
                return Err(EngineError::malformed(
                    line,
                    format!("reversed subscript range in '{target}'"),
                ));
            }
            Ok(Subscript::Range(first, last))
        }
        None => Ok(Subscript::Index(index(inner)?)),
    }
}

/// Expands `r*v` repeats; a bare `r*` is `r` null values.
fn parse_word(word: &str, line: usize) -> ParserResult<Vec<Option<NamelistValue>>> {
    if let Some((count, rest)) = word.split_once('*')
        && !count.is_empty()
        && count.chars().all(|ch| ch.is_ascii_digit())
    {
        let repeat: usize = count
            .parse()
            .ok()
            .filter(|repeat| (1..=MAX_SLOT).contains(repeat))
            .ok_or_else(|| {
                EngineError::malformed(line, format!("invalid repeat count in '{word}'"))
            })?;
        let value = if rest.is_empty() {
            None
        } else {
            Some(parse_scalar(rest, line)?)
        };
        return Ok(vec![value; repeat]);
    }

    Ok(vec![Some(parse_scalar(word, line)?)])
}

pub(super) fn parse_scalar(word: &str, line: usize) -> ParserResult<NamelistValue> {
    if let Some(logical) = parse_logical(word) {
        return Ok(NamelistValue::Logical(logical));
    }
    if looks_numeric(word) {
        return parse_number(word).ok_or_else(|| {
            EngineError::malformed(line, format!("invalid numeric literal '{word}'"))
        });
    }
    Ok(NamelistValue::Text(word.to_string()))
}

fn parse_logical(word: &str) -> Option<bool> {
    let lowered = word.to_ascii_lowercase();
    let bare = lowered
        .strip_prefix('.')
        .map(|rest| rest.strip_suffix('.').unwrap_or(rest))
        .unwrap_or(&lowered);
    match bare {
        "t" | "true" => Some(true),
        "f" | "false" => Some(false),
        _ => None,
    }
}

fn looks_numeric(word: &str) -> bool {
    let unsigned = word.strip_prefix(['+', '-']).unwrap_or(word);
    let mut chars = unsigned.chars();
    match chars.next() {
        Some(first) if first.is_ascii_digit() => true,
        Some('.') => chars.next().is_some_and(|next| next.is_ascii_digit()),
        _ => false,
    }
}

fn parse_number(word: &str) -> Option<NamelistValue> {
    if word.contains(['.', 'e', 'E', 'd', 'D']) {
        let normalized = word.replace(['d', 'D'], "e");
        return normalized
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(NamelistValue::Real);
    }
    word.parse::<i64>().ok().map(NamelistValue::Integer)
}

#[cfg(test)]
mod tests {
    use super::{Segment, Subscript, parse_assignments, parse_scalar, segment};
    use crate::domain::{EngineError, NamelistValue};

    #[test]
    fn segments_keep_free_text_and_strip_comments() {
        let segments = segment("title line ! note\nNAMELIST\n &FRESCO hcm=0.1 ! step\n /\ntail\n")
            .expect("segmenting should succeed");

        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0], Segment::Text("title line".to_string()));
        assert_eq!(segments[1], Segment::Text("NAMELIST".to_string()));
        let Segment::Block(block) = &segments[2] else {
            panic!("third segment should be a block");
        };
        assert_eq!(block.name, "FRESCO");
        assert_eq!(block.line, 3);
        assert_eq!(block.body.trim(), "hcm=0.1");
        assert_eq!(segments[3], Segment::Text("tail".to_string()));
    }

    #[test]
    fn slash_inside_quotes_does_not_close_a_block() {
        let segments =
            segment("&PARTITION namep='a/b' namet=\"it''s\" /").expect("segmenting should succeed");
        let Segment::Block(block) = &segments[0] else {
            panic!("segment should be a block");
        };
        assert_eq!(block.body.trim(), "namep='a/b' namet=\"it''s\"");
    }

    #[test]
    fn unterminated_block_is_malformed() {
        let error = segment("&FRESCO hcm=0.1\n&PARTITION /").expect_err("should fail");
        assert!(matches!(error, EngineError::MalformedNamelist { line: 1, .. }));
        assert!(error.to_string().contains("before '&PARTITION' at line 2"));

        let error = segment("x\n\n&POT kp=1 p1=50").expect_err("should fail");
        assert!(matches!(error, EngineError::MalformedNamelist { line: 3, .. }));
    }

    #[test]
    fn ampersand_end_closes_old_style_blocks() {
        let segments = segment("&FRESCO hcm=0.1 &END").expect("segmenting should succeed");
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn assignments_expand_subscripts_and_repeats() {
        let assignments =
            parse_assignments("p(1:3)=1.0,2.0 3 p(2)=9.0 jbord=0 40, 3*0.5 kp=", 1)
                .expect("assignments should parse");

        assert_eq!(assignments.len(), 4);
        assert_eq!(assignments[0].key, "p");
        assert_eq!(assignments[0].subscript, Some(Subscript::Range(1, 3)));
        assert_eq!(assignments[0].values.len(), 3);
        assert_eq!(assignments[1].subscript, Some(Subscript::Index(2)));
        assert_eq!(assignments[2].values.len(), 5);
        assert_eq!(
            assignments[2].values[4],
            Some(NamelistValue::Real(0.5))
        );
        assert!(assignments[3].values.is_empty());
    }

    #[test]
    fn subscripts_are_bounded() {
        for body in ["p(0)=1", "p(3:2)=1", "p(513)=1", "p(a)=1", "p(1=2"] {
            assert!(
                parse_assignments(body, 7).is_err(),
                "'{body}' should be rejected"
            );
        }
        let error = parse_assignments("p(0)=1", 7).expect_err("index 0 should fail");
        assert!(matches!(error, EngineError::MalformedNamelist { line: 7, .. }));
    }

    #[test]
    fn scalar_literals_follow_fortran_conventions() {
        assert_eq!(parse_scalar("42", 1), Ok(NamelistValue::Integer(42)));
        assert_eq!(parse_scalar("-1.5d2", 1), Ok(NamelistValue::Real(-150.0)));
        assert_eq!(parse_scalar(".5", 1), Ok(NamelistValue::Real(0.5)));
        assert_eq!(parse_scalar("1E-3", 1), Ok(NamelistValue::Real(0.001)));
        assert_eq!(parse_scalar(".true.", 1), Ok(NamelistValue::Logical(true)));
        assert_eq!(parse_scalar("F", 1), Ok(NamelistValue::Logical(false)));
        assert_eq!(
            parse_scalar("ws", 1),
            Ok(NamelistValue::Text("ws".to_string()))
        );
        assert!(parse_scalar("1.2.3", 1).is_err());
        assert!(parse_scalar("9e999", 1).is_err());
    }

    #[test]
    fn stray_tokens_are_reported_with_their_line() {
        let error = parse_assignments("\n  20 hcm=0.1", 4).expect_err("should fail");
        assert!(matches!(error, EngineError::MalformedNamelist { line: 5, .. }));
        assert!(error.to_string().contains("expected '=' after '20'"));

        let error = parse_assignments("hcm=0.1\n\n = 3", 1).expect_err("should fail");
        assert!(matches!(error, EngineError::MalformedNamelist { line: 3, .. }));
        assert!(error.to_string().contains("unexpected '=' in the value of 'hcm'"));

        let error = parse_assignments("rmatch=20\n 0.1=3", 1).expect_err("should fail");
        assert!(matches!(error, EngineError::MalformedNamelist { line: 2, .. }));
    }
}
