// src/core/tokenizer.rs

use crate::models::{PIPE, ParseError, Word};

/// Quoting context of the character currently being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    None,
    Single,
    Double,
}

/// Splits a raw input line into words.
///
/// # Rules:
/// - Unquoted whitespace runs separate tokens.
/// - `'...'` is taken literally, backslashes included.
/// - Inside `"..."`, a backslash only escapes `\`, `$` and `"`; otherwise it is kept.
/// - Outside quotes, a backslash is dropped and the next character is taken literally
///   (an escaped space joins the token instead of ending it).
/// - Adjacent quoted and unquoted pieces concatenate into one token.
/// - An unquoted `|` always stands alone, so `a|b` yields `a`, `|`, `b`.
/// - A word with any quoted or escaped part is marked `quoted` and never acts
///   as an operator.
///
/// Empty or whitespace-only input yields no tokens. Input ending inside a quote fails
/// with [`ParseError::UnterminatedQuote`].
pub fn tokenize(input: &str) -> Result<Vec<Word>, ParseError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // Distinguishes an empty quoted token (`''`) from "no token at all".
    let mut in_token = false;
    let mut quoted = false;
    let mut quote = Quote::None;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Quote::Single => {
                if c == '\'' {
                    quote = Quote::None;
                } else {
                    current.push(c);
                }
            }
            Quote::Double => match c {
                '"' => quote = Quote::None,
                '\\' => match chars.peek() {
                    Some(&next @ ('\\' | '$' | '"')) => {
                        current.push(next);
                        chars.next();
                    }
                    _ => current.push(c),
                },
                _ => current.push(c),
            },
            Quote::None => match c {
                '\'' => {
                    quote = Quote::Single;
                    in_token = true;
                    quoted = true;
                }
                '"' => {
                    quote = Quote::Double;
                    in_token = true;
                    quoted = true;
                }
                '\\' => {
                    // A trailing lone backslash has nothing to escape and is dropped.
                    if let Some(next) = chars.next() {
                        current.push(next);
                        in_token = true;
                        quoted = true;
                    }
                }
                '|' => {
                    if in_token {
                        tokens.push(finish(&mut current, &mut quoted));
                        in_token = false;
                    }
                    tokens.push(Word::bare(PIPE));
                }
                c if c.is_whitespace() => {
                    if in_token {
                        tokens.push(finish(&mut current, &mut quoted));
                        in_token = false;
                    }
                }
                c => {
                    current.push(c);
                    in_token = true;
                }
            },
        }
    }

    match quote {
        Quote::Single => return Err(ParseError::UnterminatedQuote { quote: '\'' }),
        Quote::Double => return Err(ParseError::UnterminatedQuote { quote: '"' }),
        Quote::None => {}
    }

    if in_token {
        tokens.push(finish(&mut current, &mut quoted));
    }
    log::debug!("Tokenized {:?} into {:?}", input, tokens);
    Ok(tokens)
}

fn finish(current: &mut String, quoted: &mut bool) -> Word {
    let text = std::mem::take(current);
    if std::mem::take(quoted) {
        Word::quoted(text)
    } else {
        Word::bare(text)
    }
}
