//! Selector parser
//!
//! Hand-written cursor over the selector text:
//!
//! ```text
//! selector   := leg ( '/' leg )*
//! leg        := phase ( combinator phase )*
//! combinator := whitespace | '>' whitespace?
//! phase      := tag? shortcut? ( '.' class )* ( '[' field op value ']' )* ( ':' pseudo )?
//! ```

use crate::ast::{AttrPredicate, Combinator, Leg, Literal, Operator, Phase, Pseudo, Selector};
use crate::SyntaxError;

/// Characters that may appear in an operator token inside brackets
const OPERATOR_CHARS: &[char] = &['=', '^', '<', '>', '~', '$', '*', '!', '|'];

/// Selector parser
pub struct SelectorParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> SelectorParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Parse the whole input as a selector
    pub fn parse(mut self) -> Result<Selector, SyntaxError> {
        if self.input.trim().is_empty() {
            return Err(SyntaxError::Empty);
        }

        let mut legs = Vec::new();
        loop {
            legs.push(self.parse_leg()?);
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some('/') => self.bump(),
                Some(found) => {
                    return Err(SyntaxError::UnexpectedChar {
                        offset: self.pos,
                        found,
                    });
                }
            }
        }

        Ok(Selector { legs })
    }

    /// Parse the whole input as exactly one phase
    pub fn parse_single_phase(mut self) -> Result<Phase, SyntaxError> {
        if self.input.trim().is_empty() {
            return Err(SyntaxError::Empty);
        }
        self.skip_whitespace();
        let phase = self.parse_phase()?;
        self.skip_whitespace();
        match self.peek() {
            None => Ok(phase),
            Some(found) => Err(SyntaxError::UnexpectedChar {
                offset: self.pos,
                found,
            }),
        }
    }

    fn parse_leg(&mut self) -> Result<Leg, SyntaxError> {
        self.skip_whitespace();
        let mut leg = Leg::new(self.parse_phase()?);

        loop {
            let had_whitespace = self.skip_whitespace();
            match self.peek() {
                None | Some('/') => break,
                Some('>') => {
                    self.bump();
                    self.skip_whitespace();
                    let phase = self.parse_phase()?;
                    leg.tail.push((Combinator::Child, phase));
                }
                Some(_) if had_whitespace => {
                    let phase = self.parse_phase()?;
                    leg.tail.push((Combinator::Descendant, phase));
                }
                Some(found) => {
                    return Err(SyntaxError::UnexpectedChar {
                        offset: self.pos,
                        found,
                    });
                }
            }
        }

        Ok(leg)
    }

    fn parse_phase(&mut self) -> Result<Phase, SyntaxError> {
        let start = self.pos;
        let mut phase = Phase::new();

        match self.peek() {
            None | Some('/') | Some('>') => {
                return Err(SyntaxError::EmptyPhase { offset: start });
            }
            Some('*') => self.bump(),
            Some('_') => {
                self.bump();
                phase.id = Some(self.expect_name()?);
            }
            Some(c) if c.is_alphanumeric() => {
                let word = self.read_name();
                if word.chars().all(|c| c.is_ascii_digit()) {
                    phase.diggerid = Some(word);
                } else {
                    phase.tag = Some(word);
                }
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    phase.id = Some(self.expect_name()?);
                }
                Some('=') => {
                    self.bump();
                    phase.diggerid = Some(self.expect_name()?);
                }
                Some('.') => {
                    self.bump();
                    phase.classes.insert(self.expect_name()?);
                }
                Some('[') => {
                    phase.attrs.push(self.parse_attr()?);
                }
                Some(':') => {
                    phase.modifier = Some(self.parse_pseudo()?);
                    match self.peek() {
                        Some(':') => {
                            return Err(SyntaxError::DuplicatePseudo { offset: self.pos });
                        }
                        Some(found @ ('#' | '=' | '.' | '[')) => {
                            return Err(SyntaxError::UnexpectedChar {
                                offset: self.pos,
                                found,
                            });
                        }
                        _ => break,
                    }
                }
                _ => break,
            }
        }

        if self.pos == start {
            return match self.peek() {
                Some(found) => Err(SyntaxError::UnexpectedChar {
                    offset: self.pos,
                    found,
                }),
                None => Err(SyntaxError::EmptyPhase { offset: start }),
            };
        }

        Ok(phase)
    }

    fn parse_attr(&mut self) -> Result<AttrPredicate, SyntaxError> {
        let open = self.pos;
        self.bump();

        let body_start = self.pos;
        let mut quote: Option<char> = None;
        let close = loop {
            match self.peek() {
                None => return Err(SyntaxError::UnterminatedBracket { offset: open }),
                Some('\\') if quote.is_some() => self.bump(),
                Some(c) if Some(c) == quote => quote = None,
                Some(c @ ('"' | '\'')) if quote.is_none() => quote = Some(c),
                Some(']') if quote.is_none() => break self.pos,
                Some(_) => {}
            }
            self.bump();
        };
        self.bump();

        let body = &self.input[body_start..close];
        let op_start = body
            .find(OPERATOR_CHARS)
            .ok_or(SyntaxError::UnknownOperator {
                offset: body_start,
                operator: String::new(),
            })?;
        let op_len = body[op_start..]
            .find(|c: char| !OPERATOR_CHARS.contains(&c))
            .unwrap_or(body.len() - op_start);
        let op_token = &body[op_start..op_start + op_len];

        let operator = Operator::parse(op_token).ok_or_else(|| SyntaxError::UnknownOperator {
            offset: body_start + op_start,
            operator: op_token.to_string(),
        })?;

        let field = body[..op_start].trim();
        if field.is_empty() {
            return Err(SyntaxError::ExpectedName { offset: body_start });
        }

        let raw = body[op_start + op_len..].trim();
        let value = match unquote(raw) {
            Some(inner) => Literal::String(inner),
            None => Literal::from_token(raw),
        };

        Ok(AttrPredicate {
            field: field.to_string(),
            operator,
            value,
        })
    }

    fn parse_pseudo(&mut self) -> Result<Pseudo, SyntaxError> {
        let colon = self.pos;
        self.bump();
        let name = self.read_name();

        match name.as_str() {
            "first" => Ok(Pseudo::First),
            "last" => Ok(Pseudo::Last),
            "limit" => {
                if self.peek() != Some('(') {
                    return Err(SyntaxError::InvalidLimit { offset: self.pos });
                }
                self.bump();
                let arg_start = self.pos;
                while let Some(c) = self.peek() {
                    if c == ')' {
                        break;
                    }
                    self.bump();
                }
                if self.peek() != Some(')') {
                    return Err(SyntaxError::InvalidLimit { offset: arg_start });
                }
                let arg = self.input[arg_start..self.pos].trim();
                self.bump();
                if arg.is_empty() || !arg.chars().all(|c| c.is_ascii_digit()) {
                    return Err(SyntaxError::InvalidLimit { offset: arg_start });
                }
                arg.parse::<usize>()
                    .map(Pseudo::Limit)
                    .map_err(|_| SyntaxError::InvalidLimit { offset: arg_start })
            }
            _ => Err(SyntaxError::UnknownPseudo {
                offset: colon,
                name,
            }),
        }
    }

    fn expect_name(&mut self) -> Result<String, SyntaxError> {
        let offset = self.pos;
        let name = self.read_name();
        if name.is_empty() {
            return Err(SyntaxError::ExpectedName { offset });
        }
        Ok(name)
    }

    fn read_name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                self.bump();
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    /// Skip whitespace, reporting whether any was consumed
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
        self.pos > start
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    #[inline]
    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }
}

/// Strip matching quotes and resolve `\` escapes inside them.
fn unquote(raw: &str) -> Option<String> {
    let first = raw.chars().next()?;
    if !(first == '"' || first == '\'') || raw.len() < 2 || !raw.ends_with(first) {
        return None;
    }

    let mut out = String::with_capacity(raw.len() - 2);
    let mut chars = raw[1..raw.len() - 1].chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    Some(out)
}
