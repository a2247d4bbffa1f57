//! CSS selector parser.

use super::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    SelectorList,
};
use alloc::string::String;
use alloc::vec::Vec;

/// Error type for selector parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// Parses a selector list such as `ul > li.item, a[href]`.
pub fn parse_selector_list(input: &str) -> Result<SelectorList, ParseError> {
    Parser::new(input).parse_list()
}

/// Parser state.
struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    /// Returns true if any whitespace was skipped.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
        self.pos > start
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.advance();
                Ok(())
            }
            Some(c) => Err(ParseError::new(
                alloc::format!("Expected '{}', found '{}'", expected, c),
                self.pos,
            )),
            None => Err(ParseError::new(
                alloc::format!("Expected '{}', found end of input", expected),
                self.pos,
            )),
        }
    }

    fn parse_list(&mut self) -> Result<SelectorList, ParseError> {
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            selectors.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.advance(),
                None => break,
                Some(c) => {
                    return Err(ParseError::new(
                        alloc::format!("Unexpected '{}'", c),
                        self.pos,
                    ))
                }
            }
        }
        Ok(SelectorList { selectors })
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, ParseError> {
        let mut compounds = Vec::new();
        let mut combinators = Vec::new();
        compounds.push(self.parse_compound()?);

        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.peek() {
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(',') | None => break,
                Some(_) if had_whitespace => Combinator::Descendant,
                Some(c) => {
                    return Err(ParseError::new(
                        alloc::format!("Unexpected '{}'", c),
                        self.pos,
                    ))
                }
            };
            if combinator != Combinator::Descendant {
                self.advance();
                self.skip_whitespace();
            }
            if matches!(self.peek(), None | Some(',')) {
                return Err(ParseError::new("Dangling combinator", self.pos));
            }
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, ParseError> {
        let start = self.pos;
        let mut compound = CompoundSelector::default();

        match self.peek() {
            Some('*') => self.advance(),
            Some(c) if is_ident_start(c) => {
                compound.tag = Some(self.parse_identifier()?.to_ascii_lowercase());
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.advance();
                    compound.ids.push(self.parse_identifier()?);
                }
                Some('.') => {
                    self.advance();
                    compound.classes.push(self.parse_identifier()?);
                }
                Some('[') => {
                    self.advance();
                    compound.attributes.push(self.parse_attribute()?);
                }
                Some(':') => {
                    return Err(ParseError::new(
                        "Pseudo-classes are not supported",
                        self.pos,
                    ))
                }
                _ => break,
            }
        }

        if self.pos == start {
            return Err(match self.peek() {
                Some(c) => ParseError::new(alloc::format!("Unexpected '{}'", c), self.pos),
                None => ParseError::new("Expected selector", self.pos),
            });
        }
        Ok(compound)
    }

    fn parse_identifier(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if is_ident_start(c) => self.advance(),
            _ => return Err(ParseError::new("Expected identifier", self.pos)),
        }
        while let Some(c) = self.peek() {
            if is_ident_char(c) {
                self.advance();
            } else {
                break;
            }
        }
        Ok(String::from(&self.input[start..self.pos]))
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, ParseError> {
        self.skip_whitespace();
        let name = self.parse_identifier()?.to_ascii_lowercase();
        self.skip_whitespace();

        let op = match self.peek() {
            Some(']') => {
                self.advance();
                return Ok(AttributeSelector {
                    name,
                    matcher: AttributeMatcher::Exists,
                });
            }
            Some('=') => {
                self.advance();
                '='
            }
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                self.advance();
                self.expect('=')?;
                c
            }
            Some(c) => {
                return Err(ParseError::new(
                    alloc::format!("Unexpected '{}' in attribute selector", c),
                    self.pos,
                ))
            }
            None => return Err(ParseError::new("Unterminated attribute selector", self.pos)),
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.advance();
                self.parse_quoted(quote)?
            }
            Some(_) => self.parse_identifier()?,
            None => return Err(ParseError::new("Unterminated attribute selector", self.pos)),
        };
        self.skip_whitespace();
        self.expect(']')?;

        let matcher = match op {
            '=' => AttributeMatcher::Equals(value),
            '~' => AttributeMatcher::Includes(value),
            '|' => AttributeMatcher::DashMatch(value),
            '^' => AttributeMatcher::Prefix(value),
            '$' => AttributeMatcher::Suffix(value),
            _ => AttributeMatcher::Substring(value),
        };
        Ok(AttributeSelector { name, matcher })
    }

    /// Reads up to the closing quote; `\` escapes the next character.
    fn parse_quoted(&mut self, quote: char) -> Result<String, ParseError> {
        let mut value = String::new();
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(value);
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some(c) => {
                            value.push(c);
                            self.advance();
                        }
                        None => break,
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
                None => break,
            }
        }
        Err(ParseError::new("Unterminated string", self.pos))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}
