//! Recursive descent CSS parser.
//!
//! Parses CSS text into a [`StyleSheet`], a selector list for rule
//! registration, or a bare declaration block for inline styles. Uses the
//! logos-based tokenizer from [`crate::css::tokenizer`].
//!
//! Selectors are parsed strictly: a malformed selector rejects the whole
//! rule. Declarations recover at the next `;` so one bad value never drops
//! its neighbours.

use logos::Logos;
use tracing::debug;

use crate::css::model::*;
use crate::css::tokenizer::Token;

/// Errors from CSS parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected token at position {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
    #[error("empty selector")]
    EmptySelector,
}

/// A positioned token with byte-level span information for whitespace detection.
#[derive(Debug, Clone)]
struct PToken {
    token: Token,
    text: String,
    /// Index in the token stream (for error reporting).
    pos: usize,
    /// Byte offset where this token starts in the source.
    byte_start: usize,
    /// Byte offset where this token ends in the source.
    byte_end: usize,
}

/// Strip CSS block comments (`/* ... */`) from the input, replacing each
/// comment with a single space.
fn strip_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("/*") {
        result.push_str(&rest[..start]);
        result.push(' ');
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            // Unterminated comment: consume the rest of the input.
            None => rest = "",
        }
    }
    result.push_str(rest);
    result
}

/// Tokenize input using logos with span information preserved.
fn tokenize_with_spans(input: &str) -> Vec<PToken> {
    let lexer = Token::lexer(input);
    let mut tokens = Vec::new();
    let mut idx = 0;

    for (result, span) in lexer.spanned() {
        if let Ok(token) = result {
            tokens.push(PToken {
                text: input[span.clone()].to_string(),
                token,
                pos: idx,
                byte_start: span.start,
                byte_end: span.end,
            });
            idx += 1;
        }
    }

    tokens
}

fn parser_for(input: &str) -> Parser {
    let cleaned = strip_comments(input);
    Parser { tokens: tokenize_with_spans(&cleaned), cursor: 0 }
}

/// Parse a CSS string into a [`StyleSheet`].
pub fn parse_css(input: &str) -> Result<StyleSheet, ParseError> {
    let mut parser = parser_for(input);

    let mut rules = Vec::new();
    while !parser.is_eof() {
        rules.push(parser.parse_rule()?);
    }

    Ok(StyleSheet { rules })
}

/// Parse a comma-separated selector list such as `.a > b, #c`.
///
/// Empty input and trailing garbage are errors.
pub fn parse_selector_list(input: &str) -> Result<Vec<Selector>, ParseError> {
    let mut parser = parser_for(input);
    if parser.is_eof() {
        return Err(ParseError::EmptySelector);
    }
    let selectors = parser.parse_selector_list()?;
    if let Some(tok) = parser.peek() {
        return Err(ParseError::UnexpectedToken {
            position: tok.pos,
            message: format!("trailing {:?} '{}' after selector", tok.token, tok.text),
        });
    }
    Ok(selectors)
}

/// Parse a bare declaration block such as `width: 10px; color: red`.
///
/// Malformed declarations are skipped.
pub fn parse_declarations(input: &str) -> Vec<Declaration> {
    let mut parser = parser_for(input);
    parser.parse_declarations()
}

/// Recursive descent parser state.
struct Parser {
    tokens: Vec<PToken>,
    cursor: usize,
}

impl Parser {
    fn is_eof(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    fn peek(&self) -> Option<&PToken> {
        self.tokens.get(self.cursor)
    }

    fn peek_is(&self, token: &Token) -> bool {
        self.peek().is_some_and(|t| &t.token == token)
    }

    fn advance(&mut self) -> Option<PToken> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<PToken, ParseError> {
        match self.advance() {
            Some(tok) if &tok.token == expected => Ok(tok),
            Some(tok) => Err(ParseError::UnexpectedToken {
                position: tok.pos,
                message: format!("expected {:?}, got {:?} '{}'", expected, tok.token, tok.text),
            }),
            None => Err(ParseError::UnexpectedEof(format!("expected {:?}", expected))),
        }
    }

    fn current_pos(&self) -> usize {
        self.peek().map(|t| t.pos).unwrap_or(self.tokens.len())
    }

    /// Returns `true` if the current token is immediately adjacent (no whitespace)
    /// to the previous token.
    fn is_adjacent(&self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let prev = &self.tokens[self.cursor - 1];
        match self.peek() {
            Some(curr) => curr.byte_start == prev.byte_end,
            None => false,
        }
    }

    /// Parse a single CSS rule: selector(s) `{` declarations `}`.
    fn parse_rule(&mut self) -> Result<RuleSet, ParseError> {
        let selectors = self.parse_selector_list()?;
        self.expect(&Token::BraceOpen)?;
        let declarations = self.parse_declarations();
        self.expect(&Token::BraceClose)?;

        Ok(RuleSet { selectors, declarations })
    }

    /// Parse a comma-separated list of selectors.
    fn parse_selector_list(&mut self) -> Result<Vec<Selector>, ParseError> {
        let mut selectors = vec![self.parse_selector()?];

        while self.peek_is(&Token::Comma) {
            self.advance();
            selectors.push(self.parse_selector()?);
        }

        Ok(selectors)
    }

    /// Parse a single selector: a sequence of compound selectors with combinators.
    fn parse_selector(&mut self) -> Result<Selector, ParseError> {
        let mut parts = vec![SelectorPart::Compound(self.parse_compound_selector()?)];

        loop {
            let combinator = match self.peek().map(|t| &t.token) {
                Some(Token::GreaterThan) => Combinator::Child,
                Some(Token::Plus) => Combinator::Adjacent,
                Some(Token::Tilde) => Combinator::Sibling,
                // A selector-starting token that the compound did not consume
                // was separated by whitespace: descendant combinator.
                Some(
                    Token::Ident
                    | Token::Hash
                    | Token::HexColor
                    | Token::Dot
                    | Token::Star
                    | Token::PseudoClass,
                ) => {
                    parts.push(SelectorPart::Combinator(Combinator::Descendant));
                    parts.push(SelectorPart::Compound(self.parse_compound_selector()?));
                    continue;
                }
                _ => break,
            };
            self.advance();
            parts.push(SelectorPart::Combinator(combinator));
            parts.push(SelectorPart::Compound(self.parse_compound_selector()?));
        }

        Ok(Selector { parts })
    }

    fn parse_named(&mut self, what: &str) -> Result<String, ParseError> {
        let tok = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof(format!("expected {what}")))?;
        if tok.token != Token::Ident {
            return Err(ParseError::UnexpectedToken {
                position: tok.pos,
                message: format!("expected {what}, got {:?} '{}'", tok.token, tok.text),
            });
        }
        Ok(tok.text)
    }

    /// Parse one simple selector that may follow another without whitespace.
    fn parse_qualifier(&mut self) -> Result<Option<SelectorComponent>, ParseError> {
        let component = match self.peek().map(|t| t.token.clone()) {
            Some(Token::Dot) => {
                self.advance();
                SelectorComponent::Class(self.parse_named("class name after '.'")?)
            }
            Some(Token::Hash) => {
                self.advance();
                SelectorComponent::Id(self.parse_named("id name after '#'")?)
            }
            // `#abc` lexes as a hex color; in selector position it is an id.
            Some(Token::HexColor) => {
                let tok = self.advance().ok_or_else(|| ParseError::UnexpectedEof("id".into()))?;
                SelectorComponent::Id(tok.text[1..].to_string())
            }
            Some(Token::PseudoClass) => {
                let tok = self
                    .advance()
                    .ok_or_else(|| ParseError::UnexpectedEof("pseudo-class".into()))?;
                SelectorComponent::PseudoClass(tok.text[1..].to_string())
            }
            _ => return Ok(None),
        };
        Ok(Some(component))
    }

    /// Parse a compound selector such as `item.primary:hover`.
    ///
    /// Qualifiers are only appended while they sit directly against the
    /// previous token; whitespace ends the compound.
    fn parse_compound_selector(&mut self) -> Result<CompoundSelector, ParseError> {
        let mut compound = CompoundSelector::new();

        match self.peek().map(|t| t.token.clone()) {
            Some(Token::Ident) => {
                let name = self.parse_named("type name")?;
                compound.push(SelectorComponent::Type(name));
            }
            Some(Token::Star) => {
                self.advance();
                compound.push(SelectorComponent::Universal);
            }
            _ => match self.parse_qualifier()? {
                Some(component) => compound.push(component),
                None => {
                    return Err(ParseError::UnexpectedToken {
                        position: self.current_pos(),
                        message: "expected selector part".into(),
                    });
                }
            },
        }

        while self.is_adjacent() {
            match self.parse_qualifier()? {
                Some(component) => compound.push(component),
                None => break,
            }
        }

        Ok(compound)
    }

    /// Parse declarations up to `}` or end of input, skipping malformed ones.
    fn parse_declarations(&mut self) -> Vec<Declaration> {
        let mut declarations = Vec::new();

        loop {
            while self.peek_is(&Token::Semicolon) {
                self.advance();
            }
            if self.is_eof() || self.peek_is(&Token::BraceClose) {
                break;
            }
            let start = self.cursor;
            match self.parse_declaration() {
                Ok(decl) => declarations.push(decl),
                Err(err) => {
                    debug!(error = %err, "skipping malformed declaration");
                    if self.cursor == start {
                        self.advance();
                    }
                    while !self.is_eof()
                        && !self.peek_is(&Token::Semicolon)
                        && !self.peek_is(&Token::BraceClose)
                    {
                        self.advance();
                    }
                }
            }
        }

        declarations
    }

    /// Parse a single declaration: `property: value1 value2 [!important]`.
    fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let property = self.parse_named("property name")?;
        let mut values = Vec::new();

        // `color:red` lexes as `color` + `:red`.
        match self.peek().map(|t| t.token.clone()) {
            Some(Token::PseudoClass) if self.is_adjacent() => {
                if let Some(tok) = self.advance() {
                    values.push(DeclarationValue::Ident(tok.text[1..].to_string()));
                }
            }
            _ => {
                self.expect(&Token::Colon)?;
            }
        }

        let mut important = false;
        loop {
            match self.peek().map(|t| &t.token) {
                None | Some(Token::Semicolon) | Some(Token::BraceClose) => break,
                Some(Token::Important) => {
                    self.advance();
                    important = true;
                    break;
                }
                Some(_) => values.push(self.parse_declaration_value()?),
            }
        }

        if values.is_empty() {
            return Err(ParseError::UnexpectedToken {
                position: self.current_pos(),
                message: format!("declaration '{property}' has no value"),
            });
        }

        Ok(Declaration { property, values, important })
    }

    /// Parse a single declaration value token into a [`DeclarationValue`].
    fn parse_declaration_value(&mut self) -> Result<DeclarationValue, ParseError> {
        let tok = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof("expected declaration value".into()))?;

        let invalid = |message: String| ParseError::UnexpectedToken { position: tok.pos, message };

        match &tok.token {
            Token::Number => {
                let n: f32 =
                    tok.text.parse().map_err(|_| invalid(format!("invalid number: {}", tok.text)))?;
                Ok(DeclarationValue::Number(n))
            }
            Token::Dimension => {
                let (num_str, unit_str) = split_dimension(&tok.text)
                    .ok_or_else(|| invalid(format!("invalid dimension: {}", tok.text)))?;
                let n: f32 = num_str
                    .parse()
                    .map_err(|_| invalid(format!("invalid number in dimension: {num_str}")))?;
                Ok(DeclarationValue::Dimension(n, unit_str.to_string()))
            }
            Token::Ident => Ok(DeclarationValue::Ident(tok.text.clone())),
            Token::HexColor => {
                let hex = tok.text.strip_prefix('#').unwrap_or(&tok.text);
                Ok(DeclarationValue::Color(hex.to_string()))
            }
            Token::StringLiteral | Token::StringLiteralSingle => {
                Ok(DeclarationValue::String(tok.text[1..tok.text.len() - 1].to_string()))
            }
            Token::Url => {
                let body = tok.text["url(".len()..tok.text.len() - 1].trim();
                let body = body.trim_matches(|c| c == '"' || c == '\'');
                Ok(DeclarationValue::Url(body.to_string()))
            }
            Token::Function => {
                let name = tok.text[..tok.text.len() - 1].to_ascii_lowercase();
                let mut args = Vec::new();
                loop {
                    match self.peek().map(|t| &t.token) {
                        Some(Token::ParenClose) => {
                            self.advance();
                            break;
                        }
                        Some(Token::Comma) => {
                            self.advance();
                        }
                        Some(_) => args.push(self.parse_declaration_value()?),
                        None => {
                            return Err(ParseError::UnexpectedEof(format!(
                                "unterminated {name}() call"
                            )))
                        }
                    }
                }
                Ok(DeclarationValue::Function(name, args))
            }
            Token::Comma => Ok(DeclarationValue::Comma),
            Token::Slash => Ok(DeclarationValue::Slash),
            other => Err(invalid(format!(
                "unexpected token in declaration value: {:?} '{}'",
                other, tok.text
            ))),
        }
    }
}

/// Split a dimension string like "50%" or "10px" into (number_part, unit_part).
fn split_dimension(s: &str) -> Option<(&str, &str)> {
    let unit_start = s
        .char_indices()
        .find(|(i, c)| !c.is_ascii_digit() && *c != '.' && !(*c == '-' && *i == 0))
        .map(|(i, _)| i)?;

    if unit_start == 0 || unit_start >= s.len() {
        return None;
    }

    Some((&s[..unit_start], &s[unit_start..]))
}
