//! Inline `style` attribute parsing and serialization.
//!
//! Declarations are tokenized with `cssparser`, so comments, strings and
//! nested functions such as `rgb(0 0 0 / 50%)` are handled the way a browser
//! would. Values are kept as their raw source text; only `!important` is
//! split off. Invalid declarations are dropped, matching how browsers treat
//! a malformed `style` attribute.

use cssparser::{
    parse_important, AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, Token,
};

/// One `name: value [!important]` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
    pub important: bool,
}

/// The parsed declarations of an inline style, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<Declaration>,
}

impl InlineStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `style` attribute value. Later duplicates replace earlier ones.
    pub fn parse(text: &str) -> Self {
        let mut input = ParserInput::new(text);
        let mut parser = Parser::new(&mut input);
        let mut decl_parser = InlineDeclarationParser;

        let mut style = Self::new();
        for declaration in RuleBodyParser::new(&mut parser, &mut decl_parser).flatten() {
            style.upsert(declaration);
        }
        style
    }

    pub fn get(&self, name: &str) -> Option<&Declaration> {
        let name = normalize_name(name);
        self.declarations.iter().find(|d| d.name == name)
    }

    /// Sets a property, keeping its position if already present.
    pub fn set(&mut self, name: &str, value: &str, important: bool) {
        self.upsert(Declaration {
            name: normalize_name(name),
            value: value.trim().to_string(),
            important,
        });
    }

    pub fn remove(&mut self, name: &str) -> Option<Declaration> {
        let name = normalize_name(name);
        let index = self.declarations.iter().position(|d| d.name == name)?;
        Some(self.declarations.remove(index))
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Serializes as `name: value; name: value !important;`.
    pub fn to_css(&self) -> String {
        self.declarations
            .iter()
            .map(|d| {
                if d.important {
                    format!("{}: {} !important;", d.name, d.value)
                } else {
                    format!("{}: {};", d.name, d.value)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn upsert(&mut self, declaration: Declaration) {
        match self
            .declarations
            .iter_mut()
            .find(|d| d.name == declaration.name)
        {
            Some(existing) => *existing = declaration,
            None => self.declarations.push(declaration),
        }
    }
}

/// Custom properties are case-sensitive; everything else is not.
fn normalize_name(name: &str) -> String {
    let name = name.trim();
    if name.starts_with("--") {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    }
}

struct InlineDeclarationParser;

impl<'i> DeclarationParser<'i> for InlineDeclarationParser {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let start = input.position();
        let mut end = start;
        let mut important = false;

        while !input.is_exhausted() {
            if input.try_parse(parse_important).is_ok() {
                input.expect_exhausted()?;
                important = true;
                break;
            }
            let opens_block = matches!(
                input.next_including_whitespace_and_comments()?,
                Token::Function(_)
                    | Token::ParenthesisBlock
                    | Token::SquareBracketBlock
                    | Token::CurlyBracketBlock
            );
            if opens_block {
                input.parse_nested_block(|nested| {
                    while nested.next_including_whitespace_and_comments().is_ok() {}
                    Ok::<(), ParseError<'i, ()>>(())
                })?;
            }
            end = input.position();
        }

        let value = input.slice(start..end).trim();
        if value.is_empty() {
            return Err(input.new_custom_error::<(), ()>(()));
        }

        Ok(Declaration {
            name: normalize_name(name.as_ref()),
            value: value.to_string(),
            important,
        })
    }
}

impl<'i> AtRuleParser<'i> for InlineDeclarationParser {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for InlineDeclarationParser {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = ();
}

impl<'i> RuleBodyItemParser<'i, Declaration, ()> for InlineDeclarationParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}
