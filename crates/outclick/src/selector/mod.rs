//! A small CSS selector engine.
//!
//! Supported grammar:
//!
//! * selector lists: `a, b`
//! * descendant (whitespace) and child (`>`) combinators
//! * type selectors and `*`
//! * `#id`, `.class`
//! * `[attr]` and `[attr=value]` with bare, `"double"` or `'single'` quoted values
//!
//! Anything else is rejected with a [`SelectorError`] rather than silently matching
//! nothing.

mod error;

pub use error::{SelectorError, SelectorErrorExt};

use std::str::FromStr;

/// Read access to an element tree, as needed by [`SelectorList::matches`].
pub trait ElementTree {
    type Node: Copy;

    fn parent_element(&self, node: Self::Node) -> Option<Self::Node>;

    /// Lowercase tag name.
    fn local_name(&self, node: Self::Node) -> &str;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    fn id(&self, node: Self::Node) -> Option<&str> {
        self.attribute(node, "id")
    }

    fn has_class(&self, node: Self::Node, class: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }
}

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<Complex>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    /// Left to right.
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`.
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    /// `None` for `*` or an omitted type selector.
    tag: Option<String>,
    filters: Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Filter {
    Id(String),
    Class(String),
    HasAttr(String),
    AttrEquals(String, String),
}

impl SelectorList {
    /// Parses a selector list.
    ///
    /// # Errors
    /// Returns a [`SelectorError`] describing the first problem found.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        Parser { input, pos: 0 }.selector_list()
    }

    /// Number of comma-separated selectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Whether `node` matches any selector in the list.
    pub fn matches<T: ElementTree>(&self, tree: &T, node: T::Node) -> bool {
        self.selectors.iter().any(|s| s.matches_at(tree, node, s.compounds.len() - 1))
    }
}

impl FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Complex {
    fn matches_at<T: ElementTree>(&self, tree: &T, node: T::Node, index: usize) -> bool {
        if !self.compounds[index].matches(tree, node) {
            return false;
        }
        if index == 0 {
            return true;
        }

        match self.combinators[index - 1] {
            Combinator::Child => {
                tree.parent_element(node).is_some_and(|p| self.matches_at(tree, p, index - 1))
            },
            Combinator::Descendant => {
                let mut current = tree.parent_element(node);
                while let Some(ancestor) = current {
                    if self.matches_at(tree, ancestor, index - 1) {
                        return true;
                    }
                    current = tree.parent_element(ancestor);
                }
                false
            },
        }
    }
}

impl Compound {
    fn matches<T: ElementTree>(&self, tree: &T, node: T::Node) -> bool {
        if let Some(tag) = &self.tag
            && tree.local_name(node) != tag
        {
            return false;
        }

        self.filters.iter().all(|filter| match filter {
            Filter::Id(id) => tree.id(node) == Some(id.as_str()),
            Filter::Class(class) => tree.has_class(node, class),
            Filter::HasAttr(name) => tree.attribute(node, name).is_some(),
            Filter::AttrEquals(name, value) => tree.attribute(node, name) == Some(value.as_str()),
        })
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn selector_list(mut self) -> Result<SelectorList, SelectorError> {
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            selectors.push(self.complex()?);
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(',') => {
                    self.bump();
                },
                Some(found) => return Err(self.unexpected(found)),
            }
        }
        Ok(SelectorList { selectors })
    }

    fn complex(&mut self) -> Result<Complex, SelectorError> {
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.bump();
                    self.skip_whitespace();
                    Combinator::Child
                },
                Some('+' | '~') => return Err(self.unsupported("sibling combinator")),
                Some(_) if had_space => Combinator::Descendant,
                Some(found) => return Err(self.unexpected(found)),
            };
            if self.peek().is_none() {
                return Err(self.end());
            }
            combinators.push(combinator);
            compounds.push(self.compound()?);
        }

        Ok(Complex { compounds, combinators })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let start = self.pos;
        let mut compound = Compound::default();

        match self.peek() {
            Some('*') => {
                self.bump();
            },
            Some(c) if is_ident_start(c) => {
                compound.tag = Some(self.ident()?.to_ascii_lowercase());
            },
            _ => {},
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    compound.filters.push(Filter::Id(self.ident()?));
                },
                Some('.') => {
                    self.bump();
                    compound.filters.push(Filter::Class(self.ident()?));
                },
                Some('[') => {
                    self.bump();
                    compound.filters.push(self.attribute()?);
                },
                Some(':') => return Err(self.unsupported("pseudo-class")),
                _ => break,
            }
        }

        if self.pos == start {
            return Err(match self.peek() {
                None | Some(',') => SelectorError::Empty { offset: self.pos, context: None },
                Some(found) => self.unexpected(found),
            });
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<Filter, SelectorError> {
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let filter = match self.peek() {
            Some(']') => Filter::HasAttr(name),
            Some('=') => {
                self.bump();
                self.skip_whitespace();
                let value = match self.peek() {
                    Some(quote @ ('"' | '\'')) => self.quoted(quote)?,
                    _ => self.ident()?,
                };
                self.skip_whitespace();
                Filter::AttrEquals(name, value)
            },
            Some('~' | '|' | '^' | '$' | '*') => {
                return Err(self.unsupported("attribute operator"));
            },
            Some(found) => return Err(self.unexpected(found)),
            None => return Err(self.end()),
        };

        match self.bump() {
            Some(']') => Ok(filter),
            Some(found) => {
                self.pos -= found.len_utf8();
                Err(self.unexpected(found))
            },
            None => Err(self.end()),
        }
    }

    fn quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        self.bump();
        let rest = &self.input[self.pos..];
        let Some(len) = rest.find(quote) else {
            self.pos = self.input.len();
            return Err(self.end());
        };
        let value = rest[..len].to_owned();
        self.pos += len + quote.len_utf8();
        Ok(value)
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(c) if is_ident_start(c) => {},
            Some(found) => return Err(self.unexpected(found)),
            None => return Err(self.end()),
        }

        let rest = &self.input[self.pos..];
        let len = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
        self.pos += len;
        Ok(rest[..len].to_owned())
    }

    fn skip_whitespace(&mut self) -> bool {
        let rest = &self.input[self.pos..];
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
        rest.len() != trimmed.len()
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    const fn unexpected(&self, found: char) -> SelectorError {
        SelectorError::UnexpectedToken { found, offset: self.pos, context: None }
    }

    const fn end(&self) -> SelectorError {
        SelectorError::UnexpectedEnd { offset: self.pos, context: None }
    }

    const fn unsupported(&self, syntax: &'static str) -> SelectorError {
        SelectorError::Unsupported {
            syntax: std::borrow::Cow::Borrowed(syntax),
            offset: self.pos,
            context: None,
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lists_and_combinators() {
        let list = SelectorList::parse("#popup, div.menu > [data-role=item] span").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.selectors[1].compounds.len(), 3);
        assert_eq!(
            list.selectors[1].combinators,
            vec![Combinator::Child, Combinator::Descendant]
        );
    }

    #[test]
    fn type_selectors_are_lowercased() {
        let list: SelectorList = "DIV".parse().unwrap();
        assert_eq!(list.selectors[0].compounds[0].tag.as_deref(), Some("div"));
    }

    #[test]
    fn quoted_attribute_values_keep_spaces() {
        let list = SelectorList::parse(r#"[title="two words"]"#).unwrap();
        assert_eq!(
            list.selectors[0].compounds[0].filters,
            vec![Filter::AttrEquals("title".to_owned(), "two words".to_owned())]
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            SelectorList::parse(":::bad"),
            Err(SelectorError::Unsupported { offset: 0, .. })
        ));
        assert!(matches!(SelectorList::parse("   "), Err(SelectorError::Empty { .. })));
        assert!(matches!(SelectorList::parse("a,,b"), Err(SelectorError::Empty { offset: 2, .. })));
        assert!(matches!(
            SelectorList::parse("> a"),
            Err(SelectorError::UnexpectedToken { found: '>', offset: 0, .. })
        ));
        assert!(matches!(SelectorList::parse("a >"), Err(SelectorError::UnexpectedEnd { .. })));
        assert!(matches!(SelectorList::parse("#"), Err(SelectorError::UnexpectedEnd { .. })));
        assert!(matches!(
            SelectorList::parse("[title='open"),
            Err(SelectorError::UnexpectedEnd { .. })
        ));
        assert!(matches!(SelectorList::parse("a + b"), Err(SelectorError::Unsupported { .. })));
        assert!(matches!(SelectorList::parse("[a~=b]"), Err(SelectorError::Unsupported { .. })));
        assert!(matches!(SelectorList::parse("a,"), Err(SelectorError::Empty { .. })));
    }

    #[test]
    fn error_reports_offset() {
        let err = SelectorList::parse("div.menu:hover").unwrap_err();
        assert_eq!(err.offset(), 8);
        assert_eq!(err.to_string(), "Unsupported pseudo-class at offset 8");
    }
}
