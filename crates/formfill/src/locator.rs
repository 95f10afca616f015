//! Structural element queries and the handles they resolve to.
//!
//! A [`Query`] is a small path of steps (descendant, child, parent), each with a
//! tag and predicates over attributes and own text. It renders to XPath 1.0 for
//! a real browser and is evaluated structurally by the in-memory mock.
//!
//! Lookups never wait and never retry. An empty result means "nothing rendered
//! right now"; deciding whether that is fatal is the caller's job.

use std::fmt;
use std::path::Path;

use crate::result::{FormError, FormResult};

/// Direction of a query step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Any depth below the current nodes (`//`)
    Descendant,
    /// Direct children (`/`)
    Child,
    /// The parent node (`/..`)
    Parent,
}

/// A condition on a single node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `contains(@name, value)`
    AttrContains {
        /// Attribute name
        name: String,
        /// Substring to find
        value: String,
    },
    /// `@name = value`
    AttrEquals {
        /// Attribute name
        name: String,
        /// Exact value
        value: String,
    },
    /// `contains(text(), value)`
    TextContains(String),
    /// `text() = value`
    TextEquals(String),
    /// `normalize-space(text()) = value`
    TextNormalized(String),
    /// Disjunction of the inner predicates
    AnyOf(Vec<Predicate>),
}

impl Predicate {
    /// `contains(text(), value)`
    #[must_use]
    pub fn text_contains(value: impl Into<String>) -> Self {
        Self::TextContains(value.into())
    }

    /// `text() = value`
    #[must_use]
    pub fn text_equals(value: impl Into<String>) -> Self {
        Self::TextEquals(value.into())
    }

    fn to_xpath(&self) -> String {
        match self {
            Self::AttrContains { name, value } => {
                format!("contains(@{name},{})", xpath_literal(value))
            }
            Self::AttrEquals { name, value } => format!("@{name}={}", xpath_literal(value)),
            Self::TextContains(t) => format!("contains(text(),{})", xpath_literal(t)),
            Self::TextEquals(t) => format!("text()={}", xpath_literal(t)),
            Self::TextNormalized(t) => format!("normalize-space(text())={}", xpath_literal(t)),
            Self::AnyOf(inner) => inner
                .iter()
                .map(Self::to_xpath)
                .collect::<Vec<_>>()
                .join(" or "),
        }
    }
}

/// One step of a query path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Step direction
    pub axis: Axis,
    /// Tag to match, `None` for any element
    pub tag: Option<String>,
    /// Conditions, all of which must hold
    pub predicates: Vec<Predicate>,
}

impl Step {
    fn new(axis: Axis, tag: &str) -> Self {
        Self {
            axis,
            tag: (tag != "*").then(|| tag.to_string()),
            predicates: Vec::new(),
        }
    }

    fn to_xpath(&self) -> String {
        let name = self.tag.as_deref().unwrap_or("*");
        let head = match self.axis {
            Axis::Parent => return "/..".to_string(),
            Axis::Descendant => format!("//{name}"),
            Axis::Child => format!("/{name}"),
        };
        if self.predicates.is_empty() {
            return head;
        }
        let conditions: Vec<String> = if self.predicates.len() == 1 {
            vec![self.predicates[0].to_xpath()]
        } else {
            self.predicates
                .iter()
                .map(|p| match p {
                    Predicate::AnyOf(_) => format!("({})", p.to_xpath()),
                    _ => p.to_xpath(),
                })
                .collect()
        };
        format!("{head}[{}]", conditions.join(" and "))
    }
}

/// A structural query, rooted at the document or relative to an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    relative: bool,
    steps: Vec<Step>,
}

impl Query {
    /// Match `tag` anywhere in the document (`//tag`)
    #[must_use]
    pub fn anywhere(tag: &str) -> Self {
        Self {
            relative: false,
            steps: vec![Step::new(Axis::Descendant, tag)],
        }
    }

    /// Match `tag` anywhere below the context element (`.//tag`)
    #[must_use]
    pub fn within(tag: &str) -> Self {
        Self {
            relative: true,
            steps: vec![Step::new(Axis::Descendant, tag)],
        }
    }

    /// Whether this query is evaluated against the context element
    #[must_use]
    pub const fn is_relative(&self) -> bool {
        self.relative
    }

    /// The query's steps
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Add a predicate to the last step
    #[must_use]
    pub fn with(mut self, predicate: Predicate) -> Self {
        if let Some(step) = self.steps.last_mut() {
            step.predicates.push(predicate);
        }
        self
    }

    /// Own text contains `value`
    #[must_use]
    pub fn text_contains(self, value: impl Into<String>) -> Self {
        self.with(Predicate::TextContains(value.into()))
    }

    /// Own text equals `value`
    #[must_use]
    pub fn text_equals(self, value: impl Into<String>) -> Self {
        self.with(Predicate::TextEquals(value.into()))
    }

    /// Own text equals `value` after whitespace normalization
    #[must_use]
    pub fn text_normalized(self, value: impl Into<String>) -> Self {
        self.with(Predicate::TextNormalized(value.into()))
    }

    /// Attribute `name` contains `value`
    #[must_use]
    pub fn attr_contains(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(Predicate::AttrContains {
            name: name.into(),
            value: value.into(),
        })
    }

    /// Attribute `name` equals `value`
    #[must_use]
    pub fn attr_equals(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(Predicate::AttrEquals {
            name: name.into(),
            value: value.into(),
        })
    }

    /// At least one of `predicates` holds
    #[must_use]
    pub fn any_of(self, predicates: Vec<Predicate>) -> Self {
        self.with(Predicate::AnyOf(predicates))
    }

    /// Step up to the parent
    #[must_use]
    pub fn parent(mut self) -> Self {
        self.steps.push(Step::new(Axis::Parent, "*"));
        self
    }

    /// Step down to descendants named `tag`
    #[must_use]
    pub fn descendant(mut self, tag: &str) -> Self {
        self.steps.push(Step::new(Axis::Descendant, tag));
        self
    }

    /// Step down to children named `tag`
    #[must_use]
    pub fn child(mut self, tag: &str) -> Self {
        self.steps.push(Step::new(Axis::Child, tag));
        self
    }

    /// Render as an XPath 1.0 expression
    #[must_use]
    pub fn to_xpath(&self) -> String {
        let path: String = self.steps.iter().map(Step::to_xpath).collect();
        if self.relative {
            format!(".{path}")
        } else {
            path
        }
    }

    /// Render against a base expression selecting one element
    ///
    /// `(base)[n]` picks the n-th (1-based) match of `base`; relative steps are
    /// appended to it. Absolute queries ignore the base.
    #[must_use]
    pub fn scoped_xpath(&self, base: &str, position: usize) -> String {
        if !self.relative {
            return self.to_xpath();
        }
        let path: String = self.steps.iter().map(Step::to_xpath).collect();
        format!("({base})[{position}]{path}")
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xpath())
    }
}

/// Quote a string as an XPath literal, using `concat()` when it holds both quote kinds
#[must_use]
pub fn xpath_literal(s: &str) -> String {
    if !s.contains('"') {
        format!("\"{s}\"")
    } else if !s.contains('\'') {
        format!("'{s}'")
    } else {
        let parts: Vec<String> = s.split('"').map(|p| format!("\"{p}\"")).collect();
        format!("concat({})", parts.join(",'\"',"))
    }
}

/// A live element. Valid for one operation only; never cache across steps.
pub trait ElementHandle: Sized {
    /// Short description for logs and errors
    fn describe(&self) -> String;

    /// Attached, visible, not covered and enabled. A handle whose node was
    /// re-rendered away reports `false` rather than an error.
    fn is_interactable(&self) -> FormResult<bool>;

    /// Click the element.
    ///
    /// Fails with [`FormError::ElementObscured`] when another element sits on
    /// the hit-test point.
    fn click(&self) -> FormResult<()>;

    /// Clear the element's value
    fn clear(&self) -> FormResult<()>;

    /// Type text into the element
    fn send_keys(&self, text: &str) -> FormResult<()>;

    /// Set a file input's selection to `path` without opening a picker
    fn upload_file(&self, path: &Path) -> FormResult<()>;

    /// Evaluate `query` with this element as context
    fn find_within(&self, query: &Query) -> FormResult<Vec<Self>>;
}

/// Anything matching elements can be searched in: a page or an element
pub trait SearchContext {
    /// Handle type produced by searches
    type Element: ElementHandle;

    /// All current matches in document order, possibly empty
    fn find_all(&self, query: &Query) -> FormResult<Vec<Self::Element>>;
}

/// Argument passed to an injected script
#[derive(Debug)]
pub enum ScriptArg<'a, E> {
    /// A live element
    Element(&'a E),
    /// A string literal
    Str(&'a str),
}

/// A page: searchable, and able to run a script with arguments
pub trait Page: SearchContext {
    /// Call `declaration` (a JavaScript `function(...) {}`) with `args`
    fn call_function(
        &self,
        declaration: &str,
        args: &[ScriptArg<'_, Self::Element>],
    ) -> FormResult<()>;
}

/// First element of `found`, or `FieldNotFound` for `query`
pub fn first<E>(found: Vec<E>, query: &Query) -> FormResult<E> {
    found
        .into_iter()
        .next()
        .ok_or_else(|| FormError::not_found(query.to_xpath()))
}

/// `found` if it holds exactly `expected` elements, else `AmbiguousControl`
pub fn exactly<E>(found: Vec<E>, expected: usize, query: &Query) -> FormResult<Vec<E>> {
    if found.len() == expected {
        Ok(found)
    } else {
        Err(FormError::AmbiguousControl {
            query: query.to_xpath(),
            expected,
            found: found.len(),
        })
    }
}
