//! Selector fallback chains.
//!
//! The target application's markup has been reverse-engineered several
//! times over, so most screens are addressed through more than one candidate
//! selector (test ids, hashed CSS-module classes, generic class names). A
//! [`SelectorChain`] keeps those candidates in priority order: the first
//! alternative that matches anything wins, and later alternatives are only
//! consulted when earlier ones match nothing.

use crate::driver::{Driver, ElementSnapshot};
use crate::result::{TenfootError, TenfootResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ordered list of CSS alternatives for one logical element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectorChain {
    alternatives: Vec<String>,
}

impl SelectorChain {
    /// Parse a comma-separated chain (`"#a, .b, [c]"`)
    ///
    /// Commas inside brackets or quotes do not split.
    #[must_use]
    pub fn parse(chain: &str) -> Self {
        Self {
            alternatives: split_top_level(chain, ',')
                .into_iter()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Single-alternative chain
    #[must_use]
    pub fn single(selector: impl Into<String>) -> Self {
        Self {
            alternatives: vec![selector.into()],
        }
    }

    /// Build from explicit alternatives
    #[must_use]
    pub fn from_alternatives<I, S>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            alternatives: alternatives.into_iter().map(Into::into).collect(),
        }
    }

    /// Alternatives in priority order
    #[must_use]
    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    /// Primary (first) alternative
    #[must_use]
    pub fn primary(&self) -> Option<&str> {
        self.alternatives.first().map(String::as_str)
    }

    /// True when no alternative is configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// Query every alternative in order and return the first non-empty result
    /// together with the alternative that produced it.
    pub async fn resolve<D: Driver + ?Sized>(
        &self,
        driver: &D,
        scope: Option<&Self>,
    ) -> TenfootResult<Option<(String, Vec<ElementSnapshot>)>> {
        let scope = match scope {
            Some(scope) => match scope.resolve_scope(driver).await? {
                Some(resolved) => Some(resolved),
                None => return Ok(None),
            },
            None => None,
        };
        for alternative in &self.alternatives {
            let found = driver.query_all(scope.as_deref(), alternative).await?;
            if !found.is_empty() {
                return Ok(Some((alternative.clone(), found)));
            }
        }
        Ok(None)
    }

    /// All matches of the first alternative that matches anything
    pub async fn query<D: Driver + ?Sized>(
        &self,
        driver: &D,
        scope: Option<&Self>,
    ) -> TenfootResult<Vec<ElementSnapshot>> {
        Ok(self
            .resolve(driver, scope)
            .await?
            .map(|(_, found)| found)
            .unwrap_or_default())
    }

    /// First match, if any
    pub async fn first<D: Driver + ?Sized>(
        &self,
        driver: &D,
        scope: Option<&Self>,
    ) -> TenfootResult<Option<ElementSnapshot>> {
        Ok(self.query(driver, scope).await?.into_iter().next())
    }

    /// Whether any alternative matches
    pub async fn exists<D: Driver + ?Sized>(&self, driver: &D) -> TenfootResult<bool> {
        Ok(self.resolve(driver, None).await?.is_some())
    }

    /// The alternative that currently matches, used when a driver call needs
    /// one concrete selector (click, dispatch, scope).
    pub async fn resolve_scope<D: Driver + ?Sized>(
        &self,
        driver: &D,
    ) -> TenfootResult<Option<String>> {
        for alternative in &self.alternatives {
            if !driver.query_all(None, alternative).await?.is_empty() {
                return Ok(Some(alternative.clone()));
            }
        }
        Ok(None)
    }

    /// Like [`Self::resolve_scope`] but fails when nothing matches
    pub async fn require<D: Driver + ?Sized>(&self, driver: &D) -> TenfootResult<String> {
        self.resolve_scope(driver)
            .await?
            .ok_or_else(|| TenfootError::ElementNotFound {
                selector: self.to_string(),
            })
    }
}

impl std::fmt::Display for SelectorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.alternatives.join(", "))
    }
}

impl From<&str> for SelectorChain {
    fn from(chain: &str) -> Self {
        Self::parse(chain)
    }
}

impl Serialize for SelectorChain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.alternatives.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SelectorChain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Joined(String),
            List(Vec<String>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Joined(chain) => Self::parse(&chain),
            Raw::List(list) => Self::from_alternatives(
                list.into_iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
            ),
        })
    }
}

/// Split on `separator` outside of `[...]`, `(...)` and quotes.
pub(crate) fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '[' | '(' => depth += 1,
                ']' | ')' => depth = depth.saturating_sub(1),
                c if c == separator && depth == 0 => {
                    parts.push(&input[start..i]);
                    start = i + c.len_utf8();
                }
                _ => {}
            },
        }
    }
    parts.push(&input[start..]);
    parts
}
