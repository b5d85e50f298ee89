//! Key selection for `Cache::filter`.
//!
//! A [`Selector`] names one query mode. The caller picks the mode explicitly;
//! nothing is inferred from the shape of the argument.

use std::borrow::Cow;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::{CacheError, CacheResult};
use crate::glob::GlobPattern;

/// Keys that can take part in every filter mode.
///
/// `as_text` gives the view that globs and regexes are matched against.
/// `from_index` turns a store position into a candidate key for
/// [`Selector::Indices`]. Both may opt out by returning `None`, in which case
/// that key never matches the corresponding mode.
pub trait FilterKey: Hash + Eq + Clone {
    /// Textual form of the key, if it has one.
    fn as_text(&self) -> Option<Cow<'_, str>>;

    /// The key equal to the integer `index`, if this key type has one.
    fn from_index(index: usize) -> Option<Self>;
}

impl FilterKey for String {
    fn as_text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.as_str()))
    }

    fn from_index(_index: usize) -> Option<Self> {
        None
    }
}

impl FilterKey for &str {
    fn as_text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(*self))
    }

    fn from_index(_index: usize) -> Option<Self> {
        None
    }
}

macro_rules! text_filter_key {
    ($($ty:ty),*) => {
        $(
            impl FilterKey for $ty {
                fn as_text(&self) -> Option<Cow<'_, str>> {
                    Some(Cow::Borrowed(&**self))
                }

                fn from_index(_index: usize) -> Option<Self> {
                    None
                }
            }
        )*
    };
}

text_filter_key!(Box<str>, Arc<str>);

impl FilterKey for char {
    fn as_text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.to_string()))
    }

    fn from_index(_index: usize) -> Option<Self> {
        None
    }
}

macro_rules! integer_filter_key {
    ($($ty:ty),*) => {
        $(
            impl FilterKey for $ty {
                fn as_text(&self) -> Option<Cow<'_, str>> {
                    Some(Cow::Owned(self.to_string()))
                }

                fn from_index(index: usize) -> Option<Self> {
                    <$ty>::try_from(index).ok()
                }
            }
        )*
    };
}

integer_filter_key!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

/// One filter query.
#[derive(Debug, Clone)]
pub enum Selector<K> {
    /// A single key, matched exactly.
    Key(K),
    /// Every cached key that is a member of the set.
    Keys(HashSet<K>),
    /// The integers `0..len` probed as keys, in ascending order. Only
    /// meaningful when the cache is keyed by small integers; any other key
    /// type yields nothing.
    Indices,
    /// A shell glob matched against the whole key text.
    Glob(GlobPattern),
    /// A regex that must match at the start of the key text.
    Regex(Regex),
}

impl<K: Hash + Eq> Selector<K> {
    /// Select one exact key.
    pub fn key(key: K) -> Self {
        Selector::Key(key)
    }

    /// Select the cached members of a collection of keys.
    pub fn keys(keys: impl IntoIterator<Item = K>) -> Self {
        Selector::Keys(keys.into_iter().collect())
    }

    /// Select keys whose text matches a shell glob.
    pub fn glob(pattern: &str) -> CacheResult<Self> {
        Ok(Selector::Glob(GlobPattern::new(pattern)?))
    }

    /// Select keys whose text starts with a match of `regex`.
    pub fn regex(regex: Regex) -> Self {
        Selector::Regex(regex)
    }

    /// Compile `pattern` and select keys whose text starts with a match of it.
    pub fn regex_str(pattern: &str) -> CacheResult<Self> {
        let regex = Regex::new(pattern).map_err(|source| CacheError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Selector::Regex(regex))
    }
}

impl<K> From<GlobPattern> for Selector<K> {
    fn from(pattern: GlobPattern) -> Self {
        Selector::Glob(pattern)
    }
}

impl<K> From<Regex> for Selector<K> {
    fn from(regex: Regex) -> Self {
        Selector::Regex(regex)
    }
}

impl<K: Hash + Eq> FromIterator<K> for Selector<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Selector::keys(iter)
    }
}

/// Returns `true` if `regex` matches `text` starting at offset 0.
///
/// The leftmost match is reported first, so if any match starts at 0 it is
/// the one `find` returns.
fn matches_at_start(regex: &Regex, text: &str) -> bool {
    regex.find(text).is_some_and(|m| m.start() == 0)
}

/// Run `selector` over `entries`. Results come in store order, except for
/// [`Selector::Indices`], which yields in probe order.
///
/// The caller must hold the store lock for the whole call.
pub(crate) fn select<K, V>(entries: &IndexMap<K, V>, selector: &Selector<K>) -> Vec<(K, V)>
where
    K: FilterKey,
    V: Clone,
{
    let pair = |(k, v): (&K, &V)| (k.clone(), v.clone());

    match selector {
        Selector::Key(key) => entries
            .get_key_value(key)
            .map(pair)
            .into_iter()
            .collect(),
        Selector::Keys(wanted) => entries
            .iter()
            .filter(|(k, _)| wanted.contains(*k))
            .map(pair)
            .collect(),
        Selector::Indices => (0..entries.len())
            .filter_map(K::from_index)
            .filter_map(|k| entries.get_key_value(&k))
            .map(pair)
            .collect(),
        Selector::Glob(glob) => entries
            .iter()
            .filter(|(k, _)| k.as_text().is_some_and(|text| glob.is_match(&text)))
            .map(pair)
            .collect(),
        Selector::Regex(regex) => entries
            .iter()
            .filter(|(k, _)| {
                k.as_text()
                    .is_some_and(|text| matches_at_start(regex, &text))
            })
            .map(pair)
            .collect(),
    }
}
