//! The fixed attribute allow-list and its extraction from field metadata.

use core::fmt;
use std::collections::BTreeMap;

/// Attribute keys recognised on template fields, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttrKey {
    /// `class`
    Class,
    /// `id`
    Id,
    /// `href`
    Href,
    /// `style`
    Style,
}

impl AttrKey {
    /// Every key, in the order attributes are emitted.
    pub const ALL: [Self; 4] = [Self::Class, Self::Id, Self::Href, Self::Style];

    /// The attribute name as written in markup.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Id => "id",
            Self::Href => "href",
            Self::Style => "style",
        }
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for AttrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute values of one node, stored in fixed slots so iteration always
/// follows [`AttrKey::ALL`] regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    slots: [Option<String>; 4],
}

impl Attributes {
    /// Creates an empty attribute set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [None, None, None, None],
        }
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: AttrKey) -> Option<&str> {
        self.slots[key.slot()].as_deref()
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn set(&mut self, key: AttrKey, value: impl Into<String>) -> Option<String> {
        self.slots[key.slot()].replace(value.into())
    }

    /// Removes the value stored under `key`.
    pub fn remove(&mut self, key: AttrKey) -> Option<String> {
        self.slots[key.slot()].take()
    }

    /// Returns `true` when no attribute is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Iterates present attributes in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (AttrKey, &str)> {
        AttrKey::ALL
            .into_iter()
            .filter_map(|key| self.get(key).map(|value| (key, value)))
    }
}

/// Copies the recognised attribute keys out of `meta`.
///
/// Keys with an empty value are skipped. The `id` value is namespaced by
/// appending `suffix`; every other value is copied verbatim.
#[must_use]
pub fn extract(meta: &BTreeMap<String, String>, suffix: &str) -> Attributes {
    let mut attributes = Attributes::new();
    for key in AttrKey::ALL {
        let Some(value) = meta.get(key.as_str()).filter(|value| !value.is_empty()) else {
            continue;
        };
        if key == AttrKey::Id {
            attributes.set(key, format!("{value}{suffix}"));
        } else {
            attributes.set(key, value.clone());
        }
    }
    attributes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn only_recognised_keys_are_copied() {
        let attrs = extract(
            &meta(&[("tag", "a"), ("href", "/home"), ("data-x", "1")]),
            "",
        );
        let collected: Vec<_> = attrs.iter().collect();
        assert_eq!(collected, vec![(AttrKey::Href, "/home")]);
    }

    #[test]
    fn iteration_follows_fixed_order() {
        let mut attrs = Attributes::new();
        attrs.set(AttrKey::Style, "color: red");
        attrs.set(AttrKey::Class, "btn");
        attrs.set(AttrKey::Href, "#");
        let keys: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![AttrKey::Class, AttrKey::Href, AttrKey::Style]);
    }

    #[test]
    fn id_is_suffixed_and_empty_values_are_skipped() {
        let attrs = extract(&meta(&[("id", "row"), ("class", "c")]), "-2");
        assert_eq!(attrs.get(AttrKey::Id), Some("row-2"));
        assert_eq!(attrs.get(AttrKey::Class), Some("c"));

        let attrs = extract(&meta(&[("id", ""), ("style", "")]), "-2");
        assert!(attrs.is_empty());
    }
}
