//! Structural description of templates.
//!
//! A template is a list of [`FieldDescriptor`]s. Each descriptor carries the
//! metadata declared on one field (`tag`, `id`, `text` and the attribute
//! keys) and, when the field is itself a structured type, the descriptors of
//! its own fields. [`Template`] and [`Shape`] are normally implemented by
//! `#[derive(Template)]`, but schemas can also be assembled by hand or loaded
//! from JSON.

use alloc::{string::String, vec::Vec};
use core::marker::PhantomData;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The field whose metadata describes the root element of a template.
pub const ROOT_FIELD: &str = "me";

/// Metadata key holding the element name.
pub const TAG_KEY: &str = "tag";

/// Metadata key holding the literal text content.
pub const TEXT_KEY: &str = "text";

/// Description of one template field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name as declared.
    pub name: String,
    /// Metadata key/value pairs declared on the field.
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
    /// Descriptors of the nested fields, present when the field is a
    /// structured type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FieldDescriptor>>,
}

impl FieldDescriptor {
    /// Creates a leaf descriptor without metadata.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta: BTreeMap::new(),
            children: None,
        }
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Appends a nested field, turning this descriptor into a structured one.
    #[must_use]
    pub fn child(mut self, field: Self) -> Self {
        self.children.get_or_insert_with(Vec::new).push(field);
        self
    }

    /// Returns the metadata value stored under `key`, or an empty string.
    #[must_use]
    pub fn get(&self, key: &str) -> &str {
        self.meta.get(key).map_or("", String::as_str)
    }
}

/// The top-level field list of one template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSchema {
    /// Name of the template, used in diagnostics.
    pub name: String,
    /// Top-level fields; the one named [`ROOT_FIELD`] describes the root.
    pub fields: Vec<FieldDescriptor>,
}

impl TemplateSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a top-level field.
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Parses a schema from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`](crate::Error::Schema) if `json` is not a valid schema.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the schema to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`](crate::Error::Schema) if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Returns the root descriptor, if the schema declares one.
    #[must_use]
    pub fn root(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == ROOT_FIELD)
    }
}

/// A type that describes a whole template.
pub trait Template {
    /// Returns the structural description of this template.
    fn schema() -> TemplateSchema;
}

/// The structural shape of a field type.
///
/// Leaf types return `None`; structured types return the descriptors of
/// their fields, which the walker turns into nested static children.
pub trait Shape {
    /// Descriptors of the nested fields, if this type is structured.
    #[must_use]
    fn nested() -> Option<Vec<FieldDescriptor>> {
        None
    }
}

macro_rules! leaf_shape {
    ($($ty:ty),* $(,)?) => {
        $(impl Shape for $ty {})*
    };
}

leaf_shape!(
    (),
    String,
    &'static str,
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
);

impl<T> Shape for Option<T> {}

impl<T: ?Sized> Shape for PhantomData<T> {}
