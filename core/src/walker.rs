//! Turning a template schema into a [`Tree`].

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{
    attributes::{AttrKey, extract},
    error::{Error, Result},
    host::Host,
    node::{Node, NodeId},
    schema::{FieldDescriptor, ROOT_FIELD, TAG_KEY, TEXT_KEY, Template, TemplateSchema},
    tree::Tree,
};

/// What to do when two nodes of one template resolve to the same id.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateIds {
    /// The later node takes the index entry; the overwrite is logged.
    #[default]
    Overwrite,
    /// Construction fails with [`Error::DuplicateId`].
    Reject,
}

/// Configures how templates are instantiated.
#[derive(Debug, Default, Clone)]
pub struct TreeBuilder {
    suffix: String,
    duplicates: DuplicateIds,
}

impl TreeBuilder {
    /// Creates a builder with an empty suffix that lets duplicate ids overwrite.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the suffix appended to every declared id.
    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Uses a freshly generated suffix, so the instance never collides with
    /// another instance of the same template.
    #[must_use]
    pub fn unique_suffix(self) -> Self {
        let suffix = format!("-{}", uuid::Uuid::new_v4().simple());
        self.suffix(suffix)
    }

    /// Chooses how duplicate ids are handled.
    #[must_use]
    pub const fn duplicate_ids(mut self, policy: DuplicateIds) -> Self {
        self.duplicates = policy;
        self
    }

    /// Instantiates the template type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRootDescriptor`] if `T` has no `me` field, or
    /// [`Error::DuplicateId`] when duplicates are rejected and one is found.
    pub fn build<T: Template, H: Host>(&self) -> Result<Tree<H>> {
        self.build_schema(&T::schema())
    }

    /// Instantiates an explicit schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRootDescriptor`] if the schema has no `me`
    /// field, or [`Error::DuplicateId`] when duplicates are rejected and one
    /// is found.
    pub fn build_schema<H: Host>(&self, schema: &TemplateSchema) -> Result<Tree<H>> {
        let root = schema
            .root()
            .ok_or_else(|| Error::MissingRootDescriptor(schema.name.clone()))?;

        let mut walker = Walker {
            builder: self,
            nodes: Vec::new(),
            id_index: HashMap::new(),
        };
        let root_id = walker.push(root)?;
        for field in schema.fields.iter().filter(|field| field.name != ROOT_FIELD) {
            let child = walker.walk(field)?;
            walker.nodes[root_id.0].static_children.push(child);
        }

        debug!(
            template = %schema.name,
            suffix = %self.suffix,
            nodes = walker.nodes.len(),
            ids = walker.id_index.len(),
            "template instantiated"
        );
        Ok(Tree::from_parts(walker.nodes, walker.id_index, self.suffix.clone()))
    }
}

struct Walker<'a> {
    builder: &'a TreeBuilder,
    nodes: Vec<Node>,
    id_index: HashMap<String, NodeId>,
}

impl Walker<'_> {
    /// Adds `field` and, if it is structured, all of its nested fields.
    fn walk(&mut self, field: &FieldDescriptor) -> Result<NodeId> {
        let node = self.push(field)?;
        for nested in field.children.iter().flatten() {
            let child = self.walk(nested)?;
            self.nodes[node.0].static_children.push(child);
        }
        Ok(node)
    }

    /// Adds `field` alone and indexes it.
    fn push(&mut self, field: &FieldDescriptor) -> Result<NodeId> {
        let attributes = extract(&field.meta, &self.builder.suffix);
        let id = attributes.get(AttrKey::Id).unwrap_or_default().to_string();
        let node = NodeId(self.nodes.len());
        self.nodes.push(Node {
            tag: field.get(TAG_KEY).to_string(),
            text: field.get(TEXT_KEY).to_string(),
            id: id.clone(),
            attributes,
            static_children: Vec::new(),
            foreign_children: Vec::new(),
        });
        if !id.is_empty() {
            self.index(id, node, &field.name)?;
        }
        Ok(node)
    }

    fn index(&mut self, id: String, node: NodeId, field: &str) -> Result<()> {
        if self.id_index.contains_key(&id) {
            match self.builder.duplicates {
                DuplicateIds::Reject => return Err(Error::DuplicateId(id)),
                DuplicateIds::Overwrite => {
                    warn!(%id, field, "duplicate element id, later declaration wins");
                }
            }
        }
        self.id_index.insert(id, node);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryHost;
    use std::collections::HashSet;

    fn list() -> TemplateSchema {
        TemplateSchema::new("List")
            .field(FieldDescriptor::new("me").with("tag", "section").with("id", "list"))
            .field(
                FieldDescriptor::new("items")
                    .with("tag", "ul")
                    .with("id", "items")
                    .child(FieldDescriptor::new("first").with("tag", "li").with("id", "first"))
                    .child(
                        FieldDescriptor::new("second")
                            .with("tag", "li")
                            .child(FieldDescriptor::new("link").with("tag", "a").with("id", "link")),
                    ),
            )
            .field(FieldDescriptor::new("footer").with("tag", "footer"))
    }

    fn build(builder: &TreeBuilder) -> Tree<MemoryHost> {
        builder.build_schema(&list()).expect("valid template")
    }

    #[test]
    fn missing_root_descriptor_fails() {
        let schema = TemplateSchema::new("Headless")
            .field(FieldDescriptor::new("body").with("tag", "div"));
        let error = TreeBuilder::new().build_schema::<MemoryHost>(&schema).unwrap_err();
        assert!(matches!(error, Error::MissingRootDescriptor(name) if name == "Headless"));
    }

    #[test]
    fn index_holds_exactly_the_declared_ids() {
        let tree = build(&TreeBuilder::new());
        let ids: HashSet<_> = tree.ids().collect();
        assert_eq!(ids, HashSet::from(["list", "items", "first", "link"]));

        let nodes: HashSet<_> = ["list", "items", "first", "link"]
            .iter()
            .map(|id| tree.index_of(id).unwrap())
            .collect();
        assert_eq!(nodes.len(), 4);
    }

    #[test]
    fn nested_fields_become_static_children_in_order() {
        let tree = build(&TreeBuilder::new());
        let root = tree.root();
        assert_eq!(root.tag(), "section");
        let tags: Vec<_> = root
            .static_children()
            .iter()
            .map(|child| tree.get(*child).unwrap().tag())
            .collect();
        assert_eq!(tags, vec!["ul", "footer"]);

        let items = tree.node("items").unwrap();
        assert_eq!(items.static_children().len(), 2);
        let second = tree.get(items.static_children()[1]).unwrap();
        assert_eq!(second.id(), "");
        assert_eq!(tree.get(second.static_children()[0]).unwrap().id(), "link");
    }

    #[test]
    fn suffixes_keep_instances_apart() {
        let first = build(&TreeBuilder::new().suffix("-1"));
        let second = build(&TreeBuilder::new().suffix("-2"));
        let a: HashSet<_> = first.ids().collect();
        let b: HashSet<_> = second.ids().collect();
        assert!(a.is_disjoint(&b));
        assert!(first.contains("first-1"));
        assert_eq!(first.scoped_id("first"), "first-1");
        assert_eq!(first.node("first-1").unwrap().attributes().get(AttrKey::Id), Some("first-1"));
    }

    #[test]
    fn unique_suffixes_differ() {
        let first = build(&TreeBuilder::new().unique_suffix());
        let second = build(&TreeBuilder::new().unique_suffix());
        assert_ne!(first.suffix(), second.suffix());
    }

    #[test]
    fn construction_is_deterministic() {
        let builder = TreeBuilder::new().suffix("-x");
        assert_eq!(build(&builder).nodes, build(&builder).nodes);
    }

    #[test]
    fn duplicate_ids_overwrite_or_fail() {
        let schema = TemplateSchema::new("Twins")
            .field(FieldDescriptor::new("me").with("tag", "div"))
            .field(FieldDescriptor::new("a").with("tag", "p").with("id", "twin"))
            .field(FieldDescriptor::new("b").with("tag", "span").with("id", "twin"));

        let tree = TreeBuilder::new().build_schema::<MemoryHost>(&schema).unwrap();
        assert_eq!(tree.node("twin").unwrap().tag(), "span");

        let error = TreeBuilder::new()
            .duplicate_ids(DuplicateIds::Reject)
            .build_schema::<MemoryHost>(&schema)
            .unwrap_err();
        assert!(matches!(error, Error::DuplicateId(id) if id == "twin"));
    }
}
