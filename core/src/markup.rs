//! Markup serialization.
//!
//! An element is written as its opening tag with attributes in
//! [`AttrKey::ALL`](crate::AttrKey::ALL) order, its text, its static
//! children, its foreign children in attachment order, and its closing tag.
//! Nothing else is emitted: no whitespace, no empty attributes.

use crate::{
    error::Result,
    host::Host,
    node::NodeId,
    tree::Tree,
};

impl<H: Host> Tree<H> {
    /// Serializes the whole tree, grafted trees included.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_node(NodeId::ROOT, &mut out);
        out
    }

    /// Serializes the element with the given id and everything below it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownElementId`](crate::Error::UnknownElementId) if
    /// `id` is not indexed.
    pub fn element_html(&self, id: &str) -> Result<String> {
        let node = self.index_of(id)?;
        let mut out = String::new();
        self.write_node(node, &mut out);
        Ok(out)
    }

    pub(crate) fn write_node(&self, node: NodeId, out: &mut String) {
        let node = &self.nodes[node.0];
        out.push('<');
        out.push_str(&node.tag);
        for (key, value) in node.attributes.iter() {
            out.push(' ');
            out.push_str(key.as_str());
            out.push_str("=\"");
            escape_into(value, out);
            out.push('"');
        }
        out.push('>');
        escape_into(&node.text, out);

        for child in &node.static_children {
            self.write_node(*child, out);
        }
        if let Some(grafted) = self.grafts.get(&node.id) {
            for child_id in &node.foreign_children {
                if let Some(child) = grafted.get(child_id) {
                    child.write_node(NodeId::ROOT, out);
                }
            }
        }

        out.push_str("</");
        out.push_str(&node.tag);
        out.push('>');
    }
}

/// Appends `value` with `& < > "` replaced by their entities.
pub(crate) fn escape_into(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{FieldDescriptor, MemoryHost, TemplateSchema, Tree};

    fn tree(schema: &TemplateSchema) -> Tree<MemoryHost> {
        Tree::from_schema(schema).expect("valid template")
    }

    #[test]
    fn element_with_text_attribute_and_child() {
        let schema = TemplateSchema::new("Box")
            .field(
                FieldDescriptor::new("me")
                    .with("tag", "div")
                    .with("text", "hi")
                    .with("class", "a"),
            )
            .field(FieldDescriptor::new("inner").with("tag", "span"));
        assert_eq!(tree(&schema).to_html(), "<div class=\"a\">hi<span></span></div>");
    }

    #[test]
    fn attributes_follow_the_fixed_order() {
        let schema = TemplateSchema::new("Link").field(
            FieldDescriptor::new("me")
                .with("tag", "a")
                .with("style", "color: red")
                .with("href", "/docs")
                .with("id", "docs")
                .with("class", "nav"),
        );
        assert_eq!(
            tree(&schema).to_html(),
            "<a class=\"nav\" id=\"docs\" href=\"/docs\" style=\"color: red\"></a>"
        );
    }

    #[test]
    fn special_characters_are_escaped() {
        let schema = TemplateSchema::new("Quote").field(
            FieldDescriptor::new("me")
                .with("tag", "q")
                .with("title", "ignored")
                .with("class", "a\"b")
                .with("text", "1 < 2 & 3 > 2"),
        );
        assert_eq!(
            tree(&schema).to_html(),
            "<q class=\"a&quot;b\">1 &lt; 2 &amp; 3 &gt; 2</q>"
        );
    }

    #[test]
    fn element_html_serializes_a_subtree() {
        let schema = TemplateSchema::new("List")
            .field(FieldDescriptor::new("me").with("tag", "ul"))
            .field(
                FieldDescriptor::new("item")
                    .with("tag", "li")
                    .with("id", "first")
                    .with("text", "A"),
            );
        let tree = tree(&schema);
        assert_eq!(tree.to_html(), "<ul><li id=\"first\">A</li></ul>");
        assert_eq!(tree.element_html("first").unwrap(), "<li id=\"first\">A</li>");
    }
}
