#![allow(dead_code)]

use trellis::{Error, Host, MemoryHost, Shape, Template, Tree, TreeBuilder};

#[derive(Template)]
struct List {
    #[dom(tag = "ul")]
    me: (),
    #[dom(tag = "li", id = "first", text = "A")]
    item: (),
}

#[derive(Template)]
struct Badge {
    #[dom(tag = "span", id = "second")]
    me: (),
}

#[derive(Template)]
struct Links {
    #[dom(tag = "a", id = "home", href = "/", text = "Home")]
    home: String,
    #[dom(tag = "a", id = "about", href = "/about", text = "About")]
    about: String,
}

#[derive(Template)]
struct Menu {
    #[dom(tag = "nav", id = "menu", class = "top")]
    me: (),
    #[dom(tag = "ul", id = "links")]
    links: Links,
}

#[derive(Template)]
struct Panel<T> {
    #[dom(tag = "div", id = "panel")]
    me: (),
    #[dom(tag = "section", id = "body")]
    body: T,
}

#[derive(Template)]
struct Headless {
    #[dom(tag = "p")]
    body: (),
}

#[test]
fn schema_follows_declaration_order() {
    let schema = List::schema();
    assert_eq!(schema.name, "List");
    let names: Vec<_> = schema.fields.iter().map(|field| field.name.as_str()).collect();
    assert_eq!(names, ["me", "item"]);
    assert_eq!(schema.fields[1].get("text"), "A");
    assert!(schema.fields[1].children.is_none());
}

#[test]
fn nested_templates_become_structured_fields() {
    let schema = Menu::schema();
    let links = &schema.fields[1];
    let nested = links.children.as_ref().expect("links is structured");
    assert_eq!(nested.len(), 2);
    assert_eq!(nested[0].get("href"), "/");
    assert_eq!(Links::nested().map(|fields| fields.len()), Some(2));
}

#[test]
fn derived_templates_render_and_graft() {
    let host = MemoryHost::new().with_element("app");
    let mut list = Tree::<MemoryHost>::new::<List>().unwrap();
    list.mount(&host, "app").unwrap();
    assert_eq!(host.inner_html("app").unwrap(), "<ul><li id=\"first\">A</li></ul>");

    list.attach("first", Tree::new::<Badge>().unwrap()).unwrap();
    list.render(&host).unwrap();
    assert_eq!(
        host.inner_html("app").unwrap(),
        "<ul><li id=\"first\">A<span id=\"second\"></span></li></ul>"
    );
}

#[test]
fn nested_fields_render_in_place() {
    let tree = TreeBuilder::new().suffix("-1").build::<Menu, MemoryHost>().unwrap();
    assert_eq!(
        tree.to_html(),
        "<nav class=\"top\" id=\"menu-1\"><ul id=\"links-1\">\
         <a id=\"home-1\" href=\"/\">Home</a>\
         <a id=\"about-1\" href=\"/about\">About</a>\
         </ul></nav>"
    );
    assert!(tree.contains("about-1"));
}

#[test]
fn templates_without_a_root_are_rejected() {
    assert!(matches!(
        Tree::<MemoryHost>::new::<Headless>(),
        Err(Error::MissingRootDescriptor(name)) if name == "Headless"
    ));
}

#[test]
fn generic_templates_take_the_shape_of_their_parameter() {
    assert!(Panel::<String>::schema().fields[1].children.is_none());

    let schema = Panel::<Links>::schema();
    let nested = schema.fields[1].children.as_ref().expect("body is structured");
    assert_eq!(nested[1].get("id"), "about");

    let tree = Tree::<MemoryHost>::new::<Panel<Links>>().unwrap();
    assert!(tree.contains("about"));
    assert_eq!(tree.get(tree.node("body").unwrap().static_children()[0]).unwrap().tag(), "a");
}
