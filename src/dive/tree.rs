//! Generic record tree for dive logs.
//!
//! Dive log exports nest their records at no fixed depth, so the XML is first
//! loaded into a schema-free tree of maps, sequences and leaves and then
//! searched by key name.

/// A node of a schema-free record tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Ordered key/value fields (attributes and child elements).
    Map(Vec<(String, Node)>),
    /// Repeated sibling elements sharing one key.
    Sequence(Vec<Node>),
    /// Text content or attribute value.
    Leaf(String),
}

/// Key under which element text is kept when the element also has fields.
const TEXT_KEY: &str = "#text";

impl Node {
    /// Parse an XML document into a tree rooted at a single-field map.
    pub fn from_xml(text: &str) -> Result<Node, roxmltree::Error> {
        let doc = roxmltree::Document::parse(text)?;
        let root = doc.root_element();
        Ok(Node::Map(vec![(
            root.tag_name().name().to_string(),
            Self::from_element(root),
        )]))
    }

    fn from_element(element: roxmltree::Node<'_, '_>) -> Node {
        let mut fields: Vec<(String, Node)> = element
            .attributes()
            .map(|attr| (attr.name().to_string(), Node::Leaf(attr.value().trim().to_string())))
            .collect();
        let mut text = String::new();

        for child in element.children() {
            if child.is_element() {
                let name = child.tag_name().name();
                let value = Self::from_element(child);
                match fields.iter_mut().find(|(key, _)| key == name) {
                    Some((_, Node::Sequence(items))) => items.push(value),
                    Some((_, existing)) => {
                        let first = std::mem::replace(existing, Node::Sequence(Vec::new()));
                        *existing = Node::Sequence(vec![first, value]);
                    }
                    None => fields.push((name.to_string(), value)),
                }
            } else if child.is_text() {
                text.push_str(child.text().unwrap_or_default());
            }
        }

        let text = text.trim();
        if fields.is_empty() {
            return Node::Leaf(text.to_string());
        }
        if !text.is_empty() {
            fields.push((TEXT_KEY.to_string(), Node::Leaf(text.to_string())));
        }
        Node::Map(fields)
    }

    /// Look up a field of a map node.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Map(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// View the node as a list: a sequence yields its elements, anything else itself.
    pub fn items(&self) -> Vec<&Node> {
        match self {
            Node::Sequence(items) => items.iter().collect(),
            other => vec![other],
        }
    }

    /// First element of a sequence, or the node itself.
    pub fn first(&self) -> Option<&Node> {
        match self {
            Node::Sequence(items) => items.first(),
            other => Some(other),
        }
    }

    /// Text of a leaf, or the `#text` of a map.
    pub fn text(&self) -> Option<&str> {
        match self {
            Node::Leaf(s) => Some(s.as_str()),
            Node::Map(_) => self.get(TEXT_KEY).and_then(Node::text),
            Node::Sequence(_) => None,
        }
    }

    /// Non-empty text of the first of `keys` that is present and non-empty.
    pub fn field(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.get(key).and_then(Node::text))
            .find(|s| !s.is_empty())
    }

    /// Every non-leaf record stored under `key`, at any depth, in document order.
    pub fn find_records(&self, key: &str) -> Vec<&Node> {
        let mut out = Vec::new();
        collect_records(self, key, &mut out);
        out
    }
}

fn collect_records<'a>(node: &'a Node, key: &str, out: &mut Vec<&'a Node>) {
    match node {
        Node::Map(fields) => {
            for (_, value) in fields.iter().filter(|(k, _)| k == key) {
                out.extend(value.items().into_iter().filter(|n| !matches!(n, Node::Leaf(_))));
            }
            for (_, value) in fields {
                collect_records(value, key, out);
            }
        }
        Node::Sequence(items) => {
            for item in items {
                collect_records(item, key, out);
            }
        }
        Node::Leaf(_) => {}
    }
}
