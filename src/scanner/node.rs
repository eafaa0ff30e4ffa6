//! Typed result of tokenizing one response

/// What happens when a key is seen again during one tokenization pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateMode {
    /// Collect every occurrence into a list (groups merge field-wise)
    #[default]
    Append,
    /// The last occurrence wins
    Overwrite,
    /// The first occurrence wins
    KeepFirst,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeValue {
    Scalar(String),
    List(Vec<String>),
    Group(NodeTree),
}

impl NodeValue {
    /// First non-empty scalar of a scalar or list node
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            NodeValue::Scalar(value) => Some(value.as_str()).filter(|v| !v.is_empty()),
            NodeValue::List(values) => values.iter().map(String::as_str).find(|v| !v.is_empty()),
            NodeValue::Group(_) => None,
        }
    }

    /// Every non-empty scalar of a scalar or list node, in input order
    pub fn as_values(&self) -> Vec<&str> {
        match self {
            NodeValue::Scalar(value) if !value.is_empty() => vec![value.as_str()],
            NodeValue::Scalar(_) | NodeValue::Group(_) => Vec::new(),
            NodeValue::List(values) => values
                .iter()
                .map(String::as_str)
                .filter(|v| !v.is_empty())
                .collect(),
        }
    }

    pub fn as_group(&self) -> Option<&NodeTree> {
        match self {
            NodeValue::Group(group) => Some(group),
            _ => None,
        }
    }
}

/// Ordered mapping from server-defined key to value.
///
/// Keys are case-sensitive and unique; responses are short so lookups are
/// linear scans over insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeTree {
    nodes: Vec<(String, NodeValue)>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&NodeValue> {
        self.nodes.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(NodeValue::as_scalar)
    }

    pub fn values(&self, key: &str) -> Vec<&str> {
        self.get(key).map(NodeValue::as_values).unwrap_or_default()
    }

    pub fn group(&self, key: &str) -> Option<&NodeTree> {
        self.get(key).and_then(NodeValue::as_group)
    }

    /// Look up `key` and apply a transformation to the raw node
    pub fn node<T>(&self, key: &str, transform: impl FnOnce(&NodeValue) -> Option<T>) -> Option<T> {
        self.get(key).and_then(transform)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeValue)> {
        self.nodes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Lines no grammar rule claimed
    pub fn unparsed(&self) -> Vec<&str> {
        self.values(super::UNPARSED_KEY)
    }

    pub(crate) fn insert(&mut self, key: String, value: NodeValue, mode: DuplicateMode) {
        let Some(position) = self.nodes.iter().position(|(k, _)| *k == key) else {
            self.nodes.push((key, value));
            return;
        };

        let existing = &mut self.nodes[position].1;
        match mode {
            DuplicateMode::KeepFirst => {}
            DuplicateMode::Overwrite => *existing = value,
            DuplicateMode::Append => append(existing, value),
        }
    }
}

fn append(existing: &mut NodeValue, value: NodeValue) {
    let previous = std::mem::replace(existing, NodeValue::List(Vec::new()));
    *existing = match (previous, value) {
        (NodeValue::Group(mut group), NodeValue::Group(other)) => {
            for (key, value) in other.nodes {
                group.insert(key, value, DuplicateMode::Append);
            }
            NodeValue::Group(group)
        }
        (NodeValue::Scalar(first), NodeValue::Scalar(second)) => NodeValue::List(vec![first, second]),
        (NodeValue::Scalar(first), NodeValue::List(rest)) => {
            let mut merged = vec![first];
            merged.extend(rest);
            NodeValue::List(merged)
        }
        (NodeValue::List(mut list), NodeValue::Scalar(value)) => {
            list.push(value);
            NodeValue::List(list)
        }
        (NodeValue::List(mut list), NodeValue::List(rest)) => {
            list.extend(rest);
            NodeValue::List(list)
        }
        // Mixed scalar/group occurrences cannot be merged, the later one wins
        (_, value) => value,
    };
}
