use serde::Serialize;

use super::argument::ArgumentIterator;

/// One parsed DSL command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntaxItem {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<ArgumentIterator>,
}

impl SyntaxItem {
    pub fn new(command: impl Into<String>, arguments: Option<ArgumentIterator>) -> Self {
        Self {
            command: command.into(),
            arguments,
        }
    }
}

/// Parsed commands in pipe order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SyntaxItemIterator {
    items: Vec<SyntaxItem>,
}

impl SyntaxItemIterator {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SyntaxItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SyntaxItem> {
        self.items.iter()
    }
}

impl FromIterator<SyntaxItem> for SyntaxItemIterator {
    fn from_iter<I: IntoIterator<Item = SyntaxItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for SyntaxItemIterator {
    type Item = SyntaxItem;
    type IntoIter = std::vec::IntoIter<SyntaxItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
