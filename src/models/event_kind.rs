use serde::{Deserialize, Serialize};

/// Kind of a device event: a tag placed on the reader or taken away from it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EventKind {
    #[serde(rename = "tag_insert")]
    Insert,
    #[serde(rename = "tag_removed")]
    Remove,
}

impl EventKind {
    /// Convert wire/DB string → enum
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "tag_insert" => Some(EventKind::Insert),
            "tag_removed" => Some(EventKind::Remove),
            _ => None,
        }
    }

    /// Convert enum → wire/DB string
    pub fn as_wire(&self) -> &'static str {
        match self {
            EventKind::Insert => "tag_insert",
            EventKind::Remove => "tag_removed",
        }
    }

    /// Short label used in CLI tables.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Insert => "Insert",
            EventKind::Remove => "Remove",
        }
    }

    /// Tag presence implied by the event kind.
    pub fn implies_present(&self) -> bool {
        matches!(self, EventKind::Insert)
    }
}
