use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Current project/task assignment of a physical tag.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TagAssignment {
    pub tag_id: String,
    pub project_name: Option<String>,
    pub task_name: Option<String>,
    pub is_reflection_trigger: bool,
    pub assigned_at: DateTime<Utc>,
}

impl TagAssignment {
    pub fn new(tag_id: &str, project_name: Option<&str>, task_name: Option<&str>) -> Self {
        Self {
            tag_id: tag_id.to_string(),
            project_name: project_name.map(str::to_string),
            task_name: task_name.map(str::to_string),
            is_reflection_trigger: false,
            assigned_at: Utc::now(),
        }
    }

    /// "Project/Task" label, empty parts left blank.
    pub fn label(&self) -> String {
        format!(
            "{}/{}",
            self.project_name.as_deref().unwrap_or(""),
            self.task_name.as_deref().unwrap_or("")
        )
    }
}

/// Read access to tag assignments by tag id.
pub trait TagLookup {
    fn assignment(&self, tag_id: &str) -> Option<&TagAssignment>;
}

impl TagLookup for HashMap<String, TagAssignment> {
    fn assignment(&self, tag_id: &str) -> Option<&TagAssignment> {
        self.get(tag_id)
    }
}

impl TagLookup for [TagAssignment] {
    fn assignment(&self, tag_id: &str) -> Option<&TagAssignment> {
        self.iter().find(|t| t.tag_id == tag_id)
    }
}

impl TagLookup for Vec<TagAssignment> {
    fn assignment(&self, tag_id: &str) -> Option<&TagAssignment> {
        self.as_slice().assignment(tag_id)
    }
}

/// Index assignments by tag id. Later entries win on duplicate ids.
pub fn index_by_tag(tags: &[TagAssignment]) -> HashMap<String, TagAssignment> {
    tags.iter()
        .map(|t| (t.tag_id.clone(), t.clone()))
        .collect()
}
