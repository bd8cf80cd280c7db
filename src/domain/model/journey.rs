use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::JourneyError;

use super::graph::GraphDefinition;

/// Lifecycle of a journey version: `draft -> published -> archived`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    Draft,
    Published,
    Archived,
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VersionStatus::Draft => "draft",
            VersionStatus::Published => "published",
            VersionStatus::Archived => "archived",
        };
        f.write_str(s)
    }
}

/// Versioned snapshot of a module's graph. Only drafts are editable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyVersion {
    pub id: String,
    pub module_id: String,
    pub version: u32,
    pub status: VersionStatus,
    pub graph: GraphDefinition,
    pub created_at: i64,
    #[serde(default)]
    pub published_at: Option<i64>,
    #[serde(default)]
    pub archived_at: Option<i64>,
}

impl JourneyVersion {
    pub fn new_draft(
        id: impl Into<String>,
        module_id: impl Into<String>,
        version: u32,
        graph: GraphDefinition,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            module_id: module_id.into(),
            version,
            status: VersionStatus::Draft,
            graph,
            created_at,
            published_at: None,
            archived_at: None,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == VersionStatus::Published
    }

    pub fn is_editable(&self) -> bool {
        self.status == VersionStatus::Draft
    }

    /// Swap in a new graph. Published and archived versions are frozen so
    /// in-flight runs never see their graph change underneath them.
    pub fn replace_graph(&mut self, graph: GraphDefinition) -> Result<(), JourneyError> {
        if !self.is_editable() {
            return Err(JourneyError::VersionFrozen(self.id.clone()));
        }
        self.graph = graph;
        Ok(())
    }

    pub(crate) fn mark_published(&mut self, now: i64) -> Result<(), JourneyError> {
        self.transition(VersionStatus::Draft, VersionStatus::Published)?;
        self.published_at = Some(now);
        Ok(())
    }

    pub(crate) fn mark_archived(&mut self, now: i64) -> Result<(), JourneyError> {
        self.transition(VersionStatus::Published, VersionStatus::Archived)?;
        self.archived_at = Some(now);
        Ok(())
    }

    fn transition(&mut self, from: VersionStatus, to: VersionStatus) -> Result<(), JourneyError> {
        if self.status != from {
            return Err(JourneyError::InvalidVersionTransition {
                version_id: self.id.clone(),
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

/// An ordered sequence of modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

impl Track {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// A module within a track. Modules are chained in `order_index` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: String,
    pub track_id: String,
    pub order_index: i32,
    #[serde(default)]
    pub title: String,
}

impl Module {
    pub fn new(
        id: impl Into<String>,
        track_id: impl Into<String>,
        order_index: i32,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            track_id: track_id.into(),
            order_index,
            title: title.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> JourneyVersion {
        JourneyVersion::new_draft("v1", "m1", 1, GraphDefinition::default(), 100)
    }

    #[test]
    fn test_replace_graph_only_on_drafts() {
        let mut version = draft();
        let graph = GraphDefinition {
            start_block_id: "a".into(),
            ..Default::default()
        };
        version.replace_graph(graph.clone()).unwrap();
        assert_eq!(version.graph.start_block_id, "a");

        version.mark_published(200).unwrap();
        assert!(version.is_published());
        assert_eq!(version.published_at, Some(200));
        assert!(matches!(
            version.replace_graph(GraphDefinition::default()),
            Err(JourneyError::VersionFrozen(id)) if id == "v1"
        ));
        assert_eq!(version.graph, graph);
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut version = draft();
        assert!(matches!(
            version.mark_archived(1),
            Err(JourneyError::InvalidVersionTransition {
                from: VersionStatus::Draft,
                to: VersionStatus::Archived,
                ..
            })
        ));
        version.mark_published(2).unwrap();
        version.mark_archived(3).unwrap();
        assert_eq!(version.status, VersionStatus::Archived);
        assert_eq!(version.archived_at, Some(3));
        assert!(version.mark_published(4).is_err());
    }

    #[test]
    fn test_version_serde_names() {
        let json = serde_json::to_value(draft()).unwrap();
        assert_eq!(json["moduleId"], "m1");
        assert_eq!(json["status"], "draft");
        assert_eq!(json["graph"]["startBlockId"], "");
    }
}
