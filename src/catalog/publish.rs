use tracing::{info, warn};

use crate::domain::model::{GraphDefinition, JourneyVersion};
use crate::dsl::validation::{validate_graph, ValidationReport};
use crate::error::{JourneyError, JourneyResult};

use super::ContentCatalog;

/// Create the next draft version of a module, numbered after the highest
/// existing version.
pub async fn create_draft(
    catalog: &dyn ContentCatalog,
    module_id: &str,
    version_id: impl Into<String>,
    graph: GraphDefinition,
    now: i64,
) -> JourneyResult<JourneyVersion> {
    if catalog.load_module(module_id).await?.is_none() {
        return Err(JourneyError::ModuleNotFound(module_id.to_string()));
    }
    let next = catalog
        .versions_for_module(module_id)
        .await?
        .iter()
        .map(|v| v.version)
        .max()
        .unwrap_or(0)
        + 1;
    let version = JourneyVersion::new_draft(version_id, module_id, next, graph, now);
    catalog.save_version(&version).await?;
    Ok(version)
}

/// Validate a draft and publish it.
///
/// Error-level diagnostics refuse the publish. Warnings are logged and
/// returned. The module's previously published version, if any, is archived
/// so at most one version per module is published; runs already bound to it
/// keep executing against it.
pub async fn publish_version(
    catalog: &dyn ContentCatalog,
    version_id: &str,
    now: i64,
) -> JourneyResult<ValidationReport> {
    let mut version = catalog
        .load_version(version_id)
        .await?
        .ok_or_else(|| JourneyError::VersionNotFound(version_id.to_string()))?;

    let report = validate_graph(&version.graph);
    if !report.is_valid {
        warn!(
            version_id,
            errors = report.errors().len(),
            "journey version failed validation"
        );
        return Err(JourneyError::ValidationFailed(Box::new(report)));
    }
    for diag in report.warnings() {
        warn!(
            version_id,
            code = %diag.code,
            block_id = diag.block_id.as_deref().unwrap_or(""),
            "{}",
            diag.message
        );
    }

    version.mark_published(now)?;

    if let Some(mut previous) = catalog.published_version(&version.module_id).await? {
        if previous.id != version.id {
            previous.mark_archived(now)?;
            catalog.save_version(&previous).await?;
            info!(version_id = %previous.id, "archived superseded journey version");
        }
    }
    catalog.save_version(&version).await?;
    info!(
        version_id,
        module_id = %version.module_id,
        version = version.version,
        "published journey version"
    );
    Ok(report)
}

pub async fn archive_version(
    catalog: &dyn ContentCatalog,
    version_id: &str,
    now: i64,
) -> JourneyResult<JourneyVersion> {
    let mut version = catalog
        .load_version(version_id)
        .await?
        .ok_or_else(|| JourneyError::VersionNotFound(version_id.to_string()))?;
    version.mark_archived(now)?;
    catalog.save_version(&version).await?;
    info!(version_id, "archived journey version");
    Ok(version)
}
