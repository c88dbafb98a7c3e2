//! Publishing new template versions.
//!
//! A published version becomes the template's default. The previous default
//! is cleared in the same transaction, so the render path never observes a
//! template with two defaults.

use uuid::Uuid;

use crate::{
    error::AppError,
    models::template::{NewTemplateVersion, TemplateVersion},
    store::RenderStore,
};

/// Publish the next version of a template.
///
/// The first version is `v1.0.0`; later versions keep major and minor of the
/// most recent version and bump the patch.
///
/// # Errors
///
/// - `TemplateNotFound`: template absent or owned by another organization
/// - `Store`: the transaction failed and nothing was written
pub async fn publish_template_version(
    store: &dyn RenderStore,
    template_id: Uuid,
    organization_id: Uuid,
    version: NewTemplateVersion,
) -> Result<TemplateVersion, AppError> {
    let published = store
        .publish_template_version(template_id, organization_id, version)
        .await?
        .ok_or(AppError::TemplateNotFound)?;

    tracing::info!(
        template_id = %template_id,
        version = %published.version_label,
        "template version published"
    );

    Ok(published)
}
