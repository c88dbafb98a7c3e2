//! Template resolution for render requests.

use uuid::Uuid;

use crate::{
    error::AppError,
    models::template::{Template, TemplateVersion},
    store::RenderStore,
};

/// A template together with the version chosen for rendering.
#[derive(Debug, Clone)]
pub struct ResolvedTemplate {
    pub template: Template,
    pub version: TemplateVersion,
}

/// Locate a template inside an organization and pick the version to render.
///
/// `organization_id` must come from the validated API key. A template id that
/// is not a UUID, names no template, or names another organization's
/// template all produce the same `TemplateNotFound`.
///
/// # Errors
///
/// - `InvalidRequest`: empty template id
/// - `TemplateNotFound`: see above
/// - `NoTemplateVersions`: the template has no versions
/// - `Store`: the lookup failed
pub async fn resolve_template(
    store: &dyn RenderStore,
    template_id: &str,
    organization_id: Uuid,
) -> Result<ResolvedTemplate, AppError> {
    if template_id.is_empty() {
        return Err(AppError::InvalidRequest(
            "template_id es requerido".to_string(),
        ));
    }

    let Ok(template_id) = Uuid::parse_str(template_id) else {
        return Err(AppError::TemplateNotFound);
    };

    let template = store
        .find_template(template_id, organization_id)
        .await?
        .ok_or(AppError::TemplateNotFound)?;

    let version = template
        .render_version()
        .cloned()
        .ok_or(AppError::NoTemplateVersions)?;

    Ok(ResolvedTemplate { template, version })
}
