//! Startup seed: guarantees the system-wide base template exists.

use serde_json::json;
use sqlx::PgPool;

use crate::models::template::CreateTemplate;
use crate::repositories::TemplateRepo;

/// Human code of the seeded base template.
pub const BASE_TEMPLATE_CODE: &str = "TPL-BASE-001";

/// Insert the base template if the table is empty.
///
/// The base template is the default starting point for new files and must
/// exist exactly once system-wide; it is only created when no templates are
/// present at all, so redeployments never duplicate it.
pub async fn ensure_base_template(pool: &PgPool) -> Result<(), sqlx::Error> {
    if TemplateRepo::count(pool).await? > 0 {
        return Ok(());
    }

    let input = CreateTemplate {
        code: BASE_TEMPLATE_CODE.to_string(),
        name: "Plantilla base".to_string(),
        description: Some("Plantilla mínima de arranque.".to_string()),
        document: base_template_document(),
        version: 1,
        is_active: true,
        is_user_template: false,
        owner_id: None,
        visibility: "public".to_string(),
        created_by: None,
    };

    let template = TemplateRepo::create(pool, &input).await?;
    tracing::info!(template_id = %template.id, code = %template.code, "Base template seeded");
    Ok(())
}

fn base_template_document() -> serde_json::Value {
    json!({
        "meta": {"name": "Plantilla base", "version": 1},
        "columns": [
            {"key": "code", "label": "Código", "type": "text"},
            {"key": "title", "label": "Ítem", "type": "longtext"},
            {"key": "parent_code", "label": "Agrupación", "type": "text"},
            {"key": "viKey", "label": "VI", "type": "text"},
            {"key": "viLabel", "label": "VI Label", "type": "text"},
            {"key": "observaciones", "label": "Observaciones", "type": "longtext"}
        ],
        "nodes": [
            {"id": "1", "code": "G-01", "title": "Inicio"},
            {"id": "2", "code": "G-01.1", "parentId": "1", "viKey": "M",
             "custom": {"observaciones": ""}}
        ],
        "scales": {
            "VI": [
                {"key": "A", "label": "Alto"},
                {"key": "M", "label": "Medio"},
                {"key": "B", "label": "Bajo"}
            ],
            "VC": [
                {"key": "C", "label": "Crítico"},
                {"key": "N", "label": "Normal"}
            ]
        },
        "questions": {"q1": "¿Está completa la información general?"},
        "intro": ["Complete cada ítem de la lista antes de exportar."]
    })
}
