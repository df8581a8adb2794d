//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the funnel, lead, and health endpoints together with
//! the domain schemas they return, plus the `user` cookie security scheme.
//! Swagger UI serves it in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    Error, ErrorCode, Funnel, FunnelDraft, FunnelStage, Lead, LeadStatus, User, UserStatus,
};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "UserCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "user",
                "JSON user object {id, name, role}, raw or percent-encoded.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "CRM backend-for-frontend",
        description = "Funnel and lead endpoints backed by the ERP gateway."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("UserCookie" = [])),
    paths(
        crate::inbound::http::funnels::list_funnels,
        crate::inbound::http::funnels::save_funnel,
        crate::inbound::http::leads::list_leads,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Funnel,
        FunnelDraft,
        FunnelStage,
        Lead,
        LeadStatus,
        User,
        UserStatus
    )),
    tags(
        (name = "funnels", description = "Sales funnels visible to the caller"),
        (name = "leads", description = "Sales leads visible to the caller"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the registered paths and schema fields.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn object_has_field(schema: &RefOr<Schema>, field: &str) -> bool {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj.properties.contains_key(field),
            _ => false,
        }
    }

    #[rstest]
    #[case("/api/funis")]
    #[case("/api/funis/salvar")]
    #[case("/api/leads")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn documents_every_route(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    #[case("Error", "code")]
    #[case("Error", "message")]
    #[case("Funnel", "CODFUNIL")]
    #[case("Lead", "STATUS_LEAD")]
    #[case("User", "codVendedor")]
    fn schemas_expose_wire_field_names(#[case] schema: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let found = schemas.get(schema).expect("schema registered");
        assert!(object_has_field(found, field), "{schema} lacks {field}");
    }

    #[rstest]
    fn user_schema_hides_password_hash() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let user = schemas.get("User").expect("User schema");
        assert!(!object_has_field(user, "passwordHash"));
    }
}
