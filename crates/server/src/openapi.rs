use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct CityDoc {
    pub id: Uuid,
    pub name: String,
    pub country: String,
    /// RFC 3339 timestamp
    pub created_at: String,
    /// RFC 3339 timestamp
    pub updated_at: String,
}

#[derive(ToSchema)]
pub struct CityInputDoc { pub name: String, pub country: String }

#[derive(ToSchema)]
pub struct CityPatchDoc { pub name: Option<String>, pub country: Option<String> }

#[derive(ToSchema)]
pub struct MessageDoc { pub message: String }

/// `errors` maps a field name to its messages.
#[derive(ToSchema)]
pub struct ValidationErrorDoc {
    pub message: String,
    pub errors: std::collections::HashMap<String, Vec<String>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::cities::list,
        crate::routes::cities::create,
        crate::routes::cities::show,
        crate::routes::cities::update,
        crate::routes::cities::destroy,
    ),
    components(
        schemas(
            HealthResponse,
            CityDoc,
            CityInputDoc,
            CityPatchDoc,
            MessageDoc,
            ValidationErrorDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "cities")
    )
)]
pub struct ApiDoc;
