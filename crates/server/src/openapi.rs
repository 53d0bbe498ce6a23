use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub username: String, pub password: String }

#[derive(ToSchema)]
pub struct SignupRequest { pub username: String, pub password: String, pub email: String }

/// Any JSON object; `name` is the only field the server looks at.
#[derive(ToSchema)]
pub struct RecordInputDoc { pub name: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::login,
        crate::routes::auth::signup,
        crate::routes::auth::logout,
        crate::routes::auth::auth_check,
        crate::routes::records::list,
        crate::routes::records::get_one,
        crate::routes::records::create,
        crate::routes::records::update,
        crate::routes::records::delete,
        crate::routes::dashboard::dashboard,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            SignupRequest,
            RecordInputDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "records")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_endpoint() {
        let doc = ApiDoc::openapi();
        for path in ["/health", "/login", "/signup", "/logout", "/api/auth-check", "/api/{collection}", "/api/{collection}/{id}", "/api/dashboard"] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }

    #[test]
    fn record_routes_describe_their_path_params() -> Result<(), serde_json::Error> {
        let doc = serde_json::to_value(ApiDoc::openapi())?;
        for (path, method) in [("/api/{collection}", "post"), ("/api/{collection}/{id}", "put"), ("/api/{collection}/{id}", "delete")] {
            let params = doc["paths"][path][method]["parameters"].as_array().cloned().unwrap_or_default();
            assert!(!params.is_empty(), "{method} {path}");
            for p in params {
                assert!(p["description"].is_string(), "{method} {path}: {p}");
            }
        }
        Ok(())
    }
}
