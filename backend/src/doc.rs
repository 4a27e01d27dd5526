//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every account and health endpoint, the request and
//! response DTOs, the shared error envelope and the `Authorization: Token`
//! security scheme. Swagger UI serves it in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::health::ProbeStatus;
use crate::inbound::http::users::{
    CreateUserRequest, TokenRequest, TokenResponse, UpdateProfileRequest, UserResponse,
};

/// Name of the token security scheme referenced by handler annotations.
pub const TOKEN_SECURITY_SCHEME: &str = "token";

/// Adds the token header scheme to the generated document.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            TOKEN_SECURITY_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "`Token <key>` where the key comes from POST /user/token/.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Accounts API",
        description = "Registration, token exchange and self-service profile for email-keyed users."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::create_token,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CreateUserRequest,
        TokenRequest,
        UpdateProfileRequest,
        UserResponse,
        TokenResponse,
        ProbeStatus,
        Error,
        ErrorCode
    )),
    tags(
        (name = "users", description = "Account registration, tokens and profile"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
