//! Account API handlers.
//!
//! ```text
//! POST  /user/create/ {"email":"ada@example.com","password":"secret","name":"Ada"}
//! POST  /user/token/  {"email":"ada@example.com","password":"secret"}
//! GET   /user/me/     Authorization: Token <key>
//! PATCH /user/me/     Authorization: Token <key> {"name":"Ada L."}
//! ```

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::ports::{ProfileUpdate, Registration};
use crate::domain::{Error, LoginCredentials, LoginValidationError, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, blank_field_error, json_error_handler, require,
};

const EMAIL: FieldName = FieldName::new("email");
const PASSWORD: FieldName = FieldName::new("password");

/// Registration body for `POST /user/create/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct CreateUserRequest {
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    #[schema(example = "correct horse", min_length = 5)]
    pub password: Option<String>,
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
}

impl From<CreateUserRequest> for Registration {
    fn from(value: CreateUserRequest) -> Self {
        Self {
            email: value.email,
            password: value.password.map(Zeroizing::new),
            name: value.name,
        }
    }
}

/// Credential exchange body for `POST /user/token/`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct TokenRequest {
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    #[schema(example = "correct horse")]
    pub password: Option<String>,
}

/// Partial profile update for `PATCH /user/me/`.
///
/// Unknown fields, including `email`, are ignored.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct UpdateProfileRequest {
    #[schema(example = "Ada L.")]
    pub name: Option<String>,
    pub password: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(value: UpdateProfileRequest) -> Self {
        Self {
            name: value.name,
            password: value.password.map(Zeroizing::new),
        }
    }
}

/// Public view of a user. The password never leaves the service.
#[derive(Debug, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
pub struct UserResponse {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            email: user.email().to_string(),
            name: user.name().to_string(),
        }
    }
}

/// Issued API token.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TokenResponse {
    #[schema(example = "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b")]
    pub token: String,
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyEmail => blank_field_error(EMAIL),
        LoginValidationError::EmptyPassword => blank_field_error(PASSWORD),
    }
}

/// Register a new user.
#[utoipa::path(
    post,
    path = "/user/create/",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid or duplicate registration", body = Error),
        (status = 503, description = "Database unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser",
    security([])
)]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let user = state
        .registration
        .register(payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// Exchange email and password for an API token.
#[utoipa::path(
    post,
    path = "/user/token/",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Missing fields or invalid credentials", body = Error),
        (status = 503, description = "Database unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "createToken",
    security([])
)]
pub async fn create_token(
    state: web::Data<HttpState>,
    payload: web::Json<TokenRequest>,
) -> ApiResult<web::Json<TokenResponse>> {
    let TokenRequest { email, password } = payload.into_inner();
    let email = require(email, EMAIL)?;
    let password = Zeroizing::new(require(password, PASSWORD)?);
    let credentials =
        LoginCredentials::try_from_parts(&email, &password).map_err(map_login_validation_error)?;

    let token = state.login.issue_token(&credentials).await?;
    Ok(web::Json(TokenResponse {
        token: token.as_str().to_owned(),
    }))
}

/// Return the authenticated caller's profile.
#[utoipa::path(
    get,
    path = "/user/me/",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser",
    security(("token" = []))
)]
pub async fn current_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state.profile.fetch_profile(caller.user().id()).await?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Update the authenticated caller's name and/or password.
#[utoipa::path(
    patch,
    path = "/user/me/",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid update", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser",
    security(("token" = []))
)]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state
        .profile
        .update_profile(caller.user().id(), payload.into_inner().into())
        .await?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Register the account routes.
///
/// Each path is a single resource so unsupported methods answer `405`.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use accounts::inbound::http::users;
///
/// let app = App::new().configure(users::configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(web::resource("/user/create/").route(web::post().to(create_user)))
        .service(web::resource("/user/token/").route(web::post().to(create_token)))
        .service(
            web::resource("/user/me/")
                .route(web::get().to(current_user))
                .route(web::patch().to(update_current_user)),
        );
}
