use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::User;

#[derive(Deserialize, Debug, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 30))]
    pub name: String,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Deserialize, Debug, Validate, ToSchema)]
pub struct UserUpdateRequest {
    #[validate(length(min = 1, max = 30))]
    pub name: String,
}

/// Profile projection; the credential is never echoed back.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password: String,
}

const CREDENTIAL_PLACEHOLDER: &str = "********";

impl UserResponse {
    pub fn of(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            password: CREDENTIAL_PLACEHOLDER.to_string(),
        }
    }

    pub fn of_current(user: &crate::middleware::auth::CurrentUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            password: CREDENTIAL_PLACEHOLDER.to_string(),
        }
    }
}
