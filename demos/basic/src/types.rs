use serde::{Deserialize, Serialize};
use validator::Validate;

/// @group user
/// @handler login
/// @summary Login
/// @router /login [post]
#[derive(Debug, Deserialize, Validate)]
pub struct LoginReq {
    #[validate(length(min = 1))]
    pub name: String,
    pub password: String,
}

/// @router /login [post]
#[derive(Debug, Serialize)]
pub struct LoginResp {
    pub token: String,
}

/// @group account
/// @auth false
/// @handler register
/// @router /register [get]
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterReq {
    pub name: String,
}

/// @router /register [get]
#[derive(Debug, Serialize)]
pub struct RegisterResp {
    pub id: u64,
}
