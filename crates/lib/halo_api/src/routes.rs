//! Route paths.

pub const POST_USER_IT_REGISTER: &str = "/v1/user/it/register";
pub const POST_USER_IT_LOGIN: &str = "/v1/user/it/login";
pub const POST_USER_NURSE_LOGIN: &str = "/v1/user/nurse/login";

pub const GET_USER: &str = "/v1/user";
pub const POST_USER_NURSE_REGISTER: &str = "/v1/user/nurse/register";
/// `PUT` updates, `DELETE` removes.
pub const USER_NURSE_ID: &str = "/v1/user/nurse/{user_id}";
pub const POST_USER_NURSE_ID_ACCESS: &str = "/v1/user/nurse/{user_id}/access";

/// `POST` records, `GET` lists.
pub const MEDICAL_PATIENT: &str = "/v1/medical/patient";
/// `POST` saves, `GET` lists.
pub const MEDICAL_RECORD: &str = "/v1/medical/record";

pub const POST_IMAGE: &str = "/v1/image";

pub const GET_INFO_VERSION: &str = "/v1/info/version";
pub const GET_INFO_HEALTH: &str = "/v1/info/health";

/// Uploaded images are served from here.
pub const UPLOADS: &str = "/uploads";
