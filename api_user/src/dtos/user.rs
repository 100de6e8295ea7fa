use db::models::user::User;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct SyncResponse {
    pub message: String,
    pub user: User,
}
