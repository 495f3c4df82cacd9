use axum::Json;
use serde_json::{Value, json};

use crate::auth::AuthUser;

pub async fn user_handler(auth: AuthUser) -> Json<Value> {
    Json(json!({
        "user": auth.user,
        "session": auth.session,
    }))
}
