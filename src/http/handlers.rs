//! Demo application served behind the filter pipeline.
//!
//! Every link and form action is passed through the `UrlEncoder` installed
//! by the filters, so pages carry whatever nonce the chain issued.

use std::sync::Arc;

use axum::{
    extract::{Extension, Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::pipeline::UrlEncoder;
use crate::session::{SessionId, SessionStore};

#[derive(Debug, Deserialize)]
pub struct TransferForm {
    pub to: String,
    pub amount: u64,
}

/// Routes of the demo application.
pub fn demo_routes(sessions: Arc<dyn SessionStore>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/account", get(account))
        .route("/transfer", post(transfer))
        .route("/logout", post(logout))
        .with_state(sessions)
}

async fn index(Extension(encoder): Extension<UrlEncoder>) -> Html<String> {
    Html(format!(
        "<html><body>\n<h1>Welcome</h1>\n<a href=\"{}\">Account</a>\n</body></html>\n",
        encoder.encode_url("/account")
    ))
}

async fn account(Extension(encoder): Extension<UrlEncoder>) -> Html<String> {
    Html(format!(
        "<html><body>\n\
         <form method=\"post\" action=\"{}\">\n\
         <input name=\"to\"><input name=\"amount\"><button>Send</button>\n\
         </form>\n\
         <form method=\"post\" action=\"{}\"><button>Log out</button></form>\n\
         </body></html>\n",
        encoder.encode_url("/transfer"),
        encoder.encode_url("/logout"),
    ))
}

async fn transfer(
    Extension(encoder): Extension<UrlEncoder>,
    Form(form): Form<TransferForm>,
) -> Response {
    if form.amount == 0 {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": "amount must be positive" })),
        )
            .into_response();
    }
    tracing::info!(to = %form.to, amount = form.amount, "Transfer accepted");
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "accepted",
            "to": form.to,
            "amount": form.amount,
            "next": encoder.encode_url("/account"),
        })),
    )
        .into_response()
}

async fn logout(
    State(sessions): State<Arc<dyn SessionStore>>,
    Extension(encoder): Extension<UrlEncoder>,
    session: Option<Extension<SessionId>>,
) -> Response {
    if let Some(Extension(id)) = session {
        sessions.invalidate(&id);
        tracing::info!(session = %id, "Session invalidated");
    }
    encoder.redirect("/").into_response()
}
