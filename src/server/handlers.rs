// HTTP request handlers

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use super::DemoServer;
use crate::predictor::{QaRequest, DEMO_CONTEXT, DEMO_QUESTION};

/// Create the main application router
pub fn create_router(server: Arc<DemoServer>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(handle_predict))
        .with_state(server)
}

/// Form fields submitted by the demo page
#[derive(Debug, Deserialize)]
pub struct AskForm {
    pub context: String,
    pub question: String,
}

/// Handle GET / - Render the question form
async fn index() -> Html<String> {
    Html(render_form(DEMO_CONTEXT, DEMO_QUESTION))
}

/// Handle POST /predict - Forward the pair to the endpoint, render the answer
async fn handle_predict(
    State(server): State<Arc<DemoServer>>,
    Form(form): Form<AskForm>,
) -> Result<Html<String>, AppError> {
    let request = QaRequest::new(&form.question, &form.context);
    let answer = server.predictor().predict(&request).await?;

    tracing::info!(score = answer.score, "Answered question");

    Ok(Html(render_result(
        &form.context,
        &form.question,
        &answer.answer,
        answer.score,
    )))
}

fn render_form(context: &str, question: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><title>Q&amp;A App</title></head>\n\
         <body>\n\
         <h1>Q&amp;A App</h1>\n\
         <form action=\"/predict\" method=\"post\">\n\
           <label for=\"context\">Context Paragraph</label><br>\n\
           <textarea id=\"context\" name=\"context\" rows=\"6\" cols=\"80\">{}</textarea><br>\n\
           <label for=\"question\">Question</label><br>\n\
           <textarea id=\"question\" name=\"question\" rows=\"2\" cols=\"80\">{}</textarea><br>\n\
           <button type=\"submit\">Ask</button>\n\
         </form>\n\
         </body>\n\
         </html>\n",
        escape_html(context),
        escape_html(question)
    )
}

fn render_result(context: &str, question: &str, answer: &str, score: f64) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><title>Q&amp;A App</title></head>\n\
         <body>\n\
         <h1>Q&amp;A App</h1>\n\
         <form action=\"/predict\" method=\"post\">\n\
           <label for=\"context\">Context Paragraph</label><br>\n\
           <textarea id=\"context\" name=\"context\" rows=\"6\" cols=\"80\">{}</textarea><br>\n\
           <label for=\"question\">Question</label><br>\n\
           <textarea id=\"question\" name=\"question\" rows=\"2\" cols=\"80\">{}</textarea><br>\n\
           <button type=\"submit\">Ask</button>\n\
         </form>\n\
         <h2>Answer</h2>\n\
         <p>{}</p>\n\
         <h2>Confidence in Answer</h2>\n\
         <p>{}</p>\n\
         </body>\n\
         </html>\n",
        escape_html(context),
        escape_html(question),
        escape_html(answer),
        score
    )
}

/// Minimal HTML escaping for user- and endpoint-supplied text.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Application error wrapper for proper HTTP error responses
///
/// Failures are not translated: whatever the predictor propagates is
/// surfaced as a 500 with the error text.
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Request failed");

        let body = serde_json::json!({
            "error": {
                "message": self.0.to_string(),
                "type": "prediction_error"
            }
        });

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
