use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use coffeeshop_core::AppError;

fn format_errors(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_rejection(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Missing 'Content-Type: application/json' header".to_string()
        }
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON".to_string(),
        JsonRejection::JsonDataError(_) => {
            let detail = rejection.body_text();
            if detail.contains("invalid type") || detail.contains("did not match any variant") {
                "Invalid field type in request".to_string()
            } else {
                "Invalid request body".to_string()
            }
        }
        _ => "Invalid request body".to_string(),
    }
}

/// JSON body extractor that also runs `validator` rules.
///
/// Unparsable bodies are rejected with 400; bodies that parse but break a rule
/// with 422.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(anyhow!(describe_rejection(&rejection))))?;

        value.validate().map_err(|errors| {
            AppError::unprocessable(anyhow!("unprocessable: {}", format_errors(&errors)))
        })?;

        Ok(ValidatedJson(value))
    }
}
