use crate::error::ContentManagerError;
use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use serde_json::{Map, Value};

/// Multipart part carrying the JSON document.
const DATA_PART: &str = "data";

/// A JSON document sent either as the request body or as the `data` part of a
/// `multipart/form-data` request. An empty body reads as `{}`.
#[derive(Debug)]
pub(crate) struct Payload(pub(crate) Value);

impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = ContentManagerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if is_multipart {
            return from_multipart(req, state).await;
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ContentManagerError::bad_request(rejection.body_text()))?;
        parse(&bytes)
    }
}

async fn from_multipart<S>(req: Request, state: &S) -> Result<Payload, ContentManagerError>
where
    S: Send + Sync,
{
    let mut multipart = Multipart::from_request(req, state)
        .await
        .map_err(|rejection| ContentManagerError::bad_request(rejection.body_text()))?;

    while let Some(field) =
        multipart.next_field().await.map_err(|err| ContentManagerError::bad_request(err.to_string()))?
    {
        if field.name() == Some(DATA_PART) {
            let text = field.text().await.map_err(|err| ContentManagerError::bad_request(err.to_string()))?;
            return parse(text.as_bytes());
        }
    }

    Err(ContentManagerError::bad_request("Multipart body has no `data` part"))
}

fn parse(bytes: &[u8]) -> Result<Payload, ContentManagerError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Payload(Value::Object(Map::new())));
    }

    serde_json::from_slice(bytes)
        .map(Payload)
        .map_err(|err| ContentManagerError::bad_request(format!("Malformed JSON body: {err}")))
}
