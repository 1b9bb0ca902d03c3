use embedded_io_async::{Read, Write};
use serde::Serialize;

use crate::WebError;
use crate::header::ResponseHeader;
use crate::response::{HttpResponder, HttpResponderStateInit, HttpStatusCode};

// big enough for the fixed fields plus a generous description
const REPLY_BUF_LEN: usize = 256;

#[derive(Serialize)]
struct StatusReply<'a> {
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

/// Finish the response with `{"status":"ok"}` and a 200 status.
pub async fn send_status_ok<'a, 'client, C: Read + Write>(
    resp: HttpResponder<'a, 'client, C, HttpResponderStateInit>,
) -> Result<(), WebError> {
    send(
        resp,
        HttpStatusCode::OK,
        StatusReply {
            status: "ok",
            error: None,
        },
    )
    .await
}

/// Finish the response with `{"status":"error","error":"<description>"}`.
/// The description is JSON escaped by serialization, so it may contain any
/// characters. `status` is typically a 400-class code naming whose fault the
/// failure is.
pub async fn send_status_error<'a, 'client, C: Read + Write>(
    resp: HttpResponder<'a, 'client, C, HttpResponderStateInit>,
    status: HttpStatusCode,
    description: &str,
) -> Result<(), WebError> {
    send(
        resp,
        status,
        StatusReply {
            status: "error",
            error: Some(description),
        },
    )
    .await
}

async fn send<'a, 'client, C: Read + Write>(
    resp: HttpResponder<'a, 'client, C, HttpResponderStateInit>,
    status: HttpStatusCode,
    reply: StatusReply<'_>,
) -> Result<(), WebError> {
    let mut buf = [0u8; REPLY_BUF_LEN];
    let len = serde_json_core::to_slice(&reply, &mut buf)
        .or(Err(WebError::ProtocolError("status reply does not fit its buffer")))?;

    resp.with_status(status)
        .await?
        .with_header(ResponseHeader::ContentType("application/json"))
        .await?
        .with_body(&buf[..len])
        .await
}
