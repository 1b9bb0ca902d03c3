use defmt::Format;
use embedded_io_async::Write;

use crate::ascii::{AsciiInt, CR, LF, atoi};
use crate::{HttpWrite, WebError};

pub const REQ_HEAD_HOST: &str = "Host";
pub const REQ_HEAD_USER_AGENT: &str = "User-Agent";
pub const REQ_HEAD_ACCEPT: &str = "Accept";
pub const REQ_HEAD_CONNECTION: &str = "Connection";
pub const REQ_HEAD_CONTENT_LENGTH: &str = "Content-Length";
pub const REQ_HEAD_CONTENT_TYPE: &str = "Content-Type";

#[derive(Clone, Copy, Debug, PartialEq, Format)]
pub enum RequestHeader<'a> {
    Host(&'a str),
    UserAgent(&'a str),
    Accept(&'a str),
    Connection(&'a str),
    ContentLength(usize),
    ContentType(&'a str),
    Other(&'a str, &'a str),
}

impl<'a> TryFrom<(&'a str, &'a str)> for RequestHeader<'a> {
    type Error = Option<&'static str>;

    fn try_from(value: (&'a str, &'a str)) -> Result<Self, Self::Error> {
        match value.0 {
            _ if value.0.eq_ignore_ascii_case(REQ_HEAD_HOST) => Ok(RequestHeader::Host(value.1)),
            _ if value.0.eq_ignore_ascii_case(REQ_HEAD_USER_AGENT) => {
                Ok(RequestHeader::UserAgent(value.1))
            }
            _ if value.0.eq_ignore_ascii_case(REQ_HEAD_ACCEPT) => {
                Ok(RequestHeader::Accept(value.1))
            }
            _ if value.0.eq_ignore_ascii_case(REQ_HEAD_CONNECTION) => {
                Ok(RequestHeader::Connection(value.1))
            }
            _ if value.0.eq_ignore_ascii_case(REQ_HEAD_CONTENT_TYPE) => {
                Ok(RequestHeader::ContentType(value.1))
            }
            _ if value.0.eq_ignore_ascii_case(REQ_HEAD_CONTENT_LENGTH) => {
                let n = atoi(value.1.as_bytes()).ok_or("invalid content-length")?;
                Ok(RequestHeader::ContentLength(
                    usize::try_from(n).or(Err("invalid content-length"))?,
                ))
            }
            _ => Ok(RequestHeader::Other(value.0, value.1)),
        }
    }
}

pub const RESP_HEAD_SERVER: &str = "Server";
pub const RESP_HEAD_CONNECTION: &str = "Connection";
pub const RESP_HEAD_CONTENT_LENGTH: &str = "Content-Length";
pub const RESP_HEAD_CONTENT_TYPE: &str = "Content-Type";

#[derive(Clone, Copy, Debug, PartialEq, Format)]
pub enum ResponseHeader<'a> {
    Server(&'a str),
    Connection(&'a str),
    ContentLength(usize),
    ContentType(&'a str),
    Other(&'a str, &'a str),
}

impl<'a> HttpWrite for ResponseHeader<'a> {
    async fn write<T: Write>(self, writer: &mut T) -> Result<(), WebError> {
        let len: AsciiInt;

        let val = match self {
            Self::Server(s) => {
                writer
                    .write_all(RESP_HEAD_SERVER.as_bytes())
                    .await
                    .or(Err(WebError::Disconnected))?;
                s
            }
            Self::Connection(s) => {
                writer
                    .write_all(RESP_HEAD_CONNECTION.as_bytes())
                    .await
                    .or(Err(WebError::Disconnected))?;
                s
            }
            Self::ContentLength(n) => {
                if n == 0 {
                    return Ok(());
                }
                writer
                    .write_all(RESP_HEAD_CONTENT_LENGTH.as_bytes())
                    .await
                    .or(Err(WebError::Disconnected))?;

                len = AsciiInt::from(n as u64);
                len.as_str()
            }
            Self::ContentType(s) => {
                writer
                    .write_all(RESP_HEAD_CONTENT_TYPE.as_bytes())
                    .await
                    .or(Err(WebError::Disconnected))?;
                s
            }
            Self::Other(k, v) => {
                writer
                    .write_all(k.as_bytes())
                    .await
                    .or(Err(WebError::Disconnected))?;
                v
            }
        };

        writer
            .write_all(": ".as_bytes())
            .await
            .and(writer.write_all(val.as_bytes()).await)
            .and(writer.write_all(&[CR, LF]).await)
            .or(Err(WebError::Disconnected))
    }
}
