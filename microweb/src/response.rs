use core::marker::PhantomData;

use embedded_io_async::{Read, Write};

use crate::ascii::{AsciiInt, CR, LF, SP};
use crate::header::ResponseHeader;
use crate::request::HttpRequest;
use crate::{HttpWrite, WebError};

const HTTP_PROTO: &str = "HTTP/1.1";

#[derive(Clone, Copy)]
pub enum HttpStatusCode {
    OK,
    BadRequest,
    NotFound,
    InternalServerError,
    Other(u16),
}

impl HttpWrite for HttpStatusCode {
    #[rustfmt::skip]
    async fn write<T: Write>(self, writer: &mut T) -> Result<(), WebError> {
        let other: AsciiInt;
        let data = match self {
            Self::OK => "200 OK",
            Self::BadRequest => "400 Bad Request",
            Self::NotFound => "404 Not Found",
            Self::InternalServerError => "500 Internal Server Error",
            Self::Other(n) => {
                if !(100..=599).contains(&n){
                    return Err(WebError::ProtocolError("invalid status code"));
                }
                other = AsciiInt::from(n as u64);
                other.as_str()
            }
        };

        writer.write_all(HTTP_PROTO.as_bytes()).await
            .and(writer.write_all(&[SP]).await
            .and(writer.write_all(data.as_bytes()).await
            .and(writer.write_all(&[CR, LF]).await
        ))).or(Err(WebError::Disconnected))
    }
}

pub struct HttpResponderStateInit;
pub struct HttpResponderStateSending;

/// Writes a response straight onto the client connection. The typestate
/// forces the status line (and the Server header derived from the request's
/// Host) out before any other header, and every response must be finished
/// with either `with_body` or `no_body`.
pub struct HttpResponder<'a, 'client, C: Read + Write, State> {
    status: HttpStatusCode,
    server: ResponseHeader<'a>,
    client: &'client mut C,
    _state: PhantomData<State>,
}

impl<'a, 'client, C: Read + Write> HttpResponder<'a, 'client, C, HttpResponderStateInit> {
    pub fn new(request: &HttpRequest<'a>, client: &'client mut C) -> Self {
        Self {
            client,
            status: HttpStatusCode::OK,
            server: ResponseHeader::Server(request.host),
            _state: PhantomData,
        }
    }

    #[must_use = "http responder not finished with either `with_body` or `no_body` results in a client waiting for data"]
    pub async fn with_status(
        self,
        status: HttpStatusCode,
    ) -> Result<HttpResponder<'a, 'client, C, HttpResponderStateSending>, WebError> {
        status.write(self.client).await?;
        self.server.write(self.client).await?;

        Ok(HttpResponder::<'a, 'client, C, HttpResponderStateSending> {
            status,
            server: self.server,
            client: self.client,
            _state: PhantomData,
        })
    }

    #[must_use = "http responder not finished with either `with_body` or `no_body` results in a client waiting for data"]
    pub async fn with_header(
        self,
        header: ResponseHeader<'a>,
    ) -> Result<HttpResponder<'a, 'client, C, HttpResponderStateSending>, WebError> {
        let status = self.status;

        self.with_status(status).await?.with_header(header).await
    }
}

impl<'a, 'client, C: Read + Write> HttpResponder<'a, 'client, C, HttpResponderStateSending> {
    #[must_use = "http responder not finished with either `with_body` or `no_body` results in a client waiting for data"]
    pub async fn with_header(self, header: ResponseHeader<'a>) -> Result<Self, WebError> {
        header.write(self.client).await?;

        Ok(self)
    }

    pub async fn no_body(self) -> Result<(), WebError> {
        self.client
            .write_all(&[CR, LF])
            .await
            .or(Err(WebError::Disconnected))?;

        Ok(())
    }

    pub async fn with_body(self, body: &[u8]) -> Result<(), WebError> {
        ResponseHeader::ContentLength(body.len())
            .write(self.client)
            .await?;

        self.client
            .write_all(&[CR, LF])
            .await
            .or(Err(WebError::NetworkError("connection reset by peer")))?;

        if self.client.write_all(body).await.is_err() {
            return Err(WebError::Disconnected);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;
    use std::*;

    use embedded_io_async::{ErrorKind, ErrorType};

    use crate::request::HttpMethod;

    use super::*;

    struct TestClient<'a> {
        inner: &'a mut Vec<u8>,
    }

    impl<'a> TestClient<'a> {
        fn new(inner: &'a mut Vec<u8>) -> Self {
            Self { inner }
        }
    }

    impl<'a> ErrorType for TestClient<'a> {
        type Error = ErrorKind;
    }

    impl<'a> Write for TestClient<'a> {
        async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.inner.extend_from_slice(buf);
            Ok(buf.len())
        }

        async fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
            self.inner.extend_from_slice(buf);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    impl<'a> Read for TestClient<'a> {
        async fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> {
            Ok(0)
        }
    }

    fn request(host: &'static str) -> HttpRequest<'static> {
        HttpRequest {
            method: HttpMethod::GET,
            path: "/",
            query: "",
            host,
            content_type: None,
            content_length: 0,
            body: None,
            header_slice: None,
        }
    }

    // HTTP uses `\r\n` as EOL delimeters.  In the expected data, we manually
    // add the \r at the end of the line, before the inherrent \n.

    #[tokio::test]
    async fn test_response_with_body() {
        let req = request("RustServer");

        let mut dst = Vec::<u8>::new();
        let mut writer = TestClient::new(&mut dst);
        let resp =
            HttpResponder::<'_, '_, TestClient, HttpResponderStateInit>::new(&req, &mut writer);

        resp.with_status(HttpStatusCode::OK)
            .await
            .unwrap()
            .with_header(ResponseHeader::ContentType("text/html"))
            .await
            .unwrap()
            .with_body("works!".as_bytes())
            .await
            .unwrap();

        let expected = "HTTP/1.1 200 OK\r
Server: RustServer\r
Content-Type: text/html\r
Content-Length: 6\r
\r
works!"
            .as_bytes();

        assert_eq!(
            &dst,
            expected,
            "oops, got:\n{}",
            str::from_utf8(&dst).unwrap()
        );
    }

    #[tokio::test]
    async fn test_response_not_found_no_body() {
        let req = request("RustServer");

        let mut dst = Vec::<u8>::new();
        let mut writer = TestClient::new(&mut dst);
        let resp =
            HttpResponder::<'_, '_, TestClient, HttpResponderStateInit>::new(&req, &mut writer);

        resp.with_status(HttpStatusCode::NotFound)
            .await
            .unwrap()
            .no_body()
            .await
            .unwrap();

        let expected = "HTTP/1.1 404 Not Found\r
Server: RustServer\r
\r
"
        .as_bytes();

        assert_eq!(
            &dst,
            expected,
            "oops, got:\n{}",
            str::from_utf8(&dst).unwrap()
        );
    }

    #[tokio::test]
    async fn test_response_with_custom_status() {
        let req = request("RustServer");

        let mut dst = Vec::<u8>::new();
        let mut writer = TestClient::new(&mut dst);
        let resp =
            HttpResponder::<'_, '_, TestClient, HttpResponderStateInit>::new(&req, &mut writer);

        resp.with_status(HttpStatusCode::Other(401))
            .await
            .unwrap()
            .no_body()
            .await
            .unwrap();

        let expected = "HTTP/1.1 401\r
Server: RustServer\r
\r
"
        .as_bytes();

        assert_eq!(
            &dst,
            expected,
            "oops, got:\n{}",
            str::from_utf8(&dst).unwrap()
        );
    }

    #[tokio::test]
    async fn test_response_invalid_custom_status() {
        let req = request("RustServer");

        let mut dst = Vec::<u8>::new();
        let mut writer = TestClient::new(&mut dst);
        let resp =
            HttpResponder::<'_, '_, TestClient, HttpResponderStateInit>::new(&req, &mut writer);

        assert_eq!(
            resp.with_status(HttpStatusCode::Other(42)).await.err(),
            Some(WebError::ProtocolError("invalid status code"))
        );
    }

    #[tokio::test]
    async fn test_response_header_shortcut_implies_ok_status() {
        let req = request("FancyServer");

        let mut dst = Vec::<u8>::new();
        let mut writer = TestClient::new(&mut dst);
        let resp =
            HttpResponder::<'_, '_, TestClient, HttpResponderStateInit>::new(&req, &mut writer);

        resp.with_header(ResponseHeader::ContentType("application/json"))
            .await
            .unwrap()
            .with_header(ResponseHeader::Other("Foo", "Bar"))
            .await
            .unwrap()
            .no_body()
            .await
            .unwrap();

        let expected = "HTTP/1.1 200 OK\r
Server: FancyServer\r
Content-Type: application/json\r
Foo: Bar\r
\r
"
        .as_bytes();

        assert_eq!(
            &dst,
            expected,
            "oops, got:\n{}",
            str::from_utf8(&dst).unwrap()
        );
    }
}
