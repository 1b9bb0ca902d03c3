use embedded_io_async::{Error, ErrorKind, Read, Write};

use crate::WebError;
use crate::request::HttpRequest;
use crate::response::{HttpResponder, HttpResponderStateInit};

/// One request in, one response out. Dispatch on `req.method` / `req.path`;
/// this takes the place of a per-URI registration table, so a handler type
/// is the whole routing surface of a server.
pub trait RequestHandler {
    fn handle_request<'client, 'buff, C: Read + Write + 'client>(
        &self,
        req: HttpRequest<'buff>,
        resp: HttpResponder<'buff, 'client, C, HttpResponderStateInit>,
    ) -> impl Future<Output = Result<(), WebError>>;
}

pub struct HttpServer<H> {
    handler: H,
}

impl<H> HttpServer<H>
where
    H: RequestHandler,
{
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    /// Drive one client connection to completion, serving requests until the
    /// peer disconnects. `http_buff` must be large enough for a whole
    /// request including its body; reads accumulate into it until a complete
    /// request parses.
    pub async fn serve<C>(&self, client: &mut C, http_buff: &mut [u8]) -> Result<(), WebError>
    where
        C: Read + Write,
    {
        'client: loop {
            let mut offset = 0;
            loop {
                match client.read(&mut http_buff[offset..]).await {
                    Ok(0) => break 'client,
                    Ok(n) => {
                        offset += n;
                        match HttpRequest::try_from(&http_buff[..offset]) {
                            Ok(request) => {
                                let resp = HttpResponder::<'_, '_, _, HttpResponderStateInit>::new(
                                    &request, client,
                                );
                                self.handler.handle_request(request, resp).await?;
                                break;
                            }
                            Err(WebError::Incomplete) => continue,
                            Err(e) => return Err(e),
                        };
                    }
                    Err(e) if e.kind() == ErrorKind::ConnectionReset => break 'client,
                    Err(_) => return Err(WebError::NetworkError("unexpected network error")),
                };
            }
        }

        Ok(())
    }
}
