use core::mem::discriminant;
use core::str;

use defmt::Format;

use crate::WebError;
use crate::ascii::{COLON, CR, LF, SP};
use crate::header::RequestHeader;
use crate::query::QuerySource;

const GET: &[u8] = "GET".as_bytes();
const POST: &[u8] = "POST".as_bytes();
const PUT: &[u8] = "PUT".as_bytes();
const PATCH: &[u8] = "PATCH".as_bytes();
const DELETE: &[u8] = "DELETE".as_bytes();
const OPTIONS: &[u8] = "OPTIONS".as_bytes();
const HEAD: &[u8] = "HEAD".as_bytes();

#[derive(Format, PartialEq, Debug)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
    OPTIONS,
    HEAD,
}

impl TryFrom<&[u8]> for HttpMethod {
    type Error = &'static str;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        match value {
            GET => Ok(Self::GET),
            POST => Ok(Self::POST),
            PUT => Ok(Self::PUT),
            PATCH => Ok(Self::PATCH),
            DELETE => Ok(Self::DELETE),
            OPTIONS => Ok(Self::OPTIONS),
            HEAD => Ok(Self::HEAD),
            _ => Err("unknown http method"),
        }
    }
}

/// A request parsed in place from the receive buffer. `path` is the request
/// target up to the first `?`; `query` is everything after it, or the empty
/// string when the target carries no query component.
#[derive(Debug, Format)]
pub struct HttpRequest<'a> {
    pub method: HttpMethod,
    pub path: &'a str,
    pub query: &'a str,
    pub host: &'a str,
    pub content_type: Option<&'a str>,
    pub content_length: usize,
    pub body: Option<&'a [u8]>,
    pub(crate) header_slice: Option<&'a [u8]>,
}

impl<'a> TryFrom<&'a [u8]> for HttpRequest<'a> {
    type Error = WebError;

    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        let len = value.len();
        if len < 15 {
            // cant be a complete request...
            return Err(WebError::Incomplete);
        }

        Self::parse(value)
    }
}

impl<'a> HttpRequest<'a> {
    pub fn contains_complete_http_header(data: &[u8]) -> Option<usize> {
        let len = data.len();

        for i in 1..len + 1 {
            if let [.., CR, LF, CR, LF] = data[..i] {
                return Some(i);
            }
        }

        None
    }

    pub fn parse(data: &'a [u8]) -> Result<Self, WebError> {
        // ensure upfront we have valid utf8 so later we can just unwrap str conversions
        if str::from_utf8(data).is_err() {
            return Err(WebError::ProtocolError("http request is not valid utf8"));
        }

        let mut req = HttpRequest {
            method: HttpMethod::GET,
            path: "",
            query: "",
            host: "unspecified",
            content_type: None,
            content_length: 0,
            body: None,
            header_slice: None,
        };

        let mut request_line_done = false;
        let mut http_headers_done = false;
        let mut header_start_offset = 0usize;
        let mut header_end_offset = 0usize;

        let mut line_start = 0;
        for i in 0..=data.len() {
            if let [CR, LF] = &data[line_start..i] {
                // a \r\n imediately after a line\r\n indicates the end of the headers
                http_headers_done = true;

                if req.content_length > 0 {
                    req.body = data.get(i..i + req.content_length);
                    if req.body.is_none() {
                        return Err(WebError::Incomplete);
                    }
                }

                break;
            }

            if let [line @ .., CR, LF] = &data[line_start..i] {
                if !request_line_done {
                    req.parse_request_line(line)?;
                    request_line_done = true;
                } else {
                    req.parse_header_line(line)?;
                    if header_start_offset == 0 {
                        header_start_offset = line_start;
                    }
                    header_end_offset = i;
                }
                line_start = i;
            }
        }

        if header_start_offset != 0 && header_end_offset != 0 {
            req.header_slice = Some(&data[header_start_offset..header_end_offset])
        }

        if !http_headers_done {
            return Err(WebError::Incomplete);
        }

        if req.path.is_empty() {
            return Err(WebError::ProtocolError("malformed HTTP request"));
        }

        Ok(req)
    }

    fn parse_request_line(&mut self, data: &'a [u8]) -> Result<(), WebError> {
        for (i, word) in data.splitn(3, |b: &u8| *b == SP).enumerate() {
            match i {
                0 => match HttpMethod::try_from(word) {
                    Ok(m) => self.method = m,
                    Err(_) => return Err(WebError::ProtocolError("unknown http method")),
                },
                1 => {
                    // the target splits at the first '?' into path and raw query
                    let target = str::from_utf8(word).unwrap();
                    match target.split_once('?') {
                        Some((path, query)) => {
                            self.path = path;
                            self.query = query;
                        }
                        None => self.path = target,
                    }
                }
                2 => {}
                _ => return Err(WebError::ProtocolError("malformed http request")),
            };
        }

        Ok(())
    }

    fn parse_header_line(&mut self, data: &'a [u8]) -> Result<(), WebError> {
        let mut header: Option<&'a str> = None;
        let mut value: Option<&'a str> = None;

        for (i, word) in data.splitn(2, |b: &u8| *b == COLON).enumerate() {
            match i {
                0 => {
                    header = Some(str::from_utf8(word).unwrap().trim());
                }
                1 => {
                    value = Some(str::from_utf8(word).unwrap().trim());
                }
                _ => return Err(WebError::ProtocolError("malformed http request")),
            }
        }

        if let Some(header) = header
            && let Some(value) = value
        {
            match RequestHeader::try_from((header, value)) {
                Ok(h) => {
                    if let RequestHeader::ContentLength(l) = h {
                        self.content_length = l;
                        return Ok(());
                    }
                    if let RequestHeader::Host(s) = h {
                        self.host = s;
                        return Ok(());
                    }
                    if let RequestHeader::ContentType(s) = h {
                        self.content_type = Some(s);
                        return Ok(());
                    }

                    return Ok(());
                }
                Err(None) => {
                    return Ok(());
                }
                Err(Some(e)) => {
                    return Err(WebError::ProtocolError(e));
                }
            }
        }

        Ok(())
    }

    fn resolve_header(&self, data: &'a [u8]) -> Result<Option<RequestHeader<'a>>, WebError> {
        let mut header: Option<&'a str> = None;
        let mut value: Option<&'a str> = None;

        for (i, word) in data.splitn(2, |b: &u8| *b == COLON).enumerate() {
            match i {
                0 => {
                    header = Some(str::from_utf8(word).unwrap().trim());
                }
                1 => {
                    value = Some(str::from_utf8(word).unwrap().trim());
                }
                _ => return Err(WebError::ProtocolError("malformed http request")),
            }
        }

        if let Some(header) = header
            && let Some(value) = value
        {
            match RequestHeader::try_from((header, value)) {
                Ok(h) => {
                    return Ok(Some(h));
                }
                Err(None) => {
                    return Ok(None);
                }
                Err(Some(e)) => {
                    return Err(WebError::ProtocolError(e));
                }
            }
        }

        Ok(None)
    }

    pub fn get_header(&self, header: RequestHeader<'_>) -> Option<RequestHeader<'a>> {
        if let Some(data) = self.header_slice {
            let mut line_start = 0;

            for i in 0..=data.len() {
                if let [line @ .., CR, LF] = &data[line_start..i] {
                    if let Ok(Some(h)) = self.resolve_header(line) {
                        match (header, h) {
                            (RequestHeader::Other(key1, _), RequestHeader::Other(key2, _))
                                if key1.eq_ignore_ascii_case(key2) =>
                            {
                                return Some(h);
                            }
                            (RequestHeader::Other(_, _), RequestHeader::Other(_, _)) => {}
                            (h1, h2) if discriminant(&h1) == discriminant(&h2) => {
                                return Some(h);
                            }
                            _ => {}
                        };
                    }
                    line_start = i;
                }
            }
        };

        None
    }
}

impl<'a> QuerySource for HttpRequest<'a> {
    fn query_len(&self) -> usize {
        self.query.len()
    }

    fn copy_query(&self, buf: &mut [u8]) -> Result<usize, &'static str> {
        let data = self.query.as_bytes();
        if buf.len() < data.len() {
            return Err("query does not fit the destination buffer");
        }

        buf[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }
}
