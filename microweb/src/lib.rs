#![no_std]

//! A small HTTP serving layer for microcontroller targets.
//!
//! The crate talks to the network through the [`embedded_io_async`] traits,
//! so it runs over any TCP socket implementation (or an in-memory mock).
//!
//! Usage:
//! Implement [`server::RequestHandler`] for a type holding whatever state the
//! handlers need, hand it to [`server::HttpServer`], then call `serve` with
//! each accepted connection and a receive buffer. Inside a handler, request
//! query parameters are available through [`query::QueryParams`] and JSON
//! status replies through [`status`].

mod ascii;
pub mod header;
pub mod query;
pub mod request;
pub mod response;
pub mod server;
pub mod status;

use embedded_io_async::Write;

pub(crate) trait HttpWrite {
    async fn write<T: Write>(self, writer: &mut T) -> Result<(), WebError>;
}

#[derive(Debug, defmt::Format, PartialEq)]
pub enum WebError {
    Incomplete,
    Disconnected,
    ProtocolError(&'static str),
    NetworkError(&'static str),
    UnsupportedRequest(&'static str),
}
