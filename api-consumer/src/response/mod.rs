//! Response normalization.
//!
//! Every dispatch ends in a [`ResponseHandler`], which turns a raw response
//! (or the error that prevented one) into a uniform [`RequestResult`]:
//! either the parsed JSON payload or an [`ErrorPayload`].

mod handler;
mod log;
mod result;

pub use handler::{ParsePolicy, RawResponse, ResponseHandler, PARSE_CONTEXT};
pub use log::{LogSink, TracingLogSink};
pub use result::{ErrorPayload, RequestResult};
