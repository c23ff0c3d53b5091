use crate::config::Config;
use crate::logger;
use crate::resolver::{FetchError, FileStream, StreamSource};
use crate::response::{self, ResponseBody};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

/// Per-request dispatch over a fixed decision table, with one failure
/// boundary translating resolver errors into HTTP statuses.
///
/// Constructed once at startup with its filesystem collaborator and the
/// immutable configuration; shared read-only across requests.
pub struct Router<S> {
    resolver: S,
    config: Arc<Config>,
}

impl<S: StreamSource> Router<S> {
    pub fn new(resolver: S, config: Arc<Config>) -> Self {
        Self { resolver, config }
    }

    pub async fn handle<B>(&self, req: Request<B>) -> Result<Response<ResponseBody>, Infallible> {
        let access_log = self.config.logging.access_log;
        if access_log {
            logger::log_request(req.method(), req.uri(), req.version());
        }

        let method = req.method().clone();
        let path = req.uri().path().to_owned();

        // Single failure boundary: no branch below catches for itself.
        let response = match self.route(&method, &path).await {
            Ok(response) => response,
            Err(error) => Self::translate_error(&error, &method, &path),
        };

        if access_log {
            logger::log_response(response.status());
        }
        Ok(response)
    }

    /// The route table, evaluated in order. Exactly one branch fires per
    /// request; every branch is terminal.
    async fn route(&self, method: &Method, path: &str) -> Result<Response<ResponseBody>, FetchError> {
        match (method, path) {
            (&Method::GET, "/") => Ok(response::build_redirect_response(&self.config.location.home)),

            // The two named pages stream without an explicit Content-Type;
            // the transport default covers the static HTML.
            (&Method::GET, "/home") => {
                let FileStream { stream, .. } =
                    self.resolver.open_stream(&self.config.pages.home_html).await?;
                Ok(response::build_stream_response(stream, None))
            }
            (&Method::GET, "/controller") => {
                let FileStream { stream, .. } = self
                    .resolver
                    .open_stream(&self.config.pages.controller_html)
                    .await?;
                Ok(response::build_stream_response(stream, None))
            }

            // Generic static lookup: the path itself names a file under the
            // public root. An unmapped extension is not an error; it just
            // streams without a Content-Type header.
            (&Method::GET, _) => {
                let FileStream { stream, extension } = self.resolver.open_stream(path).await?;
                let content_type = self.config.content_type_for(&extension);
                Ok(response::build_stream_response(stream, content_type))
            }

            _ => Ok(response::build_404_response()),
        }
    }

    fn translate_error(error: &FetchError, method: &Method, path: &str) -> Response<ResponseBody> {
        match error {
            FetchError::NotFound(_) => {
                logger::log_warning(&format!("Asset not found: {method} {path} ({error})"));
                response::build_404_response()
            }
            FetchError::Io(_) => {
                logger::log_error(&format!("Caught error serving {method} {path}: {error}"));
                response::build_500_response()
            }
        }
    }
}
