use futures_util::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::Response;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

/// Unified response body: either empty or a chunked file stream. The sink
/// pulls chunks until exhaustion; dropping the body drops the reader and
/// with it the file handle, on every exit path.
pub type ResponseBody = UnsyncBoxBody<Bytes, std::io::Error>;

fn empty_body() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

fn stream_body<R>(reader: R) -> ResponseBody
where
    R: AsyncRead + Send + Unpin + 'static,
{
    StreamBody::new(ReaderStream::new(reader).map_ok(Frame::data)).boxed_unsync()
}

/// 200 with the body piped from `reader`; Content-Type only when the
/// extension was mapped.
pub fn build_stream_response<R>(reader: R, content_type: Option<&str>) -> Response<ResponseBody>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    let mut builder = Response::builder().status(200);
    if let Some(content_type) = content_type {
        builder = builder.header("Content-Type", content_type);
    }
    builder
        .body(stream_body(reader))
        .expect("Failed to build stream response")
}

pub fn build_redirect_response(target: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(302)
        .header("Location", target)
        .body(empty_body())
        .expect("Failed to build redirect response")
}

pub fn build_404_response() -> Response<ResponseBody> {
    Response::builder()
        .status(404)
        .body(empty_body())
        .expect("Failed to build 404 response")
}

pub fn build_500_response() -> Response<ResponseBody> {
    Response::builder()
        .status(500)
        .body(empty_body())
        .expect("Failed to build 500 response")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn stream_response_pipes_reader_bytes() {
        let response = build_stream_response(Cursor::new(b"chunked".to_vec()), Some("text/html"));

        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "text/html"
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"chunked");
    }

    #[tokio::test]
    async fn stream_response_without_mapping_sets_no_content_type() {
        let response = build_stream_response(Cursor::new(Vec::new()), None);

        assert_eq!(response.status(), 200);
        assert!(response.headers().get("Content-Type").is_none());
    }

    #[tokio::test]
    async fn error_responses_carry_empty_bodies() {
        for response in [build_404_response(), build_500_response()] {
            let body = response.into_body().collect().await.unwrap().to_bytes();
            assert!(body.is_empty());
        }
    }

    #[tokio::test]
    async fn redirect_sets_location_and_no_body() {
        let response = build_redirect_response("/home");

        assert_eq!(response.status(), 302);
        assert_eq!(response.headers().get("Location").unwrap(), "/home");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }
}
