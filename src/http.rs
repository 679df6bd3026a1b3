//! The HTTP server, handler and routes.
//!
//! This contains fairly little business logic: it sets up the `hyper` server,
//! routes the two `/graphql` paths and catches panics. The actual work
//! happens in the resolvers of the `api` module.

use bytes::Bytes;
use futures::FutureExt;
use http_body_util::{BodyExt, Full};
use hyper::{
    Method, StatusCode,
    body::Incoming,
    service::service_fn,
};
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto,
};
use std::{
    convert::Infallible,
    future::Future,
    net::{IpAddr, SocketAddr},
    panic::AssertUnwindSafe,
    sync::Arc,
    time::Instant,
};
use tokio::net::TcpListener;

use crate::{api, auth::Caller, config::Config, prelude::*, store::Store};


/// HTTP server configuration.
#[derive(Debug, Clone, confique::Config)]
pub(crate) struct HttpConfig {
    /// The TCP port the HTTP server should listen on.
    #[config(default = 3000)]
    pub(crate) port: u16,

    /// The bind address to listen on.
    #[config(default = "127.0.0.1")]
    pub(crate) address: IpAddr,
}


// Our requests and responses always use these body types.
type Response<T = Full<Bytes>> = hyper::Response<T>;
type Request<T = Incoming> = hyper::Request<T>;


/// Context that the request handler has access to.
struct Context {
    api_root: Arc<api::RootNode>,
    store: Arc<dyn Store>,
    config: Arc<Config>,
}


/// Starts the HTTP server. The future returned by this function must be
/// awaited to actually run it.
pub(crate) async fn serve(
    config: Config,
    api_root: api::RootNode,
    store: Arc<dyn Store>,
) -> Result<()> {
    let http_config = config.http.clone();
    let ctx = Arc::new(Context {
        api_root: Arc::new(api_root),
        store,
        config: Arc::new(config),
    });

    let addr = SocketAddr::new(http_config.address, http_config.port);
    let listener = TcpListener::bind(addr).await
        .with_context(|| format!("failed to bind to {addr}"))?;
    info!("Listening on http://{}", addr);

    loop {
        let (stream, _) = listener.accept().await.context("failed to accept connection")?;
        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move {
            let service = service_fn(move |req| {
                handle_internal_errors(handle(req, Arc::clone(&ctx)))
            });
            let result = auto::Builder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(stream), service)
                .await;
            if let Err(e) = result {
                debug!("Error serving HTTP connection: {e}");
            }
        });
    }
}

/// This just wraps another future and catches all panics that might occur
/// when resolving/polling that given future. This ensures that we always
/// answer with 500 instead of just crashing the thread and closing the
/// connection.
async fn handle_internal_errors(
    future: impl Future<Output = Response>,
) -> Result<Response, Infallible> {
    // The `AssertUnwindSafe` is unfortunately necessary. What we are
    // basically saying here is: "if the future panics, the remaining
    // application state is not broken, it is safe to continue".
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(response) => Ok(response),
        Err(panic) => {
            // The `panic` information is just an `Any` object representing
            // the value the panic was invoked with. For most panics (which
            // use `panic!` like `println!`), this is either `&str` or
            // `String`.
            let msg = panic.downcast_ref::<String>()
                .map(|s| s.as_str())
                .or(panic.downcast_ref::<&str>().map(|s| *s));

            match msg {
                Some(msg) => error!("INTERNAL SERVER ERROR: HTTP handler panicked: '{}'", msg),
                None => error!("INTERNAL SERVER ERROR: HTTP handler panicked"),
            }

            Ok(internal_server_error())
        }
    }
}

/// This is the main HTTP entry point, called for each incoming request.
async fn handle(req: Request, ctx: Arc<Context>) -> Response {
    trace!(
        "Incoming HTTP {:?} request to '{}{}'",
        req.method(),
        req.uri().path(),
        req.uri().query().map(|q| format!("?{}", q)).unwrap_or_default(),
    );

    let method = req.method().clone();
    let path = req.uri().path().trim_end_matches('/');

    match path {
        // The GraphQL endpoint. This is the only path for which POST is
        // allowed.
        "/graphql" if method == Method::POST => handle_api(req, &ctx).await,

        // The interactive GraphQL explorer/IDE. We keep this in production as
        // it does not expose any information that isn't already exposed by
        // the API itself.
        "/graphql" if method == Method::GET || method == Method::HEAD => graphiql(),

        // Apart from the above, we only support GET and HEAD requests. All
        // others will result in 405.
        _ if method != Method::GET && method != Method::HEAD => {
            text_response(StatusCode::METHOD_NOT_ALLOWED, "405 Method not allowed")
        }

        _ => text_response(StatusCode::NOT_FOUND, "404 Not found"),
    }
}

/// Handles a request to `POST /graphql`.
async fn handle_api(req: Request, ctx: &Context) -> Response {
    let before = Instant::now();

    let caller = Caller::from_headers(req.headers(), &ctx.config.auth);
    trace!("Caller: {:?}", caller);

    let body = match req.into_body().collect().await {
        Ok(body) => body.to_bytes(),
        Err(e) => {
            warn!("Failed to read body of API request: {e}");
            return text_response(StatusCode::BAD_REQUEST, "could not read request body");
        }
    };

    let gql_request = match serde_json::from_slice::<juniper::http::GraphQLRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!("Rejecting malformed GraphQL request: {e}");
            return text_response(StatusCode::BAD_REQUEST, "invalid GraphQL request body");
        }
    };

    let api_context = api::Context::new(Arc::clone(&ctx.store), caller);
    let gql_response = gql_request.execute(&ctx.api_root, &api_context).await;
    debug!("Finished /graphql request in {:.2?}", before.elapsed());

    // Per convention, requests that failed before execution get a 400.
    let status = if gql_response.is_ok() { StatusCode::OK } else { StatusCode::BAD_REQUEST };
    match serde_json::to_vec(&gql_response) {
        Ok(json) => {
            Response::builder()
                .status(status)
                .header("Content-Type", "application/json")
                .body(Full::from(json))
                .unwrap()
        }
        Err(e) => {
            error!("Failed to serialize GraphQL response: {e}");
            internal_server_error()
        }
    }
}

/// Serves the interactive GraphiQL console.
fn graphiql() -> Response {
    let html = juniper::http::graphiql::graphiql_source("/graphql", None);
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=UTF-8")
        .body(Full::from(html))
        .unwrap()
}

fn text_response(status: StatusCode, msg: &'static str) -> Response {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=UTF-8")
        .body(Full::from(msg))
        .unwrap()
}

fn internal_server_error() -> Response {
    text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}
