use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use socket2::{Domain, Protocol, Socket, Type};
use std::sync::Arc;
use tokio::net::TcpListener;

mod config;
mod handler;
mod logger;
mod resolver;
mod response;

use handler::Router;
use resolver::FileResolver;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;

    // Tokio runtime sized from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        println!("[CONFIG] Using {} worker threads", workers);
    } else {
        println!("[CONFIG] Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = create_reusable_listener(addr)?;

    let cfg = Arc::new(cfg);
    let router = Arc::new(Router::new(
        FileResolver::new(cfg.dir.public_root.clone()),
        Arc::clone(&cfg),
    ));

    logger::log_server_start(&addr, &cfg);

    // Request futures are not Send (each file stream stays with its
    // connection), so connections run on a LocalSet via spawn_local.
    let local = tokio::task::LocalSet::new();
    local.run_until(serve(listener, router, cfg)).await
}

async fn serve(
    listener: TcpListener,
    router: Arc<Router<FileResolver>>,
    cfg: Arc<config::Config>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                if cfg.logging.access_log {
                    logger::log_connection_accepted(&peer_addr);
                }
                handle_connection(stream, Arc::clone(&router), Arc::clone(&cfg));
            }
            Err(e) => {
                eprintln!("[Error] Failed to accept connection: {}", e);
            }
        }
    }
}

/// Handle a single connection in a spawned task.
///
/// Wraps the TCP stream in `TokioIo`, configures HTTP/1.1 keep-alive,
/// serves it with the router, and applies the configured timeout.
fn handle_connection(
    stream: tokio::net::TcpStream,
    router: Arc<Router<FileResolver>>,
    cfg: Arc<config::Config>,
) {
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);

        let keep_alive_timeout = cfg.performance.keep_alive_timeout;
        let timeout_duration = std::time::Duration::from_secs(std::cmp::max(
            cfg.performance.read_timeout,
            cfg.performance.write_timeout,
        ));

        let mut builder = http1::Builder::new();
        if keep_alive_timeout > 0 {
            builder.keep_alive(true);
        }

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let router = Arc::clone(&router);
                async move { router.handle(req).await }
            }),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                eprintln!(
                    "[Warn] Connection timeout after {} seconds",
                    timeout_duration.as_secs()
                );
            }
        }
    });
}

/// Create a TcpListener with SO_REUSEPORT and SO_REUSEADDR enabled, so a
/// freshly restarted server can rebind without waiting out TIME_WAIT.
fn create_reusable_listener(addr: std::net::SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_port(true)?;
    socket.set_reuse_address(true)?;

    // Non-blocking mode for async compatibility
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;
    socket.listen(128)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
