use crate::config::Config;
use hyper::{Method, StatusCode, Uri, Version};
use std::net::SocketAddr;

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    println!("======================================");
    println!("Async file server started successfully");
    println!("Listening on: http://{}", addr);
    println!("Log level: {}", config.logging.level);
    println!("Public root: {}", config.dir.public_root);
    println!("Home page: {}", config.pages.home_html);
    println!("Controller page: {}", config.pages.controller_html);
    if let Some(workers) = config.server.workers {
        println!("Worker threads: {}", workers);
    }
    println!("Using Tokio runtime for concurrency");
    println!("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    println!("[Connection] Accepted from: {}", peer_addr);
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    eprintln!("[Error] Failed to serve connection: {:?}", err);
}

pub fn log_request(method: &Method, uri: &Uri, version: Version) {
    println!("[{}] [Request] {} {} {:?}", timestamp(), method, uri, version);
}

pub fn log_response(status: StatusCode) {
    println!("[{}] [Response] {}", timestamp(), status);
}

pub fn log_warning(msg: &str) {
    println!("[{}] [Warn] {}", timestamp(), msg);
}

pub fn log_error(msg: &str) {
    eprintln!("[{}] [Error] {}", timestamp(), msg);
}
