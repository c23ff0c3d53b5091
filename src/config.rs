use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub dir: DirConfig,
    pub pages: PagesConfig,
    pub location: LocationConfig,
    #[serde(default = "default_content_types")]
    pub content_types: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
}

// Every statically served file lives under public_root
#[derive(Debug, Deserialize, Clone)]
pub struct DirConfig {
    pub public_root: String,
}

/// Page files, resolved relative to the public root.
#[derive(Debug, Deserialize, Clone)]
pub struct PagesConfig {
    pub home_html: String,
    pub controller_html: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocationConfig {
    pub home: String,
}

/// Extension (with leading dot) to MIME type, for the Content-Type header.
fn default_content_types() -> HashMap<String, String> {
    [
        (".html", "text/html"),
        (".css", "text/css"),
        (".js", "text/javascript"),
        (".json", "application/json"),
        (".txt", "text/plain"),
        (".png", "image/png"),
        (".jpg", "image/jpeg"),
        (".jpeg", "image/jpeg"),
        (".gif", "image/gif"),
        (".svg", "image/svg+xml"),
        (".mp3", "audio/mpeg"),
        (".mp4", "video/mp4"),
    ]
    .into_iter()
    .map(|(ext, mime)| (ext.to_string(), mime.to_string()))
    .collect()
}

impl Config {
    /// Load once at startup. The resulting value is shared read-only for
    /// the process lifetime; nothing reloads or mutates it afterwards.
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("SERVER"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("dir.public_root", "public")?
            .set_default("pages.home_html", "home/index.html")?
            .set_default("pages.controller_html", "controller/index.html")?
            .set_default("location.home", "/home")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {}", e))
    }

    /// MIME type for a resolver-produced extension, if the table knows it.
    pub fn content_type_for(&self, extension: &str) -> Option<&str> {
        self.content_types.get(extension).map(String::as_str)
    }
}
