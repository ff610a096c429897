use std::env;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
    pub port: u16,
    pub output_dir: PathBuf,
    pub public_url_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1".into(),
            port: 5000,
            output_dir: PathBuf::from("./static/output"),
            public_url_prefix: "/static/output".into(),
        }
    }
}

impl ServerConfig {
    pub fn get_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }

    pub fn get_http_addr(&self) -> String {
        format!("http://{}:{}", self.addr, self.port)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.get_addr().parse()
    }

    /// Public URL under which a file in `output_dir` is served.
    pub fn public_url(&self, filename: &str) -> String {
        format!("{}/{}", self.public_url_prefix.trim_end_matches('/'), filename)
    }

    pub fn init_from_env(&mut self) -> Result<(), String> {
        self.addr = env::var("SERVER_ADDR")
            .map_err(|_| "SERVER_ADDR not set in environment".to_string())?;

        self.port = env::var("SERVER_PORT")
            .map_err(|_| "SERVER_PORT not set in environment".to_string())?
            .parse::<u16>()
            .map_err(|_| "SERVER_PORT is not a valid u16".to_string())?;

        if let Ok(dir) = env::var("OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }

        if let Ok(prefix) = env::var("PUBLIC_URL_PREFIX") {
            if !prefix.starts_with('/') || prefix.trim_end_matches('/').is_empty() {
                return Err("PUBLIC_URL_PREFIX must be a path below '/'".to_string());
            }
            self.public_url_prefix = prefix;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url() {
        let mut config = ServerConfig::default();
        assert_eq!(
            config.public_url("thumbnail_1.png"),
            "/static/output/thumbnail_1.png"
        );

        config.public_url_prefix = "/media/".into();
        assert_eq!(config.public_url("a.png"), "/media/a.png");
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.get_http_addr(), "http://127.0.0.1:5000");
        assert!(config.get_socket_addr().is_ok());
    }
}
