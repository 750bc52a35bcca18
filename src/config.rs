/// Default address of the third-party dataset shown in the viewer.
pub const DEFAULT_DATASET_URL: &str =
    "https://noman-ansarii.github.io/iCloud.com/iCloud.com%20(4).json";

/// Configuration for the record server
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on (0 lets the OS pick one)
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

impl ServerConfig {
    /// Build a configuration from positional arguments `[host] [port]`
    ///
    /// Missing or unparsable values fall back to the defaults.
    ///
    /// # Arguments
    /// * `args` - Arguments after the program name
    pub fn from_args(args: &[String]) -> Self {
        let mut config = Self::default();

        if let Some(host) = args.first() {
            config.host = host.clone();
        }
        if let Some(port) = args.get(1) {
            config.port = port.parse().unwrap_or(config.port);
        }

        config
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where the client finds the record server and the third-party dataset
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub dataset_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            dataset_url: DEFAULT_DATASET_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Point the client at a different record server, keeping the dataset URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn defaults_match_demo_backend() {
        let config = ServerConfig::default();
        assert_eq!(config.address(), "127.0.0.1:3001");
    }

    #[test]
    fn positional_overrides() {
        let config = ServerConfig::from_args(&args(&["0.0.0.0", "8080"]));
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    #[test]
    fn bad_port_falls_back() {
        let config = ServerConfig::from_args(&args(&["localhost", "eighty"]));
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 3001);
    }

    #[test]
    fn client_base_url_override_keeps_dataset() {
        let config = ClientConfig::with_base_url("http://127.0.0.1:9000");
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.dataset_url, DEFAULT_DATASET_URL);
    }
}
