use std::path::PathBuf;

use url::Url;

/// Where an endpoint string points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// A local byte-stream path.
    Local(PathBuf),
    /// A URL with a non-empty host, served by a remote adapter.
    Remote(Url),
}

/// Classify a destination string.
///
/// Anything that does not parse as a URL with a non-empty host is a local
/// socket path; unparsable strings are local, never an error.
pub fn classify(endpoint: &str) -> Endpoint {
    match Url::parse(endpoint) {
        Ok(url) if url.host_str().is_some_and(|host| !host.is_empty()) => Endpoint::Remote(url),
        _ => Endpoint::Local(PathBuf::from(endpoint)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_local() {
        for endpoint in [
            "/tmp/powlink.sock",
            "./broker.sock",
            "broker.sock",
            "/var/run/powlink/endpoint",
        ] {
            assert_eq!(
                classify(endpoint),
                Endpoint::Local(PathBuf::from(endpoint)),
                "{endpoint}"
            );
        }
    }

    #[test]
    fn http_urls_are_remote() {
        for endpoint in [
            "http://pow.example.com:14265",
            "https://pow.example.com/api",
        ] {
            assert!(
                matches!(classify(endpoint), Endpoint::Remote(_)),
                "{endpoint}"
            );
        }
    }

    #[test]
    fn hostless_urls_are_local() {
        // Scheme-only strings without a host keep the permissive local
        // behavior of the selector.
        for endpoint in ["unix:///tmp/powlink.sock", "file:///tmp/powlink.sock"] {
            assert!(
                matches!(classify(endpoint), Endpoint::Local(_)),
                "{endpoint}"
            );
        }
    }

    #[test]
    fn empty_string_is_local() {
        assert_eq!(classify(""), Endpoint::Local(PathBuf::from("")));
    }
}
