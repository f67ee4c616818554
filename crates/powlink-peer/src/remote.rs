use std::time::Duration;

use powlink_engine::Trytes;
use url::Url;

use crate::client::{PowClient, PowInfo};
use crate::error::{ClientError, Result};
use crate::selector::{classify, Endpoint};

/// The four operations a remote proof-of-work bridge exposes.
///
/// The adapter itself is an external dependency; this crate only selects it
/// and forwards calls.
pub trait RemoteAdapter: Send + Sync {
    fn server_version(&self) -> Result<String>;
    fn engine_type(&self) -> Result<String>;
    fn engine_version(&self) -> Result<String>;
    fn do_work(&self, input: &Trytes, difficulty: u8) -> Result<Trytes>;
}

enum Backend {
    Local(PowClient),
    Remote(Box<dyn RemoteAdapter>),
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Local(client) => f.debug_tuple("Local").field(client).finish(),
            Backend::Remote(_) => f.debug_tuple("Remote").finish(),
        }
    }
}

/// Uniform front over local-socket and remote-bridge brokers.
///
/// The endpoint string decides the path: a URL with a non-empty host goes
/// to the remote adapter, anything else to the local client codec.
#[derive(Debug)]
pub struct PowDriver {
    backend: Backend,
}

impl PowDriver {
    /// Build a driver for `endpoint` with no remote adapter installed;
    /// remote endpoints fail with [`ClientError::RemoteUnsupported`].
    pub fn new(
        endpoint: &str,
        write_timeout: Option<Duration>,
        read_timeout: Option<Duration>,
    ) -> Result<Self> {
        Self::with_remote_factory(endpoint, write_timeout, read_timeout, |_| None)
    }

    /// Build a driver, asking `factory` for an adapter when the endpoint
    /// classifies as remote.
    pub fn with_remote_factory(
        endpoint: &str,
        write_timeout: Option<Duration>,
        read_timeout: Option<Duration>,
        factory: impl FnOnce(&Url) -> Option<Box<dyn RemoteAdapter>>,
    ) -> Result<Self> {
        let backend = match classify(endpoint) {
            Endpoint::Local(path) => Backend::Local(
                PowClient::new(path)
                    .with_write_timeout(write_timeout)
                    .with_read_timeout(read_timeout),
            ),
            Endpoint::Remote(url) => match factory(&url) {
                Some(adapter) => Backend::Remote(adapter),
                None => return Err(ClientError::RemoteUnsupported(url.to_string())),
            },
        };
        Ok(Self { backend })
    }

    pub fn server_version(&self) -> Result<String> {
        match &self.backend {
            Backend::Local(client) => client.server_version(),
            Backend::Remote(adapter) => adapter.server_version(),
        }
    }

    pub fn engine_type(&self) -> Result<String> {
        match &self.backend {
            Backend::Local(client) => client.engine_type(),
            Backend::Remote(adapter) => adapter.engine_type(),
        }
    }

    pub fn engine_version(&self) -> Result<String> {
        match &self.backend {
            Backend::Local(client) => client.engine_version(),
            Backend::Remote(adapter) => adapter.engine_version(),
        }
    }

    pub fn pow_info(&self) -> Result<PowInfo> {
        Ok(PowInfo {
            server_version: self.server_version()?,
            engine_type: self.engine_type()?,
            engine_version: self.engine_version()?,
        })
    }

    pub fn do_work(&self, input: &Trytes, difficulty: u8) -> Result<Trytes> {
        match &self.backend {
            Backend::Local(client) => client.do_work(input, difficulty),
            Backend::Remote(adapter) => adapter.do_work(input, difficulty),
        }
    }

    /// True when the remote path was selected.
    pub fn is_remote(&self) -> bool {
        matches!(self.backend, Backend::Remote(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubAdapter;

    impl RemoteAdapter for StubAdapter {
        fn server_version(&self) -> Result<String> {
            Ok("9.9.9".to_string())
        }

        fn engine_type(&self) -> Result<String> {
            Ok("RemotePow".to_string())
        }

        fn engine_version(&self) -> Result<String> {
            Ok("bridge-1".to_string())
        }

        fn do_work(&self, _input: &Trytes, _difficulty: u8) -> Result<Trytes> {
            Ok(Trytes::try_from("REMOTE9NONCE").unwrap())
        }
    }

    #[test]
    fn local_endpoint_selects_the_client_codec() {
        let driver = PowDriver::new("/tmp/powlink-driver-test.sock", None, None).unwrap();
        assert!(!driver.is_remote());
    }

    #[test]
    fn remote_endpoint_without_adapter_is_unsupported() {
        let err = PowDriver::new("http://pow.example.com", None, None).unwrap_err();
        assert!(matches!(err, ClientError::RemoteUnsupported(_)));
    }

    #[test]
    fn remote_endpoint_dispatches_to_the_adapter() {
        let driver = PowDriver::with_remote_factory(
            "http://pow.example.com",
            None,
            None,
            |_| Some(Box::new(StubAdapter)),
        )
        .unwrap();

        assert!(driver.is_remote());
        assert_eq!(driver.server_version().unwrap(), "9.9.9");

        let info = driver.pow_info().unwrap();
        assert_eq!(info.engine_type, "RemotePow");

        let input = Trytes::try_from("ABC").unwrap();
        let nonce = driver.do_work(&input, 5).unwrap();
        assert_eq!(nonce.as_str(), "REMOTE9NONCE");
    }
}
