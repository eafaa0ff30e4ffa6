//! Network round-trip for one hop of the chain

use std::io::ErrorKind;
use std::time::{ Duration, Instant };

use async_trait::async_trait;
use tokio::io::{ AsyncReadExt, AsyncWriteExt };
use tokio::net::TcpStream;
use tracing::{ debug, warn };

use super::directory::ServerId;
use crate::config::{ MAX_RESPONSE_BYTES, TIMEOUT_SECONDS };
use crate::error::TransportError;

/// Raw answer of one round-trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub body: String,
    /// The body was cut short at the size cap or the read deadline
    pub truncated: bool,
}

impl From<String> for Response {
    fn from(body: String) -> Self {
        Self { body, truncated: false }
    }
}

/// Sends one query to one server. Implementations do not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, query: &str, server: &ServerId) -> Result<Response, TransportError>;
}

/// Plain WHOIS over TCP (RFC 3912)
#[derive(Debug, Clone)]
pub struct TcpTransport {
    timeout: Duration,
    max_response_bytes: usize,
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(TIMEOUT_SECONDS), MAX_RESPONSE_BYTES)
    }
}

impl TcpTransport {
    pub fn new(timeout: Duration, max_response_bytes: usize) -> Self {
        Self { timeout, max_response_bytes }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&self, query: &str, server: &ServerId) -> Result<Response, TransportError> {
        let address = server.address();
        debug!("Querying WHOIS server: {}", address);

        let mut stream = match tokio::time::timeout(self.timeout, TcpStream::connect(&address)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => {
                return Err(TransportError::ConnectionRefused(address));
            }
            Ok(Err(e)) => {
                return Err(TransportError::Protocol(format!("Cannot connect to {}: {}", address, e)));
            }
            Err(_) => {
                return Err(TransportError::Timeout(address));
            }
        };

        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY: {}", e);
        }

        // WHOIS expects a CRLF-terminated query
        let request = format!("{}\r\n", query);
        match tokio::time::timeout(self.timeout, stream.write_all(request.as_bytes())).await {
            Ok(Ok(())) => {
                if let Err(e) = stream.flush().await {
                    return Err(TransportError::Protocol(format!("Failed to flush query to {}: {}", address, e)));
                }
            }
            Ok(Err(e)) => {
                return Err(TransportError::Protocol(format!("Failed to write query to {}: {}", address, e)));
            }
            Err(_) => {
                return Err(TransportError::Timeout(address));
            }
        }

        let mut response = Vec::new();
        let mut buffer = [0u8; 8192];
        let mut truncated = false;
        let read_start = Instant::now();

        loop {
            match tokio::time::timeout(self.timeout, stream.read(&mut buffer)).await {
                Ok(Ok(0)) => {
                    break;
                }
                Ok(Ok(n)) => {
                    response.extend_from_slice(&buffer[..n]);

                    if response.len() > self.max_response_bytes {
                        debug!("Response from {} exceeded {} bytes, truncating", address, self.max_response_bytes);
                        response.truncate(self.max_response_bytes);
                        truncated = true;
                        break;
                    }
                    if read_start.elapsed() > self.timeout {
                        debug!("Read timeout reached after {} bytes", response.len());
                        truncated = true;
                        break;
                    }
                }
                Ok(Err(e)) => {
                    return Err(TransportError::Protocol(format!("Failed to read response from {}: {}", address, e)));
                }
                Err(_) => {
                    // Slow servers sometimes never close the connection
                    debug!("Timeout reading from {} after {} bytes", address, response.len());
                    truncated = true;
                    break;
                }
            }
        }

        debug!("Received {} bytes from {}", response.len(), address);

        if response.is_empty() {
            return Err(TransportError::Protocol(format!("Empty response from {}", address)));
        }

        if truncated {
            warn!("Response from {} is incomplete ({} bytes)", address, response.len());
        }

        Ok(Response {
            body: String::from_utf8_lossy(&response).into_owned(),
            truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn serve_once(reply: &'static str) -> ServerId {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut buffer = [0u8; 256];
            let n = socket.read(&mut buffer).await.expect("read query");
            assert!(buffer[..n].ends_with(b"\r\n"));
            socket.write_all(reply.as_bytes()).await.expect("write reply");
        });
        ServerId::new("127.0.0.1", port)
    }

    #[tokio::test]
    async fn test_round_trip() {
        let server = serve_once("domain: example.at\r\nStatus: free\r\n").await;
        let response = TcpTransport::default().send("example.at", &server).await.expect("response");

        assert_eq!(response.body, "domain: example.at\r\nStatus: free\r\n");
        assert!(!response.truncated);
    }

    #[tokio::test]
    async fn test_empty_response_is_protocol_error() {
        let server = serve_once("").await;
        let result = TcpTransport::default().send("example.at", &server).await;

        assert!(matches!(result, Err(TransportError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_size_cap() {
        let server = serve_once("0123456789abcdef").await;
        let response = TcpTransport::new(Duration::from_secs(5), 8).send("x", &server).await.expect("response");

        assert_eq!(response.body, "01234567");
        assert!(response.truncated);
    }
}
