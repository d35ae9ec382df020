//! HTTP server loop
//!
//! hyper over a multi-threaded tokio runtime with:
//! - One spawned task per connection
//! - HTTP/1.1 with hyper's default keep-alive
//! - TCP_NODELAY for low latency
//!
//! Binding and serving are separate steps so a bind failure is an ordinary
//! `Err` the caller can observe; only the binary turns it into a process exit.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;
use tracing::{debug, warn};

use crate::{Error, Handler, Method, Request, Response, Result};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub hostname: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8888,
            hostname: "0.0.0.0".to_string(),
        }
    }
}

impl ServerConfig {
    fn socket_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.hostname, self.port);
        addr.parse()
            .map_err(|source| Error::InvalidAddress { addr, source })
    }
}

/// Create the listening socket
///
/// SO_REUSEADDR allows rebinding an address left in TIME_WAIT. SO_REUSEPORT
/// is not set: a second live bind on the same port must fail.
fn bind_socket(addr: &SocketAddr) -> std::io::Result<Socket> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&(*addr).into())?;
    socket.listen(1024)?;

    Ok(socket)
}

/// A bound, not-yet-serving HTTP server
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl Server {
    /// Bind the listener
    ///
    /// Must be called from within a tokio runtime. Returns `Error::Bind` if
    /// the port is taken or the address is not bindable.
    pub fn bind(config: &ServerConfig) -> Result<Self> {
        let addr = config.socket_addr()?;
        let socket = bind_socket(&addr).map_err(|source| Error::Bind { addr, source })?;
        let listener = TcpListener::from_std(socket.into())
            .map_err(|source| Error::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// The address the listener is bound to
    ///
    /// Differs from the configured address when port 0 was requested.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept connections and answer every request with `handler`
    ///
    /// Does not return while serving. Per-connection errors are logged and
    /// never take the accept loop down.
    pub async fn serve(self, handler: Arc<dyn Handler>) -> Result<()> {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(err) => {
                    warn!(error = %err, "accept failed");
                    continue;
                }
            };

            let handler = handler.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| {
                    let handler = handler.clone();
                    async move { respond(handler, req).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    debug!(peer = %peer, error = %err, "connection closed with error");
                }
            });
        }
    }
}

async fn respond(
    handler: Arc<dyn Handler>,
    req: hyper::Request<Incoming>,
) -> std::result::Result<hyper::Response<Full<Bytes>>, std::convert::Infallible> {
    let request = from_hyper_request(req).await;
    Ok(to_hyper_response(handler.handle(&request)))
}

/// Convert a hyper request to our Request type
///
/// The body is read to completion so keep-alive connections stay usable,
/// even though the greeting handler never looks at it.
pub async fn from_hyper_request(req: hyper::Request<Incoming>) -> Request {
    let (parts, body) = req.into_parts();

    let method = Method::from_str(parts.method.as_str()).unwrap_or(Method::Get);
    let mut request = Request::new(method, parts.uri.path());
    request.query = parts.uri.query().map(|s| s.to_string());

    for (name, value) in &parts.headers {
        if let Ok(v) = value.to_str() {
            request.headers.push((name.to_string(), v.to_string()));
        }
    }

    request.body = body
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .unwrap_or_default();

    request
}

/// Convert our Response to a hyper Response
pub fn to_hyper_response(res: Response) -> hyper::Response<Full<Bytes>> {
    let mut builder = hyper::Response::builder().status(res.status.as_u16());

    for (name, value) in &res.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    builder.body(Full::new(res.body)).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StatusCode;

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8888);
        assert_eq!(config.hostname, "0.0.0.0");
        assert_eq!(
            config.socket_addr().unwrap(),
            "0.0.0.0:8888".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_config_rejects_bad_hostname() {
        let config = ServerConfig {
            port: 8888,
            hostname: "not-an-ip".to_string(),
        };
        assert!(matches!(
            config.socket_addr(),
            Err(Error::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_to_hyper_response() {
        let res = crate::ResponseBuilder::new(StatusCode::OK)
            .header("content-type", "text/plain; charset=utf-8")
            .body("Hello")
            .build();

        let hyper_res = to_hyper_response(res);
        assert_eq!(hyper_res.status(), hyper::StatusCode::OK);
        assert_eq!(
            hyper_res.headers()["content-type"],
            "text/plain; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let config = ServerConfig {
            port: 0,
            hostname: "127.0.0.1".to_string(),
        };
        let server = Server::bind(&config).unwrap();
        assert_ne!(server.local_addr().port(), 0);
    }
}
