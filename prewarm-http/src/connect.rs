//! Connect-phase timing hooked into the reqwest connector stack

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tower::{Layer, Service};

/// Connector layer recording how long the first connection of a client
/// took, TCP dial and TLS handshake included.
///
/// Clients are built per fetch, so the first connection is the only one.
#[derive(Debug, Clone, Default)]
pub(crate) struct ConnectTimer {
    elapsed: Arc<OnceLock<Duration>>,
}

impl ConnectTimer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// `None` until a connection has been established
    pub(crate) fn elapsed(&self) -> Option<Duration> {
        self.elapsed.get().copied()
    }
}

impl<S> Layer<S> for ConnectTimer {
    type Service = TimedConnect<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TimedConnect {
            inner,
            elapsed: Arc::clone(&self.elapsed),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TimedConnect<S> {
    inner: S,
    elapsed: Arc<OnceLock<Duration>>,
}

impl<S, Req> Service<Req> for TimedConnect<S>
where
    S: Service<Req>,
    S::Future: Send + 'static,
    S::Response: 'static,
    S::Error: 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<S::Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let started = Instant::now();
        let elapsed = Arc::clone(&self.elapsed);
        let connecting = self.inner.call(req);
        Box::pin(async move {
            let conn = connecting.await?;
            // A second connection would not be a fresh handshake to report
            let _ = elapsed.set(started.elapsed());
            Ok(conn)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::future::{ready, Ready};

    /// Connects instantly, handing back the request
    #[derive(Clone)]
    struct Immediate;

    impl Service<u16> for Immediate {
        type Response = u16;
        type Error = Infallible;
        type Future = Ready<Result<u16, Infallible>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Infallible>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, port: u16) -> Self::Future {
            ready(Ok(port))
        }
    }

    #[tokio::test]
    async fn test_first_connection_is_recorded() {
        let timer = ConnectTimer::new();
        assert!(timer.elapsed().is_none());

        let mut service = timer.layer(Immediate);
        assert_eq!(service.call(443).await.unwrap(), 443);
        let first = timer.elapsed().unwrap();

        // Clones share the same record
        let mut other = timer.clone().layer(Immediate);
        other.call(443).await.unwrap();
        assert_eq!(timer.elapsed(), Some(first));
    }
}
