//! tests/common/harness.rs
use agps_arbiter::{
    AgpsHandle, Config,
    agps::{CloseRequest, Effect, OpenRequest, StatusNotification},
};
use std::sync::Once;
use tokio::sync::mpsc::{self, error::TryRecvError};

/// Initializes tracing for tests, ensuring it's only done once.
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let filter = std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "agps_arbiter=debug".to_string());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

/// A running AGPS actor wired to channel-backed platform and engine mocks.
pub struct TestHarness {
    pub handle: AgpsHandle,
    platform_rx: mpsc::Receiver<Effect>,
    status_rx: mpsc::Receiver<StatusNotification>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        init_tracing();
        let (platform_tx, platform_rx) = mpsc::channel(64);
        let (status_tx, status_rx) = mpsc::channel(64);
        let handle = AgpsHandle::spawn(config, platform_tx, status_tx);
        Self {
            handle,
            platform_rx,
            status_rx,
        }
    }

    /// Waits until the actor has processed, and dispatched the effects of,
    /// every command sent before this call.
    pub async fn sync(&self) {
        self.handle.is_registered().await.unwrap();
    }

    pub async fn expect_open(&mut self) -> OpenRequest {
        self.sync().await;
        match self.platform_rx.try_recv() {
            Ok(Effect::Open(request)) => request,
            other => panic!("expected an open request, got {other:?}"),
        }
    }

    pub async fn expect_close(&mut self) -> CloseRequest {
        self.sync().await;
        match self.platform_rx.try_recv() {
            Ok(Effect::Close(request)) => request,
            other => panic!("expected a close request, got {other:?}"),
        }
    }

    pub async fn expect_status(&mut self) -> StatusNotification {
        self.sync().await;
        match self.status_rx.try_recv() {
            Ok(notification) => notification,
            Err(e) => panic!("expected a status notification, got {e:?}"),
        }
    }

    /// Asserts that neither the platform nor the engine heard anything.
    pub async fn expect_quiet(&mut self) {
        self.sync().await;
        assert_eq!(self.platform_rx.try_recv().err(), Some(TryRecvError::Empty));
        assert_eq!(self.status_rx.try_recv().err(), Some(TryRecvError::Empty));
    }
}
