//! Effect dispatch through hand-written platform and sink implementations.

pub mod common;

use agps_arbiter::{
    AgpsHandle, Config, Error, Result,
    agps::{
        AgpsOutcome, AgpsState, ApnTypeMask, BearerCategory, BearerType, CloseRequest, Effect,
        OpenRequest, RequestType, StatusNotification,
    },
    service::{AgnssStatusSink, ConnectivityPlatform},
};
use async_trait::async_trait;
use common::harness::init_tracing;
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::{
    sync::{OnceCell, mpsc},
    time::timeout,
};

const MASK: ApnTypeMask = ApnTypeMask::SUPL;

/// A platform whose radio is never available.
struct FailingPlatform {
    attempts: Arc<AtomicUsize>,
}

#[async_trait]
impl ConnectivityPlatform for FailingPlatform {
    async fn open_data_connection(&self, _request: OpenRequest) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(Error::Platform("radio unavailable".to_string()))
    }

    async fn close_data_connection(&self, _request: CloseRequest) -> Result<()> {
        Err(Error::Platform("radio unavailable".to_string()))
    }
}

/// Forwards every notification, then fails delivery for one handle.
struct FlakySink {
    status_tx: mpsc::Sender<StatusNotification>,
    failing_handle: i32,
}

#[async_trait]
impl AgnssStatusSink for FlakySink {
    async fn on_status(&self, notification: StatusNotification) -> Result<()> {
        let handle = notification.handle;
        self.status_tx
            .send(notification)
            .await
            .map_err(|_| Error::ChannelClosed)?;
        if handle == self.failing_handle {
            return Err(Error::Platform(format!("engine dropped handle {handle}")));
        }
        Ok(())
    }
}

/// Answers each request straight back through the handle, from inside the
/// callback, without waiting for any reply from the actor.
struct LoopbackPlatform {
    agps: Arc<OnceCell<AgpsHandle>>,
}

impl LoopbackPlatform {
    fn agps(&self) -> Result<&AgpsHandle> {
        self.agps
            .get()
            .ok_or_else(|| Error::Platform("handle not wired".to_string()))
    }
}

#[async_trait]
impl ConnectivityPlatform for LoopbackPlatform {
    async fn open_data_connection(&self, request: OpenRequest) -> Result<()> {
        self.agps()?
            .report_open_success(request.request_type, "loopback.apn", BearerType::Ipv4)
            .await
    }

    async fn close_data_connection(&self, request: CloseRequest) -> Result<()> {
        self.agps()?.report_closed(request.request_type).await
    }
}

async fn next_status(status_rx: &mut mpsc::Receiver<StatusNotification>) -> StatusNotification {
    timeout(Duration::from_secs(1), status_rx.recv())
        .await
        .expect("timed out waiting for a status notification")
        .expect("status channel closed")
}

#[tokio::test]
async fn test_platform_errors_do_not_stop_the_actor() {
    init_tracing();
    let attempts = Arc::new(AtomicUsize::new(0));
    let platform = FailingPlatform {
        attempts: attempts.clone(),
    };
    let (status_tx, mut status_rx) = mpsc::channel(16);
    let agps = AgpsHandle::spawn(Config::default(), platform, status_tx);

    agps.request_connection(1, RequestType::Agnss, MASK)
        .await
        .unwrap();
    assert!(agps.is_registered().await.unwrap());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);

    // The open was still issued, so the machine waits for the platform.
    let snapshot = agps.snapshot(BearerCategory::Agnss).await.unwrap();
    let snapshot = snapshot.unwrap();
    assert_eq!(snapshot.state, AgpsState::Pending);

    agps.report_open_failure(RequestType::Agnss).await.unwrap();
    let status = next_status(&mut status_rx).await;
    assert_eq!((status.handle, status.outcome), (1, AgpsOutcome::Denied));
}

#[tokio::test]
async fn test_sink_error_does_not_skip_later_notifications() {
    init_tracing();
    let (platform_tx, mut platform_rx) = mpsc::channel::<Effect>(16);
    let (status_tx, mut status_rx) = mpsc::channel(16);
    let sink = FlakySink {
        status_tx,
        failing_handle: 1,
    };
    let agps = AgpsHandle::spawn(Config::default(), platform_tx, sink);

    for handle in [1, 2] {
        agps.request_connection(handle, RequestType::Agnss, MASK)
            .await
            .unwrap();
    }
    assert!(platform_rx.recv().await.is_some());

    agps.report_open_success(RequestType::Agnss, "supl.apn", BearerType::Ipv4)
        .await
        .unwrap();
    let first = next_status(&mut status_rx).await;
    let second = next_status(&mut status_rx).await;
    assert_eq!((first.handle, first.outcome), (1, AgpsOutcome::Granted));
    assert_eq!((second.handle, second.outcome), (2, AgpsOutcome::Granted));
    assert!(agps.is_registered().await.unwrap());
}

#[tokio::test]
async fn test_platform_may_answer_from_inside_its_callback() {
    init_tracing();
    let cell = Arc::new(OnceCell::new());
    let platform = LoopbackPlatform {
        agps: Arc::clone(&cell),
    };
    let (status_tx, mut status_rx) = mpsc::channel(16);
    let agps = AgpsHandle::spawn(Config::default(), platform, status_tx);
    cell.set(agps.clone()).unwrap();

    agps.request_connection(1, RequestType::Agnss, MASK)
        .await
        .unwrap();
    let status = next_status(&mut status_rx).await;
    assert_eq!((status.handle, status.outcome), (1, AgpsOutcome::Granted));
    assert_eq!(status.apn.as_ref(), b"loopback.apn");

    agps.release_connection(1).await.unwrap();
    let status = next_status(&mut status_rx).await;
    assert_eq!((status.handle, status.outcome), (1, AgpsOutcome::Released));

    let snapshot = agps.snapshot(BearerCategory::Agnss).await.unwrap();
    let snapshot = snapshot.unwrap();
    assert_eq!(snapshot.state, AgpsState::Released);
}
