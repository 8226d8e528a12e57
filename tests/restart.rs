//! Modem restart and actor shutdown.

pub mod common;

use agps_arbiter::{
    Error,
    agps::{AgpsState, ApnTypeMask, BearerCategory, BearerType, RequestType},
};
use common::harness::TestHarness;

#[tokio::test]
async fn test_modem_restart_drops_all_subscribers_silently() {
    let mut h = TestHarness::new();
    h.handle
        .request_connection(1, RequestType::Agnss, ApnTypeMask::SUPL)
        .await
        .unwrap();
    h.handle
        .request_connection(2, RequestType::EmergencyAgnss, ApnTypeMask::EMERGENCY)
        .await
        .unwrap();
    h.expect_open().await;
    h.handle
        .report_open_success(RequestType::Agnss, "supl.apn", BearerType::Ipv4)
        .await
        .unwrap();
    h.expect_status().await;
    h.expect_status().await;

    h.handle
        .request_connection(3, RequestType::Internet, ApnTypeMask::DEFAULT)
        .await
        .unwrap();
    h.expect_open().await;

    h.handle.handle_modem_restart().await.unwrap();
    h.expect_quiet().await;

    for category in BearerCategory::ALL {
        let snapshot = h.handle.snapshot(category).await.unwrap().unwrap();
        assert_eq!(snapshot.state, AgpsState::Released);
        assert!(snapshot.subscribers.is_empty());
    }

    // The machines are reusable after the reset.
    h.handle
        .request_connection(4, RequestType::Agnss, ApnTypeMask::SUPL)
        .await
        .unwrap();
    assert_eq!(h.expect_open().await.handle, 4);
}

#[tokio::test]
async fn test_shutdown_closes_the_handle() {
    let h = TestHarness::new();
    h.handle.shutdown().await.unwrap();

    // The actor drops its receiver once it stops.
    let mut result = Ok(());
    for _ in 0..100 {
        result = h.handle
            .request_connection(1, RequestType::Agnss, ApnTypeMask::SUPL)
            .await;
        if result.is_err() {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(result, Err(Error::ChannelClosed));
    assert_eq!(h.handle.is_registered().await, Err(Error::ChannelClosed));
}
