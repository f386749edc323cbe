use duet_core::{Notice, SignalKind};
use duet_server::ServerConfig;
use serde_json::json;

use crate::integration::{init_tracing, spawn_test_server};
use crate::utils::{QUIET_PERIOD_MS, TestClient, notice, offer_payload, relay, room};

#[tokio::test]
async fn test_lobby_pairing() {
    init_tracing();

    let (addr, service) = spawn_test_server(ServerConfig::default())
        .await
        .expect("Failed to start server");

    let mut a = TestClient::connect(addr, "/ws").await.expect("A failed");
    assert_eq!(
        a.recv().await.expect("A joined"),
        notice(Notice::Joined {
            room: room("lobby"),
            members: 1
        })
    );
    assert_eq!(service.stats().await.map(|s| s.waiting), Some(1));

    let mut b = TestClient::connect(addr, "/ws").await.expect("B failed");
    assert_eq!(
        b.recv().await.expect("B joined"),
        notice(Notice::Joined {
            room: room("lobby"),
            members: 2
        })
    );
    assert_eq!(
        a.recv().await.expect("A peer-joined"),
        notice(Notice::PeerJoined {
            room: room("lobby"),
            peer: b.id
        })
    );
    b.recv().await.expect("B peer-joined");

    let mut c = TestClient::connect(addr, "/ws").await.expect("C failed");
    assert_eq!(
        c.recv().await.expect("C joined"),
        notice(Notice::Joined {
            room: room("lobby-2"),
            members: 1
        })
    );

    // The first pair relays without ever sending a join.
    a.send_json(json!({"offer": offer_payload()}))
        .await
        .expect("Offer failed");
    assert_eq!(
        b.recv().await.expect("No offer"),
        relay(a.id, SignalKind::Offer, offer_payload())
    );
    c.expect_silence(QUIET_PERIOD_MS).await.expect("C disturbed");

    let stats = service.stats().await.expect("Hub not running");
    assert_eq!(stats.rooms, 2);
    assert_eq!(stats.waiting, 1);

    a.close().await.expect("Failed to close A");
    b.close().await.expect("Failed to close B");
    c.close().await.expect("Failed to close C");
}
