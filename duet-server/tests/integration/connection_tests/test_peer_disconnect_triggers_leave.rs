use duet_core::Notice;

use crate::integration::{connect_peer, create_test_hub, explicit_rooms, init_tracing, spawn_test_server};
use crate::utils::{TestClient, notice, room, wait_until};

#[test]
fn test_peer_disconnect_triggers_leave() {
    init_tracing();

    let mut hub = create_test_hub(explicit_rooms());
    let (a, _a_transport) = connect_peer(&mut hub, Some("r1"));
    let (b, b_transport) = connect_peer(&mut hub, Some("r1"));
    b_transport.take_messages();

    hub.disconnect(a);

    assert_eq!(
        b_transport.take_messages(),
        vec![notice(Notice::PeerLeft {
            room: room("r1"),
            peer: a
        })],
        "the remaining peer gets exactly one peer-left"
    );
    assert_eq!(hub.rooms().peer_of(&b), None);
    assert!(!hub.registry().contains(&a));

    // A second disconnect for the same id changes nothing.
    hub.disconnect(a);
    assert!(b_transport.take_messages().is_empty());

    hub.disconnect(b);
    assert!(hub.rooms().room(&room("r1")).is_none());
    assert!(hub.rooms().is_empty());
    assert!(hub.registry().is_empty());
}

#[test]
fn test_sole_member_disconnect_deletes_room() {
    init_tracing();

    let mut hub = create_test_hub(explicit_rooms());
    let (a, _transport) = connect_peer(&mut hub, Some("solo"));
    assert!(hub.rooms().room(&room("solo")).is_some());

    hub.disconnect(a);

    assert!(hub.rooms().room(&room("solo")).is_none());
    assert_eq!(hub.rooms().room_of(&a), None);
}

#[test]
fn test_messages_after_disconnect_are_ignored() {
    init_tracing();

    let mut hub = create_test_hub(explicit_rooms());
    let (a, _a_transport) = connect_peer(&mut hub, Some("r1"));
    let (_b, b_transport) = connect_peer(&mut hub, Some("r1"));
    hub.disconnect(a);
    b_transport.take_messages();

    hub.handle_message(
        a,
        duet_core::ClientMessage::Join {
            room: Some(room("r1")),
        },
    );

    assert!(b_transport.take_messages().is_empty());
    assert_eq!(hub.rooms().room_of(&a), None);
    assert_eq!(hub.rooms().room(&room("r1")).map(|r| r.len()), Some(1));
}

#[tokio::test]
async fn test_socket_close_notifies_peer() {
    init_tracing();

    let (addr, service) = spawn_test_server(explicit_rooms())
        .await
        .expect("Failed to start server");

    let mut a = TestClient::connect(addr, "/ws/r1").await.expect("A failed");
    let mut b = TestClient::connect(addr, "/ws/r1").await.expect("B failed");
    a.recv().await.expect("A joined");
    a.recv().await.expect("A peer-joined");
    b.recv().await.expect("B joined");
    b.recv().await.expect("B peer-joined");

    let a_id = a.id;
    a.close().await.expect("Failed to close A");

    assert_eq!(
        b.recv().await.expect("No peer-left"),
        notice(Notice::PeerLeft {
            room: room("r1"),
            peer: a_id
        })
    );

    wait_until(2000, async || {
        service
            .stats()
            .await
            .is_some_and(|stats| stats.connections == 1)
    })
    .await
    .expect("A was not unregistered");

    b.close().await.expect("Failed to close B");
}
