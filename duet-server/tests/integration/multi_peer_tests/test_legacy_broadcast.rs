use duet_core::Notice;
use duet_server::ServerConfig;

use crate::integration::{connect_peer, create_test_hub, init_tracing};
use crate::utils::{notice, room};

fn legacy() -> ServerConfig {
    ServerConfig {
        auto_lobby: false,
        legacy_broadcast: true,
        ..ServerConfig::default()
    }
}

#[test]
fn test_disconnect_broadcasts_to_everyone_else() {
    init_tracing();

    let mut hub = create_test_hub(legacy());
    let (a, _a_transport) = connect_peer(&mut hub, Some("r1"));
    let (_b, b_transport) = connect_peer(&mut hub, Some("r1"));
    let (_c, c_transport) = connect_peer(&mut hub, Some("r2"));
    let (_d, d_transport) = connect_peer(&mut hub, None);
    for t in [&b_transport, &c_transport, &d_transport] {
        t.take_messages();
    }

    hub.disconnect(a);

    for t in [&b_transport, &c_transport, &d_transport] {
        assert_eq!(t.take_messages(), vec![notice(Notice::PeerDisconnected)]);
    }
    assert_eq!(hub.rooms().room(&room("r1")).map(|r| r.len()), Some(1));
}

#[test]
fn test_explicit_leave_stays_room_scoped() {
    init_tracing();

    let mut hub = create_test_hub(legacy());
    let (a, _a_transport) = connect_peer(&mut hub, Some("r1"));
    let (_b, b_transport) = connect_peer(&mut hub, Some("r1"));
    let (_c, c_transport) = connect_peer(&mut hub, Some("r2"));
    b_transport.take_messages();
    c_transport.take_messages();

    hub.leave(a);

    assert_eq!(
        b_transport.take_messages(),
        vec![notice(Notice::PeerLeft {
            room: room("r1"),
            peer: a
        })]
    );
    assert!(c_transport.take_messages().is_empty());
    assert!(hub.registry().contains(&a));
}
