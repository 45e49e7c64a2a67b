//! End-to-end signaling flow through the library surface, using in-process
//! channels in place of WebSocket connections.

use serde_json::json;
use tokio::sync::mpsc;
use wavelink_signal::coordinator::Coordinator;
use wavelink_signal::error::SignalError;
use wavelink_signal::protocol::{Identity, ServerMessage};

fn connect(coordinator: &Coordinator) -> (Identity, mpsc::UnboundedReceiver<ServerMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let identity = Identity::generate();
    coordinator.on_connect(identity, tx).unwrap();
    (identity, rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

#[test]
fn two_peers_meet_call_and_part() {
    let coordinator = Coordinator::new();

    let (alice, mut rx_alice) = connect(&coordinator);
    let (bob, mut rx_bob) = connect(&coordinator);

    // Both learn about each other through roster updates.
    let alice_msgs = drain(&mut rx_alice);
    assert!(alice_msgs.contains(&ServerMessage::IdentityAssigned(alice)));
    assert!(alice_msgs.contains(&ServerMessage::RosterUpdate(vec![bob])));
    let bob_msgs = drain(&mut rx_bob);
    assert!(bob_msgs.contains(&ServerMessage::IdentityAssigned(bob)));
    assert!(bob_msgs.contains(&ServerMessage::RosterUpdate(vec![alice])));

    // Alice rings Bob; her offer arrives untouched.
    let offer = json!({"type": "offer", "sdp": "v=0\r\no=alice"});
    coordinator
        .on_call_initiate(alice, bob, offer.clone())
        .unwrap();
    assert_eq!(
        drain(&mut rx_bob),
        vec![ServerMessage::CallIncoming { from: alice, offer }]
    );

    // Bob answers; Alice gets the answer blob back.
    let answer = json!({"type": "answer", "sdp": "v=0\r\no=bob"});
    coordinator.on_call_accept(bob, answer.clone()).unwrap();
    assert_eq!(
        drain(&mut rx_alice),
        vec![ServerMessage::CallAccepted { answer }]
    );

    // Alice's socket dies mid-call: Bob hears the call end and sees her
    // leave the roster, in that order.
    coordinator.on_disconnect(alice).unwrap();
    assert_eq!(
        drain(&mut rx_bob),
        vec![
            ServerMessage::CallEnded {},
            ServerMessage::RosterUpdate(vec![]),
        ]
    );
    assert_eq!(coordinator.roster(), vec![bob]);

    // Stale messages from the departed peer are dropped, not fatal.
    assert_eq!(
        coordinator.on_call_end(alice),
        Err(SignalError::NoMatchingSession)
    );
    assert_eq!(coordinator.on_disconnect(alice), Ok(()));
    assert_eq!(drain(&mut rx_bob), vec![]);
}

#[test]
fn roster_churn_stays_consistent_with_connections() {
    let coordinator = Coordinator::new();
    let (a, mut rx_a) = connect(&coordinator);
    let (b, _rx_b) = connect(&coordinator);
    let (c, _rx_c) = connect(&coordinator);
    assert_eq!(coordinator.roster(), vec![a, b, c]);

    coordinator.on_disconnect(b).unwrap();
    assert_eq!(coordinator.roster(), vec![a, c]);

    // A's latest roster no longer lists the departed peer.
    let last = drain(&mut rx_a).pop().unwrap();
    assert_eq!(last, ServerMessage::RosterUpdate(vec![c]));

    let (d, _rx_d) = connect(&coordinator);
    assert_eq!(coordinator.roster(), vec![a, c, d]);
}
