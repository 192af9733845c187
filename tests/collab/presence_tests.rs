//! Presence scenarios across multiple connections

use pretty_assertions::assert_eq;

use collab_server::application::dto::{PresencePayload, ServerEvent};
use collab_server::domain::RoomKey;

use crate::common::Harness;

const ROOM: RoomKey = RoomKey::Chat(1);

fn presence(active_users: Vec<i64>) -> ServerEvent {
    ServerEvent::Presence(PresencePayload {
        room: ROOM,
        active_users,
    })
}

#[tokio::test]
async fn test_join_broadcasts_roster_to_everyone_in_room() {
    let h = Harness::new();
    let mut a = h.connect(1);
    let mut b = h.connect(2);
    h.hub.membership().join(&mut a, ROOM).await.unwrap();
    h.sink.clear();

    h.hub.membership().join(&mut b, ROOM).await.unwrap();

    assert_eq!(h.sink.named_for(a.connection_id(), "presence"), vec![presence(vec![1, 2])]);
    assert_eq!(h.sink.named_for(b.connection_id(), "presence"), vec![presence(vec![1, 2])]);
}

#[tokio::test]
async fn test_user_stays_present_until_last_connection_closes() {
    let h = Harness::new();
    let mut a1 = h.connect(1);
    let mut a2 = h.connect(1);
    let mut b = h.connect(2);
    for session in [&mut a1, &mut a2, &mut b] {
        h.hub.membership().join(session, ROOM).await.unwrap();
    }
    h.sink.clear();

    h.hub.disconnect(&mut a1);

    assert!(h.hub.presence().is_online(1));
    assert_eq!(h.hub.presence().room_presence(ROOM), vec![1, 2]);
    assert_eq!(h.sink.named_for(b.connection_id(), "presence"), vec![presence(vec![1, 2])]);

    h.sink.clear();
    h.hub.disconnect(&mut a2);

    assert!(!h.hub.presence().is_online(1));
    assert_eq!(h.hub.presence().room_presence(ROOM), vec![2]);
    assert_eq!(h.sink.named_for(b.connection_id(), "presence"), vec![presence(vec![2])]);
}

#[tokio::test]
async fn test_connection_without_room_only_touches_online_set() {
    let h = Harness::new();
    let mut a = h.connect(1);

    assert_eq!(h.hub.presence().online_users(), vec![1]);

    h.hub.disconnect(&mut a);

    assert!(h.hub.presence().online_users().is_empty());
    assert!(h.sink.events_for(a.connection_id()).is_empty());
}

#[tokio::test]
async fn test_disconnect_with_dropped_transport_still_reconciles() {
    let h = Harness::new();
    let mut a = h.connect(1);
    let mut b = h.connect(2);
    h.hub.membership().join(&mut a, ROOM).await.unwrap();
    h.hub.membership().join(&mut b, ROOM).await.unwrap();
    h.sink.close(a.connection_id());
    h.sink.close(b.connection_id());

    h.hub.disconnect(&mut a);

    assert_eq!(a.current_room(), None);
    assert_eq!(h.hub.presence().room_presence(ROOM), vec![2]);
    assert!(!h.hub.presence().is_online(1));
}

#[tokio::test]
async fn test_rooms_do_not_see_each_others_presence() {
    let h = Harness::new();
    let mut a = h.connect(1);
    let mut b = h.connect(2);
    h.hub.membership().join(&mut a, ROOM).await.unwrap();
    h.sink.clear();

    h.hub.membership().join(&mut b, RoomKey::Chat(2)).await.unwrap();

    assert!(h.sink.named_for(a.connection_id(), "presence").is_empty());
    assert_eq!(h.hub.presence().room_presence(ROOM), vec![1]);
}
