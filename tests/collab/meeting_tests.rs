//! Meeting signaling scenarios

use pretty_assertions::assert_eq;
use serde_json::json;

use collab_server::application::dto::ServerEvent;
use collab_server::domain::RoomKey;
use collab_server::shared::error::CollabError;

use crate::common::Harness;

const MEETING: i64 = 5;

#[tokio::test]
async fn test_join_meeting_announces_to_others_only() {
    let h = Harness::new();
    h.users.add(2, "Bob");
    let mut a = h.connect(1);
    let mut b = h.connect(2);
    h.hub.meetings().join_meeting(&mut a, MEETING).await.unwrap();
    h.sink.clear();

    let outcome = h.hub.meetings().join_meeting(&mut b, MEETING).await.unwrap();

    assert_eq!(outcome.room, RoomKey::Meeting(MEETING));
    assert!(outcome.recent_messages.is_empty());
    let joined = h.sink.named_for(a.connection_id(), "userJoined");
    match joined.as_slice() {
        [ServerEvent::UserJoined(payload)] => {
            assert_eq!(payload.user_id, 2);
            assert_eq!(payload.name, "Bob");
            assert_eq!(payload.role, "member");
        }
        other => panic!("unexpected events {other:?}"),
    }
    assert!(h.sink.named_for(b.connection_id(), "userJoined").is_empty());
}

#[tokio::test]
async fn test_control_fans_out_to_other_participants() {
    let h = Harness::new();
    let mut a = h.connect(1);
    let mut b = h.connect(2);
    let mut c = h.connect(3);
    for session in [&mut a, &mut b, &mut c] {
        h.hub.meetings().join_meeting(session, MEETING).await.unwrap();
    }
    h.sink.clear();

    let delivered = h
        .hub
        .meetings()
        .control(&a, json!({"type": "muteAll"}))
        .unwrap();

    assert_eq!(delivered, 2);
    assert!(h.sink.named_for(a.connection_id(), "meetingUpdate").is_empty());
    match h.sink.named_for(b.connection_id(), "meetingUpdate").as_slice() {
        [ServerEvent::MeetingUpdate(payload)] => {
            assert_eq!(payload.meeting_id, MEETING);
            assert_eq!(payload.sender_id, 1);
            assert_eq!(payload.action, json!({"type": "muteAll"}));
        }
        other => panic!("unexpected events {other:?}"),
    }
    assert_eq!(h.sink.named_for(c.connection_id(), "meetingUpdate").len(), 1);
}

#[tokio::test]
async fn test_screen_share_excludes_sender() {
    let h = Harness::new();
    let mut a = h.connect(1);
    let mut b = h.connect(2);
    h.hub.meetings().join_meeting(&mut a, MEETING).await.unwrap();
    h.hub.meetings().join_meeting(&mut b, MEETING).await.unwrap();
    h.sink.clear();

    h.hub
        .meetings()
        .share_screen(&b, json!({"sdp": "offer"}))
        .unwrap();

    assert_eq!(h.sink.named_for(a.connection_id(), "screenSharing").len(), 1);
    assert!(h.sink.named_for(b.connection_id(), "screenSharing").is_empty());
}

#[tokio::test]
async fn test_signaling_requires_meeting_room() {
    let h = Harness::new();
    let mut a = h.connect(1);

    assert!(matches!(
        h.hub.meetings().control(&a, json!({})),
        Err(CollabError::NotInRoom)
    ));

    h.hub.membership().join(&mut a, RoomKey::Chat(MEETING)).await.unwrap();

    assert!(matches!(
        h.hub.meetings().share_screen(&a, json!({})),
        Err(CollabError::NotInRoom)
    ));
    assert!(matches!(
        h.hub.meetings().leave_meeting(&mut a),
        Err(CollabError::NotInRoom)
    ));
}

#[tokio::test]
async fn test_leave_meeting_announces_departure() {
    let h = Harness::new();
    let mut a = h.connect(1);
    let mut b = h.connect(2);
    h.hub.meetings().join_meeting(&mut a, MEETING).await.unwrap();
    h.hub.meetings().join_meeting(&mut b, MEETING).await.unwrap();
    h.sink.clear();

    let left = h.hub.meetings().leave_meeting(&mut a).unwrap();

    assert_eq!(left, RoomKey::Meeting(MEETING));
    assert_eq!(a.current_room(), None);
    assert_eq!(h.sink.named_for(b.connection_id(), "userLeft").len(), 1);
    assert_eq!(h.sink.count_named("userLeft"), 1);
    assert_eq!(h.hub.presence().room_presence(RoomKey::Meeting(MEETING)), vec![2]);
}

#[tokio::test]
async fn test_disconnect_from_meeting_announces_departure() {
    let h = Harness::new();
    let mut a = h.connect(1);
    let mut b = h.connect(2);
    h.hub.meetings().join_meeting(&mut a, MEETING).await.unwrap();
    h.hub.meetings().join_meeting(&mut b, MEETING).await.unwrap();
    h.sink.clear();

    h.hub.disconnect(&mut a);

    match h.sink.named_for(b.connection_id(), "userLeft").as_slice() {
        [ServerEvent::UserLeft(payload)] => {
            assert_eq!(payload.room, RoomKey::Meeting(MEETING));
            assert_eq!(payload.user_id, 1);
        }
        other => panic!("unexpected events {other:?}"),
    }
}

#[tokio::test]
async fn test_moving_to_chat_room_announces_meeting_departure() {
    let h = Harness::new();
    let mut b = h.connect(2);
    let mut c = h.connect(3);
    h.hub.meetings().join_meeting(&mut b, MEETING).await.unwrap();
    h.hub.meetings().join_meeting(&mut c, MEETING).await.unwrap();
    h.sink.clear();

    h.hub.membership().join(&mut c, RoomKey::Chat(1)).await.unwrap();

    assert_eq!(h.sink.named_for(b.connection_id(), "userLeft").len(), 1);
    assert!(h.sink.named_for(c.connection_id(), "userLeft").is_empty());
}

#[tokio::test]
async fn test_moving_to_another_meeting_announces_departure_once() {
    let h = Harness::new();
    let mut a = h.connect(1);
    let mut b = h.connect(2);
    h.hub.meetings().join_meeting(&mut a, MEETING).await.unwrap();
    h.hub.meetings().join_meeting(&mut b, MEETING).await.unwrap();
    h.sink.clear();

    h.hub.meetings().join_meeting(&mut a, MEETING + 1).await.unwrap();

    assert_eq!(h.sink.named_for(b.connection_id(), "userLeft").len(), 1);
    assert_eq!(h.sink.count_named("userLeft"), 1);
}

#[tokio::test]
async fn test_leaving_chat_room_sends_no_departure() {
    let h = Harness::new();
    let mut a = h.connect(1);
    let mut b = h.connect(2);
    h.hub.membership().join(&mut a, RoomKey::Chat(1)).await.unwrap();
    h.hub.membership().join(&mut b, RoomKey::Chat(1)).await.unwrap();
    h.sink.clear();

    h.hub.membership().leave(&mut a);
    h.hub.disconnect(&mut b);

    assert_eq!(h.sink.count_named("userLeft"), 0);
}

#[tokio::test]
async fn test_chat_and_meeting_ids_are_separate_rooms() {
    let h = Harness::new();
    let mut a = h.connect(1);
    let mut b = h.connect(2);
    h.hub.membership().join(&mut a, RoomKey::Chat(MEETING)).await.unwrap();

    let outcome = h.hub.meetings().join_meeting(&mut b, MEETING).await.unwrap();

    assert_eq!(outcome.active_users, vec![2]);
    assert_eq!(h.hub.presence().room_presence(RoomKey::Chat(MEETING)), vec![1]);
}

#[tokio::test]
async fn test_joining_meeting_leaves_chat_room() {
    let h = Harness::new();
    let mut a = h.connect(1);
    h.hub.membership().join(&mut a, RoomKey::Chat(1)).await.unwrap();

    let outcome = h.hub.meetings().join_meeting(&mut a, MEETING).await.unwrap();

    assert_eq!(outcome.previous_room, Some(RoomKey::Chat(1)));
    assert!(h.hub.presence().room_presence(RoomKey::Chat(1)).is_empty());
}
