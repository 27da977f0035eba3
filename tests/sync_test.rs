//! Session coordinator tests: command dispatch, room fan-out, and the
//! authorization scenarios.
//!
//! Sessions are driven in-process: commands go straight into the state
//! machine and events are read off the outbound queue the WebSocket
//! plumbing would otherwise drain.

mod common;

use common::{assert_no_event, connect_session, recv_event, seed_user, TestDatabase};

use pretty_assertions::assert_eq;

use cartsync::backend::lists::db;
use cartsync::shared::protocol::{ClientCommand, ServerEvent};

#[tokio::test]
async fn test_create_list_replies_with_refreshed_lists() {
    let fixture = TestDatabase::new().await;
    let state = fixture.app_state();
    let alice = seed_user(fixture.pool(), "alice").await;
    let (mut session, mut rx) = connect_session(&alice);

    session
        .handle(
            &state,
            ClientCommand::CreateList {
                list_name: Some("Groceries".to_string()),
            },
        )
        .await;

    match recv_event(&mut rx).await {
        ServerEvent::UsersLists(lists) => {
            assert_eq!(lists.owned.len(), 1);
            assert_eq!(lists.owned[0].name, "Groceries");
            assert_eq!(lists.owned[0].owner_id, alice.id);
            assert!(lists.shared.is_empty());
        }
        other => panic!("expected usersLists, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_users_lists_includes_shared() {
    let fixture = TestDatabase::new().await;
    let state = fixture.app_state();
    let pool = fixture.pool();

    let alice = seed_user(pool, "alice").await;
    let bob = seed_user(pool, "bob").await;
    let list = db::create_list(pool, &bob.id, Some("Hardware".to_string()))
        .await
        .unwrap();
    db::insert_share(pool, &list.id, &alice.id).await.unwrap();

    let (mut session, mut rx) = connect_session(&alice);
    session.handle(&state, ClientCommand::GetUsersLists).await;

    match recv_event(&mut rx).await {
        ServerEvent::UsersLists(lists) => {
            assert!(lists.owned.is_empty());
            assert_eq!(lists.shared.len(), 1);
            assert_eq!(lists.shared[0].owner_username.as_deref(), Some("bob"));
        }
        other => panic!("expected usersLists, got {:?}", other),
    }
}

#[tokio::test]
async fn test_add_item_broadcasts_snapshot_to_room() {
    let fixture = TestDatabase::new().await;
    let state = fixture.app_state();
    let pool = fixture.pool();

    let alice = seed_user(pool, "alice").await;
    let list = db::create_list(pool, &alice.id, None).await.unwrap();

    let (mut session, mut rx) = connect_session(&alice);

    session
        .handle(
            &state,
            ClientCommand::JoinList {
                list_id: list.id.clone(),
            },
        )
        .await;
    assert_eq!(recv_event(&mut rx).await, ServerEvent::ListUpdate(vec![]));
    assert_eq!(session.joined_list(), Some(list.id.as_str()));

    session
        .handle(
            &state,
            ClientCommand::AddItem {
                list_id: list.id.clone(),
                text: "milk".to_string(),
            },
        )
        .await;

    match recv_event(&mut rx).await {
        ServerEvent::ListUpdate(items) => {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].text, "milk");
            assert!(!items[0].checked);
        }
        other => panic!("expected listUpdate, got {:?}", other),
    }
}

#[tokio::test]
async fn test_shared_list_toggle_reaches_all_sessions() {
    let fixture = TestDatabase::new().await;
    let state = fixture.app_state();
    let pool = fixture.pool();

    let alice = seed_user(pool, "alice").await;
    let bob = seed_user(pool, "bob").await;
    let list = db::create_list(pool, &alice.id, Some("Groceries".to_string()))
        .await
        .unwrap();
    let milk = db::insert_item(pool, &list.id, "milk").await.unwrap();

    let (mut alice_session, mut alice_rx) = connect_session(&alice);
    alice_session
        .handle(
            &state,
            ClientCommand::JoinList {
                list_id: list.id.clone(),
            },
        )
        .await;
    let alice_snapshot = match recv_event(&mut alice_rx).await {
        ServerEvent::ListUpdate(items) => items,
        other => panic!("expected listUpdate, got {:?}", other),
    };

    // Alice shares her list with bob
    alice_session
        .handle(
            &state,
            ClientCommand::ShareList {
                list_id: list.id.clone(),
                username: "bob".to_string(),
            },
        )
        .await;
    assert_eq!(
        recv_event(&mut alice_rx).await,
        ServerEvent::ShareSuccess("List 'Groceries' shared with bob.".to_string())
    );

    // Bob's join snapshot matches what alice sees
    let (mut bob_session, mut bob_rx) = connect_session(&bob);
    bob_session
        .handle(
            &state,
            ClientCommand::JoinList {
                list_id: list.id.clone(),
            },
        )
        .await;
    match recv_event(&mut bob_rx).await {
        ServerEvent::ListUpdate(items) => assert_eq!(items, alice_snapshot),
        other => panic!("expected listUpdate, got {:?}", other),
    }

    // Bob toggles; both sessions receive the updated snapshot
    bob_session
        .handle(
            &state,
            ClientCommand::ToggleItem {
                list_id: list.id.clone(),
                item_id: milk.id.clone(),
            },
        )
        .await;

    for rx in [&mut alice_rx, &mut bob_rx] {
        match recv_event(rx).await {
            ServerEvent::ListUpdate(items) => {
                assert_eq!(items.len(), 1);
                assert!(items[0].checked);
            }
            other => panic!("expected listUpdate, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_join_denied_without_grant() {
    let fixture = TestDatabase::new().await;
    let state = fixture.app_state();
    let pool = fixture.pool();

    let alice = seed_user(pool, "alice").await;
    let carol = seed_user(pool, "carol").await;
    let list = db::create_list(pool, &alice.id, None).await.unwrap();
    db::insert_item(pool, &list.id, "milk").await.unwrap();

    let (mut session, mut rx) = connect_session(&carol);
    session
        .handle(
            &state,
            ClientCommand::JoinList {
                list_id: list.id.clone(),
            },
        )
        .await;

    assert_eq!(
        recv_event(&mut rx).await,
        ServerEvent::Error("You do not have access to this list.".to_string())
    );
    // No snapshot, no room membership
    assert_no_event(&mut rx).await;
    assert_eq!(session.joined_list(), None);
    assert_eq!(state.rooms.subscriber_count(&list.id), 0);
}

#[tokio::test]
async fn test_share_by_non_owner_denied() {
    let fixture = TestDatabase::new().await;
    let state = fixture.app_state();
    let pool = fixture.pool();

    let alice = seed_user(pool, "alice").await;
    let bob = seed_user(pool, "bob").await;
    let carol = seed_user(pool, "carol").await;
    let list = db::create_list(pool, &alice.id, None).await.unwrap();
    db::insert_share(pool, &list.id, &bob.id).await.unwrap();

    // Bob holds a grant but is not the owner
    let (mut session, mut rx) = connect_session(&bob);
    session
        .handle(
            &state,
            ClientCommand::ShareList {
                list_id: list.id.clone(),
                username: "carol".to_string(),
            },
        )
        .await;

    assert_eq!(
        recv_event(&mut rx).await,
        ServerEvent::Error("You can only share lists you own.".to_string())
    );
    assert!(!db::share_exists(pool, &list.id, &carol.id).await.unwrap());
}

#[tokio::test]
async fn test_share_nonexistent_list_same_denial() {
    let fixture = TestDatabase::new().await;
    let state = fixture.app_state();
    let bob = seed_user(fixture.pool(), "bob").await;

    let (mut session, mut rx) = connect_session(&bob);
    session
        .handle(
            &state,
            ClientCommand::ShareList {
                list_id: "no-such-list".to_string(),
                username: "carol".to_string(),
            },
        )
        .await;

    // Same message as the not-the-owner case: existence stays hidden
    assert_eq!(
        recv_event(&mut rx).await,
        ServerEvent::Error("You can only share lists you own.".to_string())
    );
}

#[tokio::test]
async fn test_duplicate_share_conflict() {
    let fixture = TestDatabase::new().await;
    let state = fixture.app_state();
    let pool = fixture.pool();

    let alice = seed_user(pool, "alice").await;
    seed_user(pool, "bob").await;
    let list = db::create_list(pool, &alice.id, None).await.unwrap();

    let (mut session, mut rx) = connect_session(&alice);
    let share = ClientCommand::ShareList {
        list_id: list.id.clone(),
        username: "bob".to_string(),
    };

    session.handle(&state, share.clone()).await;
    assert!(matches!(
        recv_event(&mut rx).await,
        ServerEvent::ShareSuccess(_)
    ));

    session.handle(&state, share).await;
    assert_eq!(
        recv_event(&mut rx).await,
        ServerEvent::Error("List is already shared with bob.".to_string())
    );

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shared_lists WHERE list_id = $1")
        .bind(&list.id)
        .fetch_one(pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_share_with_self_rejected() {
    let fixture = TestDatabase::new().await;
    let state = fixture.app_state();
    let alice = seed_user(fixture.pool(), "alice").await;
    let list = db::create_list(fixture.pool(), &alice.id, None).await.unwrap();

    let (mut session, mut rx) = connect_session(&alice);
    session
        .handle(
            &state,
            ClientCommand::ShareList {
                list_id: list.id,
                username: "alice".to_string(),
            },
        )
        .await;

    assert_eq!(
        recv_event(&mut rx).await,
        ServerEvent::Error("Cannot share a list with yourself.".to_string())
    );
}

#[tokio::test]
async fn test_share_with_unknown_user() {
    let fixture = TestDatabase::new().await;
    let state = fixture.app_state();
    let alice = seed_user(fixture.pool(), "alice").await;
    let list = db::create_list(fixture.pool(), &alice.id, None).await.unwrap();

    let (mut session, mut rx) = connect_session(&alice);
    session
        .handle(
            &state,
            ClientCommand::ShareList {
                list_id: list.id,
                username: "dave".to_string(),
            },
        )
        .await;

    assert_eq!(
        recv_event(&mut rx).await,
        ServerEvent::Error("User 'dave' not found.".to_string())
    );
}

#[tokio::test]
async fn test_empty_item_text_rejected_without_mutation() {
    let fixture = TestDatabase::new().await;
    let state = fixture.app_state();
    let pool = fixture.pool();

    let alice = seed_user(pool, "alice").await;
    let list = db::create_list(pool, &alice.id, None).await.unwrap();

    let (mut session, mut rx) = connect_session(&alice);
    session
        .handle(
            &state,
            ClientCommand::AddItem {
                list_id: list.id.clone(),
                text: "   ".to_string(),
            },
        )
        .await;

    assert_eq!(
        recv_event(&mut rx).await,
        ServerEvent::Error("Item text cannot be empty.".to_string())
    );
    assert!(db::list_items(pool, &list.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_toggle_missing_item_reports_error() {
    let fixture = TestDatabase::new().await;
    let state = fixture.app_state();
    let alice = seed_user(fixture.pool(), "alice").await;
    let list = db::create_list(fixture.pool(), &alice.id, None).await.unwrap();

    let (mut session, mut rx) = connect_session(&alice);
    session
        .handle(
            &state,
            ClientCommand::ToggleItem {
                list_id: list.id,
                item_id: "no-such-item".to_string(),
            },
        )
        .await;

    assert_eq!(
        recv_event(&mut rx).await,
        ServerEvent::Error("Item not found.".to_string())
    );
}

#[tokio::test]
async fn test_mutation_denied_for_outsider() {
    let fixture = TestDatabase::new().await;
    let state = fixture.app_state();
    let pool = fixture.pool();

    let alice = seed_user(pool, "alice").await;
    let carol = seed_user(pool, "carol").await;
    let list = db::create_list(pool, &alice.id, None).await.unwrap();

    let (mut session, mut rx) = connect_session(&carol);
    session
        .handle(
            &state,
            ClientCommand::AddItem {
                list_id: list.id.clone(),
                text: "milk".to_string(),
            },
        )
        .await;

    assert_eq!(
        recv_event(&mut rx).await,
        ServerEvent::Error("Unauthorized to add item to this list.".to_string())
    );
    assert!(db::list_items(pool, &list.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_item_broadcast() {
    let fixture = TestDatabase::new().await;
    let state = fixture.app_state();
    let pool = fixture.pool();

    let alice = seed_user(pool, "alice").await;
    let list = db::create_list(pool, &alice.id, None).await.unwrap();
    let milk = db::insert_item(pool, &list.id, "milk").await.unwrap();
    let eggs = db::insert_item(pool, &list.id, "eggs").await.unwrap();

    let (mut session, mut rx) = connect_session(&alice);
    session
        .handle(
            &state,
            ClientCommand::JoinList {
                list_id: list.id.clone(),
            },
        )
        .await;
    recv_event(&mut rx).await; // join snapshot

    session
        .handle(
            &state,
            ClientCommand::RemoveItem {
                list_id: list.id.clone(),
                item_id: milk.id.clone(),
            },
        )
        .await;

    match recv_event(&mut rx).await {
        ServerEvent::ListUpdate(items) => {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].id, eggs.id);
        }
        other => panic!("expected listUpdate, got {:?}", other),
    }
}

#[tokio::test]
async fn test_joining_second_list_leaves_first_room() {
    let fixture = TestDatabase::new().await;
    let state = fixture.app_state();
    let pool = fixture.pool();

    let alice = seed_user(pool, "alice").await;
    let list_a = db::create_list(pool, &alice.id, Some("A".to_string()))
        .await
        .unwrap();
    let list_b = db::create_list(pool, &alice.id, Some("B".to_string()))
        .await
        .unwrap();

    let (mut watcher, mut watcher_rx) = connect_session(&alice);
    watcher
        .handle(
            &state,
            ClientCommand::JoinList {
                list_id: list_a.id.clone(),
            },
        )
        .await;
    recv_event(&mut watcher_rx).await; // join snapshot for A

    watcher
        .handle(
            &state,
            ClientCommand::JoinList {
                list_id: list_b.id.clone(),
            },
        )
        .await;
    recv_event(&mut watcher_rx).await; // join snapshot for B
    assert_eq!(watcher.joined_list(), Some(list_b.id.as_str()));
    assert_eq!(state.rooms.subscriber_count(&list_a.id), 0);
    assert_eq!(state.rooms.subscriber_count(&list_b.id), 1);

    // A mutation on the abandoned list must not reach the watcher
    let (mut mutator, mut mutator_rx) = connect_session(&alice);
    mutator
        .handle(
            &state,
            ClientCommand::AddItem {
                list_id: list_a.id.clone(),
                text: "milk".to_string(),
            },
        )
        .await;
    assert_no_event(&mut watcher_rx).await;

    // One on the current list does
    mutator
        .handle(
            &state,
            ClientCommand::AddItem {
                list_id: list_b.id.clone(),
                text: "eggs".to_string(),
            },
        )
        .await;
    match recv_event(&mut watcher_rx).await {
        ServerEvent::ListUpdate(items) => assert_eq!(items[0].text, "eggs"),
        other => panic!("expected listUpdate, got {:?}", other),
    }
    // The mutator never joined a room, so it receives nothing
    assert_no_event(&mut mutator_rx).await;
}
