//! Integration tests for the club registry.

use std::sync::Arc;

use clubhouse_access::MemoryBalances;
use clubhouse_protocol::{AccountId, ClubEvent, ClubField, ClubId, Threshold};
use clubhouse_registry::{
    ChannelState, ClubRegistry, MessageCursor, NewClub, RegistryConfig, RegistryError,
};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

const FEE: u128 = 1000;

struct Fixture {
    registry: Arc<ClubRegistry<MemoryBalances>>,
    balances: Arc<MemoryBalances>,
    events: mpsc::UnboundedReceiver<ClubEvent>,
}

fn acct(id: &str) -> AccountId {
    AccountId::new(id)
}

fn owner() -> AccountId {
    acct("registry-owner")
}

fn fixture() -> Fixture {
    let balances = Arc::new(MemoryBalances::new());
    let (tx, rx) = mpsc::unbounded_channel();
    let config = RegistryConfig {
        registry_owner: owner(),
        initial_fee: FEE,
        ..RegistryConfig::default()
    };
    Fixture {
        registry: Arc::new(ClubRegistry::new(config, Arc::clone(&balances), tx)),
        balances,
        events: rx,
    }
}

/// Creates a club with one channel named "general".
async fn club_with_channel(
    registry: &ClubRegistry<MemoryBalances>,
    creator: &AccountId,
) -> ClubId {
    let params = NewClub {
        initial_channel: Some("general".into()),
        ..NewClub::named("club name")
    };
    registry.create_club(creator, FEE, params).await.unwrap().club_id
}

fn drain(events: &mut mpsc::UnboundedReceiver<ClubEvent>) -> Vec<ClubEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

// =========================================================================
// Creation and fees
// =========================================================================

#[tokio::test]
async fn test_scenario_create_join_post_delete() {
    let fx = fixture();
    let alice = acct("alice");
    let bob = acct("bob");

    let receipt = fx
        .registry
        .create_club(&alice, FEE, NewClub::named("chess"))
        .await
        .unwrap();
    assert_eq!(receipt.club_id, ClubId(0));
    assert_eq!(fx.registry.get_club_owner(ClubId(0)).await.unwrap(), alice);
    assert!(fx.registry.get_club_members(ClubId(0)).await.unwrap().is_empty());
    assert!(fx.registry.get_club_admins(ClubId(0)).await.unwrap().is_empty());
    assert!(fx.registry.is_authorized_for_club(ClubId(0), &alice).await.unwrap());

    fx.registry.join_club(&alice, ClubId(0)).await.unwrap();
    assert_eq!(
        fx.registry.get_club_members(ClubId(0)).await.unwrap(),
        vec![alice.clone()]
    );

    let index = fx
        .registry
        .add_club_channel(&alice, ClubId(0), "general".into())
        .await
        .unwrap();
    assert_eq!(index, 0);

    // Bob has no balance at all; the club has no threshold.
    fx.registry
        .new_message(&bob, ClubId(0), 0, b"\x00\x00hi".to_vec())
        .await
        .unwrap();

    fx.registry.delete_club_channel(&alice, ClubId(0), 0).await.unwrap();
    let result = fx
        .registry
        .update_club_channel_name(&alice, ClubId(0), 0, "renamed".into())
        .await;
    assert!(matches!(result, Err(RegistryError::InvalidState(_))));
}

#[tokio::test]
async fn test_create_club_assigns_sequential_ids() {
    let fx = fixture();
    for expected in 0..5u64 {
        let creator = acct(&format!("user-{expected}"));
        let receipt = fx
            .registry
            .create_club(&creator, FEE, NewClub::named(format!("club {expected}")))
            .await
            .unwrap();
        assert_eq!(receipt.club_id, ClubId(expected));
    }
    assert_eq!(fx.registry.club_count().await, 5);
    assert_eq!(fx.registry.get_club_name(ClubId(2)).await.unwrap(), "club 2");
}

#[tokio::test]
async fn test_create_club_insufficient_payment_changes_nothing() {
    let mut fx = fixture();
    let result = fx
        .registry
        .create_club(&acct("alice"), FEE - 1, NewClub::named("x"))
        .await;

    assert!(matches!(
        result,
        Err(RegistryError::InsufficientPayment { required: FEE, paid: 999 })
    ));
    assert_eq!(fx.registry.club_count().await, 0);
    assert_eq!(fx.registry.balance().await, 0);
    assert!(drain(&mut fx.events).is_empty());
}

#[tokio::test]
async fn test_create_club_overpayment_is_refunded() {
    let fx = fixture();
    let receipt = fx
        .registry
        .create_club(&acct("alice"), FEE + 250, NewClub::named("x"))
        .await
        .unwrap();
    assert_eq!(receipt.fee_charged, FEE);
    assert_eq!(receipt.refund, 250);
    assert_eq!(fx.registry.balance().await, FEE);
}

#[tokio::test]
async fn test_set_fee_only_registry_owner() {
    let fx = fixture();
    let result = fx.registry.set_fee(&acct("alice"), 1).await;
    assert!(matches!(result, Err(RegistryError::NotRegistryOwner(_))));

    let old = fx.registry.set_fee(&owner(), FEE * 2).await.unwrap();
    assert_eq!(old, FEE);
    assert_eq!(fx.registry.fee().await, FEE * 2);

    // The old fee no longer suffices.
    let result = fx
        .registry
        .create_club(&acct("alice"), FEE, NewClub::named("x"))
        .await;
    assert!(matches!(result, Err(RegistryError::InsufficientPayment { .. })));
}

#[tokio::test]
async fn test_balance_tracks_fee_at_creation_time() {
    let fx = fixture();
    fx.registry
        .create_club(&acct("a"), FEE, NewClub::named("x"))
        .await
        .unwrap();
    fx.registry.set_fee(&owner(), 50).await.unwrap();
    fx.registry
        .create_club(&acct("b"), 50, NewClub::named("y"))
        .await
        .unwrap();
    assert_eq!(fx.registry.balance().await, FEE + 50);
}

#[tokio::test]
async fn test_withdraw_twice_second_yields_zero() {
    let fx = fixture();
    fx.registry
        .create_club(&acct("a"), FEE, NewClub::named("x"))
        .await
        .unwrap();

    let result = fx.registry.withdraw(&acct("a")).await;
    assert!(matches!(result, Err(RegistryError::NotRegistryOwner(_))));

    assert_eq!(fx.registry.withdraw(&owner()).await.unwrap(), FEE);
    assert_eq!(fx.registry.withdraw(&owner()).await.unwrap(), 0);
    assert_eq!(fx.registry.balance().await, 0);
}

// =========================================================================
// Administration
// =========================================================================

#[tokio::test]
async fn test_admin_add_remove_flow() {
    let fx = fixture();
    let creator = acct("creator");
    let helper = acct("helper");
    let other = acct("other");
    let club = club_with_channel(&fx.registry, &creator).await;

    assert!(!fx.registry.is_authorized_for_club(club, &helper).await.unwrap());
    fx.registry.add_club_admin(&creator, club, helper.clone()).await.unwrap();
    assert!(fx.registry.is_authorized_for_club(club, &helper).await.unwrap());

    // An admin may appoint further admins.
    fx.registry.add_club_admin(&helper, club, other.clone()).await.unwrap();
    assert_eq!(
        fx.registry.get_club_admins(club).await.unwrap(),
        vec![helper.clone(), other.clone()]
    );

    fx.registry.remove_club_admin(&creator, club, helper.clone()).await.unwrap();
    assert!(!fx.registry.is_authorized_for_club(club, &helper).await.unwrap());
    assert_eq!(fx.registry.get_club_admins(club).await.unwrap(), vec![other]);
}

#[tokio::test]
async fn test_add_existing_admin_does_not_duplicate() {
    let fx = fixture();
    let creator = acct("creator");
    let club = club_with_channel(&fx.registry, &creator).await;

    fx.registry.add_club_admin(&creator, club, acct("x")).await.unwrap();
    fx.registry.add_club_admin(&creator, club, acct("x")).await.unwrap();
    assert_eq!(fx.registry.get_club_admins(club).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_owner_stays_authorized_after_explicit_removal() {
    let fx = fixture();
    let creator = acct("creator");
    let club = club_with_channel(&fx.registry, &creator).await;

    fx.registry.add_club_admin(&creator, club, creator.clone()).await.unwrap();
    assert_eq!(fx.registry.get_club_admins(club).await.unwrap(), vec![creator.clone()]);

    fx.registry.remove_club_admin(&creator, club, creator.clone()).await.unwrap();
    assert!(fx.registry.get_club_admins(club).await.unwrap().is_empty());
    assert!(fx.registry.is_authorized_for_club(club, &creator).await.unwrap());
}

#[tokio::test]
async fn test_remove_absent_admin_returns_not_found() {
    let fx = fixture();
    let creator = acct("creator");
    let club = club_with_channel(&fx.registry, &creator).await;

    let result = fx.registry.remove_club_admin(&creator, club, acct("nobody")).await;
    assert!(matches!(result, Err(RegistryError::AdminNotFound(..))));
}

#[tokio::test]
async fn test_stranger_cannot_mutate_club() {
    let fx = fixture();
    let creator = acct("creator");
    let stranger = acct("stranger");
    let club = club_with_channel(&fx.registry, &creator).await;

    let checks = [
        fx.registry.add_club_admin(&stranger, club, stranger.clone()).await,
        fx.registry.update_club_name(&stranger, club, "mine".into()).await,
        fx.registry
            .update_club_threshold(&stranger, club, Threshold::Native { amount: 1 })
            .await,
        fx.registry.delete_club_channel(&stranger, club, 0).await,
    ];
    for result in checks {
        let err = result.unwrap_err();
        assert!(err.is_unauthorized(), "unexpected error: {err}");
    }
    let result = fx.registry.add_club_channel(&stranger, club, "spam".into()).await;
    assert!(matches!(result, Err(RegistryError::NotAuthorized(..))));

    assert_eq!(fx.registry.get_club_name(club).await.unwrap(), "club name");
}

#[tokio::test]
async fn test_update_text_fields() {
    let fx = fixture();
    let creator = acct("creator");
    let club = club_with_channel(&fx.registry, &creator).await;

    fx.registry.update_club_name(&creator, club, "new club name".into()).await.unwrap();
    fx.registry.update_club_logo(&creator, club, "ipfs://logo".into()).await.unwrap();
    fx.registry
        .update_club_description(&creator, club, "about us".into())
        .await
        .unwrap();
    fx.registry
        .update_club_announcement(&creator, club, "meetup friday".into())
        .await
        .unwrap();

    let view = fx.registry.get_club_view(club).await.unwrap();
    assert_eq!(view.name, "new club name");
    assert_eq!(view.logo, "ipfs://logo");
    assert_eq!(view.description, "about us");
    assert_eq!(view.announcement, "meetup friday");

    assert_eq!(fx.registry.get_club_name(club).await.unwrap(), "new club name");
    let logo = fx.registry.get_club_field(club, ClubField::Logo).await.unwrap();
    assert_eq!(logo, "ipfs://logo");
    let announcement = fx
        .registry
        .get_club_field(club, ClubField::Announcement)
        .await
        .unwrap();
    assert_eq!(announcement, "meetup friday");
}

#[tokio::test]
async fn test_get_club_name_unaffected_by_channel_history() {
    let fx = fixture();
    let creator = acct("creator");
    let club = club_with_channel(&fx.registry, &creator).await;
    for i in 0..20 {
        fx.registry
            .add_club_channel(&creator, club, format!("ch-{i}"))
            .await
            .unwrap();
    }
    fx.registry.update_club_name(&creator, club, "renamed".into()).await.unwrap();

    assert_eq!(fx.registry.get_club_name(club).await.unwrap(), "renamed");
    assert_eq!(fx.registry.get_club_admins(club).await.unwrap(), Vec::<AccountId>::new());
    let result = fx.registry.get_club_field(ClubId(9), ClubField::Name).await;
    assert!(matches!(result, Err(RegistryError::ClubNotFound(ClubId(9)))));
}

#[tokio::test]
async fn test_operations_on_unknown_club_return_not_found() {
    let fx = fixture();
    let result = fx.registry.join_club(&acct("a"), ClubId(42)).await;
    assert!(matches!(result, Err(RegistryError::ClubNotFound(ClubId(42)))));

    let result = fx.registry.get_club_owner(ClubId(42)).await;
    assert!(result.unwrap_err().is_not_found());
}

// =========================================================================
// Membership
// =========================================================================

#[tokio::test]
async fn test_join_twice_rejected() {
    let fx = fixture();
    let creator = acct("creator");
    let club = club_with_channel(&fx.registry, &creator).await;

    fx.registry.join_club(&creator, club).await.unwrap();
    let result = fx.registry.join_club(&creator, club).await;
    assert!(matches!(result, Err(RegistryError::AlreadyMember(..))));
    assert_eq!(fx.registry.get_club_members(club).await.unwrap().len(), 1);
    assert_eq!(fx.registry.get_joined_club_ids(&creator).await, vec![club]);
}

#[tokio::test]
async fn test_members_paged_is_contiguous_slice() {
    let fx = fixture();
    let creator = acct("creator");
    let club = club_with_channel(&fx.registry, &creator).await;

    for i in 0..10 {
        fx.registry.join_club(&acct(&format!("m{i}")), club).await.unwrap();
    }
    let all = fx.registry.get_club_members(club).await.unwrap();
    assert_eq!(all.len(), 10);

    for offset in 0..12usize {
        for limit in 0..12usize {
            let page = fx
                .registry
                .get_club_members_paged(club, offset, limit)
                .await
                .unwrap();
            let expected_len = limit.min(10usize.saturating_sub(offset));
            assert_eq!(page.len(), expected_len, "offset {offset} limit {limit}");
            if expected_len > 0 {
                assert_eq!(page, all[offset..offset + expected_len]);
            }
        }
    }

    let page = fx.registry.get_club_members_paged(club, 1, 8).await.unwrap();
    assert_eq!(page, all[1..9]);
}

#[tokio::test]
async fn test_clubs_by_owner_and_joined_indices() {
    let fx = fixture();
    let alice = acct("alice");
    let bob = acct("bob");

    let a0 = club_with_channel(&fx.registry, &alice).await;
    let b0 = club_with_channel(&fx.registry, &bob).await;
    let a1 = club_with_channel(&fx.registry, &alice).await;

    assert_eq!(fx.registry.get_clubs_by_owner(&alice).await, vec![a0, a1]);
    assert_eq!(fx.registry.get_clubs_by_owner(&bob).await, vec![b0]);
    assert!(fx.registry.get_clubs_by_owner(&acct("carol")).await.is_empty());

    fx.registry.join_club(&bob, a1).await.unwrap();
    fx.registry.join_club(&bob, a0).await.unwrap();
    assert_eq!(fx.registry.get_joined_club_ids(&bob).await, vec![a1, a0]);
}

// =========================================================================
// Channels and messages
// =========================================================================

#[tokio::test]
async fn test_deleted_channel_keeps_index_and_history() {
    let fx = fixture();
    let creator = acct("creator");
    let club = club_with_channel(&fx.registry, &creator).await;

    fx.registry.new_message(&creator, club, 0, vec![0, 0, b'a']).await.unwrap();
    fx.registry.delete_club_channel(&creator, club, 0).await.unwrap();
    // Idempotent.
    fx.registry.delete_club_channel(&creator, club, 0).await.unwrap();

    let result = fx.registry.new_message(&creator, club, 0, vec![0, 0]).await;
    assert!(matches!(result, Err(RegistryError::InvalidState(_))));

    let next = fx
        .registry
        .add_club_channel(&creator, club, "second".into())
        .await
        .unwrap();
    assert_eq!(next, 1);

    let view = fx.registry.get_club_view(club).await.unwrap();
    assert_eq!(view.channel_count, 2);
    assert_eq!(view.channels[0].state, ChannelState::Deleted);
    assert_eq!(view.channels[0].message_count, 1);

    let page = fx
        .registry
        .get_club_channel_messages(club, 0, MessageCursor::Forward(0), 10)
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn test_channel_not_found() {
    let fx = fixture();
    let creator = acct("creator");
    let club = club_with_channel(&fx.registry, &creator).await;

    let result = fx.registry.new_message(&creator, club, 3, vec![0, 0]).await;
    assert!(matches!(result, Err(RegistryError::ChannelNotFound(_, 3))));
    let result = fx.registry.delete_club_channel(&creator, club, 3).await;
    assert!(matches!(result, Err(RegistryError::ChannelNotFound(_, 3))));
}

#[tokio::test]
async fn test_message_pages_forward_and_from_newest() {
    let fx = fixture();
    let creator = acct("creator");
    let club = club_with_channel(&fx.registry, &creator).await;

    for i in 0..7u8 {
        let index = fx
            .registry
            .new_message(&creator, club, 0, vec![0, 0, b'0' + i])
            .await
            .unwrap();
        assert_eq!(index, u64::from(i));
    }

    let page = fx
        .registry
        .get_club_channel_messages(club, 0, MessageCursor::Forward(2), 3)
        .await
        .unwrap();
    assert_eq!(page.total, 7);
    let bodies: Vec<u8> = page.messages.iter().map(|m| m.content[2]).collect();
    assert_eq!(bodies, b"234");

    let page = fx
        .registry
        .get_club_channel_messages(club, 0, MessageCursor::FromNewest(2), 10)
        .await
        .unwrap();
    let bodies: Vec<u8> = page.messages.iter().map(|m| m.content[2]).collect();
    assert_eq!(bodies, b"56");
    assert!(page.messages.iter().all(|m| m.sender == creator && m.channel_index == 0));

    let page = fx
        .registry
        .get_club_channel_messages(club, 0, MessageCursor::Forward(9), 3)
        .await
        .unwrap();
    assert!(page.messages.is_empty());
    assert_eq!(page.total, 7);
}

// =========================================================================
// Thresholds
// =========================================================================

#[tokio::test]
async fn test_native_threshold_gates_posting() {
    let fx = fixture();
    let creator = acct("creator");
    let poster = acct("poster");
    let club = club_with_channel(&fx.registry, &creator).await;

    fx.balances.set_native(poster.clone(), 100).await;
    fx.registry
        .update_club_threshold(&creator, club, Threshold::Native { amount: 100 })
        .await
        .unwrap();

    assert!(fx.registry.meets_threshold(club, &poster).await.unwrap());
    fx.registry.new_message(&poster, club, 0, vec![0, 0]).await.unwrap();

    // Raising the threshold turns the same caller away.
    fx.registry
        .update_club_threshold(&creator, club, Threshold::Native { amount: 101 })
        .await
        .unwrap();
    assert!(!fx.registry.meets_threshold(club, &poster).await.unwrap());
    let result = fx.registry.new_message(&poster, club, 0, vec![0, 0]).await;
    assert!(matches!(result, Err(RegistryError::BelowThreshold(..))));

    let page = fx
        .registry
        .get_club_channel_messages(club, 0, MessageCursor::Forward(0), 10)
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn test_token_threshold_and_unknown_token() {
    let fx = fixture();
    let creator = acct("creator");
    let holder = acct("holder");
    let token = acct("0xtoken");
    let club = club_with_channel(&fx.registry, &creator).await;

    fx.registry
        .update_club_threshold(
            &creator,
            club,
            Threshold::Token {
                contract: token.clone(),
                amount: 5,
            },
        )
        .await
        .unwrap();

    // Token not known to the balance source yet.
    let result = fx.registry.new_message(&holder, club, 0, vec![0, 0]).await;
    assert!(matches!(result, Err(RegistryError::Access(_))));

    fx.balances.set_token(token, holder.clone(), 5).await;
    fx.registry.new_message(&holder, club, 0, vec![0, 0]).await.unwrap();

    let view = fx.registry.get_club_view(club).await.unwrap();
    assert_eq!(view.threshold.amount(), 5);
}

// =========================================================================
// Views, events, concurrency
// =========================================================================

#[tokio::test]
async fn test_view_by_ids_fails_on_unknown() {
    let fx = fixture();
    let a = club_with_channel(&fx.registry, &acct("a")).await;
    let b = club_with_channel(&fx.registry, &acct("b")).await;

    let views = fx.registry.get_club_view_by_ids(&[b, a]).await.unwrap();
    assert_eq!(views[0].club_id, b);
    assert_eq!(views[1].owner, acct("a"));

    let result = fx.registry.get_club_view_by_ids(&[a, ClubId(9)]).await;
    assert!(matches!(result, Err(RegistryError::ClubNotFound(ClubId(9)))));
}

#[tokio::test]
async fn test_events_follow_commit_order() {
    let mut fx = fixture();
    let creator = acct("creator");
    let club = club_with_channel(&fx.registry, &creator).await;

    fx.registry.add_club_admin(&creator, club, acct("x")).await.unwrap();
    fx.registry.update_club_name(&creator, club, "renamed".into()).await.unwrap();
    fx.registry.join_club(&acct("m"), club).await.unwrap();
    // No-op changes emit nothing.
    fx.registry.add_club_admin(&creator, club, acct("x")).await.unwrap();

    let events = drain(&mut fx.events);
    assert_eq!(events.len(), 5, "{events:?}");
    assert!(matches!(events[0], ClubEvent::ClubCreated { fee_charged: FEE, .. }));
    assert!(matches!(events[1], ClubEvent::ChannelAdded { channel_index: 0, .. }));
    assert!(matches!(events[2], ClubEvent::AdminAdded { .. }));
    assert!(matches!(
        events[3],
        ClubEvent::ClubUpdated { field: ClubField::Name, .. }
    ));
    assert!(matches!(events[4], ClubEvent::MemberJoined { .. }));
    assert!(events.iter().all(|e| e.club_id() == Some(club)));
}

#[tokio::test]
async fn test_registry_works_without_event_listener() {
    let fx = fixture();
    drop(fx.events);
    let club = club_with_channel(&fx.registry, &acct("a")).await;
    fx.registry.join_club(&acct("b"), club).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_admin_adds_are_serialized() {
    let fx = fixture();
    let creator = acct("creator");
    let club = club_with_channel(&fx.registry, &creator).await;

    let mut tasks = Vec::new();
    for i in 0..32 {
        let registry = Arc::clone(&fx.registry);
        let creator = creator.clone();
        tasks.push(tokio::spawn(async move {
            // Every task adds the same pair, in opposite orders.
            let (a, b) = if i % 2 == 0 { ("x", "y") } else { ("y", "x") };
            registry.add_club_admin(&creator, club, acct(a)).await.unwrap();
            registry.add_club_admin(&creator, club, acct(b)).await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let mut admins = fx.registry.get_club_admins(club).await.unwrap();
    admins.sort();
    assert_eq!(admins, vec![acct("x"), acct("y")]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creations_get_distinct_ids() {
    let fx = fixture();
    let mut tasks = Vec::new();
    for i in 0..16 {
        let registry = Arc::clone(&fx.registry);
        tasks.push(tokio::spawn(async move {
            registry
                .create_club(&acct(&format!("u{i}")), FEE, NewClub::named("x"))
                .await
                .unwrap()
                .club_id
        }));
    }
    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.unwrap().0);
    }
    ids.sort();
    assert_eq!(ids, (0..16).collect::<Vec<_>>());
    assert_eq!(fx.registry.balance().await, FEE * 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_keep_joined_index_in_step() {
    let fx = fixture();
    let mut clubs = Vec::new();
    for i in 0..3 {
        clubs.push(club_with_channel(&fx.registry, &acct(&format!("c{i}"))).await);
    }

    let mut tasks = Vec::new();
    for i in 0..24 {
        let registry = Arc::clone(&fx.registry);
        let clubs = clubs.clone();
        tasks.push(tokio::spawn(async move {
            let member = acct(&format!("m{i}"));
            for step in 0..clubs.len() {
                let club = clubs[(i + step) % clubs.len()];
                registry.join_club(&member, club).await.unwrap();
            }
        }));
    }

    // A member seen in a club must already be in its joined index.
    let registry = Arc::clone(&fx.registry);
    let reader_clubs = clubs.clone();
    let reader = tokio::spawn(async move {
        for _ in 0..50 {
            for &club in &reader_clubs {
                for member in registry.get_club_members(club).await.unwrap() {
                    let joined = registry.get_joined_club_ids(&member).await;
                    assert!(joined.contains(&club), "{member} in {club} but not indexed");
                }
            }
            tokio::task::yield_now().await;
        }
    });

    for task in tasks {
        task.await.unwrap();
    }
    reader.await.unwrap();

    for i in 0..24 {
        let mut joined = fx.registry.get_joined_club_ids(&acct(&format!("m{i}"))).await;
        joined.sort();
        assert_eq!(joined, clubs);
    }
    for &club in &clubs {
        assert_eq!(fx.registry.get_club_members(club).await.unwrap().len(), 24);
    }
}
