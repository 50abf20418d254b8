use std::sync::Arc;

use clubhouse::clubhouse_protocol::{Codec, JsonCodec};
use clubhouse::clubhouse_registry::DEFAULT_CREATION_FEE;
use clubhouse::prelude::*;

// ---------------------------------------------------------------------------
// Walkthrough: a registry owner, a club owner, and a crowd of members
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), ClubhouseError> {
    init_tracing();

    let treasury = AccountId::new("treasury");
    let owner = AccountId::new("club-owner");
    let helper = AccountId::new("helper");

    let balances = Arc::new(MemoryBalances::new());
    let (gateway, mut events) = ClubhouseBuilder::new()
        .registry_owner(treasury.clone())
        .initial_fee(DEFAULT_CREATION_FEE)
        .build(Arc::clone(&balances));
    let registry = Arc::clone(gateway.registry());

    // Indexer stand-in: print every event as JSON.
    let indexer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => tracing::info!(target: "indexer", "{json}"),
                Err(e) => tracing::warn!(error = %e, "unprintable event"),
            }
        }
    });

    // --- Fees ---
    let fee = registry.fee().await;
    registry.set_fee(&treasury, fee * 2).await?;
    let fee = registry.fee().await;
    tracing::info!(fee, "creation fee doubled");

    let receipt = registry
        .create_club(
            &owner,
            fee,
            NewClub {
                description: "walkthrough club".into(),
                initial_channel: Some("general".into()),
                ..NewClub::named("club name")
            },
        )
        .await?;
    let club = receipt.club_id;
    tracing::info!(%club, "club created");

    let withdrawn = registry.withdraw(&treasury).await?;
    tracing::info!(withdrawn, "fees withdrawn");

    // --- Admins ---
    registry.add_club_admin(&owner, club, helper.clone()).await?;
    let authorized = registry.is_authorized_for_club(club, &helper).await?;
    let admins = registry.get_club_admins(club).await?;
    tracing::info!(authorized, admins = admins.len(), "after adding helper");

    registry.remove_club_admin(&owner, club, helper.clone()).await?;
    let authorized = registry.is_authorized_for_club(club, &helper).await?;
    let admins = registry.get_club_admins(club).await?;
    tracing::info!(authorized, admins = admins.len(), "after removing helper");

    registry
        .update_club_name(&owner, club, "new club name".into())
        .await?;
    let name = registry.get_club_name(club).await?;
    tracing::info!(%name, "club renamed");

    // --- Members ---
    for i in 0..10 {
        registry
            .join_club(&AccountId::new(format!("member-{i}")), club)
            .await?;
    }
    let members = registry.get_club_members(club).await?;
    let page = registry.get_club_members_paged(club, 1, 8).await?;
    tracing::info!(members = members.len(), page = page.len(), "members joined");

    // --- Threshold-gated posting, through the JSON gateway ---
    registry
        .update_club_threshold(&owner, club, Threshold::Native { amount: 100 })
        .await?;
    balances.set_native(AccountId::new("member-0"), 100).await;

    for poster in ["member-0", "member-1"] {
        let request = Request::PostText {
            club_id: club,
            channel_index: 0,
            message: ChannelMessage::text(format!("gm from {poster}")),
            scheme: Some(Scheme::Xor),
        };
        let bytes = JsonCodec.encode(&request)?;
        let reply = gateway.handle_bytes(&AccountId::new(poster), &bytes).await?;
        tracing::info!(%poster, reply = %String::from_utf8_lossy(&reply), "post attempted");
    }

    let reply = gateway
        .handle(
            &owner,
            Request::ReadChannel {
                club_id: club,
                channel_index: 0,
                cursor: MessageCursor::FromNewest(10),
                count: 10,
            },
        )
        .await?;
    if let Reply::Texts { messages, total } = reply {
        for m in &messages {
            tracing::info!(sender = %m.sender, text = %m.message.text, "history");
        }
        tracing::info!(total, "channel read");
    }

    // --- A few more clubs, then the registry-wide queries ---
    for i in 0..4 {
        registry
            .create_club(
                &AccountId::new(format!("founder-{i}")),
                fee,
                NewClub::named(format!("club {i}")),
            )
            .await?;
    }
    let clubs = registry.club_count().await;
    let third = registry.get_club_name(ClubId(2)).await?;
    let third_owner = registry.get_club_owner(ClubId(2)).await?;
    let owned = registry.get_clubs_by_owner(&owner).await;
    tracing::info!(clubs, %third, %third_owner, ?owned, "registry summary");

    drop(registry);
    drop(gateway);
    let _ = indexer.await;
    Ok(())
}
