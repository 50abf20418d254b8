//! Club registry: creates clubs, routes operations to their actors, and
//! owns the registry-wide fee and index state.

use std::collections::HashMap;
use std::sync::Arc;

use clubhouse_access::BalanceLookup;
use clubhouse_protocol::{AccountId, Amount, ClubEvent, ClubField, ClubId, Threshold};
use tokio::sync::{Mutex, RwLock};

use crate::club::{AdminOp, ClubHandle, EventSender, spawn_club};
use crate::{
    ClubReceipt, ClubView, FeeLedger, MessageCursor, MessagePage, NewClub,
    RegistryConfig, RegistryError,
};

/// The entry point for every club operation.
///
/// Share it behind an `Arc`; every method takes `&self`.
///
/// ## Locking
///
/// Per-club state lives in the club's actor, so operations on different
/// clubs never contend. Registry-wide state is guarded coarsely:
///
/// - `ledger` (mutex) serializes creation, fee changes and withdrawals.
///   Creation holds it while the club is published so ids, charges and
///   `ClubCreated` events come out in the same order.
/// - `clubs` (rwlock) is only held to clone a handle, never across an
///   actor round-trip.
/// - `joined` (rwlock) is held across the `Join` round-trip. Actors never
///   take registry locks.
pub struct ClubRegistry<B: BalanceLookup> {
    config: RegistryConfig,
    balances: Arc<B>,
    events: EventSender,
    ledger: Mutex<FeeLedger>,
    /// Club handles indexed by id. Ids are dense and never removed.
    clubs: RwLock<Vec<ClubHandle>>,
    /// Clubs created by each identity, in creation order.
    owned: RwLock<HashMap<AccountId, Vec<ClubId>>>,
    /// Clubs joined by each identity, in join order.
    joined: RwLock<HashMap<AccountId, Vec<ClubId>>>,
}

impl<B: BalanceLookup> ClubRegistry<B> {
    /// Creates an empty registry.
    pub fn new(config: RegistryConfig, balances: Arc<B>, events: EventSender) -> Self {
        Self {
            ledger: Mutex::new(FeeLedger::new(config.initial_fee)),
            config,
            balances,
            events,
            clubs: RwLock::new(Vec::new()),
            owned: RwLock::new(HashMap::new()),
            joined: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the configuration the registry was built with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // -----------------------------------------------------------------
    // Fees
    // -----------------------------------------------------------------

    /// Creates a club owned by `caller`.
    ///
    /// `payment` must cover the current fee; the excess is reported back
    /// in [`ClubReceipt::refund`].
    pub async fn create_club(
        &self,
        caller: &AccountId,
        payment: Amount,
        params: NewClub,
    ) -> Result<ClubReceipt, RegistryError> {
        let mut ledger = self.ledger.lock().await;
        let charge = ledger.charge(payment).inspect_err(|e| {
            tracing::debug!(%caller, error = %e, "club creation rejected");
        })?;

        let mut clubs = self.clubs.write().await;
        let club_id = ClubId(clubs.len() as u64);

        self.emit(ClubEvent::ClubCreated {
            club_id,
            owner: caller.clone(),
            name: params.name.clone(),
            fee_charged: charge.fee,
        });
        if let Some(name) = &params.initial_channel {
            self.emit(ClubEvent::ChannelAdded {
                club_id,
                channel_index: 0,
                name: name.clone(),
            });
        }

        let handle = spawn_club(
            club_id,
            caller.clone(),
            params,
            Arc::clone(&self.balances),
            self.events.clone(),
            self.config.command_buffer,
        );
        clubs.push(handle);
        drop(clubs);

        self.owned
            .write()
            .await
            .entry(caller.clone())
            .or_default()
            .push(club_id);

        tracing::info!(%club_id, owner = %caller, fee = charge.fee, "club created");
        Ok(ClubReceipt {
            club_id,
            fee_charged: charge.fee,
            refund: charge.refund,
        })
    }

    /// Replaces the creation fee. Registry owner only. Returns the old fee.
    pub async fn set_fee(
        &self,
        caller: &AccountId,
        new_fee: Amount,
    ) -> Result<Amount, RegistryError> {
        self.require_registry_owner(caller)?;
        let old_fee = self.ledger.lock().await.set_fee(new_fee);
        tracing::info!(old_fee, new_fee, "creation fee updated");
        self.emit(ClubEvent::FeeUpdated { old_fee, new_fee });
        Ok(old_fee)
    }

    /// Withdraws every accumulated fee to the registry owner.
    ///
    /// Returns the amount withdrawn; 0 when there was nothing to take.
    pub async fn withdraw(&self, caller: &AccountId) -> Result<Amount, RegistryError> {
        self.require_registry_owner(caller)?;
        let amount = self.ledger.lock().await.withdraw_all();
        if amount > 0 {
            tracing::info!(to = %caller, amount, "fees withdrawn");
            self.emit(ClubEvent::FeesWithdrawn {
                to: caller.clone(),
                amount,
            });
        }
        Ok(amount)
    }

    /// The fee a creation call must pay right now.
    pub async fn fee(&self) -> Amount {
        self.ledger.lock().await.fee()
    }

    /// Fees accumulated since the last withdrawal.
    pub async fn balance(&self) -> Amount {
        self.ledger.lock().await.balance()
    }

    // -----------------------------------------------------------------
    // Administration
    // -----------------------------------------------------------------

    /// Grants admin rights. Adding an existing admin is a no-op.
    pub async fn add_club_admin(
        &self,
        caller: &AccountId,
        club_id: ClubId,
        admin: AccountId,
    ) -> Result<(), RegistryError> {
        self.administer(caller, club_id, AdminOp::AddAdmin(admin)).await
    }

    /// Revokes admin rights. Fails with
    /// [`RegistryError::AdminNotFound`] if `admin` isn't listed.
    pub async fn remove_club_admin(
        &self,
        caller: &AccountId,
        club_id: ClubId,
        admin: AccountId,
    ) -> Result<(), RegistryError> {
        self.administer(caller, club_id, AdminOp::RemoveAdmin(admin)).await
    }

    pub async fn update_club_name(
        &self,
        caller: &AccountId,
        club_id: ClubId,
        name: String,
    ) -> Result<(), RegistryError> {
        self.update_club_field(caller, club_id, ClubField::Name, name).await
    }

    pub async fn update_club_description(
        &self,
        caller: &AccountId,
        club_id: ClubId,
        description: String,
    ) -> Result<(), RegistryError> {
        self.update_club_field(caller, club_id, ClubField::Description, description)
            .await
    }

    pub async fn update_club_logo(
        &self,
        caller: &AccountId,
        club_id: ClubId,
        logo: String,
    ) -> Result<(), RegistryError> {
        self.update_club_field(caller, club_id, ClubField::Logo, logo).await
    }

    pub async fn update_club_announcement(
        &self,
        caller: &AccountId,
        club_id: ClubId,
        announcement: String,
    ) -> Result<(), RegistryError> {
        self.update_club_field(caller, club_id, ClubField::Announcement, announcement)
            .await
    }

    /// Replaces one of the club's single-valued text fields.
    pub async fn update_club_field(
        &self,
        caller: &AccountId,
        club_id: ClubId,
        field: ClubField,
        value: String,
    ) -> Result<(), RegistryError> {
        self.administer(caller, club_id, AdminOp::SetField(field, value))
            .await
    }

    /// Replaces the posting threshold, kind and amount together.
    pub async fn update_club_threshold(
        &self,
        caller: &AccountId,
        club_id: ClubId,
        threshold: Threshold,
    ) -> Result<(), RegistryError> {
        self.administer(caller, club_id, AdminOp::SetThreshold(threshold))
            .await
    }

    // -----------------------------------------------------------------
    // Channels
    // -----------------------------------------------------------------

    /// Appends a channel and returns its index.
    pub async fn add_club_channel(
        &self,
        caller: &AccountId,
        club_id: ClubId,
        name: String,
    ) -> Result<u32, RegistryError> {
        self.handle(club_id)
            .await?
            .add_channel(caller.clone(), name)
            .await
    }

    /// Renames an active channel.
    pub async fn update_club_channel_name(
        &self,
        caller: &AccountId,
        club_id: ClubId,
        channel_index: u32,
        name: String,
    ) -> Result<(), RegistryError> {
        self.administer(caller, club_id, AdminOp::RenameChannel(channel_index, name))
            .await
    }

    /// Soft-deletes a channel. Deleting twice succeeds.
    pub async fn delete_club_channel(
        &self,
        caller: &AccountId,
        club_id: ClubId,
        channel_index: u32,
    ) -> Result<(), RegistryError> {
        self.administer(caller, club_id, AdminOp::DeleteChannel(channel_index))
            .await
    }

    // -----------------------------------------------------------------
    // Participation
    // -----------------------------------------------------------------

    /// Adds `caller` to the club's members. Anyone may join, owner and
    /// admins included; joining twice fails with
    /// [`RegistryError::AlreadyMember`].
    ///
    /// The joined index stays locked across the actor round-trip, so a
    /// reader that sees the new member in the club also finds the club in
    /// [`get_joined_club_ids`](Self::get_joined_club_ids).
    pub async fn join_club(
        &self,
        caller: &AccountId,
        club_id: ClubId,
    ) -> Result<(), RegistryError> {
        let handle = self.handle(club_id).await?;
        let mut joined = self.joined.write().await;
        handle.join(caller.clone()).await?;
        joined.entry(caller.clone()).or_default().push(club_id);
        Ok(())
    }

    /// Appends a message and returns its index within the channel.
    ///
    /// The caller must meet the club's threshold at the moment the club
    /// processes the message.
    pub async fn new_message(
        &self,
        caller: &AccountId,
        club_id: ClubId,
        channel_index: u32,
        content: Vec<u8>,
    ) -> Result<u64, RegistryError> {
        self.handle(club_id)
            .await?
            .post(caller.clone(), channel_index, content)
            .await
    }

    // -----------------------------------------------------------------
    // Access checks
    // -----------------------------------------------------------------

    /// `true` iff `identity` is the owner or an explicit admin.
    pub async fn is_authorized_for_club(
        &self,
        club_id: ClubId,
        identity: &AccountId,
    ) -> Result<bool, RegistryError> {
        self.handle(club_id)
            .await?
            .is_authorized(identity.clone())
            .await
    }

    /// `true` iff `identity` currently meets the club's posting threshold.
    pub async fn meets_threshold(
        &self,
        club_id: ClubId,
        identity: &AccountId,
    ) -> Result<bool, RegistryError> {
        self.handle(club_id)
            .await?
            .meets_threshold(identity.clone())
            .await
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// Number of clubs ever created.
    pub async fn club_count(&self) -> u64 {
        self.clubs.read().await.len() as u64
    }

    pub async fn get_club_name(&self, club_id: ClubId) -> Result<String, RegistryError> {
        self.get_club_field(club_id, ClubField::Name).await
    }

    /// Current value of one of the club's text fields.
    pub async fn get_club_field(
        &self,
        club_id: ClubId,
        field: ClubField,
    ) -> Result<String, RegistryError> {
        self.handle(club_id).await?.field(field).await
    }

    pub async fn get_club_owner(&self, club_id: ClubId) -> Result<AccountId, RegistryError> {
        Ok(self.handle(club_id).await?.owner().clone())
    }

    /// Explicit admins in insertion order. The owner only appears here if
    /// it was added explicitly.
    pub async fn get_club_admins(
        &self,
        club_id: ClubId,
    ) -> Result<Vec<AccountId>, RegistryError> {
        self.handle(club_id).await?.admins().await
    }

    /// All members in join order.
    pub async fn get_club_members(
        &self,
        club_id: ClubId,
    ) -> Result<Vec<AccountId>, RegistryError> {
        self.handle(club_id).await?.members(0, usize::MAX).await
    }

    /// Members `offset..offset + limit` in join order. An offset at or
    /// past the end yields an empty page.
    pub async fn get_club_members_paged(
        &self,
        club_id: ClubId,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<AccountId>, RegistryError> {
        self.handle(club_id).await?.members(offset, limit).await
    }

    /// Clubs created by `owner`, oldest first.
    pub async fn get_clubs_by_owner(&self, owner: &AccountId) -> Vec<ClubId> {
        self.owned.read().await.get(owner).cloned().unwrap_or_default()
    }

    /// Clubs joined by `member`, in join order.
    pub async fn get_joined_club_ids(&self, member: &AccountId) -> Vec<ClubId> {
        self.joined.read().await.get(member).cloned().unwrap_or_default()
    }

    /// A consistent snapshot of one club.
    pub async fn get_club_view(&self, club_id: ClubId) -> Result<ClubView, RegistryError> {
        self.handle(club_id).await?.view().await
    }

    /// Snapshots of several clubs, in the order requested. Fails on the
    /// first unknown id.
    pub async fn get_club_view_by_ids(
        &self,
        club_ids: &[ClubId],
    ) -> Result<Vec<ClubView>, RegistryError> {
        let mut views = Vec::with_capacity(club_ids.len());
        for club_id in club_ids {
            views.push(self.get_club_view(*club_id).await?);
        }
        Ok(views)
    }

    /// A page of channel history plus the channel's total message count.
    /// Deleted channels stay readable.
    pub async fn get_club_channel_messages(
        &self,
        club_id: ClubId,
        channel_index: u32,
        cursor: MessageCursor,
        count: u64,
    ) -> Result<MessagePage, RegistryError> {
        self.handle(club_id)
            .await?
            .messages(channel_index, cursor, count)
            .await
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    /// Clones the club's handle so the table lock is released before the
    /// actor round-trip.
    async fn handle(&self, club_id: ClubId) -> Result<ClubHandle, RegistryError> {
        let clubs = self.clubs.read().await;
        usize::try_from(club_id.0)
            .ok()
            .and_then(|index| clubs.get(index))
            .cloned()
            .ok_or(RegistryError::ClubNotFound(club_id))
    }

    async fn administer(
        &self,
        caller: &AccountId,
        club_id: ClubId,
        op: AdminOp,
    ) -> Result<(), RegistryError> {
        self.handle(club_id)
            .await?
            .administer(caller.clone(), op)
            .await
    }

    fn require_registry_owner(&self, caller: &AccountId) -> Result<(), RegistryError> {
        if *caller == self.config.registry_owner {
            return Ok(());
        }
        tracing::debug!(%caller, "rejected: caller is not the registry owner");
        Err(RegistryError::NotRegistryOwner(caller.clone()))
    }

    fn emit(&self, event: ClubEvent) {
        let _ = self.events.send(event);
    }
}
