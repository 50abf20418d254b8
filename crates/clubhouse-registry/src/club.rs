//! Club actor: an isolated Tokio task that owns one club's state.
//!
//! Each club runs in its own task and processes commands one at a time from
//! an mpsc channel. Every mutation and every read of a club happens at that
//! single serialization point, so concurrent admin changes can't interleave
//! and snapshots can't observe half-applied state.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use clubhouse_access::{BalanceLookup, is_authorized_for_club, meets_threshold};
use clubhouse_protocol::{AccountId, ClubEvent, ClubField, ClubId, Threshold};
use tokio::sync::{mpsc, oneshot};

use crate::{
    ChannelState, ChannelView, ClubView, MessageCursor, MessagePage, NewClub,
    RegistryError, StoredMessage,
};

/// Channel sender receiving one [`ClubEvent`] per committed change.
///
/// Delivery is fire-and-forget: if the receiver is dropped, events are
/// discarded and operations still succeed.
pub type EventSender = mpsc::UnboundedSender<ClubEvent>;

type Reply<T> = oneshot::Sender<Result<T, RegistryError>>;

/// Mutations that require the caller to be authorized for the club.
pub(crate) enum AdminOp {
    AddAdmin(AccountId),
    RemoveAdmin(AccountId),
    SetField(ClubField, String),
    SetThreshold(Threshold),
    RenameChannel(u32, String),
    DeleteChannel(u32),
}

/// Commands sent to a club actor through its channel.
///
/// The `oneshot::Sender` in each variant is the reply channel.
pub(crate) enum ClubCommand {
    Administer {
        caller: AccountId,
        op: AdminOp,
        reply: Reply<()>,
    },
    AddChannel {
        caller: AccountId,
        name: String,
        reply: Reply<u32>,
    },
    Join {
        member: AccountId,
        reply: Reply<()>,
    },
    Post {
        sender: AccountId,
        channel_index: u32,
        content: Vec<u8>,
        reply: Reply<u64>,
    },
    CheckThreshold {
        identity: AccountId,
        reply: Reply<bool>,
    },
    IsAuthorized {
        identity: AccountId,
        reply: oneshot::Sender<bool>,
    },
    View {
        reply: oneshot::Sender<ClubView>,
    },
    Field {
        field: ClubField,
        reply: oneshot::Sender<String>,
    },
    Admins {
        reply: oneshot::Sender<Vec<AccountId>>,
    },
    Members {
        offset: usize,
        limit: usize,
        reply: oneshot::Sender<Vec<AccountId>>,
    },
    Messages {
        channel_index: u32,
        cursor: MessageCursor,
        count: u64,
        reply: Reply<MessagePage>,
    },
}

/// Handle to a running club actor.
///
/// Cheap to clone: an `mpsc::Sender` plus the club's immutable identity.
#[derive(Clone)]
pub(crate) struct ClubHandle {
    club_id: ClubId,
    owner: AccountId,
    sender: mpsc::Sender<ClubCommand>,
}

impl ClubHandle {
    pub(crate) fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Sends a command built around a fresh reply channel and waits for
    /// the answer.
    async fn call<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> ClubCommand,
    ) -> Result<T, RegistryError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(build(reply_tx))
            .await
            .map_err(|_| RegistryError::Unavailable(self.club_id))?;
        reply_rx
            .await
            .map_err(|_| RegistryError::Unavailable(self.club_id))
    }

    pub(crate) async fn administer(
        &self,
        caller: AccountId,
        op: AdminOp,
    ) -> Result<(), RegistryError> {
        self.call(|reply| ClubCommand::Administer { caller, op, reply })
            .await?
    }

    pub(crate) async fn add_channel(
        &self,
        caller: AccountId,
        name: String,
    ) -> Result<u32, RegistryError> {
        self.call(|reply| ClubCommand::AddChannel { caller, name, reply })
            .await?
    }

    pub(crate) async fn join(&self, member: AccountId) -> Result<(), RegistryError> {
        self.call(|reply| ClubCommand::Join { member, reply }).await?
    }

    pub(crate) async fn post(
        &self,
        sender: AccountId,
        channel_index: u32,
        content: Vec<u8>,
    ) -> Result<u64, RegistryError> {
        self.call(|reply| ClubCommand::Post {
            sender,
            channel_index,
            content,
            reply,
        })
        .await?
    }

    pub(crate) async fn meets_threshold(
        &self,
        identity: AccountId,
    ) -> Result<bool, RegistryError> {
        self.call(|reply| ClubCommand::CheckThreshold { identity, reply })
            .await?
    }

    pub(crate) async fn is_authorized(
        &self,
        identity: AccountId,
    ) -> Result<bool, RegistryError> {
        self.call(|reply| ClubCommand::IsAuthorized { identity, reply })
            .await
    }

    pub(crate) async fn view(&self) -> Result<ClubView, RegistryError> {
        self.call(|reply| ClubCommand::View { reply }).await
    }

    pub(crate) async fn field(&self, field: ClubField) -> Result<String, RegistryError> {
        self.call(|reply| ClubCommand::Field { field, reply }).await
    }

    pub(crate) async fn admins(&self) -> Result<Vec<AccountId>, RegistryError> {
        self.call(|reply| ClubCommand::Admins { reply }).await
    }

    pub(crate) async fn members(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<AccountId>, RegistryError> {
        self.call(|reply| ClubCommand::Members {
            offset,
            limit,
            reply,
        })
        .await
    }

    pub(crate) async fn messages(
        &self,
        channel_index: u32,
        cursor: MessageCursor,
        count: u64,
    ) -> Result<MessagePage, RegistryError> {
        self.call(|reply| ClubCommand::Messages {
            channel_index,
            cursor,
            count,
            reply,
        })
        .await?
    }
}

struct Channel {
    name: String,
    state: ChannelState,
    messages: Vec<StoredMessage>,
}

impl Channel {
    fn new(name: String) -> Self {
        Self {
            name,
            state: ChannelState::Active,
            messages: Vec::new(),
        }
    }
}

/// The internal club state. Runs inside a Tokio task.
struct ClubActor<B: BalanceLookup> {
    club_id: ClubId,
    owner: AccountId,
    name: String,
    logo: String,
    description: String,
    announcement: String,
    threshold: Threshold,
    /// Explicit admins in insertion order. Never holds duplicates.
    admins: Vec<AccountId>,
    /// Members in join order, mirrored by `member_set` for lookups.
    members: Vec<AccountId>,
    member_set: HashSet<AccountId>,
    channels: Vec<Channel>,
    balances: Arc<B>,
    events: EventSender,
    receiver: mpsc::Receiver<ClubCommand>,
}

impl<B: BalanceLookup> ClubActor<B> {
    /// Runs the actor loop until every handle is dropped.
    async fn run(mut self) {
        tracing::info!(club_id = %self.club_id, "club actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                ClubCommand::Administer { caller, op, reply } => {
                    let result = self.handle_admin(&caller, op);
                    let _ = reply.send(result);
                }
                ClubCommand::AddChannel {
                    caller,
                    name,
                    reply,
                } => {
                    let result = self.handle_add_channel(&caller, name);
                    let _ = reply.send(result);
                }
                ClubCommand::Join { member, reply } => {
                    let result = self.handle_join(member);
                    let _ = reply.send(result);
                }
                ClubCommand::Post {
                    sender,
                    channel_index,
                    content,
                    reply,
                } => {
                    let result =
                        self.handle_post(sender, channel_index, content).await;
                    let _ = reply.send(result);
                }
                ClubCommand::CheckThreshold { identity, reply } => {
                    let result = self.check_threshold(&identity).await;
                    let _ = reply.send(result);
                }
                ClubCommand::IsAuthorized { identity, reply } => {
                    let _ = reply.send(self.is_authorized(&identity));
                }
                ClubCommand::View { reply } => {
                    let _ = reply.send(self.view());
                }
                ClubCommand::Field { field, reply } => {
                    let _ = reply.send(self.field(field).to_owned());
                }
                ClubCommand::Admins { reply } => {
                    let _ = reply.send(self.admins.clone());
                }
                ClubCommand::Members {
                    offset,
                    limit,
                    reply,
                } => {
                    let page = self
                        .members
                        .iter()
                        .skip(offset)
                        .take(limit)
                        .cloned()
                        .collect();
                    let _ = reply.send(page);
                }
                ClubCommand::Messages {
                    channel_index,
                    cursor,
                    count,
                    reply,
                } => {
                    let result = self.messages(channel_index, cursor, count);
                    let _ = reply.send(result);
                }
            }
        }

        tracing::info!(club_id = %self.club_id, "club actor stopped");
    }

    fn is_authorized(&self, identity: &AccountId) -> bool {
        is_authorized_for_club(&self.owner, &self.admins, identity)
    }

    fn authorize(&self, caller: &AccountId) -> Result<(), RegistryError> {
        if self.is_authorized(caller) {
            return Ok(());
        }
        tracing::debug!(
            club_id = %self.club_id,
            %caller,
            "rejected: caller is not owner or admin"
        );
        Err(RegistryError::NotAuthorized(caller.clone(), self.club_id))
    }

    fn handle_admin(
        &mut self,
        caller: &AccountId,
        op: AdminOp,
    ) -> Result<(), RegistryError> {
        self.authorize(caller)?;
        let club_id = self.club_id;

        match op {
            AdminOp::AddAdmin(admin) => {
                if self.admins.contains(&admin) {
                    tracing::debug!(%club_id, %admin, "already an admin");
                    return Ok(());
                }
                self.admins.push(admin.clone());
                tracing::info!(%club_id, %admin, %caller, "admin added");
                self.emit(ClubEvent::AdminAdded { club_id, admin });
            }
            AdminOp::RemoveAdmin(admin) => {
                let pos = self
                    .admins
                    .iter()
                    .position(|a| *a == admin)
                    .ok_or_else(|| {
                        RegistryError::AdminNotFound(admin.clone(), club_id)
                    })?;
                self.admins.remove(pos);
                tracing::info!(%club_id, %admin, %caller, "admin removed");
                self.emit(ClubEvent::AdminRemoved { club_id, admin });
            }
            AdminOp::SetField(field, value) => {
                let slot = match field {
                    ClubField::Name => &mut self.name,
                    ClubField::Logo => &mut self.logo,
                    ClubField::Description => &mut self.description,
                    ClubField::Announcement => &mut self.announcement,
                };
                slot.clone_from(&value);
                tracing::info!(%club_id, %field, "club field updated");
                self.emit(ClubEvent::ClubUpdated {
                    club_id,
                    field,
                    value,
                });
            }
            AdminOp::SetThreshold(threshold) => {
                self.threshold = threshold.clone();
                tracing::info!(%club_id, %threshold, "threshold updated");
                self.emit(ClubEvent::ThresholdUpdated { club_id, threshold });
            }
            AdminOp::RenameChannel(channel_index, name) => {
                let channel = self.active_channel_mut(channel_index)?;
                channel.name.clone_from(&name);
                tracing::info!(%club_id, channel_index, "channel renamed");
                self.emit(ClubEvent::ChannelRenamed {
                    club_id,
                    channel_index,
                    name,
                });
            }
            AdminOp::DeleteChannel(channel_index) => {
                let channel = self.channel_mut(channel_index)?;
                if !channel.state.is_active() {
                    return Ok(());
                }
                channel.state = ChannelState::Deleted;
                tracing::info!(%club_id, channel_index, "channel deleted");
                self.emit(ClubEvent::ChannelDeleted {
                    club_id,
                    channel_index,
                });
            }
        }

        Ok(())
    }

    fn handle_add_channel(
        &mut self,
        caller: &AccountId,
        name: String,
    ) -> Result<u32, RegistryError> {
        self.authorize(caller)?;
        let channel_index = u32::try_from(self.channels.len()).map_err(|_| {
            RegistryError::InvalidState("channel index space exhausted".into())
        })?;
        self.channels.push(Channel::new(name.clone()));
        tracing::info!(club_id = %self.club_id, channel_index, "channel added");
        self.emit(ClubEvent::ChannelAdded {
            club_id: self.club_id,
            channel_index,
            name,
        });
        Ok(channel_index)
    }

    fn handle_join(&mut self, member: AccountId) -> Result<(), RegistryError> {
        if self.member_set.contains(&member) {
            return Err(RegistryError::AlreadyMember(member, self.club_id));
        }
        self.member_set.insert(member.clone());
        self.members.push(member.clone());
        tracing::info!(
            club_id = %self.club_id,
            %member,
            members = self.members.len(),
            "member joined"
        );
        self.emit(ClubEvent::MemberJoined {
            club_id: self.club_id,
            member,
        });
        Ok(())
    }

    async fn handle_post(
        &mut self,
        sender: AccountId,
        channel_index: u32,
        content: Vec<u8>,
    ) -> Result<u64, RegistryError> {
        let club_id = self.club_id;
        self.active_channel_mut(channel_index)?;

        if !self.check_threshold(&sender).await? {
            tracing::debug!(%club_id, %sender, "rejected: below threshold");
            return Err(RegistryError::BelowThreshold(sender, club_id));
        }

        let timestamp = unix_now();
        let channel = self.active_channel_mut(channel_index)?;
        let message_index = channel.messages.len() as u64;
        channel.messages.push(StoredMessage {
            sender: sender.clone(),
            timestamp,
            channel_index,
            content,
        });
        tracing::debug!(%club_id, channel_index, message_index, "message posted");
        self.emit(ClubEvent::MessagePosted {
            club_id,
            channel_index,
            message_index,
            sender,
            timestamp,
        });
        Ok(message_index)
    }

    async fn check_threshold(
        &self,
        identity: &AccountId,
    ) -> Result<bool, RegistryError> {
        meets_threshold(&self.threshold, identity, self.balances.as_ref())
            .await
            .map_err(|e| {
                tracing::warn!(
                    club_id = %self.club_id,
                    %identity,
                    error = %e,
                    "threshold lookup failed"
                );
                RegistryError::from(e)
            })
    }

    fn messages(
        &self,
        channel_index: u32,
        cursor: MessageCursor,
        count: u64,
    ) -> Result<MessagePage, RegistryError> {
        let channel = self
            .channels
            .get(channel_index as usize)
            .ok_or(RegistryError::ChannelNotFound(self.club_id, channel_index))?;

        let total = channel.messages.len() as u64;
        let start = cursor.start(total) as usize;
        let count = usize::try_from(count).unwrap_or(usize::MAX);
        let messages = channel
            .messages
            .iter()
            .skip(start)
            .take(count)
            .cloned()
            .collect();
        Ok(MessagePage { messages, total })
    }

    fn field(&self, field: ClubField) -> &str {
        match field {
            ClubField::Name => &self.name,
            ClubField::Logo => &self.logo,
            ClubField::Description => &self.description,
            ClubField::Announcement => &self.announcement,
        }
    }

    fn view(&self) -> ClubView {
        let channels = self
            .channels
            .iter()
            .enumerate()
            .map(|(index, channel)| ChannelView {
                index: index as u32,
                name: channel.name.clone(),
                state: channel.state,
                message_count: channel.messages.len() as u64,
            })
            .collect::<Vec<_>>();

        ClubView {
            club_id: self.club_id,
            owner: self.owner.clone(),
            name: self.name.clone(),
            logo: self.logo.clone(),
            description: self.description.clone(),
            announcement: self.announcement.clone(),
            threshold: self.threshold.clone(),
            admins: self.admins.clone(),
            member_count: self.members.len() as u64,
            channel_count: channels.len() as u32,
            channels,
        }
    }

    fn channel_mut(
        &mut self,
        channel_index: u32,
    ) -> Result<&mut Channel, RegistryError> {
        self.channels
            .get_mut(channel_index as usize)
            .ok_or(RegistryError::ChannelNotFound(self.club_id, channel_index))
    }

    fn active_channel_mut(
        &mut self,
        channel_index: u32,
    ) -> Result<&mut Channel, RegistryError> {
        let club_id = self.club_id;
        let channel = self.channel_mut(channel_index)?;
        if !channel.state.is_active() {
            return Err(RegistryError::InvalidState(format!(
                "channel {channel_index} of club {club_id} is deleted"
            )));
        }
        Ok(channel)
    }

    /// Publishes an event. Silently drops it if nobody is listening.
    fn emit(&self, event: ClubEvent) {
        let _ = self.events.send(event);
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Spawns a new club actor task and returns a handle to it.
///
/// `buffer` bounds the command channel; senders wait when it fills up.
pub(crate) fn spawn_club<B: BalanceLookup>(
    club_id: ClubId,
    owner: AccountId,
    params: NewClub,
    balances: Arc<B>,
    events: EventSender,
    buffer: usize,
) -> ClubHandle {
    let (tx, rx) = mpsc::channel(buffer.max(1));

    let actor = ClubActor {
        club_id,
        owner: owner.clone(),
        name: params.name,
        logo: params.logo,
        description: params.description,
        announcement: params.announcement,
        threshold: params.threshold,
        admins: Vec::new(),
        members: Vec::new(),
        member_set: HashSet::new(),
        channels: params.initial_channel.into_iter().map(Channel::new).collect(),
        balances,
        events,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    ClubHandle {
        club_id,
        owner,
        sender: tx,
    }
}
