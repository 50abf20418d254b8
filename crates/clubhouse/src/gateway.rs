//! Request routing: the boundary a transport talks to.
//!
//! A transport authenticates the caller however it likes, then hands the
//! gateway `(caller, Request)` or raw request bytes. The flow is:
//!   1. Decode the request with the gateway's [`Codec`]
//!   2. Dispatch to the matching [`ClubRegistry`] operation
//!   3. Encode the [`Reply`], turning failures into [`Reply::Error`]

use std::sync::Arc;

use clubhouse_access::BalanceLookup;
use clubhouse_protocol::{
    AccountId, Amount, ChannelMessage, ClubId, Codec, JsonCodec, MessageCodec,
    Scheme, Threshold, ThresholdKind,
};
use clubhouse_registry::{
    ClubReceipt, ClubRegistry, ClubView, MessageCursor, MessagePage, NewClub,
    RegistryError,
};
use serde::{Deserialize, Serialize};

use crate::ClubhouseError;

// ---------------------------------------------------------------------------
// Request / Reply
// ---------------------------------------------------------------------------

/// Every operation a caller can ask for.
///
/// Serialized externally tagged by operation name:
///
/// ```json
/// {"join_club": {"club_id": 0}}
/// "withdraw"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Request {
    // -- Fees --
    CreateClub {
        payment: Amount,
        club: NewClub,
    },
    SetFee {
        fee: Amount,
    },
    Withdraw,
    GetFee,
    GetBalance,

    // -- Administration --
    AddClubAdmin {
        club_id: ClubId,
        admin: AccountId,
    },
    RemoveClubAdmin {
        club_id: ClubId,
        admin: AccountId,
    },
    UpdateClubName {
        club_id: ClubId,
        name: String,
    },
    UpdateClubDescription {
        club_id: ClubId,
        description: String,
    },
    UpdateClubLogo {
        club_id: ClubId,
        logo: String,
    },
    UpdateClubAnnouncement {
        club_id: ClubId,
        announcement: String,
    },
    /// Threshold as loose parts; see [`Threshold::from_parts`].
    UpdateClubThreshold {
        club_id: ClubId,
        kind: ThresholdKind,
        #[serde(default)]
        amount: Amount,
        #[serde(default)]
        contract: Option<AccountId>,
    },

    // -- Channels --
    AddClubChannel {
        club_id: ClubId,
        name: String,
    },
    UpdateClubChannelName {
        club_id: ClubId,
        channel_index: u32,
        name: String,
    },
    DeleteClubChannel {
        club_id: ClubId,
        channel_index: u32,
    },

    // -- Participation --
    JoinClub {
        club_id: ClubId,
    },
    /// Appends already-encoded content as-is.
    NewMessage {
        club_id: ClubId,
        channel_index: u32,
        content: Vec<u8>,
    },
    /// Encodes `message` with the gateway's message codec, then appends it.
    /// `scheme` defaults to the registry's configured scheme.
    PostText {
        club_id: ClubId,
        channel_index: u32,
        message: ChannelMessage,
        #[serde(default)]
        scheme: Option<Scheme>,
    },

    // -- Access checks --
    IsAuthorizedForClub {
        club_id: ClubId,
        identity: AccountId,
    },
    MeetsThreshold {
        club_id: ClubId,
        identity: AccountId,
    },

    // -- Queries --
    ClubCount,
    GetClubName {
        club_id: ClubId,
    },
    GetClubOwner {
        club_id: ClubId,
    },
    GetClubAdmins {
        club_id: ClubId,
    },
    GetClubMembers {
        club_id: ClubId,
    },
    GetClubMembersPaged {
        club_id: ClubId,
        offset: usize,
        limit: usize,
    },
    GetClubsByOwner {
        owner: AccountId,
    },
    GetJoinedClubIds {
        member: AccountId,
    },
    GetClubView {
        club_id: ClubId,
    },
    GetClubViewByIds {
        club_ids: Vec<ClubId>,
    },
    GetClubChannelMessages {
        club_id: ClubId,
        channel_index: u32,
        cursor: MessageCursor,
        count: u64,
    },
    /// Like `GetClubChannelMessages`, with every message decoded.
    ReadChannel {
        club_id: ClubId,
        channel_index: u32,
        cursor: MessageCursor,
        count: u64,
    },
}

/// A decoded message with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessage {
    pub sender: AccountId,
    pub timestamp: u64,
    pub message: ChannelMessage,
}

/// The answer to a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reply {
    /// The operation succeeded and has nothing to return.
    Done,
    Created(ClubReceipt),
    Fee { fee: Amount },
    Balance { balance: Amount },
    Withdrawn { amount: Amount },
    ChannelIndex { channel_index: u32 },
    MessageIndex { message_index: u64 },
    Authorized { authorized: bool },
    Eligible { eligible: bool },
    Count { count: u64 },
    Name { name: String },
    Owner { owner: AccountId },
    Accounts { accounts: Vec<AccountId> },
    ClubIds { club_ids: Vec<ClubId> },
    View(Box<ClubView>),
    Views(Vec<ClubView>),
    Messages(MessagePage),
    Texts { messages: Vec<TextMessage>, total: u64 },
    /// The request failed. See [`ErrorKind::code`](crate::ErrorKind::code).
    Error { code: u16, message: String },
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Routes requests to a shared [`ClubRegistry`].
///
/// Cheap to clone; every clone talks to the same registry.
pub struct Gateway<B: BalanceLookup, C: Codec = JsonCodec> {
    registry: Arc<ClubRegistry<B>>,
    codec: C,
    messages: MessageCodec,
}

impl<B: BalanceLookup, C: Codec + Clone> Clone for Gateway<B, C> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            codec: self.codec.clone(),
            messages: self.messages,
        }
    }
}

impl<B: BalanceLookup> Gateway<B, JsonCodec> {
    /// Creates a JSON gateway with the default message codec.
    pub fn new(registry: Arc<ClubRegistry<B>>) -> Self {
        Self::with_codecs(registry, JsonCodec, MessageCodec::default())
    }
}

impl<B: BalanceLookup, C: Codec> Gateway<B, C> {
    /// Creates a gateway with an explicit wire codec and message codec.
    pub fn with_codecs(
        registry: Arc<ClubRegistry<B>>,
        codec: C,
        messages: MessageCodec,
    ) -> Self {
        Self {
            registry,
            codec,
            messages,
        }
    }

    /// The registry behind this gateway.
    pub fn registry(&self) -> &Arc<ClubRegistry<B>> {
        &self.registry
    }

    /// The codec used for channel content.
    pub fn message_codec(&self) -> &MessageCodec {
        &self.messages
    }

    /// Decodes a request, runs it, and encodes the reply.
    ///
    /// Operation failures come back as an encoded [`Reply::Error`], so a
    /// transport can forward the bytes unconditionally.
    ///
    /// # Errors
    /// Only if the reply itself cannot be encoded.
    pub async fn handle_bytes(
        &self,
        caller: &AccountId,
        data: &[u8],
    ) -> Result<Vec<u8>, ClubhouseError> {
        let result = match self.codec.decode::<Request>(data) {
            Ok(request) => self.handle(caller, request).await,
            Err(e) => Err(e.into()),
        };

        let reply = result.unwrap_or_else(|e| {
            tracing::debug!(%caller, error = %e, "request failed");
            Reply::Error {
                code: e.kind().code(),
                message: e.to_string(),
            }
        });
        Ok(self.codec.encode(&reply)?)
    }

    /// Runs one request on behalf of `caller`.
    pub async fn handle(
        &self,
        caller: &AccountId,
        request: Request,
    ) -> Result<Reply, ClubhouseError> {
        let registry = &self.registry;

        let reply = match request {
            Request::CreateClub { payment, club } => {
                Reply::Created(registry.create_club(caller, payment, club).await?)
            }
            Request::SetFee { fee } => Reply::Fee {
                fee: registry.set_fee(caller, fee).await?,
            },
            Request::Withdraw => Reply::Withdrawn {
                amount: registry.withdraw(caller).await?,
            },
            Request::GetFee => Reply::Fee {
                fee: registry.fee().await,
            },
            Request::GetBalance => Reply::Balance {
                balance: registry.balance().await,
            },

            Request::AddClubAdmin { club_id, admin } => {
                registry.add_club_admin(caller, club_id, admin).await?;
                Reply::Done
            }
            Request::RemoveClubAdmin { club_id, admin } => {
                registry.remove_club_admin(caller, club_id, admin).await?;
                Reply::Done
            }
            Request::UpdateClubName { club_id, name } => {
                registry.update_club_name(caller, club_id, name).await?;
                Reply::Done
            }
            Request::UpdateClubDescription {
                club_id,
                description,
            } => {
                registry
                    .update_club_description(caller, club_id, description)
                    .await?;
                Reply::Done
            }
            Request::UpdateClubLogo { club_id, logo } => {
                registry.update_club_logo(caller, club_id, logo).await?;
                Reply::Done
            }
            Request::UpdateClubAnnouncement {
                club_id,
                announcement,
            } => {
                registry
                    .update_club_announcement(caller, club_id, announcement)
                    .await?;
                Reply::Done
            }
            Request::UpdateClubThreshold {
                club_id,
                kind,
                amount,
                contract,
            } => {
                let threshold = Threshold::from_parts(kind, amount, contract)
                    .map_err(|e| RegistryError::InvalidState(e.to_string()))?;
                registry
                    .update_club_threshold(caller, club_id, threshold)
                    .await?;
                Reply::Done
            }

            Request::AddClubChannel { club_id, name } => Reply::ChannelIndex {
                channel_index: registry.add_club_channel(caller, club_id, name).await?,
            },
            Request::UpdateClubChannelName {
                club_id,
                channel_index,
                name,
            } => {
                registry
                    .update_club_channel_name(caller, club_id, channel_index, name)
                    .await?;
                Reply::Done
            }
            Request::DeleteClubChannel {
                club_id,
                channel_index,
            } => {
                registry
                    .delete_club_channel(caller, club_id, channel_index)
                    .await?;
                Reply::Done
            }

            Request::JoinClub { club_id } => {
                registry.join_club(caller, club_id).await?;
                Reply::Done
            }
            Request::NewMessage {
                club_id,
                channel_index,
                content,
            } => Reply::MessageIndex {
                message_index: registry
                    .new_message(caller, club_id, channel_index, content)
                    .await?,
            },
            Request::PostText {
                club_id,
                channel_index,
                message,
                scheme,
            } => {
                let scheme = scheme.unwrap_or(registry.config().default_scheme);
                let content = self.messages.encode(&message, scheme);
                Reply::MessageIndex {
                    message_index: registry
                        .new_message(caller, club_id, channel_index, content)
                        .await?,
                }
            }

            Request::IsAuthorizedForClub { club_id, identity } => Reply::Authorized {
                authorized: registry.is_authorized_for_club(club_id, &identity).await?,
            },
            Request::MeetsThreshold { club_id, identity } => Reply::Eligible {
                eligible: registry.meets_threshold(club_id, &identity).await?,
            },

            Request::ClubCount => Reply::Count {
                count: registry.club_count().await,
            },
            Request::GetClubName { club_id } => Reply::Name {
                name: registry.get_club_name(club_id).await?,
            },
            Request::GetClubOwner { club_id } => Reply::Owner {
                owner: registry.get_club_owner(club_id).await?,
            },
            Request::GetClubAdmins { club_id } => Reply::Accounts {
                accounts: registry.get_club_admins(club_id).await?,
            },
            Request::GetClubMembers { club_id } => Reply::Accounts {
                accounts: registry.get_club_members(club_id).await?,
            },
            Request::GetClubMembersPaged {
                club_id,
                offset,
                limit,
            } => Reply::Accounts {
                accounts: registry
                    .get_club_members_paged(club_id, offset, limit)
                    .await?,
            },
            Request::GetClubsByOwner { owner } => Reply::ClubIds {
                club_ids: registry.get_clubs_by_owner(&owner).await,
            },
            Request::GetJoinedClubIds { member } => Reply::ClubIds {
                club_ids: registry.get_joined_club_ids(&member).await,
            },
            Request::GetClubView { club_id } => {
                Reply::View(Box::new(registry.get_club_view(club_id).await?))
            }
            Request::GetClubViewByIds { club_ids } => {
                Reply::Views(registry.get_club_view_by_ids(&club_ids).await?)
            }
            Request::GetClubChannelMessages {
                club_id,
                channel_index,
                cursor,
                count,
            } => Reply::Messages(
                registry
                    .get_club_channel_messages(club_id, channel_index, cursor, count)
                    .await?,
            ),
            Request::ReadChannel {
                club_id,
                channel_index,
                cursor,
                count,
            } => {
                let page = registry
                    .get_club_channel_messages(club_id, channel_index, cursor, count)
                    .await?;
                self.decode_page(page)?
            }
        };

        Ok(reply)
    }

    /// Decodes every message of a page. Fails on the first undecodable one.
    fn decode_page(&self, page: MessagePage) -> Result<Reply, ClubhouseError> {
        let messages = page
            .messages
            .into_iter()
            .map(|stored| -> Result<TextMessage, ClubhouseError> {
                Ok(TextMessage {
                    message: self.messages.decode(&stored.content)?,
                    sender: stored.sender,
                    timestamp: stored.timestamp,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Reply::Texts {
            messages,
            total: page.total,
        })
    }
}
