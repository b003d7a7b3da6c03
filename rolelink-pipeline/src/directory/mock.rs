//! In-memory directory for testing and local replay.
//!
//! The `MockDirectory` can be seeded from a JSON fixture and mutated through
//! the [`Directory`] trait exactly like the real service, including scripted
//! failures for individual roles.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rolelink_shared::types::{Channel, ChannelId, GuildId, MemberId, Role, RoleId};
use serde::Deserialize;

use crate::directory::Directory;
use crate::errors::DirectoryError;

/// Seed data for a [`MockDirectory`].
///
/// ```json
/// { "guilds": { "1": { "roles": { "10": "Members" },
///                      "channels": { "99": "audit-log" },
///                      "members": { "5": [10] } } } }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryFixture {
    #[serde(default)]
    pub guilds: BTreeMap<GuildId, GuildFixture>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuildFixture {
    #[serde(default)]
    pub roles: BTreeMap<RoleId, String>,
    #[serde(default)]
    pub channels: BTreeMap<ChannelId, String>,
    #[serde(default)]
    pub members: BTreeMap<MemberId, BTreeSet<RoleId>>,
}

/// A mutation or message observed by the mock, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryCall {
    AddRole { guild_id: GuildId, member_id: MemberId, role_id: RoleId },
    RemoveRole { guild_id: GuildId, member_id: MemberId, role_id: RoleId },
    SendMessage { channel_id: ChannelId, content: String },
}

#[derive(Default)]
struct MockState {
    guilds: BTreeMap<GuildId, GuildFixture>,
    calls: Vec<DirectoryCall>,
    role_failures: HashMap<RoleId, VecDeque<DirectoryError>>,
    message_failures: VecDeque<DirectoryError>,
}

/// Mock directory that keeps members, roles and channels in memory.
///
/// Unknown roles are rejected with `NotFound` unless the directory is
/// permissive, in which case any role id is accepted.
pub struct MockDirectory {
    state: Mutex<MockState>,
    permissive: bool,
    latency: Option<Duration>,
}

impl MockDirectory {
    /// Create a new empty, strict mock directory.
    pub fn new() -> Self {
        Self::from_fixture(DirectoryFixture::default())
    }

    pub fn from_fixture(fixture: DirectoryFixture) -> Self {
        Self {
            state: Mutex::new(MockState {
                guilds: fixture.guilds,
                ..MockState::default()
            }),
            permissive: false,
            latency: None,
        }
    }

    /// Accept role ids that were never registered.
    pub fn permissive(mut self) -> Self {
        self.permissive = true;
        self
    }

    /// Delay every call, to exercise interleaving in concurrency tests.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn register_role(&self, guild_id: GuildId, role_id: RoleId, name: &str) {
        self.with_state(|state| {
            state
                .guilds
                .entry(guild_id)
                .or_default()
                .roles
                .insert(role_id, name.to_string());
        });
    }

    /// Deletes a role, as if an administrator removed it concurrently.
    pub fn delete_role(&self, guild_id: GuildId, role_id: RoleId) {
        self.with_state(|state| {
            if let Some(guild) = state.guilds.get_mut(&guild_id) {
                guild.roles.remove(&role_id);
            }
        });
    }

    pub fn register_channel(&self, guild_id: GuildId, channel_id: ChannelId, name: &str) {
        self.with_state(|state| {
            state
                .guilds
                .entry(guild_id)
                .or_default()
                .channels
                .insert(channel_id, name.to_string());
        });
    }

    pub fn set_member_roles(&self, guild_id: GuildId, member_id: MemberId, roles: &[RoleId]) {
        self.with_state(|state| {
            state
                .guilds
                .entry(guild_id)
                .or_default()
                .members
                .insert(member_id, roles.iter().copied().collect());
        });
    }

    pub fn member_roles(&self, guild_id: GuildId, member_id: MemberId) -> BTreeSet<RoleId> {
        self.with_state(|state| {
            state
                .guilds
                .get(&guild_id)
                .and_then(|guild| guild.members.get(&member_id))
                .cloned()
                .unwrap_or_default()
        })
    }

    /// Queue an error returned by the next add/remove call for `role_id`.
    /// Several queued errors are returned in order, one per call.
    pub fn fail_next(&self, role_id: RoleId, error: DirectoryError) {
        self.with_state(|state| {
            state.role_failures.entry(role_id).or_default().push_back(error);
        });
    }

    /// Queue an error returned by the next `send_message` call.
    pub fn fail_next_message(&self, error: DirectoryError) {
        self.with_state(|state| state.message_failures.push_back(error));
    }

    pub fn calls(&self) -> Vec<DirectoryCall> {
        self.with_state(|state| state.calls.clone())
    }

    /// Messages delivered so far, as `(channel, content)` pairs.
    pub fn sent_messages(&self) -> Vec<(ChannelId, String)> {
        self.with_state(|state| {
            state
                .calls
                .iter()
                .filter_map(|call| match call {
                    DirectoryCall::SendMessage { channel_id, content } => {
                        Some((*channel_id, content.clone()))
                    }
                    _ => None,
                })
                .collect()
        })
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut state)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn mutate_member(
        &self,
        guild_id: GuildId,
        member_id: MemberId,
        role_id: RoleId,
        add: bool,
    ) -> Result<(), DirectoryError> {
        let permissive = self.permissive;
        self.with_state(|state| {
            if let Some(error) = state
                .role_failures
                .get_mut(&role_id)
                .and_then(VecDeque::pop_front)
            {
                return Err(error);
            }

            let guild = state.guilds.entry(guild_id).or_default();
            if !permissive && !guild.roles.contains_key(&role_id) {
                return Err(DirectoryError::NotFound(format!("role {role_id}")));
            }

            let roles = guild.members.entry(member_id).or_default();
            let call = if add {
                roles.insert(role_id);
                DirectoryCall::AddRole { guild_id, member_id, role_id }
            } else {
                roles.remove(&role_id);
                DirectoryCall::RemoveRole { guild_id, member_id, role_id }
            };
            state.calls.push(call);
            Ok(())
        })
    }
}

impl Default for MockDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Directory for MockDirectory {
    async fn add_role(
        &self,
        guild_id: GuildId,
        member_id: MemberId,
        role_id: RoleId,
        _reason: &str,
    ) -> Result<(), DirectoryError> {
        self.simulate_latency().await;
        self.mutate_member(guild_id, member_id, role_id, true)
    }

    async fn remove_role(
        &self,
        guild_id: GuildId,
        member_id: MemberId,
        role_id: RoleId,
        _reason: &str,
    ) -> Result<(), DirectoryError> {
        self.simulate_latency().await;
        self.mutate_member(guild_id, member_id, role_id, false)
    }

    async fn get_role(&self, guild_id: GuildId, role_id: RoleId) -> Result<Role, DirectoryError> {
        self.with_state(|state| {
            state
                .guilds
                .get(&guild_id)
                .and_then(|guild| guild.roles.get(&role_id))
                .map(|name| Role {
                    id: role_id,
                    name: name.clone(),
                })
                .ok_or_else(|| DirectoryError::NotFound(format!("role {role_id}")))
        })
    }

    async fn get_channel(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Channel, DirectoryError> {
        self.with_state(|state| {
            state
                .guilds
                .get(&guild_id)
                .and_then(|guild| guild.channels.get(&channel_id))
                .map(|name| Channel {
                    id: channel_id,
                    name: name.clone(),
                })
                .ok_or_else(|| DirectoryError::NotFound(format!("channel {channel_id}")))
        })
    }

    async fn send_message(
        &self,
        channel_id: ChannelId,
        content: &str,
    ) -> Result<(), DirectoryError> {
        self.simulate_latency().await;
        self.with_state(|state| {
            if let Some(error) = state.message_failures.pop_front() {
                return Err(error);
            }
            state.calls.push(DirectoryCall::SendMessage {
                channel_id,
                content: content.to_string(),
            });
            Ok(())
        })
    }
}
