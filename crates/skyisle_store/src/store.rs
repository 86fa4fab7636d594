use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use sea_orm::DatabaseConnection;
use skyisle_core::{
    demotion, fill_slots, promotion, top_n, Capability, Demotion, Island, IslandBank,
    IslandBlockCount, IslandId, IslandInvite, IslandMission, IslandPermissionOverride,
    IslandRules, IsleError, IsleResult, MissionKind, PermissionResolver, Rank, SchematicRecord,
    TopSlot, User, UserId,
};

use crate::connection::connect;
use crate::outcome::{BlockTally, DemoteOutcome, Denial, Outcome, Placement};
use crate::record::Record;
use crate::repository::{FlushReport, Flushable, Repository};
use crate::IsleConfig;

/// Owns every entity repository and implements the island operations on top
/// of them.
///
/// Synchronous methods only touch memory; `async` ones also reach the
/// backend. Multi-repository mutations run under `write_gate`, which is never
/// held across an `.await`. Island registration and deletion are additionally
/// serialised by `lifecycle`.
pub struct IslandStore {
    conn: DatabaseConnection,
    rules: IslandRules,
    resolver: PermissionResolver,
    users: Repository<User>,
    islands: Repository<Island>,
    invites: Repository<IslandInvite>,
    permissions: Repository<IslandPermissionOverride>,
    blocks: Repository<IslandBlockCount>,
    bank: Repository<IslandBank>,
    missions: Repository<IslandMission>,
    schematics: Repository<SchematicRecord>,
    write_gate: Mutex<()>,
    lifecycle: tokio::sync::Mutex<()>,
}

impl IslandStore {
    pub async fn connect(config: &IsleConfig, base_dir: &Path) -> IsleResult<Self> {
        let conn = connect(config, base_dir).await?;
        Ok(Self::load(conn, config.rules.clone()).await)
    }

    /// Loads every repository once. Kinds that fail to load start empty.
    pub async fn load(conn: DatabaseConnection, rules: IslandRules) -> Self {
        let store = Self {
            resolver: rules.resolver(),
            rules,
            users: Repository::load(&conn).await,
            islands: Repository::load(&conn).await,
            invites: Repository::load(&conn).await,
            permissions: Repository::load(&conn).await,
            blocks: Repository::load(&conn).await,
            bank: Repository::load(&conn).await,
            missions: Repository::load(&conn).await,
            schematics: Repository::load(&conn).await,
            write_gate: Mutex::new(()),
            lifecycle: tokio::sync::Mutex::new(()),
            conn,
        };
        info!(
            "store: loaded {} users, {} islands",
            store.users.len(),
            store.islands.len()
        );
        store
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub fn rules(&self) -> &IslandRules {
        &self.rules
    }

    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }

    pub fn users(&self) -> &Repository<User> {
        &self.users
    }

    pub fn islands(&self) -> &Repository<Island> {
        &self.islands
    }

    pub fn invites(&self) -> &Repository<IslandInvite> {
        &self.invites
    }

    pub fn permissions(&self) -> &Repository<IslandPermissionOverride> {
        &self.permissions
    }

    pub fn blocks(&self) -> &Repository<IslandBlockCount> {
        &self.blocks
    }

    pub fn bank(&self) -> &Repository<IslandBank> {
        &self.bank
    }

    pub fn missions(&self) -> &Repository<IslandMission> {
        &self.missions
    }

    pub fn schematics(&self) -> &Repository<SchematicRecord> {
        &self.schematics
    }

    fn gate(&self) -> MutexGuard<'_, ()> {
        self.write_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ---- reads ----

    /// Find-or-create; an existing user's display name is refreshed.
    pub fn user(&self, id: UserId, name: impl Into<String>) -> User {
        let name = name.into();
        self.users.update_or_insert(
            &id,
            || User::new(id, name.clone()),
            |user| user.name = name.clone(),
        )
    }

    pub fn island(&self, id: IslandId) -> Option<Island> {
        self.islands.get(&id)
    }

    pub fn island_by_name(&self, name: &str) -> Option<Island> {
        self.islands.find(|island| island.name == name)
    }

    pub fn members(&self, island: IslandId) -> Vec<User> {
        self.users.filter(|user| user.is_member_of(island))
    }

    pub fn block_count(&self, island: IslandId, material: &str) -> i64 {
        self.blocks
            .get(&(island, material.to_string()))
            .map_or(0, |row| row.amount)
    }

    pub fn bank_balance(&self, island: IslandId, item: &str) -> f64 {
        self.bank
            .get(&(island, item.to_string()))
            .map_or(0.0, |row| row.amount)
    }

    pub fn mission_progress(&self, island: IslandId, mission: &str) -> i64 {
        self.missions
            .get(&(island, mission.to_string()))
            .map_or(0, |row| row.progress)
    }

    // ---- permissions and ranks ----

    /// Non-members are denied; an island override wins over the rank
    /// default.
    pub fn resolve_permission(
        &self,
        island: IslandId,
        user: UserId,
        capability: Capability,
    ) -> bool {
        match self.users.get(&user) {
            Some(user) => self.allows(island, &user, capability),
            None => false,
        }
    }

    fn allows(&self, island: IslandId, user: &User, capability: Capability) -> bool {
        let override_value = self
            .permissions
            .get(&(island, capability))
            .map(|row| row.allowed);
        self.resolver
            .resolve(island, user, capability, override_value)
    }

    fn require(&self, island: IslandId, actor: &User, capability: Capability) -> Outcome<()> {
        if !actor.is_member_of(island) {
            return Err(Denial::NotInIsland);
        }
        if !self.allows(island, actor, capability) {
            return Err(Denial::MissingCapability(capability));
        }
        Ok(())
    }

    fn known_user(&self, id: UserId) -> Outcome<User> {
        self.users.get(&id).ok_or(Denial::NoSuchUser)
    }

    fn island_member(&self, island: IslandId, id: UserId) -> Outcome<User> {
        let user = self.known_user(id)?;
        if user.is_member_of(island) {
            Ok(user)
        } else {
            Err(Denial::TargetNotInIsland)
        }
    }

    /// Raises `target` one level. The new level must stay strictly below the
    /// actor's.
    pub fn promote(&self, island: IslandId, acting: UserId, target: UserId) -> Outcome<Rank> {
        let _gate = self.gate();
        let actor = self.known_user(acting)?;
        self.require(island, &actor, Capability::Promote)?;
        let target = self.island_member(island, target)?;
        let next = promotion(actor.rank, target.rank).ok_or(Denial::RankTooLow)?;
        self.users.update(&target.id, |user| user.rank = next);
        debug!("store: {} promoted {} to {next} on {island}", actor.name, target.name);
        Ok(next)
    }

    /// Lowers `target` one level; dropping below the lowest member rank
    /// evicts them.
    pub fn demote(
        &self,
        island: IslandId,
        acting: UserId,
        target: UserId,
    ) -> Outcome<DemoteOutcome> {
        let _gate = self.gate();
        let actor = self.known_user(acting)?;
        self.require(island, &actor, Capability::Demote)?;
        let target = self.island_member(island, target)?;
        let outcome = match demotion(actor.rank, target.rank).ok_or(Denial::RankTooLow)? {
            Demotion::To(rank) => {
                self.users.update(&target.id, |user| user.rank = rank);
                DemoteOutcome::Demoted(rank)
            }
            Demotion::Evict => {
                self.users.update(&target.id, User::clear_island);
                DemoteOutcome::Evicted
            }
        };
        debug!("store: {} demoted {} on {island}: {outcome:?}", actor.name, target.name);
        Ok(outcome)
    }

    pub fn kick(&self, island: IslandId, acting: UserId, target: UserId) -> Outcome<()> {
        let _gate = self.gate();
        let actor = self.known_user(acting)?;
        self.require(island, &actor, Capability::Kick)?;
        let target = self.island_member(island, target)?;
        if target.rank >= actor.rank {
            return Err(Denial::RankTooLow);
        }
        self.users.update(&target.id, User::clear_island);
        debug!("store: {} kicked {} from {island}", actor.name, target.name);
        Ok(())
    }

    /// Returns the island left. Owners have to delete their island instead.
    pub fn leave(&self, user: UserId) -> Outcome<IslandId> {
        let _gate = self.gate();
        let user = self.known_user(user)?;
        let island = user.island_id.ok_or(Denial::NotInIsland)?;
        if user.rank == Rank::Owner {
            return Err(Denial::OwnerCannotLeave);
        }
        self.users.update(&user.id, User::clear_island);
        Ok(island)
    }

    /// Stores a per-island override. Actors cannot override capabilities
    /// that default above their own rank.
    pub fn set_permission_override(
        &self,
        island: IslandId,
        acting: UserId,
        capability: Capability,
        allowed: bool,
    ) -> Outcome<()> {
        let _gate = self.gate();
        self.check_override_change(island, acting, capability)?;
        self.permissions.put(IslandPermissionOverride {
            island_id: island,
            capability,
            allowed,
        });
        Ok(())
    }

    /// Drops an override so the rank default applies again. Returns whether
    /// one existed.
    pub async fn clear_permission_override(
        &self,
        island: IslandId,
        acting: UserId,
        capability: Capability,
    ) -> Outcome<bool> {
        let removed = {
            let _gate = self.gate();
            self.check_override_change(island, acting, capability)?;
            self.permissions.remove(&(island, capability))
        };
        if let Some(row) = removed {
            self.permissions
                .discard(&self.conn, &[(row.island_id, row.capability)])
                .await;
            return Ok(true);
        }
        Ok(false)
    }

    fn check_override_change(
        &self,
        island: IslandId,
        acting: UserId,
        capability: Capability,
    ) -> Outcome<()> {
        let actor = self.known_user(acting)?;
        self.require(island, &actor, Capability::ChangePermissions)?;
        if self.resolver.minimum_rank(capability) > actor.rank {
            return Err(Denial::RankTooLow);
        }
        Ok(())
    }

    // ---- blocks and missions ----

    /// Counts one placed block and adds its worth to the island. Untracked
    /// materials change nothing and yield `Ok(None)`.
    pub fn record_block_placement(
        &self,
        island: IslandId,
        material: &str,
    ) -> Outcome<Option<BlockTally>> {
        let _gate = self.gate();
        self.apply_block_delta(island, material, 1)
    }

    /// Mirror of [`Self::record_block_placement`]; counter and value clamp at
    /// zero.
    pub fn record_block_removal(
        &self,
        island: IslandId,
        material: &str,
    ) -> Outcome<Option<BlockTally>> {
        let _gate = self.gate();
        self.apply_block_delta(island, material, -1)
    }

    fn apply_block_delta(
        &self,
        island: IslandId,
        material: &str,
        delta: i64,
    ) -> Outcome<Option<BlockTally>> {
        if self.islands.get(&island).is_none() {
            return Err(Denial::NoSuchIsland);
        }
        let Some(worth) = self.rules.block_value(material) else {
            return Ok(None);
        };
        let key = (island, material.to_string());
        let (amount, applied) = if delta > 0 {
            let row = self.blocks.update_or_insert(
                &key,
                || IslandBlockCount {
                    island_id: island,
                    material: material.to_string(),
                    amount: 0,
                },
                |row| row.amount += delta,
            );
            (row.amount, delta)
        } else {
            let mut applied = 0;
            let amount = self
                .blocks
                .update(&key, |row| {
                    let next = (row.amount + delta).max(0);
                    applied = next - row.amount;
                    row.amount = next;
                })
                .map_or(0, |row| row.amount);
            (amount, applied)
        };
        let island_value = self
            .islands
            .update(&island, |row| row.add_value(worth * applied as f64))
            .map_or(0.0, |row| row.value);
        Ok(Some(BlockTally {
            amount,
            island_value,
        }))
    }

    /// Permission-gated placement by `acting`: counts the block, then
    /// advances `PLACE:<material>` missions.
    pub fn place_block(
        &self,
        island: IslandId,
        acting: UserId,
        material: &str,
    ) -> Outcome<Placement> {
        let _gate = self.gate();
        let actor = self.known_user(acting)?;
        self.require(island, &actor, Capability::BlockPlace)?;
        let tally = self.apply_block_delta(island, material, 1)?;
        let completed_missions = self.advance_missions(island, &format!("PLACE:{material}"), 1);
        Ok(Placement {
            tally,
            completed_missions,
        })
    }

    /// Advances every mission listening on `trigger`; returns the missions
    /// this call completed.
    pub fn increment_mission(&self, island: IslandId, trigger: &str, by: i64) -> Vec<String> {
        let _gate = self.gate();
        self.advance_missions(island, trigger, by)
    }

    fn advance_missions(&self, island: IslandId, trigger: &str, by: i64) -> Vec<String> {
        if by <= 0 || self.islands.get(&island).is_none() {
            return Vec::new();
        }
        let mut completed = Vec::new();
        for (name, mission) in self.rules.missions_triggered_by(trigger) {
            self.missions.update_or_insert(
                &(island, name.clone()),
                || IslandMission {
                    island_id: island,
                    name: name.clone(),
                    kind: mission.kind,
                    progress: 0,
                },
                |row| {
                    let before = row.progress;
                    row.progress = (row.progress + by).min(mission.amount);
                    if before < mission.amount && row.progress >= mission.amount {
                        completed.push(name.clone());
                    }
                },
            );
        }
        completed
    }

    /// Bulk-deletes daily mission rows. On backend failure nothing is
    /// removed and 0 is returned.
    pub async fn reset_daily_missions(&self) -> usize {
        self.missions
            .delete_where(&self.conn, |row| row.kind == MissionKind::Daily)
            .await
            .unwrap_or_default()
    }

    // ---- bank ----

    pub fn deposit(&self, island: IslandId, item: &str, amount: f64) -> Outcome<f64> {
        if !(amount.is_finite() && amount > 0.0) {
            return Err(Denial::InvalidAmount);
        }
        let _gate = self.gate();
        if self.islands.get(&island).is_none() {
            return Err(Denial::NoSuchIsland);
        }
        let row = self.bank.update_or_insert(
            &(island, item.to_string()),
            || IslandBank {
                island_id: island,
                item: item.to_string(),
                amount: 0.0,
            },
            |row| row.amount += amount,
        );
        Ok(row.amount)
    }

    pub fn withdraw(
        &self,
        island: IslandId,
        acting: UserId,
        item: &str,
        amount: f64,
    ) -> Outcome<f64> {
        if !(amount.is_finite() && amount > 0.0) {
            return Err(Denial::InvalidAmount);
        }
        let _gate = self.gate();
        let actor = self.known_user(acting)?;
        self.require(island, &actor, Capability::WithdrawBank)?;
        let key = (island, item.to_string());
        if self.bank.get(&key).map_or(0.0, |row| row.amount) < amount {
            return Err(Denial::InsufficientFunds);
        }
        let balance = self
            .bank
            .update(&key, |row| row.amount -= amount)
            .map_or(0.0, |row| row.amount);
        Ok(balance)
    }

    // ---- invites ----

    /// Records a pending invite, replacing an older one for the same pair.
    pub fn invite(
        &self,
        island: IslandId,
        acting: UserId,
        target: UserId,
        now_ms: i64,
    ) -> Outcome<IslandInvite> {
        let _gate = self.gate();
        let actor = self.known_user(acting)?;
        self.require(island, &actor, Capability::Invite)?;
        let target = self.known_user(target)?;
        if target.island_id.is_some() {
            return Err(Denial::AlreadyInIsland);
        }
        let invite = IslandInvite {
            island_id: island,
            user_id: target.id,
            inviter_id: actor.id,
            created_at_ms: now_ms,
        };
        self.invites.put(invite.clone());
        Ok(invite)
    }

    /// Joins `user` to `island` as a member. The invite is consumed, or
    /// dropped when it has expired.
    pub async fn accept_invite(
        &self,
        user: UserId,
        island: IslandId,
        now_ms: i64,
    ) -> Outcome<Island> {
        let key = (island, user);
        let (outcome, consumed) = {
            let _gate = self.gate();
            self.accept_invite_locked(&key, now_ms)
        };
        if consumed {
            self.invites.discard(&self.conn, &[key]).await;
        }
        outcome
    }

    fn accept_invite_locked(
        &self,
        key: &(IslandId, UserId),
        now_ms: i64,
    ) -> (Outcome<Island>, bool) {
        let (island, user) = *key;
        let member = match self.known_user(user) {
            Ok(member) => member,
            Err(denial) => return (Err(denial), false),
        };
        if member.island_id.is_some() {
            return (Err(Denial::AlreadyInIsland), false);
        }
        let Some(invite) = self.invites.get(key) else {
            return (Err(Denial::NoInvite), false);
        };
        if invite.is_expired(now_ms, self.rules.invite_ttl_ms) {
            self.invites.remove(key);
            return (Err(Denial::InviteExpired), true);
        }
        let Some(target) = self.islands.get(&island) else {
            self.invites.remove(key);
            return (Err(Denial::NoSuchIsland), true);
        };
        self.invites.remove(key);
        self.users
            .update(&user, |row| row.join(island, Rank::Member));
        (Ok(target), true)
    }

    /// Drops invites older than the configured lifetime from memory and
    /// backend together.
    pub async fn purge_expired_invites(&self, now_ms: i64) -> usize {
        let ttl = self.rules.invite_ttl_ms;
        if ttl.is_none() {
            return 0;
        }
        self.invites
            .delete_where(&self.conn, |invite| invite.is_expired(now_ms, ttl))
            .await
            .unwrap_or_default()
    }

    // ---- island lifecycle ----

    /// Creates an island row and returns it with the backend-assigned id.
    ///
    /// If the backend is unavailable the island still exists in memory under
    /// a provisional (negative) id so play can continue; it gets a real id
    /// on the next registration or flush that reaches the backend.
    pub async fn register_island(&self, name: &str) -> IsleResult<Island> {
        let _lifecycle = self.lifecycle.lock().await;
        self.register_island_locked(name).await
    }

    async fn register_island_locked(&self, name: &str) -> IsleResult<Island> {
        let name = name.trim();
        if name.is_empty() {
            return Err(IsleError::invalid("island name must not be empty"));
        }
        if self.island_by_name(name).is_some() {
            return Err(IsleError::conflict(format!("island name '{name}' is taken")));
        }
        self.reconcile_provisional_locked().await;
        let island = match self.islands.insert_and_refetch(&self.conn, name).await {
            Ok(island) => island,
            Err(err @ IsleError::Conflict { .. }) => return Err(err),
            Err(err) => {
                let island = Island::new(self.islands.next_provisional_id(), name);
                Repository::<Island>::warn_provisional(&island, &err);
                self.islands.put(island.clone());
                island
            }
        };
        info!("store: registered island '{}' as {}", island.name, island.id);
        Ok(island)
    }

    /// Registers every provisional island with the backend and moves its
    /// members and owned rows over to the assigned id. Stops at the first
    /// backend failure.
    async fn reconcile_provisional_locked(&self) {
        let pending = self.islands.filter(|island| island.id.is_provisional());
        for provisional in pending {
            let real = match self
                .islands
                .insert_and_refetch(&self.conn, &provisional.name)
                .await
            {
                Ok(real) => real,
                Err(err) => {
                    debug!(
                        "store: island '{}' keeps provisional id {}: {err}",
                        provisional.name, provisional.id
                    );
                    return;
                }
            };
            let adopted = {
                let _gate = self.gate();
                self.adopt_locked(provisional.id, real)
            };
            self.islands.persist(&self.conn, &[adopted.clone()]).await;
            info!(
                "store: island '{}' moved from provisional id {} to {}",
                adopted.name, provisional.id, adopted.id
            );
        }
    }

    fn adopt_locked(&self, provisional: IslandId, mut real: Island) -> Island {
        if let Some(pending) = self.islands.remove(&provisional) {
            real.value = pending.value;
        }
        self.islands.put(real.clone());
        let id = real.id;
        self.users
            .update_where(|user| user.is_member_of(provisional), |user| {
                user.island_id = Some(id)
            });
        self.invites
            .update_where(|row| row.island_id == provisional, |row| row.island_id = id);
        self.permissions
            .update_where(|row| row.island_id == provisional, |row| row.island_id = id);
        self.blocks
            .update_where(|row| row.island_id == provisional, |row| row.island_id = id);
        self.bank
            .update_where(|row| row.island_id == provisional, |row| row.island_id = id);
        self.missions
            .update_where(|row| row.island_id == provisional, |row| row.island_id = id);
        real
    }

    /// Registers an island and makes `owner` its owner. If the founder joined
    /// another island while the registration was in flight, the new island is
    /// dropped again and a conflict is returned.
    pub async fn create_island(&self, owner: UserId, name: &str) -> IsleResult<Island> {
        let _lifecycle = self.lifecycle.lock().await;
        let founder = self
            .users
            .get(&owner)
            .ok_or_else(|| IsleError::not_found(format!("user {owner}")))?;
        if let Some(current) = founder.island_id {
            return Err(already_member(&founder.name, current));
        }
        let island = self.register_island_locked(name).await?;
        let joined_meanwhile = {
            let _gate = self.gate();
            match self.users.get(&owner).and_then(|user| user.island_id) {
                Some(current) => {
                    self.islands.remove(&island.id);
                    Some(current)
                }
                None => {
                    self.users
                        .update(&owner, |user| user.join(island.id, Rank::Owner));
                    None
                }
            }
        };
        if let Some(current) = joined_meanwhile {
            if !island.id.is_provisional() {
                self.islands.discard(&self.conn, &[island.id]).await;
            }
            warn!(
                "store: dropped island '{}' because {} joined island {current} first",
                island.name, founder.name
            );
            return Err(already_member(&founder.name, current));
        }
        Ok(island)
    }

    /// Removes the island and everything it owns. Members stay as users with
    /// their island reference cleared. Returns the removed island.
    pub async fn delete_island(&self, island: IslandId) -> Option<Island> {
        let _lifecycle = self.lifecycle.lock().await;
        let cascade = {
            let _gate = self.gate();
            let removed = self.islands.remove(&island)?;
            Cascade {
                former_members: self
                    .users
                    .update_where(|user| user.is_member_of(island), User::clear_island),
                invites: keys(self.invites.remove_where(|row| row.island_id == island)),
                permissions: keys(self.permissions.remove_where(|row| row.island_id == island)),
                blocks: keys(self.blocks.remove_where(|row| row.island_id == island)),
                bank: keys(self.bank.remove_where(|row| row.island_id == island)),
                missions: keys(self.missions.remove_where(|row| row.island_id == island)),
                removed,
            }
        };
        self.users.persist(&self.conn, &cascade.former_members).await;
        self.invites.discard(&self.conn, &cascade.invites).await;
        self.permissions
            .discard(&self.conn, &cascade.permissions)
            .await;
        self.blocks.discard(&self.conn, &cascade.blocks).await;
        self.bank.discard(&self.conn, &cascade.bank).await;
        self.missions.discard(&self.conn, &cascade.missions).await;
        self.islands.discard(&self.conn, &[island]).await;
        info!(
            "store: deleted island '{}' ({} members released)",
            cascade.removed.name,
            cascade.former_members.len()
        );
        Some(cascade.removed)
    }

    // ---- leaderboard ----

    pub fn top_islands(&self, n: usize) -> Vec<Island> {
        top_n(&self.islands.all(), n)
    }

    /// Leaderboard projected onto the configured display slots.
    pub fn top_slots(&self) -> Vec<TopSlot> {
        fill_slots(&self.islands.all(), &self.rules.island_top_slots)
    }

    // ---- persistence ----

    /// Writes every repository to the backend, one transaction per kind.
    /// Provisional islands are registered first so their rows can follow.
    pub async fn flush_all(&self) -> Vec<FlushReport> {
        {
            let _lifecycle = self.lifecycle.lock().await;
            self.reconcile_provisional_locked().await;
        }
        let repositories: [&dyn Flushable; 8] = [
            &self.users,
            &self.islands,
            &self.invites,
            &self.permissions,
            &self.blocks,
            &self.bank,
            &self.missions,
            &self.schematics,
        ];
        let mut reports = Vec::with_capacity(repositories.len());
        for repository in repositories {
            reports.push(repository.flush(&self.conn).await);
        }
        let failed = reports.iter().filter(|report| !report.ok).count();
        if failed == 0 {
            debug!("store: flushed {} kinds", reports.len());
        } else {
            warn!("store: flush finished with {failed} failed kinds");
        }
        reports
    }

    pub async fn save_schematic(&self, name: &str, data: Vec<u8>) {
        self.schematics
            .upsert(
                &self.conn,
                SchematicRecord {
                    name: name.to_string(),
                    data,
                },
            )
            .await;
    }

    pub fn schematic(&self, name: &str) -> Option<SchematicRecord> {
        self.schematics.get(&name.to_string())
    }
}

struct Cascade {
    removed: Island,
    former_members: Vec<User>,
    invites: Vec<(IslandId, UserId)>,
    permissions: Vec<(IslandId, Capability)>,
    blocks: Vec<(IslandId, String)>,
    bank: Vec<(IslandId, String)>,
    missions: Vec<(IslandId, String)>,
}

fn already_member(name: &str, island: IslandId) -> IsleError {
    IsleError::conflict(format!("{name} already belongs to island {island}"))
}

fn keys<R: Record>(rows: Vec<R>) -> Vec<R::Key> {
    rows.iter().map(Record::key).collect()
}
