//! Row codecs binding each entity kind to its table.

use std::fmt;

use sea_orm::sea_query::{
    Cond, Condition, Expr, Iden, InsertStatement, OnConflict, Order, Query, SelectStatement,
};
use sea_orm::{QueryResult, TryGetable};
use skyisle_core::{
    Capability, Island, IslandBank, IslandBlockCount, IslandId, IslandInvite, IslandMission,
    IslandPermissionOverride, IsleError, IsleResult, MissionKind, Rank, SchematicRecord, User,
    UserId,
};

use crate::db::*;

/// An entity kind mirrored in one backend table.
pub trait Record: Clone + PartialEq + Send + Sync + 'static {
    type Key: Clone + PartialEq + fmt::Debug + Send + Sync;
    type Table: Iden + Copy + 'static;

    const KIND: &'static str;
    const TABLE: Self::Table;

    fn key(&self) -> Self::Key;

    /// Full-table read in a stable order.
    fn select() -> SelectStatement;

    fn decode(row: &QueryResult) -> IsleResult<Self>;

    /// Insert-or-update by key.
    fn upsert(&self) -> InsertStatement;

    fn key_condition(key: &Self::Key) -> Condition;

    /// Rows tied to a provisional island stay in memory until the island has
    /// a backend id.
    fn persistable(&self) -> bool {
        true
    }
}

fn column<T: TryGetable>(row: &QueryResult, name: impl Iden) -> IsleResult<T> {
    Ok(row.try_get::<T>("", &name.to_string())?)
}

fn island_column(row: &QueryResult, name: impl Iden) -> IsleResult<IslandId> {
    column::<i32>(row, name).map(IslandId)
}

fn user_column(row: &QueryResult, name: impl Iden) -> IsleResult<UserId> {
    UserId::from_uuid_str(&column::<String>(row, name)?)
}

impl Record for User {
    type Key = UserId;
    type Table = SkyisleUsers;

    const KIND: &'static str = "user";
    const TABLE: SkyisleUsers = SkyisleUsers::Table;

    fn key(&self) -> UserId {
        self.id
    }

    fn select() -> SelectStatement {
        Query::select()
            .from(SkyisleUsers::Table)
            .columns([
                SkyisleUsers::Uuid,
                SkyisleUsers::Name,
                SkyisleUsers::IslandId,
                SkyisleUsers::RankLevel,
            ])
            .order_by(SkyisleUsers::Uuid, Order::Asc)
            .to_owned()
    }

    fn decode(row: &QueryResult) -> IsleResult<Self> {
        let level: i32 = column(row, SkyisleUsers::RankLevel)?;
        let rank = Rank::from_level(level)
            .ok_or_else(|| IsleError::invalid(format!("unknown rank level {level}")))?;
        Ok(User {
            id: user_column(row, SkyisleUsers::Uuid)?,
            name: column(row, SkyisleUsers::Name)?,
            island_id: column::<Option<i32>>(row, SkyisleUsers::IslandId)?.map(IslandId),
            rank,
        })
    }

    fn upsert(&self) -> InsertStatement {
        Query::insert()
            .into_table(SkyisleUsers::Table)
            .columns([
                SkyisleUsers::Uuid,
                SkyisleUsers::Name,
                SkyisleUsers::IslandId,
                SkyisleUsers::RankLevel,
            ])
            .values_panic([
                self.id.to_uuid_string().into(),
                self.name.clone().into(),
                self.island_id.map(IslandId::as_i32).into(),
                self.rank.level().into(),
            ])
            .on_conflict(
                OnConflict::column(SkyisleUsers::Uuid)
                    .update_columns([
                        SkyisleUsers::Name,
                        SkyisleUsers::IslandId,
                        SkyisleUsers::RankLevel,
                    ])
                    .to_owned(),
            )
            .to_owned()
    }

    fn key_condition(key: &UserId) -> Condition {
        Cond::all().add(Expr::col(SkyisleUsers::Uuid).eq(key.to_uuid_string()))
    }

    fn persistable(&self) -> bool {
        self.island_id.map_or(true, |island| !island.is_provisional())
    }
}

impl Record for Island {
    type Key = IslandId;
    type Table = SkyisleIslands;

    const KIND: &'static str = "island";
    const TABLE: SkyisleIslands = SkyisleIslands::Table;

    fn key(&self) -> IslandId {
        self.id
    }

    fn select() -> SelectStatement {
        Query::select()
            .from(SkyisleIslands::Table)
            .columns([
                SkyisleIslands::Id,
                SkyisleIslands::Name,
                SkyisleIslands::Value,
            ])
            .order_by(SkyisleIslands::Id, Order::Asc)
            .to_owned()
    }

    fn decode(row: &QueryResult) -> IsleResult<Self> {
        Ok(Island {
            id: island_column(row, SkyisleIslands::Id)?,
            name: column(row, SkyisleIslands::Name)?,
            value: column(row, SkyisleIslands::Value)?,
        })
    }

    fn upsert(&self) -> InsertStatement {
        Query::insert()
            .into_table(SkyisleIslands::Table)
            .columns([
                SkyisleIslands::Id,
                SkyisleIslands::Name,
                SkyisleIslands::Value,
            ])
            .values_panic([
                self.id.as_i32().into(),
                self.name.clone().into(),
                self.value.into(),
            ])
            .on_conflict(
                OnConflict::column(SkyisleIslands::Id)
                    .update_columns([SkyisleIslands::Name, SkyisleIslands::Value])
                    .to_owned(),
            )
            .to_owned()
    }

    fn key_condition(key: &IslandId) -> Condition {
        Cond::all().add(Expr::col(SkyisleIslands::Id).eq(key.as_i32()))
    }

    fn persistable(&self) -> bool {
        !self.id.is_provisional()
    }
}

impl Record for IslandInvite {
    type Key = (IslandId, UserId);
    type Table = SkyisleIslandInvites;

    const KIND: &'static str = "island invite";
    const TABLE: SkyisleIslandInvites = SkyisleIslandInvites::Table;

    fn key(&self) -> Self::Key {
        (self.island_id, self.user_id)
    }

    fn select() -> SelectStatement {
        Query::select()
            .from(SkyisleIslandInvites::Table)
            .columns([
                SkyisleIslandInvites::IslandId,
                SkyisleIslandInvites::UserUuid,
                SkyisleIslandInvites::InviterUuid,
                SkyisleIslandInvites::CreatedAtMs,
            ])
            .order_by(SkyisleIslandInvites::CreatedAtMs, Order::Asc)
            .to_owned()
    }

    fn decode(row: &QueryResult) -> IsleResult<Self> {
        Ok(IslandInvite {
            island_id: island_column(row, SkyisleIslandInvites::IslandId)?,
            user_id: user_column(row, SkyisleIslandInvites::UserUuid)?,
            inviter_id: user_column(row, SkyisleIslandInvites::InviterUuid)?,
            created_at_ms: column(row, SkyisleIslandInvites::CreatedAtMs)?,
        })
    }

    fn upsert(&self) -> InsertStatement {
        Query::insert()
            .into_table(SkyisleIslandInvites::Table)
            .columns([
                SkyisleIslandInvites::IslandId,
                SkyisleIslandInvites::UserUuid,
                SkyisleIslandInvites::InviterUuid,
                SkyisleIslandInvites::CreatedAtMs,
            ])
            .values_panic([
                self.island_id.as_i32().into(),
                self.user_id.to_uuid_string().into(),
                self.inviter_id.to_uuid_string().into(),
                self.created_at_ms.into(),
            ])
            .on_conflict(
                OnConflict::columns([
                    SkyisleIslandInvites::IslandId,
                    SkyisleIslandInvites::UserUuid,
                ])
                .update_columns([
                    SkyisleIslandInvites::InviterUuid,
                    SkyisleIslandInvites::CreatedAtMs,
                ])
                .to_owned(),
            )
            .to_owned()
    }

    fn key_condition(key: &Self::Key) -> Condition {
        Cond::all()
            .add(Expr::col(SkyisleIslandInvites::IslandId).eq(key.0.as_i32()))
            .add(Expr::col(SkyisleIslandInvites::UserUuid).eq(key.1.to_uuid_string()))
    }

    fn persistable(&self) -> bool {
        !self.island_id.is_provisional()
    }
}

impl Record for IslandPermissionOverride {
    type Key = (IslandId, Capability);
    type Table = SkyisleIslandPermissions;

    const KIND: &'static str = "island permission";
    const TABLE: SkyisleIslandPermissions = SkyisleIslandPermissions::Table;

    fn key(&self) -> Self::Key {
        (self.island_id, self.capability)
    }

    fn select() -> SelectStatement {
        Query::select()
            .from(SkyisleIslandPermissions::Table)
            .columns([
                SkyisleIslandPermissions::IslandId,
                SkyisleIslandPermissions::Capability,
                SkyisleIslandPermissions::Allowed,
            ])
            .order_by(SkyisleIslandPermissions::IslandId, Order::Asc)
            .order_by(SkyisleIslandPermissions::Capability, Order::Asc)
            .to_owned()
    }

    fn decode(row: &QueryResult) -> IsleResult<Self> {
        let name: String = column(row, SkyisleIslandPermissions::Capability)?;
        let capability = Capability::parse(&name)
            .ok_or_else(|| IsleError::invalid(format!("unknown capability '{name}'")))?;
        Ok(IslandPermissionOverride {
            island_id: island_column(row, SkyisleIslandPermissions::IslandId)?,
            capability,
            allowed: column(row, SkyisleIslandPermissions::Allowed)?,
        })
    }

    fn upsert(&self) -> InsertStatement {
        Query::insert()
            .into_table(SkyisleIslandPermissions::Table)
            .columns([
                SkyisleIslandPermissions::IslandId,
                SkyisleIslandPermissions::Capability,
                SkyisleIslandPermissions::Allowed,
            ])
            .values_panic([
                self.island_id.as_i32().into(),
                self.capability.as_str().into(),
                self.allowed.into(),
            ])
            .on_conflict(
                OnConflict::columns([
                    SkyisleIslandPermissions::IslandId,
                    SkyisleIslandPermissions::Capability,
                ])
                .update_column(SkyisleIslandPermissions::Allowed)
                .to_owned(),
            )
            .to_owned()
    }

    fn key_condition(key: &Self::Key) -> Condition {
        Cond::all()
            .add(Expr::col(SkyisleIslandPermissions::IslandId).eq(key.0.as_i32()))
            .add(Expr::col(SkyisleIslandPermissions::Capability).eq(key.1.as_str()))
    }

    fn persistable(&self) -> bool {
        !self.island_id.is_provisional()
    }
}

impl Record for IslandBlockCount {
    type Key = (IslandId, String);
    type Table = SkyisleIslandBlocks;

    const KIND: &'static str = "island blocks";
    const TABLE: SkyisleIslandBlocks = SkyisleIslandBlocks::Table;

    fn key(&self) -> Self::Key {
        (self.island_id, self.material.clone())
    }

    fn select() -> SelectStatement {
        Query::select()
            .from(SkyisleIslandBlocks::Table)
            .columns([
                SkyisleIslandBlocks::IslandId,
                SkyisleIslandBlocks::Material,
                SkyisleIslandBlocks::Amount,
            ])
            .order_by(SkyisleIslandBlocks::IslandId, Order::Asc)
            .order_by(SkyisleIslandBlocks::Material, Order::Asc)
            .to_owned()
    }

    fn decode(row: &QueryResult) -> IsleResult<Self> {
        Ok(IslandBlockCount {
            island_id: island_column(row, SkyisleIslandBlocks::IslandId)?,
            material: column(row, SkyisleIslandBlocks::Material)?,
            amount: column(row, SkyisleIslandBlocks::Amount)?,
        })
    }

    fn upsert(&self) -> InsertStatement {
        Query::insert()
            .into_table(SkyisleIslandBlocks::Table)
            .columns([
                SkyisleIslandBlocks::IslandId,
                SkyisleIslandBlocks::Material,
                SkyisleIslandBlocks::Amount,
            ])
            .values_panic([
                self.island_id.as_i32().into(),
                self.material.clone().into(),
                self.amount.into(),
            ])
            .on_conflict(
                OnConflict::columns([SkyisleIslandBlocks::IslandId, SkyisleIslandBlocks::Material])
                    .update_column(SkyisleIslandBlocks::Amount)
                    .to_owned(),
            )
            .to_owned()
    }

    fn key_condition(key: &Self::Key) -> Condition {
        Cond::all()
            .add(Expr::col(SkyisleIslandBlocks::IslandId).eq(key.0.as_i32()))
            .add(Expr::col(SkyisleIslandBlocks::Material).eq(key.1.clone()))
    }

    fn persistable(&self) -> bool {
        !self.island_id.is_provisional()
    }
}

impl Record for IslandBank {
    type Key = (IslandId, String);
    type Table = SkyisleIslandBank;

    const KIND: &'static str = "island bank";
    const TABLE: SkyisleIslandBank = SkyisleIslandBank::Table;

    fn key(&self) -> Self::Key {
        (self.island_id, self.item.clone())
    }

    fn select() -> SelectStatement {
        Query::select()
            .from(SkyisleIslandBank::Table)
            .columns([
                SkyisleIslandBank::IslandId,
                SkyisleIslandBank::Item,
                SkyisleIslandBank::Amount,
            ])
            .order_by(SkyisleIslandBank::IslandId, Order::Asc)
            .order_by(SkyisleIslandBank::Item, Order::Asc)
            .to_owned()
    }

    fn decode(row: &QueryResult) -> IsleResult<Self> {
        Ok(IslandBank {
            island_id: island_column(row, SkyisleIslandBank::IslandId)?,
            item: column(row, SkyisleIslandBank::Item)?,
            amount: column(row, SkyisleIslandBank::Amount)?,
        })
    }

    fn upsert(&self) -> InsertStatement {
        Query::insert()
            .into_table(SkyisleIslandBank::Table)
            .columns([
                SkyisleIslandBank::IslandId,
                SkyisleIslandBank::Item,
                SkyisleIslandBank::Amount,
            ])
            .values_panic([
                self.island_id.as_i32().into(),
                self.item.clone().into(),
                self.amount.into(),
            ])
            .on_conflict(
                OnConflict::columns([SkyisleIslandBank::IslandId, SkyisleIslandBank::Item])
                    .update_column(SkyisleIslandBank::Amount)
                    .to_owned(),
            )
            .to_owned()
    }

    fn key_condition(key: &Self::Key) -> Condition {
        Cond::all()
            .add(Expr::col(SkyisleIslandBank::IslandId).eq(key.0.as_i32()))
            .add(Expr::col(SkyisleIslandBank::Item).eq(key.1.clone()))
    }

    fn persistable(&self) -> bool {
        !self.island_id.is_provisional()
    }
}

impl Record for IslandMission {
    type Key = (IslandId, String);
    type Table = SkyisleIslandMissions;

    const KIND: &'static str = "island mission";
    const TABLE: SkyisleIslandMissions = SkyisleIslandMissions::Table;

    fn key(&self) -> Self::Key {
        (self.island_id, self.name.clone())
    }

    fn select() -> SelectStatement {
        Query::select()
            .from(SkyisleIslandMissions::Table)
            .columns([
                SkyisleIslandMissions::IslandId,
                SkyisleIslandMissions::Name,
                SkyisleIslandMissions::Kind,
                SkyisleIslandMissions::Progress,
            ])
            .order_by(SkyisleIslandMissions::IslandId, Order::Asc)
            .order_by(SkyisleIslandMissions::Name, Order::Asc)
            .to_owned()
    }

    fn decode(row: &QueryResult) -> IsleResult<Self> {
        let kind: String = column(row, SkyisleIslandMissions::Kind)?;
        Ok(IslandMission {
            island_id: island_column(row, SkyisleIslandMissions::IslandId)?,
            name: column(row, SkyisleIslandMissions::Name)?,
            kind: MissionKind::parse(&kind)
                .ok_or_else(|| IsleError::invalid(format!("unknown mission kind '{kind}'")))?,
            progress: column(row, SkyisleIslandMissions::Progress)?,
        })
    }

    fn upsert(&self) -> InsertStatement {
        Query::insert()
            .into_table(SkyisleIslandMissions::Table)
            .columns([
                SkyisleIslandMissions::IslandId,
                SkyisleIslandMissions::Name,
                SkyisleIslandMissions::Kind,
                SkyisleIslandMissions::Progress,
            ])
            .values_panic([
                self.island_id.as_i32().into(),
                self.name.clone().into(),
                self.kind.as_str().into(),
                self.progress.into(),
            ])
            .on_conflict(
                OnConflict::columns([SkyisleIslandMissions::IslandId, SkyisleIslandMissions::Name])
                    .update_columns([SkyisleIslandMissions::Kind, SkyisleIslandMissions::Progress])
                    .to_owned(),
            )
            .to_owned()
    }

    fn key_condition(key: &Self::Key) -> Condition {
        Cond::all()
            .add(Expr::col(SkyisleIslandMissions::IslandId).eq(key.0.as_i32()))
            .add(Expr::col(SkyisleIslandMissions::Name).eq(key.1.clone()))
    }

    fn persistable(&self) -> bool {
        !self.island_id.is_provisional()
    }
}

impl Record for SchematicRecord {
    type Key = String;
    type Table = SkyisleSchematics;

    const KIND: &'static str = "schematic";
    const TABLE: SkyisleSchematics = SkyisleSchematics::Table;

    fn key(&self) -> String {
        self.name.clone()
    }

    fn select() -> SelectStatement {
        Query::select()
            .from(SkyisleSchematics::Table)
            .columns([SkyisleSchematics::Name, SkyisleSchematics::Data])
            .order_by(SkyisleSchematics::Name, Order::Asc)
            .to_owned()
    }

    fn decode(row: &QueryResult) -> IsleResult<Self> {
        Ok(SchematicRecord {
            name: column(row, SkyisleSchematics::Name)?,
            data: column(row, SkyisleSchematics::Data)?,
        })
    }

    fn upsert(&self) -> InsertStatement {
        Query::insert()
            .into_table(SkyisleSchematics::Table)
            .columns([SkyisleSchematics::Name, SkyisleSchematics::Data])
            .values_panic([self.name.clone().into(), self.data.clone().into()])
            .on_conflict(
                OnConflict::column(SkyisleSchematics::Name)
                    .update_column(SkyisleSchematics::Data)
                    .to_owned(),
            )
            .to_owned()
    }

    fn key_condition(key: &String) -> Condition {
        Cond::all().add(Expr::col(SkyisleSchematics::Name).eq(key.clone()))
    }
}
