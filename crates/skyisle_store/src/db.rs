use sea_orm::DeriveIden;

#[derive(DeriveIden, Clone, Copy)]
pub enum SkyisleUsers {
    Table,
    Uuid,
    Name,
    IslandId,
    RankLevel,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum SkyisleIslands {
    Table,
    Id,
    Name,
    Value,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum SkyisleIslandInvites {
    Table,
    IslandId,
    UserUuid,
    InviterUuid,
    CreatedAtMs,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum SkyisleIslandPermissions {
    Table,
    IslandId,
    Capability,
    Allowed,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum SkyisleIslandBlocks {
    Table,
    IslandId,
    Material,
    Amount,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum SkyisleIslandBank {
    Table,
    IslandId,
    Item,
    Amount,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum SkyisleIslandMissions {
    Table,
    IslandId,
    Name,
    Kind,
    Progress,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum SkyisleSchematics {
    Table,
    Name,
    Data,
}
