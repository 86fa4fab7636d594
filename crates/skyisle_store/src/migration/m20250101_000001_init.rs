use sea_orm_migration::prelude::*;

use crate::db::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SkyisleUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SkyisleUsers::Uuid)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SkyisleUsers::Name).string().not_null())
                    .col(ColumnDef::new(SkyisleUsers::IslandId).integer())
                    .col(
                        ColumnDef::new(SkyisleUsers::RankLevel)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SkyisleIslands::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SkyisleIslands::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SkyisleIslands::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SkyisleIslands::Value)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SkyisleIslandInvites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SkyisleIslandInvites::IslandId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SkyisleIslandInvites::UserUuid)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SkyisleIslandInvites::InviterUuid)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SkyisleIslandInvites::CreatedAtMs)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_skyisle_island_invites")
                            .col(SkyisleIslandInvites::IslandId)
                            .col(SkyisleIslandInvites::UserUuid),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SkyisleIslandPermissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SkyisleIslandPermissions::IslandId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SkyisleIslandPermissions::Capability)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SkyisleIslandPermissions::Allowed)
                            .boolean()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_skyisle_island_permissions")
                            .col(SkyisleIslandPermissions::IslandId)
                            .col(SkyisleIslandPermissions::Capability),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SkyisleIslandBlocks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SkyisleIslandBlocks::IslandId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SkyisleIslandBlocks::Material)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SkyisleIslandBlocks::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_skyisle_island_blocks")
                            .col(SkyisleIslandBlocks::IslandId)
                            .col(SkyisleIslandBlocks::Material),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SkyisleIslandBank::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SkyisleIslandBank::IslandId).integer().not_null())
                    .col(
                        ColumnDef::new(SkyisleIslandBank::Item)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SkyisleIslandBank::Amount).double().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_skyisle_island_bank")
                            .col(SkyisleIslandBank::IslandId)
                            .col(SkyisleIslandBank::Item),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SkyisleIslandMissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SkyisleIslandMissions::IslandId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SkyisleIslandMissions::Name)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SkyisleIslandMissions::Kind)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SkyisleIslandMissions::Progress)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_skyisle_island_missions")
                            .col(SkyisleIslandMissions::IslandId)
                            .col(SkyisleIslandMissions::Name),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SkyisleSchematics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SkyisleSchematics::Name)
                            .string_len(128)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SkyisleSchematics::Data).blob().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            SkyisleSchematics::Table.into_iden(),
            SkyisleIslandMissions::Table.into_iden(),
            SkyisleIslandBank::Table.into_iden(),
            SkyisleIslandBlocks::Table.into_iden(),
            SkyisleIslandPermissions::Table.into_iden(),
            SkyisleIslandInvites::Table.into_iden(),
            SkyisleIslands::Table.into_iden(),
            SkyisleUsers::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}
