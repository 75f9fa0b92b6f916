use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create policy_rules table: one row per policy tuple.
        // v3..v5 stay nullable for richer rule shapes (tenant or time scoping).
        manager
            .create_table(
                Table::create()
                    .table(PolicyRules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PolicyRules::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PolicyRules::Ptype).string().not_null())
                    .col(ColumnDef::new(PolicyRules::V0).string())
                    .col(ColumnDef::new(PolicyRules::V1).string())
                    .col(ColumnDef::new(PolicyRules::V2).string())
                    .col(ColumnDef::new(PolicyRules::V3).string())
                    .col(ColumnDef::new(PolicyRules::V4).string())
                    .col(ColumnDef::new(PolicyRules::V5).string())
                    .to_owned(),
            )
            .await?;

        // Create index on ptype + v0 for per-role policy listings
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_policy_rules_ptype_v0")
                    .table(PolicyRules::Table)
                    .col(PolicyRules::Ptype)
                    .col(PolicyRules::V0)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PolicyRules::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PolicyRules {
    Table,
    Id,
    Ptype,
    V0,
    V1,
    V2,
    V3,
    V4,
    V5,
}
