use sea_orm_migration::prelude::*;

use crate::m20240601_000001_create_categories_table::Categories;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Menus::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Menus::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Menus::CategoryId).integer().not_null())
                    .col(ColumnDef::new(Menus::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Menus::Description).text().null())
                    .col(ColumnDef::new(Menus::MinPrice).double().not_null())
                    .col(ColumnDef::new(Menus::MaxPrice).double().null())
                    .col(ColumnDef::new(Menus::PromotionPrice).double().null())
                    .col(
                        ColumnDef::new(Menus::Currency)
                            .string_len(10)
                            .not_null()
                            .default("KHR"),
                    )
                    .col(
                        ColumnDef::new(Menus::Image)
                            .string_len(500)
                            .not_null()
                            .default("static/images/default.jpg"),
                    )
                    .col(
                        ColumnDef::new(Menus::Available)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Menus::Featured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_menus_category_id")
                            .from(Menus::Table, Menus::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Menus::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Menus {
    Table,
    Id,
    CategoryId,
    Title,
    Description,
    MinPrice,
    MaxPrice,
    PromotionPrice,
    Currency,
    Image,
    Available,
    Featured,
}
