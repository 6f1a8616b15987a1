use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bookings::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Bookings::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::InstallerId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::ProductId).uuid().null())
                    .col(ColumnDef::new(Bookings::CarBrand).string().not_null())
                    .col(ColumnDef::new(Bookings::CarModel).string().not_null())
                    .col(ColumnDef::new(Bookings::CarYear).integer().not_null())
                    .col(ColumnDef::new(Bookings::ScheduledDate).date().not_null())
                    .col(ColumnDef::new(Bookings::ScheduledTime).time().not_null())
                    .col(
                        ColumnDef::new(Bookings::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Bookings::FindersFee).decimal().not_null())
                    .col(ColumnDef::new(Bookings::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Bookings::UpdatedAt).timestamp().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Bookings {
    Table,
    Id,
    CustomerId,
    InstallerId,
    ProductId,
    CarBrand,
    CarModel,
    CarYear,
    ScheduledDate,
    ScheduledTime,
    Status,
    FindersFee,
    CreatedAt,
    UpdatedAt,
}
