use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // credential 表
        manager
            .create_table(
                Table::create()
                    .table(Credential::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Credential::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Credential::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Credential::LastUpdated).string().not_null())
                    .col(ColumnDef::new(Credential::Version).string().not_null())
                    .to_owned(),
            )
            .await?;

        // registrars 表
        manager
            .create_table(
                Table::create()
                    .table(Registrars::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Registrars::Name)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Registrars::Website).string().null())
                    .col(ColumnDef::new(Registrars::Logo).string().null())
                    .col(ColumnDef::new(Registrars::ApiKey).string().null())
                    .col(ColumnDef::new(Registrars::Description).string().null())
                    .col(ColumnDef::new(Registrars::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Registrars::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        // domains 表
        manager
            .create_table(
                Table::create()
                    .table(Domains::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Domains::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Domains::Name).string().not_null())
                    .col(
                        ColumnDef::new(Domains::Extension)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Domains::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Domains::Registrar).string().null())
                    .col(ColumnDef::new(Domains::RegistrarIcon).string().null())
                    .col(ColumnDef::new(Domains::RegisteredAt).string().null())
                    .col(ColumnDef::new(Domains::ExpiresAt).string().null())
                    .col(ColumnDef::new(Domains::PurchaseUrl).string().null())
                    .col(ColumnDef::new(Domains::Price).string().null())
                    .col(ColumnDef::new(Domains::Description).string().null())
                    .col(
                        ColumnDef::new(Domains::Featured)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Domains::Buyer).string().null())
                    .col(ColumnDef::new(Domains::SoldAt).string().null())
                    .col(ColumnDef::new(Domains::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Domains::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        // sold_domains 表
        manager
            .create_table(
                Table::create()
                    .table(SoldDomains::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SoldDomains::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SoldDomains::Name).string().not_null())
                    .col(
                        ColumnDef::new(SoldDomains::Extension)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(SoldDomains::Price).string().null())
                    .col(ColumnDef::new(SoldDomains::Buyer).string().null())
                    .col(ColumnDef::new(SoldDomains::SoldAt).string().null())
                    .col(ColumnDef::new(SoldDomains::Registrar).string().null())
                    .col(ColumnDef::new(SoldDomains::CreatedAt).string().not_null())
                    .col(ColumnDef::new(SoldDomains::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        // friendly_links 表
        manager
            .create_table(
                Table::create()
                    .table(FriendlyLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FriendlyLinks::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FriendlyLinks::Name).string().not_null())
                    .col(ColumnDef::new(FriendlyLinks::Url).string().not_null())
                    .col(
                        ColumnDef::new(FriendlyLinks::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(FriendlyLinks::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(FriendlyLinks::CreatedAt).string().not_null())
                    .col(ColumnDef::new(FriendlyLinks::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        // site_settings 表
        manager
            .create_table(
                Table::create()
                    .table(SiteSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SiteSettings::Key)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SiteSettings::Value).string().not_null())
                    .col(ColumnDef::new(SiteSettings::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SiteSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FriendlyLinks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SoldDomains::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Domains::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Registrars::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Credential::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Credential {
    Table,
    Id,
    PasswordHash,
    LastUpdated,
    Version,
}

#[derive(DeriveIden)]
enum Registrars {
    Table,
    Name,
    Website,
    Logo,
    ApiKey,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Domains {
    Table,
    Id,
    Name,
    Extension,
    Status,
    Registrar,
    RegistrarIcon,
    RegisteredAt,
    ExpiresAt,
    PurchaseUrl,
    Price,
    Description,
    Featured,
    Buyer,
    SoldAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SoldDomains {
    Table,
    Id,
    Name,
    Extension,
    Price,
    Buyer,
    SoldAt,
    Registrar,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum FriendlyLinks {
    Table,
    Id,
    Name,
    Url,
    Description,
    Position,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SiteSettings {
    Table,
    Key,
    Value,
    UpdatedAt,
}
