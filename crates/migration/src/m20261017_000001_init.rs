//! Initial schema migration - creates all tables from scratch.
//!
//! - `users`: authentication
//! - `categories`: per-user income/expense/asset categories
//! - `period_settings`: the day each user's monthly period starts
//! - `assets`, `liabilities`, `incomes`, `expenses`: period ledgers
//!
//! Monetary columns are `TEXT` holding `base64(nonce || ciphertext)`; the
//! database never sees a plain amount.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Username,
    Email,
    PasswordHash,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    UserId,
    Kind,
    Name,
    NameNorm,
}

#[derive(Iden)]
enum PeriodSettings {
    Table,
    UserId,
    DayOfMonth,
}

#[derive(Iden)]
enum Assets {
    Table,
    Id,
    UserId,
    PeriodCode,
    CategoryId,
    Name,
    Amount,
    Value,
    Notes,
    OrderNo,
}

#[derive(Iden)]
enum Liabilities {
    Table,
    Id,
    UserId,
    PeriodCode,
    Name,
    Value,
    Installment,
    OrderNo,
}

#[derive(Iden)]
enum Incomes {
    Table,
    Id,
    UserId,
    PeriodCode,
    CategoryId,
    Name,
    Date,
    Value,
    Notes,
    OrderNo,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    UserId,
    PeriodCode,
    CategoryId,
    LiabilityId,
    Name,
    Date,
    Value,
    Notes,
    OrderNo,
}

fn id_column<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

/// `user_id` reference shared by every owned table.
fn owned_by_user<T: IntoIden + 'static>(table: T, column: T, name: &str) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, column)
        .to(Users::Table, Users::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(&mut id_column(Users::Id))
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(&mut id_column(Categories::Id))
                    .col(ColumnDef::new(Categories::UserId).integer().not_null())
                    .col(ColumnDef::new(Categories::Kind).string().not_null())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::NameNorm).string().not_null())
                    .foreign_key(&mut owned_by_user(
                        Categories::Table,
                        Categories::UserId,
                        "fk-categories-user_id",
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-user_id-kind-name_norm-unique")
                    .table(Categories::Table)
                    .col(Categories::UserId)
                    .col(Categories::Kind)
                    .col(Categories::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Period settings
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PeriodSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PeriodSettings::UserId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PeriodSettings::DayOfMonth)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .foreign_key(&mut owned_by_user(
                        PeriodSettings::Table,
                        PeriodSettings::UserId,
                        "fk-period_settings-user_id",
                    ))
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Assets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Assets::Table)
                    .if_not_exists()
                    .col(&mut id_column(Assets::Id))
                    .col(ColumnDef::new(Assets::UserId).integer().not_null())
                    .col(ColumnDef::new(Assets::PeriodCode).string().not_null())
                    .col(ColumnDef::new(Assets::CategoryId).integer())
                    .col(ColumnDef::new(Assets::Name).string().not_null())
                    .col(ColumnDef::new(Assets::Amount).text().not_null())
                    .col(ColumnDef::new(Assets::Value).text().not_null())
                    .col(ColumnDef::new(Assets::Notes).string())
                    .col(ColumnDef::new(Assets::OrderNo).integer().not_null())
                    .foreign_key(&mut owned_by_user(
                        Assets::Table,
                        Assets::UserId,
                        "fk-assets-user_id",
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assets-category_id")
                            .from(Assets::Table, Assets::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-assets-user_id-period_code")
                    .table(Assets::Table)
                    .col(Assets::UserId)
                    .col(Assets::PeriodCode)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Liabilities
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Liabilities::Table)
                    .if_not_exists()
                    .col(&mut id_column(Liabilities::Id))
                    .col(ColumnDef::new(Liabilities::UserId).integer().not_null())
                    .col(ColumnDef::new(Liabilities::PeriodCode).string().not_null())
                    .col(ColumnDef::new(Liabilities::Name).string().not_null())
                    .col(ColumnDef::new(Liabilities::Value).text().not_null())
                    .col(ColumnDef::new(Liabilities::Installment).text())
                    .col(ColumnDef::new(Liabilities::OrderNo).integer().not_null())
                    .foreign_key(&mut owned_by_user(
                        Liabilities::Table,
                        Liabilities::UserId,
                        "fk-liabilities-user_id",
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-liabilities-user_id-period_code")
                    .table(Liabilities::Table)
                    .col(Liabilities::UserId)
                    .col(Liabilities::PeriodCode)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Incomes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Incomes::Table)
                    .if_not_exists()
                    .col(&mut id_column(Incomes::Id))
                    .col(ColumnDef::new(Incomes::UserId).integer().not_null())
                    .col(ColumnDef::new(Incomes::PeriodCode).string().not_null())
                    .col(ColumnDef::new(Incomes::CategoryId).integer())
                    .col(ColumnDef::new(Incomes::Name).string().not_null())
                    .col(ColumnDef::new(Incomes::Date).date())
                    .col(ColumnDef::new(Incomes::Value).text().not_null())
                    .col(ColumnDef::new(Incomes::Notes).string())
                    .col(ColumnDef::new(Incomes::OrderNo).integer().not_null())
                    .foreign_key(&mut owned_by_user(
                        Incomes::Table,
                        Incomes::UserId,
                        "fk-incomes-user_id",
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-incomes-category_id")
                            .from(Incomes::Table, Incomes::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-incomes-user_id-period_code")
                    .table(Incomes::Table)
                    .col(Incomes::UserId)
                    .col(Incomes::PeriodCode)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-incomes-user_id-date")
                    .table(Incomes::Table)
                    .col(Incomes::UserId)
                    .col(Incomes::Date)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(&mut id_column(Expenses::Id))
                    .col(ColumnDef::new(Expenses::UserId).integer().not_null())
                    .col(ColumnDef::new(Expenses::PeriodCode).string().not_null())
                    .col(ColumnDef::new(Expenses::CategoryId).integer())
                    .col(ColumnDef::new(Expenses::LiabilityId).integer())
                    .col(ColumnDef::new(Expenses::Name).string().not_null())
                    .col(ColumnDef::new(Expenses::Date).date())
                    .col(ColumnDef::new(Expenses::Value).text().not_null())
                    .col(ColumnDef::new(Expenses::Notes).string())
                    .col(ColumnDef::new(Expenses::OrderNo).integer().not_null())
                    .foreign_key(&mut owned_by_user(
                        Expenses::Table,
                        Expenses::UserId,
                        "fk-expenses-user_id",
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-category_id")
                            .from(Expenses::Table, Expenses::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-liability_id")
                            .from(Expenses::Table, Expenses::LiabilityId)
                            .to(Liabilities::Table, Liabilities::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-user_id-period_code")
                    .table(Expenses::Table)
                    .col(Expenses::UserId)
                    .col(Expenses::PeriodCode)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-user_id-date")
                    .table(Expenses::Table)
                    .col(Expenses::UserId)
                    .col(Expenses::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-liability_id")
                    .table(Expenses::Table)
                    .col(Expenses::LiabilityId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Incomes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Liabilities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PeriodSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
