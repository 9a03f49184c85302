//! 表单提交表迁移
//!
//! 创建 form_submissions 表，按表单和创建时间建立索引，
//! 供报表时间范围查询和保留期清理使用。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FormSubmissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FormSubmissions::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FormSubmissions::FormHandle)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FormSubmissions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FormSubmissions::Data).text().not_null())
                    .to_owned(),
            )
            .await?;

        // 时间范围查询（报表、清理）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_form_submissions_created_at")
                    .table(FormSubmissions::Table)
                    .col(FormSubmissions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // 单表单报表
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_form_submissions_form_time")
                    .table(FormSubmissions::Table)
                    .col(FormSubmissions::FormHandle)
                    .col(FormSubmissions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_form_submissions_form_time")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_form_submissions_created_at")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(FormSubmissions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum FormSubmissions {
    #[sea_orm(iden = "form_submissions")]
    Table,
    Id,
    FormHandle,
    CreatedAt,
    Data,
}
