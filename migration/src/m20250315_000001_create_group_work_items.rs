use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建组内工作项表
        manager
            .create_table(
                Table::create()
                    .table(GroupWorkItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupWorkItems::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GroupWorkItems::GroupId).big_integer().not_null())
                    .col(ColumnDef::new(GroupWorkItems::Name).string().not_null())
                    .col(ColumnDef::new(GroupWorkItems::Details).text().null())
                    .col(ColumnDef::new(GroupWorkItems::Status).string().not_null())
                    .col(ColumnDef::new(GroupWorkItems::Priority).integer().not_null())
                    .col(ColumnDef::new(GroupWorkItems::Publisher).big_integer().not_null())
                    .col(ColumnDef::new(GroupWorkItems::Deadline).big_integer().null())
                    .col(
                        ColumnDef::new(GroupWorkItems::PublishTime)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GroupWorkItems::UpdateTime)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GroupWorkItems::Table, GroupWorkItems::GroupId)
                            .to(ClassGroups::Table, ClassGroups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 工作项负责角色
        manager
            .create_table(
                Table::create()
                    .table(GroupWorkItemAssignees::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupWorkItemAssignees::WorkItemId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GroupWorkItemAssignees::RoleId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(GroupWorkItemAssignees::WorkItemId)
                            .col(GroupWorkItemAssignees::RoleId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GroupWorkItemAssignees::Table, GroupWorkItemAssignees::WorkItemId)
                            .to(GroupWorkItems::Table, GroupWorkItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GroupWorkItemAssignees::Table, GroupWorkItemAssignees::RoleId)
                            .to(GroupRoles::Table, GroupRoles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 工作项附件，file_id 是文件存储中的外部 ID
        manager
            .create_table(
                Table::create()
                    .table(GroupWorkItemFiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupWorkItemFiles::WorkItemId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GroupWorkItemFiles::FileId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(GroupWorkItemFiles::WorkItemId)
                            .col(GroupWorkItemFiles::FileId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GroupWorkItemFiles::Table, GroupWorkItemFiles::WorkItemId)
                            .to(GroupWorkItems::Table, GroupWorkItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_group_work_items_group_id")
                    .table(GroupWorkItems::Table)
                    .col(GroupWorkItems::GroupId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GroupWorkItemFiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupWorkItemAssignees::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupWorkItems::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum ClassGroups {
    #[sea_orm(iden = "class_groups")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum GroupRoles {
    #[sea_orm(iden = "group_roles")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum GroupWorkItems {
    #[sea_orm(iden = "group_work_items")]
    Table,
    Id,
    GroupId,
    Name,
    Details,
    Status,
    Priority,
    Publisher,
    Deadline,
    PublishTime,
    UpdateTime,
}

#[derive(DeriveIden)]
enum GroupWorkItemAssignees {
    #[sea_orm(iden = "group_work_item_assignees")]
    Table,
    WorkItemId,
    RoleId,
}

#[derive(DeriveIden)]
enum GroupWorkItemFiles {
    #[sea_orm(iden = "group_work_item_files")]
    Table,
    WorkItemId,
    FileId,
}
