use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建班级表
        // first_task_id 指向任务链表头，不加外键，由工作流保证一致
        manager
            .create_table(
                Table::create()
                    .table(Classes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Classes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Classes::Name).string().not_null())
                    .col(ColumnDef::new(Classes::Description).text().null())
                    .col(ColumnDef::new(Classes::Status).string().not_null())
                    .col(ColumnDef::new(Classes::FirstTaskId).big_integer().null())
                    .col(
                        ColumnDef::new(Classes::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Classes::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Classes::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建任务表
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tasks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tasks::ClassId).big_integer().not_null())
                    .col(ColumnDef::new(Tasks::Name).string().not_null())
                    .col(ColumnDef::new(Tasks::Content).text().null())
                    .col(ColumnDef::new(Tasks::SpecifiedRole).big_integer().null())
                    .col(ColumnDef::new(Tasks::NextTaskId).big_integer().null())
                    .col(ColumnDef::new(Tasks::GradePercentage).double().not_null())
                    .col(ColumnDef::new(Tasks::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Tasks::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Tasks::Table, Tasks::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建分组角色表
        manager
            .create_table(
                Table::create()
                    .table(GroupRoles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupRoles::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GroupRoles::ClassId).big_integer().not_null())
                    .col(ColumnDef::new(GroupRoles::RoleName).string().not_null())
                    .col(ColumnDef::new(GroupRoles::RoleDescription).text().null())
                    .col(
                        ColumnDef::new(GroupRoles::IsManager)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GroupRoles::Table, GroupRoles::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建分组表
        manager
            .create_table(
                Table::create()
                    .table(ClassGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClassGroups::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClassGroups::ClassId).big_integer().not_null())
                    .col(ColumnDef::new(ClassGroups::Name).string().not_null())
                    .col(ColumnDef::new(ClassGroups::Status).string().not_null())
                    .col(ColumnDef::new(ClassGroups::CurrentTaskId).big_integer().null())
                    .col(ColumnDef::new(ClassGroups::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(ClassGroups::Table, ClassGroups::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建班级成员表
        manager
            .create_table(
                Table::create()
                    .table(ClassMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClassMembers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClassMembers::ClassId).big_integer().not_null())
                    .col(ColumnDef::new(ClassMembers::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(ClassMembers::IsTeacher)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ClassMembers::GroupId).big_integer().null())
                    .col(ColumnDef::new(ClassMembers::Status).string().null())
                    .col(ColumnDef::new(ClassMembers::JoinedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(ClassMembers::Table, ClassMembers::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ClassMembers::Table, ClassMembers::GroupId)
                            .to(ClassGroups::Table, ClassGroups::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建成员角色关联表
        manager
            .create_table(
                Table::create()
                    .table(GroupMemberRoles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupMemberRoles::ClassMemberId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GroupMemberRoles::RoleId).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(GroupMemberRoles::ClassMemberId)
                            .col(GroupMemberRoles::RoleId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GroupMemberRoles::Table, GroupMemberRoles::ClassMemberId)
                            .to(ClassMembers::Table, ClassMembers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GroupMemberRoles::Table, GroupMemberRoles::RoleId)
                            .to(GroupRoles::Table, GroupRoles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建交付表
        manager
            .create_table(
                Table::create()
                    .table(Deliveries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Deliveries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Deliveries::TaskId).big_integer().not_null())
                    .col(ColumnDef::new(Deliveries::GroupId).big_integer().not_null())
                    .col(ColumnDef::new(Deliveries::Status).string().not_null())
                    .col(ColumnDef::new(Deliveries::DeliveryUser).big_integer().not_null())
                    .col(
                        ColumnDef::new(Deliveries::TaskGradePercentage)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Deliveries::DeliveryComments).text().null())
                    .col(ColumnDef::new(Deliveries::DeliveryTime).big_integer().null())
                    .col(ColumnDef::new(Deliveries::ReviewComments).text().null())
                    .col(ColumnDef::new(Deliveries::ReviewTime).big_integer().null())
                    .col(ColumnDef::new(Deliveries::Score).double().null())
                    .col(ColumnDef::new(Deliveries::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Deliveries::Table, Deliveries::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Deliveries::Table, Deliveries::GroupId)
                            .to(ClassGroups::Table, ClassGroups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建交付项表
        manager
            .create_table(
                Table::create()
                    .table(DeliveryItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeliveryItems::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DeliveryItems::DeliveryId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DeliveryItems::ItemType).string().not_null())
                    .col(ColumnDef::new(DeliveryItems::ItemId).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(DeliveryItems::Table, DeliveryItems::DeliveryId)
                            .to(Deliveries::Table, Deliveries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建组内互评表，两张评分表以 JSON 文本保存
        manager
            .create_table(
                Table::create()
                    .table(TaskGroupMemberScores::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TaskGroupMemberScores::TaskId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TaskGroupMemberScores::GroupId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TaskGroupMemberScores::ManagerScore)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TaskGroupMemberScores::MemberScores)
                            .text()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(TaskGroupMemberScores::TaskId)
                            .col(TaskGroupMemberScores::GroupId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TaskGroupMemberScores::Table, TaskGroupMemberScores::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TaskGroupMemberScores::Table, TaskGroupMemberScores::GroupId)
                            .to(ClassGroups::Table, ClassGroups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建教师评分表
        manager
            .create_table(
                Table::create()
                    .table(TeacherScores::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TeacherScores::TaskId).big_integer().not_null())
                    .col(ColumnDef::new(TeacherScores::UserId).big_integer().not_null())
                    .col(ColumnDef::new(TeacherScores::Score).double().not_null())
                    .col(ColumnDef::new(TeacherScores::ScoreDetails).text().null())
                    .col(
                        ColumnDef::new(TeacherScores::ScoreTime)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(TeacherScores::TaskId)
                            .col(TeacherScores::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TeacherScores::Table, TeacherScores::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tasks_class_id")
                    .table(Tasks::Table)
                    .col(Tasks::ClassId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_group_roles_class_id")
                    .table(GroupRoles::Table)
                    .col(GroupRoles::ClassId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_class_groups_class_id")
                    .table(ClassGroups::Table)
                    .col(ClassGroups::ClassId)
                    .to_owned(),
            )
            .await?;

        // 同一用户在一个班级中只能有一条成员记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_class_members_class_user")
                    .table(ClassMembers::Table)
                    .col(ClassMembers::ClassId)
                    .col(ClassMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_class_members_group_id")
                    .table(ClassMembers::Table)
                    .col(ClassMembers::GroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_deliveries_task_group")
                    .table(Deliveries::Table)
                    .col(Deliveries::TaskId)
                    .col(Deliveries::GroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_delivery_items_delivery_id")
                    .table(DeliveryItems::Table)
                    .col(DeliveryItems::DeliveryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(TeacherScores::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaskGroupMemberScores::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DeliveryItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Deliveries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupMemberRoles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ClassMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ClassGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupRoles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Classes::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Classes {
    #[sea_orm(iden = "classes")]
    Table,
    Id,
    Name,
    Description,
    Status,
    FirstTaskId,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tasks {
    #[sea_orm(iden = "tasks")]
    Table,
    Id,
    ClassId,
    Name,
    Content,
    SpecifiedRole,
    NextTaskId,
    GradePercentage,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GroupRoles {
    #[sea_orm(iden = "group_roles")]
    Table,
    Id,
    ClassId,
    RoleName,
    RoleDescription,
    IsManager,
}

#[derive(DeriveIden)]
enum ClassGroups {
    #[sea_orm(iden = "class_groups")]
    Table,
    Id,
    ClassId,
    Name,
    Status,
    CurrentTaskId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ClassMembers {
    #[sea_orm(iden = "class_members")]
    Table,
    Id,
    ClassId,
    UserId,
    IsTeacher,
    GroupId,
    Status,
    JoinedAt,
}

#[derive(DeriveIden)]
enum GroupMemberRoles {
    #[sea_orm(iden = "group_member_roles")]
    Table,
    ClassMemberId,
    RoleId,
}

#[derive(DeriveIden)]
enum Deliveries {
    #[sea_orm(iden = "deliveries")]
    Table,
    Id,
    TaskId,
    GroupId,
    Status,
    DeliveryUser,
    TaskGradePercentage,
    DeliveryComments,
    DeliveryTime,
    ReviewComments,
    ReviewTime,
    Score,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DeliveryItems {
    #[sea_orm(iden = "delivery_items")]
    Table,
    Id,
    DeliveryId,
    ItemType,
    ItemId,
}

#[derive(DeriveIden)]
enum TaskGroupMemberScores {
    #[sea_orm(iden = "task_group_member_scores")]
    Table,
    TaskId,
    GroupId,
    ManagerScore,
    MemberScores,
}

#[derive(DeriveIden)]
enum TeacherScores {
    #[sea_orm(iden = "teacher_scores")]
    Table,
    TaskId,
    UserId,
    Score,
    ScoreDetails,
    ScoreTime,
}
