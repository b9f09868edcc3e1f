pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_workflow_tables;
mod m20250315_000001_create_group_work_items;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_workflow_tables::Migration),
            Box::new(m20250315_000001_create_group_work_items::Migration),
        ]
    }
}
