pub use sea_orm_migration::prelude::*;

mod m0000010_create_vulnerability;
mod m0000020_create_search_history;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m0000010_create_vulnerability::Migration),
            Box::new(m0000020_create_search_history::Migration),
        ]
    }
}
