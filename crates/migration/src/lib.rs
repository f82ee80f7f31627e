pub use sea_orm_migration::prelude::*;

mod m20260810_091500_accounts;
mod m20260810_092200_transactions;
mod m20260811_100000_currencies;
mod m20260811_101500_satellites;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260810_091500_accounts::Migration),
            Box::new(m20260810_092200_transactions::Migration),
            Box::new(m20260811_100000_currencies::Migration),
            Box::new(m20260811_101500_satellites::Migration),
        ]
    }
}
