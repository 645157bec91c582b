use std::{ops::Deref, path::Path};

use abi::Config;
use sqlx::PgPool;
use sqlx_db_tester::TestDb;

/// fixture config pointed at a throw-away database, dropped with the value
pub struct TestConfig {
    tdb: TestDb,
    pub config: Config,
}

impl TestConfig {
    pub fn new(filename: impl AsRef<Path>) -> Self {
        let mut config = Config::load(filename).unwrap();
        let tdb = TestDb::new(
            &config.db.host,
            config.db.port,
            &config.db.user,
            &config.db.password,
            "../migrations",
        );
        config.db.dbname = tdb.dbname.clone();
        Self { tdb, config }
    }

    pub async fn pool(&self) -> PgPool {
        self.tdb.get_pool().await
    }
}

impl Deref for TestConfig {
    type Target = Config;

    fn deref(&self) -> &Self::Target {
        &self.config
    }
}

impl Default for TestConfig {
    fn default() -> Self {
        Self::new("fixtures/config.yml")
    }
}
