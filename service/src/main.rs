use std::path::Path;

use abi::Config;
use anyhow::{anyhow, Result};
use hotel_service::start_server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let filename = config_file()?;
    info!("config file: {}", filename);
    let config = Config::load(&filename)?;
    start_server(&config).await
}

// we would first try HOTEL_CONFIG env var,
// then try "./hotel.yml", then try "~/.config/hotel.yml"
// then try "/etc/hotel.yml"
fn config_file() -> Result<String> {
    if let Ok(filename) = std::env::var("HOTEL_CONFIG") {
        return Ok(filename);
    }
    let home = shellexpand::tilde("~/.config/hotel.yml").into_owned();
    let candidates = ["./hotel.yml".to_string(), home, "/etc/hotel.yml".to_string()];
    candidates
        .into_iter()
        .find(|p| Path::new(p).exists())
        .ok_or_else(|| anyhow!("no config file found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_should_honour_env_var() {
        std::env::set_var("HOTEL_CONFIG", "fixtures/config.yml");
        let filename = config_file().unwrap();
        assert_eq!(filename, "fixtures/config.yml");
        assert!(Config::load(filename).is_ok());
        std::env::remove_var("HOTEL_CONFIG");
    }
}
