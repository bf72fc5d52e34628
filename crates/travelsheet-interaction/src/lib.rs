pub mod apps_script_client;
pub mod catalog_client;

#[cfg(test)]
mod test_server;

pub use apps_script_client::AppsScriptClient;
pub use catalog_client::{BootConfig, CatalogClient};
