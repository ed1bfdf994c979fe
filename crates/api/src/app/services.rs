//! Store selection and service wiring.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use tracker_core::SystemClock;
use tracker_domain::{Services, Store};
use tracker_infra::{seed_demo_data, InMemoryStore, PostgresStore};

use crate::config::ApiConfig;

/// Everything the handlers need: the store (for authentication) and the
/// aggregate services built over it.
pub struct AppServices {
    pub store: Arc<dyn Store>,
    pub domain: Services<dyn Store>,
}

impl AppServices {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let domain = Services::new(store.clone(), Arc::new(SystemClock));
        Self { store, domain }
    }

    /// In-memory store with the reference tables seeded.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::with_reference_data()))
    }
}

pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let services = match (config.use_persistent_stores, config.database_url.as_deref()) {
        (true, Some(url)) => {
            let store = PostgresStore::connect(url)
                .await
                .context("connect to postgres")?;
            store.migrate().await.context("apply schema")?;
            store
                .seed_reference_data()
                .await
                .context("seed reference tables")?;
            info!("using postgres store");
            AppServices::new(Arc::new(store))
        }
        _ => {
            info!("using in-memory store");
            AppServices::in_memory()
        }
    };

    if config.seed_demo_data {
        let seeded = seed_demo_data(&*services.store, &services.domain)
            .await
            .context("seed demo data")?;
        if let Some(accounts) = seeded {
            for account in [&accounts.admin, &accounts.project_manager, &accounts.developer] {
                info!(
                    company_id = %accounts.company_id,
                    user_id = %account.user.id,
                    username = %account.user.username,
                    role = %account.user.role.role,
                    "demo account"
                );
            }
        }
    }

    Ok(services)
}
