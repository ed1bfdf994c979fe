use std::sync::Arc;

use tracing::{info, instrument};

use tracker_auth::Principal;
use tracker_core::{CompanyId, DomainError, DomainResult};

use crate::model::{Company, CompanyDraft};
use crate::ports::Store;

use super::{is_blank, load_company};

/// Companies are created and read; no operation updates or deletes them.
pub struct CompanyService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for CompanyService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: Store + ?Sized> CompanyService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> DomainResult<Vec<Company>> {
        Ok(self.store.list_companies().await?)
    }

    pub async fn get(&self, company_id: CompanyId) -> DomainResult<Company> {
        load_company(&*self.store, company_id).await
    }

    /// Any authenticated caller may create a company.
    #[instrument(skip(self, caller, draft), fields(caller = %caller.user_id), err)]
    pub async fn create(&self, caller: &Principal, draft: CompanyDraft) -> DomainResult<Company> {
        if is_blank(&draft.name) {
            return Err(DomainError::not_allowed("name", &draft.name));
        }

        if self.store.company_by_name(&draft.name).await?.is_some() {
            return Err(DomainError::already_exists("name", &draft.name));
        }

        let company = self.store.insert_company(draft).await?;
        info!(company_id = %company.id, "company created");
        Ok(company)
    }
}
