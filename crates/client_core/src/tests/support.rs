use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicI64, AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use shared::{
    domain::CompanyId,
    protocol::{Company, CompanyAdd},
};
use tokio::sync::{oneshot, Mutex};

use crate::{
    api::ResourceApi,
    error::ApiError,
    paging::{PageRequest, PageResult},
    resource::Resource,
};

/// In-memory collection with call counters and optional gates that hold a
/// fetch until the test releases it.
pub(crate) struct FakeApi<R: Resource> {
    pub records: Mutex<Vec<R>>,
    pub fail_fetch: Mutex<Option<String>>,
    pub fail_mutations: Mutex<Option<String>>,
    fetch_calls: AtomicUsize,
    mutation_calls: AtomicUsize,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    served_page: Mutex<Option<PageRequest>>,
    next_id: AtomicI64,
    build: fn(&R::Add, i64) -> R,
    apply_edit: fn(&R::Edit) -> R,
}

impl<R: Resource> FakeApi<R> {
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn mutation_calls(&self) -> usize {
        self.mutation_calls.load(Ordering::SeqCst)
    }

    /// The next fetch blocks until the returned sender fires (or is dropped).
    pub async fn hold_next_fetch(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().await.push_back(rx);
        tx
    }

    /// Answers every later fetch with `page` regardless of what was asked,
    /// like a server that clamps or resizes out-of-range requests.
    pub async fn serve_page_instead(&self, page: PageRequest) {
        *self.served_page.lock().await = Some(page);
    }

    pub async fn fail_fetches_with(&self, message: &str) {
        *self.fail_fetch.lock().await = Some(message.to_string());
    }

    pub async fn fail_mutations_with(&self, message: &str) {
        *self.fail_mutations.lock().await = Some(message.to_string());
    }

    async fn mutation_error(&self) -> Option<ApiError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        self.fail_mutations
            .lock()
            .await
            .clone()
            .map(|message| ApiError::Status {
                status: 500,
                message,
            })
    }

    async fn page(&self, request: PageRequest) -> Result<PageResult<R>, ApiError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().await.pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if let Some(message) = self.fail_fetch.lock().await.clone() {
            return Err(ApiError::UnexpectedShape(message));
        }
        let request = self.served_page.lock().await.unwrap_or(request);
        let records = self.records.lock().await;
        let start =
            (request.page_number as usize * request.page_size as usize).min(records.len());
        let end = (start + request.page_size as usize).min(records.len());
        PageResult::new(
            records[start..end].to_vec(),
            records.len() as u64,
            request.page_number,
            request.page_size,
        )
    }
}

impl FakeApi<Company> {
    pub fn companies(count: usize) -> Arc<Self> {
        let records = (1..=count as i64).map(|i| company(i, &format!("Company {i}"))).collect();
        Arc::new(Self {
            records: Mutex::new(records),
            fail_fetch: Mutex::new(None),
            fail_mutations: Mutex::new(None),
            fetch_calls: AtomicUsize::new(0),
            mutation_calls: AtomicUsize::new(0),
            gates: Mutex::new(VecDeque::new()),
            served_page: Mutex::new(None),
            next_id: AtomicI64::new(count as i64 + 1),
            build: |add: &CompanyAdd, id| Company {
                id: Some(CompanyId(id)),
                name: add.name.clone(),
                industry: add.industry.clone(),
                address: add.address.clone(),
                email: add.email.clone(),
                created_at: None,
                updated_at: None,
            },
            apply_edit: |edit: &Company| edit.clone(),
        })
    }
}

pub(crate) fn company(id: i64, name: &str) -> Company {
    Company {
        id: Some(CompanyId(id)),
        name: name.to_string(),
        industry: "Software".into(),
        address: "Main St 1".into(),
        email: format!("info{id}@example.com"),
        created_at: None,
        updated_at: None,
    }
}

#[async_trait]
impl<R: Resource> ResourceApi<R> for FakeApi<R> {
    async fn fetch_page(&self, request: PageRequest) -> Result<PageResult<R>, ApiError> {
        self.page(request).await
    }

    async fn search(&self, _query: &str, request: PageRequest) -> Result<PageResult<R>, ApiError> {
        self.page(request).await
    }

    async fn get(&self, id: R::Id) -> Result<R, ApiError> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| r.id() == Some(id))
            .cloned()
            .ok_or(ApiError::Status {
                status: 404,
                message: format!("{id} not found"),
            })
    }

    async fn create(&self, payload: &R::Add) -> Result<R, ApiError> {
        if let Some(err) = self.mutation_error().await {
            return Err(err);
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = (self.build)(payload, id);
        self.records.lock().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, payload: &R::Edit) -> Result<(), ApiError> {
        if let Some(err) = self.mutation_error().await {
            return Err(err);
        }
        let updated = (self.apply_edit)(payload);
        let mut records = self.records.lock().await;
        let slot = records
            .iter_mut()
            .find(|r| r.id() == updated.id())
            .ok_or(ApiError::Status {
                status: 404,
                message: "not found".into(),
            })?;
        *slot = updated;
        Ok(())
    }

    async fn remove(&self, id: R::Id) -> Result<(), ApiError> {
        if let Some(err) = self.mutation_error().await {
            return Err(err);
        }
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| r.id() != Some(id));
        if records.len() == before {
            return Err(ApiError::Status {
                status: 404,
                message: format!("{id} not found"),
            });
        }
        Ok(())
    }
}
