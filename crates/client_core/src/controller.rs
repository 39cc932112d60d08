use std::{sync::Arc, time::Duration};

use tokio::{sync::Mutex, time::timeout};
use tracing::{debug, error, warn};

use crate::{
    api::ResourceApi,
    error::{ApiError, FetchError},
    paging::{is_allowed_page_size, PageRequest, PageState, DEFAULT_PAGE_SIZE},
    resource::Resource,
};

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    pub fetch_timeout: Duration,
    pub initial_page_size: u32,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            initial_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListPhase {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// Consistent copy of the controller state at one point in time.
#[derive(Debug, Clone)]
pub struct ListSnapshot<R> {
    pub items: Vec<R>,
    pub page: PageState,
    pub phase: ListPhase,
    pub query: Option<String>,
}

impl<R> ListSnapshot<R> {
    pub fn is_loading(&self) -> bool {
        self.phase == ListPhase::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            ListPhase::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer fetch was dispatched, or the controller was closed, before
    /// this response arrived.
    Discarded,
}

struct ListState<R> {
    items: Vec<R>,
    page: PageState,
    phase: ListPhase,
    query: Option<String>,
    latest_seq: u64,
    closed: bool,
}

/// Owns the current page of one resource collection.
///
/// Every dispatched fetch takes a sequence number; only the response to the
/// latest one is applied, so a slow older response can never overwrite a
/// newer page.
pub struct ResourceListController<R: Resource> {
    api: Arc<dyn ResourceApi<R>>,
    state: Arc<Mutex<ListState<R>>>,
    options: ControllerOptions,
}

impl<R: Resource> Clone for ResourceListController<R> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            state: self.state.clone(),
            options: self.options,
        }
    }
}

impl<R: Resource> ResourceListController<R> {
    pub fn new(api: Arc<dyn ResourceApi<R>>, options: ControllerOptions) -> Self {
        let page_size = if is_allowed_page_size(options.initial_page_size) {
            options.initial_page_size
        } else {
            warn!(
                resource = R::KIND.path(),
                size = options.initial_page_size,
                "unsupported initial page size, using default"
            );
            DEFAULT_PAGE_SIZE
        };
        Self {
            api,
            state: Arc::new(Mutex::new(ListState {
                items: Vec::new(),
                page: PageState {
                    page_number: 0,
                    page_size,
                    total_records: 0,
                },
                phase: ListPhase::Idle,
                query: None,
                latest_seq: 0,
                closed: false,
            })),
            options: ControllerOptions {
                initial_page_size: page_size,
                ..options
            },
        }
    }

    pub fn api(&self) -> Arc<dyn ResourceApi<R>> {
        self.api.clone()
    }

    pub async fn snapshot(&self) -> ListSnapshot<R> {
        let state = self.state.lock().await;
        ListSnapshot {
            items: state.items.clone(),
            page: state.page,
            phase: state.phase.clone(),
            query: state.query.clone(),
        }
    }

    pub async fn initialize(&self) -> Result<FetchOutcome, FetchError> {
        self.fetch_page(0, self.options.initial_page_size).await
    }

    pub async fn fetch_page(
        &self,
        page_number: u32,
        page_size: u32,
    ) -> Result<FetchOutcome, FetchError> {
        if !is_allowed_page_size(page_size) {
            return Err(FetchError::InvalidPageSize(page_size));
        }
        self.dispatch(PageRequest::new(page_number, page_size)).await
    }

    /// Re-fetches the held page, stepping back to the last page when the
    /// collection shrank underneath it.
    pub async fn refetch_current_page(&self) -> Result<FetchOutcome, FetchError> {
        let request = self.state.lock().await.page.request();
        let outcome = self.dispatch(request).await?;
        if outcome == FetchOutcome::Applied {
            let page = self.state.lock().await.page;
            if !page.is_within_bounds() && page.page_count() > 0 {
                debug!(
                    resource = R::KIND.path(),
                    page = page.page_number,
                    "page out of range after refetch"
                );
                return self
                    .dispatch(PageRequest::new(page.page_count() - 1, page.page_size))
                    .await;
            }
        }
        Ok(outcome)
    }

    pub async fn next_page(&self) -> Result<FetchOutcome, FetchError> {
        let page = self.state.lock().await.page;
        if !page.has_next() {
            return Ok(FetchOutcome::Discarded);
        }
        self.dispatch(PageRequest::new(page.page_number + 1, page.page_size))
            .await
    }

    pub async fn previous_page(&self) -> Result<FetchOutcome, FetchError> {
        let page = self.state.lock().await.page;
        if !page.has_previous() {
            return Ok(FetchOutcome::Discarded);
        }
        self.dispatch(PageRequest::new(page.page_number - 1, page.page_size))
            .await
    }

    /// Switches page size and returns to the first page.
    pub async fn set_page_size(&self, page_size: u32) -> Result<FetchOutcome, FetchError> {
        self.fetch_page(0, page_size).await
    }

    /// Sets or clears the search query and reloads from the first page.
    pub async fn set_query(&self, query: Option<String>) -> Result<FetchOutcome, FetchError> {
        let page_size = {
            let mut state = self.state.lock().await;
            state.query = query
                .map(|q| q.trim().to_string())
                .filter(|q| !q.is_empty());
            state.page.page_size
        };
        self.dispatch(PageRequest::new(0, page_size)).await
    }

    /// Detaches the controller from its consumer; in-flight responses are
    /// dropped when they arrive.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        state.closed = true;
        if state.phase == ListPhase::Loading {
            state.phase = ListPhase::Idle;
        }
    }

    async fn dispatch(&self, request: PageRequest) -> Result<FetchOutcome, FetchError> {
        let (seq, query) = {
            let mut state = self.state.lock().await;
            if state.closed {
                return Ok(FetchOutcome::Discarded);
            }
            state.latest_seq += 1;
            state.phase = ListPhase::Loading;
            (state.latest_seq, state.query.clone())
        };
        debug!(
            resource = R::KIND.path(),
            page = request.page_number,
            size = request.page_size,
            seq,
            "dispatching page fetch"
        );

        let response = async {
            match query.as_deref() {
                Some(query) => self.api.search(query, request).await,
                None => self.api.fetch_page(request).await,
            }
        };
        let result = match timeout(self.options.fetch_timeout, response).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout(self.options.fetch_timeout)),
        };

        let mut state = self.state.lock().await;
        if state.closed || seq != state.latest_seq {
            debug!(
                resource = R::KIND.path(),
                seq,
                latest = state.latest_seq,
                "discarding stale page response"
            );
            return Ok(FetchOutcome::Discarded);
        }

        match result {
            Ok(page) => {
                state.items = page.items;
                state.page = PageState {
                    page_number: page.page_number,
                    page_size: page.page_size,
                    total_records: page.total_records,
                };
                state.phase = ListPhase::Ready;
                Ok(FetchOutcome::Applied)
            }
            Err(err) => {
                error!(
                    resource = R::KIND.path(),
                    page = request.page_number,
                    size = request.page_size,
                    error = %err,
                    "error fetching page"
                );
                state.items.clear();
                state.phase = ListPhase::Failed(err.to_string());
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
