//! Drives a list view: turns interaction into queries and keeps only the latest result.
//!
//! Every parameter change starts a fetch on a background task. Finished fetches come back over a
//! channel together with the ticket they were started with; the observer applies a result only if
//! no newer fetch has been started since, so responses arriving out of order are dropped.

use crate::api::models::pagination::PaginatedResponse;
use crate::api::resources::Resource;
use crate::config::ListConfig;
use crate::query::resource::{QueryResult, ResourceQueries};
use crate::query::state::{QueryObserver, QueryState, Ticket};
use crate::view::debounce::Debouncer;
use crate::view::list::{FromListView, ListViewState};
use tokio::sync::{mpsc, watch};
use tracing::{debug, instrument};

/// What [`ListController::next_event`] observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEvent {
    /// A result for the latest parameters was applied to the state
    Applied,
    /// A result for superseded parameters arrived and was dropped
    Discarded,
    /// The debounced search text settled; `refetched` is false if the effective search did not change
    SearchCommitted { refetched: bool },
}

struct Settled<T> {
    ticket: Ticket,
    result: QueryResult<PaginatedResponse<T>>,
}

pub struct ListController<R: Resource>
where
    R::Filter: FromListView,
{
    queries: ResourceQueries<R>,
    view: ListViewState,
    observer: QueryObserver<PaginatedResponse<R::Response>>,
    search: Debouncer,
    search_rx: watch::Receiver<String>,
    results_tx: mpsc::UnboundedSender<Settled<R::Response>>,
    results_rx: mpsc::UnboundedReceiver<Settled<R::Response>>,
}

impl<R: Resource> ListController<R>
where
    R::Filter: FromListView,
{
    pub fn new(queries: ResourceQueries<R>, config: &ListConfig) -> Self {
        let search = Debouncer::new(config.search_debounce);
        let search_rx = search.subscribe();
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            queries,
            view: ListViewState::new(config.default_limit),
            observer: QueryObserver::new(),
            search,
            search_rx,
            results_tx,
            results_rx,
        }
    }

    pub fn view(&self) -> &ListViewState {
        &self.view
    }

    pub fn state(&self) -> &QueryState<PaginatedResponse<R::Response>> {
        self.observer.state()
    }

    /// The filter the current view state maps to.
    pub fn filter(&self) -> R::Filter {
        R::Filter::from_view(&self.view)
    }

    pub fn raw_search(&self) -> &str {
        self.search.raw()
    }

    /// Fetch the current parameters, superseding any fetch still in flight.
    #[instrument(skip(self), fields(entity = R::ENTITY))]
    pub fn refresh(&mut self) {
        let filter = self.filter();
        let ticket = self.observer.begin(ResourceQueries::<R>::list_key(&filter));
        debug!(key = %ticket.key(), "Fetching list");

        let queries = self.queries.clone();
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let result = queries.list(&filter).await;
            // receiver gone means the view was closed
            let _ = results.send(Settled { ticket, result });
        });
    }

    pub fn set_page(&mut self, page: u32) {
        if self.view.set_page(page) {
            self.refresh();
        }
    }

    pub fn next_page(&mut self) {
        let Some(pagination) = self.state().data().map(|page| page.pagination.clone()) else {
            return;
        };
        if self.view.next_page(&pagination) {
            self.refresh();
        }
    }

    pub fn previous_page(&mut self) {
        if self.view.previous_page() {
            self.refresh();
        }
    }

    pub fn set_limit(&mut self, limit: u32) {
        if self.view.set_limit(limit) {
            self.refresh();
        }
    }

    pub fn toggle_sort(&mut self, column: &str) {
        self.view.toggle_sort(column);
        self.refresh();
    }

    pub fn set_filter(&mut self, name: &str, value: Option<&str>) {
        if self.view.set_filter(name, value) {
            self.refresh();
        }
    }

    /// Keystroke in the search box. The query only changes once the input settles.
    pub fn search_input(&mut self, text: impl Into<String>) {
        self.search.input(text);
    }

    pub fn flush_search(&mut self) {
        self.search.flush();
    }

    pub fn toggle_selected(&mut self, id: &str) {
        self.view.toggle_selected(id);
    }

    pub fn clear_selection(&mut self) {
        self.view.clear_selection();
    }

    /// Drop cached pages of this entity (e.g. after a successful write) and refetch.
    pub async fn invalidate(&mut self) {
        self.queries.invalidate_lists().await;
        self.refresh();
    }

    /// Wait for the next settled fetch or committed search.
    pub async fn next_event(&mut self) -> Option<ListEvent> {
        tokio::select! {
            Some(settled) = self.results_rx.recv() => {
                if self.observer.settle(&settled.ticket, settled.result) {
                    Some(ListEvent::Applied)
                } else {
                    Some(ListEvent::Discarded)
                }
            }
            Ok(()) = self.search_rx.changed() => {
                let committed = self.search_rx.borrow_and_update().clone();
                let refetched = self.view.commit_search(&committed);
                if refetched {
                    self.refresh();
                }
                Some(ListEvent::SearchCommitted { refetched })
            }
            else => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::resources::{Categories, LabTechnicians};
    use crate::test_utils::{category_json, client_for, page_json, query_client, technician_json};
    use crate::view::list::CLINIC_FILTER;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn list_config() -> ListConfig {
        ListConfig {
            default_limit: 10,
            search_debounce: Duration::from_millis(50),
        }
    }

    #[tokio::test]
    async fn test_late_response_for_old_page_is_discarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .and(query_param("page", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(page_json(vec![category_json("c1", "Crowns")], 1, 2, 10))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![category_json("c11", "Veneers")], 2, 2, 10)))
            .mount(&server)
            .await;

        let queries = ResourceQueries::new(Categories::new(client_for(&server)), query_client());
        let mut list = ListController::new(queries, &list_config());

        list.refresh();
        assert!(list.state().is_loading());
        list.set_page(2);

        assert_eq!(list.next_event().await, Some(ListEvent::Applied));
        assert_eq!(list.state().data().unwrap().data[0].id, "c11");

        assert_eq!(list.next_event().await, Some(ListEvent::Discarded));
        assert_eq!(list.state().data().unwrap().data[0].id, "c11");
        assert_eq!(list.view().page(), 2);
    }

    #[tokio::test]
    async fn test_committed_search_refetches_from_first_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![technician_json("u1", "apetrova")], 1, 1, 10)))
            .mount(&server)
            .await;

        let queries = ResourceQueries::new(LabTechnicians::new(client_for(&server)), query_client());
        let mut list = ListController::new(queries, &list_config());
        list.set_page(3);
        assert_eq!(list.next_event().await, Some(ListEvent::Applied));

        list.search_input("an");
        list.search_input("ana");
        assert_eq!(list.raw_search(), "ana");
        assert_eq!(list.view().search(), None);

        assert_eq!(list.next_event().await, Some(ListEvent::SearchCommitted { refetched: true }));
        assert_eq!(list.view().page(), 1);
        assert_eq!(list.next_event().await, Some(ListEvent::Applied));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].url.query(), Some("role=lab_technician&page=1&limit=10&search=ana"));
    }

    #[tokio::test]
    async fn test_filter_and_sort_changes_refetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![], 1, 0, 10)))
            .mount(&server)
            .await;

        let queries = ResourceQueries::new(LabTechnicians::new(client_for(&server)), query_client());
        let mut list = ListController::new(queries, &list_config());

        list.set_filter(CLINIC_FILTER, Some("clinic-7"));
        assert_eq!(list.next_event().await, Some(ListEvent::Applied));
        list.toggle_sort("username");
        assert_eq!(list.next_event().await, Some(ListEvent::Applied));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(
            requests[1].url.query(),
            Some("role=lab_technician&page=1&limit=10&sortBy=username&sortOrder=asc&clinic=clinic-7")
        );
        assert!(list.state().data().is_some_and(|page| page.data.is_empty()));
    }

    #[tokio::test]
    async fn test_invalidate_refetches_instead_of_joining_running_load() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(page_json(vec![category_json("c1", "Crowns")], 1, 1, 10))
                    .set_delay(Duration::from_millis(300)),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![category_json("c1", "Full crowns")], 1, 1, 10)))
            .mount(&server)
            .await;

        let queries = ResourceQueries::new(Categories::new(client_for(&server)), query_client());
        let mut list = ListController::new(queries, &list_config());

        list.refresh();
        while server.received_requests().await.unwrap().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        list.invalidate().await;

        assert_eq!(list.next_event().await, Some(ListEvent::Applied));
        assert_eq!(list.state().data().unwrap().data[0].name, "Full crowns");
        assert_eq!(list.next_event().await, Some(ListEvent::Discarded));
        assert_eq!(list.state().data().unwrap().data[0].name, "Full crowns");

        list.refresh();
        assert_eq!(list.next_event().await, Some(ListEvent::Applied));
        assert_eq!(list.state().data().unwrap().data[0].name, "Full crowns");
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }
}
