//! Filter and pagination state over the loaded dataset.

use crate::aggregate::{server_counts, ServerCount};
use crate::data::Dataset;
use crate::filter::apply_filters;
use crate::pagination::{Page, PaginationState};
use crate::types::{FilterState, Record};
use std::sync::Arc;
use tracing::debug;

/// Inputs to the controller. One command is applied at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FilterChanged(FilterState),
    PageRequested(usize),
    NextPage,
    PreviousPage,
}

/// Which views a command invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// The filtered subset changed: map, chart and table all redraw.
    Refiltered,
    /// Only the table page moved.
    Repaged,
    Unchanged,
}

pub struct ViewStateController {
    dataset: Arc<Dataset>,
    pagination: PaginationState,
    filtered: Vec<usize>,
}

impl ViewStateController {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let filtered = apply_filters(dataset.records(), &FilterState::default());
        Self {
            dataset,
            pagination: PaginationState::default(),
            filtered,
        }
    }

    pub fn dispatch(&mut self, command: Command) -> Effect {
        let count = self.filtered.len();
        let effect = match command {
            Command::FilterChanged(filter) => {
                self.filtered = apply_filters(self.dataset.records(), &filter);
                self.pagination.reset();
                Effect::Refiltered
            }
            Command::PageRequested(page) => moved(self.pagination.go_to(page, count)),
            Command::NextPage => moved(self.pagination.next(count)),
            Command::PreviousPage => moved(self.pagination.previous(count)),
        };
        debug!(
            ?effect,
            filtered = self.filtered.len(),
            page = self.pagination.current_page(),
            "Applied command"
        );
        effect
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn filtered(&self) -> impl Iterator<Item = &Record> + '_ {
        let records = self.dataset.records();
        self.filtered.iter().map(move |&i| &records[i])
    }

    pub fn contains(&self, index: usize) -> bool {
        self.filtered.binary_search(&index).is_ok()
    }

    /// Current page, clamping the cursor first if the subset shrank.
    pub fn page(&mut self) -> (Page, Vec<&Record>) {
        let page = self.pagination.page(self.filtered.len());
        let records = self.dataset.records();
        let rows = self.filtered[page.start..page.end]
            .iter()
            .map(|&i| &records[i])
            .collect();
        (page, rows)
    }

    pub fn server_counts(&self) -> Vec<ServerCount> {
        server_counts(self.filtered())
    }
}

fn moved(changed: bool) -> Effect {
    if changed {
        Effect::Repaged
    } else {
        Effect::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_records;
    use crate::types::{Category, Selection};

    fn controller(n: usize) -> ViewStateController {
        ViewStateController::new(Arc::new(Dataset::from_records(sample_records(n))))
    }

    #[test]
    fn starts_with_everything_on_page_one() {
        let mut c = controller(23);
        assert_eq!(c.filtered_len(), 23);
        let (page, rows) = c.page();
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 3);
        assert_eq!(rows.len(), 10);
    }

    #[test]
    fn filter_change_resets_to_first_page() {
        let mut c = controller(40);
        assert_eq!(c.dispatch(Command::PageRequested(3)), Effect::Repaged);
        assert_eq!(c.page().0.current_page, 3);

        let effect = c.dispatch(Command::FilterChanged(FilterState {
            https: Selection::Only("Oui".to_string()),
            ..FilterState::default()
        }));
        assert_eq!(effect, Effect::Refiltered);
        assert_eq!(c.filtered_len(), 20);
        assert_eq!(c.page().0.current_page, 1);
    }

    #[test]
    fn out_of_range_page_request_changes_nothing() {
        let mut c = controller(15);
        assert_eq!(c.dispatch(Command::PageRequested(3)), Effect::Unchanged);
        assert_eq!(c.dispatch(Command::PreviousPage), Effect::Unchanged);
        assert_eq!(c.dispatch(Command::NextPage), Effect::Repaged);
        assert_eq!(c.dispatch(Command::NextPage), Effect::Unchanged);

        let (page, rows) = c.page();
        assert_eq!(page.current_page, 2);
        assert_eq!(rows.len(), 5);
    }

    #[test]
    fn filtered_view_preserves_dataset_order() {
        let mut c = controller(30);
        c.dispatch(Command::FilterChanged(FilterState {
            category: Selection::Only(Category::PartiallyUpToDate),
            ..FilterState::default()
        }));
        let codes: Vec<&str> = c.filtered().map(|r| r.code_insee.as_str()).collect();
        let mut sorted = codes.clone();
        sorted.sort();
        assert_eq!(codes, sorted);
        assert!(c.filtered().all(|r| r.category == Category::PartiallyUpToDate));
    }

    #[test]
    fn chart_counts_follow_the_filter() {
        let mut c = controller(30);
        c.dispatch(Command::FilterChanged(FilterState {
            server: Selection::Only("IIS".to_string()),
            ..FilterState::default()
        }));
        assert_eq!(
            c.server_counts(),
            vec![ServerCount { server: "IIS".to_string(), count: 10 }]
        );

        c.dispatch(Command::FilterChanged(FilterState {
            server: Selection::Only("Lighttpd".to_string()),
            ..FilterState::default()
        }));
        assert!(c.server_counts().is_empty());
        assert_eq!(c.page().0.total_pages, 1);
    }
}
