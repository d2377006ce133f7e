//! Page cursor and page-button window for the table.

use serde::Serialize;

pub const PAGE_SIZE: usize = 10;
pub const MAX_PAGE_BUTTONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    current_page: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self { current_page: 1 }
    }
}

/// Everything the table needs to draw one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub current_page: usize,
    pub total_pages: usize,
    /// Half-open range into the filtered subset.
    pub start: usize,
    pub end: usize,
    pub buttons: Vec<usize>,
    /// `None` when there is a single page or none at all.
    pub controls: Option<PagerControls>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PagerControls {
    pub previous_enabled: bool,
    pub next_enabled: bool,
}

/// `ceil(count / PAGE_SIZE)`; zero for an empty subset.
pub fn total_pages(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE)
}

/// Up to `MAX_PAGE_BUTTONS` consecutive page numbers around `current`,
/// shifted to stay inside `[1, total]`.
pub fn page_window(current: usize, total: usize) -> Vec<usize> {
    if total == 0 {
        return Vec::new();
    }
    let mut start = current.saturating_sub(MAX_PAGE_BUTTONS / 2).max(1);
    let end = (start + MAX_PAGE_BUTTONS - 1).min(total);
    if end + 1 - start < MAX_PAGE_BUTTONS {
        start = (end + 1).saturating_sub(MAX_PAGE_BUTTONS).max(1);
    }
    (start..=end).collect()
}

impl PaginationState {
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Moves to `page` if it exists for `count` filtered records. Returns
    /// whether the cursor moved.
    pub fn go_to(&mut self, page: usize, count: usize) -> bool {
        if page < 1 || page > total_pages(count) || page == self.current_page {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn next(&mut self, count: usize) -> bool {
        self.go_to(self.current_page + 1, count)
    }

    pub fn previous(&mut self, count: usize) -> bool {
        match self.current_page.checked_sub(1) {
            Some(page) => self.go_to(page, count),
            None => false,
        }
    }

    /// Clamps the cursor to the available pages and describes the page.
    pub fn page(&mut self, count: usize) -> Page {
        let total = total_pages(count);
        if self.current_page > total {
            self.current_page = total.max(1);
        }

        let current = self.current_page;
        let start = ((current - 1) * PAGE_SIZE).min(count);
        let end = (current * PAGE_SIZE).min(count);

        Page {
            current_page: current,
            total_pages: total.max(1),
            start,
            end,
            buttons: page_window(current, total),
            controls: (total > 1).then(|| PagerControls {
                previous_enabled: current > 1,
                next_enabled: current < total,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(page: usize) -> PaginationState {
        PaginationState { current_page: page }
    }

    #[test]
    fn total_pages_has_display_minimum_of_one() {
        for n in [0usize, 1, 9, 10, 11, 20, 95, 101] {
            let page = PaginationState::default().page(n);
            assert_eq!(page.total_pages, n.div_ceil(10).max(1), "n = {n}");
        }
    }

    #[test]
    fn pages_reassemble_the_subset_exactly_once() {
        for n in [0usize, 7, 10, 23, 40] {
            let mut seen = Vec::new();
            let total = total_pages(n).max(1);
            for p in 1..=total {
                let page = at(p).page(n);
                assert!(page.end - page.start <= PAGE_SIZE);
                seen.extend(page.start..page.end);
            }
            assert_eq!(seen, (0..n).collect::<Vec<_>>());
        }
    }

    #[test]
    fn cursor_clamps_when_subset_shrinks() {
        let mut state = at(5);
        let page = state.page(15);
        assert_eq!(page.current_page, 2);
        assert_eq!((page.start, page.end), (10, 15));
        assert_eq!(state.current_page(), 2);

        let mut state = at(3);
        let page = state.page(0);
        assert_eq!(page.current_page, 1);
        assert_eq!((page.start, page.end), (0, 0));
    }

    #[test]
    fn window_is_centred_and_shifted_at_edges() {
        assert_eq!(page_window(1, 10), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(2, 10), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(6, 10), vec![4, 5, 6, 7, 8]);
        assert_eq!(page_window(9, 10), vec![6, 7, 8, 9, 10]);
        assert_eq!(page_window(10, 10), vec![6, 7, 8, 9, 10]);
        assert_eq!(page_window(2, 3), vec![1, 2, 3]);
        assert_eq!(page_window(1, 1), vec![1]);
        assert!(page_window(1, 0).is_empty());
    }

    #[test]
    fn window_size_is_min_of_five_and_total() {
        for total in 1..=12 {
            for current in 1..=total {
                assert_eq!(page_window(current, total).len(), total.min(MAX_PAGE_BUTTONS));
            }
        }
    }

    #[test]
    fn controls_absent_for_single_page_and_disabled_at_edges() {
        assert_eq!(at(1).page(10).controls, None);
        assert_eq!(at(1).page(0).controls, None);

        let first = at(1).page(25).controls.unwrap();
        assert!(!first.previous_enabled && first.next_enabled);

        let last = at(3).page(25).controls.unwrap();
        assert!(last.previous_enabled && !last.next_enabled);
    }

    #[test]
    fn out_of_range_navigation_is_a_no_op() {
        let mut state = at(2);
        assert!(!state.go_to(0, 25));
        assert!(!state.go_to(4, 25));
        assert_eq!(state.current_page(), 2);

        assert!(state.go_to(3, 25));
        assert!(!state.next(25));
        assert_eq!(state.current_page(), 3);

        let mut state = at(1);
        assert!(!state.previous(25));
        assert!(!state.go_to(1, 0));
    }
}
