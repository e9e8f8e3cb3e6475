//! Pagination state for one author's crawl
//!
//! Page indices start at 1 and advance by one per page, so persisted pages
//! always form a gap-free prefix. The result offset advances by the page size.

use std::fmt;

/// Why a crawl loop stopped on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// A page came back with no entries
    EmptyPage,

    /// The advanced offset reached the total declared on page 1
    TotalReached,
}

impl Termination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyPage => "empty_page",
            Self::TotalReached => "total_reached",
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cursor over an author's paginated results
#[derive(Debug, Clone)]
pub struct Pagination {
    page_size: u32,
    offset: u64,
    page_index: u32,
    declared_total: Option<u64>,
}

impl Pagination {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            offset: 0,
            page_index: 0,
            declared_total: None,
        }
    }

    /// Moves to the next page and returns its 1-based index
    pub fn begin_page(&mut self) -> u32 {
        self.page_index += 1;
        self.page_index
    }

    /// Index of the current page (0 before the first page)
    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    /// Result offset of the current page
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Records the declared total
    ///
    /// Only page 1 sets the total, and only when it is non-zero; later pages
    /// may report a drifted value that is ignored.
    pub fn record_total(&mut self, total: u64) {
        if self.page_index == 1 && total > 0 && self.declared_total.is_none() {
            self.declared_total = Some(total);
        }
    }

    /// Declared total, or 0 while unknown
    pub fn declared_total(&self) -> u64 {
        self.declared_total.unwrap_or(0)
    }

    /// Closes the current page and decides whether the loop continues
    ///
    /// # Returns
    ///
    /// * `Some(Termination)` - The loop must stop
    /// * `None` - Fetch the next page
    pub fn finish_page(&mut self, entry_count: usize) -> Option<Termination> {
        if entry_count == 0 {
            return Some(Termination::EmptyPage);
        }

        self.offset += u64::from(self.page_size);
        match self.declared_total {
            Some(total) if self.offset >= total => Some(Termination::TotalReached),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drives a cursor with full pages until it stops, returning the offsets visited
    fn visited_offsets(page_size: u32, total: u64) -> Vec<u64> {
        let mut cursor = Pagination::new(page_size);
        let mut offsets = Vec::new();
        loop {
            cursor.begin_page();
            cursor.record_total(total);
            offsets.push(cursor.offset());
            if cursor.finish_page(page_size as usize).is_some() {
                return offsets;
            }
        }
    }

    #[test]
    fn test_three_pages_for_120_results_of_50() {
        assert_eq!(visited_offsets(50, 120), vec![0, 50, 100]);
    }

    #[test]
    fn test_page_count_is_ceiling_of_total_over_size() {
        for (size, total) in [(50u32, 1u64), (50, 50), (50, 51), (10, 99), (10, 100), (7, 1000)] {
            let expected = total.div_ceil(u64::from(size)) as usize;
            assert_eq!(
                visited_offsets(size, total).len(),
                expected,
                "size={} total={}",
                size,
                total
            );
        }
    }

    #[test]
    fn test_empty_page_stops_without_advancing() {
        let mut cursor = Pagination::new(50);
        cursor.begin_page();
        assert_eq!(cursor.finish_page(0), Some(Termination::EmptyPage));
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn test_unknown_total_continues_until_empty_page() {
        let mut cursor = Pagination::new(50);
        for _ in 0..5 {
            cursor.begin_page();
            cursor.record_total(0);
            assert_eq!(cursor.finish_page(50), None);
        }
        cursor.begin_page();
        assert_eq!(cursor.finish_page(0), Some(Termination::EmptyPage));
        assert_eq!(cursor.page_index(), 6);
    }

    #[test]
    fn test_only_first_page_sets_total() {
        let mut cursor = Pagination::new(50);
        cursor.begin_page();
        cursor.record_total(120);
        cursor.finish_page(50);

        cursor.begin_page();
        cursor.record_total(5000);
        assert_eq!(cursor.declared_total(), 120);
    }

    #[test]
    fn test_termination_display() {
        assert_eq!(Termination::EmptyPage.to_string(), "empty_page");
        assert_eq!(Termination::TotalReached.to_string(), "total_reached");
    }
}
