//! Page-number window for the pagination control.

/// Server page size; informational, the server decides the split
pub const PAGE_SIZE: u32 = 100;

/// Pages shown on each side of the current page
pub const NEIGHBOR_WINDOW: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub current_page: u32,
    pub total_pages: u32,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
        }
    }
}

impl PageState {
    pub fn new(current_page: u32, total_pages: u32) -> Self {
        let total_pages = total_pages.max(1);
        Self {
            current_page: current_page.clamp(1, total_pages),
            total_pages,
        }
    }

    pub fn first() -> Self {
        Self::default()
    }

    /// Clamp a requested page into `[1, total_pages]`
    pub fn clamp_page(&self, page: u32) -> u32 {
        page.clamp(1, self.total_pages.max(1))
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self {
            current_page: self.clamp_page(page),
            total_pages: self.total_pages,
        }
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn window(&self) -> Vec<PageItem> {
        page_window(self.current_page, self.total_pages)
    }
}

/// First and last page always, `current ± NEIGHBOR_WINDOW` in between,
/// and an ellipsis wherever page numbers are skipped.
pub fn page_window(current_page: u32, total_pages: u32) -> Vec<PageItem> {
    let total = total_pages.max(1);
    let current = current_page.clamp(1, total);

    let mut items = vec![PageItem::Page(1)];
    if total == 1 {
        return items;
    }

    let start = current.saturating_sub(NEIGHBOR_WINDOW).max(2);
    let end = (current + NEIGHBOR_WINDOW).min(total - 1);

    if start > 2 {
        items.push(PageItem::Ellipsis);
    }
    for page in start..=end {
        items.push(PageItem::Page(page));
    }
    if end < total - 1 {
        items.push(PageItem::Ellipsis);
    }

    items.push(PageItem::Page(total));
    items
}
