use serde::Serialize;

/// Window of one page over an ordered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total_pages: usize,
    /// Zero-based, inclusive.
    pub start_index: usize,
    /// Zero-based, exclusive.
    pub end_index: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PageInfo {
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }
}

/// Describe page `current_page` (1-based) of `total_items` items.
///
/// Indices are clamped to `0..=total_items`, but an out-of-range page is not
/// corrected: page 9 of 3 yields an empty window. A page size of zero
/// describes no pages at all.
pub fn calculate_pagination(total_items: usize, items_per_page: usize, current_page: usize) -> PageInfo {
    if items_per_page == 0 {
        return PageInfo {
            total_pages: 0,
            start_index: 0,
            end_index: 0,
            has_next_page: false,
            has_prev_page: false,
        };
    }

    let total_pages = total_items.div_ceil(items_per_page);
    let start_index = current_page
        .saturating_sub(1)
        .saturating_mul(items_per_page)
        .min(total_items);
    let end_index = start_index.saturating_add(items_per_page).min(total_items);

    PageInfo {
        total_pages,
        start_index,
        end_index,
        has_next_page: current_page < total_pages,
        has_prev_page: total_pages > 0 && current_page > 1,
    }
}

/// The items covered by `info`.
pub fn page_slice<'a, T>(items: &'a [T], info: &PageInfo) -> &'a [T] {
    let end = info.end_index.min(items.len());
    let start = info.start_index.min(end);
    &items[start..end]
}

/// One entry of a page-number strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page(usize),
    Gap,
}

const MAX_VISIBLE_PAGES: usize = 5;

/// Compact page-number strip around `current_page`, with [`PageLink::Gap`]
/// standing in for skipped runs.
pub fn page_links(current_page: usize, total_pages: usize) -> Vec<PageLink> {
    use PageLink::{Gap, Page};

    if total_pages <= MAX_VISIBLE_PAGES {
        return (1..=total_pages).map(Page).collect();
    }

    if current_page <= 3 {
        let mut links: Vec<PageLink> = (1..=4).map(Page).collect();
        links.extend([Gap, Page(total_pages)]);
        links
    } else if current_page >= total_pages - 2 {
        let mut links = vec![Page(1), Gap];
        links.extend((total_pages - 3..=total_pages).map(Page));
        links
    } else {
        let mut links = vec![Page(1), Gap];
        links.extend((current_page - 1..=current_page + 1).map(Page));
        links.extend([Gap, Page(total_pages)]);
        links
    }
}
