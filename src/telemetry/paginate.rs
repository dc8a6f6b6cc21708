/// Items listed while the list is collapsed.
pub const DEFAULT_PAGE_SIZE: usize = 3;

/// The listed projection of `filtered`: the first `page_size` items, or all
/// of them when `show_all` is set.
#[must_use]
pub fn visible<T>(filtered: &[T], show_all: bool, page_size: usize) -> &[T] {
    if show_all {
        filtered
    } else {
        &filtered[..filtered.len().min(page_size)]
    }
}

/// Whether a collapsed list hides anything.
#[must_use]
pub fn has_more(total: usize, show_all: bool, page_size: usize) -> bool {
    !show_all && total > page_size
}
