//! Offset pagination shared by the roster and log queries

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One page of a filtered collection.
///
/// `total` is the post-filter, pre-pagination count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// Cắt một trang từ danh sách đã lọc: offset = (page - 1) * page_size.
///
/// `page` nhỏ hơn 1 được coi là 1, `page_size` = 0 dùng giá trị mặc định.
pub fn paginate<T>(filtered: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let page_size = if page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size
    };
    let total = filtered.len();
    let items = filtered
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .collect();

    Page { items, total }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_offsets() {
        let items: Vec<u32> = (1..=25).collect();

        let first = paginate(items.clone(), 1, 10);
        assert_eq!(first.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(first.total, 25);

        let last = paginate(items.clone(), 3, 10);
        assert_eq!(last.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(last.total, 25);

        let beyond = paginate(items, 9, 10);
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 25);
    }

    #[test]
    fn test_paginate_normalizes_inputs() {
        let items: Vec<u32> = (1..=3).collect();
        let page = paginate(items, 0, 0);
        assert_eq!(page.items, vec![1, 2, 3]);
    }
}
