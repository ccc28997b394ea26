//! Abstractions for page-number pagination.

/// Pagination arguments as requested by a client.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Arguments {
    /// Requested page number, if it could be parsed.
    requested: Option<i64>,

    /// Number of items on a single page.
    per_page: usize,
}

impl Arguments {
    /// Creates new [`Arguments`] out of the raw `page` parameter.
    ///
    /// A missing or malformed `page` requests the first page. A `per_page` of
    /// zero is treated as one.
    #[must_use]
    pub fn new(page: Option<&str>, per_page: usize) -> Self {
        Self {
            requested: page.and_then(|p| p.trim().parse().ok()),
            per_page: per_page.max(1),
        }
    }

    /// Returns the number of items on a single page.
    #[must_use]
    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Resolves the 1-based page number for a list of `total` items.
    ///
    /// Page numbers outside `1..=num_pages` resolve to the last page.
    #[must_use]
    pub fn number(&self, total: usize) -> usize {
        let last = num_pages(total, self.per_page);
        match self.requested {
            None => 1,
            Some(n) => usize::try_from(n)
                .ok()
                .filter(|n| (1..=last).contains(n))
                .unwrap_or(last),
        }
    }

    /// Returns the number of items to skip for a list of `total` items.
    #[must_use]
    pub fn offset(&self, total: usize) -> usize {
        (self.number(total) - 1) * self.per_page
    }
}

/// Returns the number of pages needed for `total` items.
///
/// There is always at least one (possibly empty) page.
#[must_use]
pub fn num_pages(total: usize, per_page: usize) -> usize {
    total.div_ceil(per_page.max(1)).max(1)
}

/// A page of items.
#[derive(Clone, Debug)]
pub struct Page<T> {
    /// Items on this [`Page`].
    pub items: Vec<T>,

    /// 1-based number of this [`Page`].
    pub number: usize,

    /// Maximum number of items on a [`Page`].
    pub per_page: usize,

    /// Total number of items across all pages.
    pub total: usize,
}

impl<T> Page<T> {
    /// Returns the total number of pages.
    #[must_use]
    pub fn num_pages(&self) -> usize {
        num_pages(self.total, self.per_page)
    }

    /// Indicates whether there is a page after this one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages()
    }

    /// Indicates whether there is a page before this one.
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// Maps the items of this [`Page`].
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            per_page: self.per_page,
            total: self.total,
        }
    }
}

/// Pagination selector.
#[derive(Clone, Debug)]
pub struct Selector<F> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments,

    /// Additional filter being applied to the result.
    pub filter: F,
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($node:ty, $filter:ty) => {
        #[doc = "A [`Page`] of nodes."]
        pub type Page = $crate::pagination::Page<$node>;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$filter>;
    };
}

#[cfg(test)]
mod spec {
    use super::{num_pages, Arguments, Page};

    #[test]
    fn resolves_page_numbers() {
        let args = Arguments::new(Some("2"), 10);
        assert_eq!(args.number(25), 2);
        assert_eq!(args.offset(25), 10);

        assert_eq!(Arguments::new(None, 10).number(25), 1);
        assert_eq!(Arguments::new(Some("abc"), 10).number(25), 1);
        assert_eq!(Arguments::new(Some("99"), 10).number(25), 3);
        assert_eq!(Arguments::new(Some("0"), 10).number(25), 3);
        assert_eq!(Arguments::new(Some("-4"), 10).number(25), 3);
        assert_eq!(Arguments::new(Some("7"), 10).number(0), 1);
    }

    #[test]
    fn counts_pages() {
        assert_eq!(num_pages(0, 10), 1);
        assert_eq!(num_pages(10, 10), 1);
        assert_eq!(num_pages(11, 10), 2);
        assert_eq!(num_pages(5, 0), 5);
    }

    #[test]
    fn reports_neighbours() {
        let page = Page {
            items: vec![1, 2],
            number: 2,
            per_page: 2,
            total: 5,
        };
        assert!(page.has_next());
        assert!(page.has_previous());

        let last = page.map(|n| n * 10);
        assert_eq!(last.items, vec![10, 20]);
        assert_eq!(last.num_pages(), 3);
    }
}
