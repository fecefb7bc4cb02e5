//! Paging and sorting shared by every list operation.
//!
//! A sort is written `"<field> [asc|desc]"`; the field is resolved by the
//! caller against its own set of sortable columns, so unknown names never
//! reach a query.

use sea_orm::Order;

use crate::{EngineError, ResultEngine};

/// Page selection as requested by a caller.
///
/// Paging only applies when both `page` and `limit` are greater than zero;
/// otherwise the whole result set is returned.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pagination {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub sort: Option<String>,
}

impl Pagination {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// `(offset, limit)` when paging applies.
    #[must_use]
    pub fn window(&self) -> Option<(u64, u64)> {
        match (self.page, self.limit) {
            (Some(page), Some(limit)) if page > 0 && limit > 0 => {
                Some(((page - 1).saturating_mul(limit), limit))
            }
            _ => None,
        }
    }

    pub fn sort_key(&self) -> ResultEngine<Option<SortKey>> {
        self.sort.as_deref().map_or(Ok(None), SortKey::parse)
    }

    /// Applies the window to an already ordered, in-memory result set.
    #[must_use]
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        match self.window() {
            Some((offset, limit)) => {
                let offset = usize::try_from(offset).unwrap_or(usize::MAX);
                let limit = usize::try_from(limit).unwrap_or(usize::MAX);
                items.into_iter().skip(offset).take(limit).collect()
            }
            None => items,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl From<SortDirection> for Order {
    fn from(value: SortDirection) -> Self {
        match value {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    /// Parses `"<field> [asc|desc]"`. Blank input means "no sort requested".
    pub fn parse(input: &str) -> ResultEngine<Option<Self>> {
        let mut parts = input.split_whitespace();
        let Some(field) = parts.next() else {
            return Ok(None);
        };

        let direction = match parts.next() {
            None => SortDirection::Asc,
            Some(dir) if dir.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            Some(dir) if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            Some(dir) => {
                return Err(EngineError::InvalidSort(format!(
                    "unknown sort direction '{dir}'"
                )));
            }
        };

        if parts.next().is_some() {
            return Err(EngineError::InvalidSort(format!(
                "expected '<field> [asc|desc]', got '{input}'"
            )));
        }

        Ok(Some(Self {
            field: field.to_ascii_lowercase(),
            direction,
        }))
    }
}

/// Metadata returned with every list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub page: u64,
    pub total_pages: u64,
    pub total_rows: u64,
    pub current_rows_count: u64,
}

/// One page of results plus its metadata.
#[derive(Clone, Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, total_rows: u64, pagination: &Pagination) -> Self {
        let current_rows_count = items.len() as u64;
        let info = match pagination.window() {
            Some((_, limit)) => PageInfo {
                page: pagination.page.unwrap_or(1),
                total_pages: total_rows.div_ceil(limit),
                total_rows,
                current_rows_count,
            },
            None => PageInfo {
                page: 1,
                total_pages: u64::from(total_rows > 0),
                total_rows,
                current_rows_count,
            },
        };
        Self { items, info }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_requires_page_and_limit() {
        assert_eq!(Pagination::new().window(), None);
        assert_eq!(Pagination::new().page(2).window(), None);
        assert_eq!(Pagination::new().page(0).limit(10).window(), None);
        assert_eq!(Pagination::new().page(3).limit(10).window(), Some((20, 10)));
    }

    #[test]
    fn sort_parsing() {
        assert_eq!(SortKey::parse("  ").unwrap(), None);
        assert_eq!(
            SortKey::parse("date").unwrap(),
            Some(SortKey {
                field: "date".to_string(),
                direction: SortDirection::Asc
            })
        );
        assert_eq!(
            SortKey::parse("Value DESC").unwrap(),
            Some(SortKey {
                field: "value".to_string(),
                direction: SortDirection::Desc
            })
        );
        assert!(matches!(
            SortKey::parse("date sideways"),
            Err(EngineError::InvalidSort(_))
        ));
        assert!(matches!(
            SortKey::parse("date desc extra"),
            Err(EngineError::InvalidSort(_))
        ));
    }

    #[test]
    fn slice_and_page_info() {
        let pagination = Pagination::new().page(2).limit(2);
        let items = pagination.slice(vec![1, 2, 3, 4, 5]);
        assert_eq!(items, vec![3, 4]);

        let page = Page::new(items, 5, &pagination);
        assert_eq!(
            page.info,
            PageInfo {
                page: 2,
                total_pages: 3,
                total_rows: 5,
                current_rows_count: 2
            }
        );
    }

    #[test]
    fn unpaged_info_is_single_page() {
        let page = Page::new(vec!['a', 'b'], 2, &Pagination::new());
        assert_eq!(page.info.page, 1);
        assert_eq!(page.info.total_pages, 1);

        let empty: Page<char> = Page::new(Vec::new(), 0, &Pagination::new());
        assert_eq!(empty.info.total_pages, 0);
    }
}
