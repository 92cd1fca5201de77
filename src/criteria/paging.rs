//! Paging and sorting specifications

use std::fmt;

use crate::planner::{PlannerError, PlannerResult};
use crate::schema::Attribute;

/// First page index. Pages are numbered from zero.
pub const DEFAULT_PAGE_NUM: i32 = 0;

/// Largest page a query may request.
pub const MAX_PAGE_SIZE: i32 = 512;

/// Which slice of the sorted result to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpecification {
    pub page_number: i32,
    pub page_size: i32,
}

impl PageSpecification {
    pub fn new(page_number: i32, page_size: i32) -> Self {
        Self {
            page_number,
            page_size,
        }
    }

    /// Checks the specification against a page size ceiling.
    ///
    /// Oversized pages are rejected, never clamped.
    pub fn validate(&self, max_page_size: i32) -> PlannerResult<()> {
        if self.page_number < 0 {
            return Err(PlannerError::paging_invalid(format!(
                "page number {} is negative",
                self.page_number
            )));
        }
        if self.page_size < 1 || self.page_size > max_page_size {
            return Err(PlannerError::paging_invalid(format!(
                "page size {} is outside 1..={}",
                self.page_size, max_page_size
            )));
        }
        Ok(())
    }

    /// Index of the first row on this page.
    pub fn offset(&self) -> usize {
        self.page_number.max(0) as usize * self.page_size.max(0) as usize
    }
}

impl Default for PageSpecification {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_NUM, MAX_PAGE_SIZE)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortColumn {
    pub attribute: Attribute,
    pub direction: Direction,
}

impl SortColumn {
    pub fn new(attribute: impl Into<Attribute>, direction: Direction) -> Self {
        Self {
            attribute: attribute.into(),
            direction,
        }
    }

    pub fn asc(attribute: impl Into<Attribute>) -> Self {
        Self::new(attribute, Direction::Asc)
    }

    pub fn desc(attribute: impl Into<Attribute>) -> Self {
        Self::new(attribute, Direction::Desc)
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.attribute, self.direction.as_str())
    }
}

/// Multi-key sort applied in insertion order.
///
/// An attribute appears at most once; the first column added for it wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sort {
    columns: Vec<SortColumn>,
}

impl Sort {
    pub fn new(columns: impl IntoIterator<Item = SortColumn>) -> Self {
        columns.into_iter().fold(Self::default(), Sort::then)
    }

    pub fn by(column: SortColumn) -> Self {
        Self::default().then(column)
    }

    pub fn then(mut self, column: SortColumn) -> Self {
        if !self.columns.iter().any(|c| c.attribute == column.attribute) {
            self.columns.push(column);
        }
        self
    }

    pub fn columns(&self) -> &[SortColumn] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::PlannerErrorCode;
    use crate::schema::StandardAttribute;

    #[test]
    fn test_default_page_is_first_and_max() {
        let page = PageSpecification::default();
        assert_eq!(page.page_number, 0);
        assert_eq!(page.page_size, MAX_PAGE_SIZE);
        assert!(page.validate(MAX_PAGE_SIZE).is_ok());
    }

    #[test]
    fn test_oversized_page_rejected() {
        let err = PageSpecification::new(0, MAX_PAGE_SIZE + 1)
            .validate(MAX_PAGE_SIZE)
            .unwrap_err();
        assert_eq!(err.code(), PlannerErrorCode::VaultPagingInvalid);
    }

    #[test]
    fn test_negative_page_rejected() {
        let err = PageSpecification::new(-1, 10)
            .validate(MAX_PAGE_SIZE)
            .unwrap_err();
        assert_eq!(err.code(), PlannerErrorCode::VaultPagingInvalid);
        assert!(PageSpecification::new(0, 0).validate(MAX_PAGE_SIZE).is_err());
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageSpecification::new(2, 10).offset(), 20);
        assert_eq!(PageSpecification::new(0, 10).offset(), 0);
    }

    #[test]
    fn test_sort_keeps_insertion_order_and_dedupes() {
        let sort = Sort::new([
            SortColumn::desc(StandardAttribute::LinearUuid),
            SortColumn::asc(StandardAttribute::RecordedTime),
            SortColumn::asc(StandardAttribute::LinearUuid),
        ]);
        assert_eq!(sort.columns().len(), 2);
        assert_eq!(sort.columns()[0].direction, Direction::Desc);
        assert_eq!(
            sort.columns()[1].attribute,
            Attribute::standard(StandardAttribute::RecordedTime)
        );
    }
}
