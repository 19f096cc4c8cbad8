//! Paging and sorting primitives.
//!
//! # Invariants
//! - Page indices are zero-based.
//! - Page size is at least 1.
//! - Sort properties come from a closed set, so ORDER BY clauses are built
//!   from static column names and never from caller text.
//! - Every ORDER BY ends with the primary key to keep windows stable.

use crate::repo::error::RepoResult;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Member columns that may appear in an ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberSortProperty {
    Id,
    Username,
    Age,
}

impl MemberSortProperty {
    fn column(self) -> &'static str {
        match self {
            Self::Id => "member_id",
            Self::Username => "username",
            Self::Age => "age",
        }
    }
}

impl FromStr for MemberSortProperty {
    type Err = SortParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "id" => Ok(Self::Id),
            "username" => Ok(Self::Username),
            "age" => Ok(Self::Age),
            other => Err(SortParseError::UnknownProperty(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortParseError {
    UnknownProperty(String),
    UnknownDirection(String),
}

impl Display for SortParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownProperty(value) => write!(
                f,
                "unknown sort property `{value}`; expected id|username|age"
            ),
            Self::UnknownDirection(value) => {
                write!(f, "unknown sort direction `{value}`; expected asc|desc")
            }
        }
    }
}

impl Error for SortParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub property: MemberSortProperty,
    pub direction: Direction,
}

impl Order {
    pub fn asc(property: MemberSortProperty) -> Self {
        Self {
            property,
            direction: Direction::Asc,
        }
    }

    pub fn desc(property: MemberSortProperty) -> Self {
        Self {
            property,
            direction: Direction::Desc,
        }
    }
}

impl FromStr for Order {
    type Err = SortParseError;

    /// Parses `property` or `property,asc|desc` (direction is case-insensitive).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (property, direction) = match value.split_once(',') {
            Some((property, direction)) => (property, Some(direction)),
            None => (value, None),
        };
        let property = property.parse::<MemberSortProperty>()?;
        let direction = match direction.map(|d| d.trim().to_ascii_lowercase()) {
            None => Direction::Asc,
            Some(d) if d == "asc" => Direction::Asc,
            Some(d) if d == "desc" => Direction::Desc,
            Some(other) => return Err(SortParseError::UnknownDirection(other)),
        };
        Ok(Self {
            property,
            direction,
        })
    }
}

/// Ordered list of sort keys. Empty means "primary key ascending".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by(order: Order) -> Self {
        Self {
            orders: vec![order],
        }
    }

    pub fn and(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }

    /// Renders ` ORDER BY ...` with every column qualified by `alias`.
    pub(crate) fn to_order_by(&self, alias: &str) -> String {
        let mut parts: Vec<String> = self
            .orders
            .iter()
            .map(|order| {
                format!(
                    "{alias}.{} {}",
                    order.property.column(),
                    order.direction.as_sql()
                )
            })
            .collect();
        if !self
            .orders
            .iter()
            .any(|order| order.property == MemberSortProperty::Id)
        {
            parts.push(format!("{alias}.member_id ASC"));
        }
        format!(" ORDER BY {}", parts.join(", "))
    }
}

impl FromIterator<Order> for Sort {
    fn from_iter<I: IntoIterator<Item = Order>>(iter: I) -> Self {
        Self {
            orders: iter.into_iter().collect(),
        }
    }
}

/// Requested result window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
    sort: Sort,
}

impl PageRequest {
    /// Creates an unsorted request. A `size` of 0 is raised to 1.
    pub fn of(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.max(1),
            sort: Sort::unsorted(),
        }
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub(crate) fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

/// Result window that also knows the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
}

impl<T> Page<T> {
    /// Builds a page, running `count` only when the total cannot be derived
    /// from the content itself.
    ///
    /// When the window is not full and not past the end, the total is
    /// `offset + content.len()` and the count query is skipped.
    pub(crate) fn assemble<F>(content: Vec<T>, request: &PageRequest, count: F) -> RepoResult<Self>
    where
        F: FnOnce() -> RepoResult<u64>,
    {
        let len = content.len() as u64;
        let offset = request.offset() as u64;
        let window_open = len < u64::from(request.size);
        let total_elements = if window_open && (len > 0 || offset == 0) {
            offset + len
        } else {
            count()?
        };

        Ok(Self {
            content,
            number: request.page,
            size: request.size,
            total_elements,
        })
    }

    pub fn total_pages(&self) -> u64 {
        self.total_elements.div_ceil(u64::from(self.size.max(1)))
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn is_first(&self) -> bool {
        self.number == 0
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.number) + 1 < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    /// Converts every element, keeping the paging metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

/// Result window that only knows whether another window follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slice<T> {
    pub content: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub has_next: bool,
}

impl<T> Slice<T> {
    /// Builds a slice from a query that fetched `size + 1` rows.
    pub(crate) fn from_overfetch(mut rows: Vec<T>, request: &PageRequest) -> Self {
        let size = request.size as usize;
        let has_next = rows.len() > size;
        rows.truncate(size);
        Self {
            content: rows,
            number: request.page,
            size: request.size,
            has_next,
        }
    }

    pub fn is_first(&self) -> bool {
        self.number == 0
    }

    pub fn is_last(&self) -> bool {
        !self.has_next
    }

    pub fn map<U, F>(self, f: F) -> Slice<U>
    where
        F: FnMut(T) -> U,
    {
        Slice {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            has_next: self.has_next,
        }
    }
}
