//! Request and response shapes of the HTTP surface.

use crate::config::PagingConfig;
use crate::error::ApiError;
use roster_core::{Order, Page, PageRequest, Sort};
use serde::{Deserialize, Serialize};

/// Query string of `GET /members`. `sort` may repeat.
#[derive(Debug, Default, Deserialize)]
pub struct MemberPageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    #[serde(default)]
    pub sort: Vec<String>,
}

impl MemberPageQuery {
    /// Resolves missing parameters from `paging` and clamps the size.
    pub fn into_page_request(self, paging: &PagingConfig) -> Result<PageRequest, ApiError> {
        let page = self.page.unwrap_or(paging.default_page);
        let size = match self.size {
            Some(0) => return Err(ApiError::BadRequest("size must be at least 1".to_string())),
            Some(size) => size.min(paging.max_size),
            None => paging.default_size,
        };

        let sort = if self.sort.is_empty() {
            Sort::by(paging.default_sort.parse::<Order>()?)
        } else {
            self.sort
                .iter()
                .map(|value| value.parse::<Order>())
                .collect::<Result<Sort, _>>()?
        };

        Ok(PageRequest::of(page, size).with_sort(sort))
    }
}

/// Serialized page with its window metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub number_of_elements: usize,
    pub total_elements: u64,
    pub total_pages: u64,
    pub first: bool,
    pub last: bool,
    pub has_next: bool,
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            number: page.number,
            size: page.size,
            number_of_elements: page.number_of_elements(),
            total_elements: page.total_elements,
            total_pages: page.total_pages(),
            first: page.is_first(),
            last: page.is_last(),
            has_next: page.has_next(),
            content: page.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MemberPageQuery;
    use crate::config::Settings;
    use crate::error::ApiError;
    use roster_core::{MemberSortProperty, Order};

    #[test]
    fn empty_query_uses_configured_defaults() {
        let paging = Settings::default().paging;
        let request = MemberPageQuery::default()
            .into_page_request(&paging)
            .unwrap();

        assert_eq!(request.page(), 1);
        assert_eq!(request.size(), 5);
        assert_eq!(
            request.sort().orders(),
            &[Order::desc(MemberSortProperty::Username)]
        );
    }

    #[test]
    fn oversized_page_is_clamped() {
        let paging = Settings::default().paging;
        let query = MemberPageQuery {
            page: Some(0),
            size: Some(5000),
            sort: vec!["age,asc".to_string(), "id,desc".to_string()],
        };
        let request = query.into_page_request(&paging).unwrap();

        assert_eq!(request.size(), 2000);
        assert_eq!(request.sort().orders().len(), 2);
    }

    #[test]
    fn unknown_sort_property_is_rejected() {
        let paging = Settings::default().paging;
        let query = MemberPageQuery {
            sort: vec!["email,asc".to_string()],
            ..MemberPageQuery::default()
        };
        let err = query.into_page_request(&paging).unwrap_err();
        assert!(matches!(err, ApiError::InvalidSort(_)));
    }
}
