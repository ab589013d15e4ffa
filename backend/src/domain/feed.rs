//! Feed filtering, ordering and pagination rules.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Blog, Category, UserId};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 50;
pub const SEARCH_MAX: usize = 100;

/// Errors raised while building a [`FeedQuery`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedQueryError {
    #[error("page must be at least 1")]
    InvalidPage,
    #[error("limit must be between 1 and {max}")]
    InvalidLimit { max: u32 },
    #[error("sort must be one of: latest, oldest, popular")]
    UnknownSort,
    #[error("search must be at most {max} characters")]
    SearchTooLong { max: usize },
}

impl FeedQueryError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidPage => "page",
            Self::InvalidLimit { .. } => "limit",
            Self::UnknownSort => "sort",
            Self::SearchTooLong { .. } => "search",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPage => "invalid_page",
            Self::InvalidLimit { .. } => "invalid_limit",
            Self::UnknownSort => "invalid_sort",
            Self::SearchTooLong { .. } => "search_too_long",
        }
    }
}

/// Feed ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FeedSort {
    /// Newest first.
    #[default]
    Latest,
    Oldest,
    /// Most liked first, ties broken by recency.
    Popular,
}

impl FeedSort {
    /// Order two blogs according to this sort.
    pub fn compare(self, a: &Blog, b: &Blog) -> Ordering {
        match self {
            Self::Latest => b.created_at.cmp(&a.created_at),
            Self::Oldest => a.created_at.cmp(&b.created_at),
            Self::Popular => b
                .like_count
                .cmp(&a.like_count)
                .then_with(|| b.created_at.cmp(&a.created_at)),
        }
    }
}

impl FromStr for FeedSort {
    type Err = FeedQueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" => Ok(Self::Latest),
            "oldest" => Ok(Self::Oldest),
            "popular" => Ok(Self::Popular),
            _ => Err(FeedQueryError::UnknownSort),
        }
    }
}

/// Validated feed request.
///
/// ## Invariants
/// - `page >= 1`
/// - `1 <= limit <= MAX_PAGE_SIZE`
/// - `search`, when present, is trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    category: Option<Category>,
    author: Option<UserId>,
    search: Option<String>,
    sort: FeedSort,
    page: u32,
    limit: u32,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            category: None,
            author: None,
            search: None,
            sort: FeedSort::default(),
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FeedQuery {
    /// Build a query, applying defaults for missing paging values.
    pub fn try_new(
        category: Option<Category>,
        author: Option<UserId>,
        search: Option<&str>,
        sort: FeedSort,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Self, FeedQueryError> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(FeedQueryError::InvalidPage);
        }
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(FeedQueryError::InvalidLimit { max: MAX_PAGE_SIZE });
        }
        let search = search
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_owned);
        if search
            .as_ref()
            .is_some_and(|term| term.chars().count() > SEARCH_MAX)
        {
            return Err(FeedQueryError::SearchTooLong { max: SEARCH_MAX });
        }
        Ok(Self {
            category,
            author,
            search,
            sort,
            page,
            limit,
        })
    }

    pub fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    pub fn author(&self) -> Option<&UserId> {
        self.author.as_ref()
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn sort(&self) -> FeedSort {
        self.sort
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Whether `blog` passes the category, author and search filters.
    pub fn matches(&self, blog: &Blog) -> bool {
        let category_ok = self
            .category
            .as_ref()
            .is_none_or(|category| category.matches(&blog.category));
        let author_ok = self.author.is_none_or(|author| author == blog.author);
        let search_ok = self.search.as_ref().is_none_or(|term| {
            blog.title
                .as_ref()
                .to_lowercase()
                .contains(&term.to_lowercase())
        });
        category_ok && author_ok && search_ok
    }
}

/// One page of feed results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> FeedPage<T> {
    pub fn new(items: Vec<T>, query: &FeedQuery, total: u64) -> Self {
        let limit = u64::from(query.limit());
        Self {
            items,
            page: query.page(),
            limit: query.limit(),
            total,
            total_pages: total.div_ceil(limit),
        }
    }

    /// Transform items while keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> FeedPage<U> {
        FeedPage {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BlogBody, BlogId, BlogTitle, ImageRef};
    use chrono::{Duration, TimeZone, Utc};
    use rstest::{fixture, rstest};

    fn blog(title: &str, category: &str, likes: u64, age_days: i64) -> Blog {
        let created = Utc
            .with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("timestamp")
            - Duration::days(age_days);
        Blog {
            id: BlogId::random(),
            title: BlogTitle::new(title).expect("title"),
            category: Category::new(category).expect("category"),
            body: BlogBody::new("<p>body</p>").expect("body"),
            author: UserId::random(),
            image: ImageRef::new("id", "https://img.example/id.png"),
            like_count: likes,
            created_at: created,
            updated_at: created,
        }
    }

    #[fixture]
    fn blogs() -> Vec<Blog> {
        vec![
            blog("Old but loved", "Travel", 9, 30),
            blog("Fresh take", "travel", 1, 1),
            blog("Middling", "Food", 9, 10),
        ]
    }

    #[rstest]
    #[case(Some(0), None, FeedQueryError::InvalidPage)]
    #[case(None, Some(0), FeedQueryError::InvalidLimit { max: MAX_PAGE_SIZE })]
    #[case(None, Some(51), FeedQueryError::InvalidLimit { max: MAX_PAGE_SIZE })]
    fn rejects_bad_paging(
        #[case] page: Option<u32>,
        #[case] limit: Option<u32>,
        #[case] expected: FeedQueryError,
    ) {
        let err = FeedQuery::try_new(None, None, None, FeedSort::Latest, page, limit)
            .expect_err("invalid paging");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn defaults_and_offset() {
        let query = FeedQuery::try_new(None, None, Some("   "), FeedSort::Latest, Some(3), None)
            .expect("valid query");
        assert_eq!(query.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(query.offset(), 20);
        assert_eq!(query.search(), None);
    }

    #[rstest]
    fn category_filter_ignores_case(blogs: Vec<Blog>) {
        let query = FeedQuery::try_new(
            Some(Category::new("TRAVEL").expect("category")),
            None,
            None,
            FeedSort::Latest,
            None,
            None,
        )
        .expect("query");
        let hits = blogs.iter().filter(|b| query.matches(b)).count();
        assert_eq!(hits, 2);
    }

    #[rstest]
    fn search_matches_title_substring(blogs: Vec<Blog>) {
        let query = FeedQuery::try_new(None, None, Some("TAKE"), FeedSort::Latest, None, None)
            .expect("query");
        let hits: Vec<_> = blogs.iter().filter(|b| query.matches(b)).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title.as_ref(), "Fresh take");
    }

    #[rstest]
    #[case(FeedSort::Latest, ["Fresh take", "Middling", "Old but loved"])]
    #[case(FeedSort::Oldest, ["Old but loved", "Middling", "Fresh take"])]
    #[case(FeedSort::Popular, ["Middling", "Old but loved", "Fresh take"])]
    fn sorts_order_blogs(
        mut blogs: Vec<Blog>,
        #[case] sort: FeedSort,
        #[case] expected: [&str; 3],
    ) {
        blogs.sort_by(|a, b| sort.compare(a, b));
        let titles: Vec<_> = blogs.iter().map(|b| b.title.as_ref()).collect();
        assert_eq!(titles, expected);
    }

    #[rstest]
    fn page_counts_round_up() {
        let query = FeedQuery::try_new(None, None, None, FeedSort::Latest, Some(2), Some(4))
            .expect("query");
        let page = FeedPage::new(vec![1, 2, 3, 4], &query, 9).map(|n| n * 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items, vec![10, 20, 30, 40]);
        assert_eq!(page.page, 2);
    }

    #[rstest]
    #[case("Popular", FeedSort::Popular)]
    #[case(" oldest", FeedSort::Oldest)]
    fn sort_parses_case_insensitively(#[case] raw: &str, #[case] expected: FeedSort) {
        assert_eq!(raw.parse::<FeedSort>(), Ok(expected));
        assert!("random".parse::<FeedSort>().is_err());
    }
}
