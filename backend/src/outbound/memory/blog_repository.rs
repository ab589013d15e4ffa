//! In-memory `BlogRepository`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{BlogRepository, BlogRepositoryError};
use crate::domain::{
    Blog, BlogId, CategoryCount, FeedPage, FeedQuery, FeedSort, LikeOutcome, UserId,
};

#[derive(Debug, Default)]
struct BlogState {
    blogs: HashMap<BlogId, Blog>,
    likes: HashSet<(BlogId, UserId)>,
    /// Bookmarks in the order they were made.
    saves: Vec<(UserId, BlogId)>,
}

/// Blog store keeping posts, likes and bookmarks in one locked state.
#[derive(Debug, Default)]
pub struct InMemoryBlogRepository {
    state: Mutex<BlogState>,
}

impl InMemoryBlogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BlogState>, BlogRepositoryError> {
        self.state
            .lock()
            .map_err(|_| BlogRepositoryError::query("blog store lock poisoned"))
    }
}

fn feed_order(sort: FeedSort, a: &Blog, b: &Blog) -> std::cmp::Ordering {
    let by_id = match sort {
        FeedSort::Oldest => a.id.as_uuid().cmp(b.id.as_uuid()),
        FeedSort::Latest | FeedSort::Popular => b.id.as_uuid().cmp(a.id.as_uuid()),
    };
    sort.compare(a, b).then(by_id)
}

#[async_trait]
impl BlogRepository for InMemoryBlogRepository {
    async fn insert(&self, blog: &Blog) -> Result<(), BlogRepositoryError> {
        let mut state = self.lock()?;
        if state.blogs.contains_key(&blog.id) {
            return Err(BlogRepositoryError::query("blog id already exists"));
        }
        state.blogs.insert(blog.id, blog.clone());
        Ok(())
    }

    async fn update(&self, blog: &Blog) -> Result<(), BlogRepositoryError> {
        let mut state = self.lock()?;
        let stored = state
            .blogs
            .get_mut(&blog.id)
            .ok_or_else(|| BlogRepositoryError::query("blog not found for update"))?;
        stored.title = blog.title.clone();
        stored.category = blog.category.clone();
        stored.body = blog.body.clone();
        stored.image = blog.image.clone();
        stored.updated_at = blog.updated_at;
        Ok(())
    }

    async fn delete(&self, id: &BlogId) -> Result<bool, BlogRepositoryError> {
        let mut state = self.lock()?;
        if state.blogs.remove(id).is_none() {
            return Ok(false);
        }
        state.likes.retain(|(blog, _)| blog != id);
        state.saves.retain(|(_, blog)| blog != id);
        Ok(true)
    }

    async fn find_by_id(&self, id: &BlogId) -> Result<Option<Blog>, BlogRepositoryError> {
        Ok(self.lock()?.blogs.get(id).cloned())
    }

    async fn feed(&self, query: &FeedQuery) -> Result<FeedPage<Blog>, BlogRepositoryError> {
        let state = self.lock()?;
        let mut matching: Vec<&Blog> = state
            .blogs
            .values()
            .filter(|blog| query.matches(blog))
            .collect();
        matching.sort_by(|a, b| feed_order(query.sort(), a, b));
        let total = matching.len() as u64;
        let skip = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(skip)
            .take(query.limit() as usize)
            .cloned()
            .collect();
        Ok(FeedPage::new(items, query, total))
    }

    async fn toggle_like(
        &self,
        blog: &BlogId,
        user: &UserId,
    ) -> Result<LikeOutcome, BlogRepositoryError> {
        let mut state = self.lock()?;
        let key = (*blog, *user);
        let liked = if state.likes.remove(&key) {
            false
        } else {
            state.likes.insert(key);
            true
        };
        let stored = state
            .blogs
            .get_mut(blog)
            .ok_or_else(|| BlogRepositoryError::query("blog not found for like"))?;
        stored.like_count = if liked {
            stored.like_count + 1
        } else {
            stored.like_count.saturating_sub(1)
        };
        Ok(LikeOutcome {
            liked,
            likes: stored.like_count,
        })
    }

    async fn is_liked(&self, blog: &BlogId, user: &UserId) -> Result<bool, BlogRepositoryError> {
        Ok(self.lock()?.likes.contains(&(*blog, *user)))
    }

    async fn toggle_save(&self, user: &UserId, blog: &BlogId) -> Result<bool, BlogRepositoryError> {
        let mut state = self.lock()?;
        let key = (*user, *blog);
        let before = state.saves.len();
        state.saves.retain(|entry| *entry != key);
        if state.saves.len() < before {
            return Ok(false);
        }
        state.saves.push(key);
        Ok(true)
    }

    async fn is_saved(&self, user: &UserId, blog: &BlogId) -> Result<bool, BlogRepositoryError> {
        Ok(self.lock()?.saves.contains(&(*user, *blog)))
    }

    async fn saved_by(&self, user: &UserId) -> Result<Vec<Blog>, BlogRepositoryError> {
        let state = self.lock()?;
        Ok(state
            .saves
            .iter()
            .rev()
            .filter(|(saver, _)| saver == user)
            .filter_map(|(_, blog)| state.blogs.get(blog).cloned())
            .collect())
    }

    async fn authored_by(&self, user: &UserId) -> Result<Vec<Blog>, BlogRepositoryError> {
        let state = self.lock()?;
        let mut blogs: Vec<Blog> = state
            .blogs
            .values()
            .filter(|blog| &blog.author == user)
            .cloned()
            .collect();
        blogs.sort_by(|a, b| feed_order(FeedSort::Latest, a, b));
        Ok(blogs)
    }

    async fn categories(&self) -> Result<Vec<CategoryCount>, BlogRepositoryError> {
        let state = self.lock()?;
        // key -> (smallest spelling seen, count)
        let mut groups: BTreeMap<String, (String, u64)> = BTreeMap::new();
        for blog in state.blogs.values() {
            let spelling = blog.category.as_ref();
            let entry = groups
                .entry(blog.category.key())
                .or_insert_with(|| (spelling.to_owned(), 0));
            if spelling < entry.0.as_str() {
                entry.0 = spelling.to_owned();
            }
            entry.1 += 1;
        }
        let mut counts: Vec<CategoryCount> = groups
            .into_values()
            .map(|(category, count)| CategoryCount { category, count })
            .collect();
        // BTreeMap order already sorts names; a stable sort keeps it for ties.
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_fixtures::{self, fixed_now};
    use crate::domain::{Category, Role, User};
    use chrono::Duration;
    use rstest::rstest;

    fn seeded(author: &User) -> (InMemoryBlogRepository, Vec<Blog>) {
        let mut older = test_fixtures::blog(author, "Older trip", 9);
        older.created_at = fixed_now() - Duration::days(2);
        let mut newer = test_fixtures::blog(author, "Newer trip", 1);
        newer.category = Category::new("food").expect("category");
        let mut middle = test_fixtures::blog(author, "Middle trip", 4);
        middle.created_at = fixed_now() - Duration::days(1);
        let repo = InMemoryBlogRepository::new();
        let blogs = vec![older, newer, middle];
        {
            let mut state = repo.state.lock().expect("lock");
            for blog in &blogs {
                state.blogs.insert(blog.id, blog.clone());
            }
        }
        (repo, blogs)
    }

    #[rstest]
    #[case(FeedSort::Latest, ["Newer trip", "Middle trip", "Older trip"])]
    #[case(FeedSort::Oldest, ["Older trip", "Middle trip", "Newer trip"])]
    #[case(FeedSort::Popular, ["Older trip", "Middle trip", "Newer trip"])]
    #[tokio::test]
    async fn feed_orders_by_sort(#[case] sort: FeedSort, #[case] expected: [&str; 3]) {
        let author = test_fixtures::user(Role::Creator);
        let (repo, _) = seeded(&author);
        let query = FeedQuery::try_new(None, None, None, sort, None, None).expect("query");

        let page = repo.feed(&query).await.expect("feed");
        let titles: Vec<&str> = page.items.iter().map(|b| b.title.as_ref()).collect();
        assert_eq!(titles, expected);
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn feed_paginates_after_filtering() {
        let author = test_fixtures::user(Role::Creator);
        let (repo, _) = seeded(&author);
        let query = FeedQuery::try_new(
            Some(Category::new("TRAVEL").expect("category")),
            None,
            None,
            FeedSort::Latest,
            Some(2),
            Some(1),
        )
        .expect("query");

        let page = repo.feed(&query).await.expect("feed");
        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title.as_ref(), "Older trip");
    }

    #[tokio::test]
    async fn likes_toggle_and_keep_count_in_step() {
        let author = test_fixtures::user(Role::Creator);
        let reader = test_fixtures::user(Role::Reader);
        let (repo, blogs) = seeded(&author);
        let id = blogs[1].id;

        let first = repo.toggle_like(&id, &reader.id).await.expect("like");
        assert_eq!(first, LikeOutcome { liked: true, likes: 2 });
        assert!(repo.is_liked(&id, &reader.id).await.expect("state"));

        let second = repo.toggle_like(&id, &reader.id).await.expect("unlike");
        assert_eq!(second, LikeOutcome { liked: false, likes: 1 });
        assert!(!repo.is_liked(&id, &reader.id).await.expect("state"));
    }

    #[tokio::test]
    async fn saved_blogs_list_most_recent_first() {
        let author = test_fixtures::user(Role::Creator);
        let reader = test_fixtures::user(Role::Reader);
        let (repo, blogs) = seeded(&author);

        assert!(repo.toggle_save(&reader.id, &blogs[0].id).await.expect("save"));
        assert!(repo.toggle_save(&reader.id, &blogs[2].id).await.expect("save"));
        let saved = repo.saved_by(&reader.id).await.expect("saved");
        assert_eq!(saved[0].id, blogs[2].id);
        assert_eq!(saved[1].id, blogs[0].id);

        assert!(!repo.toggle_save(&reader.id, &blogs[2].id).await.expect("unsave"));
        assert_eq!(repo.saved_by(&reader.id).await.expect("saved").len(), 1);
    }

    #[tokio::test]
    async fn delete_drops_likes_and_bookmarks() {
        let author = test_fixtures::user(Role::Creator);
        let reader = test_fixtures::user(Role::Reader);
        let (repo, blogs) = seeded(&author);
        let id = blogs[0].id;
        repo.toggle_like(&id, &reader.id).await.expect("like");
        repo.toggle_save(&reader.id, &id).await.expect("save");

        assert!(repo.delete(&id).await.expect("delete"));
        assert!(!repo.delete(&id).await.expect("second delete"));
        assert!(!repo.is_liked(&id, &reader.id).await.expect("liked"));
        assert!(repo.saved_by(&reader.id).await.expect("saved").is_empty());
    }

    #[tokio::test]
    async fn categories_group_case_insensitively() {
        let author = test_fixtures::user(Role::Creator);
        let (repo, _) = seeded(&author);
        let mut shouted = test_fixtures::blog(&author, "Loud food", 0);
        shouted.category = Category::new("FOOD").expect("category");
        repo.insert(&shouted).await.expect("insert");

        let counts = repo.categories().await.expect("categories");
        assert_eq!(
            counts,
            vec![
                CategoryCount {
                    category: "FOOD".to_owned(),
                    count: 2
                },
                CategoryCount {
                    category: "Travel".to_owned(),
                    count: 2
                },
            ]
        );
    }
}
