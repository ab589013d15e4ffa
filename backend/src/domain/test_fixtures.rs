//! Shared builders for domain service tests.

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    Blog, BlogBody, BlogId, BlogTitle, Category, Email, ImageRef, ImageUpload, Phone, Role,
    SessionUser, User, UserId, UserName,
};

pub(crate) const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfixture";

/// Clock pinned to a single instant.
pub(crate) struct FixtureClock {
    pub(crate) utc_now: DateTime<Utc>,
}

impl Default for FixtureClock {
    fn default() -> Self {
        Self { utc_now: fixed_now() }
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn png_upload(name: &str) -> ImageUpload {
    ImageUpload::try_new(name, "image/png", PNG_BYTES.to_vec(), 1024).expect("fixture upload")
}

pub(crate) fn image(public_id: &str) -> ImageRef {
    ImageRef::new(public_id, format!("https://img.example/{public_id}.png"))
}

pub(crate) fn user(role: Role) -> User {
    let id = UserId::random();
    User {
        id,
        name: UserName::new("Ada Lovelace").expect("fixture name"),
        email: Email::new(format!("{id}@example.com")).expect("fixture email"),
        phone: Phone::new("+15550102030").expect("fixture phone"),
        role,
        photo: image(&format!("photos/{id}")),
        about: None,
        created_at: fixed_now(),
    }
}

pub(crate) fn session(user: &User) -> SessionUser {
    SessionUser {
        id: user.id,
        role: user.role,
    }
}

pub(crate) fn blog(author: &User, title: &str, likes: u64) -> Blog {
    let id = BlogId::random();
    Blog {
        id,
        title: BlogTitle::new(title).expect("fixture title"),
        category: Category::new("Travel").expect("fixture category"),
        body: BlogBody::new("<p>fixture</p>").expect("fixture body"),
        author: author.id,
        image: image(&format!("covers/{id}")),
        like_count: likes,
        created_at: fixed_now(),
        updated_at: fixed_now(),
    }
}
