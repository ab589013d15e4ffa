//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    ///
    /// `email` and `phone` carry the `users_email_key` and `users_phone_key`
    /// unique constraints; adapters use those names to report duplicates.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        phone -> Varchar,
        /// `reader` or `creator`.
        role -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        photo_public_id -> Text,
        photo_url -> Text,
        about -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Blog posts.
    blogs (id) {
        id -> Uuid,
        author_id -> Uuid,
        title -> Varchar,
        category -> Varchar,
        /// Editor HTML stored verbatim.
        body -> Text,
        image_public_id -> Text,
        image_url -> Text,
        /// Denormalised count of `blog_likes` rows for this blog.
        like_count -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per (blog, user) like.
    blog_likes (blog_id, user_id) {
        blog_id -> Uuid,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Bookmarks.
    saved_blogs (user_id, blog_id) {
        user_id -> Uuid,
        blog_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(blogs -> users (author_id));
diesel::joinable!(blog_likes -> blogs (blog_id));
diesel::joinable!(saved_blogs -> blogs (blog_id));

diesel::allow_tables_to_appear_in_same_query!(users, blogs, blog_likes, saved_blogs);
