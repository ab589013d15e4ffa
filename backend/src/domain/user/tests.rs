//! Tests for the domain user model.

use super::*;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[fixture]
fn user() -> User {
    User {
        id: UserId::new(VALID_ID).expect("fixture id"),
        name: UserName::new("Ada Lovelace").expect("fixture name"),
        email: Email::new("ada@example.com").expect("fixture email"),
        phone: Phone::new("5550102030").expect("fixture phone"),
        role: Role::Creator,
        photo: ImageRef::new("photos/ada", "https://img.example/ada.png"),
        about: None,
        created_at: DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("timestamp")
            .with_timezone(&Utc),
    }
}

#[rstest]
#[case("")]
#[case("not-a-uuid")]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6 ")]
fn user_id_rejects_invalid_input(#[case] raw: &str) {
    assert!(UserId::new(raw).is_err());
}

#[rstest]
fn user_id_round_trips_through_strings() {
    let id = UserId::new(VALID_ID).expect("valid id");
    assert_eq!(String::from(id), VALID_ID);
}

#[rstest]
#[case("A", false)]
#[case("Al", true)]
#[case("  Grace Hopper  ", true)]
fn user_name_enforces_length(#[case] raw: &str, #[case] ok: bool) {
    assert_eq!(UserName::new(raw).is_ok(), ok);
}

#[rstest]
fn user_name_rejects_overlong_values() {
    let err = UserName::new("x".repeat(NAME_MAX + 1)).expect_err("too long");
    assert_eq!(err.field(), "name");
}

#[rstest]
fn email_is_trimmed_and_lowercased() {
    let email = Email::new("  Ada@Example.COM ").expect("valid email");
    assert_eq!(email.as_ref(), "ada@example.com");
}

#[rstest]
#[case("ada")]
#[case("ada@")]
#[case("ada@example")]
#[case("a da@example.com")]
fn email_rejects_malformed_addresses(#[case] raw: &str) {
    assert_eq!(Email::new(raw), Err(UserValidationError::InvalidEmail));
}

#[rstest]
#[case("555-0102", "+5550102")]
#[case("+44 20 7946 0958", "+442079460958")]
#[case("15550102030", "+15550102030")]
#[case("+1 555 010 2030", "+15550102030")]
fn phone_is_normalised(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(Phone::new(raw).expect("valid phone").as_ref(), expected);
}

#[rstest]
fn phones_with_and_without_plus_are_one_number() {
    let bare = Phone::new("15550102030").expect("bare digits");
    let prefixed = Phone::new("+1 (555) 010-2030").expect("formatted");
    assert_eq!(bare, prefixed);
}

#[rstest]
#[case("12345")]
#[case("+1234567890123456")]
#[case("555-CALL-NOW")]
fn phone_rejects_bad_digit_counts_and_letters(#[case] raw: &str) {
    let err = Phone::new(raw).expect_err("invalid phone");
    assert_eq!(err.code(), "invalid_phone");
}

#[rstest]
#[case("reader", Role::Reader)]
#[case("Creator", Role::Creator)]
#[case(" CREATOR ", Role::Creator)]
fn role_parses_case_insensitively(#[case] raw: &str, #[case] expected: Role) {
    assert_eq!(raw.parse::<Role>(), Ok(expected));
}

#[rstest]
fn role_rejects_unknown_values() {
    assert_eq!("admin".parse::<Role>(), Err(UserValidationError::UnknownRole));
    assert!(!Role::Reader.can_author());
    assert!(Role::Creator.can_author());
}

#[rstest]
fn about_is_bounded() {
    assert!(About::new("x".repeat(ABOUT_MAX)).is_ok());
    assert!(About::new("x".repeat(ABOUT_MAX + 1)).is_err());
}

#[rstest]
fn user_serialises_camel_case(user: User) {
    let value = serde_json::to_value(&user).expect("serialise user");
    assert_eq!(value.get("role"), Some(&json!("creator")));
    assert!(value.get("createdAt").is_some());
    assert!(value.get("created_at").is_none());
    assert!(value.get("about").is_none());
    assert_eq!(
        value.pointer("/photo/publicId").and_then(Value::as_str),
        Some("photos/ada")
    );
}

#[rstest]
fn summary_copies_public_fields(user: User) {
    let summary = user.summary();
    assert_eq!(summary.id, user.id);
    assert_eq!(summary.name, user.name);
    assert_eq!(summary.photo, user.photo);
}

#[rstest]
fn credentials_debug_hides_the_hash() {
    let credentials = UserCredentials {
        user_id: UserId::random(),
        role: Role::Reader,
        password_hash: "$argon2id$secret".to_owned(),
    };
    assert!(!format!("{credentials:?}").contains("argon2id"));
}
