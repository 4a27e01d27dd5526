//! Tests for the domain user model.

use super::*;
use rstest::{fixture, rstest};

#[fixture]
fn parts() -> UserParts {
    UserParts {
        id: UserId::random(),
        email: EmailAddress::new("test@example.com").expect("fixture email is valid"),
        name: DisplayName::default(),
        password: PasswordHash::unusable(),
        is_active: true,
        privileges: Privileges::regular(),
        date_joined: Utc::now(),
    }
}

#[rstest]
#[case("test@EXAMPLE.COM", "test@example.com")]
#[case("Test@Example.Com", "Test@example.com")]
#[case("  user@Domain.org  ", "user@domain.org")]
#[case("MiXeD@already.lower", "MiXeD@already.lower")]
#[case("Ünïcode@BÜCHER.DE", "Ünïcode@bücher.de")]
#[case("ada@\u{130}STANBUL.TR", "ada@i\u{307}stanbul.tr")]
fn email_domain_is_lower_cased(#[case] raw: &str, #[case] expected: &str) {
    let email = EmailAddress::new(raw).expect("valid email");
    assert_eq!(email.as_ref(), expected);
}

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("   ", UserValidationError::EmptyEmail)]
#[case("no-at-sign", UserValidationError::InvalidEmail)]
#[case("@example.com", UserValidationError::InvalidEmail)]
#[case("user@", UserValidationError::InvalidEmail)]
#[case("two@at@signs", UserValidationError::InvalidEmail)]
#[case("spa ce@example.com", UserValidationError::InvalidEmail)]
fn invalid_emails_are_rejected(#[case] raw: &str, #[case] expected: UserValidationError) {
    let err = EmailAddress::new(raw).expect_err("email must be rejected");
    assert_eq!(err, expected);
}

#[rstest]
#[case(format!("{}@example.com", "a".repeat(EMAIL_MAX)))]
#[case(format!("a@{}", "\u{130}".repeat(250)))]
fn overlong_email_is_rejected(#[case] raw: String) {
    let err = EmailAddress::new(raw).expect_err("email must be rejected");
    assert_eq!(err, UserValidationError::EmailTooLong { max: EMAIL_MAX });
}

#[rstest]
fn normalised_email_at_limit_is_accepted() {
    let local = "a".repeat(EMAIL_MAX - 2);
    let email = EmailAddress::new(format!("{local}@E")).expect("email at limit");
    assert_eq!(email.as_ref().chars().count(), EMAIL_MAX);
    assert_eq!(email.as_ref(), format!("{local}@e"));
}

#[rstest]
fn local_part_case_distinguishes_addresses() {
    let upper = EmailAddress::new("Ada@example.com").expect("valid email");
    let lower = EmailAddress::new("ada@example.com").expect("valid email");
    assert_ne!(upper, lower);
}

#[rstest]
fn email_deserialises_through_normalisation() {
    let email: EmailAddress =
        serde_json::from_str("\"ada@EXAMPLE.com\"").expect("deserialise email");
    assert_eq!(email.as_ref(), "ada@example.com");
}

#[rstest]
fn display_name_defaults_to_empty() {
    assert_eq!(DisplayName::default().as_ref(), "");
    assert_eq!(NewUserFields::default().name.as_ref(), "");
    assert!(NewUserFields::default().is_active);
}

#[rstest]
#[case(0, true)]
#[case(NAME_MAX, true)]
#[case(NAME_MAX + 1, false)]
fn display_name_length_is_bounded(#[case] length: usize, #[case] ok: bool) {
    let result = DisplayName::new("n".repeat(length));
    assert_eq!(result.is_ok(), ok);
}

#[rstest]
fn user_id_displays_as_uuid() {
    let uuid = Uuid::parse_str("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid uuid");
    let id = UserId::from_uuid(uuid);
    assert_eq!(id.as_uuid(), &uuid);
    assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
}

#[rstest]
fn privileges_flags() {
    assert!(!Privileges::regular().is_staff);
    assert!(!Privileges::regular().is_superuser);
    assert!(Privileges::superuser().is_staff);
    assert!(Privileges::superuser().is_superuser);
}

#[rstest]
fn unusable_password_never_checks(parts: UserParts) {
    let user = User::from_parts(parts);
    assert!(!user.check_password(""));
    assert!(!user.check_password("anything"));
}

#[rstest]
fn rename_and_replace_password_mutate_in_place(parts: UserParts) {
    let mut user = User::from_parts(parts);
    let email_before = user.email().clone();

    user.rename(DisplayName::new("Ada").expect("valid name"));
    let hash = crate::domain::PasswordHasher::new(crate::domain::HashCost {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .expect("valid parameters")
    .hash("newpassword")
    .expect("hash password");
    user.replace_password(hash);

    assert_eq!(user.name().as_ref(), "Ada");
    assert!(user.check_password("newpassword"));
    assert_eq!(user.email(), &email_before);
}
