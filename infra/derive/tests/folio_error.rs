use folio_derive::folio_error;
use std::borrow::Cow;

#[folio_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Lookup failed{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read_missing() -> Result<(), DemoError> {
    Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")).context("Reading schema file")
}

#[test]
fn source_errors_convert_with_context() {
    let err = read_missing().expect_err("io error expected");
    assert!(matches!(err, DemoError::Io { .. }));
    assert_eq!(err.to_string(), "IO error (Reading schema file): gone");
}

#[test]
fn question_mark_converts_without_context() {
    fn inner() -> Result<(), DemoError> {
        Err(std::io::Error::other("boom"))?;
        Ok(())
    }

    let err = inner().expect_err("io error expected");
    assert_eq!(err.to_string(), "IO error: boom");
}

#[test]
fn context_is_attached_to_own_variants() {
    let result: Result<(), DemoError> =
        Err(DemoError::NotFound { message: "group.notFound".into(), context: None });

    let err = result.context("somegroup").expect_err("still an error");
    assert_eq!(err.to_string(), "Lookup failed (somegroup): group.notFound");
}

#[test]
fn strings_become_internal_errors() {
    let borrowed: DemoError = "unexpected".into();
    let owned: DemoError = String::from("also unexpected").into();

    assert!(matches!(borrowed, DemoError::Internal { .. }));
    assert_eq!(owned.to_string(), "Internal error: also unexpected");
}
