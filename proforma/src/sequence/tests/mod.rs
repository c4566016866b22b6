#![allow(clippy::missing_panics_doc)]
mod parse;
mod positive;

/// Create a ProForma parse test. By default the term has to be written back exactly as it was
/// given, `just_parse` only requires the written term to parse into the same term, and `ne`
/// requires the parse to fail.
#[macro_export]
macro_rules! parse_test {
    ($id:literal, $case:literal) => {
        paste::paste! {
            #[test]
            fn [<round_trip_ $id>]() {
                let term = $crate::sequence::ProFormaTerm::parse($case);
                assert!(term.is_ok(), "{}\n{}", $case, term.unwrap_err());
                assert_eq!(term.unwrap().to_string(), $case);
            }
        }
    };
    (just_parse $id:literal, $case:literal) => {
        paste::paste! {
            #[test]
            fn [<just_parse_ $id>]() {
                let term = $crate::sequence::ProFormaTerm::parse($case);
                assert!(term.is_ok(), "{}\n{}", $case, term.unwrap_err());
                let term = term.unwrap();
                let written = term.to_string();
                let back = $crate::sequence::ProFormaTerm::parse(&written);
                assert!(back.is_ok(), "{written}\n{}", back.unwrap_err());
                assert_eq!(term, back.unwrap(), "{} != {written}", $case);
            }
        }
    };
    (ne $id:literal, $case:literal) => {
        paste::paste! {
            #[test]
            fn [<negative_ $id>]() {
                let term = $crate::sequence::ProFormaTerm::parse($case);
                assert!(term.is_err(), "{}\n{}", $case, term.unwrap());
                assert_eq!(
                    term.unwrap_err().get_kind(),
                    $crate::ProFormaErrorKind::Parse
                );
            }
        }
    };
}
