use mt940_parser::Statement;
use mt940_parser::digest::{HASHED_FIELD_COUNT, digest_fields, hashed_fields};
use proptest::prelude::*;
use std::{fs, path::PathBuf};

fn fixture_bytes() -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("mt940")
        .join("example.mt940");
    fs::read(&path).unwrap_or_else(|e| panic!("failed to read MT940 fixture {path:?}: {e}"))
}

#[test]
fn two_decodes_of_the_same_file_give_the_same_digests() {
    let bytes = fixture_bytes();
    let first = Statement::from_mt940(bytes.as_slice()).unwrap();
    let second = Statement::from_mt940(bytes.as_slice()).unwrap();

    let a: Vec<_> = first.transactions.iter().map(|t| t.digest).collect();
    let b: Vec<_> = second.transactions.iter().map(|t| t.digest).collect();
    assert_eq!(a, b);
}

#[test]
fn fixture_transaction_hashes_fields_in_fixed_order() {
    let stmt = Statement::from_mt940(fixture_bytes().as_slice()).unwrap();
    let tx = &stmt.transactions[0];

    let expected: [&str; HASHED_FIELD_COUNT] = [
        "2024-06",                      // месяц проводки
        "ING PLN",                      // метка счёта
        "2024-06-03",                   // дата проводки
        "-150.00",                      // сумма
        "PLN",                          // валюта счёта
        "'1234567890",                  // номер операции
        "Faktura FV/12 /2024 czerwiec", // назначение
        "'12345",                       // референс
        "JAN KOWALSKI",                 // контрагент
        "PL61109010140000071219812874", // IBAN
        "",                             // BIC
        "",                             // валюта операции
        "",                             // сумма в валюте
        "2024-06-03",                   // дата валютирования
        "",                             // внешний id
        "-150.00",                      // сумма ещё раз
    ];

    assert_eq!(hashed_fields(tx), expected);
    assert_eq!(tx.digest, digest_fields(&expected));
}

#[test]
fn line_endings_do_not_affect_digests() {
    let crlf = fixture_bytes();
    let lf: Vec<u8> = crlf.iter().copied().filter(|b| *b != b'\r').collect();

    let a = Statement::from_mt940(crlf.as_slice()).unwrap();
    let b = Statement::from_mt940(lf.as_slice()).unwrap();
    assert_eq!(a.transactions, b.transactions);
}

proptest! {
    #[test]
    fn digest_is_deterministic(
        fields in prop::collection::vec("[a-zA-Z0-9 ,.'/-]{0,12}", HASHED_FIELD_COUNT),
    ) {
        let refs: Vec<&str> = fields.iter().map(String::as_str).collect();
        prop_assert_eq!(digest_fields(&refs), digest_fields(&refs));
    }

    #[test]
    fn changing_any_single_field_changes_digest(
        fields in prop::collection::vec("[a-zA-Z0-9 ,.'/-]{0,12}", HASHED_FIELD_COUNT),
        idx in 0..HASHED_FIELD_COUNT,
        suffix in "[a-z0-9]{1,4}",
    ) {
        let refs: Vec<&str> = fields.iter().map(String::as_str).collect();

        let mut mutated = fields.clone();
        mutated[idx].push_str(&suffix);
        let mutated_refs: Vec<&str> = mutated.iter().map(String::as_str).collect();

        prop_assert_ne!(digest_fields(&refs), digest_fields(&mutated_refs));
    }

    #[test]
    fn moving_text_between_neighbour_fields_changes_digest(
        left in "[a-z]{0,8}",
        moved in "[a-z]{1,4}",
        right in "[a-z]{0,8}",
    ) {
        let joined_left = format!("{left}{moved}");
        let joined_right = format!("{moved}{right}");

        prop_assert_ne!(
            digest_fields(&[joined_left.as_str(), right.as_str()]),
            digest_fields(&[left.as_str(), joined_right.as_str()])
        );
    }
}
