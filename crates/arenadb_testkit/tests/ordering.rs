//! Iteration order of `get_all` under each key encoding.

use arenadb_core::{Config, KeyEncoding};
use arenadb_testkit::prelude::*;
use proptest::prelude::*;

fn ids(notes: &[Note]) -> Vec<i64> {
    notes.iter().map(|n| n.id).collect()
}

#[test]
fn decimal_keys_order_lexicographically() {
    let test_db = scenarios::populated_notes(10);
    let notes = test_db.table::<Note>().unwrap();
    assert_eq!(ids(&notes.get_all().unwrap()), vec![1, 10, 2, 3, 4, 5, 6, 7, 8, 9]);
}

#[test]
fn big_endian_keys_order_numerically() {
    let test_db =
        TestDatabase::memory_with_config(Config::new().key_encoding(KeyEncoding::BigEndian));
    let notes = test_db.register::<Note>().unwrap();
    for i in 1..=10 {
        notes.create(&mut Note::new(format!("n{i}"))).unwrap();
    }
    assert_eq!(ids(&notes.get_all().unwrap()), (1..=10).collect::<Vec<_>>());
}

#[test]
fn big_endian_order_survives_reopen() {
    let config = Config::new().key_encoding(KeyEncoding::BigEndian);
    let test_db = TestDatabase::file_with_config("big_endian_order_survives_reopen", config);
    {
        let notes = test_db.register::<Note>().unwrap();
        for i in 1..=12 {
            notes.create(&mut Note::new(format!("n{i}"))).unwrap();
        }
    }
    let test_db = test_db.reopen();
    let notes = test_db.register::<Note>().unwrap();
    assert_eq!(ids(&notes.get_all().unwrap()), (1..=12).collect::<Vec<_>>());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn get_all_follows_key_bytes(count in 1usize..40, deletions in prop::collection::vec(any::<usize>(), 0..10)) {
        for encoding in [KeyEncoding::Decimal, KeyEncoding::BigEndian] {
            let test_db = TestDatabase::memory_with_config(Config::new().key_encoding(encoding));
            let notes = test_db.register::<Note>().unwrap();
            for i in 0..count {
                notes.create(&mut Note::new(i.to_string())).unwrap();
            }
            for d in &deletions {
                let id = (d % count) as i64 + 1;
                let _ = notes.delete(id);
            }

            let got = ids(&notes.get_all().unwrap());
            let mut expected = got.clone();
            expected.sort_by_key(|&id| encoding.encode(id));
            prop_assert_eq!(&got, &expected);

            if encoding == KeyEncoding::BigEndian {
                prop_assert!(got.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }
}
