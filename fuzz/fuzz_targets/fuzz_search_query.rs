#![no_main]

use libfuzzer_sys::fuzz_target;

use domain::search::entity::SearchPage;
use domain::search::query::{MAX_PAGE_SIZE, SearchQuery};

// Fuzz query parsing with arbitrary filter text and cursor parameters.
//
// Layout:
//   [0..8]   = from_time (i64 LE)
//   [8..16]  = last_id (u64 LE)
//   [16..24] = limit (i64 LE)
//   [24]     = presence mask for the three optional parameters
//   rest     = filter text (arbitrary bytes, lossy UTF-8)
fuzz_target!(|data: &[u8]| {
    if data.len() < 25 {
        return;
    }

    let from_time = i64::from_le_bytes(data[0..8].try_into().unwrap());
    let last_id = u64::from_le_bytes(data[8..16].try_into().unwrap());
    let limit = i64::from_le_bytes(data[16..24].try_into().unwrap());
    let mask = data[24];

    let filter = String::from_utf8_lossy(&data[25..]);

    let result = SearchQuery::parse(
        &filter,
        (mask & 1 != 0).then_some(from_time),
        (mask & 2 != 0).then_some(last_id),
        (mask & 4 != 0).then_some(limit),
    );

    if let Ok(query) = result {
        // Parsed queries always carry a usable pattern and a clamped limit.
        assert!(query.pattern.starts_with('%') && query.pattern.ends_with('%'));
        assert!(query.limit >= 1 && query.limit <= MAX_PAGE_SIZE);

        // Cursor derivation never panics on an empty result set.
        let page = SearchPage::from_records(vec![]);
        assert_eq!(page.last, u64::MAX);
    }
});
