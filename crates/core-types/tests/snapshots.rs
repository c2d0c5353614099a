use chrono::NaiveDate;
use core_types::{CompanyInfo, MetadataMap, PriceTable, RankOrder, RankedEntry, RankedList};
use rust_decimal_macros::dec;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

#[test]
fn price_table_serializes_with_explicit_gaps() {
    let table = PriceTable::new(
        vec!["AAA".into(), "BBB".into()],
        vec![day(1), day(2)],
        vec![vec![Some(100.0), None], vec![Some(110.0), Some(55.0)]],
    )
    .unwrap();

    let json = serde_json::to_value(&table).unwrap();
    assert_eq!(json["tickers"], serde_json::json!(["AAA", "BBB"]));
    assert_eq!(json["dates"][0], "2024-05-01");
    assert!(json["rows"][0][1].is_null());
    assert!(json.get("index").is_none());
}

#[test]
fn metadata_is_read_only_after_collection() {
    let metadata: MetadataMap = [
        ("AAA".to_string(), CompanyInfo::new(Some(dec!(10)), Some("Energy"))),
        ("BBB".to_string(), CompanyInfo::default()),
    ]
    .into_iter()
    .collect();

    assert_eq!(metadata.market_cap("AAA"), Some(dec!(10)));
    assert_eq!(metadata.market_cap("BBB"), None);
    assert_eq!(metadata.market_cap("CCC"), None);
    assert_eq!(metadata.ordered_by_market_cap(), vec!["AAA", "BBB"]);
}

#[test]
fn ranked_lists_order_the_same_regardless_of_input() {
    let forward = RankedList::from_unsorted(
        RankOrder::Ascending,
        vec![RankedEntry::new("BBB", 0.1), RankedEntry::new("AAA", 0.1), RankedEntry::new("CCC", -0.2)],
    );
    let backward = RankedList::from_unsorted(
        RankOrder::Ascending,
        vec![RankedEntry::new("CCC", -0.2), RankedEntry::new("AAA", 0.1), RankedEntry::new("BBB", 0.1)],
    );
    assert_eq!(forward, backward);
    assert_eq!(forward.tickers(), vec!["CCC", "AAA", "BBB"]);
    assert!(forward.is_ordered());
}
