use orderbench::generator::generate;
use orderbench::record::{Category, Country, Device, Record};
use proptest::prelude::*;
use tempfile::tempdir;

fn read_records(path: &std::path::Path) -> Vec<Record> {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    rdr.deserialize::<Record>().map(Result::unwrap).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_chunking_never_changes_output(
        rows in 1usize..400,
        a in 1usize..500,
        b in 1usize..500,
        seed in any::<u64>(),
    ) {
        let dir = tempdir().unwrap();
        let pa = dir.path().join("a.csv");
        let pb = dir.path().join("b.csv");
        let ra = generate(&pa, rows, a, seed).unwrap();
        generate(&pb, rows, b, seed).unwrap();
        prop_assert_eq!(std::fs::read(&pa).unwrap(), std::fs::read(&pb).unwrap());
        prop_assert_eq!(ra.chunk_sizes.iter().sum::<usize>(), rows);
        prop_assert_eq!(ra.chunk_sizes.len(), rows.div_ceil(a));
    }

    #[test]
    fn prop_order_ids_contiguous_and_fields_bounded(
        rows in 1usize..300,
        chunk in 1usize..64,
        seed in any::<u64>(),
    ) {
        let dir = tempdir().unwrap();
        let p = dir.path().join("d.csv");
        generate(&p, rows, chunk, seed).unwrap();
        let recs = read_records(&p);
        prop_assert_eq!(recs.len(), rows);
        for (i, r) in recs.iter().enumerate() {
            prop_assert_eq!(r.order_id, i as u64 + 1);
            prop_assert!(r.price > 0.0);
            prop_assert!((1..=4).contains(&r.quantity));
            prop_assert!((1.0..=5.0).contains(&r.rating));
            prop_assert!(Category::ALL.contains(&r.category));
            prop_assert!(Country::ALL.contains(&r.country));
            prop_assert!(Device::ALL.contains(&r.device));
            prop_assert!(r.user_id >= 1 && r.user_id < (rows / 10 + 50) as u64);
            prop_assert!(r.product_id >= 1 && r.product_id < 5000);
        }
    }
}
