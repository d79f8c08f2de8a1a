use rust_tabular_dataset::ingestion::TableOptions;
use rust_tabular_dataset::types::Value;
use rust_tabular_dataset::DataSet;

fn sample() -> DataSet {
    DataSet::parse("a,b,c\n1,x,p\n2,y,q\n1,z,p\n", &TableOptions::default()).unwrap()
}

#[tokio::test]
async fn remove_columns_async_resolves_true() {
    let mut ds = sample();
    assert!(ds.remove_columns_async(&["b"]).await.unwrap());
    assert_eq!(ds.columns(), vec!["a", "c"]);
    assert_eq!(ds.rows()[2], vec![Value::from("1"), Value::from("p")]);

    assert!(ds.remove_columns_async(&["b"]).await.is_err());
}

#[tokio::test]
async fn count_async_matches_count() {
    let ds = sample();
    let sync = ds.count(&Value::from("p"), &["c"]).unwrap();
    let awaited = ds.count_async(&Value::from("p"), &["c"]).await.unwrap();
    assert_eq!(sync, awaited);
    assert_eq!(awaited["c"], vec![0, 2]);
}

#[tokio::test]
async fn iteration_futures_run_to_completion() {
    let ds = sample();

    let mut visited = Vec::new();
    ds.for_each_async(|row, i| visited.push((i, row[0].to_string()))).await;
    assert_eq!(visited, vec![(0, "1".to_string()), (1, "2".to_string()), (2, "1".to_string())]);

    let doubled = ds
        .map_async(|row, _| {
            let mut out = row.to_vec();
            out[0] = Value::from(format!("{}{}", row[0], row[0]));
            out
        })
        .await;
    assert_eq!(doubled.get_column("a").unwrap()[1], Value::from("22"));
    assert_eq!(ds.get_column("a").unwrap()[1], Value::from("2"));
}
