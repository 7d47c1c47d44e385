// ==========================================
// 考试统计存储测试
// ==========================================
// 测试目标: 周期幂等导入、行级去重、筛选查询、汇总与去重枚举
// ==========================================

mod test_helpers;

use driving_exams_stats::domain::{ExamFilters, ExamResultRecord, PassFailTotals, Period};
use driving_exams_stats::importer::read_exam_file;
use driving_exams_stats::logging;
use driving_exams_stats::repository::{ExamStatsStore, RepositoryError};
use test_helpers::*;

/// 导入全部样例行，返回 (临时库, 存储)
fn store_with_sample() -> (tempfile::NamedTempFile, ExamStatsStore) {
    let (temp_file, store) = create_test_store().expect("创建测试库失败");
    let (_dir, path) = write_sample_file().expect("写入样例文件失败");
    let import = read_exam_file(&path).expect("读取样例失败");

    let inserted = store
        .import_records(&import.records, Some("exams_utf8.csv"))
        .expect("首次导入应该成功");
    assert_eq!(inserted, 4);

    (temp_file, store)
}

#[test]
fn test_same_file_into_fresh_stores_inserts_same_count() {
    logging::init_test();

    let (_dir, path) = write_sample_file().unwrap();
    let import = read_exam_file(&path).unwrap();

    let first = ExamStatsStore::open_in_memory().unwrap();
    first.initialize().unwrap();
    let second = ExamStatsStore::open_in_memory().unwrap();
    second.initialize().unwrap();

    assert_eq!(
        first.import_records(&import.records, None).unwrap(),
        second.import_records(&import.records, None).unwrap()
    );
}

#[test]
fn test_reimport_fails_with_every_period() {
    logging::init_test();

    let (_db, store) = store_with_sample();
    let (_dir, path) = write_sample_file().unwrap();
    let import = read_exam_file(&path).unwrap();

    let err = store
        .import_records(&import.records, Some("again.csv"))
        .unwrap_err();
    match &err {
        RepositoryError::PeriodsAlreadyImported { periods } => {
            assert_eq!(
                periods,
                &vec![
                    Period::new(2023, 12),
                    Period::new(2024, 1),
                    Period::new(2024, 2)
                ]
            );
        }
        other => panic!("Expected PeriodsAlreadyImported, got {:?}", other),
    }
    assert!(err.to_string().contains("2023-12, 2024-01, 2024-02"));
}

#[test]
fn test_conflict_has_no_side_effects() {
    logging::init_test();

    let (_db, store) = store_with_sample();

    // 2024-03 为新周期，2024-01 已导入
    let batch = vec![
        record("Sevilla", "S1", 2024, 3, "TEORICA", 9, 9),
        record("Sevilla", "S2", 2024, 1, "TEORICA", 9, 9),
    ];
    let result = store.import_records(&batch, Some("mixed.csv"));
    assert!(matches!(
        result,
        Err(RepositoryError::PeriodsAlreadyImported { ref periods }) if periods == &vec![Period::new(2024, 1)]
    ));

    assert!(!store.is_period_imported(2024, 3).unwrap());
    assert_eq!(store.query(&ExamFilters::new()).unwrap().len(), 4);
    assert_eq!(store.imported_periods().unwrap().len(), 3);
}

#[test]
fn test_storage_fault_rolls_back_whole_import() {
    logging::init_test();

    let (_db, store) = create_test_store().unwrap();
    {
        let conn = store.connection();
        let conn = conn.lock().unwrap();
        conn.execute_batch(
            "CREATE TRIGGER fail_period_insert BEFORE INSERT ON imported_periods \
             BEGIN SELECT RAISE(ABORT, 'disk fault'); END;",
        )
        .unwrap();
    }

    let result = store.import_records(
        &[record("Madrid", "A1", 2024, 8, "TEORICA", 4, 1)],
        Some("august.csv"),
    );
    match result {
        Err(RepositoryError::DatabaseQueryError(msg)) => assert!(msg.contains("disk fault")),
        other => panic!("Expected DatabaseQueryError, got {:?}", other),
    }

    // 行写入已执行但随事务回滚
    assert!(store.query(&ExamFilters::new()).unwrap().is_empty());
    assert!(store.imported_periods().unwrap().is_empty());
    assert!(!store.is_period_imported(2024, 8).unwrap());
}

#[test]
fn test_rows_tied_on_sort_keys_keep_insertion_order() {
    logging::init_test();

    let (_db, store) = create_test_store().unwrap();
    let mut first = record("Madrid", "Z9", 2024, 9, "TEORICA", 1, 0);
    let mut second = record("Madrid", "A1", 2024, 9, "TEORICA", 2, 0);
    first.school_name = "Autoescuela Centro".to_string();
    second.school_name = "Autoescuela Centro".to_string();
    store.import_records(&[first, second], None).unwrap();

    let codes = |rows: Vec<ExamResultRecord>| {
        rows.into_iter().map(|r| r.school_code).collect::<Vec<_>>()
    };
    assert_eq!(codes(store.query(&ExamFilters::new()).unwrap()), vec!["Z9", "A1"]);
    assert_eq!(
        codes(store.query(&ExamFilters::new().with_year(2024)).unwrap()),
        vec!["Z9", "A1"]
    );
}

#[test]
fn test_first_submitted_duplicate_wins_and_row_count_is_submitted() {
    logging::init_test();

    let (_db, store) = create_test_store().unwrap();
    let batch = vec![
        record("Madrid", "A1", 2024, 6, "TEORICA", 5, 1),
        record("Madrid", "A1", 2024, 6, "TEORICA", 50, 10),
        record("Madrid", "A2", 2024, 6, "TEORICA", 2, 2),
    ];

    let inserted = store.import_records(&batch, Some("june.csv")).unwrap();
    assert_eq!(inserted, 2, "批内重复行应被静默跳过");

    let rows = store
        .query(&ExamFilters::new().with_school_code("A1"))
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].num_passed, 5, "应保留首次提交的记录");

    // row_count 为提交条数（含重复），而非写入条数
    let periods = store.imported_periods().unwrap();
    assert_eq!(periods.len(), 1);
    assert_eq!(periods[0].row_count, 3);
    assert_eq!(periods[0].source_file.as_deref(), Some("june.csv"));
}

#[test]
fn test_round_trip_years_months_and_totals() {
    logging::init_test();

    let (_db, store) = store_with_sample();

    assert_eq!(store.distinct_years().unwrap(), vec![2024, 2023]);
    assert_eq!(store.distinct_months(None).unwrap(), vec![1, 2, 12]);
    assert_eq!(store.distinct_months(Some(2024)).unwrap(), vec![1, 2]);
    assert_eq!(store.distinct_months(Some(2023)).unwrap(), vec![12]);
    assert!(store.distinct_months(Some(1999)).unwrap().is_empty());

    let totals = store.aggregate_totals(&ExamFilters::new()).unwrap();
    assert_eq!(
        totals,
        PassFailTotals {
            passed: SAMPLE_PASSED,
            failed: SAMPLE_FAILED
        }
    );

    for period in [(2023, 12), (2024, 1), (2024, 2)] {
        assert!(store.is_period_imported(period.0, period.1).unwrap());
    }
    assert!(!store.is_period_imported(2024, 3).unwrap());
}

#[test]
fn test_query_order_and_filter_composition() {
    logging::init_test();

    let (_db, store) = store_with_sample();

    let all = store.query(&ExamFilters::new()).unwrap();
    let keys: Vec<(i32, i32, &str)> = all
        .iter()
        .map(|r| (r.year, r.month, r.exam_type.as_str()))
        .collect();
    assert_eq!(
        keys,
        vec![
            (2024, 2, "PRUEBA CONTROL DE CIRCULACION"),
            (2024, 1, "PRUEBA CONTROL DE CIRCULACION"),
            (2024, 1, "PRUEBA DESTREZA"),
            (2023, 12, "PRUEBA TEORICA"),
        ]
    );

    // 相同输入结果可复现
    assert_eq!(store.query(&ExamFilters::new()).unwrap(), all);

    let filtered = store
        .query(&ExamFilters::new().with_year(2024).with_province("Madrid"))
        .unwrap();
    let expected: Vec<_> = all
        .iter()
        .filter(|r| r.year == 2024 && r.province == "Madrid")
        .cloned()
        .collect();
    assert_eq!(filtered, expected);
    assert_eq!(filtered.len(), 2);

    let none = store
        .query(&ExamFilters::new().with_province("Lugo"))
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_school_name_contains() {
    logging::init_test();

    let (_db, store) = store_with_sample();

    // LIKE 对 ASCII 不区分大小写
    let rows = store
        .query(&ExamFilters::new().with_school_name_contains("escuela sol"))
        .unwrap();
    assert_eq!(rows.len(), 2);

    let rows = store
        .query(&ExamFilters::new().with_school_name_contains("Norte"))
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].school_code, "A003");

    // 通配符按字面匹配
    let rows = store
        .query(&ExamFilters::new().with_school_name_contains("%"))
        .unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_falsy_filters_are_ignored() {
    logging::init_test();

    let (_db, store) = store_with_sample();
    let filters = ExamFilters::from_pairs([
        ("year", "0"),
        ("province", ""),
        ("unknown_key", "whatever"),
    ])
    .unwrap();

    assert_eq!(store.query(&filters).unwrap().len(), 4);
}

#[test]
fn test_aggregate_by_exam_type() {
    logging::init_test();

    let (_db, store) = store_with_sample();

    let groups = store.aggregate_by_exam_type(&ExamFilters::new()).unwrap();
    let flat: Vec<(&str, i64, i64)> = groups
        .iter()
        .map(|g| (g.exam_type.as_str(), g.passed, g.failed))
        .collect();
    assert_eq!(
        flat,
        vec![
            ("PRUEBA CONTROL DE CIRCULACION", 13, 7),
            ("PRUEBA DESTREZA", 4, 1),
            ("PRUEBA TEORICA", 7, 3),
        ]
    );

    let groups = store
        .aggregate_by_exam_type(&ExamFilters::new().with_permit("A2"))
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].passed, 3);

    let totals = store
        .aggregate_totals(&ExamFilters::new().with_year(2030))
        .unwrap();
    assert_eq!(totals, PassFailTotals::default());
}

#[test]
fn test_distinct_values() {
    logging::init_test();

    let (_db, store) = store_with_sample();

    assert_eq!(
        store.distinct_values("province").unwrap(),
        vec!["Cádiz", "Madrid"]
    );
    assert_eq!(
        store.distinct_values("permit").unwrap(),
        vec!["A2", "B"]
    );
    assert_eq!(store.distinct_values("section_code").unwrap(), vec!["1", "2"]);

    match store.distinct_values("num_passed") {
        Err(RepositoryError::UnsupportedDistinctField(field)) => assert_eq!(field, "num_passed"),
        other => panic!("Expected UnsupportedDistinctField, got {:?}", other),
    }
}

#[test]
fn test_reopen_keeps_data_and_schema() {
    logging::init_test();

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("exams.db");

    let store = ExamStatsStore::open(&db_path).expect("父目录应自动创建");
    store.initialize().unwrap();
    store
        .import_records(&[record("Madrid", "A1", 2024, 4, "TEORICA", 1, 1)], None)
        .unwrap();
    store.close().unwrap();

    let reopened = ExamStatsStore::open(&db_path).unwrap();
    assert!(reopened.is_ready().unwrap());
    assert!(reopened.is_period_imported(2024, 4).unwrap());

    let periods = reopened.imported_periods().unwrap();
    assert_eq!(periods[0].source_file, None);
    assert_eq!(periods[0].row_count, 1);

    // 重复 initialize 不影响已有数据
    reopened.initialize().unwrap();
    assert_eq!(reopened.query(&ExamFilters::new()).unwrap().len(), 1);
}

#[test]
fn test_uninitialized_store_fails_fast() {
    let store = ExamStatsStore::open_in_memory().unwrap();

    assert!(matches!(
        store.distinct_years(),
        Err(RepositoryError::SchemaNotInitialized)
    ));
    assert!(matches!(
        store.aggregate_totals(&ExamFilters::new()),
        Err(RepositoryError::SchemaNotInitialized)
    ));
}
