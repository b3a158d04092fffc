//! # Table Copy Integration Tests
//!
//! Full-table materialization through `SqlTable::copy_table`: fidelity,
//! NULL preservation, varlen ownership, visibility filtering and failure on
//! storage exhaustion.
//!
//! ## Usage
//!
//! ```sh
//! cargo test --test copy_table_test
//! ```

use std::sync::Arc;

use sqltable::mvcc::{Transaction, TransactionManager};
use sqltable::storage::{BlockStore, ProjectedRow, StorageError};
use sqltable::{
    copy_all, Column, ColumnOid, DbOid, Schema, SqlTable, SqlType, TableOid, VarlenEntry,
};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

const DB: DbOid = DbOid::new(1);
const SRC: TableOid = TableOid::new(10);
const DST: TableOid = TableOid::new(11);

const LONG_NAME: &str = "a name well past the inline threshold";

fn people_schema() -> Schema {
    Schema::new(vec![
        Column::new("id", SqlType::BigInt, false),
        Column::new("name", SqlType::Varchar, true),
        Column::new("flag", SqlType::Boolean, true),
    ])
}

fn create_table(store: &Arc<BlockStore>) -> SqlTable {
    SqlTable::new(Arc::clone(store), &people_schema()).unwrap()
}

fn oids(table: &SqlTable) -> (ColumnOid, ColumnOid, ColumnOid) {
    let schema = table.schema();
    (
        schema.column_by_name("id").unwrap().oid(),
        schema.column_by_name("name").unwrap().oid(),
        schema.column_by_name("flag").unwrap().oid(),
    )
}

fn insert_person(
    table: &SqlTable,
    txn: &mut Transaction<'_>,
    id: i64,
    name: Option<VarlenEntry>,
    flag: Option<bool>,
) -> sqltable::TupleSlot {
    let (id_oid, name_oid, flag_oid) = oids(table);
    let (init, proj) = table
        .initializer_for_projected_row(&table.column_oids())
        .unwrap();
    let mut redo = txn.stage_write(DB, SRC, &init);
    let row = redo.delta_mut();
    row.set_i64(proj[&id_oid], id).unwrap();
    if let Some(name) = name {
        row.set_varlen(proj[&name_oid], name).unwrap();
    }
    if let Some(flag) = flag {
        row.set_bool(proj[&flag_oid], flag).unwrap();
    }
    table.insert(txn, redo).unwrap()
}

fn visible_rows(table: &SqlTable, txn: &Transaction<'_>) -> Vec<ProjectedRow> {
    let (init, _) = table
        .initializer_for_projected_row(&table.column_oids())
        .unwrap();
    let mut rows = Vec::new();
    for slot in table.slots() {
        let mut row = init.initialize_row();
        if table.select(txn, slot, &mut row).unwrap() {
            rows.push(row);
        }
    }
    rows
}

fn visible_ids(table: &SqlTable, txn: &Transaction<'_>) -> Vec<i64> {
    let (id_oid, _, _) = oids(table);
    let (init, proj) = table.initializer_for_projected_row(&[id_oid]).unwrap();
    let mut row = init.initialize_row();
    let mut ids = Vec::new();
    for slot in table.slots() {
        if table.select(txn, slot, &mut row).unwrap() {
            ids.push(row.get_i64(proj[&id_oid]).unwrap().unwrap());
        }
    }
    ids
}

// ============================================================================
// FIDELITY TESTS
// ============================================================================

mod fidelity_tests {
    use super::*;

    #[test]
    fn two_row_scenario_is_copied_exactly() {
        let store = Arc::new(BlockStore::default());
        let src = create_table(&store);
        let dst = create_table(&store);
        let mgr = TransactionManager::new();

        let mut setup = mgr.begin_txn().unwrap();
        insert_person(&src, &mut setup, 1, Some(VarlenEntry::owned(b"ab".to_vec())), Some(true));
        insert_person(&src, &mut setup, 2, None, Some(false));
        setup.commit();

        let mut txn = mgr.begin_txn().unwrap();
        let stats = dst.copy_table(&mut txn, &src, DB, DST).unwrap();
        assert_eq!(stats.copied, 2);
        assert_eq!(stats.skipped, 0);
        assert_eq!(stats.deep_copied_varlens, 1);

        let expected = visible_rows(&src, &txn);
        let copied = visible_rows(&dst, &txn);
        assert_eq!(copied, expected);

        let (_, name_oid, _) = oids(&dst);
        let (_, proj) = dst
            .initializer_for_projected_row(&dst.column_oids())
            .unwrap();
        let name = copied[0].varlen(proj[&name_oid]).unwrap();
        assert_eq!(name.content(), b"ab");
        assert!(name.needs_reclaim());
        assert!(copied[1].is_null(proj[&name_oid]));
        txn.commit();
    }

    #[test]
    fn nulls_survive_in_every_column_class() {
        let store = Arc::new(BlockStore::default());
        let src = create_table(&store);
        let dst = create_table(&store);
        let mgr = TransactionManager::new();
        let mut txn = mgr.begin_txn().unwrap();

        insert_person(&src, &mut txn, 5, None, None);
        dst.copy_table(&mut txn, &src, DB, DST).unwrap();

        let rows = visible_rows(&dst, &txn);
        assert_eq!(rows.len(), 1);
        let (id_oid, name_oid, flag_oid) = oids(&dst);
        let (_, proj) = dst
            .initializer_for_projected_row(&dst.column_oids())
            .unwrap();
        assert_eq!(rows[0].get_i64(proj[&id_oid]).unwrap(), Some(5));
        assert!(rows[0].is_null(proj[&name_oid]));
        assert!(rows[0].is_null(proj[&flag_oid]));
        txn.commit();
    }

    #[test]
    fn free_function_and_method_agree() {
        let store = Arc::new(BlockStore::default());
        let src = create_table(&store);
        let via_fn = create_table(&store);
        let via_method = create_table(&store);
        let mgr = TransactionManager::new();
        let mut txn = mgr.begin_txn().unwrap();
        for i in 0..20 {
            insert_person(&src, &mut txn, i, Some(VarlenEntry::from(LONG_NAME)), Some(i % 2 == 0));
        }

        let a = copy_all(&src, &via_fn, &mut txn, DB, DST).unwrap();
        let b = via_method.copy_table(&mut txn, &src, DB, DST).unwrap();
        assert_eq!(a, b);
        assert_eq!(visible_rows(&via_fn, &txn), visible_rows(&via_method, &txn));
        txn.commit();
    }

    #[test]
    fn copy_stages_inserts_against_the_given_identity() {
        let store = Arc::new(BlockStore::default());
        let src = create_table(&store);
        let dst = create_table(&store);
        let mgr = TransactionManager::new();
        let mut txn = mgr.begin_txn().unwrap();
        insert_person(&src, &mut txn, 1, None, None);
        let before = txn.write_entries().len();

        dst.copy_table(&mut txn, &src, DbOid::new(3), TableOid::new(77))
            .unwrap();
        let entry = txn.write_entries()[before];
        assert_eq!(
            entry,
            sqltable::mvcc::WriteEntry::Insert {
                db_oid: DbOid::new(3),
                table_oid: TableOid::new(77),
                slot: dst.slots().next().unwrap(),
            }
        );
        txn.commit();
    }
}

// ============================================================================
// OWNERSHIP TESTS
// ============================================================================

mod ownership_tests {
    use super::*;

    #[test]
    fn destination_outlives_dropped_source() {
        let store = Arc::new(BlockStore::default());
        let dst = create_table(&store);
        let mgr = TransactionManager::new();
        let mut txn = mgr.begin_txn().unwrap();
        {
            let src = create_table(&store);
            insert_person(&src, &mut txn, 1, Some(VarlenEntry::from(LONG_NAME)), None);
            let stats = dst.copy_table(&mut txn, &src, DB, DST).unwrap();
            assert_eq!(stats.deep_copied_varlens, 1);
        }

        let (_, name_oid, _) = oids(&dst);
        let (_, proj) = dst
            .initializer_for_projected_row(&dst.column_oids())
            .unwrap();
        let rows = visible_rows(&dst, &txn);
        assert_eq!(
            rows[0].varlen(proj[&name_oid]).unwrap().content(),
            LONG_NAME.as_bytes()
        );
        txn.commit();
    }

    #[test]
    fn updating_the_source_leaves_the_copy_alone() {
        let store = Arc::new(BlockStore::default());
        let src = create_table(&store);
        let dst = create_table(&store);
        let mgr = TransactionManager::new();
        let mut txn = mgr.begin_txn().unwrap();
        let slot = insert_person(&src, &mut txn, 1, Some(VarlenEntry::from(LONG_NAME)), None);
        dst.copy_table(&mut txn, &src, DB, DST).unwrap();

        let (_, name_oid, _) = oids(&src);
        let (init, proj) = src.initializer_for_projected_row(&[name_oid]).unwrap();
        let mut redo = txn.stage_write(DB, SRC, &init);
        redo.delta_mut()
            .set_varlen(proj[&name_oid], VarlenEntry::from("replaced"))
            .unwrap();
        src.update(&mut txn, slot, redo).unwrap().unwrap();
        src.reset();

        let (_, proj) = dst
            .initializer_for_projected_row(&dst.column_oids())
            .unwrap();
        let rows = visible_rows(&dst, &txn);
        assert_eq!(
            rows[0].varlen(proj[&name_oid]).unwrap().content(),
            LONG_NAME.as_bytes()
        );
        txn.commit();
    }

    #[test]
    fn shared_and_inline_entries_are_not_counted_as_deep_copies() {
        let store = Arc::new(BlockStore::default());
        let src = create_table(&store);
        let dst = create_table(&store);
        let mgr = TransactionManager::new();
        let mut txn = mgr.begin_txn().unwrap();
        let shared: Arc<[u8]> = Arc::from(LONG_NAME.as_bytes());
        insert_person(&src, &mut txn, 1, Some(VarlenEntry::shared(Arc::clone(&shared))), None);
        insert_person(&src, &mut txn, 2, Some(VarlenEntry::from("tiny")), None);

        let stats = dst.copy_table(&mut txn, &src, DB, DST).unwrap();
        assert_eq!(stats.copied, 2);
        assert_eq!(stats.deep_copied_varlens, 0);
        assert_eq!(visible_rows(&dst, &txn), visible_rows(&src, &txn));
        txn.commit();
    }
}

// ============================================================================
// VISIBILITY TESTS
// ============================================================================

mod visibility_tests {
    use super::*;

    #[test]
    fn only_rows_visible_to_the_copier_are_copied() {
        let store = Arc::new(BlockStore::default());
        let src = create_table(&store);
        let dst = create_table(&store);
        let mgr = TransactionManager::new();

        let mut setup = mgr.begin_txn().unwrap();
        insert_person(&src, &mut setup, 1, None, None);
        let doomed = insert_person(&src, &mut setup, 2, None, None);
        setup.commit();

        let mut deleter = mgr.begin_txn().unwrap();
        assert!(src.delete(&mut deleter, DB, SRC, doomed).unwrap());
        deleter.commit();

        let mut aborted = mgr.begin_txn().unwrap();
        insert_person(&src, &mut aborted, 3, None, None);
        aborted.abort();

        let mut pending = mgr.begin_txn().unwrap();
        insert_person(&src, &mut pending, 4, None, None);

        let mut txn = mgr.begin_txn().unwrap();

        let mut late = mgr.begin_txn().unwrap();
        insert_person(&src, &mut late, 5, None, None);
        late.commit();

        let stats = dst.copy_table(&mut txn, &src, DB, DST).unwrap();
        assert_eq!(stats.copied, 1);
        assert_eq!(stats.skipped, 4);
        assert_eq!(visible_ids(&dst, &txn), vec![1]);

        txn.commit();
        pending.commit();
    }

    #[test]
    fn copied_rows_are_invisible_until_commit() {
        let store = Arc::new(BlockStore::default());
        let src = create_table(&store);
        let dst = create_table(&store);
        let mgr = TransactionManager::new();

        let mut setup = mgr.begin_txn().unwrap();
        insert_person(&src, &mut setup, 1, None, None);
        setup.commit();

        let mut txn = mgr.begin_txn().unwrap();
        dst.copy_table(&mut txn, &src, DB, DST).unwrap();
        let outsider = mgr.begin_txn().unwrap();
        assert!(visible_ids(&dst, &outsider).is_empty());
        txn.commit();

        let after = mgr.begin_txn().unwrap();
        assert_eq!(visible_ids(&dst, &after), vec![1]);
    }
}

// ============================================================================
// FAILURE TESTS
// ============================================================================

mod failure_tests {
    use super::*;

    #[test]
    fn exhaustion_stops_the_copy_and_abort_hides_partial_rows() {
        let src_store = Arc::new(BlockStore::default());
        let dst_store = BlockStore::builder()
            .tuples_per_block(2)
            .max_blocks(1)
            .build()
            .unwrap();
        let src = create_table(&src_store);
        let dst = create_table(&dst_store);
        let mgr = TransactionManager::new();

        let mut setup = mgr.begin_txn().unwrap();
        for i in 0..5 {
            insert_person(&src, &mut setup, i, Some(VarlenEntry::from(LONG_NAME)), None);
        }
        setup.commit();

        let mut txn = mgr.begin_txn().unwrap();
        let err = dst.copy_table(&mut txn, &src, DB, DST).unwrap_err();
        assert_eq!(
            err.downcast_ref::<StorageError>(),
            Some(&StorageError::BlockStoreExhausted { max_blocks: 1 })
        );
        assert!(err.to_string().contains("after 2 rows"));
        assert_eq!(dst.num_tuples(), 2);
        assert_eq!(visible_ids(&dst, &txn), vec![0, 1]);
        txn.abort();

        let reader = mgr.begin_txn().unwrap();
        assert!(visible_ids(&dst, &reader).is_empty());
    }

    #[test]
    fn copy_into_itself_is_rejected() {
        let store = Arc::new(BlockStore::default());
        let table = create_table(&store);
        let mgr = TransactionManager::new();
        let mut txn = mgr.begin_txn().unwrap();
        assert!(table.copy_table(&mut txn, &table, DB, DST).is_err());
        txn.abort();
    }

    #[test]
    fn mismatched_column_sets_are_rejected_before_reading() {
        let store = Arc::new(BlockStore::default());
        let src = create_table(&store);
        let dst = SqlTable::new(
            Arc::clone(&store),
            &Schema::new(vec![
                Column::new("id", SqlType::BigInt, false),
                Column::new("other", SqlType::Varchar, true).with_oid(ColumnOid::new(40)),
            ]),
        )
        .unwrap();
        let mgr = TransactionManager::new();
        let mut txn = mgr.begin_txn().unwrap();
        insert_person(&src, &mut txn, 1, None, None);

        assert!(dst.copy_table(&mut txn, &src, DB, DST).is_err());
        assert_eq!(dst.num_tuples(), 0);
        txn.abort();
    }
}
