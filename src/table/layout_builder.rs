//! # Physical Layout Builder
//!
//! Turns a catalog column list into a `BlockLayout` plus the `ColumnMap`
//! binding each logical oid to its physical slot.
//!
//! ## Slot Assignment
//!
//! 1. Each raw width is converted to a `WidthClass`; anything other than
//!    1, 2, 4, 8 or `VARLEN_COLUMN` fails the build.
//! 2. `compute_base_attribute_offsets` gives the first id of each bucket.
//! 3. Walking the columns in declaration order, each column takes the next
//!    free id of its bucket.
//!
//! ```text
//! declared:  id(8)  name(varlen)  flag(1)  score(8)
//! buckets:   varlen=1  eight=2  four=4  two=4  one=4
//! assigned:  id=2   name=1        flag=4   score=3
//! ```
//!
//! Ids `0..NUM_RESERVED_COLUMNS` are never assigned. The same column list
//! always yields the same assignment.

use eyre::{bail, ensure, Result, WrapErr};
use hashbrown::HashMap;

use crate::catalog::Schema;
use crate::config::{MAX_USER_COLUMNS, NUM_RESERVED_COLUMNS};
use crate::storage::{compute_base_attribute_offsets, BlockLayout};
use crate::table::ColumnMap;
use crate::types::{ColumnId, ColumnOid, WidthClass};

/// Builds the layout for `(oid, raw attribute width)` pairs in declaration
/// order.
pub fn build_layout(columns: &[(ColumnOid, u16)]) -> Result<(BlockLayout, ColumnMap)> {
    ensure!(
        !columns.is_empty(),
        "cannot build a layout for a table without columns"
    );
    ensure!(
        columns.len() <= MAX_USER_COLUMNS,
        "{} columns exceed the limit of {}",
        columns.len(),
        MAX_USER_COLUMNS
    );

    let mut classes = Vec::with_capacity(columns.len());
    for &(oid, width) in columns {
        ensure!(oid.is_valid(), "column oid {} is not a valid catalog oid", oid);
        let class = WidthClass::try_from(width)
            .wrap_err_with(|| format!("column oid {} has an unsupported width", oid))?;
        classes.push(class);
    }

    let mut next_id = compute_base_attribute_offsets(&classes, NUM_RESERVED_COLUMNS);
    let mut oid_to_id = HashMap::with_capacity(columns.len());
    for (&(oid, _), class) in columns.iter().zip(&classes) {
        let bucket = &mut next_id[class.bucket()];
        let id = ColumnId::new(*bucket);
        *bucket += 1;
        if oid_to_id.insert(oid, id).is_some() {
            bail!("column oid {} appears more than once", oid);
        }
    }

    let layout = BlockLayout::new(&classes)?;
    let column_map = ColumnMap::new(oid_to_id, layout.num_columns());

    tracing::debug!(
        columns = columns.len(),
        varlen = layout.widths().iter().filter(|c| c.is_varlen()).count(),
        tuple_size = layout.tuple_size(),
        "built table layout"
    );
    Ok((layout, column_map))
}

/// Builds the layout for a catalog schema, using each column's oid and raw
/// attribute width in declaration order.
pub fn build_layout_for_schema(schema: &Schema) -> Result<(BlockLayout, ColumnMap)> {
    let columns: Vec<_> = schema
        .columns()
        .iter()
        .map(|c| (c.oid(), c.attr_size()))
        .collect();
    build_layout(&columns)
}
