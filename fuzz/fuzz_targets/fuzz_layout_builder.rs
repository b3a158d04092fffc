//! Fuzz testing for the physical layout builder.
//!
//! Arbitrary (oid, width) lists must either fail cleanly or produce an
//! injective, bucketed mapping whose projections are order independent.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use sqltable::config::{NUM_RESERVED_COLUMNS, VARLEN_COLUMN};
use sqltable::table::build_layout;
use sqltable::{ColumnOid, WidthClass};

#[derive(Debug, Arbitrary)]
struct LayoutInput {
    columns: Vec<(u32, FuzzWidth)>,
    request: Vec<u8>,
}

#[derive(Debug, Arbitrary, Clone, Copy)]
enum FuzzWidth {
    VarLen,
    Eight,
    Four,
    Two,
    One,
    Raw(u16),
}

impl FuzzWidth {
    fn raw(self) -> u16 {
        match self {
            FuzzWidth::VarLen => VARLEN_COLUMN,
            FuzzWidth::Eight => 8,
            FuzzWidth::Four => 4,
            FuzzWidth::Two => 2,
            FuzzWidth::One => 1,
            FuzzWidth::Raw(width) => width,
        }
    }
}

fuzz_target!(|input: LayoutInput| {
    if input.columns.len() > 512 {
        return;
    }

    let columns: Vec<(ColumnOid, u16)> = input
        .columns
        .iter()
        .map(|&(oid, width)| (ColumnOid::new(oid), width.raw()))
        .collect();

    let Ok((layout, map)) = build_layout(&columns) else {
        return;
    };

    assert_eq!(map.len(), columns.len());
    assert_eq!(
        map.num_physical_slots(),
        columns.len() + NUM_RESERVED_COLUMNS as usize
    );

    let user = &layout.widths()[NUM_RESERVED_COLUMNS as usize..];
    assert!(user.windows(2).all(|w| w[0] <= w[1]));

    for &(oid, width) in &columns {
        let id = map.resolve_one(oid).unwrap();
        assert!(id.as_raw() >= NUM_RESERVED_COLUMNS);
        assert_eq!(map.reverse_resolve(id), Some(oid));
        assert_eq!(Ok(layout.width_class(id)), WidthClass::try_from(width));
    }

    let mut request: Vec<ColumnOid> = input
        .request
        .iter()
        .map(|&i| columns[i as usize % columns.len()].0)
        .collect();
    request.sort();
    request.dedup();

    let forward = map.project(&request).unwrap();
    request.reverse();
    let backward = map.project(&request).unwrap();
    assert_eq!(forward, backward);
});
