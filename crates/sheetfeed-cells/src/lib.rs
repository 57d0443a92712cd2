//! sheetfeed_cells - cell addressing and batch construction (no I/O).

pub mod cells;
