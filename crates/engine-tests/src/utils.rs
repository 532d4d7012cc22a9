use connectors::{file::csv::source::load_csv, query::RowQuery};
use engine_core::{
    context::run::TransformMap, retry::RetryPolicy, state::sled_store::SledIgnoreSetStore,
};
use engine_processing::{onstart::OnStartStage, setup::RequiredFieldsSetup};
use std::{io::Write, path::Path, sync::Arc, time::Duration};
use tempfile::{NamedTempFile, TempDir};

/// Header of a stock-list export with every default source field.
pub const STOCK_HEADER: &str =
    "sys_import_set,sys_import_row,u_serienr,u_computacenter_category,u_cmdb_cat_,u_omschrijving,u_tagnr";

/// One import set with three copies of SN-100, two of SN-200, and a blank serial twice.
pub const STOCK_ROWS: &[&str] = &[
    "ISET0001,1,SN-100,Laptop,Hardware,Latitude 5440,T-1",
    "ISET0001,2,SN-200,Monitor,Hardware,P2422H,T-2",
    "ISET0001,3,SN-100,Laptop,Hardware,Latitude 5440,T-1",
    "ISET0001,4,SN-300,Dock,Hardware,WD19,T-3",
    "ISET0001,5,,Cable,Accessory,USB-C,",
    "ISET0001,6,SN-200,Monitor,Hardware,P2422H,T-2",
    "ISET0001,7,SN-100,Laptop,Hardware,Latitude 5440,T-1",
    "ISET0001,8,,Cable,Accessory,USB-C,",
    "ISET0002,9,SN-100,Laptop,Hardware,Latitude 5440,T-1",
];

pub const SOURCE_TABLE: &str = "u_stock_import";

/// Writes `header` and `rows` to a temporary CSV file.
pub fn write_csv(header: &str, rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create csv");
    writeln!(file, "{header}").expect("write header");
    for row in rows {
        writeln!(file, "{row}").expect("write row");
    }
    file.flush().expect("flush csv");
    file
}

pub fn stock_map() -> TransformMap {
    TransformMap::new("Voorraadlijst", SOURCE_TABLE, "alm_hardware")
}

/// Builds an on-start stage over a CSV file, publishing into a sled store at `state`.
pub fn csv_stage(csv: &Path, state: &TempDir) -> (OnStartStage, Arc<SledIgnoreSetStore>) {
    let table: Arc<dyn RowQuery> = Arc::new(load_csv(csv, SOURCE_TABLE).expect("load csv"));
    let store = Arc::new(SledIgnoreSetStore::open(state.path()).expect("open state"));

    let stage = OnStartStage::new(
        Arc::new(RequiredFieldsSetup::new(table.clone())),
        table,
        store.clone(),
    )
    .with_retry(RetryPolicy::new(2, Duration::ZERO, Duration::ZERO));

    (stage, store)
}
