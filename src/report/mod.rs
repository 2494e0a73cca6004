pub mod csv_export;
pub mod sheet;

pub use csv_export::{export_csv, write_sheet};
pub use sheet::{round_display, CombinedSection, PartBSection, PartSection, RecapSheet, SheetRow, TaxLine};
