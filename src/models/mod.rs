pub mod recap;
pub mod tax;
pub mod work;

pub use recap::{
    AdditionalCharges, CategoryTotals, CategoryTotalsBySubwork, ItemsBySubwork, PartCalculation, RecapCalculations,
    RecapDocument, RecapSnapshot, SubworkCategoryTotals, TaxAmounts, UnitInputs,
    RECAP_DOCUMENT_TYPE,
};
pub use tax::{default_taxes, ApplyTo, TaxEntry, TaxType};
pub use work::{ItemCategory, Part, Subwork, SubworkItem, Work};
