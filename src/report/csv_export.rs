use csv::Writer;
use std::path::Path;

use super::sheet::{RecapSheet, SheetRow, TaxLine};
use crate::error::RecapResult;

fn amount_field(value: f64) -> String {
    format!("{:.0}", value)
}

fn row_label(row: &SheetRow) -> String {
    format!("{}. {} (x{})", row.sequence, row.name, row.unit)
}

fn write_line<W: std::io::Write>(
    writer: &mut Writer<W>,
    section: &str,
    label: &str,
    amount: f64,
) -> csv::Result<()> {
    let amount = amount_field(amount);
    writer.write_record([section, label, amount.as_str()])
}

fn write_taxes<W: std::io::Write>(
    writer: &mut Writer<W>,
    section: &str,
    taxes: &[TaxLine],
) -> csv::Result<()> {
    for tax in taxes {
        write_line(writer, section, &tax.label, tax.amount)?;
    }
    Ok(())
}

/// 把汇总表写成 section,label,amount 三列
pub fn write_sheet<W: std::io::Write>(sheet: &RecapSheet, writer: &mut Writer<W>) -> csv::Result<()> {
    writer.write_record(["section", "label", "amount"])?;

    for row in &sheet.part_a.rows {
        write_line(writer, "Part A", &row_label(row), row.amount)?;
    }
    write_line(writer, "Part A", "Subtotal", sheet.part_a.subtotal)?;
    write_taxes(writer, "Part A", &sheet.part_a.taxes)?;
    write_line(writer, "Part A", "Total", sheet.part_a.total)?;

    for row in &sheet.part_b.royalty {
        write_line(writer, "Part B - Royalty", &row_label(row), row.amount)?;
    }
    for row in &sheet.part_b.testing {
        write_line(writer, "Part B - Testing", &row_label(row), row.amount)?;
    }
    write_line(writer, "Part B", "Subtotal", sheet.part_b.subtotal)?;
    write_taxes(writer, "Part B", &sheet.part_b.taxes)?;
    write_line(writer, "Part B", "Total", sheet.part_b.total)?;

    write_line(writer, "Part A+B", "Subtotal", sheet.part_ab_combined.subtotal)?;
    write_taxes(writer, "Part A+B", &sheet.part_ab_combined.taxes)?;
    write_line(writer, "Part A+B", "Total", sheet.part_ab_combined.total)?;

    for row in &sheet.part_c.rows {
        write_line(writer, "Part C", &row_label(row), row.amount)?;
    }
    write_line(writer, "Part C", "Subtotal", sheet.part_c.subtotal)?;
    write_taxes(writer, "Part C", &sheet.part_c.taxes)?;
    write_line(writer, "Part C", "Total", sheet.part_c.total)?;

    let charges = &sheet.additional_charges;
    write_line(writer, "Additional", "Contingencies @ 0.5%", charges.contingencies)?;
    write_line(writer, "Additional", "Inspection charges @ 0.5%", charges.inspection_charges)?;
    write_line(writer, "Additional", "DPR charges @ 5% (max 100000)", charges.dpr_charges)?;

    write_line(writer, "Grand Total", "Grand Total", sheet.grand_total)?;
    writer.flush()?;
    Ok(())
}

/// 导出汇总表到 CSV 文件
pub fn export_csv(sheet: &RecapSheet, output_path: &Path) -> RecapResult<()> {
    let mut writer = Writer::from_path(output_path)?;
    write_sheet(sheet, &mut writer)?;
    Ok(())
}
