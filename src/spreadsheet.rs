use crate::error::ReportError;
use crate::table::{Cell, Table};
use chrono::{DateTime, TimeZone};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::convert::TryFrom;
use std::fmt::Display;
use std::path::Path;

/// Blank rows left between two stacked tables, header row included.
const STACK_GAP: usize = 3;

pub fn report_file_name<Tz: TimeZone>(prefix: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    format!("{}_Report_{}.xlsx", prefix, now.format("%Y-%m-%d_%H%M%S"))
}

#[derive(Debug, PartialEq)]
pub struct TableBlock {
    pub start_row: usize,
    pub table: Table,
}

#[derive(Debug, PartialEq)]
pub struct SheetLayout {
    pub sheet_name: String,
    pub blocks: Vec<TableBlock>,
}

impl SheetLayout {
    pub fn single(sheet_name: &str, table: Table) -> Self {
        SheetLayout {
            sheet_name: sheet_name.to_string(),
            blocks: vec![TableBlock {
                start_row: 0,
                table,
            }],
        }
    }

    /// `second` starts `first.len() + 3` rows below the top of the sheet.
    pub fn stacked(sheet_name: &str, first: Table, second: Table) -> Self {
        let second_start = first.len() + STACK_GAP;
        SheetLayout {
            sheet_name: sheet_name.to_string(),
            blocks: vec![
                TableBlock {
                    start_row: 0,
                    table: first,
                },
                TableBlock {
                    start_row: second_start,
                    table: second,
                },
            ],
        }
    }
}

pub fn write_workbook(path: &Path, layout: &SheetLayout) -> Result<(), ReportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(layout.sheet_name.as_str())?;

    for block in &layout.blocks {
        write_table(worksheet, &header, block)?;
    }
    worksheet.autofit();

    workbook.save(path)?;
    Ok(())
}

fn write_table(
    worksheet: &mut Worksheet,
    header: &Format,
    block: &TableBlock,
) -> Result<(), ReportError> {
    let start_row = u32::try_from(block.start_row)?;
    for (index, column) in block.table.columns.iter().enumerate() {
        worksheet.write_string_with_format(start_row, u16::try_from(index)?, column, header)?;
    }
    for (row_offset, cells) in block.table.rows.iter().enumerate() {
        let row = start_row + 1 + u32::try_from(row_offset)?;
        for (index, cell) in cells.iter().enumerate() {
            let column = u16::try_from(index)?;
            match cell {
                Cell::Text(value) => {
                    worksheet.write_string(row, column, value)?;
                }
                Cell::Number(value) => {
                    worksheet.write_number(row, column, *value)?;
                }
                Cell::Bool(value) => {
                    worksheet.write_boolean(row, column, *value)?;
                }
                Cell::Empty => {}
            }
        }
    }
    Ok(())
}
