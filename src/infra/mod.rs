// Adapters for the file formats the pipeline reads and writes

pub mod calamine_workbook;
pub mod csv_table_writer;

pub use calamine_workbook::CalamineWorkbookReader;
pub use csv_table_writer::write_table;
