pub mod record;
pub mod sales_report;
