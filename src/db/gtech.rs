pub mod sales_report;
