use crate::db::gtech::sales_report::GtechSalesArchive;

pub struct ProdDb {}

impl ProdDb {
    pub fn gtech_sales() -> GtechSalesArchive {
        GtechSalesArchive {
            report_url: "https://shafferapi.gtech.com.pk/api/post/SalesReport?dateFrom=01/01/2024&DateTo=/31/2024&api=qTpq3bVFho"
                .to_string(),
            table_name: "sales_data".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            database: "Sales_DB".to_string(),
            user: "postgres".to_string(),
            password: "0342".to_string(),
        }
    }
}
