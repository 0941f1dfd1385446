use itertools::Itertools;
use log::{error, info};
use postgres::types::ToSql;
use postgres::{Client, NoTls};
use reqwest::header::USER_AGENT;
use reqwest::StatusCode;
use serde_json::Value;
use std::error::Error;

use crate::decode::parse_resilient;
use crate::table::columns::sanitize_columns;
use crate::table::flatten::{normalize, Table};
use crate::table::types::{clean_value, parse_date, PgType, SqlValue};

/// Daily sales report published by the GTech POS system.  One GET
/// returns the whole report for the date range baked into the url.
pub struct GtechSalesArchive {
    pub report_url: String,
    pub table_name: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl GtechSalesArchive {
    /// One blocking GET for the report.  The date range and the api key
    /// are query parameters of the url.
    pub fn fetch(&self) -> Result<String, Box<dyn Error>> {
        let client = reqwest::blocking::Client::new();
        let response = client
            .get(&self.report_url)
            .header(USER_AGENT, "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36")
            .send()?;
        if response.status() != StatusCode::OK {
            return Err(Box::from(format!("Download failed! {:?}", response)));
        }
        Ok(response.text()?)
    }

    pub fn connect(&self) -> Result<Client, Box<dyn Error>> {
        let params = format!(
            "host={} port={} dbname={} user={} password={}",
            self.host, self.port, self.database, self.user, self.password
        );
        Ok(Client::connect(&params, NoTls)?)
    }

    pub fn create_table_sql(&self, columns: &[String], types: &[PgType]) -> String {
        let fields = columns
            .iter()
            .zip(types)
            .map(|(col, ty)| format!("\"{}\" {}", col, ty))
            .join(", ");
        format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" ({})",
            self.table_name, fields
        )
    }

    pub fn insert_sql(&self, columns: &[String]) -> String {
        format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            self.table_name,
            columns.iter().map(|col| format!("\"{}\"", col)).join(", "),
            (1..=columns.len()).map(|i| format!("${}", i)).join(", ")
        )
    }

    /// Create the destination table with one column per report field.
    /// Safe to run against an existing table; an incompatible shape shows
    /// up later as per-row insert failures.
    pub fn create_table(
        &self,
        client: &mut Client,
        columns: &[String],
        types: &[PgType],
    ) -> Result<(), Box<dyn Error>> {
        client.batch_execute(&self.create_table_sql(columns, types))?;
        info!("table '{}' is ready", self.table_name);
        Ok(())
    }

    /// The source system is known to ship malformed BillDate entries.
    /// Re-parse that column ahead of the generic coercion; cells that are
    /// not a recognizable date become null.
    pub fn fix_bill_dates(table: &mut Table) {
        let idx = match table.columns.iter().position(|col| col == "BillDate") {
            Some(idx) => idx,
            None => return,
        };
        for row in table.rows.iter_mut() {
            let cell = row[idx].take();
            row[idx] = match cell {
                Value::String(s) => match parse_date(s.trim()) {
                    Some(d) => Value::String(d.to_string()),
                    None => Value::Null,
                },
                other => other,
            };
        }
    }

    /// Insert the rows one at a time.  A rejected row is logged and
    /// skipped so the rest of the report still loads.  Returns the number
    /// of rows that made it in.
    pub fn insert_rows(&self, client: &mut Client, table: &Table, types: &[PgType]) -> usize {
        let sql = self.insert_sql(&table.columns);
        let mut inserted = 0;
        for row in &table.rows {
            let values: Vec<SqlValue> = row
                .iter()
                .zip(types)
                .map(|(cell, ty)| clean_value(cell, *ty))
                .collect();
            let params: Vec<&(dyn ToSql + Sync)> = values.iter().map(|v| v.as_tosql()).collect();
            match client.execute(sql.as_str(), &params) {
                Ok(_) => inserted += 1,
                Err(e) => error!("error inserting row {:?}: {}", values, e),
            }
        }
        inserted
    }

    pub fn row_count(&self, client: &mut Client) -> Result<i64, Box<dyn Error>> {
        let row = client.query_one(
            format!("SELECT count(*) FROM \"{}\"", self.table_name).as_str(),
            &[],
        )?;
        Ok(row.get(0))
    }

    /// Run the whole pipeline once: fetch the report, decode it, flatten
    /// it into a table, create the destination table and insert the rows.
    pub fn update_db(&self) -> Result<(), Box<dyn Error>> {
        info!("fetching sales report ...");
        let body = self.fetch()?;
        let doc = parse_resilient(&body)?;

        let mut table = normalize(&doc);
        table.columns = sanitize_columns(&table.columns);
        info!("cleaned columns: {:?}", table.columns);
        let types: Vec<PgType> = table.columns.iter().map(|col| PgType::infer(col)).collect();

        let mut client = self.connect()?;
        self.create_table(&mut client, &table.columns, &types)?;
        Self::fix_bill_dates(&mut table);
        let inserted = self.insert_rows(&mut client, &table, &types);
        info!(
            "inserted {} of {} rows into '{}'",
            inserted,
            table.rows.len(),
            self.table_name
        );

        Ok(())
    }
}
