use env_logger::Env;
use log::info;
use std::error::Error;

use salesdb::db::prod_db::ProdDb;

/// Single-run batch job: fetch the GTech sales report and load it into
/// the sales database.
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let archive = ProdDb::gtech_sales();
    archive.update_db()?;
    info!("done");

    Ok(())
}
