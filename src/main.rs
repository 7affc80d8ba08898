use anyhow::Result;
use tracing::{error, info};

use embedsql::config::Config;
use embedsql::{Database, Decoder, DecoderCapabilities};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(config.log_level.clone())
        .with_writer(std::io::stderr)
        .init();

    info!("embedsql v{}", env!("CARGO_PKG_VERSION"));

    let db_config = config
        .database_config()
        .map_err(|e| anyhow::anyhow!("Failed to resolve configuration: {}", e))?;

    let database = Database::new();
    database
        .open(db_config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open database: {}", e))?;
    let connection = database.connect().await?;

    let decoder = if config.decode_durations {
        Decoder::new(DecoderCapabilities::all())
    } else {
        Decoder::default()
    };

    let mut failures = 0usize;
    for sql in &config.sql {
        let result = match connection.query(sql).await {
            Ok(result) => result,
            Err(e) => {
                error!("[{}] {}: {}", e.code(), sql, e);
                failures += 1;
                continue;
            }
        };

        match result.to_table_with(&decoder) {
            Ok(table) => {
                let header: Vec<&str> = table.fields().iter().map(|f| f.name.as_str()).collect();
                println!("{}", header.join("\t"));
                for row in table.rows() {
                    let cells: Vec<String> = row.values().iter().map(|v| v.to_string()).collect();
                    println!("{}", cells.join("\t"));
                }
            }
            Err(e) => {
                error!("[decode_error] {}: {}", sql, e);
                failures += 1;
            }
        }
    }

    connection.close().await;
    database.shutdown().await?;

    if failures > 0 {
        anyhow::bail!("{} of {} statements failed", failures, config.sql.len());
    }
    Ok(())
}
