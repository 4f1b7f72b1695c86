#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use timetable_core::{http_api, logging};

    let spec = std::env::var("TIMETABLE_LOG_LEVEL")
        .unwrap_or_else(|_| logging::default_spec().to_string());
    logging::init(&spec)?;

    let addr: SocketAddr = std::env::var("TIMETABLE_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    #[cfg(feature = "sqlite")]
    {
        use timetable_core::{SqliteTimetableStore, TimetableStore};

        let db_path = std::env::var("TIMETABLE_DB_PATH")
            .unwrap_or_else(|_| "timetable.sqlite3".to_string());
        let store = SqliteTimetableStore::new(&db_path)?;
        let index = store.load_timetable()?.unwrap_or_default();
        let substitutes = store.load_substitutes()?;
        log::info!(
            "timetable-core HTTP API on http://{addr}, system of record {db_path} ({} assignments)",
            index.len()
        );
        let state = http_api::AppState::new(index, substitutes, store);
        http_api::serve(addr, state).await?;
    }

    #[cfg(not(feature = "sqlite"))]
    {
        use timetable_core::{AlwaysAck, SlotIndex, SubstituteLog};

        log::info!("timetable-core HTTP API on http://{addr}, no system of record configured");
        let state = http_api::AppState::new(SlotIndex::default(), SubstituteLog::new(), AlwaysAck);
        http_api::serve(addr, state).await?;
    }

    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
