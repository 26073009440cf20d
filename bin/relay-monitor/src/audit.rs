//! The file half of the audit-sink pair (see `config::KafkaConfig` for why
//! Kafka itself stays out of scope). One JSON object per line, append-only,
//! flushed per record so a crash does not lose already-written audits.

use relay_monitor_analyzer::AuditRecord;
use std::path::PathBuf;
use tokio::{
    fs::OpenOptions,
    io::AsyncWriteExt,
    sync::mpsc::UnboundedReceiver,
};
use tracing::error;

pub async fn run_file_sink(path: PathBuf, mut records: UnboundedReceiver<AuditRecord>) {
    let file = match OpenOptions::new().create(true).append(true).open(&path).await {
        Ok(file) => file,
        Err(err) => {
            error!(?path, %err, "could not open audit output file; audit records will be dropped");
            return
        }
    };
    let mut file = tokio::io::BufWriter::new(file);

    while let Some(record) = records.recv().await {
        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(err) => {
                error!(%err, "could not serialize audit record");
                continue
            }
        };
        if let Err(err) = file.write_all(line.as_bytes()).await {
            error!(%err, "could not write audit record");
            continue
        }
        if let Err(err) = file.write_all(b"\n").await {
            error!(%err, "could not write audit record newline");
        }
        if let Err(err) = file.flush().await {
            error!(%err, "could not flush audit output file");
        }
    }
}
