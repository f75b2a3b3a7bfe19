use std::{path::Path, sync::Arc};

use vomo_service::MemoService;
use vomo_storage::{FileRecordStore, QdrantIndex};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<MemoService>,
}
impl AppState {
	pub async fn new(config: vomo_config::Config) -> color_eyre::Result<Self> {
		let records = FileRecordStore::new(Path::new(&config.storage.data_dir))?;
		let index = QdrantIndex::new(&config.storage.qdrant)?;

		index.ensure_collection().await?;

		let service = MemoService::new(config, Arc::new(records), Arc::new(index));

		Ok(Self { service: Arc::new(service) })
	}
}
