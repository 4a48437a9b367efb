use std::sync::Arc;

use axum::extract::FromRef;
use jamroom_collab::{Collab, DirectoryLibrary};

use crate::{config::ServerConfig, gateway::Gateway};

#[derive(Clone, FromRef)]
pub struct ServerContext {
    pub collab: Arc<Collab>,
    pub gateway: Arc<Gateway>,
    pub config: Arc<ServerConfig>,
}

impl ServerContext {
    pub fn new(config: ServerConfig) -> Self {
        let library = DirectoryLibrary::new(&config.music_dir, config.upload_policy());
        let collab = Collab::new(config.collab_config(), library);

        Self {
            collab: Arc::new(collab),
            gateway: Arc::new(Gateway::new()),
            config: Arc::new(config),
        }
    }
}
