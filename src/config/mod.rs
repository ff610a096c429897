pub mod constant;
pub mod server;
pub mod synthesis;
pub mod thumbnail;
pub mod tracing;

use dotenv::dotenv;

#[derive(Clone, Default, Debug)]
pub struct ServiceConfig {
    pub server: server::ServerConfig,
    pub synthesis: synthesis::SynthesisConfig,
    pub thumbnail: thumbnail::ThumbnailConfig,
}

impl ServiceConfig {
    pub fn init_from_env(&mut self) -> Result<(), String> {
        dotenv().ok();
        self.server.init_from_env()?;
        self.thumbnail.init_from_env()?;
        self.synthesis.init_from_env()?;
        self.synthesis.width = self.thumbnail.width;
        self.synthesis.height = self.thumbnail.height;
        Ok(())
    }
}
