#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CrawlerError {
    #[error("crawler '{name}' is already running")]
    AlreadyRunning { name: String },
    #[error("{0}")]
    Request(String),
}

pub trait CrawlerService {
    fn start_crawler(&self, name: &str) -> Result<(), CrawlerError>;
}
