use thiserror::Error;

#[derive(Error, Debug)]
pub enum BriefError {
    #[error("provider error: {0}")] Provider(String),
    #[error("schema error: {0}")] Schema(String),
    #[error("config error: {0}")] Config(String),
    #[error("suggestions unavailable: {0}")] Unavailable(String),
}
