use thiserror::Error;

#[derive(Debug, Error)]
pub enum RewindError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("action decode error: {0}")]
    Decode(String),
    #[error("no decoder registered for typed action `{0}`")]
    UnregisteredActionType(String),
    #[error("step {step} is beyond the {available} recorded actions")]
    StepOutOfRange { step: usize, available: usize },
    #[error("config parse error: {0}")]
    ConfigParse(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("cli error: {0}")]
    Cli(String),
}
