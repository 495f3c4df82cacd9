use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleError {
    #[error(
        "Invalid cycle configuration: cycle length {cycle_length}, period length {period_length}"
    )]
    InvalidConfiguration {
        cycle_length: i64,
        period_length: i64,
    },
}
