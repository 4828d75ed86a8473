//! Shared fixtures for copy BDD scenarios.

use diskcopy::copy::{CopyResult, SourceLocator, TargetLocator};
use diskcopy::test_support::StubGateway;
use rstest::fixture;
use thiserror::Error;

pub const SOURCE_GROUP: &str = "src-rg";
pub const TARGET_GROUP: &str = "dst-rg";
pub const RELAY_PREFIX: &str = "diskcopy";

#[derive(Clone, Debug)]
pub struct CopyContext {
    pub gateway: StubGateway,
    pub source: Option<SourceLocator>,
    pub target: Option<TargetLocator>,
    pub relay_account: Option<String>,
    pub outcome: Option<CopyOutcome>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CopyFailureKind {
    Unsupported,
    NotFound,
    AlreadyExists,
    CopyFailed,
    Cancelled,
    Gateway,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CopyFailure {
    pub kind: CopyFailureKind,
    pub message: String,
}

#[derive(Clone, Debug)]
pub enum CopyOutcome {
    Success(Box<CopyResult>),
    Failure(CopyFailure),
}

#[derive(Clone, Debug, Error)]
pub enum CopyTestError {
    #[error("invalid copy fixture: {0}")]
    Fixture(String),
}

pub type CopyContextResult = Result<CopyContext, CopyTestError>;

#[fixture]
pub fn copy_context_result() -> CopyContextResult {
    Ok(CopyContext {
        gateway: StubGateway::new(),
        source: None,
        target: None,
        relay_account: None,
        outcome: None,
    })
}

#[fixture]
pub fn copy_context(copy_context_result: CopyContextResult) -> CopyContext {
    copy_context_result
        .unwrap_or_else(|err| panic!("copy context fixture should initialise: {err}"))
}
