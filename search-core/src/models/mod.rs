pub mod api_result;
pub mod query_request;

pub use api_result::{AnswerResult, ApiResult, Citation, FileHit, FileListResult, Via};
pub use query_request::{QueryForm, QueryMode, QueryRequest};
