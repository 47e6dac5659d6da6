pub mod backend_service;
pub mod dispatcher;
pub(crate) mod http;
