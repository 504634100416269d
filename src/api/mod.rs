//! HTTP keyword server.
//!
//! Lets a test harness outside this process call the keywords over JSON.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /api/v1/` - API information
//! - `GET /api/v1/keywords` - List keywords
//! - `POST /api/v1/keywords/{name}` - Run a keyword
//! - `GET /api/v1/sessions` - List registered sessions
//!
//! ## Example
//!
//! ```no_run
//! use winrm_keywords::api::{serve, ServerConfig};
//! use winrm_keywords::winrm::WinRmConfig;
//!
//! #[tokio::main]
//! async fn main() -> winrm_keywords::Result<()> {
//!     let config = ServerConfig::new("127.0.0.1", 8270);
//!     serve(config, WinRmConfig::default()).await
//! }
//! ```

pub mod handlers;
pub mod router;
pub mod types;

pub use handlers::AppState;
pub use router::{create_router, create_router_with_state, serve, serve_with_state, ServerConfig};
pub use types::{
    ErrorResponse, KeywordResult, KeywordStatus, ListKeywordsResponse, ListSessionsResponse,
    RunKeywordRequest,
};
