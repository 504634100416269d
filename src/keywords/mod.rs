//! Keyword library for test harnesses.
//!
//! [`WinRmLibrary`] exposes four keywords (`Create Session`, `Run Cmd`,
//! `Run Ps`, `Delete All Sessions`), callable directly or by name through
//! [`WinRmLibrary::run_keyword`].
//!
//! ## Example
//!
//! ```no_run
//! use winrm_keywords::keywords::WinRmLibrary;
//! use winrm_keywords::winrm::WinRmConfig;
//!
//! # async fn run() -> winrm_keywords::Result<()> {
//! let library = WinRmLibrary::with_config(WinRmConfig::default())?;
//! library.create_session("server", "windows-host", "Administrator", "1234567890")?;
//!
//! let params = vec!["/all".to_string()];
//! let result = library.run_cmd("server", "ipconfig", Some(&params)).await?;
//! println!("{} {}", result.status_code, result.std_out);
//!
//! library.delete_all_sessions()?;
//! # Ok(())
//! # }
//! ```

mod dispatch;
mod library;

pub use dispatch::{bind, find, normalize_name, BoundArgs, Keyword, KeywordSpec, KEYWORDS};
pub use library::WinRmLibrary;
