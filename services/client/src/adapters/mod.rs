pub mod http;
pub mod token_file;

pub use http::HttpApiAdapter;
pub use token_file::FileTokenStore;
