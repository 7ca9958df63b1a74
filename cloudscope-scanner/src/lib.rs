pub mod category;
pub mod credentials;
pub mod envelope;
pub mod error;
pub mod fetcher;
pub mod inventory;
pub mod scanner;

pub use category::Category;
pub use credentials::Credentials;
pub use error::ScanError;
pub use fetcher::{CategoryFetcher, FileFetcher, GatewayFetcher};
pub use inventory::{FetchOutcome, Inventory};
pub use scanner::Scanner;
