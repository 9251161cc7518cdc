//! The stock providers.

mod default;
mod economy;
mod tokens;

pub use default::DefaultProvider;
pub use economy::EconomyProvider;
pub use tokens::TokenProvider;
