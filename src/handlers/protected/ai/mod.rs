pub mod categorize;
pub mod suggestions;

pub use categorize::categorize_post;
pub use suggestions::suggestions_get;
