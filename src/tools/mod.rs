pub mod args;
pub mod profiles;
pub mod web_search;

pub use args::{
    BaseSearchArgs, ExtractArgs, FullSearchArgs, FullSearchInput, QnaSearchInput,
    SearchContextArgs, SearchContextInput,
};
pub use profiles::{merge_args, DefaultProfiles, SearchArgs};
pub use web_search::{ExtractInput, SearchFunction, SearchInput, WebSearchTool};
