mod history;
mod news;
mod profile;
mod quotes;
mod search;
pub(crate) mod series;
