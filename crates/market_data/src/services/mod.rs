pub mod kline_fetcher;

pub use kline_fetcher::KlineFetcher;
