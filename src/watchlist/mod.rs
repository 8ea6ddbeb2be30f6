pub(crate) mod signal;
pub(crate) mod watchlist_errors;
pub(crate) mod watchlist_model;
pub(crate) mod watchlist_repository;
pub(crate) mod watchlist_service;
pub(crate) mod watchlist_traits;

pub use signal::{classify_signal, WatchSignal};
pub use watchlist_errors::WatchlistError;
pub use watchlist_model::{
    NewWatchlistItem, WatchlistGroup, WatchlistItem, WatchlistItemUpdate, WatchlistItemView,
};
pub use watchlist_repository::WatchlistRepository;
pub use watchlist_service::WatchlistService;
pub use watchlist_traits::{WatchlistRepositoryTrait, WatchlistServiceTrait};
